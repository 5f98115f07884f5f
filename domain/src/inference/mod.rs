//! Inference request/response value objects.

pub mod message;
pub mod request;
pub mod response;
