//! Research configuration from TOML (`[research]` and `[sources]` sections)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileResearchConfig {
    pub max_sources: usize,
    pub search_batch_size: usize,
    pub results_per_query: usize,
    pub scrape_top_n: usize,
    /// Byte budget for source text sent to the model.
    pub verification_content_limit: usize,
    pub per_source_content_limit: usize,
}

impl Default for FileResearchConfig {
    fn default() -> Self {
        Self {
            max_sources: 10,
            search_batch_size: 3,
            results_per_query: 5,
            scrape_top_n: 6,
            verification_content_limit: 12_000,
            per_source_content_limit: 2_000,
        }
    }
}

/// Web source provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSourcesConfig {
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FileSourcesConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            user_agent: format!("deepdive/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
