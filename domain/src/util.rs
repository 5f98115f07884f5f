//! Shared string helpers for prompt assembly.

/// Truncate a string to at most `max_bytes` without splitting a UTF-8
/// character boundary.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Append `text` to `buf`, stopping once `buf` would exceed `budget` bytes.
///
/// Returns `false` when the budget was reached (the caller should stop
/// appending further sections).
pub fn push_within_budget(buf: &mut String, text: &str, budget: usize) -> bool {
    let remaining = budget.saturating_sub(buf.len());
    if remaining == 0 {
        return false;
    }
    let piece = truncate_str(text, remaining);
    buf.push_str(piece);
    piece.len() == text.len()
}
