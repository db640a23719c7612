//! Keyword denylist for ad-hoc queries.
//!
//! This is a coarse safety net, not a SQL parser: matching is by substring
//! on the uppercased text, so identifiers that contain a keyword
//! (`update_at`, `dropoff`) are rejected as well.

use crate::constants::validation::DENIED_KEYWORDS;
use crate::error::{Error, Result};

/// Reject `query` if it contains a mutating keyword.
pub fn validate_query(query: &str) -> Result<()> {
    let upper = query.to_uppercase();
    match DENIED_KEYWORDS.iter().copied().find(|keyword| upper.contains(keyword)) {
        Some(keyword) => Err(Error::UnsafeQuery { keyword }),
        None => Ok(()),
    }
}
