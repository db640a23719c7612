//! Shared constants for the dashquery service
//!
//! Centralizes the time formats and query safety lists so the template,
//! reshaping and HTTP layers agree on them.

/// Time formats exchanged with dashboard clients
pub mod time {
    /// Layout of every timestamp accepted from or rendered to a client.
    /// The `+08:00` suffix is matched and written literally.
    pub const TIMESTAMP_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S+08:00";

    /// Accepted client layout: as above, with optional fractional seconds.
    pub const TIMESTAMP_INPUT_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%.f+08:00";

    /// Offset (UTC+8) that rendered timestamps are expressed in
    pub const DASHBOARD_OFFSET_SECS: i32 = 8 * 3600;
}

/// Template placeholder settings
pub mod template {
    /// Token marking a substitution slot in a stored query
    pub const PLACEHOLDER: &str = "%s";

    /// Slots consumed by a direct chart template (from, to)
    pub const CHART_GROUP: usize = 2;

    /// Slots per repeated group in a history template (bucket, from, to)
    pub const HISTORY_GROUP: usize = 3;
}

/// Query safety checks
pub mod validation {
    /// Keywords rejected in ad-hoc queries, checked in this order
    pub const DENIED_KEYWORDS: &[&str] = &["DROP", "DELETE", "TRUNCATE", "INSERT", "UPDATE", "ALTER"];
}
