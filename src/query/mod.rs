//! Query preparation and dispatch.
//!
//! This module provides:
//! - Time-bucket inference from a requested time range
//! - Stored template parsing and placeholder substitution
//! - The dispatcher tying registry, executor and reshaping together

pub mod bucket;
pub mod dispatcher;
pub mod template;

pub use bucket::{select_bucket, TimeBucket, TimeRange};
pub use dispatcher::{ComponentId, QueryDispatcher};
pub use template::{expand, BoundTemplate, Placeholder, QueryTemplate, TemplateFlavor};
