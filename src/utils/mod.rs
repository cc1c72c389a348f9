//! Utility modules
//!
//! Logging, input format discrimination, and tag-name lookups.

pub mod logger;
pub mod format_utils;
pub mod tag_utils;
