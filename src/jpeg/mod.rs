//! JPEG stream parsing
//!
//! Marker-driven decomposition of a JPEG byte stream into typed
//! segments, including the entropy-coded data run after start-of-scan.

pub mod markers;
pub mod parser;

pub use parser::JpegParser;
