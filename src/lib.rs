pub mod io;
pub mod segment;
pub mod jpeg;
pub mod metadata;
pub mod tiff;
pub mod utils;
pub mod commands;
pub mod api;

pub use crate::api::TiffWrap;

pub use jpeg::JpegParser;
pub use segment::{Segment, SegmentKind, SegmentList};
pub use tiff::{TiffPlanner, TiffReader, TiffWriter, WrapError, WrapResult};
