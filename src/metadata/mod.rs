//! Metadata extraction from JPEG application segments
//!
//! APP2 segments carry the ICC profile, possibly split across several
//! chunks; APP1 segments carry the Exif block with its embedded TIFF
//! directory structure.

pub mod exif;
pub mod icc;

pub use exif::{read_app1_metadata, ExifInfo};
pub use icc::read_icc_profile;
