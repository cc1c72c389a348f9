//! Input format utilities
//!
//! Discrimination of the supported input formats from their first four
//! bytes, and derivation of the default output file name.

use log::debug;
use std::io::SeekFrom;

use crate::io::seekable::SeekableReader;
use crate::tiff::errors::{WrapError, WrapResult};

/// Fallback output name used when no sensible name can be derived
pub const FALLBACK_OUTPUT_NAME: &str = "JPEG-COMPRESSED-TIFF-FILE.tif";

/// The file formats the tool recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// TIFF file, little-endian (II)
    TiffLittleEndian,
    /// TIFF file, big-endian (MM)
    TiffBigEndian,
    /// JPEG file carrying a JFIF or Exif APP segment
    Jpeg,
}

impl FileType {
    /// Returns a string representation of this file type
    pub fn name(&self) -> &'static str {
        match self {
            FileType::TiffLittleEndian => "TIFF (little-endian)",
            FileType::TiffBigEndian => "TIFF (big-endian)",
            FileType::Jpeg => "JPEG",
        }
    }
}

/// Determines the input format from the first four bytes of a stream
///
/// The position is restored to the start of the stream afterwards.
pub fn sniff_file_type(reader: &mut dyn SeekableReader) -> WrapResult<FileType> {
    reader.seek(SeekFrom::Start(0))?;
    let mut signature = [0u8; 4];
    reader
        .read_exact(&mut signature)
        .map_err(|_| WrapError::UnrecognizedFormat)?;
    reader.seek(SeekFrom::Start(0))?;

    let file_type = match signature {
        [0x49, 0x49, 0x2A, 0x00] => FileType::TiffLittleEndian,
        [0x4D, 0x4D, 0x00, 0x2A] => FileType::TiffBigEndian,
        [0xFF, 0xD8, 0xFF, 0xE0] => FileType::Jpeg, // JFIF
        [0xFF, 0xD8, 0xFF, 0xE1] => FileType::Jpeg, // Exif
        _ => return Err(WrapError::UnrecognizedFormat),
    };
    debug!("Input recognized as {}", file_type.name());
    Ok(file_type)
}

/// Derives the default output name from the input name: the last
/// `.`-suffix is replaced by `.tif`; with no suffix the fallback name
/// is used
pub fn derive_output_name(input: &str) -> String {
    match input.rfind('.') {
        Some(position) => format!("{}.tif", &input[..position]),
        None => FALLBACK_OUTPUT_NAME.to_string(),
    }
}

/// Resolves the output file name from an optional explicit argument
///
/// An explicit name is used as-is. Otherwise the name is derived from
/// the input; when the derived file already exists the fallback name in
/// the current directory is used instead, with a warning.
pub fn resolve_output_name(input: &str, explicit: Option<&str>) -> String {
    if let Some(name) = explicit {
        return name.to_string();
    }
    let derived = derive_output_name(input);
    if std::path::Path::new(&derived).exists() {
        log::warn!("\"{}\" exists, writing to \"{}\" instead", derived, FALLBACK_OUTPUT_NAME);
        return FALLBACK_OUTPUT_NAME.to_string();
    }
    derived
}
