//! Custom error types for the rewrap pipeline

use std::fmt;
use std::io;

/// Errors raised while parsing JPEG input, reading metadata, or
/// planning and writing TIFF output
#[derive(Debug)]
pub enum WrapError {
    /// I/O error
    IoError(io::Error),
    /// Input file is neither JPEG nor TIFF
    UnrecognizedFormat,
    /// The bytes at the start offset are not a JPEG stream
    NotJpeg,
    /// The stream ended before the end-of-image marker
    UnexpectedEof,
    /// Start-of-frame marker other than baseline DCT (0xC0)
    UnsupportedFrame(u8),
    /// ICC chunks disagree about the total chunk count
    IccInconsistent { expected: u8, found: u8 },
    /// ICC chunk index out of range or duplicated
    IccBadIndex { chunk_no: u8, num_chunks: u8 },
    /// A declared ICC chunk never appeared
    IccMissingChunk(u8),
    /// Directory offset in an Exif block points outside the payload
    InvalidIfdOffset(u32),
    /// Subsampling factors that cannot be expressed in YCbCrSubSampling
    IllegalSubsampling,
    /// Invalid byte order marker in a TIFF header
    InvalidByteOrder(u16),
    /// TIFF version other than 42 (e.g. BigTIFF)
    UnsupportedVersion(u16),
    /// Generic error with message
    GenericError(String),
}

impl fmt::Display for WrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WrapError::IoError(e) => write!(f, "I/O error: {}", e),
            WrapError::UnrecognizedFormat => write!(f, "Not a TIFF or JPEG file"),
            WrapError::NotJpeg => write!(f, "The input is not a JPEG image"),
            WrapError::UnexpectedEof => write!(f, "Unexpected end of stream"),
            WrapError::UnsupportedFrame(marker) => write!(
                f,
                "Unsupported start-of-frame marker 0xff{:02x}: only baseline DCT (0xffc0) can be rewrapped",
                marker
            ),
            WrapError::IccInconsistent { expected, found } => write!(
                f,
                "Embedded ICC profile chunk count mismatch: expected {}, found {}",
                expected, found
            ),
            WrapError::IccBadIndex { chunk_no, num_chunks } => write!(
                f,
                "Illegal ICC chunk number ({} of {})",
                chunk_no, num_chunks
            ),
            WrapError::IccMissingChunk(n) => write!(f, "ICC profile chunk {} is missing", n),
            WrapError::InvalidIfdOffset(offset) => {
                write!(f, "Invalid directory offset in Exif segment: {}", offset)
            }
            WrapError::IllegalSubsampling => write!(f, "Illegal subsampling factors"),
            WrapError::InvalidByteOrder(v) => write!(f, "Invalid byte order marker: {:#06x}", v),
            WrapError::UnsupportedVersion(v) => write!(f, "Unsupported TIFF version: {}", v),
            WrapError::GenericError(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for WrapError {}

impl From<io::Error> for WrapError {
    fn from(error: io::Error) -> Self {
        WrapError::IoError(error)
    }
}

impl From<String> for WrapError {
    fn from(msg: String) -> Self {
        WrapError::GenericError(msg)
    }
}

/// Result type for rewrap operations
pub type WrapResult<T> = Result<T, WrapError>;
