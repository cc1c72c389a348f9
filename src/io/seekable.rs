//! Seekable reader trait
//!
//! A unified trait for byte sources that support both reading and
//! seeking. The JPEG parser needs seek for header look-ahead after
//! reading a two-byte length prefix.

use std::io::{Read, Seek, SeekFrom};

use crate::tiff::errors::WrapResult;

/// Trait for readers that can both read and seek
pub trait SeekableReader: Read + Seek + Send + Sync {}

// Blanket implementation for any type that implements the required traits
impl<T: Read + Seek + Send + Sync> SeekableReader for T {}

/// Returns the total length of a stream, restoring the current position
pub fn stream_length(reader: &mut dyn SeekableReader) -> WrapResult<u64> {
    let position = reader.stream_position()?;
    let length = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(position))?;
    Ok(length)
}
