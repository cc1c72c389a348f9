//! TIFF output serialization
//!
//! Flushes a planned segment list to a byte sink in order. Every
//! segment's payload was built (or rebuilt after back-patching) during
//! planning, so writing is a straight concatenation; padding segments
//! contribute their single zero byte and the file ends at the last byte
//! of the main directory.

use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};

use crate::segment::SegmentList;
use crate::tiff::errors::{WrapError, WrapResult};

/// Writes planned segment lists to their final byte form
pub struct TiffWriter;

impl TiffWriter {
    /// Writes all segments of the list, in order, to the given sink
    pub fn write(list: &SegmentList, writer: &mut impl Write) -> WrapResult<()> {
        for segment in list.iter() {
            if segment.data.len() != segment.size as usize {
                return Err(WrapError::GenericError(format!(
                    "Segment {} at offset {} has {} payload bytes but declares {}",
                    segment.kind_name(), segment.offset, segment.data.len(), segment.size
                )));
            }
            debug!("Writing {} segment: offset {}, {} bytes",
                   segment.kind_name(), segment.offset, segment.size);
            writer.write_all(&segment.data)?;
        }
        Ok(())
    }

    /// Writes the list to a file, creating or truncating it
    pub fn write_file(list: &SegmentList, output_path: &str) -> WrapResult<()> {
        info!("Writing TIFF to {}", output_path);

        let file = File::create(output_path)?;
        let mut writer = BufWriter::with_capacity(1024 * 1024, file);
        Self::write(list, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
