//! JPEG file parser
//!
//! A state machine driven by consuming two-byte markers. Length-prefixed
//! segments are read via a seek-ahead on their 16-bit big-endian length;
//! after a start-of-scan segment the parser switches to an entropy-data
//! scan that honors byte stuffing and in-band restart markers.

use byteorder::{BigEndian, ReadBytesExt};
use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufReader, ErrorKind, SeekFrom};

use crate::io::seekable::{self, SeekableReader};
use crate::jpeg::markers;
use crate::segment::{Segment, SegmentKind, SegmentList};
use crate::tiff::errors::{WrapError, WrapResult};
use crate::utils::logger::Logger;

/// Maps an end-of-file read error to the parser's truncation error
fn eof_to_wrap(error: std::io::Error) -> WrapError {
    if error.kind() == ErrorKind::UnexpectedEof {
        WrapError::UnexpectedEof
    } else {
        WrapError::IoError(error)
    }
}

/// Parser for JPEG files and embedded JPEG sections
pub struct JpegParser<'a> {
    /// Logger instance
    logger: &'a Logger,
}

impl<'a> JpegParser<'a> {
    /// Creates a new JPEG parser
    pub fn new(logger: &'a Logger) -> Self {
        JpegParser { logger }
    }

    /// Loads a JPEG file from the given path into a segment list
    pub fn load(&self, filepath: &str) -> WrapResult<SegmentList> {
        info!("Loading JPEG file: {}", filepath);

        let file = File::open(filepath)?;
        let mut reader = BufReader::with_capacity(1024 * 1024, file);
        let length = seekable::stream_length(&mut reader)?;

        let mut list = SegmentList::new();
        self.parse(&mut reader, 0, length as u32, &mut list)?;
        self.logger.log(&format!("Read {} JPEG segments from {}", list.len(), filepath))?;
        Ok(list)
    }

    /// Parses a JPEG stream at `start` spanning `length` bytes,
    /// appending typed segments to `list`
    ///
    /// Fails with `NotJpeg` when the bytes at `start` are not an SOI
    /// marker and with `UnexpectedEof` when the stream runs out before
    /// the end-of-image marker.
    pub fn parse(
        &self,
        reader: &mut dyn SeekableReader,
        start: u32,
        length: u32,
        list: &mut SegmentList,
    ) -> WrapResult<()> {
        reader.seek(SeekFrom::Start(start as u64))?;

        let mut signature = [0u8; 2];
        reader.read_exact(&mut signature).map_err(eof_to_wrap)?;
        if signature != [markers::MARKER_PREFIX, markers::SOI] {
            return Err(WrapError::NotJpeg);
        }
        list.push_nopad(Segment::new(SegmentKind::Soi, start, signature.to_vec()));

        let end_offset = start as u64 + length as u64;

        loop {
            let filepos = reader.stream_position()?;
            if filepos >= end_offset {
                return Err(WrapError::UnexpectedEof);
            }

            let mut marker = [0u8; 2];
            reader.read_exact(&mut marker).map_err(eof_to_wrap)?;

            if marker[0] != markers::MARKER_PREFIX {
                warn!("Expected a marker at offset {}, found {:#04x}; stopping scan",
                      filepos, marker[0]);
                return Ok(());
            }

            match marker[1] {
                markers::EOI => {
                    debug!("End of image at offset {}", filepos);
                    list.push_nopad(Segment::new(
                        SegmentKind::Eoi,
                        filepos as u32,
                        marker.to_vec(),
                    ));
                    return Ok(());
                }
                markers::SOI => {
                    // Some cameras embed a second image near the end of the stream
                    debug!("Nested start of image at offset {}", filepos);
                    list.push_nopad(
                        Segment::new(SegmentKind::Soi, filepos as u32, marker.to_vec())
                            .with_label("nested image"),
                    );
                }
                markers::RST0..=markers::RST7 => {
                    list.push_nopad(Segment::new(
                        SegmentKind::RestartMarker,
                        filepos as u32,
                        marker.to_vec(),
                    ));
                }
                other => {
                    let kind = markers::classify(other);
                    let segment = self.read_sized_segment(reader, kind, filepos)?;
                    let was_sos = matches!(segment.kind, SegmentKind::StartOfScan);
                    debug!("Read {} segment at offset {} ({} bytes)",
                           segment.kind_name(), segment.offset, segment.size);
                    list.push_nopad(segment);

                    if was_sos {
                        // Image data follows the start-of-scan header
                        self.read_image_data(reader, list)?;
                    }
                }
            }
        }
    }

    /// Reads a length-prefixed segment whose marker has already been
    /// consumed; the total segment length is the declared length plus
    /// the two marker bytes
    fn read_sized_segment(
        &self,
        reader: &mut dyn SeekableReader,
        kind: SegmentKind,
        offset: u64,
    ) -> WrapResult<Segment> {
        let declared = reader.read_u16::<BigEndian>().map_err(eof_to_wrap)? as usize;
        let total = declared + 2;

        reader.seek(SeekFrom::Start(offset))?;
        let mut data = vec![0u8; total];
        reader.read_exact(&mut data).map_err(eof_to_wrap)?;

        Ok(Segment::new(kind, offset as u32, data))
    }

    /// Scans the entropy-coded data run after a start-of-scan segment
    ///
    /// `FF 00` is a stuffed data byte and `FF D0`..`FF D7` are in-band
    /// restart markers; both stay inside the run. `FF D9` terminates it
    /// and is left unconsumed for the marker loop.
    fn read_image_data(
        &self,
        reader: &mut dyn SeekableReader,
        list: &mut SegmentList,
    ) -> WrapResult<()> {
        let data_start = reader.stream_position()?;

        let marker_pos = loop {
            let byte = reader.read_u8().map_err(eof_to_wrap)?;
            if byte != markers::MARKER_PREFIX {
                continue;
            }
            let second = reader.read_u8().map_err(eof_to_wrap)?;
            match second {
                0x00 => continue, // stuffed 0xFF data byte
                markers::EOI => break reader.stream_position()? - 2,
                markers::RST0..=markers::RST7 => continue,
                other => {
                    warn!("Marker ff{:02x} appeared inside the image data stream", other);
                }
            }
        };

        let data_size = marker_pos - data_start;
        reader.seek(SeekFrom::Start(data_start))?;
        let mut data = vec![0u8; data_size as usize];
        reader.read_exact(&mut data).map_err(eof_to_wrap)?;

        debug!("Image data run: {} bytes at offset {}", data_size, data_start);
        list.push_nopad(Segment::new(SegmentKind::ImageData, data_start as u32, data));

        // Position is back at the terminating EOI marker
        Ok(())
    }
}
