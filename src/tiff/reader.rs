//! TIFF input reader
//!
//! TIFF files are not rewrapped, but the tool recognizes them and reads
//! their structure for analysis: the header, the IFD chain, the strip
//! and tile tables, and any embedded JPEG sections (a JPEGTables blob
//! or a JPEG-compressed strip), which are parsed down to their own
//! segments. Classic TIFF only; BigTIFF is rejected.

use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufReader, SeekFrom};

use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::io::seekable::{self, SeekableReader};
use crate::jpeg::parser::JpegParser;
use crate::segment::{Segment, SegmentKind, SegmentList};
use crate::tiff::constants::{compression, header, tags};
use crate::tiff::entry::TiffDirEntry;
use crate::tiff::errors::{WrapError, WrapResult};
use crate::utils::logger::Logger;
use crate::utils::tag_utils;

/// Upper bound on the directory chain, guarding against cycles
const MAX_DIRECTORIES: usize = 100;

/// Reader for classic TIFF files
pub struct TiffReader<'a> {
    /// Current byte order handler
    byte_order_handler: Option<Box<dyn ByteOrderHandler>>,
    /// Byte order of the file being read
    endian: ByteOrder,
    /// Logger instance
    logger: &'a Logger,
}

impl<'a> TiffReader<'a> {
    /// Creates a new TIFF reader
    pub fn new(logger: &'a Logger) -> Self {
        TiffReader {
            byte_order_handler: None,
            endian: ByteOrder::LittleEndian,
            logger,
        }
    }

    /// Loads a TIFF file from the given path into a segment list
    pub fn load(&mut self, filepath: &str) -> WrapResult<SegmentList> {
        info!("Loading TIFF file: {}", filepath);

        let file = File::open(filepath)?;
        let mut reader = BufReader::with_capacity(1024 * 1024, file);
        let list = self.read(&mut reader)?;
        self.logger.log(&format!("Read {} TIFF segments from {}", list.len(), filepath))?;
        Ok(list)
    }

    /// Reads a TIFF structure from the given reader
    pub fn read(&mut self, reader: &mut dyn SeekableReader) -> WrapResult<SegmentList> {
        reader.seek(SeekFrom::Start(0))?;

        self.endian = ByteOrder::detect(reader)?;
        debug!("Detected byte order: {}", self.endian.name());
        self.byte_order_handler = Some(self.endian.create_handler());
        let handler = self.byte_order_handler.as_ref().unwrap();

        let version = handler.read_u16(reader)?;
        if version != header::TIFF_VERSION {
            return Err(WrapError::UnsupportedVersion(version));
        }
        let first_dir_offset = handler.read_u32(reader)?;
        debug!("First directory offset: {}", first_dir_offset);

        let file_size = seekable::stream_length(reader)?;
        if (first_dir_offset as u64) < header::HEADER_SIZE as u64
            || first_dir_offset as u64 >= file_size
        {
            return Err(WrapError::InvalidIfdOffset(first_dir_offset));
        }

        let mut list = SegmentList::new();
        let mut header_segment = Segment::tiff_header(0, self.endian);
        header_segment.set_directory_offset(first_dir_offset);
        list.push_nopad(header_segment);

        let mut dir_offset = first_dir_offset;
        let mut dir_number = 0;
        while dir_offset != 0 && dir_number < MAX_DIRECTORIES {
            if dir_offset as u64 >= file_size {
                warn!("Directory offset {} exceeds file size {}, stopping chain",
                      dir_offset, file_size);
                break;
            }
            let next = self.read_directory(reader, dir_offset, &mut list)?;
            dir_number += 1;
            dir_offset = next;
        }

        info!("Read {} directories from TIFF file", dir_number);
        Ok(list)
    }

    /// Reads one directory, appends it and its external data segments,
    /// and returns the offset of the next directory
    fn read_directory(
        &self,
        reader: &mut dyn SeekableReader,
        dir_offset: u32,
        list: &mut SegmentList,
    ) -> WrapResult<u32> {
        let handler = self.byte_order_handler.as_ref().unwrap();

        reader.seek(SeekFrom::Start(dir_offset as u64))?;
        let num_entries = handler.read_u16(reader)? as usize;
        debug!("Directory at offset {}: {} entries", dir_offset, num_entries);

        let mut records = vec![0u8; 12 * num_entries];
        reader.read_exact(&mut records)?;

        let mut entries = Vec::with_capacity(num_entries);
        for i in 0..num_entries {
            let entry = TiffDirEntry::from_memory(&records[12 * i..12 * (i + 1)], self.endian)?;
            debug!("  {}", tag_utils::describe_entry(&entry));
            entries.push(entry);
        }
        let next_dir_offset = handler.read_u32(reader)?;

        let mut directory = Segment::tiff_directory(dir_offset, self.endian, entries.clone());
        directory.set_next_directory_offset(next_dir_offset);
        list.push_nopad(directory);

        self.read_external_data(reader, &entries, list)?;
        Ok(next_dir_offset)
    }

    /// Reads the external data referenced by a directory's entries
    ///
    /// Strip and tile tables become offset and bytecount table
    /// segments; a JPEGTables blob and a single JPEG-compressed strip
    /// are parsed into their own JPEG segments; other strips are read
    /// as raw image data segments.
    fn read_external_data(
        &self,
        reader: &mut dyn SeekableReader,
        entries: &[TiffDirEntry],
        list: &mut SegmentList,
    ) -> WrapResult<()> {
        let mut strip_offsets = Vec::new();
        let mut strip_byte_counts = Vec::new();
        let mut compression_code = 0u32;

        for entry in entries {
            match entry.tag() {
                tags::BITS_PER_SAMPLE if entry.data_size() > 4 => {
                    let values: Vec<u16> = self
                        .read_numeric_vector(reader, entry)?
                        .into_iter()
                        .map(|v| v as u16)
                        .collect();
                    list.push_nopad(
                        Segment::ushort_vector(entry.offset_field(), self.endian, values)
                            .with_label("BitsPerSample"),
                    );
                }
                tags::STRIP_OFFSETS | tags::TILE_OFFSETS => {
                    strip_offsets = self.read_numeric_vector(reader, entry)?;
                    if entry.data_size() > 4 {
                        self.read_table_segment(
                            reader, entry, SegmentKind::OffsetTable { endian: self.endian }, list)?;
                    }
                }
                tags::STRIP_BYTE_COUNTS | tags::TILE_BYTE_COUNTS => {
                    strip_byte_counts = self.read_numeric_vector(reader, entry)?;
                    if entry.data_size() > 4 {
                        self.read_table_segment(
                            reader, entry, SegmentKind::BytecountTable { endian: self.endian }, list)?;
                    }
                }
                tags::COMPRESSION => {
                    compression_code = entry.integer_value();
                }
                tags::JPEG_TABLES if entry.data_size() > 4 => {
                    let parser = JpegParser::new(self.logger);
                    parser.parse(reader, entry.offset_field(), entry.data_size(), list)?;
                }
                _ => {}
            }
        }

        let is_jpeg_compressed = compression_code == compression::JPEG as u32
            || compression_code == compression::JPEG_OLD as u32;

        if strip_offsets.len() == 1 && strip_byte_counts.len() == 1 && is_jpeg_compressed {
            let parser = JpegParser::new(self.logger);
            parser.parse(reader, strip_offsets[0], strip_byte_counts[0], list)?;
        } else {
            for (&offset, &count) in strip_offsets.iter().zip(strip_byte_counts.iter()) {
                reader.seek(SeekFrom::Start(offset as u64))?;
                let mut data = vec![0u8; count as usize];
                reader.read_exact(&mut data)?;
                list.push_nopad(
                    Segment::new(SegmentKind::TiffImageData { endian: self.endian }, offset, data)
                        .with_label("image data"),
                );
            }
        }
        Ok(())
    }

    /// Reads an entry's raw external bytes into a table segment
    fn read_table_segment(
        &self,
        reader: &mut dyn SeekableReader,
        entry: &TiffDirEntry,
        kind: SegmentKind,
        list: &mut SegmentList,
    ) -> WrapResult<()> {
        reader.seek(SeekFrom::Start(entry.offset_field() as u64))?;
        let mut data = vec![0u8; entry.data_size() as usize];
        reader.read_exact(&mut data)?;
        list.push_nopad(
            Segment::new(kind, entry.offset_field(), data)
                .with_label(tag_utils::get_tag_name(entry.tag())),
        );
        Ok(())
    }

    /// Reads an entry's values as a vector of 32-bit integers,
    /// following the offset field when the data is external
    fn read_numeric_vector(
        &self,
        reader: &mut dyn SeekableReader,
        entry: &TiffDirEntry,
    ) -> WrapResult<Vec<u32>> {
        let handler = self.byte_order_handler.as_ref().unwrap();
        let count = entry.count() as usize;

        if entry.data_size() <= 4 {
            return Ok(match entry.element_size() {
                2 => entry.two_shorts()[..count.min(2)].iter().map(|&v| v as u32).collect(),
                4 => vec![entry.long_value()],
                _ => entry.four_bytes()[..count.min(4)].iter().map(|&v| v as u32).collect(),
            });
        }

        reader.seek(SeekFrom::Start(entry.offset_field() as u64))?;
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            let value = match entry.element_size() {
                2 => handler.read_u16(reader)? as u32,
                4 => handler.read_u32(reader)?,
                other => {
                    return Err(WrapError::GenericError(format!(
                        "Cannot read numeric vector with element size {}", other
                    )))
                }
            };
            values.push(value);
        }
        Ok(values)
    }
}
