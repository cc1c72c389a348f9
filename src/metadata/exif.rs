//! Exif APP1 parsing
//!
//! A valid Exif APP1 segment carries `FF E1 <len> "Exif" 0x00 0x00`
//! followed by a complete little TIFF world: a byte order mark, the
//! offset of the 0th IFD, and a chain of directories. The main
//! directory can reference an Exif sub-IFD and a GPS sub-IFD. Entries
//! whose data does not fit in the four-byte value field point at
//! external bytes inside the same payload; those bytes are captured in
//! the source byte order and converted later by the planner.

use log::{debug, warn};

use crate::io::byte_order::{self, ByteOrder};
use crate::tiff::constants::tags;
use crate::tiff::entry::TiffDirEntry;
use crate::tiff::errors::{WrapError, WrapResult};

/// Offset of the byte order mark within an Exif APP1 payload:
/// marker + length (4) + "Exif\0\0" (6)
const BOM_OFFSET: usize = 10;

/// A directory entry together with its captured external bytes
/// (empty when the value is stored inline)
pub type DirectoryInfo = Vec<(TiffDirEntry, Vec<u8>)>;

/// Metadata extracted from the Exif APP1 segments of a file
#[derive(Debug)]
pub struct ExifInfo {
    /// Byte order declared inside the Exif payload
    pub endianness: ByteOrder,
    /// Entries of the main (0th) directory
    pub main_dir: DirectoryInfo,
    /// Entries of the Exif sub-IFD
    pub exif_dir: DirectoryInfo,
    /// Entries of the GPS sub-IFD
    pub gps_dir: DirectoryInfo,
}

impl Default for ExifInfo {
    fn default() -> Self {
        ExifInfo {
            endianness: ByteOrder::LittleEndian,
            main_dir: Vec::new(),
            exif_dir: Vec::new(),
            gps_dir: Vec::new(),
        }
    }
}

/// Checks whether an APP1 payload is a valid Exif block
fn valid_exif_payload(data: &[u8]) -> bool {
    // Header, BOM, directory offset, plus at least one byte of content
    if data.len() < BOM_OFFSET + 4 + 4 + 1 {
        return false;
    }
    if data[0] != 0xFF || data[1] != 0xE1 {
        warn!("APP1 payload without its marker bytes");
        return false;
    }
    let declared = byte_order::get_u16(&data[2..4], ByteOrder::BigEndian) as usize;
    if declared + 2 != data.len() {
        warn!("APP1 length field {} does not match segment size {}", declared, data.len());
        return false;
    }
    if &data[4..10] != b"Exif\0\0" {
        return false;
    }
    let bom = &data[BOM_OFFSET..BOM_OFFSET + 4];
    bom == [0x49, 0x49, 0x2A, 0x00] || bom == [0x4D, 0x4D, 0x00, 0x2A]
}

/// Parses one TIFF directory at `offset` within `memory`
///
/// `memory` must start at the byte order mark so that all stored
/// offsets correspond to slice indices. Entries with more than four
/// bytes of data capture their external bytes when they lie inside the
/// payload; otherwise the capture is left empty and a warning is
/// logged.
pub fn read_directory(memory: &[u8], offset: u32, e: ByteOrder) -> WrapResult<DirectoryInfo> {
    let offset = offset as usize;
    if offset + 2 > memory.len() {
        return Err(WrapError::UnexpectedEof);
    }
    let num_entries = byte_order::get_u16(&memory[offset..], e) as usize;
    if offset + 2 + 12 * num_entries > memory.len() {
        return Err(WrapError::UnexpectedEof);
    }

    let mut directory = Vec::with_capacity(num_entries);
    for i in 0..num_entries {
        let record = &memory[offset + 2 + 12 * i..offset + 2 + 12 * (i + 1)];
        let entry = TiffDirEntry::from_memory(record, e)?;

        let mut external = Vec::new();
        let data_size = entry.data_size() as usize;
        if data_size > 4 {
            let data_offset = entry.offset_field() as usize;
            if data_offset + data_size <= memory.len() {
                external = memory[data_offset..data_offset + data_size].to_vec();
            } else {
                warn!("Entry for tag {} points outside the Exif payload ({} + {} > {})",
                      entry.tag(), data_offset, data_size, memory.len());
            }
        }
        directory.push((entry, external));
    }
    Ok(directory)
}

/// Returns the offset field of the entry with the given tag, or 0
fn find_offset(directory: &DirectoryInfo, tag: u16) -> u32 {
    directory
        .iter()
        .find(|(entry, _)| entry.tag() == tag)
        .map_or(0, |(entry, _)| entry.offset_field())
}

/// Extracts Exif metadata from APP1 payloads in file order
///
/// Every valid Exif payload is parsed; when several are present the
/// later ones overwrite the earlier results.
pub fn read_app1_metadata(payloads: &[&[u8]]) -> WrapResult<ExifInfo> {
    let mut metadata = ExifInfo::default();

    for payload in payloads {
        if !valid_exif_payload(payload) {
            continue;
        }

        metadata.endianness = if payload[BOM_OFFSET] == 0x49 {
            ByteOrder::LittleEndian
        } else {
            ByteOrder::BigEndian
        };
        debug!("Exif block is {}", metadata.endianness.name());

        // All directory offsets are measured from the byte order mark
        let tiff_block = &payload[BOM_OFFSET..];
        let dir_offset = byte_order::get_u32(&payload[BOM_OFFSET + 4..], metadata.endianness);

        // The offset must leave room for a directory with one entry
        // (2 + 12 + 4 bytes), measured against the whole segment
        if dir_offset as usize + 18 >= payload.len() {
            return Err(WrapError::InvalidIfdOffset(dir_offset));
        }

        metadata.main_dir = read_directory(tiff_block, dir_offset, metadata.endianness)?;

        let exif_dir_offset = find_offset(&metadata.main_dir, tags::EXIF_IFD);
        if exif_dir_offset != 0 {
            metadata.exif_dir = read_directory(tiff_block, exif_dir_offset, metadata.endianness)?;
        }

        let gps_dir_offset = find_offset(&metadata.main_dir, tags::GPS_IFD);
        if gps_dir_offset != 0 {
            metadata.gps_dir = read_directory(tiff_block, gps_dir_offset, metadata.endianness)?;
        }
    }
    Ok(metadata)
}
