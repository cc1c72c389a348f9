//! Tests for the TIFF structure reader

extern crate std;

use std::io::Cursor;

use crate::segment::SegmentKind;
use crate::tiff::errors::WrapError;
use crate::tiff::reader::TiffReader;
use crate::utils::logger::Logger;

/// Builds a little-endian TIFF with two uncompressed strips and
/// external strip offset and bytecount tables
fn two_strip_tiff() -> std::vec::Vec<u8> {
    let mut bytes = std::vec::Vec::new();
    bytes.extend_from_slice(&[0x49, 0x49, 0x2A, 0x00]); // II header
    bytes.extend_from_slice(&8u32.to_le_bytes()); // first directory offset

    let entry = |bytes: &mut std::vec::Vec<u8>, tag: u16, datatype: u16, count: u32, value: u32| {
        bytes.extend_from_slice(&tag.to_le_bytes());
        bytes.extend_from_slice(&datatype.to_le_bytes());
        bytes.extend_from_slice(&count.to_le_bytes());
        bytes.extend_from_slice(&value.to_le_bytes());
    };

    // Directory at offset 8 with five entries
    bytes.extend_from_slice(&5u16.to_le_bytes());
    entry(&mut bytes, 256, 4, 1, 4); // ImageWidth
    entry(&mut bytes, 257, 4, 1, 2); // ImageLength
    entry(&mut bytes, 259, 3, 1, 1); // Compression: none
    entry(&mut bytes, 273, 4, 2, 74); // StripOffsets, external
    entry(&mut bytes, 279, 4, 2, 82); // StripByteCounts, external
    bytes.extend_from_slice(&0u32.to_le_bytes()); // next directory
    std::assert_eq!(bytes.len(), 74);

    // Strip offset table at 74, bytecount table at 82
    bytes.extend_from_slice(&90u32.to_le_bytes());
    bytes.extend_from_slice(&94u32.to_le_bytes());
    bytes.extend_from_slice(&4u32.to_le_bytes());
    bytes.extend_from_slice(&4u32.to_le_bytes());

    // Strip data at 90 and 94
    bytes.extend_from_slice(b"AAAA");
    bytes.extend_from_slice(b"BBBB");
    bytes
}

#[test]
fn reads_strip_tables_and_image_data() {
    let logger = Logger::new("test-reader.log").unwrap();
    let mut reader = TiffReader::new(&logger);
    let list = reader.read(&mut Cursor::new(two_strip_tiff())).unwrap();

    let kinds: std::vec::Vec<&str> = list.iter().map(|s| s.kind_name()).collect();
    std::assert_eq!(
        kinds,
        std::vec![
            "TiffHeader",
            "TiffDirectory",
            "OffsetTable",
            "BytecountTable",
            "TiffImageData",
            "TiffImageData"
        ]
    );

    let strips: std::vec::Vec<&crate::segment::Segment> = list
        .iter()
        .filter(|s| std::matches!(s.kind, SegmentKind::TiffImageData { .. }))
        .collect();
    std::assert_eq!(strips[0].offset, 90);
    std::assert_eq!(strips[0].data, b"AAAA");
    std::assert_eq!(strips[1].offset, 94);
    std::assert_eq!(strips[1].data, b"BBBB");
}

#[test]
fn directory_entries_survive_the_round_trip() {
    let logger = Logger::new("test-reader-dir.log").unwrap();
    let mut reader = TiffReader::new(&logger);
    let list = reader.read(&mut Cursor::new(two_strip_tiff())).unwrap();

    let directory = list
        .iter()
        .find(|s| std::matches!(s.kind, SegmentKind::TiffDirectory { .. }))
        .unwrap();
    match &directory.kind {
        SegmentKind::TiffDirectory { entries, next_dir_offset, .. } => {
            std::assert_eq!(entries.len(), 5);
            std::assert_eq!(entries[0].tag(), 256);
            std::assert_eq!(entries[0].long_value(), 4);
            std::assert_eq!(*next_dir_offset, 0);
        }
        _ => std::unreachable!(),
    }
    // The rebuilt directory payload matches the on-disk form
    std::assert_eq!(directory.data, &two_strip_tiff()[8..74]);
}

#[test]
fn bigtiff_version_is_rejected() {
    let logger = Logger::new("test-reader-bigtiff.log").unwrap();
    let mut bytes = std::vec![0x49, 0x49];
    bytes.extend_from_slice(&43u16.to_le_bytes());
    bytes.extend_from_slice(&[8, 0, 0, 0, 16, 0, 0, 0]);
    let mut reader = TiffReader::new(&logger);
    let result = reader.read(&mut Cursor::new(bytes));
    std::assert!(std::matches!(result, Err(WrapError::UnsupportedVersion(43))));
}
