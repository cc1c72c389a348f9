//! End-to-end tests for the rewrap pipeline

extern crate std;

use std::io::Cursor;

use tiffwrap::io::byte_order::{get_u16, get_u32, ByteOrder};
use tiffwrap::jpeg::JpegParser;
use tiffwrap::segment::SegmentList;
use tiffwrap::tiff::{TiffPlanner, TiffWriter, WrapError};
use tiffwrap::utils::logger::Logger;
use tiffwrap::TiffWrap;

const LE: ByteOrder = ByteOrder::LittleEndian;

// ---------------------------------------------------------------------
//              Synthetic input builders
// ---------------------------------------------------------------------

/// Builds a JPEG stream: SOI, app segments, DQT, SOF, DHT, SOS,
/// ten bytes of entropy data, EOI
fn build_jpeg(components: &[(u8, u8, u8)], app_segments: &[Vec<u8>], sof_marker: u8) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8];
    for app in app_segments {
        bytes.extend_from_slice(app);
    }
    bytes.extend_from_slice(&[0xFF, 0xDB, 0x00, 0x06, 0x00, 0x01, 0x02, 0x03]); // DQT

    let sof_length = (8 + 3 * components.len()) as u16;
    bytes.extend_from_slice(&[0xFF, sof_marker]);
    bytes.extend_from_slice(&sof_length.to_be_bytes());
    bytes.push(8); // precision
    bytes.extend_from_slice(&8u16.to_be_bytes()); // lines
    bytes.extend_from_slice(&8u16.to_be_bytes()); // width
    bytes.push(components.len() as u8);
    for &(id, sampling, quant) in components {
        bytes.push(id);
        bytes.push(sampling);
        bytes.push(quant);
    }

    bytes.extend_from_slice(&[0xFF, 0xC4, 0x00, 0x05, 0x10, 0x01, 0x02]); // DHT
    bytes.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]); // SOS
    bytes.extend_from_slice(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A]);
    bytes.extend_from_slice(&[0xFF, 0xD9]);
    bytes
}

fn gray_components() -> Vec<(u8, u8, u8)> {
    vec![(1, 0x11, 0)]
}

fn push_u16(bytes: &mut Vec<u8>, value: u16, e: ByteOrder) {
    match e {
        ByteOrder::LittleEndian => bytes.extend_from_slice(&value.to_le_bytes()),
        ByteOrder::BigEndian => bytes.extend_from_slice(&value.to_be_bytes()),
    }
}

fn push_u32(bytes: &mut Vec<u8>, value: u32, e: ByteOrder) {
    match e {
        ByteOrder::LittleEndian => bytes.extend_from_slice(&value.to_le_bytes()),
        ByteOrder::BigEndian => bytes.extend_from_slice(&value.to_be_bytes()),
    }
}

fn push_entry(bytes: &mut Vec<u8>, tag: u16, datatype: u16, count: u32, value: [u8; 4], e: ByteOrder) {
    push_u16(bytes, tag, e);
    push_u16(bytes, datatype, e);
    push_u32(bytes, count, e);
    bytes.extend_from_slice(&value);
}

fn value_u32(value: u32, e: ByteOrder) -> [u8; 4] {
    match e {
        ByteOrder::LittleEndian => value.to_le_bytes(),
        ByteOrder::BigEndian => value.to_be_bytes(),
    }
}

fn value_u16(value: u16, e: ByteOrder) -> [u8; 4] {
    let mut out = [0u8; 4];
    match e {
        ByteOrder::LittleEndian => out[0..2].copy_from_slice(&value.to_le_bytes()),
        ByteOrder::BigEndian => out[0..2].copy_from_slice(&value.to_be_bytes()),
    }
    out
}

/// Wraps a TIFF block into an Exif APP1 segment
fn app1_from_tiff_block(block: &[u8]) -> Vec<u8> {
    let mut payload = vec![0xFF, 0xE1];
    payload.extend_from_slice(&((2 + 6 + block.len()) as u16).to_be_bytes());
    payload.extend_from_slice(b"Exif\0\0");
    payload.extend_from_slice(block);
    payload
}

/// Builds an Exif APP1 with Orientation in the main directory and an
/// Exif sub-IFD holding one external rational (1/8)
fn exif_with_rational(e: ByteOrder) -> Vec<u8> {
    let mut block = Vec::new();
    match e {
        ByteOrder::LittleEndian => block.extend_from_slice(&[0x49, 0x49, 0x2A, 0x00]),
        ByteOrder::BigEndian => block.extend_from_slice(&[0x4D, 0x4D, 0x00, 0x2A]),
    }
    push_u32(&mut block, 8, e); // 0th IFD offset

    // Main directory: Orientation + ExifIFD link
    push_u16(&mut block, 2, e);
    push_entry(&mut block, 274, 3, 1, value_u16(1, e), e);
    push_entry(&mut block, 34665, 4, 1, value_u32(38, e), e);
    push_u32(&mut block, 0, e);
    assert_eq!(block.len(), 38);

    // Exif sub-IFD: ExposureTime, rational, external at offset 56
    push_u16(&mut block, 1, e);
    push_entry(&mut block, 33434, 5, 1, value_u32(56, e), e);
    push_u32(&mut block, 0, e);
    assert_eq!(block.len(), 56);

    push_u32(&mut block, 1, e); // numerator
    push_u32(&mut block, 8, e); // denominator

    app1_from_tiff_block(&block)
}

/// Builds an Exif APP1 whose main directory exercises the main-dir
/// selector: Ascii entries and Orientation pass, SubIFDs does not
fn exif_with_main_dir_tags() -> Vec<u8> {
    let mut block = Vec::new();
    block.extend_from_slice(&[0x49, 0x49, 0x2A, 0x00]);
    push_u32(&mut block, 8, LE);

    push_u16(&mut block, 5, LE);
    push_entry(&mut block, 315, 2, 6, value_u32(74, LE), LE); // Artist, external
    push_entry(&mut block, 274, 3, 1, value_u16(6, LE), LE); // Orientation
    push_entry(&mut block, 330, 4, 1, value_u32(999, LE), LE); // SubIFDs
    push_entry(&mut block, 270, 2, 4, [b'p', b'i', b'c', 0], LE); // ImageDescription, inline
    push_entry(&mut block, 271, 2, 8, value_u32(80, LE), LE); // Make, external
    push_u32(&mut block, 0, LE);
    assert_eq!(block.len(), 74);

    block.extend_from_slice(b"Ansel\0"); // Artist data
    assert_eq!(block.len(), 80);
    block.extend_from_slice(b"CamCo 1\0"); // Make data

    app1_from_tiff_block(&block)
}

/// Builds one APP2 ICC chunk
fn icc_chunk(chunk_no: u8, num_chunks: u8, data: &[u8]) -> Vec<u8> {
    let mut chunk = vec![0xFF, 0xE2];
    chunk.extend_from_slice(&((16 + data.len()) as u16).to_be_bytes());
    chunk.extend_from_slice(b"ICC_PROFILE\0");
    chunk.push(chunk_no);
    chunk.push(num_chunks);
    chunk.extend_from_slice(data);
    chunk
}

// ---------------------------------------------------------------------
//              Pipeline and output inspection helpers
// ---------------------------------------------------------------------

fn run_pipeline(jpeg: Vec<u8>, logger: &Logger) -> Result<Vec<u8>, WrapError> {
    let parser = JpegParser::new(logger);
    let length = jpeg.len() as u32;
    let mut cursor = Cursor::new(jpeg);
    let mut source = SegmentList::new();
    parser.parse(&mut cursor, 0, length, &mut source)?;

    let plan = TiffPlanner::new(logger).plan(&source)?;
    let mut output = Vec::new();
    TiffWriter::write(&plan, &mut output)?;
    Ok(output)
}

#[derive(Debug, Clone, Copy)]
struct RawEntry {
    tag: u16,
    datatype: u16,
    count: u32,
    value: [u8; 4],
}

impl RawEntry {
    fn value_u32(&self) -> u32 {
        get_u32(&self.value, LE)
    }

    fn value_u16(&self) -> u16 {
        get_u16(&self.value, LE)
    }
}

/// Reads the IFD at the given offset of a little-endian TIFF output
fn read_ifd(output: &[u8], offset: u32) -> Vec<RawEntry> {
    let offset = offset as usize;
    let count = get_u16(&output[offset..], LE) as usize;
    let mut entries = Vec::with_capacity(count);
    for i in 0..count {
        let record = &output[offset + 2 + 12 * i..offset + 2 + 12 * (i + 1)];
        entries.push(RawEntry {
            tag: get_u16(&record[0..2], LE),
            datatype: get_u16(&record[2..4], LE),
            count: get_u32(&record[4..8], LE),
            value: [record[8], record[9], record[10], record[11]],
        });
    }
    entries
}

fn read_main_ifd(output: &[u8]) -> Vec<RawEntry> {
    assert_eq!(&output[0..4], &[0x49, 0x49, 0x2A, 0x00]);
    let dir_offset = get_u32(&output[4..8], LE);
    read_ifd(output, dir_offset)
}

fn find(entries: &[RawEntry], tag: u16) -> RawEntry {
    *entries
        .iter()
        .find(|e| e.tag == tag)
        .unwrap_or_else(|| panic!("tag {} not found", tag))
}

// ---------------------------------------------------------------------
//              Scenarios
// ---------------------------------------------------------------------

#[test]
fn minimal_grayscale_jpeg_rewraps_to_tiff() {
    let logger = Logger::new("it-gray.log").unwrap();
    let output = run_pipeline(build_jpeg(&gray_components(), &[], 0xC0), &logger).unwrap();
    let entries = read_main_ifd(&output);

    assert_eq!(find(&entries, 259).value_u16(), 7); // Compression: JPEG
    assert_eq!(find(&entries, 262).value_u16(), 1); // MinIsBlack
    assert_eq!(find(&entries, 277).value_u16(), 1); // SamplesPerPixel
    assert_eq!(find(&entries, 258).value_u16(), 8); // BitsPerSample inline
    assert_eq!(find(&entries, 256).value_u32(), 8); // ImageWidth
    assert_eq!(find(&entries, 257).value_u32(), 8); // ImageLength

    // The strip is an SOI..EOI JPEG directly after the header
    let strip_offset = find(&entries, 273).value_u32();
    let strip_count = find(&entries, 279).value_u32();
    assert_eq!(strip_offset, 8);
    assert_eq!(&output[strip_offset as usize..strip_offset as usize + 2], &[0xFF, 0xD8]);

    // The entropy-coded bytes are carried verbatim
    let strip = &output[strip_offset as usize..(strip_offset + strip_count) as usize];
    let entropy: &[u8] = &[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A];
    assert!(strip.windows(entropy.len()).any(|w| w == entropy));

    // The JPEG tables stream follows the strip: SOI, DQT, DHT, EOI
    let tables = find(&entries, 347);
    assert_eq!(tables.datatype, 7); // Undefined
    let start = tables.value_u32() as usize;
    let end = start + tables.count as usize;
    assert_eq!(tables.value_u32(), strip_offset + strip_count);
    assert_eq!(&output[start..start + 2], &[0xFF, 0xD8]);
    assert_eq!(&output[start + 2..start + 4], &[0xFF, 0xDB]);
    assert_eq!(&output[end - 2..end], &[0xFF, 0xD9]);

    // Main IFD tag ids strictly increase
    for pair in entries.windows(2) {
        assert!(pair[0].tag < pair[1].tag);
    }
}

#[test]
fn ycbcr_420_jpeg_gets_subsampling_tags() {
    let logger = Logger::new("it-ycbcr.log").unwrap();
    let components = vec![(1, 0x22, 0), (2, 0x11, 1), (3, 0x11, 1)];
    let output = run_pipeline(build_jpeg(&components, &[], 0xC0), &logger).unwrap();
    let entries = read_main_ifd(&output);

    assert_eq!(find(&entries, 262).value_u16(), 6); // YCbCr
    assert_eq!(find(&entries, 277).value_u16(), 3);

    let subsampling = find(&entries, 530);
    assert_eq!(subsampling.count, 2);
    assert_eq!(get_u16(&subsampling.value[0..2], LE), 2);
    assert_eq!(get_u16(&subsampling.value[2..4], LE), 2);

    // BitsPerSample stored externally as [8, 8, 8]
    let bits = find(&entries, 258);
    assert_eq!(bits.count, 3);
    let at = bits.value_u32() as usize;
    assert_eq!(get_u16(&output[at..], LE), 8);
    assert_eq!(get_u16(&output[at + 2..], LE), 8);
    assert_eq!(get_u16(&output[at + 4..], LE), 8);
}

#[test]
fn invalid_chroma_sampling_aborts_the_pipeline() {
    let logger = Logger::new("it-badsampling.log").unwrap();
    let components = vec![(1, 0x11, 0), (2, 0x21, 1), (3, 0x11, 1)];
    let result = run_pipeline(build_jpeg(&components, &[], 0xC0), &logger);
    assert!(matches!(result, Err(WrapError::IllegalSubsampling)));
}

#[test]
fn exif_and_icc_metadata_are_carried_over() {
    let logger = Logger::new("it-exif-icc.log").unwrap();
    let apps = vec![
        exif_with_rational(LE),
        icc_chunk(1, 2, b"ICCA"),
        icc_chunk(2, 2, b"BCDE"),
    ];
    let output = run_pipeline(build_jpeg(&gray_components(), &apps, 0xC0), &logger).unwrap();
    let entries = read_main_ifd(&output);

    // The reassembled profile is written once
    let icc = find(&entries, 34675);
    assert_eq!(icc.datatype, 7);
    let icc_at = icc.value_u32() as usize;
    assert_eq!(&output[icc_at..icc_at + 8], b"ICCABCDE");

    // Orientation was copied into the main directory
    assert_eq!(find(&entries, 274).value_u16(), 1);

    // The Exif sub-IFD holds the rewritten rational entry
    let exif_ifd = find(&entries, 34665);
    let sub_entries = read_ifd(&output, exif_ifd.value_u32());
    let exposure = find(&sub_entries, 33434);
    assert_eq!(exposure.datatype, 5);
    let at = exposure.value_u32() as usize;
    assert_eq!(get_u32(&output[at..], LE), 1);
    assert_eq!(get_u32(&output[at + 4..], LE), 8);

    // Sub-IFD terminates the chain
    let sub_offset = exif_ifd.value_u32() as usize;
    let sub_count = get_u16(&output[sub_offset..], LE) as usize;
    let next = get_u32(&output[sub_offset + 2 + 12 * sub_count..], LE);
    assert_eq!(next, 0);
}

#[test]
fn big_endian_rationals_swap_as_two_longs() {
    let logger = Logger::new("it-exif-be.log").unwrap();
    let apps = vec![exif_with_rational(ByteOrder::BigEndian)];
    let output = run_pipeline(build_jpeg(&gray_components(), &apps, 0xC0), &logger).unwrap();
    let entries = read_main_ifd(&output);

    let exif_ifd = find(&entries, 34665);
    let sub_entries = read_ifd(&output, exif_ifd.value_u32());
    let exposure = find(&sub_entries, 33434);
    let at = exposure.value_u32() as usize;

    // Each 4-byte half reversed independently: the pair reads correctly
    // as little-endian longs (whole-8-byte reversal would swap them)
    assert_eq!(&output[at..at + 8], &[1, 0, 0, 0, 8, 0, 0, 0]);
}

#[test]
fn main_directory_tags_are_filtered() {
    let logger = Logger::new("it-maindir.log").unwrap();
    let apps = vec![exif_with_main_dir_tags()];
    let output = run_pipeline(build_jpeg(&gray_components(), &apps, 0xC0), &logger).unwrap();
    let entries = read_main_ifd(&output);

    // Ascii entries and Orientation survive
    let artist = find(&entries, 315);
    let artist_at = artist.value_u32() as usize;
    assert_eq!(&output[artist_at..artist_at + 6], b"Ansel\0");

    assert_eq!(find(&entries, 274).value_u16(), 6);
    assert_eq!(&find(&entries, 270).value, b"pic\0");

    let make = find(&entries, 271);
    let make_at = make.value_u32() as usize;
    assert_eq!(&output[make_at..make_at + 8], b"CamCo 1\0");

    // SubIFDs is dropped
    assert!(entries.iter().all(|e| e.tag != 330));
}

#[test]
fn progressive_jpeg_is_rejected() {
    let logger = Logger::new("it-progressive.log").unwrap();
    let result = run_pipeline(build_jpeg(&gray_components(), &[], 0xC2), &logger);
    assert!(matches!(result, Err(WrapError::UnsupportedFrame(0xC2))));
}

#[test]
fn convert_and_analyze_round_trip_on_disk() {
    let dir = std::env::temp_dir().join("tiffwrap-it");
    std::fs::create_dir_all(&dir).unwrap();
    let input = dir.join("sample.jpg");
    let jpeg = build_jpeg(&gray_components(), &[], 0xC0);
    // The format sniffer requires a JFIF or Exif APP segment up front
    let mut with_app0 = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, 0x01, 0x02];
    with_app0.extend_from_slice(&jpeg[2..]);
    std::fs::write(&input, &with_app0).unwrap();

    let api = TiffWrap::new(Some(dir.join("api.log").to_str().unwrap())).unwrap();
    let output_path = dir.join("sample.tif");
    let _ = std::fs::remove_file(&output_path);
    let written = api
        .convert(input.to_str().unwrap(), Some(output_path.to_str().unwrap()))
        .unwrap();
    assert_eq!(written, output_path.to_str().unwrap());

    let output = std::fs::read(&output_path).unwrap();
    let entries = read_main_ifd(&output);
    assert_eq!(find(&entries, 259).value_u16(), 7);

    // The analyzer reads our own output back, including the embedded JPEG
    let summary = api.analyze(output_path.to_str().unwrap()).unwrap();
    assert!(summary.contains("TiffHeader"));
    assert!(summary.contains("TiffDirectory"));
    assert!(summary.contains("StartOfImage"));
    assert!(summary.contains("QuantizationTable"));
}
