//! JPEG marker constants and classification

use crate::segment::SegmentKind;

// Markers without a length field
pub const MARKER_PREFIX: u8 = 0xFF;
pub const SOI: u8 = 0xD8; // Start of image
pub const EOI: u8 = 0xD9; // End of image
pub const RST0: u8 = 0xD0; // First restart marker
pub const RST7: u8 = 0xD7; // Last restart marker

// Length-prefixed markers
pub const SOF0: u8 = 0xC0; // Baseline DCT start of frame
pub const DHT: u8 = 0xC4; // Huffman table
pub const DQT: u8 = 0xDB; // Quantization table
pub const SOS: u8 = 0xDA; // Start of scan
pub const APP1: u8 = 0xE1; // Exif, XMP
pub const APP2: u8 = 0xE2; // Usually ICC profile

/// Classifies a length-prefixed marker byte into a segment kind
///
/// SOI, EOI, and the restart markers carry no length and are handled by
/// the parser before classification.
pub fn classify(marker: u8) -> SegmentKind {
    match marker {
        0xC4 => SegmentKind::HuffmanTable,
        0xCC => SegmentKind::Special, // arithmetic conditioning
        0xC8 => SegmentKind::Reserved,
        0xC0..=0xCF => SegmentKind::StartOfFrame,
        0xDA => SegmentKind::StartOfScan,
        0xDB => SegmentKind::QuantizationTable,
        0xDC => SegmentKind::NumberOfLines,
        0xDD => SegmentKind::RestartInterval,
        0xDE | 0xDF => SegmentKind::Special, // hierarchical progression, expand reference
        0xE0 => SegmentKind::App0,
        0xE1 => SegmentKind::App1,
        0xE2 => SegmentKind::App2,
        0xE3 => SegmentKind::App3,
        0xE4..=0xEF => SegmentKind::OtherApp,
        0xFE => SegmentKind::Comment,
        0x01 | 0x02..=0xBF | 0xF0..=0xFD => SegmentKind::Reserved,
        _ => SegmentKind::Unknown,
    }
}
