//! File segments and the output layout plan
//!
//! A segment is the basic unit of file layout: a typed run of bytes with
//! an absolute offset and size. The JPEG parser produces segments when
//! reading, the planner synthesizes them when building the output. The
//! raw byte payload is the authoritative representation; derived fields
//! are cached projections of it.

pub mod sof;

use log::trace;

use crate::io::byte_order::{self, ByteOrder};
use crate::tiff::constants::header;
use crate::tiff::entry::TiffDirEntry;

pub use sof::{ComponentInfo, FrameInfo};

/// The kind of a file segment
///
/// JPEG kinds are always big-endian internally; TIFF kinds carry the
/// byte order of the file they belong to. Kinds that the planner
/// synthesizes keep their source values alongside so the payload can be
/// rebuilt after back-patching.
#[derive(Debug, Clone)]
pub enum SegmentKind {
    // JPEG family
    Soi,
    Eoi,
    RestartMarker,
    App0,
    App1,
    App2,
    App3,
    OtherApp,
    QuantizationTable,
    StartOfFrame,
    HuffmanTable,
    StartOfScan,
    ImageData,
    NumberOfLines,
    RestartInterval,
    Special,
    Comment,
    Reserved,
    Unknown,

    // TIFF family
    TiffHeader { endian: ByteOrder, dir_offset: u32 },
    TiffDirectory { endian: ByteOrder, entries: Vec<TiffDirEntry>, next_dir_offset: u32 },
    ByteVector { endian: ByteOrder },
    UShortVector { endian: ByteOrder, values: Vec<u16> },
    OffsetTable { endian: ByteOrder },
    BytecountTable { endian: ByteOrder },
    TiffImageData { endian: ByteOrder },

    /// One zero byte forcing the next segment to an even offset
    Padding,
}

/// A typed run of bytes at an absolute offset in a file
#[derive(Debug, Clone)]
pub struct Segment {
    pub kind: SegmentKind,
    pub offset: u32,
    pub size: u32,
    pub data: Vec<u8>,
    pub label: Option<String>,
}

impl Segment {
    /// Creates a segment from raw payload bytes
    pub fn new(kind: SegmentKind, offset: u32, data: Vec<u8>) -> Self {
        let size = data.len() as u32;
        Segment { kind, offset, size, data, label: None }
    }

    /// Creates a fresh start-of-image marker segment
    pub fn soi(offset: u32) -> Self {
        Segment::new(SegmentKind::Soi, offset, vec![0xFF, 0xD8])
    }

    /// Creates a fresh end-of-image marker segment
    pub fn eoi(offset: u32) -> Self {
        Segment::new(SegmentKind::Eoi, offset, vec![0xFF, 0xD9])
    }

    /// Creates a one-byte alignment padding segment
    pub fn padding(offset: u32) -> Self {
        Segment::new(SegmentKind::Padding, offset, vec![0u8])
    }

    /// Creates a TIFF header segment; the directory offset is
    /// back-patched by the planner once the main IFD position is known
    pub fn tiff_header(offset: u32, endian: ByteOrder) -> Self {
        let mut seg = Segment {
            kind: SegmentKind::TiffHeader { endian, dir_offset: 0 },
            offset,
            size: header::HEADER_SIZE,
            data: Vec::new(),
            label: None,
        };
        seg.rebuild_data();
        seg
    }

    /// Creates a TIFF directory segment from its entries
    pub fn tiff_directory(offset: u32, endian: ByteOrder, entries: Vec<TiffDirEntry>) -> Self {
        let mut seg = Segment {
            kind: SegmentKind::TiffDirectory { endian, entries, next_dir_offset: 0 },
            offset,
            size: 0,
            data: Vec::new(),
            label: None,
        };
        seg.rebuild_data();
        seg
    }

    /// Creates a raw byte vector segment
    pub fn byte_vector(offset: u32, endian: ByteOrder, bytes: Vec<u8>) -> Self {
        Segment::new(SegmentKind::ByteVector { endian }, offset, bytes)
    }

    /// Creates a vector of 16-bit values serialized in the file byte order
    pub fn ushort_vector(offset: u32, endian: ByteOrder, values: Vec<u16>) -> Self {
        let mut seg = Segment {
            kind: SegmentKind::UShortVector { endian, values },
            offset,
            size: 0,
            data: Vec::new(),
            label: None,
        };
        seg.rebuild_data();
        seg
    }

    /// Attaches a diagnostic label
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    /// Clones this segment, placing the copy at a new offset
    pub fn clone_at(&self, offset: u32) -> Self {
        let mut seg = self.clone();
        seg.offset = offset;
        seg
    }

    /// Offset of the first byte after this segment
    pub fn end_offset(&self) -> u32 {
        self.offset + self.size
    }

    /// The byte order that applies to this segment's scalar fields
    pub fn endianness(&self) -> ByteOrder {
        match &self.kind {
            SegmentKind::TiffHeader { endian, .. }
            | SegmentKind::TiffDirectory { endian, .. }
            | SegmentKind::ByteVector { endian }
            | SegmentKind::UShortVector { endian, .. }
            | SegmentKind::OffsetTable { endian }
            | SegmentKind::BytecountTable { endian }
            | SegmentKind::TiffImageData { endian } => *endian,
            SegmentKind::Padding => ByteOrder::LittleEndian,
            _ => ByteOrder::BigEndian, // JPEG is always big-endian
        }
    }

    /// Patches the directory offset of a TIFF header segment
    ///
    /// Must only be called on a `TiffHeader` segment.
    pub fn set_directory_offset(&mut self, offset: u32) {
        match &mut self.kind {
            SegmentKind::TiffHeader { dir_offset, .. } => *dir_offset = offset,
            _ => unreachable!("set_directory_offset on a non-header segment"),
        }
        self.rebuild_data();
    }

    /// Patches the next-directory offset of a TIFF directory segment
    ///
    /// Must only be called on a `TiffDirectory` segment.
    pub fn set_next_directory_offset(&mut self, offset: u32) {
        match &mut self.kind {
            SegmentKind::TiffDirectory { next_dir_offset, .. } => *next_dir_offset = offset,
            _ => unreachable!("set_next_directory_offset on a non-directory segment"),
        }
        self.rebuild_data();
    }

    /// Regenerates the payload of a synthesized segment from its kind
    /// fields; idempotent, and a no-op for kinds whose payload is the
    /// raw bytes themselves
    pub fn rebuild_data(&mut self) {
        let rebuilt = match &self.kind {
            SegmentKind::TiffHeader { endian, dir_offset } => {
                let mut data = match endian {
                    ByteOrder::LittleEndian => vec![0x49, 0x49, 0x2A, 0x00],
                    ByteOrder::BigEndian => vec![0x4D, 0x4D, 0x00, 0x2A],
                };
                let mut offset_bytes = [0u8; 4];
                byte_order::put_u32(&mut offset_bytes, *dir_offset, *endian);
                data.extend_from_slice(&offset_bytes);
                Some(data)
            }
            SegmentKind::TiffDirectory { endian, entries, next_dir_offset } => {
                let num_entries = entries.len();
                let mut data = vec![0u8; 6 + 12 * num_entries];
                byte_order::put_u16(&mut data[0..2], num_entries as u16, *endian);
                for (i, entry) in entries.iter().enumerate() {
                    entry.write_to(&mut data[2 + 12 * i..2 + 12 * (i + 1)]);
                }
                byte_order::put_u32(&mut data[2 + 12 * num_entries..], *next_dir_offset, *endian);
                Some(data)
            }
            SegmentKind::UShortVector { endian, values } => {
                let mut data = vec![0u8; 2 * values.len()];
                for (i, v) in values.iter().enumerate() {
                    byte_order::put_u16(&mut data[2 * i..2 * i + 2], *v, *endian);
                }
                Some(data)
            }
            _ => None,
        };
        if let Some(data) = rebuilt {
            self.size = data.len() as u32;
            self.data = data;
        }
    }

    /// Name of the segment kind for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            SegmentKind::Soi => "StartOfImage",
            SegmentKind::Eoi => "EndOfImage",
            SegmentKind::RestartMarker => "RestartMarker",
            SegmentKind::App0 => "App0",
            SegmentKind::App1 => "App1",
            SegmentKind::App2 => "App2",
            SegmentKind::App3 => "App3",
            SegmentKind::OtherApp => "OtherApp",
            SegmentKind::QuantizationTable => "QuantizationTable",
            SegmentKind::StartOfFrame => "StartOfFrame",
            SegmentKind::HuffmanTable => "HuffmanTable",
            SegmentKind::StartOfScan => "StartOfScan",
            SegmentKind::ImageData => "ImageData",
            SegmentKind::NumberOfLines => "NumberOfLines",
            SegmentKind::RestartInterval => "RestartInterval",
            SegmentKind::Special => "Special",
            SegmentKind::Comment => "Comment",
            SegmentKind::Reserved => "Reserved",
            SegmentKind::Unknown => "Unknown",
            SegmentKind::TiffHeader { .. } => "TiffHeader",
            SegmentKind::TiffDirectory { .. } => "TiffDirectory",
            SegmentKind::ByteVector { .. } => "ByteVector",
            SegmentKind::UShortVector { .. } => "UShortVector",
            SegmentKind::OffsetTable { .. } => "OffsetTable",
            SegmentKind::BytecountTable { .. } => "BytecountTable",
            SegmentKind::TiffImageData { .. } => "TiffImageData",
            SegmentKind::Padding => "Padding",
        }
    }
}

/// An append-only ordered list of segments: the layout plan of a file
///
/// After every append the next free offset equals the end offset of the
/// last segment; `push_padded` additionally appends a one-byte padding
/// segment when that offset is odd.
#[derive(Debug, Default)]
pub struct SegmentList {
    segments: Vec<Segment>,
}

impl SegmentList {
    /// Creates an empty list
    pub fn new() -> Self {
        SegmentList { segments: Vec::new() }
    }

    /// Appends a segment without alignment; returns the next free offset
    pub fn push_nopad(&mut self, segment: Segment) -> u32 {
        trace!("Appending {} at offset {} ({} bytes)",
               segment.kind_name(), segment.offset, segment.size);
        self.segments.push(segment);
        self.next_offset()
    }

    /// Appends a segment, then a padding byte if its end offset is odd;
    /// returns the next free offset
    pub fn push_padded(&mut self, segment: Segment) -> u32 {
        let end = segment.end_offset();
        self.push_nopad(segment);
        if end % 2 != 0 {
            self.segments.push(Segment::padding(end));
        }
        self.next_offset()
    }

    /// Offset of the first byte after the last segment (0 when empty)
    pub fn next_offset(&self) -> u32 {
        self.segments.last().map_or(0, Segment::end_offset)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    pub fn first(&self) -> Option<&Segment> {
        self.segments.first()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Mutable access for back-patching (the TIFF header offset)
    pub fn segments_mut(&mut self) -> &mut [Segment] {
        &mut self.segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_append_inserts_padding_after_odd_end() {
        let mut list = SegmentList::new();
        let seg = Segment::new(SegmentKind::Comment, 0, vec![0xFF, 0xFE, 0x00, 0x03, b'x']);
        let next = list.push_padded(seg);
        assert_eq!(next, 6);
        assert_eq!(list.len(), 2);
        assert!(matches!(list.segments()[1].kind, SegmentKind::Padding));
        assert_eq!(list.segments()[1].data, vec![0u8]);
    }

    #[test]
    fn padded_append_leaves_even_end_alone() {
        let mut list = SegmentList::new();
        let next = list.push_padded(Segment::soi(0));
        assert_eq!(next, 2);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn list_stays_contiguous() {
        let mut list = SegmentList::new();
        let mut offset = list.push_padded(Segment::soi(0));
        offset = list.push_padded(Segment::new(SegmentKind::Comment, offset, vec![0xFF, 0xFE, 0x00, 0x03, b'y']));
        list.push_nopad(Segment::eoi(offset));
        for pair in list.segments().windows(2) {
            assert_eq!(pair[0].end_offset(), pair[1].offset);
        }
    }

    #[test]
    fn header_rebuild_is_idempotent() {
        let mut header = Segment::tiff_header(0, ByteOrder::LittleEndian);
        header.set_directory_offset(0x1234);
        let first = header.data.clone();
        header.rebuild_data();
        assert_eq!(header.data, first);
        assert_eq!(header.data[..4], [0x49, 0x49, 0x2A, 0x00]);
        assert_eq!(header.data[4..], [0x34, 0x12, 0x00, 0x00]);
    }
}
