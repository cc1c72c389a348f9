//! TIFF directory entries
//!
//! A TIFF directory entry is a fixed 12-byte record: a two-byte tag, a
//! two-byte datatype, a four-byte data count, and a four-byte field that
//! holds either the data itself (when it fits) or an offset to external
//! storage. The four value bytes are kept exactly as they appear in the
//! file, so interpreting them needs both the file byte order and the
//! storage logic of the entry. Each constructor pins down one storage
//! logic; reading a value through a different logic is a programming
//! error.

use log::warn;

use crate::io::byte_order::{self, ByteOrder};
use crate::tiff::constants::{field_types, tags};
use crate::tiff::errors::{WrapError, WrapResult};

/// How the four value bytes of an entry are to be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageLogic {
    /// Up to four raw bytes, byte order irrelevant per element
    ByteData,
    /// One or two 16-bit integers, swapped per element
    ShortData,
    /// A single 32-bit integer, swapped as a whole
    LongData,
    /// A file offset to external data
    OffsetData,
}

/// Returns the size in bytes of one element of a TIFF datatype,
/// or 0 for an unknown datatype code
pub fn datatype_length(datatype: u16) -> u32 {
    match datatype {
        field_types::BYTE | field_types::ASCII | field_types::SBYTE | field_types::UNDEFINED => 1,
        field_types::SHORT | field_types::SSHORT => 2,
        field_types::LONG | field_types::SLONG | field_types::FLOAT => 4,
        field_types::RATIONAL | field_types::SRATIONAL | field_types::DOUBLE => 8,
        _ => 0,
    }
}

/// A single 12-byte IFD record
#[derive(Debug, Clone)]
pub struct TiffDirEntry {
    endian: ByteOrder,
    tag: u16,
    datatype: u16,
    count: u32,
    value_bytes: [u8; 4],
    storage: StorageLogic,
}

impl TiffDirEntry {
    /// Creates an entry holding a single inline 32-bit value
    pub fn from_long(tag: u16, datatype: u16, count: u32, value: u32, e: ByteOrder) -> Self {
        debug_assert!(datatype_length(datatype) == 4 && count == 1);
        let mut value_bytes = [0u8; 4];
        byte_order::put_u32(&mut value_bytes, value, e);
        TiffDirEntry { endian: e, tag, datatype, count, value_bytes, storage: StorageLogic::LongData }
    }

    /// Creates an entry whose value field is an offset to external data
    pub fn from_offset(tag: u16, datatype: u16, count: u32, offset: u32, e: ByteOrder) -> Self {
        debug_assert!(count * datatype_length(datatype) >= 4);
        let mut value_bytes = [0u8; 4];
        byte_order::put_u32(&mut value_bytes, offset, e);
        TiffDirEntry { endian: e, tag, datatype, count, value_bytes, storage: StorageLogic::OffsetData }
    }

    /// Creates an entry holding one or two inline 16-bit values
    pub fn from_shorts(tag: u16, datatype: u16, count: u32, values: [u16; 2], e: ByteOrder) -> Self {
        debug_assert!(datatype_length(datatype) == 2 && (count == 1 || count == 2));
        let mut value_bytes = [0u8; 4];
        byte_order::put_u16(&mut value_bytes[0..2], values[0], e);
        byte_order::put_u16(&mut value_bytes[2..4], values[1], e);
        TiffDirEntry { endian: e, tag, datatype, count, value_bytes, storage: StorageLogic::ShortData }
    }

    /// Creates an entry holding up to four inline bytes
    pub fn from_bytes(tag: u16, datatype: u16, count: u32, values: [u8; 4], e: ByteOrder) -> Self {
        TiffDirEntry { endian: e, tag, datatype, count, value_bytes: values, storage: StorageLogic::ByteData }
    }

    /// Parses an entry from a 12-byte memory slice in the given byte order
    ///
    /// The storage logic is derived from the declared data size, with one
    /// special rule: a four-byte ExifIFD or GPSIFD value is an offset to
    /// a sub-directory, not a plain integer.
    pub fn from_memory(mem: &[u8], e: ByteOrder) -> WrapResult<Self> {
        let tag = byte_order::get_u16(&mem[0..2], e);
        let datatype = byte_order::get_u16(&mem[2..4], e);
        let count = byte_order::get_u32(&mem[4..8], e);
        let value_bytes = [mem[8], mem[9], mem[10], mem[11]];

        let element_size = datatype_length(datatype);
        let data_size = element_size as u64 * count as u64;
        let storage = if data_size > 4 {
            StorageLogic::OffsetData
        } else {
            match element_size {
                4 => {
                    if tag == tags::EXIF_IFD || tag == tags::GPS_IFD {
                        StorageLogic::OffsetData
                    } else {
                        StorageLogic::LongData
                    }
                }
                2 => StorageLogic::ShortData,
                1 => StorageLogic::ByteData,
                _ => {
                    warn!("Illegal datatype {} for tag {}", datatype, tag);
                    return Err(WrapError::GenericError(format!(
                        "Illegal TIFF datatype {} in directory entry (tag {})",
                        datatype, tag
                    )));
                }
            }
        };

        Ok(TiffDirEntry { endian: e, tag, datatype, count, value_bytes, storage })
    }

    /// Writes the 12-byte record into a memory slice in this entry's byte order
    pub fn write_to(&self, mem: &mut [u8]) {
        byte_order::put_u16(&mut mem[0..2], self.tag, self.endian);
        byte_order::put_u16(&mut mem[2..4], self.datatype, self.endian);
        byte_order::put_u32(&mut mem[4..8], self.count, self.endian);
        mem[8..12].copy_from_slice(&self.value_bytes);
    }

    pub fn tag(&self) -> u16 {
        self.tag
    }

    pub fn datatype(&self) -> u16 {
        self.datatype
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Total declared size of the entry's data in bytes
    pub fn data_size(&self) -> u32 {
        self.count.saturating_mul(datatype_length(self.datatype))
    }

    /// Size of one element of the entry's datatype
    pub fn element_size(&self) -> u32 {
        datatype_length(self.datatype)
    }

    pub fn storage(&self) -> StorageLogic {
        self.storage
    }

    /// Byte order the value bytes are stored in
    pub fn endianness(&self) -> ByteOrder {
        self.endian
    }

    /// The value field interpreted as a file offset
    pub fn offset_field(&self) -> u32 {
        debug_assert_eq!(self.storage, StorageLogic::OffsetData);
        byte_order::get_u32(&self.value_bytes, self.endian)
    }

    /// The value field interpreted as a single 32-bit integer
    pub fn long_value(&self) -> u32 {
        debug_assert_eq!(self.storage, StorageLogic::LongData);
        byte_order::get_u32(&self.value_bytes, self.endian)
    }

    /// The value field interpreted as two 16-bit integers
    pub fn two_shorts(&self) -> [u16; 2] {
        debug_assert_eq!(self.storage, StorageLogic::ShortData);
        [
            byte_order::get_u16(&self.value_bytes[0..2], self.endian),
            byte_order::get_u16(&self.value_bytes[2..4], self.endian),
        ]
    }

    /// The literal four value bytes
    pub fn four_bytes(&self) -> [u8; 4] {
        self.value_bytes
    }

    /// The value field as an integer regardless of short/long storage
    pub fn integer_value(&self) -> u32 {
        match self.storage {
            StorageLogic::ShortData => self.two_shorts()[0] as u32,
            _ => byte_order::get_u32(&self.value_bytes, self.endian),
        }
    }
}
