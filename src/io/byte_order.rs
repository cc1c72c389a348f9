//! Byte order handling
//!
//! This module implements the Strategy pattern for reading scalars in
//! either byte order from a stream, plus the slice-level codecs used
//! when interpreting and building in-memory structures. Every byte-swap
//! decision in the crate reduces to a call into this module.

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::io::Result;

use crate::io::seekable::SeekableReader;
use crate::tiff::errors::{WrapError, WrapResult};

/// Represents the byte order of a TIFF file or embedded Exif block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian byte order (II)
    LittleEndian,
    /// Big-endian byte order (MM)
    BigEndian,
}

impl ByteOrder {
    /// Detects the byte order from a TIFF header
    pub fn detect(reader: &mut dyn SeekableReader) -> WrapResult<Self> {
        let marker = reader.read_u16::<LittleEndian>()?;
        match marker {
            0x4949 => Ok(ByteOrder::LittleEndian), // "II" (Intel)
            0x4D4D => Ok(ByteOrder::BigEndian),    // "MM" (Motorola)
            _ => Err(WrapError::InvalidByteOrder(marker)),
        }
    }

    /// Returns a string representation of this byte order
    pub fn name(&self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "Little Endian (II)",
            ByteOrder::BigEndian => "Big Endian (MM)",
        }
    }

    /// Creates the appropriate handler for this byte order
    pub fn create_handler(&self) -> Box<dyn ByteOrderHandler> {
        match self {
            ByteOrder::LittleEndian => Box::new(LittleEndianHandler),
            ByteOrder::BigEndian => Box::new(BigEndianHandler),
        }
    }
}

/// Returns the byte order of the machine we are running on
pub fn native_order() -> ByteOrder {
    if cfg!(target_endian = "big") {
        ByteOrder::BigEndian
    } else {
        ByteOrder::LittleEndian
    }
}

/// Trait for byte order handling strategies over a stream
pub trait ByteOrderHandler: Send + Sync {
    /// Read a u16 value
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16>;

    /// Read a u32 value
    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32>;
}

/// Little-endian byte order handler
pub struct LittleEndianHandler;

impl ByteOrderHandler for LittleEndianHandler {
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<LittleEndian>()
    }

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<LittleEndian>()
    }
}

/// Big-endian byte order handler
pub struct BigEndianHandler;

impl ByteOrderHandler for BigEndianHandler {
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<BigEndian>()
    }

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<BigEndian>()
    }
}

/// Reads a u16 from the start of a slice in the given byte order
pub fn get_u16(mem: &[u8], e: ByteOrder) -> u16 {
    let bytes = [mem[0], mem[1]];
    match e {
        ByteOrder::LittleEndian => u16::from_le_bytes(bytes),
        ByteOrder::BigEndian => u16::from_be_bytes(bytes),
    }
}

/// Reads a u32 from the start of a slice in the given byte order
pub fn get_u32(mem: &[u8], e: ByteOrder) -> u32 {
    let bytes = [mem[0], mem[1], mem[2], mem[3]];
    match e {
        ByteOrder::LittleEndian => u32::from_le_bytes(bytes),
        ByteOrder::BigEndian => u32::from_be_bytes(bytes),
    }
}

/// Reads an i16 from the start of a slice in the given byte order
pub fn get_i16(mem: &[u8], e: ByteOrder) -> i16 {
    get_u16(mem, e) as i16
}

/// Reads an i32 from the start of a slice in the given byte order
pub fn get_i32(mem: &[u8], e: ByteOrder) -> i32 {
    get_u32(mem, e) as i32
}

/// Writes a u16 to the start of a slice in the given byte order
pub fn put_u16(mem: &mut [u8], value: u16, e: ByteOrder) {
    let bytes = match e {
        ByteOrder::LittleEndian => value.to_le_bytes(),
        ByteOrder::BigEndian => value.to_be_bytes(),
    };
    mem[..2].copy_from_slice(&bytes);
}

/// Writes a u32 to the start of a slice in the given byte order
pub fn put_u32(mem: &mut [u8], value: u32, e: ByteOrder) {
    let bytes = match e {
        ByteOrder::LittleEndian => value.to_le_bytes(),
        ByteOrder::BigEndian => value.to_be_bytes(),
    };
    mem[..4].copy_from_slice(&bytes);
}

/// Copies an array of fixed-size elements, reversing the bytes of each
/// element when the requested byte order differs from the native one
///
/// # Arguments
/// * `dst` - Destination slice, at least `num_elements * element_size` bytes
/// * `src` - Source slice of the same minimum length
/// * `num_elements` - Number of elements to copy
/// * `element_size` - Size of each element in bytes
/// * `e` - The byte order the destination should be in
pub fn binary_copy(dst: &mut [u8], src: &[u8], num_elements: usize, element_size: usize, e: ByteOrder) {
    let total = num_elements * element_size;
    if e == native_order() || element_size == 1 {
        dst[..total].copy_from_slice(&src[..total]);
        return;
    }
    for i in (0..total).step_by(element_size) {
        for j in 0..element_size {
            dst[i + j] = src[i + element_size - j - 1];
        }
    }
}

/// Returns a copy of `data` with the bytes of every element reversed
///
/// Used when converting external Exif data between the source and the
/// target file byte order. Rational values (8 bytes) must be passed with
/// an element size of 4 so that numerator and denominator reverse
/// independently.
pub fn swap_element_order(data: &[u8], element_size: usize) -> Vec<u8> {
    if element_size == 1 {
        return data.to_vec();
    }
    let mut out = vec![0u8; data.len()];
    for i in (0..data.len()).step_by(element_size) {
        for j in 0..element_size {
            out[i + j] = data[i + element_size - j - 1];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn detect_little_endian() {
        let mut cursor = Cursor::new(vec![0x49, 0x49]);
        assert_eq!(ByteOrder::detect(&mut cursor).unwrap(), ByteOrder::LittleEndian);
    }

    #[test]
    fn detect_big_endian() {
        let mut cursor = Cursor::new(vec![0x4D, 0x4D]);
        assert_eq!(ByteOrder::detect(&mut cursor).unwrap(), ByteOrder::BigEndian);
    }

    #[test]
    fn detect_invalid_marker() {
        let mut cursor = Cursor::new(vec![0x12, 0x34]);
        assert!(ByteOrder::detect(&mut cursor).is_err());
    }

    #[test]
    fn slice_codecs_round_trip() {
        let mut buffer = [0u8; 4];
        put_u16(&mut buffer, 0x1234, ByteOrder::BigEndian);
        assert_eq!(buffer[0], 0x12);
        assert_eq!(get_u16(&buffer, ByteOrder::BigEndian), 0x1234);

        put_u32(&mut buffer, 0xCAFEBABE, ByteOrder::LittleEndian);
        assert_eq!(buffer[0], 0xBE);
        assert_eq!(get_u32(&buffer, ByteOrder::LittleEndian), 0xCAFEBABE);
    }

    #[test]
    fn binary_copy_twice_is_identity() {
        let src: Vec<u8> = (0u8..32).collect();
        for &element_size in &[1usize, 2, 4, 8] {
            let n = src.len() / element_size;
            let mut once = vec![0u8; src.len()];
            let mut twice = vec![0u8; src.len()];
            binary_copy(&mut once, &src, n, element_size, ByteOrder::BigEndian);
            binary_copy(&mut twice, &once, n, element_size, ByteOrder::BigEndian);
            assert_eq!(twice, src);
        }
    }

    #[test]
    fn swap_rational_halves_independently() {
        // One rational: numerator 1, denominator 2, big-endian source
        let data = [0u8, 0, 0, 1, 0, 0, 0, 2];
        let swapped = swap_element_order(&data, 4);
        assert_eq!(swapped, [1, 0, 0, 0, 2, 0, 0, 0]);
        // Distinct from whole-element reversal whenever numerator != denominator
        let whole = swap_element_order(&data, 8);
        assert_ne!(swapped, whole);
        // Double application is the identity
        assert_eq!(swap_element_order(&swapped, 4), data.to_vec());
    }

    #[test]
    fn swap_single_bytes_is_copy() {
        let data = [1u8, 2, 3];
        assert_eq!(swap_element_order(&data, 1), data.to_vec());
    }
}
