//! Low-level IO support
//!
//! This module contains the seekable reader abstraction and all
//! byte-order aware encoding and decoding primitives.

pub mod seekable;
pub mod byte_order;

pub use seekable::SeekableReader;
pub use byte_order::{ByteOrder, ByteOrderHandler, BigEndianHandler, LittleEndianHandler};
