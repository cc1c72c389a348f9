//! ICC profile reassembly
//!
//! A valid ICC chunk is an APP2 segment of the form
//! `FF E2 <len> ICC_PROFILE 0x00 <chunk_no> <num_chunks> <data...>`
//! where `len` is big-endian and excludes the two marker bytes,
//! `chunk_no` is 1-based and `num_chunks` is the total number of chunks
//! that together make up the profile.

use log::{debug, warn};

use crate::io::byte_order::{self, ByteOrder};
use crate::tiff::errors::{WrapError, WrapResult};

/// Signature following the segment length: "ICC_PROFILE" plus terminator
const ICC_SIGNATURE: &[u8; 12] = b"ICC_PROFILE\0";

/// Offset of the first profile byte within a chunk:
/// marker + length (4) + signature (12) + chunk_no + num_chunks (2)
const ICC_HEADER_SIZE: usize = 18;

/// Checks whether an APP2 payload is an ICC profile chunk
fn valid_icc_chunk(data: &[u8]) -> bool {
    if data.len() < ICC_HEADER_SIZE + 1 {
        return false;
    }
    if data[0] != 0xFF || data[1] != 0xE2 {
        warn!("APP2 payload without its marker bytes");
        return false;
    }
    let declared = byte_order::get_u16(&data[2..4], ByteOrder::BigEndian) as usize;
    if declared + 2 != data.len() {
        warn!("APP2 length field {} does not match segment size {}", declared, data.len());
        return false;
    }
    data[4..16] == ICC_SIGNATURE[..]
}

/// Reassembles an ICC profile from APP2 payloads in file order
///
/// Chunks are concatenated in chunk-index order. All chunks must agree
/// on the total count, each index may appear only once, and no index
/// may be missing. Returns an empty vector when no ICC chunk is
/// present.
pub fn read_icc_profile(payloads: &[&[u8]]) -> WrapResult<Vec<u8>> {
    let mut num_chunks: u8 = 0;
    let mut chunks: Vec<Option<Vec<u8>>> = Vec::new();

    for payload in payloads {
        if !valid_icc_chunk(payload) {
            continue;
        }
        let chunk_no = payload[16];
        let declared_chunks = payload[17];

        if num_chunks == 0 {
            num_chunks = declared_chunks;
            chunks.resize(num_chunks as usize, None);
        } else if num_chunks != declared_chunks {
            return Err(WrapError::IccInconsistent {
                expected: num_chunks,
                found: declared_chunks,
            });
        }

        if chunk_no < 1 || chunk_no > num_chunks {
            return Err(WrapError::IccBadIndex { chunk_no, num_chunks });
        }
        let slot = &mut chunks[chunk_no as usize - 1];
        if slot.is_some() {
            return Err(WrapError::IccBadIndex { chunk_no, num_chunks });
        }
        debug!("ICC chunk {} of {}: {} profile bytes",
               chunk_no, num_chunks, payload.len() - ICC_HEADER_SIZE);
        *slot = Some(payload[ICC_HEADER_SIZE..].to_vec());
    }

    let mut profile = Vec::new();
    for (index, chunk) in chunks.into_iter().enumerate() {
        match chunk {
            Some(bytes) => profile.extend_from_slice(&bytes),
            None => return Err(WrapError::IccMissingChunk(index as u8 + 1)),
        }
    }
    Ok(profile)
}
