use std::io::Read;

use byteorder::{ByteOrder, LittleEndian};

use crate::error::Result;

/// The length, in bytes, of a chunk record's fixed-width prefix (everything
/// before the variable-length compression name and the records payload).
pub const PREFIX_LEN: usize = 32;

/// The fixed-width fields at the start of a chunk record body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkHeader {
    pub message_start_time: u64,
    pub message_end_time: u64,
    pub uncompressed_size: u64,
    pub uncompressed_crc: u32,
    pub compression: String,
    pub records_byte_length: u64,
}

/// Reads a chunk record's header: the 32-byte fixed prefix, the
/// variable-length compression name, and the 8-byte records-byte-length
/// that follows it. `scratch` is reused across calls to avoid a fresh
/// allocation per chunk for the fixed-width portion.
pub fn read_chunk_header<R: Read>(r: &mut R, scratch: &mut [u8; PREFIX_LEN]) -> Result<ChunkHeader> {
    r.read_exact(scratch)?;
    let message_start_time = LittleEndian::read_u64(&scratch[0..8]);
    let message_end_time = LittleEndian::read_u64(&scratch[8..16]);
    let uncompressed_size = LittleEndian::read_u64(&scratch[16..24]);
    let uncompressed_crc = LittleEndian::read_u32(&scratch[24..28]);
    let name_len = LittleEndian::read_u32(&scratch[28..32]) as usize;

    let mut name_buf = vec![0u8; name_len];
    r.read_exact(&mut name_buf)?;
    let compression = String::from_utf8_lossy(&name_buf).into_owned();

    let mut len_buf = [0u8; 8];
    r.read_exact(&mut len_buf)?;
    let records_byte_length = LittleEndian::read_u64(&len_buf);

    Ok(ChunkHeader {
        message_start_time,
        message_end_time,
        uncompressed_size,
        uncompressed_crc,
        compression,
        records_byte_length,
    })
}
