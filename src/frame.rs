use std::io;
use std::io::Read;

use byteorder::{ByteOrder, LittleEndian};

/// The eight magic bytes that must begin every MCAP file.
pub const MAGIC: &[u8; 8] = b"\x89MCAP0\r\n";

/// The length, in bytes, of a record frame's fixed prefix: one opcode byte
/// followed by an 8-byte little-endian record length.
pub const FRAME_LEN: usize = 9;

/// Record opcodes, as they appear on the wire.
pub mod op {
    pub const HEADER: u8 = 0x01;
    pub const FOOTER: u8 = 0x02;
    pub const SCHEMA: u8 = 0x03;
    pub const CHANNEL: u8 = 0x04;
    pub const MESSAGE: u8 = 0x05;
    pub const CHUNK: u8 = 0x06;
    pub const MESSAGE_INDEX: u8 = 0x07;
    pub const CHUNK_INDEX: u8 = 0x08;
    pub const ATTACHMENT: u8 = 0x09;
    pub const ATTACHMENT_INDEX: u8 = 0x0A;
    pub const STATISTICS: u8 = 0x0B;
    pub const METADATA: u8 = 0x0C;
    pub const METADATA_INDEX: u8 = 0x0D;
    pub const SUMMARY_OFFSET: u8 = 0x0E;
    pub const DATA_END: u8 = 0x0F;
    /// Opcode zero is reserved by the format and never valid.
    pub const RESERVED: u8 = 0x00;
}

/// A decoded record frame prefix: an opcode and the length of the record
/// body that follows it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    pub opcode: u8,
    pub len: u64,
}

/// Reads one record frame prefix from `r`.
///
/// Returns `Ok(None)` if `r` is at EOF with nothing read at all (a clean
/// end of stream). Returns `Err` if EOF is hit partway through the 9-byte
/// prefix, since that indicates a truncated stream rather than a clean
/// boundary.
pub fn read_frame<R: Read>(r: &mut R) -> io::Result<Option<Frame>> {
    let mut buf = [0u8; FRAME_LEN];
    if !read_exact_eof(r, &mut buf)? {
        return Ok(None);
    }
    let opcode = buf[0];
    let len = LittleEndian::read_u64(&buf[1..9]);
    Ok(Some(Frame { opcode, len }))
}

/// Like `Read::read_exact`, except that an EOF occurring before any bytes
/// are read is reported by returning `Ok(false)` rather than an error. An
/// EOF occurring after some (but not all) of `buf` has been filled is still
/// a genuine `UnexpectedEof` error, since the caller is in the middle of a
/// fixed-size structure at that point.
fn read_exact_eof<R: Read>(r: &mut R, mut buf: &mut [u8]) -> io::Result<bool> {
    let mut read_any = false;
    while !buf.is_empty() {
        match r.read(buf) {
            Ok(0) => break,
            Ok(n) => {
                read_any = true;
                let tmp = buf;
                buf = &mut tmp[n..];
            }
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    if !buf.is_empty() {
        if !read_any {
            return Ok(false);
        }
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "failed to fill whole buffer",
        ));
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_a_normal_frame() {
        let mut buf = vec![op::HEADER];
        buf.extend_from_slice(&11u64.to_le_bytes());
        let mut cur = Cursor::new(buf);
        let frame = read_frame(&mut cur).unwrap().unwrap();
        assert_eq!(frame, Frame { opcode: op::HEADER, len: 11 });
    }

    #[test]
    fn immediate_eof_is_clean() {
        let mut cur = Cursor::new(Vec::<u8>::new());
        assert_eq!(read_frame(&mut cur).unwrap(), None);
    }

    #[test]
    fn partial_prefix_is_an_error() {
        let mut cur = Cursor::new(vec![op::HEADER, 1, 2, 3]);
        assert!(read_frame(&mut cur).is_err());
    }
}
