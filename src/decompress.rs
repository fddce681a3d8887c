use std::io;
use std::io::{BufReader, Cursor, Read, Take};
use std::mem;

/// The reader currently driving `Lexer` output.
///
/// This is a closed enum rather than a `Box<dyn Read>` because the chunk
/// loader must, at the end of a chunk, hand back the exact base reader `R`
/// it was given — trait objects erase that type. Each variant wraps
/// whatever adapter is needed to present that state's bytes as `Read`;
/// `Empty` is a placeholder used only while a transition is in progress
/// (see `Lexer::load_chunk`/`end_chunk`), and is never observed mid-call.
pub enum ActiveReader<R> {
    /// Reading record frames directly from the base reader, outside any
    /// chunk.
    Base(R),
    /// Reading an uncompressed chunk's records directly, bounded to the
    /// chunk's declared byte length.
    Uncompressed(Take<R>),
    /// Reading a zstd-compressed chunk's records.
    Zstd(zstd::stream::read::Decoder<'static, BufReader<Take<R>>>),
    /// Reading an lz4-compressed chunk's records.
    Lz4(lz4::Decoder<Take<R>>),
    /// Replaying a fully-buffered, CRC-validated chunk's decompressed
    /// bytes.
    Buffer(Cursor<Vec<u8>>),
    /// Transient placeholder used while swapping between the variants
    /// above. Reading from this variant is a bug.
    Empty,
}

impl<R: Read> Read for ActiveReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            ActiveReader::Base(r) => r.read(buf),
            ActiveReader::Uncompressed(r) => r.read(buf),
            ActiveReader::Zstd(r) => r.read(buf),
            ActiveReader::Lz4(r) => r.read(buf),
            ActiveReader::Buffer(r) => r.read(buf),
            ActiveReader::Empty => {
                Err(io::Error::new(io::ErrorKind::Other, "mcap: read from empty reader slot"))
            }
        }
    }
}

impl<R: Read> ActiveReader<R> {
    /// Takes the base reader back out, if that's the variant currently
    /// held. Used outside of chunks, where `Base` is the only valid state.
    pub fn into_base(self) -> Option<R> {
        match self {
            ActiveReader::Base(r) => Some(r),
            _ => None,
        }
    }

    /// Swaps in `Empty` and returns what was there before. Used to move the
    /// held reader out of `&mut self` without requiring `R: Default`.
    pub fn take(&mut self) -> ActiveReader<R> {
        mem::replace(self, ActiveReader::Empty)
    }
}

/// Wraps a bounded, uncompressed chunk body reader as the "none" codec.
pub fn wrap_none<R: Read>(r: Take<R>) -> ActiveReader<R> {
    ActiveReader::Uncompressed(r)
}

/// Constructs a fresh zstd decoder over a bounded chunk body reader.
///
/// A new decoder is constructed per chunk rather than reused, since
/// neither `zstd::stream::read::Decoder` nor `lz4::Decoder` exposes a safe
/// way to rebind an existing decoder to a new underlying reader.
pub fn wrap_zstd<R: Read>(r: Take<R>) -> io::Result<ActiveReader<R>> {
    let decoder = zstd::stream::read::Decoder::new(r)?;
    Ok(ActiveReader::Zstd(decoder))
}

/// Constructs a fresh lz4 decoder over a bounded chunk body reader.
pub fn wrap_lz4<R: Read>(r: Take<R>) -> io::Result<ActiveReader<R>> {
    let decoder = lz4::Decoder::new(r)?;
    Ok(ActiveReader::Lz4(decoder))
}

/// Reclaims the base reader from a finished, non-`Base`, non-`Buffer`
/// decompressing variant. `Buffer` never holds the base reader directly —
/// see `Lexer::paused_base`.
pub fn finish<R: Read>(active: ActiveReader<R>) -> io::Result<R> {
    match active {
        ActiveReader::Base(r) => Ok(r),
        ActiveReader::Uncompressed(r) => Ok(r.into_inner()),
        ActiveReader::Zstd(decoder) => {
            let buffered = decoder.finish();
            Ok(buffered.into_inner().into_inner())
        }
        ActiveReader::Lz4(decoder) => {
            let (r, result) = decoder.finish();
            result?;
            Ok(r.into_inner())
        }
        ActiveReader::Buffer(_) | ActiveReader::Empty => Err(io::Error::new(
            io::ErrorKind::Other,
            "mcap: cannot reclaim base reader from this state",
        )),
    }
}
