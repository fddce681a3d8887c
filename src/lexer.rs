use std::io::{Read, Take};
use std::mem;

use crc32fast::Hasher as Crc32;
use log::{debug, trace, warn};

use crate::chunk::{self, ChunkHeader};
use crate::decompress::{self, ActiveReader};
use crate::error::{Error, Result};
use crate::frame::{self, op};
use crate::token::TokenKind;

const DEFAULT_MAX_RECORD_SIZE: u64 = 64 * 1024 * 1024;
const DEFAULT_MAX_DECOMPRESSED_CHUNK_SIZE: u64 = 768 * 1024 * 1024;

/// Configuration for a [`Lexer`].
///
/// Constructed with [`Options::new`] and customized with the `with_*`
/// builder methods, in the style of `LinearReaderOptions` from the
/// reference MCAP reader implementations.
#[derive(Clone, Debug)]
pub struct Options {
    skip_magic: bool,
    validate_crc: bool,
    emit_chunks: bool,
    emit_invalid_chunks: bool,
    max_record_size: u64,
    max_decompressed_chunk_size: u64,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            skip_magic: false,
            validate_crc: true,
            emit_chunks: false,
            emit_invalid_chunks: false,
            max_record_size: DEFAULT_MAX_RECORD_SIZE,
            max_decompressed_chunk_size: DEFAULT_MAX_DECOMPRESSED_CHUNK_SIZE,
        }
    }
}

impl Options {
    /// Returns the default configuration: magic bytes are verified, chunk
    /// CRCs are validated, chunks are transparently decompressed, and
    /// invalid chunks are reported as errors rather than emitted.
    pub fn new() -> Options {
        Options::default()
    }

    /// If set, the leading 8 magic bytes are assumed to have already been
    /// consumed by the caller (or skipped deliberately) and are not read or
    /// verified by [`Lexer::new`].
    pub fn with_skip_magic(mut self, yes: bool) -> Options {
        self.skip_magic = yes;
        self
    }

    /// If set, a chunk's decompressed bytes are checked against its
    /// declared CRC32 before its records are lexed. Mutually exclusive
    /// with `emit_chunks`, since chunks are never decompressed at all when
    /// `emit_chunks` is set.
    pub fn with_validate_crc(mut self, yes: bool) -> Options {
        self.validate_crc = yes;
        self
    }

    /// If set, chunk records are surfaced directly as
    /// `TokenKind::Chunk` tokens rather than being decompressed and
    /// descended into. The chunk loader (and so CRC validation) never
    /// runs in this mode.
    pub fn with_emit_chunks(mut self, yes: bool) -> Options {
        self.emit_chunks = yes;
        self
    }

    /// If set, a chunk that fails CRC validation is still surfaced as a
    /// `LexerOutcome::InvalidChunk` carrying the underlying error, rather
    /// than short-circuiting to `LexerOutcome::Error`. The caller can
    /// inspect the error and choose to keep lexing.
    pub fn with_emit_invalid_chunks(mut self, yes: bool) -> Options {
        self.emit_invalid_chunks = yes;
        self
    }

    /// Sets the maximum allowed length of a single record frame (chunk
    /// records included). Exceeding it is reported as
    /// `Error::RecordTooLarge`.
    pub fn with_max_record_size(mut self, max: u64) -> Options {
        self.max_record_size = max;
        self
    }

    /// Sets the maximum allowed uncompressed size of a chunk. Exceeding it
    /// is reported as `Error::ChunkTooLarge`.
    pub fn with_max_decompressed_chunk_size(mut self, max: u64) -> Options {
        self.max_decompressed_chunk_size = max;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.validate_crc && self.emit_chunks {
            return Err(Error::IncompatibleOptions);
        }
        Ok(())
    }
}

/// The result of one call to [`Lexer::next`].
pub enum LexerOutcome<'a> {
    /// A fully read record, classified by opcode. `body` borrows the
    /// caller-supplied scratch buffer passed to `next`.
    Token { kind: TokenKind, body: &'a [u8] },
    /// A structural error. The lexer should not be driven further after
    /// this is returned.
    Error(Error),
    /// A chunk failed CRC validation, but `Options::emit_invalid_chunks`
    /// was set so the lexer recovered and is positioned to continue
    /// reading the next top-level record.
    InvalidChunk(Error),
}

/// A streaming lexer over an MCAP byte stream.
///
/// `Lexer` wraps a `Read` implementation and produces a flat sequence of
/// record tokens, transparently descending into compressed chunk records
/// unless configured otherwise. See [`Lexer::next`].
pub struct Lexer<R> {
    active: ActiveReader<R>,
    in_chunk: bool,
    scratch: [u8; chunk::PREFIX_LEN],
    chunk_buf: Vec<u8>,
    paused_base: Option<R>,
    options: Options,
}

impl<R: Read> Lexer<R> {
    /// Creates a new lexer with default options, verifying the leading
    /// magic bytes.
    pub fn new(r: R) -> Result<Lexer<R>> {
        Lexer::with_options(r, Options::default())
    }

    /// Creates a new lexer with the given options.
    pub fn with_options(mut r: R, options: Options) -> Result<Lexer<R>> {
        options.validate()?;
        if !options.skip_magic {
            let mut magic = [0u8; frame::MAGIC.len()];
            r.read_exact(&mut magic).map_err(|e| {
                if e.kind() == std::io::ErrorKind::UnexpectedEof {
                    Error::BadMagic
                } else {
                    Error::Io(e)
                }
            })?;
            if &magic != frame::MAGIC {
                return Err(Error::BadMagic);
            }
        }
        Ok(Lexer {
            active: ActiveReader::Base(r),
            in_chunk: false,
            scratch: [0u8; chunk::PREFIX_LEN],
            chunk_buf: Vec::new(),
            paused_base: None,
            options,
        })
    }

    /// Reads the next token from the stream.
    ///
    /// `buf` is a caller-owned scratch buffer; it is resized to fit each
    /// record body, reusing its existing allocation when large enough.
    /// Returns `None` at a clean end of stream (outside a chunk). The
    /// borrowed body in `LexerOutcome::Token` is only valid until the next
    /// call to `next`.
    pub fn next<'a>(&mut self, buf: &'a mut Vec<u8>) -> Option<LexerOutcome<'a>> {
        loop {
            let frame = match frame::read_frame(&mut self.active) {
                Ok(Some(f)) => f,
                Ok(None) => {
                    if self.in_chunk {
                        match self.end_chunk() {
                            Ok(()) => continue,
                            Err(e) => return Some(LexerOutcome::Error(e)),
                        }
                    }
                    return None;
                }
                Err(e) => return Some(LexerOutcome::Error(Error::Io(e))),
            };
            trace!("mcap: frame opcode={:#04x} len={}", frame.opcode, frame.len);

            if frame.opcode == op::RESERVED {
                return Some(LexerOutcome::Error(Error::ReservedOpcode));
            }
            if frame.len > self.options.max_record_size {
                return Some(LexerOutcome::Error(Error::RecordTooLarge {
                    size: frame.len,
                    max: self.options.max_record_size,
                }));
            }

            if frame.opcode == op::CHUNK && !self.options.emit_chunks {
                if self.in_chunk {
                    return Some(LexerOutcome::Error(Error::NestedChunk));
                }
                match self.load_chunk(frame.len) {
                    Ok(LoadOutcome::Entered) => continue,
                    Ok(LoadOutcome::Invalid(e)) => return Some(LexerOutcome::InvalidChunk(e)),
                    Err(e) => return Some(LexerOutcome::Error(e)),
                }
            }

            if let Err(e) = ensure_capacity(buf, frame.len) {
                return Some(LexerOutcome::Error(e));
            }
            if let Err(e) = self.active.read_exact(&mut buf[..frame.len as usize]) {
                return Some(LexerOutcome::Error(Error::Io(e)));
            }

            let kind = match TokenKind::from_opcode(frame.opcode) {
                Some(kind) => kind,
                None => {
                    warn!("mcap: skipping unknown opcode {:#04x}", frame.opcode);
                    continue;
                }
            };
            return Some(LexerOutcome::Token { kind, body: &buf[..frame.len as usize] });
        }
    }

    fn load_chunk(&mut self, record_len: u64) -> Result<LoadOutcome> {
        let mut bounded = Read::take(self.active.take().into_base_checked()?, record_len);
        let header = match chunk::read_chunk_header(&mut bounded, &mut self.scratch) {
            Ok(h) => h,
            Err(e) => {
                drain(&mut bounded)?;
                self.active = ActiveReader::Base(bounded.into_inner());
                return Err(e);
            }
        };
        debug!(
            "mcap: entering chunk compression={:?} uncompressed_size={} records_len={}",
            header.compression, header.uncompressed_size, header.records_byte_length
        );

        if header.uncompressed_size > self.options.max_decompressed_chunk_size {
            let max = self.options.max_decompressed_chunk_size;
            return self.reject_chunk(
                bounded,
                Error::ChunkTooLarge { size: header.uncompressed_size, max },
            );
        }
        if !matches!(header.compression.as_str(), "" | "zstd" | "lz4") {
            return self.reject_chunk(
                bounded,
                Error::UnsupportedCompression { name: header.compression.clone() },
            );
        }

        // What `bounded` has left after the header, name, and
        // records-byte-length field is whatever the outer record framing
        // says is left — not necessarily `records_byte_length` itself, if
        // the two disagree. Check explicitly and re-bound to the declared
        // length rather than trusting the outer frame.
        let available = bounded.limit();
        if available != header.records_byte_length {
            return self.reject_chunk(
                bounded,
                Error::BadChunkLength { declared: header.records_byte_length, available },
            );
        }
        let body = Read::take(bounded.into_inner(), header.records_byte_length);

        if self.options.validate_crc {
            self.load_chunk_buffered(body, &header)
        } else {
            let reader = wrap_compression(body, &header.compression)?;
            self.active = reader;
            self.in_chunk = true;
            Ok(LoadOutcome::Entered)
        }
    }

    /// Drains the remainder of `bounded` (a reader over the chunk's full
    /// record length, still holding the base reader), restores
    /// `self.active` to it, and returns `err`. These failures are always
    /// hard errors: `emit_invalid_chunks` only changes the outcome for a
    /// chunk CRC mismatch, handled separately in `load_chunk_buffered`.
    fn reject_chunk(&mut self, mut bounded: Take<R>, err: Error) -> Result<LoadOutcome> {
        drain(&mut bounded)?;
        self.active = ActiveReader::Base(bounded.into_inner());
        Err(err)
    }

    fn load_chunk_buffered(
        &mut self,
        body: Take<R>,
        header: &ChunkHeader,
    ) -> Result<LoadOutcome> {
        let mut decoded = mem::take(&mut self.chunk_buf);
        decoded.clear();
        decoded.reserve(header.uncompressed_size as usize);

        let mut decompressing = wrap_compression(body, &header.compression)?;
        // Bounded to `uncompressed_size`: a decompressor that would yield
        // more than the chunk declares must not be allowed to keep filling
        // `decoded` past that point.
        (&mut decompressing).take(header.uncompressed_size).read_to_end(&mut decoded)?;
        let short_read = decoded.len() as u64 != header.uncompressed_size;
        let base = decompress::finish(decompressing)?;

        let mut hasher = Crc32::new();
        hasher.update(&decoded);
        let actual = hasher.finalize();
        if short_read || actual != header.uncompressed_crc {
            let err = Error::InvalidChunkCrc { expected: header.uncompressed_crc, actual };
            self.chunk_buf = decoded;
            self.active = ActiveReader::Base(base);
            return if self.options.emit_invalid_chunks {
                Ok(LoadOutcome::Invalid(err))
            } else {
                Err(err)
            };
        }

        self.paused_base = Some(base);
        self.active = ActiveReader::Buffer(std::io::Cursor::new(decoded));
        self.in_chunk = true;
        Ok(LoadOutcome::Entered)
    }

    fn end_chunk(&mut self) -> Result<()> {
        debug!("mcap: exiting chunk");
        self.in_chunk = false;
        let base = match self.paused_base.take() {
            Some(base) => base,
            None => decompress::finish(self.active.take())?,
        };
        self.active = ActiveReader::Base(base);
        Ok(())
    }
}

enum LoadOutcome {
    Entered,
    Invalid(Error),
}

trait IntoBaseChecked<R> {
    fn into_base_checked(self) -> Result<R>;
}

impl<R: Read> IntoBaseChecked<R> for ActiveReader<R> {
    fn into_base_checked(self) -> Result<R> {
        self.into_base()
            .ok_or_else(|| Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "mcap: chunk encountered while not reading from the base reader",
            )))
    }
}

fn wrap_compression<R: Read>(body: Take<R>, compression: &str) -> Result<ActiveReader<R>> {
    match compression {
        "" => Ok(decompress::wrap_none(body)),
        "zstd" => Ok(decompress::wrap_zstd(body)?),
        "lz4" => Ok(decompress::wrap_lz4(body)?),
        other => Err(Error::UnsupportedCompression { name: other.to_string() }),
    }
}

fn ensure_capacity(buf: &mut Vec<u8>, len: u64) -> Result<()> {
    let len = usize::try_from(len)
        .map_err(|_| Error::AllocationFailed { requested: len })?;
    if buf.len() < len {
        buf.try_reserve_exact(len - buf.len())
            .map_err(|_| Error::AllocationFailed { requested: len as u64 })?;
    }
    buf.resize(len, 0);
    Ok(())
}

fn drain<R: Read>(r: &mut R) -> Result<()> {
    std::io::copy(r, &mut std::io::sink())?;
    Ok(())
}
