use std::fmt;
use std::io;
use std::result;

/// A convenient type alias for `Result<T, mcap_lexer::Error>`.
pub type Result<T> = result::Result<T, Error>;

/// `Error` describes all the possible errors that may occur while lexing an
/// MCAP byte stream.
///
/// `From<Error> for io::Error` is provided so that lexer errors compose with
/// other `std::io::Read`-based tooling without an extra conversion step.
#[derive(Debug)]
pub enum Error {
    /// The leading magic bytes were absent or did not match.
    BadMagic,
    /// A chunk opcode was encountered while already inside a chunk.
    NestedChunk,
    /// A chunk's declared uncompressed size exceeded the configured cap.
    ChunkTooLarge {
        /// The declared uncompressed size.
        size: u64,
        /// The configured maximum.
        max: u64,
    },
    /// A record frame declared a length exceeding the configured cap.
    RecordTooLarge {
        /// The declared record length.
        size: u64,
        /// The configured maximum.
        max: u64,
    },
    /// A chunk's uncompressed bytes did not match its declared CRC32.
    InvalidChunkCrc {
        /// The CRC32 recorded in the chunk record.
        expected: u32,
        /// The CRC32 computed over the decompressed bytes.
        actual: u32,
    },
    /// The chunk's compression name was not `""`, `"zstd"`, or `"lz4"`.
    UnsupportedCompression {
        /// The compression name read from the chunk record.
        name: String,
    },
    /// A chunk's declared `records_byte_length` did not match the number of
    /// bytes actually remaining in the chunk record after its header.
    BadChunkLength {
        /// The `records_byte_length` field read from the chunk record.
        declared: u64,
        /// The number of bytes actually left in the chunk record.
        available: u64,
    },
    /// Opcode zero was encountered. Opcode zero is reserved and always an
    /// error.
    ReservedOpcode,
    /// `validate_crc` and `emit_chunks` were both set. These are mutually
    /// exclusive: under `emit_chunks` the chunk loader (and so CRC
    /// validation) is never invoked at all.
    IncompatibleOptions,
    /// A buffer could not be grown to the requested size.
    AllocationFailed {
        /// The size that allocation was attempted for.
        requested: u64,
    },
    /// An I/O error from the underlying reader, or a structural problem the
    /// standard library itself reports as an `io::Error` (an unexpected EOF
    /// mid-frame, for instance).
    Io(io::Error),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        match err {
            Error::Io(err) => err,
            other => io::Error::new(io::ErrorKind::Other, other),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BadMagic => write!(f, "mcap: bad or missing magic bytes"),
            Error::NestedChunk => {
                write!(f, "mcap: chunk opcode encountered while already inside a chunk")
            }
            Error::ChunkTooLarge { size, max } => write!(
                f,
                "mcap: chunk uncompressed size {} exceeds configured maximum {}",
                size, max
            ),
            Error::RecordTooLarge { size, max } => write!(
                f,
                "mcap: record length {} exceeds configured maximum {}",
                size, max
            ),
            Error::InvalidChunkCrc { expected, actual } => write!(
                f,
                "mcap: chunk CRC32 mismatch (expected {:#010x}, got {:#010x})",
                expected, actual
            ),
            Error::UnsupportedCompression { name } => {
                write!(f, "mcap: unsupported chunk compression {:?}", name)
            }
            Error::BadChunkLength { declared, available } => write!(
                f,
                "mcap: chunk records_byte_length {} does not match the {} bytes remaining in the record",
                declared, available
            ),
            Error::ReservedOpcode => write!(f, "mcap: reserved opcode 0 encountered"),
            Error::IncompatibleOptions => write!(
                f,
                "mcap: validate_crc and emit_chunks cannot both be enabled"
            ),
            Error::AllocationFailed { requested } => {
                write!(f, "mcap: failed to allocate a buffer of {} bytes", requested)
            }
            Error::Io(err) => write!(f, "mcap: {}", err),
        }
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Error) -> bool {
        use Error::*;
        match (self, other) {
            (BadMagic, BadMagic) => true,
            (NestedChunk, NestedChunk) => true,
            (ChunkTooLarge { size: s1, max: m1 }, ChunkTooLarge { size: s2, max: m2 }) => {
                (s1, m1) == (s2, m2)
            }
            (RecordTooLarge { size: s1, max: m1 }, RecordTooLarge { size: s2, max: m2 }) => {
                (s1, m1) == (s2, m2)
            }
            (
                InvalidChunkCrc { expected: e1, actual: a1 },
                InvalidChunkCrc { expected: e2, actual: a2 },
            ) => (e1, a1) == (e2, a2),
            (UnsupportedCompression { name: n1 }, UnsupportedCompression { name: n2 }) => {
                n1 == n2
            }
            (
                BadChunkLength { declared: d1, available: a1 },
                BadChunkLength { declared: d2, available: a2 },
            ) => (d1, a1) == (d2, a2),
            (ReservedOpcode, ReservedOpcode) => true,
            (IncompatibleOptions, IncompatibleOptions) => true,
            (AllocationFailed { requested: r1 }, AllocationFailed { requested: r2 }) => r1 == r2,
            (Io(e1), Io(e2)) => e1.kind() == e2.kind(),
            _ => false,
        }
    }
}

impl Eq for Error {}
