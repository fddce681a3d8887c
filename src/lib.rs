//! A streaming lexer for the MCAP container format.
//!
//! `mcap-lexer` reads an [`std::io::Read`] of MCAP bytes and produces a flat
//! stream of typed, framed record tokens via [`Lexer::next`], transparently
//! descending into compressed chunk records along the way. It does not
//! interpret record bodies beyond the 9-byte frame prefix, does not support
//! seeking or random access, and does not write MCAP files — see the
//! crate's README for the full list of what is and isn't in scope.
//!
//! ```no_run
//! use mcap_lexer::{Lexer, LexerOutcome};
//!
//! # fn run(reader: impl std::io::Read) -> mcap_lexer::Result<()> {
//! let mut lexer = Lexer::new(reader)?;
//! let mut buf = Vec::new();
//! while let Some(outcome) = lexer.next(&mut buf) {
//!     match outcome {
//!         LexerOutcome::Token { kind, body } => {
//!             println!("{:?}: {} bytes", kind, body.len());
//!         }
//!         LexerOutcome::InvalidChunk(err) => eprintln!("skipped bad chunk: {}", err),
//!         LexerOutcome::Error(err) => return Err(err),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

extern crate byteorder;
extern crate crc32fast;
extern crate lz4;
extern crate log;
extern crate zstd;
#[cfg(test)]
extern crate quickcheck;
#[cfg(test)]
extern crate rand;

mod chunk;
mod decompress;
mod error;
mod frame;
mod lexer;
mod token;

pub use crate::error::{Error, Result};
pub use crate::frame::MAGIC;
pub use crate::lexer::{Lexer, LexerOutcome, Options};
pub use crate::token::TokenKind;
