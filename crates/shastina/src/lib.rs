//! Tokenizer and block reader for the Shastina metalanguage.
//!
//! Shastina source is a byte stream built from atomic punctuation,
//! bar-terminated simple tokens, quoted and curly string literals, embedded
//! data markers, and the terminal `|;` token. This crate turns that stream
//! into *blocks* — token bytes or decoded string payloads — with precise
//! line numbers and a latched error status.
//!
//! The pipeline has three layers:
//!
//! 1. [`InputFilter`] wraps a [`ByteSource`], strips an optional UTF-8 byte
//!    order mark, normalizes every line-ending flavor to a single LF, counts
//!    lines, and offers one byte of pushback.
//! 2. [`BlockReader::read_token`] scans one token into the block buffer,
//!    classifying bytes by the Shastina character classes.
//! 3. [`BlockReader::read_string`] decodes a string literal through a
//!    caller-supplied [`DecodingMap`] into *entity codes*, then encodes each
//!    entity into output bytes via an [`EncodingTable`] or one of the fixed
//!    Unicode transforms of [`OutputOverride`].
//!
//! ```rust
//! use shastina::{BlockReader, InputFilter, SliceSource, TokenKind};
//!
//! let mut filter = InputFilter::new(SliceSource::new(b"begin %x; |;\n"));
//! let mut block = BlockReader::new();
//!
//! block.read_token(&mut filter).unwrap();
//! assert_eq!(block.as_bytes(), b"begin");
//! assert_eq!(block.line(), 1);
//!
//! block.read_token(&mut filter).unwrap();
//! assert_eq!(block.as_bytes(), b"%");
//!
//! block.read_token(&mut filter).unwrap();
//! block.read_token(&mut filter).unwrap();
//! block.read_token(&mut filter).unwrap();
//! assert_eq!(TokenKind::classify(block.as_bytes()), TokenKind::Final);
//! ```
//!
//! The crate is `no_std` (with `alloc`) and performs no I/O of its own; the
//! [`ByteSource`] trait is the entire input surface.

#![no_std]
#![allow(missing_docs)]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod buffer;
mod scratch;

mod block;
mod decode;
mod encode;
mod error;
mod filter;
mod source;
mod token;

#[cfg(test)]
mod tests;

pub use block::{BlockReader, StringKind, StringSpec};
pub use buffer::MAX_BUFFER;
pub use decode::DecodingMap;
pub use encode::{EncodingTable, MAX_UNICODE, OutputOverride};
pub use error::{Error, ErrorKind};
pub use filter::{InputFilter, StreamError};
pub use scratch::MIN_SCRATCH;
pub use source::{ByteSource, SliceSource, SourceByte};
pub use token::TokenKind;
