//! The block reader: token scanner, string readers, and the latched-status
//! façade over one output buffer.

use core::ffi::CStr;
use core::fmt;

use bstr::ByteSlice;

use crate::buffer::BlockBuffer;
use crate::decode::{DecodingMap, Walker};
use crate::encode::{EncodingTable, OutputOverride, encode_entity};
use crate::error::{Error, ErrorKind};
use crate::filter::{InputFilter, StreamError};
use crate::scratch::ScratchBuffer;
use crate::source::ByteSource;

/// The three string literal delimiters of Shastina.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StringKind {
    /// `"..."`, closed by an unescaped double quote.
    DoubleQuote,
    /// `'...'`, closed by an unescaped apostrophe.
    Apostrophe,
    /// `{...}`, closed when unescaped curly nesting returns to zero.
    Curly,
}

/// Everything a string read needs besides the input: the literal kind, the
/// output override and surrogate policy, and the two caller-supplied
/// translation callbacks.
///
/// The callbacks are borrowed for a single [`BlockReader::read_string`]
/// call; the reader keeps nothing across calls.
pub struct StringSpec<'a, M: ?Sized, T: ?Sized> {
    /// Which literal is being read.
    pub kind: StringKind,
    /// Fixed Unicode transform applied instead of the encoding table, if
    /// any.
    pub output: OutputOverride,
    /// When set, surrogate entities bypass the override and go through the
    /// encoding table.
    pub strict: bool,
    /// Decoding map translating input byte sequences to entity codes.
    pub map: &'a mut M,
    /// Encoding table translating entity codes to output bytes.
    pub table: &'a mut T,
}

/// Whitespace recognized between tokens: HT, SP, and (post-filter) LF.
fn is_whitespace(b: u8) -> bool {
    matches!(b, b'\t' | b' ' | b'\n')
}

/// Visible printing US-ASCII.
fn is_visible(b: u8) -> bool {
    (0x21..=0x7E).contains(&b)
}

/// Characters that are a complete token by themselves.
fn is_atomic(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'[' | b']' | b',' | b'%' | b';' | b'"' | b'\'' | b'`' | b'{' | b'}'
    )
}

/// Characters that end a token and are kept as its last byte.
fn is_inclusive(b: u8) -> bool {
    matches!(b, b'"' | b'\'' | b'`' | b'{')
}

/// Characters that end a token and are pushed back for the next read.
fn is_exclusive(b: u8) -> bool {
    is_whitespace(b)
        || matches!(
            b,
            b'(' | b')' | b'[' | b']' | b',' | b'%' | b';' | b'#' | b'}'
        )
}

/// Reads tokens and decoded string payloads into an owned block buffer.
///
/// A reader starts out functional and fails at most once: the first error
/// latches its kind and line, empties the buffer, and makes every further
/// operation return the same error without touching the input. See
/// [`status`](BlockReader::status).
pub struct BlockReader {
    status: Result<(), Error>,
    line: u64,
    buf: BlockBuffer,
    scratch: ScratchBuffer,
}

impl BlockReader {
    /// Creates a functional reader with an empty buffer on line 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: Ok(()),
            line: 1,
            buf: BlockBuffer::new(),
            scratch: ScratchBuffer::new(),
        }
    }

    /// The latched status: `Ok` while functional, otherwise the first
    /// error.
    pub fn status(&self) -> Result<(), Error> {
        self.status
    }

    /// Length of the current block in bytes; 0 once an error is latched.
    #[must_use]
    pub fn len(&self) -> usize {
        match self.status {
            Ok(()) => self.buf.len(),
            Err(_) => 0,
        }
    }

    /// Whether the current block is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The bytes of the current block; empty once an error is latched.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self.status {
            Ok(()) => self.buf.as_bytes(),
            Err(_) => b"",
        }
    }

    /// A NUL-terminated view of the current block.
    ///
    /// `None` when the block data itself contains a NUL byte. Once an error
    /// is latched this is the empty C string.
    #[must_use]
    pub fn as_c_str(&self) -> Option<&CStr> {
        match self.status {
            Ok(()) => self.buf.as_c_str(),
            Err(_) => Some(c""),
        }
    }

    /// The line the current block starts on; `u64::MAX` once an error is
    /// latched.
    #[must_use]
    pub fn line(&self) -> u64 {
        match self.status {
            Ok(()) => self.line,
            Err(_) => u64::MAX,
        }
    }

    /// Reads one token into the buffer.
    ///
    /// Skips whitespace and `#` comments first, then scans one token by the
    /// Shastina character classes: atomics stand alone, inclusive stops are
    /// kept as the final byte, exclusive stops are pushed back. On the
    /// terminal `|;` token the rest of the input is consumed and must hold
    /// nothing but whitespace and comments.
    ///
    /// # Errors
    ///
    /// Latches and returns the first failure; see [`ErrorKind`].
    pub fn read_token<S: ByteSource>(&mut self, filter: &mut InputFilter<S>) -> Result<(), Error> {
        self.status?;
        self.buf.clear();

        skip_blank(filter);

        let c0 = self.next_byte(filter, ErrorKind::UnexpectedEof)?;
        self.line = filter.line();
        if !is_visible(c0) {
            return Err(self.fail(filter, ErrorKind::BadChar));
        }
        self.push_token_byte(filter, c0)?;

        let mut terminal = false;
        if c0 == b'|' {
            let c1 = self.next_byte(filter, ErrorKind::UnexpectedEof)?;
            if c1 == b';' {
                self.push_token_byte(filter, c1)?;
                terminal = true;
            } else {
                filter.unread();
            }
        }

        if terminal {
            // Nothing but blanks and comments may follow the terminal
            // token.
            skip_blank(filter);
            return match filter.read() {
                Ok(None) => Ok(()),
                Ok(Some(_)) => Err(self.fail(filter, ErrorKind::TrailingContent)),
                Err(e) => Err(self.fail(filter, e.into())),
            };
        }

        if is_atomic(c0) {
            return Ok(());
        }

        loop {
            let c = self.next_byte(filter, ErrorKind::UnexpectedEof)?;
            if is_inclusive(c) {
                self.push_token_byte(filter, c)?;
                return Ok(());
            }
            if is_exclusive(c) {
                filter.unread();
                return Ok(());
            }
            if !is_visible(c) {
                return Err(self.fail(filter, ErrorKind::TokenChar));
            }
            self.push_token_byte(filter, c)?;
        }
    }

    /// Reads one string literal into the buffer through the decoding-map →
    /// entity-encoder pipeline.
    ///
    /// The opening delimiter must already have been consumed (it arrives as
    /// the inclusive final byte of the preceding token); the closing
    /// delimiter is consumed here and not delivered to the decoding map.
    ///
    /// # Errors
    ///
    /// Latches and returns the first failure; see [`ErrorKind`].
    pub fn read_string<S, M, T>(
        &mut self,
        filter: &mut InputFilter<S>,
        spec: StringSpec<'_, M, T>,
    ) -> Result<(), Error>
    where
        S: ByteSource,
        M: DecodingMap + ?Sized,
        T: EncodingTable + ?Sized,
    {
        self.status?;
        self.buf.clear();
        self.line = filter.line();

        let result = self.run_string(filter, spec);
        self.scratch.reset();
        result
    }

    fn run_string<S, M, T>(
        &mut self,
        filter: &mut InputFilter<S>,
        spec: StringSpec<'_, M, T>,
    ) -> Result<(), Error>
    where
        S: ByteSource,
        M: DecodingMap + ?Sized,
        T: EncodingTable + ?Sized,
    {
        let StringSpec {
            kind,
            output,
            strict,
            map,
            table,
        } = spec;

        let mut walker = Walker::new(map);
        let mut escaped = false;
        // Nesting starts at one for the already-consumed opening bracket.
        let mut nesting: u64 = 1;
        let closer = match kind {
            StringKind::DoubleQuote => b'"',
            StringKind::Apostrophe => b'\'',
            StringKind::Curly => b'}',
        };

        loop {
            let b = self.next_byte(filter, ErrorKind::OpenString)?;

            if !escaped {
                if kind == StringKind::Curly {
                    if b == b'{' {
                        if nesting == u64::MAX {
                            return Err(self.fail(filter, ErrorKind::DeepCurly));
                        }
                        nesting += 1;
                    } else if b == b'}' {
                        nesting -= 1;
                        if nesting == 0 {
                            break;
                        }
                    }
                } else if b == closer {
                    break;
                }
            }

            // A backslash arms the escape flag unless it is itself escaped,
            // so `\\` does not escape what follows.
            escaped = b == b'\\' && !escaped;

            if b == 0 {
                return Err(self.fail(filter, ErrorKind::NullChar));
            }

            match walker.feed(b) {
                Ok(Some(entity)) => self.encode_one(filter, table, entity, output, strict)?,
                Ok(None) => {}
                Err(_) => return Err(self.fail(filter, ErrorKind::UnmappedEscape)),
            }
        }

        match walker.finish() {
            Ok(Some(entity)) => self.encode_one(filter, table, entity, output, strict)?,
            Ok(None) => {}
            Err(_) => return Err(self.fail(filter, ErrorKind::UnmappedEscape)),
        }
        Ok(())
    }

    /// Latches the first error with the filter's current line and empties
    /// the buffer.
    fn fail<S: ByteSource>(&mut self, filter: &InputFilter<S>, kind: ErrorKind) -> Error {
        let err = Error::new(kind, filter.line());
        if self.status.is_ok() {
            self.buf.clear();
            self.status = Err(err);
        }
        err
    }

    fn next_byte<S: ByteSource>(
        &mut self,
        filter: &mut InputFilter<S>,
        eof: ErrorKind,
    ) -> Result<u8, Error> {
        match filter.read() {
            Ok(Some(b)) => Ok(b),
            Ok(None) => Err(self.fail(filter, eof)),
            Err(e) => Err(self.fail(filter, e.into())),
        }
    }

    fn push_token_byte<S: ByteSource>(
        &mut self,
        filter: &InputFilter<S>,
        b: u8,
    ) -> Result<(), Error> {
        if self.buf.push(b).is_err() {
            return Err(self.fail(filter, ErrorKind::LongToken));
        }
        Ok(())
    }

    fn encode_one<S: ByteSource, T: EncodingTable + ?Sized>(
        &mut self,
        filter: &InputFilter<S>,
        table: &mut T,
        entity: u64,
        output: OutputOverride,
        strict: bool,
    ) -> Result<(), Error> {
        let encoded = encode_entity(
            &mut self.buf,
            &mut self.scratch,
            table,
            entity,
            output,
            strict,
        );
        if encoded.is_err() {
            return Err(self.fail(filter, ErrorKind::LongString));
        }
        Ok(())
    }
}

impl Default for BlockReader {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BlockReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockReader")
            .field("status", &self.status)
            .field("line", &self.line)
            .field("data", &self.buf.as_bytes().as_bstr())
            .finish()
    }
}

impl From<StreamError> for ErrorKind {
    fn from(e: StreamError) -> Self {
        match e {
            StreamError::Io => ErrorKind::IoError,
            StreamError::BadSignature => ErrorKind::BadSignature,
        }
    }
}

/// Skips whitespace runs and `#` comments, pushing back the byte that ends
/// the skip.
///
/// EOF and stream errors end the skip silently; the read that follows
/// surfaces the sticky condition with the right context.
fn skip_blank<S: ByteSource>(filter: &mut InputFilter<S>) {
    loop {
        let b = loop {
            match filter.read() {
                Ok(Some(b)) if is_whitespace(b) => {}
                Ok(Some(b)) => break b,
                Ok(None) | Err(_) => return,
            }
        };
        if b != b'#' {
            filter.unread();
            return;
        }
        // A comment runs through its line feed, which it keeps.
        loop {
            match filter.read() {
                Ok(Some(b'\n')) => break,
                Ok(Some(_)) => {}
                Ok(None) | Err(_) => return,
            }
        }
    }
}
