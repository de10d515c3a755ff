//! The pushbackable input filter in front of the raw byte source.
//!
//! The filter delivers the source byte stream with three transformations
//! applied:
//!
//! * an optional UTF-8 byte order mark (`EF BB BF`) at the very start is
//!   consumed and remembered; a partial mark latches
//!   [`StreamError::BadSignature`];
//! * every line-ending flavor — bare CR, bare LF, CR+LF, LF+CR — is
//!   delivered as a single LF;
//! * a 1-based line counter tracks the line of the most recently delivered
//!   byte, saturating at `u64::MAX`.
//!
//! One byte of pushback is available to clients; EOF and I/O errors are
//! sticky, and the underlying source is never pulled again once one has
//! been latched.

use thiserror::Error;

use crate::source::{ByteSource, SourceByte};

/// The UTF-8 byte order mark.
const BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// A sticky, non-EOF failure of the filtered stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The raw source reported an I/O error.
    #[error("I/O error on the input source")]
    Io,
    /// The stream began like a UTF-8 byte order mark but the mark was
    /// incomplete.
    #[error("incomplete UTF-8 byte order mark")]
    BadSignature,
}

/// The most recent outcome of a read, kept for pushback, line accounting,
/// and latching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LastRead {
    Byte(u8),
    Eof,
    Io,
    BadSignature,
}

/// Filtered, pushbackable reader over a [`ByteSource`].
#[derive(Debug)]
pub struct InputFilter<S> {
    source: S,
    /// One byte of raw-stream lookahead, fed by the BOM probe and CR/LF
    /// pairing. Distinct from the client pushback slot.
    lookahead: Option<u8>,
    /// `None` until the first read resolves.
    last: Option<LastRead>,
    /// Line of the most recently delivered byte; 0 while nothing has been
    /// delivered yet.
    line_count: u64,
    pushback: bool,
    bom_present: bool,
}

impl<S: ByteSource> InputFilter<S> {
    /// Creates a filter over `source` with nothing read yet.
    pub fn new(source: S) -> Self {
        Self {
            source,
            lookahead: None,
            last: None,
            line_count: 0,
            pushback: false,
            bom_present: false,
        }
    }

    /// Reads the next filtered byte.
    ///
    /// Returns `Ok(None)` at end of input. EOF and both error conditions
    /// are sticky: every subsequent call reports the same outcome without
    /// touching the source.
    pub fn read(&mut self) -> Result<Option<u8>, StreamError> {
        if self.pushback {
            self.pushback = false;
            if let Some(LastRead::Byte(b)) = self.last {
                return Ok(Some(b));
            }
        }
        match self.last {
            Some(LastRead::Eof) => return Ok(None),
            Some(LastRead::Io) => return Err(StreamError::Io),
            Some(LastRead::BadSignature) => return Err(StreamError::BadSignature),
            Some(LastRead::Byte(_)) | None => {}
        }

        if self.line_count == 0 {
            if let Some(outcome) = self.probe_signature() {
                return outcome;
            }
        }

        let b = match self.pull_raw() {
            SourceByte::Byte(b) => b,
            SourceByte::Eof => return self.latch(LastRead::Eof),
            SourceByte::IoError => return self.latch(LastRead::Io),
        };

        // Fold CR, LF, CR+LF, and LF+CR into a single LF. The peeked byte
        // goes back to the lookahead slot when it does not pair; a peeked
        // EOF is left for the next read to hit again.
        let b = if b == b'\r' || b == b'\n' {
            match self.pull_raw() {
                SourceByte::Byte(b2) => {
                    let paired = (b == b'\r' && b2 == b'\n') || (b == b'\n' && b2 == b'\r');
                    if !paired {
                        self.lookahead = Some(b2);
                    }
                }
                SourceByte::Eof => {}
                SourceByte::IoError => return self.latch(LastRead::Io),
            }
            b'\n'
        } else {
            b
        };

        if self.line_count == 0 {
            self.line_count = 1;
        } else if self.last == Some(LastRead::Byte(b'\n')) {
            self.line_count = self.line_count.saturating_add(1);
        }
        self.last = Some(LastRead::Byte(b));
        Ok(Some(b))
    }

    /// Arranges for the byte just read to be read again.
    ///
    /// Only one byte can be held: the call is rejected when pushback is
    /// already pending, when nothing has been read yet, or in a terminal
    /// state (EOF or a latched error).
    pub fn unread(&mut self) -> bool {
        match self.last {
            Some(LastRead::Byte(_)) if !self.pushback => {
                self.pushback = true;
                true
            }
            _ => false,
        }
    }

    /// The current 1-based line number, saturating at `u64::MAX`.
    ///
    /// The reported line is the line of the *next* byte to be delivered: it
    /// advances past an LF as soon as the LF has been read, and drops back
    /// while that LF is pushed back. The adjustment is computed at query
    /// time; stored state is untouched.
    #[must_use]
    pub fn line(&self) -> u64 {
        let line = self.line_count.max(1);
        if !self.pushback && self.last == Some(LastRead::Byte(b'\n')) {
            line.saturating_add(1)
        } else {
            line
        }
    }

    /// Whether a UTF-8 byte order mark was present at the very start of the
    /// stream. Meaningful only after the first read.
    #[must_use]
    pub fn bom_present(&self) -> bool {
        self.bom_present
    }

    fn latch(&mut self, state: LastRead) -> Result<Option<u8>, StreamError> {
        self.last = Some(state);
        match state {
            LastRead::Eof => Ok(None),
            LastRead::Io => Err(StreamError::Io),
            LastRead::BadSignature => Err(StreamError::BadSignature),
            LastRead::Byte(b) => Ok(Some(b)),
        }
    }

    fn pull_raw(&mut self) -> SourceByte {
        match self.lookahead.take() {
            Some(b) => SourceByte::Byte(b),
            None => self.source.read_byte(),
        }
    }

    /// Consumes a UTF-8 byte order mark before the first delivered byte.
    ///
    /// A stream that starts with `EF` must complete the mark; anything
    /// short of that, including EOF, latches `BadSignature`. A non-`EF`
    /// first byte goes to the lookahead slot untouched.
    ///
    /// Returns the latched outcome when the probe ends the stream, `None`
    /// when reading should continue.
    fn probe_signature(&mut self) -> Option<Result<Option<u8>, StreamError>> {
        match self.source.read_byte() {
            SourceByte::Eof => Some(self.latch(LastRead::Eof)),
            SourceByte::IoError => Some(self.latch(LastRead::Io)),
            SourceByte::Byte(b) if b == BOM[0] => {
                for expected in [BOM[1], BOM[2]] {
                    match self.source.read_byte() {
                        SourceByte::Byte(b) if b == expected => {}
                        SourceByte::Byte(_) | SourceByte::Eof => {
                            return Some(self.latch(LastRead::BadSignature));
                        }
                        SourceByte::IoError => return Some(self.latch(LastRead::Io)),
                    }
                }
                self.bom_present = true;
                None
            }
            SourceByte::Byte(b) => {
                self.lookahead = Some(b);
                None
            }
        }
    }
}
