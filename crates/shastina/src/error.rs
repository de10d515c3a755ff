use thiserror::Error;

/// The failure kinds a block reader can latch.
///
/// Kinds are stable identifiers: callers compare them by equality and should
/// not rely on discriminant values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    /// The raw input source signaled an I/O error.
    #[error("I/O error on the input source")]
    IoError,
    /// End of input before or inside a token.
    #[error("unexpected end of input")]
    UnexpectedEof,
    /// The stream began like a UTF-8 byte order mark but the mark was
    /// incomplete.
    #[error("incomplete UTF-8 byte order mark")]
    BadSignature,
    /// End of input inside a string literal.
    #[error("end of input inside a string literal")]
    OpenString,
    /// String data overflowed the block buffer.
    #[error("string data exceeds the maximum block length")]
    LongString,
    /// A NUL byte appeared inside a string literal.
    #[error("null byte inside a string literal")]
    NullChar,
    /// Curly-string nesting exceeded the counter range.
    #[error("curly bracket nesting too deep")]
    DeepCurly,
    /// An illegal byte where a token was expected.
    #[error("illegal character")]
    BadChar,
    /// A token overflowed the block buffer.
    #[error("token exceeds the maximum block length")]
    LongToken,
    /// Something other than whitespace or comments followed the `|;` token.
    #[error("content after the |; terminator")]
    TrailingContent,
    /// A non-printing byte inside a token.
    #[error("non-printing character inside a token")]
    TokenChar,
    /// The decoding map had no entity for the matched prefix.
    #[error("escape sequence has no entity mapping")]
    UnmappedEscape,
}

/// A latched block-reader failure: the kind plus the input line it was
/// detected on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} at line {line}")]
pub struct Error {
    kind: ErrorKind,
    line: u64,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, line: u64) -> Self {
        Self { kind, line }
    }

    /// The failure kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The 1-based line number the failure was detected on, saturated at
    /// `u64::MAX` when the counter overflowed.
    #[must_use]
    pub fn line(&self) -> u64 {
        self.line
    }
}
