//! Classification of scanned tokens.

use crate::block::StringKind;

/// What a scanned token introduces, judged by its final byte.
///
/// String and embed tokens carry a prefix (everything before the
/// delimiter); the data itself follows in the input and is read separately
/// — strings via [`BlockReader::read_string`](crate::BlockReader), embedded
/// data by whatever the application layers on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenKind {
    /// An ordinary token with no data following it.
    Simple,
    /// The terminal `|;` token.
    Final,
    /// A token ending in a string delimiter; string data follows.
    String(StringKind),
    /// A token ending in a grave accent; embedded data follows.
    Embed,
}

impl TokenKind {
    /// Classifies a token scanned by
    /// [`BlockReader::read_token`](crate::BlockReader::read_token).
    #[must_use]
    pub fn classify(token: &[u8]) -> Self {
        if token == b"|;" {
            return Self::Final;
        }
        match token.last().copied() {
            Some(b'"') => Self::String(StringKind::DoubleQuote),
            Some(b'\'') => Self::String(StringKind::Apostrophe),
            Some(b'{') => Self::String(StringKind::Curly),
            Some(b'`') => Self::Embed,
            _ => Self::Simple,
        }
    }

    /// The token's prefix: for string and embed tokens, everything before
    /// the final delimiter byte; for the rest, the whole token.
    #[must_use]
    pub fn prefix(self, token: &[u8]) -> &[u8] {
        match self {
            Self::String(_) | Self::Embed => &token[..token.len() - 1],
            Self::Simple | Self::Final => token,
        }
    }
}
