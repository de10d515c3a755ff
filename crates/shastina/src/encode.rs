//! Entity-code encoding: the user encoding table and the fixed Unicode
//! transforms.
#![allow(clippy::cast_possible_truncation)]

use crate::buffer::{BlockBuffer, BufferFull};
use crate::scratch::ScratchBuffer;

/// The largest Unicode codepoint. Entity codes above this are non-Unicode
/// entities and always go through the encoding table.
pub const MAX_UNICODE: u64 = 0x10_FFFF;

/// The Unicode surrogate range.
const MIN_SURROGATE: u64 = 0xD800;
const MAX_SURROGATE: u64 = 0xDFFF;

/// The first codepoint encoded as a surrogate pair.
const MIN_SUPPLEMENTAL: u32 = 0x1_0000;

/// First high and first low surrogate codepoints. The high half carries the
/// ten most significant bits of the supplemental offset and comes first.
const HI_SURROGATE: u32 = 0xD800;
const LO_SURROGATE: u32 = 0xDC00;

/// Maps entity codes to output byte sequences.
///
/// The callback writes the sequence for `entity` into `out` and returns its
/// required length. When `out` is shorter than the required length nothing
/// is written; the caller widens its buffer and retries. Unrecognized
/// entities have required length 0 and are dropped from output.
///
/// The mapping must depend only on `entity`.
pub trait EncodingTable {
    /// Writes the byte sequence for `entity` if it fits, returning the
    /// required length either way.
    fn encode(&mut self, entity: u64, out: &mut [u8]) -> usize;
}

impl<F: FnMut(u64, &mut [u8]) -> usize> EncodingTable for F {
    fn encode(&mut self, entity: u64, out: &mut [u8]) -> usize {
        self(entity, out)
    }
}

/// Selects what happens to entity codes in Unicode range: pass through the
/// encoding table, or one of six fixed transforms.
///
/// Non-Unicode entities ignore the override. In strict mode the surrogate
/// range does too, falling back to the encoding table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OutputOverride {
    /// Every entity goes through the encoding table.
    #[default]
    None,
    /// Standard UTF-8.
    Utf8,
    /// UTF-8 with supplemental codepoints written as a UTF-8-encoded
    /// surrogate pair.
    Cesu8,
    /// UTF-16, least significant byte first.
    Utf16Le,
    /// UTF-16, most significant byte first.
    Utf16Be,
    /// UTF-32, least significant byte first.
    Utf32Le,
    /// UTF-32, most significant byte first.
    Utf32Be,
}

/// Splits a supplemental codepoint into its surrogate pair, high half
/// first.
pub(crate) fn surrogate_pair(code: u32) -> (u32, u32) {
    debug_assert!((MIN_SUPPLEMENTAL..=MAX_UNICODE as u32).contains(&code));
    let offset = code - MIN_SUPPLEMENTAL;
    (HI_SURROGATE + (offset >> 10), LO_SURROGATE + (offset & 0x3FF))
}

/// Encodes one entity into the block buffer.
///
/// Dispatch: entities above [`MAX_UNICODE`] always use the table, as do
/// surrogates when `strict` is set; everything else follows `over`.
pub(crate) fn encode_entity<T: EncodingTable + ?Sized>(
    buf: &mut BlockBuffer,
    scratch: &mut ScratchBuffer,
    table: &mut T,
    entity: u64,
    over: OutputOverride,
    strict: bool,
) -> Result<(), BufferFull> {
    let mut over = over;
    if entity > MAX_UNICODE {
        over = OutputOverride::None;
    }
    if strict && (MIN_SURROGATE..=MAX_SURROGATE).contains(&entity) {
        over = OutputOverride::None;
    }

    // Past the demotions above, any transform target fits in u32.
    let Ok(code) = u32::try_from(entity) else {
        return encode_table(buf, scratch, table, entity);
    };
    match over {
        OutputOverride::None => encode_table(buf, scratch, table, entity),
        OutputOverride::Utf8 => encode_utf8(buf, code, false),
        OutputOverride::Cesu8 => encode_utf8(buf, code, true),
        OutputOverride::Utf16Le => encode_utf16(buf, code, false),
        OutputOverride::Utf16Be => encode_utf16(buf, code, true),
        OutputOverride::Utf32Le => encode_utf32(buf, code, false),
        OutputOverride::Utf32Be => encode_utf32(buf, code, true),
    }
}

/// Runs the encoding table against the scratch buffer, widening until the
/// sequence fits, then appends it to the block buffer.
fn encode_table<T: EncodingTable + ?Sized>(
    buf: &mut BlockBuffer,
    scratch: &mut ScratchBuffer,
    table: &mut T,
    entity: u64,
) -> Result<(), BufferFull> {
    scratch.zero();
    let needed = loop {
        let needed = table.encode(entity, scratch.bytes_mut());
        if needed <= scratch.len() {
            break needed;
        }
        scratch.widen(needed)?;
    };
    for &b in &scratch.bytes()[..needed] {
        buf.push(b)?;
    }
    Ok(())
}

/// UTF-8, or CESU-8 when `cesu8` is set.
///
/// Byte count by codepoint: `< 0x80` one, `< 0x800` two, `< 0x10000`
/// three, else four; lead masks `C0`/`E0`/`F0`, continuations carry six
/// bits ORed with `80`. Surrogate codepoints encode like any other — the
/// dispatcher keeps them out in strict mode.
fn encode_utf8(buf: &mut BlockBuffer, code: u32, cesu8: bool) -> Result<(), BufferFull> {
    if cesu8 && code >= MIN_SUPPLEMENTAL {
        let (hi, lo) = surrogate_pair(code);
        encode_utf8(buf, hi, false)?;
        return encode_utf8(buf, lo, false);
    }
    if code < 0x80 {
        buf.push(code as u8)
    } else if code < 0x800 {
        buf.push(0xC0 | (code >> 6) as u8)?;
        buf.push(0x80 | (code & 0x3F) as u8)
    } else if code < 0x1_0000 {
        buf.push(0xE0 | (code >> 12) as u8)?;
        buf.push(0x80 | ((code >> 6) & 0x3F) as u8)?;
        buf.push(0x80 | (code & 0x3F) as u8)
    } else {
        buf.push(0xF0 | (code >> 18) as u8)?;
        buf.push(0x80 | ((code >> 12) & 0x3F) as u8)?;
        buf.push(0x80 | ((code >> 6) & 0x3F) as u8)?;
        buf.push(0x80 | (code & 0x3F) as u8)
    }
}

/// UTF-16 in either endianness; supplemental codepoints become a surrogate
/// pair, high half first.
fn encode_utf16(buf: &mut BlockBuffer, code: u32, big: bool) -> Result<(), BufferFull> {
    if code >= MIN_SUPPLEMENTAL {
        let (hi, lo) = surrogate_pair(code);
        encode_utf16(buf, hi, big)?;
        return encode_utf16(buf, lo, big);
    }
    let unit = code as u16;
    let bytes = if big {
        unit.to_be_bytes()
    } else {
        unit.to_le_bytes()
    };
    for b in bytes {
        buf.push(b)?;
    }
    Ok(())
}

/// UTF-32 in either endianness.
fn encode_utf32(buf: &mut BlockBuffer, code: u32, big: bool) -> Result<(), BufferFull> {
    let bytes = if big {
        code.to_be_bytes()
    } else {
        code.to_le_bytes()
    };
    for b in bytes {
        buf.push(b)?;
    }
    Ok(())
}
