//! End-to-end and property tests for the block reader.
//!
//! The fixtures are one deliberately lopsided decoding map and encoding
//! table: printable US-ASCII maps to itself, backslash escapes cover the
//! delimiters and a handful of Latin-1 and supplemental codepoints,
//! asterisk keys of several lengths exercise greedy matching, and the
//! encoding table folds uppercase to lowercase, drops the tilde, and
//! expands non-Unicode "special" entities to emoticon runs.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::{DecodingMap, InputFilter, SliceSource};

mod strings;


/// Base for entity codes outside Unicode range.
pub(crate) const SPECIAL: u64 = 0x20_0000;

/// Prefix-table decoding map: a key set plus the key matched so far.
pub(crate) struct TestMap {
    keys: BTreeMap<Vec<u8>, u64>,
    cur: Vec<u8>,
}

impl TestMap {
    /// The standard test map described in the module docs.
    pub(crate) fn standard() -> Self {
        let mut keys: BTreeMap<Vec<u8>, u64> = BTreeMap::new();
        // Printable US-ASCII, space, and line feed map to their own codes.
        // Backslash only appears inside escape keys; asterisk starts the
        // greedy-match key family.
        for b in 0x21..=0x7Eu8 {
            if b != b'\\' && b != b'*' {
                keys.insert([b].into(), u64::from(b));
            }
        }
        keys.insert(b" ".into(), 0x20);
        keys.insert(b"\n".into(), 0x0A);

        let escapes: &[(&[u8], u64)] = &[
            (b"\\\\", 0x5C),
            (b"\\\"", 0x22),
            (b"\\'", 0x27),
            (b"\\{", 0x7B),
            (b"\\}", 0x7D),
            (b"\\n", 0x0A),
            // Line continuation: backslash at end of line reads as a space.
            (b"\\\n", 0x20),
            (b"\\:a", 0xE4),
            (b"\\:A", 0xC4),
            (b"\\:o", 0xF6),
            (b"\\:O", 0xD6),
            (b"\\:u", 0xFC),
            (b"\\:U", 0xDC),
            (b"\\ss", 0xDF),
            (b"\\c", 0xA2),
            (b"\\e", 0x20AC),
            (b"\\h", 0x10348),
            (b"\\y", 0x10437),
            (b"\\w", 0x24B62),
        ];
        for &(key, entity) in escapes {
            keys.insert(key.into(), entity);
        }

        keys.insert(b"**".into(), u64::from(b'*'));
        keys.insert(b"*".into(), SPECIAL + 1);
        keys.insert(b"*hi".into(), SPECIAL + 2);
        keys.insert(b"*hired".into(), SPECIAL + 3);
        keys.insert(b"*hello".into(), SPECIAL + 9);

        Self {
            keys,
            cur: Vec::new(),
        }
    }
}

impl DecodingMap for TestMap {
    fn reset(&mut self) {
        self.cur.clear();
    }

    fn branch(&mut self, b: u8) -> bool {
        self.cur.push(b);
        if self.keys.keys().any(|k| k.starts_with(&self.cur)) {
            true
        } else {
            self.cur.pop();
            false
        }
    }

    fn entity(&self) -> Option<u64> {
        self.keys.get(&self.cur).copied()
    }
}

/// The standard test encoding table.
///
/// Space, line feed, and printable ASCII map to themselves with uppercase
/// folded to lowercase; the tilde is deliberately unmapped (dropped);
/// `0xA0..=0xFF` emit their Latin-1 byte; `SPECIAL + n` emits `n` copies of
/// `:-)`. Everything else is unrecognized.
pub(crate) fn test_table(entity: u64, out: &mut [u8]) -> usize {
    let one = |out: &mut [u8], b: u8| {
        if let Some(slot) = out.first_mut() {
            *slot = b;
        }
        1
    };
    match entity {
        0x20 | 0x0A => one(out, entity as u8),
        0x7E => 0,
        0x21..=0x7D => {
            let b = entity as u8;
            one(out, b.to_ascii_lowercase())
        }
        0xA0..=0xFF => one(out, entity as u8),
        e if (SPECIAL + 1..=SPECIAL + 9).contains(&e) => {
            let n = usize::try_from(e - SPECIAL).unwrap_or(0);
            let needed = 3 * n;
            if out.len() >= needed {
                for chunk in out[..needed].chunks_exact_mut(3) {
                    chunk.copy_from_slice(b":-)");
                }
            }
            needed
        }
        _ => 0,
    }
}

pub(crate) fn filter_of(data: &[u8]) -> InputFilter<SliceSource<'_>> {
    InputFilter::new(SliceSource::new(data))
}
