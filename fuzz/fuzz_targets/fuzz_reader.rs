#![no_main]

use libfuzzer_sys::fuzz_target;
use shastina::{
    BlockReader, DecodingMap, InputFilter, OutputOverride, SliceSource, StringKind, StringSpec,
    TokenKind,
};

/// Single-byte identity map over the whole byte range, so every literal
/// byte resolves and the fuzzer exercises the scanner and encoder rather
/// than tripping on unmapped escapes.
struct ByteMap {
    cur: Option<u8>,
}

impl DecodingMap for ByteMap {
    fn reset(&mut self) {
        self.cur = None;
    }

    fn branch(&mut self, b: u8) -> bool {
        if self.cur.is_some() {
            return false;
        }
        self.cur = Some(b);
        true
    }

    fn entity(&self) -> Option<u64> {
        self.cur.map(u64::from)
    }
}

fn ascii_table(entity: u64, out: &mut [u8]) -> usize {
    if entity < 0x100 {
        if let Some(slot) = out.first_mut() {
            *slot = entity as u8;
        }
        1
    } else {
        0
    }
}

fn reader(data: &[u8]) {
    let [flags, data @ ..] = data else {
        return;
    };

    let output = match flags & 7 {
        0 => OutputOverride::None,
        1 => OutputOverride::Utf8,
        2 => OutputOverride::Cesu8,
        3 => OutputOverride::Utf16Le,
        4 => OutputOverride::Utf16Be,
        5 => OutputOverride::Utf32Le,
        _ => OutputOverride::Utf32Be,
    };
    let strict = flags & 8 != 0;

    let mut filter = InputFilter::new(SliceSource::new(data));
    let mut block = BlockReader::new();

    loop {
        if block.read_token(&mut filter).is_err() {
            // Latched: every further call must keep reporting the error.
            assert!(block.read_token(&mut filter).is_err());
            assert_eq!(block.len(), 0);
            return;
        }
        assert!(block.len() <= shastina::MAX_BUFFER - 1);

        match TokenKind::classify(block.as_bytes()) {
            TokenKind::Final => return,
            TokenKind::String(kind) => {
                let kind = if flags & 16 != 0 {
                    kind
                } else {
                    StringKind::DoubleQuote
                };
                let mut map = ByteMap { cur: None };
                let mut table = ascii_table;
                let spec = StringSpec {
                    kind,
                    output,
                    strict,
                    map: &mut map,
                    table: &mut table,
                };
                if block.read_string(&mut filter, spec).is_err() {
                    return;
                }
                assert!(block.len() <= shastina::MAX_BUFFER - 1);
            }
            TokenKind::Simple | TokenKind::Embed => {}
        }
    }
}

fuzz_target!(|data: &[u8]| reader(data));
