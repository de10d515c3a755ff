//! String literals end to end: escapes, greedy matching, curly nesting,
//! output overrides, and the string error kinds.

use alloc::vec;
use alloc::vec::Vec;

use rstest::rstest;

use super::{TestMap, filter_of, test_table};
use crate::{
    BlockReader, Error, ErrorKind, OutputOverride, StringKind, StringSpec, TokenKind,
};

/// Reads the introducing token, then the string literal that follows it.
fn read_string_of(
    input: &[u8],
    kind: StringKind,
    output: OutputOverride,
    strict: bool,
) -> Result<Vec<u8>, Error> {
    let mut filter = filter_of(input);
    let mut block = BlockReader::new();
    block.read_token(&mut filter)?;
    assert_eq!(
        TokenKind::classify(block.as_bytes()),
        TokenKind::String(kind)
    );
    let mut map = TestMap::standard();
    let mut table = test_table;
    block.read_string(
        &mut filter,
        StringSpec {
            kind,
            output,
            strict,
            map: &mut map,
            table: &mut table,
        },
    )?;
    Ok(block.as_bytes().to_vec())
}

fn quoted(input: &[u8]) -> Result<Vec<u8>, Error> {
    read_string_of(input, StringKind::DoubleQuote, OutputOverride::None, true)
}

#[test]
fn plain_text_is_folded_by_the_encoding_table() {
    // Uppercase folds to lowercase and the tilde entity is unmapped, so it
    // drops out of the output.
    assert_eq!(quoted(b"\"Hi~ World\"").unwrap(), b"hi world");
}

#[test]
fn empty_literals_produce_empty_blocks() {
    assert_eq!(quoted(b"\"\"").unwrap(), b"");
    assert_eq!(
        read_string_of(b"{}", StringKind::Curly, OutputOverride::None, true).unwrap(),
        b""
    );
}

#[test]
fn apostrophe_literals_close_on_the_apostrophe() {
    assert_eq!(
        read_string_of(b"'AB c'", StringKind::Apostrophe, OutputOverride::None, true).unwrap(),
        b"ab c"
    );
}

#[rstest]
#[case(b"\"a\\\"b\"".as_slice(), b"a\"b".as_slice())] // \" is a literal quote
#[case(b"\"a\\\\\"".as_slice(), b"a\\".as_slice())] // \\ does not escape the closer
#[case(b"\"a\\\nb\"".as_slice(), b"a b".as_slice())] // line continuation
#[case(b"\"\\:a\\ss\"".as_slice(), b"\xE4\xDF".as_slice())] // Latin-1 escapes
fn backslash_escapes(#[case] input: &[u8], #[case] expected: &[u8]) {
    assert_eq!(quoted(input).unwrap(), expected);
}

#[test]
fn greedy_matching_takes_the_longest_key() {
    // `*` alone, `**`, and `*hi` resolve to different entities.
    assert_eq!(quoted(b"\"*\"").unwrap(), b":-)");
    assert_eq!(quoted(b"\"**\"").unwrap(), b"*");
    assert_eq!(quoted(b"\"*hix\"").unwrap(), b":-):-)x");
}

#[test]
fn table_retry_expands_a_long_special_entity_end_to_end() {
    // `*hello` maps to nine emoticons, 27 bytes: wider than the initial
    // scratch allocation, so the encoder widens and retries.
    assert_eq!(quoted(b"\"*hello\"").unwrap(), b":-):-):-):-):-):-):-):-):-)");
}

#[test]
fn a_matched_prefix_without_an_entity_is_unmapped() {
    // `*hir` is on the way to `*hired` but carries no entity itself.
    let err = quoted(b"\"*hirz\"").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnmappedEscape);
}

#[rstest]
#[case(b"\"\\q\"".as_slice())] // no such escape
#[case(b"\"a\x80b\"".as_slice())] // byte with no key at all
fn unmapped_input_fails(#[case] input: &[u8]) {
    assert_eq!(quoted(input).unwrap_err().kind(), ErrorKind::UnmappedEscape);
}

#[test]
fn curly_nesting_decodes_inner_brackets_as_data() {
    assert_eq!(
        read_string_of(b"{a{b}c}", StringKind::Curly, OutputOverride::None, true).unwrap(),
        b"a{b}c"
    );
}

#[test]
fn escaped_brackets_do_not_nest() {
    assert_eq!(
        read_string_of(b"{a\\{b}", StringKind::Curly, OutputOverride::None, true).unwrap(),
        b"a{b"
    );
}

#[test]
fn euro_sign_in_utf8() {
    assert_eq!(
        read_string_of(b"\"\\e\"", StringKind::DoubleQuote, OutputOverride::Utf8, true).unwrap(),
        [0xE2, 0x82, 0xAC]
    );
}

#[test]
fn hwair_in_utf16_little_endian() {
    assert_eq!(
        read_string_of(b"\"\\h\"", StringKind::DoubleQuote, OutputOverride::Utf16Le, true)
            .unwrap(),
        [0x00, 0xD8, 0x48, 0xDF]
    );
}

#[test]
fn deseret_yee_differs_between_utf8_and_cesu8() {
    let utf8 =
        read_string_of(b"\"\\y\"", StringKind::DoubleQuote, OutputOverride::Utf8, true).unwrap();
    let cesu8 =
        read_string_of(b"\"\\y\"", StringKind::DoubleQuote, OutputOverride::Cesu8, true).unwrap();
    assert_eq!(utf8, [0xF0, 0x90, 0x90, 0xB7]);
    assert_eq!(cesu8, [0xED, 0xA0, 0x81, 0xED, 0xB0, 0xB7]);
}

#[test]
fn without_an_override_supplemental_entities_fall_to_the_table() {
    // The test table has no mapping above 0xFF, so the codepoint drops out.
    assert_eq!(quoted(b"\"a\\yb\"").unwrap(), b"ab");
}

#[test]
fn a_string_block_reports_the_line_of_its_opening_delimiter() {
    let mut filter = filter_of(b"a\n\"xy\"\n");
    let mut block = BlockReader::new();
    block.read_token(&mut filter).unwrap();
    block.read_token(&mut filter).unwrap();
    assert_eq!(block.as_bytes(), b"\"");
    let mut map = TestMap::standard();
    let mut table = test_table;
    block
        .read_string(
            &mut filter,
            StringSpec {
                kind: StringKind::DoubleQuote,
                output: OutputOverride::None,
                strict: true,
                map: &mut map,
                table: &mut table,
            },
        )
        .unwrap();
    assert_eq!(block.as_bytes(), b"xy");
    assert_eq!(block.line(), 2);
}

#[test]
fn a_nul_byte_inside_a_literal_fails() {
    assert_eq!(quoted(b"\"a\0b\"").unwrap_err().kind(), ErrorKind::NullChar);
}

#[test]
fn eof_inside_a_literal_is_an_open_string() {
    let err = quoted(b"\"abc").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OpenString);
    assert_eq!(err.line(), 1);
}

#[test]
fn string_output_beyond_the_block_ceiling_is_a_long_string() {
    let mut input = vec![b'"'];
    input.extend_from_slice(&[b'a'; 32767]);
    input.push(b'"');
    let err = quoted(&input).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LongString);
}

#[test]
fn the_longest_string_exactly_fits() {
    let mut input = vec![b'"'];
    input.extend_from_slice(&[b'a'; 32766]);
    input.push(b'"');
    assert_eq!(quoted(&input).unwrap().len(), 32766);
}

#[test]
fn a_string_failure_latches_the_reader() {
    let mut filter = filter_of(b"\"abc");
    let mut block = BlockReader::new();
    block.read_token(&mut filter).unwrap();
    let mut map = TestMap::standard();
    let mut table = test_table;
    let err = block
        .read_string(
            &mut filter,
            StringSpec {
                kind: StringKind::DoubleQuote,
                output: OutputOverride::None,
                strict: true,
                map: &mut map,
                table: &mut table,
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OpenString);
    assert_eq!(block.status(), Err(err));
    assert_eq!(block.as_bytes(), b"");
    assert_eq!(block.line(), u64::MAX);
    assert_eq!(block.read_token(&mut filter).unwrap_err(), err);
}
