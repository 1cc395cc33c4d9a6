//! Integration tests for the lexer on typical VBScript lines
//!
//! Each line is described as `<kind> <lexeme>` per token so regressions in
//! token boundaries or classification show up in the snapshot.

use vbsimplifier::vbs::{tokenize, untokenize, Token};

fn describe(line: &str) -> String {
    tokenize(line)
        .iter()
        .map(|token| format!("{:?} {}", token.kind(), token.lexeme()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_procedure_prototype() {
    insta::assert_snapshot!(describe("Private Sub Workbook_Open()"), @r###"
Keyword Private
Keyword Sub
Function Workbook_Open()
"###);
}

#[test]
fn test_packed_assignment_with_comment() {
    insta::assert_snapshot!(describe("x=5+3'note"), @r###"
Variable x
Operator =
Numeric 5
Operator +
Numeric 3
Comment 'note
"###);
}

#[test]
fn test_condition() {
    insta::assert_snapshot!(describe("If a <> b Then"), @r###"
Keyword If
Variable a
Operator <>
Variable b
Keyword Then
"###);
}

#[test]
fn test_string_with_comma_and_call() {
    insta::assert_snapshot!(describe("s = \"a, b\" & Chr(34)"), @r###"
Variable s
Operator =
String "a, b"
Operator &
Function Chr(34)
"###);
}

#[test]
fn test_top_level_commas_are_dropped() {
    insta::assert_snapshot!(describe("Dim a, b"), @r###"
Keyword Dim
Variable a
Variable b
"###);
    assert_eq!(untokenize(&tokenize("Dim a, b")), "Dim a b");
    assert_eq!(untokenize(&tokenize("a,,b")), "a b");
    assert_eq!(
        untokenize(&tokenize("x = Left(\"a, b\", 1)")),
        "x = Left(\"a, b\", 1)"
    );
}

#[test]
fn test_fixture_lines_keep_their_text() {
    let source = std::fs::read_to_string(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/dropper.vbs"
    ))
    .expect("fixture to be readable");

    for line in source.lines() {
        let tokens = tokenize(line);
        assert!(!tokens.is_empty(), "no tokens for {:?}", line);
        assert!(
            !tokens.iter().any(|t| matches!(t, Token::Generic(_))),
            "unclassified text in {:?}",
            line
        );
        assert_eq!(untokenize(&tokens), line.trim());
    }
}
