use bee::lexer::{lex_with_span, Token};

fn tokens(source: &str) -> Vec<Token> {
    lex_with_span(source).into_iter().map(|t| t.token).collect()
}

#[test]
fn declaration_tokens() {
    let toks = tokens("int x = 2 + 3 * 4;");
    assert_eq!(
        toks,
        vec![
            Token::Identifier("int".to_string()),
            Token::Identifier("x".to_string()),
            Token::Assign,
            Token::Integer(2),
            Token::Plus,
            Token::Integer(3),
            Token::Star,
            Token::Integer(4),
            Token::Semi,
        ]
    );
}

#[test]
fn string_literal_keeps_quotes_and_escapes_raw() {
    let toks = tokens(r#"print("hi\n");"#);
    assert_eq!(
        toks,
        vec![
            Token::Identifier("print".to_string()),
            Token::LParen,
            Token::Str(r#""hi\n""#.to_string()),
            Token::RParen,
            Token::Semi,
        ]
    );
}

#[test]
fn compound_assignment_operators() {
    let toks = tokens("a += 1; b -= 2; c *= 3; d /= 4;");
    assert!(toks.contains(&Token::PlusAssign));
    assert!(toks.contains(&Token::MinusAssign));
    assert!(toks.contains(&Token::MulAssign));
    assert!(toks.contains(&Token::DivAssign));
}

#[test]
fn two_character_comparisons_win_over_single() {
    let toks = tokens("a <= b == c != d >= e");
    assert_eq!(
        toks,
        vec![
            Token::Identifier("a".to_string()),
            Token::Le,
            Token::Identifier("b".to_string()),
            Token::Eq,
            Token::Identifier("c".to_string()),
            Token::Ne,
            Token::Identifier("d".to_string()),
            Token::Ge,
            Token::Identifier("e".to_string()),
        ]
    );
}

#[test]
fn keywords_do_not_swallow_identifiers() {
    let toks = tokens("iffy extern externs while");
    assert_eq!(
        toks,
        vec![
            Token::Identifier("iffy".to_string()),
            Token::Extern,
            Token::Identifier("externs".to_string()),
            Token::While,
        ]
    );
}

#[test]
fn numeric_literals() {
    let toks = tokens("3.14 42 0");
    assert_eq!(
        toks,
        vec![Token::Double(3.14), Token::Integer(42), Token::Integer(0)]
    );
}

#[test]
fn comments_and_whitespace_are_skipped() {
    let toks = tokens("int x; // trailing comment\n// full line\nx = 1;");
    assert_eq!(
        toks,
        vec![
            Token::Identifier("int".to_string()),
            Token::Identifier("x".to_string()),
            Token::Semi,
            Token::Identifier("x".to_string()),
            Token::Assign,
            Token::Integer(1),
            Token::Semi,
        ]
    );
}

#[test]
fn spans_point_into_the_source() {
    let positioned = lex_with_span("int x;");
    assert_eq!(positioned[0].span, 0..3);
    assert_eq!(positioned[1].span, 4..5);
    assert_eq!(positioned[2].span, 5..6);
}

#[test]
fn unknown_characters_become_error_tokens() {
    let toks = tokens("int $ x;");
    assert!(toks.contains(&Token::Error));
}
