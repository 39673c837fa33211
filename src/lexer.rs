//lexical analysis,
//breaks the source text down into tokens
//that are then parsed into the AST
//uses the logos library

use logos::Logos;

#[derive(Logos, Debug, PartialEq, Clone)]
pub enum Token {
    // Keywords
    #[token("extern")]
    Extern,
    #[token("return")]
    Return,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,

    // Assignment
    #[token("=")]
    Assign,
    #[token("+=")]
    PlusAssign,
    #[token("-=")]
    MinusAssign,
    #[token("*=")]
    MulAssign,
    #[token("/=")]
    DivAssign,

    // Arithmetic
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,

    // Comparisons
    #[token("==")]
    Eq,
    #[token("!=")]
    Ne,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,

    #[token("!")]
    Bang,

    //Whitespace
    #[regex(r"\s+", logos::skip)]
    Whitespace,

    // Comments
    #[regex(r"//[^\r\n]*", logos::skip)]
    Comment,

    // Names (type names are ordinary identifiers, the lowering validates them)
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // Double values
    #[regex(r"[0-9]+\.[0-9]+", |lex| lex.slice().parse().unwrap_or(0.0))]
    Double(f64),

    // Integer values
    #[regex("[0-9]+", |lex| lex.slice().parse().unwrap_or(0))]
    Integer(i64),

    // Strings, kept raw with the surrounding quotes; escapes are decoded
    // during lowering
    #[regex(r#""([^"\\]|\\.)*""#, |lex| lex.slice().to_string())]
    Str(String),

    Error,
}

// Struct with token and its byte position in source
#[derive(Debug)]
pub struct PositionedToken {
    pub token: Token,
    pub span: std::ops::Range<usize>,
}

// Lexing function, returns tokens with spans
pub fn lex_with_span(source: &str) -> Vec<PositionedToken> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(token) => tokens.push(PositionedToken { token, span }),
            Err(_) => tokens.push(PositionedToken {
                token: Token::Error,
                span,
            }),
        }
    }

    tokens
}
