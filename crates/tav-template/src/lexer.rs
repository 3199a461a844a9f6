//! Tokenizer for template field statements.
//!
//! A statement is mostly free text: only the six structural characters
//! `( ) , - | *` delimit anything, and everything between them (spaces and
//! periods included) is a single text run. Whether a given `-` or `|`
//! actually acts as a delimiter depends on its position relative to
//! parentheses, so that decision is left entirely to the parser — the lexer
//! just reports what it sees, with byte spans into the statement.

use logos::Logos;
use std::fmt;

/// Byte range into the source a token or error covers.
pub type Span = std::ops::Range<usize>;

/// Token type for template statements.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Left parenthesis `(` — opens a nested sub-statement.
    LParen,
    /// Right parenthesis `)`.
    RParen,
    /// Comma `,` — choice separator at parenthesis depth zero.
    Comma,
    /// Dash `-` — value/condition separator, position-dependent.
    Dash,
    /// Pipe `|` — dependency-clause marker, position-dependent.
    Pipe,
    /// Asterisk `*` — repeat-multiplier marker after an integer prefix.
    Star,
    /// A run of non-structural text (identifiers, file names, spaces).
    Text(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Dash => write!(f, "-"),
            Token::Pipe => write!(f, "|"),
            Token::Star => write!(f, "*"),
            Token::Text(t) => write!(f, "{t}"),
        }
    }
}

/// Internal logos token — borrows from source, converted to owned `Token`.
#[derive(Logos, Debug)]
enum RawToken {
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(",")]
    Comma,

    #[token("-")]
    Dash,

    #[token("|")]
    Pipe,

    #[token("*")]
    Star,

    #[regex(r"[^(),|*\n-]+")]
    Text,
}

/// Lex one statement into `(Token, Span)` pairs.
///
/// Spans are byte offsets into `source`, so callers that lex a slice of a
/// larger file shift them by the slice's base offset when reporting errors.
/// The only characters a statement can't contain are newlines, so this never
/// fails for the line-based input the template loader feeds it.
pub fn lex(source: &str) -> Vec<(Token, Span)> {
    let mut tokens = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let token = match result {
            Ok(RawToken::LParen) => Token::LParen,
            Ok(RawToken::RParen) => Token::RParen,
            Ok(RawToken::Comma) => Token::Comma,
            Ok(RawToken::Dash) => Token::Dash,
            Ok(RawToken::Pipe) => Token::Pipe,
            Ok(RawToken::Star) => Token::Star,
            Ok(RawToken::Text) => Token::Text(lexer.slice().to_string()),
            // Every non-newline character is covered by some rule; a stray
            // newline degrades to text rather than aborting the statement.
            Err(()) => Token::Text(source[span.clone()].to_string()),
        };
        tokens.push((token, span));
    }

    tokens
}
