//! Lexer/tokenizer for the filter DSL.

use winnow::ascii::space0;
use winnow::combinator::alt;
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{one_of, take_till, take_while};

use super::error::FormatError;

/// Token types for the DSL.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Value(String),   // bare or quoted tag
    Pattern(String), // text between the slashes of /regex/

    // Boolean operators
    And, // &
    Or,  // |
    Not, // !

    // Punctuation
    LParen, // (
    RParen, // )

    // End of input
    Eof,
}

impl Token {
    /// Whether this token can begin a `primary`.
    pub fn starts_primary(&self) -> bool {
        matches!(
            self,
            Token::Value(_) | Token::Pattern(_) | Token::LParen | Token::Not
        )
    }

    pub fn describe(&self) -> String {
        match self {
            Token::Value(value) => format!("literal `{}`", value),
            Token::Pattern(pattern) => format!("pattern `/{}/`", pattern),
            Token::And => "`&`".to_string(),
            Token::Or => "`|`".to_string(),
            Token::Not => "`!`".to_string(),
            Token::LParen => "`(`".to_string(),
            Token::RParen => "`)`".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}

pub const QUOTES: [char; 3] = ['"', '\'', '`'];

/// Characters that end a bare literal.
pub fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '(' | ')' | '&' | '|' | '!') || QUOTES.contains(&c)
}

// Manually define PResult for resilience against winnow version changes
type PResult<T> = Result<T, ErrMode<ContextError>>;

fn cut<T>() -> PResult<T> {
    Err(ErrMode::Cut(ContextError::default()))
}

/// Lex a quoted literal. The content is taken verbatim up to the next
/// occurrence of the opening quote.
fn lex_quoted(input: &mut &str) -> PResult<Token> {
    let quote = one_of(QUOTES).parse_next(input)?;
    let content = take_till(0.., move |c: char| c == quote).parse_next(input)?;
    if !input.starts_with(quote) {
        return cut();
    }
    *input = &input[quote.len_utf8()..];
    Ok(Token::Value(content.to_string()))
}

/// Byte offset of the slash closing a regex literal, if any.
///
/// A backslash toggles the escape state and any other character clears it,
/// so `\\/` is an escaped backslash followed by the closing slash.
pub fn closing_slash(body: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in body.char_indices() {
        if c == '\\' {
            escaped = !escaped;
        } else if c == '/' && !escaped {
            return Some(i);
        } else {
            escaped = false;
        }
    }
    None
}

/// Lex a regex literal: `/pattern/`.
fn lex_pattern(input: &mut &str) -> PResult<Token> {
    "/".parse_next(input)?;
    let Some(end) = closing_slash(input) else {
        return cut();
    };
    let pattern = input[..end].to_string();
    *input = &input[end + 1..];
    Ok(Token::Pattern(pattern))
}

/// Lex a bare literal, running until the next separator.
fn lex_bare(input: &mut &str) -> PResult<Token> {
    let value = take_while(1.., |c: char| !is_separator(c)).parse_next(input)?;
    Ok(Token::Value(value.to_string()))
}

/// Lex a single token.
fn lex_token(input: &mut &str) -> PResult<Token> {
    space0.parse_next(input)?;

    if input.is_empty() {
        return Ok(Token::Eof);
    }

    alt((
        "&".value(Token::And),
        "|".value(Token::Or),
        "!".value(Token::Not),
        "(".value(Token::LParen),
        ")".value(Token::RParen),
        lex_quoted,
        lex_pattern,
        lex_bare,
    ))
    .parse_next(input)
}

/// Tokenize the entire input. The result always ends with [`Token::Eof`].
pub fn tokenize(input: &str) -> Result<Vec<Token>, FormatError> {
    let mut remaining = input;
    let mut tokens = Vec::new();

    loop {
        let start = remaining.trim_start_matches([' ', '\t']);
        match lex_token(&mut remaining) {
            Ok(Token::Eof) => break,
            Ok(tok) => tokens.push(tok),
            Err(_) => {
                return Err(match start.chars().next() {
                    Some('/') => FormatError::missing_end_slash(),
                    Some(c) if QUOTES.contains(&c) => FormatError::missing_end_quote(),
                    _ => FormatError::unexpected_end(),
                });
            }
        }
    }

    tokens.push(Token::Eof);
    Ok(tokens)
}
