//! Error type shared by the lexer, parser and printer.

use std::error::Error as StdError;
use std::fmt;

/// Boolean operator named in a missing-operand error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
    Not,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::And => write!(f, "&"),
            Operator::Or => write!(f, "|"),
            Operator::Not => write!(f, "!"),
        }
    }
}

/// Why a filter could not be read or written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatErrorKind {
    UnexpectedEnd,
    UnexpectedToken,
    MissingEndQuote,
    MissingEndSlash,
    MissingEndParenthesis,
    MissingOperand(Operator),
    InvalidRegex,
    Unrepresentable,
}

/// A malformed filter expression, or an AST that cannot be printed.
///
/// The message is what a user sees next to the filter box. `source()` walks
/// the chain of causes, e.g. the end-of-input error behind a missing `&`
/// operand or the `regex` compile error behind an invalid pattern.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct FormatError {
    kind: FormatErrorKind,
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl FormatError {
    pub fn new(kind: FormatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
    ) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> FormatErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub(crate) fn unexpected_end() -> Self {
        Self::new(FormatErrorKind::UnexpectedEnd, "Unexpected end of input")
    }

    pub(crate) fn missing_end_quote() -> Self {
        Self::new(FormatErrorKind::MissingEndQuote, "Missing end quote")
    }

    pub(crate) fn missing_end_slash() -> Self {
        Self::new(FormatErrorKind::MissingEndSlash, "Missing end slash")
    }

    pub(crate) fn missing_end_parenthesis() -> Self {
        Self::new(
            FormatErrorKind::MissingEndParenthesis,
            "Missing end parenthesis",
        )
    }

    pub(crate) fn missing_operand(op: Operator, cause: FormatError) -> Self {
        Self::new(
            FormatErrorKind::MissingOperand(op),
            format!("Operand missing after `{}`", op),
        )
        .with_source(cause)
    }

    pub(crate) fn invalid_regex(pattern: &str, cause: regex::Error) -> Self {
        Self::new(
            FormatErrorKind::InvalidRegex,
            format!("Invalid regular expression `{}`", pattern),
        )
        .with_source(cause)
    }
}
