//! Filter DSL for target tag matching.
//!
//! Syntax:
//!   tag                     - target has the tag
//!   "tag with spaces"       - quoted tag, also '...' and `...`
//!   /regex/                 - some tag matches the regex
//!   expr1 & expr2           - AND
//!   expr1 | expr2           - OR (note: lower precedence than &)
//!   !expr                   - NOT
//!   (expr)                  - grouping

mod ast;
mod error;
mod eval;
mod lexer;
mod parser;
mod print;

pub use ast::*;
pub use error::{FormatError, FormatErrorKind, Operator};
pub use eval::{TagSet, evaluate_filter};
pub use lexer::{Token, tokenize};
pub use parser::{parse_filter, try_parse_filter};
