//! Parser for the filter DSL.
//!
//! Grammar (in rough EBNF):
//!
//! filter   = or_expr
//! or_expr  = and_expr ("|" and_expr)*
//! and_expr = primary ("&" primary)*
//! primary  = "(" or_expr ")" | "!" primary | VALUE | PATTERN

use super::ast::FilterAst;
use super::error::{FormatError, FormatErrorKind, Operator};
use super::lexer::{Token, tokenize};

/// Parser state.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens.get(self.pos).cloned().unwrap_or(Token::Eof);
        self.pos += 1;
        tok
    }

    /// Error for a token that cannot appear where a primary is required.
    fn unexpected(&self) -> FormatError {
        match self.peek() {
            Token::Eof => FormatError::unexpected_end(),
            tok => FormatError::new(
                FormatErrorKind::UnexpectedToken,
                format!("Unexpected {}", tok.describe()),
            ),
        }
    }

    /// Parse the operand that must follow `op`.
    fn parse_operand(
        &mut self,
        op: Operator,
        parse: fn(&mut Self) -> Result<FilterAst, FormatError>,
    ) -> Result<FilterAst, FormatError> {
        if !self.peek().starts_primary() {
            return Err(FormatError::missing_operand(op, self.unexpected()));
        }
        parse(self)
    }

    /// Parse OR expression: and_expr ("|" and_expr)*
    fn parse_or_expr(&mut self) -> Result<FilterAst, FormatError> {
        let mut operands = vec![self.parse_and_expr()?];

        while matches!(self.peek(), Token::Or) {
            self.advance(); // consume |
            operands.push(self.parse_operand(Operator::Or, Self::parse_and_expr)?);
        }

        Ok(if operands.len() == 1 {
            operands.remove(0)
        } else {
            FilterAst::or(operands)
        })
    }

    /// Parse AND expression: primary ("&" primary)*
    fn parse_and_expr(&mut self) -> Result<FilterAst, FormatError> {
        let mut operands = vec![self.parse_primary()?];

        while matches!(self.peek(), Token::And) {
            self.advance(); // consume &
            operands.push(self.parse_operand(Operator::And, Self::parse_primary)?);
        }

        Ok(if operands.len() == 1 {
            operands.remove(0)
        } else {
            FilterAst::and(operands)
        })
    }

    /// Parse primary expression: "(" or_expr ")" | "!" primary | literal
    fn parse_primary(&mut self) -> Result<FilterAst, FormatError> {
        match self.peek().clone() {
            Token::LParen => {
                self.advance(); // consume (
                let inner = self.parse_or_expr()?;
                if !matches!(self.peek(), Token::RParen) {
                    return Err(FormatError::missing_end_parenthesis());
                }
                self.advance(); // consume )
                Ok(inner)
            }
            Token::Not => {
                self.advance(); // consume !
                let inner = self.parse_operand(Operator::Not, Self::parse_primary)?;
                Ok(FilterAst::not(inner))
            }
            Token::Value(content) => {
                self.advance();
                Ok(FilterAst::Literal(content))
            }
            Token::Pattern(pattern) => {
                self.advance();
                FilterAst::regexp(&pattern)
            }
            _ => Err(self.unexpected()),
        }
    }
}

/// Parse a filter DSL string into an AST.
pub fn parse_filter(input: &str) -> Result<FilterAst, FormatError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(FormatError::unexpected_end());
    }

    let tokens = tokenize(input)?;
    let mut parser = Parser::new(tokens);
    let ast = parser.parse_or_expr()?;

    // Ensure we consumed all tokens
    if !matches!(parser.peek(), Token::Eof) {
        return Err(FormatError::new(
            FormatErrorKind::UnexpectedToken,
            format!("Unexpected {} after expression", parser.peek().describe()),
        ));
    }

    tracing::debug!("Parsed filter {:?}", input);
    Ok(ast)
}

/// Non-failing variant of [`parse_filter`].
pub fn try_parse_filter(input: &str) -> Option<FilterAst> {
    parse_filter(input).ok()
}

impl std::str::FromStr for FilterAst {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_filter(s)
    }
}
