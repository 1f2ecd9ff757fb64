//! Renders an AST back into filter syntax.
//!
//! The output parses back to an equal AST. It is canonical: redundant
//! parentheses and quotes from the original input are dropped.

use std::fmt;

use super::ast::FilterAst;
use super::error::{FormatError, FormatErrorKind};
use super::lexer::{QUOTES, closing_slash, is_separator};

impl FilterAst {
    /// Render this filter as parseable text.
    ///
    /// Fails only for ASTs the grammar cannot express: a literal containing
    /// all three quote characters, or an empty `&`/`|` group.
    pub fn to_filter_string(&self) -> Result<String, FormatError> {
        let mut out = String::new();
        write_filter(self, &mut out)?;
        Ok(out)
    }
}

/// Filter syntax, or the `Debug` form for an AST that
/// [`FilterAst::to_filter_string`] rejects.
impl fmt::Display for FilterAst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_filter_string() {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "{self:?}"),
        }
    }
}

fn write_filter(ast: &FilterAst, out: &mut String) -> Result<(), FormatError> {
    match ast {
        FilterAst::Literal(content) => write_literal(content, out),
        FilterAst::RegExp(re) => {
            out.push('/');
            out.push_str(&escape_slashes(re.as_str()));
            out.push('/');
            Ok(())
        }
        FilterAst::Not(inner) => {
            out.push('!');
            if inner.is_primary() {
                write_filter(inner, out)
            } else {
                out.push('(');
                write_filter(inner, out)?;
                out.push(')');
                Ok(())
            }
        }
        FilterAst::And(children) => write_group(children, " & ", out),
        FilterAst::Or(children) => write_group(children, " | ", out),
    }
}

fn write_group(
    children: &[FilterAst],
    separator: &str,
    out: &mut String,
) -> Result<(), FormatError> {
    if children.is_empty() {
        return Err(FormatError::new(
            FormatErrorKind::Unrepresentable,
            format!("Cannot format an empty `{}` group", separator.trim()),
        ));
    }
    let wrap_or = separator == " & ";
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        // `|` binds looser than `&`
        if wrap_or && matches!(child, FilterAst::Or(_)) {
            out.push('(');
            write_filter(child, out)?;
            out.push(')');
        } else {
            write_filter(child, out)?;
        }
    }
    Ok(())
}

fn needs_quotes(content: &str) -> bool {
    content.is_empty()
        || content.starts_with('/')
        || content.chars().any(|c| is_separator(c) || c.is_whitespace())
}

fn write_literal(content: &str, out: &mut String) -> Result<(), FormatError> {
    if !needs_quotes(content) {
        out.push_str(content);
        return Ok(());
    }
    let Some(quote) = QUOTES.iter().copied().find(|q| !content.contains(*q)) else {
        return Err(FormatError::new(
            FormatErrorKind::Unrepresentable,
            format!(
                "Literal `{}` contains every quote character and cannot be formatted",
                content
            ),
        ));
    };
    out.push(quote);
    out.push_str(content);
    out.push(quote);
    Ok(())
}

/// Escape every slash the lexer would read as the end of the pattern.
fn escape_slashes(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;
    while let Some(end) = closing_slash(rest) {
        out.push_str(&rest[..end]);
        out.push_str("\\/");
        rest = &rest[end + 1..];
    }
    out.push_str(rest);
    out
}
