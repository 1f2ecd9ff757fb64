//! AST types for the filter DSL.

use regex::Regex;

use super::error::FormatError;

/// Root filter expression.
#[derive(Debug, Clone)]
pub enum FilterAst {
    /// Exact tag: `web`, `"has space"`
    Literal(String),

    /// Any tag matching a regex: `/^prod-/`
    RegExp(Regex),

    /// Boolean NOT: `!expr`
    Not(Box<FilterAst>),

    /// Boolean AND: `expr1 & expr2`
    And(Vec<FilterAst>),

    /// Boolean OR: `expr1 | expr2`
    Or(Vec<FilterAst>),
}

impl PartialEq for FilterAst {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FilterAst::Literal(a), FilterAst::Literal(b)) => a == b,
            (FilterAst::RegExp(a), FilterAst::RegExp(b)) => a.as_str() == b.as_str(),
            (FilterAst::Not(a), FilterAst::Not(b)) => a == b,
            (FilterAst::And(a), FilterAst::And(b)) => a == b,
            (FilterAst::Or(a), FilterAst::Or(b)) => a == b,
            _ => false,
        }
    }
}

impl FilterAst {
    pub fn literal(content: impl Into<String>) -> Self {
        FilterAst::Literal(content.into())
    }

    /// Compile `pattern` into a regex node.
    pub fn regexp(pattern: &str) -> Result<Self, FormatError> {
        Regex::new(pattern)
            .map(FilterAst::RegExp)
            .map_err(|e| FormatError::invalid_regex(pattern, e))
    }

    pub fn not(inner: FilterAst) -> Self {
        FilterAst::Not(Box::new(inner))
    }

    /// Build an AND node, absorbing the children of any AND operand.
    pub fn and(filters: impl IntoIterator<Item = FilterAst>) -> Self {
        let mut flat = Vec::new();
        for filter in filters {
            match filter {
                FilterAst::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        FilterAst::And(flat)
    }

    /// Build an OR node, absorbing the children of any OR operand.
    pub fn or(filters: impl IntoIterator<Item = FilterAst>) -> Self {
        let mut flat = Vec::new();
        for filter in filters {
            match filter {
                FilterAst::Or(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        FilterAst::Or(flat)
    }

    /// Simplify a hand-built AST: flatten nested And/Or at every level and
    /// unwrap single-child groups.
    pub fn simplify(self) -> Self {
        match self {
            FilterAst::And(exprs) => {
                let mut flat = FilterAst::and(exprs.into_iter().map(FilterAst::simplify));
                if let FilterAst::And(children) = &mut flat {
                    if children.len() == 1 {
                        if let Some(only) = children.pop() {
                            return only;
                        }
                    }
                }
                flat
            }
            FilterAst::Or(exprs) => {
                let mut flat = FilterAst::or(exprs.into_iter().map(FilterAst::simplify));
                if let FilterAst::Or(children) = &mut flat {
                    if children.len() == 1 {
                        if let Some(only) = children.pop() {
                            return only;
                        }
                    }
                }
                flat
            }
            FilterAst::Not(inner) => FilterAst::not(inner.simplify()),
            other => other,
        }
    }

    /// Whether this node prints as a `primary` and needs no parentheses
    /// after `!`.
    pub fn is_primary(&self) -> bool {
        matches!(
            self,
            FilterAst::Literal(_) | FilterAst::RegExp(_) | FilterAst::Not(_)
        )
    }
}
