//! Evaluator for the filter DSL AST.

use super::ast::FilterAst;
use std::collections::{BTreeSet, HashSet};
use std::hash::BuildHasher;

/// A target's tags as seen by the evaluator.
pub trait TagSet {
    fn contains_tag(&self, tag: &str) -> bool;

    fn any_tag<F: FnMut(&str) -> bool>(&self, predicate: F) -> bool;
}

impl TagSet for BTreeSet<String> {
    fn contains_tag(&self, tag: &str) -> bool {
        self.contains(tag)
    }

    fn any_tag<F: FnMut(&str) -> bool>(&self, mut predicate: F) -> bool {
        self.iter().any(|t| predicate(t))
    }
}

impl<S: BuildHasher> TagSet for HashSet<String, S> {
    fn contains_tag(&self, tag: &str) -> bool {
        self.contains(tag)
    }

    fn any_tag<F: FnMut(&str) -> bool>(&self, mut predicate: F) -> bool {
        self.iter().any(|t| predicate(t))
    }
}

impl<T: AsRef<str>> TagSet for [T] {
    fn contains_tag(&self, tag: &str) -> bool {
        self.iter().any(|t| t.as_ref() == tag)
    }

    fn any_tag<F: FnMut(&str) -> bool>(&self, mut predicate: F) -> bool {
        self.iter().any(|t| predicate(t.as_ref()))
    }
}

impl<T: AsRef<str>> TagSet for Vec<T> {
    fn contains_tag(&self, tag: &str) -> bool {
        self.as_slice().contains_tag(tag)
    }

    fn any_tag<F: FnMut(&str) -> bool>(&self, predicate: F) -> bool {
        self.as_slice().any_tag(predicate)
    }
}

/// Evaluate a filter AST against a set of tags.
pub fn evaluate_filter<T: TagSet + ?Sized>(ast: &FilterAst, tags: &T) -> bool {
    match ast {
        FilterAst::Literal(content) => tags.contains_tag(content),

        FilterAst::RegExp(re) => tags.any_tag(|tag| re.is_match(tag)),

        FilterAst::Not(inner) => !evaluate_filter(inner, tags),

        FilterAst::And(exprs) => exprs.iter().all(|e| evaluate_filter(e, tags)),

        FilterAst::Or(exprs) => exprs.iter().any(|e| evaluate_filter(e, tags)),
    }
}

impl FilterAst {
    pub fn is_match<T: TagSet + ?Sized>(&self, tags: &T) -> bool {
        evaluate_filter(self, tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::parse_filter;

    fn tags(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_literal_is_exact() {
        let ast = parse_filter("web").unwrap();
        assert!(ast.is_match(&tags(&["web", "eu"])));
        assert!(!ast.is_match(&tags(&["webserver"])));
    }

    #[test]
    fn test_and_not() {
        let ast = parse_filter("web & !down").unwrap();
        assert!(!ast.is_match(&tags(&["web", "down"])));
        assert!(ast.is_match(&tags(&["web"])));
        assert!(!ast.is_match(&tags(&["down"])));
    }

    #[test]
    fn test_or() {
        let ast = parse_filter("a | b | c").unwrap();
        assert!(ast.is_match(&tags(&["c"])));
        assert!(!ast.is_match(&tags(&["d"])));
    }

    #[test]
    fn test_regex_matches_any_tag() {
        let ast = parse_filter("/^prod-/").unwrap();
        assert!(ast.is_match(&tags(&["prod-1"])));
        assert!(ast.is_match(&tags(&["dev-1", "prod-2"])));
        assert!(!ast.is_match(&tags(&["dev-1"])));
    }

    #[test]
    fn test_precedence() {
        let ast = parse_filter("a & b | c").unwrap();
        assert!(ast.is_match(&tags(&["a", "b"])));
        assert!(ast.is_match(&tags(&["c"])));
        assert!(!ast.is_match(&tags(&["a"])));
        assert!(!ast.is_match(&tags(&["b"])));
    }

    #[test]
    fn test_empty_tag_set() {
        let empty = tags(&[]);
        assert!(!parse_filter("a").unwrap().is_match(&empty));
        assert!(!parse_filter("/.*/").unwrap().is_match(&empty));
        assert!(parse_filter("!a").unwrap().is_match(&empty));
    }

    #[test]
    fn test_degenerate_groups() {
        let empty = tags(&[]);
        assert!(FilterAst::And(vec![]).is_match(&empty));
        assert!(!FilterAst::Or(vec![]).is_match(&empty));
    }

    #[test]
    fn test_other_tag_set_types() {
        let ast = parse_filter("web & /^eu-/").unwrap();
        assert!(ast.is_match(&["web", "eu-west"][..]));
        assert!(ast.is_match(&vec!["eu-1".to_string(), "web".to_string()]));
        let set: HashSet<String> = ["web".to_string()].into_iter().collect();
        assert!(!ast.is_match(&set));
    }
}
