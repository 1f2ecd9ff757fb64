//! Structured filters assembled from criteria instead of typed expressions.
//!
//! Each node either tests one text of a target (its label, its address, or
//! its tags) with a [`MatchType`], or combines child criteria. A text
//! criterion that is not yet valid (blank content, bad regex) lets every
//! target through so a half-edited filter never hides the whole list.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::tagging::{MatchType, TagRuleError};
use crate::targets::Target;

/// Which part of a target a text criterion inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionSource {
    Label,
    Address,
    AnyTag,
    AllTags,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "of")]
pub enum Criterion {
    #[default]
    Unfiltered,
    Text {
        source: CriterionSource,
        #[serde(default)]
        match_type: MatchType,
        content: String,
    },
    All(Vec<Criterion>),
    Any(Vec<Criterion>),
    Not(Box<Criterion>),
}

impl Criterion {
    pub fn text(
        source: CriterionSource,
        match_type: MatchType,
        content: impl Into<String>,
    ) -> Self {
        Criterion::Text {
            source,
            match_type,
            content: content.into(),
        }
    }

    /// Check every text criterion in the tree.
    pub fn validate(&self) -> Result<(), TagRuleError> {
        match self {
            Criterion::Unfiltered => Ok(()),
            Criterion::Text {
                match_type,
                content,
                ..
            } => {
                if content.trim().is_empty() {
                    return Err(TagRuleError::BlankContent);
                }
                match_type.compile(content).map(|_| ())
            }
            Criterion::All(children) | Criterion::Any(children) => {
                children.iter().try_for_each(Criterion::validate)
            }
            Criterion::Not(inner) => inner.validate(),
        }
    }

    /// Compile regexes once so a list can be filtered without recompiling
    /// per target.
    pub fn compile(&self) -> CompiledCriterion {
        match self {
            Criterion::Unfiltered => CompiledCriterion::Pass,
            Criterion::Text {
                source,
                match_type,
                content,
            } => {
                if content.trim().is_empty() {
                    return CompiledCriterion::Pass;
                }
                match match_type.compile(content) {
                    Ok(regex) => CompiledCriterion::Text {
                        source: *source,
                        match_type: *match_type,
                        content: content.clone(),
                        regex,
                    },
                    Err(e) => {
                        tracing::debug!("Criterion ignored until fixed: {}", e);
                        CompiledCriterion::Pass
                    }
                }
            }
            Criterion::All(children) => {
                CompiledCriterion::All(children.iter().map(Criterion::compile).collect())
            }
            Criterion::Any(children) => {
                CompiledCriterion::Any(children.iter().map(Criterion::compile).collect())
            }
            Criterion::Not(inner) => CompiledCriterion::Not(Box::new(inner.compile())),
        }
    }

    pub fn matches(&self, target: &Target, tags: &BTreeSet<String>) -> bool {
        self.compile().matches(target, tags)
    }
}

/// A [`Criterion`] with its regexes compiled.
#[derive(Debug, Clone)]
pub enum CompiledCriterion {
    Pass,
    Text {
        source: CriterionSource,
        match_type: MatchType,
        content: String,
        regex: Option<Regex>,
    },
    All(Vec<CompiledCriterion>),
    Any(Vec<CompiledCriterion>),
    Not(Box<CompiledCriterion>),
}

impl CompiledCriterion {
    /// `tags` are the target's effective tags.
    pub fn matches(&self, target: &Target, tags: &BTreeSet<String>) -> bool {
        match self {
            CompiledCriterion::Pass => true,
            CompiledCriterion::Text {
                source,
                match_type,
                content,
                regex,
            } => {
                let test = |text: &str| match_type.matches_text(text, content, regex.as_ref());
                match source {
                    CriterionSource::Label => test(target.label().unwrap_or_default()),
                    CriterionSource::Address => test(&target.address().to_string()),
                    CriterionSource::AnyTag => tags.iter().any(|t| test(t)),
                    CriterionSource::AllTags => tags.iter().all(|t| test(t)),
                }
            }
            CompiledCriterion::All(children) => children.iter().all(|c| c.matches(target, tags)),
            CompiledCriterion::Any(children) => children.iter().any(|c| c.matches(target, tags)),
            CompiledCriterion::Not(inner) => !inner.matches(target, tags),
        }
    }
}
