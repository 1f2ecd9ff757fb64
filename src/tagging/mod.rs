//! Automatic tags derived from a target's label or address.

mod match_type;

pub use match_type::MatchType;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::targets::Target;

#[derive(Debug, thiserror::Error)]
pub enum TagRuleError {
    #[error("match content must not be blank")]
    BlankContent,

    #[error("tag must not be blank")]
    BlankTag,

    #[error("invalid regular expression `{pattern}`")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Which text of a target an automatic tag rule inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagSource {
    Label,
    Address,
}

impl TagSource {
    /// The label (empty when unset) or the address text.
    pub fn text_of(self, target: &Target) -> String {
        match self {
            TagSource::Label => target.label().unwrap_or_default().to_string(),
            TagSource::Address => target.address().to_string(),
        }
    }
}

/// Adds `tag` to every target whose source text satisfies the match.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawTagRule", into = "RawTagRule")]
pub struct AutomaticTagEntry {
    source: TagSource,
    match_type: MatchType,
    content: String,
    tag: String,
    regex: Option<Regex>,
}

impl AutomaticTagEntry {
    pub fn new(
        source: TagSource,
        match_type: MatchType,
        content: impl Into<String>,
        tag: impl Into<String>,
    ) -> Result<Self, TagRuleError> {
        let content = content.into();
        let tag = tag.into();
        if content.trim().is_empty() {
            return Err(TagRuleError::BlankContent);
        }
        if tag.trim().is_empty() {
            return Err(TagRuleError::BlankTag);
        }
        let regex = match_type.compile(&content)?;
        Ok(Self {
            source,
            match_type,
            content,
            tag,
            regex,
        })
    }

    pub fn source(&self) -> TagSource {
        self.source
    }

    pub fn match_type(&self) -> MatchType {
        self.match_type
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn matches(&self, target: &Target) -> bool {
        let text = self.source.text_of(target);
        self.match_type
            .matches_text(&text, &self.content, self.regex.as_ref())
    }
}

impl PartialEq for AutomaticTagEntry {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.match_type == other.match_type
            && self.content == other.content
            && self.tag == other.tag
    }
}

/// A target's own tags plus the tags of every rule it satisfies.
pub fn effective_tags(target: &Target, rules: &[AutomaticTagEntry]) -> BTreeSet<String> {
    let mut tags = target.tags().clone();
    for rule in rules {
        if rule.matches(target) {
            tags.insert(rule.tag.clone());
        }
    }
    tags
}

/// Every tag in use: rule tags and the targets' own tags, sorted.
pub fn all_tags<'a>(
    targets: impl IntoIterator<Item = &'a Target>,
    rules: &[AutomaticTagEntry],
) -> BTreeSet<String> {
    let mut tags: BTreeSet<String> = rules.iter().map(|r| r.tag.clone()).collect();
    for target in targets {
        tags.extend(target.tags().iter().cloned());
    }
    tags
}

#[derive(Debug, Serialize, Deserialize)]
struct RawTagRule {
    source: TagSource,
    match_type: MatchType,
    content: String,
    tag: String,
}

impl TryFrom<RawTagRule> for AutomaticTagEntry {
    type Error = TagRuleError;

    fn try_from(raw: RawTagRule) -> Result<Self, Self::Error> {
        AutomaticTagEntry::new(raw.source, raw.match_type, raw.content, raw.tag)
    }
}

impl From<AutomaticTagEntry> for RawTagRule {
    fn from(entry: AutomaticTagEntry) -> Self {
        RawTagRule {
            source: entry.source,
            match_type: entry.match_type,
            content: entry.content,
            tag: entry.tag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targets::DEFAULT_COOL_DOWN;
    use std::net::IpAddr;

    fn target(address: &str, label: Option<&str>, tags: &[&str]) -> Target {
        Target::new(
            address.parse::<IpAddr>().unwrap(),
            label.map(str::to_string),
            DEFAULT_COOL_DOWN,
            tags.iter().map(|t| t.to_string()),
        )
        .unwrap()
    }

    #[test]
    fn rejects_blank_fields() {
        assert!(matches!(
            AutomaticTagEntry::new(TagSource::Label, MatchType::Contains, " ", "x"),
            Err(TagRuleError::BlankContent)
        ));
        assert!(matches!(
            AutomaticTagEntry::new(TagSource::Label, MatchType::Contains, "x", ""),
            Err(TagRuleError::BlankTag)
        ));
    }

    #[test]
    fn rejects_invalid_regex_only_for_regex_types() {
        assert!(matches!(
            AutomaticTagEntry::new(TagSource::Label, MatchType::MatchesRegex, "a(", "x"),
            Err(TagRuleError::InvalidRegex { .. })
        ));
        assert!(AutomaticTagEntry::new(TagSource::Label, MatchType::Contains, "a(", "x").is_ok());
    }

    #[test]
    fn label_rule_matches_missing_label_as_empty() {
        let rule =
            AutomaticTagEntry::new(TagSource::Label, MatchType::DoesNotContain, "core", "edge")
                .unwrap();
        assert!(rule.matches(&target("10.0.0.1", None, &[])));
        assert!(!rule.matches(&target("10.0.0.1", Some("core-sw1"), &[])));
    }

    #[test]
    fn effective_tags_add_rule_tags() {
        let rules = vec![
            AutomaticTagEntry::new(TagSource::Address, MatchType::StartsWith, "10.", "lan")
                .unwrap(),
            AutomaticTagEntry::new(TagSource::Address, MatchType::MatchesRegex, r":", "v6")
                .unwrap(),
        ];
        let tags = effective_tags(&target("10.1.2.3", None, &["web"]), &rules);
        assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["lan", "web"]);

        let tags = effective_tags(&target("fe80::1", None, &[]), &rules);
        assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["v6"]);
    }

    #[test]
    fn all_tags_is_sorted_union() {
        let rules = vec![
            AutomaticTagEntry::new(TagSource::Label, MatchType::IsExactly, "gw", "gateway")
                .unwrap(),
        ];
        let targets = [
            target("10.0.0.1", None, &["web"]),
            target("10.0.0.2", None, &["db", "web"]),
        ];
        let tags = all_tags(&targets, &rules);
        assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["db", "gateway", "web"]);
    }

    #[test]
    fn serde_round_trip_recompiles() {
        let rule =
            AutomaticTagEntry::new(TagSource::Label, MatchType::MatchesRegex, "^sw-\\d+$", "switch")
                .unwrap();
        let json = serde_json::to_string(&rule).unwrap();
        let back: AutomaticTagEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rule);
        assert!(back.matches(&target("10.0.0.1", Some("sw-12"), &[])));

        let bad = r#"{"source":"label","match_type":"matches_regex","content":"(","tag":"x"}"#;
        assert!(serde_json::from_str::<AutomaticTagEntry>(bad).is_err());
    }
}
