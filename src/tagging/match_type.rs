use regex::Regex;
use serde::{Deserialize, Serialize};

use super::TagRuleError;

/// How a piece of text is compared against user-supplied content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    #[default]
    Contains,
    IsExactly,
    StartsWith,
    EndsWith,
    MatchesRegex,
    DoesNotContain,
    DoesNotMatchExactly,
    DoesNotStartWith,
    DoesNotEndWith,
    DoesNotMatchRegex,
}

impl MatchType {
    pub fn is_regex(self) -> bool {
        matches!(self, MatchType::MatchesRegex | MatchType::DoesNotMatchRegex)
    }

    /// Compile `content` when this match type needs a regex.
    pub fn compile(self, content: &str) -> Result<Option<Regex>, TagRuleError> {
        if !self.is_regex() {
            return Ok(None);
        }
        Regex::new(content)
            .map(Some)
            .map_err(|source| TagRuleError::InvalidRegex {
                pattern: content.to_string(),
                source,
            })
    }

    /// Apply the comparison. Regex types use `regex`, which must be the
    /// compiled form of `content`; without it they never match.
    pub fn matches_text(self, text: &str, content: &str, regex: Option<&Regex>) -> bool {
        let regex_match = || regex.is_some_and(|re| re.is_match(text));
        match self {
            MatchType::Contains => text.contains(content),
            MatchType::IsExactly => text == content,
            MatchType::StartsWith => text.starts_with(content),
            MatchType::EndsWith => text.ends_with(content),
            MatchType::MatchesRegex => regex_match(),
            MatchType::DoesNotContain => !text.contains(content),
            MatchType::DoesNotMatchExactly => text != content,
            MatchType::DoesNotStartWith => !text.starts_with(content),
            MatchType::DoesNotEndWith => !text.ends_with(content),
            MatchType::DoesNotMatchRegex => !regex_match(),
        }
    }
}
