//! Ping targets and the ordered store that holds them.

mod store;

pub use store::{StoreEvent, TargetStore};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::net::IpAddr;
use std::time::Duration;

/// Longest allowed pause between two pings of one target.
pub const MAX_COOL_DOWN: Duration = Duration::from_secs(24 * 60 * 60);

pub const DEFAULT_COOL_DOWN: Duration = Duration::from_secs(1);

/// Cool downs are stored in whole milliseconds.
pub const MIN_COOL_DOWN: Duration = Duration::from_millis(1);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("cool down must be at least one millisecond")]
    CoolDownTooShort,

    #[error("cool down must not exceed one day, got {0:?}")]
    CoolDownTooLong(Duration),

    #[error("index {index} is out of range for {len} targets")]
    IndexOutOfRange { index: usize, len: usize },
}

/// A network address to ping, with an optional label and its own tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTarget", into = "RawTarget")]
pub struct Target {
    address: IpAddr,
    label: Option<String>,
    cool_down: Duration,
    tags: BTreeSet<String>,
}

impl Target {
    /// Sub-millisecond parts of `cool_down` are dropped.
    pub fn new(
        address: IpAddr,
        label: Option<String>,
        cool_down: Duration,
        tags: impl IntoIterator<Item = String>,
    ) -> Result<Self, TargetError> {
        if cool_down < MIN_COOL_DOWN {
            return Err(TargetError::CoolDownTooShort);
        }
        let cool_down = Duration::from_millis(cool_down.as_millis() as u64);
        if cool_down > MAX_COOL_DOWN {
            return Err(TargetError::CoolDownTooLong(cool_down));
        }
        Ok(Self {
            address,
            label: label.filter(|l| !l.trim().is_empty()),
            cool_down,
            tags: tags.into_iter().collect(),
        })
    }

    pub fn address(&self) -> IpAddr {
        self.address
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn cool_down(&self) -> Duration {
        self.cool_down
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Label if set, address otherwise.
    pub fn display_name(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => self.address.to_string(),
        }
    }
}

/// On-disk shape of a [`Target`].
#[derive(Debug, Serialize, Deserialize)]
struct RawTarget {
    address: IpAddr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(default = "default_cool_down_ms")]
    cool_down_ms: u64,
    #[serde(default)]
    tags: BTreeSet<String>,
}

fn default_cool_down_ms() -> u64 {
    DEFAULT_COOL_DOWN.as_millis() as u64
}

impl TryFrom<RawTarget> for Target {
    type Error = TargetError;

    fn try_from(raw: RawTarget) -> Result<Self, Self::Error> {
        Target::new(
            raw.address,
            raw.label,
            Duration::from_millis(raw.cool_down_ms),
            raw.tags,
        )
    }
}

impl From<Target> for RawTarget {
    fn from(target: Target) -> Self {
        RawTarget {
            address: target.address,
            label: target.label,
            cool_down_ms: target.cool_down.as_millis() as u64,
            tags: target.tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn localhost() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    #[test]
    fn rejects_zero_cool_down() {
        let err = Target::new(localhost(), None, Duration::ZERO, []).unwrap_err();
        assert_eq!(err, TargetError::CoolDownTooShort);
    }

    #[test]
    fn rejects_sub_millisecond_cool_down() {
        let err = Target::new(localhost(), None, Duration::from_micros(500), []).unwrap_err();
        assert_eq!(err, TargetError::CoolDownTooShort);
        assert!(Target::new(localhost(), None, MIN_COOL_DOWN, []).is_ok());
    }

    #[test]
    fn cool_down_survives_storage() {
        let target = Target::new(localhost(), None, Duration::from_micros(1500), []).unwrap();
        assert_eq!(target.cool_down(), Duration::from_millis(1));
        let json = serde_json::to_value(&target).unwrap();
        assert_eq!(json["cool_down_ms"], 1);
        assert_eq!(serde_json::from_value::<Target>(json).unwrap(), target);
    }

    #[test]
    fn rejects_cool_down_over_a_day() {
        let too_long = MAX_COOL_DOWN + Duration::from_millis(1);
        assert!(matches!(
            Target::new(localhost(), None, too_long, []),
            Err(TargetError::CoolDownTooLong(_))
        ));
        assert!(Target::new(localhost(), None, MAX_COOL_DOWN, []).is_ok());
    }

    #[test]
    fn blank_label_is_dropped() {
        let target = Target::new(localhost(), Some("  ".into()), DEFAULT_COOL_DOWN, []).unwrap();
        assert_eq!(target.label(), None);
        assert_eq!(target.display_name(), "127.0.0.1");
    }

    #[test]
    fn json_uses_milliseconds_and_validates() {
        let target = Target::new(
            localhost(),
            Some("router".into()),
            Duration::from_millis(1500),
            ["lan".to_string()],
        )
        .unwrap();
        let json = serde_json::to_value(&target).unwrap();
        assert_eq!(json["cool_down_ms"], 1500);
        assert_eq!(json["address"], "127.0.0.1");

        let back: Target = serde_json::from_value(json).unwrap();
        assert_eq!(back, target);

        let invalid = serde_json::json!({ "address": "10.0.0.1", "cool_down_ms": 0 });
        assert!(serde_json::from_value::<Target>(invalid).is_err());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let target: Target = serde_json::from_str(r#"{ "address": "::1" }"#).unwrap();
        assert_eq!(target.cool_down(), DEFAULT_COOL_DOWN);
        assert!(target.tags().is_empty());
    }
}
