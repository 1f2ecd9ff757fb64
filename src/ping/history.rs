use super::{PingResult, PingStatus};

/// Status transitions for one target, newest first, plus running counters.
#[derive(Debug, Clone)]
pub struct PingHistory {
    transitions: Vec<PingResult>,
    pings: u64,
    successes: u64,
    alert: bool,
}

impl Default for PingHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl PingHistory {
    pub fn new() -> Self {
        Self {
            transitions: vec![PingResult::new(PingStatus::Unknown)],
            pings: 0,
            successes: 0,
            alert: false,
        }
    }

    /// Only changes of status are kept; every result still counts.
    pub fn record(&mut self, result: PingResult) {
        if self.latest().status != result.status {
            self.transitions.insert(0, result);
            if result.status.is_failure() {
                self.alert = true;
            }
        }
        if result.status == PingStatus::Success {
            self.successes += 1;
        }
        if result.status != PingStatus::Unknown {
            self.pings += 1;
        }
    }

    pub fn latest(&self) -> &PingResult {
        &self.transitions[0]
    }

    pub fn transitions(&self) -> &[PingResult] {
        &self.transitions
    }

    pub fn ping_count(&self) -> u64 {
        self.pings
    }

    pub fn success_count(&self) -> u64 {
        self.successes
    }

    /// Fraction of pings that succeeded, `None` before the first ping.
    pub fn success_ratio(&self) -> Option<f64> {
        (self.pings > 0).then(|| self.successes as f64 / self.pings as f64)
    }

    /// Set when a failure was recorded since the alert was last cleared.
    pub fn is_alert(&self) -> bool {
        self.alert
    }

    pub fn clear_alert(&mut self) {
        self.alert = false;
    }

    /// Back to a single `Unknown` entry with zeroed counters.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Mark that pinging stopped.
    pub fn pause(&mut self) {
        if self.latest().status != PingStatus::Unknown {
            self.transitions
                .insert(0, PingResult::new(PingStatus::Unknown));
        }
    }
}
