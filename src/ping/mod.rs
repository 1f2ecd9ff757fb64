//! Ping results, the sessions that produce them, and per-target history.

mod history;

pub use history::PingHistory;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded, unbounded};
use std::thread::JoinHandle;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::targets::Target;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PingStatus {
    Unknown,
    Success,
    TimedOut,
    Unreachable,
    Failed,
}

impl PingStatus {
    /// Anything other than `Success` or `Unknown`.
    pub fn is_failure(self) -> bool {
        !matches!(self, PingStatus::Success | PingStatus::Unknown)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingResult {
    pub status: PingStatus,
    pub timestamp: OffsetDateTime,
}

impl PingResult {
    pub fn new(status: PingStatus) -> Self {
        Self {
            status,
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    pub fn format_timestamp(&self) -> Option<String> {
        self.timestamp.format(&Rfc3339).ok()
    }
}

/// Something that can ping a target repeatedly.
pub trait Pinger {
    fn start(&self, target: &Target) -> PingSession;
}

/// A running stream of results for one target.
///
/// The producer thread stops on [`PingSession::stop`] or when the session
/// is dropped.
#[derive(Debug)]
pub struct PingSession {
    results: Receiver<PingResult>,
    stop: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl PingSession {
    /// Run `produce` on its own thread. It receives the result sender and a
    /// stop receiver; the stop receiver disconnects when the session ends.
    pub fn spawn<F>(produce: F) -> Self
    where
        F: FnOnce(Sender<PingResult>, Receiver<()>) + Send + 'static,
    {
        let (result_tx, result_rx) = unbounded();
        let (stop_tx, stop_rx) = bounded(0);
        let worker = std::thread::spawn(move || produce(result_tx, stop_rx));
        Self {
            results: result_rx,
            stop: Some(stop_tx),
            worker: Some(worker),
        }
    }

    pub fn results(&self) -> &Receiver<PingResult> {
        &self.results
    }

    pub fn stop(&mut self) {
        drop(self.stop.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("Ping worker panicked");
            }
        }
    }
}

impl Drop for PingSession {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Produces `Success`, then flips between `Success` and `TimedOut` after
/// every `repeats` results. Never touches the network.
#[derive(Debug, Clone, Copy)]
pub struct TogglePinger {
    repeats: u32,
}

impl TogglePinger {
    pub fn new(repeats: u32) -> Self {
        Self {
            repeats: repeats.max(1),
        }
    }
}

impl Default for TogglePinger {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Pinger for TogglePinger {
    fn start(&self, target: &Target) -> PingSession {
        let repeats = self.repeats;
        let cool_down = target.cool_down();
        let name = target.display_name();
        PingSession::spawn(move |results, stop| {
            tracing::debug!("Toggle pinger started for {}", name);
            let mut status = PingStatus::Success;
            let mut count = 0;
            loop {
                if results.send(PingResult::new(status)).is_err() {
                    break;
                }
                match stop.recv_timeout(cool_down) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
                count += 1;
                if count == repeats {
                    status = match status {
                        PingStatus::Success => PingStatus::TimedOut,
                        _ => PingStatus::Success,
                    };
                    count = 0;
                }
            }
            tracing::debug!("Toggle pinger stopped for {}", name);
        })
    }
}
