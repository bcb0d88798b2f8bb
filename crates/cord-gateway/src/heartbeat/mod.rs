//! Heartbeat scheduling
//!
//! The scheduler owns the single heartbeat timer of a session. It does not
//! sleep by itself: the client loop waits on [`HeartbeatScheduler::deadline`]
//! and calls back into the session when it elapses, so timer expiry and frame
//! processing never run concurrently.

use std::time::Duration;
use tokio::time::Instant;

/// Convert a gateway heartbeat interval in milliseconds to seconds
#[must_use]
pub fn heartbeat_interval_to_seconds(interval_ms: u64) -> f64 {
    (interval_ms / 1000) as f64 + (interval_ms % 1000) as f64 * 0.001
}

/// Whether `sequence` holds a received sequence number rather than the `-1` sentinel
#[must_use]
pub const fn is_valid_sequence(sequence: i64) -> bool {
    sequence >= 0
}

/// Repeating heartbeat timer
#[derive(Debug, Clone, Default)]
pub struct HeartbeatScheduler {
    period: Option<Duration>,
    period_secs: Option<f64>,
    deadline: Option<Instant>,
    fired: u64,
}

impl HeartbeatScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer to fire every `interval_ms`, first at `now + interval`
    ///
    /// Restarting an active scheduler replaces its timer.
    pub fn start(&mut self, interval_ms: u64, now: Instant) {
        let secs = heartbeat_interval_to_seconds(interval_ms);
        let period = Duration::from_secs_f64(secs);

        self.period = Some(period);
        self.period_secs = Some(secs);
        self.deadline = Some(now + period);
        self.fired = 0;

        tracing::debug!(period_secs = secs, "Heartbeat timer armed");
    }

    /// Disarm the timer. Must happen before the transport it sends on is dropped.
    pub fn stop(&mut self) {
        if self.deadline.take().is_some() {
            tracing::debug!(fired = self.fired, "Heartbeat timer stopped");
        }
        self.period = None;
        self.period_secs = None;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.deadline.is_some()
    }

    /// Instant of the next fire, `None` while stopped
    #[inline]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    #[inline]
    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    /// Repeat interval in seconds, as computed from the gateway interval
    #[inline]
    pub fn period_secs(&self) -> Option<f64> {
        self.period_secs
    }

    /// Number of times the timer fired since it was last started
    #[inline]
    pub fn fired(&self) -> u64 {
        self.fired
    }

    #[inline]
    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Consume a due fire and rearm for another interval after `now`
    ///
    /// Returns `false` when the timer is stopped or not yet due.
    pub fn fire(&mut self, now: Instant) -> bool {
        if !self.is_due(now) {
            return false;
        }
        let Some(period) = self.period else {
            return false;
        };

        self.fired += 1;
        self.deadline = Some(now + period);
        true
    }
}
