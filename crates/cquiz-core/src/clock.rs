//! Countdown for timed sessions.
//!
//! [`Countdown`] is the plain decrementing counter. [`SessionClock`] drives it
//! from a tokio task once per period and reports over a channel. Neither
//! touches the session: the caller reacts to [`ClockEvent::Expired`] by
//! grading the answer currently on screen and calling `finish()` once.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Notification from the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// One period passed; `remaining` seconds are left.
    Tick { remaining: u64 },
    /// Time ran out. Sent exactly once.
    Expired,
}

/// Remaining-time counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining: u64,
    expired: bool,
}

impl Countdown {
    pub fn new(limit_secs: u64) -> Self {
        Self {
            remaining: limit_secs,
            expired: false,
        }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Count down one second. Yields [`ClockEvent::Expired`] the first time the
    /// counter reaches zero and `None` on every tick after that.
    pub fn tick(&mut self) -> Option<ClockEvent> {
        if self.expired {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.expired = true;
            Some(ClockEvent::Expired)
        } else {
            Some(ClockEvent::Tick {
                remaining: self.remaining,
            })
        }
    }
}

/// Format seconds as `MM:SS`.
pub fn format_remaining(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// A running countdown task.
///
/// Dropping the clock stops the task.
pub struct SessionClock {
    events: mpsc::Receiver<ClockEvent>,
    task: JoinHandle<()>,
}

impl SessionClock {
    /// Start a one-second countdown from `limit_secs`.
    pub fn start(limit_secs: u64) -> Self {
        Self::with_period(limit_secs, Duration::from_secs(1))
    }

    /// Start a countdown that ticks every `period`. Must be called inside a
    /// tokio runtime.
    pub fn with_period(limit_secs: u64, period: Duration) -> Self {
        let (tx, events) = mpsc::channel(8);
        let mut countdown = Countdown::new(limit_secs);

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
            loop {
                ticker.tick().await;
                let Some(event) = countdown.tick() else {
                    break;
                };
                if tx.send(event).await.is_err() {
                    tracing::debug!("clock receiver dropped, stopping");
                    break;
                }
                if event == ClockEvent::Expired {
                    tracing::info!(limit_secs, "time limit reached");
                    break;
                }
            }
        });

        Self { events, task }
    }

    /// Wait for the next event. Returns `None` once the clock has stopped.
    pub async fn next_event(&mut self) -> Option<ClockEvent> {
        self.events.recv().await
    }

    /// Stop ticking without waiting.
    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for SessionClock {
    fn drop(&mut self) {
        self.task.abort();
    }
}
