use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

pub const WARNING_SECS: i64 = 600;
pub const CRITICAL_SECS: i64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Normal,
    Warning,
    Critical,
}

impl Severity {
    pub fn for_remaining(secs: i64) -> Severity {
        if secs <= CRITICAL_SECS {
            Severity::Critical
        } else if secs <= WARNING_SECS {
            Severity::Warning
        } else {
            Severity::Normal
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Tick { remaining: i64, severity: Severity },
    Expired,
}

/// Cancellation handle of one running countdown.
#[derive(Debug, Clone)]
pub struct CountdownHandle {
    cancelled: Arc<AtomicBool>,
}

impl CountdownHandle {
    fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns `true` only for the call that actually cancelled.
    pub fn cancel(&self) -> bool {
        !self.cancelled.swap(true, Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Cooperative one-second countdown, polled from the UI loop.
///
/// Nothing runs in the background: `poll` compares the caller's `now`
/// against the next due second, so a late caller catches up in one step.
#[derive(Debug, Default)]
pub struct CountdownScheduler {
    handle: Option<CountdownHandle>,
    remaining: i64,
    next_tick: Option<DateTime<Utc>>,
}

impl CountdownScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting down from `remaining`, replacing any running countdown.
    pub fn start(&mut self, remaining: i64, now: DateTime<Utc>) -> CountdownHandle {
        self.cancel();
        let handle = CountdownHandle::new();
        self.handle = Some(handle.clone());
        self.remaining = remaining.max(0);
        self.next_tick = Some(now + Duration::seconds(1));
        tracing::debug!(remaining = self.remaining, "countdown started");
        handle
    }

    /// Stop the countdown. Safe to call any number of times.
    pub fn cancel(&mut self) -> bool {
        match &self.handle {
            Some(handle) => {
                let first = handle.cancel();
                if first {
                    tracing::debug!(remaining = self.remaining, "countdown cancelled");
                }
                first
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_cancelled())
    }

    pub fn remaining(&self) -> i64 {
        self.remaining
    }

    pub fn severity(&self) -> Severity {
        Severity::for_remaining(self.remaining)
    }

    /// The next `poll` at `now` would report expiry.
    pub fn expires_by(&self, now: DateTime<Utc>) -> bool {
        if !self.is_running() {
            return false;
        }
        match self.next_tick {
            Some(due) if now >= due => self.remaining <= 1 + (now - due).num_seconds(),
            _ => false,
        }
    }

    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<TimerEvent> {
        if !self.is_running() {
            return None;
        }
        let due = self.next_tick?;
        if now < due {
            return None;
        }

        let ticks = 1 + (now - due).num_seconds();
        self.next_tick = Some(due + Duration::seconds(ticks));
        self.remaining = self.remaining.saturating_sub(ticks).max(0);

        if self.remaining == 0 {
            if let Some(handle) = &self.handle {
                handle.cancel();
            }
            tracing::info!("countdown expired");
            return Some(TimerEvent::Expired);
        }

        Some(TimerEvent::Tick {
            remaining: self.remaining,
            severity: self.severity(),
        })
    }
}

/// Compact countdown text for the title bar: `1:02:03`, `12:05`.
pub fn format_clock(total_secs: i64) -> String {
    let secs = total_secs.max(0);
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Human-sized span: `2d 3h`, `1h 05m`, `4m 10s`, `9s`.
pub fn format_wait_duration(total_secs: i64) -> String {
    if total_secs <= 0 {
        return "now".to_string();
    }
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {:02}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {:02}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
