//! Time-hysteresis debouncer for the float and override switches.
//!
//! A raw level only becomes the stable level after it has been observed
//! unchanged for at least the debounce window.  The window restarts on every
//! raw transition, so a line that keeps chattering never commits: the wait is
//! extended for as long as the input disagrees with itself.
//!
//! ```text
//!  raw     ‾‾‾|_|‾|___________________
//!  window        ^ restart  ^ restart ──100 ms──▶ commit
//!  stable  ‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾|____
//! ```

use embassy_time::{Duration, Instant};

use super::ChannelId;

/// A committed stable-level transition on one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeEvent {
    pub channel: ChannelId,
    pub level: bool,
}

/// Debounce state for a single switch channel.
#[derive(Debug, Clone)]
pub struct DebouncedInput {
    channel: ChannelId,
    window: Duration,
    /// Last raw sample seen.
    raw_level: bool,
    /// When `raw_level` last changed.
    raw_changed_at: Instant,
    stable_level: bool,
}

impl DebouncedInput {
    /// Create a channel whose raw and stable levels both start at `initial`.
    pub fn new(channel: ChannelId, initial: bool, window: Duration) -> Self {
        Self {
            channel,
            window,
            raw_level: initial,
            raw_changed_at: Instant::from_ticks(0),
            stable_level: initial,
        }
    }

    /// Feed one raw sample taken at `now`.
    ///
    /// Returns an [`EdgeEvent`] exactly once per committed transition.
    pub fn observe(&mut self, raw: bool, now: Instant) -> Option<EdgeEvent> {
        if raw != self.raw_level {
            self.raw_level = raw;
            self.raw_changed_at = now;
            return None;
        }

        if raw == self.stable_level {
            return None;
        }

        let held = now
            .checked_duration_since(self.raw_changed_at)
            .unwrap_or(Duration::from_ticks(0));
        if held < self.window {
            return None;
        }

        self.stable_level = raw;
        Some(EdgeEvent {
            channel: self.channel,
            level: raw,
        })
    }

    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    pub fn stable_level(&self) -> bool {
        self.stable_level
    }

    pub fn raw_level(&self) -> bool {
        self.raw_level
    }

    /// True while the raw line disagrees with the stable level.
    pub fn is_settling(&self) -> bool {
        self.raw_level != self.stable_level
    }
}
