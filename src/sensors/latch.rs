//! Per-switch edge latches set from GPIO interrupt context.
//!
//! The switch ISRs do not sample or debounce anything: each one sets a
//! single pending flag.  The control loop takes all flags once per cycle and
//! uses them to know that a line moved since the previous pass.

use core::sync::atomic::{AtomicBool, Ordering};

use super::ChannelId;

/// Latches for the four switch lines, reachable from ISR callbacks.
pub static SWITCH_LATCHES: SwitchLatches = SwitchLatches::new();

/// Register on the GPIO for `channel` (any edge).
pub fn switch_isr_handler(channel: ChannelId) {
    SWITCH_LATCHES.on_edge(channel);
}

/// One ISR-set pending flag.
#[derive(Debug, Default)]
pub struct EdgeLatch {
    pending: AtomicBool,
}

impl EdgeLatch {
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
        }
    }

    /// Mark an edge.  ISR-safe.
    pub fn on_edge(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Clear the flag, returning whether it was set.
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }
}

/// Latches for all switch channels.
#[derive(Debug, Default)]
pub struct SwitchLatches {
    latches: [EdgeLatch; ChannelId::COUNT],
}

impl SwitchLatches {
    pub const fn new() -> Self {
        Self {
            latches: [
                EdgeLatch::new(),
                EdgeLatch::new(),
                EdgeLatch::new(),
                EdgeLatch::new(),
            ],
        }
    }

    pub fn on_edge(&self, channel: ChannelId) {
        self.latches[channel.index()].on_edge();
    }

    /// Take every pending flag in one pass.
    pub fn take_all(&self) -> PendingEdges {
        let mut pending = [false; ChannelId::COUNT];
        for (slot, latch) in pending.iter_mut().zip(&self.latches) {
            *slot = latch.take();
        }
        PendingEdges(pending)
    }
}

/// Snapshot of which switch lines fired since the last cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingEdges([bool; ChannelId::COUNT]);

impl PendingEdges {
    pub fn contains(&self, channel: ChannelId) -> bool {
        self.0[channel.index()]
    }

    /// True if a critical or overflow line fired.
    pub fn any_hazard(&self) -> bool {
        ChannelId::ALL
            .iter()
            .any(|ch| ch.is_hazard() && self.contains(*ch))
    }
}
