//! Sensor inputs: four debounced switch channels and two flowmeter pulse
//! counters.
//!
//! ## Execution contexts
//!
//! ```text
//!  GPIO ISR (flow)   ──▶ PulseCounter::on_edge   (atomic fetch_add)
//!  GPIO ISR (switch) ──▶ EdgeLatch::on_edge      (atomic store)
//!                              │
//!  Control loop ◀──────────────┘  drain() / take() / DebouncedInput::observe()
//! ```
//!
//! Everything in [`debounce`] is touched only from the control loop.  The
//! ISR-facing types in [`flow`] and [`latch`] are `const`-constructible so
//! they can live in statics that interrupt callbacks reach without closures.

pub mod debounce;
pub mod flow;
pub mod latch;

use core::fmt;

pub use debounce::{DebouncedInput, EdgeEvent};
pub use flow::{FlowAccumulator, FlowMeters, FlowSample, PulseCounter};
pub use latch::{EdgeLatch, PendingEdges, SwitchLatches};

/// Identifies one of the four digital switch inputs.
///
/// Each channel maps to exactly one published quantity and one indicator
/// output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelId {
    /// Manual pump override switch (closed = pump requested on).
    PumpOverride,
    /// Upper reservoir float switch: level getting low.
    ReservoirWarning,
    /// Lower reservoir float switch: level critically low.
    ReservoirCritical,
    /// Float switch in the return pipe: water backing up.
    PipeOverflow,
}

impl ChannelId {
    /// Every channel, in index order.
    pub const ALL: [ChannelId; 4] = [
        ChannelId::PumpOverride,
        ChannelId::ReservoirWarning,
        ChannelId::ReservoirCritical,
        ChannelId::PipeOverflow,
    ];

    /// Number of switch channels.
    pub const COUNT: usize = Self::ALL.len();

    /// Stable array index for per-channel tables.
    pub const fn index(self) -> usize {
        match self {
            Self::PumpOverride => 0,
            Self::ReservoirWarning => 1,
            Self::ReservoirCritical => 2,
            Self::PipeOverflow => 3,
        }
    }

    /// True for the inputs that trip the pump interlock.
    pub const fn is_hazard(self) -> bool {
        matches!(self, Self::ReservoirCritical | Self::PipeOverflow)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PumpOverride => write!(f, "pump-override"),
            Self::ReservoirWarning => write!(f, "reservoir-warning"),
            Self::ReservoirCritical => write!(f, "reservoir-critical"),
            Self::PipeOverflow => write!(f, "pipe-overflow"),
        }
    }
}

/// Raw logical levels of all four switch lines, sampled in one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwitchLevels([bool; ChannelId::COUNT]);

impl SwitchLevels {
    pub const fn new(levels: [bool; ChannelId::COUNT]) -> Self {
        Self(levels)
    }

    pub fn get(&self, channel: ChannelId) -> bool {
        self.0[channel.index()]
    }

    pub fn set(&mut self, channel: ChannelId, level: bool) {
        self.0[channel.index()] = level;
    }
}
