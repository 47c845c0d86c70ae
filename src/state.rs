//! Controller-owned state aggregate.
//!
//! `SystemState` holds the stable switch values and flow figures; `DirtyFlags`
//! marks which switch quantities still need publishing.  Both are owned by
//! the [`Controller`](crate::app::service::Controller) and lent by `&mut` to
//! the component running at each step of the cycle.

use crate::config::InitialLevels;
use crate::sensors::{ChannelId, FlowSample};

/// Everything the controller knows about the reservoir.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SystemState {
    /// Pump running.  Owned by the interlock while a hazard is active.
    pub pump_enabled: bool,
    pub reservoir_warning: bool,
    pub reservoir_critical: bool,
    pub pipe_overflow: bool,

    /// Litres through the inflow meter in the last flow window.
    pub inflow_litres: f32,
    /// Litres through the return meter in the last flow window.
    pub return_litres: f32,
    /// Inflow litres since start-up.
    pub inflow_total_litres: f64,
    /// Return litres since start-up.
    pub return_total_litres: f64,
}

impl SystemState {
    pub fn new(initial: &InitialLevels) -> Self {
        Self {
            pump_enabled: initial.pump_override,
            reservoir_warning: initial.reservoir_warning,
            reservoir_critical: initial.reservoir_critical,
            pipe_overflow: initial.pipe_overflow,
            ..Self::default()
        }
    }

    /// Current value of the quantity driven by `channel`.
    pub fn level(&self, channel: ChannelId) -> bool {
        match channel {
            ChannelId::PumpOverride => self.pump_enabled,
            ChannelId::ReservoirWarning => self.reservoir_warning,
            ChannelId::ReservoirCritical => self.reservoir_critical,
            ChannelId::PipeOverflow => self.pipe_overflow,
        }
    }

    /// Store a new value.  Returns `true` if it differed from the old one.
    pub fn set_level(&mut self, channel: ChannelId, level: bool) -> bool {
        let slot = match channel {
            ChannelId::PumpOverride => &mut self.pump_enabled,
            ChannelId::ReservoirWarning => &mut self.reservoir_warning,
            ChannelId::ReservoirCritical => &mut self.reservoir_critical,
            ChannelId::PipeOverflow => &mut self.pipe_overflow,
        };
        let changed = *slot != level;
        *slot = level;
        changed
    }

    /// True while any interlock input is active.
    pub fn hazard_active(&self) -> bool {
        self.reservoir_critical || self.pipe_overflow
    }

    /// Record one flow window.
    pub fn record_flow(&mut self, inflow: FlowSample, return_flow: FlowSample) {
        self.inflow_litres = inflow.litres;
        self.return_litres = return_flow.litres;
        self.inflow_total_litres += f64::from(inflow.litres);
        self.return_total_litres += f64::from(return_flow.litres);
    }

    /// Indicator outputs in channel order.
    pub fn indicator_levels(&self) -> [bool; ChannelId::COUNT] {
        ChannelId::ALL.map(|ch| self.level(ch))
    }
}

/// One "needs publish" flag per switch quantity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyFlags([bool; ChannelId::COUNT]);

impl DirtyFlags {
    pub fn mark(&mut self, channel: ChannelId) {
        self.0[channel.index()] = true;
    }

    pub fn clear(&mut self, channel: ChannelId) {
        self.0[channel.index()] = false;
    }

    pub fn is_set(&self, channel: ChannelId) -> bool {
        self.0[channel.index()]
    }

    pub fn any(&self) -> bool {
        self.0.iter().any(|d| *d)
    }
}
