//! Pump safety interlock.
//!
//! Runs **every control cycle after the switch channels are sampled**, not
//! only on edges, so a hazard already present at power-on is enforced on the
//! first pass.
//!
//! ## Interlock lifecycle
//!
//! 1. The critical or overflow float switch goes active.
//! 2. The interlock sets the matching hazard bit and forces
//!    `pump_enabled = false` (dirty only if it actually changed).
//! 3. While any bit is set the pump stays forced off on every cycle,
//!    whatever the override switch or remote command says.
//! 4. When the hazard clears the bit clears, but the pump is **not**
//!    restored.  It comes back only on a fresh pump edge, physical or
//!    remote, after the hazard is gone.

use core::fmt;

use log::{error, info};

use crate::sensors::ChannelId;
use crate::state::{DirtyFlags, SystemState};

/// Conditions that force the pump off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Hazard {
    /// Return pipe backing up.
    PipeOverflow = 0b0000_0001,
    /// Reservoir below the critical float.
    ReservoirCritical = 0b0000_0010,
}

impl Hazard {
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Hazard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PipeOverflow => write!(f, "pipe overflow"),
            Self::ReservoirCritical => write!(f, "reservoir critical"),
        }
    }
}

/// Outcome of one interlock evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpDecision {
    /// No hazard; the commanded pump state stands.
    Allowed,
    /// Pump forced off.  Carries the active hazard bitmask.
    Forced { hazards: u8 },
}

impl PumpDecision {
    pub fn is_forced(&self) -> bool {
        matches!(self, Self::Forced { .. })
    }
}

/// Safety interlock.
#[derive(Debug, Default)]
pub struct SafetyInterlock {
    /// Active hazard bitmask.
    hazards: u8,
    /// Times the interlock actually switched the pump off.
    trips: u32,
}

impl SafetyInterlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the interlock rule to `state`, marking the pump dirty if forced
    /// off from on.
    pub fn evaluate(&mut self, state: &mut SystemState, dirty: &mut DirtyFlags) -> PumpDecision {
        self.eval_hazard(Hazard::PipeOverflow, state.pipe_overflow);
        self.eval_hazard(Hazard::ReservoirCritical, state.reservoir_critical);

        if self.hazards == 0 {
            return PumpDecision::Allowed;
        }

        if state.set_level(ChannelId::PumpOverride, false) {
            self.trips = self.trips.saturating_add(1);
            dirty.mark(ChannelId::PumpOverride);
            error!("INTERLOCK: pump forced off, hazards=0b{:02b}", self.hazards);
        }

        PumpDecision::Forced {
            hazards: self.hazards,
        }
    }

    /// Current hazard bitmask.
    pub fn hazards(&self) -> u8 {
        self.hazards
    }

    pub fn has_hazard(&self, hazard: Hazard) -> bool {
        self.hazards & hazard.mask() != 0
    }

    /// Number of times the pump has been forced off since start-up.
    pub fn trips(&self) -> u32 {
        self.trips
    }

    // ── Internal ──────────────────────────────────────────────────

    fn eval_hazard(&mut self, hazard: Hazard, active: bool) {
        if active {
            if self.hazards & hazard.mask() == 0 {
                error!("HAZARD SET: {hazard}");
            }
            self.hazards |= hazard.mask();
        } else {
            if self.hazards & hazard.mask() != 0 {
                info!("HAZARD CLEARED: {hazard} (pump stays off until commanded)");
            }
            self.hazards &= !hazard.mask();
        }
    }
}
