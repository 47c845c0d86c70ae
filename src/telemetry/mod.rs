//! Outbound state publication.
//!
//! [`Topic`] names the six quantities exchanged with the remote dashboard.
//! [`scheduler::TelemetryScheduler`] decides when each one goes out;
//! [`policy`] decides what happens when the channel refuses a send.

pub mod policy;
pub mod scheduler;

use core::fmt;

use crate::sensors::ChannelId;

pub use policy::{FailureAction, NoRetryPublishPolicy, PublishPhase, PublishPolicy};
pub use scheduler::{PublishReport, TelemetryScheduler};

/// Telemetry topic identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    InflowRate,
    ReturnFlowRate,
    ReservoirWarning,
    ReservoirCritical,
    PipeOverflow,
    /// Pump state out, override commands in.
    PumpOverride,
}

impl Topic {
    pub const ALL: [Topic; 6] = [
        Topic::InflowRate,
        Topic::ReturnFlowRate,
        Topic::ReservoirWarning,
        Topic::ReservoirCritical,
        Topic::PipeOverflow,
        Topic::PumpOverride,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InflowRate => "inflow-rate",
            Self::ReturnFlowRate => "return-flow-rate",
            Self::ReservoirWarning => "reservoir-warning",
            Self::ReservoirCritical => "reservoir-critical",
            Self::PipeOverflow => "pipe-overflow",
            Self::PumpOverride => "pump-override",
        }
    }

    /// Look up a topic by its wire name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// Topic carrying the stable value of `channel`.
    pub const fn for_channel(channel: ChannelId) -> Self {
        match channel {
            ChannelId::PumpOverride => Self::PumpOverride,
            ChannelId::ReservoirWarning => Self::ReservoirWarning,
            ChannelId::ReservoirCritical => Self::ReservoirCritical,
            ChannelId::PipeOverflow => Self::PipeOverflow,
        }
    }

    /// The switch channel behind this topic, if any.
    pub const fn channel(self) -> Option<ChannelId> {
        match self {
            Self::InflowRate | Self::ReturnFlowRate => None,
            Self::ReservoirWarning => Some(ChannelId::ReservoirWarning),
            Self::ReservoirCritical => Some(ChannelId::ReservoirCritical),
            Self::PipeOverflow => Some(ChannelId::PipeOverflow),
            Self::PumpOverride => Some(ChannelId::PumpOverride),
        }
    }

    /// Only the pump override accepts inbound writes.
    pub const fn is_writable(self) -> bool {
        matches!(self, Self::PumpOverride)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire value for a switch quantity.
pub fn level_value(level: bool) -> i32 {
    i32::from(level)
}

/// Wire value for a flow quantity: whole litres, rounded, saturating.
pub fn litres_value(litres: f32) -> i32 {
    // `as` saturates on overflow and maps NaN to 0.
    litres.round() as i32
}
