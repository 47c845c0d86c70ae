//! Controller configuration parameters
//!
//! All tunable parameters for the reservoir controller.  Defaults carry the
//! reference timing; a JSON document may override any subset of fields.

use embassy_time::Duration;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sensors::ChannelId;

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    // --- Debounce ---
    /// Time a raw switch level must hold before it becomes stable (ms)
    pub debounce_window_ms: u32,

    // --- Telemetry ---
    /// Flow publication period (seconds)
    pub flow_interval_secs: u32,
    /// Event (switch state) publication period (seconds)
    pub event_interval_secs: u32,

    // --- Flowmeters ---
    /// Inflow meter calibration (litres per pulse)
    pub inflow_litres_per_pulse: f32,
    /// Return meter calibration (litres per pulse)
    pub return_litres_per_pulse: f32,

    // --- Start-up ---
    /// Stable level each switch channel assumes before its first sample
    pub initial_levels: InitialLevels,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            debounce_window_ms: 100,

            flow_interval_secs: 30,
            event_interval_secs: 5,

            // YF-S201: ~450 pulses per litre
            inflow_litres_per_pulse: 1.0 / 450.0,
            return_litres_per_pulse: 1.0 / 450.0,

            initial_levels: InitialLevels::default(),
        }
    }
}

impl ControllerConfig {
    /// Parse a (possibly partial) JSON document and validate it.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(|e| {
            warn!("config: {}", e);
            ConfigError::Parse
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would stall debouncing or publication.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debounce_window_ms == 0 {
            return Err(ConfigError::ValidationFailed("debounce_window_ms must be > 0"));
        }
        if self.flow_interval_secs == 0 {
            return Err(ConfigError::ValidationFailed("flow_interval_secs must be > 0"));
        }
        if self.event_interval_secs == 0 {
            return Err(ConfigError::ValidationFailed("event_interval_secs must be > 0"));
        }
        if !(self.inflow_litres_per_pulse.is_finite() && self.inflow_litres_per_pulse > 0.0) {
            return Err(ConfigError::ValidationFailed(
                "inflow_litres_per_pulse must be finite and > 0",
            ));
        }
        if !(self.return_litres_per_pulse.is_finite() && self.return_litres_per_pulse > 0.0) {
            return Err(ConfigError::ValidationFailed(
                "return_litres_per_pulse must be finite and > 0",
            ));
        }
        Ok(())
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(u64::from(self.debounce_window_ms))
    }

    pub fn flow_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.flow_interval_secs))
    }

    pub fn event_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.event_interval_secs))
    }
}

/// Start-up stable levels for the four switch channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialLevels {
    pub pump_override: bool,
    pub reservoir_warning: bool,
    pub reservoir_critical: bool,
    pub pipe_overflow: bool,
}

impl Default for InitialLevels {
    fn default() -> Self {
        // Override switch closed; float switches open.
        Self {
            pump_override: true,
            reservoir_warning: false,
            reservoir_critical: false,
            pipe_overflow: false,
        }
    }
}

impl InitialLevels {
    pub fn level(&self, channel: ChannelId) -> bool {
        match channel {
            ChannelId::PumpOverride => self.pump_override,
            ChannelId::ReservoirWarning => self.reservoir_warning,
            ChannelId::ReservoirCritical => self.reservoir_critical,
            ChannelId::PipeOverflow => self.pipe_overflow,
        }
    }
}
