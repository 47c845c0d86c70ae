//! Inbound commands from the telemetry channel.
//!
//! Only the pump override is writable remotely.  A remote command is not
//! applied to the pump directly: its level is fed through the same
//! [`DebouncedInput`] that backs the physical override switch, so both
//! sources share one debounce window and one edge path.

use embassy_time::Instant;
use log::{info, warn};

use crate::error::CommandError;
use crate::sensors::{DebouncedInput, EdgeEvent};
use crate::telemetry::Topic;

/// A decoded inbound command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    /// Request the pump on (`true`) or off (`false`).
    PumpOverride(bool),
}

impl RemoteCommand {
    /// Decode a raw `(topic, payload)` pair.
    ///
    /// The payload is a decimal integer; any non-zero value means "on".
    pub fn parse(topic: &str, payload: &str) -> Result<Self, CommandError> {
        match Topic::parse(topic) {
            Some(t) if t.is_writable() => {}
            _ => return Err(CommandError::UnknownTopic),
        }
        let value: i32 = payload
            .trim()
            .parse()
            .map_err(|_| CommandError::MalformedCommand)?;
        Ok(Self::PumpOverride(value != 0))
    }
}

/// Applies remote pump commands and arbitrates them against the physical
/// override switch.
///
/// A remote level is held as the pump channel's sample until the physical
/// switch line moves; the switch then takes over again.
#[derive(Debug, Default)]
pub struct RemoteCommandHandler {
    held: Option<bool>,
    last_physical: Option<bool>,
    accepted: u32,
    rejected: u32,
}

impl RemoteCommandHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle one inbound message.
    ///
    /// Rejected commands are logged and leave all state untouched.
    pub fn on_command(
        &mut self,
        topic: &str,
        payload: &str,
        pump: &mut DebouncedInput,
        now: Instant,
    ) -> Result<Option<EdgeEvent>, CommandError> {
        let command = match RemoteCommand::parse(topic, payload) {
            Ok(c) => c,
            Err(e) => {
                self.rejected = self.rejected.saturating_add(1);
                warn!("CMD | dropped '{}' = '{}': {}", topic, payload, e);
                return Err(e);
            }
        };

        let RemoteCommand::PumpOverride(level) = command;
        self.accepted = self.accepted.saturating_add(1);
        self.held = Some(level);
        info!("CMD | pump-override <- {}", u8::from(level));
        Ok(pump.observe(level, now))
    }

    /// Sample to feed the pump channel this cycle, given the physical switch.
    pub fn pump_sample(&mut self, physical: bool) -> bool {
        if self.last_physical.is_some_and(|prev| prev != physical) && self.held.take().is_some() {
            info!("CMD | override switch moved, remote level released");
        }
        self.last_physical = Some(physical);
        self.held.unwrap_or(physical)
    }

    /// Remote level currently overriding the switch, if any.
    pub fn held_level(&self) -> Option<bool> {
        self.held
    }

    pub fn accepted(&self) -> u32 {
        self.accepted
    }

    pub fn rejected(&self) -> u32 {
        self.rejected
    }
}
