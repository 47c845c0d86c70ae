//! Port traits — the hexagonal boundary between the controller core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller (domain)
//! ```
//!
//! Driven adapters (switch inputs, indicator outputs, telemetry transport)
//! implement these traits.  The [`Controller`](super::service::Controller)
//! consumes them via generics, so the core never touches hardware or the
//! network directly.

use crate::sensors::{ChannelId, SwitchLevels};
use crate::telemetry::Topic;

/// Longest inbound topic name accepted from the transport.
pub const MAX_TOPIC_LEN: usize = 32;
/// Longest inbound payload accepted from the transport.
pub const MAX_PAYLOAD_LEN: usize = 16;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: raw logical levels of the four switch lines.
///
/// Polarity is resolved by the adapter; `true` always means "active".
pub trait SensorPort {
    fn read_switches(&mut self) -> SwitchLevels;
}

// ───────────────────────────────────────────────────────────────
// Indicator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: one indicator output per switch quantity
/// (pump-status LED and the three alert LEDs).
pub trait IndicatorPort {
    fn set_indicator(&mut self, channel: ChannelId, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Telemetry channel (driven adapter: domain ↔ remote dashboard)
// ───────────────────────────────────────────────────────────────

/// Publish/subscribe transport to the remote dashboard.
///
/// Both calls are best-effort and bounded by the adapter; the core never
/// retries or waits on them.
pub trait TelemetryChannel {
    /// Send one value.  `true` if the transport accepted it.
    fn publish(&mut self, topic: Topic, value: i32) -> bool;

    /// Take at most one pending inbound message, without blocking.
    fn poll(&mut self) -> Option<InboundMessage>;
}

/// One inbound message exactly as the transport delivered it.
///
/// The topic stays a string so that unknown topics can be reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: heapless::String<MAX_TOPIC_LEN>,
    pub payload: heapless::String<MAX_PAYLOAD_LEN>,
}

impl InboundMessage {
    /// Copy `topic` and `payload` into bounded storage.
    ///
    /// Returns `None` if either is too long.
    pub fn try_new(topic: &str, payload: &str) -> Option<Self> {
        let mut t = heapless::String::new();
        t.push_str(topic).ok()?;
        let mut p = heapless::String::new();
        p.push_str(payload).ok()?;
        Some(Self {
            topic: t,
            payload: p,
        })
    }
}
