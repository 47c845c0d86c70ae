//! Log-backed telemetry channel.
//!
//! Implements [`TelemetryChannel`] by writing every publish to the logger
//! and taking inbound commands from a bounded `embassy-sync` queue.  The
//! queue is fed by whatever owns the real transport (a network task, a
//! serial reader, a test).  A broker-backed adapter would implement the same
//! trait.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{info, warn};

use crate::app::ports::{InboundMessage, TelemetryChannel};
use crate::telemetry::Topic;

/// Inbound queue depth.
pub const INBOUND_DEPTH: usize = 8;

/// Transport task → control loop.
pub type InboundQueue = Channel<CriticalSectionRawMutex, InboundMessage, INBOUND_DEPTH>;

/// Process-wide inbound queue for the simulator's reader thread.
pub static INBOUND_COMMANDS: InboundQueue = Channel::new();

/// Queue one raw inbound message.  Returns `false` if it was too long or
/// the queue is full.
pub fn submit(queue: &InboundQueue, topic: &str, payload: &str) -> bool {
    let Some(msg) = InboundMessage::try_new(topic, payload) else {
        warn!("inbound '{}' dropped: exceeds message bounds", topic);
        return false;
    };
    if queue.try_send(msg).is_err() {
        warn!("inbound '{}' dropped: queue full", topic);
        return false;
    }
    true
}

/// Channel adapter that logs every publish.
pub struct LogChannel<'a> {
    inbound: &'a InboundQueue,
    online: bool,
    published: u32,
}

impl<'a> LogChannel<'a> {
    pub fn new(inbound: &'a InboundQueue) -> Self {
        Self {
            inbound,
            online: true,
            published: 0,
        }
    }

    /// While offline every publish is rejected.
    pub fn set_online(&mut self, online: bool) {
        self.online = online;
    }

    /// Publishes accepted so far.
    pub fn published(&self) -> u32 {
        self.published
    }
}

impl TelemetryChannel for LogChannel<'_> {
    fn publish(&mut self, topic: Topic, value: i32) -> bool {
        if !self.online {
            return false;
        }
        self.published = self.published.wrapping_add(1);
        info!("TELEM | {} = {}", topic, value);
        true
    }

    fn poll(&mut self) -> Option<InboundMessage> {
        self.inbound.try_receive().ok()
    }
}
