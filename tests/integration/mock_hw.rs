//! Mock board and telemetry channel for integration tests.
//!
//! Records every indicator write and every publish attempt so tests can
//! assert on the full history without touching real GPIO or a broker.

use std::collections::VecDeque;

use embassy_time::Instant;
use reservoir::app::ports::{IndicatorPort, InboundMessage, SensorPort, TelemetryChannel};
use reservoir::app::service::{Controller, EdgeSources, TickReport};
use reservoir::sensors::{ChannelId, PulseCounter, SwitchLatches, SwitchLevels};
use reservoir::telemetry::Topic;

// ── ISR-shared sources ────────────────────────────────────────

/// Per-test stand-ins for the interrupt-fed statics.
pub struct Sources {
    pub inflow: PulseCounter,
    pub return_flow: PulseCounter,
    pub latches: SwitchLatches,
}

impl Sources {
    pub fn new() -> Self {
        Self {
            inflow: PulseCounter::new(),
            return_flow: PulseCounter::new(),
            latches: SwitchLatches::new(),
        }
    }

    pub fn edge_sources(&self) -> EdgeSources<'_> {
        EdgeSources {
            inflow: &self.inflow,
            return_flow: &self.return_flow,
            switches: &self.latches,
        }
    }
}

// ── MockBoard ─────────────────────────────────────────────────

pub struct MockBoard {
    pub levels: SwitchLevels,
    pub leds: Vec<(ChannelId, bool)>,
}

#[allow(dead_code)]
impl MockBoard {
    /// Lines in `ChannelId::ALL` order.
    pub fn new(levels: [bool; ChannelId::COUNT]) -> Self {
        Self {
            levels: SwitchLevels::new(levels),
            leds: Vec::new(),
        }
    }

    /// Pump override closed, all float switches open.
    pub fn idle() -> Self {
        Self::new([true, false, false, false])
    }

    pub fn set(&mut self, channel: ChannelId, level: bool) {
        self.levels.set(channel, level);
    }

    /// Last level written to an indicator, if any.
    pub fn led(&self, channel: ChannelId) -> Option<bool> {
        self.leds
            .iter()
            .rev()
            .find(|(ch, _)| *ch == channel)
            .map(|(_, on)| *on)
    }
}

impl SensorPort for MockBoard {
    fn read_switches(&mut self) -> SwitchLevels {
        self.levels
    }
}

impl IndicatorPort for MockBoard {
    fn set_indicator(&mut self, channel: ChannelId, on: bool) {
        self.leds.push((channel, on));
    }
}

// ── RecordingChannel ──────────────────────────────────────────

pub struct RecordingChannel {
    pub inbound: VecDeque<InboundMessage>,
    pub attempts: Vec<(Topic, i32)>,
    pub accept: bool,
}

#[allow(dead_code)]
impl RecordingChannel {
    pub fn new() -> Self {
        Self {
            inbound: VecDeque::new(),
            attempts: Vec::new(),
            accept: true,
        }
    }

    pub fn send(&mut self, topic: &str, payload: &str) {
        let msg = InboundMessage::try_new(topic, payload).expect("test message fits bounds");
        self.inbound.push_back(msg);
    }

    /// Attempts for one topic, in order.
    pub fn values(&self, topic: Topic) -> Vec<i32> {
        self.attempts
            .iter()
            .filter(|(t, _)| *t == topic)
            .map(|(_, v)| *v)
            .collect()
    }
}

impl TelemetryChannel for RecordingChannel {
    fn publish(&mut self, topic: Topic, value: i32) -> bool {
        self.attempts.push((topic, value));
        self.accept
    }

    fn poll(&mut self) -> Option<InboundMessage> {
        self.inbound.pop_front()
    }
}

// ── Clock helpers ─────────────────────────────────────────────

/// Control cycle period used by every scenario.
pub const CYCLE_MS: u64 = 10;

pub fn at(ms: u64) -> Instant {
    Instant::from_millis(ms)
}

/// Tick every `CYCLE_MS` over `[from, to)` and return the reports.
#[allow(dead_code)]
pub fn run_span(
    ctl: &mut Controller<'_>,
    board: &mut MockBoard,
    channel: &mut RecordingChannel,
    from: u64,
    to: u64,
) -> Vec<TickReport> {
    (from..to)
        .step_by(CYCLE_MS as usize)
        .map(|t| ctl.tick(at(t), board, channel))
        .collect()
}
