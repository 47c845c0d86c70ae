//! Controller service — the hexagonal core.
//!
//! [`Controller`] owns the switch debouncers, the safety interlock, the
//! telemetry scheduler, the remote command handler, and the state aggregate.
//! All I/O flows through port traits passed in at each call, so the whole
//! cycle runs unchanged against mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ TelemetryChannel
//!                 │          Controller           │
//! IndicatorPort ◀─│ Debounce · Interlock · Telem  │ ◀── TelemetryChannel.poll
//!                 └──────────────────────────────┘
//! ```

use embassy_time::Instant;
use log::{info, warn};

use crate::config::ControllerConfig;
use crate::error::Result;
use crate::safety::{PumpDecision, SafetyInterlock};
use crate::sensors::{
    ChannelId, DebouncedInput, EdgeEvent, FlowAccumulator, FlowMeters, PulseCounter,
    SwitchLatches,
};
use crate::state::{DirtyFlags, SystemState};
use crate::telemetry::{NoRetryPublishPolicy, PublishPolicy, PublishReport, TelemetryScheduler};

use super::commands::RemoteCommandHandler;
use super::ports::{IndicatorPort, InboundMessage, SensorPort, TelemetryChannel};

/// Inbound messages handled per cycle; the rest wait for the next pass.
const MAX_COMMANDS_PER_CYCLE: usize = 4;
/// Room for one edge per channel from sampling plus one per remote command.
const MAX_EDGES_PER_CYCLE: usize = ChannelId::COUNT + MAX_COMMANDS_PER_CYCLE;

/// ISR-shared inputs the controller reads each cycle.
#[derive(Debug, Clone, Copy)]
pub struct EdgeSources<'a> {
    pub inflow: &'a PulseCounter,
    pub return_flow: &'a PulseCounter,
    pub switches: &'a SwitchLatches,
}

/// Outcome of one control cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Stable-level transitions committed this cycle, in order.
    pub edges: heapless::Vec<EdgeEvent, MAX_EDGES_PER_CYCLE>,
    /// Interlock result after all edges were applied.
    pub decision: PumpDecision,
    pub telemetry: PublishReport,
}

/// The controller orchestrates all domain logic.
pub struct Controller<'a, P: PublishPolicy = NoRetryPublishPolicy> {
    inputs: [DebouncedInput; ChannelId::COUNT],
    state: SystemState,
    dirty: DirtyFlags,
    interlock: SafetyInterlock,
    scheduler: TelemetryScheduler<P>,
    remote: RemoteCommandHandler,
    flows: FlowMeters<'a>,
    latches: &'a SwitchLatches,
    /// Indicator levels last written; `None` until the first cycle.
    indicators: Option<[bool; ChannelId::COUNT]>,
    cycle_count: u64,
}

impl<'a> Controller<'a, NoRetryPublishPolicy> {
    /// Construct the controller with fire-and-forget publication.
    pub fn new(config: &ControllerConfig, sources: EdgeSources<'a>) -> Self {
        Self::with_policy(config, sources, NoRetryPublishPolicy)
    }
}

impl<'a, P: PublishPolicy> Controller<'a, P> {
    pub fn with_policy(config: &ControllerConfig, sources: EdgeSources<'a>, policy: P) -> Self {
        let window = config.debounce_window();
        let initial = config.initial_levels;
        let inputs = ChannelId::ALL.map(|ch| DebouncedInput::new(ch, initial.level(ch), window));

        let flows = FlowMeters::new(
            FlowAccumulator::new(sources.inflow, config.inflow_litres_per_pulse),
            FlowAccumulator::new(sources.return_flow, config.return_litres_per_pulse),
        );

        Self {
            inputs,
            state: SystemState::new(&initial),
            dirty: DirtyFlags::default(),
            interlock: SafetyInterlock::new(),
            scheduler: TelemetryScheduler::with_policy(
                config.flow_interval(),
                config.event_interval(),
                policy,
            ),
            remote: RemoteCommandHandler::new(),
            flows,
            latches: sources.switches,
            indicators: None,
            cycle_count: 0,
        }
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one full control cycle:
    /// inbound commands → switch sampling → interlock → indicators → telemetry.
    ///
    /// `hw` satisfies **both** [`SensorPort`] and [`IndicatorPort`].
    pub fn tick(
        &mut self,
        now: Instant,
        hw: &mut (impl SensorPort + IndicatorPort),
        channel: &mut impl TelemetryChannel,
    ) -> TickReport {
        self.cycle_count += 1;
        let mut edges = heapless::Vec::new();

        // 1. Remote commands (bounded per cycle)
        for _ in 0..MAX_COMMANDS_PER_CYCLE {
            let Some(msg) = channel.poll() else { break };
            if let Ok(Some(edge)) = self.handle_inbound(&msg, now) {
                self.apply_edge(edge, &mut edges);
            }
        }

        // 2. Switch sampling through the debouncers
        let pending = self.latches.take_all();
        let raw = hw.read_switches();
        for ch in ChannelId::ALL {
            let sample = match ch {
                ChannelId::PumpOverride => self.remote.pump_sample(raw.get(ch)),
                _ => raw.get(ch),
            };
            if let Some(edge) = self.inputs[ch.index()].observe(sample, now) {
                self.apply_edge(edge, &mut edges);
            }
        }

        // 3. Safety interlock, every cycle
        let decision = self.interlock.evaluate(&mut self.state, &mut self.dirty);

        // 4. Indicators follow stable state
        self.drive_indicators(hw);

        // 5. Telemetry
        let hazard_pending = pending.any_hazard()
            || self.input(ChannelId::ReservoirCritical).is_settling()
            || self.input(ChannelId::PipeOverflow).is_settling();
        let telemetry = self.scheduler.run(
            now,
            &mut self.state,
            &mut self.dirty,
            &mut self.flows,
            hazard_pending,
            channel,
        );

        TickReport {
            edges,
            decision,
            telemetry,
        }
    }

    /// Apply one inbound message.  Errors are logged by the handler and
    /// returned for inspection; they never stop the control loop.
    ///
    /// A returned edge has not been applied to state yet; [`tick`](Self::tick)
    /// does that.
    pub fn handle_inbound(&mut self, msg: &InboundMessage, now: Instant) -> Result<Option<EdgeEvent>> {
        let pump = &mut self.inputs[ChannelId::PumpOverride.index()];
        let edge = self
            .remote
            .on_command(msg.topic.as_str(), msg.payload.as_str(), pump, now)?;
        Ok(edge.or_else(|| self.reassert_pump()))
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> &SystemState {
        &self.state
    }

    pub fn dirty(&self) -> &DirtyFlags {
        &self.dirty
    }

    pub fn interlock(&self) -> &SafetyInterlock {
        &self.interlock
    }

    pub fn remote(&self) -> &RemoteCommandHandler {
        &self.remote
    }

    /// Debounced level of a switch channel (not the interlocked pump state).
    pub fn stable_level(&self, channel: ChannelId) -> bool {
        self.input(channel).stable_level()
    }

    /// Control cycles run since start-up.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    // ── Internal ──────────────────────────────────────────────

    fn input(&self, channel: ChannelId) -> &DebouncedInput {
        &self.inputs[channel.index()]
    }

    /// An accepted command that matches the debounced pump level is not an
    /// edge, but it is still an explicit request.  After the interlock has
    /// forced the pump off and the hazard has cleared, it turns the pump
    /// back on.
    fn reassert_pump(&self) -> Option<EdgeEvent> {
        let level = self.remote.held_level()?;
        let pump = self.input(ChannelId::PumpOverride);
        let reasserted = level == pump.stable_level()
            && !pump.is_settling()
            && level != self.state.pump_enabled
            && !self.state.hazard_active();
        reasserted.then(|| {
            info!("CMD | pump-override {} re-asserted after interlock", u8::from(level));
            EdgeEvent {
                channel: ChannelId::PumpOverride,
                level,
            }
        })
    }

    /// Commit an edge to state; mark dirty only on a real value change.
    fn apply_edge(
        &mut self,
        edge: EdgeEvent,
        edges: &mut heapless::Vec<EdgeEvent, MAX_EDGES_PER_CYCLE>,
    ) {
        info!("EDGE | {} -> {}", edge.channel, u8::from(edge.level));
        if self.state.set_level(edge.channel, edge.level) {
            self.dirty.mark(edge.channel);
        }
        if edges.push(edge).is_err() {
            warn!("EDGE | report full, {} edge not listed", edge.channel);
        }
    }

    fn drive_indicators(&mut self, hw: &mut impl IndicatorPort) {
        let wanted = self.state.indicator_levels();
        for ch in ChannelId::ALL {
            let on = wanted[ch.index()];
            let changed = self
                .indicators
                .is_none_or(|shown| shown[ch.index()] != on);
            if changed {
                hw.set_indicator(ch, on);
            }
        }
        self.indicators = Some(wanted);
    }
}
