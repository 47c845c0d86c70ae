//! Telemetry publication scheduler.
//!
//! Two cadences run on independent timers:
//!
//! | Cadence | Default | Publishes                                   |
//! |---------|---------|---------------------------------------------|
//! | Flow    | 30 s    | both flow volumes, every tick, even if zero |
//! | Event   | 5 s     | each switch quantity whose dirty flag is set |
//!
//! Both fire on the very first cycle.  The first event tick is a forced
//! sync of all four switch quantities that ignores dirty flags and the
//! hazard gate, so the dashboard starts from known state.  Later event ticks
//! are held back while a hazard input is mid-transition, so a stale pump or
//! alarm value is not published a few milliseconds before it changes.  The
//! hold is bounded: once a tick is a full event interval overdue it
//! publishes anyway, so a float switch bobbing on every cycle cannot starve
//! the other quantities.

use embassy_time::{Duration, Instant};
use log::{debug, info, warn};

use crate::app::ports::TelemetryChannel;
use crate::error::PublishError;
use crate::sensors::{ChannelId, FlowMeters};
use crate::state::{DirtyFlags, SystemState};

use super::policy::{FailureAction, NoRetryPublishPolicy, PublishPhase, PublishPolicy};
use super::{Topic, level_value, litres_value};

/// Upper bound on publishes in one cycle: two flows + four switches.
const MAX_PUBLISHES_PER_CYCLE: usize = 6;

/// Everything the scheduler attempted in one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Accepted sends, in order.
    pub published: heapless::Vec<(Topic, i32), MAX_PUBLISHES_PER_CYCLE>,
    /// Rejected sends, in order.
    pub failed: heapless::Vec<PublishError, MAX_PUBLISHES_PER_CYCLE>,
}

impl PublishReport {
    pub fn is_empty(&self) -> bool {
        self.published.is_empty() && self.failed.is_empty()
    }

    /// Value published for `topic` this cycle, if any.
    pub fn value_of(&self, topic: Topic) -> Option<i32> {
        self.published
            .iter()
            .find(|(t, _)| *t == topic)
            .map(|(_, v)| *v)
    }
}

/// The telemetry scheduler.
pub struct TelemetryScheduler<P: PublishPolicy = NoRetryPublishPolicy> {
    flow_interval: Duration,
    event_interval: Duration,
    last_flow: Option<Instant>,
    /// `None` until the forced initial sync has run.
    last_event: Option<Instant>,
    policy: P,
}

impl TelemetryScheduler<NoRetryPublishPolicy> {
    pub fn new(flow_interval: Duration, event_interval: Duration) -> Self {
        Self::with_policy(flow_interval, event_interval, NoRetryPublishPolicy)
    }
}

impl<P: PublishPolicy> TelemetryScheduler<P> {
    pub fn with_policy(flow_interval: Duration, event_interval: Duration, policy: P) -> Self {
        Self {
            flow_interval,
            event_interval,
            last_flow: None,
            last_event: None,
            policy,
        }
    }

    /// Run both cadences for the cycle at `now`.
    ///
    /// `hazard_pending` holds back a periodic event tick (not the initial
    /// sync, and not flow publication) until the hazard inputs are quiet, or
    /// until the tick is one event interval overdue.
    pub fn run(
        &mut self,
        now: Instant,
        state: &mut SystemState,
        dirty: &mut DirtyFlags,
        flows: &mut FlowMeters<'_>,
        hazard_pending: bool,
        channel: &mut impl TelemetryChannel,
    ) -> PublishReport {
        let mut report = PublishReport::default();

        if is_due(self.last_flow, self.flow_interval, now) {
            self.last_flow = Some(now);
            self.publish_flows(state, flows, channel, &mut report);
        }

        match self.last_event {
            None => {
                self.last_event = Some(now);
                self.initial_sync(state, dirty, channel, &mut report);
            }
            Some(last) if is_due(Some(last), self.event_interval, now) => {
                let overdue = is_due(Some(last), self.event_interval * 2, now);
                if hazard_pending && !overdue {
                    // Timer left armed: retried next cycle.
                    debug!("TELEM | event tick held: hazard input settling");
                } else {
                    if hazard_pending {
                        warn!("TELEM | hazard input still settling, event tick hold expired");
                    }
                    self.last_event = Some(now);
                    self.publish_dirty(state, dirty, channel, &mut report);
                }
            }
            Some(_) => {}
        }

        report
    }

    /// Whether the forced first-cycle sync has happened.
    pub fn initial_sync_done(&self) -> bool {
        self.last_event.is_some()
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    // ── Internal ──────────────────────────────────────────────────

    fn publish_flows(
        &mut self,
        state: &mut SystemState,
        flows: &mut FlowMeters<'_>,
        channel: &mut impl TelemetryChannel,
        report: &mut PublishReport,
    ) {
        let (inflow, return_flow) = flows.sample();
        state.record_flow(inflow, return_flow);
        info!(
            "FLOW | in={} pulses ({:.2} L, total {:.1} L) | return={} pulses ({:.2} L, total {:.1} L)",
            inflow.pulses,
            inflow.litres,
            state.inflow_total_litres,
            return_flow.pulses,
            return_flow.litres,
            state.return_total_litres,
        );

        publish(channel, Topic::InflowRate, litres_value(inflow.litres), report);
        publish(
            channel,
            Topic::ReturnFlowRate,
            litres_value(return_flow.litres),
            report,
        );
    }

    fn initial_sync(
        &mut self,
        state: &SystemState,
        dirty: &mut DirtyFlags,
        channel: &mut impl TelemetryChannel,
        report: &mut PublishReport,
    ) {
        info!("TELEM | initial sync of all switch quantities");
        for ch in ChannelId::ALL {
            if publish(channel, Topic::for_channel(ch), level_value(state.level(ch)), report) {
                dirty.clear(ch);
            } else {
                self.apply_failure(PublishPhase::InitialSync, ch, dirty);
            }
        }
    }

    fn publish_dirty(
        &mut self,
        state: &SystemState,
        dirty: &mut DirtyFlags,
        channel: &mut impl TelemetryChannel,
        report: &mut PublishReport,
    ) {
        for ch in ChannelId::ALL {
            if !dirty.is_set(ch) {
                continue;
            }
            if publish(channel, Topic::for_channel(ch), level_value(state.level(ch)), report) {
                dirty.clear(ch);
            } else {
                self.apply_failure(PublishPhase::Periodic, ch, dirty);
            }
        }
    }

    fn apply_failure(&self, phase: PublishPhase, channel: ChannelId, dirty: &mut DirtyFlags) {
        match self.policy.on_failure(phase) {
            FailureAction::KeepDirty => dirty.mark(channel),
            FailureAction::Drop => dirty.clear(channel),
        }
    }
}

fn is_due(last: Option<Instant>, interval: Duration, now: Instant) -> bool {
    match last {
        None => true,
        Some(last) => now
            .checked_duration_since(last)
            .is_some_and(|elapsed| elapsed >= interval),
    }
}

/// Send one value, recording the outcome.  Never retries.
fn publish(
    channel: &mut impl TelemetryChannel,
    topic: Topic,
    value: i32,
    report: &mut PublishReport,
) -> bool {
    if channel.publish(topic, value) {
        debug!("PUB | {} = {}", topic, value);
        let _ = report.published.push((topic, value));
        true
    } else {
        let err = PublishError::TransientPublishFailure(topic);
        warn!("PUB | {} = {}: {} (not retried)", topic, value, err);
        let _ = report.failed.push(err);
        false
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
