//! Hall-effect flowmeter pulse counting.
//!
//! Each flowmeter outputs one pulse per fixed volume of water.  The GPIO ISR
//! increments an atomic counter on every edge; the telemetry scheduler
//! drains it once per flow window with an atomic swap, so the ISR is never
//! blocked and no pulse is lost or counted twice across a drain.

use core::sync::atomic::{AtomicU32, Ordering};

/// Inflow meter counter, incremented from the inflow GPIO ISR.
pub static INFLOW_PULSES: PulseCounter = PulseCounter::new();
/// Return-line meter counter, incremented from the return GPIO ISR.
pub static RETURN_PULSES: PulseCounter = PulseCounter::new();

/// Register on the inflow meter GPIO (any edge).
pub fn inflow_isr_handler() {
    INFLOW_PULSES.on_edge();
}

/// Register on the return meter GPIO (any edge).
pub fn return_isr_handler() {
    RETURN_PULSES.on_edge();
}

/// Lock-free edge counter shared between an ISR and the control loop.
#[derive(Debug, Default)]
pub struct PulseCounter {
    count: AtomicU32,
}

impl PulseCounter {
    pub const fn new() -> Self {
        Self {
            count: AtomicU32::new(0),
        }
    }

    /// Count one edge.  Safe from interrupt context: one atomic RMW, no
    /// allocation, no logging.
    pub fn on_edge(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Read and zero the counter in a single atomic swap.
    ///
    /// Only the sampling-window owner may call this.
    pub fn drain(&self) -> u32 {
        self.count.swap(0, Ordering::AcqRel)
    }

    /// Pulses counted since the last drain, without resetting.
    pub fn pending(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }
}

/// Result of draining one flowmeter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowSample {
    /// Pulses counted in the window.
    pub pulses: u32,
    /// Volume represented by those pulses.
    pub litres: f32,
}

/// Calibrated view over a [`PulseCounter`].
///
/// Lifetime totals are kept by [`SystemState`](crate::state::SystemState).
#[derive(Debug)]
pub struct FlowAccumulator<'a> {
    counter: &'a PulseCounter,
    litres_per_pulse: f32,
}

impl<'a> FlowAccumulator<'a> {
    pub fn new(counter: &'a PulseCounter, litres_per_pulse: f32) -> Self {
        Self {
            counter,
            litres_per_pulse,
        }
    }

    /// Drain the counter and convert to litres.
    pub fn sample(&mut self) -> FlowSample {
        let pulses = self.counter.drain();
        let litres = pulses as f32 * self.litres_per_pulse;
        FlowSample { pulses, litres }
    }

    pub fn litres_per_pulse(&self) -> f32 {
        self.litres_per_pulse
    }
}

/// The inflow and return meters, sampled together each flow window.
#[derive(Debug)]
pub struct FlowMeters<'a> {
    pub inflow: FlowAccumulator<'a>,
    pub return_flow: FlowAccumulator<'a>,
}

impl<'a> FlowMeters<'a> {
    pub fn new(inflow: FlowAccumulator<'a>, return_flow: FlowAccumulator<'a>) -> Self {
        Self {
            inflow,
            return_flow,
        }
    }

    /// Drain both meters.  Returns `(inflow, return)`.
    pub fn sample(&mut self) -> (FlowSample, FlowSample) {
        (self.inflow.sample(), self.return_flow.sample())
    }
}
