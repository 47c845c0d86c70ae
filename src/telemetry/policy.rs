//! What to do when the telemetry channel refuses a publish.

/// Which part of the scheduler attempted the publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishPhase {
    /// First-cycle sync that establishes remote state.
    InitialSync,
    /// Regular event-cadence publish of a dirty quantity.
    Periodic,
}

/// Effect of a failed publish on the quantity's dirty flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureAction {
    /// Leave the flag set; the next event tick tries again.
    KeepDirty,
    /// Clear the flag; the value is lost until the next real change.
    Drop,
}

/// Failure handling for switch-quantity publishes.
///
/// No policy retries inside the cycle that failed.
pub trait PublishPolicy {
    fn on_failure(&self, phase: PublishPhase) -> FailureAction;
}

/// Fire-and-forget publication.
///
/// A failed initial sync keeps its dirty flag so remote state is
/// eventually established; a failed periodic publish is dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoRetryPublishPolicy;

impl PublishPolicy for NoRetryPublishPolicy {
    fn on_failure(&self, phase: PublishPhase) -> FailureAction {
        match phase {
            PublishPhase::InitialSync => FailureAction::KeepDirty,
            PublishPhase::Periodic => FailureAction::Drop,
        }
    }
}
