//! Admission filter: the pure decision over one incoming event.
//!
//! Evaluated as a first-match-wins cascade, cheapest checks first, with
//! the stop check ahead of everything else. Rejected events are
//! discarded permanently: the stream is unbounded, so there is no
//! buffering for later replay.

use crate::collector::state::CollectorState;
use crate::config::RunConfig;
use crate::event::Event;

/// Outcome of evaluating one event against the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The run's target is already met; the stream should end.
    Stop,
    /// The event is discarded, with the first matching cause.
    Reject(RejectReason),
    /// The event is accepted for download.
    Admit,
}

/// Why an event was rejected. Used for debug diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Completed plus in-flight work already covers the target;
    /// admitting more would overshoot. The backpressure mechanism.
    TargetCovered,
    /// The event carries no textual body (control message, heartbeat).
    NotAStatus,
    /// This user is already saved or currently downloading.
    DuplicateUser,
    /// The user's language does not match the configured filter.
    LanguageMismatch,
}

/// Decides whether to admit `event` given the current state.
///
/// Pure function of its inputs: the same `(event, state, config)`
/// triple always yields the same decision.
#[must_use]
pub fn decide(event: &Event, state: &CollectorState, config: &RunConfig) -> Decision {
    if state.saved_count() >= config.max {
        return Decision::Stop;
    }
    if state.saved_count() + state.processing_count() >= config.max {
        return Decision::Reject(RejectReason::TargetCovered);
    }
    if !event.has_text {
        return Decision::Reject(RejectReason::NotAStatus);
    }
    if state.is_known(&event.user_key) {
        return Decision::Reject(RejectReason::DuplicateUser);
    }
    if let Some(filter) = &config.language_filter
        && event.language != *filter
    {
        return Decision::Reject(RejectReason::LanguageMismatch);
    }
    Decision::Admit
}
