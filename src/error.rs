//! Worker Errors

use thiserror::Error;

use crate::worker::WorkerState;

/// Errors surfaced by the lifecycle handlers.
///
/// Steady-state fetch handling never returns these: a failed fetch produces
/// a synthetic 408 response instead, so page code always receives a
/// well-formed response object.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// A mandatory shell asset could not be pre-cached. Fatal to install.
    #[error("required asset '{url}' could not be pre-cached: {reason}")]
    PrecacheFailed { url: String, reason: String },
    /// A lifecycle handler was invoked out of order.
    #[error("lifecycle event not valid in state {state}")]
    InvalidState { state: WorkerState },
}
