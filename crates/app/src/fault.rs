//! Process-wide fault channel.
//!
//! Anything that must end the run (a broken GPIO delivery mechanism, a
//! panic in a detached task) is sent here and observed by the lifecycle
//! manager, which shuts down with a non-zero exit status.

use std::any::Any;

use tokio::sync::mpsc;
use tokio::task::JoinError;

use pressgate_domain::error::HardwareError;
use pressgate_domain::line::LineId;

/// A failure that ends the process.
#[derive(Debug, thiserror::Error)]
pub enum Fault {
    /// The GPIO subsystem can no longer be trusted.
    #[error(transparent)]
    Hardware(#[from] HardwareError),

    /// A detached task panicked.
    #[error("{task} task panicked: {message}")]
    Panicked {
        task: &'static str,
        line: Option<LineId>,
        message: String,
    },
}

impl Fault {
    /// Build a [`Fault::Panicked`] from a panic payload.
    #[must_use]
    pub fn panicked(task: &'static str, line: Option<LineId>, payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|msg| (*msg).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::Panicked {
            task,
            line,
            message,
        }
    }

    /// Classify a join error: `Some` for a panic, `None` for a cancellation.
    #[must_use]
    pub fn from_join_error(task: &'static str, line: Option<LineId>, err: JoinError) -> Option<Self> {
        err.try_into_panic()
            .ok()
            .map(|payload| Self::panicked(task, line, payload.as_ref()))
    }

    /// The line the fault is attributed to, if any.
    #[must_use]
    pub fn line(&self) -> Option<LineId> {
        match self {
            Self::Hardware(err) => err.line(),
            Self::Panicked { line, .. } => *line,
        }
    }
}

/// Sending half of the process-wide fault channel.
pub type FaultSender = mpsc::UnboundedSender<Fault>;

/// Receiving half of the process-wide fault channel.
pub type FaultReceiver = mpsc::UnboundedReceiver<Fault>;

/// Create the process-wide fault channel.
#[must_use]
pub fn fault_channel() -> (FaultSender, FaultReceiver) {
    mpsc::unbounded_channel()
}
