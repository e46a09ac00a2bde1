//! Error taxonomy shared across the workspace.
//!
//! Each layer defines its own typed errors and converts into these via
//! `From`. Adapter-specific failures are carried as boxed sources so the
//! domain never depends on hardware or HTTP crates.

use std::time::Duration;

use crate::line::LineId;

/// Boxed error used to carry adapter-specific failure sources.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error for the pressgate system.
#[derive(Debug, thiserror::Error)]
pub enum PressGateError {
    /// Configuration or model invariant violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// GPIO subsystem failure (claim or edge delivery).
    #[error("hardware error")]
    Hardware(#[from] HardwareError),

    /// The press log could not be appended to.
    #[error("press log error")]
    PressLog(#[from] PressLogError),
}

/// Invariant violations detected while building domain objects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A target identifier was empty or whitespace.
    #[error("target identifier must not be empty")]
    EmptyTarget,

    /// A site credential was empty.
    #[error("{0} must not be empty")]
    EmptyCredential(&'static str),

    /// The pin is not one of the supported header pins.
    #[error("pin {0} is not a supported GPIO line")]
    UnsupportedPin(u8),

    /// A line was declared without any target.
    #[error("line {0} has no targets")]
    NoTargets(LineId),
}

/// Failures of the GPIO subsystem.
///
/// A claim failure is fatal at startup; a delivery failure is fatal for the
/// whole process.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// The GPIO controller itself could not be opened.
    #[error("GPIO controller unavailable")]
    Unavailable(#[source] BoxError),

    /// The pin could not be claimed (in use, invalid, permission denied).
    #[error("failed to claim line {line}")]
    Claim {
        /// Line that could not be claimed.
        line: LineId,
        /// Underlying driver error.
        #[source]
        source: BoxError,
    },

    /// The edge delivery mechanism reported an error.
    #[error("edge delivery failed on line {line}")]
    Delivery {
        /// Line whose delivery faulted.
        line: LineId,
        /// Underlying driver error.
        #[source]
        source: BoxError,
    },
}

impl HardwareError {
    /// The line this error relates to, if any.
    #[must_use]
    pub fn line(&self) -> Option<LineId> {
        match self {
            Self::Unavailable(_) => None,
            Self::Claim { line, .. } | Self::Delivery { line, .. } => Some(*line),
        }
    }
}

/// Failure of one notification attempt. Never retried.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Connection, DNS or protocol failure.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// No response within the dispatch timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The endpoint answered with a non-2xx status.
    #[error("unexpected status {0}")]
    Status(u16),

    /// The request could not be built (bad base URL, payload encoding).
    #[error("invalid request: {0}")]
    InvalidRequest(#[source] BoxError),
}

/// A line handle failed to release during teardown.
#[derive(Debug, thiserror::Error)]
#[error("failed to release line {line}")]
pub struct ReleaseError {
    /// Line that failed to release.
    pub line: LineId,
    /// Underlying driver error.
    #[source]
    pub source: BoxError,
}

/// The press log could not be written.
#[derive(Debug, thiserror::Error)]
pub enum PressLogError {
    /// Underlying filesystem failure.
    #[error("failed to append to press log")]
    Io(#[from] std::io::Error),
}
