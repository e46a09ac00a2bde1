//! GPIO adapter error types.

use pressgate_domain::error::{HardwareError, ReleaseError};
use pressgate_domain::line::LineId;

/// Errors specific to the rppal adapter.
#[derive(Debug, thiserror::Error)]
pub enum GpioError {
    /// The rppal driver returned an error.
    #[error("GPIO driver error")]
    Driver(#[from] rppal::gpio::Error),

    /// The watch thread could not be spawned.
    #[error("failed to spawn watch thread")]
    Spawn(#[source] std::io::Error),

    /// The watch thread panicked; the pin was dropped with it.
    #[error("watch thread panicked")]
    WatchPanicked,

    /// `on_edge` was called on a line that is already armed or released.
    #[error("line is not in a state that can be armed")]
    NotArmable,
}

impl GpioError {
    /// Wrap as a claim failure on `line`.
    #[must_use]
    pub fn into_claim(self, line: LineId) -> HardwareError {
        HardwareError::Claim {
            line,
            source: Box::new(self),
        }
    }

    /// Wrap as an edge delivery failure on `line`.
    #[must_use]
    pub fn into_delivery(self, line: LineId) -> HardwareError {
        HardwareError::Delivery {
            line,
            source: Box::new(self),
        }
    }

    /// Wrap as a release failure on `line`.
    #[must_use]
    pub fn into_release(self, line: LineId) -> ReleaseError {
        ReleaseError {
            line,
            source: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_driver_error() {
        let err = GpioError::Driver(rppal::gpio::Error::PinNotAvailable(40));
        assert_eq!(err.to_string(), "GPIO driver error");
    }

    #[test]
    fn should_convert_to_claim_error_for_line() {
        let err = GpioError::Driver(rppal::gpio::Error::PinUsed(19)).into_claim(LineId::new(19));
        assert!(matches!(err, HardwareError::Claim { .. }));
        assert_eq!(err.line(), Some(LineId::new(19)));
    }

    #[test]
    fn should_convert_to_delivery_error_for_line() {
        let err = GpioError::WatchPanicked.into_delivery(LineId::new(6));
        assert!(matches!(err, HardwareError::Delivery { .. }));
    }

    #[test]
    fn should_convert_to_release_error_for_line() {
        let err = GpioError::WatchPanicked.into_release(LineId::new(26));
        assert_eq!(err.line, LineId::new(26));
        assert_eq!(err.to_string(), "failed to release line 26");
    }
}
