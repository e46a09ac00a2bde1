//! Line monitor port — hardware edge detection for one input line.

use pressgate_domain::error::{HardwareError, ReleaseError};
use pressgate_domain::line::Line;

use crate::edge_sink::EdgeSink;

/// Claims input lines on some GPIO backend.
///
/// Implementations live in adapter crates (`gpio_rppal`, `virtual`).
pub trait LineMonitor: Send + Sync {
    /// Handle to one claimed line.
    type Handle: LineHandle;

    /// Configure the pin of `line` as a falling-edge input with the line's
    /// debounce interval.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::Claim`] if the pin is already in use, does not
    /// exist or access is denied, and [`HardwareError::Unavailable`] if the
    /// GPIO controller cannot be opened at all.
    fn open(&self, line: &Line) -> Result<Self::Handle, HardwareError>;
}

/// A claimed line.
///
/// The lifecycle manager is the only owner of handles and the only caller
/// of [`close`](Self::close).
pub trait LineHandle: Send {
    /// Start delivering debounced falling edges into `sink`.
    ///
    /// The driver guarantees at most one delivery per physical transition
    /// within the debounce interval, and never delivers two edges of the
    /// same line concurrently. Delivery failures are reported through
    /// [`EdgeSink::fault`].
    ///
    /// # Errors
    ///
    /// Returns a [`HardwareError`] if the interrupt cannot be armed.
    fn on_edge(&mut self, sink: EdgeSink) -> Result<(), HardwareError>;

    /// Release the pin.
    ///
    /// Must be safe to call more than once, and on a handle whose
    /// [`on_edge`](Self::on_edge) never succeeded; later calls are no-ops.
    ///
    /// # Errors
    ///
    /// Returns a [`ReleaseError`] if the driver refuses to release the pin.
    fn close(&mut self) -> Result<(), ReleaseError>;
}
