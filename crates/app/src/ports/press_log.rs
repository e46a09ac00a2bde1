//! Press log port — append-only record of accepted presses.

use std::sync::Arc;

use pressgate_domain::error::PressLogError;
use pressgate_domain::press::PressRecord;

/// Appends one line per accepted-and-fanned-out target.
pub trait PressLog: Send + Sync + 'static {
    /// Append `record` as a single line.
    ///
    /// # Errors
    ///
    /// Returns a [`PressLogError`] if the underlying store cannot be written.
    fn append(&self, record: &PressRecord) -> Result<(), PressLogError>;
}

impl<T: PressLog> PressLog for Arc<T> {
    fn append(&self, record: &PressRecord) -> Result<(), PressLogError> {
        (**self).append(record)
    }
}
