//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the pipeline and the outside world.
//! They are defined here (in `app`) so that both the services and the
//! adapters can depend on them without creating circular dependencies.

pub mod line_monitor;
pub mod notifier;
pub mod press_log;

pub use line_monitor::{LineHandle, LineMonitor};
pub use notifier::Notifier;
pub use press_log::PressLog;
