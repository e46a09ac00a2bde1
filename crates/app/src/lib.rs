//! # pressgate-app
//!
//! Application layer — the button-event pipeline and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `LineMonitor` / `LineHandle` — claim a GPIO line, deliver debounced edges, release it
//!   - `Notifier` — send one motion notification
//!   - `PressLog` — append one line to the press log
//! - Provide the **edge sink** through which adapters deliver edges, and the
//!   process-wide **fault channel** that ends the run on hardware faults and
//!   task panics
//! - Run the pipeline: per-line handler (cooldown gate + target fan-out),
//!   fire-and-forget dispatcher, and the lifecycle manager that owns every
//!   line handle
//!
//! ## Dependency rule
//! Depends on `pressgate-domain` only (plus `tokio` for tasks and channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod edge_sink;
pub mod fault;
pub mod ports;
pub mod services;
