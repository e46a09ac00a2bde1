//! # pressgate-adapter-gpio-rppal
//!
//! Line monitor for Raspberry Pi GPIO, built on `rppal`.
//!
//! ## How it works
//!
//! Each claimed pin is configured as an input with the configured bias and a
//! falling-edge interrupt. The kernel driver applies the debounce interval.
//! Once armed, a dedicated watch thread per line polls for interrupts with a
//! short timeout, so it notices when the line is closed, and forwards every
//! edge into the line's [`EdgeSink`](pressgate_app::edge_sink::EdgeSink).
//! A poll error is escalated as a fatal delivery fault.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `pressgate-app` and `pressgate-domain`.

mod config;
mod error;
mod monitor;

pub use config::{Bias, GpioConfig};
pub use error::GpioError;
pub use monitor::{RppalLineHandle, RppalLineMonitor};
