//! Application services — the button-event pipeline.
//!
//! Each service accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod dispatcher;
pub mod lifecycle;
pub mod line_handler;
