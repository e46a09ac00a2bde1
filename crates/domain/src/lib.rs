//! # pressgate-domain
//!
//! Pure domain model for the pressgate button-to-motion bridge.
//!
//! ## Responsibilities
//! - Foundational types: line and target identifiers, error taxonomy, timestamps
//! - Define **Lines** (one GPIO input mapped to an ordered list of targets)
//! - Define the **cooldown gate** (leading-edge rate limiter, one per line)
//! - Define **press events** and the **press record** written to the press log
//! - Define the **motion notification** payload and its outcome
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod gate;
pub mod line;
pub mod notification;
pub mod press;
pub mod time;
