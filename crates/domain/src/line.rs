//! Line — one physical input pin mapped to an ordered list of targets.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// BCM pins wired to buttons on the supported header layout.
pub const SUPPORTED_PINS: [u8; 8] = [26, 19, 13, 6, 5, 21, 20, 16];

/// Identifier of one physical input line (BCM pin number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(u8);

impl LineId {
    /// Wrap a pin number without checking it against [`SUPPORTED_PINS`].
    #[must_use]
    pub const fn new(pin: u8) -> Self {
        Self(pin)
    }

    /// Wrap a pin number, rejecting pins outside [`SUPPORTED_PINS`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedPin`] for any other pin.
    pub fn supported(pin: u8) -> Result<Self, ValidationError> {
        if SUPPORTED_PINS.contains(&pin) {
            Ok(Self(pin))
        } else {
            Err(ValidationError::UnsupportedPin(pin))
        }
    }

    /// The raw pin number.
    #[must_use]
    pub const fn pin(self) -> u8 {
        self.0
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for LineId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Identifier of one camera/monitor feed (a monitor slug).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TargetId(String);

impl TargetId {
    /// Build a target identifier, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyTarget`] if nothing is left after trimming.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyTarget);
        }
        if trimmed.len() == id.len() {
            Ok(Self(id))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    /// Borrow the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TargetId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TargetId> for String {
    fn from(value: TargetId) -> Self {
        value.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One configured input line. Immutable for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    id: LineId,
    debounce: Duration,
    cooldown: Duration,
    targets: Vec<TargetId>,
}

impl Line {
    /// Build a line.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NoTargets`] if `targets` is empty: a line
    /// with nothing to notify should never be monitored.
    pub fn new(
        id: LineId,
        targets: Vec<TargetId>,
        debounce: Duration,
        cooldown: Duration,
    ) -> Result<Self, ValidationError> {
        if targets.is_empty() {
            return Err(ValidationError::NoTargets(id));
        }
        Ok(Self {
            id,
            debounce,
            cooldown,
            targets,
        })
    }

    #[must_use]
    pub fn id(&self) -> LineId {
        self.id
    }

    /// Driver-level debounce interval.
    #[must_use]
    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Minimum interval between two accepted presses.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Expand the line into its targets, in configuration order.
    #[must_use]
    pub fn expand(&self) -> &[TargetId] {
        &self.targets
    }
}
