//! Motion notifications — what is sent for one (line, target) pair.
//!
//! The monitoring endpoint is addressed as
//! `{base}/{api_key}/motion/{group_key}/{target}` with the JSON payload
//! percent-encoded into the `data` query parameter. Building the actual URL
//! is the transport adapter's job; this module fixes its shape and content.

use std::sync::Arc;

use serde::Serialize;

use crate::error::ValidationError;
use crate::line::{LineId, TargetId};

/// Literal reason reported for every synthetic motion event.
pub const MOTION_REASON: &str = "motion";

/// Opaque site credentials shared by every dispatch. Never mutated after load.
#[derive(Clone, PartialEq, Eq)]
pub struct SiteCredentials {
    api_key: String,
    group_key: String,
}

impl SiteCredentials {
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyCredential`] if either key is blank.
    pub fn new(
        api_key: impl Into<String>,
        group_key: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let api_key = api_key.into();
        let group_key = group_key.into();
        if api_key.trim().is_empty() {
            return Err(ValidationError::EmptyCredential("api_key"));
        }
        if group_key.trim().is_empty() {
            return Err(ValidationError::EmptyCredential("group_key"));
        }
        Ok(Self { api_key, group_key })
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    #[must_use]
    pub fn group_key(&self) -> &str {
        &self.group_key
    }
}

impl std::fmt::Debug for SiteCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteCredentials")
            .field("api_key", &"***")
            .field("group_key", &self.group_key)
            .finish()
    }
}

/// Fixed fields describing the synthetic motion event, shared by all dispatches.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionProfile {
    /// Region label reported as `name`.
    pub region_name: String,
    /// Confidence score reported as `confidence`.
    pub confidence: f64,
}

impl Default for MotionProfile {
    fn default() -> Self {
        Self {
            region_name: "gpio_button".to_string(),
            confidence: 197.475_585_937_5,
        }
    }
}

/// JSON body carried in the `data` query parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MotionPayload {
    pub plug: String,
    pub name: String,
    pub reason: &'static str,
    pub confidence: f64,
}

impl MotionPayload {
    #[must_use]
    pub fn new(target: &TargetId, profile: &MotionProfile) -> Self {
        Self {
            plug: target.as_str().to_string(),
            name: profile.region_name.clone(),
            reason: MOTION_REASON,
            confidence: profile.confidence,
        }
    }

    /// Compact JSON encoding of the payload.
    ///
    /// # Errors
    ///
    /// Propagates any `serde_json` encoding failure.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Everything the transport needs to notify one target.
#[derive(Debug, Clone)]
pub struct MotionRequest {
    pub line: LineId,
    pub target: TargetId,
    pub site: Arc<SiteCredentials>,
    pub payload: MotionPayload,
}

impl MotionRequest {
    #[must_use]
    pub fn new(
        line: LineId,
        target: TargetId,
        site: Arc<SiteCredentials>,
        profile: &MotionProfile,
    ) -> Self {
        let payload = MotionPayload::new(&target, profile);
        Self {
            line,
            target,
            site,
            payload,
        }
    }

    /// Path segments below the base URL, unencoded.
    #[must_use]
    pub fn path_segments(&self) -> [&str; 4] {
        [
            self.site.api_key(),
            MOTION_REASON,
            self.site.group_key(),
            self.target.as_str(),
        ]
    }
}

/// How one dispatch attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The endpoint answered with a 2xx status.
    Delivered { status: u16 },
    /// Transport error, non-2xx status or timeout.
    Failed { error: String },
}

/// Ephemeral result of one dispatch, used for console feedback only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationOutcome {
    pub line: LineId,
    pub target: TargetId,
    pub delivery: Delivery,
}

impl NotificationOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.delivery, Delivery::Delivered { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> Arc<SiteCredentials> {
        Arc::new(SiteCredentials::new("key123", "ArenaVarandas").unwrap())
    }

    #[test]
    fn should_reject_blank_api_key() {
        assert_eq!(
            SiteCredentials::new(" ", "group"),
            Err(ValidationError::EmptyCredential("api_key"))
        );
    }

    #[test]
    fn should_reject_blank_group_key() {
        assert_eq!(
            SiteCredentials::new("key", ""),
            Err(ValidationError::EmptyCredential("group_key"))
        );
    }

    #[test]
    fn should_redact_api_key_in_debug_output() {
        let debug = format!("{:?}", SiteCredentials::new("secret", "group").unwrap());
        assert!(!debug.contains("secret"));
        assert!(debug.contains("group"));
    }

    #[test]
    fn should_serialize_payload_with_exact_keys() {
        let target = TargetId::new("quadra01_camera01").unwrap();
        let payload = MotionPayload::new(&target, &MotionProfile::default());
        let value: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "plug": "quadra01_camera01",
                "name": "gpio_button",
                "reason": "motion",
                "confidence": 197.475_585_937_5,
            })
        );
    }

    #[test]
    fn should_build_path_segments_for_target() {
        let request = MotionRequest::new(
            LineId::new(19),
            TargetId::new("camA").unwrap(),
            site(),
            &MotionProfile::default(),
        );
        assert_eq!(
            request.path_segments(),
            ["key123", "motion", "ArenaVarandas", "camA"]
        );
    }

    #[test]
    fn should_report_success_only_for_delivered() {
        let delivered = NotificationOutcome {
            line: LineId::new(19),
            target: TargetId::new("camA").unwrap(),
            delivery: Delivery::Delivered { status: 200 },
        };
        let failed = NotificationOutcome {
            delivery: Delivery::Failed {
                error: "timed out after 3s".to_string(),
            },
            ..delivered.clone()
        };
        assert!(delivered.is_success());
        assert!(!failed.is_success());
    }
}
