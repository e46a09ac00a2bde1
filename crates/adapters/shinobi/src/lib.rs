//! # pressgate-adapter-shinobi
//!
//! Motion-trigger transport for Shinobi-style monitoring services.
//!
//! ## Request shape
//!
//! ```text
//! GET {base_url}/{api_key}/motion/{group_key}/{target}?data={json}
//! ```
//!
//! where `json` is `{"plug":…,"name":…,"reason":"motion","confidence":…}`,
//! percent-encoded into the single `data` query parameter. Any 2xx answer is
//! a success; everything else is a failure. There is no retry.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `pressgate-app` and `pressgate-domain`.

mod config;
mod error;

pub use config::ShinobiConfig;
pub use error::ShinobiError;

use std::time::Duration;

use reqwest::{Client, Url};

use pressgate_app::ports::Notifier;
use pressgate_domain::error::DispatchError;
use pressgate_domain::notification::MotionRequest;

/// HTTP notifier for one monitoring endpoint.
#[derive(Debug, Clone)]
pub struct ShinobiNotifier {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl ShinobiNotifier {
    /// Build a notifier for `config.base_url` with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ShinobiError::InvalidBaseUrl`] or
    /// [`ShinobiError::CannotBeABase`] for an unusable base URL, and
    /// [`ShinobiError::Client`] if the HTTP client cannot be built.
    pub fn new(config: &ShinobiConfig) -> Result<Self, ShinobiError> {
        let base_url = parse_base_url(&config.base_url)?;
        let timeout = config.timeout();
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full request URL for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`ShinobiError::Payload`] if the payload cannot be encoded.
    pub fn motion_url(&self, request: &MotionRequest) -> Result<Url, ShinobiError> {
        motion_url(&self.base_url, request)
    }
}

/// Parse and check a base URL.
///
/// # Errors
///
/// Returns [`ShinobiError::InvalidBaseUrl`] if `raw` does not parse and
/// [`ShinobiError::CannotBeABase`] if it cannot carry a path.
pub fn parse_base_url(raw: &str) -> Result<Url, ShinobiError> {
    let url = Url::parse(raw).map_err(|err| ShinobiError::InvalidBaseUrl {
        url: raw.to_string(),
        source: Box::new(err),
    })?;
    if url.cannot_be_a_base() {
        return Err(ShinobiError::CannotBeABase(raw.to_string()));
    }
    Ok(url)
}

/// Append the motion path below `base` and encode the payload as `data`.
///
/// # Errors
///
/// Returns [`ShinobiError::CannotBeABase`] for a base without a path and
/// [`ShinobiError::Payload`] if the payload cannot be encoded.
pub fn motion_url(base: &Url, request: &MotionRequest) -> Result<Url, ShinobiError> {
    let data = request.payload.to_json()?;

    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ShinobiError::CannotBeABase(base.to_string()))?
        .pop_if_empty()
        .extend(request.path_segments());
    url.set_query(None);
    url.query_pairs_mut().append_pair("data", &data);
    Ok(url)
}

impl Notifier for ShinobiNotifier {
    async fn send(&self, request: &MotionRequest) -> Result<u16, DispatchError> {
        let url = self
            .motion_url(request)
            .map_err(|err| err.into_dispatch(self.timeout))?;

        tracing::debug!(line = %request.line, monitor = %request.target, "sending motion trigger");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| ShinobiError::from(err).into_dispatch(self.timeout))?;

        let status = response.status();
        if status.is_success() {
            Ok(status.as_u16())
        } else {
            Err(DispatchError::Status(status.as_u16()))
        }
    }
}
