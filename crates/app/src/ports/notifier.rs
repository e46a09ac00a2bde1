//! Notifier port — the outbound motion-trigger transport.

use std::future::Future;
use std::sync::Arc;

use pressgate_domain::error::DispatchError;
use pressgate_domain::notification::MotionRequest;

/// Sends one motion notification and reports the HTTP status.
///
/// A 2xx answer is `Ok(status)`; everything else (transport error, non-2xx,
/// timeout) is a [`DispatchError`]. Implementations must not retry.
pub trait Notifier: Send + Sync + 'static {
    fn send(&self, request: &MotionRequest)
    -> impl Future<Output = Result<u16, DispatchError>> + Send;
}

impl<T: Notifier> Notifier for Arc<T> {
    fn send(
        &self,
        request: &MotionRequest,
    ) -> impl Future<Output = Result<u16, DispatchError>> + Send {
        (**self).send(request)
    }
}
