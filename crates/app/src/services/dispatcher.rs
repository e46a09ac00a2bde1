//! Notification dispatcher — one detached, time-bounded send per (line, target).
//!
//! A dispatch never retries and never reports back to the gate or to sibling
//! dispatches; its outcome only ends up in the logs. Nothing waits for
//! in-flight dispatches at shutdown. A panicking send is reported on the
//! fault channel, which ends the run.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use pressgate_domain::error::DispatchError;
use pressgate_domain::notification::{Delivery, MotionRequest, NotificationOutcome};

use crate::fault::{Fault, FaultSender};
use crate::ports::Notifier;

/// Spawns notification attempts on the runtime.
pub struct Dispatcher<N> {
    notifier: Arc<N>,
    timeout: Duration,
    faults: Option<FaultSender>,
}

impl<N> Clone for Dispatcher<N> {
    fn clone(&self) -> Self {
        Self {
            notifier: Arc::clone(&self.notifier),
            timeout: self.timeout,
            faults: self.faults.clone(),
        }
    }
}

impl<N: Notifier> Dispatcher<N> {
    /// Create a dispatcher bounding every send by `timeout`.
    pub fn new(notifier: N, timeout: Duration) -> Self {
        Self {
            notifier: Arc::new(notifier),
            timeout,
            faults: None,
        }
    }

    /// Report panicking sends on `faults`.
    #[must_use]
    pub fn with_faults(mut self, faults: FaultSender) -> Self {
        self.faults = Some(faults);
        self
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Issue `request` on a detached task and return immediately.
    ///
    /// The returned handle may be dropped; the send still runs to completion
    /// (or timeout) on its own. If the send panics, the outcome is a failure
    /// and a [`Fault::Panicked`] goes to the fault channel.
    pub fn dispatch(&self, request: MotionRequest) -> JoinHandle<NotificationOutcome> {
        let notifier = Arc::clone(&self.notifier);
        let timeout = self.timeout;
        let faults = self.faults.clone();
        let (line, target) = (request.line, request.target.clone());

        let send = tokio::spawn(async move { deliver(notifier.as_ref(), request, timeout).await });
        tokio::spawn(async move {
            let err = match send.await {
                Ok(outcome) => return outcome,
                Err(err) => err,
            };
            let error = match Fault::from_join_error("dispatch", Some(line), err) {
                Some(fault) => {
                    tracing::error!(
                        line = %line,
                        monitor = %target,
                        err = %fault,
                        "✖ notification panicked"
                    );
                    let reported = faults.is_some_and(|faults| faults.send(fault).is_ok());
                    if !reported {
                        tracing::debug!(line = %line, "dispatch panic not reported on fault channel");
                    }
                    "dispatch panicked"
                }
                None => "dispatch cancelled",
            };
            NotificationOutcome {
                line,
                target,
                delivery: Delivery::Failed {
                    error: error.to_string(),
                },
            }
        })
    }
}

/// Send `request` once, bounded by `timeout`, and log the outcome.
pub async fn deliver<N: Notifier>(
    notifier: &N,
    request: MotionRequest,
    timeout: Duration,
) -> NotificationOutcome {
    let result = match tokio::time::timeout(timeout, notifier.send(&request)).await {
        Ok(result) => result,
        Err(_elapsed) => Err(DispatchError::Timeout(timeout)),
    };

    let delivery = match result {
        Ok(status) => {
            tracing::info!(
                line = %request.line,
                monitor = %request.target,
                status,
                "✔ notification delivered"
            );
            Delivery::Delivered { status }
        }
        Err(err) => {
            tracing::warn!(
                line = %request.line,
                monitor = %request.target,
                %err,
                "✖ notification failed"
            );
            Delivery::Failed {
                error: err.to_string(),
            }
        }
    };

    NotificationOutcome {
        line: request.line,
        target: request.target,
        delivery,
    }
}
