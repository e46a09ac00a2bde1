//! Line handler — cooldown gate and target fan-out for one line.
//!
//! One handler runs per configured line, fed by that line's edge queue. It is
//! the only owner of the line's [`CooldownGate`], so the check-then-set needs
//! no lock: edges of the same line are handled one at a time, and handlers of
//! different lines share nothing mutable.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use pressgate_domain::gate::{CooldownGate, GateDecision};
use pressgate_domain::line::{Line, LineId, TargetId};
use pressgate_domain::notification::{
    MotionProfile, MotionRequest, NotificationOutcome, SiteCredentials,
};
use pressgate_domain::press::{PressEvent, PressRecord};
use pressgate_domain::time;

use crate::ports::{Notifier, PressLog};
use crate::services::dispatcher::Dispatcher;

/// Read-only collaborators shared by every line handler.
pub struct PressPipeline<N, L> {
    dispatcher: Dispatcher<N>,
    press_log: L,
    site: Arc<SiteCredentials>,
    profile: MotionProfile,
}

impl<N: Notifier, L: PressLog> PressPipeline<N, L> {
    pub fn new(
        dispatcher: Dispatcher<N>,
        press_log: L,
        site: SiteCredentials,
        profile: MotionProfile,
    ) -> Self {
        Self {
            dispatcher,
            press_log,
            site: Arc::new(site),
            profile,
        }
    }

    /// Log one accepted target, then dispatch it without waiting.
    ///
    /// The press log records that the press was fanned out, not that the
    /// notification arrived, so it is written before the dispatch starts.
    fn notify(&self, line: LineId, target: &TargetId) -> JoinHandle<NotificationOutcome> {
        tracing::info!(line = %line, monitor = %target, "🔘 press registered");

        let record = PressRecord {
            at: time::now(),
            line,
            target: target.clone(),
        };
        if let Err(err) = self.press_log.append(&record) {
            tracing::warn!(line = %line, monitor = %target, %err, "could not write press log");
        }

        let request = MotionRequest::new(line, target.clone(), Arc::clone(&self.site), &self.profile);
        self.dispatcher.dispatch(request)
    }
}

/// What happened to one press.
#[derive(Debug)]
#[must_use]
pub enum HandledPress {
    /// Accepted; one detached dispatch per target, in configuration order.
    Accepted {
        dispatches: Vec<JoinHandle<NotificationOutcome>>,
    },
    /// Discarded inside the cooldown window. No log, no dispatch.
    Suppressed { remaining: Duration },
}

/// Sequential handler owning one line's gate.
pub struct LineHandler<N, L> {
    line: Line,
    gate: CooldownGate,
    pipeline: Arc<PressPipeline<N, L>>,
}

impl<N: Notifier, L: PressLog> LineHandler<N, L> {
    pub fn new(line: Line, pipeline: Arc<PressPipeline<N, L>>) -> Self {
        let gate = CooldownGate::new(line.cooldown());
        Self {
            line,
            gate,
            pipeline,
        }
    }

    /// Gate one press and, if accepted, fan it out to every target.
    pub fn handle(&mut self, press: PressEvent) -> HandledPress {
        if let GateDecision::Suppressed { remaining } = self.gate.offer(press.observed_at) {
            tracing::debug!(line = %self.line.id(), ?remaining, "press suppressed during cooldown");
            return HandledPress::Suppressed { remaining };
        }

        let line = self.line.id();
        let dispatches = self
            .line
            .expand()
            .iter()
            .map(|target| self.pipeline.notify(line, target))
            .collect();

        HandledPress::Accepted { dispatches }
    }

    /// Handle presses until the edge queue closes.
    pub async fn run(mut self, mut presses: mpsc::Receiver<PressEvent>) {
        while let Some(press) = presses.recv().await {
            // Dispatches are detached; dropping their handles does not cancel them.
            let _ = self.handle(press);
        }
        tracing::debug!(line = %self.line.id(), "edge queue closed, line handler stopped");
    }
}
