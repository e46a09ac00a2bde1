//! Edge sink — how adapters hand debounced edges to the pipeline.
//!
//! Each line gets its own bounded channel feeding a single handler task, so
//! edges of one line are processed strictly in order while lines never
//! contend with each other. Hardware faults go to the process-wide
//! [fault channel](crate::fault) observed by the lifecycle manager.

use std::time::Instant;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use pressgate_domain::error::HardwareError;
use pressgate_domain::line::LineId;
use pressgate_domain::press::PressEvent;

use crate::fault::{Fault, FaultSender};

/// Capacity of each line's edge queue.
pub const EDGE_QUEUE_CAPACITY: usize = 16;

/// The pipeline stopped listening; the adapter should stop delivering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("edge sink closed")]
pub struct SinkClosed;

/// Per-line delivery endpoint handed to [`LineHandle::on_edge`](crate::ports::LineHandle::on_edge).
///
/// Cheap to clone, callable from any thread, never blocks.
#[derive(Debug, Clone)]
pub struct EdgeSink {
    line: LineId,
    events: mpsc::Sender<PressEvent>,
    faults: FaultSender,
}

impl EdgeSink {
    #[must_use]
    pub fn new(line: LineId, events: mpsc::Sender<PressEvent>, faults: FaultSender) -> Self {
        Self {
            line,
            events,
            faults,
        }
    }

    #[must_use]
    pub fn line(&self) -> LineId {
        self.line
    }

    /// Deliver one debounced falling edge observed at `observed_at`.
    ///
    /// A full queue drops the edge and the press is lost. With a cooldown
    /// shorter than the time the handler needs to drain the queue, a burst
    /// of more than [`EDGE_QUEUE_CAPACITY`] edges can lose presses the gate
    /// would have accepted.
    ///
    /// # Errors
    ///
    /// Returns [`SinkClosed`] once the line's handler is gone.
    pub fn deliver(&self, observed_at: Instant) -> Result<(), SinkClosed> {
        match self.events.try_send(PressEvent::new(self.line, observed_at)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                tracing::warn!(
                    line = %self.line,
                    capacity = EDGE_QUEUE_CAPACITY,
                    "edge queue full, press lost"
                );
                Ok(())
            }
            Err(TrySendError::Closed(_)) => Err(SinkClosed),
        }
    }

    /// Escalate a failure of the delivery mechanism. Fatal for the process.
    pub fn fault(&self, err: HardwareError) {
        if self.faults.send(Fault::Hardware(err)).is_err() {
            tracing::debug!(line = %self.line, "hardware fault reported after shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::{FaultReceiver, fault_channel};

    fn sink(capacity: usize) -> (EdgeSink, mpsc::Receiver<PressEvent>, FaultReceiver) {
        let (tx, rx) = mpsc::channel(capacity);
        let (fault_tx, fault_rx) = fault_channel();
        (EdgeSink::new(LineId::new(19), tx, fault_tx), rx, fault_rx)
    }

    #[tokio::test]
    async fn should_forward_edge_as_press_event() {
        let (sink, mut rx, _faults) = sink(4);
        let at = Instant::now();
        sink.deliver(at).unwrap();

        let press = rx.recv().await.unwrap();
        assert_eq!(press, PressEvent::new(LineId::new(19), at));
    }

    #[tokio::test]
    async fn should_drop_edge_when_queue_is_full() {
        let (sink, mut rx, _faults) = sink(1);
        sink.deliver(Instant::now()).unwrap();
        assert!(sink.deliver(Instant::now()).is_ok());

        rx.recv().await.unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn should_lose_presses_beyond_queue_capacity() {
        let (sink, mut rx, _faults) = sink(EDGE_QUEUE_CAPACITY);
        let start = Instant::now();
        let burst: Vec<Instant> = (0..EDGE_QUEUE_CAPACITY as u64 + 4)
            .map(|ms| start + std::time::Duration::from_millis(ms))
            .collect();
        for at in &burst {
            sink.deliver(*at).unwrap();
        }

        let mut queued = Vec::new();
        while let Ok(press) = rx.try_recv() {
            queued.push(press.observed_at);
        }
        assert_eq!(queued, burst[..EDGE_QUEUE_CAPACITY].to_vec());
    }

    #[tokio::test]
    async fn should_report_closed_when_handler_is_gone() {
        let (sink, rx, _faults) = sink(1);
        drop(rx);
        assert_eq!(sink.deliver(Instant::now()), Err(SinkClosed));
    }

    #[tokio::test]
    async fn should_forward_fault_to_fault_channel() {
        let (sink, _rx, mut faults) = sink(1);
        sink.fault(HardwareError::Delivery {
            line: LineId::new(19),
            source: "poll failed".into(),
        });

        let fault = faults.recv().await.unwrap();
        assert!(matches!(fault, Fault::Hardware(_)));
        assert_eq!(fault.line(), Some(LineId::new(19)));
    }

    #[test]
    fn should_ignore_fault_after_shutdown() {
        let (sink, _rx, faults) = sink(1);
        drop(faults);
        sink.fault(HardwareError::Unavailable("gone".into()));
    }
}
