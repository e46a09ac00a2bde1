//! # pressgate-adapter-virtual
//!
//! Virtual GPIO board that implements the [`LineMonitor`] port without any
//! hardware. Tests and dry runs on non-Pi hosts inject presses and faults
//! directly.
//!
//! ## Behaviour
//!
//! | Call | Effect |
//! |------|--------|
//! | [`VirtualLineMonitor::press`] | Delivers a falling edge, subject to the line's debounce |
//! | [`VirtualLineMonitor::fail`] | Reports a delivery fault on the line |
//! | [`VirtualLineMonitor::refuse`] | Makes the next `open` of that pin fail |
//!
//! ## Dependency rule
//!
//! Depends on `pressgate-app` (port traits) and `pressgate-domain` only.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use pressgate_app::edge_sink::EdgeSink;
use pressgate_app::ports::{LineHandle, LineMonitor};
use pressgate_domain::error::{HardwareError, ReleaseError};
use pressgate_domain::line::{Line, LineId};

/// Errors raised when driving the virtual board from tests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VirtualError {
    /// No handle is currently armed on this line.
    #[error("line {0} is not armed")]
    NotArmed(LineId),

    /// The pipeline behind this line is gone.
    #[error("line {0} is no longer listening")]
    Closed(LineId),
}

/// Something that happened on the virtual board, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardEvent {
    Opened(LineId),
    Armed(LineId),
    Released(LineId),
}

#[derive(Default)]
struct Pin {
    debounce: Duration,
    sink: Option<EdgeSink>,
    last_edge: Option<Instant>,
}

#[derive(Default)]
struct Board {
    pins: HashMap<LineId, Pin>,
    refused: HashSet<LineId>,
    history: Vec<BoardEvent>,
}

/// Simulated GPIO controller. Clones share the same board.
#[derive(Clone, Default)]
pub struct VirtualLineMonitor {
    board: Arc<Mutex<Board>>,
}

impl VirtualLineMonitor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Board> {
        self.board
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Make every later `open` of `line` fail as if the pin were busy.
    pub fn refuse(&self, line: LineId) {
        self.lock().refused.insert(line);
    }

    /// Whether `line` is currently claimed.
    #[must_use]
    pub fn is_claimed(&self, line: LineId) -> bool {
        self.lock().pins.contains_key(&line)
    }

    /// Everything that happened on the board so far.
    #[must_use]
    pub fn history(&self) -> Vec<BoardEvent> {
        self.lock().history.clone()
    }

    /// Press the button on `line` now.
    ///
    /// # Errors
    ///
    /// See [`press_at`](Self::press_at).
    pub fn press(&self, line: LineId) -> Result<(), VirtualError> {
        self.press_at(line, Instant::now())
    }

    /// Press the button on `line` at `at`.
    ///
    /// Edges closer than the line's debounce interval to the previous
    /// delivered edge are swallowed, like the kernel driver does.
    ///
    /// # Errors
    ///
    /// Returns [`VirtualError::NotArmed`] if the line is not armed, or
    /// [`VirtualError::Closed`] if its handler has stopped.
    pub fn press_at(&self, line: LineId, at: Instant) -> Result<(), VirtualError> {
        let mut board = self.lock();
        let pin = board
            .pins
            .get_mut(&line)
            .filter(|pin| pin.sink.is_some())
            .ok_or(VirtualError::NotArmed(line))?;

        if let Some(last) = pin.last_edge {
            if at.saturating_duration_since(last) < pin.debounce {
                tracing::trace!(line = %line, "virtual edge debounced");
                return Ok(());
            }
        }
        pin.last_edge = Some(at);

        let sink = pin.sink.as_ref().ok_or(VirtualError::NotArmed(line))?;
        sink.deliver(at).map_err(|_| VirtualError::Closed(line))
    }

    /// Report a failure of the edge delivery mechanism on `line`.
    ///
    /// # Errors
    ///
    /// Returns [`VirtualError::NotArmed`] if the line is not armed.
    pub fn fail(&self, line: LineId) -> Result<(), VirtualError> {
        let board = self.lock();
        let sink = board
            .pins
            .get(&line)
            .and_then(|pin| pin.sink.as_ref())
            .ok_or(VirtualError::NotArmed(line))?;
        sink.fault(HardwareError::Delivery {
            line,
            source: "virtual delivery fault".into(),
        });
        Ok(())
    }
}

impl LineMonitor for VirtualLineMonitor {
    type Handle = VirtualLineHandle;

    fn open(&self, line: &Line) -> Result<VirtualLineHandle, HardwareError> {
        let id = line.id();
        let mut board = self.lock();
        if board.refused.contains(&id) {
            return Err(HardwareError::Claim {
                line: id,
                source: "pin refused by virtual board".into(),
            });
        }
        if board.pins.contains_key(&id) {
            return Err(HardwareError::Claim {
                line: id,
                source: "pin already in use".into(),
            });
        }

        board.pins.insert(
            id,
            Pin {
                debounce: line.debounce(),
                ..Pin::default()
            },
        );
        board.history.push(BoardEvent::Opened(id));
        tracing::debug!(line = %id, "virtual line opened");

        Ok(VirtualLineHandle {
            line: id,
            monitor: self.clone(),
            released: false,
        })
    }
}

/// Handle to one claimed virtual line.
pub struct VirtualLineHandle {
    line: LineId,
    monitor: VirtualLineMonitor,
    released: bool,
}

impl LineHandle for VirtualLineHandle {
    fn on_edge(&mut self, sink: EdgeSink) -> Result<(), HardwareError> {
        let mut board = self.monitor.lock();
        let pin = board
            .pins
            .get_mut(&self.line)
            .ok_or_else(|| HardwareError::Claim {
                line: self.line,
                source: "line released".into(),
            })?;
        pin.sink = Some(sink);
        board.history.push(BoardEvent::Armed(self.line));
        Ok(())
    }

    fn close(&mut self) -> Result<(), ReleaseError> {
        if self.released {
            return Ok(());
        }
        self.released = true;

        let mut board = self.monitor.lock();
        board.pins.remove(&self.line);
        board.history.push(BoardEvent::Released(self.line));
        tracing::debug!(line = %self.line, "virtual line released");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pressgate_app::fault::fault_channel;
    use pressgate_domain::line::TargetId;
    use tokio::sync::mpsc;

    use super::*;

    fn line(pin: u8) -> Line {
        Line::new(
            LineId::new(pin),
            vec![TargetId::new("cam").unwrap()],
            Duration::from_millis(200),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn should_deliver_pressed_edge_to_sink() {
        let monitor = VirtualLineMonitor::new();
        let mut handle = monitor.open(&line(19)).unwrap();
        let (tx, mut rx) = mpsc::channel(4);
        let (fault_tx, _fault_rx) = fault_channel();
        handle.on_edge(EdgeSink::new(LineId::new(19), tx, fault_tx)).unwrap();

        monitor.press(LineId::new(19)).unwrap();

        let press = rx.recv().await.unwrap();
        assert_eq!(press.line, LineId::new(19));
    }

    #[tokio::test]
    async fn should_swallow_bounce_within_debounce_interval() {
        let monitor = VirtualLineMonitor::new();
        let mut handle = monitor.open(&line(19)).unwrap();
        let (tx, mut rx) = mpsc::channel(4);
        let (fault_tx, _fault_rx) = fault_channel();
        handle.on_edge(EdgeSink::new(LineId::new(19), tx, fault_tx)).unwrap();
        let base = Instant::now();

        monitor.press_at(LineId::new(19), base).unwrap();
        monitor.press_at(LineId::new(19), base + Duration::from_millis(50)).unwrap();
        monitor.press_at(LineId::new(19), base + Duration::from_millis(250)).unwrap();

        assert_eq!(rx.recv().await.unwrap().observed_at, base);
        assert_eq!(
            rx.recv().await.unwrap().observed_at,
            base + Duration::from_millis(250)
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn should_refuse_configured_pin() {
        let monitor = VirtualLineMonitor::new();
        monitor.refuse(LineId::new(6));
        let err = monitor.open(&line(6)).err().unwrap();
        assert!(matches!(err, HardwareError::Claim { .. }));
    }

    #[test]
    fn should_refuse_pin_already_in_use() {
        let monitor = VirtualLineMonitor::new();
        let _first = monitor.open(&line(6)).unwrap();
        assert!(monitor.open(&line(6)).is_err());
    }

    #[test]
    fn should_reject_press_on_unarmed_line() {
        let monitor = VirtualLineMonitor::new();
        let _handle = monitor.open(&line(13)).unwrap();
        assert_eq!(
            monitor.press(LineId::new(13)),
            Err(VirtualError::NotArmed(LineId::new(13)))
        );
    }

    #[test]
    fn should_release_once_when_closed_twice() {
        let monitor = VirtualLineMonitor::new();
        let mut handle = monitor.open(&line(26)).unwrap();

        handle.close().unwrap();
        handle.close().unwrap();

        assert!(!monitor.is_claimed(LineId::new(26)));
        assert_eq!(
            monitor.history(),
            [
                BoardEvent::Opened(LineId::new(26)),
                BoardEvent::Released(LineId::new(26))
            ]
        );
    }

    #[tokio::test]
    async fn should_report_fault_through_sink() {
        let monitor = VirtualLineMonitor::new();
        let mut handle = monitor.open(&line(5)).unwrap();
        let (tx, _rx) = mpsc::channel(4);
        let (fault_tx, mut fault_rx) = fault_channel();
        handle.on_edge(EdgeSink::new(LineId::new(5), tx, fault_tx)).unwrap();

        monitor.fail(LineId::new(5)).unwrap();

        let err = fault_rx.recv().await.unwrap();
        assert_eq!(err.line(), Some(LineId::new(5)));
    }
}
