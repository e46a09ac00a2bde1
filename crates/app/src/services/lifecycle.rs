//! Lifecycle manager — brings every line up, and everything down exactly once.
//!
//! ```text
//! Starting ──start()──▶ Running ──run_until()──▶ ShuttingDown ──▶ Stopped
//! ```
//!
//! The manager is the sole owner of every open [`LineHandle`] and the only
//! component allowed to close one. Hardware faults from any line and panics
//! of detached dispatch tasks arrive on a single fault channel and end the
//! run; so does an unexpected end (or panic) of any line handler task.

use std::collections::BTreeMap;
use std::error::Error;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use pressgate_domain::error::HardwareError;
use pressgate_domain::line::{Line, LineId};

use crate::edge_sink::{EDGE_QUEUE_CAPACITY, EdgeSink};
use crate::fault::{FaultReceiver, FaultSender, fault_channel};
use crate::ports::{LineHandle, LineMonitor, Notifier, PressLog};
use crate::services::line_handler::{LineHandler, PressPipeline};

/// Where the manager is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Starting,
    Running,
    ShuttingDown,
    Stopped,
}

/// Why the process is shutting down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    /// External termination request (SIGINT / SIGTERM).
    Requested,
    /// Hardware fault or unexpected handler failure.
    Fault(String),
}

impl ShutdownReason {
    /// Process exit status: `0` for a requested stop, `1` for a fault.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Requested => 0,
            Self::Fault(_) => 1,
        }
    }
}

/// Owns every line handle and handler task.
pub struct LifecycleManager<M: LineMonitor> {
    monitor: M,
    state: LifecycleState,
    handles: BTreeMap<LineId, M::Handle>,
    tasks: JoinSet<LineId>,
    faults_tx: FaultSender,
    faults_rx: FaultReceiver,
    decided: Option<ShutdownReason>,
}

impl<M: LineMonitor> LifecycleManager<M> {
    pub fn new(monitor: M) -> Self {
        let (faults_tx, faults_rx) = fault_channel();
        Self {
            monitor,
            state: LifecycleState::Starting,
            handles: BTreeMap::new(),
            tasks: JoinSet::new(),
            faults_tx,
            faults_rx,
            decided: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// A sender into the fault channel this manager watches.
    ///
    /// Hand it to every component whose failure must end the run, such as
    /// the [`Dispatcher`](crate::services::dispatcher::Dispatcher).
    #[must_use]
    pub fn fault_sender(&self) -> FaultSender {
        self.faults_tx.clone()
    }

    /// Lines currently held open, in ascending order.
    #[must_use]
    pub fn open_lines(&self) -> Vec<LineId> {
        self.handles.keys().copied().collect()
    }

    /// Open every line, in ascending pin order, and wire it to its handler.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Fails fast on the first line that cannot be opened or armed. Lines
    /// opened before the failure are released and the manager is `Stopped`.
    pub fn start<N, L>(
        &mut self,
        mut lines: Vec<Line>,
        pipeline: Arc<PressPipeline<N, L>>,
    ) -> Result<(), HardwareError>
    where
        N: Notifier,
        L: PressLog,
    {
        debug_assert_eq!(self.state, LifecycleState::Starting);
        lines.sort_by_key(Line::id);

        for line in lines {
            if let Err(err) = self.open_line(line, &pipeline) {
                tracing::error!(%err, "failed to start line");
                self.release_all();
                self.tasks.abort_all();
                self.state = LifecycleState::Stopped;
                return Err(err);
            }
        }

        self.state = LifecycleState::Running;
        tracing::info!(lines = self.handles.len(), "✅ buttons active");
        Ok(())
    }

    fn open_line<N, L>(
        &mut self,
        line: Line,
        pipeline: &Arc<PressPipeline<N, L>>,
    ) -> Result<(), HardwareError>
    where
        N: Notifier,
        L: PressLog,
    {
        let id = line.id();
        let mut handle = self.monitor.open(&line)?;

        let (tx, rx) = mpsc::channel(EDGE_QUEUE_CAPACITY);
        let sink = EdgeSink::new(id, tx, self.faults_tx.clone());
        if let Err(err) = handle.on_edge(sink) {
            if let Err(release) = handle.close() {
                tracing::warn!(line = %id, err = %release, "release after failed arm");
            }
            return Err(err);
        }

        let handler = LineHandler::new(line, Arc::clone(pipeline));
        self.tasks.spawn(async move {
            handler.run(rx).await;
            id
        });
        self.handles.insert(id, handle);
        tracing::info!(line = %id, "line armed");
        Ok(())
    }

    /// Wait until `shutdown` resolves, a fault is reported, or a line
    /// handler stops unexpectedly.
    pub async fn run_until<F>(&mut self, shutdown: F) -> ShutdownReason
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            () = shutdown => ShutdownReason::Requested,
            Some(fault) = self.faults_rx.recv() => {
                tracing::error!(line = ?fault.line(), err = %error_chain(&fault), "fatal fault");
                ShutdownReason::Fault(error_chain(&fault))
            }
            Some(joined) = self.tasks.join_next() => {
                let reason = match joined {
                    Ok(line) => format!("line handler {line} stopped unexpectedly"),
                    Err(err) => format!("line handler failed: {err}"),
                };
                tracing::error!(%reason, "unhandled fault");
                ShutdownReason::Fault(reason)
            }
        }
    }

    /// Release every line and stop every handler.
    ///
    /// Only the first call does any work; later calls return the reason
    /// decided by the first one, without touching the hardware again.
    /// Release failures are logged and do not stop the remaining releases.
    /// In-flight dispatches are not awaited.
    pub fn shutdown(&mut self, reason: ShutdownReason) -> ShutdownReason {
        if let Some(decided) = &self.decided {
            tracing::debug!("shutdown already performed");
            return decided.clone();
        }

        self.state = LifecycleState::ShuttingDown;
        tracing::info!(?reason, "🛑 stopping buttons");
        self.release_all();
        self.tasks.abort_all();
        self.state = LifecycleState::Stopped;
        self.decided = Some(reason.clone());
        reason
    }

    fn release_all(&mut self) {
        for (line, handle) in &mut self.handles {
            if let Err(err) = handle.close() {
                tracing::warn!(line = %line, err = %error_chain(&err), "failed to release line");
            }
        }
        self.handles.clear();
    }
}

/// Render an error and its sources as `outer: inner: root`.
#[must_use]
pub fn error_chain(err: &dyn Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        rendered.push_str(": ");
        rendered.push_str(&inner.to_string());
        source = inner.source();
    }
    rendered
}
