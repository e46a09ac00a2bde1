//! # pressgated — button-to-motion gateway daemon
//!
//! Composition root that wires all adapters together and runs until it is
//! told to stop or the GPIO subsystem fails.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialise logging
//! - Construct the press log, the HTTP notifier and the dispatcher
//! - Pick the line monitor (rppal or virtual) and start every line
//! - Stop on SIGINT/SIGTERM, on the first hardware fault or on a panicking
//!   notification
//! - Exit `0` after a requested stop, `1` after a fault or failed startup
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use pressgate_adapter_gpio_rppal::RppalLineMonitor;
use pressgate_adapter_press_log::FilePressLog;
use pressgate_adapter_shinobi::{ShinobiError, ShinobiNotifier};
use pressgate_adapter_virtual::VirtualLineMonitor;
use pressgate_app::fault::FaultSender;
use pressgate_app::ports::{LineMonitor, Notifier, PressLog};
use pressgate_app::services::dispatcher::Dispatcher;
use pressgate_app::services::lifecycle::{LifecycleManager, ShutdownReason, error_chain};
use pressgate_app::services::line_handler::PressPipeline;
use pressgate_domain::error::PressGateError;
use pressgate_domain::line::Line;
use pressgate_domain::notification::SiteCredentials;

use crate::config::{Config, Driver, LoggingConfig};

/// Failures that prevent the daemon from reaching the running state.
#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("failed to build notifier")]
    Notifier(#[from] ShinobiError),
    #[error(transparent)]
    Pipeline(#[from] PressGateError),
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            init_tracing(&LoggingConfig::default().filter);
            tracing::error!(err = %error_chain(&err), "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.logging.filter);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "🟢 starting GPIO buttons");
    let resolved = config
        .lines()
        .and_then(|lines| Ok((lines, config.site_credentials()?)));
    let (lines, site) = match resolved {
        Ok(resolved) => resolved,
        Err(err) => {
            tracing::error!(err = %error_chain(&err), "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    match run(&config, lines, site).await {
        Ok(reason) => {
            tracing::info!(?reason, "pressgated stopped");
            ExitCode::from(reason.exit_code())
        }
        Err(err) => {
            tracing::error!(err = %error_chain(&err), "startup failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|err| {
        eprintln!("pressgated: invalid log filter `{filter}` ({err}), using `info`");
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(
    config: &Config,
    lines: Vec<Line>,
    site: SiteCredentials,
) -> Result<ShutdownReason, StartupError> {
    let press_log = FilePressLog::new(&config.press_log).map_err(PressGateError::from)?;
    let notifier = ShinobiNotifier::new(&config.notifier.shinobi())?;
    let base_url = notifier.base_url().to_string();
    let dispatcher = Dispatcher::new(notifier, config.notifier.timeout());
    tracing::info!(
        %base_url,
        timeout = ?dispatcher.timeout(),
        press_log = %press_log.path().display(),
        "pipeline ready"
    );

    let profile = config.notifier.motion_profile();
    let assemble = move |faults: FaultSender| {
        Arc::new(PressPipeline::new(
            dispatcher.with_faults(faults),
            press_log,
            site,
            profile,
        ))
    };

    let reason = match config.gpio.driver {
        Driver::Rppal => {
            let monitor =
                RppalLineMonitor::new(config.gpio.rppal()).map_err(PressGateError::from)?;
            supervise(monitor, lines, assemble).await?
        }
        Driver::Virtual => {
            tracing::warn!("virtual GPIO driver selected, no press will ever be observed");
            supervise(VirtualLineMonitor::new(), lines, assemble).await?
        }
    };
    Ok(reason)
}

/// Start every line and run until a stop is requested or a fault occurs.
///
/// `assemble` builds the pipeline around the manager's fault channel.
async fn supervise<M, N, L>(
    monitor: M,
    lines: Vec<Line>,
    assemble: impl FnOnce(FaultSender) -> Arc<PressPipeline<N, L>>,
) -> Result<ShutdownReason, PressGateError>
where
    M: LineMonitor,
    N: Notifier,
    L: PressLog,
{
    let mut manager = LifecycleManager::new(monitor);
    let pipeline = assemble(manager.fault_sender());
    manager.start(lines, pipeline)?;
    let reason = manager.run_until(shutdown_signal()).await;
    Ok(manager.shutdown(reason))
}

/// Resolve on SIGINT, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received SIGINT"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}
