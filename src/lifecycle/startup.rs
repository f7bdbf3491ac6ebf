//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging and metrics
//! - Compile pipelines, bind the listener, begin accepting traffic
//! - Optionally watch the config file and reload on change
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when pipelines are ready)

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::actions::ActionRegistry;
use crate::config::loader::load_config;
use crate::config::watcher::ConfigWatcher;
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::lifecycle::signals::wait_for_signal;
use crate::lifecycle::Shutdown;
use crate::observability::{logging, metrics};

/// What the process was asked to run.
#[derive(Debug, Clone)]
pub struct StartupOptions {
    pub config_path: PathBuf,
    pub watch: bool,
}

/// Run the gateway until Ctrl+C or SIGTERM.
pub async fn run(options: StartupOptions, registry: ActionRegistry) -> Result<(), GatewayError> {
    let config = load_config(&options.config_path)?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!(
        config = %options.config_path.display(),
        pipelines = config.pipelines.len(),
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let (gateway, config) = Gateway::load(config, Arc::new(registry))?;
    let gateway = Arc::new(gateway);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            wait_for_signal().await;
            shutdown.trigger();
        });
    }

    // Dropping the notify watcher stops it, so it lives until serve returns.
    let _watcher = if options.watch {
        let (watcher, updates) = ConfigWatcher::new(&options.config_path);
        match watcher.run() {
            Ok(guard) => {
                spawn_reloader(Arc::clone(&gateway), updates, &shutdown);
                Some(guard)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to start config watcher, hot reload disabled");
                None
            }
        }
    } else {
        None
    };

    gateway.serve(listener, shutdown.signalled()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn spawn_reloader(
    gateway: Arc<Gateway>,
    mut updates: mpsc::UnboundedReceiver<GatewayConfig>,
    shutdown: &Shutdown,
) {
    let mut stop = shutdown.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                update = updates.recv() => match update {
                    // Failures are logged by reload and the current table kept
                    Some(config) => { let _ = gateway.reload(config); }
                    None => break,
                },
                _ = stop.recv() => break,
            }
        }
    });
}
