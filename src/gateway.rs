//! Gateway loading, reload and serving.
//!
//! # Responsibilities
//! - Compile every pipeline and mount it at its endpoints
//! - Select the transport from the presence of TLS material
//! - Swap in recompiled pipelines on reload
//!
//! # Design Decisions
//! - Fail fast: any compile error aborts the load, nothing is mounted
//! - All pipelines compile before the first mount
//! - A failed reload leaves the running table untouched

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::Router;
use tokio::net::TcpListener;

use crate::actions::ActionRegistry;
use crate::config::validation::validate_config;
use crate::config::GatewayConfig;
use crate::error::{ConfigurationError, GatewayError};
use crate::http::server::{build_router, serve_plain, serve_tls};
use crate::net::tls::load_tls_config;
use crate::observability::metrics;
use crate::pipeline::compile;
use crate::routing::{mount, Dispatcher, MountTable};

/// How the gateway accepts connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    Plain,
    Tls { cert: PathBuf, key: PathBuf },
}

impl Transport {
    pub fn from_config(config: &GatewayConfig) -> Self {
        match &config.tls {
            Some(tls) => Transport::Tls {
                cert: PathBuf::from(&tls.cert),
                key: PathBuf::from(&tls.key),
            },
            None => Transport::Plain,
        }
    }

    pub fn is_tls(&self) -> bool {
        matches!(self, Transport::Tls { .. })
    }
}

/// A loaded gateway, ready to serve.
pub struct Gateway {
    registry: Arc<ActionRegistry>,
    config: ArcSwap<GatewayConfig>,
    dispatcher: Arc<Dispatcher>,
    transport: Transport,
}

impl Gateway {
    /// Compile and mount every pipeline in `config`.
    ///
    /// Returns the gateway together with the config it was built from.
    pub fn load(
        config: GatewayConfig,
        registry: Arc<ActionRegistry>,
    ) -> Result<(Self, Arc<GatewayConfig>), ConfigurationError> {
        let table = build_table(&config, &registry)?;
        let transport = Transport::from_config(&config);

        tracing::info!(
            pipelines = config.pipelines.len(),
            mounts = table.len(),
            tls = transport.is_tls(),
            "Gateway loaded"
        );

        let config = Arc::new(config);
        let gateway = Self {
            registry,
            config: ArcSwap::new(Arc::clone(&config)),
            dispatcher: Arc::new(Dispatcher::new(table)),
            transport,
        };
        Ok((gateway, config))
    }

    /// The config the active mount table was built from.
    pub fn config(&self) -> Arc<GatewayConfig> {
        self.config.load_full()
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Axum router that dispatches into this gateway's mounts.
    ///
    /// The router follows reloads; its middleware settings are fixed at
    /// the time it is built.
    pub fn router(&self) -> Router {
        build_router(Arc::clone(&self.dispatcher), &self.config.load().timeouts)
    }

    /// Recompile every pipeline from `config` and swap the mount table.
    pub fn reload(&self, config: GatewayConfig) -> Result<(), ConfigurationError> {
        let table = match build_table(&config, &self.registry) {
            Ok(table) => table,
            Err(e) => {
                tracing::error!(error = %e, "Reload failed, keeping current pipelines");
                metrics::record_reload(false);
                return Err(e);
            }
        };

        let current = self.config.load();
        if Transport::from_config(&config) != self.transport
            || config.listener != current.listener
            || config.timeouts != current.timeouts
        {
            tracing::warn!("Listener, timeout or TLS settings changed; restart required to apply them");
        }

        tracing::info!(
            pipelines = config.pipelines.len(),
            mounts = table.len(),
            "Gateway reloaded"
        );
        self.dispatcher.swap(table);
        self.config.store(Arc::new(config));
        metrics::record_reload(true);
        Ok(())
    }

    /// Accept connections on `listener` until `shutdown` resolves.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();
        match &self.transport {
            Transport::Plain => serve_plain(listener, router, shutdown).await?,
            Transport::Tls { cert, key } => {
                let tls = load_tls_config(cert, key).await.map_err(GatewayError::Tls)?;
                serve_tls(listener, router, tls, shutdown).await?;
            }
        }
        Ok(())
    }
}

fn build_table(
    config: &GatewayConfig,
    registry: &ActionRegistry,
) -> Result<MountTable, ConfigurationError> {
    validate_config(config).map_err(ConfigurationError::Invalid)?;

    let mut chains = Vec::with_capacity(config.pipelines.len());
    for pipeline in &config.pipelines {
        let chain = compile(pipeline, registry, config)?;
        tracing::info!(
            pipeline = %pipeline.name,
            processors = chain.steps().len(),
            endpoints = pipeline.public_endpoints.len(),
            "Compiled pipeline"
        );
        chains.push((Arc::new(chain), &pipeline.public_endpoints));
    }

    let mut table = MountTable::new();
    for (chain, endpoints) in chains {
        mount(&mut table, chain, endpoints);
    }
    Ok(table)
}
