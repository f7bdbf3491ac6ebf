//! Mount table and request dispatch.
//!
//! # Responsibilities
//! - Store compiled chains at their endpoints, in registration order
//! - Walk matching mounts until one answers the request
//! - Fall through to 404 when nothing answers
//! - Present each chain the request URI relative to its mount
//!
//! # Design Decisions
//! - Immutable after construction; reloads swap a whole new table
//! - Each request works on one table snapshot
//! - O(n) scan over mounts (acceptable for typical pipeline counts)

use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use axum::body::Body;
use axum::extract::OriginalUri;
use axum::http::uri::PathAndQuery;
use axum::http::{Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::config::Endpoint;
use crate::observability::metrics;
use crate::pipeline::{ChainOutcome, CompiledChain};
use crate::routing::matcher::{EndpointMatcher, Matcher};

/// Path the matched mount was registered at, visible to handlers.
///
/// While a chain runs, the request URI is relative to this path; the full
/// URI is in the [`OriginalUri`] extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPath(pub String);

/// One chain mounted at one endpoint.
#[derive(Debug)]
pub struct Mount {
    endpoint: Endpoint,
    matcher: EndpointMatcher,
    chain: Arc<CompiledChain>,
}

impl Mount {
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn chain(&self) -> &Arc<CompiledChain> {
        &self.chain
    }
}

/// Mounts in precedence order.
#[derive(Debug, Default)]
pub struct MountTable {
    mounts: Vec<Mount>,
}

impl MountTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a chain at one endpoint. Earlier registrations take precedence.
    pub fn register(&mut self, endpoint: &Endpoint, chain: Arc<CompiledChain>) {
        tracing::debug!(
            pipeline = %chain.pipeline(),
            path = %endpoint.path,
            host = ?endpoint.host,
            "Mounting pipeline"
        );
        self.mounts.push(Mount {
            endpoint: endpoint.clone(),
            matcher: EndpointMatcher::new(endpoint),
            chain,
        });
    }

    pub fn mounts(&self) -> &[Mount] {
        &self.mounts
    }

    pub fn len(&self) -> usize {
        self.mounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }
}

/// Mount a compiled chain at every endpoint of its pipeline.
pub fn mount(table: &mut MountTable, chain: Arc<CompiledChain>, endpoints: &[Endpoint]) {
    for endpoint in endpoints {
        table.register(endpoint, Arc::clone(&chain));
    }
}

/// Routes requests through the active mount table.
#[derive(Debug)]
pub struct Dispatcher {
    table: ArcSwap<MountTable>,
}

impl Dispatcher {
    pub fn new(table: MountTable) -> Self {
        Self {
            table: ArcSwap::from_pointee(table),
        }
    }

    /// Replace the mount table. In-flight requests finish on the old one.
    pub fn swap(&self, table: MountTable) {
        self.table.store(Arc::new(table));
    }

    /// Snapshot of the active mount table.
    pub fn table(&self) -> Arc<MountTable> {
        self.table.load_full()
    }

    /// Run the request through every matching mount in order.
    ///
    /// Each chain sees the URI with the mount prefix removed. A chain that
    /// does not answer hands the request on with its full URI restored.
    pub async fn dispatch(&self, mut req: Request<Body>) -> Response {
        let start = Instant::now();
        let table = self.table.load_full();

        let original = req.uri().clone();
        if req.extensions().get::<OriginalUri>().is_none() {
            req.extensions_mut().insert(OriginalUri(original.clone()));
        }

        for mount in table.mounts() {
            if !mount.matcher.matches(&req) {
                continue;
            }
            let Some(rest) = mount.matcher.path().strip(original.path()) else {
                continue;
            };

            let pipeline = mount.chain.pipeline();
            if let Some(relative) = mount_relative(&original, rest) {
                *req.uri_mut() = relative;
            }
            req.extensions_mut()
                .insert(MountPath(mount.matcher.mount_path().to_string()));

            match mount.chain.run(req).await {
                Ok(ChainOutcome::Handled(response)) => {
                    metrics::record_request(pipeline, "handled", start);
                    return response;
                }
                Ok(ChainOutcome::Unhandled(unhandled)) => {
                    tracing::debug!(pipeline = %pipeline, "Pipeline did not handle request, falling through");
                    req = unhandled;
                    *req.uri_mut() = original.clone();
                }
                Err(e) => {
                    tracing::error!(pipeline = %pipeline, error = %e, "Pipeline failed");
                    metrics::record_request(pipeline, "error", start);
                    return e.into_response();
                }
            }
        }

        tracing::debug!(method = %req.method(), path = %req.uri().path(), "No pipeline handled request");
        metrics::record_request("none", "not_found", start);
        (StatusCode::NOT_FOUND, "Not Found").into_response()
    }
}

/// `uri` with its path replaced by the mount remainder; the query is kept.
fn mount_relative(uri: &Uri, rest: &str) -> Option<Uri> {
    let path = if rest.is_empty() { "/" } else { rest };
    let path_and_query = match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query.parse::<PathAndQuery>().ok()?);
    Uri::from_parts(parts).ok()
}
