//! Shared utilities for integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Json;
use serde_json::{json, Value};

use pipeline_gateway::actions::{ActionRegistry, Handler, Outcome};
use pipeline_gateway::conditions::context::hostname;
use pipeline_gateway::config::{Endpoint, GatewayConfig, PipelineConfig, ProcessorSpec};
use pipeline_gateway::error::HandlerError;

/// Register fake actions that answer with
/// `{ result: <action>, params, hostname, url }`.
pub fn fake_actions(names: &[&str]) -> ActionRegistry {
    let mut registry = ActionRegistry::new();
    for name in names {
        register_fake(&mut registry, name);
    }
    registry
}

pub fn register_fake(registry: &mut ActionRegistry, name: &str) {
    let key = name.to_string();
    registry.register(name, move |params: &Value, _config: &GatewayConfig| {
        let key = key.clone();
        let params = params.clone();
        let handler = move |req: Request<Body>| {
            let body = json!({
                "result": key,
                "params": params,
                "hostname": req
                    .headers()
                    .get("host")
                    .and_then(|h| h.to_str().ok())
                    .map(hostname),
                "url": req.uri().to_string(),
            });
            async move { Ok::<_, HandlerError>(Outcome::respond(Json(body))) }
        };
        Ok(Arc::new(handler) as Arc<dyn Handler>)
    });
}

/// Register an action that counts its invocations and passes the request on.
#[allow(dead_code)]
pub fn register_counting(registry: &mut ActionRegistry, name: &str) -> Arc<AtomicUsize> {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    registry.register(name, move |_params: &Value, _config: &GatewayConfig| {
        let counter = counter.clone();
        let handler = move |req: Request<Body>| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, HandlerError>(Outcome::Continue(req)) }
        };
        Ok(Arc::new(handler) as Arc<dyn Handler>)
    });
    calls
}

/// Register an action whose handler always fails.
#[allow(dead_code)]
pub fn register_failing(registry: &mut ActionRegistry, name: &str) {
    registry.register(name, |_params: &Value, _config: &GatewayConfig| {
        let handler = |_req: Request<Body>| async {
            Err::<Outcome, _>(HandlerError::new("upstream exploded"))
        };
        Ok(Arc::new(handler) as Arc<dyn Handler>)
    });
}

/// Register an action that answers with a fixed status.
#[allow(dead_code)]
pub fn register_status(registry: &mut ActionRegistry, name: &str, status: StatusCode) {
    registry.register(name, move |_params: &Value, _config: &GatewayConfig| {
        let handler = move |_req: Request<Body>| async move {
            Ok::<_, HandlerError>(Outcome::respond(status))
        };
        Ok(Arc::new(handler) as Arc<dyn Handler>)
    });
}

pub fn pipeline(name: &str, processors: Vec<ProcessorSpec>, endpoints: Vec<Endpoint>) -> PipelineConfig {
    PipelineConfig {
        name: name.into(),
        processors,
        public_endpoints: endpoints,
    }
}

pub fn config(pipelines: Vec<PipelineConfig>) -> GatewayConfig {
    GatewayConfig {
        pipelines,
        ..Default::default()
    }
}
