//! Pipeline compilation.
//!
//! # Responsibilities
//! - Compile each processor's condition (default `always`)
//! - Resolve each action through the registry and construct its handler
//! - Preserve declared processor order
//!
//! # Design Decisions
//! - Eager: every constructor runs once, at load time
//! - Fail fast: the first unresolved action or bad condition aborts the pipeline

use crate::actions::ActionRegistry;
use crate::conditions::Condition;
use crate::config::{GatewayConfig, PipelineConfig};
use crate::error::ConfigurationError;
use crate::pipeline::chain::{CompiledChain, Step};

/// Compile one pipeline into its chain.
pub fn compile(
    pipeline: &PipelineConfig,
    registry: &ActionRegistry,
    config: &GatewayConfig,
) -> Result<CompiledChain, ConfigurationError> {
    let mut steps = Vec::with_capacity(pipeline.processors.len());

    for (index, spec) in pipeline.processors.iter().enumerate() {
        let condition = match &spec.condition {
            Some(raw) => Condition::compile(raw).map_err(|source| ConfigurationError::Condition {
                pipeline: pipeline.name.clone(),
                index,
                source,
            })?,
            None => Condition::Always,
        };

        let constructor = registry
            .lookup(&spec.action)
            .ok_or_else(|| ConfigurationError::UnknownAction {
                pipeline: pipeline.name.clone(),
                action: spec.action.clone(),
            })?;

        let handler = constructor(&spec.params, config).map_err(|source| {
            ConfigurationError::ActionInit {
                pipeline: pipeline.name.clone(),
                action: spec.action.clone(),
                source,
            }
        })?;

        tracing::debug!(
            pipeline = %pipeline.name,
            action = %spec.action,
            condition = %condition,
            "Compiled processor"
        );

        steps.push(Step::new(spec.action.clone(), condition, handler));
    }

    Ok(CompiledChain::new(pipeline.name.clone(), steps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};

    use crate::actions::{Handler, Outcome};
    use crate::config::{Endpoint, ProcessorSpec};
    use crate::error::{ConditionError, HandlerError};

    fn registry_with(names: &[&str], built: Arc<AtomicUsize>) -> ActionRegistry {
        let mut registry = ActionRegistry::new();
        for name in names {
            let built = built.clone();
            registry.register(*name, move |_params: &Value, _config: &GatewayConfig| {
                built.fetch_add(1, Ordering::SeqCst);
                let handler = |_req: Request<Body>| async {
                    Ok::<_, HandlerError>(Outcome::respond(StatusCode::OK))
                };
                Ok(Arc::new(handler) as Arc<dyn Handler>)
            });
        }
        registry
    }

    fn pipeline(processors: Vec<ProcessorSpec>) -> PipelineConfig {
        PipelineConfig {
            name: "p".into(),
            processors,
            public_endpoints: vec![Endpoint::new("/")],
        }
    }

    #[test]
    fn preserves_declared_order() {
        let built = Arc::new(AtomicUsize::new(0));
        let registry = registry_with(&["a", "b", "c"], built.clone());
        let pipeline = pipeline(vec![
            ProcessorSpec::new("c"),
            ProcessorSpec::new("a").with_condition(json!(["method", "POST"])),
            ProcessorSpec::new("b"),
            ProcessorSpec::new("a"),
        ]);

        let chain = compile(&pipeline, &registry, &GatewayConfig::default()).unwrap();
        let order: Vec<&str> = chain.steps().iter().map(|s| s.action()).collect();
        assert_eq!(order, vec!["c", "a", "b", "a"]);
        assert_eq!(built.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn missing_condition_defaults_to_always() {
        let registry = registry_with(&["a"], Arc::default());
        let chain = compile(&pipeline(vec![ProcessorSpec::new("a")]), &registry, &GatewayConfig::default())
            .unwrap();
        assert_eq!(chain.steps()[0].condition(), &Condition::Always);
    }

    #[test]
    fn unknown_action_fails() {
        let registry = registry_with(&["a"], Arc::default());
        let err = compile(
            &pipeline(vec![ProcessorSpec::new("a"), ProcessorSpec::new("missing")]),
            &registry,
            &GatewayConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::UnknownAction { ref action, .. } if action == "missing"
        ));
        assert_eq!(err.to_string(), "pipeline \"p\": could not find action \"missing\"");
    }

    #[test]
    fn unknown_operator_fails_at_compile_time() {
        let registry = registry_with(&["a"], Arc::default());
        let err = compile(
            &pipeline(vec![ProcessorSpec::new("a").with_condition(json!(["sometimes"]))]),
            &registry,
            &GatewayConfig::default(),
        )
        .unwrap_err();
        match err {
            ConfigurationError::Condition { index, source, .. } => {
                assert_eq!(index, 0);
                assert_eq!(source, ConditionError::UnknownOperator("sometimes".into()));
            }
            other => panic!("expected condition error, got {other}"),
        }
    }

    #[test]
    fn constructor_failure_is_a_configuration_error() {
        let mut registry = ActionRegistry::new();
        registry.register("strict", |params: &Value, _config: &GatewayConfig| {
            params.get("limit").and_then(Value::as_u64).ok_or("limit is required")?;
            Err("unreachable in this test".into())
        });

        let err = compile(
            &pipeline(vec![ProcessorSpec::new("strict").with_params(json!({}))]),
            &registry,
            &GatewayConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::ActionInit { .. }));
        assert!(err.to_string().contains("limit is required"));
    }

    #[test]
    fn constructors_receive_params_and_config() {
        let seen = Arc::new(std::sync::Mutex::new(None));
        let mut registry = ActionRegistry::new();
        let sink = seen.clone();
        registry.register("capture", move |params: &Value, config: &GatewayConfig| {
            *sink.lock().unwrap() = Some((params.clone(), config.listener.bind_address.clone()));
            let handler = |req: Request<Body>| async move { Ok::<_, HandlerError>(Outcome::Continue(req)) };
            Ok(Arc::new(handler) as Arc<dyn Handler>)
        });

        let mut config = GatewayConfig::default();
        config.listener.bind_address = "127.0.0.1:1".into();
        compile(
            &pipeline(vec![ProcessorSpec::new("capture").with_params(json!({ "k": 1 }))]),
            &registry,
            &config,
        )
        .unwrap();

        assert_eq!(
            seen.lock().unwrap().clone(),
            Some((json!({ "k": 1 }), "127.0.0.1:1".to_string()))
        );
    }
}
