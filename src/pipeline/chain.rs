//! Compiled chain and its request-time walk.

use std::fmt;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;

use crate::actions::{Handler, Outcome};
use crate::conditions::{evaluate, Condition};
use crate::error::ChainError;

/// One guarded action.
pub struct Step {
    action: String,
    condition: Condition,
    handler: Arc<dyn Handler>,
}

impl Step {
    pub fn new(action: impl Into<String>, condition: Condition, handler: Arc<dyn Handler>) -> Self {
        Self {
            action: action.into(),
            condition,
            handler,
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("action", &self.action)
            .field("condition", &format_args!("{}", self.condition))
            .finish()
    }
}

/// Result of walking a chain.
pub enum ChainOutcome {
    /// A step answered the request.
    Handled(Response),
    /// Every step passed; the request goes back to the caller.
    Unhandled(Request<Body>),
}

/// Ordered, immutable steps of one pipeline. Built once, shared by every
/// request that reaches one of the pipeline's mounts.
#[derive(Debug)]
pub struct CompiledChain {
    pipeline: String,
    steps: Vec<Step>,
}

impl CompiledChain {
    pub fn new(pipeline: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            pipeline: pipeline.into(),
            steps,
        }
    }

    pub fn pipeline(&self) -> &str {
        &self.pipeline
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Walk the steps in order.
    ///
    /// A step whose condition is false is skipped without touching its
    /// handler. The first handler to answer stops the walk; a handler that
    /// continues passes its (possibly modified) request to the next step.
    pub async fn run(&self, mut req: Request<Body>) -> Result<ChainOutcome, ChainError> {
        for step in &self.steps {
            tracing::debug!(pipeline = %self.pipeline, action = %step.action, "Checking predicate");

            let matched = evaluate(&step.condition, &req).map_err(|source| ChainError::Evaluation {
                action: step.action.clone(),
                source,
            })?;
            if !matched {
                continue;
            }

            tracing::debug!(pipeline = %self.pipeline, action = %step.action, "Request matched predicate");

            let outcome = step
                .handler
                .handle(req)
                .await
                .map_err(|source| ChainError::Handler {
                    action: step.action.clone(),
                    source,
                })?;

            match outcome {
                Outcome::Handled(response) => return Ok(ChainOutcome::Handled(response)),
                Outcome::Continue(next) => req = next,
            }
        }

        Ok(ChainOutcome::Unhandled(req))
    }
}
