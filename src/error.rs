//! Error taxonomy for the gateway.
//!
//! # Design Decisions
//! - Configuration problems are detected while compiling, never per request
//! - Request-time failures (evaluation, handler) are isolated to one request
//! - An unmatched request is an outcome (404), not an error

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tower::BoxError;

use crate::config::loader::LoadError;
use crate::config::validation::ValidationError;

/// Configuration is unusable. Always raised before traffic flows.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("invalid configuration: {}", join(.0))]
    Invalid(Vec<ValidationError>),

    #[error("pipeline \"{pipeline}\": could not find action \"{action}\"")]
    UnknownAction { pipeline: String, action: String },

    #[error("pipeline \"{pipeline}\": action \"{action}\" failed to initialize: {source}")]
    ActionInit {
        pipeline: String,
        action: String,
        #[source]
        source: BoxError,
    },

    #[error("pipeline \"{pipeline}\", processor {index}: {source}")]
    Condition {
        pipeline: String,
        index: usize,
        #[source]
        source: ConditionError,
    },
}

/// A condition expression failed to compile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    #[error("unknown condition operator \"{0}\"")]
    UnknownOperator(String),

    #[error("operator \"{operator}\" expects {expected} operand(s), got {found}")]
    Arity {
        operator: &'static str,
        expected: &'static str,
        found: usize,
    },

    #[error("operator \"{operator}\": {reason}")]
    Operand {
        operator: &'static str,
        reason: String,
    },

    #[error("unknown field selector \"{0}\"")]
    UnknownField(String),

    #[error("condition nesting exceeds maximum depth of {0}")]
    TooDeep(usize),

    #[error("condition must be an operator name or an [operator, operands...] array, got {0}")]
    Malformed(String),
}

/// A condition referenced a request attribute that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error("request has no host")]
    MissingHost,

    #[error("request has no header \"{0}\"")]
    MissingHeader(String),

    #[error("header \"{0}\" is not valid UTF-8")]
    NonUtf8Header(String),

    #[error("request has no context field \"{0}\"")]
    MissingField(String),
}

/// A handler failed while processing a request.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// Failure while walking a compiled chain.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("condition for action \"{action}\" could not be evaluated: {source}")]
    Evaluation {
        action: String,
        #[source]
        source: EvaluationError,
    },

    #[error("action \"{action}\" failed: {source}")]
    Handler {
        action: String,
        #[source]
        source: HandlerError,
    },
}

impl IntoResponse for ChainError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

/// Top-level error for starting and running a gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("TLS setup failed: {0}")]
    Tls(#[source] std::io::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub(crate) fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
