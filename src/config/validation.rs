//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Pipeline names are unique, endpoints are well-formed
//! - Listener and TLS settings are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Action names and conditions are checked by the compiler, not here

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyPipelineName { index: usize },
    DuplicatePipeline(String),
    EmptyActionName { pipeline: String, index: usize },
    InvalidEndpointPath { pipeline: String, path: String },
    EmptyEndpointHost { pipeline: String, path: String },
    EmptyTlsPath(&'static str),
    InvalidBindAddress(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyPipelineName { index } => {
                write!(f, "pipeline #{} has an empty name", index)
            }
            ValidationError::DuplicatePipeline(name) => {
                write!(f, "pipeline \"{}\" is defined more than once", name)
            }
            ValidationError::EmptyActionName { pipeline, index } => {
                write!(f, "pipeline \"{}\": processor {} has an empty action", pipeline, index)
            }
            ValidationError::InvalidEndpointPath { pipeline, path } => {
                write!(f, "pipeline \"{}\": endpoint path \"{}\" must start with '/'", pipeline, path)
            }
            ValidationError::EmptyEndpointHost { pipeline, path } => {
                write!(f, "pipeline \"{}\": endpoint \"{}\" has an empty host", pipeline, path)
            }
            ValidationError::EmptyTlsPath(field) => write!(f, "tls.{} must not be empty", field),
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "listener bind address \"{}\" is not a socket address", addr)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (index, pipeline) in config.pipelines.iter().enumerate() {
        if pipeline.name.trim().is_empty() {
            errors.push(ValidationError::EmptyPipelineName { index });
        } else if !seen.insert(pipeline.name.as_str()) {
            errors.push(ValidationError::DuplicatePipeline(pipeline.name.clone()));
        }

        for (index, spec) in pipeline.processors.iter().enumerate() {
            if spec.action.trim().is_empty() {
                errors.push(ValidationError::EmptyActionName {
                    pipeline: pipeline.name.clone(),
                    index,
                });
            }
        }

        for endpoint in &pipeline.public_endpoints {
            if !endpoint.path.starts_with('/') {
                errors.push(ValidationError::InvalidEndpointPath {
                    pipeline: pipeline.name.clone(),
                    path: endpoint.path.clone(),
                });
            }
            if endpoint.host.as_deref().is_some_and(|h| h.trim().is_empty()) {
                errors.push(ValidationError::EmptyEndpointHost {
                    pipeline: pipeline.name.clone(),
                    path: endpoint.path.clone(),
                });
            }
        }
    }

    if let Some(tls) = &config.tls {
        if tls.key.trim().is_empty() {
            errors.push(ValidationError::EmptyTlsPath("key"));
        }
        if tls.cert.trim().is_empty() {
            errors.push(ValidationError::EmptyTlsPath("cert"));
        }
    }

    if !is_bind_address(&config.listener.bind_address) {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// `ip:port`, or `host:port` with a name resolved at bind time.
fn is_bind_address(addr: &str) -> bool {
    if addr.parse::<SocketAddr>().is_ok() {
        return true;
    }
    match addr.rsplit_once(':') {
        Some((host, port)) => {
            !host.is_empty() && !host.contains(char::is_whitespace) && port.parse::<u16>().is_ok()
        }
        None => false,
    }
}
