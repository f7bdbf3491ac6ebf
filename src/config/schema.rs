//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from JSON or TOML files.
//! Keys are camelCase (`publicEndpoints`, `bindAddress`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Pipelines in mount order.
    pub pipelines: Vec<PipelineConfig>,

    /// TLS material. When present the gateway serves HTTPS.
    pub tls: Option<TlsConfig>,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// A named chain of guarded actions and the endpoints it is mounted on.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Pipeline identifier for logging/metrics.
    pub name: String,

    /// Processors in execution order.
    #[serde(default)]
    pub processors: Vec<ProcessorSpec>,

    /// Endpoints the compiled chain is mounted at.
    #[serde(default)]
    pub public_endpoints: Vec<Endpoint>,
}

/// One guarded step of a pipeline.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ProcessorSpec {
    /// Raw condition expression; `always` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Value>,

    /// Registered action name.
    pub action: String,

    /// Opaque action parameters, handed to the action constructor.
    #[serde(default)]
    pub params: Value,
}

impl ProcessorSpec {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            condition: None,
            action: action.into(),
            params: Value::Null,
        }
    }

    pub fn with_condition(mut self, condition: Value) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }
}

/// A public mount point.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Endpoint {
    /// Mount path (e.g., "/api").
    pub path: String,

    /// Host header to match (case-insensitive, port ignored).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

impl Endpoint {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            host: None,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }
}

/// TLS material for the listener.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TlsConfig {
    /// Path to private key file (PEM).
    pub key: String,

    /// Path to certificate file (PEM).
    pub cert: String,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_minimal_json() {
        let config: GatewayConfig = serde_json::from_value(json!({
            "pipelines": [{
                "name": "api",
                "processors": [{ "action": "echo" }],
                "publicEndpoints": [{ "path": "/api", "host": "a.example.com" }]
            }]
        }))
        .unwrap();

        let pipeline = &config.pipelines[0];
        assert_eq!(pipeline.processors[0].condition, None);
        assert_eq!(pipeline.processors[0].params, Value::Null);
        assert_eq!(
            pipeline.public_endpoints,
            vec![Endpoint::new("/api").with_host("a.example.com")]
        );
        assert_eq!(config.listener, ListenerConfig::default());
        assert!(config.tls.is_none());
    }

    #[test]
    fn missing_processors_and_endpoints_default_to_empty() {
        let config: GatewayConfig =
            serde_json::from_value(json!({ "pipelines": [{ "name": "empty" }] })).unwrap();
        assert!(config.pipelines[0].processors.is_empty());
        assert!(config.pipelines[0].public_endpoints.is_empty());
    }

    #[test]
    fn deserializes_toml_with_conditions() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [listener]
            bindAddress = "127.0.0.1:9000"

            [tls]
            key = "key.pem"
            cert = "cert.pem"

            [[pipelines]]
            name = "api"

            [[pipelines.processors]]
            action = "echo"
            condition = ["not", ["equals", "method", "GET"]]
            params = { greeting = "hi" }

            [[pipelines.publicEndpoints]]
            path = "/"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.tls.as_ref().map(|t| t.cert.as_str()), Some("cert.pem"));
        let spec = &config.pipelines[0].processors[0];
        assert_eq!(spec.condition, Some(json!(["not", ["equals", "method", "GET"]])));
        assert_eq!(spec.params, json!({ "greeting": "hi" }));
    }
}
