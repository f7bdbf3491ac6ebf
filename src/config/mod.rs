//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (JSON/TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → compiled into pipelines by the gateway
//!
//! On reload:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → gateway recompiles and swaps its mount table
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - Ambient sections have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use schema::Endpoint;
pub use schema::GatewayConfig;
pub use schema::PipelineConfig;
pub use schema::ProcessorSpec;
pub use schema::TlsConfig;
