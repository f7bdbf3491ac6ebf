//! Declarative API gateway pipelines.
//!
//! A config names pipelines: ordered `(condition, action)` processors mounted
//! at public endpoints. At load time every condition is compiled into a
//! [`Condition`], every action name is resolved through an [`ActionRegistry`]
//! into a handler, and the resulting [`CompiledChain`]s are mounted in a
//! [`Dispatcher`]. At request time the dispatcher walks matching mounts in
//! registration order until a handler answers.
//!
//! ```text
//!     Client Request
//!     ─────────────▶ http (request id, trace, timeout)
//!                     │
//!                     ▼
//!                  routing::Dispatcher ── mount matches? ──▶ pipeline::CompiledChain
//!                     │                                        │ condition? → handler
//!                     │◀──────────── Unhandled ────────────────┘
//!                     ▼
//!                  404 Not Found
//! ```

// Core
pub mod actions;
pub mod conditions;
pub mod pipeline;
pub mod routing;
pub mod gateway;

// Cross-cutting concerns
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use actions::{ActionRegistry, Handler, Outcome};
pub use conditions::{evaluate, Condition, RequestContext};
pub use config::GatewayConfig;
pub use error::{ConfigurationError, GatewayError};
pub use gateway::{Gateway, Transport};
pub use lifecycle::Shutdown;
pub use pipeline::{compile, ChainOutcome, CompiledChain};
pub use routing::{mount, Dispatcher, MountTable};
