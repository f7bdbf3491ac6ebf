//! Dispatch multiplexer.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host, path, headers)
//!     → router.rs (walk mounts in registration order)
//!     → matcher.rs (endpoint path + host constraint)
//!     → CompiledChain::run
//!     → Handled response, next mount, or 404
//!
//! Mounting (at load):
//!     CompiledChain × PipelineConfig.public_endpoints
//!     → MountTable (ordered)
//!     → swapped into the Dispatcher
//! ```
//!
//! # Design Decisions
//! - Mounts compiled at load, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always walks the same mounts
//! - First mount to answer wins

pub mod matcher;
pub mod router;

pub use router::{mount, Dispatcher, Mount, MountPath, MountTable};
