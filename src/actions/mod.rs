//! Action registry and handler contract.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     register(name, constructor) for every available action
//!
//! Compilation:
//!     ProcessorSpec.action → registry.lookup(name)
//!     → constructor(params, config) → Arc<dyn Handler>
//!
//! Per request:
//!     handler.handle(request) → Outcome::Handled | Outcome::Continue
//! ```

pub mod handler;
pub mod registry;

pub use handler::{Handler, Outcome};
pub use registry::{ActionConstructor, ActionRegistry};
