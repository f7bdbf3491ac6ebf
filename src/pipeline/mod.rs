//! Pipeline compiler.
//!
//! # Data Flow
//! ```text
//! PipelineConfig (processors in declared order)
//!     → compiler.rs (conditions + registry lookups + constructors)
//!     → CompiledChain (immutable, shared via Arc)
//!
//! Per request (chain.rs):
//!     for each step in order:
//!         condition false → next step
//!         handler → Handled (stop) | Continue (next step)
//!     → Unhandled: request returned to the dispatcher
//! ```
//!
//! # Design Decisions
//! - Linear scan, no backtracking
//! - No partial pipelines: any compile error discards the whole chain

pub mod chain;
pub mod compiler;

pub use chain::{ChainOutcome, CompiledChain, Step};
pub use compiler::compile;
