//! Conditional evaluator.
//!
//! # Data Flow
//! ```text
//! Raw condition (["not", ["equals", "method", "GET"]])
//!     → expr.rs (compile & validate into Condition)
//!     → stored in the compiled chain
//!
//! Per request:
//!     Condition + Request
//!     → evaluate.rs (pure, short-circuiting)
//!     → bool, or EvaluationError for unresolvable fields
//! ```
//!
//! # Design Decisions
//! - Unknown operators, bad arity and unknown fields fail at load time
//! - Evaluation never mutates the request
//! - Depth is bounded at compile time so evaluation always terminates

pub mod context;
pub mod evaluate;
pub mod expr;

pub use context::{set_context_field, ContextFields, RequestContext};
pub use evaluate::evaluate;
pub use expr::{Condition, Field, MAX_CONDITION_DEPTH};
