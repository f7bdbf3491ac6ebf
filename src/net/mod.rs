//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Config `tls { key, cert }` present
//!     → tls.rs (load PEM pair into rustls)
//!     → http::server::serve_tls
//! otherwise
//!     → http::server::serve_plain
//! ```

pub mod tls;
