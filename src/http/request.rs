//! Request ID lookup.
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing (UUID v4, via
//!   tower-http's `MakeRequestUuid`)
//! - An incoming `x-request-id` is kept, never overwritten
//! - The same header is echoed on the response

use axum::http::Request;

/// Header carrying the request ID in both directions.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Read the request ID assigned to a request.
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&str>;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> Option<&str> {
        self.headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
    }
}
