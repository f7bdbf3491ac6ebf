//! Request handler contract.
//!
//! # Design Decisions
//! - A handler owns the request while it runs and either answers it
//!   (`Handled`) or hands it back, possibly modified (`Continue`)
//! - Handlers are async; the chain waits for the outcome before moving on
//! - Plain async closures are handlers

use std::fmt;
use std::future::Future;

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;

use crate::error::HandlerError;

/// What a handler decided to do with a request.
pub enum Outcome {
    /// The request is answered; the chain stops here.
    Handled(Response),
    /// Pass the request on to the next step.
    Continue(Request<Body>),
}

impl Outcome {
    /// Terminate with any axum response.
    pub fn respond(response: impl IntoResponse) -> Self {
        Outcome::Handled(response.into_response())
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Handled(res) => f.debug_tuple("Handled").field(&res.status()).finish(),
            Outcome::Continue(req) => f.debug_tuple("Continue").field(req.uri()).finish(),
        }
    }
}

/// A request handler produced by an action constructor.
pub trait Handler: Send + Sync {
    fn handle(&self, req: Request<Body>) -> BoxFuture<'_, Result<Outcome, HandlerError>>;
}

impl<F, Fut> Handler for F
where
    F: Fn(Request<Body>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Outcome, HandlerError>> + Send + 'static,
{
    fn handle(&self, req: Request<Body>) -> BoxFuture<'_, Result<Outcome, HandlerError>> {
        Box::pin(self(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn closures_are_handlers() {
        let handler = |req: Request<Body>| async move {
            if req.uri().path() == "/stop" {
                Ok::<_, HandlerError>(Outcome::respond(StatusCode::NO_CONTENT))
            } else {
                Ok(Outcome::Continue(req))
            }
        };

        let req = Request::builder().uri("/stop").body(Body::empty()).unwrap();
        match handler.handle(req).await.unwrap() {
            Outcome::Handled(res) => assert_eq!(res.status(), StatusCode::NO_CONTENT),
            Outcome::Continue(_) => panic!("expected the request to be handled"),
        }

        let req = Request::builder().uri("/go").body(Body::empty()).unwrap();
        assert!(matches!(handler.handle(req).await.unwrap(), Outcome::Continue(_)));
    }
}
