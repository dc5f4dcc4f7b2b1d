//! Express-style handler chains on top of axum.
//!
//! A fixture's behavior is an ordered list of [`Step`]s. Each step receives
//! the shared [`RecordedRequest`] and a [`Next`] forward control: it either
//! produces the response itself or calls `next.run(..)` to hand control to
//! the rest of the chain. The whole chain is mounted as a single axum route
//! handler via [`run_chain`].

use std::future::Future;
use std::sync::Arc;

use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;

use crate::request::RecordedRequest;

/// One link in a fixture's handler chain.
pub type Step = Arc<dyn Fn(Arc<RecordedRequest>, Next) -> BoxFuture<'static, Response> + Send + Sync>;

/// Forward control handed to each step; running it executes the remainder of
/// the chain.
pub struct Next {
    steps: Arc<[Step]>,
    index: usize,
}

impl Next {
    pub(crate) fn new(steps: Arc<[Step]>) -> Self {
        Self { steps, index: 0 }
    }

    /// Run the next step in the chain.
    ///
    /// A chain that runs out of steps without any of them writing a response
    /// answers 500 — surfacing the broken fixture to the test instead of
    /// hanging the connection.
    pub async fn run(self, req: Arc<RecordedRequest>) -> Response {
        match self.steps.get(self.index) {
            Some(step) => {
                let step = Arc::clone(step);
                let next = Next {
                    steps: self.steps,
                    index: self.index + 1,
                };
                step(req, next).await
            }
            None => {
                tracing::warn!(
                    method = %req.method(),
                    path = req.path(),
                    "handler chain completed without producing a response"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "handler chain completed without producing a response",
                )
                    .into_response()
            }
        }
    }
}

/// Wrap a terminal handler as a chain step. The handler receives the shared
/// request and produces the response; it never forwards.
pub fn handler<F, Fut, R>(f: F) -> Step
where
    F: Fn(Arc<RecordedRequest>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    Arc::new(move |req, _next| {
        let fut = f(req);
        Box::pin(async move { fut.await.into_response() })
    })
}

/// Wrap a middleware function as a chain step. The function decides whether
/// to forward via [`Next::run`] or respond itself.
pub fn step<F, Fut, R>(f: F) -> Step
where
    F: Fn(Arc<RecordedRequest>, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    Arc::new(move |req, next| {
        let fut = f(req, next);
        Box::pin(async move { fut.await.into_response() })
    })
}

/// Drive an entire chain for one inbound request. This is the function the
/// dispatcher (axum) invokes for a fixture's route.
pub(crate) async fn run_chain(steps: Arc<[Step]>, req: Request) -> Response {
    let recorded = match RecordedRequest::capture(req).await {
        Ok(recorded) => Arc::new(recorded),
        Err(response) => return response,
    };
    Next::new(steps).run(recorded).await
}
