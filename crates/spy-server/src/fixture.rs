use std::future::Future;
use std::sync::Arc;

use axum::http::Method;
use axum::response::IntoResponse;
use axum::routing::MethodFilter;

use crate::chain::{self, Next, Step};
use crate::error::SpyServerError;
use crate::request::RecordedRequest;

/// A named route definition registered ahead of server startup: an HTTP
/// method, an axum path pattern, and a handler chain of one or more steps.
///
/// Fixtures are immutable once registered — installing one onto a server
/// wraps a *copy* of the chain, so the same fixture can be installed on any
/// number of server instances with independent spies.
///
/// # Example
/// ```
/// use spy_server::Fixture;
///
/// let fixture = Fixture::get("/hello").respond(|_req| async { "world" });
/// ```
#[derive(Clone)]
pub struct Fixture {
    method: Method,
    route: String,
    chain: Vec<Step>,
}

impl Fixture {
    pub fn new(method: Method, route: impl Into<String>) -> Self {
        Self {
            method,
            route: route.into(),
            chain: Vec::new(),
        }
    }

    pub fn get(route: impl Into<String>) -> Self {
        Self::new(Method::GET, route)
    }

    pub fn post(route: impl Into<String>) -> Self {
        Self::new(Method::POST, route)
    }

    pub fn put(route: impl Into<String>) -> Self {
        Self::new(Method::PUT, route)
    }

    pub fn patch(route: impl Into<String>) -> Self {
        Self::new(Method::PATCH, route)
    }

    pub fn delete(route: impl Into<String>) -> Self {
        Self::new(Method::DELETE, route)
    }

    /// Append a terminal handler to the chain. The handler produces the
    /// response and never forwards.
    pub fn respond<F, Fut, R>(mut self, f: F) -> Self
    where
        F: Fn(Arc<RecordedRequest>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.chain.push(chain::handler(f));
        self
    }

    /// Append a middleware step to the chain. The step chooses between
    /// forwarding via [`Next::run`] and responding itself.
    pub fn step<F, Fut, R>(mut self, f: F) -> Self
    where
        F: Fn(Arc<RecordedRequest>, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.chain.push(chain::step(f));
        self
    }

    /// Append a prebuilt step, e.g. one of the [`crate::parsers`].
    pub fn with(mut self, step: Step) -> Self {
        self.chain.push(step);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub(crate) fn chain(&self) -> &[Step] {
        &self.chain
    }

    pub(crate) fn method_filter(&self) -> Result<MethodFilter, SpyServerError> {
        MethodFilter::try_from(self.method.clone()).map_err(|_| {
            SpyServerError::invalid(
                &self.route,
                format!("method {} cannot be routed", self.method),
            )
        })
    }

    /// Check the definition has everything a route needs.
    pub(crate) fn validate(&self, name: &str) -> Result<(), SpyServerError> {
        if name.is_empty() {
            return Err(SpyServerError::invalid(name, "fixture name is empty"));
        }
        if self.route.is_empty() || !self.route.starts_with('/') {
            return Err(SpyServerError::invalid(
                name,
                format!("route \"{}\" must start with '/'", self.route),
            ));
        }
        if self.chain.is_empty() {
            return Err(SpyServerError::invalid(name, "handler chain is empty"));
        }
        self.method_filter().map(|_| ())
    }
}

impl std::fmt::Debug for Fixture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fixture")
            .field("method", &self.method)
            .field("route", &self.route)
            .field("chain_len", &self.chain.len())
            .finish()
    }
}

/// Upcast for the fixture-name argument of `create_server`/`run`: a bare
/// name is treated as a one-element list, and any common list shape is
/// accepted directly.
pub trait FixtureNames {
    fn into_names(self) -> Vec<String>;
}

impl FixtureNames for &str {
    fn into_names(self) -> Vec<String> {
        vec![self.to_owned()]
    }
}

impl FixtureNames for String {
    fn into_names(self) -> Vec<String> {
        vec![self]
    }
}

impl FixtureNames for &[&str] {
    fn into_names(self) -> Vec<String> {
        self.iter().map(|s| (*s).to_owned()).collect()
    }
}

impl<const N: usize> FixtureNames for [&str; N] {
    fn into_names(self) -> Vec<String> {
        self.iter().map(|s| (*s).to_owned()).collect()
    }
}

impl FixtureNames for Vec<&str> {
    fn into_names(self) -> Vec<String> {
        self.into_iter().map(str::to_owned).collect()
    }
}

impl FixtureNames for Vec<String> {
    fn into_names(self) -> Vec<String> {
        self
    }
}
