//! Fixture-based HTTP test server that spies on every request it receives.
//!
//! Declare named route fixtures up front, run a server with a chosen set of
//! them, and assert afterwards on what each fixture actually received —
//! query, headers, body, and call count — not just on the responses.
//!
//! Every installed fixture gets a recording step prepended to its handler
//! chain and a dedicated [`Spy`]. The spy stores live handles to the in-flight
//! requests, so fields populated by later chain steps (e.g. a body parser)
//! are visible when the test inspects the spy after the response completes.
//!
//! # Getting started
//!
//! ```no_run
//! use spy_server::{Fixture, SpyServerFactory};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut factory = SpyServerFactory::default();
//! factory.add_fixture(
//!     "hello-world",
//!     Fixture::get("/hello").respond(|_req| async { "world" }),
//! )?;
//!
//! let server = factory.run("hello-world").await?;
//! let body = reqwest::get(server.url("/hello?foo=bar")).await?.text().await?;
//! assert_eq!(body, "world");
//!
//! let spy = server.fixture_spy("hello-world")?;
//! assert_eq!(spy.call_count(), 1);
//! assert_eq!(spy.last_request().unwrap().query_param("foo"), Some("bar"));
//! # Ok(()) }
//! ```
//!
//! # Inspecting a POST body
//!
//! Compose a parser step ahead of the handler; the spy sees the parsed body
//! because it holds the same request object the parser populated:
//!
//! ```no_run
//! use spy_server::{Fixture, SpyServerFactory, parsers};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut factory = SpyServerFactory::default();
//! factory.add_fixture(
//!     "hello-world",
//!     Fixture::post("/hello")
//!         .with(parsers::urlencoded())
//!         .respond(|_req| async { "world" }),
//! )?;
//!
//! let server = factory.run("hello-world").await?;
//! reqwest::Client::new()
//!     .post(server.url("/hello"))
//!     .form(&[("foo", "bar")])
//!     .send()
//!     .await?;
//!
//! let spy = server.fixture_spy("hello-world")?;
//! assert_eq!(
//!     spy.last_request().unwrap().body(),
//!     Some(serde_json::json!({"foo": "bar"})),
//! );
//! # Ok(()) }
//! ```

pub mod chain;
pub mod config;
pub mod error;
pub mod factory;
pub mod fixture;
pub mod parsers;
mod record;
pub mod request;
pub mod server;
pub mod spy;
pub mod tracing;

pub use chain::{Next, Step};
pub use config::ServerOptions;
pub use error::SpyServerError;
pub use factory::SpyServerFactory;
pub use fixture::{Fixture, FixtureNames};
pub use request::RecordedRequest;
pub use server::{RunningSpyServer, SpyServer};
pub use spy::Spy;
