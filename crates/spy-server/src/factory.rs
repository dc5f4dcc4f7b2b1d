use std::collections::HashMap;

use crate::config::ServerOptions;
use crate::error::SpyServerError;
use crate::fixture::{Fixture, FixtureNames};
use crate::server::{RunningSpyServer, SpyServer};

/// Owns the fixture registry and produces spy servers from it.
///
/// Fixtures are registered once, up front; every server the factory produces
/// selects some of them by name, wraps each with a recording step, and gets
/// its own independent spies. Listener options are fixed at construction and
/// apply to every produced server.
///
/// # Example
/// ```no_run
/// use spy_server::{Fixture, SpyServerFactory};
///
/// # #[tokio::main] async fn main() -> Result<(), spy_server::SpyServerError> {
/// let mut factory = SpyServerFactory::default();
/// factory.add_fixture(
///     "hello-world",
///     Fixture::get("/hello").respond(|_req| async { "world" }),
/// )?;
///
/// let server = factory.run("hello-world").await?;
/// // ... issue requests against server.url("/hello?foo=bar") ...
/// let spy = server.fixture_spy("hello-world")?;
/// assert_eq!(spy.call_count(), 0);
/// # Ok(()) }
/// ```
#[derive(Default)]
pub struct SpyServerFactory {
    options: ServerOptions,
    fixtures: HashMap<String, Fixture>,
}

impl SpyServerFactory {
    pub fn new(options: ServerOptions) -> Self {
        Self {
            options,
            fixtures: HashMap::new(),
        }
    }

    /// Register a fixture under `name`.
    ///
    /// The definition is validated here so a broken fixture fails at setup,
    /// not on first request. Duplicate names are rejected rather than
    /// silently overwritten.
    pub fn add_fixture(&mut self, name: &str, fixture: Fixture) -> Result<(), SpyServerError> {
        fixture.validate(name)?;
        if self.fixtures.contains_key(name) {
            return Err(SpyServerError::DuplicateFixture(name.to_owned()));
        }
        self.fixtures.insert(name.to_owned(), fixture);
        Ok(())
    }

    /// Look up a registered fixture.
    pub fn fixture(&self, name: &str) -> Result<&Fixture, SpyServerError> {
        self.fixtures
            .get(name)
            .ok_or_else(|| SpyServerError::FixtureNotFound(name.to_owned()))
    }

    /// Construct a server with the named fixtures installed, without binding
    /// a socket. Accepts a bare name or any list of names; zero names yields
    /// a server that matches nothing.
    pub fn create_server<N: FixtureNames>(&self, names: N) -> Result<SpyServer, SpyServerError> {
        let mut server = SpyServer::new(self.options.clone());
        for name in names.into_names() {
            let fixture = self.fixture(&name)?;
            server.install_fixture(&name, fixture)?;
        }
        Ok(server)
    }

    /// [`create_server`](Self::create_server), then bind and listen.
    pub async fn run<N: FixtureNames>(&self, names: N) -> Result<RunningSpyServer, SpyServerError> {
        self.create_server(names)?.start().await
    }
}
