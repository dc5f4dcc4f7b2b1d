/// Errors surfaced to test code by the factory and server.
///
/// Every variant indicates a test-authoring mistake or an environment
/// failure; nothing here is retried or silently defaulted.
#[derive(Debug, thiserror::Error)]
pub enum SpyServerError {
    /// `run`/`create_server` referenced a fixture name that was never
    /// registered with `add_fixture`.
    #[error("fixture \"{0}\" could not be found; register it with `add_fixture` first")]
    FixtureNotFound(String),

    /// `fixture_spy` referenced a fixture that was not installed on this
    /// server instance. Usually a typo, or the fixture was left out of the
    /// `create_server`/`run` call.
    #[error(
        "no spy for fixture \"{0}\"; verify the fixture was included in `create_server`/`run`"
    )]
    SpyNotFound(String),

    /// The fixture name is already taken in this registry or on this server
    /// instance.
    #[error("fixture \"{0}\" is already registered")]
    DuplicateFixture(String),

    /// The fixture definition is missing a required part or cannot be routed.
    #[error("invalid fixture \"{name}\": {reason}")]
    InvalidFixture { name: String, reason: String },

    /// Binding the listener socket failed.
    #[error("failed to bind spy server listener")]
    Bind(#[from] std::io::Error),
}

impl SpyServerError {
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidFixture {
            name: name.to_owned(),
            reason: reason.into(),
        }
    }
}
