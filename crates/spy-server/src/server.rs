use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::Request;
use axum::http::Method;
use axum::routing;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::chain::{Step, run_chain};
use crate::config::ServerOptions;
use crate::error::SpyServerError;
use crate::fixture::Fixture;
use crate::record::instrument;
use crate::spy::Spy;

/// A spy server under construction: an axum router being assembled plus one
/// [`Spy`] per installed fixture.
///
/// The server *has* a dispatcher (the router) rather than being one; route
/// matching, chain invocation, and listening are all delegated to axum.
/// Obtain instances from [`crate::SpyServerFactory::create_server`], then
/// [`start`](Self::start) to bind and serve.
pub struct SpyServer {
    options: ServerOptions,
    router: Router,
    routes: HashSet<(Method, String)>,
    spies: HashMap<String, Spy>,
}

impl SpyServer {
    pub(crate) fn new(options: ServerOptions) -> Self {
        Self {
            options,
            router: Router::new(),
            routes: HashSet::new(),
            spies: HashMap::new(),
        }
    }

    /// Install a fixture under `name`: create its spy, wrap its chain with
    /// the recording step, and register the wrapped chain on the router.
    ///
    /// Installing a name twice, or two fixtures claiming the same method and
    /// route, is rejected — both would otherwise silently mask a test-setup
    /// mistake (and axum forbids overlapping method routes).
    pub fn install_fixture(&mut self, name: &str, fixture: &Fixture) -> Result<(), SpyServerError> {
        fixture.validate(name)?;
        if self.spies.contains_key(name) {
            return Err(SpyServerError::DuplicateFixture(name.to_owned()));
        }
        let route_key = (fixture.method().clone(), fixture.route().to_owned());
        if self.routes.contains(&route_key) {
            return Err(SpyServerError::invalid(
                name,
                format!(
                    "{} {} is already registered on this server",
                    fixture.method(),
                    fixture.route()
                ),
            ));
        }

        let filter = fixture.method_filter()?;
        let (spy, wrapped) = instrument(fixture);
        let steps: Arc<[Step]> = wrapped.into();

        let handler = move |req: Request| run_chain(Arc::clone(&steps), req);
        self.router = std::mem::take(&mut self.router)
            .route(fixture.route(), routing::on(filter, handler));
        self.routes.insert(route_key);
        self.spies.insert(name.to_owned(), spy);
        Ok(())
    }

    /// The spy recording requests for `name` on this instance.
    pub fn fixture_spy(&self, name: &str) -> Result<Spy, SpyServerError> {
        self.spies
            .get(name)
            .cloned()
            .ok_or_else(|| SpyServerError::SpyNotFound(name.to_owned()))
    }

    /// The assembled router, for driving the server in-process without a
    /// socket (e.g. `tower::ServiceExt::oneshot` in tests).
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Bind the listener and serve on a background task.
    pub async fn start(self) -> Result<RunningSpyServer, SpyServerError> {
        let listener = TcpListener::bind(self.options.bind_addr()).await?;
        let local_addr = listener.local_addr()?;

        let router = self.router.layer(TraceLayer::new_for_http());
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let shutdown = async {
                let _ = shutdown_rx.await;
            };
            if let Err(error) = axum::serve(listener, router)
                .with_graceful_shutdown(shutdown)
                .await
            {
                tracing::error!(%error, "spy server terminated with error");
            }
        });

        info!(%local_addr, "spy server listening");
        Ok(RunningSpyServer {
            local_addr,
            spies: self.spies,
            shutdown: Some(shutdown_tx),
            task,
        })
    }
}

impl std::fmt::Debug for SpyServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpyServer")
            .field("options", &self.options)
            .field("routes", &self.routes)
            .field("spies", &self.spies)
            .finish_non_exhaustive()
    }
}

/// A bound, listening spy server. Answers spy lookups while the serve task
/// runs in the background; shuts down gracefully on [`shutdown`](Self::shutdown)
/// or drop.
pub struct RunningSpyServer {
    local_addr: SocketAddr,
    spies: HashMap<String, Spy>,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl RunningSpyServer {
    /// The spy recording requests for `name` on this instance.
    pub fn fixture_spy(&self, name: &str) -> Result<Spy, SpyServerError> {
        self.spies
            .get(name)
            .cloned()
            .ok_or_else(|| SpyServerError::SpyNotFound(name.to_owned()))
    }

    /// The address the listener actually bound, including the resolved port
    /// when an ephemeral one was requested.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Absolute URL for a path on this server.
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.local_addr, path_and_query)
    }

    /// Stop accepting connections and wait for the serve task to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = (&mut self.task).await;
    }
}

impl Drop for RunningSpyServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}
