use spy_server::{Fixture, SpyServerFactory, parsers};

/// A factory with the two fixtures the scenarios share: a GET echo route and
/// a POST route with a urlencoded body parser ahead of its handler.
pub fn test_factory() -> SpyServerFactory {
    spy_server::tracing::init_tracing();

    let mut factory = SpyServerFactory::default();
    factory
        .add_fixture(
            "hello-world",
            Fixture::get("/hello").respond(|_req| async { "world" }),
        )
        .unwrap();
    factory
        .add_fixture(
            "goodbye-moon",
            Fixture::post("/goodbye")
                .with(parsers::urlencoded())
                .respond(|_req| async { "moon" }),
        )
        .unwrap();
    factory
}
