use serde_json::json;
use spy_server::SpyServerError;

use crate::helpers::test_factory;

#[tokio::test]
async fn fresh_server_has_spies_with_zero_state() {
    let factory = test_factory();
    let server = factory.run("hello-world").await.unwrap();

    let spy = server.fixture_spy("hello-world").unwrap();
    assert_eq!(spy.call_count(), 0);
    assert!(!spy.called());
    assert!(spy.first_request().is_none());
    assert!(spy.last_request().is_none());
    assert!(spy.requests().is_empty());

    server.shutdown().await;
}

#[tokio::test]
async fn one_request_is_recorded_with_its_query() {
    let factory = test_factory();
    let server = factory.run("hello-world").await.unwrap();

    let response = reqwest::get(server.url("/hello?first=true")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "world");

    let spy = server.fixture_spy("hello-world").unwrap();
    assert_eq!(spy.call_count(), 1);
    assert!(spy.called());

    let first = spy.first_request().unwrap();
    assert_eq!(first.query_param("first"), Some("true"));
    let last = spy.last_request().unwrap();
    assert_eq!(last.query_param("first"), Some("true"));

    let requests = spy.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query_param("first"), Some("true"));

    server.shutdown().await;
}

#[tokio::test]
async fn two_requests_are_recorded_in_arrival_order() {
    let factory = test_factory();
    let server = factory.run("hello-world").await.unwrap();

    reqwest::get(server.url("/hello?first=true")).await.unwrap();
    reqwest::get(server.url("/hello?second=true")).await.unwrap();

    let spy = server.fixture_spy("hello-world").unwrap();
    assert_eq!(spy.call_count(), 2);

    let requests = spy.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].query_param("first"), Some("true"));
    assert_eq!(requests[1].query_param("second"), Some("true"));

    assert_eq!(
        spy.first_request().unwrap().query_param("first"),
        Some("true")
    );
    assert_eq!(
        spy.last_request().unwrap().query_param("second"),
        Some("true")
    );

    server.shutdown().await;
}

#[tokio::test]
async fn repeated_query_keys_are_recorded_last_wins() {
    let factory = test_factory();
    let server = factory.run("hello-world").await.unwrap();

    reqwest::get(server.url("/hello?a=1&a=2&b=3")).await.unwrap();

    let spy = server.fixture_spy("hello-world").unwrap();
    let last = spy.last_request().unwrap();
    assert_eq!(last.query_param("a"), Some("2"));
    assert_eq!(last.query_param("b"), Some("3"));

    server.shutdown().await;
}

#[tokio::test]
async fn call_count_matches_request_list_after_many_requests() {
    let factory = test_factory();
    let server = factory.run("hello-world").await.unwrap();

    for n in 0..5 {
        reqwest::get(server.url(&format!("/hello?n={n}"))).await.unwrap();
    }

    let spy = server.fixture_spy("hello-world").unwrap();
    assert_eq!(spy.call_count(), 5);
    assert_eq!(spy.requests().len(), 5);
    assert_eq!(spy.last_request().unwrap().query_param("n"), Some("4"));

    server.shutdown().await;
}

#[tokio::test]
async fn parsed_body_is_visible_after_the_response_completes() {
    let factory = test_factory();
    let server = factory.run("goodbye-moon").await.unwrap();

    let response = reqwest::Client::new()
        .post(server.url("/goodbye"))
        .form(&[("middlewares", "array")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "moon");

    // The spy recorded the request *before* the body parser ran; it still
    // observes the parsed body because it holds the same request object.
    let spy = server.fixture_spy("goodbye-moon").unwrap();
    assert_eq!(spy.call_count(), 1);
    assert_eq!(
        spy.last_request().unwrap().body(),
        Some(json!({"middlewares": "array"}))
    );

    server.shutdown().await;
}

#[tokio::test]
async fn fixtures_on_one_server_accumulate_disjoint_spies() {
    let factory = test_factory();
    let server = factory.run(["hello-world", "goodbye-moon"]).await.unwrap();

    reqwest::get(server.url("/hello?multiple=get")).await.unwrap();
    reqwest::Client::new()
        .post(server.url("/goodbye"))
        .form(&[("multiple", "post")])
        .send()
        .await
        .unwrap();

    let hello_spy = server.fixture_spy("hello-world").unwrap();
    assert_eq!(hello_spy.call_count(), 1);
    assert_eq!(
        hello_spy.last_request().unwrap().query_param("multiple"),
        Some("get")
    );

    let goodbye_spy = server.fixture_spy("goodbye-moon").unwrap();
    assert_eq!(goodbye_spy.call_count(), 1);
    assert_eq!(
        goodbye_spy.last_request().unwrap().body(),
        Some(json!({"multiple": "post"}))
    );

    server.shutdown().await;
}

#[tokio::test]
async fn request_to_one_fixture_never_touches_another() {
    let factory = test_factory();
    let server = factory.run(["hello-world", "goodbye-moon"]).await.unwrap();

    reqwest::get(server.url("/hello")).await.unwrap();

    assert_eq!(server.fixture_spy("hello-world").unwrap().call_count(), 1);
    assert_eq!(server.fixture_spy("goodbye-moon").unwrap().call_count(), 0);

    server.shutdown().await;
}

#[tokio::test]
async fn unknown_fixture_spy_fails_instead_of_defaulting() {
    let factory = test_factory();
    let server = factory.run("hello-world").await.unwrap();

    let err = server.fixture_spy("nonexistent").unwrap_err();
    assert!(matches!(err, SpyServerError::SpyNotFound(name) if name == "nonexistent"));

    server.shutdown().await;
}

#[tokio::test]
async fn reading_a_spy_twice_returns_equal_snapshots() {
    let factory = test_factory();
    let server = factory.run("hello-world").await.unwrap();

    reqwest::get(server.url("/hello?once=true")).await.unwrap();

    let first_read = server.fixture_spy("hello-world").unwrap();
    let second_read = server.fixture_spy("hello-world").unwrap();
    assert_eq!(first_read.call_count(), second_read.call_count());
    assert_eq!(first_read.requests().len(), second_read.requests().len());
    assert!(std::sync::Arc::ptr_eq(
        &first_read.last_request().unwrap(),
        &second_read.last_request().unwrap()
    ));

    server.shutdown().await;
}

#[tokio::test]
async fn servers_from_one_factory_record_independently() {
    let factory = test_factory();
    let a = factory.run("hello-world").await.unwrap();
    let b = factory.run("hello-world").await.unwrap();

    reqwest::get(a.url("/hello")).await.unwrap();

    assert_eq!(a.fixture_spy("hello-world").unwrap().call_count(), 1);
    assert_eq!(b.fixture_spy("hello-world").unwrap().call_count(), 0);

    a.shutdown().await;
    b.shutdown().await;
}
