use std::collections::HashMap;
use std::sync::Mutex;

use axum::body::to_bytes;
use axum::extract::Request;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde_json::Value;

/// Largest request body the server will buffer before answering 413.
const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// An in-flight request as seen by the handler chain and recorded by a spy.
///
/// Captured once when the dispatcher hands the request to a fixture's chain:
/// method, URI, headers, parsed query, and the raw body bytes. The parsed
/// `body` slot starts empty and is filled in by body-parsing steps that run
/// later in the chain.
///
/// Spies store `Arc<RecordedRequest>` handles, so the value a test reads back
/// is the *same* object later middleware populated — a request recorded before
/// a body parser ran still shows the parsed body once the chain has completed.
pub struct RecordedRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    query: HashMap<String, String>,
    raw_body: Bytes,
    body: Mutex<Option<Value>>,
}

impl RecordedRequest {
    /// Drain an inbound request into a recordable form.
    ///
    /// Returns an error response directly (413) when the body exceeds the
    /// buffer limit. Rejection happens before the chain runs, so an
    /// oversized request is never recorded or counted — the one case where
    /// a request that reached a fixture's route leaves no trace in its spy.
    pub(crate) async fn capture(req: Request) -> Result<Self, Response> {
        let (parts, body) = req.into_parts();

        let query = parts.uri.query().map(parse_query).unwrap_or_default();

        let raw_body = to_bytes(body, BODY_LIMIT)
            .await
            .map_err(|_| StatusCode::PAYLOAD_TOO_LARGE.into_response())?;

        Ok(Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            query,
            raw_body,
            body: Mutex::new(None),
        })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A header value as UTF-8, or `None` if absent or not valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The parsed query string. Duplicate keys keep the last value.
    pub fn query(&self) -> &HashMap<String, String> {
        &self.query
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// The body exactly as received, before any parsing step ran.
    pub fn raw_body(&self) -> &Bytes {
        &self.raw_body
    }

    /// The parsed body, if a parsing step in the chain has produced one.
    pub fn body(&self) -> Option<Value> {
        self.body.lock().unwrap().clone()
    }

    /// The parsed body deserialized into a concrete type.
    pub fn body_as<T: serde::de::DeserializeOwned>(&self) -> Option<T> {
        self.body().and_then(|v| serde_json::from_value(v).ok())
    }

    /// Store the parsed body. Called by body-parsing steps; when parsers are
    /// stacked, later ones overwrite earlier ones.
    pub fn set_body(&self, value: Value) {
        *self.body.lock().unwrap() = Some(value);
    }
}

/// Decode a query string pair by pair so one odd pair cannot wipe the whole
/// map. Duplicate keys keep the last value; pairs that do not decode to a
/// flat key/value (e.g. nested bracket syntax) are skipped with a warning
/// rather than silently dropping everything else.
fn parse_query(raw: &str) -> HashMap<String, String> {
    let mut query = HashMap::new();
    for pair in raw.split('&').filter(|p| !p.is_empty()) {
        match serde_qs::from_str::<HashMap<String, String>>(pair) {
            Ok(parsed) => query.extend(parsed),
            Err(error) => tracing::warn!(%error, pair, "skipping undecodable query pair"),
        }
    }
    query
}

impl std::fmt::Debug for RecordedRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordedRequest")
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("query", &self.query)
            .field("body", &self.body())
            .finish_non_exhaustive()
    }
}
