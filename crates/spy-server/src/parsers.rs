//! Body-parsing chain steps.
//!
//! The recording layer treats these as opaque steps that happen to run after
//! the recording step; they decode the buffered body onto the shared request
//! so handlers — and spies queried after the response — can read it.

use std::collections::HashMap;

use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::chain::{self, Step};

/// Parse an `application/x-www-form-urlencoded` body onto the request.
///
/// Malformed input answers 400 without running the rest of the chain.
pub fn urlencoded() -> Step {
    chain::step(|req, next| async move {
        let parsed = std::str::from_utf8(req.raw_body())
            .ok()
            .and_then(|raw| serde_qs::from_str::<HashMap<String, String>>(raw).ok())
            .and_then(|map| serde_json::to_value(map).ok());
        match parsed {
            Some(value) => {
                req.set_body(value);
                next.run(req).await
            }
            None => (StatusCode::BAD_REQUEST, "malformed urlencoded body").into_response(),
        }
    })
}

/// Parse a JSON body onto the request.
///
/// Malformed input answers 400 without running the rest of the chain.
pub fn json() -> Step {
    chain::step(|req, next| async move {
        match serde_json::from_slice(req.raw_body()) {
            Ok(value) => {
                req.set_body(value);
                next.run(req).await
            }
            Err(_) => (StatusCode::BAD_REQUEST, "malformed JSON body").into_response(),
        }
    })
}
