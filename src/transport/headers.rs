//! Default header construction.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};

use crate::config;

/// Standard headers for plain JSON exchanges.
pub fn base_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();

    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );

    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(config::USER_AGENT)
            .unwrap_or_else(|_| HeaderValue::from_static("pulse-gateway")),
    );

    headers
}

/// Additional headers for streaming requests: ask the server for an SSE body.
pub fn event_stream_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();

    headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));

    headers
}
