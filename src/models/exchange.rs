//! Request descriptors and completed-exchange outcomes.

use std::fmt;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::Method;

/// Describes one HTTP exchange to perform.
///
/// Carried through the log and status-event channels so subscribers can tell
/// which request an entry belongs to.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// HTTP method.
    pub method: Method,
    /// Absolute request URL.
    pub url: String,
    /// Extra headers for this request, applied on top of the client defaults.
    pub headers: Vec<(String, String)>,
    /// JSON request body, if any.
    pub body: Option<serde_json::Value>,
}

impl RequestDescriptor {
    /// Create a descriptor with no extra headers and no body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// GET descriptor for the given URL.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// POST descriptor with a JSON body.
    pub fn post(url: impl Into<String>, body: serde_json::Value) -> Self {
        let mut descriptor = Self::new(Method::POST, url);
        descriptor.body = Some(body);
        descriptor
    }

    /// Add an extra header to this request.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

impl fmt::Display for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// One completed HTTP exchange.
///
/// Produced once per exchange and consumed exactly once by the classifier.
#[derive(Debug)]
pub struct ExchangeOutcome {
    /// The request that produced this exchange.
    pub descriptor: RequestDescriptor,
    /// HTTP status code.
    pub status: u16,
    /// Response headers as received.
    pub headers: HeaderMap,
    /// Response body as received.
    pub body: Bytes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_display() {
        let descriptor = RequestDescriptor::get("https://api.example.com/v1/events");
        assert_eq!(
            descriptor.to_string(),
            "GET https://api.example.com/v1/events"
        );
    }

    #[test]
    fn test_post_carries_body() {
        let descriptor =
            RequestDescriptor::post("https://api.example.com/v1/jobs", serde_json::json!({"a": 1}));
        assert_eq!(descriptor.method, Method::POST);
        assert!(descriptor.body.is_some());
    }

    #[test]
    fn test_extra_headers_accumulate() {
        let descriptor = RequestDescriptor::get("https://api.example.com")
            .header("x-request-id", "abc")
            .header("x-trace", "1");
        assert_eq!(descriptor.headers.len(), 2);
    }
}
