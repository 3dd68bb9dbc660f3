//! HTTP exchange primitives.
//!
//! One method per exchange shape: [`HttpExchanger::perform`] runs a plain
//! request/response round trip, [`HttpExchanger::open_stream`] opens a
//! long-lived SSE connection. Neither retries; retry policy belongs to the
//! caller.

use reqwest::header::HeaderMap;
use tracing::debug;

use crate::config::{CONNECT_TIMEOUT, REQUEST_TIMEOUT};
use crate::error::{Error, Result};
use crate::models::{ExchangeOutcome, RequestDescriptor};
use crate::transport::headers;

/// HTTP client for plain and streaming exchanges.
pub struct HttpExchanger {
    client: reqwest::Client,
    stream_client: reqwest::Client,
    default_headers: HeaderMap,
}

impl HttpExchanger {
    /// Create an exchanger with the library's default clients.
    ///
    /// The plain client carries a request timeout; the streaming client only
    /// a connect timeout, because SSE connections are long-lived by design.
    pub fn new(default_headers: HeaderMap) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(Error::Network)?;

        let stream_client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(Error::Network)?;

        Ok(Self {
            client,
            stream_client,
            default_headers,
        })
    }

    /// Create with a custom reqwest client, used for both exchange shapes.
    ///
    /// The caller owns the timeout configuration in this case.
    pub fn with_client(client: reqwest::Client, default_headers: HeaderMap) -> Self {
        Self {
            stream_client: client.clone(),
            client,
            default_headers,
        }
    }

    /// Perform one plain HTTP exchange.
    ///
    /// Returns the decomposed response regardless of status; classification
    /// of non-2xx statuses happens downstream.
    pub async fn perform(&self, descriptor: RequestDescriptor) -> Result<ExchangeOutcome> {
        debug!(%descriptor, "performing exchange");

        let request = self.build_request(&self.client, &descriptor)?;
        let response = request.send().await.map_err(map_send_error)?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(map_send_error)?;

        Ok(ExchangeOutcome {
            descriptor,
            status,
            headers,
            body,
        })
    }

    /// Open a streaming exchange with `Accept: text/event-stream`.
    ///
    /// Returns the live response; the caller checks the status and streams
    /// the body.
    pub async fn open_stream(&self, descriptor: &RequestDescriptor) -> Result<reqwest::Response> {
        debug!(%descriptor, "opening event stream");

        let request = self
            .build_request(&self.stream_client, descriptor)?
            .headers(headers::event_stream_headers());
        request.send().await.map_err(map_send_error)
    }

    fn build_request(
        &self,
        client: &reqwest::Client,
        descriptor: &RequestDescriptor,
    ) -> Result<reqwest::RequestBuilder> {
        let url = reqwest::Url::parse(&descriptor.url)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", descriptor.url, e)))?;

        let mut request = client
            .request(descriptor.method.clone(), url)
            .headers(self.default_headers.clone());

        for (name, value) in &descriptor.headers {
            request = request.header(name, value);
        }
        if let Some(body) = &descriptor.body {
            request = request.json(body);
        }

        Ok(request)
    }
}

impl std::fmt::Debug for HttpExchanger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpExchanger")
            .field("default_headers", &self.default_headers)
            .finish()
    }
}

fn map_send_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout
    } else {
        Error::Network(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_url_is_rejected_before_send() {
        let exchanger = HttpExchanger::new(HeaderMap::new()).unwrap();
        let descriptor = RequestDescriptor::get("::not-a-url::");
        let result = exchanger.build_request(&exchanger.client, &descriptor);
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }
}
