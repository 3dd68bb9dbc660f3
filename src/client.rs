//! Main client entry point.

use std::pin::Pin;
use std::sync::Arc;

use async_stream::try_stream;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::broadcast::Subscription;
use crate::config;
use crate::error::{Error, Result};
use crate::models::{ExchangeOutcome, LogEntry, RequestDescriptor, StatusEvent};
use crate::monitor::ExchangeMonitor;
use crate::transport::headers;
use crate::transport::http::HttpExchanger;
use crate::transport::sse::frame_stream;

/// Typed event stream returned by [`PulseClient::stream_events`].
pub type EventStream<T> = Pin<Box<dyn Stream<Item = Result<T>> + Send>>;

/// Client for a streaming HTTP API.
///
/// Every exchange is classified and broadcast on two channels: a log channel
/// carrying one entry per exchange, and a status-event channel carrying
/// events for notable statuses (auth failures, rate limits, server errors).
/// Subscribers on either channel are independent and never slow a caller
/// down.
///
/// # Examples
///
/// ```rust,no_run
/// use pulse_gateway::PulseClient;
///
/// # async fn example() -> pulse_gateway::Result<()> {
/// let client = PulseClient::builder()
///     .base_url("https://api.example.com/v1")
///     .bearer_token("secret")
///     .build()?;
///
/// let body = client.send(client.get("/jobs")?).await?;
/// println!("{}", String::from_utf8_lossy(&body));
/// # Ok(())
/// # }
/// ```
pub struct PulseClient {
    http: Arc<HttpExchanger>,
    monitor: Arc<ExchangeMonitor>,
    base_url: String,
}

impl PulseClient {
    /// Create a builder for configuring the client.
    pub fn builder() -> PulseClientBuilder {
        PulseClientBuilder::new()
    }

    /// GET descriptor for a path under the client's base URL.
    pub fn get(&self, path: &str) -> Result<RequestDescriptor> {
        Ok(RequestDescriptor::get(config::endpoint_url(
            &self.base_url,
            path,
        )?))
    }

    /// POST descriptor with a JSON body for a path under the base URL.
    pub fn post(&self, path: &str, body: serde_json::Value) -> Result<RequestDescriptor> {
        Ok(RequestDescriptor::post(
            config::endpoint_url(&self.base_url, path)?,
            body,
        ))
    }

    /// Perform one exchange, broadcast its classification, and return the
    /// body on success.
    ///
    /// The error kind follows the classifier's dispatch table: 401/403 become
    /// [`Error::Unauthorized`], every other non-2xx becomes [`Error::Http`].
    pub async fn send(&self, descriptor: RequestDescriptor) -> Result<Bytes> {
        let exchange = self.http.perform(descriptor).await?;
        self.monitor.record(exchange)
    }

    /// [`send`](Self::send), then decode the body as JSON into `T`.
    ///
    /// A decode failure is broadcast as a [`LogEntry::DecodingError`] in
    /// addition to surfacing as [`Error::Decoding`].
    pub async fn send_as<T: DeserializeOwned>(&self, descriptor: RequestDescriptor) -> Result<T> {
        let descriptor_for_log = descriptor.clone();
        let body = self.send(descriptor).await?;

        match serde_json::from_slice(&body) {
            Ok(value) => Ok(value),
            Err(err) => {
                self.monitor.record_decode_failure(
                    descriptor_for_log,
                    &err,
                    body,
                    std::any::type_name::<T>(),
                );
                Err(Error::Decoding(err))
            }
        }
    }

    /// Open an SSE exchange and decode each frame's payload into `T`.
    ///
    /// A non-2xx initial status is classified and broadcast like any other
    /// exchange, then terminates the call with the classified error before
    /// any frames are parsed. Once the stream is up, frames whose payload
    /// fails to decode are logged, broadcast as decoding errors, and skipped;
    /// one bad frame does not kill a long-lived stream. Transport failures do
    /// terminate it.
    pub async fn stream_events<T>(&self, descriptor: RequestDescriptor) -> Result<EventStream<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let response = self.http.open_stream(&descriptor).await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let headers = response.headers().clone();
            let body = response.bytes().await.unwrap_or_default();
            let recorded = self.monitor.record(ExchangeOutcome {
                descriptor,
                status,
                headers,
                body,
            });
            // Non-success statuses always classify to an error.
            return Err(recorded.err().unwrap_or_else(|| {
                Error::InvalidResponse(format!("status {} classified as success", status))
            }));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        if !content_type.is_empty() && !content_type.starts_with("text/event-stream") {
            return Err(Error::InvalidResponse(format!(
                "expected text/event-stream, got {}",
                content_type
            )));
        }

        let monitor = Arc::clone(&self.monitor);
        let stream = try_stream! {
            let frames = frame_stream(response);
            futures::pin_mut!(frames);

            while let Some(frame) = frames.next().await {
                let frame = frame?;
                let data = match frame.data {
                    Some(data) => data,
                    None => continue,
                };

                match serde_json::from_str::<T>(&data) {
                    Ok(event) => yield event,
                    Err(err) => {
                        warn!(%descriptor, error = %err, "skipping undecodable frame");
                        monitor.record_decode_failure(
                            descriptor.clone(),
                            &err,
                            Bytes::from(data),
                            std::any::type_name::<T>(),
                        );
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }

    /// Subscribe to the log channel. Each call returns an independent
    /// sequence; entries published before the call are not replayed.
    pub fn logs(&self) -> Subscription<LogEntry> {
        self.monitor.subscribe_logs()
    }

    /// Subscribe to the status-event channel.
    pub fn status_events(&self) -> Subscription<StatusEvent> {
        self.monitor.subscribe_events()
    }

    /// Get a reference to the exchange monitor.
    pub fn monitor(&self) -> &ExchangeMonitor {
        &self.monitor
    }
}

impl std::fmt::Debug for PulseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PulseClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Builder for [`PulseClient`].
pub struct PulseClientBuilder {
    base_url: Option<String>,
    headers: Vec<(String, String)>,
    bearer_token: Option<String>,
    reqwest_client: Option<reqwest::Client>,
}

impl PulseClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            base_url: None,
            headers: Vec::new(),
            bearer_token: None,
            reqwest_client: None,
        }
    }

    /// Set the base URL every path-based descriptor is resolved against.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Add a header sent on every request.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Authenticate every request with a bearer token.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Set a custom reqwest client.
    pub fn reqwest_client(mut self, client: reqwest::Client) -> Self {
        self.reqwest_client = Some(client);
        self
    }

    /// Build the client, validating the base URL and header values.
    pub fn build(self) -> Result<PulseClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".into()))?;
        reqwest::Url::parse(&base_url)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let mut default_headers = headers::base_headers();
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::Config(format!("invalid header name {:?}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::Config(format!("invalid value for header {}: {}", name, e)))?;
            default_headers.insert(name, value);
        }
        if let Some(token) = &self.bearer_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| Error::Config(format!("invalid bearer token: {}", e)))?;
            default_headers.insert(AUTHORIZATION, value);
        }

        let http = match self.reqwest_client {
            Some(client) => HttpExchanger::with_client(client, default_headers),
            None => HttpExchanger::new(default_headers)?,
        };

        info!(base_url = base_url.as_str(), "PulseClient initialized");
        Ok(PulseClient {
            http: Arc::new(http),
            monitor: Arc::new(ExchangeMonitor::new()),
            base_url,
        })
    }
}

impl Default for PulseClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
