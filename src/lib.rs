//! # pulse-gateway
//!
//! Streaming HTTP client library with typed Server-Sent-Events decoding and
//! broadcast observability.
//!
//! Two things live here that are more than plumbing: an incremental parser
//! for the SSE wire protocol as spoken over a long-lived HTTP response body,
//! and a multicast broadcaster that fans every exchange's log entry and
//! status event out to independent subscribers without coordination between
//! them.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use pulse_gateway::{PulseClient, Result};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct Progress {
//!     p: f64,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = PulseClient::builder()
//!         .base_url("https://api.example.com/v1")
//!         .bearer_token("secret")
//!         .build()?;
//!
//!     // Watch every exchange from an independent task.
//!     let mut logs = client.logs();
//!     tokio::spawn(async move {
//!         while let Some(entry) = logs.recv().await {
//!             eprintln!("{:?}", entry);
//!         }
//!     });
//!
//!     // Stream typed events over SSE.
//!     let mut events = client
//!         .stream_events::<Progress>(client.get("/progress")?)
//!         .await?;
//!     while let Some(event) = events.next().await {
//!         println!("{:?}", event?);
//!     }
//!     Ok(())
//! }
//! ```

pub mod broadcast;
pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod monitor;
pub mod transport;

// Re-exports for ergonomic usage
pub use broadcast::{Broadcaster, Subscription};
pub use classify::{classify, Classification};
pub use client::{EventStream, PulseClient, PulseClientBuilder};
pub use error::{Error, Result};
pub use models::{ExchangeOutcome, LogEntry, RequestDescriptor, StatusEvent};
pub use monitor::ExchangeMonitor;
pub use transport::sse::{frame_stream, FrameParser, SseFrame};
