//! Broadcast point wiring exchange results onto the two outbound channels.

use bytes::Bytes;
use tracing::{debug, warn};

use crate::broadcast::{Broadcaster, Subscription};
use crate::classify::{classify, Classification};
use crate::error::Result;
use crate::models::{ExchangeOutcome, LogEntry, RequestDescriptor, StatusEvent};

/// Fan-out point for exchange observability.
///
/// Every completed exchange produces one [`LogEntry`]; notable statuses
/// additionally produce a [`StatusEvent`]. Subscribers on either channel are
/// independent; none of them can slow an exchange down.
#[derive(Debug, Default)]
pub struct ExchangeMonitor {
    logs: Broadcaster<LogEntry>,
    events: Broadcaster<StatusEvent>,
}

impl ExchangeMonitor {
    /// Create a monitor with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a completed exchange, broadcast the results, and return the
    /// caller-facing outcome.
    pub fn record(&self, exchange: ExchangeOutcome) -> Result<Bytes> {
        let Classification { log, event, outcome } = classify(exchange);

        match &log {
            LogEntry::Success { descriptor, status, .. } => {
                debug!(%descriptor, status, "exchange succeeded");
            }
            LogEntry::HttpError { descriptor, status, .. } => {
                warn!(%descriptor, status, "exchange rejected");
            }
            LogEntry::DecodingError { .. } => {}
        }

        self.logs.publish(log);
        if let Some(event) = event {
            self.events.publish(event);
        }

        outcome
    }

    /// Broadcast a decode failure for a payload that arrived on an otherwise
    /// successful exchange.
    pub fn record_decode_failure(
        &self,
        descriptor: RequestDescriptor,
        error: &serde_json::Error,
        body: Bytes,
        target_type: &'static str,
    ) {
        warn!(%descriptor, target_type, %error, "payload decode failed");
        self.logs.publish(LogEntry::DecodingError {
            descriptor,
            error: error.to_string(),
            body,
            target_type,
        });
    }

    /// Subscribe to the log channel.
    pub fn subscribe_logs(&self) -> Subscription<LogEntry> {
        self.logs.subscribe()
    }

    /// Subscribe to the status-event channel.
    pub fn subscribe_events(&self) -> Subscription<StatusEvent> {
        self.events.subscribe()
    }
}
