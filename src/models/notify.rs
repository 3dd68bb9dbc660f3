//! Status events broadcast on the event channel.

use bytes::Bytes;

use super::exchange::RequestDescriptor;

/// A notable non-2xx exchange, broadcast to status-event subscribers.
///
/// Only the statuses below produce an event; every other status is visible on
/// the log channel alone. 401 and 403 carry distinct variants here even
/// though both surface as the same `Unauthorized` error to the caller.
#[derive(Debug, Clone)]
pub enum StatusEvent {
    /// 401: the request lacked valid credentials.
    Unauthorized {
        /// Originating request.
        descriptor: RequestDescriptor,
        /// Response body.
        body: Bytes,
    },
    /// 403: the credentials were refused.
    Forbidden {
        /// Originating request.
        descriptor: RequestDescriptor,
        /// Response body.
        body: Bytes,
    },
    /// 429: the server asked us to back off.
    RateLimited {
        /// Suggested delay from the `Retry-After` header, if one was usable.
        retry_after_secs: Option<f64>,
        /// Originating request.
        descriptor: RequestDescriptor,
        /// Response body.
        body: Bytes,
    },
    /// 503: the service is temporarily down.
    ServiceUnavailable {
        /// Originating request.
        descriptor: RequestDescriptor,
        /// Response body.
        body: Bytes,
    },
    /// Any other 5xx.
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Originating request.
        descriptor: RequestDescriptor,
        /// Response body.
        body: Bytes,
    },
}

impl StatusEvent {
    /// The request this event belongs to.
    pub fn descriptor(&self) -> &RequestDescriptor {
        match self {
            StatusEvent::Unauthorized { descriptor, .. }
            | StatusEvent::Forbidden { descriptor, .. }
            | StatusEvent::RateLimited { descriptor, .. }
            | StatusEvent::ServiceUnavailable { descriptor, .. }
            | StatusEvent::ServerError { descriptor, .. } => descriptor,
        }
    }
}
