//! Maps completed HTTP exchanges to log entries, status events, and caller
//! outcomes.
//!
//! The dispatch table is a fixed contract: first matching row wins, and 401
//! and 403 collapse to one caller-visible error kind while keeping distinct
//! status events.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::header::RETRY_AFTER;

use crate::error::Error;
use crate::models::{ExchangeOutcome, LogEntry, StatusEvent};

/// Everything one exchange produces: a log entry (always), a status event
/// (for notable statuses), and the outcome handed back to the caller.
#[derive(Debug)]
pub struct Classification {
    /// Entry for the log channel.
    pub log: LogEntry,
    /// Event for the status channel, when the status warrants one.
    pub event: Option<StatusEvent>,
    /// What the caller sees: the body on 2xx, a typed error otherwise.
    pub outcome: Result<Bytes, Error>,
}

/// Classify a completed exchange.
///
/// | Status        | Log       | Event                | Outcome             |
/// |---------------|-----------|----------------------|---------------------|
/// | 200–299       | Success   | —                    | Ok(body)            |
/// | 401           | HttpError | Unauthorized         | Err(Unauthorized)   |
/// | 403           | HttpError | Forbidden            | Err(Unauthorized)   |
/// | 429           | HttpError | RateLimited          | Err(Http)           |
/// | 503           | HttpError | ServiceUnavailable   | Err(Http)           |
/// | 500–599       | HttpError | ServerError          | Err(Http)           |
/// | anything else | HttpError | —                    | Err(Http)           |
pub fn classify(exchange: ExchangeOutcome) -> Classification {
    let ExchangeOutcome {
        descriptor,
        status,
        headers,
        body,
    } = exchange;

    if (200..300).contains(&status) {
        return Classification {
            log: LogEntry::Success {
                descriptor,
                status,
                body: body.clone(),
            },
            event: None,
            outcome: Ok(body),
        };
    }

    let log = LogEntry::HttpError {
        descriptor: descriptor.clone(),
        status,
        body: body.clone(),
    };

    let (event, outcome) = match status {
        401 => (
            Some(StatusEvent::Unauthorized {
                descriptor,
                body: body.clone(),
            }),
            Err(Error::Unauthorized),
        ),
        403 => (
            Some(StatusEvent::Forbidden {
                descriptor,
                body: body.clone(),
            }),
            Err(Error::Unauthorized),
        ),
        429 => {
            let retry_after_secs = headers
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| retry_after_seconds(value, Utc::now()));
            (
                Some(StatusEvent::RateLimited {
                    retry_after_secs,
                    descriptor,
                    body: body.clone(),
                }),
                Err(Error::Http { status, body }),
            )
        }
        503 => (
            Some(StatusEvent::ServiceUnavailable {
                descriptor,
                body: body.clone(),
            }),
            Err(Error::Http { status, body }),
        ),
        500..=599 => (
            Some(StatusEvent::ServerError {
                status,
                descriptor,
                body: body.clone(),
            }),
            Err(Error::Http { status, body }),
        ),
        _ => (None, Err(Error::Http { status, body })),
    };

    Classification { log, event, outcome }
}

/// Parse a `Retry-After` header value into seconds.
///
/// Accepts delta-seconds (`"120"`) or an HTTP-date. A date at or before `now`
/// yields `None` rather than a zero or negative delay.
pub fn retry_after_seconds(value: &str, now: DateTime<Utc>) -> Option<f64> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Some(secs as f64);
    }

    let date = DateTime::parse_from_rfc2822(value).ok()?;
    let delta = date.with_timezone(&Utc) - now;
    if delta > chrono::Duration::zero() {
        Some(delta.num_milliseconds() as f64 / 1000.0)
    } else {
        None
    }
}
