//! Log entries broadcast on the log channel.

use bytes::Bytes;

use super::exchange::RequestDescriptor;

/// One log entry per completed exchange.
///
/// `DecodingError` entries are emitted additionally when a typed decode fails
/// downstream of an otherwise successful exchange.
#[derive(Debug, Clone)]
pub enum LogEntry {
    /// The exchange completed with a 2xx status.
    Success {
        /// Originating request.
        descriptor: RequestDescriptor,
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: Bytes,
    },
    /// The exchange completed with a non-2xx status.
    HttpError {
        /// Originating request.
        descriptor: RequestDescriptor,
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: Bytes,
    },
    /// A payload failed to decode into the caller's declared type.
    DecodingError {
        /// Originating request.
        descriptor: RequestDescriptor,
        /// Description of the decode failure.
        error: String,
        /// The payload that failed to decode.
        body: Bytes,
        /// Name of the type the payload was decoded into.
        target_type: &'static str,
    },
}

impl LogEntry {
    /// The request this entry belongs to.
    pub fn descriptor(&self) -> &RequestDescriptor {
        match self {
            LogEntry::Success { descriptor, .. }
            | LogEntry::HttpError { descriptor, .. }
            | LogEntry::DecodingError { descriptor, .. } => descriptor,
        }
    }

    /// The HTTP status behind this entry, where one applies.
    pub fn status(&self) -> Option<u16> {
        match self {
            LogEntry::Success { status, .. } | LogEntry::HttpError { status, .. } => Some(*status),
            LogEntry::DecodingError { .. } => None,
        }
    }
}
