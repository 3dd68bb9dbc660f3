//! Data models for pulse-gateway.

pub mod exchange;
pub mod log;
pub mod notify;

pub use exchange::{ExchangeOutcome, RequestDescriptor};
pub use log::LogEntry;
pub use notify::StatusEvent;
