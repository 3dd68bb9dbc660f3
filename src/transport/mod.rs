//! Transport layer: HTTP exchange primitives and SSE wire parsing.

pub mod headers;
pub mod http;
pub mod sse;
