//! Configuration constants and URL helpers.

use std::time::Duration;

use crate::error::{Error, Result};

/// Connect timeout for HTTP requests.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for non-streaming requests.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// User agent sent on every request.
pub const USER_AGENT: &str = concat!("pulse-gateway/", env!("CARGO_PKG_VERSION"));

/// Build a full endpoint URL from a base URL and a path.
///
/// Slashes at the seam are normalized so `https://host/v1` + `/events` and
/// `https://host/v1/` + `events` produce the same URL. The result is parsed
/// before being returned so malformed input fails here rather than at send
/// time.
pub fn endpoint_url(base: &str, path: &str) -> Result<String> {
    let url = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    reqwest::Url::parse(&url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;
    Ok(url)
}
