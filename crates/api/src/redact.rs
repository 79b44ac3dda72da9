//! Log-safe rendering of outbound URLs.
//!
//! Query strings carry caller filters and userinfo may carry secrets, so only scheme, host,
//! port and path are ever written to logs or error text.

use std::fmt;
use url::Url;

/// Displays `scheme://host[:port]/path` of the wrapped URL.
#[derive(Debug, Clone, Copy)]
pub struct RedactedUrl<'a>(pub &'a Url);

impl fmt::Display for RedactedUrl<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let url = self.0;
        write!(f, "{}://{}", url.scheme(), url.host_str().unwrap_or_default())?;
        if let Some(port) = url.port() {
            write!(f, ":{port}")?;
        }
        f.write_str(url.path())
    }
}

/// Describe a reqwest failure without the full request URL.
#[must_use]
pub fn describe_reqwest_error(err: reqwest::Error) -> String {
    match err.url().map(|u| RedactedUrl(u).to_string()) {
        Some(target) => format!("{} ({target})", err.without_url()),
        None => err.to_string(),
    }
}
