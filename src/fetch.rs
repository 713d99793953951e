//! Fetching URL-valued content
//!
//! When the content handed to [`crate::Shooter::make`] is an absolute URL, the
//! page body is downloaded once at construction time and used as the HTML.
//! A failed fetch is fatal for that request; nothing is retried.

use crate::{Error, Result};
#[cfg(feature = "fetch")]
use log::debug;
use url::Url;

/// Downloads a document body
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Whether `input` is a syntactically valid absolute URL with a host
pub fn is_absolute_url(input: &str) -> bool {
    let input = input.trim();
    // Url::parse accepts leading/trailing whitespace and "a:b" style strings
    if input.is_empty() || input.contains(char::is_whitespace) {
        return false;
    }
    match Url::parse(input) {
        Ok(url) => url.has_host() && !url.cannot_be_a_base(),
        Err(_) => false,
    }
}

/// Blocking HTTP fetcher backed by `reqwest`
#[cfg(feature = "fetch")]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "fetch")]
impl HttpFetcher {
    pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
    pub const DEFAULT_USER_AGENT: &'static str = concat!("htmlshot/", env!("CARGO_PKG_VERSION"));

    pub fn new() -> Result<Self> {
        Self::with_options(Self::DEFAULT_TIMEOUT_MS, Self::DEFAULT_USER_AGENT)
    }

    pub fn with_options(timeout_ms: u64, user_agent: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .user_agent(user_agent.to_string())
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[cfg(feature = "fetch")]
impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        debug!("fetching content from {}", url);

        let res = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::Fetch(format!("GET {} failed: {}", url, e)))?;

        let status = res.status();
        if !status.is_success() {
            return Err(Error::Fetch(format!("GET {} returned {}", url, status)));
        }

        res.text()
            .map_err(|e| Error::Fetch(format!("Failed to read body of {}: {}", url, e)))
    }
}

/// Fetcher that refuses every URL; used when the `fetch` feature is off
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFetcher;

impl Fetcher for NoFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        Err(Error::Fetch(format!(
            "cannot fetch {}: built without the `fetch` feature",
            url
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_absolute_urls() {
        assert!(is_absolute_url("https://example.com"));
        assert!(is_absolute_url("http://127.0.0.1:8080/page?x=1"));
        assert!(!is_absolute_url("example.com"));
        assert!(!is_absolute_url("/relative/path"));
        assert!(!is_absolute_url("<p>https://example.com</p>"));
        assert!(!is_absolute_url("mailto:someone@example.com"));
        assert!(!is_absolute_url("emails.welcome"));
        assert!(!is_absolute_url("Visit https://example.com today"));
    }

    #[test]
    fn no_fetcher_always_fails() {
        assert!(matches!(NoFetcher.fetch("https://example.com"), Err(Error::Fetch(_))));
    }

    #[cfg(feature = "fetch")]
    #[test]
    fn http_fetcher_reads_body() {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr();

        std::thread::spawn(move || {
            if let Ok(request) = server.recv() {
                let _ = request.respond(tiny_http::Response::from_string("<p>fetched</p>"));
            }
        });

        let fetcher = HttpFetcher::new().expect("client");
        let body = fetcher.fetch(&format!("http://{}/", addr)).unwrap();
        assert_eq!(body, "<p>fetched</p>");
    }

    #[cfg(feature = "fetch")]
    #[test]
    fn http_fetcher_rejects_error_status() {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr();

        std::thread::spawn(move || {
            if let Ok(request) = server.recv() {
                let _ = request.respond(tiny_http::Response::from_string("gone").with_status_code(404));
            }
        });

        let fetcher = HttpFetcher::new().expect("client");
        let err = fetcher.fetch(&format!("http://{}/missing", addr)).unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
    }
}
