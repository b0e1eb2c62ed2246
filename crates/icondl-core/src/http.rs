//! Blocking HTTP GET over a reusable libcurl Easy handle.
//!
//! One `HttpClient` per worker thread: the Easy handle keeps its connection
//! cache between requests, so consecutive icon GETs to the same host reuse
//! the connection.

use crate::retry::FetchError;
use std::time::Duration;

/// Client settings (from `[http]` in config.toml).
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(60),
            user_agent: format!("icondl/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Status and body of a completed GET.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u32,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub struct HttpClient {
    easy: curl::easy::Easy,
}

impl HttpClient {
    pub fn new(opts: &HttpOptions) -> Result<Self, curl::Error> {
        let mut easy = curl::easy::Easy::new();
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(opts.connect_timeout)?;
        easy.timeout(opts.timeout)?;
        easy.useragent(&opts.user_agent)?;
        // Empty string = every encoding libcurl was built with.
        easy.accept_encoding("")?;
        Ok(Self { easy })
    }

    /// Performs a GET and returns status and body regardless of status code.
    pub fn get(&mut self, url: &str) -> Result<HttpResponse, curl::Error> {
        let mut body = Vec::new();
        self.easy.url(url)?;
        self.easy.get(true)?;
        {
            let mut transfer = self.easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }
        let status = self.easy.response_code()?;
        Ok(HttpResponse { status, body })
    }

    /// GET that maps non-2xx statuses to `FetchError::Http`.
    pub fn get_ok(&mut self, url: &str) -> Result<Vec<u8>, FetchError> {
        let resp = self.get(url).map_err(FetchError::Curl)?;
        if !resp.is_success() {
            tracing::debug!(url, status = resp.status, "GET returned non-success status");
            return Err(FetchError::Http(resp.status));
        }
        Ok(resp.body)
    }
}
