//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building one HTTP client per worker
//! - GET requests with the configured timeout
//! - Classifying transport errors and non-2xx responses

use crate::SpiderError;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("mini-spider/", env!("CARGO_PKG_VERSION"));

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects, used as the base for relative links
    pub final_url: Url,

    /// HTTP status code (always 2xx)
    pub status_code: u16,

    /// Raw response body
    pub body: Vec<u8>,
}

impl FetchedPage {
    /// Body decoded as UTF-8, with invalid sequences replaced
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Builds an HTTP client for one worker
///
/// Certificate verification is disabled so self-signed and test targets can
/// be crawled. A zero `timeout` means requests never time out.
///
/// # Example
///
/// ```no_run
/// use mini_spider::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(Duration::from_secs(1)).unwrap();
/// ```
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(USER_AGENT)
        .danger_accept_invalid_certs(true)
        .gzip(true)
        .brotli(true);

    if !timeout.is_zero() {
        builder = builder.timeout(timeout).connect_timeout(timeout);
    }

    builder.build()
}

/// Fetches a URL with a single GET request
///
/// There is no retry: a transport error or a non-2xx status is returned as an
/// error and the caller abandons the task.
///
/// # Returns
///
/// * `Ok(FetchedPage)` - 2xx response with its full body
/// * `Err(SpiderError::Http)` - Connection, timeout or body read failure
/// * `Err(SpiderError::Status)` - The server answered with a non-2xx status
pub async fn fetch_page(client: &Client, url: &str) -> Result<FetchedPage, SpiderError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| SpiderError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(SpiderError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let final_url = response.url().clone();
    let body = response
        .bytes()
        .await
        .map_err(|source| SpiderError::Http {
            url: url.to_string(),
            source,
        })?;

    Ok(FetchedPage {
        final_url,
        status_code: status.as_u16(),
        body: body.to_vec(),
    })
}
