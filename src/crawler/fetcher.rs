//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester:
//! - Building the HTTP client (transport defaults, no custom headers)
//! - Single GET requests with status validation
//! - Error classification for logging and reporting
//!
//! No retries are attempted. A failed fetch is reported once and the caller
//! moves on.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};

/// A successfully fetched response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Raw page body
    pub body: Vec<u8>,
    /// Content-Type header, carrying the declared charset if any
    pub content_type: Option<String>,
}

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// Body and content type
        page: Page,
    },

    /// Server answered with a status other than 200
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (DNS, connection refused, malformed URL, body read...)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Returns the body of a successful fetch, logging any failure
    ///
    /// This is the `fetch(url) -> (markup, ok)` view of a fetch: `Some` is
    /// the ok case, `None` means the failure has already been logged.
    pub fn into_markup(self, url: &str) -> Option<Page> {
        match self {
            FetchResult::Success { page, .. } => Some(page),
            FetchResult::HttpError { status_code } => {
                tracing::warn!("Invalid status code fetching {}: {}", url, status_code);
                None
            }
            FetchResult::NetworkError { error } => {
                tracing::warn!("Failed to fetch {}: {}", url, error);
                None
            }
        }
    }
}

/// Builds the HTTP client used by both passes
///
/// The client keeps reqwest's transport defaults: no overall timeout, no
/// custom user agent, default redirect policy.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder().build()
}

/// Fetches a URL with a single GET request
///
/// Only `200 OK` counts as success. The response is consumed (or dropped)
/// on every path, which releases the connection back to the pool.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
///
/// # Returns
///
/// A FetchResult indicating success or the type of failure
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return classify_error(&e),
    };

    let status = response.status();
    if status != StatusCode::OK {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    match response.bytes().await {
        Ok(body) => FetchResult::Success {
            final_url,
            page: Page {
                body: body.to_vec(),
                content_type,
            },
        },
        Err(e) => FetchResult::NetworkError {
            error: format!("Failed to read body: {}", e),
        },
    }
}

/// Fetches a URL and returns its page, or `None` after logging the failure
pub async fn fetch_page(client: &Client, url: &str) -> Option<Page> {
    fetch_url(client, url).await.into_markup(url)
}

fn classify_error(e: &reqwest::Error) -> FetchResult {
    let error = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else if e.is_builder() {
        format!("Invalid request: {}", e)
    } else {
        e.to_string()
    };

    FetchResult::NetworkError { error }
}
