//! HTTP client and page artifact download.
//!
//! The source site serves every page as a PDF under a dedicated print URL.
//! Downloads go through a retrying wrapper: transient failures (connection
//! errors, timeouts, 5xx) back off exponentially, client errors fail
//! immediately.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::REFERER;

use crate::config::{self, HTTP_TIMEOUT_SECS, USER_AGENT};
use crate::error::{AipError, Result};
use crate::tree::TocPage;

/// Maximum number of retry attempts for transient failures.
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
const RETRY_BASE_DELAY_MS: u64 = 500;

/// A downloaded response body with its media type.
#[derive(Debug)]
pub struct Download {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Create a configured HTTP client.
///
/// # Errors
/// Fails when the TLS backend cannot be initialized.
pub fn create_client() -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Download a URL with retry logic.
///
/// The print endpoint checks the referer, so page downloads pass the page's
/// own URL along.
///
/// # Errors
/// Fails on client errors immediately and on transient errors once the
/// retry budget is exhausted.
pub fn download(client: &Client, url: &str, referer: Option<&str>) -> Result<Download> {
    let mut last_error: Option<String> = None;

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            // Exponential backoff: 500ms, 1000ms, 2000ms
            let delay = RETRY_BASE_DELAY_MS * (1 << (attempt - 1));
            tracing::debug!(attempt, delay_ms = delay, "Retrying after delay");
            thread::sleep(Duration::from_millis(delay));
        }

        let mut request = client.get(url);
        if let Some(referer) = referer {
            request = request.header(REFERER, referer);
        }

        match request.send() {
            Ok(response) => {
                let status = response.status();

                // Retry on server errors (5xx)
                if status.is_server_error() {
                    tracing::warn!(
                        status = %status,
                        attempt = attempt + 1,
                        max_retries = MAX_RETRIES,
                        "Server error, will retry"
                    );
                    last_error = Some(format!("Server error: {status}"));
                    continue;
                }

                // Don't retry client errors (4xx) - they won't succeed
                let response = response.error_for_status()?;
                let content_type = response
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());
                let bytes = response.bytes()?;
                return Ok(Download {
                    bytes: bytes.to_vec(),
                    content_type,
                });
            }
            Err(e) => {
                // Retry on connection/timeout errors
                if e.is_connect() || e.is_timeout() {
                    tracing::warn!(
                        error = %e,
                        attempt = attempt + 1,
                        max_retries = MAX_RETRIES,
                        "Connection error, will retry"
                    );
                    last_error = Some(e.to_string());
                    continue;
                }
                // Other errors (like invalid URL) - don't retry
                return Err(AipError::Http(e));
            }
        }
    }

    // All retries exhausted
    Err(AipError::RetriesExhausted {
        attempts: MAX_RETRIES,
        message: last_error.unwrap_or_else(|| "Unknown error".to_string()),
    })
}

/// Fetch a page's PDF artifact into `data_dir`, reusing an existing file
/// unless `refresh` is set. Returns the artifact path.
///
/// # Errors
/// Fails when the download fails or the server does not answer with a PDF.
pub fn fetch_page(
    client: &Client,
    data_dir: &Path,
    page: &TocPage,
    refresh: bool,
) -> Result<PathBuf> {
    let filename = data_dir.join(format!("{}.pdf", page.content_id));
    if !refresh && filename.exists() {
        tracing::debug!(page = %page.prefix, "artifact already cached");
        return Ok(filename);
    }

    let url = print_url_for(page)?;
    let download = download(client, &url, Some(&page.href))?;

    match download.content_type.as_deref() {
        Some("application/pdf") => {
            fs::write(&filename, &download.bytes)?;
            Ok(filename)
        }
        other => Err(AipError::UnexpectedContent {
            page: page.name.clone(),
            content_type: other.unwrap_or("unknown").to_string(),
        }),
    }
}

/// Build the print URL for a page.
fn print_url_for(page: &TocPage) -> Result<String> {
    let chapter = page.path.first().map(String::as_str).unwrap_or_default();

    // The print endpoint wants the page id in its original spelling, so it
    // is taken from the href rather than from the lowercased content id.
    let page_id = page
        .href
        .split(['?', '#'])
        .next()
        .unwrap_or(&page.href)
        .rsplit('/')
        .next()
        .map(|s| s.strip_suffix(".html").unwrap_or(s))
        .unwrap_or_default();

    config::print_url(&page.href, chapter, page_id, &page.name).ok_or_else(|| {
        AipError::Structural {
            name: page.name.clone(),
            path: page.prefix.clone(),
        }
    })
}
