//! Configuration constants, date validation and URL builders.

use std::sync::LazyLock;

use chrono::NaiveDate;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;

use crate::error::{AipError, Result};

/// Host serving both AIP flavors.
pub const AIP_HOST: &str = "https://aip.dfs.de";

/// HTTP timeout in seconds.
///
/// Chart PDFs can reach a few megabytes; 30 seconds accommodates slow links.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// User agent string identifying this tool.
pub const USER_AGENT: &str = concat!("eaip-indexer/", env!("CARGO_PKG_VERSION"));

/// Date pattern: YYYY-MM-DD.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

/// Parse and validate an effective date (YYYY-MM-DD).
///
/// Future dates are accepted: upcoming AIRAC editions are published ahead of
/// their effective date.
///
/// # Examples
/// ```
/// use eaip_indexer::config::parse_date;
///
/// assert!(parse_date("2024-03-21").is_ok());
/// assert!(parse_date("21.03.2024").is_err());
/// assert!(parse_date("2024-13-01").is_err());
/// ```
pub fn parse_date(date_str: &str) -> Result<NaiveDate> {
    if !DATE_PATTERN.is_match(date_str) {
        return Err(AipError::InvalidDate(date_str.to_string()));
    }

    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| AipError::InvalidDate(date_str.to_string()))
}

/// Characters escaped in the page-name segment of a print URL.
///
/// Matches the escaping the source site expects: alphanumerics and `-_.~/`
/// pass through, everything else is percent-encoded.
const PRINT_NAME_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// Build the print URL for a page artifact.
///
/// The source site serves a page's PDF at
/// `https://aip.dfs.de/{base}/print/{chapter}/{page_id}/{name}` where
/// `{base}` is the first path segment of the page's own URL and `{chapter}`
/// is the page's top-level chapter (`HEL AD` pages are served under `AD`).
///
/// Returns `None` when the href carries no recognizable base segment.
#[must_use]
pub fn print_url(href: &str, chapter: &str, page_id: &str, name: &str) -> Option<String> {
    let path = href.strip_prefix("https://").or_else(|| href.strip_prefix("http://"))?;
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let mut segments = path.split('/');
    let _host = segments.next()?;
    let base = segments.next().filter(|s| !s.is_empty())?;

    let chapter = if chapter == "HEL AD" { "AD" } else { chapter };
    let name = utf8_percent_encode(name, PRINT_NAME_SET);

    Some(format!("{AIP_HOST}/{base}/print/{chapter}/{page_id}/{name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_valid() {
        assert!(parse_date("2024-03-21").is_ok());
        assert!(parse_date("2099-12-31").is_ok()); // Future editions are fine
    }

    #[test]
    fn test_parse_date_invalid_format() {
        assert!(parse_date("").is_err());
        assert!(parse_date("2024/03/21").is_err());
        assert!(parse_date("2024-3-21").is_err());
        assert!(parse_date("21-03-2024").is_err());
    }

    #[test]
    fn test_parse_date_invalid_date() {
        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("2024-02-30").is_err());
    }

    #[test]
    fn test_print_url() {
        let url = print_url(
            "https://aip.dfs.de/BasicVFR/pages/C0A59F2B.html",
            "AD",
            "c0a59f2b",
            "AD 2-4 Ailertchen",
        );
        assert_eq!(
            url.as_deref(),
            Some("https://aip.dfs.de/BasicVFR/print/AD/c0a59f2b/AD%202-4%20Ailertchen")
        );
    }

    #[test]
    fn test_print_url_hel_ad_maps_to_ad() {
        let url = print_url(
            "https://aip.dfs.de/BasicVFR/pages/AAAA0001.html",
            "HEL AD",
            "aaaa0001",
            "Heliport 1",
        );
        assert!(url.unwrap().contains("/print/AD/"));
    }

    #[test]
    fn test_print_url_bad_href() {
        assert!(print_url("not-a-url", "AD", "x", "y").is_none());
    }
}
