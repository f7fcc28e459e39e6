//! Error types for the eAIP indexer.
//!
//! Index construction errors (`Structural`) are fatal: a partially built
//! index must never be queried. Filter-time errors (`UnknownPrefix`,
//! `RangeOrder`, `InvalidSelect`) are local to the offending call and leave
//! the index intact.

use thiserror::Error;

/// Main error type for the indexer library.
#[derive(Debug, Error)]
pub enum AipError {
    /// A TOC node label matched no classification rule.
    #[error("Unexpected entry '{name}' in section '{path}'")]
    Structural { name: String, path: String },

    /// A lettered subpage violated the parity/adjacency constraint.
    #[error("Subpage '{name}' in section '{path}' does not follow its even base page")]
    SubpageOrder { name: String, path: String },

    /// A requested prefix does not exist in the index.
    #[error("Unknown section '{0}'")]
    UnknownPrefix(String),

    /// A prefix range resolved to a descending page interval.
    #[error("Invalid range '{first}'-'{last}'. The start must not lie behind the end")]
    RangeOrder { first: String, last: String },

    /// A select expression could not be parsed.
    #[error("Invalid select expression '{0}'. Expected PREFIX or PREFIX-PREFIX")]
    InvalidSelect(String),

    /// Invalid effective date.
    #[error("Invalid date '{0}'. Expected YYYY-MM-DD (e.g. 2024-03-21)")]
    InvalidDate(String),

    /// No cached TOC matches the requested type and edition.
    #[error("No cached {aip_type} edition{}", .airac.as_ref().map(|a| format!(" for {a}")).unwrap_or_default())]
    EditionNotCached {
        aip_type: String,
        airac: Option<String>,
    },

    /// A TOC file disagrees with its expected type or edition date.
    #[error("TOC file '{file}' carries {found}, expected {expected}")]
    TocMismatch {
        file: String,
        expected: String,
        found: String,
    },

    /// A page artifact download returned something other than a PDF.
    #[error("Unexpected content type '{content_type}' for page '{page}'")]
    UnexpectedContent { page: String, content_type: String },

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// All download retries were exhausted.
    #[error("Download failed after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for indexer operations.
pub type Result<T> = std::result::Result<T, AipError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_display() {
        let err = AipError::Structural {
            name: "Mystery 7".to_string(),
            path: "GEN 3".to_string(),
        };
        assert!(err.to_string().contains("Mystery 7"));
        assert!(err.to_string().contains("GEN 3"));
    }

    #[test]
    fn test_edition_not_cached_with_date() {
        let err = AipError::EditionNotCached {
            aip_type: "VFR".to_string(),
            airac: Some("2024-03-21".to_string()),
        };
        assert_eq!(err.to_string(), "No cached VFR edition for 2024-03-21");
    }

    #[test]
    fn test_edition_not_cached_without_date() {
        let err = AipError::EditionNotCached {
            aip_type: "IFR".to_string(),
            airac: None,
        };
        assert_eq!(err.to_string(), "No cached IFR edition");
    }
}
