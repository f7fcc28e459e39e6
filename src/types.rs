//! Core data types: AIP flavors and the raw TOC boundary.
//!
//! The raw tree is produced by an external scraper and delivered whole as a
//! JSON document per (type, edition) pair. The indexer never performs I/O to
//! obtain it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The two published AIP flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum AipType {
    /// AIP VFR (visual flight rules).
    Vfr,
    /// AIP IFR (instrument flight rules).
    Ifr,
}

impl AipType {
    /// Get the string value used in TOC files and display output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vfr => "VFR",
            Self::Ifr => "IFR",
        }
    }

}

impl std::fmt::Display for AipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the raw TOC tree as delivered by the scraper.
///
/// A node carrying a `folder` key is a folder (even when the list is empty);
/// a node without one is a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawNode {
    /// Label as shown in the source navigation.
    pub name: String,

    /// Source URL of the node.
    pub href: String,

    /// Child nodes, in document order. Absent for pages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<Vec<RawNode>>,
}

impl RawNode {
    /// Create a page node.
    #[must_use]
    pub fn page(name: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            href: href.into(),
            folder: None,
        }
    }

    /// Create a folder node.
    #[must_use]
    pub fn folder(
        name: impl Into<String>,
        href: impl Into<String>,
        children: Vec<RawNode>,
    ) -> Self {
        Self {
            name: name.into(),
            href: href.into(),
            folder: Some(children),
        }
    }

    /// Whether this node is a folder.
    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.folder.is_some()
    }
}

/// A complete raw TOC document for one (type, edition) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TocDocument {
    /// AIP flavor.
    #[serde(rename = "type")]
    pub aip_type: AipType,

    /// AIRAC effective date of the edition.
    pub airac: NaiveDate,

    /// Display name of the document set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// URL of the TOC root.
    pub href: String,

    /// Top-level entries.
    #[serde(default)]
    pub folder: Vec<RawNode>,
}

/// Derive the stable content identity of a node from its source URL.
///
/// The identity is the last path segment with any `.html` suffix stripped,
/// lowercased. It survives edition changes as long as the underlying
/// artifact is unchanged, which is what the edition diff relies on.
#[must_use]
pub fn content_id(href: &str) -> String {
    let path = href
        .split(['?', '#'])
        .next()
        .unwrap_or(href)
        .trim_end_matches('/');
    let segment = path.rsplit('/').next().unwrap_or(path);
    segment
        .strip_suffix(".html")
        .unwrap_or(segment)
        .to_lowercase()
}
