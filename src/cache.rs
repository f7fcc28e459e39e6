//! Edition cache: TOC documents and downloaded page artifacts on disk.
//!
//! The cache directory holds one `{TYPE}-{AIRAC}.json` file per imported
//! edition plus a `data/` directory with the fetched page PDFs. TOC files
//! are imported verbatim; they are parsed on import to make sure the cache
//! only ever contains loadable documents.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use directories::ProjectDirs;
use tracing::{debug, warn};

use serde::Deserialize;

use crate::error::{AipError, Result};
use crate::types::{AipType, TocDocument};

/// A cached edition: flavor, effective date and TOC file location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub aip_type: AipType,
    pub airac: NaiveDate,
    pub path: PathBuf,
}

/// Header of a cached TOC file, enough to identify the edition without
/// parsing the whole tree.
#[derive(Debug, Deserialize)]
struct TocHeader {
    #[serde(rename = "type")]
    aip_type: AipType,
    airac: NaiveDate,
}

/// On-disk edition cache.
#[derive(Debug)]
pub struct Cache {
    basedir: PathBuf,
}

impl Cache {
    /// Open the cache in the platform cache directory.
    ///
    /// # Errors
    /// Fails when no cache location can be determined or the directory
    /// cannot be created.
    pub fn open() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "eaip-indexer").ok_or_else(|| {
            AipError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no cache directory available",
            ))
        })?;
        Self::with_dir(dirs.cache_dir().to_path_buf())
    }

    /// Open the cache in an explicit directory, creating it if necessary.
    ///
    /// # Errors
    /// Fails when the directory cannot be created.
    pub fn with_dir(basedir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&basedir)?;
        Ok(Self { basedir })
    }

    /// Directory holding downloaded page artifacts, created on demand.
    ///
    /// # Errors
    /// Fails when the directory cannot be created.
    pub fn data_dir(&self) -> Result<PathBuf> {
        let dir = self.basedir.join("data");
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// List cached editions, newest first, optionally restricted to one
    /// flavor. Unreadable files are skipped with a warning.
    ///
    /// # Errors
    /// Fails when the cache directory cannot be read.
    pub fn list(&self, aip_type: Option<AipType>) -> Result<Vec<CacheEntry>> {
        let mut entries = Vec::new();

        for dir_entry in fs::read_dir(&self.basedir)? {
            let path = dir_entry?.path();
            if !path.is_file() || path.extension().is_none_or(|e| e != "json") {
                continue;
            }

            let header = match read_header(&path) {
                Ok(header) => header,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable TOC file");
                    continue;
                }
            };

            if aip_type.is_some_and(|t| t != header.aip_type) {
                continue;
            }

            entries.push(CacheEntry {
                aip_type: header.aip_type,
                airac: header.airac,
                path,
            });
        }

        entries.sort_by(|a, b| {
            (b.airac, b.aip_type.as_str()).cmp(&(a.airac, a.aip_type.as_str()))
        });

        Ok(entries)
    }

    /// Look up a cached edition by flavor and, optionally, effective date.
    /// Without a date the newest cached edition of that flavor wins.
    ///
    /// # Errors
    /// Fails with [`AipError::EditionNotCached`] when no matching edition
    /// exists.
    pub fn get(&self, aip_type: AipType, airac: Option<NaiveDate>) -> Result<CacheEntry> {
        self.list(Some(aip_type))?
            .into_iter()
            .find(|entry| airac.is_none_or(|date| date == entry.airac))
            .ok_or_else(|| AipError::EditionNotCached {
                aip_type: aip_type.as_str().to_string(),
                airac: airac.map(|d| d.to_string()),
            })
    }

    /// Load the TOC document of a cached edition.
    ///
    /// # Errors
    /// Fails when the file cannot be read or parsed.
    pub fn load(&self, entry: &CacheEntry) -> Result<TocDocument> {
        let content = fs::read_to_string(&entry.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Import an externally scraped TOC file into the cache.
    ///
    /// The file is parsed to validate it and copied verbatim. With
    /// `expected` set, a flavor mismatch is rejected.
    ///
    /// # Errors
    /// Fails when the file cannot be read or parsed, or when its flavor
    /// does not match `expected`.
    pub fn import(&self, path: &Path, expected: Option<AipType>) -> Result<CacheEntry> {
        let content = fs::read_to_string(path)?;
        let doc: TocDocument = serde_json::from_str(&content)?;

        if let Some(expected) = expected {
            if doc.aip_type != expected {
                return Err(AipError::TocMismatch {
                    file: path.display().to_string(),
                    expected: expected.as_str().to_string(),
                    found: doc.aip_type.as_str().to_string(),
                });
            }
        }

        let target = self
            .basedir
            .join(format!("{}-{}.json", doc.aip_type.as_str(), doc.airac));
        fs::write(&target, content)?;
        debug!(path = %target.display(), "imported TOC");

        Ok(CacheEntry {
            aip_type: doc.aip_type,
            airac: doc.airac,
            path: target,
        })
    }

    /// Delete artifacts in `data/` that no cached edition references.
    /// Returns the number of files removed.
    ///
    /// # Errors
    /// Fails when the cache cannot be read or a file cannot be removed.
    pub fn purge(&self) -> Result<usize> {
        let mut referenced = std::collections::HashSet::new();
        for entry in self.list(None)? {
            let doc = self.load(&entry)?;
            collect_content_ids(&doc.folder, &mut referenced);
        }

        let data_dir = self.data_dir()?;
        let mut removed = 0;
        for dir_entry in fs::read_dir(&data_dir)? {
            let path = dir_entry?.path();
            if !path.is_file() {
                continue;
            }
            let keep = path
                .file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(|stem| referenced.contains(stem));
            if !keep {
                debug!(path = %path.display(), "purging unreferenced artifact");
                fs::remove_file(&path)?;
                removed += 1;
            }
        }

        Ok(removed)
    }
}

fn read_header(path: &Path) -> Result<TocHeader> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn collect_content_ids(
    nodes: &[crate::types::RawNode],
    out: &mut std::collections::HashSet<String>,
) {
    for node in nodes {
        out.insert(crate::types::content_id(&node.href));
        if let Some(children) = &node.folder {
            collect_content_ids(children, out);
        }
    }
}
