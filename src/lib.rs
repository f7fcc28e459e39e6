//! eAIP Indexer - Index, select and download pages of the German AIP.
//!
//! This crate turns the scraped table of contents of an AIP edition into a
//! flat, globally numbered page sequence and answers range queries, duplex
//! pairings and cross-edition diffs against it.
//!
//! # Example
//!
//! ```
//! use eaip_indexer::config;
//!
//! // Effective dates are plain ISO dates
//! assert!(config::parse_date("2023-12-28").is_ok());
//! assert!(config::parse_date("28.12.2023").is_err());
//! ```
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`config`]: Configuration constants, date validation and URL builders
//! - [`types`]: Raw TOC types (document, node, flavor)
//! - [`error`]: Error types and Result alias
//! - [`airac`]: Publication-cycle date arithmetic
//! - [`classify`]: Label classification rule tables
//! - [`tree`]: Classified tree types and tree builder
//! - [`index`]: Page numbering and lookup indices
//! - [`filter`]: Prefix selection and interval merging
//! - [`pairing`]: Duplex sheet pairing
//! - [`diff`]: Cross-edition page diff
//! - [`cache`]: On-disk edition cache
//! - [`fetch`]: HTTP client and artifact download
//! - [`cli`]: Command-line interface

pub mod airac;
pub mod cache;
pub mod classify;
pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod index;
pub mod pairing;
pub mod tree;
pub mod types;

// Re-export the query surface
pub use diff::diff;
pub use filter::{filter, Select};
pub use index::AipIndex;
pub use pairing::pairs;

// Re-export commonly used items
pub use error::{AipError, Result};
pub use types::{AipType, RawNode, TocDocument};
