//! Numbering and lookup indices over the classified tree.
//!
//! Pages are numbered 1..N in document order, folders carry the inclusive
//! range spanning their descendant pages, and two lookup indices are built on
//! top: by page number and by prefix string. An [`AipIndex`] is immutable
//! once built; queries never modify it.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::warn;

use crate::error::Result;
use crate::tree::{self, Span, TocFolder, TocNode, TocPage};
use crate::types::{AipType, TocDocument};

/// A fully numbered edition index.
#[derive(Debug)]
pub struct AipIndex {
    aip_type: AipType,
    airac: NaiveDate,
    root: TocFolder,
    by_number: Vec<TocPage>,
    by_prefix: HashMap<String, Span>,
}

impl AipIndex {
    /// Classify, number and index a cached TOC document.
    ///
    /// # Errors
    /// Fails when the tree contains a label no classification rule matches
    /// or a subpage out of sequence; a partially numbered index would be
    /// unsafe to query, so nothing is returned in that case.
    pub fn build(doc: &TocDocument) -> Result<Self> {
        let mut root = tree::build(doc)?;

        let mut counter = 0;
        let mut by_number = Vec::new();
        let mut by_prefix = HashMap::new();
        number_folder(&mut root, &mut counter, &mut by_number, &mut by_prefix);

        Ok(Self {
            aip_type: doc.aip_type,
            airac: doc.airac,
            root,
            by_number,
            by_prefix,
        })
    }

    pub fn aip_type(&self) -> AipType {
        self.aip_type
    }

    pub fn airac(&self) -> NaiveDate {
        self.airac
    }

    pub fn root(&self) -> &TocFolder {
        &self.root
    }

    /// All pages in ascending number order.
    pub fn pages(&self) -> &[TocPage] {
        &self.by_number
    }

    /// Number of pages in the edition.
    pub fn len(&self) -> usize {
        self.by_number.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_number.is_empty()
    }

    /// Look up a page by its document-order number (1-based).
    pub fn page(&self, number: usize) -> Option<&TocPage> {
        number.checked_sub(1).and_then(|i| self.by_number.get(i))
    }

    /// Resolve a prefix to its page-number range. A page prefix resolves to
    /// a single-page range.
    pub fn span(&self, prefix: &str) -> Option<Span> {
        self.by_prefix.get(prefix).copied()
    }
}

fn number_folder(
    folder: &mut TocFolder,
    counter: &mut usize,
    by_number: &mut Vec<TocPage>,
    by_prefix: &mut HashMap<String, Span>,
) {
    let first = *counter + 1;

    for child in &mut folder.children {
        match child {
            TocNode::Page(page) => {
                *counter += 1;
                page.number = *counter;
                insert_prefix(
                    by_prefix,
                    &page.prefix,
                    Span {
                        first: *counter,
                        last: *counter,
                    },
                    &page.href,
                );
                by_number.push(page.clone());
            }
            TocNode::Folder(child_folder) => {
                number_folder(child_folder, counter, by_number, by_prefix);
            }
        }
    }

    if *counter >= first {
        let span = Span {
            first,
            last: *counter,
        };
        folder.span = Some(span);
        if let Some(prefix) = &folder.prefix {
            insert_prefix(by_prefix, prefix, span, &folder.href);
        }
    }
}

fn insert_prefix(by_prefix: &mut HashMap<String, Span>, prefix: &str, span: Span, href: &str) {
    if by_prefix.contains_key(prefix) {
        // Chart sheets without a page number of their own can share a
        // prefix; the first occurrence stays addressable, the rest remain
        // reachable through their folder.
        warn!(prefix, href, "duplicate prefix, keeping first entry");
        return;
    }
    by_prefix.insert(prefix.to_string(), span);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawNode;

    fn page(name: &str, id: &str) -> RawNode {
        RawNode::page(name, format!("https://aip.dfs.de/BasicVFR/pages/{id}.html"))
    }

    fn folder(name: &str, children: Vec<RawNode>) -> RawNode {
        RawNode::folder(name, "https://aip.dfs.de/BasicVFR/pages/F0.html", children)
    }

    fn sample_doc() -> TocDocument {
        TocDocument {
            aip_type: AipType::Vfr,
            airac: NaiveDate::from_ymd_opt(2023, 12, 28).unwrap(),
            name: Some("AIP VFR".to_string()),
            href: "https://aip.dfs.de/BasicVFR/2023DEC28/chapter/root.html".to_string(),
            folder: vec![
                folder(
                    "GEN Allgemeines",
                    vec![
                        folder(
                            "GEN 1 Behörden",
                            vec![
                                page("GEN 1-1", "G11"),
                                page("GEN 1-2", "G12"),
                                page("GEN 1-3", "G13"),
                            ],
                        ),
                        folder(
                            "GEN 2 Tabellen",
                            vec![page("GEN 2-1", "G21"), page("GEN 2-2", "G22")],
                        ),
                    ],
                ),
                folder(
                    "ENR Strecke",
                    vec![folder(
                        "ENR 1 Regeln",
                        vec![page("ENR 1-1", "E11"), page("ENR 1-2", "E12")],
                    )],
                ),
            ],
        }
    }

    #[test]
    fn test_numbers_are_dense_and_ordered() {
        let index = AipIndex::build(&sample_doc()).unwrap();
        assert_eq!(index.len(), 7);
        let numbers: Vec<usize> = index.pages().iter().map(|p| p.number).collect();
        assert_eq!(numbers, (1..=7).collect::<Vec<_>>());
    }

    #[test]
    fn test_folder_spans_cover_descendants() {
        let index = AipIndex::build(&sample_doc()).unwrap();
        assert_eq!(index.span("GEN"), Some(Span { first: 1, last: 5 }));
        assert_eq!(index.span("GEN 1"), Some(Span { first: 1, last: 3 }));
        assert_eq!(index.span("GEN 2"), Some(Span { first: 4, last: 5 }));
        assert_eq!(index.span("ENR"), Some(Span { first: 6, last: 7 }));
    }

    #[test]
    fn test_page_prefix_resolves_to_single_page_span() {
        let index = AipIndex::build(&sample_doc()).unwrap();
        assert_eq!(index.span("GEN 2 1"), Some(Span { first: 4, last: 4 }));
        assert_eq!(index.span("GEN 9 9"), None);
    }

    #[test]
    fn test_lookup_by_number() {
        let index = AipIndex::build(&sample_doc()).unwrap();
        assert_eq!(index.page(4).map(|p| p.prefix.as_str()), Some("GEN 2 1"));
        assert_eq!(index.page(0), None);
        assert_eq!(index.page(8), None);
    }

    #[test]
    fn test_duplicate_prefix_keeps_first_entry() {
        let doc = TocDocument {
            aip_type: AipType::Ifr,
            airac: NaiveDate::from_ymd_opt(2023, 12, 28).unwrap(),
            name: None,
            href: "https://aip.dfs.de/BasicIFR/2023DEC28/chapter/root.html".to_string(),
            folder: vec![folder(
                "ENR",
                vec![folder(
                    "ENR 6",
                    vec![folder(
                        "ENR 6 Streckenkarte Oberer Luftraum",
                        vec![
                            page("Streckenkarte Blatt Nord", "N1"),
                            page("Streckenkarte Blatt Süd", "S1"),
                        ],
                    )],
                )],
            )],
        };

        // Both sheets classify to local page 1 and thus share a prefix.
        let index = AipIndex::build(&doc).unwrap();
        assert_eq!(
            index.span("ENR 6 UPPER 1"),
            Some(Span { first: 1, last: 1 })
        );
        assert_eq!(
            index.span("ENR 6 UPPER"),
            Some(Span { first: 1, last: 2 })
        );
    }
}
