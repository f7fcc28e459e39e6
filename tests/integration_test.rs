//! End-to-end tests over a captured TOC fixture: classification, numbering,
//! selection, pairing and the cross-edition diff.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;

use eaip_indexer::cache::Cache;
use eaip_indexer::filter::{filter, Select};
use eaip_indexer::pairing::pairs;
use eaip_indexer::{diff, AipIndex, AipType, TocDocument};

/// Load a fixture TOC file.
fn load_fixture(name: &str) -> TocDocument {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let content = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e))
}

fn base_index() -> AipIndex {
    AipIndex::build(&load_fixture("VFR-2023-12-28.json")).expect("fixture should index")
}

fn target_index() -> AipIndex {
    AipIndex::build(&load_fixture("VFR-2024-01-25.json")).expect("fixture should index")
}

fn selects(tokens: &[&str]) -> Vec<Select> {
    tokens.iter().map(|t| t.parse().unwrap()).collect()
}

#[test]
fn test_numbering_is_dense() {
    let index = base_index();
    assert_eq!(index.len(), 14);
    let numbers: Vec<usize> = index.pages().iter().map(|p| p.number).collect();
    assert_eq!(numbers, (1..=14).collect::<Vec<_>>());
}

#[test]
fn test_prefixes_across_section_families() {
    let index = base_index();
    let prefixes: Vec<&str> = index.pages().iter().map(|p| p.prefix.as_str()).collect();
    assert_eq!(
        prefixes,
        [
            "GEN 1 1",
            "GEN 1 2",
            "GEN 1 2A",
            "GEN 2 1",
            "GEN 2 2",
            "ENR 1 1",
            "ENR 1 2",
            "AD 2 1",
            "AD 2 2",
            "AD EDDC 1",
            "AD EDDC 2",
            "AD Aventoft 1",
            "AIC 02/23 1",
            "AIC 02/23 2",
        ]
    );
}

#[test]
fn test_year_register_circulars_are_pruned() {
    let index = base_index();
    assert!(index.span("AIC 01/23").is_none());
    assert!(index.pages().iter().all(|p| !p.prefix.contains("01/23")));
}

#[test]
fn test_folder_spans() {
    let index = base_index();
    let span = index.span("GEN").expect("GEN should be indexed");
    assert_eq!((span.first, span.last), (1, 5));
    let span = index.span("AD EDDC").expect("airfield should be indexed");
    assert_eq!((span.first, span.last), (10, 11));
}

#[test]
fn test_filter_merges_adjacent_sections() {
    let index = base_index();
    let pages = filter(&index, &selects(&["GEN 1", "GEN 2"])).unwrap();
    let numbers: Vec<usize> = pages.iter().map(|p| p.number).collect();
    assert_eq!(numbers, (1..=5).collect::<Vec<_>>());
}

#[test]
fn test_filter_range_token() {
    let index = base_index();
    let pages = filter(&index, &selects(&["GEN 2-ENR 1"])).unwrap();
    let numbers: Vec<usize> = pages.iter().map(|p| p.number).collect();
    assert_eq!(numbers, (4..=7).collect::<Vec<_>>());
}

#[test]
fn test_pairing_folds_in_subpages() {
    let index = base_index();
    let pages = filter(&index, &selects(&["GEN 1"])).unwrap();
    let sheet_pairs = pairs(&index, &pages, false);
    let numbers: Vec<(Option<usize>, Option<usize>)> = sheet_pairs
        .iter()
        .map(|(f, b)| (f.as_ref().map(|p| p.number), b.as_ref().map(|p| p.number)))
        .collect();
    // GEN 1-2a is an odd sheet side again; its successor GEN 2-1 is also
    // odd, so no back side exists.
    assert_eq!(numbers, [(Some(1), Some(2)), (Some(3), None)]);
}

#[test]
fn test_diff_between_editions() {
    let base = base_index();
    let target = target_index();

    let result = diff(base.pages(), target.pages());
    let entries: Vec<(Option<&str>, Option<&str>)> = result
        .iter()
        .map(|(b, t)| {
            (
                b.as_ref().map(|p| p.prefix.as_str()),
                t.as_ref().map(|p| p.prefix.as_str()),
            )
        })
        .collect();

    assert_eq!(
        entries,
        [
            // GEN 2-1 points at a new artifact
            (Some("GEN 2 1"), Some("GEN 2 1")),
            // ENR 1-2 disappeared
            (Some("ENR 1 2"), None),
            // AD 2-3 is new
            (None, Some("AD 2 3")),
        ]
    );
}

#[test]
fn test_cache_import_round_trip() {
    let dir = tempfile::TempDir::new().unwrap();
    let cache = Cache::with_dir(dir.path().to_path_buf()).unwrap();

    let fixture = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("VFR-2023-12-28.json");
    cache.import(&fixture, Some(AipType::Vfr)).unwrap();

    let entry = cache.get(AipType::Vfr, None).unwrap();
    let doc = cache.load(&entry).unwrap();
    let index = AipIndex::build(&doc).unwrap();
    assert_eq!(index.len(), 14);
    assert_eq!(index.aip_type(), AipType::Vfr);
}
