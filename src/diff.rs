//! Cross-edition diff: classify pages as added, removed or changed.

use std::collections::HashMap;

use crate::tree::TocPage;

/// One diff entry. `(None, page)` is an addition, `(page, None)` a removal
/// and `(base, target)` a page whose content changed between the editions.
pub type DiffPair = (Option<TocPage>, Option<TocPage>);

/// Align two editions' page lists by prefix and report the differences.
///
/// Prefixes are assumed to be stable identifiers across editions; a change
/// to the structural labelling between editions shows up as unrelated
/// additions and removals. Unchanged pages are not reported.
pub fn diff(base: &[TocPage], target: &[TocPage]) -> Vec<DiffPair> {
    let by_prefix: HashMap<&str, (usize, &TocPage)> = base
        .iter()
        .enumerate()
        .map(|(position, page)| (page.prefix.as_str(), (position, page)))
        .collect();

    let mut result = Vec::new();
    let mut last_base = 0;

    for target_page in target {
        let Some(&(position, base_page)) = by_prefix.get(target_page.prefix.as_str()) else {
            result.push((None, Some(target_page.clone())));
            continue;
        };

        // Base pages skipped over on the way to this match were removed.
        for removed in base.iter().take(position).skip(last_base) {
            result.push((Some(removed.clone()), None));
        }
        last_base = last_base.max(position + 1);

        if base_page.content_id != target_page.content_id {
            result.push((Some(base_page.clone()), Some(target_page.clone())));
        }
    }

    for removed in base.iter().skip(last_base) {
        result.push((Some(removed.clone()), None));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn page(prefix: &str, content_id: &str) -> TocPage {
        TocPage {
            name: prefix.to_string(),
            href: format!("https://aip.dfs.de/BasicVFR/pages/{content_id}.html"),
            content_id: content_id.to_string(),
            path: prefix.split(' ').map(str::to_string).collect(),
            prefix: prefix.to_string(),
            title: None,
            odd: true,
            number: 0,
        }
    }

    fn prefixes(result: &[DiffPair]) -> Vec<(Option<String>, Option<String>)> {
        result
            .iter()
            .map(|(b, t)| {
                (
                    b.as_ref().map(|p| p.prefix.clone()),
                    t.as_ref().map(|p| p.prefix.clone()),
                )
            })
            .collect()
    }

    #[test]
    fn test_identical_editions_are_silent() {
        let base = vec![page("GEN 1 1", "a"), page("GEN 1 2", "b")];
        assert!(diff(&base, &base).is_empty());
    }

    #[test]
    fn test_added_page() {
        let base = vec![page("GEN 1 1", "a")];
        let target = vec![page("GEN 1 1", "a"), page("GEN 1 2", "b")];
        assert_eq!(
            prefixes(&diff(&base, &target)),
            [(None, Some("GEN 1 2".to_string()))]
        );
    }

    #[test]
    fn test_removed_page() {
        let base = vec![page("GEN 1 1", "a"), page("GEN 1 2", "b")];
        let target = vec![page("GEN 1 1", "a")];
        assert_eq!(
            prefixes(&diff(&base, &target)),
            [(Some("GEN 1 2".to_string()), None)]
        );
    }

    #[test]
    fn test_removed_page_in_the_middle() {
        let base = vec![
            page("GEN 1 1", "a"),
            page("GEN 1 2", "b"),
            page("GEN 1 3", "c"),
        ];
        let target = vec![page("GEN 1 1", "a"), page("GEN 1 3", "c")];
        assert_eq!(
            prefixes(&diff(&base, &target)),
            [(Some("GEN 1 2".to_string()), None)]
        );
    }

    #[test]
    fn test_changed_content_identity() {
        let base = vec![page("GEN 1 1", "a")];
        let target = vec![page("GEN 1 1", "a2")];
        assert_eq!(
            prefixes(&diff(&base, &target)),
            [(Some("GEN 1 1".to_string()), Some("GEN 1 1".to_string()))]
        );
    }

    #[test]
    fn test_mixed_changes_preserve_order() {
        let base = vec![
            page("GEN 1 1", "a"),
            page("GEN 1 2", "b"),
            page("GEN 1 3", "c"),
        ];
        let target = vec![
            page("GEN 1 1", "a"),
            page("GEN 1 3", "c2"),
            page("GEN 1 4", "d"),
        ];
        assert_eq!(
            prefixes(&diff(&base, &target)),
            [
                (Some("GEN 1 2".to_string()), None),
                (Some("GEN 1 3".to_string()), Some("GEN 1 3".to_string())),
                (None, Some("GEN 1 4".to_string())),
            ]
        );
    }
}
