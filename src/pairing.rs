//! Duplex pairing: group selected pages into physical sheet sides.

use std::collections::HashSet;

use crate::index::AipIndex;
use crate::tree::TocPage;

/// One physical sheet: odd-numbered front, even-numbered back. A missing
/// side is `None`.
pub type SheetPair = (Option<TocPage>, Option<TocPage>);

/// Group a filtered, number-ordered page list into duplex sheet pairs.
///
/// A selected odd page is paired with its even successor when that page was
/// selected as well; `force` also pulls in unselected counterparts so every
/// sheet comes out complete. A page whose counterpart has unexpected parity
/// is emitted unpaired rather than failing the call.
pub fn pairs(index: &AipIndex, pages: &[TocPage], force: bool) -> Vec<SheetPair> {
    let selected: HashSet<usize> = pages.iter().map(|p| p.number).collect();
    let mut sheet_pairs = Vec::new();

    for page in pages {
        if page.odd {
            let back = index
                .page(page.number + 1)
                .filter(|next| !next.odd)
                .filter(|next| force || selected.contains(&next.number));
            sheet_pairs.push((Some(page.clone()), back.cloned()));
        } else {
            let front = page.number.checked_sub(1).and_then(|n| index.page(n));

            // Already emitted together with its front side.
            if front.is_some_and(|prev| selected.contains(&prev.number)) {
                continue;
            }

            let front = front.filter(|prev| prev.odd);
            if force {
                sheet_pairs.push((front.cloned(), Some(page.clone())));
            } else {
                sheet_pairs.push((None, Some(page.clone())));
            }
        }
    }

    sheet_pairs
}
