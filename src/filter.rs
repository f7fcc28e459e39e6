//! Prefix selection: range tokens, interval union and page materialization.

use std::str::FromStr;

use crate::error::{AipError, Result};
use crate::index::AipIndex;
use crate::tree::TocPage;

/// A selection token: a single prefix or an inclusive prefix range.
///
/// Parsed from `PREFIX` or `PREFIX-PREFIX`, e.g. `"GEN 2"` or
/// `"AD EDDC-AD EDDN"`. A single prefix is a range onto itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
    pub first: String,
    pub last: String,
}

impl FromStr for Select {
    type Err = AipError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split('-');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(single), None, None) => Ok(Self {
                first: single.trim().to_string(),
                last: single.trim().to_string(),
            }),
            (Some(first), Some(last), None) => Ok(Self {
                first: first.trim().to_string(),
                last: last.trim().to_string(),
            }),
            _ => Err(AipError::InvalidSelect(s.to_string())),
        }
    }
}

/// Resolve selection tokens against an index and return the matching pages
/// in ascending number order, with overlapping and adjacent ranges merged.
/// No tokens selects the whole edition.
///
/// # Errors
/// Fails when a prefix is unknown or a range runs backwards; the index
/// itself stays valid.
pub fn filter(index: &AipIndex, selects: &[Select]) -> Result<Vec<TocPage>> {
    if selects.is_empty() {
        return Ok(index.pages().to_vec());
    }

    // Resolve every token to an inclusive page-number interval, expressed as
    // signed boundary markers.
    let mut markers = Vec::with_capacity(selects.len() * 2);
    for select in selects {
        let first = index
            .span(&select.first)
            .ok_or_else(|| AipError::UnknownPrefix(select.first.clone()))?;
        let last = index
            .span(&select.last)
            .ok_or_else(|| AipError::UnknownPrefix(select.last.clone()))?;

        if first.first > last.last {
            return Err(AipError::RangeOrder {
                first: select.first.clone(),
                last: select.last.clone(),
            });
        }

        markers.push((first.first, 1i32));
        markers.push((last.last, -1i32));
    }

    // Sweep the markers in position order (Marzullo). At equal positions
    // openers go first so a range closing where another opens does not
    // produce a gap. Intervals are only sealed once the next one starts
    // beyond stop + 1, which merges adjacent ranges.
    markers.sort_by_key(|&(num, diff)| (num, -diff));

    let mut count = 0i32;
    let mut curr_start = 0usize;
    let mut curr_stop: Option<usize> = None;
    let mut started = false;
    let mut ranges = Vec::new();

    for (num, diff) in markers {
        let new_count = count + diff;

        if count == 0 && new_count > 0 {
            match curr_stop {
                None => {
                    if !started {
                        curr_start = num;
                        started = true;
                    }
                }
                Some(stop) if stop + 1 < num => {
                    ranges.push((curr_start, stop));
                    curr_start = num;
                }
                Some(_) => {}
            }
            curr_stop = None;
        } else if count > 0 && new_count == 0 {
            // Not sealed yet, a directly adjacent interval may follow.
            curr_stop = Some(num);
        }

        count = new_count;
    }

    if let (true, Some(stop)) = (started, curr_stop) {
        ranges.push((curr_start, stop));
    }

    let mut pages = Vec::new();
    for (start, stop) in ranges {
        for num in start..=stop {
            if let Some(page) = index.page(num) {
                pages.push(page.clone());
            }
        }
    }

    Ok(pages)
}
