//! AIRAC cycle arithmetic.
//!
//! Editions are identified by their AIRAC effective date. The cycle grid is
//! fixed: one cycle every 28 days, worldwide. Anchoring on a known effective
//! date makes every other cycle date computable without consulting the
//! source site.

use chrono::{Duration, NaiveDate};

/// Length of one AIRAC cycle in days.
pub const CYCLE_DAYS: i64 = 28;

/// A known AIRAC effective date anchoring the cycle grid (cycle 2001).
#[allow(clippy::expect_used)] // Constant date that is guaranteed to be valid
fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 2).expect("valid epoch date")
}

/// Whether a date falls on the AIRAC cycle grid.
#[must_use]
pub fn is_airac_date(date: NaiveDate) -> bool {
    (date - epoch()).num_days().rem_euclid(CYCLE_DAYS) == 0
}

/// The effective date of the cycle containing `date`.
///
/// Returns `date` itself when it lies on the grid, otherwise the most recent
/// grid date before it.
#[must_use]
pub fn current_cycle(date: NaiveDate) -> NaiveDate {
    let offset = (date - epoch()).num_days().rem_euclid(CYCLE_DAYS);
    date - Duration::days(offset)
}

/// The effective date of the cycle after the one containing `date`.
#[must_use]
pub fn next_cycle(date: NaiveDate) -> NaiveDate {
    current_cycle(date) + Duration::days(CYCLE_DAYS)
}
