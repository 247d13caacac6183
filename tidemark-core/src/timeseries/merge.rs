use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::series::{Bar, Series};

/// Merge `incoming` into `existing` for the same instrument.
///
/// - Bars are keyed by date; `existing` always wins on conflict. The cache is
///   treated as more trustworthy than a fresh fetch for a date it already
///   covers, which stops a flaky source from silently overwriting validated
///   history.
/// - Incoming bars with a zero close are sentinel "no data" rows and are
///   never inserted.
/// - The result is sorted ascending with at most one bar per date.
/// - Idempotent: merging the same incoming series twice yields the same
///   result as merging it once.
#[must_use]
pub fn merge(existing: &Series, incoming: &Series) -> Series {
    let merged = merge_bars(existing.bars().to_vec(), incoming.bars().to_vec());
    Series::from_bars_in(
        existing.instrument().clone(),
        existing.currency().clone(),
        merged,
    )
}

/// Bar-level merge with the same first-wins, zero-close-skipping semantics as
/// [`merge`].
#[must_use]
pub fn merge_bars(existing: Vec<Bar>, incoming: Vec<Bar>) -> Vec<Bar> {
    let mut by_date: BTreeMap<NaiveDate, Bar> = BTreeMap::new();
    for bar in existing {
        if let Entry::Vacant(v) = by_date.entry(bar.date) {
            v.insert(bar);
        }
    }
    for bar in incoming {
        if bar.close == Decimal::ZERO {
            continue;
        }
        if let Entry::Vacant(v) = by_date.entry(bar.date) {
            v.insert(bar);
        }
    }
    by_date.into_values().collect()
}

// Inline tests removed; covered by property tests in `tidemark-core/tests/`.
