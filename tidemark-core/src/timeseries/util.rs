use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::series::Bar;

/// Round a price to two decimal places, half-even. This is the fixed
/// rendering precision of synthetic bars and the persisted series format.
#[must_use]
pub fn round_price(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// Sort bars ascending by date and drop duplicate dates, keeping the
/// earliest-seen bar for each date.
#[must_use]
pub fn sort_and_dedup(bars: Vec<Bar>) -> Vec<Bar> {
    let mut by_date: BTreeMap<NaiveDate, Bar> = BTreeMap::new();
    for bar in bars {
        if let Entry::Vacant(v) = by_date.entry(bar.date) {
            v.insert(bar);
        }
    }
    by_date.into_values().collect()
}
