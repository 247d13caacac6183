use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tidemark_core::{Bar, Instrument, Series, merge};

fn day(offset: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Days::new(offset)
}

fn bar(offset: u64, cents: i64) -> Bar {
    Bar::flat(day(offset), Decimal::new(cents, 2), 100, "fetched")
}

fn arb_bars() -> impl Strategy<Value = Vec<Bar>> {
    proptest::collection::vec((0u64..250, 1i64..100_000), 0..60)
        .prop_map(|raw| raw.into_iter().map(|(off, c)| bar(off, c)).collect())
}

fn series(bars: Vec<Bar>) -> Series {
    Series::from_bars(Instrument::equity("ABC"), bars)
}

proptest! {
    #[test]
    fn merge_is_idempotent(a in arb_bars(), b in arb_bars()) {
        let a = series(a);
        let b = series(b);
        let once = merge(&a, &b);
        let twice = merge(&once, &b);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn existing_wins_on_conflict(a in arb_bars(), b in arb_bars()) {
        let a = series(a);
        let b = series(b);
        let a_by_date: BTreeMap<_, _> = a.bars().iter().map(|x| (x.date, x.close)).collect();
        let merged = merge(&a, &b);
        for bar in merged.bars() {
            if let Some(expected) = a_by_date.get(&bar.date) {
                prop_assert_eq!(&bar.close, expected);
            }
        }
    }

    #[test]
    fn no_duplicate_dates_and_sorted(a in arb_bars(), b in arb_bars()) {
        let merged = merge(&series(a), &series(b));
        let mut prev: Option<NaiveDate> = None;
        for bar in merged.bars() {
            if let Some(p) = prev {
                prop_assert!(p < bar.date);
            }
            prev = Some(bar.date);
        }
    }

    #[test]
    fn merged_dates_are_the_union(a in arb_bars(), b in arb_bars()) {
        let a = series(a);
        let b = series(b);
        let merged = merge(&a, &b);
        let mut expected = a.dates();
        expected.extend(b.dates());
        prop_assert_eq!(merged.dates(), expected);
    }
}

#[test]
fn zero_close_incoming_is_skipped() {
    let existing = series(vec![bar(0, 10_000)]);
    let incoming = series(vec![Bar::flat(day(1), Decimal::ZERO, 0, "sentinel"), bar(2, 10_100)]);
    let merged = merge(&existing, &incoming);
    assert_eq!(merged.len(), 2);
    assert!(!merged.dates().contains(&day(1)));
}

#[test]
fn conflicting_value_keeps_the_cached_one() {
    let cached = series(vec![bar(0, 10_000)]);
    let fetched = series(vec![bar(0, 99_999)]);
    let merged = merge(&cached, &fetched);
    assert_eq!(merged.bars()[0].close, Decimal::new(10_000, 2));
}
