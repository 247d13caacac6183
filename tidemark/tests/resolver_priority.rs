use std::sync::Arc;

use chrono::NaiveDate;
use tidemark::{ResolveRequest, Tidemark};
use tidemark_core::{Instrument, Source};
use tidemark_mock::{MockFeed, daily_bar};
use tidemark_store::MemoryStore;

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn request() -> ResolveRequest {
    ResolveRequest::range(d("2024-01-02"), d("2024-01-05"))
}

#[tokio::test]
async fn first_feed_with_data_wins() {
    let ft = Arc::new(
        MockFeed::new(Source::Ft).with_bars(vec![daily_bar("2024-01-02", 100), daily_bar("2024-01-03", 101), daily_bar("2024-01-04", 102), daily_bar("2024-01-05", 103)]),
    );
    let stooq = Arc::new(MockFeed::new(Source::Stooq).with_bars(vec![daily_bar("2024-01-02", 999)]));

    let tidemark = Tidemark::builder()
        .with_store(Arc::new(MemoryStore::new()))
        .with_feed(ft.clone())
        .with_feed(stooq.clone())
        .build()
        .unwrap();

    let series = tidemark
        .resolve(&Instrument::equity("ABC"), request())
        .await
        .unwrap();

    assert_eq!(series.len(), 4);
    assert_eq!(series.bars()[0].close, rust_decimal::Decimal::from(100));
    // The higher-priority feed covered the range, so the next one is never asked.
    assert_eq!(stooq.call_count().await, 0);
}

#[tokio::test]
async fn failing_feed_falls_through_to_the_next() {
    let ft = Arc::new(MockFeed::new(Source::Ft).failing());
    let stooq = Arc::new(MockFeed::new(Source::Stooq).with_bars(vec![daily_bar("2024-01-03", 42)]));

    let tidemark = Tidemark::builder()
        .with_store(Arc::new(MemoryStore::new()))
        .with_feed(ft.clone())
        .with_feed(stooq.clone())
        .build()
        .unwrap();

    let series = tidemark
        .resolve(&Instrument::equity("ABC"), request())
        .await
        .unwrap();

    assert_eq!(ft.call_count().await, 1);
    assert_eq!(stooq.call_count().await, 1);
    assert_eq!(series.len(), 1);
    assert_eq!(series.bars()[0].date, d("2024-01-03"));
}

#[tokio::test]
async fn unavailable_feed_is_never_asked() {
    let ft = Arc::new(MockFeed::new(Source::Ft).unavailable());
    let stooq = Arc::new(MockFeed::new(Source::Stooq).with_bars(vec![daily_bar("2024-01-03", 42)]));

    let tidemark = Tidemark::builder()
        .with_store(Arc::new(MemoryStore::new()))
        .with_feed(ft.clone())
        .with_feed(stooq.clone())
        .build()
        .unwrap();

    tidemark
        .resolve(&Instrument::equity("ABC"), request())
        .await
        .unwrap();

    assert_eq!(ft.call_count().await, 0);
    assert_eq!(stooq.call_count().await, 1);
}

#[tokio::test]
async fn later_feeds_only_backfill_missing_dates() {
    let ft = Arc::new(MockFeed::new(Source::Ft).with_bars(vec![daily_bar("2024-01-02", 100), daily_bar("2024-01-03", 101)]));
    let stooq = Arc::new(MockFeed::new(Source::Stooq).with_bars(vec![
        daily_bar("2024-01-03", 999), // outside the narrowed range: never fetched
        daily_bar("2024-01-04", 102),
        daily_bar("2024-01-05", 103),
    ]));

    let tidemark = Tidemark::builder()
        .with_store(Arc::new(MemoryStore::new()))
        .with_feed(ft.clone())
        .with_feed(stooq.clone())
        .build()
        .unwrap();

    let series = tidemark
        .resolve(&Instrument::equity("ABC"), request())
        .await
        .unwrap();

    assert_eq!(series.len(), 4);
    let jan3 = series.bars().iter().find(|b| b.date == d("2024-01-03")).unwrap();
    assert_eq!(jan3.close, rust_decimal::Decimal::from(101));
    // The second feed was asked only for the missing tail.
    let calls = stooq.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].from(), d("2024-01-04"));
    assert_eq!(calls[0].to(), d("2024-01-05"));
}

#[tokio::test]
async fn source_precedence_overrides_registration_order() {
    // Stooq registered first, but Ft carries the higher fixed precedence.
    let stooq = Arc::new(MockFeed::new(Source::Stooq).with_bars(vec![daily_bar("2024-01-03", 999)]));
    let ft = Arc::new(MockFeed::new(Source::Ft).with_bars(vec![daily_bar("2024-01-03", 101)]));

    let tidemark = Tidemark::builder()
        .with_store(Arc::new(MemoryStore::new()))
        .with_feed(stooq)
        .with_feed(ft)
        .build()
        .unwrap();

    let series = tidemark
        .resolve(&Instrument::equity("ABC"), request())
        .await
        .unwrap();

    assert_eq!(series.bars()[0].close, rust_decimal::Decimal::from(101));
}

#[tokio::test]
async fn build_without_store_is_a_config_error() {
    let err = Tidemark::builder().build().unwrap_err();
    assert!(matches!(err, tidemark_core::TidemarkError::Config(_)));
}
