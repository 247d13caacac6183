use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tidemark::{ResolveRequest, Tidemark};
use tidemark_core::{DataStore, DateRange, Instrument, Series, Source};
use tidemark_mock::{MockFeed, daily_bar};
use tidemark_store::MemoryStore;

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn abc() -> Instrument {
    Instrument::equity("ABC")
}

fn request() -> ResolveRequest {
    ResolveRequest::range(d("2024-01-02"), d("2024-01-05"))
}

async fn seeded_store(bars: Vec<tidemark_core::Bar>) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.store(&Series::from_bars(abc(), bars)).await.unwrap();
    store
}

#[tokio::test]
async fn fully_cached_range_never_touches_the_web() {
    let store = seeded_store(vec![
        daily_bar("2024-01-02", 100),
        daily_bar("2024-01-03", 101),
        daily_bar("2024-01-04", 102),
        daily_bar("2024-01-05", 103),
    ])
    .await;
    let ft = Arc::new(MockFeed::new(Source::Ft).with_bars(vec![daily_bar("2024-01-02", 999)]));

    let tidemark = Tidemark::builder()
        .with_store(store)
        .with_feed(ft.clone())
        .build()
        .unwrap();

    let series = tidemark.resolve(&abc(), request()).await.unwrap();
    assert_eq!(series.len(), 4);
    assert_eq!(ft.call_count().await, 0);
}

#[tokio::test]
async fn partial_cache_requests_only_the_missing_subrange() {
    let store = seeded_store(vec![daily_bar("2024-01-02", 100), daily_bar("2024-01-03", 101)]).await;
    let ft = Arc::new(MockFeed::new(Source::Ft).with_bars(vec![
        daily_bar("2024-01-04", 102),
        daily_bar("2024-01-05", 103),
    ]));

    let tidemark = Tidemark::builder()
        .with_store(store)
        .with_feed(ft.clone())
        .build()
        .unwrap();

    let series = tidemark.resolve(&abc(), request()).await.unwrap();
    assert_eq!(series.len(), 4);

    let calls = ft.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0], DateRange::new(d("2024-01-04"), d("2024-01-05")).unwrap());
}

#[tokio::test]
async fn cached_values_win_over_fresh_fetches() {
    let store = seeded_store(vec![daily_bar("2024-01-03", 101)]).await;
    let ft = Arc::new(MockFeed::new(Source::Ft).with_bars(vec![
        daily_bar("2024-01-02", 100),
        daily_bar("2024-01-03", 999),
        daily_bar("2024-01-04", 102),
        daily_bar("2024-01-05", 103),
    ]));

    let tidemark = Tidemark::builder()
        .with_store(store)
        .with_feed(ft)
        .build()
        .unwrap();

    let series = tidemark.resolve(&abc(), request()).await.unwrap();
    let jan3 = series.bars().iter().find(|b| b.date == d("2024-01-03")).unwrap();
    assert_eq!(jan3.close, Decimal::from(101));
}

#[tokio::test]
async fn result_is_written_through_to_the_store() {
    let store = Arc::new(MemoryStore::new());
    let ft = Arc::new(MockFeed::new(Source::Ft).with_bars(vec![daily_bar("2024-01-03", 42)]));

    let tidemark = Tidemark::builder()
        .with_store(store.clone())
        .with_feed(ft)
        .build()
        .unwrap();

    tidemark.resolve(&abc(), request()).await.unwrap();

    let persisted = store.snapshot(&abc()).await.unwrap();
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted.bars()[0].date, d("2024-01-03"));
}

#[tokio::test]
async fn unavailable_store_degrades_to_fetch_only() {
    let store = Arc::new(MemoryStore::new());
    store
        .store(&Series::from_bars(abc(), vec![daily_bar("2024-01-02", 100)]))
        .await
        .unwrap();
    store.set_available(false);
    let ft = Arc::new(MockFeed::new(Source::Ft).with_bars(vec![daily_bar("2024-01-03", 42)]));

    let tidemark = Tidemark::builder()
        .with_store(store.clone())
        .with_feed(ft.clone())
        .build()
        .unwrap();

    // Cache read is skipped, the web result is still returned, and the failed
    // write-through does not fail the call.
    let series = tidemark.resolve(&abc(), request()).await.unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series.bars()[0].date, d("2024-01-03"));
    assert_eq!(ft.calls().await[0], DateRange::new(d("2024-01-02"), d("2024-01-05")).unwrap());
}
