use std::sync::Arc;

use chrono::NaiveDate;
use tidemark::{QueryLog, ResolveRequest, Tidemark};
use tidemark_core::{Instrument, InterpolationKind, Source};
use tidemark_mock::{MockFeed, daily_bar};
use tidemark_store::MemoryStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // 1. Two scripted web feeds: the first is down, the second has a partial
    //    series with a gap on the Wednesday.
    let ft = Arc::new(MockFeed::new(Source::Ft).failing());
    let stooq = Arc::new(MockFeed::new(Source::Stooq).with_bars(vec![
        daily_bar("2024-01-02", 100),
        daily_bar("2024-01-04", 110),
        daily_bar("2024-01-05", 112),
    ]));
    let store = Arc::new(MemoryStore::new());

    // 2. Build the orchestrator; feeds are tried in source-precedence order.
    //    Sharing a query log makes the whole run one fetch-suppression session.
    let tidemark = Tidemark::builder()
        .with_store(store.clone())
        .with_feed(ft)
        .with_feed(stooq.clone())
        .share_query_log(Arc::new(QueryLog::new()))
        .build()?;

    // 3. Ask for a clean, gap-free week.
    let instrument = Instrument::equity("ABC");
    let from: NaiveDate = "2024-01-01".parse()?;
    let to: NaiveDate = "2024-01-05".parse()?;
    let request = ResolveRequest::range(from, to)
        .clean(true)
        .interpolate(InterpolationKind::Linear);

    let series = tidemark.resolve(&instrument, request).await?;

    println!("## Resolved series for {instrument} ({} bars):", series.len());
    for bar in series.bars() {
        println!(" - {}  close {:>8}  [{}]", bar.date, bar.close, bar.comment);
    }

    // 4. The result was written through; an identical request is now served
    //    from the durable store.
    let again = tidemark.resolve(&instrument, request).await?;
    println!(
        "\nSecond call served {} bars with {} web fetches of the lower-priority feed.",
        again.len(),
        stooq.call_count().await
    );

    Ok(())
}
