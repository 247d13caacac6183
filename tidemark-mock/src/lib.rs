//! Scripted mock backends for integration tests: a [`MockFeed`] source feed
//! with forced-failure and availability switches plus per-call recording,
//! and a fixed-value [`MockQuoteFeed`].
#![warn(missing_docs)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use tidemark_core::{
    Bar, Currency, DateRange, Instrument, Quote, QuoteFeed, Series, Source, SourceFeed,
    TidemarkError,
};

/// Build a flat OHLC bar for tests: `close` whole units, volume 100.
///
/// # Panics
/// Panics on an unparseable date; test fixtures use literal dates.
#[must_use]
pub fn daily_bar(date: &str, close: i64) -> Bar {
    Bar::flat(
        date.parse::<NaiveDate>().expect("literal test date"),
        Decimal::from(close),
        100,
        "mock",
    )
}

type FetchFn =
    dyn Fn(&Instrument, DateRange) -> Result<Series, TidemarkError> + Send + Sync + 'static;

/// Simple scripted source feed used by integration tests.
///
/// Serves a fixed bar list restricted to each requested range, or a custom
/// closure; can be switched unavailable or made to fail every fetch. Every
/// fetch's range is recorded so tests can assert sub-range narrowing and
/// session-level fetch suppression.
pub struct MockFeed {
    source: Source,
    available: AtomicBool,
    fail: bool,
    bars: Vec<Bar>,
    currency: Option<Currency>,
    fetch_fn: Option<Arc<FetchFn>>,
    calls: Mutex<Vec<DateRange>>,
}

impl MockFeed {
    /// An available, empty-handed feed for `source`.
    #[must_use]
    pub fn new(source: Source) -> Self {
        Self {
            source,
            available: AtomicBool::new(true),
            fail: false,
            bars: vec![],
            currency: None,
            fetch_fn: None,
            calls: Mutex::new(vec![]),
        }
    }

    /// Serve these bars (restricted per request).
    #[must_use]
    pub fn with_bars(mut self, bars: Vec<Bar>) -> Self {
        self.bars = bars;
        self
    }

    /// Tag served series with this currency instead of the instrument's.
    #[must_use]
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    /// Replace the canned response with a closure.
    #[must_use]
    pub fn with_fetch<F>(mut self, f: F) -> Self
    where
        F: Fn(&Instrument, DateRange) -> Result<Series, TidemarkError> + Send + Sync + 'static,
    {
        self.fetch_fn = Some(Arc::new(f));
        self
    }

    /// Make every fetch fail with a feed error.
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Report the feed as unavailable.
    #[must_use]
    pub fn unavailable(self) -> Self {
        self.available.store(false, Ordering::SeqCst);
        self
    }

    /// Flip availability at runtime.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Ranges of every fetch received, in order.
    pub async fn calls(&self) -> Vec<DateRange> {
        self.calls.lock().await.clone()
    }

    /// Number of fetches received.
    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl SourceFeed for MockFeed {
    fn source(&self) -> Source {
        self.source
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn fetch(
        &self,
        instrument: &Instrument,
        range: DateRange,
    ) -> Result<Series, TidemarkError> {
        self.calls.lock().await.push(range);
        if self.fail {
            return Err(TidemarkError::feed(self.source, "forced failure"));
        }
        if let Some(f) = &self.fetch_fn {
            return f(instrument, range);
        }
        let bars: Vec<Bar> = self
            .bars
            .iter()
            .filter(|b| range.contains(b.date))
            .cloned()
            .collect();
        let currency = self
            .currency
            .clone()
            .unwrap_or_else(|| instrument.currency().clone());
        Ok(Series::from_bars_in(instrument.clone(), currency, bars))
    }
}

/// Fixed-value quote feed.
pub struct MockQuoteFeed {
    quote: Quote,
    available: bool,
}

impl MockQuoteFeed {
    /// A feed serving `quote` for every instrument.
    #[must_use]
    pub fn new(quote: Quote) -> Self {
        Self {
            quote,
            available: true,
        }
    }

    /// Report the feed as unavailable.
    #[must_use]
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }
}

#[async_trait]
impl QuoteFeed for MockQuoteFeed {
    async fn current_quote(&self, _instrument: &Instrument) -> Result<Quote, TidemarkError> {
        Ok(self.quote.clone())
    }

    fn is_available(&self) -> bool {
        self.available
    }
}
