use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::Mutex;

use tidemark_core::{
    BusinessCalendar, DataStore, EnvExchangeRates, ExchangeRates, QueryKey, QuoteFeed, SourceFeed,
    TidemarkError, timeseries::clean::CleaningPipeline,
};

/// Concurrency-safe record of `(instrument, range, source)` fetch attempts.
///
/// Claiming a key is an atomic insert-if-absent: two concurrent requests for
/// the same key cannot both believe the fetch is still pending. By default a
/// fresh log is created per `resolve` call; inject one via
/// [`TidemarkBuilder::share_query_log`] to suppress repeat fetches across a
/// batch of calls.
#[derive(Debug, Default)]
pub struct QueryLog {
    seen: Mutex<HashSet<QueryKey>>,
}

impl QueryLog {
    /// An empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key`, returning `false` when it was already attempted.
    pub async fn try_claim(&self, key: QueryKey) -> bool {
        self.seen.lock().await.insert(key)
    }
}

/// Orchestrator that reconciles price history across a durable store and a
/// prioritized list of web source feeds.
pub struct Tidemark {
    pub(crate) store: Arc<dyn DataStore>,
    pub(crate) feeds: Vec<Arc<dyn SourceFeed>>,
    pub(crate) quote_feed: Option<Arc<dyn QuoteFeed>>,
    pub(crate) rates: Arc<dyn ExchangeRates>,
    pub(crate) calendar: Arc<BusinessCalendar>,
    pub(crate) cleaning: CleaningPipeline,
    pub(crate) session_log: Option<Arc<QueryLog>>,
}

impl std::fmt::Debug for Tidemark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tidemark")
            .field("feeds", &self.feeds.len())
            .field("quote_feed", &self.quote_feed.is_some())
            .field("cleaning", &self.cleaning)
            .field("session_log", &self.session_log.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for constructing a [`Tidemark`] orchestrator.
pub struct TidemarkBuilder {
    store: Option<Arc<dyn DataStore>>,
    feeds: Vec<Arc<dyn SourceFeed>>,
    quote_feed: Option<Arc<dyn QuoteFeed>>,
    rates: Arc<dyn ExchangeRates>,
    calendar: Arc<BusinessCalendar>,
    cleaning: CleaningPipeline,
    session_log: Option<Arc<QueryLog>>,
}

impl Default for TidemarkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TidemarkBuilder {
    /// Create a builder with a weekends-only calendar, environment-backed
    /// exchange rates, default cleaning thresholds, and no feeds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: None,
            feeds: vec![],
            quote_feed: None,
            rates: Arc::new(EnvExchangeRates),
            calendar: Arc::new(BusinessCalendar::weekends_only()),
            cleaning: CleaningPipeline::default(),
            session_log: None,
        }
    }

    /// Set the durable store. Required; resolve is cache-first and persists
    /// its result back through this store.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn DataStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Register a web source feed. Feeds are consulted in [`Source`]
    /// precedence order (registration order breaks ties); later feeds are
    /// only asked for dates the earlier ones left missing.
    ///
    /// [`Source`]: tidemark_core::Source
    #[must_use]
    pub fn with_feed(mut self, feed: Arc<dyn SourceFeed>) -> Self {
        self.feeds.push(feed);
        self
    }

    /// Set the real-time quote capability used to splice today's price onto
    /// the series when a request asks for it.
    #[must_use]
    pub fn with_quote_feed(mut self, feed: Arc<dyn QuoteFeed>) -> Self {
        self.quote_feed = Some(feed);
        self
    }

    /// Replace the exchange-rate capability used by currency normalization.
    #[must_use]
    pub fn with_rates(mut self, rates: Arc<dyn ExchangeRates>) -> Self {
        self.rates = rates;
        self
    }

    /// Replace the business calendar (market holiday set).
    #[must_use]
    pub fn with_calendar(mut self, calendar: Arc<BusinessCalendar>) -> Self {
        self.calendar = calendar;
        self
    }

    /// Override the scale-correction outlier threshold used when cleaning.
    #[must_use]
    pub fn scale_threshold(mut self, threshold: Decimal) -> Self {
        self.cleaning = CleaningPipeline::with_scale_threshold(threshold);
        self
    }

    /// Share a fetch-suppression log across every resolve call made through
    /// the built orchestrator. Without this, each call gets its own log.
    #[must_use]
    pub fn share_query_log(mut self, log: Arc<QueryLog>) -> Self {
        self.session_log = Some(log);
        self
    }

    /// Build the orchestrator.
    ///
    /// # Errors
    /// Returns `Config` when no durable store has been registered.
    pub fn build(mut self) -> Result<Tidemark, TidemarkError> {
        let store = self.store.ok_or_else(|| {
            TidemarkError::Config("no durable store registered; add one via with_store(...)".into())
        })?;
        // Fixed provider precedence; stable sort keeps registration order
        // among feeds of the same source.
        self.feeds.sort_by_key(|f| f.source().precedence());
        Ok(Tidemark {
            store,
            feeds: self.feeds,
            quote_feed: self.quote_feed,
            rates: self.rates,
            calendar: self.calendar,
            cleaning: self.cleaning,
            session_log: self.session_log,
        })
    }
}

impl Tidemark {
    /// Start building a new orchestrator.
    #[must_use]
    pub fn builder() -> TidemarkBuilder {
        TidemarkBuilder::new()
    }

    /// The business calendar in use.
    #[must_use]
    pub fn calendar(&self) -> &BusinessCalendar {
        &self.calendar
    }
}
