use async_trait::async_trait;

use crate::TidemarkError;
use crate::instrument::{Currency, Instrument, Source};
use crate::series::{DateRange, Quote, Series};
use rust_decimal::Decimal;

/// Capability interface implemented by every price-history backend: the
/// cache-backed store adapter and each web feed.
///
/// Behavior is composed via the orchestrator's explicit priority list rather
/// than an inheritance hierarchy; a backend that also serves real-time
/// quotes advertises that by overriding [`as_quote_feed`](Self::as_quote_feed).
#[async_trait]
pub trait SourceFeed: Send + Sync {
    /// Stable provider identity, used for precedence, suppression keys, and
    /// provenance comments.
    fn source(&self) -> Source;

    /// Cheap, side-effect-free availability pre-check. An unavailable feed is
    /// skipped without being asked for data.
    fn is_available(&self) -> bool;

    /// Fetch the series for `instrument` over the inclusive `range`.
    ///
    /// # Errors
    /// Fails on any network, parse, or auth problem. A failure here is never
    /// fatal to the overall request; the orchestrator logs it and moves on.
    async fn fetch(&self, instrument: &Instrument, range: DateRange)
    -> Result<Series, TidemarkError>;

    /// Advertise quote capability by returning a usable trait object
    /// reference when supported.
    fn as_quote_feed(&self) -> Option<&dyn QuoteFeed> {
        None
    }
}

/// Real-time quote capability.
#[async_trait]
pub trait QuoteFeed: Send + Sync {
    /// Fetch the current quote for `instrument`.
    ///
    /// # Errors
    /// Fails when the quote is unavailable or cannot be parsed.
    async fn current_quote(&self, instrument: &Instrument) -> Result<Quote, TidemarkError>;

    /// Cheap, side-effect-free availability pre-check.
    fn is_available(&self) -> bool;
}

/// Injectable exchange-rate lookup used by currency normalization.
///
/// Implementations return a multiplicative rate: a price in `from` times the
/// rate is the price in `to`. GBX never reaches an implementation; the
/// cleaning pipeline folds the exact pence/pounds factor in itself.
#[async_trait]
pub trait ExchangeRates: Send + Sync {
    /// The multiplicative conversion rate from `from` to `to`.
    ///
    /// # Errors
    /// Fails when no rate can be obtained for the pair.
    async fn rate(&self, from: &Currency, to: &Currency) -> Result<Decimal, TidemarkError>;
}

/// Durable store contract: a [`SourceFeed`]-shaped read path plus existence
/// checks and write-through persistence.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Read the stored series for `instrument`, restricted to `range`.
    /// Absence is a normal outcome, not an error.
    ///
    /// # Errors
    /// Fails only on store-level problems (I/O, transport); the orchestrator
    /// treats those as a cache miss.
    async fn get(
        &self,
        instrument: &Instrument,
        range: DateRange,
    ) -> Result<Option<Series>, TidemarkError>;

    /// Whether any series is already stored for `instrument`.
    ///
    /// # Errors
    /// Fails on store-level problems.
    async fn contains(&self, instrument: &Instrument) -> Result<bool, TidemarkError>;

    /// Persist `series`, overwriting at instrument granularity
    /// (last-writer-wins).
    ///
    /// # Errors
    /// Fails on store-level problems; callers treat this as a best-effort
    /// cache-write failure.
    async fn store(&self, series: &Series) -> Result<(), TidemarkError>;

    /// Cheap, side-effect-free availability pre-check (a configuration or
    /// filesystem check, never a connectivity probe).
    fn is_available(&self) -> bool;
}
