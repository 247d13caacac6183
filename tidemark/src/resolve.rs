use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use tidemark_core::timeseries::interpolate::extend_and_fill;
use tidemark_core::{
    Bar, DateRange, Instrument, InterpolationKind, QueryKey, Series, TidemarkError,
};

use crate::core::{QueryLog, Tidemark};

/// Per-call parameters of a resolve request.
///
/// These replace any notion of process-wide "refresh" toggles: everything
/// that varies per request is carried here explicitly.
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest {
    from: NaiveDate,
    to: NaiveDate,
    clean: bool,
    interpolate: Option<InterpolationKind>,
    latest_quote: bool,
}

impl ResolveRequest {
    /// A request for `[from, to]` with cleaning, interpolation, and quote
    /// splicing all off.
    #[must_use]
    pub const fn range(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from,
            to,
            clean: false,
            interpolate: None,
            latest_quote: false,
        }
    }

    /// Run the cleaning pipeline on the merged result.
    #[must_use]
    pub const fn clean(mut self, yes: bool) -> Self {
        self.clean = yes;
        self
    }

    /// Fill gaps and extend boundaries with the given strategy.
    #[must_use]
    pub const fn interpolate(mut self, kind: InterpolationKind) -> Self {
        self.interpolate = Some(kind);
        self
    }

    /// Splice the current real-time quote in as the most recent bar, when its
    /// date is not already represented.
    #[must_use]
    pub const fn latest_quote(mut self, yes: bool) -> Self {
        self.latest_quote = yes;
        self
    }
}

impl Tidemark {
    /// Resolve the best-available, optionally gap-free series for
    /// `instrument` over the request's date range.
    ///
    /// The flow is cache-first: the durable store is consulted before any
    /// web feed, and web feeds are then asked - in priority order - only for
    /// the tradeable dates still missing. A failing source is logged and
    /// skipped; the only failure surfaced from fetching is total absence of
    /// data, reported as `NotFound`.
    ///
    /// # Errors
    /// - `NotFound` when no source (cache or web) produced any data.
    /// - `InvalidArg` when the normalized range is empty.
    /// - `Config` for configuration problems (no safe default exists).
    pub async fn resolve(
        &self,
        instrument: &Instrument,
        request: ResolveRequest,
    ) -> Result<Series, TidemarkError> {
        if instrument.is_cash() {
            return self.flat_cash_series(instrument, &request);
        }

        // Normalize both ends to the nearest prior tradeable day.
        let range = self.normalized_range(&request)?;

        let cached = self.read_cache(instrument, range).await;
        let log = self
            .session_log
            .clone()
            .unwrap_or_else(|| Arc::new(QueryLog::new()));

        let mut series = cached.unwrap_or_else(|| Series::new(instrument.clone()));
        series = self.fetch_missing(instrument, range, series, &log).await;

        if request.latest_quote {
            self.append_latest_quote(&mut series).await;
        }

        if series.is_empty() {
            return Err(TidemarkError::not_found(format!("history for {instrument}")));
        }

        if request.clean {
            series = self.cleaning.run(series, self.rates.as_ref()).await?;
        }

        self.write_through(&series).await;

        if let Some(kind) = request.interpolate {
            series = extend_and_fill(&self.calendar, &series, kind.strategy(), &range);
        }

        Ok(series.restricted_to(&range))
    }

    fn normalized_range(&self, request: &ResolveRequest) -> Result<DateRange, TidemarkError> {
        let from = self.calendar.previous_business_day(request.from);
        let to = self.calendar.previous_business_day(request.to);
        DateRange::new(from, to)
    }

    /// Cache reads never fail the overall call; absence and store errors are
    /// both a miss.
    async fn read_cache(&self, instrument: &Instrument, range: DateRange) -> Option<Series> {
        if !self.store.is_available() {
            debug!(instrument = %instrument, "store unavailable, skipping cache read");
            return None;
        }
        match self.store.get(instrument, range).await {
            Ok(found) => found.filter(|s| !s.is_empty()),
            Err(e) => {
                warn!(instrument = %instrument, error = %e, "cache read failed");
                None
            }
        }
    }

    /// Walk the web feeds in priority order, asking each only for the
    /// tradeable dates the accumulated series does not yet cover.
    async fn fetch_missing(
        &self,
        instrument: &Instrument,
        range: DateRange,
        mut series: Series,
        log: &QueryLog,
    ) -> Series {
        for feed in &self.feeds {
            let missing = series.missing_dates(&range, &self.calendar);
            let Some((&first_missing, &last_missing)) = missing.first().zip(missing.last()) else {
                // Requested range fully covered; no reason to spend quota.
                break;
            };

            if !feed.is_available() {
                debug!(source = %feed.source(), "feed reports itself unavailable, skipping");
                continue;
            }

            // Only request the narrower missing sub-range once the cache
            // holds partial data.
            let fetch_range = if series.is_empty() {
                range
            } else {
                match DateRange::new(first_missing, last_missing) {
                    Ok(r) => r,
                    Err(_) => continue,
                }
            };

            let key = QueryKey {
                instrument: instrument.clone(),
                range: fetch_range,
                source: feed.source(),
            };
            if !log.try_claim(key).await {
                debug!(source = %feed.source(), range = %fetch_range, "already attempted this session, skipping");
                continue;
            }

            match feed.fetch(instrument, fetch_range).await {
                Ok(fetched) if fetched.is_empty() => {
                    debug!(source = %feed.source(), "feed returned an empty series");
                }
                Ok(fetched) => {
                    info!(
                        source = %feed.source(),
                        bars = fetched.len(),
                        range = %fetch_range,
                        "merged feed data"
                    );
                    series = if series.is_empty() {
                        fetched
                    } else {
                        series.merge(&fetched)
                    };
                }
                Err(e) => {
                    // A single source failure is never fatal to the request.
                    warn!(source = %feed.source(), error = %e, "feed fetch failed, trying next source");
                }
            }
        }
        series
    }

    async fn append_latest_quote(&self, series: &mut Series) {
        let Some(feed) = &self.quote_feed else {
            return;
        };
        if !feed.is_available() {
            debug!("quote feed unavailable, skipping latest quote");
            return;
        }
        match feed.current_quote(series.instrument()).await {
            Ok(quote) => {
                if series.dates().contains(&quote.trade_date) {
                    return;
                }
                let bar = quote.to_bar("Latest quote");
                let mut bars = series.bars().to_vec();
                bars.push(bar);
                *series = series.clone().with_bars(bars);
            }
            Err(e) => warn!(instrument = %series.instrument(), error = %e, "failed to populate latest quote"),
        }
    }

    /// Best-effort write-through; a persist failure must not prevent
    /// returning already-fetched data.
    async fn write_through(&self, series: &Series) {
        if !self.store.is_available() {
            return;
        }
        if let Err(e) = self.store.store(series).await {
            warn!(instrument = %series.instrument(), error = %e, "cache write failed");
        }
    }

    /// Synthesize a flat unit-value series for the cash instrument; no
    /// network or cache lookup is involved.
    fn flat_cash_series(
        &self,
        instrument: &Instrument,
        request: &ResolveRequest,
    ) -> Result<Series, TidemarkError> {
        let range = self.normalized_range(request)?;
        let seed = Series::from_bars(
            instrument.clone(),
            vec![Bar::flat(range.to(), Decimal::ONE, 0, "Manually created")],
        );
        let flat = extend_and_fill(
            &self.calendar,
            &seed,
            InterpolationKind::Flat.strategy(),
            &range,
        );
        Ok(flat.restricted_to(&range))
    }
}
