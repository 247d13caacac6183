use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::TidemarkError;
use crate::calendar::BusinessCalendar;
use crate::instrument::{Currency, Instrument};
use crate::timeseries::util::round_price;

/// One OHLCV observation for one business day.
///
/// The `comment` field is free-text provenance: which source or transform
/// produced the bar, e.g. `"Interpolated from 2024-01-02 to 2024-01-05"`.
/// Raw sources may deliver bars whose high/low do not bracket open/close;
/// repairing that is the cleaning pipeline's job, not a constructor invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    /// Business day this observation covers.
    pub date: NaiveDate,
    /// Opening price.
    pub open: Decimal,
    /// Intraday high.
    pub high: Decimal,
    /// Intraday low.
    pub low: Decimal,
    /// Closing price.
    pub close: Decimal,
    /// Traded volume; 0 for synthetic bars.
    pub volume: u64,
    /// Provenance of the observation.
    pub comment: String,
}

impl Bar {
    /// A bar with identical OHLC values, as delivered by sources that only
    /// publish a single daily price.
    #[must_use]
    pub fn flat(date: NaiveDate, price: Decimal, volume: u64, comment: impl Into<String>) -> Self {
        Self {
            date,
            open: price,
            high: price,
            low: price,
            close: price,
            volume,
            comment: comment.into(),
        }
    }

    /// A synthetic bar built from interpolated open/close values.
    ///
    /// Prices are rounded to two decimal places (half-even) and high/low are
    /// derived from the open/close pair; volume is zero since nothing traded.
    #[must_use]
    pub fn synthetic(
        date: NaiveDate,
        open: Decimal,
        close: Decimal,
        comment: impl Into<String>,
    ) -> Self {
        let open = round_price(open);
        let close = round_price(close);
        Self {
            date,
            open,
            high: open.max(close),
            low: open.min(close),
            close,
            volume: 0,
            comment: comment.into(),
        }
    }

    /// Multiply every price field by `factor`, keeping date/volume and
    /// replacing the comment.
    #[must_use]
    pub fn scaled(&self, factor: Decimal, comment: impl Into<String>) -> Self {
        Self {
            date: self.date,
            open: self.open * factor,
            high: self.high * factor,
            low: self.low * factor,
            close: self.close * factor,
            volume: self.volume,
            comment: comment.into(),
        }
    }
}

/// A point-in-time quote from a real-time quote capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Last traded price.
    pub price: Decimal,
    /// Session open.
    pub open: Decimal,
    /// Session high so far.
    pub day_high: Decimal,
    /// Session low so far.
    pub day_low: Decimal,
    /// Session volume so far.
    pub volume: u64,
    /// Date of the last trade.
    pub trade_date: NaiveDate,
}

impl Quote {
    /// Convert the quote into a bar for splicing onto a daily series.
    #[must_use]
    pub fn to_bar(&self, comment: impl Into<String>) -> Bar {
        Bar {
            date: self.trade_date,
            open: self.open,
            high: self.day_high,
            low: self.day_low,
            close: self.price,
            volume: self.volume,
            comment: comment.into(),
        }
    }
}

/// An inclusive `[from, to]` pair over calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    /// Build a range.
    ///
    /// # Errors
    /// Returns `InvalidArg` when `from` is after `to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, TidemarkError> {
        if from > to {
            return Err(TidemarkError::InvalidArg(format!(
                "date range start {from} is after end {to}"
            )));
        }
        Ok(Self { from, to })
    }

    /// Inclusive start.
    #[must_use]
    pub const fn from(&self) -> NaiveDate {
        self.from
    }

    /// Inclusive end.
    #[must_use]
    pub const fn to(&self) -> NaiveDate {
        self.to
    }

    /// True when `date` lies within `[from, to]`.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// The tradeable dates within the range, in ascending order.
    #[must_use]
    pub fn business_days(&self, calendar: &BusinessCalendar) -> Vec<NaiveDate> {
        calendar.iter(self.from, self.to).collect()
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.from, self.to)
    }
}

/// Identity of one fetch attempt within an orchestration session, used to
/// suppress redundant repeated network calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    /// Instrument the fetch was for.
    pub instrument: Instrument,
    /// Exact range requested from the source.
    pub range: DateRange,
    /// Source that was asked.
    pub source: crate::instrument::Source,
}

/// An ordered, date-deduplicated sequence of bars for exactly one instrument.
///
/// Invariants: at most one bar per date, sorted ascending by date. The series
/// also records the currency its prices are quoted in, which may differ from
/// the instrument's declared currency until the cleaning pipeline normalizes
/// it. Pipeline stages (merge, clean, interpolate) never mutate in place;
/// each returns a new invariant-respecting `Series`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    instrument: Instrument,
    currency: Currency,
    bars: Vec<Bar>,
}

impl Series {
    /// An empty series quoted in the instrument's declared currency.
    #[must_use]
    pub fn new(instrument: Instrument) -> Self {
        let currency = instrument.currency().clone();
        Self {
            instrument,
            currency,
            bars: Vec::new(),
        }
    }

    /// Build a series from unordered bars: sorts ascending and drops
    /// duplicate dates, keeping the earliest-seen bar for each date.
    #[must_use]
    pub fn from_bars(instrument: Instrument, bars: Vec<Bar>) -> Self {
        let currency = instrument.currency().clone();
        Self {
            instrument,
            currency,
            bars: crate::timeseries::util::sort_and_dedup(bars),
        }
    }

    /// Same as [`from_bars`](Self::from_bars) but with an explicit recorded
    /// currency, for sources that quote in something other than the
    /// instrument's declared currency.
    #[must_use]
    pub fn from_bars_in(instrument: Instrument, currency: Currency, bars: Vec<Bar>) -> Self {
        Self {
            instrument,
            currency,
            bars: crate::timeseries::util::sort_and_dedup(bars),
        }
    }

    /// The instrument this series belongs to.
    #[must_use]
    pub const fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    /// Currency the prices are currently quoted in.
    #[must_use]
    pub const fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Replace the recorded currency tag. Prices are not touched; callers are
    /// expected to have rescaled them already.
    #[must_use]
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Replace the bars wholesale, re-establishing sort/dedup invariants.
    #[must_use]
    pub fn with_bars(mut self, bars: Vec<Bar>) -> Self {
        self.bars = crate::timeseries::util::sort_and_dedup(bars);
        self
    }

    /// The bars, ascending by date.
    #[must_use]
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Consume the series, yielding its bars.
    #[must_use]
    pub fn into_bars(self) -> Vec<Bar> {
        self.bars
    }

    /// Number of bars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// True when the series holds no bars.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// The earliest bar, if any.
    #[must_use]
    pub fn oldest(&self) -> Option<&Bar> {
        self.bars.first()
    }

    /// The most recent bar, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Set of dates with data.
    #[must_use]
    pub fn dates(&self) -> BTreeSet<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    /// The tradeable dates within `range` that have no bar yet.
    #[must_use]
    pub fn missing_dates(&self, range: &DateRange, calendar: &BusinessCalendar) -> Vec<NaiveDate> {
        let have = self.dates();
        range
            .business_days(calendar)
            .into_iter()
            .filter(|d| !have.contains(d))
            .collect()
    }

    /// True when every tradeable date of `range` already has a bar.
    #[must_use]
    pub fn covers(&self, range: &DateRange, calendar: &BusinessCalendar) -> bool {
        self.missing_dates(range, calendar).is_empty()
    }

    /// A new series restricted to bars within `range`, order preserved.
    #[must_use]
    pub fn restricted_to(&self, range: &DateRange) -> Self {
        Self {
            instrument: self.instrument.clone(),
            currency: self.currency.clone(),
            bars: self
                .bars
                .iter()
                .filter(|b| range.contains(b.date))
                .cloned()
                .collect(),
        }
    }

    /// Merge `incoming` into this series; see
    /// [`timeseries::merge::merge`](crate::timeseries::merge::merge).
    #[must_use]
    pub fn merge(&self, incoming: &Self) -> Self {
        crate::timeseries::merge::merge(self, incoming)
    }
}
