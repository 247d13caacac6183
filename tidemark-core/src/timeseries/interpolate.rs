use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::BusinessCalendar;
use crate::series::{Bar, DateRange, Series};

/// Gap-filling strategy selector, usable in per-call request parameters and
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationKind {
    /// Copy-forward: a missing day repeats the last known bar's prices.
    Flat,
    /// Neighbor-proportional reconstruction weighted by business-day distance.
    Linear,
}

impl InterpolationKind {
    /// The strategy implementation for this selector.
    #[must_use]
    pub const fn strategy(self) -> &'static dyn Interpolator {
        match self {
            Self::Flat => &FlatInterpolator,
            Self::Linear => &LinearInterpolator,
        }
    }
}

/// Interpolation strategy: how to reconstruct a bar for a tradeable date
/// with no observation.
///
/// All synthesized bars carry provenance comments ("Copied from ...",
/// "Extrapolated from ...", "Interpolated from ...") so reconstructed points
/// remain auditable. Distances are always measured in business days via the
/// calendar: a Friday-to-Monday gap is a one-business-day step, not three
/// calendar days.
pub trait Interpolator: Send + Sync {
    /// Synthesize a bar at `date`, strictly between the real bars `current`
    /// and `next`.
    fn between(
        &self,
        calendar: &BusinessCalendar,
        current: &Bar,
        date: NaiveDate,
        next: &Bar,
    ) -> Bar;

    /// The "past value" rule: a bar at `date`, before the earliest real bar
    /// `first`. `second` is the next real bar after `first` when the series
    /// has one.
    fn before(
        &self,
        calendar: &BusinessCalendar,
        first: &Bar,
        second: Option<&Bar>,
        date: NaiveDate,
    ) -> Bar;

    /// The "future value" rule: a bar at `date`, after the latest real bar
    /// `last`. `penultimate` is the real bar preceding `last` when the series
    /// has one.
    fn after(
        &self,
        calendar: &BusinessCalendar,
        penultimate: Option<&Bar>,
        last: &Bar,
        date: NaiveDate,
    ) -> Bar;
}

fn copied(from: &Bar, date: NaiveDate) -> Bar {
    Bar::synthetic(
        date,
        from.open,
        from.close,
        format!("Copied from {}", from.date),
    )
}

/// Copy-forward/back strategy: every synthesized bar repeats the prices of
/// its nearest real neighbor on the series side it extends.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatInterpolator;

impl Interpolator for FlatInterpolator {
    fn between(
        &self,
        _calendar: &BusinessCalendar,
        current: &Bar,
        date: NaiveDate,
        _next: &Bar,
    ) -> Bar {
        copied(current, date)
    }

    fn before(
        &self,
        _calendar: &BusinessCalendar,
        first: &Bar,
        _second: Option<&Bar>,
        date: NaiveDate,
    ) -> Bar {
        copied(first, date)
    }

    fn after(
        &self,
        _calendar: &BusinessCalendar,
        _penultimate: Option<&Bar>,
        last: &Bar,
        date: NaiveDate,
    ) -> Bar {
        copied(last, date)
    }
}

/// Neighbor-proportional strategy: synthesized prices move along the line
/// between the surrounding real bars, weighted by the ratio of business-day
/// distances. Boundary extension extrapolates along the slope of the two
/// nearest real bars.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearInterpolator;

impl Interpolator for LinearInterpolator {
    fn between(
        &self,
        calendar: &BusinessCalendar,
        current: &Bar,
        date: NaiveDate,
        next: &Bar,
    ) -> Bar {
        let interval = calendar.business_days_between(current.date, next.date);
        if interval == 0 {
            return copied(current, date);
        }
        let multiplier =
            Decimal::from(calendar.business_days_between(current.date, date)) / Decimal::from(interval);
        let close = current.close + (next.close - current.close) * multiplier;
        let open = current.open + (next.open - current.open) * multiplier;
        Bar::synthetic(
            date,
            open,
            close,
            format!(
                "Interpolated from {} ({}) to {} ({})",
                current.date, current.close, next.date, next.close
            ),
        )
    }

    fn before(
        &self,
        calendar: &BusinessCalendar,
        first: &Bar,
        second: Option<&Bar>,
        date: NaiveDate,
    ) -> Bar {
        let Some(second) = second else {
            return copied(first, date);
        };
        let interval = calendar.business_days_between(first.date, second.date);
        if interval == 0 {
            return copied(first, date);
        }
        let multiplier =
            Decimal::from(calendar.business_days_between(date, first.date)) / Decimal::from(interval);
        let close = first.close - (second.close - first.close) * multiplier;
        let open = first.open - (second.open - first.open) * multiplier;
        Bar::synthetic(
            date,
            open,
            close,
            format!("Extrapolated from {} to {}", first.date, second.date),
        )
    }

    fn after(
        &self,
        calendar: &BusinessCalendar,
        penultimate: Option<&Bar>,
        last: &Bar,
        date: NaiveDate,
    ) -> Bar {
        let Some(penultimate) = penultimate else {
            return copied(last, date);
        };
        let interval = calendar.business_days_between(penultimate.date, last.date);
        if interval == 0 {
            return copied(last, date);
        }
        let multiplier =
            Decimal::from(calendar.business_days_between(last.date, date)) / Decimal::from(interval);
        let close = last.close + (last.close - penultimate.close) * multiplier;
        let open = last.open + (last.open - penultimate.open) * multiplier;
        Bar::synthetic(
            date,
            open,
            close,
            format!("Extrapolated from {} to {}", penultimate.date, last.date),
        )
    }
}

/// Fill every tradeable date between the series' oldest and newest bar that
/// has no observation. Real bars are never replaced; only missing dates gain
/// synthetic bars.
#[must_use]
pub fn fill_gaps(
    calendar: &BusinessCalendar,
    series: &Series,
    strategy: &dyn Interpolator,
) -> Series {
    let filled = fill_between(calendar, series.bars(), strategy);
    series.clone().with_bars(filled)
}

/// Extend the series to cover `range` (synthesizing boundary bars via the
/// strategy's past/future rules) and fill every internal tradeable-day gap.
#[must_use]
pub fn extend_and_fill(
    calendar: &BusinessCalendar,
    series: &Series,
    strategy: &dyn Interpolator,
    range: &DateRange,
) -> Series {
    let Some(first) = series.oldest() else {
        return series.clone();
    };
    let last = series
        .latest()
        .expect("non-empty series has a latest bar")
        .clone();
    let first = first.clone();

    let mut bars = series.bars().to_vec();

    // Effective boundary anchors: the first/last tradeable days inside the
    // requested range.
    let start = calendar
        .iter(range.from(), range.to())
        .next()
        .unwrap_or(range.from());
    let end = calendar.previous_business_day(range.to());

    if start < first.date {
        let second = series.bars().get(1);
        bars.insert(0, strategy.before(calendar, &first, second, start));
    }
    if end > last.date && range.contains(end) {
        let penultimate = series.len().checked_sub(2).and_then(|i| series.bars().get(i));
        bars.push(strategy.after(calendar, penultimate, &last, end));
    }

    let filled = fill_between(calendar, &bars, strategy);
    series.clone().with_bars(filled)
}

fn fill_between(
    calendar: &BusinessCalendar,
    bars: &[Bar],
    strategy: &dyn Interpolator,
) -> Vec<Bar> {
    let mut out: Vec<Bar> = Vec::with_capacity(bars.len());
    for (i, current) in bars.iter().enumerate() {
        out.push(current.clone());
        if let Some(next) = bars.get(i + 1) {
            if next.date <= current.date {
                continue;
            }
            let gap_start = current.date + Days::new(1);
            let gap_end = next.date - Days::new(1);
            if gap_start > gap_end {
                continue;
            }
            for date in calendar.iter(gap_start, gap_end) {
                out.push(strategy.between(calendar, current, date, next));
            }
        }
    }
    out
}
