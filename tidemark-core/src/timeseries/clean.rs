use chrono::Datelike;
use rust_decimal::Decimal;
use tracing::debug;

use crate::TidemarkError;
use crate::connector::ExchangeRates;
use crate::instrument::Currency;
use crate::series::{Bar, Series};
use crate::timeseries::util::sort_and_dedup;

/// One stage of the cleaning pipeline: a pure transform over bars.
pub trait BarCleaner {
    /// Return the cleaned bars. Stages must be safe to run in any order with
    /// respect to series invariants; the pipeline order is fixed by
    /// [`CleaningPipeline::run`].
    fn clean(&self, bars: Vec<Bar>) -> Vec<Bar>;
}

/// Drops bars whose close is the zero sentinel used by sources for "no data".
#[derive(Debug, Clone, Copy, Default)]
pub struct NullValueRemover;

impl BarCleaner for NullValueRemover {
    fn clean(&self, bars: Vec<Bar>) -> Vec<Bar> {
        sort_and_dedup(
            bars.into_iter()
                .filter(|b| b.close != Decimal::ZERO)
                .collect(),
        )
    }
}

/// Drops bars with implausible dates: epoch-era garbage (1970 and earlier,
/// a common unparsed-timestamp artifact) and dates beyond the current year.
/// Duplicate dates are collapsed, keeping the earliest-seen bar.
#[derive(Debug, Clone, Copy, Default)]
pub struct BadDateRemover;

impl BarCleaner for BadDateRemover {
    fn clean(&self, bars: Vec<Bar>) -> Vec<Bar> {
        let this_year = chrono::Utc::now().date_naive().year();
        sort_and_dedup(
            bars.into_iter()
                .filter(|b| b.date.year() > 1970 && b.date.year() <= this_year)
                .collect(),
        )
    }
}

/// Detects likely unit errors (one provider reporting prices ~100x or ~1/100x
/// the local trend, the classic pence/pounds confusion) and rescales the
/// outliers rather than discarding them.
///
/// A bar is an outlier when its close, divided or multiplied by `threshold`,
/// still over/undershoots the previous accepted close. The threshold is a
/// judgment-call heuristic, deliberately below the full factor of 100 so that
/// genuine large moves stay untouched while mis-scaled rows are caught.
#[derive(Debug, Clone, Copy)]
pub struct ScaleCorrector {
    threshold: Decimal,
}

impl Default for ScaleCorrector {
    fn default() -> Self {
        Self {
            threshold: Decimal::from(80),
        }
    }
}

impl ScaleCorrector {
    /// Correction factor applied to detected outliers.
    const FACTOR: Decimal = Decimal::ONE_HUNDRED;

    /// A corrector with a custom outlier threshold.
    #[must_use]
    pub const fn new(threshold: Decimal) -> Self {
        Self { threshold }
    }
}

impl BarCleaner for ScaleCorrector {
    fn clean(&self, bars: Vec<Bar>) -> Vec<Bar> {
        let mut iter = bars.into_iter();
        let Some(first) = iter.next() else {
            return Vec::new();
        };

        let mut cleaned = vec![first];
        for bar in iter {
            // The last accepted (possibly corrected) close is the local trend.
            let previous = &cleaned[cleaned.len() - 1];
            let corrected = if bar.close / self.threshold > previous.close {
                let scaled = bar.scaled(
                    Decimal::ONE / Self::FACTOR,
                    format!(
                        "{}: Scaled from {} to {}",
                        bar.comment,
                        bar.close,
                        bar.close / Self::FACTOR
                    ),
                );
                debug!(date = %bar.date, close = %bar.close, "scaled down 100x outlier");
                scaled
            } else if bar.close * self.threshold < previous.close {
                let scaled = bar.scaled(
                    Self::FACTOR,
                    format!(
                        "{}: Scaled from {} to {}",
                        bar.comment,
                        bar.close,
                        bar.close * Self::FACTOR
                    ),
                );
                debug!(date = %bar.date, close = %bar.close, "scaled up 100x outlier");
                scaled
            } else {
                bar
            };
            cleaned.push(corrected);
        }
        cleaned
    }
}

/// The fixed chain of correctors applied to a merged series before or after
/// caching: null removal, bad-date removal, scale correction, currency
/// normalization.
#[derive(Debug, Clone, Copy)]
pub struct CleaningPipeline {
    scale: ScaleCorrector,
}

impl Default for CleaningPipeline {
    fn default() -> Self {
        Self {
            scale: ScaleCorrector::default(),
        }
    }
}

impl CleaningPipeline {
    /// A pipeline with a custom scale-outlier threshold.
    #[must_use]
    pub const fn with_scale_threshold(threshold: Decimal) -> Self {
        Self {
            scale: ScaleCorrector::new(threshold),
        }
    }

    /// Run the pipeline over `series`, converting prices to the instrument's
    /// declared currency via `rates` where they differ.
    ///
    /// # Errors
    /// Fails only when an exchange rate is required and cannot be obtained.
    pub async fn run(
        &self,
        series: Series,
        rates: &dyn ExchangeRates,
    ) -> Result<Series, TidemarkError> {
        let original = series.len();
        let mut bars = NullValueRemover.clean(series.bars().to_vec());
        bars = BadDateRemover.clean(bars);
        bars = self.scale.clean(bars);

        let instrument = series.instrument().clone();
        let target = instrument.currency().clone();
        let recorded = series.currency().clone();

        if recorded != target {
            let factor = conversion_rate(&recorded, &target, rates).await?;
            if factor != Decimal::ONE {
                bars = bars
                    .into_iter()
                    .map(|b| {
                        let converted = b.close * factor;
                        let comment =
                            format!("{} scaled from {} to {}", instrument.isin(), b.close, converted);
                        b.scaled(factor, comment)
                    })
                    .collect();
            }
        }

        let cleaned = Series::from_bars_in(instrument, target, bars);
        if cleaned.len() != original {
            debug!(
                dropped = original - cleaned.len(),
                instrument = %cleaned.instrument(),
                "cleaning removed bars"
            );
        }
        Ok(cleaned)
    }
}

/// The multiplicative factor converting prices quoted in `from` into `to`.
///
/// GBX<->GBP is an exact x100/÷100 and never consults the rate source; any
/// pair involving GBX otherwise composes the exact pence factor with the
/// major-unit rate (e.g. USD->GBX = rate(USD, GBP) x 100).
///
/// # Errors
/// Propagates rate-source failures.
pub async fn conversion_rate(
    from: &Currency,
    to: &Currency,
    rates: &dyn ExchangeRates,
) -> Result<Decimal, TidemarkError> {
    if from == to {
        return Ok(Decimal::ONE);
    }
    let pence = Decimal::ONE_HUNDRED;
    match (from, to) {
        (Currency::Gbx, Currency::Gbp) => Ok(Decimal::ONE / pence),
        (Currency::Gbp, Currency::Gbx) => Ok(pence),
        _ => {
            let major_from = from.major();
            let major_to = to.major();
            let mut rate = if major_from == major_to {
                Decimal::ONE
            } else {
                rates.rate(&major_from, &major_to).await?
            };
            if matches!(from, Currency::Gbx) {
                rate /= pence;
            }
            if matches!(to, Currency::Gbx) {
                rate *= pence;
            }
            Ok(rate)
        }
    }
}
