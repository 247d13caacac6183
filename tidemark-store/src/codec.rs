use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;

use tidemark_core::timeseries::util::round_price;
use tidemark_core::{Bar, Instrument, Series, TidemarkError};

/// Parsed shape of one persisted row.
#[derive(Debug, Deserialize)]
struct Row {
    date: NaiveDate,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
    volume: u64,
    #[serde(default)]
    comment: String,
}

/// Render a price at the fixed persisted precision: two decimal places,
/// half-even.
fn render(value: Decimal) -> String {
    format!("{:.2}", round_price(value))
}

/// Encode a series into the persisted CSV document:
/// `date,open,high,low,close,volume,comment`, one row per tradeable date.
/// Comments containing the delimiter, quotes, or newlines are quoted.
///
/// # Errors
/// Fails only on CSV writer errors, which indicate a bug rather than bad data.
pub fn series_to_csv(series: &Series) -> Result<String, TidemarkError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["date", "open", "high", "low", "close", "volume", "comment"])
        .map_err(TidemarkError::store)?;
    for bar in series.bars() {
        writer
            .write_record([
                bar.date.to_string(),
                render(bar.open),
                render(bar.high),
                render(bar.low),
                render(bar.close),
                bar.volume.to_string(),
                bar.comment.clone(),
            ])
            .map_err(TidemarkError::store)?;
    }
    let bytes = writer.into_inner().map_err(TidemarkError::store)?;
    String::from_utf8(bytes).map_err(TidemarkError::store)
}

/// Decode a persisted CSV document into a series for `instrument`.
///
/// Rows that fail to parse are dropped with a warning rather than failing the
/// read; a partially-corrupt document still yields its good rows.
///
/// # Errors
/// Fails when the document itself is unreadable (e.g. a missing header row).
pub fn series_from_csv(instrument: Instrument, data: &str) -> Result<Series, TidemarkError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(data.as_bytes());
    let mut bars = Vec::new();
    for record in reader.deserialize::<Row>() {
        match record {
            Ok(row) => bars.push(Bar {
                date: row.date,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
                comment: row.comment,
            }),
            Err(e) => {
                warn!(instrument = %instrument, error = %e, "dropping unparseable stored row");
            }
        }
    }
    Ok(Series::from_bars(instrument, bars))
}

/// The store key for an instrument: `<EXCHANGE>_<CODE>.csv`.
#[must_use]
pub fn document_name(instrument: &Instrument) -> String {
    format!("{}_{}.csv", instrument.exchange().code(), instrument.code())
}
