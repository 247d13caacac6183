use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use tidemark_core::timeseries::clean::{
    BadDateRemover, BarCleaner, CleaningPipeline, NullValueRemover, ScaleCorrector,
    conversion_rate,
};
use tidemark_core::{
    AssetKind, Bar, Currency, Exchange, Instrument, Series, Source, StaticExchangeRates,
};

fn day(offset: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Days::new(offset)
}

fn bar(offset: u64, close: Decimal) -> Bar {
    Bar::flat(day(offset), close, 100, "ft")
}

fn gbx_equity() -> Instrument {
    Instrument::equity("ABC")
}

fn gbp_fund() -> Instrument {
    Instrument::new(
        "FUNDX",
        "Fund X",
        "GB00FUNDX",
        AssetKind::Fund,
        Exchange::London,
        Currency::Gbp,
        Source::Ft,
    )
}

#[test]
fn null_value_remover_drops_zero_closes() {
    let bars = vec![bar(0, Decimal::from(100)), bar(1, Decimal::ZERO), bar(2, Decimal::from(101))];
    let cleaned = NullValueRemover.clean(bars);
    assert_eq!(cleaned.len(), 2);
    assert!(cleaned.iter().all(|b| b.close != Decimal::ZERO));
}

#[test]
fn bad_date_remover_drops_epoch_garbage_and_future_years() {
    let epoch = Bar::flat(
        NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
        Decimal::from(5),
        0,
        "ft",
    );
    let future = Bar::flat(
        NaiveDate::from_ymd_opt(2999, 1, 1).unwrap(),
        Decimal::from(5),
        0,
        "ft",
    );
    let good = bar(0, Decimal::from(100));
    let cleaned = BadDateRemover.clean(vec![epoch, future, good.clone()]);
    assert_eq!(cleaned, vec![good]);
}

#[test]
fn duplicate_dates_keep_the_first_seen_bar() {
    let first = bar(0, Decimal::from(100));
    let second = bar(0, Decimal::from(200));
    let cleaned = BadDateRemover.clean(vec![first.clone(), second]);
    assert_eq!(cleaned, vec![first]);
}

#[test]
fn hundredfold_outlier_is_scaled_down_not_dropped() {
    let bars = vec![
        bar(0, Decimal::from(10)),
        bar(1, Decimal::from(995)), // pence row in a pounds series
        bar(2, Decimal::new(102, 1)),
    ];
    let cleaned = ScaleCorrector::default().clean(bars);
    assert_eq!(cleaned.len(), 3);
    assert_eq!(cleaned[1].close, Decimal::new(995, 2));
    assert!(cleaned[1].comment.contains("Scaled from 995"));
    assert_eq!(cleaned[2].close, Decimal::new(102, 1));
}

#[test]
fn hundredth_outlier_is_scaled_up() {
    let bars = vec![bar(0, Decimal::from(1000)), bar(1, Decimal::from(9))];
    let cleaned = ScaleCorrector::default().clean(bars);
    assert_eq!(cleaned[1].close, Decimal::from(900));
}

proptest! {
    // The threshold is a heuristic; ratios at or inside it must never trigger
    // a correction, ratios beyond the full factor always must.
    #[test]
    fn ratios_within_threshold_are_untouched(units in 1i64..10_000, mult in 1i64..80) {
        let prev = Decimal::new(units, 2);
        let cur = prev * Decimal::from(mult);
        let cleaned = ScaleCorrector::default().clean(vec![bar(0, prev), bar(1, cur)]);
        prop_assert_eq!(cleaned[1].close, cur);
    }

    #[test]
    fn ratios_beyond_a_hundredfold_are_rescaled(units in 1i64..10_000, mult in 101i64..500) {
        let prev = Decimal::new(units, 2);
        let cur = prev * Decimal::from(mult);
        let cleaned = ScaleCorrector::default().clean(vec![bar(0, prev), bar(1, cur)]);
        prop_assert_eq!(cleaned[1].close, cur / Decimal::ONE_HUNDRED);
    }
}

#[tokio::test]
async fn gbx_to_gbp_and_back_reproduces_closes() {
    let rates = StaticExchangeRates::new();
    let down = conversion_rate(&Currency::Gbx, &Currency::Gbp, &rates).await.unwrap();
    let up = conversion_rate(&Currency::Gbp, &Currency::Gbx, &rates).await.unwrap();
    for cents in [1i64, 999, 10_050, 123_456] {
        let original = Decimal::new(cents, 2);
        assert_eq!(original * down * up, original);
    }
}

#[tokio::test]
async fn cross_currency_rate_composes_the_pence_factor() {
    let rates = StaticExchangeRates::new().with_rate(
        Currency::Usd,
        Currency::Gbp,
        Decimal::new(8, 1), // 0.8
    );
    let usd_to_gbx = conversion_rate(&Currency::Usd, &Currency::Gbx, &rates).await.unwrap();
    assert_eq!(usd_to_gbx, Decimal::from(80));
}

#[tokio::test]
async fn pipeline_normalizes_series_currency_to_the_instrument() {
    // A GBP-declared fund whose feed quoted pence.
    let instrument = gbp_fund();
    let series = Series::from_bars_in(
        instrument.clone(),
        Currency::Gbx,
        vec![bar(0, Decimal::from(12_500)), bar(1, Decimal::from(12_600))],
    );
    let cleaned = CleaningPipeline::default()
        .run(series, &StaticExchangeRates::new())
        .await
        .unwrap();
    assert_eq!(cleaned.currency(), &Currency::Gbp);
    assert_eq!(cleaned.bars()[0].close, Decimal::from(125));
    assert_eq!(cleaned.bars()[1].close, Decimal::from(126));
    assert!(cleaned.bars()[0].comment.contains("scaled from"));
}

#[tokio::test]
async fn pipeline_runs_all_stages_in_order() {
    let instrument = gbx_equity();
    let series = Series::from_bars_in(
        instrument.clone(),
        Currency::Gbx,
        vec![
            bar(0, Decimal::from(100)),
            bar(1, Decimal::ZERO),           // dropped
            bar(2, Decimal::from(10_100)),   // rescaled to 101
            Bar::flat(
                NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
                Decimal::from(7),
                0,
                "ft",
            ), // dropped
        ],
    );
    let cleaned = CleaningPipeline::default()
        .run(series, &StaticExchangeRates::new())
        .await
        .unwrap();
    let closes: Vec<_> = cleaned.bars().iter().map(|b| b.close).collect();
    assert_eq!(closes, vec![Decimal::from(100), Decimal::from(101)]);
}
