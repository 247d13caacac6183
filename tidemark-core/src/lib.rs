//! tidemark-core
//!
//! Core types, capability traits, and time-series utilities shared across the
//! tidemark ecosystem.
//!
//! - `instrument` / `series`: the data model (instruments, bars, series,
//!   date ranges, provider identities).
//! - `calendar`: business-day arithmetic with configurable holiday sets.
//! - `registry`: free-text ticker resolution against a configured table.
//! - `connector`: the `SourceFeed` capability trait and its siblings
//!   (`QuoteFeed`, `ExchangeRates`, `DataStore`).
//! - `timeseries`: merge, cleaning, and interpolation over series.
//!
//! All capability traits are async (`async-trait`) and object-safe; backends
//! are composed by the orchestrator crate through explicit priority lists,
//! not inheritance.
#![warn(missing_docs)]

/// Business-day calendar and date iteration.
pub mod calendar;
/// Capability traits implemented by feeds, stores, and rate sources.
pub mod connector;
mod error;
/// Instrument identity and provider enumeration.
pub mod instrument;
/// Reference exchange-rate implementations.
pub mod rates;
/// Ticker-to-instrument resolution.
pub mod registry;
/// Bars, series, ranges, quotes.
pub mod series;
/// Merge / clean / interpolate over series.
pub mod timeseries;

pub use calendar::{BusinessCalendar, BusinessDays, CalendarConfig};
pub use connector::{DataStore, ExchangeRates, QuoteFeed, SourceFeed};
pub use error::TidemarkError;
pub use instrument::{AssetKind, Currency, Exchange, Instrument, Source};
pub use rates::{EnvExchangeRates, StaticExchangeRates};
pub use registry::{InstrumentRegistry, RegistryEntry};
pub use series::{Bar, DateRange, QueryKey, Quote, Series};
pub use timeseries::clean::CleaningPipeline;
pub use timeseries::interpolate::{
    FlatInterpolator, InterpolationKind, Interpolator, LinearInterpolator,
};
pub use timeseries::merge::merge;
