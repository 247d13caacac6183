//! tidemark orchestrates price-history requests across a durable store and
//! multiple unreliable web source feeds.
//!
//! Overview
//! - Cache-first: the durable store is read before any network source, and
//!   every successful resolve is written back through it, so an identical
//!   follow-up request is served without touching the web feeds again.
//! - Priority fallback: web feeds are consulted in fixed source-precedence
//!   order, and each is asked only for the tradeable dates still missing
//!   from the accumulated series.
//! - Conflict-conservative merging: a date the cache already covers is never
//!   overwritten by a fresh fetch.
//! - Per-request cleaning (null/bad-date removal, 100x scale correction,
//!   currency normalization) and business-day-aware gap interpolation
//!   (flat or linear) are opt-in flags on [`ResolveRequest`].
//! - A single source failure is logged and skipped; only total data absence
//!   surfaces, as `NotFound`.
//!
//! Building an orchestrator and resolving a series:
//! ```rust,ignore
//! use std::sync::Arc;
//! use tidemark::{ResolveRequest, Tidemark};
//! use tidemark_core::{Instrument, InterpolationKind};
//!
//! let tidemark = Tidemark::builder()
//!     .with_store(Arc::new(store))
//!     .with_feed(Arc::new(ft))
//!     .with_feed(Arc::new(stooq))
//!     .build()?;
//!
//! let series = tidemark
//!     .resolve(
//!         &Instrument::equity("ABC"),
//!         ResolveRequest::range(from, to)
//!             .clean(true)
//!             .interpolate(InterpolationKind::Linear),
//!     )
//!     .await?;
//! ```
#![warn(missing_docs)]

pub(crate) mod core;
mod resolve;

pub use crate::core::{QueryLog, Tidemark, TidemarkBuilder};
pub use crate::resolve::ResolveRequest;

// Re-export core types for convenience
pub use tidemark_core::{
    AssetKind, Bar, BusinessCalendar, CalendarConfig, Currency, DataStore, DateRange,
    EnvExchangeRates, ExchangeRates, Exchange, Instrument, InstrumentRegistry, InterpolationKind,
    QueryKey, Quote, QuoteFeed, Series, Source, SourceFeed, StaticExchangeRates, TidemarkError,
};
