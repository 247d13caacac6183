//! Time-series utilities: merging fetched series, the cleaning pipeline, and
//! business-day-aware gap interpolation.

/// Cleaning stages applied to merged series before persistence.
pub mod clean;
/// Business-day gap filling and boundary extension.
pub mod interpolate;
/// Conflict-conservative merge of two series for the same instrument.
pub mod merge;
/// Small shared helpers (sorting, dedup, price rounding).
pub mod util;
