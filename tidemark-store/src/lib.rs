//! tidemark-store
//!
//! Durable store backends implementing the `tidemark_core::DataStore`
//! contract:
//!
//! - [`CsvStore`]: one CSV document per instrument under a base directory.
//! - [`MemoryStore`]: in-memory reference implementation for tests.
//! - [`HttpStore`]: remote object-store-style backend (GET/PUT of the same
//!   CSV documents).
//! - [`CachedFeed`]: adapter exposing any store as a `SourceFeed`.
//!
//! All backends share one persisted format (see [`codec`]): rows of
//! `date,open,high,low,close,volume,comment` with prices rendered at two
//! decimal places, half-even.
#![warn(missing_docs)]

mod cached;
/// Shared CSV encoding/decoding of series documents.
pub mod codec;
mod file;
mod http;
mod memory;

pub use cached::CachedFeed;
pub use file::CsvStore;
pub use http::HttpStore;
pub use memory::MemoryStore;
