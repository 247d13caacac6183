use std::sync::Arc;

use async_trait::async_trait;

use tidemark_core::{DataStore, DateRange, Instrument, Series, Source, SourceFeed, TidemarkError};

/// Adapter exposing any [`DataStore`] as a [`SourceFeed`] under
/// [`Source::Cache`], so a store can sit in an orchestrator's priority list
/// like any other backend.
pub struct CachedFeed {
    store: Arc<dyn DataStore>,
}

impl CachedFeed {
    /// Wrap a store.
    #[must_use]
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SourceFeed for CachedFeed {
    fn source(&self) -> Source {
        Source::Cache
    }

    fn is_available(&self) -> bool {
        self.store.is_available()
    }

    async fn fetch(
        &self,
        instrument: &Instrument,
        range: DateRange,
    ) -> Result<Series, TidemarkError> {
        self.store
            .get(instrument, range)
            .await?
            .ok_or_else(|| TidemarkError::not_found(format!("cached series for {instrument}")))
    }
}
