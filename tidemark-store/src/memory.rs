use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use tidemark_core::{DataStore, DateRange, Instrument, Series, TidemarkError};

/// In-memory durable store, last-writer-wins per instrument. The reference
/// implementation used by tests and short-lived tools.
#[derive(Debug)]
pub struct MemoryStore {
    series: Mutex<HashMap<Instrument, Series>>,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// An empty, available store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            series: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Toggle availability, for exercising store-outage paths in tests.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Snapshot of the stored series for `instrument`, unrestricted.
    pub async fn snapshot(&self, instrument: &Instrument) -> Option<Series> {
        self.series.lock().await.get(instrument).cloned()
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn get(
        &self,
        instrument: &Instrument,
        range: DateRange,
    ) -> Result<Option<Series>, TidemarkError> {
        Ok(self
            .series
            .lock()
            .await
            .get(instrument)
            .map(|s| s.restricted_to(&range)))
    }

    async fn contains(&self, instrument: &Instrument) -> Result<bool, TidemarkError> {
        Ok(self.series.lock().await.contains_key(instrument))
    }

    async fn store(&self, series: &Series) -> Result<(), TidemarkError> {
        self.series
            .lock()
            .await
            .insert(series.instrument().clone(), series.clone());
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}
