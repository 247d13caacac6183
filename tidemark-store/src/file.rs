use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use tidemark_core::timeseries::merge;
use tidemark_core::{DataStore, DateRange, Instrument, Series, TidemarkError};

use crate::codec;

/// Filesystem-backed durable store: one `<EXCHANGE>_<CODE>.csv` document per
/// instrument under a base directory.
///
/// Persisting merges with any existing document rather than blindly
/// overwriting: the incoming series wins per date, existing rows survive for
/// dates the incoming series does not cover.
#[derive(Debug, Clone)]
pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    /// A store rooted at `dir`. The directory is created on first write;
    /// until it exists the store reports itself unavailable.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the document for `instrument`.
    #[must_use]
    pub fn document_path(&self, instrument: &Instrument) -> PathBuf {
        self.dir.join(codec::document_name(instrument))
    }

    /// Base directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read_document(&self, instrument: &Instrument) -> Result<Option<Series>, TidemarkError> {
        let path = self.document_path(instrument);
        match tokio::fs::read_to_string(&path).await {
            Ok(data) => {
                debug!(path = %path.display(), "read series document");
                codec::series_from_csv(instrument.clone(), &data).map(Some)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(TidemarkError::store(format!(
                "reading {}: {e}",
                path.display()
            ))),
        }
    }
}

#[async_trait]
impl DataStore for CsvStore {
    async fn get(
        &self,
        instrument: &Instrument,
        range: DateRange,
    ) -> Result<Option<Series>, TidemarkError> {
        Ok(self
            .read_document(instrument)
            .await?
            .map(|s| s.restricted_to(&range)))
    }

    async fn contains(&self, instrument: &Instrument) -> Result<bool, TidemarkError> {
        Ok(self.document_path(instrument).exists())
    }

    async fn store(&self, series: &Series) -> Result<(), TidemarkError> {
        let merged = match self.read_document(series.instrument()).await? {
            Some(existing) => merge::merge(series, &existing),
            None => series.clone(),
        };
        let document = codec::series_to_csv(&merged)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(TidemarkError::store)?;
        let path = self.document_path(series.instrument());
        info!(path = %path.display(), bars = merged.len(), "saving series");
        tokio::fs::write(&path, document)
            .await
            .map_err(|e| TidemarkError::store(format!("writing {}: {e}", path.display())))
    }

    fn is_available(&self) -> bool {
        self.dir.is_dir()
    }
}
