use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, info};

use tidemark_core::timeseries::merge;
use tidemark_core::{DataStore, DateRange, Instrument, Series, TidemarkError};

use crate::codec;

/// Remote object-store-style backend: series documents live at
/// `<base>/series/<EXCHANGE>_<CODE>.csv` and are fetched and replaced whole
/// with GET/PUT.
///
/// Availability is a pure configuration check; no connectivity probe is ever
/// issued outside of the actual read/write calls.
#[derive(Debug, Clone)]
pub struct HttpStore {
    base: String,
    client: reqwest::Client,
}

impl HttpStore {
    /// A store against `base_url` (scheme + host, no trailing slash needed).
    ///
    /// # Errors
    /// Returns `Config` for an empty or fragment-only URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, TidemarkError> {
        let base = base_url.into();
        let trimmed = base.trim_end_matches('/').to_string();
        if trimmed.is_empty() || !trimmed.contains("://") {
            return Err(TidemarkError::Config(format!(
                "invalid remote store url: {base:?}"
            )));
        }
        Ok(Self {
            base: trimmed,
            client: reqwest::Client::new(),
        })
    }

    fn document_url(&self, instrument: &Instrument) -> String {
        format!("{}/series/{}", self.base, codec::document_name(instrument))
    }

    async fn read_document(&self, instrument: &Instrument) -> Result<Option<Series>, TidemarkError> {
        let url = self.document_url(instrument);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(TidemarkError::store)?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                debug!(url, "fetched series document");
                let body = response.text().await.map_err(TidemarkError::store)?;
                codec::series_from_csv(instrument.clone(), &body).map(Some)
            }
            status => Err(TidemarkError::store(format!("GET {url} returned {status}"))),
        }
    }
}

#[async_trait]
impl DataStore for HttpStore {
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
        let url = self.document_url(instrument);
        let response = self
            .client
            .head(&url)
            .send()
            .await
            .map_err(TidemarkError::store)?;
        Ok(response.status().is_success())
    }

    async fn store(&self, series: &Series) -> Result<(), TidemarkError> {
        let merged = match self.read_document(series.instrument()).await? {
            Some(existing) => merge::merge(series, &existing),
            None => series.clone(),
        };
        let document = codec::series_to_csv(&merged)?;
        let url = self.document_url(series.instrument());
        info!(url, bars = merged.len(), "uploading series");
        let response = self
            .client
            .put(&url)
            .header("content-type", "text/csv")
            .body(document)
            .send()
            .await
            .map_err(TidemarkError::store)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(TidemarkError::store(format!(
                "PUT {url} returned {}",
                response.status()
            )))
        }
    }

    fn is_available(&self) -> bool {
        // Construction already validated the configuration.
        true
    }
}
