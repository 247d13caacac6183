use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::TidemarkError;
use crate::instrument::{AssetKind, Currency, Exchange, Instrument, Source};

/// One row of the instrument configuration table.
///
/// Currency and exchange are raw strings here because the table is external
/// configuration; they are validated when the registry is built, and a row
/// that cannot be resolved is a hard configuration error (there is no safe
/// default for a mispriced currency).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Ticker code.
    pub code: String,
    /// Human-readable name; defaults to the code.
    #[serde(default)]
    pub name: Option<String>,
    /// ISIN or alternate code; defaults to the code.
    #[serde(default)]
    pub isin: Option<String>,
    /// Asset classification.
    pub kind: AssetKind,
    /// Listing exchange.
    pub exchange: Exchange,
    /// Price currency code, e.g. "GBX".
    pub currency: Option<String>,
    /// Source-of-truth provider.
    pub source: Source,
    /// Inactive rows are skipped at load.
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

/// Resolves free-text tickers to canonical [`Instrument`] identities.
///
/// Lookup is case-insensitive over codes and ISINs. Tickers with no
/// configured row resolve to a default-exchange equity so that ad-hoc
/// requests still work; configured rows missing a currency fail at load.
#[derive(Debug, Clone, Default)]
pub struct InstrumentRegistry {
    by_key: HashMap<String, Instrument>,
}

impl InstrumentRegistry {
    /// An empty registry; every ticker resolves to the fallback equity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from configuration rows.
    ///
    /// # Errors
    /// Returns `Config` when an active row has no currency, the one error
    /// class with no safe default.
    pub fn from_entries<I: IntoIterator<Item = RegistryEntry>>(
        entries: I,
    ) -> Result<Self, TidemarkError> {
        let mut registry = Self::new();
        for entry in entries {
            if !entry.active {
                continue;
            }
            let Some(currency) = entry.currency.as_deref() else {
                return Err(TidemarkError::Config(format!(
                    "instrument {} has no resolvable currency",
                    entry.code
                )));
            };
            let instrument = Instrument::new(
                &entry.code,
                entry.name.clone().unwrap_or_else(|| entry.code.clone()),
                entry.isin.clone().unwrap_or_else(|| entry.code.clone()),
                entry.kind,
                entry.exchange,
                Currency::from_code(currency),
                entry.source,
            );
            registry.register(instrument);
        }
        Ok(registry)
    }

    /// Build a registry from a JSON array of [`RegistryEntry`] rows.
    ///
    /// # Errors
    /// Returns `Config` on malformed JSON or rows failing validation.
    pub fn from_json(json: &str) -> Result<Self, TidemarkError> {
        let entries: Vec<RegistryEntry> = serde_json::from_str(json)
            .map_err(|e| TidemarkError::Config(format!("invalid instrument table: {e}")))?;
        Self::from_entries(entries)
    }

    /// Register an instrument under its code and ISIN.
    pub fn register(&mut self, instrument: Instrument) {
        self.by_key
            .insert(instrument.code().to_ascii_uppercase(), instrument.clone());
        self.by_key
            .insert(instrument.isin().to_ascii_uppercase(), instrument);
    }

    /// Exact lookup by code or ISIN, case-insensitive.
    #[must_use]
    pub fn lookup(&self, ticker: &str) -> Option<&Instrument> {
        self.by_key.get(&ticker.trim().to_ascii_uppercase())
    }

    /// Resolve a free-text ticker to a canonical identity.
    ///
    /// `"cash"` resolves to the synthetic cash instrument; unknown tickers
    /// fall back to a default-exchange equity under the given code.
    #[must_use]
    pub fn resolve(&self, ticker: &str) -> Instrument {
        let trimmed = ticker.trim();
        if trimmed.eq_ignore_ascii_case("cash") {
            return Instrument::cash();
        }
        if let Some(found) = self.lookup(trimmed) {
            return found.clone();
        }
        warn!(ticker = trimmed, "unregistered ticker, assuming default equity");
        Instrument::equity(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_ticker_falls_back_to_equity() {
        let registry = InstrumentRegistry::new();
        let inst = registry.resolve("xyz");
        assert_eq!(inst.code(), "XYZ");
        assert_eq!(inst.kind(), AssetKind::Equity);
    }

    #[test]
    fn cash_is_synthetic() {
        let registry = InstrumentRegistry::new();
        assert!(registry.resolve("Cash").is_cash());
    }

    #[test]
    fn missing_currency_is_a_config_error() {
        let err = InstrumentRegistry::from_entries([RegistryEntry {
            code: "ABC".into(),
            name: None,
            isin: None,
            kind: AssetKind::Equity,
            exchange: Exchange::London,
            currency: None,
            source: Source::Ft,
            active: true,
        }])
        .unwrap_err();
        assert!(matches!(err, TidemarkError::Config(_)));
    }

    #[test]
    fn lookup_by_isin_and_code() {
        let registry = InstrumentRegistry::from_json(
            r#"[{"code":"ABC","isin":"GB0001234567","kind":"equity",
                 "exchange":"london","currency":"GBX","source":"ft"}]"#,
        )
        .unwrap();
        assert_eq!(registry.lookup("abc").unwrap().currency(), &Currency::Gbx);
        assert_eq!(registry.lookup("gb0001234567").unwrap().code(), "ABC");
    }
}
