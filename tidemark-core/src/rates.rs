use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::TidemarkError;
use crate::connector::ExchangeRates;
use crate::instrument::Currency;

/// [`ExchangeRates`] implementation that reads rates from environment
/// variables keyed `FROM_TO_RATE`, e.g. `USD_GBP_RATE=0.79`.
///
/// Pairs with no configured variable resolve to 1, so an unconfigured
/// environment degrades to "no conversion" rather than failing requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvExchangeRates;

#[async_trait]
impl ExchangeRates for EnvExchangeRates {
    async fn rate(&self, from: &Currency, to: &Currency) -> Result<Decimal, TidemarkError> {
        if from == to {
            return Ok(Decimal::ONE);
        }
        let key = format!("{}_{}_RATE", from.code(), to.code()).to_ascii_uppercase();
        match std::env::var(&key) {
            Ok(raw) => raw
                .trim()
                .parse::<Decimal>()
                .map_err(|e| TidemarkError::Config(format!("invalid exchange rate {key}: {e}"))),
            Err(_) => Ok(Decimal::ONE),
        }
    }
}

/// A fixed in-memory rate table, convenient for wiring and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticExchangeRates {
    rates: Vec<(Currency, Currency, Decimal)>,
}

impl StaticExchangeRates {
    /// An empty table; every pair resolves to 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rate for `from` -> `to`.
    #[must_use]
    pub fn with_rate(mut self, from: Currency, to: Currency, rate: Decimal) -> Self {
        self.rates.push((from, to, rate));
        self
    }
}

#[async_trait]
impl ExchangeRates for StaticExchangeRates {
    async fn rate(&self, from: &Currency, to: &Currency) -> Result<Decimal, TidemarkError> {
        if from == to {
            return Ok(Decimal::ONE);
        }
        Ok(self
            .rates
            .iter()
            .find(|(f, t, _)| f == from && t == to)
            .map_or(Decimal::ONE, |(_, _, r)| *r))
    }
}
