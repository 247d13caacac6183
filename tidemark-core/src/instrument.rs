use serde::{Deserialize, Serialize};

/// Broad classification of a tradeable asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// Common stock.
    Equity,
    /// Exchange-traded fund.
    Etf,
    /// Open-ended fund.
    Fund,
    /// Closed-ended investment trust.
    InvestmentTrust,
    /// Market index.
    Index,
    /// Currency pair.
    Fx,
    /// The synthetic cash asset.
    Cash,
    /// Unclassified.
    Unknown,
}

/// Exchange an instrument is listed on. Drives store file naming and the
/// default currency of newly registered tickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exchange {
    /// London Stock Exchange.
    London,
    /// New York (NYSE/Nasdaq, not distinguished here).
    NewYork,
}

impl Exchange {
    /// Stable uppercase code used in store keys (`<EXCHANGE>_<CODE>.csv`).
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::London => "LONDON",
            Self::NewYork => "NY",
        }
    }
}

impl std::fmt::Display for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Price currency of an instrument or of a fetched series.
///
/// `Gbx` (pence sterling) is treated as the minor unit of `Gbp`: conversion
/// between the two is an exact factor of 100 and never consults an external
/// rate source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Pounds sterling.
    Gbp,
    /// Pence sterling (1/100 GBP).
    Gbx,
    /// US dollars.
    Usd,
    /// Euros.
    Eur,
    /// Any other ISO-style code.
    #[serde(untagged)]
    Other(String),
}

impl Currency {
    /// Parse a currency code. `"GBp"` (the vendor spelling of pence) maps to
    /// `Gbx`; everything else is case-insensitive.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        if code == "GBp" {
            return Self::Gbx;
        }
        match code.to_ascii_uppercase().as_str() {
            "GBP" => Self::Gbp,
            "GBX" => Self::Gbx,
            "USD" => Self::Usd,
            "EUR" => Self::Eur,
            other => Self::Other(other.to_string()),
        }
    }

    /// The uppercase code, e.g. `"GBP"`.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Gbp => "GBP",
            Self::Gbx => "GBX",
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Other(code) => code,
        }
    }

    /// The major-unit equivalent used for external rate lookups: GBX maps to
    /// GBP, everything else maps to itself.
    #[must_use]
    pub fn major(&self) -> Self {
        match self {
            Self::Gbx => Self::Gbp,
            other => other.clone(),
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Enumerated provider identity with a fixed precedence.
///
/// The durable store (`Cache`) always outranks the web feeds; among the web
/// feeds the declared order here is the default priority used by the
/// orchestrator when no explicit feed order is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// The durable store / manually curated data.
    Cache,
    /// Financial Times historic prices.
    Ft,
    /// Alphavantage daily series.
    Alphavantage,
    /// Stooq end-of-day archive.
    Stooq,
}

impl Source {
    /// Fixed precedence; lower is consulted first.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Cache => 0,
            Self::Ft => 1,
            Self::Alphavantage => 2,
            Self::Stooq => 3,
        }
    }

    /// Stable identifier used in logs and provenance comments.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Ft => "ft",
            Self::Alphavantage => "alphavantage",
            Self::Stooq => "stooq",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Canonical identity of a tradeable asset.
///
/// Immutable once constructed; equality and hashing cover all identity
/// fields, so `Instrument` is usable directly as a cache/merge key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    code: String,
    name: String,
    isin: String,
    kind: AssetKind,
    exchange: Exchange,
    currency: Currency,
    source: Source,
}

impl Instrument {
    /// Construct an instrument from its full identity.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        isin: impl Into<String>,
        kind: AssetKind,
        exchange: Exchange,
        currency: Currency,
        source: Source,
    ) -> Self {
        Self {
            code: code.into().to_ascii_uppercase(),
            name: name.into(),
            isin: isin.into(),
            kind,
            exchange,
            currency,
            source,
        }
    }

    /// Shorthand for a London-listed, pence-quoted equity.
    #[must_use]
    pub fn equity(code: &str) -> Self {
        Self::new(
            code,
            code,
            code,
            AssetKind::Equity,
            Exchange::London,
            Currency::Gbx,
            Source::Ft,
        )
    }

    /// The synthetic cash instrument. Resolving it never touches the network
    /// or the store; the orchestrator synthesizes a flat unit-value series.
    #[must_use]
    pub fn cash() -> Self {
        Self::new(
            "CASH",
            "Cash",
            "CASH",
            AssetKind::Cash,
            Exchange::London,
            Currency::Gbp,
            Source::Cache,
        )
    }

    /// Ticker code, uppercased.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// ISIN or best-available alternate code.
    #[must_use]
    pub fn isin(&self) -> &str {
        &self.isin
    }

    /// Asset classification.
    #[must_use]
    pub const fn kind(&self) -> AssetKind {
        self.kind
    }

    /// Listing exchange.
    #[must_use]
    pub const fn exchange(&self) -> Exchange {
        self.exchange
    }

    /// Declared price currency. Series are normalized to this currency by the
    /// cleaning pipeline.
    #[must_use]
    pub const fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Source-of-truth provider for this instrument.
    #[must_use]
    pub const fn source(&self) -> Source {
        self.source
    }

    /// True for the synthetic cash instrument.
    #[must_use]
    pub fn is_cash(&self) -> bool {
        self.kind == AssetKind::Cash
    }
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.exchange.code(), self.code)
    }
}
