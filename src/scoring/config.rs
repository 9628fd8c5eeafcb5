use serde::{Deserialize, Serialize};

/// Direction in which an indicator moves with liquidity.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// Higher values mean more liquidity.
    #[default]
    Normal,
    /// Higher values mean less liquidity.
    Inverted,
}

impl Polarity {
    pub fn orient(self, scaled: f64) -> f64 {
        match self {
            Polarity::Normal => scaled,
            Polarity::Inverted => 1.0 - scaled,
        }
    }
}

/// One configured indicator.
///
/// Example YAML:
/// ```yaml
/// code: FEDFUNDS
/// name: Federal Funds Rate
/// weight: 0.20
/// polarity: inverted
/// description: Overnight interbank rate targeted by the Fed.
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct IndicatorConfig {
    /// Series code as used by the data provider (e.g. "M2SL")
    pub code: String,

    /// Human-readable display name
    pub name: String,

    /// Contribution to the composite; 0 keeps the indicator informational only
    #[serde(default)]
    pub weight: f64,

    #[serde(default)]
    pub polarity: Polarity,

    /// Passthrough text for the presentation layer
    #[serde(default)]
    pub description: Option<String>,
}

impl IndicatorConfig {
    pub fn new(code: &str, name: &str, weight: f64, polarity: Polarity) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            weight,
            polarity,
            description: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn is_active(&self) -> bool {
        self.weight > 0.0
    }
}

/// The polarity policy and weighting scheme, as one ordered table.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(transparent)]
pub struct IndicatorTable {
    entries: Vec<IndicatorConfig>,
}

impl IndicatorTable {
    pub fn new(entries: Vec<IndicatorConfig>) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndicatorConfig> {
        self.entries.iter()
    }

    /// Indicators that take part in the weighted sum.
    pub fn active(&self) -> impl Iterator<Item = &IndicatorConfig> {
        self.entries.iter().filter(|i| i.is_active())
    }

    /// Exact-match lookup; codes are case-sensitive like observation series.
    pub fn get(&self, code: &str) -> Option<&IndicatorConfig> {
        self.entries.iter().find(|i| i.code == code)
    }

    pub fn total_weight(&self) -> f64 {
        self.active().map(|i| i.weight).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for IndicatorTable {
    /// US liquidity composite built from six FRED series.
    fn default() -> Self {
        Self::new(vec![
            IndicatorConfig::new("RRPONTSYD", "Reverse Repo (RRP)", 0.25, Polarity::Inverted)
                .with_description(
                    "Overnight reverse repurchase agreements, the facility the Fed uses to absorb \
                     excess liquidity. Higher balances mean more cash parked away from markets.",
                ),
            IndicatorConfig::new("WDTGAL", "TGA (Treasury General Account)", 0.15, Polarity::Inverted)
                .with_description(
                    "The Treasury's operating balance held at the Fed. Rising balances drain \
                     reserves from the banking system; falling balances add them back.",
                ),
            IndicatorConfig::new("M2SL", "M2 Money Supply", 0.20, Polarity::Normal)
                .with_description(
                    "Broad money: currency, demand deposits and savings deposits. \
                     Shows the overall size of the liquidity pool.",
                ),
            IndicatorConfig::new("FEDFUNDS", "Federal Funds Rate", 0.20, Polarity::Inverted)
                .with_description(
                    "Overnight interbank lending rate targeted by the Fed; reflects the \
                     direction of monetary policy.",
                ),
            IndicatorConfig::new("BUSLOANS", "C&I Loans", 0.10, Polarity::Normal)
                .with_description(
                    "Commercial and industrial loans extended by banks to businesses; \
                     a gauge of credit demand and economic vigor.",
                ),
            IndicatorConfig::new("BAMLH0A0HYM2", "High-Yield Spread", 0.10, Polarity::Inverted)
                .with_description(
                    "Option-adjusted spread of high-yield corporate bonds over Treasuries; \
                     reflects stress in financial markets.",
                ),
        ])
    }
}
