use std::fmt;

use serde::{Deserialize, Serialize};

/// Which market quantity a resolver chain produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    /// Price the asset actually trades at (e.g. USDT/TWD on an exchange).
    Traded,

    /// Price the traded one is compared against (e.g. a bank's USD/TWD rate).
    Reference,

    /// Quantity watched for drawdowns from its rolling high-water mark.
    Watched,
}

impl Quantity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Quantity::Traded => "traded",
            Quantity::Reference => "reference",
            Quantity::Watched => "watched",
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved value together with the source that answered.
///
/// Quotes are never persisted. `value` is finite and strictly positive:
/// anything else is rejected before a `Quote` is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub quantity: Quantity,
    pub value: f64,

    /// Label of the source adapter that produced the value.
    pub source: String,

    /// Observation time (ms since epoch).
    pub observed_ms: u64,
}
