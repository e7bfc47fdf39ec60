//! Records persisted between invocations.
//!
//! Both records are rewritten in full on every run that reaches their owner,
//! so they only need to round-trip faithfully through the state store.

use serde::{Deserialize, Serialize};

/// Last spread evaluated by the threshold gate, alert or not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertState {
    pub last_signal: f64,
}

/// One observation of the watched quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub ts_ms: u64,
    pub value: f64,
}

/// Time-windowed series owned by the drawdown detector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    /// Time-ascending; gaps from missed runs are allowed.
    pub samples: Vec<PriceSample>,

    /// When the last drawdown alert was raised (ms since epoch).
    #[serde(default)]
    pub last_alert_ms: Option<u64>,
}

impl PriceHistory {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_without_alert_marker_still_parses() {
        let raw = r#"{"samples":[{"ts_ms":1000,"value":31.5}]}"#;
        let h: PriceHistory = serde_json::from_str(raw).unwrap();

        assert_eq!(h.len(), 1);
        assert_eq!(h.last_alert_ms, None);
    }

    #[test]
    fn alert_state_defaults_to_zero() {
        assert_eq!(AlertState::default().last_signal, 0.0);
    }
}
