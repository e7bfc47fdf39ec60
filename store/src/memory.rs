use async_trait::async_trait;
use corelib::{AlertState, PriceHistory};
use parking_lot::Mutex;

use crate::{StateStore, StoreError};

/// Process-local store; state lives as long as the value does.
#[derive(Default)]
pub struct MemoryStore {
    alert: Mutex<Option<AlertState>>,
    history: Mutex<Option<PriceHistory>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed both records, as if written by an earlier run.
    pub fn with_state(alert: Option<AlertState>, history: Option<PriceHistory>) -> Self {
        Self {
            alert: Mutex::new(alert),
            history: Mutex::new(history),
        }
    }

    pub fn alert_state(&self) -> Option<AlertState> {
        *self.alert.lock()
    }

    pub fn price_history(&self) -> Option<PriceHistory> {
        self.history.lock().clone()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load_alert_state(&self) -> Result<Option<AlertState>, StoreError> {
        Ok(*self.alert.lock())
    }

    async fn save_alert_state(&self, state: &AlertState) -> Result<(), StoreError> {
        *self.alert.lock() = Some(*state);
        Ok(())
    }

    async fn load_price_history(&self) -> Result<Option<PriceHistory>, StoreError> {
        Ok(self.history.lock().clone())
    }

    async fn save_price_history(&self, history: &PriceHistory) -> Result<(), StoreError> {
        *self.history.lock() = Some(history.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::PriceSample;

    #[tokio::test]
    async fn starts_empty() {
        let s = MemoryStore::new();
        assert!(s.load_alert_state().await.unwrap().is_none());
        assert!(s.load_price_history().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_replaces_previous_value() {
        let s = MemoryStore::new();
        s.save_alert_state(&AlertState { last_signal: 0.2 }).await.unwrap();
        s.save_alert_state(&AlertState { last_signal: 0.1 }).await.unwrap();

        let h = PriceHistory {
            samples: vec![PriceSample { ts_ms: 1, value: 2.0 }],
            last_alert_ms: None,
        };
        s.save_price_history(&h).await.unwrap();

        assert_eq!(s.alert_state(), Some(AlertState { last_signal: 0.1 }));
        assert_eq!(s.load_price_history().await.unwrap(), Some(h));
    }
}
