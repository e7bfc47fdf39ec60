//! Persistence of state between independent, stateless invocations.
//!
//! Loads distinguish three outcomes explicitly: a record (`Ok(Some)`), no
//! record yet (`Ok(None)`), and a record that exists but cannot be used
//! (`Err`). Callers pick their own fallback policy.

pub mod errors;
pub mod json_file;
pub mod memory;

use async_trait::async_trait;
use corelib::{AlertState, PriceHistory};

pub use errors::StoreError;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load_alert_state(&self) -> Result<Option<AlertState>, StoreError>;

    /// Replaces any previously stored alert state.
    async fn save_alert_state(&self, state: &AlertState) -> Result<(), StoreError>;

    async fn load_price_history(&self) -> Result<Option<PriceHistory>, StoreError>;

    /// Replaces any previously stored history in full.
    async fn save_price_history(&self, history: &PriceHistory) -> Result<(), StoreError>;
}
