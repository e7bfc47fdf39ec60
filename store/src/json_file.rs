use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use corelib::{AlertState, PriceHistory};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::{StateStore, StoreError};

pub const ALERT_STATE_FILE: &str = "alert_state.json";
pub const PRICE_HISTORY_FILE: &str = "price_history.json";

/// One JSON document per record inside a state directory.
///
/// Writes go to a sibling temp file that is then renamed over the target,
/// so readers only ever see a complete previous or complete new document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    async fn read<T: DeserializeOwned>(&self, file: &str) -> Result<Option<T>, StoreError> {
        let path = self.path(file);

        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no persisted state");
                return Ok(None);
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|source| StoreError::Corrupt { path, source })
    }

    async fn write<T: Serialize>(&self, file: &str, value: &T) -> Result<(), StoreError> {
        let path = self.path(file);
        let tmp = self.path(&format!("{file}.tmp"));
        let body = serde_json::to_vec_pretty(value)?;

        let io = |path: &Path| {
            let path = path.to_path_buf();
            move |source| StoreError::Io { path, source }
        };

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(io(&self.dir))?;
        tokio::fs::write(&tmp, &body).await.map_err(io(&tmp))?;
        tokio::fs::rename(&tmp, &path).await.map_err(io(&path))?;

        debug!(path = %path.display(), bytes = body.len(), "state persisted");
        Ok(())
    }
}

#[async_trait]
impl StateStore for JsonFileStore {
    #[instrument(skip(self), target = "store")]
    async fn load_alert_state(&self) -> Result<Option<AlertState>, StoreError> {
        self.read(ALERT_STATE_FILE).await
    }

    #[instrument(skip(self), target = "store", fields(last_signal = state.last_signal))]
    async fn save_alert_state(&self, state: &AlertState) -> Result<(), StoreError> {
        self.write(ALERT_STATE_FILE, state).await
    }

    #[instrument(skip(self), target = "store")]
    async fn load_price_history(&self) -> Result<Option<PriceHistory>, StoreError> {
        self.read(PRICE_HISTORY_FILE).await
    }

    #[instrument(skip(self, history), target = "store", fields(samples = history.len()))]
    async fn save_price_history(&self, history: &PriceHistory) -> Result<(), StoreError> {
        self.write(PRICE_HISTORY_FILE, history).await
    }
}
