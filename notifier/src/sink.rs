use async_trait::async_trait;
use tracing::warn;

use crate::errors::NotifyError;

/// Where alert text goes.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Stand-in used when no delivery credentials are configured.
///
/// Decisions are still made and state is still persisted; only the
/// message is dropped, with a warning so the gap is visible in the logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledSink;

#[async_trait]
impl NotificationSink for DisabledSink {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        warn!(chars = text.chars().count(), "delivery not configured; alert not sent");
        Ok(())
    }
}
