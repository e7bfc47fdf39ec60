use async_trait::async_trait;

use crate::errors::SourceError;

/// Capability shared by every provider: attempt to produce one value.
///
/// Adapters own their transport and parsing. The resolver only relies on
/// this method and on the order adapters are listed in.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Stable label reported alongside a successful value.
    fn label(&self) -> &str;

    async fn fetch(&self) -> Result<f64, SourceError>;
}
