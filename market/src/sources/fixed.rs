use async_trait::async_trait;

use crate::errors::SourceError;
use crate::source::QuoteSource;

/// Always answers with the configured value.
pub struct FixedPrice {
    label: String,
    value: f64,
}

impl FixedPrice {
    pub fn new(label: String, value: f64) -> Self {
        Self { label, value }
    }
}

#[async_trait]
impl QuoteSource for FixedPrice {
    fn label(&self) -> &str {
        &self.label
    }

    async fn fetch(&self) -> Result<f64, SourceError> {
        Ok(self.value)
    }
}
