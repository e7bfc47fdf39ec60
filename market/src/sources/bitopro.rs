//! BitoPro ticker (`GET /v3/tickers/{pair}`).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::NumberLike;
use crate::errors::SourceError;
use crate::source::QuoteSource;

pub const BITOPRO_BASE_URL: &str = "https://api.bitopro.com";

#[derive(Debug, Deserialize)]
struct Envelope {
    data: Option<TickerData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TickerData {
    last_price: Option<NumberLike>,
}

pub struct BitoproTicker {
    http: Client,
    label: String,
    url: String,
}

impl BitoproTicker {
    pub fn new(http: Client, label: String, pair: &str) -> Self {
        Self::with_base_url(http, label, BITOPRO_BASE_URL, pair)
    }

    pub fn with_base_url(http: Client, label: String, base_url: &str, pair: &str) -> Self {
        let url = format!("{}/v3/tickers/{}", base_url.trim_end_matches('/'), pair);
        Self { http, label, url }
    }
}

pub fn parse_ticker(body: &str) -> Result<f64, SourceError> {
    let envelope: Envelope = serde_json::from_str(body)?;
    envelope
        .data
        .ok_or_else(|| SourceError::MissingField("data".into()))?
        .last_price
        .ok_or_else(|| SourceError::MissingField("data.lastPrice".into()))?
        .to_f64()
}

#[async_trait]
impl QuoteSource for BitoproTicker {
    fn label(&self) -> &str {
        &self.label
    }

    #[instrument(skip(self), fields(url = %self.url), level = "debug")]
    async fn fetch(&self) -> Result<f64, SourceError> {
        let body = self
            .http
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let last = parse_ticker(&body)?;
        debug!(last, "bitopro ticker fetched");
        Ok(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_last_price() {
        let body = r#"{"data":{"pair":"usdt_twd","lastPrice":"32.05","isBuyer":true,"priceChange24hr":"0.1"}}"#;
        assert_eq!(parse_ticker(body).unwrap(), 32.05);
    }

    #[test]
    fn missing_data_is_an_error() {
        assert!(matches!(
            parse_ticker(r#"{"error":"pair not found"}"#),
            Err(SourceError::MissingField(_))
        ));
    }
}
