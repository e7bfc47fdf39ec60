//! MAX exchange ticker (`GET /api/v2/tickers/{market}`).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::NumberLike;
use crate::errors::SourceError;
use crate::source::QuoteSource;

pub const MAX_BASE_URL: &str = "https://max-api.maicoin.com";

#[derive(Debug, Deserialize)]
struct Ticker {
    last: Option<NumberLike>,
}

pub struct MaxTicker {
    http: Client,
    label: String,
    url: String,
}

impl MaxTicker {
    pub fn new(http: Client, label: String, market: &str) -> Self {
        Self::with_base_url(http, label, MAX_BASE_URL, market)
    }

    pub fn with_base_url(http: Client, label: String, base_url: &str, market: &str) -> Self {
        let url = format!("{}/api/v2/tickers/{}", base_url.trim_end_matches('/'), market);
        Self { http, label, url }
    }
}

/// Extract the last traded price from a ticker body.
pub fn parse_ticker(body: &str) -> Result<f64, SourceError> {
    let ticker: Ticker = serde_json::from_str(body)?;
    ticker
        .last
        .ok_or_else(|| SourceError::MissingField("last".into()))?
        .to_f64()
}

#[async_trait]
impl QuoteSource for MaxTicker {
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
        debug!(last, "max ticker fetched");
        Ok(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_string_last() {
        let body = r#"{"at":1718000000,"buy":"31.95","sell":"31.97","open":"31.9","low":"31.8","high":"32.1","last":"31.96","vol":"1000.5"}"#;
        assert_eq!(parse_ticker(body).unwrap(), 31.96);
    }

    #[test]
    fn missing_last_is_an_error() {
        let err = parse_ticker(r#"{"error":{"code":2004,"message":"market not found"}}"#)
            .unwrap_err();
        assert!(matches!(err, SourceError::MissingField(f) if f == "last"));
    }

    #[test]
    fn base_url_is_normalised() {
        let t = MaxTicker::with_base_url(Client::new(), "max:usdttwd".into(), "http://x/", "usdttwd");
        assert_eq!(t.url, "http://x/api/v2/tickers/usdttwd");
    }
}
