//! open.er-api.com latest rates (`GET /v6/latest/{BASE}`).

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::errors::SourceError;
use crate::source::QuoteSource;

pub const ERAPI_BASE_URL: &str = "https://open.er-api.com";

#[derive(Debug, Deserialize)]
struct Latest {
    result: String,
    #[serde(default)]
    rates: HashMap<String, f64>,
}

pub struct ErApiRate {
    http: Client,
    label: String,
    url: String,
    quote: String,
}

impl ErApiRate {
    pub fn new(http: Client, label: String, base: &str, quote: &str) -> Self {
        Self::with_base_url(http, label, ERAPI_BASE_URL, base, quote)
    }

    pub fn with_base_url(http: Client, label: String, base_url: &str, base: &str, quote: &str) -> Self {
        let url = format!("{}/v6/latest/{}", base_url.trim_end_matches('/'), base);
        Self {
            http,
            label,
            url,
            quote: quote.to_string(),
        }
    }
}

pub fn parse_rate(body: &str, quote: &str) -> Result<f64, SourceError> {
    let latest: Latest = serde_json::from_str(body)?;
    if latest.result != "success" {
        return Err(SourceError::InvalidValue(format!("result = {}", latest.result)));
    }
    latest
        .rates
        .get(quote)
        .copied()
        .ok_or_else(|| SourceError::MissingField(format!("rates.{quote}")))
}

#[async_trait]
impl QuoteSource for ErApiRate {
    fn label(&self) -> &str {
        &self.label
    }

    #[instrument(skip(self), fields(url = %self.url, quote = %self.quote), level = "debug")]
    async fn fetch(&self) -> Result<f64, SourceError> {
        let body = self
            .http
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let rate = parse_rate(&body, &self.quote)?;
        debug!(rate, "er-api rate fetched");
        Ok(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{"result":"success","base_code":"USD","time_last_update_unix":1718000000,"rates":{"USD":1,"TWD":32.31,"JPY":157.2}}"#;

    #[test]
    fn reads_quote_rate() {
        assert_eq!(parse_rate(BODY, "TWD").unwrap(), 32.31);
    }

    #[test]
    fn unknown_quote_is_missing() {
        assert!(matches!(parse_rate(BODY, "XYZ"), Err(SourceError::MissingField(_))));
    }

    #[test]
    fn error_result_is_rejected() {
        let body = r#"{"result":"error","error-type":"unsupported-code"}"#;
        assert!(matches!(parse_rate(body, "TWD"), Err(SourceError::InvalidValue(_))));
    }
}
