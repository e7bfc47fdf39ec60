//! Bank of Taiwan board rates (`GET /xrt/flcsv/0/day`).
//!
//! Each CSV row carries the buying block followed by the selling block:
//! `USD,本行買入,<cash>,<spot>,<forwards..>,本行賣出,<cash>,<spot>,<forwards..>`.
//! The selling block is located by its marker so a change in the number of
//! forward columns does not shift the rate we read.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::errors::SourceError;
use crate::source::QuoteSource;

pub const BOT_BASE_URL: &str = "https://rate.bot.com.tw";

const SELL_MARKER: &str = "本行賣出";

/// Column positions used when a row carries no selling marker.
const FALLBACK_CASH_SELL: usize = 12;
const FALLBACK_SPOT_SELL: usize = 13;

/// Which selling rate to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateColumn {
    CashSell,
    SpotSell,
}

impl RateColumn {
    fn offset_from_marker(self) -> usize {
        match self {
            RateColumn::CashSell => 1,
            RateColumn::SpotSell => 2,
        }
    }

    fn fallback_index(self) -> usize {
        match self {
            RateColumn::CashSell => FALLBACK_CASH_SELL,
            RateColumn::SpotSell => FALLBACK_SPOT_SELL,
        }
    }
}

pub struct BankOfTaiwanRate {
    http: Client,
    label: String,
    url: String,
    currency: String,
    column: RateColumn,
}

impl BankOfTaiwanRate {
    pub fn new(http: Client, label: String, currency: &str, column: RateColumn) -> Self {
        Self::with_base_url(http, label, BOT_BASE_URL, currency, column)
    }

    pub fn with_base_url(
        http: Client,
        label: String,
        base_url: &str,
        currency: &str,
        column: RateColumn,
    ) -> Self {
        Self {
            http,
            label,
            url: format!("{}/xrt/flcsv/0/day", base_url.trim_end_matches('/')),
            currency: currency.to_string(),
            column,
        }
    }
}

/// Read the selling rate of `currency` from the daily CSV.
pub fn parse_rates_csv(body: &[u8], currency: &str, column: RateColumn) -> Result<f64, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body);

    for record in reader.records() {
        let record = record?;

        if !row_is_currency(record.get(0), currency) {
            continue;
        }

        let index = record
            .iter()
            .position(|field| field == SELL_MARKER)
            .map(|marker| marker + column.offset_from_marker())
            .unwrap_or(column.fallback_index());

        let raw = record
            .get(index)
            .ok_or_else(|| SourceError::MissingField(format!("{currency} column {index}")))?;

        return raw
            .parse::<f64>()
            .map_err(|_| SourceError::InvalidValue(format!("{currency} rate {raw:?}")));
    }

    Err(SourceError::MissingField(format!("currency {currency}")))
}

/// The first field holds the code, sometimes padded or followed by a name.
fn row_is_currency(first: Option<&str>, currency: &str) -> bool {
    first
        .map(|c| c.trim_start_matches('\u{feff}'))
        .and_then(|c| c.split_whitespace().next())
        .is_some_and(|code| code.eq_ignore_ascii_case(currency))
}

#[async_trait]
impl QuoteSource for BankOfTaiwanRate {
    fn label(&self) -> &str {
        &self.label
    }

    #[instrument(skip(self), fields(currency = %self.currency), level = "debug")]
    async fn fetch(&self) -> Result<f64, SourceError> {
        let body = self
            .http
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let rate = parse_rates_csv(&body, &self.currency, self.column)?;
        debug!(rate, column = ?self.column, "bank of taiwan rate fetched");
        Ok(rate)
    }
}
