//! Provider adapters and the spec strings that select them.
//!
//! A fallback chain is configured as an ordered list such as
//! `max:usdttwd,bitopro:usdt_twd`; adding a provider to a chain is a matter
//! of appending a spec, never of branching in the caller.

pub mod bank_of_taiwan;
pub mod bitopro;
pub mod erapi;
pub mod fixed;
pub mod max;

use std::fmt;
use std::str::FromStr;

use reqwest::Client;
use serde::Deserialize;

use crate::errors::{SourceError, SpecError};
use crate::source::QuoteSource;

pub use bank_of_taiwan::{BankOfTaiwanRate, RateColumn};
pub use bitopro::BitoproTicker;
pub use erapi::ErApiRate;
pub use fixed::FixedPrice;
pub use max::MaxTicker;

/// One entry of a configured fallback chain.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceSpec {
    /// `max:<market>`: last trade on the MAX exchange.
    Max { market: String },

    /// `bitopro:<pair>`: last trade on BitoPro.
    Bitopro { pair: String },

    /// `bot:<CUR>` / `bot-cash:<CUR>`: Bank of Taiwan selling rate.
    BankOfTaiwan { currency: String, column: RateColumn },

    /// `erapi:<BASE>/<QUOTE>`: open.er-api.com mid rate.
    ErApi { base: String, quote: String },

    /// `fixed:<value>`: constant, for manual overrides.
    Fixed { value: f64 },
}

impl SourceSpec {
    /// Parse a comma-separated list, ignoring blank entries.
    pub fn parse_list(raw: &str) -> Result<Vec<SourceSpec>, SpecError> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(SourceSpec::from_str)
            .collect()
    }

    /// Instantiate the adapter, sharing `http` across adapters.
    pub fn build(&self, http: &Client) -> Box<dyn QuoteSource> {
        let label = self.to_string();
        match self {
            SourceSpec::Max { market } => Box::new(MaxTicker::new(http.clone(), label, market)),
            SourceSpec::Bitopro { pair } => Box::new(BitoproTicker::new(http.clone(), label, pair)),
            SourceSpec::BankOfTaiwan { currency, column } => Box::new(BankOfTaiwanRate::new(
                http.clone(),
                label,
                currency,
                *column,
            )),
            SourceSpec::ErApi { base, quote } => {
                Box::new(ErApiRate::new(http.clone(), label, base, quote))
            }
            SourceSpec::Fixed { value } => Box::new(FixedPrice::new(label, *value)),
        }
    }
}

impl FromStr for SourceSpec {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SpecError::Empty);
        }

        let (kind, arg) = match s.split_once(':') {
            Some((k, a)) => (k.trim().to_ascii_lowercase(), a.trim()),
            None => (s.to_ascii_lowercase(), ""),
        };

        let require = |hint: &'static str| {
            if arg.is_empty() {
                Err(SpecError::MissingArgument {
                    kind: kind.clone(),
                    hint,
                })
            } else {
                Ok(arg)
            }
        };

        match kind.as_str() {
            "max" => Ok(SourceSpec::Max {
                market: require("market, e.g. usdttwd")?.to_ascii_lowercase(),
            }),
            "bitopro" => Ok(SourceSpec::Bitopro {
                pair: require("pair, e.g. usdt_twd")?.to_ascii_lowercase(),
            }),
            "bot" | "bot-cash" => {
                let currency = require("currency, e.g. USD")?.to_ascii_uppercase();
                let column = if kind == "bot" {
                    RateColumn::SpotSell
                } else {
                    RateColumn::CashSell
                };
                Ok(SourceSpec::BankOfTaiwan { currency, column })
            }
            "erapi" => {
                let pair = require("pair, e.g. USD/TWD")?;
                match pair.split_once('/') {
                    Some((b, q)) if !b.trim().is_empty() && !q.trim().is_empty() => {
                        Ok(SourceSpec::ErApi {
                            base: b.trim().to_ascii_uppercase(),
                            quote: q.trim().to_ascii_uppercase(),
                        })
                    }
                    _ => Err(SpecError::InvalidArgument {
                        kind: kind.clone(),
                        arg: pair.to_string(),
                    }),
                }
            }
            "fixed" => {
                let raw = require("value, e.g. 31.5")?;
                match raw.parse::<f64>() {
                    Ok(value) if value.is_finite() && value > 0.0 => Ok(SourceSpec::Fixed { value }),
                    _ => Err(SpecError::InvalidArgument {
                        kind: kind.clone(),
                        arg: raw.to_string(),
                    }),
                }
            }
            _ => Err(SpecError::UnknownKind(kind.clone())),
        }
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSpec::Max { market } => write!(f, "max:{market}"),
            SourceSpec::Bitopro { pair } => write!(f, "bitopro:{pair}"),
            SourceSpec::BankOfTaiwan { currency, column } => match column {
                RateColumn::SpotSell => write!(f, "bot:{currency}"),
                RateColumn::CashSell => write!(f, "bot-cash:{currency}"),
            },
            SourceSpec::ErApi { base, quote } => write!(f, "erapi:{base}/{quote}"),
            SourceSpec::Fixed { value } => write!(f, "fixed:{value}"),
        }
    }
}

/// Providers disagree on whether prices are JSON strings or numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum NumberLike {
    Num(f64),
    Str(String),
}

impl NumberLike {
    pub(crate) fn to_f64(&self) -> Result<f64, SourceError> {
        match self {
            NumberLike::Num(v) => Ok(*v),
            NumberLike::Str(s) => s
                .trim()
                .replace(',', "")
                .parse::<f64>()
                .map_err(|_| SourceError::InvalidValue(format!("not a number: {s:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_kind() {
        let specs = SourceSpec::parse_list(
            "max:USDTTWD, bitopro:usdt_twd,bot:usd,bot-cash:jpy,erapi:usd/twd,fixed:31.5",
        )
        .unwrap();

        assert_eq!(
            specs,
            vec![
                SourceSpec::Max {
                    market: "usdttwd".into()
                },
                SourceSpec::Bitopro {
                    pair: "usdt_twd".into()
                },
                SourceSpec::BankOfTaiwan {
                    currency: "USD".into(),
                    column: RateColumn::SpotSell
                },
                SourceSpec::BankOfTaiwan {
                    currency: "JPY".into(),
                    column: RateColumn::CashSell
                },
                SourceSpec::ErApi {
                    base: "USD".into(),
                    quote: "TWD".into()
                },
                SourceSpec::Fixed { value: 31.5 },
            ]
        );
    }

    #[test]
    fn display_round_trips_through_parse() {
        for raw in ["max:usdttwd", "bot-cash:USD", "erapi:USD/TWD", "fixed:31.5"] {
            let spec: SourceSpec = raw.parse().unwrap();
            assert_eq!(spec.to_string(), raw);
        }
    }

    #[test]
    fn blank_entries_are_skipped() {
        assert!(SourceSpec::parse_list(" , ,").unwrap().is_empty());
    }

    #[test]
    fn rejects_bad_specs() {
        assert_eq!(
            "coinbase:usd".parse::<SourceSpec>(),
            Err(SpecError::UnknownKind("coinbase".into()))
        );
        assert!(matches!(
            "max".parse::<SourceSpec>(),
            Err(SpecError::MissingArgument { .. })
        ));
        assert!(matches!(
            "erapi:USD".parse::<SourceSpec>(),
            Err(SpecError::InvalidArgument { .. })
        ));
        assert!(matches!(
            "fixed:0".parse::<SourceSpec>(),
            Err(SpecError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn number_like_accepts_strings_and_numbers() {
        let n: NumberLike = serde_json::from_str("31.52").unwrap();
        let s: NumberLike = serde_json::from_str("\"1,031.52\"").unwrap();
        let bad: NumberLike = serde_json::from_str("\"n/a\"").unwrap();

        assert_eq!(n.to_f64().unwrap(), 31.52);
        assert_eq!(s.to_f64().unwrap(), 1031.52);
        assert!(bad.to_f64().is_err());
    }
}
