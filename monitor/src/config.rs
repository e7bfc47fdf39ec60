use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use engine::{DrawdownConfig, GateConfig, RepeatPolicy};
use market::{SourceSpec, SpecError};
use thiserror::Error;

pub const DEFAULT_TRADED_SOURCES: &str = "max:usdttwd,bitopro:usdt_twd";
pub const DEFAULT_REFERENCE_SOURCES: &str = "bot:USD,erapi:USD/TWD";
pub const DEFAULT_WATCH_SOURCES: &str = DEFAULT_TRADED_SOURCES;

/// Largest period whose millisecond count still fits a `u64` timestamp.
const MAX_SECS: u64 = u64::MAX / 1000;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("{var} has a bad source spec: {source}")]
    Sources {
        var: &'static str,
        #[source]
        source: SpecError,
    },

    #[error("{var} must name at least one source")]
    EmptyChain { var: &'static str },
}

/// Bot API credentials. Both parts must be present for delivery.
#[derive(Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Everything one invocation needs, read once at startup.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    /// Spread threshold and re-alert hysteresis, both in TWD.
    pub gate: GateConfig,

    /// Fallback chains, highest priority first.
    pub traded_sources: Vec<SourceSpec>,
    pub reference_sources: Vec<SourceSpec>,

    /// Chain for the drawdown path. Empty disables that path.
    pub watch_sources: Vec<SourceSpec>,

    pub drawdown: DrawdownConfig,

    /// Upper bound on each individual source call.
    pub source_timeout: Duration,

    /// Directory holding `alert_state.json` and `price_history.json`.
    pub state_dir: PathBuf,

    /// `None` when credentials are missing; alerts are then only logged.
    pub telegram: Option<TelegramConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable lookup. Unset and blank values take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let threshold: f64 = number(&get, "SPREAD_THRESHOLD", 0.15)?;
        if !threshold.is_finite() {
            return Err(invalid("SPREAD_THRESHOLD", threshold, "must be finite"));
        }
        let hysteresis: f64 = number(&get, "SPREAD_HYSTERESIS", 0.03)?;
        if !(hysteresis.is_finite() && hysteresis >= 0.0) {
            return Err(invalid("SPREAD_HYSTERESIS", hysteresis, "must be finite and >= 0"));
        }

        let traded_sources = chain(&get, "TRADED_SOURCES", DEFAULT_TRADED_SOURCES)?;
        let reference_sources = chain(&get, "REFERENCE_SOURCES", DEFAULT_REFERENCE_SOURCES)?;
        for (var, specs) in [
            ("TRADED_SOURCES", &traded_sources),
            ("REFERENCE_SOURCES", &reference_sources),
        ] {
            if specs.is_empty() {
                return Err(ConfigError::EmptyChain { var });
            }
        }

        // Set-but-empty is the way to switch drawdown off, so no `get` here.
        let watch_sources = match lookup("WATCH_SOURCES") {
            Some(raw) => SourceSpec::parse_list(&raw).map_err(|source| ConfigError::Sources {
                var: "WATCH_SOURCES",
                source,
            })?,
            None => parse_chain("WATCH_SOURCES", DEFAULT_WATCH_SOURCES)?,
        };

        let window_secs: u64 = number(&get, "DRAWDOWN_WINDOW_SECS", 3600)?;
        if !(1..=MAX_SECS).contains(&window_secs) {
            return Err(invalid("DRAWDOWN_WINDOW_SECS", window_secs, "must be in 1..=u64::MAX/1000"));
        }

        let drop_threshold = number(&get, "DRAWDOWN_THRESHOLD", 0.01)?;
        if !(drop_threshold > 0.0 && drop_threshold <= 1.0) {
            return Err(invalid("DRAWDOWN_THRESHOLD", drop_threshold, "must be in (0, 1]"));
        }

        let repeat = match get("DRAWDOWN_REPEAT") {
            Some(raw) => parse_repeat(&raw)?,
            None => RepeatPolicy::default(),
        };

        let timeout_secs: u64 = number(&get, "SOURCE_TIMEOUT_SECS", 10)?;
        if timeout_secs == 0 {
            return Err(invalid("SOURCE_TIMEOUT_SECS", timeout_secs, "must be > 0"));
        }

        let telegram = match (get("TG_TOKEN"), get("TG_CHAT_ID")) {
            (Some(token), Some(chat_id)) => Some(TelegramConfig { token, chat_id }),
            _ => None,
        };

        Ok(Self {
            gate: GateConfig {
                threshold,
                hysteresis,
            },
            traded_sources,
            reference_sources,
            watch_sources,
            drawdown: DrawdownConfig {
                window: Duration::from_secs(window_secs),
                drop_threshold,
                repeat,
            },
            source_timeout: Duration::from_secs(timeout_secs),
            state_dir: get("STATE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".state")),
            telegram,
        })
    }

    pub fn drawdown_enabled(&self) -> bool {
        !self.watch_sources.is_empty()
    }
}

fn invalid(var: &'static str, value: impl ToString, reason: &'static str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason,
    }
}

fn number<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(var) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| invalid(var, raw, "not a valid number")),
    }
}

fn chain(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: &str,
) -> Result<Vec<SourceSpec>, ConfigError> {
    parse_chain(var, &get(var).unwrap_or_else(|| default.to_string()))
}

fn parse_chain(var: &'static str, raw: &str) -> Result<Vec<SourceSpec>, ConfigError> {
    SourceSpec::parse_list(raw).map_err(|source| ConfigError::Sources { var, source })
}

/// `always` or `cooldown:<secs>`.
fn parse_repeat(raw: &str) -> Result<RepeatPolicy, ConfigError> {
    let lowered = raw.to_ascii_lowercase();
    if lowered == "always" {
        return Ok(RepeatPolicy::Always);
    }

    lowered
        .strip_prefix("cooldown:")
        .and_then(|secs| secs.trim().parse::<u64>().ok())
        .filter(|secs| (1..=MAX_SECS).contains(secs))
        .map(|secs| RepeatPolicy::Cooldown(Duration::from_secs(secs)))
        .ok_or_else(|| invalid("DRAWDOWN_REPEAT", raw, "expected `always` or `cooldown:<secs>`"))
}
