//! Run-once USDT/TWD spread and drawdown alerter.
//!
//! Meant to be started by an external scheduler (cron, CI). All state that
//! must survive between invocations goes through [`store::StateStore`].

pub mod config;
pub mod runner;
pub mod startup;

pub use config::{AppConfig, ConfigError, TelegramConfig};
pub use runner::{Monitor, PathOutcome, RunReport, SkipReason, WatchSource, sink_from_config};
