//! One invocation: resolve, evaluate, gate, notify.
//!
//! The spread path and the drawdown path are independent. Either can be
//! skipped for lack of data without affecting the other, and a skipped path
//! never touches its persisted state.

use std::sync::Arc;

use corelib::{Quantity, Quote};
use engine::{DrawdownMonitor, SpreadGate};
use market::{QuoteResolver, Unavailable};
use notifier::message;
use notifier::{DisabledSink, NotificationSink, TelegramSink};
use reqwest::Client;
use store::StateStore;
use tracing::{error, info, instrument, warn};

use crate::config::{AppConfig, TelegramConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Every source of a required chain failed.
    InsufficientData,

    /// Prices resolved but could not be turned into a signal.
    InvalidSignal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathOutcome {
    /// Not configured for this deployment.
    Disabled,

    Skipped(SkipReason),

    /// Decided not to alert.
    Quiet,

    /// Decided to alert; `delivered` is false when the sink failed.
    Alerted { delivered: bool },
}

impl PathOutcome {
    pub fn reached_decision(&self) -> bool {
        matches!(self, PathOutcome::Quiet | PathOutcome::Alerted { .. })
    }

    pub fn alerted(&self) -> bool {
        matches!(self, PathOutcome::Alerted { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub spread: PathOutcome,
    pub drawdown: PathOutcome,
}

impl RunReport {
    pub fn alerted(&self) -> bool {
        self.spread.alerted() || self.drawdown.alerted()
    }

    /// `0` once any enabled path reached a decision, `2` when none could.
    ///
    /// Delivery failures do not change the status: the decision was made
    /// and its state persisted.
    pub fn exit_code(&self) -> u8 {
        if self.spread.reached_decision() || self.drawdown.reached_decision() {
            0
        } else {
            2
        }
    }
}

/// Where the drawdown path gets its price.
pub enum WatchSource {
    /// Same chain as the traded price; the traded quote is reused.
    Traded,

    Resolver(QuoteResolver),
}

struct DrawdownPath {
    source: WatchSource,
    monitor: DrawdownMonitor,
}

pub struct Monitor {
    traded: QuoteResolver,
    reference: QuoteResolver,
    gate: SpreadGate,
    drawdown: Option<DrawdownPath>,
    sink: Arc<dyn NotificationSink>,
}

impl Monitor {
    pub fn new(
        traded: QuoteResolver,
        reference: QuoteResolver,
        gate: SpreadGate,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            traded,
            reference,
            gate,
            drawdown: None,
            sink,
        }
    }

    pub fn with_drawdown(mut self, source: WatchSource, monitor: DrawdownMonitor) -> Self {
        self.drawdown = Some(DrawdownPath { source, monitor });
        self
    }

    /// Wire resolvers, gate and detector from configuration.
    pub fn from_config(
        cfg: &AppConfig,
        http: &Client,
        store: Arc<dyn StateStore>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let resolver = |quantity, specs: &[market::SourceSpec]| {
            QuoteResolver::new(
                quantity,
                specs.iter().map(|s| s.build(http)).collect(),
                cfg.source_timeout,
            )
        };

        let monitor = Self::new(
            resolver(Quantity::Traded, &cfg.traded_sources),
            resolver(Quantity::Reference, &cfg.reference_sources),
            SpreadGate::new(cfg.gate, Arc::clone(&store)),
            sink,
        );

        if !cfg.drawdown_enabled() {
            info!("no watch sources configured; drawdown path disabled");
            return monitor;
        }

        let source = if cfg.watch_sources == cfg.traded_sources {
            WatchSource::Traded
        } else {
            WatchSource::Resolver(resolver(Quantity::Watched, &cfg.watch_sources))
        };

        monitor.with_drawdown(source, DrawdownMonitor::new(cfg.drawdown, store))
    }

    #[instrument(skip(self), target = "monitor", fields(sink = self.sink.name()))]
    pub async fn run_once(&self, now_ms: u64) -> RunReport {
        let traded = self.traded.resolve(now_ms).await;

        let spread = self.spread_path(&traded, now_ms).await;
        let drawdown = self.drawdown_path(&traded, now_ms).await;

        let report = RunReport { spread, drawdown };
        info!(
            spread = ?report.spread,
            drawdown = ?report.drawdown,
            exit_code = report.exit_code(),
            "run finished"
        );
        report
    }

    async fn spread_path(&self, traded: &Result<Quote, Unavailable>, now_ms: u64) -> PathOutcome {
        let reference = self.reference.resolve(now_ms).await;

        let (traded, reference) = match (traded, &reference) {
            (Ok(t), Ok(r)) => (t, r),
            (t, r) => {
                for e in [t.as_ref().err(), r.as_ref().err()].into_iter().flatten() {
                    warn!(quantity = %e.quantity, error = %e, "spread path skipped: insufficient data");
                }
                return PathOutcome::Skipped(SkipReason::InsufficientData);
            }
        };

        let signal = match engine::evaluate(traded.value, reference.value) {
            Ok(signal) => signal,
            Err(e) => {
                warn!(error = %e, "spread path skipped: invalid signal");
                return PathOutcome::Skipped(SkipReason::InvalidSignal);
            }
        };

        info!(
            traded = traded.value,
            traded_source = %traded.source,
            reference = reference.value,
            reference_source = %reference.source,
            spread = signal.spread,
            percent = signal.percent,
            "spread evaluated"
        );

        let outcome = self.gate.check(signal.spread).await;
        if !outcome.decision.should_alert() {
            return PathOutcome::Quiet;
        }

        let text = message::spread_alert(traded, reference, &signal, self.gate.config().threshold);
        PathOutcome::Alerted {
            delivered: self.deliver("spread", &text).await,
        }
    }

    async fn drawdown_path(&self, traded: &Result<Quote, Unavailable>, now_ms: u64) -> PathOutcome {
        let Some(path) = &self.drawdown else {
            return PathOutcome::Disabled;
        };

        let watched = match &path.source {
            WatchSource::Traded => match traded {
                Ok(q) => Quote {
                    quantity: Quantity::Watched,
                    ..q.clone()
                },
                Err(_) => {
                    warn!("drawdown path skipped: traded price unavailable");
                    return PathOutcome::Skipped(SkipReason::InsufficientData);
                }
            },
            WatchSource::Resolver(resolver) => match resolver.resolve(now_ms).await {
                Ok(q) => q,
                Err(e) => {
                    warn!(error = %e, "drawdown path skipped: insufficient data");
                    return PathOutcome::Skipped(SkipReason::InsufficientData);
                }
            },
        };

        let report = path.monitor.observe(watched.value, now_ms).await;
        if !report.alert {
            return PathOutcome::Quiet;
        }

        let text = message::drawdown_alert(&watched, &report, path.monitor.config().window);
        PathOutcome::Alerted {
            delivered: self.deliver("drawdown", &text).await,
        }
    }

    async fn deliver(&self, path: &'static str, text: &str) -> bool {
        match self.sink.send(text).await {
            Ok(()) => true,
            Err(e) => {
                error!(path, sink = self.sink.name(), error = %e, "alert delivery failed");
                false
            }
        }
    }
}

/// Telegram when credentials are configured, otherwise a sink that only warns.
pub fn sink_from_config(telegram: Option<&TelegramConfig>) -> Arc<dyn NotificationSink> {
    match telegram {
        Some(tg) => Arc::new(TelegramSink::new(tg.token.clone(), &tg.chat_id)),
        None => {
            warn!("TG_TOKEN/TG_CHAT_ID not set; alerts will only be logged");
            Arc::new(DisabledSink)
        }
    }
}
