//! Rolling high-water-mark drawdown detection.
//!
//! The peak is taken over the pruned history *including* the value just
//! observed, so a fresh history of one sample reports zero drawdown.

use std::sync::Arc;
use std::time::Duration;

use corelib::{PriceHistory, PriceSample};
use store::StateStore;
use tracing::{error, info, instrument};

use crate::recall;
use crate::rolling_window::RollingWindow;

/// How qualifying runs that follow a drawdown alert are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepeatPolicy {
    /// Every run past the threshold alerts.
    #[default]
    Always,

    /// After an alert, further qualifying runs stay quiet for this long.
    Cooldown(Duration),
}

impl RepeatPolicy {
    fn allows(&self, last_alert_ms: Option<u64>, now_ms: u64) -> bool {
        match (self, last_alert_ms) {
            (RepeatPolicy::Always, _) | (RepeatPolicy::Cooldown(_), None) => true,
            (RepeatPolicy::Cooldown(period), Some(last)) => {
                now_ms.saturating_sub(last) >= saturating_ms(*period)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawdownConfig {
    pub window: Duration,

    /// Fractional drop from the peak that counts as a drawdown (0.01 = 1%).
    pub drop_threshold: f64,

    pub repeat: RepeatPolicy,
}

impl DrawdownConfig {
    fn window_ms(&self) -> u64 {
        saturating_ms(self.window)
    }
}

fn saturating_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawdownReport {
    pub current: f64,

    /// Highest value inside the window, current sample included.
    pub peak: f64,

    /// `(peak - current) / peak`, or 0 when the peak is not positive.
    pub drop_rate: f64,

    /// Drop rate reached the threshold.
    pub drop: bool,

    /// `drop`, after the repeat policy was applied.
    pub alert: bool,

    /// Samples retained after this observation.
    pub samples: usize,

    /// Samples pruned because they fell out of the window.
    pub pruned: usize,
}

/// Pure detector: history in, updated history and verdict out.
#[derive(Debug, Clone, Copy)]
pub struct DrawdownDetector {
    config: DrawdownConfig,
}

impl DrawdownDetector {
    pub fn new(config: DrawdownConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DrawdownConfig {
        &self.config
    }

    pub fn observe(
        &self,
        history: PriceHistory,
        current: f64,
        now_ms: u64,
    ) -> (PriceHistory, DrawdownReport) {
        let mut window = RollingWindow::from_samples(self.config.window_ms(), history.samples);

        let pruned = window.evict_expired(now_ms);
        window.push(PriceSample {
            ts_ms: now_ms,
            value: current,
        });

        let peak = window.max().unwrap_or(current);
        let drop_rate = if peak > 0.0 {
            (peak - current) / peak
        } else {
            0.0
        };
        let drop = drop_rate >= self.config.drop_threshold;
        let alert = drop && self.config.repeat.allows(history.last_alert_ms, now_ms);

        let report = DrawdownReport {
            current,
            peak,
            drop_rate,
            drop,
            alert,
            samples: window.len(),
            pruned,
        };

        let next = PriceHistory {
            samples: window.into_samples(),
            last_alert_ms: if alert {
                Some(now_ms)
            } else {
                history.last_alert_ms
            },
        };

        (next, report)
    }
}

/// Detector bound to the persisted [`PriceHistory`].
pub struct DrawdownMonitor {
    detector: DrawdownDetector,
    store: Arc<dyn StateStore>,
}

impl DrawdownMonitor {
    pub fn new(config: DrawdownConfig, store: Arc<dyn StateStore>) -> Self {
        Self {
            detector: DrawdownDetector::new(config),
            store,
        }
    }

    pub fn config(&self) -> &DrawdownConfig {
        self.detector.config()
    }

    /// Load the series, fold in `current`, write the whole series back.
    #[instrument(skip(self), target = "drawdown")]
    pub async fn observe(&self, current: f64, now_ms: u64) -> DrawdownReport {
        let history: PriceHistory =
            recall::or_default(self.store.load_price_history().await, "price history");

        let (next, report) = self.detector.observe(history, current, now_ms);

        if let Err(e) = self.store.save_price_history(&next).await {
            error!(error = %e, "failed to persist price history");
        }

        info!(
            current,
            peak = report.peak,
            drop_rate = report.drop_rate,
            drop = report.drop,
            alert = report.alert,
            samples = report.samples,
            pruned = report.pruned,
            "drawdown evaluated"
        );

        report
    }
}
