//! Threshold gate with hysteresis on repeats.
//!
//! Hysteresis only damps an already-elevated condition: the first run at or
//! above the threshold always alerts, however small the jump that got it
//! there. The last evaluated signal is persisted on every run, alert or not,
//! so a later jump is measured from what was actually seen last.

use std::sync::Arc;

use corelib::AlertState;
use store::StateStore;
use tracing::{error, info, instrument};

use crate::recall;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateConfig {
    /// Spread at or above which the condition counts as elevated.
    pub threshold: f64,

    /// Minimum change from the last signal to re-alert while elevated.
    pub hysteresis: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Signal below threshold.
    Below,

    /// Elevated, but no meaningful move since an already-elevated last run.
    Suppressed,

    Alert,
}

impl GateDecision {
    pub fn should_alert(&self) -> bool {
        matches!(self, GateDecision::Alert)
    }
}

/// What the gate saw and decided on one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateOutcome {
    pub decision: GateDecision,
    pub signal: f64,

    /// Value loaded from the previous run (0 when there was none).
    pub last_signal: f64,
}

/// Pure decision rule.
#[derive(Debug, Clone, Copy)]
pub struct HysteresisGate {
    config: GateConfig,
}

impl HysteresisGate {
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn decide(&self, current: f64, last_signal: f64) -> GateDecision {
        let GateConfig {
            threshold,
            hysteresis,
        } = self.config;

        if current < threshold {
            return GateDecision::Below;
        }

        let change = (current - last_signal).abs();
        if change <= hysteresis && last_signal >= threshold {
            return GateDecision::Suppressed;
        }

        GateDecision::Alert
    }
}

/// Gate bound to the persisted [`AlertState`].
pub struct SpreadGate {
    gate: HysteresisGate,
    store: Arc<dyn StateStore>,
}

impl SpreadGate {
    pub fn new(config: GateConfig, store: Arc<dyn StateStore>) -> Self {
        Self {
            gate: HysteresisGate::new(config),
            store,
        }
    }

    pub fn config(&self) -> &GateConfig {
        self.gate.config()
    }

    /// Load the last signal, decide, then persist `signal` unconditionally.
    ///
    /// A failed write is logged; the decision already made stands.
    #[instrument(skip(self), target = "gate")]
    pub async fn check(&self, signal: f64) -> GateOutcome {
        let prior: AlertState = recall::or_default(self.store.load_alert_state().await, "alert");

        let decision = self.gate.decide(signal, prior.last_signal);

        if let Err(e) = self
            .store
            .save_alert_state(&AlertState {
                last_signal: signal,
            })
            .await
        {
            error!(error = %e, "failed to persist alert state");
        }

        info!(
            ?decision,
            signal,
            last_signal = prior.last_signal,
            threshold = self.gate.config.threshold,
            hysteresis = self.gate.config.hysteresis,
            "spread gate evaluated"
        );

        GateOutcome {
            decision,
            signal,
            last_signal: prior.last_signal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(threshold: f64, hysteresis: f64) -> HysteresisGate {
        HysteresisGate::new(GateConfig {
            threshold,
            hysteresis,
        })
    }

    #[test]
    fn below_threshold_never_alerts() {
        let g = gate(0.2, 0.03);
        assert_eq!(g.decide(0.19, 0.0), GateDecision::Below);
        assert_eq!(g.decide(-0.5, 0.9), GateDecision::Below);
    }

    #[test]
    fn crossing_up_always_alerts_even_on_a_tiny_jump() {
        let g = gate(0.2, 0.03);
        assert_eq!(g.decide(0.2, 0.199), GateDecision::Alert);
    }

    #[test]
    fn repeat_within_hysteresis_is_suppressed() {
        let g = gate(0.2, 0.03);
        assert_eq!(g.decide(0.26, 0.25), GateDecision::Suppressed);
        assert_eq!(g.decide(0.23, 0.25), GateDecision::Suppressed);
    }

    #[test]
    fn moving_past_hysteresis_realerts_in_either_direction() {
        let g = gate(0.2, 0.03);
        assert_eq!(g.decide(0.30, 0.26), GateDecision::Alert);
        assert_eq!(g.decide(0.21, 0.30), GateDecision::Alert);
    }

    #[test]
    fn zero_hysteresis_alerts_on_every_move() {
        let g = gate(0.2, 0.0);
        assert_eq!(g.decide(0.25, 0.24), GateDecision::Alert);
        assert_eq!(g.decide(0.25, 0.25), GateDecision::Suppressed);
    }

    #[test]
    fn first_run_starts_from_zero() {
        let g = gate(0.15, 0.03);
        assert_eq!(g.decide(0.16, 0.0), GateDecision::Alert);
    }
}
