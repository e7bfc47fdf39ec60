//! Alert-decision state machine.
//!
//! Each component has a pure core (`evaluate`, `HysteresisGate`,
//! `DrawdownDetector`) and, where it owns persisted state, a thin wrapper
//! that loads, decides and writes back through a [`store::StateStore`].

pub mod drawdown;
pub mod gate;
pub mod rolling_window;
pub mod signal;

mod recall;

pub use drawdown::{DrawdownConfig, DrawdownDetector, DrawdownMonitor, DrawdownReport, RepeatPolicy};
pub use gate::{GateConfig, GateDecision, GateOutcome, HysteresisGate, SpreadGate};
pub use signal::{Signal, SignalError, evaluate};
