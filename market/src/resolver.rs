use std::time::Duration;

use common::logger::warn_if_slow;
use corelib::{Quantity, Quote};
use tracing::{info, instrument, warn};

use crate::errors::{SourceError, Unavailable};
use crate::source::QuoteSource;

/// Calls slower than this are reported even when they succeed.
const SLOW_SOURCE: Duration = Duration::from_secs(3);

/// Ordered fallback chain for one quantity.
///
/// Sources are tried strictly in priority order and the first success wins;
/// later sources are never invoked once one has answered.
pub struct QuoteResolver {
    quantity: Quantity,
    sources: Vec<Box<dyn QuoteSource>>,
    timeout: Duration,
}

impl QuoteResolver {
    pub fn new(quantity: Quantity, sources: Vec<Box<dyn QuoteSource>>, timeout: Duration) -> Self {
        Self {
            quantity,
            sources,
            timeout,
        }
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn labels(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.label()).collect()
    }

    /// Resolve the quantity, observed at `now_ms`.
    ///
    /// A timeout, transport error or parse error advances the chain exactly
    /// like an explicit failure. So does a value that is non-finite or not
    /// strictly positive, which keeps "no price" apart from "price 0".
    #[instrument(skip(self), fields(quantity = %self.quantity, sources = self.sources.len()))]
    pub async fn resolve(&self, now_ms: u64) -> Result<Quote, Unavailable> {
        let mut failures = Vec::new();

        for source in &self.sources {
            let label = source.label();

            match self.attempt(source.as_ref()).await {
                Ok(value) => {
                    info!(source = label, value, "quote resolved");
                    return Ok(Quote {
                        quantity: self.quantity,
                        value,
                        source: label.to_string(),
                        observed_ms: now_ms,
                    });
                }
                Err(e) => {
                    warn!(source = label, error = %e, "quote source failed; trying next");
                    failures.push((label.to_string(), e));
                }
            }
        }

        warn!(attempted = failures.len(), "all quote sources failed");
        Err(Unavailable {
            quantity: self.quantity,
            failures,
        })
    }

    async fn attempt(&self, source: &dyn QuoteSource) -> Result<f64, SourceError> {
        let fetched = warn_if_slow(
            source.label(),
            SLOW_SOURCE,
            tokio::time::timeout(self.timeout, source.fetch()),
        )
        .await;

        let value = match fetched {
            Ok(result) => result?,
            Err(_) => return Err(SourceError::Timeout(self.timeout)),
        };

        if !value.is_finite() || value <= 0.0 {
            return Err(SourceError::InvalidValue(format!(
                "expected a positive price, got {value}"
            )));
        }

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        label: String,
        outcome: Option<f64>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl QuoteSource for Scripted {
        fn label(&self) -> &str {
            &self.label
        }

        async fn fetch(&self) -> Result<f64, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome
                .ok_or_else(|| SourceError::MissingField("last".into()))
        }
    }

    struct Hanging;

    #[async_trait]
    impl QuoteSource for Hanging {
        fn label(&self) -> &str {
            "hanging"
        }

        async fn fetch(&self) -> Result<f64, SourceError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(1.0)
        }
    }

    fn chain(outcomes: &[Option<f64>]) -> (QuoteResolver, Vec<Arc<AtomicUsize>>) {
        let mut counters = Vec::new();
        let sources = outcomes
            .iter()
            .enumerate()
            .map(|(i, outcome)| {
                let calls = Arc::new(AtomicUsize::new(0));
                counters.push(calls.clone());
                Box::new(Scripted {
                    label: format!("src{i}"),
                    outcome: *outcome,
                    calls,
                }) as Box<dyn QuoteSource>
            })
            .collect();

        (
            QuoteResolver::new(Quantity::Traded, sources, Duration::from_secs(1)),
            counters,
        )
    }

    #[tokio::test]
    async fn first_success_wins() {
        let (r, calls) = chain(&[Some(31.9), Some(32.5)]);

        let q = r.resolve(42).await.unwrap();
        assert_eq!(q.value, 31.9);
        assert_eq!(q.source, "src0");
        assert_eq!(q.observed_ms, 42);
        assert_eq!(calls[1].load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn falls_back_past_failures() {
        let (r, calls) = chain(&[None, None, Some(32.1), Some(99.0)]);

        let q = r.resolve(0).await.unwrap();
        assert_eq!(q.value, 32.1);
        assert_eq!(q.source, "src2");
        assert_eq!(calls[3].load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn exhausted_chain_is_unavailable() {
        let (r, _) = chain(&[None, None]);

        let err = r.resolve(0).await.unwrap_err();
        assert_eq!(err.quantity, Quantity::Traded);
        assert_eq!(err.failures.len(), 2);
        assert_eq!(err.failures[1].0, "src1");
    }

    #[tokio::test]
    async fn empty_chain_is_unavailable() {
        let r = QuoteResolver::new(Quantity::Reference, Vec::new(), Duration::from_secs(1));

        let err = r.resolve(0).await.unwrap_err();
        assert!(err.failures.is_empty());
        assert!(err.to_string().contains("no sources configured"));
    }

    #[tokio::test]
    async fn zero_is_a_failure_not_a_price() {
        let (r, _) = chain(&[Some(0.0), Some(f64::NAN), Some(-1.0)]);

        let err = r.resolve(0).await.unwrap_err();
        assert_eq!(err.failures.len(), 3);
        assert!(
            err.failures
                .iter()
                .all(|(_, e)| matches!(e, SourceError::InvalidValue(_)))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_advances_the_chain() {
        let calls = Arc::new(AtomicUsize::new(0));
        let sources: Vec<Box<dyn QuoteSource>> = vec![
            Box::new(Hanging),
            Box::new(Scripted {
                label: "backup".into(),
                outcome: Some(31.7),
                calls: calls.clone(),
            }),
        ];
        let r = QuoteResolver::new(Quantity::Reference, sources, Duration::from_secs(10));

        let q = r.resolve(0).await.unwrap();
        assert_eq!(q.source, "backup");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn answer_comes_from_first_success(
                failing in 0usize..6,
                trailing in 0usize..4,
                value in 0.01f64..1_000.0,
            ) {
                let mut outcomes = vec![None; failing];
                outcomes.push(Some(value));
                outcomes.extend(std::iter::repeat_n(Some(value + 1.0), trailing));

                let rt = tokio::runtime::Builder::new_current_thread()
                    .enable_time()
                    .build()
                    .unwrap();
                let (r, calls) = chain(&outcomes);
                let q = rt.block_on(r.resolve(0)).unwrap();

                prop_assert_eq!(q.value, value);
                prop_assert_eq!(q.source, format!("src{failing}"));
                for (i, c) in calls.iter().enumerate() {
                    let expected = if i <= failing { 1 } else { 0 };
                    prop_assert_eq!(c.load(Ordering::SeqCst), expected);
                }
            }

            #[test]
            fn all_failing_never_yields_a_number(n in 0usize..8) {
                let rt = tokio::runtime::Builder::new_current_thread()
                    .enable_time()
                    .build()
                    .unwrap();
                let (r, _) = chain(&vec![None; n]);
                let err = rt.block_on(r.resolve(0)).unwrap_err();

                prop_assert_eq!(err.failures.len(), n);
            }
        }
    }
}
