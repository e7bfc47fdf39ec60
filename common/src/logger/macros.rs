use std::future::Future;
use std::time::{Duration, Instant};

use tracing::{Span, field};

use super::TraceId;

/// Root span for one scheduled invocation.
///
/// `alert` is recorded later, once the run knows whether it notified.
pub fn run_span(name: &'static str, trace_id: &TraceId) -> Span {
    tracing::info_span!(
        "run",
        name = %name,
        trace_id = %trace_id,
        alert = field::Empty
    )
}

/// Awaits `fut` and logs a `performance` warning if it took longer than `max`.
pub async fn warn_if_slow<F, T>(label: &str, max: Duration, fut: F) -> T
where
    F: Future<Output = T>,
{
    let start = Instant::now();
    let out = fut.await;
    let elapsed = start.elapsed();
    if elapsed > max {
        tracing::warn!(
            target: "performance",
            label = label,
            elapsed_ms = elapsed.as_millis() as u64,
            "slow operation detected"
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[tokio::test]
    #[traced_test]
    async fn fast_futures_are_not_reported() {
        let v = warn_if_slow("noop", Duration::from_secs(5), async { 7 }).await;
        assert_eq!(v, 7);
        assert!(!logs_contain("slow operation detected"));
    }

    #[tokio::test]
    #[traced_test]
    async fn slow_futures_are_reported() {
        warn_if_slow("sleepy", Duration::from_millis(1), async {
            std::thread::sleep(Duration::from_millis(10));
        })
        .await;
        assert!(logs_contain("slow operation detected"));
    }
}
