use std::collections::VecDeque;

use corelib::PriceSample;

#[derive(Clone, Copy, Debug)]
struct Slot {
    seq: u64,
    sample: PriceSample,
}

/// Time-based window with a monotonic max queue for O(1) `max()`.
///
/// Eviction keeps samples with `ts_ms > now - window_ms`.
#[derive(Debug)]
pub struct RollingWindow {
    /// All values in the window, ordered by time.
    values: VecDeque<Slot>,

    /// Decreasing values; the front always holds the window maximum.
    max_queue: VecDeque<Slot>,

    window_ms: u64,
    next_seq: u64,
}

impl RollingWindow {
    pub fn new(window_ms: u64) -> Self {
        Self {
            values: VecDeque::new(),
            max_queue: VecDeque::new(),
            window_ms,
            next_seq: 0,
        }
    }

    /// Rebuild a window from persisted samples, ordering them by time first.
    pub fn from_samples(window_ms: u64, samples: impl IntoIterator<Item = PriceSample>) -> Self {
        let mut samples: Vec<PriceSample> = samples.into_iter().collect();
        samples.sort_by_key(|s| s.ts_ms);

        let mut window = Self::new(window_ms);
        for s in samples {
            window.push(s);
        }
        window
    }

    pub fn push(&mut self, sample: PriceSample) {
        let slot = Slot {
            seq: self.next_seq,
            sample,
        };
        self.next_seq += 1;

        self.values.push_back(slot);

        while let Some(back) = self.max_queue.back() {
            if back.sample.value < sample.value {
                self.max_queue.pop_back();
            } else {
                break;
            }
        }
        self.max_queue.push_back(slot);
    }

    /// Drop samples that fell out of the window at `now_ms`.
    /// Returns how many were removed.
    pub fn evict_expired(&mut self, now_ms: u64) -> usize {
        // Nothing can be older than the window before the window has elapsed.
        let Some(cutoff) = now_ms.checked_sub(self.window_ms) else {
            return 0;
        };

        let mut evicted = 0;
        while let Some(front) = self.values.front() {
            if front.sample.ts_ms > cutoff {
                break;
            }
            let Some(removed) = self.values.pop_front() else {
                break;
            };
            if self.max_queue.front().is_some_and(|m| m.seq == removed.seq) {
                self.max_queue.pop_front();
            }
            evicted += 1;
        }
        evicted
    }

    pub fn max(&self) -> Option<f64> {
        self.max_queue.front().map(|s| s.sample.value)
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.back().map(|s| s.sample.value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_samples(self) -> Vec<PriceSample> {
        self.values.into_iter().map(|s| s.sample).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(ts_ms: u64, value: f64) -> PriceSample {
        PriceSample { ts_ms, value }
    }

    #[test]
    fn tracks_max_across_pushes() {
        let mut w = RollingWindow::new(1_000);
        w.push(s(1, 10.0));
        w.push(s(2, 12.0));
        w.push(s(3, 11.0));

        assert_eq!(w.max(), Some(12.0));
        assert_eq!(w.latest(), Some(11.0));
    }

    #[test]
    fn eviction_is_strict_at_the_boundary() {
        let mut w = RollingWindow::new(1_000);
        w.push(s(1_000, 50.0));
        w.push(s(1_001, 40.0));

        // cutoff = 1_000: a sample exactly one window old is dropped
        assert_eq!(w.evict_expired(2_000), 1);
        assert_eq!(w.max(), Some(40.0));
        assert_eq!(w.len(), 1);
    }

    #[test]
    fn max_recovers_after_peak_expires() {
        let mut w = RollingWindow::new(100);
        w.push(s(0, 100.0));
        w.push(s(50, 80.0));
        w.push(s(90, 90.0));

        w.evict_expired(120);
        assert_eq!(w.max(), Some(90.0));
    }

    #[test]
    fn duplicate_timestamps_do_not_confuse_the_max_queue() {
        let mut w = RollingWindow::new(100);
        w.push(s(10, 5.0));
        w.push(s(10, 7.0));
        w.push(s(200, 1.0));

        w.evict_expired(200);
        assert_eq!(w.max(), Some(1.0));
        assert_eq!(w.len(), 1);
    }

    #[test]
    fn young_clock_evicts_nothing() {
        let mut w = RollingWindow::new(10_000);
        w.push(s(0, 1.0));
        assert_eq!(w.evict_expired(5_000), 0);
    }

    #[test]
    fn from_samples_orders_by_time() {
        let w = RollingWindow::from_samples(1_000, [s(30, 3.0), s(10, 1.0), s(20, 2.0)]);
        let ts: Vec<u64> = w.into_samples().iter().map(|s| s.ts_ms).collect();
        assert_eq!(ts, vec![10, 20, 30]);
    }
}
