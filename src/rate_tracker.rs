// Per-second rates derived from cumulative I/O counters

use serde::{Deserialize, Serialize};

/// One read of the host's cumulative network and disk counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CounterSample {
    pub sent_bytes: u64,
    pub received_bytes: u64,
    pub read_bytes: u64,
    pub written_bytes: u64,
    /// Seconds since the UNIX epoch.
    pub timestamp: f64,
}

/// Bytes/sec between two samples; every field is `None` when no rate could be derived.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rates {
    pub upload_bps: Option<f64>,
    pub download_bps: Option<f64>,
    pub read_bps: Option<f64>,
    pub write_bps: Option<f64>,
}

/// Holds the previous counter sample. Not synchronized; the owner serializes access.
///
/// Counters that go backwards (wrap, reset, hot-unplugged NIC) produce a negative rate
/// for that one update; nothing is clamped.
#[derive(Debug, Default)]
pub struct RateTracker {
    previous: Option<CounterSample>,
}

impl RateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_baseline(sample: CounterSample) -> Self {
        Self {
            previous: Some(sample),
        }
    }

    pub fn previous(&self) -> Option<&CounterSample> {
        self.previous.as_ref()
    }

    /// Derive rates against the stored sample, then store `current` unconditionally.
    pub fn update(&mut self, current: CounterSample) -> Rates {
        match self.previous.replace(current) {
            Some(prev) => {
                let dt = current.timestamp - prev.timestamp;
                if dt > 0.0 {
                    let per_sec = |now: u64, before: u64| Some((now as f64 - before as f64) / dt);
                    Rates {
                        upload_bps: per_sec(current.sent_bytes, prev.sent_bytes),
                        download_bps: per_sec(current.received_bytes, prev.received_bytes),
                        read_bps: per_sec(current.read_bytes, prev.read_bytes),
                        write_bps: per_sec(current.written_bytes, prev.written_bytes),
                    }
                } else {
                    Rates::default()
                }
            }
            None => Rates::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(sent: u64, recv: u64, read: u64, written: u64, timestamp: f64) -> CounterSample {
        CounterSample {
            sent_bytes: sent,
            received_bytes: recv,
            read_bytes: read,
            written_bytes: written,
            timestamp,
        }
    }

    #[test]
    fn first_update_has_no_rates_and_sets_baseline() {
        let mut tracker = RateTracker::new();
        let s = sample(10, 20, 30, 40, 100.0);
        assert_eq!(tracker.update(s), Rates::default());
        assert_eq!(tracker.previous(), Some(&s));
    }

    #[test]
    fn rates_are_delta_over_elapsed_seconds() {
        let mut tracker = RateTracker::with_baseline(sample(1000, 2000, 0, 500, 0.0));
        let rates = tracker.update(sample(3000, 2500, 4096, 500, 2.0));
        assert_eq!(rates.upload_bps, Some(1000.0));
        assert_eq!(rates.download_bps, Some(250.0));
        assert_eq!(rates.read_bps, Some(2048.0));
        assert_eq!(rates.write_bps, Some(0.0));
    }

    #[test]
    fn fractional_elapsed_time() {
        let mut tracker = RateTracker::with_baseline(sample(0, 0, 0, 0, 10.0));
        let rates = tracker.update(sample(50, 25, 10, 5, 10.5));
        assert_eq!(rates.upload_bps, Some(100.0));
        assert_eq!(rates.download_bps, Some(50.0));
        assert_eq!(rates.read_bps, Some(20.0));
        assert_eq!(rates.write_bps, Some(10.0));
    }

    #[test]
    fn non_positive_elapsed_time_yields_no_rates_but_advances_baseline() {
        for dt in [0.0, -1.5] {
            let mut tracker = RateTracker::with_baseline(sample(0, 0, 0, 0, 5.0));
            let next = sample(100, 100, 100, 100, 5.0 + dt);
            assert_eq!(tracker.update(next), Rates::default());
            assert_eq!(tracker.previous(), Some(&next));
        }
    }

    #[test]
    fn converges_after_a_degenerate_update() {
        let mut tracker = RateTracker::with_baseline(sample(0, 0, 0, 0, 5.0));
        tracker.update(sample(10, 10, 10, 10, 5.0));
        let rates = tracker.update(sample(20, 30, 10, 10, 6.0));
        assert_eq!(rates.upload_bps, Some(10.0));
        assert_eq!(rates.download_bps, Some(20.0));
    }

    #[test]
    fn counter_decrease_is_reported_as_negative_rate() {
        let mut tracker = RateTracker::with_baseline(sample(500, 0, 0, 0, 0.0));
        let rates = tracker.update(sample(100, 0, 0, 0, 1.0));
        assert_eq!(rates.upload_bps, Some(-400.0));
    }
}
