//! Performance instrumentation for validation and migration paths
//!
//! Samples are plain millisecond durations appended per operation name and
//! kept until reset. This is a diagnostic utility for short-lived sessions,
//! not a telemetry pipeline; nothing is evicted automatically.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::future::Future;
use std::time::Instant;

/// Aggregate statistics for one named operation
#[derive(Debug, Clone, PartialEq)]
pub struct OperationStats {
    pub name: String,
    pub count: usize,
    pub average_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub p95_ms: f64,
}

/// Records duration samples per operation name
#[derive(Debug, Default)]
pub struct PerformanceMonitor {
    samples: BTreeMap<String, Vec<f64>>,
    disabled: bool,
}

/// Manual bracketing handle returned by [`PerformanceMonitor::start`]
pub struct RunningTimer<'a> {
    monitor: &'a mut PerformanceMonitor,
    name: String,
    started: Instant,
}

impl RunningTimer<'_> {
    /// Stop the timer, record the sample and return the elapsed milliseconds
    pub fn stop(self) -> f64 {
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        self.monitor.record(&self.name, elapsed_ms);
        elapsed_ms
    }
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// When disabled, `measure`/`measure_async` pass through without
    /// recording
    pub fn set_enabled(&mut self, enabled: bool) {
        self.disabled = !enabled;
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }

    /// Time a synchronous operation and record one sample
    pub fn measure<T>(&mut self, name: &str, op: impl FnOnce() -> T) -> T {
        if self.disabled {
            return op();
        }
        let started = Instant::now();
        let result = op();
        self.record(name, started.elapsed().as_secs_f64() * 1000.0);
        result
    }

    /// Time an awaited operation and record one sample
    pub async fn measure_async<T, F>(&mut self, name: &str, op: F) -> T
    where
        F: Future<Output = T>,
    {
        if self.disabled {
            return op.await;
        }
        let started = Instant::now();
        let result = op.await;
        self.record(name, started.elapsed().as_secs_f64() * 1000.0);
        result
    }

    /// Start a manually bracketed measurement
    pub fn start(&mut self, name: &str) -> RunningTimer<'_> {
        RunningTimer {
            name: name.to_string(),
            started: Instant::now(),
            monitor: self,
        }
    }

    /// Inject an externally measured sample (milliseconds)
    pub fn record(&mut self, name: &str, duration_ms: f64) {
        self.samples
            .entry(name.to_string())
            .or_default()
            .push(duration_ms);
    }

    /// Nearest-rank percentile over the recorded samples; `p` in `0..=100`
    pub fn percentile(&self, name: &str, p: f64) -> Option<f64> {
        let samples = self.samples.get(name)?;
        if samples.is_empty() {
            return None;
        }
        let mut sorted = samples.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let rank = ((p / 100.0) * sorted.len() as f64).ceil() as usize;
        Some(sorted[rank.saturating_sub(1).min(sorted.len() - 1)])
    }

    pub fn stats(&self, name: &str) -> Option<OperationStats> {
        let samples = self.samples.get(name)?;
        if samples.is_empty() {
            return None;
        }
        let count = samples.len();
        let sum: f64 = samples.iter().sum();
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(OperationStats {
            name: name.to_string(),
            count,
            average_ms: sum / count as f64,
            min_ms: min,
            max_ms: max,
            p95_ms: self.percentile(name, 95.0).unwrap_or(max),
        })
    }

    pub fn all_stats(&self) -> Vec<OperationStats> {
        self.samples.keys().filter_map(|name| self.stats(name)).collect()
    }

    /// Whether the average for `name` exceeds `threshold_ms`
    pub fn exceeds_threshold(&self, name: &str, threshold_ms: f64) -> bool {
        self.stats(name)
            .map(|s| s.average_ms > threshold_ms)
            .unwrap_or(false)
    }

    /// Drop all samples for one operation
    pub fn reset(&mut self, name: &str) {
        self.samples.remove(name);
    }

    /// Drop all samples
    pub fn reset_all(&mut self) {
        self.samples.clear();
    }

    /// Formatted multi-line summary for console or log consumption
    pub fn report(&self) -> String {
        let mut out = format!(
            "Performance report (generated {})\n",
            chrono::Utc::now().to_rfc3339()
        );
        if self.samples.is_empty() {
            out.push_str("  (no samples recorded)\n");
            return out;
        }
        for stats in self.all_stats() {
            let _ = writeln!(
                out,
                "  {}: count={} avg={:.3}ms min={:.3}ms max={:.3}ms p95={:.3}ms",
                stats.name, stats.count, stats.average_ms, stats.min_ms, stats.max_ms, stats.p95_ms
            );
        }
        out
    }
}
