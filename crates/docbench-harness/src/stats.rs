//! Latency statistics.

use std::time::Duration;

use serde::Serialize;

/// Aggregate latency statistics for one workload run.
///
/// All latencies are in microseconds. Percentiles use the nearest-rank
/// method over the sorted sample.
#[derive(Debug, Clone, Serialize)]
pub struct LatencyStats {
    pub count: usize,
    pub total_us: f64,
    pub min_us: f64,
    pub max_us: f64,
    pub mean_us: f64,
    pub std_dev_us: f64,
    pub p50_us: f64,
    pub p90_us: f64,
    pub p95_us: f64,
    pub p99_us: f64,
    pub ops_per_sec: f64,
}

impl LatencyStats {
    /// Compute statistics from raw iteration durations.
    pub fn from_durations(durations: &[Duration]) -> Self {
        let mut sorted: Vec<f64> = durations
            .iter()
            .map(|d| d.as_secs_f64() * 1_000_000.0)
            .collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let count = sorted.len();
        if count == 0 {
            return Self {
                count: 0,
                total_us: 0.0,
                min_us: 0.0,
                max_us: 0.0,
                mean_us: 0.0,
                std_dev_us: 0.0,
                p50_us: 0.0,
                p90_us: 0.0,
                p95_us: 0.0,
                p99_us: 0.0,
                ops_per_sec: 0.0,
            };
        }

        let total_us: f64 = sorted.iter().sum();
        let mean_us = total_us / count as f64;
        let variance = sorted
            .iter()
            .map(|v| (v - mean_us) * (v - mean_us))
            .sum::<f64>()
            / count as f64;
        let ops_per_sec = if total_us > 0.0 {
            count as f64 / (total_us / 1_000_000.0)
        } else {
            0.0
        };

        Self {
            count,
            total_us,
            min_us: sorted[0],
            max_us: sorted[count - 1],
            mean_us,
            std_dev_us: variance.sqrt(),
            p50_us: percentile(&sorted, 50.0),
            p90_us: percentile(&sorted, 90.0),
            p95_us: percentile(&sorted, 95.0),
            p99_us: percentile(&sorted, 99.0),
            ops_per_sec,
        }
    }
}

/// Nearest-rank percentile over a sorted sample.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = ((p / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}
