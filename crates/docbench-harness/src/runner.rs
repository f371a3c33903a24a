//! Benchmark timing loop.

use std::future::Future;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::stats::LatencyStats;

/// Default number of unmeasured warmup iterations.
pub const DEFAULT_WARMUP: usize = 10;

/// Default number of measured iterations.
pub const DEFAULT_ITERATIONS: usize = 100;

/// Times repeated adapter calls: a warmup phase that is discarded, then one
/// measured sample per iteration.
///
/// Failures are fatal to the run; there is no retry at this layer.
#[derive(Debug, Clone)]
pub struct BenchmarkRunner {
    pub warmup: usize,
    pub iterations: usize,
}

impl BenchmarkRunner {
    pub fn new() -> Self {
        Self {
            warmup: DEFAULT_WARMUP,
            iterations: DEFAULT_ITERATIONS,
        }
    }

    /// Set the warmup iteration count.
    pub fn with_warmup(mut self, warmup: usize) -> Self {
        self.warmup = warmup;
        self
    }

    /// Set the measured iteration count.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Run one operation `warmup + iterations` times, timing the measured
    /// phase. The closure receives the global iteration index (warmup
    /// included) so workloads can pick distinct fixture rows per call.
    pub async fn run<F, Fut>(&self, workload: &str, mut op: F) -> docbench_core::Result<Vec<Duration>>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = docbench_core::Result<()>>,
    {
        tracing::debug!(workload, warmup = self.warmup, "warming up");
        for i in 0..self.warmup {
            op(i).await?;
        }

        tracing::debug!(workload, iterations = self.iterations, "measuring");
        let mut durations = Vec::with_capacity(self.iterations);
        for i in 0..self.iterations {
            let start = Instant::now();
            op(self.warmup + i).await?;
            durations.push(start.elapsed());
        }
        Ok(durations)
    }
}

impl Default for BenchmarkRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// One workload's outcome on one backend.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkResult {
    pub workload: String,
    pub backend: String,
    pub scale: String,
    pub stats: LatencyStats,
}
