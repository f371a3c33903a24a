//! docbench benchmark harness.
//!
//! Drives the adapters from `docbench-core` through named CRUD workloads,
//! timing each call and aggregating latency statistics into renderable
//! reports.

pub mod fixtures;
pub mod report;
pub mod runner;
pub mod stats;
pub mod workloads;

pub use fixtures::{generate_documents, Scale};
pub use report::{render_csv, render_json, render_text};
pub use runner::{BenchmarkResult, BenchmarkRunner};
pub use stats::LatencyStats;
pub use workloads::{run_workload, Workload};
