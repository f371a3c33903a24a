//! Report rendering.
//!
//! Results render as an aligned text table, a JSON document, or CSV lines.

use crate::runner::BenchmarkResult;

fn ms(us: f64) -> f64 {
    us / 1_000.0
}

/// Render results as an aligned text table.
pub fn render_text(results: &[BenchmarkResult]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<14} {:<10} {:<8} {:>8} {:>10} {:>10} {:>10} {:>10} {:>12}\n",
        "workload", "backend", "scale", "iters", "mean ms", "p50 ms", "p95 ms", "p99 ms", "ops/sec"
    ));
    out.push_str(&"-".repeat(98));
    out.push('\n');

    for result in results {
        let s = &result.stats;
        out.push_str(&format!(
            "{:<14} {:<10} {:<8} {:>8} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>12.1}\n",
            result.workload,
            result.backend,
            result.scale,
            s.count,
            ms(s.mean_us),
            ms(s.p50_us),
            ms(s.p95_us),
            ms(s.p99_us),
            s.ops_per_sec
        ));
    }
    out
}

/// Render results as pretty-printed JSON.
pub fn render_json(results: &[BenchmarkResult]) -> String {
    serde_json::to_string_pretty(results).unwrap_or_else(|_| "[]".to_string())
}

/// Render results as CSV with a header row.
pub fn render_csv(results: &[BenchmarkResult]) -> String {
    let mut out = String::from(
        "workload,backend,scale,iterations,mean_us,std_dev_us,min_us,max_us,p50_us,p90_us,p95_us,p99_us,ops_per_sec\n",
    );
    for result in results {
        let s = &result.stats;
        out.push_str(&format!(
            "{},{},{},{},{:.3},{:.3},{:.3},{:.3},{:.3},{:.3},{:.3},{:.3},{:.3}\n",
            result.workload,
            result.backend,
            result.scale,
            s.count,
            s.mean_us,
            s.std_dev_us,
            s.min_us,
            s.max_us,
            s.p50_us,
            s.p90_us,
            s.p95_us,
            s.p99_us,
            s.ops_per_sec
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::LatencyStats;
    use std::time::Duration;

    fn sample_result() -> BenchmarkResult {
        BenchmarkResult {
            workload: "insert_one".to_string(),
            backend: "postgres".to_string(),
            scale: "small".to_string(),
            stats: LatencyStats::from_durations(&[
                Duration::from_millis(1),
                Duration::from_millis(2),
                Duration::from_millis(3),
            ]),
        }
    }

    #[test]
    fn test_text_table_has_header_and_rows() {
        let text = render_text(&[sample_result()]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("workload"));
        assert!(lines[2].contains("insert_one"));
        assert!(lines[2].contains("postgres"));
    }

    #[test]
    fn test_json_is_parseable() {
        let json = render_json(&[sample_result()]);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["workload"], "insert_one");
        assert_eq!(parsed[0]["stats"]["count"], 3);
    }

    #[test]
    fn test_csv_row_count() {
        let csv = render_csv(&[sample_result(), sample_result()]);
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.starts_with("workload,backend,scale"));
    }
}
