//! Report rendering and persistence.

use std::{fmt::Write as _, path::PathBuf, time::Duration};

use crate::{
    bench::BenchmarkResult,
    error::StageError,
};

/// Renders benchmark results into markdown reports and persists them.
#[derive(Debug)]
pub struct ReportAggregator {
    output_dir: PathBuf,
}

impl ReportAggregator {
    /// Creates an aggregator writing into the given directory.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self { output_dir: output_dir.into() }
    }

    /// Renders a single-run report.
    pub fn render_single(
        &self,
        campaign: &str,
        timestamp: &str,
        result: &BenchmarkResult,
    ) -> String {
        let mut report = String::new();
        let _ = writeln!(report, "# Throughput Test Report - {campaign}");
        let _ = writeln!(report, "**Timestamp:** {timestamp}");
        if let Some(test_type) = &result.test_type {
            let _ = writeln!(report, "**Test Type:** {test_type}");
        }
        report.push('\n');
        render_sections(&mut report, result);
        report
    }

    /// Renders a campaign report mapping configuration names to results.
    pub fn render_campaign(
        &self,
        campaign: &str,
        timestamp: &str,
        results: &[(String, BenchmarkResult)],
    ) -> String {
        let mut report = String::new();
        let _ = writeln!(report, "# Throughput Campaign Report - {campaign}");
        let _ = writeln!(report, "**Timestamp:** {timestamp}");
        let _ = writeln!(report, "**Configurations:** {}", results.len());
        report.push('\n');

        for (name, result) in results {
            let _ = writeln!(report, "## Configuration: {name}");
            if let Some(test_type) = &result.test_type {
                let _ = writeln!(report, "**Test Type:** {test_type}");
            }
            report.push('\n');
            render_sections(&mut report, result);
        }

        report
    }

    /// Persists the rendered report, keyed by campaign name and timestamp.
    ///
    /// Returns the path the artifact was written to.
    pub fn persist(
        &self,
        campaign: &str,
        timestamp: &str,
        report: &str,
    ) -> Result<PathBuf, StageError> {
        std::fs::create_dir_all(&self.output_dir)
            .map_err(|e| StageError::Aggregation(format!("creating report dir: {e}")))?;

        let path = self.output_dir.join(format!("{campaign}_{timestamp}_report.md"));
        std::fs::write(&path, report)
            .map_err(|e| StageError::Aggregation(format!("writing report: {e}")))?;

        tracing::info!(path = %path.display(), "Report saved");
        Ok(path)
    }
}

fn render_sections(report: &mut String, result: &BenchmarkResult) {
    let perf = result.performance.clone().unwrap_or_default();
    let _ = writeln!(report, "### Performance Metrics");
    let _ = writeln!(report, "- **Average TPS:** {}", fmt_rate(perf.avg_tps));
    let _ = writeln!(report, "- **Peak TPS:** {}", fmt_rate(perf.peak_tps));
    let _ = writeln!(report, "- **Total Transactions:** {}", fmt_count(perf.total_transactions));
    let _ = writeln!(report, "- **Success Rate:** {}", fmt_ratio(perf.success_rate));
    report.push('\n');

    let latency = result.latency.clone().unwrap_or_default();
    let _ = writeln!(report, "### Latency Metrics");
    let _ = writeln!(report, "- **Average Latency:** {}", fmt_millis(latency.avg_ms));
    let _ = writeln!(report, "- **P95 Latency:** {}", fmt_millis(latency.p95_ms));
    let _ = writeln!(report, "- **P99 Latency:** {}", fmt_millis(latency.p99_ms));
    report.push('\n');

    let resources = result.resources.clone().unwrap_or_default();
    let _ = writeln!(report, "### Resource Usage");
    let _ = writeln!(report, "- **Peak CPU:** {}", fmt_percent(resources.peak_cpu_percent));
    let _ = writeln!(report, "- **Peak Memory:** {}", fmt_megabytes(resources.peak_memory_mb));
    let _ = writeln!(report, "- **Network I/O:** {}", fmt_megabytes(resources.network_io_mb));
    report.push('\n');

    if let Some(note) = &result.note {
        let _ = writeln!(report, "> {note}");
        report.push('\n');
    }
}

const PLACEHOLDER: &str = "N/A";

fn fmt_rate(value: Option<f64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| format!("{v:.2}"))
}

fn fmt_count(value: Option<u64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| v.to_string())
}

fn fmt_ratio(value: Option<f64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| format!("{:.1}%", v * 100.0))
}

fn fmt_millis(value: Option<f64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| format!("{v:.2}ms"))
}

fn fmt_percent(value: Option<f64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| format!("{v:.1}%"))
}

fn fmt_megabytes(value: Option<f64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| format!("{v:.1}MB"))
}

/// Formats a duration as a compact human-readable string, e.g. `1m 30s`.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::{LatencySection, PerformanceSection, ResourceSection, StrategyKind};

    fn full_result() -> BenchmarkResult {
        BenchmarkResult {
            test_type: Some(StrategyKind::RealBlockchain),
            performance: Some(PerformanceSection {
                avg_tps: Some(812.3456),
                peak_tps: Some(1023.9),
                total_transactions: Some(24_370),
                success_rate: Some(0.987),
            }),
            latency: Some(LatencySection {
                avg_ms: Some(41.5),
                p95_ms: Some(120.0),
                p99_ms: Some(350.25),
            }),
            resources: Some(ResourceSection {
                peak_cpu_percent: Some(72.44),
                peak_memory_mb: Some(512.0),
                network_io_mb: Some(88.88),
            }),
            note: None,
        }
    }

    #[test]
    fn single_report_has_fixed_formatting() {
        let aggregator = ReportAggregator::new("unused");
        let report = aggregator.render_single("basic", "20260828_120000", &full_result());

        assert!(report.contains("# Throughput Test Report - basic"));
        assert!(report.contains("**Test Type:** real_blockchain"));
        assert!(report.contains("**Average TPS:** 812.35"));
        assert!(report.contains("**Success Rate:** 98.7%"));
        assert!(report.contains("**P99 Latency:** 350.25ms"));
        assert!(report.contains("**Peak CPU:** 72.4%"));
        assert!(report.contains("**Peak Memory:** 512.0MB"));
    }

    #[test]
    fn missing_sections_render_placeholders() {
        let aggregator = ReportAggregator::new("unused");
        let report =
            aggregator.render_single("basic", "20260828_120000", &BenchmarkResult::default());

        assert!(report.contains("**Average TPS:** N/A"));
        assert!(report.contains("**P95 Latency:** N/A"));
        assert!(report.contains("**Network I/O:** N/A"));
    }

    #[test]
    fn campaign_report_sections_per_configuration() {
        let aggregator = ReportAggregator::new("unused");
        let results = vec![
            ("small".to_string(), full_result()),
            ("large".to_string(), BenchmarkResult::default()),
        ];
        let report = aggregator.render_campaign("campaign", "20260828_120000", &results);

        assert!(report.contains("**Configurations:** 2"));
        assert!(report.contains("## Configuration: small"));
        assert!(report.contains("## Configuration: large"));
    }

    #[test]
    fn persist_writes_uniquely_named_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let aggregator = ReportAggregator::new(dir.path());
        let path = aggregator.persist("basic", "20260828_120000", "report body").unwrap();

        assert_eq!(path.file_name().unwrap(), "basic_20260828_120000_report.md");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "report body");
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(Duration::from_secs(45)), "45s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3700)), "1h 1m 40s");
    }
}
