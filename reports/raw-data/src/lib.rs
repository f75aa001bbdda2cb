use std::path::PathBuf;

use common::{
    format::format_sample,
    report::{Report, ReportContext},
    stats::{Aggregate, Trim, to_mops},
};
use eyre::{Context, Result};
use report_common::{Series, collect_points, ensure_dirs, write_output};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which thread counts get a row
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Density {
    /// Every thread count from 1 to `max_threads`
    #[default]
    Dense,
    /// The curated list used by plots and tables
    Sparse,
}

/// Whitespace-separated `threads mean stdev` files, one per benchmark and
/// write ratio, values in millions of ops/s
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawData {
    pub density: Density,
    pub trim: Trim,
    pub prefix: String,
}

impl Default for RawData {
    fn default() -> Self {
        Self {
            density: Density::default(),
            trim: Trim::default(),
            prefix: "comparison".to_owned(),
        }
    }
}

#[async_trait::async_trait]
#[typetag::serde]
impl Report for RawData {
    fn name(&self) -> &'static str {
        "RawData"
    }

    async fn emit(&self, ctx: &ReportContext<'_>) -> Result<Vec<PathBuf>> {
        let config = ctx.config;
        let dims = &config.dimensions;
        let raw_dir = ctx.out_path("raw");
        ensure_dirs(std::slice::from_ref(&raw_dir)).await?;

        let threads: Vec<u32> = match self.density {
            Density::Dense => dims.dense_threads().collect(),
            Density::Sparse => dims.threads.clone(),
        };

        let mut written = Vec::new();
        for metric in &config.metrics {
            for &size in &dims.sizes {
                for &write_ratio in &dims.write_ratios {
                    for (idx, benchmark) in config.benchmarks.iter().enumerate() {
                        let series = Series {
                            metric,
                            benchmark,
                            size,
                            write_ratio,
                            trim: self.trim,
                        };
                        let points = collect_points(ctx, &series, threads.iter().copied()).await?;
                        if points.is_empty() {
                            debug!(
                                "No data for {} size={size} write={write_ratio}",
                                benchmark.id()
                            );
                            continue;
                        }
                        let path = raw_dir.join(format!(
                            "{}_{metric}_{size}_{write_ratio}_{idx}.dat",
                            self.prefix
                        ));
                        write_output(&path, &render_rows(&points)?).await?;
                        written.push(path);
                    }
                }
            }
        }
        Ok(written)
    }
}

/// Rows of `threads mean stdev`. A single-sample cell has no spread and is
/// written with a `0.0` stdev.
pub fn render_rows(points: &[(u32, Aggregate)]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    for (threads, aggregate) in points {
        writer.write_record([
            threads.to_string(),
            format_sample(to_mops(aggregate.mean)),
            format_sample(to_mops(aggregate.stdev.unwrap_or(0.0))),
        ])?;
    }
    let data = writer.into_inner().wrap_err("Flush raw data rows")?;
    String::from_utf8(data).wrap_err("Raw data rows are not UTF-8")
}

#[cfg(test)]
mod tests {
    use common::report::run_reports;
    use report_common::fixtures::LogTree;

    use super::*;

    #[tokio::test]
    async fn single_sample_rows() {
        let tree = LogTree::new(&["B"], &[1, 2, 4, 8]).with_report(Box::new(RawData::default()));
        tree.write_throughput("B", 1024, 20, 1, &[500000.0]);
        tree.write_throughput("B", 1024, 20, 2, &[1000000.0]);
        tree.write_throughput("B", 1024, 20, 4, &[2000000.0]);

        let written = run_reports(&tree.config, None).await.unwrap();
        assert_eq!(written, vec![tree.output("raw/comparison_throughput_1024_20_0.dat")]);
        assert_eq!(
            tree.read_output("raw/comparison_throughput_1024_20_0.dat"),
            "1 0.5 0.0\n2 1.0 0.0\n4 2.0 0.0\n"
        );
    }

    #[tokio::test]
    async fn dense_range_and_trim() {
        let tree = LogTree::new(&["A", "B"], &[1, 4]).with_report(Box::new(RawData {
            trim: Trim::DropFirst,
            ..Default::default()
        }));
        // thread count 3 is outside the curated list but inside the dense range
        tree.write_throughput("B", 1024, 20, 3, &[9000000.0, 1000000.0, 3000000.0]);
        tree.write_throughput("B", 1024, 20, 4, &[4000000.0]);

        let written = run_reports(&tree.config, None).await.unwrap();
        assert_eq!(written, vec![tree.output("raw/comparison_throughput_1024_20_1.dat")]);
        let rows = tree.read_output("raw/comparison_throughput_1024_20_1.dat");
        let row = rows.lines().collect::<Vec<_>>();
        assert_eq!(row.len(), 1);
        let fields = row[0].split(' ').collect::<Vec<_>>();
        assert_eq!(fields[0], "3");
        assert_eq!(fields[1], "2.0");
        assert!((fields[2].parse::<f64>().unwrap() - 2f64.sqrt()).abs() < 1e-12);
    }

    #[tokio::test]
    async fn sparse_density_uses_curated_threads() {
        let tree = LogTree::new(&["B"], &[1, 4]).with_report(Box::new(RawData {
            density: Density::Sparse,
            prefix: "sparse".to_owned(),
            ..Default::default()
        }));
        tree.write_throughput("B", 1024, 20, 3, &[1000000.0]);
        tree.write_throughput("B", 1024, 20, 4, &[1000000.0]);

        run_reports(&tree.config, None).await.unwrap();
        assert_eq!(
            tree.read_output("raw/sparse_throughput_1024_20_0.dat"),
            "4 1.0 0.0\n"
        );
    }
}
