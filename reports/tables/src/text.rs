use std::{fmt::Write, path::PathBuf};

use common::{
    format::CellFormat,
    report::{Report, ReportContext},
    stats::Trim,
};
use eyre::Result;
use itertools::Itertools;
use report_common::{Curve, write_output};
use serde::{Deserialize, Serialize};

use crate::{CELL_WIDTH, NAME_WIDTH, collect_rows};

/// Fixed-width plain text summary, one file per write ratio
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextTable {
    pub format: CellFormat,
    pub trim: Trim,
    pub prefix: String,
}

impl Default for TextTable {
    fn default() -> Self {
        Self {
            format: CellFormat::Mops,
            trim: Trim::default(),
            prefix: "comparison".to_owned(),
        }
    }
}

#[async_trait::async_trait]
#[typetag::serde]
impl Report for TextTable {
    fn name(&self) -> &'static str {
        "TextTable"
    }

    async fn emit(&self, ctx: &ReportContext<'_>) -> Result<Vec<PathBuf>> {
        let config = ctx.config;
        let dims = &config.dimensions;
        let mut written = Vec::new();

        for &write_ratio in &dims.write_ratios {
            let mut out = String::new();
            for metric in &config.metrics {
                _ = writeln!(out, "Key {metric}");
                for &size in &dims.sizes {
                    let rows = collect_rows(ctx, metric, size, write_ratio, self.trim).await?;
                    _ = writeln!(out, "Size {size}");
                    out.push_str(&self.render_block(&dims.threads, &rows));
                    out.push('\n');
                }
            }
            let path = ctx.out_path(format!("{}_{write_ratio}.txt", self.prefix));
            write_output(&path, &out).await?;
            written.push(path);
        }
        Ok(written)
    }
}

impl TextTable {
    /// Header plus one row per curve; thread counts without a run stay blank
    pub fn render_block(&self, threads: &[u32], rows: &[Curve<'_>]) -> String {
        let mut out = format!("{:^NAME_WIDTH$}", "benchmark name");
        out.push_str(
            &threads
                .iter()
                .map(|t| format!("{:^CELL_WIDTH$}", t.to_string()))
                .join(""),
        );
        out.push('\n');

        for curve in rows {
            _ = write!(out, "{:^NAME_WIDTH$}", curve.benchmark.id());
            for &t in threads {
                let cell = match (curve.get(t), curve.speedup(t)) {
                    (Some(aggregate), Some(speedup)) => self.format.render(aggregate.mean, speedup),
                    _ => String::new(),
                };
                _ = write!(out, "{cell:^CELL_WIDTH$}");
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use common::report::run_reports;
    use report_common::fixtures::LogTree;

    use super::*;

    #[tokio::test]
    async fn one_file_per_write_ratio() {
        let tree = LogTree::new(&["trees.B", "trees.NoBaseline"], &[1, 2, 4])
            .with_report(Box::new(TextTable::default()));
        tree.write_throughput("trees.B", 1024, 20, 1, &[500000.0]);
        tree.write_throughput("trees.B", 1024, 20, 4, &[1500000.0, 2500000.0]);
        tree.write_throughput("trees.NoBaseline", 1024, 20, 2, &[1000000.0]);

        let written = run_reports(&tree.config, None).await.unwrap();
        assert_eq!(written, vec![tree.output("comparison_20.txt")]);

        let text = tree.read_output("comparison_20.txt");
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "Key throughput");
        assert_eq!(lines[1], "Size 1024");
        assert_eq!(
            lines[2],
            format!(
                "{:^45}{:^25}{:^25}{:^25}",
                "benchmark name", "1", "2", "4"
            )
        );
        assert_eq!(
            lines[3],
            format!(
                "{:^45}{:^25}{:^25}{:^25}",
                "trees.B", "0.500 (1.000)", "", "2.000 (4.000)"
            )
        );
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[4], "");
        assert!(!text.contains("NoBaseline"));
    }
}
