use std::{fmt::Write, path::PathBuf};

use common::{
    format::CellFormat,
    report::{Report, ReportContext},
    stats::Trim,
};
use eyre::Result;
use report_common::{Curve, write_output};
use serde::{Deserialize, Serialize};

use crate::{CELL_WIDTH, NAME_WIDTH, collect_rows};

/// LaTeX `tabular` with the benchmarks of each write ratio grouped under a
/// `\multirow` cell, one file per metric and size
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkupTable {
    pub format: CellFormat,
    pub trim: Trim,
    pub prefix: String,
}

impl Default for MarkupTable {
    fn default() -> Self {
        Self {
            format: CellFormat::KiloOps,
            trim: Trim::default(),
            prefix: "comparison".to_owned(),
        }
    }
}

#[async_trait::async_trait]
#[typetag::serde]
impl Report for MarkupTable {
    fn name(&self) -> &'static str {
        "MarkupTable"
    }

    async fn emit(&self, ctx: &ReportContext<'_>) -> Result<Vec<PathBuf>> {
        let config = ctx.config;
        let dims = &config.dimensions;
        let mut written = Vec::new();

        for metric in &config.metrics {
            for &size in &dims.sizes {
                let mut groups = Vec::with_capacity(dims.write_ratios.len());
                for &write_ratio in &dims.write_ratios {
                    let rows = collect_rows(ctx, metric, size, write_ratio, self.trim).await?;
                    groups.push((write_ratio, rows));
                }
                let path = ctx.out_path(format!("{}_{metric}_{size}.table", self.prefix));
                write_output(&path, &self.render(&dims.threads, &groups)).await?;
                written.push(path);
            }
        }
        Ok(written)
    }
}

impl MarkupTable {
    pub fn render(&self, threads: &[u32], groups: &[(u8, Vec<Curve<'_>>)]) -> String {
        let columns = threads.len() + 2;
        let mut out = format!("\\begin{{tabular}}{{|{}}}\n", "c|".repeat(columns));
        out.push_str("\\hline\n");
        _ = write!(out, "writes & {:^NAME_WIDTH$}", "benchmark name");
        for t in threads {
            _ = write!(out, "& {:^CELL_WIDTH$}", t.to_string());
        }
        out.push_str("\\\\\\hline\n");

        for (write_ratio, rows) in groups {
            if rows.is_empty() {
                continue;
            }
            _ = write!(out, "\\multirow{{{}}}{{*}}{{{write_ratio}\\%}}", rows.len());
            for (i, curve) in rows.iter().enumerate() {
                _ = write!(out, "& {:^NAME_WIDTH$}", curve.benchmark.display_name());
                for &t in threads {
                    let cell = match (curve.get(t), curve.speedup(t)) {
                        (Some(aggregate), Some(speedup)) => {
                            self.format.render(aggregate.mean, speedup)
                        }
                        _ => String::new(),
                    };
                    _ = write!(out, "& {cell:^CELL_WIDTH$}");
                }
                if i + 1 == rows.len() {
                    out.push_str("\\\\\\hline\n");
                } else {
                    _ = writeln!(out, "\\\\\\cline{{2-{columns}}}");
                }
            }
        }
        out.push_str("\\end{tabular}\n");
        out
    }
}
