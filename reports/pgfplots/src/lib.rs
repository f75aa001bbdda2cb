use std::{fmt::Write, path::PathBuf};

use common::{
    format::{Rounding, format_general},
    report::{Report, ReportContext},
    stats::Trim,
};
use eyre::Result;
use report_common::{Curve, Series, collect_curve, write_output};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotVariant {
    /// Mean throughput in millions of ops/s
    #[default]
    Throughput,
    /// Throughput relative to the 1-thread run
    SelfSpeedup,
}

/// pgfplots source with one axis per write ratio and one curve per benchmark
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoordinatePlot {
    pub variant: PlotVariant,
    pub rounding: Rounding,
    pub trim: Trim,
    pub prefix: String,
}

impl Default for CoordinatePlot {
    fn default() -> Self {
        Self {
            variant: PlotVariant::default(),
            rounding: Rounding::default(),
            trim: Trim::default(),
            prefix: "comparison".to_owned(),
        }
    }
}

#[async_trait::async_trait]
#[typetag::serde]
impl Report for CoordinatePlot {
    fn name(&self) -> &'static str {
        "CoordinatePlot"
    }

    async fn emit(&self, ctx: &ReportContext<'_>) -> Result<Vec<PathBuf>> {
        let config = ctx.config;
        let dims = &config.dimensions;
        let mut written = Vec::new();

        for metric in &config.metrics {
            for &size in &dims.sizes {
                let mut axes = Vec::with_capacity(dims.write_ratios.len());
                for &write_ratio in &dims.write_ratios {
                    let mut curves = Vec::new();
                    for benchmark in &config.benchmarks {
                        let series = Series {
                            metric,
                            benchmark,
                            size,
                            write_ratio,
                            trim: self.trim,
                        };
                        if let Some(curve) = collect_curve(ctx, &series, &dims.threads).await? {
                            curves.push(curve);
                        }
                    }
                    debug!("size={size} write={write_ratio}: {} curves", curves.len());
                    axes.push((write_ratio, curves));
                }

                let path = ctx.out_path(self.file_name(metric, size));
                write_output(&path, &self.render(&axes)).await?;
                written.push(path);
            }
        }
        Ok(written)
    }
}

impl CoordinatePlot {
    pub fn file_name(&self, metric: &str, size: u64) -> String {
        match self.variant {
            PlotVariant::Throughput => format!("{}_{metric}_{size}.plot", self.prefix),
            PlotVariant::SelfSpeedup => {
                format!("{}_selfspeedup_{metric}_{size}.plot", self.prefix)
            }
        }
    }

    fn ylabel(&self) -> &'static str {
        match self.variant {
            PlotVariant::Throughput => "Throughput mops/s",
            PlotVariant::SelfSpeedup => "Self-Speedup",
        }
    }

    /// One `tikzpicture` per write ratio, in order
    pub fn render(&self, axes: &[(u8, Vec<Curve<'_>>)]) -> String {
        let mut out = String::new();
        for (write_ratio, curves) in axes {
            out.push_str("\\begin{tikzpicture}\n");
            out.push_str("\\begin{axis}[\nlegend style={at={(0.5, -0.1)},anchor=north},\n");
            _ = write!(
                out,
                " xlabel={{Processors}},\n ylabel={{{}}},\n cycle list name=color,\n",
                self.ylabel()
            );
            if self.variant == PlotVariant::SelfSpeedup {
                out.push_str(" smooth,\n");
            }
            _ = writeln!(out, " title=Update rate: {write_ratio}\\%\n]");

            for curve in curves {
                out.push_str("\\addplot coordinates {\n");
                let coordinates: Vec<(u32, String)> = match self.variant {
                    PlotVariant::Throughput => curve
                        .points
                        .iter()
                        .map(|(t, aggregate)| (*t, self.rounding.render_mops(aggregate.mean)))
                        .collect(),
                    PlotVariant::SelfSpeedup => curve
                        .speedups()
                        .map(|(t, speedup)| (t, format_general(speedup, 3)))
                        .collect(),
                };
                for (threads, value) in coordinates {
                    _ = writeln!(out, "\t({threads}, {value})");
                }
                out.push_str("};\n");
                _ = writeln!(out, "\\addlegendentry{{{}}};", curve.benchmark.display_name());
            }
            out.push_str("\\end{axis}\n");
            out.push_str("\\end{tikzpicture}\n");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use common::report::run_reports;
    use report_common::fixtures::LogTree;

    use super::*;

    fn scenario(plot: CoordinatePlot) -> LogTree {
        let tree = LogTree::new(&["B", "trees.lockbased.Missing"], &[1, 2, 4, 8])
            .with_report(Box::new(plot));
        tree.write_throughput("B", 1024, 20, 1, &[500000.0]);
        tree.write_throughput("B", 1024, 20, 2, &[1000000.0]);
        tree.write_throughput("B", 1024, 20, 4, &[2000000.0]);
        // no 1-thread run: the whole curve goes
        tree.write_throughput("trees.lockbased.Missing", 1024, 20, 2, &[1000000.0]);
        tree
    }

    #[tokio::test]
    async fn self_speedup_curve() {
        let tree = scenario(CoordinatePlot {
            variant: PlotVariant::SelfSpeedup,
            ..Default::default()
        });
        let written = run_reports(&tree.config, None).await.unwrap();
        assert_eq!(written, vec![tree.output("comparison_selfspeedup_throughput_1024.plot")]);

        let plot = tree.read_output("comparison_selfspeedup_throughput_1024.plot");
        let expected = "\\begin{tikzpicture}\n\
\\begin{axis}[\n\
legend style={at={(0.5, -0.1)},anchor=north},\n \
xlabel={Processors},\n \
ylabel={Self-Speedup},\n \
cycle list name=color,\n \
smooth,\n \
title=Update rate: 20\\%\n\
]\n\
\\addplot coordinates {\n\
\t(1, 1.0)\n\
\t(2, 2.0)\n\
\t(4, 4.0)\n\
};\n\
\\addlegendentry{B};\n\
\\end{axis}\n\
\\end{tikzpicture}\n";
        assert_eq!(plot, expected);
        assert!(!plot.contains("Missing"));
        assert!(!plot.contains("(8,"));
    }

    #[tokio::test]
    async fn throughput_curve_in_mops() {
        let tree = scenario(CoordinatePlot::default());
        run_reports(&tree.config, None).await.unwrap();
        let plot = tree.read_output("comparison_throughput_1024.plot");
        assert!(plot.contains("ylabel={Throughput mops/s},\n cycle list name=color,\n title="));
        assert!(plot.contains("\t(1, 0.5)\n\t(2, 1.0)\n\t(4, 2.0)\n};\n"));
    }

    #[tokio::test]
    async fn truncated_rounding() {
        let tree = LogTree::new(&["B"], &[1, 2])
            .with_report(Box::new(CoordinatePlot {
                rounding: Rounding::Truncate,
                prefix: "trees_comparison".to_owned(),
                ..Default::default()
            }));
        tree.write_throughput("B", 1024, 20, 1, &[1234567.0, 1234567.0]);
        tree.write_throughput("B", 1024, 20, 2, &[123456789.0]);
        run_reports(&tree.config, None).await.unwrap();
        let plot = tree.read_output("trees_comparison_throughput_1024.plot");
        assert!(plot.contains("\t(1, 1.23)\n\t(2, 1.23e+02)\n"));
    }

    #[test]
    fn config_defaults() {
        let plot: CoordinatePlot = serde_yml::from_str("variant: self_speedup").unwrap();
        assert_eq!(plot.variant, PlotVariant::SelfSpeedup);
        assert_eq!(plot.rounding, Rounding::Decimal);
        assert_eq!(plot.prefix, "comparison");
    }
}
