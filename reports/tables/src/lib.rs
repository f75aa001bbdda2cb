//! Comparison tables: rows are benchmarks grouped by write ratio, columns are
//! the curated thread counts, cells show mean throughput and the speedup over
//! the 1-thread run.

use common::{report::ReportContext, stats::Trim};
use eyre::Result;
use report_common::{Curve, Series, collect_curve};

mod markup;
mod text;

pub use markup::MarkupTable;
pub use text::TextTable;

const NAME_WIDTH: usize = 45;
const CELL_WIDTH: usize = 25;

/// Curves of every roster benchmark with a 1-thread run, in roster order
async fn collect_rows<'a>(
    ctx: &ReportContext<'a>,
    metric: &'a str,
    size: u64,
    write_ratio: u8,
    trim: Trim,
) -> Result<Vec<Curve<'a>>> {
    let config = ctx.config;
    let mut rows = Vec::new();
    for benchmark in &config.benchmarks {
        let series = Series {
            metric,
            benchmark,
            size,
            write_ratio,
            trim,
        };
        if let Some(curve) = collect_curve(ctx, &series, &config.dimensions.threads).await? {
            rows.push(curve);
        }
    }
    Ok(rows)
}
