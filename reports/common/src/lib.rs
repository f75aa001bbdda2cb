use std::path::{Path, PathBuf};

use common::{
    config::Benchmark,
    report::ReportContext,
    stats::{Aggregate, Trim},
};
use eyre::{Context, Result};
use tokio::{
    fs::{File, create_dir_all},
    io::AsyncWriteExt,
};
use tracing::warn;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

/// Thread count every speedup is relative to
pub const BASELINE_THREADS: u32 = 1;

/// Identifies the cells of one benchmark that share size and write ratio
#[derive(Debug, Clone, Copy)]
pub struct Series<'a> {
    pub metric: &'a str,
    pub benchmark: &'a Benchmark,
    pub size: u64,
    pub write_ratio: u8,
    pub trim: Trim,
}

/// One benchmark's measurements over thread counts, with its 1-thread cell
#[derive(Debug, Clone)]
pub struct Curve<'a> {
    pub benchmark: &'a Benchmark,
    pub baseline: Aggregate,
    pub points: Vec<(u32, Aggregate)>,
}

impl Curve<'_> {
    pub fn get(&self, threads: u32) -> Option<&Aggregate> {
        self.points
            .iter()
            .find(|(t, _)| *t == threads)
            .map(|(_, aggregate)| aggregate)
    }

    pub fn speedup(&self, threads: u32) -> Option<f64> {
        if threads == BASELINE_THREADS {
            return self.get(threads).map(|_| 1.0);
        }
        self.get(threads).map(|a| a.speedup_over(&self.baseline))
    }

    /// `(threads, mean / baseline mean)` for every present point
    pub fn speedups(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.points
            .iter()
            .filter_map(|(t, _)| self.speedup(*t).map(|s| (*t, s)))
    }
}

/// Aggregates of `series` at each of `threads` that has data; missing thread
/// counts are left out.
pub async fn collect_points(
    ctx: &ReportContext<'_>,
    series: &Series<'_>,
    threads: impl IntoIterator<Item = u32>,
) -> Result<Vec<(u32, Aggregate)>> {
    let mut points = Vec::new();
    for t in threads {
        let key = ctx.key(series.benchmark, series.size, series.write_ratio, t);
        if let Some(aggregate) = ctx.aggregate(&key, series.metric, series.trim).await? {
            points.push((t, aggregate));
        }
    }
    Ok(points)
}

/// Like [`collect_points`], but `None` when the 1-thread cell is missing:
/// such a benchmark has no speedup reference and is dropped from the output.
pub async fn collect_curve<'a>(
    ctx: &ReportContext<'_>,
    series: &Series<'a>,
    threads: &[u32],
) -> Result<Option<Curve<'a>>> {
    let key = ctx.key(
        series.benchmark,
        series.size,
        series.write_ratio,
        BASELINE_THREADS,
    );
    let Some(baseline) = ctx.aggregate(&key, series.metric, series.trim).await? else {
        warn!(
            "Skipping {} size={} write={}: no {BASELINE_THREADS}-thread run",
            series.benchmark.id(),
            series.size,
            series.write_ratio
        );
        return Ok(None);
    };
    let points = collect_points(ctx, series, threads.iter().copied()).await?;
    Ok(Some(Curve {
        benchmark: series.benchmark,
        baseline,
        points,
    }))
}

pub async fn ensure_dirs(dirs: &[PathBuf]) -> Result<()> {
    for dir in dirs {
        create_dir_all(dir)
            .await
            .wrap_err_with(|| format!("Create {}", dir.display()))?;
    }
    Ok(())
}

/// Writes `contents` to `path`, replacing any previous file. The file is
/// flushed and closed before returning.
pub async fn write_output(path: &Path, contents: &str) -> Result<()> {
    let mut file = File::create(path)
        .await
        .wrap_err_with(|| format!("Create {}", path.display()))?;
    file.write_all(contents.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}
