use core::fmt::Debug;
use std::path::{Path, PathBuf};

use dyn_clone::{DynClone, clone_trait_object};
use eyre::{Context, Result};
use tokio::fs::create_dir_all;
use tracing::{debug, info};

use crate::{
    config::{Benchmark, Config},
    experiment::ExperimentKey,
    log::LineParser,
    stats::{Aggregate, Trim, summarize},
};

#[typetag::serde(tag = "type")]
#[async_trait::async_trait]
pub trait Report: Debug + DynClone + Send + Sync {
    /// Name used to select this report on the command line
    fn name(&self) -> &'static str;
    /// Writes the report
    ///
    /// Arguments:
    /// * `ctx` - The validated config, the output directory and access to
    ///   aggregated cells
    ///
    /// Returns the files written, in order.
    async fn emit(&self, ctx: &ReportContext<'_>) -> Result<Vec<PathBuf>>;
}
clone_trait_object!(Report);

/// Everything an emitter needs to read cells and place its output
#[derive(Debug)]
pub struct ReportContext<'a> {
    pub config: &'a Config,
    pub out_dir: PathBuf,
    parser: LineParser,
}

impl<'a> ReportContext<'a> {
    pub fn new(config: &'a Config) -> Result<Self> {
        Ok(Self {
            config,
            out_dir: config.output_path(),
            parser: LineParser::new(&config.metrics)?,
        })
    }

    pub fn key<'b>(
        &self,
        benchmark: &'b Benchmark,
        size: u64,
        write_ratio: u8,
        threads: u32,
    ) -> ExperimentKey<'b> {
        ExperimentKey::new(self.config, benchmark, size, write_ratio, threads)
    }

    /// Aggregated `metric` for the run identified by `key`. A run without a
    /// log file and a log without samples both give `Ok(None)`; a malformed
    /// log is an error.
    pub async fn aggregate(
        &self,
        key: &ExperimentKey<'_>,
        metric: &str,
        trim: Trim,
    ) -> Result<Option<Aggregate>> {
        let Some(path) = key.locate(&self.config.log_dir, self.config.naming) else {
            debug!("No log for {}", key.file_name(self.config.naming));
            return Ok(None);
        };
        let series = self.parser.read(&path).await?;
        let aggregate = series
            .get(metric)
            .and_then(|samples| summarize(samples, trim));
        if aggregate.is_none() {
            debug!("No {metric} samples in {}", path.display());
        }
        Ok(aggregate)
    }

    pub fn out_path(&self, file_name: impl AsRef<Path>) -> PathBuf {
        self.out_dir.join(file_name)
    }
}

/// Runs every configured report in order, or only those named `only`.
/// Stops at the first error.
pub async fn run_reports(config: &Config, only: Option<&str>) -> Result<Vec<PathBuf>> {
    let ctx = ReportContext::new(config)?;
    create_dir_all(&ctx.out_dir)
        .await
        .wrap_err_with(|| format!("Create {}", ctx.out_dir.display()))?;

    let mut written = Vec::new();
    for report in &config.reports {
        if only.is_some_and(|name| !name.eq_ignore_ascii_case(report.name())) {
            continue;
        }
        debug!("Running {}", report.name());
        let files = report
            .emit(&ctx)
            .await
            .wrap_err_with(|| format!("Report {}", report.name()))?;
        for file in &files {
            info!("Wrote {}", file.display());
        }
        written.extend(files);
    }
    Ok(written)
}
