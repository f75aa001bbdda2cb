use std::path::PathBuf;

use clap::{Parser, Subcommand, builder::PossibleValuesParser};
use common::{config::Config, experiment::ExperimentKey, report::run_reports};
use eyre::Result;
use itertools::iproduct;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter,
    fmt::{layer, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const CRATES: &[&str] = &[
    "common",
    "report_common",
    "pgfplots",
    "raw_data",
    "tables",
];

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long)]
    log: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate every configured report
    Report {
        #[arg(short, long, default_value = "config.yaml")]
        config_file: PathBuf,
        /// Only run reports of this type, ie. RawData
        #[arg(
            long,
            ignore_case = true,
            value_parser = PossibleValuesParser::new(default_reports::REPORT_NAMES.iter().copied())
        )]
        only: Option<String>,
    },
    /// Validate the config and count the logs found for each benchmark
    Check {
        #[arg(short, long, default_value = "config.yaml")]
        config_file: PathBuf,
    },
    /// Print the log path of every experiment
    Paths {
        #[arg(short, long, default_value = "config.yaml")]
        config_file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let log_level = std::env::var("RUST_LOG").unwrap_or("warn".to_owned());
    let args = Cli::parse();
    let file_appender = tracing_appender::rolling::never(".", "log.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let mut env_filter = EnvFilter::new(format!("bench_report={log_level}"));
    for log in &args.log {
        env_filter = env_filter.add_directive(log.parse()?);
    }
    for module in CRATES {
        if !args.log.iter().any(|x| x.starts_with(module)) {
            env_filter = env_filter.add_directive(format!("{module}={log_level}").parse()?);
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            layer()
                .with_timer(ChronoLocal::new("%v %k:%M:%S %z".to_owned()))
                .compact(),
        )
        .with(layer().with_writer(non_blocking))
        .init();

    default_reports::init_reports();

    let result = match args.command {
        Commands::Report { config_file, only } => report(config_file, only).await,
        Commands::Check { config_file } => check(config_file).await,
        Commands::Paths { config_file } => paths(config_file).await,
    };
    if let Err(err) = &result {
        error!("{err:#?}");
    }
    result
}

async fn report(config_file: PathBuf, only: Option<String>) -> Result<()> {
    let config = Config::load(&config_file).await?;
    info!(
        "Report {} with {} benchmarks into {}",
        config.name,
        config.benchmarks.len(),
        config.output_path().display()
    );
    let written = run_reports(&config, only.as_deref()).await?;
    println!(
        "{} files written to {}",
        written.len(),
        config.output_path().display()
    );
    Ok(())
}

async fn check(config_file: PathBuf) -> Result<()> {
    let config = Config::load(&config_file).await?;
    let dims = &config.dimensions;
    println!(
        "{}: {} benchmarks, {} sizes, {} write ratios, reports: {}",
        config.name,
        config.benchmarks.len(),
        dims.sizes.len(),
        dims.write_ratios.len(),
        config
            .reports
            .iter()
            .map(|r| r.name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    for (benchmark, &size, &write_ratio) in
        iproduct!(&config.benchmarks, &dims.sizes, &dims.write_ratios)
    {
        let key = ExperimentKey::new(&config, benchmark, size, write_ratio, 1);
        let found = dims
            .threads
            .iter()
            .filter(|&&t| {
                key.with_threads(t)
                    .locate(&config.log_dir, config.naming)
                    .is_some()
            })
            .count();
        let baseline = key.locate(&config.log_dir, config.naming).is_some();
        println!(
            "{} -i{size} -u{write_ratio}: {found}/{} thread counts{}",
            benchmark.id(),
            dims.threads.len(),
            if baseline { "" } else { " (no 1-thread run, skipped)" }
        );
    }
    Ok(())
}

async fn paths(config_file: PathBuf) -> Result<()> {
    let config = Config::load(&config_file).await?;
    let dims = &config.dimensions;
    for (benchmark, &size, &write_ratio, threads) in iproduct!(
        &config.benchmarks,
        &dims.sizes,
        &dims.write_ratios,
        dims.dense_threads()
    ) {
        let key = ExperimentKey::new(&config, benchmark, size, write_ratio, threads);
        let path = key.path(&config.log_dir, config.naming);
        let marker = if path.is_file() { "present" } else { "missing" };
        println!("{marker} {}", path.display());
    }
    Ok(())
}
