//! Throwaway log trees for emitter tests

use std::path::PathBuf;

use common::{
    config::{Benchmark, Config, Dimensions},
    experiment::{ExperimentKey, Naming},
    report::Report,
    stats::Trim,
};
use tempfile::TempDir;

use crate::Series;

pub struct LogTree {
    pub dir: TempDir,
    pub config: Config,
}

impl LogTree {
    /// Config with sizes `[1024]`, write ratios `[20]`, warm-up 5 s and a
    /// 1000 ms duration; logs live in `<tmp>/log`
    pub fn new(benchmarks: &[&str], threads: &[u32]) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let log_dir = dir.path().join("log");
        std::fs::create_dir_all(&log_dir).expect("create log dir");
        let config = Config {
            name: "fixture".to_owned(),
            log_dir,
            output_dir: dir.path().join("output"),
            naming: Naming::Full,
            metrics: vec!["throughput".to_owned()],
            benchmarks: benchmarks.iter().map(|b| Benchmark::from(*b)).collect(),
            dimensions: Dimensions {
                sizes: vec![1024],
                write_ratios: vec![20],
                threads: threads.to_vec(),
                max_threads: threads.iter().copied().max().unwrap_or(1),
                warmup_secs: 5,
                duration_ms: 1000,
            },
            reports: Vec::new(),
        };
        Self { dir, config }
    }

    pub fn with_report(mut self, report: Box<dyn Report>) -> Self {
        self.config.reports.push(report);
        self
    }

    pub fn write_lines(&self, bench: &str, size: u64, write: u8, threads: u32, lines: &[String]) {
        let bench = Benchmark::from(bench);
        let key = ExperimentKey::new(&self.config, &bench, size, write, threads);
        let mut text = String::from("# benchmark log\n");
        for line in lines {
            text.push_str(line);
            text.push('\n');
        }
        std::fs::write(key.path(&self.config.log_dir, self.config.naming), text)
            .expect("write log");
    }

    pub fn write_throughput(&self, bench: &str, size: u64, write: u8, threads: u32, samples: &[f64]) {
        let lines = samples
            .iter()
            .map(|s| format!("Run completed, throughput (ops/s) {s:?}"))
            .collect::<Vec<_>>();
        self.write_lines(bench, size, write, threads, &lines);
    }

    pub fn series(&self, bench_idx: usize, size: u64, write_ratio: u8) -> Series<'_> {
        Series {
            metric: &self.config.metrics[0],
            benchmark: &self.config.benchmarks[bench_idx],
            size,
            write_ratio,
            trim: Trim::None,
        }
    }

    pub fn output(&self, file_name: &str) -> PathBuf {
        self.config.output_path().join(file_name)
    }

    pub fn read_output(&self, file_name: &str) -> String {
        std::fs::read_to_string(self.output(file_name)).expect("read output")
    }
}
