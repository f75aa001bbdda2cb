use std::{
    collections::HashSet,
    ops::RangeInclusive,
    path::{Path, PathBuf},
};

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs::read_to_string;

use crate::{experiment::Naming, report::Report};

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("No benchmarks in the roster")]
    EmptyRoster,
    #[error("Benchmark identifier at position {0} is blank")]
    BlankBenchmark(usize),
    #[error("Benchmark identifier {0:?} contains a path separator or whitespace")]
    InvalidBenchmark(String),
    #[error("Benchmark {0} is listed more than once")]
    DuplicateBenchmark(String),
    #[error("dimensions.{0} must not be empty")]
    EmptyDimension(&'static str),
    #[error("Write ratio {0} is outside 0..=100")]
    WriteRatioOutOfRange(u8),
    #[error("Thread counts must be positive")]
    ZeroThreads,
    #[error("No metric keywords configured")]
    NoMetrics,
    #[error("Metric keyword at position {0} is blank")]
    BlankMetric(usize),
    #[error("Metric keyword {0} is listed more than once")]
    DuplicateMetric(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub name: String,
    pub log_dir: PathBuf,
    pub output_dir: PathBuf,
    #[serde(default)]
    pub naming: Naming,
    pub metrics: Vec<String>,
    pub benchmarks: Vec<Benchmark>,
    pub dimensions: Dimensions,
    #[serde(default)]
    pub reports: Vec<Box<dyn Report>>,
}

/// Benchmark identifier, usually a dotted class path such as
/// `trees.lockbased.LogicalOrderingAVL`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Benchmark(pub String);

impl Benchmark {
    pub fn id(&self) -> &str {
        &self.0
    }

    /// Last dot-separated segment, used for legends and table rows
    pub fn display_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl From<&str> for Benchmark {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dimensions {
    pub sizes: Vec<u64>,
    pub write_ratios: Vec<u8>,
    /// Curated thread counts used by plots and tables
    pub threads: Vec<u32>,
    /// Upper bound of the dense range used for raw data
    pub max_threads: u32,
    pub warmup_secs: u32,
    pub duration_ms: u64,
}

impl Dimensions {
    pub fn dense_threads(&self) -> RangeInclusive<u32> {
        1..=self.max_threads
    }
}

impl Config {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = read_to_string(path)
            .await
            .wrap_err_with(|| format!("Read config {}", path.display()))?;
        let config: Config = serde_yml::from_str(&data)
            .wrap_err_with(|| format!("Parse config {}", path.display()))?;
        config
            .validate()
            .wrap_err_with(|| format!("Validate config {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.benchmarks.is_empty() {
            return Err(ConfigError::EmptyRoster);
        }
        let mut seen = HashSet::new();
        for (i, bench) in self.benchmarks.iter().enumerate() {
            let id = bench.id();
            if id.trim().is_empty() {
                return Err(ConfigError::BlankBenchmark(i));
            }
            if id.contains(['/', '\\']) || id.chars().any(char::is_whitespace) {
                return Err(ConfigError::InvalidBenchmark(id.to_owned()));
            }
            if !seen.insert(id) {
                return Err(ConfigError::DuplicateBenchmark(id.to_owned()));
            }
        }

        let dims = &self.dimensions;
        if dims.sizes.is_empty() {
            return Err(ConfigError::EmptyDimension("sizes"));
        }
        if dims.write_ratios.is_empty() {
            return Err(ConfigError::EmptyDimension("write_ratios"));
        }
        if let Some(&w) = dims.write_ratios.iter().find(|&&w| w > 100) {
            return Err(ConfigError::WriteRatioOutOfRange(w));
        }
        if dims.threads.is_empty() {
            return Err(ConfigError::EmptyDimension("threads"));
        }
        if dims.max_threads == 0 || dims.threads.contains(&0) {
            return Err(ConfigError::ZeroThreads);
        }

        if self.metrics.is_empty() {
            return Err(ConfigError::NoMetrics);
        }
        if let Some(i) = self.metrics.iter().position(|m| m.trim().is_empty()) {
            return Err(ConfigError::BlankMetric(i));
        }
        let mut seen = HashSet::new();
        for metric in &self.metrics {
            if !seen.insert(metric.to_lowercase()) {
                return Err(ConfigError::DuplicateMetric(metric.clone()));
            }
        }
        Ok(())
    }

    /// Output directory for this warm-up/duration combination, so runs with
    /// different experiment settings never overwrite each other
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(format!(
            "data-w{}-d{}",
            self.dimensions.warmup_secs, self.dimensions.duration_ms
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
name: trees
log_dir: output/log
output_dir: output
metrics: [throughput]
benchmarks:
  - trees.lockbased.ConcurrencyOptimalTreeMap
  # - trees.lockbased.LockBasedStanfordTreeMap
  - trees.lockbased.LogicalOrderingAVL
dimensions:
  sizes: [16384, 65536]
  write_ratios: [0, 20, 100]
  threads: [1, 2, 4]
  max_threads: 8
  warmup_secs: 5
  duration_ms: 10000
"#;

    fn sample() -> Config {
        serde_yml::from_str(CONFIG).unwrap()
    }

    #[test]
    fn parses_and_validates() {
        let config = sample();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.benchmarks.len(), 2);
        assert_eq!(config.naming, Naming::Full);
        assert!(config.reports.is_empty());
        assert_eq!(config.output_path(), PathBuf::from("output/data-w5-d10000"));
        assert_eq!(config.dimensions.dense_threads().count(), 8);
    }

    #[test]
    fn display_name_is_last_segment() {
        assert_eq!(
            Benchmark::from("trees.lockfree.NonBlockingTorontoBSTMap").display_name(),
            "NonBlockingTorontoBSTMap"
        );
        assert_eq!(Benchmark::from("plain").display_name(), "plain");
    }

    #[test]
    fn rejects_invalid_dimensions() {
        let mut config = sample();
        config.dimensions.write_ratios.push(120);
        assert_eq!(config.validate(), Err(ConfigError::WriteRatioOutOfRange(120)));

        let mut config = sample();
        config.dimensions.threads = vec![0, 1];
        assert_eq!(config.validate(), Err(ConfigError::ZeroThreads));

        let mut config = sample();
        config.dimensions.sizes.clear();
        assert_eq!(config.validate(), Err(ConfigError::EmptyDimension("sizes")));
    }

    #[test]
    fn rejects_bad_roster() {
        let mut config = sample();
        config
            .benchmarks
            .push(Benchmark::from("trees.lockbased.LogicalOrderingAVL"));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateBenchmark(_))
        ));

        let mut config = sample();
        config.benchmarks.push(Benchmark::from("../escape"));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBenchmark(_))
        ));

        let mut config = sample();
        config.benchmarks.clear();
        assert_eq!(config.validate(), Err(ConfigError::EmptyRoster));
    }

    #[test]
    fn rejects_blank_metric() {
        let mut config = sample();
        config.metrics.push("  ".to_owned());
        assert_eq!(config.validate(), Err(ConfigError::BlankMetric(1)));
    }

    #[test]
    fn rejects_duplicate_metric() {
        let mut config = sample();
        config.metrics.push("Throughput".to_owned());
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateMetric("Throughput".to_owned()))
        );
    }

    #[tokio::test]
    async fn load_reads_and_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        tokio::fs::write(&path, CONFIG).await.unwrap();
        let config = Config::load(&path).await.unwrap();
        assert_eq!(config.name, "trees");

        let duplicated = CONFIG.replace("[throughput]", "[throughput, throughput]");
        tokio::fs::write(&path, duplicated).await.unwrap();
        let err = Config::load(&path).await.unwrap_err();
        assert!(format!("{err:#}").contains("listed more than once"));

        assert!(Config::load(dir.path().join("missing.yaml")).await.is_err());
    }

    #[test]
    fn unknown_fields_are_errors() {
        let data = CONFIG.replace("metrics:", "metricz:");
        assert!(serde_yml::from_str::<Config>(&data).is_err());
    }
}
