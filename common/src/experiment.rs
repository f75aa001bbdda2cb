use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{Benchmark, Config};

/// Log file naming scheme of the benchmark harness
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Naming {
    /// `<bench>-i<size>-u<write>-t<threads>-w<warmup>-d<duration>.log`
    #[default]
    Full,
    /// `<bench>-i<size>-u<write>-t<threads>.log`, produced by older harness
    /// versions that did not record warm-up and duration
    Legacy,
}

/// Identifies the log file of a single benchmark run
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExperimentKey<'a> {
    pub benchmark: &'a Benchmark,
    pub size: u64,
    pub write_ratio: u8,
    pub threads: u32,
    pub warmup_secs: u32,
    pub duration_ms: u64,
}

impl<'a> ExperimentKey<'a> {
    /// Key for a cell, taking warm-up and duration from the config
    pub fn new(
        config: &Config,
        benchmark: &'a Benchmark,
        size: u64,
        write_ratio: u8,
        threads: u32,
    ) -> Self {
        Self {
            benchmark,
            size,
            write_ratio,
            threads,
            warmup_secs: config.dimensions.warmup_secs,
            duration_ms: config.dimensions.duration_ms,
        }
    }

    pub fn with_threads(&self, threads: u32) -> Self {
        Self {
            threads,
            ..self.clone()
        }
    }

    pub fn file_name(&self, naming: Naming) -> String {
        let base = format!(
            "{}-i{}-u{}-t{}",
            self.benchmark.id(),
            self.size,
            self.write_ratio,
            self.threads
        );
        match naming {
            Naming::Full => format!("{base}-w{}-d{}.log", self.warmup_secs, self.duration_ms),
            Naming::Legacy => format!("{base}.log"),
        }
    }

    pub fn path(&self, root: &Path, naming: Naming) -> PathBuf {
        root.join(self.file_name(naming))
    }

    /// Resolved path if the log exists, `None` if the run was never recorded
    pub fn locate(&self, root: &Path, naming: Naming) -> Option<PathBuf> {
        let path = self.path(root, naming);
        path.is_file().then_some(path)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn key(bench: &Benchmark) -> ExperimentKey<'_> {
        ExperimentKey {
            benchmark: bench,
            size: 1024,
            write_ratio: 20,
            threads: 4,
            warmup_secs: 5,
            duration_ms: 1000,
        }
    }

    #[test]
    fn full_file_name() {
        let bench = Benchmark::from("trees.lockbased.LogicalOrderingAVL");
        assert_eq!(
            key(&bench).file_name(Naming::Full),
            "trees.lockbased.LogicalOrderingAVL-i1024-u20-t4-w5-d1000.log"
        );
        assert_eq!(
            key(&bench).path(Path::new("../output/log"), Naming::Legacy),
            PathBuf::from("../output/log/trees.lockbased.LogicalOrderingAVL-i1024-u20-t4.log")
        );
    }

    #[test]
    fn distinct_keys_resolve_to_distinct_paths() {
        let a = Benchmark::from("B");
        let b = Benchmark::from("C");
        let base = key(&a);
        let variants = [
            base.clone(),
            ExperimentKey { benchmark: &b, ..base.clone() },
            ExperimentKey { size: 2048, ..base.clone() },
            ExperimentKey { write_ratio: 40, ..base.clone() },
            base.with_threads(8),
            ExperimentKey { warmup_secs: 10, ..base.clone() },
            ExperimentKey { duration_ms: 10000, ..base.clone() },
            // digits must not run together across fields
            ExperimentKey { size: 10, write_ratio: 24, ..base.clone() },
            ExperimentKey { size: 102, write_ratio: 4, ..base.clone() },
        ];
        let root = Path::new("logs");
        let paths: HashSet<_> = variants.iter().map(|k| k.path(root, Naming::Full)).collect();
        assert_eq!(paths.len(), variants.len());
        assert_eq!(base.path(root, Naming::Full), base.clone().path(root, Naming::Full));
    }

    #[test]
    fn locate_skips_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let bench = Benchmark::from("B");
        let present = key(&bench);
        std::fs::write(present.path(dir.path(), Naming::Full), "throughput 1.0\n").unwrap();

        assert!(present.locate(dir.path(), Naming::Full).is_some());
        assert!(present.locate(dir.path(), Naming::Legacy).is_none());
        assert!(present.with_threads(8).locate(dir.path(), Naming::Full).is_none());
    }
}
