use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use regex::Regex;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum LogError {
    #[error("Log file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Could not read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Line {line}: trailing token {token:?} is not a number")]
    Parse { line: usize, token: String },
    #[error("{}: line {line}: trailing token {token:?} is not a number", path.display())]
    ParseInFile {
        path: PathBuf,
        line: usize,
        token: String,
    },
    #[error("Invalid annotation pattern")]
    Pattern(#[from] regex::Error),
}

/// Samples per metric keyword, in file order. Every configured keyword has an
/// entry, kept in configured order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MetricSeries {
    series: Vec<(String, Vec<f64>)>,
}

impl MetricSeries {
    fn new(keys: &[String]) -> Self {
        Self {
            series: keys.iter().map(|k| (k.clone(), Vec::new())).collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&[f64]> {
        self.series
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.series.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    fn push(&mut self, key: &str, value: f64) {
        if let Some((_, values)) = self.series.iter_mut().find(|(k, _)| k == key) {
            values.push(value);
        }
    }
}

/// Extracts metric samples from benchmark log lines
#[derive(Debug, Clone)]
pub struct LineParser {
    keys: Vec<String>,
    lowered: Vec<String>,
    annotation: Regex,
}

impl LineParser {
    pub fn new(keys: &[String]) -> Result<Self, LogError> {
        Ok(Self {
            keys: keys.to_vec(),
            lowered: keys.iter().map(|k| k.to_lowercase()).collect(),
            annotation: Regex::new(r"\([^()]*\)")?,
        })
    }

    /// The keyword that claims `line`. Matching is a case-insensitive
    /// substring test; when several keywords match, the one listed last wins.
    pub fn claiming_key(&self, line: &str) -> Option<&str> {
        let line = line.to_lowercase();
        self.lowered
            .iter()
            .zip(&self.keys)
            .rev()
            .find(|(lowered, _)| line.contains(lowered.as_str()))
            .map(|(_, key)| key.as_str())
    }

    /// Final whitespace-delimited token once parenthesized annotations are
    /// removed. Nested groups are stripped innermost first until none is left.
    pub fn trailing_value(&self, line: &str) -> Option<String> {
        let mut stripped = line.to_owned();
        while self.annotation.is_match(&stripped) {
            stripped = self.annotation.replace_all(&stripped, "").into_owned();
        }
        stripped.split_whitespace().last().map(str::to_owned)
    }

    pub fn parse(&self, text: &str) -> Result<MetricSeries, LogError> {
        let mut series = MetricSeries::new(&self.keys);
        for (i, line) in text.lines().enumerate() {
            let Some(key) = self.claiming_key(line) else {
                continue;
            };
            let token = self.trailing_value(line).unwrap_or_default();
            let value = token.parse::<f64>().map_err(|_| LogError::Parse {
                line: i + 1,
                token: token.clone(),
            })?;
            series.push(key, value);
        }
        Ok(series)
    }

    /// Reads one log file. Callers normally check existence first through
    /// [`crate::experiment::ExperimentKey::locate`].
    pub async fn read(&self, path: &Path) -> Result<MetricSeries, LogError> {
        let text = tokio::fs::read_to_string(path).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                LogError::NotFound(path.to_path_buf())
            } else {
                LogError::Io {
                    path: path.to_path_buf(),
                    source: err,
                }
            }
        })?;
        let series = self.parse(&text).map_err(|err| match err {
            LogError::Parse { line, token } => LogError::ParseInFile {
                path: path.to_path_buf(),
                line,
                token,
            },
            other => other,
        })?;
        for (key, samples) in series.iter() {
            debug!("{}: {} {key} samples", path.display(), samples.len());
        }
        Ok(series)
    }
}
