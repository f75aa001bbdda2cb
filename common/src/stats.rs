use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::OPS_PER_MOPS;

#[derive(Error, Debug, PartialEq)]
pub enum StatsError {
    #[error("Need at least {needed} samples, got {got}")]
    InsufficientSamples { needed: usize, got: usize },
}

/// Which samples of a cell take part in aggregation
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trim {
    #[default]
    None,
    /// Discard the first observation of every cell (warm-up outlier)
    DropFirst,
}

impl Trim {
    pub fn apply(self, samples: &[f64]) -> &[f64] {
        match self {
            Trim::None => samples,
            Trim::DropFirst => samples.get(1..).unwrap_or_default(),
        }
    }
}

pub fn mean(data: &[f64]) -> Result<f64, StatsError> {
    if data.is_empty() {
        return Err(StatsError::InsufficientSamples { needed: 1, got: 0 });
    }
    Ok(data.iter().sum::<f64>() / data.len() as f64)
}

/// Sample standard deviation (n - 1 denominator)
pub fn sample_stdev(data: &[f64]) -> Result<f64, StatsError> {
    if data.len() < 2 {
        return Err(StatsError::InsufficientSamples {
            needed: 2,
            got: data.len(),
        });
    }
    let mean = mean(data)?;
    let variance =
        data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (data.len() - 1) as f64;
    Ok(variance.sqrt())
}

pub fn to_mops(ops_per_sec: f64) -> f64 {
    ops_per_sec / OPS_PER_MOPS
}

/// Mean and spread of one cell, in the unit of the raw samples
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub mean: f64,
    /// `None` when only one sample was available
    pub stdev: Option<f64>,
    pub samples: usize,
}

impl Aggregate {
    pub fn speedup_over(&self, baseline: &Aggregate) -> f64 {
        self.mean / baseline.mean
    }
}

/// Aggregates a cell. Returns `None` when nothing is left after trimming, so
/// empty cells are left out instead of showing up as zero.
pub fn summarize(samples: &[f64], trim: Trim) -> Option<Aggregate> {
    let data = trim.apply(samples);
    let mean = mean(data).ok()?;
    Some(Aggregate {
        mean,
        stdev: sample_stdev(data).ok(),
        samples: data.len(),
    })
}
