pub mod config;
pub mod experiment;
pub mod format;
pub mod log;
pub mod report;
pub mod stats;

pub const OPS_PER_MOPS: f64 = 1_000_000.0;
