//! Training orchestration.

pub mod vpg_config;
pub mod vpg_runner;

#[cfg(test)]
mod tests;

pub use vpg_config::{ConfigError, VpgConfig};
pub use vpg_runner::{TrainError, TrainingReport, VpgRunner};
