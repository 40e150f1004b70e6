//! Training configuration.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A count field that must be positive was zero.
    ZeroCount { field: &'static str },
    /// A value field outside its allowed interval.
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    /// `steps_per_epoch` does not divide evenly over the worker group.
    IndivisibleSteps {
        steps_per_epoch: usize,
        world_size: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroCount { field } => {
                write!(f, "{field} must be positive")
            }
            ConfigError::OutOfRange {
                field,
                value,
                min,
                max,
            } => {
                write!(f, "{field} = {value} is outside ({min}, {max}]")
            }
            ConfigError::IndivisibleSteps {
                steps_per_epoch,
                world_size,
            } => {
                write!(
                    f,
                    "steps_per_epoch = {steps_per_epoch} is not divisible by {world_size} workers"
                )
            }
        }
    }
}

impl Error for ConfigError {}

/// Hyperparameters of one training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VpgConfig {
    /// Hidden layer widths of both networks.
    pub hidden_sizes: Vec<usize>,
    /// Reward discount.
    pub gamma: f32,
    /// GAE-Lambda factor.
    pub lam: f32,
    /// Policy learning rate.
    pub pi_lr: f64,
    /// Value-function learning rate.
    pub vf_lr: f64,
    /// Environment interactions per epoch, summed over all workers.
    pub steps_per_epoch: usize,
    /// Number of training epochs.
    pub epochs: usize,
    /// Value-function regression iterations per epoch.
    pub train_v_iters: usize,
    /// Episode length cap enforced by the training loop.
    pub max_ep_len: usize,
    /// Base random seed; each worker derives its own from it.
    pub seed: u64,
    /// If set, rank 0 renders the mean-return curve here after training.
    pub plot_path: Option<PathBuf>,
}

impl Default for VpgConfig {
    fn default() -> Self {
        Self {
            hidden_sizes: vec![64, 64],
            gamma: 0.99,
            lam: 0.97,
            pi_lr: 3e-4,
            vf_lr: 1e-3,
            steps_per_epoch: 4000,
            epochs: 50,
            train_v_iters: 80,
            max_ep_len: 1000,
            seed: 0,
            plot_path: None,
        }
    }
}

impl VpgConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hidden_sizes(mut self, hidden_sizes: Vec<usize>) -> Self {
        self.hidden_sizes = hidden_sizes;
        self
    }

    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_lam(mut self, lam: f32) -> Self {
        self.lam = lam;
        self
    }

    pub fn with_pi_lr(mut self, pi_lr: f64) -> Self {
        self.pi_lr = pi_lr;
        self
    }

    pub fn with_vf_lr(mut self, vf_lr: f64) -> Self {
        self.vf_lr = vf_lr;
        self
    }

    pub fn with_steps_per_epoch(mut self, steps_per_epoch: usize) -> Self {
        self.steps_per_epoch = steps_per_epoch;
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_train_v_iters(mut self, train_v_iters: usize) -> Self {
        self.train_v_iters = train_v_iters;
        self
    }

    pub fn with_max_ep_len(mut self, max_ep_len: usize) -> Self {
        self.max_ep_len = max_ep_len;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_plot_path(mut self, plot_path: impl Into<PathBuf>) -> Self {
        self.plot_path = Some(plot_path.into());
        self
    }

    /// Validates all fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("steps_per_epoch", self.steps_per_epoch),
            ("epochs", self.epochs),
            ("train_v_iters", self.train_v_iters),
            ("max_ep_len", self.max_ep_len),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroCount { field });
            }
        }
        for (field, value) in [("gamma", self.gamma), ("lam", self.lam)] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::OutOfRange {
                    field,
                    value: value as f64,
                    min: 0.0,
                    max: 1.0,
                });
            }
        }
        for (field, value) in [("pi_lr", self.pi_lr), ("vf_lr", self.vf_lr)] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::OutOfRange {
                    field,
                    value,
                    min: 0.0,
                    max: f64::INFINITY,
                });
            }
        }
        Ok(())
    }

    /// This worker's share of `steps_per_epoch`.
    pub fn local_steps_per_epoch(&self, world_size: usize) -> Result<usize, ConfigError> {
        if world_size == 0 || self.steps_per_epoch % world_size != 0 {
            return Err(ConfigError::IndivisibleSteps {
                steps_per_epoch: self.steps_per_epoch,
                world_size,
            });
        }
        Ok(self.steps_per_epoch / world_size)
    }

    /// Seed for worker `rank`, spread out so worker streams never
    /// overlap for any practical run length.
    pub fn worker_seed(&self, rank: usize) -> u64 {
        self.seed.wrapping_add(10_000 * rank as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(VpgConfig::default().validate().is_ok());
    }

    #[test]
    fn test_builders_chain() {
        let config = VpgConfig::new()
            .with_gamma(0.95)
            .with_lam(1.0)
            .with_steps_per_epoch(800)
            .with_epochs(10)
            .with_seed(7);
        assert_eq!(config.gamma, 0.95);
        assert_eq!(config.lam, 1.0);
        assert_eq!(config.steps_per_epoch, 800);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_counts() {
        let err = VpgConfig::new().with_epochs(0).validate().unwrap_err();
        assert_eq!(err, ConfigError::ZeroCount { field: "epochs" });
    }

    #[test]
    fn test_rejects_out_of_range_gamma() {
        assert!(VpgConfig::new().with_gamma(0.0).validate().is_err());
        assert!(VpgConfig::new().with_gamma(1.5).validate().is_err());
        assert!(VpgConfig::new().with_gamma(1.0).validate().is_ok());
    }

    #[test]
    fn test_local_steps_division() {
        let config = VpgConfig::new().with_steps_per_epoch(4000);
        assert_eq!(config.local_steps_per_epoch(4).unwrap(), 1000);
        let err = config.local_steps_per_epoch(3).unwrap_err();
        assert_eq!(
            err,
            ConfigError::IndivisibleSteps {
                steps_per_epoch: 4000,
                world_size: 3
            }
        );
    }

    #[test]
    fn test_worker_seeds_are_spread() {
        let config = VpgConfig::new().with_seed(5);
        assert_eq!(config.worker_seed(0), 5);
        assert_eq!(config.worker_seed(2), 20_005);
    }
}
