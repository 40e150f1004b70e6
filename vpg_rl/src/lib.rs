//! # vpg_rl: Vanilla Policy Gradient with GAE-Lambda
//!
//! On-policy policy-gradient training with generalized advantage
//! estimation, for a single worker or a lockstep group of worker
//! threads.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      VPG worker group                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Thread 0 (root)     Thread 1           Thread N             │
//! │  ┌────────────┐      ┌────────────┐     ┌────────────┐       │
//! │  │ VpgRunner  │      │ VpgRunner  │     │ VpgRunner  │       │
//! │  │ env + agent│      │ env + agent│     │ env + agent│       │
//! │  │ VpgBuffer  │      │ VpgBuffer  │     │ VpgBuffer  │       │
//! │  └─────┬──────┘      └─────┬──────┘     └─────┬──────┘       │
//! │        │    allreduce / broadcast (star)      │              │
//! │        └───────────────────┴──────────────────┘              │
//! │                            ▼                                 │
//! │        advantage normalization, return statistics,           │
//! │        rank-0 weight broadcast after every update            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every worker runs the same loop: collect `steps_per_epoch /
//! world_size` environment steps, close trajectory segments with the
//! right bootstrap (0 on terminals, the critic's estimate on cutoffs),
//! then take one policy-gradient step and several value-regression
//! steps on the epoch's batch. Collectives keep advantages normalized
//! with group-wide statistics and parameters identical on every rank.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vpg_rl::{categorical_actor_critic, SingleProcess, VpgConfig, VpgRunner};
//! use vpg_rl::metrics::ConsoleLogger;
//!
//! let config = VpgConfig::new()
//!     .with_steps_per_epoch(4000)
//!     .with_epochs(50)
//!     .with_gamma(0.99);
//!
//! let mut agent = categorical_actor_critic::<B>(obs_dim, n_actions, &config.hidden_sizes,
//!     config.pi_lr, config.vf_lr, config.seed, &device);
//! let mut logger = ConsoleLogger::new();
//! let report = VpgRunner::new(config).run(&mut agent, &mut env, &SingleProcess, &mut logger)?;
//! ```

pub mod algorithms;
pub mod buffers;
pub mod comm;
pub mod core;
pub mod environment;
pub mod metrics;
pub mod nn;
pub mod runners;

// Re-export commonly used types
pub use crate::core::{discount_cumsum, Action, ActionSpace};

pub use algorithms::{
    categorical_actor_critic, gaussian_actor_critic, ActorCritic, CategoricalActorCritic,
    Evaluation, GaussianActorCritic,
};
pub use buffers::{BufferError, RolloutBatch, VpgBuffer};
pub use comm::{Collective, GroupMember, ScalarStats, SingleProcess, ThreadGroup};
pub use environment::{Environment, EnvironmentError, StepOutcome};
pub use metrics::{ConsoleLogger, CsvLogger, EpochSnapshot, MetricsLogger, NullLogger};
pub use runners::{ConfigError, TrainError, TrainingReport, VpgConfig, VpgRunner};
