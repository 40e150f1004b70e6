//! Environment trait for episodic training.

use std::error::Error;
use std::fmt;

use crate::core::{Action, ActionSpace};

/// Result of advancing an environment by one action.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// Observation after the transition.
    pub observation: Vec<f32>,
    /// Reward produced by the transition.
    pub reward: f32,
    /// True if the episode reached a genuine terminal state. Time limits
    /// are not terminal; the training loop enforces those itself.
    pub terminal: bool,
}

/// An episodic environment driven by the training loop.
///
/// `observation_size` and `action_space` must stay constant for the
/// lifetime of the environment; the rollout buffer is sized from them.
pub trait Environment {
    /// Dimension of the flat observation vector.
    fn observation_size(&self) -> usize;

    /// Shape of the action space.
    fn action_space(&self) -> ActionSpace;

    /// Starts a new episode and returns the initial observation.
    fn reset(&mut self, seed: u64) -> Result<Vec<f32>, EnvironmentError>;

    /// Advances one step with `action`.
    fn step(&mut self, action: &Action) -> Result<StepOutcome, EnvironmentError>;
}

/// Error raised by an environment implementation.
#[derive(Debug)]
pub struct EnvironmentError {
    message: String,
}

impl EnvironmentError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for EnvironmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "environment error: {}", self.message)
    }
}

impl Error for EnvironmentError {}
