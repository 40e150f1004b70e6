//! Actor-critic contract consumed by the training loop.

use crate::buffers::RolloutBatch;
use crate::comm::Collective;
use crate::core::Action;

/// Policy output for one observation: a sampled action with its
/// log-probability, and the critic's value estimate.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub action: Action,
    pub log_prob: f32,
    pub value: f32,
}

/// The agent driven by [`VpgRunner`](crate::runners::VpgRunner).
///
/// `evaluate` and `value` run inference for data collection;
/// `update_policy` and `update_value` consume one epoch's batch;
/// `synchronize` makes parameters identical across the worker group
/// (called once before training and after every update).
pub trait ActorCritic {
    /// Samples an action for `obs` and estimates its value.
    fn evaluate(&mut self, obs: &[f32]) -> Evaluation;

    /// Critic value of `obs` alone, used to bootstrap cut-off episodes.
    fn value(&mut self, obs: &[f32]) -> f32;

    /// One policy-gradient ascent step on the batch. Returns the
    /// policy loss before the step.
    fn update_policy(&mut self, batch: &RolloutBatch) -> f32;

    /// `iterations` regression steps fitting the critic to the batch
    /// returns. Returns the value loss of the last step.
    fn update_value(&mut self, batch: &RolloutBatch, iterations: usize) -> f32;

    /// Aligns parameters across the group; a no-op for a single worker.
    fn synchronize<C: Collective>(&mut self, comm: &C);
}
