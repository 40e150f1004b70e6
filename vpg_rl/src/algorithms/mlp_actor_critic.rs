//! MLP actor-critic agents with separate policy and value networks.
//!
//! Two concrete agents: [`CategoricalActorCritic`] for discrete action
//! spaces and [`GaussianActorCritic`] for continuous ones. Both keep
//! independent Adam optimizers for the policy and the value function
//! and synchronize across workers by broadcasting rank 0's weights as
//! recorded bytes.

use burn::module::{AutodiffModule, Module, Param};
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::record::{BinBytesRecorder, FullPrecisionSettings, Recorder};
use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::tensor::Tensor;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

use super::actor_critic::{ActorCritic, Evaluation};
use super::distributions::{
    categorical_log_prob, diag_gaussian_log_prob, sample_categorical, sample_diag_gaussian,
};
use crate::buffers::RolloutBatch;
use crate::comm::Collective;
use crate::core::Action;
use crate::nn::{Mlp, MlpConfig};

/// Initial log standard deviation of the Gaussian policy.
const INITIAL_LOG_STD: f32 = -0.5;

/// Creates an Adam optimizer for `M`.
fn create_optimizer<B, M>() -> impl Optimizer<M, B>
where
    B: AutodiffBackend,
    M: AutodiffModule<B>,
{
    AdamConfig::new().init()
}

/// Broadcasts rank 0's copy of `module` to every rank; non-root ranks
/// load the received weights. Identity when the group has one worker.
fn broadcast_module<B, M, C>(module: M, comm: &C, device: &B::Device) -> M
where
    B: AutodiffBackend,
    M: AutodiffModule<B>,
    C: Collective,
{
    if comm.world_size() == 1 {
        return module;
    }
    let recorder = BinBytesRecorder::<FullPrecisionSettings>::default();
    let bytes = recorder
        .record(module.clone().into_record(), ())
        .expect("failed to serialize module weights");
    let bytes = comm.broadcast_bytes(bytes);
    if comm.is_root() {
        module
    } else {
        let record = recorder
            .load(bytes, device)
            .expect("failed to load broadcast weights");
        module.load_record(record)
    }
}

fn scalar_of<B: Backend>(tensor: Tensor<B, 1>) -> f32 {
    tensor.into_data().as_slice::<f32>().expect("scalar readback")[0]
}

/// Actor-critic for discrete action spaces: a policy MLP producing
/// logits and a value MLP producing a scalar.
pub struct CategoricalActorCritic<B, OP, OV>
where
    B: AutodiffBackend,
    OP: Optimizer<Mlp<B>, B>,
    OV: Optimizer<Mlp<B>, B>,
{
    pi: Mlp<B>,
    v: Mlp<B>,
    pi_optim: OP,
    v_optim: OV,
    pi_lr: f64,
    vf_lr: f64,
    obs_dim: usize,
    rng: Xoshiro256StarStar,
    device: B::Device,
}

/// Builds a [`CategoricalActorCritic`] with fresh networks and Adam
/// optimizers. `seed` drives both weight init and action sampling.
pub fn categorical_actor_critic<B: AutodiffBackend>(
    obs_dim: usize,
    n_actions: usize,
    hidden_sizes: &[usize],
    pi_lr: f64,
    vf_lr: f64,
    seed: u64,
    device: &B::Device,
) -> CategoricalActorCritic<B, impl Optimizer<Mlp<B>, B>, impl Optimizer<Mlp<B>, B>> {
    B::seed(seed);
    let pi = MlpConfig::new(obs_dim, n_actions)
        .with_hidden_sizes(hidden_sizes.to_vec())
        .init(device);
    let v = MlpConfig::new(obs_dim, 1)
        .with_hidden_sizes(hidden_sizes.to_vec())
        .init(device);
    CategoricalActorCritic {
        pi,
        v,
        pi_optim: create_optimizer(),
        v_optim: create_optimizer(),
        pi_lr,
        vf_lr,
        obs_dim,
        rng: Xoshiro256StarStar::seed_from_u64(seed),
        device: device.clone(),
    }
}

impl<B, OP, OV> CategoricalActorCritic<B, OP, OV>
where
    B: AutodiffBackend,
    OP: Optimizer<Mlp<B>, B>,
    OV: Optimizer<Mlp<B>, B>,
{
    fn obs_tensor_valid(&self, obs: &[f32]) -> Tensor<B::InnerBackend, 2> {
        Tensor::<B::InnerBackend, 1>::from_floats(obs, &self.device).reshape([1, self.obs_dim])
    }

    fn obs_batch(&self, batch: &RolloutBatch) -> Tensor<B, 2> {
        Tensor::<B, 1>::from_floats(batch.observations.as_slice(), &self.device)
            .reshape([batch.len(), self.obs_dim])
    }
}

impl<B, OP, OV> ActorCritic for CategoricalActorCritic<B, OP, OV>
where
    B: AutodiffBackend,
    OP: Optimizer<Mlp<B>, B>,
    OV: Optimizer<Mlp<B>, B>,
{
    fn evaluate(&mut self, obs: &[f32]) -> Evaluation {
        let obs_t = self.obs_tensor_valid(obs);
        let logits = self.pi.valid().forward(obs_t.clone());
        let probs = burn::tensor::activation::softmax(logits, 1);
        let probs_data = probs.into_data();
        let probs: &[f32] = probs_data.as_slice().expect("probability readback");
        let (action, log_prob) = sample_categorical(probs, &mut self.rng);

        let value = scalar_of(self.v.valid().forward(obs_t).flatten(0, 1));
        Evaluation {
            action: Action::Discrete(action),
            log_prob,
            value,
        }
    }

    fn value(&mut self, obs: &[f32]) -> f32 {
        let obs_t = self.obs_tensor_valid(obs);
        scalar_of(self.v.valid().forward(obs_t).flatten(0, 1))
    }

    fn update_policy(&mut self, batch: &RolloutBatch) -> f32 {
        let obs = self.obs_batch(batch);
        let actions: Vec<u32> = batch.actions.iter().map(|&a| a as u32).collect();
        let adv = Tensor::<B, 1>::from_floats(batch.advantages.as_slice(), &self.device);

        let pi = self.pi.clone();
        let logits = pi.forward(obs);
        let log_probs = categorical_log_prob(logits, &actions, &self.device);
        let loss = (log_probs * adv).mean().neg();
        let loss_value = scalar_of(loss.clone().inner());

        let grads = GradientsParams::from_grads(loss.backward(), &pi);
        self.pi = self.pi_optim.step(self.pi_lr, pi, grads);
        loss_value
    }

    fn update_value(&mut self, batch: &RolloutBatch, iterations: usize) -> f32 {
        let obs = self.obs_batch(batch);
        let returns = Tensor::<B, 1>::from_floats(batch.returns.as_slice(), &self.device);

        let mut last_loss = 0.0;
        for _ in 0..iterations {
            let v = self.v.clone();
            let values: Tensor<B, 1> = v.forward(obs.clone()).flatten(0, 1);
            let loss = (values - returns.clone()).powf_scalar(2.0).mean();
            last_loss = scalar_of(loss.clone().inner());

            let grads = GradientsParams::from_grads(loss.backward(), &v);
            self.v = self.v_optim.step(self.vf_lr, v, grads);
        }
        last_loss
    }

    fn synchronize<C: Collective>(&mut self, comm: &C) {
        self.pi = broadcast_module(self.pi.clone(), comm, &self.device);
        self.v = broadcast_module(self.v.clone(), comm, &self.device);
    }
}

/// Gaussian policy head: an MLP for the mean plus a state-independent
/// learnable log standard deviation.
#[derive(Module, Debug)]
pub struct GaussianPolicyNet<B: Backend> {
    mlp: Mlp<B>,
    log_std: Param<Tensor<B, 1>>,
}

impl<B: Backend> GaussianPolicyNet<B> {
    pub fn new(obs_dim: usize, act_dim: usize, hidden_sizes: &[usize], device: &B::Device) -> Self {
        let mlp = MlpConfig::new(obs_dim, act_dim)
            .with_hidden_sizes(hidden_sizes.to_vec())
            .init(device);
        let log_std = Param::from_tensor(Tensor::full([act_dim], INITIAL_LOG_STD, device));
        Self { mlp, log_std }
    }

    /// Returns `(mean, log_std)`, both `[batch, act_dim]`.
    pub fn forward(&self, obs: Tensor<B, 2>) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let mean = self.mlp.forward(obs);
        let dims = mean.dims();
        let log_std = self.log_std.val().unsqueeze::<2>().expand(dims);
        (mean, log_std)
    }
}

/// Actor-critic for continuous action spaces.
pub struct GaussianActorCritic<B, OP, OV>
where
    B: AutodiffBackend,
    OP: Optimizer<GaussianPolicyNet<B>, B>,
    OV: Optimizer<Mlp<B>, B>,
{
    pi: GaussianPolicyNet<B>,
    v: Mlp<B>,
    pi_optim: OP,
    v_optim: OV,
    pi_lr: f64,
    vf_lr: f64,
    obs_dim: usize,
    act_dim: usize,
    device: B::Device,
}

/// Builds a [`GaussianActorCritic`] with fresh networks and Adam
/// optimizers.
pub fn gaussian_actor_critic<B: AutodiffBackend>(
    obs_dim: usize,
    act_dim: usize,
    hidden_sizes: &[usize],
    pi_lr: f64,
    vf_lr: f64,
    seed: u64,
    device: &B::Device,
) -> GaussianActorCritic<B, impl Optimizer<GaussianPolicyNet<B>, B>, impl Optimizer<Mlp<B>, B>> {
    B::seed(seed);
    let pi = GaussianPolicyNet::new(obs_dim, act_dim, hidden_sizes, device);
    let v = MlpConfig::new(obs_dim, 1)
        .with_hidden_sizes(hidden_sizes.to_vec())
        .init(device);
    GaussianActorCritic {
        pi,
        v,
        pi_optim: create_optimizer(),
        v_optim: create_optimizer(),
        pi_lr,
        vf_lr,
        obs_dim,
        act_dim,
        device: device.clone(),
    }
}

impl<B, OP, OV> GaussianActorCritic<B, OP, OV>
where
    B: AutodiffBackend,
    OP: Optimizer<GaussianPolicyNet<B>, B>,
    OV: Optimizer<Mlp<B>, B>,
{
    fn obs_tensor_valid(&self, obs: &[f32]) -> Tensor<B::InnerBackend, 2> {
        Tensor::<B::InnerBackend, 1>::from_floats(obs, &self.device).reshape([1, self.obs_dim])
    }

    fn obs_batch(&self, batch: &RolloutBatch) -> Tensor<B, 2> {
        Tensor::<B, 1>::from_floats(batch.observations.as_slice(), &self.device)
            .reshape([batch.len(), self.obs_dim])
    }
}

impl<B, OP, OV> ActorCritic for GaussianActorCritic<B, OP, OV>
where
    B: AutodiffBackend,
    OP: Optimizer<GaussianPolicyNet<B>, B>,
    OV: Optimizer<Mlp<B>, B>,
{
    fn evaluate(&mut self, obs: &[f32]) -> Evaluation {
        let obs_t = self.obs_tensor_valid(obs);
        let (mean, log_std) = self.pi.valid().forward(obs_t.clone());
        let (samples, log_probs) = sample_diag_gaussian(mean, log_std);
        let samples_data = samples.into_data();
        let action: Vec<f32> = samples_data
            .as_slice::<f32>()
            .expect("action readback")
            .to_vec();
        let log_prob = scalar_of(log_probs);

        let value = scalar_of(self.v.valid().forward(obs_t).flatten(0, 1));
        Evaluation {
            action: Action::Continuous(action),
            log_prob,
            value,
        }
    }

    fn value(&mut self, obs: &[f32]) -> f32 {
        let obs_t = self.obs_tensor_valid(obs);
        scalar_of(self.v.valid().forward(obs_t).flatten(0, 1))
    }

    fn update_policy(&mut self, batch: &RolloutBatch) -> f32 {
        let n = batch.len();
        let obs = self.obs_batch(batch);
        let actions = Tensor::<B, 1>::from_floats(batch.actions.as_slice(), &self.device)
            .reshape([n, self.act_dim]);
        let adv = Tensor::<B, 1>::from_floats(batch.advantages.as_slice(), &self.device);

        let pi = self.pi.clone();
        let (mean, log_std) = pi.forward(obs);
        let log_probs = diag_gaussian_log_prob(actions, mean, log_std);
        let loss = (log_probs * adv).mean().neg();
        let loss_value = scalar_of(loss.clone().inner());

        let grads = GradientsParams::from_grads(loss.backward(), &pi);
        self.pi = self.pi_optim.step(self.pi_lr, pi, grads);
        loss_value
    }

    fn update_value(&mut self, batch: &RolloutBatch, iterations: usize) -> f32 {
        let obs = self.obs_batch(batch);
        let returns = Tensor::<B, 1>::from_floats(batch.returns.as_slice(), &self.device);

        let mut last_loss = 0.0;
        for _ in 0..iterations {
            let v = self.v.clone();
            let values: Tensor<B, 1> = v.forward(obs.clone()).flatten(0, 1);
            let loss = (values - returns.clone()).powf_scalar(2.0).mean();
            last_loss = scalar_of(loss.clone().inner());

            let grads = GradientsParams::from_grads(loss.backward(), &v);
            self.v = self.v_optim.step(self.vf_lr, v, grads);
        }
        last_loss
    }

    fn synchronize<C: Collective>(&mut self, comm: &C) {
        self.pi = broadcast_module(self.pi.clone(), comm, &self.device);
        self.v = broadcast_module(self.v.clone(), comm, &self.device);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comm::SingleProcess;

    type TestBackend = burn::backend::Autodiff<burn::backend::NdArray>;

    fn tiny_batch(obs_dim: usize, act_dim: usize, actions: Vec<f32>) -> RolloutBatch {
        let n = actions.len() / act_dim;
        RolloutBatch {
            observations: vec![0.1; n * obs_dim],
            actions,
            advantages: vec![1.0, -1.0],
            returns: vec![0.5, -0.5],
            log_probs: vec![-0.7, -0.7],
            obs_dim,
            act_dim,
        }
    }

    #[test]
    fn test_categorical_evaluate_in_range() {
        let device = Default::default();
        let mut agent =
            categorical_actor_critic::<TestBackend>(3, 2, &[8], 3e-4, 1e-3, 0, &device);
        for _ in 0..10 {
            let eval = agent.evaluate(&[0.1, -0.2, 0.3]);
            assert!(eval.action.as_discrete() < 2);
            assert!(eval.log_prob <= 0.0);
            assert!(eval.value.is_finite());
        }
    }

    #[test]
    fn test_categorical_updates_run() {
        let device = Default::default();
        let mut agent =
            categorical_actor_critic::<TestBackend>(2, 2, &[4], 3e-4, 1e-3, 1, &device);
        let batch = tiny_batch(2, 1, vec![0.0, 1.0]);
        let pi_loss = agent.update_policy(&batch);
        let v_loss = agent.update_value(&batch, 3);
        assert!(pi_loss.is_finite());
        assert!(v_loss.is_finite() && v_loss >= 0.0);
    }

    #[test]
    fn test_value_regression_reduces_loss() {
        let device = Default::default();
        let mut agent =
            categorical_actor_critic::<TestBackend>(2, 2, &[8], 3e-4, 1e-2, 2, &device);
        let batch = tiny_batch(2, 1, vec![0.0, 1.0]);
        let early = agent.update_value(&batch, 1);
        let late = agent.update_value(&batch, 200);
        assert!(late < early);
    }

    #[test]
    fn test_gaussian_evaluate_dimensions() {
        let device = Default::default();
        let mut agent = gaussian_actor_critic::<TestBackend>(3, 2, &[8], 3e-4, 1e-3, 3, &device);
        let eval = agent.evaluate(&[0.0, 0.5, -0.5]);
        assert_eq!(eval.action.as_continuous().len(), 2);
        assert!(eval.log_prob.is_finite());
        assert!(eval.value.is_finite());
    }

    #[test]
    fn test_gaussian_updates_run() {
        let device = Default::default();
        let mut agent = gaussian_actor_critic::<TestBackend>(2, 2, &[4], 3e-4, 1e-3, 4, &device);
        let batch = tiny_batch(2, 2, vec![0.1, -0.1, 0.2, -0.2]);
        assert!(agent.update_policy(&batch).is_finite());
        assert!(agent.update_value(&batch, 2).is_finite());
    }

    #[test]
    fn test_synchronize_single_worker_is_noop() {
        let device = Default::default();
        let mut agent =
            categorical_actor_critic::<TestBackend>(2, 2, &[4], 3e-4, 1e-3, 5, &device);
        let before = agent.value(&[0.3, 0.3]);
        agent.synchronize(&SingleProcess);
        let after = agent.value(&[0.3, 0.3]);
        assert_eq!(before, after);
    }
}
