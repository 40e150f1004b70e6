//! Policy distributions: categorical over logits and diagonal Gaussian.

use burn::tensor::activation::softmax;
use burn::tensor::backend::Backend;
use burn::tensor::{Distribution, Int, Tensor};
use rand::Rng;
use rand_xoshiro::Xoshiro256StarStar;

/// Clamp range for Gaussian log standard deviations.
pub const LOG_STD_MIN: f32 = -20.0;
pub const LOG_STD_MAX: f32 = 2.0;

const EPS: f32 = 1e-8;

/// Samples an index from a probability vector and returns the index
/// with its log-probability. `probs` must sum to ~1.
pub fn sample_categorical(probs: &[f32], rng: &mut Xoshiro256StarStar) -> (u32, f32) {
    let draw: f32 = rng.gen();
    let mut cumulative = 0.0;
    let mut chosen = probs.len() - 1;
    for (i, &p) in probs.iter().enumerate() {
        cumulative += p;
        if draw < cumulative {
            chosen = i;
            break;
        }
    }
    (chosen as u32, (probs[chosen] + EPS).ln())
}

/// Log-probabilities of `actions` under the categorical distributions
/// given by `logits` (`[batch, n_actions]`). Returns a `[batch]` tensor
/// connected to the autodiff graph.
pub fn categorical_log_prob<B: Backend>(
    logits: Tensor<B, 2>,
    actions: &[u32],
    device: &B::Device,
) -> Tensor<B, 1> {
    let batch = actions.len();
    let probs = softmax(logits, 1);
    let indices: Vec<i32> = actions.iter().map(|&a| a as i32).collect();
    let indices: Tensor<B, 1, Int> = Tensor::from_ints(indices.as_slice(), device);
    let indices: Tensor<B, 2, Int> = indices.reshape([batch, 1]);
    let selected = probs.gather(1, indices);
    let selected: Tensor<B, 1> = selected.flatten(0, 1);
    (selected + EPS).log()
}

/// Draws one sample per row from the Gaussian `N(mean, exp(log_std))`
/// and returns the samples with their summed per-row log-probability.
pub fn sample_diag_gaussian<B: Backend>(
    mean: Tensor<B, 2>,
    log_std: Tensor<B, 2>,
) -> (Tensor<B, 2>, Tensor<B, 1>) {
    let device = mean.device();
    let dims = mean.dims();
    let log_std = log_std.clamp(LOG_STD_MIN, LOG_STD_MAX);
    let std = log_std.clone().exp();
    let noise: Tensor<B, 2> = Tensor::random(dims, Distribution::Normal(0.0, 1.0), &device);
    let samples = mean + std * noise.clone();
    let log_probs = standard_normal_log_prob(noise, log_std);
    (samples, log_probs)
}

/// Log-probability of `actions` under `N(mean, exp(log_std))`, summed
/// over action dimensions. All tensors are `[batch, act_dim]`; the
/// result is `[batch]`.
pub fn diag_gaussian_log_prob<B: Backend>(
    actions: Tensor<B, 2>,
    mean: Tensor<B, 2>,
    log_std: Tensor<B, 2>,
) -> Tensor<B, 1> {
    let log_std = log_std.clamp(LOG_STD_MIN, LOG_STD_MAX);
    let std = log_std.clone().exp();
    let normalized = (actions - mean) / std;
    standard_normal_log_prob(normalized, log_std)
}

fn standard_normal_log_prob<B: Backend>(
    normalized: Tensor<B, 2>,
    log_std: Tensor<B, 2>,
) -> Tensor<B, 1> {
    let log_2pi = (2.0 * std::f32::consts::PI).ln();
    let per_dim = normalized.powf_scalar(2.0).mul_scalar(-0.5) - log_std - 0.5 * log_2pi;
    let summed = per_dim.sum_dim(1);
    summed.flatten(0, 1)
}
