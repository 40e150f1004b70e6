//! Fixed-capacity on-policy trajectory buffer with GAE-Lambda.

use std::error::Error;
use std::fmt;

use crate::comm::Collective;
use crate::core::discount_cumsum;

/// Floor applied to the pooled advantage std before normalization, so a
/// zero-variance epoch reduces to mean subtraction instead of dividing
/// by zero.
pub const ADV_STD_FLOOR: f32 = 1e-8;

/// Contract violations on the buffer lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// `store` was called with no free slot left.
    Full { capacity: usize },
    /// `get` was called before the buffer filled.
    NotFull { stored: usize, capacity: usize },
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::Full { capacity } => {
                write!(f, "buffer is full ({capacity} steps); call get() first")
            }
            BufferError::NotFull { stored, capacity } => {
                write!(f, "buffer holds {stored}/{capacity} steps; fill it before get()")
            }
        }
    }
}

impl Error for BufferError {}

/// One epoch of rollout data, extracted by [`VpgBuffer::get`].
///
/// Columns are flat and row-major: row `i` of `observations` is
/// `observations[i * obs_dim .. (i + 1) * obs_dim]`, and likewise for
/// `actions` with `act_dim`. Advantages are already normalized across
/// the worker group.
#[derive(Debug, Clone, PartialEq)]
pub struct RolloutBatch {
    pub observations: Vec<f32>,
    pub actions: Vec<f32>,
    pub advantages: Vec<f32>,
    pub returns: Vec<f32>,
    pub log_probs: Vec<f32>,
    pub obs_dim: usize,
    pub act_dim: usize,
}

impl RolloutBatch {
    pub fn len(&self) -> usize {
        self.log_probs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log_probs.is_empty()
    }

    pub fn observation(&self, i: usize) -> &[f32] {
        &self.observations[i * self.obs_dim..(i + 1) * self.obs_dim]
    }

    pub fn action(&self, i: usize) -> &[f32] {
        &self.actions[i * self.act_dim..(i + 1) * self.act_dim]
    }
}

/// Stores one epoch of agent-environment interaction and computes
/// GAE-Lambda advantages and discounted returns-to-go per trajectory
/// segment.
///
/// Lifecycle: `store` each step, `finish_path` at every episode end or
/// cutoff, then `get` exactly once when full. `get` resets the buffer
/// for the next epoch.
pub struct VpgBuffer {
    obs: Vec<f32>,
    act: Vec<f32>,
    rew: Vec<f32>,
    val: Vec<f32>,
    logp: Vec<f32>,
    adv: Vec<f32>,
    ret: Vec<f32>,
    obs_dim: usize,
    act_dim: usize,
    capacity: usize,
    gamma: f32,
    lam: f32,
    ptr: usize,
    path_start_idx: usize,
}

impl VpgBuffer {
    pub fn new(obs_dim: usize, act_dim: usize, capacity: usize, gamma: f32, lam: f32) -> Self {
        assert!(capacity > 0, "buffer capacity must be positive");
        assert!(obs_dim > 0, "observation dimension must be positive");
        assert!(act_dim > 0, "action dimension must be positive");
        assert!(
            gamma > 0.0 && gamma <= 1.0,
            "gamma must be in (0, 1], got {gamma}"
        );
        assert!(lam > 0.0 && lam <= 1.0, "lambda must be in (0, 1], got {lam}");
        Self {
            obs: vec![0.0; capacity * obs_dim],
            act: vec![0.0; capacity * act_dim],
            rew: vec![0.0; capacity],
            val: vec![0.0; capacity],
            logp: vec![0.0; capacity],
            adv: vec![0.0; capacity],
            ret: vec![0.0; capacity],
            obs_dim,
            act_dim,
            capacity,
            gamma,
            lam,
            ptr: 0,
            path_start_idx: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Steps stored since the last `get`.
    pub fn len(&self) -> usize {
        self.ptr
    }

    pub fn is_empty(&self) -> bool {
        self.ptr == 0
    }

    pub fn is_full(&self) -> bool {
        self.ptr == self.capacity
    }

    /// Appends one timestep. The reward is the one produced by taking
    /// `action` from `obs`; `value` and `log_prob` are the critic and
    /// policy outputs evaluated at `obs`.
    pub fn store(
        &mut self,
        obs: &[f32],
        action: &[f32],
        reward: f32,
        value: f32,
        log_prob: f32,
    ) -> Result<(), BufferError> {
        if self.ptr == self.capacity {
            return Err(BufferError::Full {
                capacity: self.capacity,
            });
        }
        assert_eq!(obs.len(), self.obs_dim, "observation dimension mismatch");
        assert_eq!(action.len(), self.act_dim, "action dimension mismatch");

        let i = self.ptr;
        self.obs[i * self.obs_dim..(i + 1) * self.obs_dim].copy_from_slice(obs);
        self.act[i * self.act_dim..(i + 1) * self.act_dim].copy_from_slice(action);
        self.rew[i] = reward;
        self.val[i] = value;
        self.logp[i] = log_prob;
        self.ptr += 1;
        Ok(())
    }

    /// Closes the open trajectory segment and fills in its advantages
    /// and returns-to-go.
    ///
    /// `last_val` is the bootstrap: 0 when the segment ended in a true
    /// terminal state, the critic's estimate of the final observation
    /// when it was cut off by a time limit or the epoch boundary.
    /// A no-op when the open segment is empty.
    pub fn finish_path(&mut self, last_val: f32) {
        let start = self.path_start_idx;
        let end = self.ptr;
        if start == end {
            return;
        }
        let n = end - start;

        let mut rews = self.rew[start..end].to_vec();
        rews.push(last_val);
        let mut vals = self.val[start..end].to_vec();
        vals.push(last_val);

        // GAE-Lambda over the TD residuals of this segment.
        let mut deltas = vec![0.0; n];
        for i in 0..n {
            deltas[i] = rews[i] + self.gamma * vals[i + 1] - vals[i];
        }
        let adv = discount_cumsum(&deltas, self.gamma * self.lam);
        self.adv[start..end].copy_from_slice(&adv);

        // Returns-to-go; the appended bootstrap participates but its
        // own row is dropped.
        let ret = discount_cumsum(&rews, self.gamma);
        self.ret[start..end].copy_from_slice(&ret[..n]);

        self.path_start_idx = self.ptr;
    }

    /// Extracts the epoch's batch with advantages normalized to mean 0,
    /// std 1 using statistics pooled across the worker group, and
    /// resets the buffer.
    ///
    /// Every rank in `comm` must call `get` in the same round. Callers
    /// are expected to have closed every segment with `finish_path`;
    /// steps of an unclosed trailing segment would carry stale
    /// advantages.
    pub fn get<C: Collective>(&mut self, comm: &C) -> Result<RolloutBatch, BufferError> {
        if self.ptr != self.capacity {
            return Err(BufferError::NotFull {
                stored: self.ptr,
                capacity: self.capacity,
            });
        }

        let stats = comm.scalar_statistics(&self.adv);
        let scale = stats.std.max(ADV_STD_FLOOR);
        for a in self.adv.iter_mut() {
            *a = (*a - stats.mean) / scale;
        }

        self.ptr = 0;
        self.path_start_idx = 0;
        Ok(RolloutBatch {
            observations: self.obs.clone(),
            actions: self.act.clone(),
            advantages: self.adv.clone(),
            returns: self.ret.clone(),
            log_probs: self.logp.clone(),
            obs_dim: self.obs_dim,
            act_dim: self.act_dim,
        })
    }
}
