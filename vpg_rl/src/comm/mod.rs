//! Collective communication between training workers.
//!
//! Workers run the same program in lockstep and meet at collectives:
//! every rank must issue the same sequence of collective calls with
//! matching payload lengths, or the group deadlocks (a mismatch is a
//! programming error, not a recoverable condition). [`SingleProcess`]
//! degenerates every collective to the identity; [`ThreadGroup`] wires
//! a star topology over channels for same-process worker threads.

pub mod local;
pub mod thread_group;


pub use local::SingleProcess;
pub use thread_group::{GroupMember, ThreadGroup};

/// Pooled mean/std/count of a scalar collected across all ranks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarStats {
    pub mean: f32,
    pub std: f32,
    /// Total number of samples across the group.
    pub count: usize,
}

impl ScalarStats {
    /// Statistics of an empty pooled sample: zeros rather than NaN.
    pub fn empty() -> Self {
        Self {
            mean: 0.0,
            std: 0.0,
            count: 0,
        }
    }
}

/// Collective operations over a fixed group of workers.
///
/// All reductions run in rank order on rank 0 and fan the result back
/// out, so every rank observes bit-identical floats.
pub trait Collective {
    /// This worker's rank, in `0..world_size`.
    fn rank(&self) -> usize;

    /// Number of workers in the group.
    fn world_size(&self) -> usize;

    fn is_root(&self) -> bool {
        self.rank() == 0
    }

    /// Element-wise sum of `values` across all ranks. Every rank
    /// receives the full result.
    fn allreduce_sum(&self, values: &[f64]) -> Vec<f64>;

    /// Sends rank 0's `bytes` to every rank; non-root inputs are
    /// discarded.
    fn broadcast_bytes(&self, bytes: Vec<u8>) -> Vec<u8>;

    /// Pooled mean and standard deviation of per-rank samples.
    ///
    /// Two reduction rounds: first `[sum, count]`, then the summed
    /// squared deviations from the pooled mean. Ranks with empty
    /// `values` still participate in both rounds.
    fn scalar_statistics(&self, values: &[f32]) -> ScalarStats {
        let local_sum: f64 = values.iter().map(|&v| v as f64).sum();
        let totals = self.allreduce_sum(&[local_sum, values.len() as f64]);
        let count = totals[1];
        let mean = if count > 0.0 { totals[0] / count } else { 0.0 };

        let local_sq: f64 = values.iter().map(|&v| (v as f64 - mean).powi(2)).sum();
        let sq_total = self.allreduce_sum(&[local_sq]);
        if count == 0.0 {
            return ScalarStats::empty();
        }
        ScalarStats {
            mean: mean as f32,
            std: (sq_total[0] / count).sqrt() as f32,
            count: count as usize,
        }
    }
}
