//! Rollout storage for on-policy training.

pub mod vpg_buffer;


pub use vpg_buffer::{BufferError, RolloutBatch, VpgBuffer, ADV_STD_FLOOR};
