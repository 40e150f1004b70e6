//! Core types shared across the crate.

pub mod action;
pub mod discount;

pub use action::{Action, ActionSpace};
pub use discount::discount_cumsum;
