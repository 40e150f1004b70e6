//! Agents and the math behind them.

pub mod actor_critic;
pub mod distributions;
pub mod mlp_actor_critic;

pub use actor_critic::{ActorCritic, Evaluation};
pub use mlp_actor_critic::{
    categorical_actor_critic, gaussian_actor_critic, CategoricalActorCritic, GaussianActorCritic,
    GaussianPolicyNet,
};
