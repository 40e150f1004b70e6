//! The epoch/trajectory training loop.

use std::error::Error;
use std::fmt;

use crate::algorithms::ActorCritic;
use crate::buffers::{BufferError, VpgBuffer};
use crate::comm::Collective;
use crate::environment::{Environment, EnvironmentError};
use crate::metrics::{render_return_curve, EpochSnapshot, MetricsLogger, PlotError};

use super::vpg_config::{ConfigError, VpgConfig};

/// Anything that can abort a training run.
#[derive(Debug)]
pub enum TrainError {
    Config(ConfigError),
    Buffer(BufferError),
    Environment(EnvironmentError),
    Plot(PlotError),
}

impl fmt::Display for TrainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainError::Config(e) => write!(f, "configuration: {e}"),
            TrainError::Buffer(e) => write!(f, "buffer: {e}"),
            TrainError::Environment(e) => write!(f, "{e}"),
            TrainError::Plot(e) => write!(f, "{e}"),
        }
    }
}

impl Error for TrainError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TrainError::Config(e) => Some(e),
            TrainError::Buffer(e) => Some(e),
            TrainError::Environment(e) => Some(e),
            TrainError::Plot(e) => Some(e),
        }
    }
}

impl From<ConfigError> for TrainError {
    fn from(e: ConfigError) -> Self {
        TrainError::Config(e)
    }
}

impl From<BufferError> for TrainError {
    fn from(e: BufferError) -> Self {
        TrainError::Buffer(e)
    }
}

impl From<EnvironmentError> for TrainError {
    fn from(e: EnvironmentError) -> Self {
        TrainError::Environment(e)
    }
}

impl From<PlotError> for TrainError {
    fn from(e: PlotError) -> Self {
        TrainError::Plot(e)
    }
}

/// What one worker saw over a full run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    /// One snapshot per epoch, with group-pooled return statistics.
    pub epochs: Vec<EpochSnapshot>,
    /// `(cumulative interactions, mean return)` per epoch.
    pub return_curve: Vec<(usize, f32)>,
}

/// Runs vanilla policy gradient with GAE-Lambda advantages.
///
/// Every worker in the group executes `run` with its own agent,
/// environment and [`Collective`] endpoint; collectives inside keep
/// the group in lockstep, and parameters stay identical across ranks
/// after every update.
pub struct VpgRunner {
    config: VpgConfig,
}

impl VpgRunner {
    pub fn new(config: VpgConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VpgConfig {
        &self.config
    }

    pub fn run<A, E, C, L>(
        &self,
        agent: &mut A,
        env: &mut E,
        comm: &C,
        logger: &mut L,
    ) -> Result<TrainingReport, TrainError>
    where
        A: ActorCritic,
        E: Environment,
        C: Collective,
        L: MetricsLogger + ?Sized,
    {
        let config = &self.config;
        config.validate()?;
        let local_steps = config.local_steps_per_epoch(comm.world_size())?;

        let obs_dim = env.observation_size();
        let act_dim = env.action_space().storage_size();
        let mut buffer = VpgBuffer::new(obs_dim, act_dim, local_steps, config.gamma, config.lam);

        // All ranks start from rank 0's weights.
        agent.synchronize(comm);

        let mut episode_seed = config.worker_seed(comm.rank());
        let mut obs = env.reset(episode_seed)?;
        let mut episode_return = 0.0f32;
        let mut episode_len = 0usize;
        let mut completed_returns: Vec<f32> = Vec::new();

        let mut epochs = Vec::with_capacity(config.epochs);
        let mut return_curve = Vec::with_capacity(config.epochs);

        for epoch in 0..config.epochs {
            for t in 0..local_steps {
                let eval = agent.evaluate(&obs);
                let outcome = env.step(&eval.action)?;
                buffer.store(
                    &obs,
                    &eval.action.as_floats(),
                    outcome.reward,
                    eval.value,
                    eval.log_prob,
                )?;
                episode_return += outcome.reward;
                episode_len += 1;
                obs = outcome.observation;

                let terminal = outcome.terminal;
                let cutoff = episode_len >= config.max_ep_len;
                let epoch_end = t + 1 == local_steps;
                if terminal || cutoff || epoch_end {
                    if !(terminal || cutoff) && comm.is_root() {
                        println!(
                            "warning: trajectory cut off by epoch boundary after {episode_len} steps"
                        );
                    }
                    // A true terminal bootstraps with 0 even when it
                    // coincides with a cutoff or the epoch boundary.
                    let last_val = if terminal { 0.0 } else { agent.value(&obs) };
                    buffer.finish_path(last_val);
                    if terminal || cutoff {
                        completed_returns.push(episode_return);
                    }
                    episode_seed = episode_seed.wrapping_add(1);
                    obs = env.reset(episode_seed)?;
                    episode_return = 0.0;
                    episode_len = 0;
                }
            }

            let batch = buffer.get(comm)?;
            let policy_loss = agent.update_policy(&batch);
            let value_loss = agent.update_value(&batch, config.train_v_iters);
            agent.synchronize(comm);

            let return_stats = comm.scalar_statistics(&completed_returns);
            completed_returns.clear();

            let snapshot = EpochSnapshot {
                epoch,
                env_interactions: (epoch + 1) * config.steps_per_epoch,
                episodes: return_stats.count,
                mean_return: return_stats.mean,
                std_return: return_stats.std,
                policy_loss,
                value_loss,
            };
            if comm.is_root() {
                logger.log(&snapshot);
            }
            return_curve.push((snapshot.env_interactions, snapshot.mean_return));
            epochs.push(snapshot);
        }

        if comm.is_root() {
            logger.flush();
            if let Some(path) = &config.plot_path {
                render_return_curve(&return_curve, path)?;
            }
        }

        Ok(TrainingReport {
            epochs,
            return_curve,
        })
    }
}
