use super::*;
use crate::algorithms::{ActorCritic, Evaluation};
use crate::buffers::RolloutBatch;
use crate::comm::{Collective, SingleProcess, ThreadGroup};
use crate::core::{Action, ActionSpace};
use crate::environment::{Environment, EnvironmentError, StepOutcome};
use crate::metrics::NullLogger;

/// Agent with a constant critic that records everything it is handed.
struct ScriptedAgent {
    value: f32,
    batches: Vec<RolloutBatch>,
    value_iterations: Vec<usize>,
    sync_count: usize,
}

impl ScriptedAgent {
    fn new(value: f32) -> Self {
        Self {
            value,
            batches: Vec::new(),
            value_iterations: Vec::new(),
            sync_count: 0,
        }
    }
}

impl ActorCritic for ScriptedAgent {
    fn evaluate(&mut self, _obs: &[f32]) -> Evaluation {
        Evaluation {
            action: Action::Discrete(0),
            log_prob: -0.5,
            value: self.value,
        }
    }

    fn value(&mut self, _obs: &[f32]) -> f32 {
        self.value
    }

    fn update_policy(&mut self, batch: &RolloutBatch) -> f32 {
        self.batches.push(batch.clone());
        0.25
    }

    fn update_value(&mut self, _batch: &RolloutBatch, iterations: usize) -> f32 {
        self.value_iterations.push(iterations);
        0.5
    }

    fn synchronize<C: Collective>(&mut self, _comm: &C) {
        self.sync_count += 1;
    }
}

/// Environment that pays `reward` every step and terminates after
/// exactly `episode_len` steps (`usize::MAX` for never).
struct FixedEpisodeEnv {
    episode_len: usize,
    reward: f32,
    t: usize,
    resets: usize,
}

impl FixedEpisodeEnv {
    fn new(episode_len: usize, reward: f32) -> Self {
        Self {
            episode_len,
            reward,
            t: 0,
            resets: 0,
        }
    }
}

impl Environment for FixedEpisodeEnv {
    fn observation_size(&self) -> usize {
        1
    }

    fn action_space(&self) -> ActionSpace {
        ActionSpace::Discrete { n: 2 }
    }

    fn reset(&mut self, _seed: u64) -> Result<Vec<f32>, EnvironmentError> {
        self.t = 0;
        self.resets += 1;
        Ok(vec![0.0])
    }

    fn step(&mut self, _action: &Action) -> Result<StepOutcome, EnvironmentError> {
        self.t += 1;
        Ok(StepOutcome {
            observation: vec![self.t as f32],
            reward: self.reward,
            terminal: self.t == self.episode_len,
        })
    }
}

fn undiscounted_config() -> VpgConfig {
    VpgConfig::new()
        .with_gamma(1.0)
        .with_lam(1.0)
        .with_steps_per_epoch(4)
        .with_epochs(1)
        .with_train_v_iters(2)
        .with_max_ep_len(100)
}

#[test]
fn test_terminal_bootstraps_zero_and_epoch_cut_bootstraps_value() {
    let mut agent = ScriptedAgent::new(10.0);
    let mut env = FixedEpisodeEnv::new(3, 1.0);
    let runner = VpgRunner::new(undiscounted_config());
    let report = runner
        .run(&mut agent, &mut env, &SingleProcess, &mut NullLogger)
        .unwrap();

    // One 3-step terminal episode (returns-to-go 3, 2, 1) and one step
    // cut by the epoch boundary, bootstrapped with the critic's 10.
    assert_eq!(agent.batches.len(), 1);
    assert_eq!(agent.batches[0].returns, vec![3.0, 2.0, 1.0, 11.0]);

    // Only the terminal episode counts toward return statistics.
    assert_eq!(report.epochs[0].episodes, 1);
    assert!((report.epochs[0].mean_return - 3.0).abs() < 1e-6);
}

#[test]
fn test_time_limit_cutoff_bootstraps_with_critic() {
    let mut agent = ScriptedAgent::new(5.0);
    let mut env = FixedEpisodeEnv::new(usize::MAX, 1.0);
    let config = undiscounted_config().with_max_ep_len(2);
    let runner = VpgRunner::new(config);
    let report = runner
        .run(&mut agent, &mut env, &SingleProcess, &mut NullLogger)
        .unwrap();

    // Two 2-step episodes, both cut by the time limit: each segment's
    // returns-to-go include the bootstrap of 5.
    assert_eq!(agent.batches[0].returns, vec![7.0, 6.0, 7.0, 6.0]);
    // Time-limited episodes do count as completed.
    assert_eq!(report.epochs[0].episodes, 2);
    assert!((report.epochs[0].mean_return - 2.0).abs() < 1e-6);
}

#[test]
fn test_epoch_accounting_and_update_cadence() {
    let mut agent = ScriptedAgent::new(0.0);
    let mut env = FixedEpisodeEnv::new(2, 1.0);
    let config = undiscounted_config().with_epochs(3).with_train_v_iters(7);
    let runner = VpgRunner::new(config);
    let report = runner
        .run(&mut agent, &mut env, &SingleProcess, &mut NullLogger)
        .unwrap();

    assert_eq!(agent.batches.len(), 3);
    assert_eq!(agent.value_iterations, vec![7, 7, 7]);
    // One initial alignment plus one after each epoch's update.
    assert_eq!(agent.sync_count, 4);

    assert_eq!(report.epochs.len(), 3);
    let interactions: Vec<usize> = report.return_curve.iter().map(|&(x, _)| x).collect();
    assert_eq!(interactions, vec![4, 8, 12]);
    for snapshot in &report.epochs {
        assert_eq!(snapshot.policy_loss, 0.25);
        assert_eq!(snapshot.value_loss, 0.5);
    }
}

#[test]
fn test_every_step_is_stored_once() {
    let mut agent = ScriptedAgent::new(0.0);
    let mut env = FixedEpisodeEnv::new(3, 2.0);
    let config = undiscounted_config().with_steps_per_epoch(10).with_epochs(2);
    let runner = VpgRunner::new(config);
    runner
        .run(&mut agent, &mut env, &SingleProcess, &mut NullLogger)
        .unwrap();

    for batch in &agent.batches {
        assert_eq!(batch.len(), 10);
        assert!(batch.returns.iter().all(|r| *r > 0.0));
    }
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut agent = ScriptedAgent::new(0.0);
    let mut env = FixedEpisodeEnv::new(2, 1.0);
    let runner = VpgRunner::new(VpgConfig::new().with_epochs(0));
    let err = runner
        .run(&mut agent, &mut env, &SingleProcess, &mut NullLogger)
        .unwrap_err();
    assert!(matches!(err, TrainError::Config(_)));
    assert_eq!(agent.sync_count, 0);
}

#[test]
fn test_two_workers_pool_return_statistics() {
    let config = undiscounted_config().with_steps_per_epoch(8);
    let reports = ThreadGroup::run(2, move |member| {
        // Rank 0 sees short episodes, rank 1 a longer one.
        let episode_len = if member.is_root() { 2 } else { 4 };
        let mut agent = ScriptedAgent::new(0.0);
        let mut env = FixedEpisodeEnv::new(episode_len, 1.0);
        let runner = VpgRunner::new(config.clone());
        runner
            .run(&mut agent, &mut env, &member, &mut NullLogger)
            .unwrap()
    });

    // Pooled episodes: rank 0 completes two 2-step episodes, rank 1 one
    // 4-step episode; both ranks must report identical statistics.
    for report in &reports {
        let snapshot = &report.epochs[0];
        assert_eq!(snapshot.episodes, 3);
        assert!((snapshot.mean_return - 8.0 / 3.0).abs() < 1e-5);
        assert_eq!(snapshot.env_interactions, 8);
    }
    assert_eq!(reports[0].return_curve, reports[1].return_curve);
}
