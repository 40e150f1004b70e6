//! Multi-worker VPG on CartPole: four lockstep worker threads sharing
//! advantage statistics and weights through collectives.

use burn::backend::{Autodiff, NdArray};

use vpg_rl::metrics::{ConsoleLogger, MetricsLogger, NullLogger};
use vpg_rl::{categorical_actor_critic, Collective, ThreadGroup, VpgConfig, VpgRunner};

use crate::cartpole::CartPole;

type B = Autodiff<NdArray>;

const N_WORKERS: usize = 4;

pub fn run() {
    println!("VPG on CartPole ({N_WORKERS} workers)");

    let config = VpgConfig::new()
        .with_hidden_sizes(vec![64, 64])
        .with_steps_per_epoch(4000)
        .with_epochs(30)
        .with_max_ep_len(500)
        .with_seed(0)
        .with_plot_path("vpg_cartpole_parallel_returns.png");

    let reports = ThreadGroup::run(N_WORKERS, move |member| {
        let config = config.clone();
        let device = Default::default();
        // Same base seed everywhere; the initial broadcast makes the
        // weights identical regardless, and sampling streams diverge
        // through the per-worker seed below.
        let mut agent = categorical_actor_critic::<B>(
            4,
            2,
            &config.hidden_sizes,
            config.pi_lr,
            config.vf_lr,
            config.worker_seed(member.rank()),
            &device,
        );
        let mut env = CartPole::new();
        let mut logger: Box<dyn MetricsLogger> = if member.is_root() {
            Box::new(ConsoleLogger::new())
        } else {
            Box::new(NullLogger)
        };

        let runner = VpgRunner::new(config);
        runner
            .run(&mut agent, &mut env, &member, logger.as_mut())
            .map(|report| report.epochs.last().map(|s| s.mean_return).unwrap_or(0.0))
    });

    match &reports[0] {
        Ok(final_return) => {
            println!("done; final mean return {final_return:.1}");
            println!("return curve written to vpg_cartpole_parallel_returns.png");
        }
        Err(e) => eprintln!("training failed: {e}"),
    }
}
