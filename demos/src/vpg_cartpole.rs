//! Single-worker VPG on CartPole.

use burn::backend::{Autodiff, NdArray};

use vpg_rl::metrics::ConsoleLogger;
use vpg_rl::{categorical_actor_critic, SingleProcess, VpgConfig, VpgRunner};

use crate::cartpole::CartPole;

type B = Autodiff<NdArray>;

pub fn run() {
    println!("VPG on CartPole (single worker)");

    let config = VpgConfig::new()
        .with_hidden_sizes(vec![64, 64])
        .with_steps_per_epoch(1000)
        .with_epochs(30)
        .with_max_ep_len(500)
        .with_seed(0)
        .with_plot_path("vpg_cartpole_returns.png");

    let device = Default::default();
    let mut agent = categorical_actor_critic::<B>(
        4,
        2,
        &config.hidden_sizes,
        config.pi_lr,
        config.vf_lr,
        config.seed,
        &device,
    );
    let mut env = CartPole::new();
    let mut logger = ConsoleLogger::new();

    let runner = VpgRunner::new(config);
    match runner.run(&mut agent, &mut env, &SingleProcess, &mut logger) {
        Ok(report) => {
            let last = report.epochs.last().map(|s| s.mean_return).unwrap_or(0.0);
            println!("done; final mean return {last:.1}");
            println!("return curve written to vpg_cartpole_returns.png");
        }
        Err(e) => eprintln!("training failed: {e}"),
    }
}
