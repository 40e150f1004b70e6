//! VPG training demos.
//!
//! ```bash
//! # Discrete actions, one worker
//! cargo run --release -- cartpole
//!
//! # Discrete actions, four lockstep workers
//! cargo run --release -- cartpole-parallel
//!
//! # Continuous actions (Gaussian policy)
//! cargo run --release -- pendulum
//! ```

mod cartpole;
mod pendulum;
mod vpg_cartpole;
mod vpg_cartpole_parallel;
mod vpg_pendulum;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "cartpole" => vpg_cartpole::run(),
            "cartpole-parallel" => vpg_cartpole_parallel::run(),
            "pendulum" => vpg_pendulum::run(),
            _ => {
                println!("Unknown demo: {}", args[1]);
                println!();
                print_usage();
            }
        }
    } else {
        print_usage();
    }
}

fn print_usage() {
    println!("Usage: cargo run --release -- <demo>");
    println!();
    println!("  cartpole            VPG, discrete actions, single worker");
    println!("  cartpole-parallel   VPG, discrete actions, 4 worker threads");
    println!("  pendulum            VPG, Gaussian policy, single worker");
}
