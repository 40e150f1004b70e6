//! Pendulum swing-up task with torque control.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

use vpg_rl::{Action, ActionSpace, Environment, EnvironmentError, StepOutcome};

const MAX_SPEED: f32 = 8.0;
const MAX_TORQUE: f32 = 2.0;
const DT: f32 = 0.05;
const G: f32 = 10.0;
const M: f32 = 1.0;
const L: f32 = 1.0;

/// Single pendulum instance. Observation is `[cos(theta), sin(theta),
/// theta_dot]`; the one-dimensional continuous action is a torque in
/// `[-2, 2]`. Reward penalizes angle, velocity and torque; episodes
/// never terminate on their own, so training relies on the loop's
/// episode length cap.
pub struct Pendulum {
    theta: f32,
    theta_dot: f32,
}

impl Pendulum {
    pub fn new() -> Self {
        Self {
            theta: 0.0,
            theta_dot: 0.0,
        }
    }

    fn observation(&self) -> Vec<f32> {
        vec![self.theta.cos(), self.theta.sin(), self.theta_dot]
    }
}

impl Default for Pendulum {
    fn default() -> Self {
        Self::new()
    }
}

fn angle_normalize(angle: f32) -> f32 {
    let pi = std::f32::consts::PI;
    let two_pi = 2.0 * pi;
    ((angle + pi) % two_pi + two_pi) % two_pi - pi
}

impl Environment for Pendulum {
    fn observation_size(&self) -> usize {
        3
    }

    fn action_space(&self) -> ActionSpace {
        ActionSpace::Continuous { dim: 1 }
    }

    fn reset(&mut self, seed: u64) -> Result<Vec<f32>, EnvironmentError> {
        let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
        let pi = std::f32::consts::PI;
        self.theta = rng.gen::<f32>() * 2.0 * pi - pi;
        self.theta_dot = rng.gen::<f32>() * 2.0 - 1.0;
        Ok(self.observation())
    }

    fn step(&mut self, action: &Action) -> Result<StepOutcome, EnvironmentError> {
        let torque = action.as_continuous()[0].clamp(-MAX_TORQUE, MAX_TORQUE);

        let cost = self.theta * self.theta
            + 0.1 * self.theta_dot * self.theta_dot
            + 0.001 * torque * torque;

        self.theta_dot +=
            (3.0 * G / (2.0 * L) * self.theta.sin() + 3.0 / (M * L * L) * torque) * DT;
        self.theta_dot = self.theta_dot.clamp(-MAX_SPEED, MAX_SPEED);
        self.theta = angle_normalize(self.theta + self.theta_dot * DT);

        Ok(StepOutcome {
            observation: self.observation(),
            reward: -cost,
            terminal: false,
        })
    }
}
