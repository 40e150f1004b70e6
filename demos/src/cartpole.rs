//! Classic cart-pole balancing task.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

use vpg_rl::{Action, ActionSpace, Environment, EnvironmentError, StepOutcome};

const GRAVITY: f32 = 9.8;
const CART_MASS: f32 = 1.0;
const POLE_MASS: f32 = 0.1;
const POLE_LENGTH: f32 = 0.5;
const FORCE_MAG: f32 = 10.0;
const DT: f32 = 0.02;
const X_THRESHOLD: f32 = 2.4;
const THETA_THRESHOLD: f32 = 12.0 * std::f32::consts::PI / 180.0;
const INIT_RANGE: f32 = 0.05;

/// Single cart-pole instance. Observation is `[x, x_dot, theta,
/// theta_dot]`; actions push the cart left (0) or right (1). Reward is
/// 1 per balanced step; the episode terminates when the cart leaves
/// the track or the pole falls past 12 degrees.
pub struct CartPole {
    x: f32,
    x_dot: f32,
    theta: f32,
    theta_dot: f32,
}

impl CartPole {
    pub fn new() -> Self {
        Self {
            x: 0.0,
            x_dot: 0.0,
            theta: 0.0,
            theta_dot: 0.0,
        }
    }

    fn observation(&self) -> Vec<f32> {
        vec![self.x, self.x_dot, self.theta, self.theta_dot]
    }
}

impl Default for CartPole {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for CartPole {
    fn observation_size(&self) -> usize {
        4
    }

    fn action_space(&self) -> ActionSpace {
        ActionSpace::Discrete { n: 2 }
    }

    fn reset(&mut self, seed: u64) -> Result<Vec<f32>, EnvironmentError> {
        let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
        let mut sample = || rng.gen::<f32>() * 2.0 * INIT_RANGE - INIT_RANGE;
        self.x = sample();
        self.x_dot = sample();
        self.theta = sample();
        self.theta_dot = sample();
        Ok(self.observation())
    }

    fn step(&mut self, action: &Action) -> Result<StepOutcome, EnvironmentError> {
        let force = if action.as_discrete() == 1 {
            FORCE_MAG
        } else {
            -FORCE_MAG
        };

        let cos_theta = self.theta.cos();
        let sin_theta = self.theta.sin();
        let total_mass = CART_MASS + POLE_MASS;
        let pole_mass_length = POLE_MASS * POLE_LENGTH;

        let temp =
            (force + pole_mass_length * self.theta_dot * self.theta_dot * sin_theta) / total_mass;
        let denom = POLE_LENGTH * (4.0 / 3.0 - POLE_MASS * cos_theta * cos_theta / total_mass);
        let theta_acc = (GRAVITY * sin_theta - cos_theta * temp) / denom.max(1e-6);
        let x_acc = temp - pole_mass_length * theta_acc * cos_theta / total_mass;

        self.x += DT * self.x_dot;
        self.x_dot += DT * x_acc;
        self.theta += DT * self.theta_dot;
        self.theta_dot += DT * theta_acc;

        let terminal = self.x.abs() > X_THRESHOLD || self.theta.abs() > THETA_THRESHOLD;
        Ok(StepOutcome {
            observation: self.observation(),
            reward: if terminal { 0.0 } else { 1.0 },
            terminal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_is_near_upright() {
        let mut env = CartPole::new();
        let obs = env.reset(3).unwrap();
        assert_eq!(obs.len(), 4);
        for value in obs {
            assert!(value.abs() <= INIT_RANGE);
        }
    }

    #[test]
    fn test_reset_is_deterministic_per_seed() {
        let mut a = CartPole::new();
        let mut b = CartPole::new();
        assert_eq!(a.reset(9).unwrap(), b.reset(9).unwrap());
        assert_ne!(a.reset(9).unwrap(), b.reset(10).unwrap());
    }

    #[test]
    fn test_constant_push_eventually_terminates() {
        let mut env = CartPole::new();
        env.reset(0).unwrap();
        let mut terminated = false;
        for _ in 0..500 {
            let outcome = env.step(&Action::Discrete(1)).unwrap();
            if outcome.terminal {
                terminated = true;
                assert_eq!(outcome.reward, 0.0);
                break;
            }
            assert_eq!(outcome.reward, 1.0);
        }
        assert!(terminated);
    }
}
