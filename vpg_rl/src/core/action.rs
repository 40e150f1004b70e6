//! Actions and action spaces.

/// Shape of an environment's action space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionSpace {
    /// A single categorical choice among `n` actions.
    Discrete { n: usize },
    /// A real-valued action vector of `dim` components.
    Continuous { dim: usize },
}

impl ActionSpace {
    /// Number of f32 slots one action occupies when stored flat in a
    /// rollout buffer: 1 for a discrete index, `dim` for a vector.
    pub fn storage_size(&self) -> usize {
        match self {
            ActionSpace::Discrete { .. } => 1,
            ActionSpace::Continuous { dim } => *dim,
        }
    }

    pub fn is_discrete(&self) -> bool {
        matches!(self, ActionSpace::Discrete { .. })
    }
}

/// A single action, either a categorical index or a real-valued vector.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Discrete(u32),
    Continuous(Vec<f32>),
}

impl Action {
    /// Flattens into the f32 representation used by the rollout buffer.
    pub fn as_floats(&self) -> Vec<f32> {
        match self {
            Action::Discrete(idx) => vec![*idx as f32],
            Action::Continuous(values) => values.clone(),
        }
    }

    /// Reconstructs an action from its flat buffer representation.
    pub fn from_floats(space: &ActionSpace, data: &[f32]) -> Self {
        match space {
            ActionSpace::Discrete { .. } => Action::Discrete(data[0] as u32),
            ActionSpace::Continuous { .. } => Action::Continuous(data.to_vec()),
        }
    }

    /// Returns the discrete index. Panics on a continuous action.
    pub fn as_discrete(&self) -> u32 {
        match self {
            Action::Discrete(idx) => *idx,
            Action::Continuous(_) => panic!("expected a discrete action"),
        }
    }

    /// Returns the continuous components. Panics on a discrete action.
    pub fn as_continuous(&self) -> &[f32] {
        match self {
            Action::Continuous(values) => values,
            Action::Discrete(_) => panic!("expected a continuous action"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_size() {
        assert_eq!(ActionSpace::Discrete { n: 4 }.storage_size(), 1);
        assert_eq!(ActionSpace::Continuous { dim: 3 }.storage_size(), 3);
    }

    #[test]
    fn test_discrete_float_round_trip() {
        let space = ActionSpace::Discrete { n: 6 };
        let action = Action::Discrete(5);
        let floats = action.as_floats();
        assert_eq!(floats, vec![5.0]);
        assert_eq!(Action::from_floats(&space, &floats), action);
    }

    #[test]
    fn test_continuous_float_round_trip() {
        let space = ActionSpace::Continuous { dim: 2 };
        let action = Action::Continuous(vec![-0.5, 1.25]);
        let floats = action.as_floats();
        assert_eq!(floats.len(), space.storage_size());
        assert_eq!(Action::from_floats(&space, &floats), action);
    }
}
