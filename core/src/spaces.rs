//! Action and observation space descriptors

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::action::Action;

/// Set of valid agent actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionSpace {
    /// `n` independent 0/1 entries
    MultiBinary(usize),
    /// Integers in `[0, n)`
    Discrete(u64),
    /// One integer per dimension, each in `[0, dims[i])`
    MultiDiscrete(Vec<u64>),
}

impl ActionSpace {
    /// Whether `action` is a member of this space
    pub fn contains(&self, action: &Action) -> bool {
        match (self, action) {
            (ActionSpace::MultiBinary(n), Action::Binary(bits)) => {
                bits.len() == *n && bits.iter().all(|&b| b <= 1)
            }
            (ActionSpace::Discrete(n), Action::Discrete(value)) => value < n,
            (ActionSpace::MultiDiscrete(dims), Action::MultiDiscrete(indices)) => {
                indices.len() == dims.len()
                    && indices.iter().zip(dims).all(|(&i, &d)| (i as u64) < d)
            }
            _ => false,
        }
    }

    /// Draw a uniformly random member of this space
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Action {
        match self {
            ActionSpace::MultiBinary(n) => {
                Action::Binary((0..*n).map(|_| rng.random_bool(0.5) as u8).collect())
            }
            ActionSpace::Discrete(n) => Action::Discrete(if *n == 0 {
                0
            } else {
                rng.random_range(0..*n)
            }),
            ActionSpace::MultiDiscrete(dims) => Action::MultiDiscrete(
                dims.iter()
                    .map(|&d| if d == 0 { 0 } else { rng.random_range(0..d) as usize })
                    .collect(),
            ),
        }
    }
}

/// Bounded box of byte-valued observations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationSpace {
    /// Inclusive lower bound of every element
    pub low: u8,
    /// Inclusive upper bound of every element
    pub high: u8,
    /// `[len]` for memory observations, `[height, width, 3]` for images
    pub shape: Vec<usize>,
}

impl ObservationSpace {
    /// Full `[0, 255]` box of the given shape
    pub fn bytes(shape: Vec<usize>) -> Self {
        Self {
            low: 0,
            high: 255,
            shape,
        }
    }

    /// Number of elements in one observation
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    /// Whether observations are empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
