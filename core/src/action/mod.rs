//! Agent actions and their translation into button masks
//!
//! Four action modes are supported:
//!
//! - **All**: one 0/1 entry per button per player, applied verbatim
//! - **Filtered**: like `All`, then passed through the scenario's legality filter
//! - **Discrete**: a single integer, decomposed by mixed radix over the
//!   scenario's combo groups for every player in turn
//! - **MultiDiscrete**: one combo index per group per player
//!
//! The [`ActionCodec`] owns the mode, button count, player count and combo
//! table and is built once at environment construction.

mod codec;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, EnvError};

pub use codec::ActionCodec;

/// How agent actions map onto button masks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionMode {
    /// Raw button bits, no restriction
    #[serde(alias = "binary")]
    All,
    /// Raw button bits passed through the scenario's legality filter
    #[default]
    Filtered,
    /// One integer covering every combo group of every player
    Discrete,
    /// One combo index per group per player
    MultiDiscrete,
}

impl ActionMode {
    /// Whether this mode selects from the scenario's combo groups
    pub fn uses_combos(self) -> bool {
        matches!(self, ActionMode::Discrete | ActionMode::MultiDiscrete)
    }

    /// Config/CLI name of this mode
    pub fn as_str(self) -> &'static str {
        match self {
            ActionMode::All => "all",
            ActionMode::Filtered => "filtered",
            ActionMode::Discrete => "discrete",
            ActionMode::MultiDiscrete => "multi_discrete",
        }
    }
}

impl fmt::Display for ActionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionMode {
    type Err = EnvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" | "binary" => Ok(ActionMode::All),
            "filtered" => Ok(ActionMode::Filtered),
            "discrete" => Ok(ActionMode::Discrete),
            "multi_discrete" | "multidiscrete" => Ok(ActionMode::MultiDiscrete),
            _ => Err(EnvError::UnknownActionMode(s.to_string())),
        }
    }
}

/// An action as chosen by the agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// 0/1 per button, player-major (`All` and `Filtered` modes)
    Binary(Vec<u8>),
    /// Combined mixed-radix index (`Discrete` mode)
    Discrete(u64),
    /// Combo index per group, player-major (`MultiDiscrete` mode)
    MultiDiscrete(Vec<usize>),
}

impl Action {
    /// Human-readable variant name, used in decode errors
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Binary(_) => "binary",
            Action::Discrete(_) => "discrete",
            Action::MultiDiscrete(_) => "multi-discrete",
        }
    }

    /// The all-released action for the given action space
    pub fn noop(space: &crate::spaces::ActionSpace) -> Self {
        use crate::spaces::ActionSpace;
        match space {
            ActionSpace::MultiBinary(n) => Action::Binary(vec![0; *n]),
            ActionSpace::Discrete(_) => Action::Discrete(0),
            ActionSpace::MultiDiscrete(dims) => Action::MultiDiscrete(vec![0; dims.len()]),
        }
    }
}

/// Nearest-legal-action filter applied in `Filtered` mode
///
/// Implemented by the scenario collaborator. The filter may depend on the
/// scenario's current state, so it is evaluated on every decode.
pub trait ActionFilter {
    /// Map a raw button bitmask to the nearest legal bitmask
    fn filter_action(&self, action: u64) -> u64;
}

/// Identity filter, for decoding without a scenario
#[derive(Debug, Clone, Copy, Default)]
pub struct Unfiltered;

impl ActionFilter for Unfiltered {
    fn filter_action(&self, action: u64) -> u64 {
        action
    }
}

/// Ordered combo groups supplied by the scenario
///
/// Each group is an ordered list of button bitmasks. Group order and sizes are
/// fixed for the lifetime of the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComboTable {
    groups: Vec<Vec<u64>>,
}

impl ComboTable {
    /// Wrap combo groups without validation
    pub fn new(groups: Vec<Vec<u64>>) -> Self {
        Self { groups }
    }

    /// Reject empty groups (they cannot be indexed or used as a radix)
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.groups.iter().position(Vec::is_empty) {
            Some(index) => Err(ConfigError::EmptyComboGroup(index)),
            None => Ok(()),
        }
    }

    /// Number of groups
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Size of each group, in order
    pub fn cardinalities(&self) -> impl Iterator<Item = usize> + '_ {
        self.groups.iter().map(Vec::len)
    }

    /// Product of all group sizes (checked)
    pub fn combinations(&self) -> Option<u64> {
        self.cardinalities()
            .try_fold(1u64, |acc, len| acc.checked_mul(len as u64))
    }

    /// Combo `index` of `group`
    pub fn get(&self, group: usize, index: usize) -> Option<u64> {
        self.groups.get(group).and_then(|g| g.get(index)).copied()
    }

    /// Iterate over the groups
    pub fn iter(&self) -> impl Iterator<Item = &[u64]> {
        self.groups.iter().map(Vec::as_slice)
    }
}
