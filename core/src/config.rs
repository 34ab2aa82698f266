//! Environment configuration (TOML)
//!
//! ```toml
//! game = "Airstriker-Genesis"
//! state = "Level1"          # "default" (metadata.json), "none", or a state name
//! actions = "discrete"      # all | filtered | discrete | multi_discrete
//! observations = "ram"      # image | ram
//! players = 1
//! record = "movies"         # optional journal directory
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::action::ActionMode;
use crate::data::{DEFAULT_INFO, DEFAULT_SCENARIO};
use crate::error::ConfigError;
use crate::observation::ObsType;

/// Which save state a new episode starts from
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StateSelection {
    /// Look up `metadata.json`
    #[default]
    Default,
    /// Start from power-on
    None,
    /// A named state file
    Named(String),
}

impl From<String> for StateSelection {
    fn from(value: String) -> Self {
        match value.as_str() {
            "default" | "" => StateSelection::Default,
            "none" => StateSelection::None,
            _ => StateSelection::Named(value),
        }
    }
}

impl From<&str> for StateSelection {
    fn from(value: &str) -> Self {
        StateSelection::from(value.to_string())
    }
}

impl From<StateSelection> for String {
    fn from(value: StateSelection) -> Self {
        value.to_string()
    }
}

impl fmt::Display for StateSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateSelection::Default => f.write_str("default"),
            StateSelection::None => f.write_str("none"),
            StateSelection::Named(name) => f.write_str(name),
        }
    }
}

/// Settings for one environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Game identifier (integration directory name)
    pub game: String,
    /// Initial state selection (default: `default`)
    #[serde(default)]
    pub state: StateSelection,
    /// Variable definitions: a stem in the game directory or a `.json` path
    #[serde(default = "default_info")]
    pub info: String,
    /// Reward/termination rules: a stem in the game directory or a `.json` path
    #[serde(default = "default_scenario")]
    pub scenario: String,
    /// Action mode (default: filtered)
    #[serde(default)]
    pub actions: ActionMode,
    /// Number of players (default: 1)
    #[serde(default = "default_players")]
    pub players: usize,
    /// Observation type (default: image)
    #[serde(default)]
    pub observations: ObsType,
    /// Journal directory; recording starts enabled when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<PathBuf>,
}

fn default_info() -> String {
    DEFAULT_INFO.to_string()
}

fn default_scenario() -> String {
    DEFAULT_SCENARIO.to_string()
}

fn default_players() -> usize {
    1
}

impl EnvConfig {
    /// Defaults for `game`
    pub fn new(game: impl Into<String>) -> Self {
        Self {
            game: game.into(),
            state: StateSelection::Default,
            info: default_info(),
            scenario: default_scenario(),
            actions: ActionMode::default(),
            players: default_players(),
            observations: ObsType::default(),
            record: None,
        }
    }

    /// Parse TOML contents
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Read and parse a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}
