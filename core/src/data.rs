//! Game integration data
//!
//! Each integrated game lives in its own directory under an integration root:
//!
//! ```text
//! <root>/<game>/
//!     rom.<ext>          ROM image (any extension)
//!     <name>.state       save states, read verbatim
//!     data.json          variable definitions (default info)
//!     scenario.json      reward/termination rules (default scenario)
//!     metadata.json      default state selection
//! ```
//!
//! Lookups go through the [`DataStore`] trait so environments can be built
//! against in-memory fixtures as well as the filesystem.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default variable definitions file stem
pub const DEFAULT_INFO: &str = "data";
/// Default scenario definitions file stem
pub const DEFAULT_SCENARIO: &str = "scenario";
/// Extension appended to state names that lack it
pub const STATE_EXTENSION: &str = ".state";

/// Contents of a game's `metadata.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMetadata {
    /// State used when no per-player default applies
    #[serde(default)]
    pub default_state: Option<String>,
    /// Default state per player count (index = players - 1)
    #[serde(default)]
    pub default_player_state: Option<Vec<String>>,
}

impl GameMetadata {
    /// Parse `metadata.json` contents
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Default state for `players` players
    ///
    /// Prefers `default_player_state[players - 1]` when the list is long
    /// enough, then `default_state`.
    pub fn default_state_for(&self, players: usize) -> Option<&str> {
        self.default_player_state
            .as_ref()
            .filter(|states| players >= 1 && players <= states.len())
            .map(|states| states[players - 1].as_str())
            .or(self.default_state.as_deref())
    }
}

/// Source of ROMs, states and definition files
pub trait DataStore {
    /// Path of the game's ROM
    fn rom_path(&self, game: &str) -> Result<PathBuf, ConfigError>;

    /// Path of a file inside the game's integration directory
    fn file_path(&self, game: &str, file: &str) -> PathBuf;

    /// Parsed `metadata.json` (a missing file yields the default)
    fn metadata(&self, game: &str) -> anyhow::Result<GameMetadata>;

    /// Raw bytes of a save state; `name` already carries its extension
    fn read_state(&self, game: &str, name: &str) -> io::Result<Vec<u8>>;
}

/// Append [`STATE_EXTENSION`] unless present
pub fn state_file_name(name: &str) -> String {
    if name.ends_with(STATE_EXTENSION) {
        name.to_string()
    } else {
        format!("{name}{STATE_EXTENSION}")
    }
}

/// Stem of a state name, as used in journal file names
pub fn state_stem(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string())
}

/// Best-effort default state lookup
///
/// Unreadable or malformed metadata is logged and treated as "no default".
pub fn default_state<D: DataStore + ?Sized>(
    store: &D,
    game: &str,
    players: usize,
) -> Option<String> {
    match store.metadata(game) {
        Ok(metadata) => metadata.default_state_for(players).map(str::to_string),
        Err(e) => {
            tracing::warn!(game, "ignoring unreadable metadata: {:#}", e);
            None
        }
    }
}

/// Resolve an info or scenario definition name to a path
///
/// Names ending in `.json` are paths; anything else is a file stem inside the
/// game's integration directory.
pub fn resolve_definition<D: DataStore + ?Sized>(store: &D, game: &str, name: &str) -> PathBuf {
    if name.ends_with(".json") {
        PathBuf::from(name)
    } else {
        store.file_path(game, &format!("{name}.json"))
    }
}

/// Filesystem integration root
#[derive(Debug, Clone)]
pub struct IntegrationDir {
    root: PathBuf,
}

impl IntegrationDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Platform data directory (`<data_dir>/games`)
    ///
    /// On Linux: `~/.local/share/retrogym/games`
    pub fn default_root() -> Option<PathBuf> {
        directories::ProjectDirs::from("io", "retrogym", "retrogym")
            .map(|dirs| dirs.data_dir().join("games"))
    }

    /// Integration root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one game's files
    pub fn game_dir(&self, game: &str) -> PathBuf {
        self.root.join(game)
    }
}

impl DataStore for IntegrationDir {
    fn rom_path(&self, game: &str) -> Result<PathBuf, ConfigError> {
        let dir = self.game_dir(game);
        let not_found = || ConfigError::RomNotFound {
            game: game.to_string(),
            dir: dir.clone(),
        };

        let mut candidates: Vec<PathBuf> = fs::read_dir(&dir)
            .map_err(|_| not_found())?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && path.file_stem().is_some_and(|s| s == "rom"))
            .collect();
        candidates.sort();
        candidates.into_iter().next().ok_or_else(not_found)
    }

    fn file_path(&self, game: &str, file: &str) -> PathBuf {
        self.game_dir(game).join(file)
    }

    fn metadata(&self, game: &str) -> anyhow::Result<GameMetadata> {
        let path = self.file_path(game, "metadata.json");
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(GameMetadata::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        };
        GameMetadata::from_json(&json).with_context(|| format!("invalid {}", path.display()))
    }

    fn read_state(&self, game: &str, name: &str) -> io::Result<Vec<u8>> {
        fs::read(self.file_path(game, name))
    }
}
