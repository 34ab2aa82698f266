//! Error types for environment construction and episode control

use std::path::PathBuf;

use crate::action::ActionMode;

/// Failure to turn an agent action into button masks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Action variant does not match the configured action mode
    #[error("{mode:?} actions cannot decode a {found} action")]
    WrongKind { mode: ActionMode, found: &'static str },

    /// Flat action vector has the wrong number of elements
    #[error("action has {found} elements, expected {expected}")]
    WrongLength { expected: usize, found: usize },

    /// Binary action element other than 0 or 1
    #[error("binary action element {index} is {value} (must be 0 or 1)")]
    NotBinary { index: usize, value: u8 },

    /// Discrete action outside the action space
    #[error("discrete action {value} out of range (space size {size})")]
    OutOfRange { value: u64, size: u64 },

    /// Multi-discrete selector larger than its combo group
    #[error("combo index {index} out of range for group {group} ({len} combos)")]
    ComboIndexOutOfRange {
        group: usize,
        index: usize,
        len: usize,
    },
}

/// Failure to build an environment
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Player count must be at least one
    #[error("an environment needs at least one player")]
    NoPlayers,

    /// Core exposes more buttons than a mask can hold
    #[error("core has {0} buttons (at most {max} supported)", max = crate::buttons::MAX_BUTTONS)]
    TooManyButtons(usize),

    /// Combo group with no entries in a combo-based action mode
    #[error("combo group {0} is empty")]
    EmptyComboGroup(usize),

    /// Discrete action space does not fit in 64 bits
    #[error("discrete action space overflows: {combos} combos for {players} players")]
    ActionSpaceTooLarge { combos: u64, players: usize },

    /// More players than the journal format can describe
    #[error("{0} players exceeds the supported maximum of 255")]
    TooManyPlayers(usize),

    /// ROM could not be located
    #[error("no ROM found for game '{game}' in {}", dir.display())]
    RomNotFound { game: String, dir: PathBuf },

    /// Save state could not be read
    #[error("failed to read state '{state}' for game '{game}': {source}")]
    State {
        game: String,
        state: String,
        #[source]
        source: std::io::Error,
    },

    /// Emulator factory failed
    #[error("failed to create emulator: {0:#}")]
    Emulator(anyhow::Error),

    /// Info or scenario definitions failed to load or validate
    #[error("failed to load info ({}) or scenario ({}): {error:#}", info.display(), scenario.display())]
    Scenario {
        info: PathBuf,
        scenario: PathBuf,
        error: anyhow::Error,
    },

    /// Configuration file could not be read
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for [`crate::config::EnvConfig`]
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Error returned by environment operations
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    /// `step` called before `reset`, or after `close`
    #[error("please call reset() before step()")]
    NotReset,

    /// Environment has been closed
    #[error("environment is closed")]
    Closed,

    /// Another emulator is alive in this execution context
    #[error("an emulator instance is already live; close it before creating another")]
    EmulatorInUse,

    /// Construction failed
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Action could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Unrecognized observation type name
    #[error("unrecognized observation type: {0}")]
    UnknownObservation(String),

    /// Unrecognized action mode name
    #[error("unrecognized action mode: {0}")]
    UnknownActionMode(String),

    /// Unrecognized render mode name
    #[error("unrecognized render mode: {0}")]
    UnknownRenderMode(String),

    /// Human rendering requested without an attached viewer
    #[error("human rendering requires an attached viewer")]
    NoViewer,

    /// Restoring the initial snapshot failed during reset
    #[error("failed to restore initial state: {0:#}")]
    Restore(anyhow::Error),

    /// Journal could not be written
    #[error("replay journal I/O failed: {0}")]
    Journal(#[from] std::io::Error),
}
