//! Retrogym Core - Reinforcement-learning environment layer for console emulators
//!
//! This crate turns an opaque emulator core into an RL environment: agent
//! actions become per-player button masks, each step advances emulation by one
//! tick, and the agent receives pixel or memory observations together with
//! scenario-defined reward and termination signals.
//!
//! # Architecture
//!
//! - [`RetroEnv`] - Episode state machine (reset / step / seed / render / close)
//! - [`ActionCodec`] - Agent action → per-player [`ButtonMask`]s
//! - [`observation`] - Memory flattening and frame cropping
//! - [`Emulator`], [`Scenario`], [`Viewer`] - External collaborators
//! - [`replay`] - Binary journal recording and deterministic playback

pub mod action;
pub mod buttons;
pub mod config;
pub mod data;
pub mod emulator;
pub mod env;
pub mod error;
#[cfg(test)]
mod integration;
pub mod lease;
pub mod observation;
pub mod replay;
pub mod seeding;
pub mod spaces;
#[cfg(test)]
pub mod test_utils;

// Re-export core traits and types
pub use action::{Action, ActionCodec, ActionFilter, ActionMode, ComboTable, Unfiltered};
pub use buttons::{ButtonMask, MAX_BUTTONS, PlayerMasks};
pub use config::{EnvConfig, StateSelection};
pub use data::{DataStore, GameMetadata, IntegrationDir};
pub use emulator::{Emulator, Info, Reward, Scenario, Viewer};
pub use env::{EpisodePhase, RenderMode, RenderOutput, RetroEnv, StepResult};
pub use error::{ConfigError, DecodeError, EnvError};
pub use lease::EmulatorLease;
pub use observation::{CropRect, Frame, MemoryBlocks, ObsType, Observation};
pub use seeding::SeedPair;
pub use spaces::{ActionSpace, ObservationSpace};

// Re-export journal types
pub use replay::{Journal, JournalHeader, JournalRecorder, RecordingState, replay_into};
