//! Episode state machine
//!
//! [`RetroEnv`] ties the collaborators together: it decodes agent actions into
//! button masks, drives the emulator one tick at a time, assembles
//! observations and asks the scenario for reward, termination and info.
//!
//! # Lifecycle
//!
//! ```text
//! new() ──→ Ready ──reset()──→ Stepping ──step()──→ Stepping
//!                                  ↑                   │
//!                                  └─────reset()───────┘
//! close() from any phase ──→ Closed
//! ```
//!
//! A step reporting `done` does not end the episode by itself; the caller
//! decides when to `reset`.

mod lifecycle;
mod render;

use std::path::PathBuf;

use rand_pcg::Pcg64;

use crate::action::{Action, ActionCodec, ComboTable};
use crate::buttons::ButtonMask;
use crate::config::{EnvConfig, StateSelection};
use crate::data::{self, DataStore};
use crate::emulator::{Emulator, Info, Reward, Scenario, Viewer};
use crate::error::{ConfigError, EnvError};
use crate::lease::EmulatorLease;
use crate::observation::{
    Frame, ObsType, Observation, build_image_observation, build_memory_observation,
};
use crate::replay::JournalRecorder;
use crate::seeding;
use crate::spaces::{ActionSpace, ObservationSpace};

pub use render::{RenderMode, RenderOutput};

/// Where an environment is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodePhase {
    /// Built, never reset
    Ready,
    /// At least one reset since construction
    Stepping,
    /// Emulator released
    Closed,
}

/// Outcome of one `step`
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub observation: Observation,
    pub reward: Reward,
    pub done: bool,
    pub info: Info,
}

/// Reinforcement-learning environment over one emulated game
pub struct RetroEnv<E: Emulator, S: Scenario> {
    // Field order matters: the emulator must drop before its lease.
    emulator: Option<E>,
    lease: Option<EmulatorLease>,
    scenario: S,
    viewer: Option<Box<dyn Viewer>>,
    recorder: JournalRecorder,
    game: String,
    buttons: Vec<String>,
    codec: ActionCodec,
    obs_type: ObsType,
    observation_space: ObservationSpace,
    initial_state: Option<Vec<u8>>,
    phase: EpisodePhase,
    rng: Pcg64,
}

impl<E: Emulator, S: Scenario> RetroEnv<E, S> {
    /// Build an environment
    ///
    /// `create` receives the ROM path and returns a fresh emulator. It is only
    /// called once the emulator lease has been taken. Any failure releases the
    /// emulator and the lease before returning.
    pub fn new<D, F>(
        config: &EnvConfig,
        data: &D,
        mut scenario: S,
        create: F,
    ) -> Result<Self, EnvError>
    where
        D: DataStore + ?Sized,
        F: FnOnce(&std::path::Path) -> anyhow::Result<E>,
    {
        let game = config.game.as_str();
        let players = config.players;
        if players == 0 {
            return Err(ConfigError::NoPlayers.into());
        }
        let player_count = u8::try_from(players).map_err(|_| ConfigError::TooManyPlayers(players))?;

        let (state_name, initial_state) = resolve_state(data, game, players, &config.state)?;

        let info_path = data::resolve_definition(data, game, &config.info);
        let scenario_path = data::resolve_definition(data, game, &config.scenario);
        let rom = data.rom_path(game)?;

        let lease = EmulatorLease::acquire()?;
        let mut emulator = create(&rom).map_err(ConfigError::Emulator)?;
        emulator.step();

        let buttons = emulator.buttons().to_vec();
        scenario
            .load(&info_path, &scenario_path)
            .map_err(|error| ConfigError::Scenario {
                info: info_path.clone(),
                scenario: scenario_path.clone(),
                error,
            })?;

        let combos = ComboTable::new(scenario.valid_actions());
        let codec = ActionCodec::new(config.actions, buttons.len(), players, combos)?;

        let obs_type = config.observations;
        let observation_space =
            ObservationSpace::bytes(observe(obs_type, &emulator, &scenario).shape());

        let stem = state_name.as_deref().map(data::state_stem);
        let mut recorder =
            JournalRecorder::new(game, stem.as_deref(), player_count, buttons.len() as u8);
        if let Some(dir) = &config.record {
            recorder.enable(dir.clone());
        }

        let (_, rng) = seeding::derive(None);

        tracing::info!(
            game,
            state = state_name.as_deref().unwrap_or("none"),
            actions = %config.actions,
            observations = %obs_type,
            players,
            "environment ready"
        );

        Ok(Self {
            emulator: Some(emulator),
            lease: Some(lease),
            scenario,
            viewer: None,
            recorder,
            game: game.to_string(),
            buttons,
            codec,
            obs_type,
            observation_space,
            initial_state,
            phase: EpisodePhase::Ready,
            rng,
        })
    }

    /// Game identifier
    pub fn game(&self) -> &str {
        &self.game
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> EpisodePhase {
        self.phase
    }

    /// Core button names, in bit order
    pub fn buttons(&self) -> &[String] {
        &self.buttons
    }

    /// Number of players
    pub fn players(&self) -> usize {
        self.codec.players()
    }

    /// Configured observation type
    pub fn obs_type(&self) -> ObsType {
        self.obs_type
    }

    /// Set of valid actions
    pub fn action_space(&self) -> &ActionSpace {
        self.codec.action_space()
    }

    /// Shape and bounds of observations
    pub fn observation_space(&self) -> &ObservationSpace {
        &self.observation_space
    }

    /// Action codec in use
    pub fn codec(&self) -> &ActionCodec {
        &self.codec
    }

    /// Live emulator, `None` once closed
    pub fn emulator(&self) -> Option<&E> {
        self.emulator.as_ref()
    }

    /// Scenario collaborator
    pub fn scenario(&self) -> &S {
        &self.scenario
    }

    /// Save state each episode starts from
    pub fn initial_state(&self) -> Option<&[u8]> {
        self.initial_state.as_deref()
    }

    /// Draw a random action from the seeded stream
    pub fn sample_action(&mut self) -> Action {
        self.codec.action_space().sample(&mut self.rng)
    }

    /// Names of the buttons `action` presses, one list per player
    pub fn action_meaning(&self, action: &Action) -> Result<Vec<Vec<String>>, EnvError> {
        let masks = self.codec.decode(action, &self.scenario)?;
        Ok(masks
            .iter()
            .map(|mask| mask.names(&self.buttons).into_iter().map(str::to_string).collect())
            .collect())
    }

    /// Flattened memory, regardless of the observation type
    pub fn ram(&self) -> Result<Vec<u8>, EnvError> {
        let emulator = self.emulator.as_ref().ok_or(EnvError::Closed)?;
        Ok(build_memory_observation(emulator.memory()))
    }

    /// Current screen cropped for `player`
    pub fn screen(&self, player: usize) -> Result<Frame, EnvError> {
        let emulator = self.emulator.as_ref().ok_or(EnvError::Closed)?;
        Ok(build_image_observation(emulator.screen(), self.scenario.crop_info(player)).into_owned())
    }

    /// Enable journal recording into `dir` (current directory when `None`)
    pub fn record(&mut self, dir: Option<PathBuf>) {
        let dir = dir.unwrap_or_else(|| PathBuf::from("."));
        tracing::debug!(dir = %dir.display(), "journal recording enabled");
        self.recorder.enable(dir);
    }

    /// Close the current journal and stop recording
    pub fn stop_record(&mut self) -> Result<(), EnvError> {
        self.recorder.stop()?;
        Ok(())
    }

    /// Whether journal recording is enabled
    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    /// Path of the journal being written
    pub fn journal_path(&self) -> Option<&std::path::Path> {
        self.recorder.current_path()
    }

    /// Attach a window for `human` rendering
    pub fn attach_viewer(&mut self, viewer: Box<dyn Viewer>) {
        self.viewer = Some(viewer);
    }

    fn zero_masks(&self) -> Vec<ButtonMask> {
        vec![ButtonMask::empty(self.buttons.len()); self.players()]
    }
}

/// State name and bytes for `selection`
///
/// A chosen state that cannot be read is an error; a missing default is not.
fn resolve_state<D: DataStore + ?Sized>(
    data: &D,
    game: &str,
    players: usize,
    selection: &StateSelection,
) -> Result<(Option<String>, Option<Vec<u8>>), ConfigError> {
    let state_name = match selection {
        StateSelection::None => None,
        StateSelection::Default => data::default_state(data, game, players),
        StateSelection::Named(name) => Some(name.clone()),
    };
    let Some(name) = &state_name else {
        return Ok((None, None));
    };

    let file = data::state_file_name(name);
    let bytes = data
        .read_state(game, &file)
        .map_err(|source| ConfigError::State {
            game: game.to_string(),
            state: file.clone(),
            source,
        })?;
    Ok((state_name, Some(bytes)))
}

/// Observation of the configured type from the emulator's current output
fn observe<E: Emulator + ?Sized, S: Scenario + ?Sized>(
    obs_type: ObsType,
    emulator: &E,
    scenario: &S,
) -> Observation {
    match obs_type {
        ObsType::Ram => Observation::Ram(build_memory_observation(emulator.memory())),
        ObsType::Image => Observation::Image(
            build_image_observation(emulator.screen(), scenario.crop_info(0)).into_owned(),
        ),
    }
}
