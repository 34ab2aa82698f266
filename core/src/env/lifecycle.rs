//! reset / step / seed / load_game / close

use crate::action::{Action, ActionCodec, ComboTable};
use crate::config::StateSelection;
use crate::data::{self, DEFAULT_INFO, DEFAULT_SCENARIO, DataStore};
use crate::emulator::{Emulator, Reward, Scenario};
use crate::error::{ConfigError, EnvError};
use crate::observation::Observation;
use crate::replay::{JournalRecorder, RecordingState};
use crate::seeding::{self, SeedPair};
use crate::spaces::ObservationSpace;

use super::{EpisodePhase, RetroEnv, StepResult, observe, resolve_state};

impl<E: Emulator, S: Scenario> RetroEnv<E, S> {
    /// Start a new episode and return its first observation
    ///
    /// Restores the initial state, advances one tick with every button
    /// released and, when recording, opens the next journal with that tick.
    pub fn reset(&mut self) -> Result<Observation, EnvError> {
        let zero = self.zero_masks();
        let emulator = self.emulator.as_mut().ok_or(EnvError::Closed)?;

        if let Some(state) = &self.initial_state {
            emulator.set_state(state).map_err(EnvError::Restore)?;
        }
        for (player, mask) in zero.iter().enumerate() {
            emulator.set_button_mask(player, mask);
        }
        emulator.step();

        if self.recorder.is_recording() {
            self.recorder.rotate(self.initial_state.as_deref())?;
            self.recorder.record_tick(&zero)?;
        }

        self.scenario.reset();
        self.scenario.update_ram(emulator.memory());
        self.phase = EpisodePhase::Stepping;

        tracing::debug!(game = %self.game, "episode reset");
        Ok(observe(self.obs_type, &*emulator, &self.scenario))
    }

    /// Apply `action` for one tick
    ///
    /// # Errors
    /// [`EnvError::NotReset`] before the first `reset` or after `close`;
    /// [`EnvError::Decode`] when `action` does not fit the action space.
    pub fn step(&mut self, action: &Action) -> Result<StepResult, EnvError> {
        if self.phase != EpisodePhase::Stepping {
            return Err(EnvError::NotReset);
        }
        let emulator = self.emulator.as_mut().ok_or(EnvError::NotReset)?;

        let masks = self.codec.decode(action, &self.scenario)?;
        self.recorder.record_tick(&masks)?;

        for (player, mask) in masks.iter().enumerate() {
            emulator.set_button_mask(player, mask);
        }
        emulator.step();
        self.scenario.update_ram(emulator.memory());

        let observation = observe(self.obs_type, &*emulator, &self.scenario);
        let players = masks.len();
        let reward = if players > 1 {
            Reward::PerPlayer(
                (0..players)
                    .map(|p| self.scenario.current_reward(p))
                    .collect(),
            )
        } else {
            Reward::Single(self.scenario.current_reward(0))
        };

        Ok(StepResult {
            observation,
            reward,
            done: self.scenario.is_done(),
            info: self.scenario.lookup_all(),
        })
    }

    /// Reseed the sampling stream
    ///
    /// `None` draws a seed from OS entropy. Returns the primary seed and the
    /// derived secondary seed.
    pub fn seed(&mut self, seed: Option<u64>) -> SeedPair {
        let (pair, rng) = seeding::derive(seed);
        self.rng = rng;
        tracing::debug!(primary = pair.primary, secondary = pair.secondary, "seeded");
        pair
    }

    /// Switch the live emulator to another game
    ///
    /// Resolves `state` and the default `data`/`scenario` definitions for
    /// `game`, reloads the scenario, swaps the ROM, then resets and takes one
    /// no-op step, returning that step's result. The emulator lease is kept.
    /// Recording carries over into the same directory under the new game id.
    ///
    /// # Errors
    /// Lookup failures (state, ROM) leave the current game untouched. Once the
    /// scenario or emulator has started switching, a failure closes the
    /// environment.
    pub fn load_game<D: DataStore + ?Sized>(
        &mut self,
        data: &D,
        game: &str,
        state: StateSelection,
    ) -> Result<StepResult, EnvError> {
        if self.phase == EpisodePhase::Closed {
            return Err(EnvError::Closed);
        }
        let players = self.players();
        let (state_name, initial_state) = resolve_state(data, game, players, &state)?;
        let rom = data.rom_path(game)?;
        let info_path = data::resolve_definition(data, game, DEFAULT_INFO);
        let scenario_path = data::resolve_definition(data, game, DEFAULT_SCENARIO);

        if let Err(e) = self.swap_game(&rom, &info_path, &scenario_path) {
            if let Err(close_err) = self.close() {
                tracing::warn!("failed to close journal: {}", close_err);
            }
            return Err(e);
        }

        let recording = match self.recorder.state() {
            RecordingState::Recording { dir, .. } => Some(dir.clone()),
            RecordingState::NotRecording => None,
        };
        self.recorder.finish()?;
        let stem = state_name.as_deref().map(data::state_stem);
        self.recorder = JournalRecorder::new(
            game,
            stem.as_deref(),
            players as u8,
            self.buttons.len() as u8,
        );
        if let Some(dir) = recording {
            self.recorder.enable(dir);
        }

        self.game = game.to_string();
        self.initial_state = initial_state;
        tracing::info!(
            game,
            state = state_name.as_deref().unwrap_or("none"),
            "game loaded"
        );

        let observation = self.reset()?;
        self.observation_space = ObservationSpace::bytes(observation.shape());
        let noop = Action::noop(self.codec.action_space());
        self.step(&noop)
    }

    /// Reload the scenario, swap the ROM and rebuild the codec
    fn swap_game(
        &mut self,
        rom: &std::path::Path,
        info_path: &std::path::Path,
        scenario_path: &std::path::Path,
    ) -> Result<(), EnvError> {
        let emulator = self.emulator.as_mut().ok_or(EnvError::Closed)?;

        self.scenario
            .load(info_path, scenario_path)
            .map_err(|error| ConfigError::Scenario {
                info: info_path.to_path_buf(),
                scenario: scenario_path.to_path_buf(),
                error,
            })?;
        emulator.load_rom(rom).map_err(ConfigError::Emulator)?;
        emulator.step();

        let buttons = emulator.buttons().to_vec();
        let combos = ComboTable::new(self.scenario.valid_actions());
        self.codec = ActionCodec::new(self.codec.mode(), buttons.len(), self.players(), combos)?;
        self.buttons = buttons;
        Ok(())
    }

    /// Finish any open journal and release the emulator
    ///
    /// Idempotent. Later `reset` and `step` calls fail.
    pub fn close(&mut self) -> Result<(), EnvError> {
        if self.phase == EpisodePhase::Closed {
            return Ok(());
        }

        let finished = self.recorder.finish();
        if let Some(mut viewer) = self.viewer.take() {
            viewer.close();
        }
        self.emulator = None;
        self.lease = None;
        self.phase = EpisodePhase::Closed;

        tracing::info!(game = %self.game, "environment closed");
        finished.map_err(EnvError::from)
    }
}
