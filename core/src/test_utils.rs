//! Shared test utilities for integration and unit tests

use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use hashbrown::HashMap;

use crate::action::ActionFilter;
use crate::buttons::ButtonMask;
use crate::config::{EnvConfig, StateSelection};
use crate::data::{DataStore, GameMetadata};
use crate::emulator::{Emulator, Info, Scenario, Viewer};
use crate::env::RetroEnv;
use crate::error::{ConfigError, EnvError};
use crate::observation::{CropRect, Frame, MemoryBlocks};

// ============================================================================
// Button layout
// ============================================================================

/// Genesis pad layout, in bit order
pub const GENESIS_BUTTONS: [&str; 12] = [
    "B", "A", "MODE", "START", "UP", "DOWN", "LEFT", "RIGHT", "C", "Y", "X", "Z",
];

pub const B: u64 = 1 << 0;
pub const START: u64 = 1 << 3;
pub const UP: u64 = 1 << 4;
pub const DOWN: u64 = 1 << 5;
pub const LEFT: u64 = 1 << 6;
pub const RIGHT: u64 = 1 << 7;
pub const C: u64 = 1 << 8;

/// Memory offset of the tick counter block
pub const TICK_OFFSET: u64 = 0x0000;
/// Memory offset of the state hash block
pub const STATE_OFFSET: u64 = 0xFF_0000;

pub const SCREEN_WIDTH: usize = 32;
pub const SCREEN_HEIGHT: usize = 24;

// ============================================================================
// Test Emulator Implementation
// ============================================================================

/// Deterministic stand-in for an emulator core
///
/// Its state is a hash folded over every tick's latched masks, so two
/// emulators end up equal only if they saw the same inputs from the same
/// starting state. Screen and memory are derived from that hash.
pub struct MockEmulator {
    buttons: Vec<String>,
    latched: Vec<ButtonMask>,
    state: u64,
    tick: u64,
    screen: Frame,
    memory: MemoryBlocks,
    /// Latched masks (as bits) at every `step`, in order
    pub applied: Vec<Vec<u64>>,
    /// Number of `set_state` calls
    pub restores: usize,
    /// ROMs swapped in with `load_rom`, in order
    pub roms: Vec<PathBuf>,
}

impl MockEmulator {
    pub fn new() -> Self {
        let mut emulator = Self {
            buttons: GENESIS_BUTTONS.iter().map(|b| b.to_string()).collect(),
            latched: Vec::new(),
            state: 0,
            tick: 0,
            screen: Frame::blank(SCREEN_WIDTH, SCREEN_HEIGHT),
            memory: MemoryBlocks::new(),
            applied: Vec::new(),
            restores: 0,
            roms: Vec::new(),
        };
        emulator.refresh();
        emulator
    }

    /// Current state hash
    pub fn state_value(&self) -> u64 {
        self.state
    }

    /// Ticks since power-on or the last restore
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Save-state bytes for `value`
    pub fn state_bytes(value: u64) -> Vec<u8> {
        value.to_le_bytes().to_vec()
    }

    fn refresh(&mut self) {
        self.memory.insert(TICK_OFFSET, self.tick.to_le_bytes().to_vec());
        self.memory.insert(STATE_OFFSET, self.state.to_le_bytes().to_vec());

        let seed = self.state.to_le_bytes();
        let data = (0..SCREEN_WIDTH * SCREEN_HEIGHT * 3)
            .map(|i| seed[i % 8] ^ (i / 3) as u8)
            .collect();
        self.screen = Frame::new(SCREEN_WIDTH, SCREEN_HEIGHT, data);
    }
}

impl Default for MockEmulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Emulator for MockEmulator {
    fn buttons(&self) -> &[String] {
        &self.buttons
    }

    fn load_rom(&mut self, rom: &Path) -> anyhow::Result<()> {
        if rom.extension().is_none() {
            anyhow::bail!("unrecognized ROM: {}", rom.display());
        }
        self.state = 0;
        self.tick = 0;
        self.latched.clear();
        self.roms.push(rom.to_path_buf());
        self.refresh();
        Ok(())
    }

    fn set_state(&mut self, state: &[u8]) -> anyhow::Result<()> {
        let bytes: [u8; 8] = state
            .get(..8)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| anyhow::anyhow!("state is {} bytes, expected 8", state.len()))?;
        self.state = u64::from_le_bytes(bytes);
        self.tick = 0;
        self.restores += 1;
        self.refresh();
        Ok(())
    }

    fn set_button_mask(&mut self, player: usize, mask: &ButtonMask) {
        if self.latched.len() <= player {
            self.latched.resize(player + 1, ButtonMask::empty(self.buttons.len()));
        }
        self.latched[player] = *mask;
    }

    fn step(&mut self) {
        let masks: Vec<u64> = self.latched.iter().map(ButtonMask::bits).collect();
        for (player, bits) in masks.iter().enumerate() {
            self.state = self
                .state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(bits ^ ((player as u64) << 56))
                .wrapping_add(1442695040888963407);
        }
        self.state = self.state.rotate_left(7);
        self.tick += 1;
        self.applied.push(masks);
        self.refresh();
    }

    fn screen(&self) -> &Frame {
        &self.screen
    }

    fn memory(&self) -> &MemoryBlocks {
        &self.memory
    }
}

// ============================================================================
// Test Scenario Implementation
// ============================================================================

/// Default combo groups: horizontal, vertical, fire (3 × 2 × 4 = 24 combos)
pub fn genesis_combos() -> Vec<Vec<u64>> {
    vec![vec![0, LEFT, RIGHT], vec![0, DOWN], vec![0, B, C, B | C]]
}

/// Scripted scenario
///
/// Player `p` earns `p + 1` reward per tick. Every `update_ram` counts as one
/// update, including the one made by `reset`.
pub struct MockScenario {
    pub combos: Vec<Vec<u64>>,
    pub crop: CropRect,
    /// Make `load` fail
    pub fail_load: bool,
    /// Done once this many steps have followed a reset
    pub done_after: Option<u64>,
    /// Legality filter for `Filtered` mode
    pub filter: Option<fn(u64) -> u64>,
    /// Paths passed to `load`
    pub loaded: Option<(PathBuf, PathBuf)>,
    pub resets: usize,
    updates: u64,
    tick: i64,
}

impl MockScenario {
    pub fn new() -> Self {
        Self {
            combos: genesis_combos(),
            crop: CropRect::default(),
            fail_load: false,
            done_after: None,
            filter: None,
            loaded: None,
            resets: 0,
            updates: 0,
            tick: 0,
        }
    }

    /// Steps since the last reset
    pub fn steps(&self) -> u64 {
        self.updates.saturating_sub(1)
    }
}

impl Default for MockScenario {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionFilter for MockScenario {
    fn filter_action(&self, action: u64) -> u64 {
        match self.filter {
            Some(filter) => filter(action),
            None => action,
        }
    }
}

impl Scenario for MockScenario {
    fn load(&mut self, info: &Path, scenario: &Path) -> anyhow::Result<()> {
        if self.fail_load {
            anyhow::bail!("no such file: {}", scenario.display());
        }
        self.loaded = Some((info.to_path_buf(), scenario.to_path_buf()));
        Ok(())
    }

    fn valid_actions(&self) -> Vec<Vec<u64>> {
        self.combos.clone()
    }

    fn crop_info(&self, _player: usize) -> CropRect {
        self.crop
    }

    fn reset(&mut self) {
        self.resets += 1;
        self.updates = 0;
    }

    fn update_ram(&mut self, memory: &MemoryBlocks) {
        self.updates += 1;
        if let Some(bytes) = memory.get(&TICK_OFFSET) {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&bytes[..8]);
            self.tick = u64::from_le_bytes(raw) as i64;
        }
    }

    fn current_reward(&self, player: usize) -> f32 {
        player as f32 + 1.0
    }

    fn is_done(&self) -> bool {
        self.done_after.is_some_and(|n| self.steps() >= n)
    }

    fn lookup_all(&self) -> Info {
        let mut info = Info::new();
        info.insert("tick".to_string(), self.tick);
        info.insert("steps".to_string(), self.steps() as i64);
        info
    }
}

// ============================================================================
// Test Viewer Implementation
// ============================================================================

/// Viewer that records frame shapes; closes after `open_for` frames
#[derive(Clone, Default)]
pub struct MockViewer {
    pub shown: Rc<RefCell<Vec<[usize; 3]>>>,
    pub closed: Rc<RefCell<bool>>,
    pub open_for: Option<usize>,
}

impl Viewer for MockViewer {
    fn show(&mut self, frame: &Frame) -> bool {
        let mut shown = self.shown.borrow_mut();
        shown.push(frame.shape());
        self.open_for.is_none_or(|n| shown.len() < n)
    }

    fn close(&mut self) {
        *self.closed.borrow_mut() = true;
    }
}

// ============================================================================
// Test Data Store
// ============================================================================

pub const GAME: &str = "Airstriker-Genesis";

/// In-memory integration data
#[derive(Default)]
pub struct MemoryData {
    /// State files by file name (with extension)
    pub states: HashMap<String, Vec<u8>>,
    /// Raw `metadata.json`
    pub metadata: Option<String>,
    pub missing_rom: bool,
    /// ROM file name (default `rom.md`)
    pub rom_file: Option<String>,
}

impl MemoryData {
    /// Data with a `Level1` state holding `value`
    pub fn with_level1(value: u64) -> Self {
        let mut data = Self::default();
        data.states
            .insert("Level1.state".to_string(), MockEmulator::state_bytes(value));
        data
    }
}

impl DataStore for MemoryData {
    fn rom_path(&self, game: &str) -> Result<PathBuf, ConfigError> {
        if self.missing_rom {
            return Err(ConfigError::RomNotFound {
                game: game.to_string(),
                dir: PathBuf::from("/mock").join(game),
            });
        }
        let file = self.rom_file.as_deref().unwrap_or("rom.md");
        Ok(PathBuf::from("/mock").join(game).join(file))
    }

    fn file_path(&self, game: &str, file: &str) -> PathBuf {
        PathBuf::from("/mock").join(game).join(file)
    }

    fn metadata(&self, _game: &str) -> anyhow::Result<GameMetadata> {
        match &self.metadata {
            Some(json) => Ok(GameMetadata::from_json(json)?),
            None => Ok(GameMetadata::default()),
        }
    }

    fn read_state(&self, _game: &str, name: &str) -> io::Result<Vec<u8>> {
        self.states
            .get(name)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, name.to_string()))
    }
}

// ============================================================================
// Environment builders
// ============================================================================

/// Config for [`GAME`] starting from `Level1`
pub fn level1_config() -> EnvConfig {
    let mut config = EnvConfig::new(GAME);
    config.state = StateSelection::Named("Level1".to_string());
    config
}

/// Build an environment over the mock collaborators
pub fn build_env(
    config: &EnvConfig,
    data: &MemoryData,
    scenario: MockScenario,
) -> Result<RetroEnv<MockEmulator, MockScenario>, EnvError> {
    RetroEnv::new(config, data, scenario, |_rom| Ok(MockEmulator::new()))
}

/// `Level1` environment with default mocks
pub fn level1_env(config: &EnvConfig) -> RetroEnv<MockEmulator, MockScenario> {
    build_env(config, &MemoryData::with_level1(0xC0FFEE), MockScenario::new()).unwrap()
}
