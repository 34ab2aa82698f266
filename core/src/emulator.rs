//! Collaborator traits
//!
//! The environment drives three external collaborators it does not implement:
//!
//! - [`Emulator`]: the console core (CPU/PPU emulation, frame buffer, memory map)
//! - [`Scenario`]: reward/termination rules and the legal combo table
//! - [`Viewer`]: an on-screen window for `human` rendering
//!
//! Fallible operations return `anyhow::Result` so each backend can report its
//! own error types.

use std::collections::BTreeMap;
use std::path::Path;

use crate::action::ActionFilter;
use crate::buttons::ButtonMask;
use crate::observation::{CropRect, Frame, MemoryBlocks};

/// Scenario variables by name
pub type Info = BTreeMap<String, i64>;

/// A classic-console emulator core
pub trait Emulator {
    /// Physical button names, in bit order (empty strings for unused bits)
    fn buttons(&self) -> &[String];

    /// Swap in another ROM, keeping the core alive
    ///
    /// The new game starts from power-on; button names may change.
    fn load_rom(&mut self, rom: &Path) -> anyhow::Result<()>;

    /// Restore a verbatim save-state snapshot
    fn set_state(&mut self, state: &[u8]) -> anyhow::Result<()>;

    /// Latch `mask` for `player` until the next call
    fn set_button_mask(&mut self, player: usize, mask: &ButtonMask);

    /// Advance emulation by one tick
    fn step(&mut self);

    /// Current rendered frame
    fn screen(&self) -> &Frame;

    /// Current memory blocks, keyed by offset
    fn memory(&self) -> &MemoryBlocks;
}

/// Reward/termination rule engine for one game
///
/// Also supplies the combo table and the legality filter used by the action
/// codec.
pub trait Scenario: ActionFilter {
    /// Load variable (`info`) and rule (`scenario`) definitions
    fn load(&mut self, info: &Path, scenario: &Path) -> anyhow::Result<()>;

    /// Ordered combo groups for discrete action modes
    fn valid_actions(&self) -> Vec<Vec<u64>>;

    /// Visible region of the frame for `player`
    fn crop_info(&self, player: usize) -> CropRect;

    /// Clear per-episode accumulators
    fn reset(&mut self);

    /// Refresh variables from the emulator's memory
    fn update_ram(&mut self, memory: &MemoryBlocks);

    /// Reward earned by `player` on the last tick
    fn current_reward(&self, player: usize) -> f32;

    /// Whether the episode has ended
    fn is_done(&self) -> bool;

    /// Every defined variable with its current value
    fn lookup_all(&self) -> Info;
}

/// On-screen frame display for `human` rendering
pub trait Viewer {
    /// Show `frame`; returns whether the window is still open
    fn show(&mut self, frame: &Frame) -> bool;

    /// Close the window
    fn close(&mut self);
}

/// Per-step reward
#[derive(Debug, Clone, PartialEq)]
pub enum Reward {
    /// Single-player reward
    Single(f32),
    /// One reward per player, in player order
    PerPlayer(Vec<f32>),
}

impl Reward {
    /// Sum across players
    pub fn total(&self) -> f32 {
        match self {
            Reward::Single(r) => *r,
            Reward::PerPlayer(rs) => rs.iter().sum(),
        }
    }
}
