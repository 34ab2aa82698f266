//! Core types for the replay journal

use serde::{Deserialize, Serialize};

use crate::buttons::{ButtonMask, PlayerMasks};

/// Journal file magic
pub const MAGIC: [u8; 4] = *b"RGJ1";

/// Frame count stored while a journal is still being written
pub const OPEN_FRAME_COUNT: u64 = u64::MAX;

/// Complete journal (in-memory representation)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Journal {
    pub header: JournalHeader,
    /// Save state the episode started from, uncompressed
    pub initial_state: Option<Vec<u8>>,
    pub ticks: TickSequence,
    /// Whether the writer patched the frame count before closing
    pub finished: bool,
}

impl Journal {
    /// Empty, finished journal for `header`
    pub fn new(header: JournalHeader, initial_state: Option<Vec<u8>>) -> Self {
        let mut header = header;
        header.flags.set(JournalFlags::HAS_INITIAL_STATE, initial_state.is_some());
        Self {
            header,
            initial_state,
            ticks: TickSequence::new(),
            finished: true,
        }
    }

    /// Append one tick, keeping the header's frame count in step
    pub fn push_tick(&mut self, masks: PlayerMasks) {
        self.ticks.push_tick(masks);
        self.header.frame_count = self.ticks.tick_count();
    }
}

/// Fixed-size journal header
///
/// The game id is stored after the fixed fields as a length-prefixed string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalHeader {
    /// Game identifier the journal was recorded against
    pub game_id: String,
    /// Number of players
    pub player_count: u8,
    /// Buttons per player (mask width)
    pub num_buttons: u8,
    /// Feature flags
    pub flags: JournalFlags,
    /// Number of recorded ticks
    pub frame_count: u64,
}

impl JournalHeader {
    pub fn new(game_id: impl Into<String>, player_count: u8, num_buttons: u8) -> Self {
        Self {
            game_id: game_id.into(),
            player_count,
            num_buttons,
            flags: JournalFlags::empty(),
            frame_count: 0,
        }
    }

    /// Bytes per player per tick
    pub fn mask_bytes(&self) -> usize {
        ButtonMask::bytes_for_width(self.num_buttons as usize)
    }

    /// Bytes per tick across all players
    pub fn tick_bytes(&self) -> usize {
        self.mask_bytes() * self.player_count as usize
    }
}

bitflags::bitflags! {
    /// Journal feature flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct JournalFlags: u8 {
        /// Journal carries an LZ4-compressed initial snapshot
        const HAS_INITIAL_STATE = 0b0000_0001;
    }
}

// Manual serde implementation for JournalFlags
impl Serialize for JournalFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for JournalFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(JournalFlags::from_bits_truncate(bits))
    }
}

/// Per-player masks, indexed by tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSequence {
    /// ticks[tick_idx][player_idx] = mask
    ticks: Vec<PlayerMasks>,
}

impl TickSequence {
    /// Create a new empty tick sequence
    pub fn new() -> Self {
        Self { ticks: Vec::new() }
    }

    /// Add a tick of masks for all players
    pub fn push_tick(&mut self, masks: PlayerMasks) {
        self.ticks.push(masks);
    }

    /// Masks for a specific tick
    pub fn get_tick(&self, tick: u64) -> Option<&[ButtonMask]> {
        self.ticks.get(tick as usize).map(|masks| masks.as_slice())
    }

    /// Total number of ticks
    pub fn tick_count(&self) -> u64 {
        self.ticks.len() as u64
    }

    /// Iterate over all ticks
    pub fn iter(&self) -> impl Iterator<Item = &[ButtonMask]> {
        self.ticks.iter().map(|masks| masks.as_slice())
    }

    /// Check if the sequence is empty
    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}
