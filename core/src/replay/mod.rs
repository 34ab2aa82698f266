//! Replay journal
//!
//! Deterministic log of the button masks applied to the emulator:
//!
//! - **Recording**: [`JournalRecorder`] opens one `.rgj` journal per episode and
//!   appends every tick's masks before the emulator consumes them
//! - **Storage**: [`JournalWriter`] / [`JournalReader`] implement the binary format
//! - **Playback**: [`replay_into`] feeds a journal back into an emulator
//!
//! # Architecture
//!
//! ```text
//! reset ─→ JournalRecorder::rotate ─→ {game}-{state}-{episode:06}.rgj
//! step  ─→ JournalRecorder::record_tick ─→ append masks
//! .rgj  ─→ JournalReader ─→ Journal ─→ replay_into(emulator)
//! ```

pub mod binary;
pub mod playback;
pub mod recorder;
pub mod types;

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

pub use binary::{JournalReader, JournalWriter, write_journal};
pub use playback::replay_into;
pub use recorder::{
    JOURNAL_EXTENSION, JournalRecorder, NO_STATE_STEM, RecordingState, journal_file_name,
};
pub use types::{Journal, JournalFlags, JournalHeader, MAGIC, OPEN_FRAME_COUNT, TickSequence};

/// Read a journal file
pub fn load(path: &Path) -> io::Result<Journal> {
    JournalReader::new(BufReader::new(File::open(path)?)).read_journal()
}
