//! Binary journal format (.rgj)
//!
//! All integers are little-endian.
//!
//! # File Structure
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │ Header (16 bytes)                              │
//! │ ├─ magic: "RGJ1"                               │
//! │ ├─ player_count: u8                            │
//! │ ├─ num_buttons: u8                             │
//! │ ├─ mask_bytes: u8                              │
//! │ ├─ flags: u8                                   │
//! │ └─ frame_count: u64 (u64::MAX while open)      │
//! ├────────────────────────────────────────────────┤
//! │ game_id_len: u16, game_id: UTF-8               │
//! ├────────────────────────────────────────────────┤
//! │ Initial state (if flagged)                     │
//! │ └─ len: u32, LZ4 size-prepended snapshot       │
//! ├────────────────────────────────────────────────┤
//! │ Ticks: player_count × mask_bytes bytes each    │
//! └────────────────────────────────────────────────┘
//! ```

mod reader;
mod writer;

pub use reader::JournalReader;
pub use writer::{JournalWriter, write_journal};

/// Byte offset of the `frame_count` field
pub(crate) const FRAME_COUNT_OFFSET: u64 = 8;
