//! Binary journal writer
//!
//! Writes .rgj journals incrementally: the header goes out when the journal is
//! created, ticks are appended as they happen, and the frame count is patched
//! in place on [`JournalWriter::finish`].

use std::io::{self, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, WriteBytesExt};
use lz4_flex::compress_prepend_size;

use super::FRAME_COUNT_OFFSET;
use crate::buttons::ButtonMask;
use crate::replay::types::*;

/// Incremental writer for the binary journal format
pub struct JournalWriter<W: Write + Seek> {
    writer: W,
    /// Stream position of the magic bytes
    start: u64,
    player_count: usize,
    num_buttons: usize,
    tick_count: u64,
}

impl<W: Write + Seek> JournalWriter<W> {
    /// Write the header (with an open frame count) and the optional snapshot
    pub fn create(
        mut writer: W,
        header: &JournalHeader,
        initial_state: Option<&[u8]>,
    ) -> io::Result<Self> {
        let start = writer.stream_position()?;

        let mut flags = header.flags;
        flags.set(JournalFlags::HAS_INITIAL_STATE, initial_state.is_some());

        writer.write_all(&MAGIC)?;
        writer.write_u8(header.player_count)?;
        writer.write_u8(header.num_buttons)?;
        writer.write_u8(header.mask_bytes() as u8)?;
        writer.write_u8(flags.bits())?;
        writer.write_u64::<LittleEndian>(OPEN_FRAME_COUNT)?;

        let game_id = header.game_id.as_bytes();
        let game_id_len = u16::try_from(game_id.len())
            .map_err(|_| invalid_input("game id longer than 65535 bytes"))?;
        writer.write_u16::<LittleEndian>(game_id_len)?;
        writer.write_all(game_id)?;

        if let Some(state) = initial_state {
            let compressed = compress_prepend_size(state);
            let len = u32::try_from(compressed.len())
                .map_err(|_| invalid_input("initial state larger than 4 GiB"))?;
            writer.write_u32::<LittleEndian>(len)?;
            writer.write_all(&compressed)?;
        }

        Ok(Self {
            writer,
            start,
            player_count: header.player_count as usize,
            num_buttons: header.num_buttons as usize,
            tick_count: 0,
        })
    }

    /// Append one tick of masks, one per player
    pub fn append_tick(&mut self, masks: &[ButtonMask]) -> io::Result<()> {
        if masks.len() != self.player_count {
            return Err(invalid_input(format!(
                "tick has {} masks, journal has {} players",
                masks.len(),
                self.player_count
            )));
        }

        for mask in masks {
            let bytes = ButtonMask::from_bits(mask.bits(), self.num_buttons).to_bytes();
            self.writer.write_all(&bytes)?;
        }
        self.tick_count += 1;
        Ok(())
    }

    /// Ticks appended so far
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Underlying writer
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Patch the frame count and return the inner writer, positioned at the end
    pub fn finish(mut self) -> io::Result<W> {
        self.writer
            .seek(SeekFrom::Start(self.start + FRAME_COUNT_OFFSET))?;
        self.writer.write_u64::<LittleEndian>(self.tick_count)?;
        self.writer.seek(SeekFrom::End(0))?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Write a complete journal in one go
pub fn write_journal<W: Write + Seek>(writer: W, journal: &Journal) -> io::Result<W> {
    let mut out = JournalWriter::create(writer, &journal.header, journal.initial_state.as_deref())?;
    for tick in journal.ticks.iter() {
        out.append_tick(tick)?;
    }
    out.finish()
}

fn invalid_input(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg.into())
}
