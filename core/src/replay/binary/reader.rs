//! Binary journal reader
//!
//! Reads .rgj journals, decompressing the initial snapshot. Journals whose
//! writer never finished are read tick by tick up to the last whole tick.

use std::io::{self, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use lz4_flex::decompress_size_prepended;

use crate::buttons::{ButtonMask, MAX_BUTTONS, PlayerMasks};
use crate::replay::types::*;

/// Reader for the binary journal format
pub struct JournalReader<R: Read> {
    reader: R,
}

impl<R: Read> JournalReader<R> {
    /// Create a new journal reader
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Read a complete journal from the input
    pub fn read_journal(&mut self) -> io::Result<Journal> {
        let (mut header, mask_bytes) = self.read_header()?;

        let initial_state = if header.flags.contains(JournalFlags::HAS_INITIAL_STATE) {
            Some(self.read_initial_state()?)
        } else {
            None
        };

        let finished = header.frame_count != OPEN_FRAME_COUNT;
        let ticks = self.read_ticks(&header, mask_bytes, finished)?;
        header.frame_count = ticks.tick_count();

        Ok(Journal {
            header,
            initial_state,
            ticks,
            finished,
        })
    }

    /// Read the fixed header and game id
    fn read_header(&mut self) -> io::Result<(JournalHeader, usize)> {
        let mut magic = [0u8; 4];
        self.reader.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(invalid_data("not a replay journal (bad magic)"));
        }

        let player_count = self.reader.read_u8()?;
        let num_buttons = self.reader.read_u8()?;
        let mask_bytes = self.reader.read_u8()? as usize;
        let flags = JournalFlags::from_bits_truncate(self.reader.read_u8()?);
        let frame_count = self.reader.read_u64::<LittleEndian>()?;

        if num_buttons as usize > MAX_BUTTONS {
            return Err(invalid_data(format!(
                "{} buttons exceeds {}",
                num_buttons, MAX_BUTTONS
            )));
        }
        if mask_bytes != ButtonMask::bytes_for_width(num_buttons as usize) {
            return Err(invalid_data(format!(
                "mask size {} does not match {} buttons",
                mask_bytes, num_buttons
            )));
        }

        let game_id_len = self.reader.read_u16::<LittleEndian>()? as usize;
        let mut game_id = vec![0u8; game_id_len];
        self.reader.read_exact(&mut game_id)?;
        let game_id = String::from_utf8(game_id).map_err(invalid_data)?;

        Ok((
            JournalHeader {
                game_id,
                player_count,
                num_buttons,
                flags,
                frame_count,
            },
            mask_bytes,
        ))
    }

    fn read_initial_state(&mut self) -> io::Result<Vec<u8>> {
        let compressed_len = self.reader.read_u32::<LittleEndian>()? as usize;
        let mut compressed = vec![0u8; compressed_len];
        self.reader.read_exact(&mut compressed)?;

        decompress_size_prepended(&compressed).map_err(|e| invalid_data(e.to_string()))
    }

    /// Read `frame_count` ticks, or whole ticks to EOF for an open journal
    fn read_ticks(
        &mut self,
        header: &JournalHeader,
        mask_bytes: usize,
        finished: bool,
    ) -> io::Result<TickSequence> {
        let player_count = header.player_count as usize;
        let width = header.num_buttons as usize;
        let mut buffer = vec![0u8; mask_bytes * player_count];
        let mut ticks = TickSequence::new();

        if finished {
            for _ in 0..header.frame_count {
                self.reader.read_exact(&mut buffer)?;
                ticks.push_tick(split_tick(&buffer, mask_bytes, player_count, width));
            }
            return Ok(ticks);
        }

        if buffer.is_empty() {
            // Zero-width ticks leave no trace in an open journal
            return Ok(ticks);
        }

        loop {
            match self.reader.read_exact(&mut buffer) {
                Ok(()) => ticks.push_tick(split_tick(&buffer, mask_bytes, player_count, width)),
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e),
            }
        }
        Ok(ticks)
    }
}

fn split_tick(buffer: &[u8], mask_bytes: usize, player_count: usize, width: usize) -> PlayerMasks {
    (0..player_count)
        .map(|p| ButtonMask::from_bytes(&buffer[p * mask_bytes..(p + 1) * mask_bytes], width))
        .collect()
}

fn invalid_data<E>(error: E) -> io::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    io::Error::new(io::ErrorKind::InvalidData, error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::binary::writer::{JournalWriter, write_journal};
    use smallvec::smallvec;
    use std::io::Cursor;

    fn mask(bits: u64) -> ButtonMask {
        ButtonMask::from_bits(bits, 12)
    }

    #[test]
    fn test_roundtrip_empty() {
        let journal = Journal::new(JournalHeader::new("Airstriker-Genesis", 1, 12), None);
        let buffer = write_journal(Cursor::new(Vec::new()), &journal)
            .unwrap()
            .into_inner();

        let parsed = JournalReader::new(buffer.as_slice()).read_journal().unwrap();
        assert_eq!(parsed, journal);
        assert!(parsed.ticks.is_empty());
    }

    #[test]
    fn test_roundtrip_with_snapshot_and_ticks() {
        let snapshot: Vec<u8> = (0..4096u32).map(|i| (i % 7) as u8).collect();
        let mut journal = Journal::new(JournalHeader::new("Pong", 2, 12), Some(snapshot.clone()));
        journal.push_tick(smallvec![mask(0), mask(0)]);
        journal.push_tick(smallvec![mask(0x0F0), mask(0x801)]);
        journal.push_tick(smallvec![mask(0xFFF), mask(0)]);

        let buffer = write_journal(Cursor::new(Vec::new()), &journal)
            .unwrap()
            .into_inner();
        // Repetitive snapshot compresses
        assert!(buffer.len() < snapshot.len());

        let parsed = JournalReader::new(buffer.as_slice()).read_journal().unwrap();
        assert!(parsed.finished);
        assert_eq!(parsed.initial_state.as_deref(), Some(snapshot.as_slice()));
        assert_eq!(parsed.header.frame_count, 3);
        assert_eq!(parsed.ticks.get_tick(1), Some(&[mask(0x0F0), mask(0x801)][..]));
        assert_eq!(parsed, journal);
    }

    #[test]
    fn test_unfinished_journal_reads_whole_ticks() {
        let header = JournalHeader::new("Pong", 2, 12);
        let mut writer = JournalWriter::create(Cursor::new(Vec::new()), &header, None).unwrap();
        writer.append_tick(&[mask(1), mask(2)]).unwrap();
        writer.append_tick(&[mask(3), mask(4)]).unwrap();

        // Never finished; a torn third tick trails the file
        let mut buffer = writer.get_ref().get_ref().clone();
        buffer.extend_from_slice(&[0xAA, 0x01, 0x00]);

        let parsed = JournalReader::new(buffer.as_slice()).read_journal().unwrap();
        assert!(!parsed.finished);
        assert_eq!(parsed.header.frame_count, 2);
        assert_eq!(parsed.ticks.get_tick(1), Some(&[mask(3), mask(4)][..]));
    }

    #[test]
    fn test_bad_magic() {
        let err = JournalReader::new(&b"NCRP\x01\x01\x02\x00"[..])
            .read_journal()
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_too_many_buttons_is_error() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&[1, 72, 9, 0]);
        bytes.extend_from_slice(&1u64.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.push(b'g');
        bytes.extend_from_slice(&[0xFF; 9]);

        let err = JournalReader::new(bytes.as_slice())
            .read_journal()
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("72 buttons"));
    }

    #[test]
    fn test_truncated_finished_journal_is_error() {
        let mut journal = Journal::new(JournalHeader::new("g", 1, 12), None);
        journal.push_tick(smallvec![mask(1)]);
        journal.push_tick(smallvec![mask(2)]);
        let mut buffer = write_journal(Cursor::new(Vec::new()), &journal)
            .unwrap()
            .into_inner();
        buffer.truncate(buffer.len() - 1);

        let err = JournalReader::new(buffer.as_slice())
            .read_journal()
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
