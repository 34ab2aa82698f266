//! Journal recorder
//!
//! Records every tick's masks into one journal per episode. While recording is
//! enabled, each reset rotates to a new file named
//! `{game}-{state}-{episode:06}.rgj` in the target directory.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use crate::buttons::ButtonMask;
use crate::replay::binary::JournalWriter;
use crate::replay::types::JournalHeader;

/// Journal file extension
pub const JOURNAL_EXTENSION: &str = "rgj";

/// State stem used in file names when an episode starts from power-on
pub const NO_STATE_STEM: &str = "none";

/// Whether, and where, episodes are being recorded
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecordingState {
    #[default]
    NotRecording,
    Recording {
        /// Target directory
        dir: PathBuf,
        /// Number used for the next journal
        episode: u64,
    },
}

/// File name for one episode's journal
pub fn journal_file_name(game_id: &str, state_stem: &str, episode: u64) -> String {
    format!("{game_id}-{state_stem}-{episode:06}.{JOURNAL_EXTENSION}")
}

struct OpenJournal {
    path: PathBuf,
    writer: JournalWriter<BufWriter<File>>,
}

/// Per-episode journal recorder
pub struct JournalRecorder {
    game_id: String,
    state_stem: String,
    player_count: u8,
    num_buttons: u8,
    state: RecordingState,
    current: Option<OpenJournal>,
}

impl JournalRecorder {
    /// Create a recorder (not yet recording)
    ///
    /// `state_stem` names the initial state in file names; `None` uses
    /// [`NO_STATE_STEM`].
    pub fn new(
        game_id: impl Into<String>,
        state_stem: Option<&str>,
        player_count: u8,
        num_buttons: u8,
    ) -> Self {
        Self {
            game_id: game_id.into(),
            state_stem: state_stem.unwrap_or(NO_STATE_STEM).to_string(),
            player_count,
            num_buttons,
            state: RecordingState::NotRecording,
            current: None,
        }
    }

    /// Start recording into `dir`
    ///
    /// Already recording: only the directory changes, numbering continues.
    pub fn enable(&mut self, dir: PathBuf) {
        match &mut self.state {
            RecordingState::Recording { dir: current, .. } => *current = dir,
            RecordingState::NotRecording => {
                self.state = RecordingState::Recording { dir, episode: 0 };
            }
        }
    }

    /// Close the open journal and stop recording; numbering restarts at zero
    pub fn stop(&mut self) -> io::Result<()> {
        self.state = RecordingState::NotRecording;
        self.finish()
    }

    /// Check if recording is enabled
    pub fn is_recording(&self) -> bool {
        matches!(self.state, RecordingState::Recording { .. })
    }

    /// Current recording state
    pub fn state(&self) -> &RecordingState {
        &self.state
    }

    /// Path of the journal currently being written
    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_ref().map(|open| open.path.as_path())
    }

    /// Close the current journal and, if recording, open the next one
    ///
    /// Returns the new journal's path.
    pub fn rotate(&mut self, initial_state: Option<&[u8]>) -> io::Result<Option<PathBuf>> {
        self.finish()?;

        let RecordingState::Recording { dir, episode } = &mut self.state else {
            return Ok(None);
        };

        let path = dir.join(journal_file_name(&self.game_id, &self.state_stem, *episode));
        let header = JournalHeader::new(self.game_id.clone(), self.player_count, self.num_buttons);
        let file = BufWriter::new(File::create(&path)?);
        let writer = JournalWriter::create(file, &header, initial_state)?;
        *episode += 1;

        tracing::info!(path = %path.display(), "recording journal");
        self.current = Some(OpenJournal {
            path: path.clone(),
            writer,
        });
        Ok(Some(path))
    }

    /// Append a tick to the open journal, if any
    pub fn record_tick(&mut self, masks: &[ButtonMask]) -> io::Result<()> {
        match &mut self.current {
            Some(open) => open.writer.append_tick(masks),
            None => Ok(()),
        }
    }

    /// Patch and close the open journal, if any
    pub fn finish(&mut self) -> io::Result<()> {
        if let Some(open) = self.current.take() {
            let ticks = open.writer.tick_count();
            open.writer.finish()?;
            tracing::debug!(path = %open.path.display(), ticks, "journal closed");
        }
        Ok(())
    }
}

impl Drop for JournalRecorder {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            tracing::warn!("failed to close journal: {}", e);
        }
    }
}
