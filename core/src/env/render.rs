//! Frame rendering

use std::fmt;
use std::str::FromStr;

use crate::emulator::{Emulator, Scenario};
use crate::error::EnvError;
use crate::observation::{Frame, build_image_observation};

use super::RetroEnv;

/// How `render` delivers the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Hand the frame to the attached viewer
    #[default]
    Human,
    /// Return the frame to the caller
    RgbArray,
}

impl FromStr for RenderMode {
    type Err = EnvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" => Ok(RenderMode::Human),
            "rgb_array" => Ok(RenderMode::RgbArray),
            _ => Err(EnvError::UnknownRenderMode(s.to_string())),
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::Human => f.write_str("human"),
            RenderMode::RgbArray => f.write_str("rgb_array"),
        }
    }
}

/// Result of `render`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutput {
    /// Player 0's cropped screen (`rgb_array`)
    Frame(Frame),
    /// Whether the viewer is still open (`human`)
    Open(bool),
    /// The viewer was closed
    Closed,
}

impl<E: Emulator, S: Scenario> RetroEnv<E, S> {
    /// Render player 0's current screen
    ///
    /// With `close` set, closes the attached viewer instead.
    pub fn render(&mut self, mode: RenderMode, close: bool) -> Result<RenderOutput, EnvError> {
        if close {
            if let Some(mut viewer) = self.viewer.take() {
                viewer.close();
            }
            return Ok(RenderOutput::Closed);
        }

        let emulator = self.emulator.as_ref().ok_or(EnvError::Closed)?;
        let frame = build_image_observation(emulator.screen(), self.scenario.crop_info(0));

        match mode {
            RenderMode::RgbArray => Ok(RenderOutput::Frame(frame.into_owned())),
            RenderMode::Human => {
                let viewer = self.viewer.as_mut().ok_or(EnvError::NoViewer)?;
                Ok(RenderOutput::Open(viewer.show(&frame)))
            }
        }
    }
}
