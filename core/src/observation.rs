//! Observation assembly
//!
//! Builds agent observations from raw emulator output:
//!
//! - **RAM**: every memory block concatenated in ascending offset order
//! - **Image**: the rendered frame, cropped to the player's crop rectangle
//!
//! Both are reproducible: the same emulator state always yields the same bytes.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EnvError;

/// Offset-keyed memory blocks exposed by the emulator
pub type MemoryBlocks = hashbrown::HashMap<u64, Vec<u8>>;

/// Bytes per pixel in a [`Frame`]
pub const CHANNELS: usize = 3;

/// Kind of observation returned by `reset` and `step`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ObsType {
    /// Cropped RGB frame
    #[default]
    Image,
    /// Flattened memory blocks
    Ram,
}

impl ObsType {
    /// Config/CLI name of this observation type
    pub fn as_str(self) -> &'static str {
        match self {
            ObsType::Image => "image",
            ObsType::Ram => "ram",
        }
    }
}

impl fmt::Display for ObsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObsType {
    type Err = EnvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "image" => Ok(ObsType::Image),
            "ram" => Ok(ObsType::Ram),
            _ => Err(EnvError::UnknownObservation(s.to_string())),
        }
    }
}

impl TryFrom<String> for ObsType {
    type Error = EnvError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ObsType> for String {
    fn from(value: ObsType) -> Self {
        value.as_str().to_string()
    }
}

/// Row-major RGB image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Frame {
    /// Wrap raw RGB bytes
    ///
    /// # Panics
    /// Panics if `data.len() != width * height * 3`.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Self {
        assert_eq!(
            data.len(),
            width * height * CHANNELS,
            "frame data does not match {}x{} RGB",
            width,
            height
        );
        Self {
            width,
            height,
            data,
        }
    }

    /// All-black frame
    pub fn blank(width: usize, height: usize) -> Self {
        Self::new(width, height, vec![0; width * height * CHANNELS])
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// `[height, width, 3]`
    pub fn shape(&self) -> [usize; 3] {
        [self.height, self.width, CHANNELS]
    }

    /// Raw RGB bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// RGB value at (`x`, `y`)
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y * self.width + x) * CHANNELS;
        Some([self.data[start], self.data[start + 1], self.data[start + 2]])
    }

    /// Copy rows `[y0, y1)` and columns `[x0, x1)` into a new frame
    fn sub_frame(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> Frame {
        let width = x1.saturating_sub(x0);
        let height = y1.saturating_sub(y0);
        let mut data = Vec::with_capacity(width * height * CHANNELS);
        for row in y0..y0 + height {
            let start = (row * self.width + x0) * CHANNELS;
            data.extend_from_slice(&self.data[start..start + width * CHANNELS]);
        }
        Frame::new(width, height, data)
    }
}

/// Visible region of the frame for one player
///
/// A zero `width` or `height` means "extend to the frame edge".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CropRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl CropRect {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Observation returned to the agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    Image(Frame),
    Ram(Vec<u8>),
}

impl Observation {
    /// Shape as reported by the observation space
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Observation::Image(frame) => frame.shape().to_vec(),
            Observation::Ram(bytes) => vec![bytes.len()],
        }
    }

    /// Raw observation bytes
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Observation::Image(frame) => frame.data(),
            Observation::Ram(bytes) => bytes,
        }
    }
}

/// Concatenate memory blocks in ascending offset order
///
/// The result does not depend on the map's iteration order.
pub fn build_memory_observation(blocks: &MemoryBlocks) -> Vec<u8> {
    let mut offsets: Vec<u64> = blocks.keys().copied().collect();
    offsets.sort_unstable();

    let total = blocks.values().map(Vec::len).sum();
    let mut out = Vec::with_capacity(total);
    for offset in offsets {
        out.extend_from_slice(&blocks[&offset]);
    }
    out
}

/// Crop `frame` to `crop`, clamping to the frame edge
///
/// An effective width is `x + width`, or the frame width when `width` is zero
/// or `x + width` runs past the edge; height likewise. A crop covering the
/// whole frame borrows it unchanged.
pub fn build_image_observation(frame: &Frame, crop: CropRect) -> Cow<'_, Frame> {
    let (full_w, full_h) = (frame.width(), frame.height());

    let x1 = if crop.width == 0 || crop.x.saturating_add(crop.width) > full_w {
        full_w
    } else {
        crop.x.saturating_add(crop.width)
    };
    let y1 = if crop.height == 0 || crop.y.saturating_add(crop.height) > full_h {
        full_h
    } else {
        crop.y.saturating_add(crop.height)
    };

    if crop.x == 0 && crop.y == 0 && x1 == full_w && y1 == full_h {
        return Cow::Borrowed(frame);
    }

    Cow::Owned(frame.sub_frame(crop.x.min(x1), crop.y.min(y1), x1, y1))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Frame where each pixel encodes its own coordinates
    fn coordinate_frame(width: usize, height: usize) -> Frame {
        let mut data = Vec::with_capacity(width * height * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[x as u8, y as u8, (x + y) as u8]);
            }
        }
        Frame::new(width, height, data)
    }

    // =============================================================
    // Memory observations
    // =============================================================

    #[test]
    fn test_memory_sorted_by_offset() {
        let mut blocks = MemoryBlocks::new();
        blocks.insert(100, b"AA".to_vec());
        blocks.insert(0, b"BB".to_vec());
        assert_eq!(build_memory_observation(&blocks), b"BBAA".to_vec());
    }

    #[test]
    fn test_memory_independent_of_insertion_order() {
        let entries = [(0xFF0000u64, vec![1u8, 2, 3]), (0x10, vec![4]), (0x2000, vec![5, 6])];

        let mut forward = MemoryBlocks::new();
        for (offset, bytes) in entries.iter().cloned() {
            forward.insert(offset, bytes);
        }
        let mut backward = MemoryBlocks::new();
        for (offset, bytes) in entries.iter().rev().cloned() {
            backward.insert(offset, bytes);
        }

        let a = build_memory_observation(&forward);
        assert_eq!(a, vec![4, 5, 6, 1, 2, 3]);
        assert_eq!(a, build_memory_observation(&backward));
        assert_eq!(a, build_memory_observation(&forward));
    }

    #[test]
    fn test_memory_empty() {
        assert!(build_memory_observation(&MemoryBlocks::new()).is_empty());
    }

    // =============================================================
    // Image observations
    // =============================================================

    #[test]
    fn test_full_frame_is_borrowed() {
        let frame = coordinate_frame(200, 100);
        let obs = build_image_observation(&frame, CropRect::default());
        assert!(matches!(obs, Cow::Borrowed(_)));

        // Explicit full-size crop also borrows
        let obs = build_image_observation(&frame, CropRect::new(0, 0, 200, 100));
        assert!(matches!(obs, Cow::Borrowed(_)));
    }

    #[test]
    fn test_crop_clamps_past_right_edge() {
        let frame = coordinate_frame(200, 100);
        let obs = build_image_observation(&frame, CropRect::new(190, 0, 50, 0));

        assert_eq!(obs.shape(), [100, 10, 3]);
        assert_eq!(obs.pixel(0, 0), Some([190, 0, 190]));
        assert_eq!(obs.pixel(9, 99), Some([199, 99, (199 + 99) as u8]));
    }

    #[test]
    fn test_crop_positive_extent_is_offset_inclusive() {
        let frame = coordinate_frame(200, 100);
        let obs = build_image_observation(&frame, CropRect::new(8, 16, 32, 20));

        assert_eq!(obs.shape(), [20, 32, 3]);
        assert_eq!(obs.pixel(0, 0), Some([8, 16, 24]));
        assert_eq!(obs.pixel(31, 19), Some([39, 35, 74]));
    }

    #[test]
    fn test_crop_zero_height_extends_to_bottom() {
        let frame = coordinate_frame(64, 48);
        let obs = build_image_observation(&frame, CropRect::new(0, 40, 0, 0));
        assert_eq!(obs.shape(), [8, 64, 3]);
        assert_eq!(obs.pixel(0, 0), Some([0, 40, 40]));
    }

    #[test]
    fn test_crop_huge_extent_clamps_to_edge() {
        let frame = coordinate_frame(64, 48);
        let obs = build_image_observation(&frame, CropRect::new(10, 5, usize::MAX, usize::MAX));
        assert_eq!(obs.shape(), [43, 54, 3]);
        assert_eq!(obs.pixel(0, 0), Some([10, 5, 15]));
    }

    #[test]
    fn test_crop_origin_past_edge_is_empty() {
        let frame = coordinate_frame(64, 48);
        let obs = build_image_observation(&frame, CropRect::new(80, 0, 0, 0));
        assert_eq!(obs.shape(), [48, 0, 3]);
        assert!(obs.data().is_empty());
    }

    // =============================================================
    // Observation types
    // =============================================================

    #[test]
    fn test_obs_type_parse() {
        assert_eq!("ram".parse::<ObsType>().unwrap(), ObsType::Ram);
        assert_eq!("IMAGE".parse::<ObsType>().unwrap(), ObsType::Image);

        let err = "audio".parse::<ObsType>().unwrap_err();
        assert!(err.to_string().contains("audio"));
    }
}
