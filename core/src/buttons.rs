//! Per-player button masks
//!
//! A [`ButtonMask`] is the set of buttons one player holds down for a single
//! emulator tick. Bit `i` corresponds to the core's `i`-th button name.

use smallvec::SmallVec;

/// Widest button layout a mask can represent
pub const MAX_BUTTONS: usize = 64;

/// Number of players stored inline before a mask list spills to the heap
pub const INLINE_PLAYERS: usize = 4;

/// One mask per player, in player order
pub type PlayerMasks = SmallVec<[ButtonMask; INLINE_PLAYERS]>;

/// Fixed-width bit vector of pressed buttons for one player
///
/// The width is the number of physical buttons on the core. Bits at or above
/// the width are always clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ButtonMask {
    bits: u64,
    width: u8,
}

impl ButtonMask {
    /// Create a mask with every button released
    ///
    /// # Panics
    /// Panics if `width` exceeds [`MAX_BUTTONS`].
    pub fn empty(width: usize) -> Self {
        assert!(
            width <= MAX_BUTTONS,
            "button width must be at most {}, got {}",
            MAX_BUTTONS,
            width
        );
        Self {
            bits: 0,
            width: width as u8,
        }
    }

    /// Create a mask from an integer, keeping only the low `width` bits
    pub fn from_bits(bits: u64, width: usize) -> Self {
        let mut mask = Self::empty(width);
        mask.bits = bits & Self::width_mask(width);
        mask
    }

    /// Create a mask from packed little-endian bytes
    pub fn from_bytes(bytes: &[u8], width: usize) -> Self {
        let mut raw = [0u8; 8];
        let len = bytes.len().min(8);
        raw[..len].copy_from_slice(&bytes[..len]);
        Self::from_bits(u64::from_le_bytes(raw), width)
    }

    fn width_mask(width: usize) -> u64 {
        if width >= MAX_BUTTONS {
            u64::MAX
        } else {
            (1u64 << width) - 1
        }
    }

    /// Integer form of the mask (bit `i` = button `i`)
    pub fn bits(&self) -> u64 {
        self.bits
    }

    /// Number of buttons this mask covers
    pub fn width(&self) -> usize {
        self.width as usize
    }

    /// Bytes needed to store one mask of this width
    pub fn byte_len(&self) -> usize {
        Self::bytes_for_width(self.width())
    }

    /// Bytes needed to store one mask of `width` buttons
    pub fn bytes_for_width(width: usize) -> usize {
        width.div_ceil(8)
    }

    /// Whether button `index` is held
    pub fn is_pressed(&self, index: usize) -> bool {
        index < self.width() && (self.bits >> index) & 1 == 1
    }

    /// Press or release button `index`. Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, pressed: bool) {
        if index >= self.width() {
            return;
        }
        if pressed {
            self.bits |= 1 << index;
        } else {
            self.bits &= !(1 << index);
        }
    }

    /// Whether no button is held
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Indices of held buttons, ascending
    pub fn pressed(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.width()).filter(|&i| self.is_pressed(i))
    }

    /// One 0/1 entry per button
    pub fn to_array(&self) -> Vec<u8> {
        (0..self.width()).map(|i| self.is_pressed(i) as u8).collect()
    }

    /// Packed little-endian bytes, [`Self::byte_len`] long
    pub fn to_bytes(&self) -> SmallVec<[u8; 8]> {
        SmallVec::from_slice(&self.bits.to_le_bytes()[..self.byte_len()])
    }

    /// Names of the held buttons
    ///
    /// `names` is the core's button list; unnamed (empty) slots are skipped.
    pub fn names<'a>(&self, names: &'a [String]) -> Vec<&'a str> {
        self.pressed()
            .filter_map(|i| names.get(i))
            .filter(|name| !name.is_empty())
            .map(String::as_str)
            .collect()
    }
}
