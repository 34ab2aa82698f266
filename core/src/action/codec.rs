//! Action codec: agent action → per-player button masks

use crate::buttons::{ButtonMask, MAX_BUTTONS, PlayerMasks};
use crate::error::{ConfigError, DecodeError};
use crate::spaces::ActionSpace;

use super::{Action, ActionFilter, ActionMode, ComboTable};

/// Translates agent actions into one [`ButtonMask`] per player
#[derive(Debug, Clone)]
pub struct ActionCodec {
    mode: ActionMode,
    num_buttons: usize,
    players: usize,
    combos: ComboTable,
    space: ActionSpace,
}

impl ActionCodec {
    /// Build a codec, validating the combo table for combo-based modes
    ///
    /// # Errors
    /// - [`ConfigError::NoPlayers`] if `players` is zero
    /// - [`ConfigError::TooManyButtons`] if the core has more than 64 buttons
    /// - [`ConfigError::EmptyComboGroup`] for an empty group in `Discrete`/`MultiDiscrete`
    /// - [`ConfigError::ActionSpaceTooLarge`] if the discrete space overflows `u64`
    pub fn new(
        mode: ActionMode,
        num_buttons: usize,
        players: usize,
        combos: ComboTable,
    ) -> Result<Self, ConfigError> {
        if players == 0 {
            return Err(ConfigError::NoPlayers);
        }
        if num_buttons > MAX_BUTTONS {
            return Err(ConfigError::TooManyButtons(num_buttons));
        }
        if mode.uses_combos() {
            combos.validate()?;
        }

        let space = match mode {
            ActionMode::All | ActionMode::Filtered => {
                ActionSpace::MultiBinary(num_buttons * players)
            }
            ActionMode::Discrete => {
                let overflow = || ConfigError::ActionSpaceTooLarge {
                    combos: combos.combinations().unwrap_or(u64::MAX),
                    players,
                };
                let per_player = combos.combinations().ok_or_else(overflow)?;
                let exponent = u32::try_from(players).map_err(|_| overflow())?;
                ActionSpace::Discrete(per_player.checked_pow(exponent).ok_or_else(overflow)?)
            }
            ActionMode::MultiDiscrete => {
                let dims: Vec<u64> = combos.cardinalities().map(|len| len as u64).collect();
                ActionSpace::MultiDiscrete(dims.repeat(players))
            }
        };

        Ok(Self {
            mode,
            num_buttons,
            players,
            combos,
            space,
        })
    }

    /// Configured action mode
    pub fn mode(&self) -> ActionMode {
        self.mode
    }

    /// Buttons per player
    pub fn num_buttons(&self) -> usize {
        self.num_buttons
    }

    /// Number of players
    pub fn players(&self) -> usize {
        self.players
    }

    /// Combo table in use
    pub fn combos(&self) -> &ComboTable {
        &self.combos
    }

    /// Action space implied by the mode, buttons, players and combos
    pub fn action_space(&self) -> &ActionSpace {
        &self.space
    }

    /// Decode `action` into one mask per player
    ///
    /// `filter` is only consulted in [`ActionMode::Filtered`].
    pub fn decode<F: ActionFilter + ?Sized>(
        &self,
        action: &Action,
        filter: &F,
    ) -> Result<PlayerMasks, DecodeError> {
        let raw = match (self.mode, action) {
            (ActionMode::All, Action::Binary(bits)) => self.decode_binary(bits)?,
            (ActionMode::Filtered, Action::Binary(bits)) => self
                .decode_binary(bits)?
                .into_iter()
                .map(|raw| filter.filter_action(raw))
                .collect(),
            (ActionMode::Discrete, Action::Discrete(value)) => self.decode_discrete(*value)?,
            (ActionMode::MultiDiscrete, Action::MultiDiscrete(indices)) => {
                self.decode_multi_discrete(indices)?
            }
            (mode, other) => {
                return Err(DecodeError::WrongKind {
                    mode,
                    found: other.kind(),
                });
            }
        };

        Ok(raw
            .into_iter()
            .map(|bits| ButtonMask::from_bits(bits, self.num_buttons))
            .collect())
    }

    fn decode_binary(&self, bits: &[u8]) -> Result<Vec<u64>, DecodeError> {
        let expected = self.num_buttons * self.players;
        if bits.len() != expected {
            return Err(DecodeError::WrongLength {
                expected,
                found: bits.len(),
            });
        }
        if let Some((index, &value)) = bits.iter().enumerate().find(|(_, v)| **v > 1) {
            return Err(DecodeError::NotBinary { index, value });
        }

        Ok(bits
            .chunks(self.num_buttons.max(1))
            .take(self.players)
            .map(|player_bits| {
                player_bits
                    .iter()
                    .enumerate()
                    .fold(0u64, |acc, (i, &b)| acc | ((b as u64) << i))
            })
            .chain(std::iter::repeat(0))
            .take(self.players)
            .collect())
    }

    fn decode_discrete(&self, value: u64) -> Result<Vec<u64>, DecodeError> {
        if let ActionSpace::Discrete(size) = self.space
            && value >= size
        {
            return Err(DecodeError::OutOfRange { value, size });
        }

        // Least-significant group first; players consume successive digits.
        let mut rest = value;
        let mut masks = Vec::with_capacity(self.players);
        for _ in 0..self.players {
            let mut acc = 0u64;
            for group in self.combos.iter() {
                let len = group.len() as u64;
                acc |= group[(rest % len) as usize];
                rest /= len;
            }
            masks.push(acc);
        }
        Ok(masks)
    }

    fn decode_multi_discrete(&self, indices: &[usize]) -> Result<Vec<u64>, DecodeError> {
        let groups = self.combos.group_count();
        let expected = groups * self.players;
        if indices.len() != expected {
            return Err(DecodeError::WrongLength {
                expected,
                found: indices.len(),
            });
        }

        let mut masks = Vec::with_capacity(self.players);
        for player in 0..self.players {
            let selectors = &indices[groups * player..groups * (player + 1)];
            let mut acc = 0u64;
            for (group, &index) in selectors.iter().enumerate() {
                acc |= self.combos.get(group, index).ok_or_else(|| {
                    DecodeError::ComboIndexOutOfRange {
                        group,
                        index,
                        len: self.combos.cardinalities().nth(group).unwrap_or(0),
                    }
                })?;
            }
            masks.push(acc);
        }
        Ok(masks)
    }
}
