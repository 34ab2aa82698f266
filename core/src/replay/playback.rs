//! Journal playback
//!
//! Feeds a recorded journal back into an emulator. Against a deterministic
//! core this reproduces the recorded episode exactly.

use anyhow::Context;

use crate::emulator::Emulator;
use crate::replay::types::Journal;

/// Replay `journal` into `emulator`
///
/// Restores the initial snapshot (when the journal has one), then for every
/// tick applies each player's mask and advances one tick. `on_tick` runs after
/// each advance with the tick index. Journals without a snapshot replay from
/// whatever state the emulator is in.
///
/// Returns the number of ticks replayed.
pub fn replay_into<E, F>(journal: &Journal, emulator: &mut E, mut on_tick: F) -> anyhow::Result<u64>
where
    E: Emulator + ?Sized,
    F: FnMut(u64, &E),
{
    let header = &journal.header;
    if let Some(state) = &journal.initial_state {
        emulator
            .set_state(state)
            .with_context(|| format!("failed to restore initial state of '{}'", header.game_id))?;
    }

    let core_buttons = emulator.buttons().len();
    if core_buttons != header.num_buttons as usize {
        tracing::warn!(
            journal = header.num_buttons,
            core = core_buttons,
            "journal button count differs from the core"
        );
    }

    let mut replayed = 0;
    for (tick, masks) in journal.ticks.iter().enumerate() {
        for (player, mask) in masks.iter().enumerate() {
            emulator.set_button_mask(player, mask);
        }
        emulator.step();
        on_tick(tick as u64, emulator);
        replayed += 1;
    }

    tracing::debug!(game = %header.game_id, ticks = replayed, "journal replayed");
    Ok(replayed)
}
