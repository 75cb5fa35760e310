//! Closed-form lock weight arithmetic over sparse checkpoints.
//!
//! A position of `units` locked until epoch `u` weighs `units * (u - e)` at
//! epoch `e`. Summed over positions, weight drops by the currently locked
//! units every epoch, and locked units drop by whatever unlocks that epoch.
//! Neither needs to be stored per epoch.

use crate::types::WeightCheckpoint;

/// State at `target`, projected from `checkpoint` (which must not be later).
///
/// Returns the projected checkpoint and the units released on the way.
/// `unlocks_at` gives the units whose lock ends at an epoch.
pub fn project<F>(checkpoint: &WeightCheckpoint, target: u64, unlocks_at: F) -> (WeightCheckpoint, u64)
where
    F: Fn(u64) -> u64,
{
    let mut state = *checkpoint;
    let mut released = 0u64;

    // Every locked unit ends within MAX_LOCK_EPOCHS of the checkpoint, so the
    // loop runs at most that many times before `locked` reaches zero.
    while state.epoch < target && state.locked > 0 {
        state.epoch += 1;
        state.weight -= state.locked;
        let unlocked = unlocks_at(state.epoch);
        state.locked -= unlocked;
        released += unlocked;
    }

    state.epoch = target;
    (state, released)
}

/// Index (1-based, as in `VecMapper`) of the latest checkpoint at or
/// before `epoch`, given `len` checkpoints in ascending epoch order.
pub fn find_checkpoint<F>(len: usize, epoch: u64, epoch_of: F) -> Option<usize>
where
    F: Fn(usize) -> u64,
{
    if len == 0 || epoch_of(1) > epoch {
        return None;
    }

    let (mut low, mut high) = (1usize, len);
    while low < high {
        let mid = (low + high + 1) / 2;
        if epoch_of(mid) <= epoch {
            low = mid;
        } else {
            high = mid - 1;
        }
    }
    Some(low)
}

/// `units * epochs`, or `None` on overflow.
pub fn lock_weight(units: u64, epochs: u64) -> Option<u64> {
    units.checked_mul(epochs)
}
