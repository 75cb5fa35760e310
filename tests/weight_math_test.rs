// Checkpoint projection and lookup, without a contract around them.

use std::collections::HashMap;

use weighted_lock_dao::{types::WeightCheckpoint, weight_math};

fn checkpoint(epoch: u64, weight: u64, locked: u64) -> WeightCheckpoint {
    WeightCheckpoint {
        epoch,
        weight,
        locked,
    }
}

#[test]
fn test_single_position_decays_to_zero() {
    // 1000 units locked at epoch 0 for 10 epochs
    let unlocks: HashMap<u64, u64> = [(10, 1_000)].into_iter().collect();
    let at = |epoch: u64| unlocks.get(&epoch).copied().unwrap_or_default();
    let start = checkpoint(0, 10_000, 1_000);

    let (state, released) = weight_math::project(&start, 5, at);
    assert_eq!(state, checkpoint(5, 5_000, 1_000));
    assert_eq!(released, 0);

    let (state, released) = weight_math::project(&start, 10, at);
    assert_eq!(state, checkpoint(10, 0, 0));
    assert_eq!(released, 1_000);

    let (state, released) = weight_math::project(&start, 40, at);
    assert_eq!(state, checkpoint(40, 0, 0));
    assert_eq!(released, 1_000);
}

#[test]
fn test_staggered_positions() {
    // 100 units ending at epoch 2, 50 units ending at epoch 4
    let unlocks: HashMap<u64, u64> = [(2, 100), (4, 50)].into_iter().collect();
    let at = |epoch: u64| unlocks.get(&epoch).copied().unwrap_or_default();
    let start = checkpoint(0, 100 * 2 + 50 * 4, 150);

    let mut previous = start.weight;
    for epoch in 1..=6 {
        let (state, _) = weight_math::project(&start, epoch, at);
        let expected = 100 * 2u64.saturating_sub(epoch) + 50 * 4u64.saturating_sub(epoch);
        assert_eq!(state.weight, expected, "epoch {epoch}");
        assert!(state.weight <= previous);
        previous = state.weight;
    }

    let (state, released) = weight_math::project(&start, 3, at);
    assert_eq!(state.locked, 50);
    assert_eq!(released, 100);
}

#[test]
fn test_project_to_same_epoch_is_identity() {
    let start = checkpoint(7, 420, 60);
    let (state, released) = weight_math::project(&start, 7, |_| 0);
    assert_eq!(state, start);
    assert_eq!(released, 0);
}

#[test]
fn test_find_checkpoint() {
    // 1-based like VecMapper
    let epochs = [0u64, 3, 4, 9, 20];
    let epoch_of = |i: usize| epochs[i - 1];

    assert_eq!(weight_math::find_checkpoint(0, 5, epoch_of), None);
    assert_eq!(weight_math::find_checkpoint(5, 0, epoch_of), Some(1));
    assert_eq!(weight_math::find_checkpoint(5, 2, epoch_of), Some(1));
    assert_eq!(weight_math::find_checkpoint(5, 3, epoch_of), Some(2));
    assert_eq!(weight_math::find_checkpoint(5, 8, epoch_of), Some(3));
    assert_eq!(weight_math::find_checkpoint(5, 9, epoch_of), Some(4));
    assert_eq!(weight_math::find_checkpoint(5, 1_000, epoch_of), Some(5));

    let late = [5u64, 6];
    assert_eq!(weight_math::find_checkpoint(2, 4, |i| late[i - 1]), None);
}

#[test]
fn test_lock_weight_overflow() {
    assert_eq!(weight_math::lock_weight(1_000, 10), Some(10_000));
    assert_eq!(weight_math::lock_weight(u64::MAX, 2), None);
}
