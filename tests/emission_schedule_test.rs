use multiversx_sc::types::BigUint;
use multiversx_sc_scenario::api::StaticApi;

use weighted_lock_dao::{
    emission_schedule::{
        applicable_pct, lock_duration_for_epoch, percentage_emissions, validate_claim_lock,
        MAX_PCT,
    },
    errors::{ERR_INVALID_CLAIM_LOCK, ERR_INVALID_DECAY_RATE},
    types::{ClaimLockConfig, EpochPct},
};

fn schedule() -> Vec<EpochPct> {
    vec![
        EpochPct {
            epoch: 13,
            pct: 9_000,
        },
        EpochPct {
            epoch: 26,
            pct: 8_000,
        },
        EpochPct {
            epoch: 39,
            pct: 7_000,
        },
    ]
}

#[test]
fn test_initial_pct_until_first_threshold() {
    for epoch in [0, 2, 12] {
        assert_eq!(applicable_pct(schedule().into_iter(), epoch, MAX_PCT), MAX_PCT);
    }
}

#[test]
fn test_pct_steps_at_thresholds() {
    assert_eq!(applicable_pct(schedule().into_iter(), 13, MAX_PCT), 9_000);
    assert_eq!(applicable_pct(schedule().into_iter(), 25, MAX_PCT), 9_000);
    assert_eq!(applicable_pct(schedule().into_iter(), 26, MAX_PCT), 8_000);
    assert_eq!(applicable_pct(schedule().into_iter(), 500, MAX_PCT), 7_000);
    assert_eq!(applicable_pct(Vec::new().into_iter(), 500, 100), 100);
}

#[test]
fn test_percentage_emissions_rounds_down() {
    let unallocated = BigUint::<StaticApi>::from(1_000_003u64);
    assert_eq!(
        percentage_emissions(&unallocated, 9_000),
        BigUint::<StaticApi>::from(900_002u64)
    );
    assert_eq!(
        percentage_emissions(&unallocated, MAX_PCT),
        BigUint::<StaticApi>::from(1_000_003u64)
    );
    assert_eq!(
        percentage_emissions(&BigUint::<StaticApi>::from(99u64), 100),
        BigUint::<StaticApi>::zero()
    );
}

#[test]
fn test_lock_duration_decays_to_floor() {
    let config = ClaimLockConfig {
        initial_duration: 26,
        decay_rate: 2,
        floor: 1,
    };

    assert_eq!(lock_duration_for_epoch(&config, 0), 26);
    assert_eq!(lock_duration_for_epoch(&config, 1), 26);
    assert_eq!(lock_duration_for_epoch(&config, 2), 25);
    assert_eq!(lock_duration_for_epoch(&config, 49), 2);
    assert_eq!(lock_duration_for_epoch(&config, 50), 1);
    assert_eq!(lock_duration_for_epoch(&config, 1_000), 1);

    let no_floor = ClaimLockConfig { floor: 0, ..config };
    assert_eq!(lock_duration_for_epoch(&no_floor, 52), 0);
}

#[test]
fn test_claim_lock_validation() {
    let valid = ClaimLockConfig {
        initial_duration: 26,
        decay_rate: 2,
        floor: 0,
    };
    assert_eq!(validate_claim_lock(&valid), Ok(()));

    assert_eq!(
        validate_claim_lock(&ClaimLockConfig {
            decay_rate: 0,
            ..valid
        }),
        Err(ERR_INVALID_DECAY_RATE)
    );
    assert_eq!(
        validate_claim_lock(&ClaimLockConfig { floor: 27, ..valid }),
        Err(ERR_INVALID_CLAIM_LOCK)
    );
    assert_eq!(
        validate_claim_lock(&ClaimLockConfig {
            initial_duration: 53,
            ..valid
        }),
        Err(ERR_INVALID_CLAIM_LOCK)
    );
}
