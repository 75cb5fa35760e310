use multiversx_sc::types::BigUint;
use multiversx_sc_scenario::api::StaticApi;

use weighted_lock_dao::{
    boost::{boosted_amount, capped_boosted_amount, BoostOutcome, BOOST_PRECISION},
    errors::{ERR_INVALID_BOOST_INPUT, ERR_UNBOOSTED_CLAIM},
    types::BoostConfig,
};

const EMISSIONS: u64 = 1_000_000;

fn config() -> BoostConfig {
    BoostConfig {
        grace_epochs: 2,
        max_multiplier: 2,
        max_boostable_pct: 100,
        decay_boost_pct: 100,
        allow_unboosted: true,
    }
}

fn big(value: u64) -> BigUint<StaticApi> {
    BigUint::from(value)
}

/// Claim against epoch 10, by an account holding all of the lock weight:
/// max band ends at 1_000_000, decay band at 2_000_000.
fn claim(config: &BoostConfig, amount: u64, previous: u64) -> Result<BoostOutcome<StaticApi>, &'static str> {
    boosted_amount(
        config,
        10,
        &big(amount),
        &big(previous),
        400,
        400,
        &big(EMISSIONS),
    )
}

#[test]
fn test_max_band_pays_full_amount() {
    let outcome = claim(&config(), 500_000, 0).unwrap();
    assert_eq!(outcome.boosted_amount, big(500_000));
    assert_eq!(outcome.multiplier, 2 * BOOST_PRECISION);

    let outcome = claim(&config(), 500_000, 500_000).unwrap();
    assert_eq!(outcome.boosted_amount, big(500_000));
    assert_eq!(outcome.multiplier, 2 * BOOST_PRECISION);
}

#[test]
fn test_past_decay_band_pays_multiplier_one() {
    let outcome = claim(&config(), 100_000, 2_000_000).unwrap();
    assert_eq!(outcome.boosted_amount, big(50_000));
    assert_eq!(outcome.multiplier, BOOST_PRECISION);
}

#[test]
fn test_decay_band_pays_average_multiplier() {
    // linear from 2x down to 1x averages 1.5x
    let outcome = claim(&config(), 1_000_000, 1_000_000).unwrap();
    assert_eq!(outcome.boosted_amount, big(750_000));
    assert_eq!(outcome.multiplier, 15_000);

    // first half of the band: 2x down to 1.5x
    let outcome = claim(&config(), 500_000, 1_000_000).unwrap();
    assert_eq!(outcome.boosted_amount, big(437_500));
    assert_eq!(outcome.multiplier, 17_500);
}

#[test]
fn test_claim_spanning_all_bands() {
    // 1_000_000 at 2x, 1_000_000 at 1.5x on average, 1_000_000 at 1x
    let outcome = claim(&config(), 3_000_000, 0).unwrap();
    assert_eq!(outcome.boosted_amount, big(1_000_000 + 750_000 + 500_000));
    assert_eq!(outcome.multiplier, 15_000);
}

#[test]
fn test_split_claims_match_single_claim() {
    let whole = claim(&config(), 1_600_000, 0).unwrap();
    let first = claim(&config(), 1_200_000, 0).unwrap();
    let second = claim(&config(), 400_000, 1_200_000).unwrap();
    assert_eq!(whole.boosted_amount, first.boosted_amount + second.boosted_amount);
}

#[test]
fn test_grace_period_is_max_boost() {
    let outcome = boosted_amount(
        &config(),
        1,
        &big(5_000_000),
        &big(0),
        0,
        0,
        &big(EMISSIONS),
    )
    .unwrap();
    assert_eq!(outcome.boosted_amount, big(5_000_000));
    assert_eq!(outcome.multiplier, 2 * BOOST_PRECISION);
}

#[test]
fn test_unboosted_claim_rejected_when_disabled() {
    let strict = BoostConfig {
        allow_unboosted: false,
        ..config()
    };
    assert_eq!(claim(&strict, 1, 2_000_000).err(), Some(ERR_UNBOOSTED_CLAIM));
    assert_eq!(claim(&strict, 1_500_000, 1_000_000).err(), Some(ERR_UNBOOSTED_CLAIM));
    assert!(claim(&strict, 1_000_000, 1_000_000).is_ok());
}

fn capped(
    config: &BoostConfig,
    share: u64,
    previous: u64,
) -> (BigUint<StaticApi>, BoostOutcome<StaticApi>) {
    capped_boosted_amount(
        config,
        10,
        &big(share),
        &big(previous),
        400,
        400,
        &big(EMISSIONS),
    )
    .unwrap()
}

#[test]
fn test_capped_claim_stops_at_decay_band_end() {
    let strict = BoostConfig {
        allow_unboosted: false,
        ..config()
    };

    let (counted, outcome) = capped(&strict, 3_000_000, 0);
    assert_eq!(counted, big(2_000_000));
    assert_eq!(outcome.boosted_amount, big(1_000_000 + 750_000));
    assert_eq!(outcome.multiplier, 17_500);

    // last 200_000 of the decay band: 1.1x down to 1x
    let (counted, outcome) = capped(&strict, 500_000, 1_800_000);
    assert_eq!(counted, big(200_000));
    assert_eq!(outcome.boosted_amount, big(110_000));
    assert_eq!(outcome.multiplier, 11_000);

    let (counted, outcome) = capped(&strict, 100, 2_000_000);
    assert_eq!(counted, big(0));
    assert_eq!(outcome.boosted_amount, big(0));
    assert_eq!(outcome.multiplier, 0);
}

#[test]
fn test_capped_claim_counts_whole_share_when_unboosted_allowed() {
    let (counted, outcome) = capped(&config(), 3_000_000, 0);
    assert_eq!(counted, big(3_000_000));
    assert_eq!(outcome.boosted_amount, big(2_250_000));

    let strict = BoostConfig {
        allow_unboosted: false,
        ..config()
    };
    let (counted, outcome) =
        capped_boosted_amount(&strict, 1, &big(5_000_000), &big(0), 0, 0, &big(EMISSIONS))
            .unwrap();
    assert_eq!(counted, big(5_000_000));
    assert_eq!(outcome.boosted_amount, big(5_000_000));
}

#[test]
fn test_invalid_inputs() {
    assert_eq!(claim(&config(), 0, 0).err(), Some(ERR_INVALID_BOOST_INPUT));

    let no_weight = boosted_amount(&config(), 10, &big(1), &big(0), 0, 0, &big(EMISSIONS));
    assert_eq!(no_weight.err(), Some(ERR_INVALID_BOOST_INPUT));

    let over_total = boosted_amount(&config(), 10, &big(1), &big(0), 5, 4, &big(EMISSIONS));
    assert_eq!(over_total.err(), Some(ERR_INVALID_BOOST_INPUT));

    let zero_multiplier = BoostConfig {
        max_multiplier: 0,
        ..config()
    };
    assert_eq!(claim(&zero_multiplier, 1, 0).err(), Some(ERR_INVALID_BOOST_INPUT));
}

#[test]
fn test_account_share_scales_ceiling() {
    // a quarter of the weight: max band ends at 250_000
    let outcome = boosted_amount(
        &config(),
        10,
        &big(250_000),
        &big(0),
        100,
        400,
        &big(EMISSIONS),
    )
    .unwrap();
    assert_eq!(outcome.multiplier, 2 * BOOST_PRECISION);

    let outcome = boosted_amount(
        &config(),
        10,
        &big(100_000),
        &big(500_000),
        100,
        400,
        &big(EMISSIONS),
    )
    .unwrap();
    assert_eq!(outcome.multiplier, BOOST_PRECISION);
    assert_eq!(outcome.boosted_amount, big(50_000));
}
