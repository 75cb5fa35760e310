multiversx_sc::imports!();

use crate::{
    epoch_clock,
    errors::{ERR_INVALID_BOOST_CONFIG, ERR_INVALID_BOOST_INPUT, ERR_UNBOOSTED_CLAIM},
    locker,
    types::BoostConfig,
};

/// Scale of reported multipliers: 1x is `BOOST_PRECISION`.
pub const BOOST_PRECISION: u64 = 10_000;

pub struct BoostOutcome<M: ManagedTypeApi> {
    pub boosted_amount: BigUint<M>,
    /// Amount-weighted average multiplier, scaled by `BOOST_PRECISION`.
    pub multiplier: u64,
}

/// Applies the boost curve to a claim of `amount`, following
/// `previous_amount` already claimed by the same account in `epoch`.
///
/// Amounts are denominated at max boost, so the band paid at multiplier 1
/// pays `amount / max_multiplier`. The curve has three bands along the
/// account's cumulative claims in the epoch:
///
/// - up to the ceiling `epoch_emissions * account_share * max_boostable_pct`:
///   max multiplier
/// - the next `decay_boost_pct` percent of the ceiling: linear decay from max
///   to 1, paid at the exact average over the claimed range
/// - past that: multiplier 1, or rejected when unboosted claims are disabled
pub fn boosted_amount<M: ManagedTypeApi>(
    config: &BoostConfig,
    epoch: u64,
    amount: &BigUint<M>,
    previous_amount: &BigUint<M>,
    account_weight: u64,
    total_weight: u64,
    epoch_emissions: &BigUint<M>,
) -> Result<BoostOutcome<M>, &'static str> {
    let max_multiplier = config.max_multiplier;
    if *amount == 0u64 || max_multiplier == 0 {
        return Err(ERR_INVALID_BOOST_INPUT);
    }

    if epoch < config.grace_epochs {
        return Ok(BoostOutcome {
            boosted_amount: amount.clone(),
            multiplier: max_multiplier * BOOST_PRECISION,
        });
    }

    if total_weight == 0 || account_weight > total_weight {
        return Err(ERR_INVALID_BOOST_INPUT);
    }

    let (max_boostable, decay_width) =
        band_widths(config, account_weight, total_weight, epoch_emissions);
    let full_decay = &max_boostable + &decay_width;
    let end = previous_amount + amount;

    let mut boosted = BigUint::zero();
    let mut weighted_multiplier = BigUint::zero();

    // ── Max boost band ──
    if *previous_amount < max_boostable {
        let band = core::cmp::min(&end, &max_boostable) - previous_amount;
        weighted_multiplier += &band * max_multiplier * BOOST_PRECISION;
        boosted += band;
    }

    // ── Decaying band ──
    let decay_start = core::cmp::max(previous_amount, &max_boostable);
    let decay_end = core::cmp::min(&end, &full_decay);
    if decay_end > decay_start {
        let band = decay_end - decay_start;
        let before = &full_decay - decay_start;
        let after = &full_decay - decay_end;

        // average multiplier over the band = 1 + (m - 1) * (before + after) / (2 * width)
        let twice_width = &decay_width * 2u64;
        let numerator = &twice_width + &((&before + &after) * (max_multiplier - 1));

        weighted_multiplier += &band * &numerator * BOOST_PRECISION / &twice_width;
        boosted += &band * &numerator / &(&twice_width * max_multiplier);
    }

    // ── Unboosted remainder ──
    let unboosted_start = core::cmp::max(previous_amount, &full_decay);
    if end > *unboosted_start {
        require_unboosted(config)?;
        let band = &end - unboosted_start;
        weighted_multiplier += &band * BOOST_PRECISION;
        boosted += &band / max_multiplier;
    }

    let multiplier = (weighted_multiplier / amount)
        .to_u64()
        .ok_or(ERR_INVALID_BOOST_INPUT)?;

    Ok(BoostOutcome {
        boosted_amount: boosted,
        multiplier,
    })
}

/// Part of `share` a claim can count towards the curve. With unboosted
/// claims disabled, the claim stops at the end of the decay band and the
/// rest is left out; otherwise the whole share counts.
///
/// Returns `(counted, outcome)`. A claim made entirely past the decay band
/// counts nothing and pays nothing.
pub fn capped_boosted_amount<M: ManagedTypeApi>(
    config: &BoostConfig,
    epoch: u64,
    share: &BigUint<M>,
    previous_amount: &BigUint<M>,
    account_weight: u64,
    total_weight: u64,
    epoch_emissions: &BigUint<M>,
) -> Result<(BigUint<M>, BoostOutcome<M>), &'static str> {
    let mut counted = share.clone();
    if !config.allow_unboosted
        && epoch >= config.grace_epochs
        && total_weight > 0
        && account_weight <= total_weight
    {
        let (max_boostable, decay_width) =
            band_widths(config, account_weight, total_weight, epoch_emissions);
        let full_decay = max_boostable + decay_width;
        if *previous_amount >= full_decay {
            counted = BigUint::zero();
        } else if full_decay < previous_amount + share {
            counted = full_decay - previous_amount;
        }
    }

    if counted == 0u64 {
        return Ok((
            counted,
            BoostOutcome {
                boosted_amount: BigUint::zero(),
                multiplier: 0,
            },
        ));
    }

    let outcome = boosted_amount(
        config,
        epoch,
        &counted,
        previous_amount,
        account_weight,
        total_weight,
        epoch_emissions,
    )?;
    Ok((counted, outcome))
}

/// `(max_boostable, decay_width)` of an account's curve in one epoch.
fn band_widths<M: ManagedTypeApi>(
    config: &BoostConfig,
    account_weight: u64,
    total_weight: u64,
    epoch_emissions: &BigUint<M>,
) -> (BigUint<M>, BigUint<M>) {
    let max_boostable = epoch_emissions * account_weight * config.max_boostable_pct
        / (BigUint::from(total_weight) * 100u64);
    let decay_width = &max_boostable * config.decay_boost_pct / 100u64;
    (max_boostable, decay_width)
}

fn require_unboosted(config: &BoostConfig) -> Result<(), &'static str> {
    if config.allow_unboosted {
        Ok(())
    } else {
        Err(ERR_UNBOOSTED_CLAIM)
    }
}

#[multiversx_sc::module]
pub trait BoostModule:
    epoch_clock::EpochClockModule + locker::LockerModule
{
    fn init_boost(&self, config: BoostConfig) {
        self.set_boost_config_internal(config);
    }

    /// Boosts a claim of `share` against `epoch` and counts the boosted
    /// part towards the account's claims in that epoch. The caller treats
    /// `share - boosted_amount` as forfeited.
    fn apply_boost(
        &self,
        account: &ManagedAddress,
        epoch: u64,
        share: &BigUint,
        epoch_emissions: &BigUint,
    ) -> BoostOutcome<Self::Api> {
        let previous = self.account_epoch_claimed(account, epoch).get();
        let (counted, outcome) =
            match self.capped_boost(account, epoch, share, &previous, epoch_emissions) {
                Ok(result) => result,
                Err(err) => sc_panic!(err),
            };
        if counted > 0u64 {
            self.account_epoch_claimed(account, epoch)
                .set(&previous + &counted);
        }
        outcome
    }

    fn capped_boost(
        &self,
        account: &ManagedAddress,
        epoch: u64,
        share: &BigUint,
        previous: &BigUint,
        epoch_emissions: &BigUint,
    ) -> Result<(BigUint, BoostOutcome<Self::Api>), &'static str> {
        let config = self.boost_config().get();
        capped_boosted_amount(
            &config,
            epoch,
            share,
            previous,
            self.project_account_weight(account, epoch),
            self.project_total_weight(epoch),
            epoch_emissions,
        )
    }

    fn compute_boost(
        &self,
        account: &ManagedAddress,
        epoch: u64,
        amount: &BigUint,
        previous: &BigUint,
        epoch_emissions: &BigUint,
    ) -> BoostOutcome<Self::Api> {
        let config = self.boost_config().get();
        let account_weight = self.project_account_weight(account, epoch);
        let total_weight = self.project_total_weight(epoch);

        match boosted_amount(
            &config,
            epoch,
            amount,
            previous,
            account_weight,
            total_weight,
            epoch_emissions,
        ) {
            Ok(outcome) => outcome,
            Err(err) => sc_panic!(err),
        }
    }

    fn set_boost_config_internal(&self, config: BoostConfig) {
        require!(config.max_multiplier >= 1, ERR_INVALID_BOOST_CONFIG);
        self.boost_config().set(config);
        self.boost_config_event(config.max_multiplier, config.grace_epochs);
    }

    #[only_owner]
    #[endpoint(setBoostConfig)]
    fn set_boost_config(&self, config: BoostConfig) {
        self.set_boost_config_internal(config);
    }

    // ========================================================
    // VIEWS
    // ========================================================

    /// `(boosted_amount, multiplier)` the account would get for claiming
    /// `amount` more against `epoch` right now.
    #[view(getClaimableWithBoost)]
    fn get_claimable_with_boost(
        &self,
        account: ManagedAddress,
        epoch: u64,
        amount: BigUint,
        epoch_emissions: BigUint,
    ) -> MultiValue2<BigUint, u64> {
        let previous = self.account_epoch_claimed(&account, epoch).get();
        let outcome = self.compute_boost(&account, epoch, &amount, &previous, &epoch_emissions);
        (outcome.boosted_amount, outcome.multiplier).into()
    }

    #[event("boostConfigSet")]
    fn boost_config_event(&self, #[indexed] max_multiplier: u64, grace_epochs: u64);

    #[view(getBoostConfig)]
    #[storage_mapper("boostConfig")]
    fn boost_config(&self) -> SingleValueMapper<BoostConfig>;

    /// Claims counted against `epoch`, at max-boost denomination.
    #[view(getAccountClaimedInEpoch)]
    #[storage_mapper("accountEpochClaimed")]
    fn account_epoch_claimed(&self, account: &ManagedAddress, epoch: u64)
        -> SingleValueMapper<BigUint>;
}
