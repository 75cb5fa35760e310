multiversx_sc::imports!();

use crate::{
    errors::{ERR_INVALID_CLAIM_LOCK, ERR_INVALID_DECAY_RATE, ERR_INVALID_SCHEDULE},
    locker::MAX_LOCK_EPOCHS,
    types::{ClaimLockConfig, EpochPct},
};

/// Denominator of every configured percentage.
pub const MAX_PCT: u64 = 10_000;

/// Percentage in force at `epoch`: the entry with the greatest threshold not
/// after `epoch`, or `initial_pct` before the first threshold. `schedule`
/// must be ascending.
pub fn applicable_pct<I>(schedule: I, epoch: u64, initial_pct: u64) -> u64
where
    I: Iterator<Item = EpochPct>,
{
    let mut pct = initial_pct;
    for entry in schedule {
        if entry.epoch > epoch {
            break;
        }
        pct = entry.pct;
    }
    pct
}

/// `unallocated * pct / MAX_PCT`, rounded down.
pub fn percentage_emissions<M: ManagedTypeApi>(unallocated: &BigUint<M>, pct: u64) -> BigUint<M> {
    unallocated * pct / MAX_PCT
}

pub fn lock_duration_for_epoch(config: &ClaimLockConfig, epoch: u64) -> u64 {
    let decayed = config.initial_duration.saturating_sub(epoch / config.decay_rate);
    core::cmp::max(decayed, config.floor)
}

pub fn validate_claim_lock(config: &ClaimLockConfig) -> Result<(), &'static str> {
    if config.decay_rate == 0 {
        return Err(ERR_INVALID_DECAY_RATE);
    }
    if config.floor > config.initial_duration || config.initial_duration > MAX_LOCK_EPOCHS {
        return Err(ERR_INVALID_CLAIM_LOCK);
    }
    Ok(())
}

// ============================================================
// Emission schedule: per-epoch release and lock-on-claim
// ============================================================

#[multiversx_sc::module]
pub trait EmissionScheduleModule {
    fn init_emission_schedule(
        &self,
        fixed_initial_amounts: ManagedVec<BigUint>,
        initial_per_epoch_pct: u64,
        pct_schedule: ManagedVec<EpochPct>,
        claim_lock: ClaimLockConfig,
    ) {
        for amount in fixed_initial_amounts.iter() {
            self.fixed_initial_amounts().push(&amount);
        }
        self.set_emission_schedule_internal(initial_per_epoch_pct, &pct_schedule);
        self.set_claim_lock_config_internal(claim_lock);
    }

    /// Tokens released for `epoch` out of `unallocated`.
    fn emissions_for_epoch(&self, epoch: u64, unallocated: &BigUint) -> BigUint {
        let fixed = self.fixed_initial_amounts();
        if epoch < fixed.len() as u64 {
            let amount = fixed.get(epoch as usize + 1);
            return core::cmp::min(amount, unallocated.clone());
        }

        let pct = applicable_pct(
            self.epoch_pct_schedule().iter(),
            epoch,
            self.initial_per_epoch_pct().get(),
        );
        percentage_emissions(unallocated, pct)
    }

    fn claim_lock_duration(&self, epoch: u64) -> u64 {
        lock_duration_for_epoch(&self.claim_lock_config().get(), epoch)
    }

    /// Replaces the schedule, keeping it sorted by epoch whatever the input
    /// order.
    fn set_emission_schedule_internal(
        &self,
        initial_per_epoch_pct: u64,
        pct_schedule: &ManagedVec<EpochPct>,
    ) {
        require!(initial_per_epoch_pct <= MAX_PCT, ERR_INVALID_SCHEDULE);

        let mut stored = self.epoch_pct_schedule();
        stored.clear();
        for item in pct_schedule.iter() {
            require!(item.pct <= MAX_PCT, ERR_INVALID_SCHEDULE);
            let entry = EpochPct {
                epoch: item.epoch,
                pct: item.pct,
            };

            stored.push(&entry);
            let mut index = stored.len();
            while index > 1 {
                let previous = stored.get(index - 1);
                require!(previous.epoch != entry.epoch, ERR_INVALID_SCHEDULE);
                if previous.epoch < entry.epoch {
                    break;
                }
                stored.set(index, &previous);
                index -= 1;
            }
            stored.set(index, &entry);
        }

        self.initial_per_epoch_pct().set(initial_per_epoch_pct);
        self.emission_schedule_event(initial_per_epoch_pct, stored.len() as u64);
    }

    fn set_claim_lock_config_internal(&self, config: ClaimLockConfig) {
        if let Err(err) = validate_claim_lock(&config) {
            sc_panic!(err);
        }
        self.claim_lock_config().set(config);
        self.claim_lock_config_event(config.initial_duration, config.decay_rate, config.floor);
    }

    // ========================================================
    // OWNER: configuration
    // ========================================================

    #[only_owner]
    #[endpoint(setEmissionSchedule)]
    fn set_emission_schedule(&self, initial_per_epoch_pct: u64, pct_schedule: ManagedVec<EpochPct>) {
        self.set_emission_schedule_internal(initial_per_epoch_pct, &pct_schedule);
    }

    #[only_owner]
    #[endpoint(setClaimLockConfig)]
    fn set_claim_lock_config(&self, config: ClaimLockConfig) {
        self.set_claim_lock_config_internal(config);
    }

    // ========================================================
    // VIEWS
    // ========================================================

    #[view(getEmissionsForEpoch)]
    fn get_emissions_for_epoch(&self, epoch: u64, unallocated: BigUint) -> BigUint {
        self.emissions_for_epoch(epoch, &unallocated)
    }

    #[view(getLockDurationForEpoch)]
    fn get_lock_duration_for_epoch(&self, epoch: u64) -> u64 {
        self.claim_lock_duration(epoch)
    }

    #[view(getEpochPctSchedule)]
    fn get_epoch_pct_schedule(&self) -> MultiValueEncoded<EpochPct> {
        let mut result = MultiValueEncoded::new();
        for entry in self.epoch_pct_schedule().iter() {
            result.push(entry);
        }
        result
    }

    #[view(getFixedInitialAmounts)]
    fn get_fixed_initial_amounts(&self) -> MultiValueEncoded<BigUint> {
        let mut result = MultiValueEncoded::new();
        for amount in self.fixed_initial_amounts().iter() {
            result.push(amount);
        }
        result
    }

    // ========================================================
    // EVENTS
    // ========================================================

    #[event("emissionScheduleSet")]
    fn emission_schedule_event(&self, #[indexed] initial_per_epoch_pct: u64, entries: u64);

    #[event("claimLockConfigSet")]
    fn claim_lock_config_event(
        &self,
        #[indexed] initial_duration: u64,
        #[indexed] decay_rate: u64,
        floor: u64,
    );

    // ========================================================
    // STORAGE
    // ========================================================

    #[storage_mapper("fixedInitialAmounts")]
    fn fixed_initial_amounts(&self) -> VecMapper<BigUint>;

    #[view(getInitialPerEpochPct)]
    #[storage_mapper("initialPerEpochPct")]
    fn initial_per_epoch_pct(&self) -> SingleValueMapper<u64>;

    /// Ascending by epoch.
    #[storage_mapper("epochPctSchedule")]
    fn epoch_pct_schedule(&self) -> VecMapper<EpochPct>;

    #[view(getClaimLockConfig)]
    #[storage_mapper("claimLockConfig")]
    fn claim_lock_config(&self) -> SingleValueMapper<ClaimLockConfig>;
}
