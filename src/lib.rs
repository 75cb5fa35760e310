#![no_std]

multiversx_sc::imports!();

pub mod admin_voting;
pub mod boost;
pub mod emission_schedule;
pub mod epoch_clock;
pub mod errors;
pub mod incentive_voting;
pub mod locker;
pub mod types;
pub mod vault;
pub mod weight_math;

use types::{BoostConfig, ClaimLockConfig, EpochPct};

// ============================================================
// Contract
//
// Each component lives in its own module; the supertraits give
// every module access to the storage and logic of the ones it
// reads from, so a single deployment holds the whole protocol.
// ============================================================

#[multiversx_sc::contract]
pub trait WeightedLockDao:
    epoch_clock::EpochClockModule
    + locker::LockerModule
    + boost::BoostModule
    + emission_schedule::EmissionScheduleModule
    + incentive_voting::IncentiveVotingModule
    + vault::VaultModule
    + admin_voting::AdminVotingModule
{
    // ========================================================
    // Init / Upgrade
    // ========================================================

    #[init]
    fn init(
        &self,
        gov_token_id: TokenIdentifier,
        epoch_length: u64,
        start_offset: u64,
        lock_to_token_ratio: BigUint,
        penalty_withdrawals_enabled: bool,
        fee_receiver: ManagedAddress,
        guardian: ManagedAddress,
        min_create_proposal_pct: u64,
        passing_pct: u64,
        boost_config: BoostConfig,
        claim_lock: ClaimLockConfig,
        initial_per_epoch_pct: u64,
        fixed_initial_amounts: ManagedVec<BigUint>,
        pct_schedule: ManagedVec<EpochPct>,
        allowances: MultiValueEncoded<MultiValue2<ManagedAddress, BigUint>>,
    ) {
        self.init_epoch_clock(epoch_length, start_offset);
        self.init_locker(
            gov_token_id,
            lock_to_token_ratio,
            penalty_withdrawals_enabled,
            fee_receiver,
        );
        self.init_boost(boost_config);
        self.init_emission_schedule(
            fixed_initial_amounts,
            initial_per_epoch_pct,
            pct_schedule,
            claim_lock,
        );
        self.init_vault(allowances);
        self.init_admin_voting(guardian, min_create_proposal_pct, passing_pct);
    }

    #[upgrade]
    fn upgrade(&self) {}

    // ========================================================
    // ENDPOINT: withdrawWithPenalty
    // Early exit from a running position. Votes cast this epoch
    // used the pre-withdrawal weight, so they are dropped.
    // ========================================================

    #[endpoint(withdrawWithPenalty)]
    fn withdraw_with_penalty(&self, unlock_epoch: u64, units: u64) -> BigUint {
        let caller = self.blockchain().get_caller();
        let current = self.current_epoch();
        if !self.account_votes(&caller, current).is_empty() {
            self.clear_account_votes(&caller, current);
            self.clear_votes_event(&caller, current);
        }

        self.withdraw_position_with_penalty(&caller, unlock_epoch, units)
    }
}
