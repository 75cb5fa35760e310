multiversx_sc::imports!();

use crate::{
    boost, emission_schedule, epoch_clock,
    errors::{
        ERR_ALREADY_CLAIMED, ERR_DUPLICATE_ALLOWANCE, ERR_EPOCH_NOT_FINALIZED,
        ERR_INSUFFICIENT_BALANCE, ERR_NOTHING_TO_CLAIM, ERR_NO_ALLOWANCE,
        ERR_NO_VOTES_FOR_RECEIVER, ERR_WEIGHT_OVERFLOW, ERR_WRONG_TOKEN,
    },
    incentive_voting, locker,
    types::EpochState,
};

// ============================================================
// Emission vault: epoch rollover, claims and allowances
// ============================================================

#[multiversx_sc::module]
pub trait VaultModule:
    epoch_clock::EpochClockModule
    + locker::LockerModule
    + boost::BoostModule
    + emission_schedule::EmissionScheduleModule
    + incentive_voting::IncentiveVotingModule
{
    fn init_vault(&self, allowances: MultiValueEncoded<MultiValue2<ManagedAddress, BigUint>>) {
        for allowance in allowances {
            let (account, amount) = allowance.into_tuple();
            require!(self.allowance(&account).is_empty(), ERR_DUPLICATE_ALLOWANCE);
            self.allowance(&account).set(&amount);
            self.allowance_granted_event(&account, &amount);
        }
    }

    // ========================================================
    // ENDPOINT: depositEmissionSupply
    // ========================================================

    #[only_owner]
    #[payable("*")]
    #[endpoint(depositEmissionSupply)]
    fn deposit_emission_supply(&self) {
        let payment = self.call_value().single_esdt();
        require!(
            payment.token_identifier == self.gov_token_id().get(),
            ERR_WRONG_TOKEN
        );

        self.unallocated_supply()
            .update(|supply| *supply += &payment.amount);
        self.supply_deposited_event(&payment.amount);
    }

    // ========================================================
    // ENDPOINT: processEmissions
    // Rolls every elapsed epoch over in order: freezes its votes
    // and takes its emissions out of the undistributed supply.
    // Returns the number of epochs processed.
    // ========================================================

    #[endpoint(processEmissions)]
    fn process_emissions(&self) -> u64 {
        let current = self.current_epoch();
        let first = self.next_emission_epoch().get();
        if first >= current {
            return 0;
        }

        let mut unallocated = self.unallocated_supply().get();
        for epoch in first..current {
            self.finalize_epoch(epoch);

            // nobody voted, nothing to apportion
            let emissions = if self.epoch_total_votes(epoch).get() > 0 {
                self.emissions_for_epoch(epoch, &unallocated)
            } else {
                BigUint::zero()
            };

            unallocated -= &emissions;
            self.epoch_emissions(epoch).set(&emissions);
            self.emissions_allocated_event(epoch, &emissions);
        }

        self.unallocated_supply().set(&unallocated);
        self.next_emission_epoch().set(current);

        current - first
    }

    // ========================================================
    // ENDPOINT: claim
    // Pro-rata share of a receiver's allocation for a finalized
    // epoch, boosted, and locked when lock-on-claim applies.
    // Whatever the boost does not pay goes back to the supply.
    // ========================================================

    #[endpoint(claim)]
    fn claim(&self, epoch: u64, receiver_id: u32) -> BigUint {
        self.process_emissions();

        let caller = self.blockchain().get_caller();
        let current = self.current_epoch();
        require!(epoch < current, ERR_EPOCH_NOT_FINALIZED);
        require!(
            !self.claimed(&caller, epoch, receiver_id).get(),
            ERR_ALREADY_CLAIMED
        );

        let share = self.claimable_share(&caller, epoch, receiver_id);
        require!(share > 0u64, ERR_NOTHING_TO_CLAIM);

        let epoch_emissions = self.epoch_emissions(epoch).get();
        let outcome = self.apply_boost(&caller, epoch, &share, &epoch_emissions);
        let payout = outcome.boosted_amount;

        self.claimed(&caller, epoch, receiver_id).set(true);
        let forfeited = &share - &payout;
        if forfeited > 0u64 {
            self.unallocated_supply()
                .update(|supply| *supply += &forfeited);
        }

        let mut transfer = payout.clone();
        let mut locked_units = 0u64;
        let lock_epochs = self.claim_lock_duration(current);
        if lock_epochs > 0 {
            let ratio = self.lock_to_token_ratio().get();
            locked_units = match (&payout / &ratio).to_u64() {
                Some(units) => units,
                None => sc_panic!(ERR_WEIGHT_OVERFLOW),
            };
            if locked_units > 0 {
                self.lock_units(&caller, locked_units, lock_epochs);
                transfer -= ratio * locked_units;
            }
        }

        if transfer > 0u64 {
            self.send()
                .direct_esdt(&caller, &self.gov_token_id().get(), 0, &transfer);
        }

        self.claim_event(
            &caller,
            epoch,
            receiver_id,
            outcome.multiplier,
            locked_units,
            &payout,
        );

        payout
    }

    // ========================================================
    // ENDPOINT: claimAllowance
    // One-off grant outside the emission schedule.
    // ========================================================

    #[endpoint(claimAllowance)]
    fn claim_allowance(&self) -> BigUint {
        self.process_emissions();

        let caller = self.blockchain().get_caller();
        let amount = self.allowance(&caller).get();
        require!(amount > 0u64, ERR_NO_ALLOWANCE);

        let unallocated = self.unallocated_supply().get();
        require!(unallocated >= amount, ERR_INSUFFICIENT_BALANCE);

        self.unallocated_supply().set(&unallocated - &amount);
        self.allowance(&caller).clear();

        self.send()
            .direct_esdt(&caller, &self.gov_token_id().get(), 0, &amount);
        self.allowance_claimed_event(&caller, &amount);

        amount
    }

    // ========================================================
    // INTERNAL: allocation arithmetic
    // ========================================================

    fn receiver_allocation(&self, epoch: u64, receiver_id: u32) -> BigUint {
        let total_votes = self.epoch_total_votes(epoch).get();
        if total_votes == 0 {
            return BigUint::zero();
        }

        let receiver_votes = self.receiver_epoch_votes(receiver_id, epoch).get();
        self.epoch_emissions(epoch).get() * receiver_votes / total_votes
    }

    fn claimable_share(&self, account: &ManagedAddress, epoch: u64, receiver_id: u32) -> BigUint {
        let account_votes = self.account_receiver_vote_weight(account, epoch, receiver_id);
        require!(account_votes > 0, ERR_NO_VOTES_FOR_RECEIVER);

        let receiver_votes = self.receiver_epoch_votes(receiver_id, epoch).get();
        self.receiver_allocation(epoch, receiver_id) * account_votes / receiver_votes
    }

    fn epoch_state(&self, epoch: u64) -> EpochState {
        if epoch >= self.current_epoch() {
            EpochState::Open
        } else if epoch >= self.next_emission_epoch().get() {
            EpochState::Finalizing
        } else {
            EpochState::Distributed
        }
    }

    // ========================================================
    // VIEWS
    // ========================================================

    #[view(getEpochState)]
    fn get_epoch_state(&self, epoch: u64) -> EpochState {
        self.epoch_state(epoch)
    }

    #[view(getReceiverAllocation)]
    fn get_receiver_allocation(&self, epoch: u64, receiver_id: u32) -> BigUint {
        self.receiver_allocation(epoch, receiver_id)
    }

    /// `(share, boosted_amount)` the account can claim now, zero when the
    /// epoch is not distributed or the claim was made.
    #[view(getClaimableAmount)]
    fn get_claimable_amount(
        &self,
        account: ManagedAddress,
        epoch: u64,
        receiver_id: u32,
    ) -> MultiValue2<BigUint, BigUint> {
        if self.epoch_state(epoch) != EpochState::Distributed
            || self.claimed(&account, epoch, receiver_id).get()
            || self.account_receiver_vote_weight(&account, epoch, receiver_id) == 0
        {
            return (BigUint::zero(), BigUint::zero()).into();
        }

        let share = self.claimable_share(&account, epoch, receiver_id);
        if share == 0u64 {
            return (BigUint::zero(), BigUint::zero()).into();
        }

        let previous = self.account_epoch_claimed(&account, epoch).get();
        let epoch_emissions = self.epoch_emissions(epoch).get();
        match self.capped_boost(&account, epoch, &share, &previous, &epoch_emissions) {
            Ok((_, outcome)) => (share, outcome.boosted_amount).into(),
            Err(_) => (share, BigUint::zero()).into(),
        }
    }

    // ========================================================
    // EVENTS
    // ========================================================

    #[event("supplyDeposited")]
    fn supply_deposited_event(&self, amount: &BigUint);

    #[event("emissionsAllocated")]
    fn emissions_allocated_event(&self, #[indexed] epoch: u64, amount: &BigUint);

    #[event("claim")]
    fn claim_event(
        &self,
        #[indexed] account: &ManagedAddress,
        #[indexed] epoch: u64,
        #[indexed] receiver_id: u32,
        #[indexed] multiplier: u64,
        #[indexed] locked_units: u64,
        amount: &BigUint,
    );

    #[event("allowanceGranted")]
    fn allowance_granted_event(&self, #[indexed] account: &ManagedAddress, amount: &BigUint);

    #[event("allowanceClaimed")]
    fn allowance_claimed_event(&self, #[indexed] account: &ManagedAddress, amount: &BigUint);

    // ========================================================
    // STORAGE
    // ========================================================

    #[view(getUnallocatedSupply)]
    #[storage_mapper("unallocatedSupply")]
    fn unallocated_supply(&self) -> SingleValueMapper<BigUint>;

    /// First epoch not rolled over yet.
    #[view(getNextEmissionEpoch)]
    #[storage_mapper("nextEmissionEpoch")]
    fn next_emission_epoch(&self) -> SingleValueMapper<u64>;

    #[view(getEpochEmissions)]
    #[storage_mapper("epochEmissions")]
    fn epoch_emissions(&self, epoch: u64) -> SingleValueMapper<BigUint>;

    #[view(hasClaimed)]
    #[storage_mapper("claimed")]
    fn claimed(
        &self,
        account: &ManagedAddress,
        epoch: u64,
        receiver_id: u32,
    ) -> SingleValueMapper<bool>;

    #[view(getAllowance)]
    #[storage_mapper("allowance")]
    fn allowance(&self, account: &ManagedAddress) -> SingleValueMapper<BigUint>;
}
