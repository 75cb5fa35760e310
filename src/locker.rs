multiversx_sc::imports!();

use crate::{
    epoch_clock,
    errors::{
        ERR_FUTURE_EPOCH, ERR_INSUFFICIENT_BALANCE, ERR_INVALID_DURATION, ERR_INVALID_EXTENSION,
        ERR_INVALID_LOCK_AMOUNT, ERR_INVALID_LOCK_RATIO, ERR_LOCK_EXPIRED,
        ERR_NOTHING_TO_WITHDRAW, ERR_PENALTY_WITHDRAWALS_DISABLED, ERR_WEIGHT_OVERFLOW,
        ERR_WRONG_TOKEN,
    },
    types::WeightCheckpoint,
    weight_math,
};

/// Longest lock, in epochs. Also the denominator of the early-withdrawal
/// penalty.
pub const MAX_LOCK_EPOCHS: u64 = 52;

// ============================================================
// Token locker: lock positions and decaying lock weight
// ============================================================

#[multiversx_sc::module]
pub trait LockerModule: epoch_clock::EpochClockModule {
    fn init_locker(
        &self,
        gov_token_id: TokenIdentifier,
        lock_to_token_ratio: BigUint,
        penalty_withdrawals_enabled: bool,
        fee_receiver: ManagedAddress,
    ) {
        require!(gov_token_id.is_valid_esdt_identifier(), ERR_WRONG_TOKEN);
        require!(lock_to_token_ratio > 0u64, ERR_INVALID_LOCK_RATIO);

        self.gov_token_id().set(&gov_token_id);
        self.lock_to_token_ratio().set(&lock_to_token_ratio);
        self.penalty_withdrawals_enabled()
            .set(penalty_withdrawals_enabled);
        self.fee_receiver().set(&fee_receiver);
    }

    // ========================================================
    // ENDPOINT: lock
    // Payment must be a whole number of lock units.
    // ========================================================

    #[payable("*")]
    #[endpoint(lock)]
    fn lock(&self, epochs: u64) {
        let caller = self.blockchain().get_caller();
        let payment = self.call_value().single_esdt();
        require!(
            payment.token_identifier == self.gov_token_id().get(),
            ERR_WRONG_TOKEN
        );

        let units = self.tokens_to_units(&payment.amount);
        self.lock_units(&caller, units, epochs);
    }

    // ========================================================
    // ENDPOINT: extendLock
    // Moves `units` of the position ending in `epochs` epochs so
    // that it ends in `new_epochs` epochs instead.
    // ========================================================

    #[endpoint(extendLock)]
    fn extend_lock(&self, units: u64, epochs: u64, new_epochs: u64) {
        require!(epochs > 0, ERR_INVALID_DURATION);
        require!(new_epochs > epochs, ERR_INVALID_EXTENSION);
        require!(new_epochs <= MAX_LOCK_EPOCHS, ERR_INVALID_DURATION);
        require!(units > 0, ERR_INVALID_LOCK_AMOUNT);

        let caller = self.blockchain().get_caller();
        let current = self.current_epoch();
        let unlock_epoch = current + epochs;
        let new_unlock_epoch = current + new_epochs;
        require!(
            self.account_epoch_unlocks(&caller, unlock_epoch).get() >= units,
            ERR_INSUFFICIENT_BALANCE
        );

        let added = self.checked_weight(units, new_epochs - epochs);
        let mut account_state = self.sync_account(&caller);
        let mut total_state = self.sync_total();
        account_state.weight = self.checked_add_weight(account_state.weight, added);
        total_state.weight = self.checked_add_weight(total_state.weight, added);

        self.account_epoch_unlocks(&caller, unlock_epoch)
            .update(|u| *u -= units);
        self.account_epoch_unlocks(&caller, new_unlock_epoch)
            .update(|u| *u += units);
        self.total_epoch_unlocks(unlock_epoch).update(|u| *u -= units);
        self.total_epoch_unlocks(new_unlock_epoch)
            .update(|u| *u += units);

        self.save_account_checkpoint(&caller, &account_state);
        self.save_total_checkpoint(&total_state);

        self.extend_lock_event(&caller, unlock_epoch, new_unlock_epoch, units);
    }

    // ========================================================
    // ENDPOINT: withdrawExpiredLocks
    // Pays out fully decayed positions, or locks them again for
    // `relock_epochs` when non-zero.
    // ========================================================

    #[endpoint(withdrawExpiredLocks)]
    fn withdraw_expired_locks(&self, relock_epochs: u64) -> BigUint {
        let caller = self.blockchain().get_caller();
        self.sync_account(&caller);

        let unlocked = self.account_unlocked(&caller).get();
        require!(unlocked > 0, ERR_NOTHING_TO_WITHDRAW);
        self.account_unlocked(&caller).clear();

        if relock_epochs > 0 {
            self.lock_units(&caller, unlocked, relock_epochs);
            return BigUint::zero();
        }

        let amount = self.units_to_tokens(unlocked);
        self.send()
            .direct_esdt(&caller, &self.gov_token_id().get(), 0, &amount);
        self.withdraw_event(&caller, unlocked, &amount);

        amount
    }

    // ========================================================
    // INTERNAL: lock bookkeeping
    // ========================================================

    fn lock_units(&self, account: &ManagedAddress, units: u64, epochs: u64) {
        require!(
            epochs > 0 && epochs <= MAX_LOCK_EPOCHS,
            ERR_INVALID_DURATION
        );
        require!(units > 0, ERR_INVALID_LOCK_AMOUNT);

        let weight = self.checked_weight(units, epochs);
        let unlock_epoch = self.current_epoch() + epochs;

        let mut account_state = self.sync_account(account);
        let mut total_state = self.sync_total();
        account_state.weight = self.checked_add_weight(account_state.weight, weight);
        account_state.locked += units;
        total_state.weight = self.checked_add_weight(total_state.weight, weight);
        total_state.locked += units;

        self.account_epoch_unlocks(account, unlock_epoch)
            .update(|u| *u += units);
        self.total_epoch_unlocks(unlock_epoch)
            .update(|u| *u += units);

        self.save_account_checkpoint(account, &account_state);
        self.save_total_checkpoint(&total_state);

        self.lock_event(account, unlock_epoch, units);
    }

    /// Removes `units` from the running position ending at
    /// `unlock_epoch` and pays them out, minus a penalty proportional to
    /// the epochs left. Returns the amount sent to `account`.
    fn withdraw_position_with_penalty(
        &self,
        account: &ManagedAddress,
        unlock_epoch: u64,
        units: u64,
    ) -> BigUint {
        require!(
            self.penalty_withdrawals_enabled().get(),
            ERR_PENALTY_WITHDRAWALS_DISABLED
        );
        require!(units > 0, ERR_INVALID_LOCK_AMOUNT);

        let current = self.current_epoch();
        require!(unlock_epoch > current, ERR_LOCK_EXPIRED);
        require!(
            self.account_epoch_unlocks(account, unlock_epoch).get() >= units,
            ERR_INSUFFICIENT_BALANCE
        );

        let remaining = unlock_epoch - current;
        let removed = units * remaining;

        let mut account_state = self.sync_account(account);
        let mut total_state = self.sync_total();
        account_state.weight -= removed;
        account_state.locked -= units;
        total_state.weight -= removed;
        total_state.locked -= units;

        self.account_epoch_unlocks(account, unlock_epoch)
            .update(|u| *u -= units);
        self.total_epoch_unlocks(unlock_epoch)
            .update(|u| *u -= units);

        self.save_account_checkpoint(account, &account_state);
        self.save_total_checkpoint(&total_state);

        let gross = self.units_to_tokens(units);
        let penalty = &gross * remaining / MAX_LOCK_EPOCHS;
        let net = &gross - &penalty;

        let token_id = self.gov_token_id().get();
        if penalty > 0u64 {
            self.send()
                .direct_esdt(&self.fee_receiver().get(), &token_id, 0, &penalty);
        }
        if net > 0u64 {
            self.send().direct_esdt(account, &token_id, 0, &net);
        }

        self.penalty_withdraw_event(account, unlock_epoch, units, &penalty);

        net
    }

    /// Rolls the account's history forward to the current epoch and
    /// records a checkpoint for it. Units whose lock ended on the way move
    /// to the withdrawable balance.
    fn sync_account(&self, account: &ManagedAddress) -> WeightCheckpoint {
        let current = self.current_epoch();
        let mut history = self.account_weight_history(account);
        let len = history.len();
        if len == 0 {
            return WeightCheckpoint {
                epoch: current,
                ..Default::default()
            };
        }

        let last = history.get(len);
        if last.epoch == current {
            return last;
        }

        let (state, released) = weight_math::project(&last, current, |epoch| {
            self.account_epoch_unlocks(account, epoch).get()
        });
        if released > 0 {
            self.account_unlocked(account).update(|u| *u += released);
        }
        history.push(&state);

        state
    }

    fn sync_total(&self) -> WeightCheckpoint {
        let current = self.current_epoch();
        let mut history = self.total_weight_history();
        let len = history.len();
        if len == 0 {
            return WeightCheckpoint {
                epoch: current,
                ..Default::default()
            };
        }

        let last = history.get(len);
        if last.epoch == current {
            return last;
        }

        let (state, _) =
            weight_math::project(&last, current, |epoch| self.total_epoch_unlocks(epoch).get());
        history.push(&state);

        state
    }

    fn save_account_checkpoint(&self, account: &ManagedAddress, state: &WeightCheckpoint) {
        let mut history = self.account_weight_history(account);
        let len = history.len();
        if len > 0 && history.get(len).epoch == state.epoch {
            history.set(len, state);
        } else {
            history.push(state);
        }
    }

    fn save_total_checkpoint(&self, state: &WeightCheckpoint) {
        let mut history = self.total_weight_history();
        let len = history.len();
        if len > 0 && history.get(len).epoch == state.epoch {
            history.set(len, state);
        } else {
            history.push(state);
        }
    }

    /// Account weight at any epoch, past or projected.
    fn project_account_weight(&self, account: &ManagedAddress, epoch: u64) -> u64 {
        let history = self.account_weight_history(account);
        match weight_math::find_checkpoint(history.len(), epoch, |i| history.get(i).epoch) {
            Some(index) => {
                let (state, _) = weight_math::project(&history.get(index), epoch, |e| {
                    self.account_epoch_unlocks(account, e).get()
                });
                state.weight
            }
            None => 0,
        }
    }

    fn project_total_weight(&self, epoch: u64) -> u64 {
        let history = self.total_weight_history();
        match weight_math::find_checkpoint(history.len(), epoch, |i| history.get(i).epoch) {
            Some(index) => {
                let (state, _) = weight_math::project(&history.get(index), epoch, |e| {
                    self.total_epoch_unlocks(e).get()
                });
                state.weight
            }
            None => 0,
        }
    }

    fn account_weight_at(&self, account: &ManagedAddress, epoch: u64) -> u64 {
        require!(epoch <= self.current_epoch(), ERR_FUTURE_EPOCH);
        self.project_account_weight(account, epoch)
    }

    fn total_weight_at(&self, epoch: u64) -> u64 {
        require!(epoch <= self.current_epoch(), ERR_FUTURE_EPOCH);
        self.project_total_weight(epoch)
    }

    fn tokens_to_units(&self, amount: &BigUint) -> u64 {
        let ratio = self.lock_to_token_ratio().get();
        let units = amount / &ratio;
        require!(&units * &ratio == *amount, ERR_INVALID_LOCK_AMOUNT);

        match units.to_u64() {
            Some(units) if units > 0 => units,
            _ => sc_panic!(ERR_INVALID_LOCK_AMOUNT),
        }
    }

    fn units_to_tokens(&self, units: u64) -> BigUint {
        BigUint::from(units) * self.lock_to_token_ratio().get()
    }

    fn checked_weight(&self, units: u64, epochs: u64) -> u64 {
        match weight_math::lock_weight(units, epochs) {
            Some(weight) => weight,
            None => sc_panic!(ERR_WEIGHT_OVERFLOW),
        }
    }

    fn checked_add_weight(&self, weight: u64, added: u64) -> u64 {
        match weight.checked_add(added) {
            Some(weight) => weight,
            None => sc_panic!(ERR_WEIGHT_OVERFLOW),
        }
    }

    fn set_penalty_withdrawals_enabled_internal(&self, enabled: bool) {
        self.penalty_withdrawals_enabled().set(enabled);
        self.penalty_withdrawals_enabled_event(enabled);
    }

    // ========================================================
    // OWNER: configuration
    // ========================================================

    #[only_owner]
    #[endpoint(setPenaltyWithdrawalsEnabled)]
    fn set_penalty_withdrawals_enabled(&self, enabled: bool) {
        self.set_penalty_withdrawals_enabled_internal(enabled);
    }

    #[only_owner]
    #[endpoint(setFeeReceiver)]
    fn set_fee_receiver(&self, fee_receiver: ManagedAddress) {
        self.fee_receiver().set(&fee_receiver);
        self.fee_receiver_event(&fee_receiver);
    }

    // ========================================================
    // VIEWS
    // ========================================================

    #[view(getAccountWeightAt)]
    fn get_account_weight_at(&self, account: ManagedAddress, epoch: u64) -> u64 {
        self.account_weight_at(&account, epoch)
    }

    #[view(getTotalWeightAt)]
    fn get_total_weight_at(&self, epoch: u64) -> u64 {
        self.total_weight_at(epoch)
    }

    #[view(getAccountWeight)]
    fn get_account_weight(&self, account: ManagedAddress) -> u64 {
        self.project_account_weight(&account, self.current_epoch())
    }

    #[view(getTotalWeight)]
    fn get_total_weight(&self) -> u64 {
        self.project_total_weight(self.current_epoch())
    }

    /// Weight the account will have at `epoch` if it does nothing else.
    #[view(getProjectedAccountWeight)]
    fn get_projected_account_weight(&self, account: ManagedAddress, epoch: u64) -> u64 {
        self.project_account_weight(&account, epoch)
    }

    /// `(locked, unlocked)` lock units as of the current epoch.
    #[view(getAccountBalances)]
    fn get_account_balances(&self, account: ManagedAddress) -> MultiValue2<u64, u64> {
        let current = self.current_epoch();
        let history = self.account_weight_history(&account);
        let len = history.len();
        let mut unlocked = self.account_unlocked(&account).get();
        if len == 0 {
            return (0u64, unlocked).into();
        }

        let (state, released) = weight_math::project(&history.get(len), current, |epoch| {
            self.account_epoch_unlocks(&account, epoch).get()
        });
        unlocked += released;
        (state.locked, unlocked).into()
    }

    /// `(epochs_to_unlock, units)` for every running position.
    #[view(getAccountActiveLocks)]
    fn get_account_active_locks(
        &self,
        account: ManagedAddress,
    ) -> MultiValueEncoded<MultiValue2<u64, u64>> {
        let mut result = MultiValueEncoded::new();
        let current = self.current_epoch();
        for epochs in 1..=MAX_LOCK_EPOCHS {
            let units = self.account_epoch_unlocks(&account, current + epochs).get();
            if units > 0 {
                result.push((epochs, units).into());
            }
        }
        result
    }

    #[view(getAccountCheckpoints)]
    fn get_account_checkpoints(
        &self,
        account: ManagedAddress,
    ) -> MultiValueEncoded<WeightCheckpoint> {
        let mut result = MultiValueEncoded::new();
        for checkpoint in self.account_weight_history(&account).iter() {
            result.push(checkpoint);
        }
        result
    }

    // ========================================================
    // EVENTS
    // ========================================================

    #[event("lock")]
    fn lock_event(
        &self,
        #[indexed] account: &ManagedAddress,
        #[indexed] unlock_epoch: u64,
        units: u64,
    );

    #[event("extendLock")]
    fn extend_lock_event(
        &self,
        #[indexed] account: &ManagedAddress,
        #[indexed] from_unlock_epoch: u64,
        #[indexed] to_unlock_epoch: u64,
        units: u64,
    );

    #[event("withdraw")]
    fn withdraw_event(
        &self,
        #[indexed] account: &ManagedAddress,
        #[indexed] units: u64,
        amount: &BigUint,
    );

    #[event("penaltyWithdraw")]
    fn penalty_withdraw_event(
        &self,
        #[indexed] account: &ManagedAddress,
        #[indexed] unlock_epoch: u64,
        #[indexed] units: u64,
        penalty: &BigUint,
    );

    #[event("penaltyWithdrawalsEnabled")]
    fn penalty_withdrawals_enabled_event(&self, #[indexed] enabled: bool);

    #[event("feeReceiverSet")]
    fn fee_receiver_event(&self, #[indexed] fee_receiver: &ManagedAddress);

    // ========================================================
    // STORAGE
    // ========================================================

    // ── Configuration ──

    #[view(getGovTokenId)]
    #[storage_mapper("govTokenId")]
    fn gov_token_id(&self) -> SingleValueMapper<TokenIdentifier>;

    #[view(getLockToTokenRatio)]
    #[storage_mapper("lockToTokenRatio")]
    fn lock_to_token_ratio(&self) -> SingleValueMapper<BigUint>;

    #[view(isPenaltyWithdrawalEnabled)]
    #[storage_mapper("penaltyWithdrawalsEnabled")]
    fn penalty_withdrawals_enabled(&self) -> SingleValueMapper<bool>;

    #[view(getFeeReceiver)]
    #[storage_mapper("feeReceiver")]
    fn fee_receiver(&self) -> SingleValueMapper<ManagedAddress>;

    // ── Per-account ──

    #[storage_mapper("accountWeightHistory")]
    fn account_weight_history(&self, account: &ManagedAddress) -> VecMapper<WeightCheckpoint>;

    #[storage_mapper("accountEpochUnlocks")]
    fn account_epoch_unlocks(&self, account: &ManagedAddress, epoch: u64)
        -> SingleValueMapper<u64>;

    /// Expired units not yet withdrawn, as of the last checkpoint.
    #[storage_mapper("accountUnlocked")]
    fn account_unlocked(&self, account: &ManagedAddress) -> SingleValueMapper<u64>;

    // ── Global ──

    #[storage_mapper("totalWeightHistory")]
    fn total_weight_history(&self) -> VecMapper<WeightCheckpoint>;

    #[storage_mapper("totalEpochUnlocks")]
    fn total_epoch_unlocks(&self, epoch: u64) -> SingleValueMapper<u64>;
}
