multiversx_sc::imports!();

use crate::{
    errors::{
        ERR_DUPLICATE_RECEIVER, ERR_EPOCH_CLOSED, ERR_EPOCH_NOT_ELAPSED, ERR_EXCEEDS_WEIGHT,
        ERR_NOT_FINALIZED, ERR_NO_LOCK_WEIGHT, ERR_UNKNOWN_RECEIVER, ERR_ZERO_POINTS,
    },
    epoch_clock, locker,
    types::ReceiverVote,
};

/// A voter splits its weight in points out of this many.
pub const MAX_POINTS: u64 = 10_000;

/// Scale of receiver vote fractions: 100% is `VOTE_PCT_PRECISION`.
pub const VOTE_PCT_PRECISION: u64 = 1_000_000_000_000_000_000;

pub fn vote_weight(weight: u64, points: u64) -> u64 {
    (weight as u128 * points as u128 / MAX_POINTS as u128) as u64
}

pub fn vote_pct(receiver_votes: u64, total_votes: u64) -> u64 {
    if total_votes == 0 {
        return 0;
    }
    (receiver_votes as u128 * VOTE_PCT_PRECISION as u128 / total_votes as u128) as u64
}

// ============================================================
// Incentive voting: per-epoch allocation of lock weight
// ============================================================

#[multiversx_sc::module]
pub trait IncentiveVotingModule:
    epoch_clock::EpochClockModule + locker::LockerModule
{
    // ========================================================
    // ENDPOINT: vote
    // Replaces the caller's votes for the open epoch.
    // ========================================================

    #[endpoint(vote)]
    fn vote(&self, epoch: u64, votes: MultiValueEncoded<MultiValue2<u32, u64>>) {
        let caller = self.blockchain().get_caller();
        let current = self.current_epoch();
        require!(epoch == current, ERR_EPOCH_CLOSED);

        let weight = self.project_account_weight(&caller, current);
        require!(weight > 0, ERR_NO_LOCK_WEIGHT);

        let mut ballot: ManagedVec<ReceiverVote> = ManagedVec::new();
        let mut total_points = 0u64;
        for vote in votes {
            let (receiver_id, points) = vote.into_tuple();
            require!(self.is_receiver_active(receiver_id), ERR_UNKNOWN_RECEIVER);
            require!(points > 0, ERR_ZERO_POINTS);
            require!(
                !ballot.iter().any(|cast| cast.receiver_id == receiver_id),
                ERR_DUPLICATE_RECEIVER
            );

            total_points = total_points.saturating_add(points);
            require!(total_points <= MAX_POINTS, ERR_EXCEEDS_WEIGHT);

            ballot.push(ReceiverVote {
                receiver_id,
                points,
                weight: vote_weight(weight, points),
            });
        }

        self.clear_account_votes(&caller, current);

        let mut stored = self.account_votes(&caller, current);
        let mut cast_weight = 0u64;
        for cast in ballot.iter() {
            self.receiver_epoch_votes(cast.receiver_id, current)
                .update(|v| *v += cast.weight);
            cast_weight += cast.weight;
            stored.push(&ReceiverVote {
                receiver_id: cast.receiver_id,
                points: cast.points,
                weight: cast.weight,
            });
        }
        self.epoch_total_votes(current)
            .update(|v| *v += cast_weight);

        self.vote_event(&caller, current, total_points, cast_weight);
    }

    #[endpoint(clearVotes)]
    fn clear_votes(&self) {
        let caller = self.blockchain().get_caller();
        let current = self.current_epoch();
        self.clear_account_votes(&caller, current);
        self.clear_votes_event(&caller, current);
    }

    /// Freezes the tally of an elapsed epoch. Returns `false` if it was
    /// already frozen.
    #[endpoint(finalizeEpoch)]
    fn finalize_epoch(&self, epoch: u64) -> bool {
        require!(epoch < self.current_epoch(), ERR_EPOCH_NOT_ELAPSED);
        if self.epoch_finalized(epoch).get() {
            return false;
        }

        self.epoch_finalized(epoch).set(true);
        self.epoch_finalized_event(epoch, self.epoch_total_votes(epoch).get());
        true
    }

    fn clear_account_votes(&self, account: &ManagedAddress, epoch: u64) {
        let mut votes = self.account_votes(account, epoch);
        if votes.is_empty() {
            return;
        }

        let mut cleared = 0u64;
        for cast in votes.iter() {
            self.receiver_epoch_votes(cast.receiver_id, epoch)
                .update(|v| *v -= cast.weight);
            cleared += cast.weight;
        }
        self.epoch_total_votes(epoch).update(|v| *v -= cleared);
        votes.clear();
    }

    fn account_receiver_vote_weight(
        &self,
        account: &ManagedAddress,
        epoch: u64,
        receiver_id: u32,
    ) -> u64 {
        self.account_votes(account, epoch)
            .iter()
            .find(|cast| cast.receiver_id == receiver_id)
            .map(|cast| cast.weight)
            .unwrap_or_default()
    }

    fn is_receiver_active(&self, receiver_id: u32) -> bool {
        receiver_id >= 1
            && receiver_id <= self.receiver_count().get()
            && self.receiver_active(receiver_id).get()
    }

    fn set_receiver_active_internal(&self, receiver_id: u32, active: bool) {
        require!(
            receiver_id >= 1 && receiver_id <= self.receiver_count().get(),
            ERR_UNKNOWN_RECEIVER
        );
        self.receiver_active(receiver_id).set(active);
        self.receiver_active_event(receiver_id, active);
    }

    // ========================================================
    // OWNER: receivers
    // ========================================================

    #[only_owner]
    #[endpoint(registerReceiver)]
    fn register_receiver(&self, description: ManagedBuffer) -> u32 {
        let receiver_id = self.receiver_count().get() + 1;
        self.receiver_count().set(receiver_id);
        self.receiver_description(receiver_id).set(&description);
        self.receiver_active(receiver_id).set(true);

        self.receiver_registered_event(receiver_id, &description);
        receiver_id
    }

    #[only_owner]
    #[endpoint(setReceiverActive)]
    fn set_receiver_active(&self, receiver_id: u32, active: bool) {
        self.set_receiver_active_internal(receiver_id, active);
    }

    // ========================================================
    // VIEWS
    // ========================================================

    /// Receiver's share of the epoch's votes, scaled by
    /// `VOTE_PCT_PRECISION`.
    #[view(getReceiverVotePct)]
    fn get_receiver_vote_pct(&self, epoch: u64, receiver_id: u32) -> u64 {
        require!(self.epoch_finalized(epoch).get(), ERR_NOT_FINALIZED);
        vote_pct(
            self.receiver_epoch_votes(receiver_id, epoch).get(),
            self.epoch_total_votes(epoch).get(),
        )
    }

    #[view(getAccountVotes)]
    fn get_account_votes(
        &self,
        account: ManagedAddress,
        epoch: u64,
    ) -> MultiValueEncoded<ReceiverVote> {
        let mut result = MultiValueEncoded::new();
        for cast in self.account_votes(&account, epoch).iter() {
            result.push(cast);
        }
        result
    }

    #[view(isReceiverActive)]
    fn get_is_receiver_active(&self, receiver_id: u32) -> bool {
        self.is_receiver_active(receiver_id)
    }

    // ========================================================
    // EVENTS
    // ========================================================

    #[event("vote")]
    fn vote_event(
        &self,
        #[indexed] account: &ManagedAddress,
        #[indexed] epoch: u64,
        #[indexed] points: u64,
        weight: u64,
    );

    #[event("clearVotes")]
    fn clear_votes_event(&self, #[indexed] account: &ManagedAddress, #[indexed] epoch: u64);

    #[event("epochFinalized")]
    fn epoch_finalized_event(&self, #[indexed] epoch: u64, total_votes: u64);

    #[event("receiverRegistered")]
    fn receiver_registered_event(&self, #[indexed] receiver_id: u32, description: &ManagedBuffer);

    #[event("receiverActive")]
    fn receiver_active_event(&self, #[indexed] receiver_id: u32, #[indexed] active: bool);

    // ========================================================
    // STORAGE
    // ========================================================

    // ── Receivers ──

    #[view(getReceiverCount)]
    #[storage_mapper("receiverCount")]
    fn receiver_count(&self) -> SingleValueMapper<u32>;

    #[storage_mapper("receiverActive")]
    fn receiver_active(&self, receiver_id: u32) -> SingleValueMapper<bool>;

    #[view(getReceiverDescription)]
    #[storage_mapper("receiverDescription")]
    fn receiver_description(&self, receiver_id: u32) -> SingleValueMapper<ManagedBuffer>;

    // ── Votes ──

    #[storage_mapper("accountVotes")]
    fn account_votes(&self, account: &ManagedAddress, epoch: u64) -> VecMapper<ReceiverVote>;

    #[view(getReceiverVotes)]
    #[storage_mapper("receiverEpochVotes")]
    fn receiver_epoch_votes(&self, receiver_id: u32, epoch: u64) -> SingleValueMapper<u64>;

    #[view(getEpochTotalVotes)]
    #[storage_mapper("epochTotalVotes")]
    fn epoch_total_votes(&self, epoch: u64) -> SingleValueMapper<u64>;

    #[view(isEpochFinalized)]
    #[storage_mapper("epochFinalized")]
    fn epoch_finalized(&self, epoch: u64) -> SingleValueMapper<bool>;
}
