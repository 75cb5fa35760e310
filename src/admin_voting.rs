multiversx_sc::imports!();

use crate::{
    boost, emission_schedule,
    emission_schedule::MAX_PCT,
    epoch_clock,
    errors::{
        ERR_ALREADY_EXECUTED, ERR_ALREADY_VOTED, ERR_INSUFFICIENT_PROPOSAL_WEIGHT,
        ERR_INVALID_THRESHOLDS, ERR_INVALID_VOTING_PERIOD, ERR_NOT_GUARDIAN, ERR_NOT_VETOABLE,
        ERR_NO_LOCK_WEIGHT, ERR_NO_SNAPSHOT_EPOCH, ERR_PROPOSAL_FAILED, ERR_PROPOSAL_NOT_ACTIVE,
        ERR_PROPOSAL_NOT_FOUND, ERR_VETOED, ERR_VOTING_CLOSED, ERR_VOTING_STILL_OPEN,
    },
    incentive_voting, locker,
    types::{Proposal, ProposalAction, ProposalStatus},
};

/// Longest voting window the owner can set: ten years, in seconds.
pub const MAX_VOTING_PERIOD: u64 = 10 * 365 * 24 * 60 * 60;

/// `weight` is at least `create_pct` (out of `MAX_PCT`) of `total`, compared
/// without rounding.
pub fn meets_create_threshold(weight: u64, total: u64, create_pct: u64) -> bool {
    weight as u128 * MAX_PCT as u128 >= total as u128 * create_pct as u128
}

/// Smallest for-weight that is at least `passing_pct` of `total`.
pub fn required_pass_weight(total: u64, passing_pct: u64) -> u64 {
    let scaled = total as u128 * passing_pct as u128;
    scaled.div_ceil(MAX_PCT as u128) as u64
}

// ============================================================
// Admin voting: lock-weight gated proposals
// ============================================================

#[multiversx_sc::module]
pub trait AdminVotingModule:
    epoch_clock::EpochClockModule
    + locker::LockerModule
    + boost::BoostModule
    + emission_schedule::EmissionScheduleModule
    + incentive_voting::IncentiveVotingModule
{
    fn init_admin_voting(
        &self,
        guardian: ManagedAddress,
        min_create_proposal_pct: u64,
        passing_pct: u64,
    ) {
        self.set_guardian_internal(&guardian);
        self.set_proposal_thresholds_internal(min_create_proposal_pct, passing_pct);
        self.voting_period().set(self.epoch_length().get());
    }

    // ========================================================
    // ENDPOINT: createProposal
    // Weights are read at the last fully elapsed epoch, so
    // locking in the open epoch does not buy a proposal.
    // ========================================================

    #[endpoint(createProposal)]
    fn create_proposal(&self, action: ProposalAction<Self::Api>) -> u64 {
        let caller = self.blockchain().get_caller();
        let current = self.current_epoch();
        require!(current > 0, ERR_NO_SNAPSHOT_EPOCH);

        let snapshot_epoch = current - 1;
        let weight = self.project_account_weight(&caller, snapshot_epoch);
        let total_weight = self.project_total_weight(snapshot_epoch);
        require!(
            weight > 0
                && meets_create_threshold(
                    weight,
                    total_weight,
                    self.min_create_proposal_pct().get()
                ),
            ERR_INSUFFICIENT_PROPOSAL_WEIGHT
        );

        let proposal_id = self.proposal_count().get() + 1;
        let now = self.blockchain().get_block_timestamp();
        let voting_ends_at = match now.checked_add(self.voting_period().get()) {
            Some(end) => end,
            None => sc_panic!(ERR_INVALID_VOTING_PERIOD),
        };
        let required_weight = required_pass_weight(total_weight, self.passing_pct().get());

        let proposal = Proposal {
            id: proposal_id,
            proposer: caller.clone(),
            snapshot_epoch,
            created_at: now,
            voting_ends_at,
            total_weight,
            required_weight,
            for_weight: 0,
            against_weight: 0,
            status: ProposalStatus::Active,
            action,
        };

        self.proposals(proposal_id).set(&proposal);
        self.proposal_count().set(proposal_id);

        self.proposal_created_event(proposal_id, &caller, snapshot_epoch, required_weight);

        proposal_id
    }

    // ========================================================
    // ENDPOINT: voteProposal
    // One vote per account, weighted at the snapshot epoch.
    // ========================================================

    #[endpoint(voteProposal)]
    fn vote_proposal(&self, proposal_id: u64, support: bool) {
        let caller = self.blockchain().get_caller();
        let mut proposal = self.require_proposal(proposal_id);
        require!(
            proposal.status == ProposalStatus::Active,
            ERR_PROPOSAL_NOT_ACTIVE
        );
        require!(
            self.blockchain().get_block_timestamp() < proposal.voting_ends_at,
            ERR_VOTING_CLOSED
        );
        require!(
            !self.has_voted(proposal_id, &caller).get(),
            ERR_ALREADY_VOTED
        );

        let weight = self.project_account_weight(&caller, proposal.snapshot_epoch);
        require!(weight > 0, ERR_NO_LOCK_WEIGHT);

        if support {
            proposal.for_weight += weight;
        } else {
            proposal.against_weight += weight;
        }

        self.has_voted(proposal_id, &caller).set(true);
        self.proposals(proposal_id).set(&proposal);

        self.proposal_vote_event(proposal_id, &caller, support, weight);
    }

    // ========================================================
    // ENDPOINT: resolveProposal
    // Anyone can close the window: Active → Passed or Failed.
    // ========================================================

    #[endpoint(resolveProposal)]
    fn resolve_proposal(&self, proposal_id: u64) -> ProposalStatus {
        let mut proposal = self.require_proposal(proposal_id);
        require!(
            proposal.status == ProposalStatus::Active,
            ERR_PROPOSAL_NOT_ACTIVE
        );
        require!(
            self.resolve_if_elapsed(&mut proposal),
            ERR_VOTING_STILL_OPEN
        );

        self.proposals(proposal_id).set(&proposal);
        proposal.status
    }

    // ========================================================
    // ENDPOINT: vetoProposal
    // Guardian only. Stops anything not yet executed or failed.
    // ========================================================

    #[endpoint(vetoProposal)]
    fn veto_proposal(&self, proposal_id: u64) {
        let caller = self.blockchain().get_caller();
        require!(caller == self.guardian().get(), ERR_NOT_GUARDIAN);

        let mut proposal = self.require_proposal(proposal_id);
        self.resolve_if_elapsed(&mut proposal);
        match proposal.status {
            ProposalStatus::Active | ProposalStatus::Passed => {}
            ProposalStatus::Executed => sc_panic!(ERR_ALREADY_EXECUTED),
            ProposalStatus::Vetoed => sc_panic!(ERR_VETOED),
            ProposalStatus::Failed => sc_panic!(ERR_NOT_VETOABLE),
        }

        proposal.status = ProposalStatus::Vetoed;
        self.proposals(proposal_id).set(&proposal);

        self.proposal_vetoed_event(proposal_id, &caller);
    }

    // ========================================================
    // ENDPOINT: executeProposal
    // Anyone can execute a passed proposal, once.
    // ========================================================

    #[endpoint(executeProposal)]
    fn execute_proposal(&self, proposal_id: u64) {
        let mut proposal = self.require_proposal(proposal_id);
        self.resolve_if_elapsed(&mut proposal);
        match proposal.status {
            ProposalStatus::Passed => {}
            ProposalStatus::Active => sc_panic!(ERR_VOTING_STILL_OPEN),
            ProposalStatus::Failed => sc_panic!(ERR_PROPOSAL_FAILED),
            ProposalStatus::Executed => sc_panic!(ERR_ALREADY_EXECUTED),
            ProposalStatus::Vetoed => sc_panic!(ERR_VETOED),
        }

        proposal.status = ProposalStatus::Executed;
        self.proposals(proposal_id).set(&proposal);

        self.execute_action(&proposal.action);
        self.proposal_executed_event(proposal_id, &self.blockchain().get_caller());
    }

    // ========================================================
    // INTERNAL
    // ========================================================

    fn require_proposal(&self, proposal_id: u64) -> Proposal<Self::Api> {
        require!(
            !self.proposals(proposal_id).is_empty(),
            ERR_PROPOSAL_NOT_FOUND
        );
        self.proposals(proposal_id).get()
    }

    /// Settles an Active proposal whose window has closed. Returns whether
    /// the status changed. The caller stores the proposal.
    fn resolve_if_elapsed(&self, proposal: &mut Proposal<Self::Api>) -> bool {
        if proposal.status != ProposalStatus::Active
            || self.blockchain().get_block_timestamp() < proposal.voting_ends_at
        {
            return false;
        }

        if proposal.for_weight >= proposal.required_weight {
            proposal.status = ProposalStatus::Passed;
            self.proposal_passed_event(proposal.id, proposal.for_weight);
        } else {
            proposal.status = ProposalStatus::Failed;
            self.proposal_failed_event(proposal.id, proposal.for_weight);
        }
        true
    }

    fn execute_action(&self, action: &ProposalAction<Self::Api>) {
        match action {
            ProposalAction::SetPenaltyWithdrawalsEnabled(enabled) => {
                self.set_penalty_withdrawals_enabled_internal(*enabled)
            }
            ProposalAction::SetGuardian(guardian) => self.set_guardian_internal(guardian),
            ProposalAction::SetProposalThresholds(create_pct, passing_pct) => {
                self.set_proposal_thresholds_internal(*create_pct, *passing_pct)
            }
            ProposalAction::SetBoostConfig(config) => self.set_boost_config_internal(*config),
            ProposalAction::SetClaimLockConfig(config) => {
                self.set_claim_lock_config_internal(*config)
            }
            ProposalAction::SetReceiverActive(receiver_id, active) => {
                self.set_receiver_active_internal(*receiver_id, *active)
            }
            ProposalAction::ExternalCall(to, endpoint, args, gas_limit) => {
                self.tx()
                    .to(to)
                    .gas(*gas_limit)
                    .raw_call(endpoint.clone())
                    .arguments_raw(ManagedArgBuffer::from(args.clone()))
                    .transfer_execute();
            }
        }
    }

    fn set_guardian_internal(&self, guardian: &ManagedAddress) {
        self.guardian().set(guardian);
        self.guardian_event(guardian);
    }

    fn set_proposal_thresholds_internal(&self, min_create_proposal_pct: u64, passing_pct: u64) {
        require!(
            min_create_proposal_pct <= MAX_PCT && passing_pct > 0 && passing_pct <= MAX_PCT,
            ERR_INVALID_THRESHOLDS
        );
        self.min_create_proposal_pct().set(min_create_proposal_pct);
        self.passing_pct().set(passing_pct);
        self.proposal_thresholds_event(min_create_proposal_pct, passing_pct);
    }

    // ========================================================
    // OWNER: configuration
    // ========================================================

    #[only_owner]
    #[endpoint(setGuardian)]
    fn set_guardian(&self, guardian: ManagedAddress) {
        self.set_guardian_internal(&guardian);
    }

    #[only_owner]
    #[endpoint(setProposalThresholds)]
    fn set_proposal_thresholds(&self, min_create_proposal_pct: u64, passing_pct: u64) {
        self.set_proposal_thresholds_internal(min_create_proposal_pct, passing_pct);
    }

    #[only_owner]
    #[endpoint(setVotingPeriod)]
    fn set_voting_period(&self, voting_period: u64) {
        require!(
            voting_period > 0 && voting_period <= MAX_VOTING_PERIOD,
            ERR_INVALID_VOTING_PERIOD
        );
        self.voting_period().set(voting_period);
        self.voting_period_event(voting_period);
    }

    // ========================================================
    // VIEWS
    // ========================================================

    #[view(getProposal)]
    fn get_proposal(&self, proposal_id: u64) -> Proposal<Self::Api> {
        self.require_proposal(proposal_id)
    }

    /// `(min_create_proposal_pct, passing_pct)`, out of `MAX_PCT`.
    #[view(getProposalThresholds)]
    fn get_proposal_thresholds(&self) -> MultiValue2<u64, u64> {
        (
            self.min_create_proposal_pct().get(),
            self.passing_pct().get(),
        )
            .into()
    }

    // ========================================================
    // EVENTS
    // ========================================================

    #[event("proposalCreated")]
    fn proposal_created_event(
        &self,
        #[indexed] proposal_id: u64,
        #[indexed] proposer: &ManagedAddress,
        #[indexed] snapshot_epoch: u64,
        required_weight: u64,
    );

    #[event("proposalVote")]
    fn proposal_vote_event(
        &self,
        #[indexed] proposal_id: u64,
        #[indexed] voter: &ManagedAddress,
        #[indexed] support: bool,
        weight: u64,
    );

    #[event("proposalPassed")]
    fn proposal_passed_event(&self, #[indexed] proposal_id: u64, for_weight: u64);

    #[event("proposalFailed")]
    fn proposal_failed_event(&self, #[indexed] proposal_id: u64, for_weight: u64);

    #[event("proposalVetoed")]
    fn proposal_vetoed_event(&self, #[indexed] proposal_id: u64, guardian: &ManagedAddress);

    #[event("proposalExecuted")]
    fn proposal_executed_event(&self, #[indexed] proposal_id: u64, executor: &ManagedAddress);

    #[event("guardianSet")]
    fn guardian_event(&self, #[indexed] guardian: &ManagedAddress);

    #[event("proposalThresholdsSet")]
    fn proposal_thresholds_event(&self, #[indexed] min_create_proposal_pct: u64, passing_pct: u64);

    #[event("votingPeriodSet")]
    fn voting_period_event(&self, #[indexed] voting_period: u64);

    // ========================================================
    // STORAGE
    // ========================================================

    // ── Configuration ──

    #[view(getGuardian)]
    #[storage_mapper("guardian")]
    fn guardian(&self) -> SingleValueMapper<ManagedAddress>;

    #[storage_mapper("minCreateProposalPct")]
    fn min_create_proposal_pct(&self) -> SingleValueMapper<u64>;

    #[storage_mapper("passingPct")]
    fn passing_pct(&self) -> SingleValueMapper<u64>;

    /// Seconds a proposal stays open for votes.
    #[view(getVotingPeriod)]
    #[storage_mapper("votingPeriod")]
    fn voting_period(&self) -> SingleValueMapper<u64>;

    // ── Proposals ──

    #[view(getProposalCount)]
    #[storage_mapper("proposalCount")]
    fn proposal_count(&self) -> SingleValueMapper<u64>;

    #[storage_mapper("proposals")]
    fn proposals(&self, id: u64) -> SingleValueMapper<Proposal<Self::Api>>;

    #[view(hasVotedOnProposal)]
    #[storage_mapper("hasVoted")]
    fn has_voted(&self, proposal_id: u64, voter: &ManagedAddress) -> SingleValueMapper<bool>;
}
