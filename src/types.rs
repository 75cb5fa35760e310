multiversx_sc::imports!();
multiversx_sc::derive_imports!();

// ============================================================
// Weight history
// ============================================================

/// Weight state as of the end of a write in `epoch`.
///
/// `locked` is the sum of units still counting down. Projecting the
/// checkpoint forward subtracts `locked` from `weight` once per epoch and
/// drops units from `locked` at their unlock epoch.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Debug, Default)]
pub struct WeightCheckpoint {
    pub epoch: u64,
    pub weight: u64,
    pub locked: u64,
}

// ============================================================
// Emission schedule
// ============================================================

/// From `epoch` onwards, `pct` (out of `MAX_PCT`) of the undistributed
/// supply is released per epoch.
#[type_abi]
#[derive(
    TopEncode, TopDecode, NestedEncode, NestedDecode, ManagedVecItem, Clone, Copy, PartialEq, Debug,
)]
pub struct EpochPct {
    pub epoch: u64,
    pub pct: u64,
}

/// Lock-on-claim duration: `initial_duration` epochs, minus one every
/// `decay_rate` epochs, never below `floor`.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Debug)]
pub struct ClaimLockConfig {
    pub initial_duration: u64,
    pub decay_rate: u64,
    pub floor: u64,
}

// ============================================================
// Boost
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Debug)]
pub struct BoostConfig {
    /// Epochs at the start of the system where every claim gets max boost.
    pub grace_epochs: u64,
    /// Whole-number multiplier, at least 1.
    pub max_multiplier: u64,
    /// Share of epoch emissions claimable at max boost, as a percent of the
    /// account's share of total lock weight.
    pub max_boostable_pct: u64,
    /// Width of the decaying band, as a percent of the max boost band.
    pub decay_boost_pct: u64,
    /// Pay claims past the decay band at multiplier 1 instead of rejecting.
    pub allow_unboosted: bool,
}

// ============================================================
// Incentive voting
// ============================================================

#[type_abi]
#[derive(
    TopEncode, TopDecode, NestedEncode, NestedDecode, ManagedVecItem, Clone, PartialEq, Debug,
)]
pub struct ReceiverVote {
    pub receiver_id: u32,
    pub points: u64,
    /// Lock weight this vote contributes to the receiver's tally.
    pub weight: u64,
}

// ============================================================
// Vault
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Debug)]
pub enum EpochState {
    /// Votes are still being cast.
    Open,
    /// Elapsed, but emissions were not rolled over yet.
    Finalizing,
    /// Tally frozen and emissions apportioned. Claims are open.
    Distributed,
}

// ============================================================
// Proposal status
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Debug)]
pub enum ProposalStatus {
    /// Voting window is open.
    Active,
    /// For-weight reached the passing threshold. Awaiting execution.
    Passed,
    /// Window closed below the passing threshold. Terminal.
    Failed,
    /// Action applied. Terminal.
    Executed,
    /// Stopped by the guardian. Terminal.
    Vetoed,
}

// ============================================================
// Proposal action: what a passed proposal does
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, PartialEq, Debug)]
pub enum ProposalAction<M: ManagedTypeApi> {
    SetPenaltyWithdrawalsEnabled(bool),
    SetGuardian(ManagedAddress<M>),
    /// `(create_pct, passing_pct)`, both out of `MAX_PCT`.
    SetProposalThresholds(u64, u64),
    SetBoostConfig(BoostConfig),
    SetClaimLockConfig(ClaimLockConfig),
    SetReceiverActive(u32, bool),
    /// `(to, endpoint, args, gas_limit)`
    ExternalCall(
        ManagedAddress<M>,
        ManagedBuffer<M>,
        ManagedVec<M, ManagedBuffer<M>>,
        u64,
    ),
}

// ============================================================
// Proposal
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Debug)]
pub struct Proposal<M: ManagedTypeApi> {
    pub id: u64,
    pub proposer: ManagedAddress<M>,
    /// Epoch whose lock weights count for this proposal.
    pub snapshot_epoch: u64,
    pub created_at: u64,
    pub voting_ends_at: u64,
    /// Total lock weight at the snapshot epoch.
    pub total_weight: u64,
    pub required_weight: u64,
    pub for_weight: u64,
    pub against_weight: u64,
    pub status: ProposalStatus,
    pub action: ProposalAction<M>,
}
