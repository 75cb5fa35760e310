// ============================================================
// Error messages
//
// Every failure aborts the call and reverts its storage writes.
// Messages name the violated precondition.
// ============================================================

// ── Configuration ──

pub const ERR_INVALID_EPOCH_LENGTH: &str = "Epoch length must be positive";
pub const ERR_INVALID_LOCK_RATIO: &str = "Lock to token ratio must be positive";
pub const ERR_INVALID_BOOST_CONFIG: &str = "Invalid boost configuration";
pub const ERR_INVALID_SCHEDULE: &str = "Invalid emission schedule";
pub const ERR_INVALID_DECAY_RATE: &str = "Lock decay rate must be positive";
pub const ERR_INVALID_CLAIM_LOCK: &str = "Invalid claim lock configuration";
pub const ERR_INVALID_THRESHOLDS: &str = "Invalid proposal thresholds";
pub const ERR_INVALID_VOTING_PERIOD: &str = "Voting period out of range";
pub const ERR_DUPLICATE_ALLOWANCE: &str = "Duplicate allowance recipient";

// ── Locker ──

pub const ERR_INVALID_DURATION: &str = "Invalid lock duration";
pub const ERR_INVALID_EXTENSION: &str = "New duration must exceed remaining epochs";
pub const ERR_INSUFFICIENT_BALANCE: &str = "Insufficient balance";
pub const ERR_FUTURE_EPOCH: &str = "Epoch has not been reached";
pub const ERR_WRONG_TOKEN: &str = "Wrong payment token";
pub const ERR_INVALID_LOCK_AMOUNT: &str = "Amount must be a positive multiple of the lock ratio";
pub const ERR_NOTHING_TO_WITHDRAW: &str = "No expired locks to withdraw";
pub const ERR_PENALTY_WITHDRAWALS_DISABLED: &str = "Penalty withdrawals are disabled";
pub const ERR_LOCK_EXPIRED: &str = "Lock has already expired";
pub const ERR_WEIGHT_OVERFLOW: &str = "Lock weight overflow";

// ── Boost ──

pub const ERR_INVALID_BOOST_INPUT: &str = "Invalid boost input";
pub const ERR_UNBOOSTED_CLAIM: &str = "Claim exceeds boostable amount";

// ── Incentive voting ──

pub const ERR_EXCEEDS_WEIGHT: &str = "Votes exceed available weight";
pub const ERR_EPOCH_CLOSED: &str = "Votes are only accepted for the open epoch";
pub const ERR_NOT_FINALIZED: &str = "Epoch votes are not finalized";
pub const ERR_EPOCH_NOT_ELAPSED: &str = "Epoch has not fully elapsed";
pub const ERR_UNKNOWN_RECEIVER: &str = "Unknown or inactive receiver";
pub const ERR_DUPLICATE_RECEIVER: &str = "Receiver listed more than once";
pub const ERR_ZERO_POINTS: &str = "Vote points must be positive";
pub const ERR_NO_LOCK_WEIGHT: &str = "No lock weight";

// ── Vault ──

pub const ERR_ALREADY_CLAIMED: &str = "Already claimed";
pub const ERR_EPOCH_NOT_FINALIZED: &str = "Epoch emissions are not finalized";
pub const ERR_NO_VOTES_FOR_RECEIVER: &str = "No votes cast for this receiver";
pub const ERR_NOTHING_TO_CLAIM: &str = "Nothing to claim";
pub const ERR_NO_ALLOWANCE: &str = "No allowance";

// ── Admin voting ──

pub const ERR_ALREADY_EXECUTED: &str = "Proposal already executed";
pub const ERR_VETOED: &str = "Proposal was vetoed";
pub const ERR_PROPOSAL_NOT_FOUND: &str = "Proposal does not exist";
pub const ERR_NO_SNAPSHOT_EPOCH: &str = "No elapsed epoch to snapshot weight from";
pub const ERR_INSUFFICIENT_PROPOSAL_WEIGHT: &str = "Not enough weight to create a proposal";
pub const ERR_VOTING_CLOSED: &str = "Voting period has ended";
pub const ERR_VOTING_STILL_OPEN: &str = "Voting period has not ended";
pub const ERR_ALREADY_VOTED: &str = "Already voted";
pub const ERR_PROPOSAL_NOT_ACTIVE: &str = "Proposal is not active";
pub const ERR_PROPOSAL_FAILED: &str = "Proposal did not pass";
pub const ERR_NOT_GUARDIAN: &str = "Only the guardian can veto";
pub const ERR_NOT_VETOABLE: &str = "Proposal can no longer be vetoed";
