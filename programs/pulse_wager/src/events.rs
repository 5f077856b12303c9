use anchor_lang::prelude::*;

// --- GLOBAL & ADMIN ---
#[event]
pub struct ConfigInitialized {
    pub admin: Pubkey,
    pub stake_mint: Pubkey,
    pub stake_amount: u64,
    pub commit_window_slots: u64,
    pub reveal_window_slots: u64,
}

#[event]
pub struct PauseChanged {
    pub paused: bool,
}

#[event]
pub struct ConfigUpdated {
    pub stake_amount: u64,
    pub claim_grace_slots: u64,
}

#[event]
pub struct TokenomicsUpdated {
    pub reward_fee_bps: u16,
}

// --- ORACLE ---
#[event]
pub struct OracleRotated {
    pub old_oracle: Pubkey,
    pub new_oracle: Pubkey,
}

#[event]
pub struct OracleSetChanged {
    pub oracle_set: Pubkey,
    pub threshold: u8,
    pub oracle_count: u8,
    pub use_oracle_set: bool,
}

// --- ESCROW ---
#[event]
pub struct EscrowDeposited {
    pub user: Pubkey,
    pub amount: u64,
    pub total_deposited: u64,
}

#[event]
pub struct EscrowWithdrawn {
    pub user: Pubkey,
    pub amount: u64,
}

// --- ROUND LIFECYCLE ---
#[event]
pub struct RoundCreated {
    pub round_id: u64,
    pub pulse_index_target: u64,
    pub stake_amount: u64,
    pub commit_deadline_slot: u64,
    pub reveal_deadline_slot: u64,
}

#[event]
pub struct TicketsCommitted {
    pub round_id: u64,
    pub user: Pubkey,
    pub count: u8,
    pub stake_total: u64,
    pub gasless: bool,
}

#[event]
pub struct PulseSet {
    pub round_id: u64,
    pub pulse_index_target: u64,
    pub attestations: u8,
    pub slot: u64,
}

#[event]
pub struct TicketsRevealed {
    pub round_id: u64,
    pub user: Pubkey,
    pub count: u8,
    pub wins: u8,
    pub gasless: bool,
}

#[event]
pub struct RoundFinalized {
    pub round_id: u64,
    pub committed_count: u64,
    pub revealed_count: u64,
    pub win_count: u64,
    pub slot: u64,
}

// --- SETTLEMENT ---
#[event]
pub struct TicketsSettled {
    pub round_id: u64,
    pub processed: u64,
    pub skipped: u64,
    pub forfeited: u64,
    pub forfeit_amount: u64,
    pub settled_count: u64,
    pub token_settled: bool,
}

#[event]
pub struct RewardClaimed {
    pub round_id: u64,
    pub user: Pubkey,
    pub nonce: u64,
    pub refund: u64,
    pub reward: u64,
    pub fee: u64,
}

#[event]
pub struct RoundSwept {
    pub round_id: u64,
    pub amount: u64,
    pub slot: u64,
}

#[event]
pub struct StakeRefunded {
    pub round_id: u64,
    pub user: Pubkey,
    pub nonce: u64,
    pub amount: u64,
}

#[event]
pub struct TreasuryWithdrawn {
    pub amount: u64,
    pub destination: Pubkey,
}
