use anchor_lang::prelude::*;

pub mod authority;
pub mod codec;
pub mod constants;
pub mod contexts;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod settlement;
pub mod sigverify;
pub mod state;
pub mod utils;

pub use constants::*;
pub use contexts::*;
pub use errors::*;
pub use instructions::*;
pub use state::*;
pub use utils::*;

#[cfg(not(feature = "no-entrypoint"))]
use solana_security_txt::security_txt;

#[cfg(not(feature = "no-entrypoint"))]
security_txt! {
    // Required fields
    name: "Pulse Wager",
    project_url: "https://github.com/pulse-wager/pulse-wager",
    contacts: "link:https://github.com/pulse-wager/pulse-wager/security/advisories/new",
    policy: "https://github.com/pulse-wager/pulse-wager/blob/main/SECURITY.md",

    // Optional fields
    preferred_languages: "en",
    source_code: "https://github.com/pulse-wager/pulse-wager"
}

declare_id!("ZDtM4nBSrNZc5So615T6wB41t6mDDZXrjqaekKKNJHZ");

#[program]
pub mod pulse_wager {
    use super::*;
    use crate::instructions::{admin, commit, escrow, lifecycle, oracle, oracle_set, reveal, reward};

    // ----------------------------
    // Config / admin
    // ----------------------------
    pub fn initialize_config(
        ctx: Context<InitializeConfig>,
        stake_amount: u64,
        commit_window_slots: u64,
        reveal_window_slots: u64,
    ) -> Result<()> {
        admin::initialize_config(ctx, stake_amount, commit_window_slots, reveal_window_slots)
    }

    pub fn set_pause(ctx: Context<UpdateConfig>, paused: bool) -> Result<()> {
        admin::set_pause(ctx, paused)
    }

    pub fn set_claim_grace_slots(ctx: Context<UpdateConfig>, claim_grace_slots: u64) -> Result<()> {
        admin::set_claim_grace_slots(ctx, claim_grace_slots)
    }

    pub fn update_stake_amount(ctx: Context<UpdateConfig>, new_stake_amount: u64) -> Result<()> {
        admin::update_stake_amount(ctx, new_stake_amount)
    }

    pub fn initialize_tokenomics(
        ctx: Context<InitializeTokenomics>,
        reward_fee_bps: u16,
    ) -> Result<()> {
        admin::initialize_tokenomics(ctx, reward_fee_bps)
    }

    pub fn update_tokenomics(ctx: Context<UpdateTokenomics>, reward_fee_bps: u16) -> Result<()> {
        admin::update_tokenomics(ctx, reward_fee_bps)
    }

    pub fn withdraw_treasury(ctx: Context<WithdrawTreasury>, amount: u64) -> Result<()> {
        admin::withdraw_treasury(ctx, amount)
    }

    // ----------------------------
    // Oracle authority
    // ----------------------------
    pub fn set_oracle_pubkey(ctx: Context<UpdateConfig>, oracle_pubkey: Pubkey) -> Result<()> {
        oracle::set_oracle_pubkey(ctx, oracle_pubkey)
    }

    pub fn initialize_oracle_set(
        ctx: Context<InitializeOracleSet>,
        threshold: u8,
        initial_oracles: Vec<Pubkey>,
    ) -> Result<()> {
        oracle_set::initialize_oracle_set(ctx, threshold, initial_oracles)
    }

    pub fn add_oracle(ctx: Context<ManageOracleSet>, oracle: Pubkey) -> Result<()> {
        oracle_set::add_oracle(ctx, oracle)
    }

    pub fn remove_oracle(ctx: Context<ManageOracleSet>, oracle: Pubkey) -> Result<()> {
        oracle_set::remove_oracle(ctx, oracle)
    }

    pub fn set_oracle_threshold(ctx: Context<ManageOracleSet>, threshold: u8) -> Result<()> {
        oracle_set::set_oracle_threshold(ctx, threshold)
    }

    pub fn set_oracle_mode(ctx: Context<ManageOracleSet>, use_oracle_set: bool) -> Result<()> {
        oracle_set::set_oracle_mode(ctx, use_oracle_set)
    }

    // ----------------------------
    // Rounds
    // ----------------------------
    pub fn initialize_round_registry(
        ctx: Context<InitializeRoundRegistry>,
        start_round_id: u64,
    ) -> Result<()> {
        admin::initialize_round_registry(ctx, start_round_id)
    }

    pub fn create_round(
        ctx: Context<CreateRound>,
        pulse_index_target: u64,
        commit_deadline_slot: Option<u64>,
        reveal_deadline_slot: Option<u64>,
    ) -> Result<()> {
        admin::create_round(ctx, pulse_index_target, commit_deadline_slot, reveal_deadline_slot)
    }

    pub fn set_pulse_signed(
        ctx: Context<SetPulseSigned>,
        round_id: u64,
        pulse: [u8; 64],
    ) -> Result<()> {
        oracle::set_pulse_signed(ctx, round_id, pulse)
    }

    #[cfg(feature = "mock-pulse")]
    pub fn set_pulse_mock(
        ctx: Context<SetPulseMock>,
        round_id: u64,
        pulse: [u8; 64],
    ) -> Result<()> {
        oracle::set_pulse_mock(ctx, round_id, pulse)
    }

    pub fn finalize_round(ctx: Context<FinalizeRound>, round_id: u64) -> Result<()> {
        lifecycle::finalize_round(ctx, round_id)
    }

    // ----------------------------
    // Escrow
    // ----------------------------
    pub fn init_user_escrow(ctx: Context<InitUserEscrow>) -> Result<()> {
        escrow::init_user_escrow(ctx)
    }

    pub fn deposit_escrow(ctx: Context<EscrowTransfer>, amount: u64) -> Result<()> {
        escrow::deposit_escrow(ctx, amount)
    }

    pub fn withdraw_escrow(ctx: Context<EscrowTransfer>, amount: u64) -> Result<()> {
        escrow::withdraw_escrow(ctx, amount)
    }

    // ----------------------------
    // Commit / reveal
    // ----------------------------
    pub fn commit_ticket(
        ctx: Context<CommitTicket>,
        round_id: u64,
        nonce: u64,
        commitment: [u8; 32],
    ) -> Result<()> {
        commit::commit_ticket(ctx, round_id, nonce, commitment)
    }

    pub fn commit_batch<'info>(
        ctx: Context<'_, '_, 'info, 'info, CommitBatch<'info>>,
        round_id: u64,
        entries: Vec<CommitEntry>,
    ) -> Result<()> {
        commit::commit_batch(ctx, round_id, entries)
    }

    pub fn commit_signed<'info>(
        ctx: Context<'_, '_, 'info, 'info, CommitBatchSigned<'info>>,
        round_id: u64,
        entry: CommitSignedEntry,
    ) -> Result<()> {
        commit::commit_batch_signed(ctx, round_id, vec![entry])
    }

    pub fn commit_batch_signed<'info>(
        ctx: Context<'_, '_, 'info, 'info, CommitBatchSigned<'info>>,
        round_id: u64,
        entries: Vec<CommitSignedEntry>,
    ) -> Result<()> {
        commit::commit_batch_signed(ctx, round_id, entries)
    }

    pub fn reveal_ticket(
        ctx: Context<RevealTicket>,
        round_id: u64,
        nonce: u64,
        guess: u8,
        salt: [u8; 32],
    ) -> Result<()> {
        reveal::reveal_ticket(ctx, round_id, nonce, guess, salt)
    }

    pub fn reveal_batch<'info>(
        ctx: Context<'_, '_, 'info, 'info, RevealBatch<'info>>,
        round_id: u64,
        entries: Vec<RevealEntry>,
    ) -> Result<()> {
        reveal::reveal_batch(ctx, round_id, entries)
    }

    pub fn reveal_signed<'info>(
        ctx: Context<'_, '_, 'info, 'info, RevealBatchSigned<'info>>,
        round_id: u64,
        entry: RevealSignedEntry,
    ) -> Result<()> {
        reveal::reveal_batch_signed(ctx, round_id, vec![entry])
    }

    pub fn reveal_batch_signed<'info>(
        ctx: Context<'_, '_, 'info, 'info, RevealBatchSigned<'info>>,
        round_id: u64,
        entries: Vec<RevealSignedEntry>,
    ) -> Result<()> {
        reveal::reveal_batch_signed(ctx, round_id, entries)
    }

    // ----------------------------
    // Settlement / claim / sweep / refund
    // ----------------------------
    pub fn settle_round<'info>(
        ctx: Context<'_, '_, 'info, 'info, SettleRound<'info>>,
        round_id: u64,
    ) -> Result<()> {
        lifecycle::settle_round(ctx, round_id)
    }

    pub fn claim_reward(ctx: Context<ClaimReward>, round_id: u64, nonce: u64) -> Result<()> {
        reward::claim_reward(ctx, round_id, nonce)
    }

    pub fn sweep_unclaimed(ctx: Context<SweepUnclaimed>, round_id: u64) -> Result<()> {
        lifecycle::sweep_unclaimed(ctx, round_id)
    }

    pub fn recover_funds(ctx: Context<RecoverFunds>, round_id: u64, nonce: u64) -> Result<()> {
        lifecycle::recover_funds(ctx, round_id, nonce)
    }
}
