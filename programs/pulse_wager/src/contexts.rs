use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::errors::WagerError;
use crate::state::{Config, OracleSet, Round, RoundRegistry, Ticket, Tokenomics, UserEscrow};

// ----------------------------
// Config / admin
// ----------------------------

#[derive(Accounts)]
pub struct InitializeConfig<'info> {
    #[account(
        init,
        payer = admin,
        space = 8 + Config::INIT_SPACE,
        seeds = [crate::CONFIG_SEED],
        bump
    )]
    pub config: Account<'info, Config>,

    /// Stake mint; its mint authority moves to the config PDA.
    #[account(mut)]
    pub stake_mint: Account<'info, Mint>,

    /// Treasury SPL = TokenAccount PDA controlled by the program (authority = config PDA)
    #[account(
        init,
        payer = admin,
        seeds = [crate::TREASURY_SEED],
        bump,
        token::mint = stake_mint,
        token::authority = config
    )]
    pub treasury: Account<'info, TokenAccount>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

/// Admin-only scalar updates on Config (pause, grace, stake, oracle key).
#[derive(Accounts)]
pub struct UpdateConfig<'info> {
    #[account(
        mut,
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    pub admin: Signer<'info>,
}

#[derive(Accounts)]
pub struct InitializeTokenomics<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, Config>,

    #[account(address = config.stake_mint)]
    pub stake_mint: Account<'info, Mint>,

    #[account(
        init,
        payer = admin,
        space = 8 + Tokenomics::INIT_SPACE,
        seeds = [crate::TOKENOMICS_SEED, config.key().as_ref()],
        bump
    )]
    pub tokenomics: Account<'info, Tokenomics>,

    #[account(
        init,
        payer = admin,
        token::mint = stake_mint,
        token::authority = config,
        seeds = [crate::REWARD_FEE_POOL_SEED, tokenomics.key().as_ref()],
        bump
    )]
    pub reward_fee_pool: Account<'info, TokenAccount>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

#[derive(Accounts)]
pub struct UpdateTokenomics<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::TOKENOMICS_SEED, config.key().as_ref()],
        bump = tokenomics.bump
    )]
    pub tokenomics: Account<'info, Tokenomics>,

    pub admin: Signer<'info>,
}

#[derive(Accounts)]
pub struct WithdrawTreasury<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(mut, address = config.treasury)]
    pub treasury: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = destination.mint == config.stake_mint @ WagerError::StakeMintMismatch
    )]
    pub destination: Account<'info, TokenAccount>,

    pub admin: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

// ----------------------------
// Round registry / rounds
// ----------------------------

#[derive(Accounts)]
pub struct InitializeRoundRegistry<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, Config>,

    #[account(
        init,
        payer = admin,
        space = 8 + RoundRegistry::INIT_SPACE,
        seeds = [crate::ROUND_REGISTRY_SEED, config.key().as_ref()],
        bump
    )]
    pub round_registry: Account<'info, RoundRegistry>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

#[derive(Accounts)]
pub struct CreateRound<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, Config>,

    #[account(address = config.stake_mint)]
    pub stake_mint: Account<'info, Mint>,

    #[account(
        mut,
        seeds = [crate::ROUND_REGISTRY_SEED, config.key().as_ref()],
        bump = round_registry.bump,
    )]
    pub round_registry: Account<'info, RoundRegistry>,

    #[account(
        init,
        payer = admin,
        space = 8 + Round::INIT_SPACE,
        seeds = [crate::ROUND_SEED, round_registry.next_round_id.to_le_bytes().as_ref()],
        bump
    )]
    pub round: Account<'info, Round>,

    #[account(
        init,
        payer = admin,
        seeds = [crate::STAKE_VAULT_SEED, round_registry.next_round_id.to_le_bytes().as_ref()],
        bump,
        token::mint = stake_mint,
        token::authority = round
    )]
    pub stake_vault: Account<'info, TokenAccount>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

// ----------------------------
// OracleSet (allowlist + threshold)
// ----------------------------

#[derive(Accounts)]
pub struct InitializeOracleSet<'info> {
    #[account(
        mut,
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        init,
        payer = admin,
        space = 8 + OracleSet::INIT_SPACE,
        seeds = [crate::ORACLE_SET_SEED, config.key().as_ref()],
        bump
    )]
    pub oracle_set: Account<'info, OracleSet>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

/// add_oracle / remove_oracle / set_oracle_threshold / set_oracle_mode
#[derive(Accounts)]
pub struct ManageOracleSet<'info> {
    #[account(
        mut,
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::ORACLE_SET_SEED, config.key().as_ref()],
        bump = oracle_set.bump
    )]
    pub oracle_set: Account<'info, OracleSet>,

    pub admin: Signer<'info>,
}

#[derive(Accounts)]
#[instruction(round_id: u64)]
pub struct SetPulseSigned<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::ROUND_SEED, round_id.to_le_bytes().as_ref()],
        bump = round.bump
    )]
    pub round: Account<'info, Round>,

    /// Required in threshold mode.
    #[account(address = config.oracle_set)]
    pub oracle_set: Option<Account<'info, OracleSet>>,

    /// CHECK: instruction sysvar (for ed25519 introspection). Address enforced.
    #[account(address = anchor_lang::solana_program::sysvar::instructions::ID)]
    pub instructions: UncheckedAccount<'info>,
}

#[derive(Accounts)]
#[instruction(round_id: u64)]
pub struct SetPulseMock<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::ROUND_SEED, round_id.to_le_bytes().as_ref()],
        bump = round.bump
    )]
    pub round: Account<'info, Round>,

    pub admin: Signer<'info>,
}

// ----------------------------
// User Escrow (pre-deposit for gasless signed commits)
// ----------------------------

#[derive(Accounts)]
pub struct InitUserEscrow<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(address = config.stake_mint)]
    pub stake_mint: Account<'info, Mint>,

    #[account(
        init,
        payer = user,
        space = 8 + UserEscrow::INIT_SPACE,
        seeds = [crate::USER_ESCROW_SEED, user.key().as_ref()],
        bump
    )]
    pub user_escrow: Account<'info, UserEscrow>,

    #[account(
        init,
        payer = user,
        seeds = [crate::USER_ESCROW_VAULT_SEED, user.key().as_ref()],
        bump,
        token::mint = stake_mint,
        token::authority = user_escrow
    )]
    pub user_escrow_vault: Account<'info, TokenAccount>,

    #[account(mut)]
    pub user: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

/// deposit_escrow / withdraw_escrow
#[derive(Accounts)]
pub struct EscrowTransfer<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::USER_ESCROW_SEED, user.key().as_ref()],
        bump = user_escrow.bump,
        has_one = user
    )]
    pub user_escrow: Account<'info, UserEscrow>,

    #[account(
        mut,
        seeds = [crate::USER_ESCROW_VAULT_SEED, user.key().as_ref()],
        bump,
        constraint = user_escrow_vault.mint == config.stake_mint @ WagerError::StakeMintMismatch,
        constraint = user_escrow_vault.owner == user_escrow.key()
    )]
    pub user_escrow_vault: Account<'info, TokenAccount>,

    #[account(mut)]
    pub user: Signer<'info>,

    #[account(
        mut,
        constraint = user_token_account.owner == user.key(),
        constraint = user_token_account.mint == config.stake_mint @ WagerError::StakeMintMismatch
    )]
    pub user_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

// ----------------------------
// Commit
// ----------------------------

#[derive(Accounts)]
#[instruction(round_id: u64, nonce: u64)]
pub struct CommitTicket<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::ROUND_SEED, round_id.to_le_bytes().as_ref()],
        bump = round.bump
    )]
    pub round: Account<'info, Round>,

    #[account(mut, address = round.stake_vault)]
    pub stake_vault: Account<'info, TokenAccount>,

    /// CHECK: ticket PDA, created by the handler; must be empty.
    #[account(mut)]
    pub ticket: UncheckedAccount<'info>,

    #[account(mut)]
    pub user: Signer<'info>,

    #[account(
        mut,
        constraint = user_token_account.mint == config.stake_mint @ WagerError::StakeMintMismatch,
        constraint = user_token_account.owner == user.key()
    )]
    pub user_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(round_id: u64)]
pub struct CommitBatch<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::ROUND_SEED, round_id.to_le_bytes().as_ref()],
        bump = round.bump
    )]
    pub round: Account<'info, Round>,

    #[account(mut, address = round.stake_vault)]
    pub stake_vault: Account<'info, TokenAccount>,

    #[account(mut)]
    pub user: Signer<'info>,

    #[account(
        mut,
        constraint = user_token_account.mint == config.stake_mint @ WagerError::StakeMintMismatch,
        constraint = user_token_account.owner == user.key()
    )]
    pub user_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    // tickets via remaining_accounts (writable, empty)
}

#[derive(Accounts)]
#[instruction(round_id: u64)]
pub struct CommitBatchSigned<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::ROUND_SEED, round_id.to_le_bytes().as_ref()],
        bump = round.bump
    )]
    pub round: Account<'info, Round>,

    #[account(mut, address = round.stake_vault)]
    pub stake_vault: Account<'info, TokenAccount>,

    /// Relayer (pays fees and ticket rent)
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        mut,
        seeds = [crate::USER_ESCROW_SEED, user.key().as_ref()],
        bump = user_escrow.bump,
        has_one = user
    )]
    pub user_escrow: Account<'info, UserEscrow>,

    #[account(
        mut,
        seeds = [crate::USER_ESCROW_VAULT_SEED, user.key().as_ref()],
        bump,
        constraint = user_escrow_vault.owner == user_escrow.key()
    )]
    pub user_escrow_vault: Account<'info, TokenAccount>,

    /// CHECK: user pubkey referenced in the ed25519 messages
    pub user: UncheckedAccount<'info>,

    /// CHECK: instruction sysvar (for ed25519 introspection). Address enforced.
    #[account(address = anchor_lang::solana_program::sysvar::instructions::ID)]
    pub instructions: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

// ----------------------------
// Reveal
// ----------------------------

#[derive(Accounts)]
#[instruction(round_id: u64, nonce: u64)]
pub struct RevealTicket<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::ROUND_SEED, round_id.to_le_bytes().as_ref()],
        bump = round.bump
    )]
    pub round: Account<'info, Round>,

    #[account(
        mut,
        seeds = [
            crate::TICKET_SEED,
            round_id.to_le_bytes().as_ref(),
            user.key().as_ref(),
            nonce.to_le_bytes().as_ref()
        ],
        bump = ticket.bump,
        has_one = user
    )]
    pub ticket: Account<'info, Ticket>,

    pub user: Signer<'info>,
}

#[derive(Accounts)]
#[instruction(round_id: u64)]
pub struct RevealBatch<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::ROUND_SEED, round_id.to_le_bytes().as_ref()],
        bump = round.bump
    )]
    pub round: Account<'info, Round>,

    pub user: Signer<'info>,
    // tickets via remaining_accounts (writable)
}

#[derive(Accounts)]
#[instruction(round_id: u64)]
pub struct RevealBatchSigned<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::ROUND_SEED, round_id.to_le_bytes().as_ref()],
        bump = round.bump
    )]
    pub round: Account<'info, Round>,

    /// Relayer paying tx fees (must sign tx)
    pub payer: Signer<'info>,

    /// CHECK: instruction sysvar (for ed25519 introspection). Address enforced.
    #[account(address = anchor_lang::solana_program::sysvar::instructions::ID)]
    pub instructions: UncheckedAccount<'info>,
}

// ----------------------------
// Lifecycle
// ----------------------------

#[derive(Accounts)]
#[instruction(round_id: u64)]
pub struct FinalizeRound<'info> {
    #[account(
        mut,
        seeds = [crate::ROUND_SEED, round_id.to_le_bytes().as_ref()],
        bump = round.bump
    )]
    pub round: Account<'info, Round>,

    pub caller: Signer<'info>,
}

#[derive(Accounts)]
#[instruction(round_id: u64)]
pub struct SettleRound<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::ROUND_SEED, round_id.to_le_bytes().as_ref()],
        bump = round.bump
    )]
    pub round: Account<'info, Round>,

    #[account(mut, address = round.stake_vault)]
    pub stake_vault: Account<'info, TokenAccount>,

    #[account(mut, address = config.treasury)]
    pub treasury: Account<'info, TokenAccount>,

    pub caller: Signer<'info>,

    pub token_program: Program<'info, Token>,
    // tickets via remaining_accounts (writable)
}

#[derive(Accounts)]
#[instruction(round_id: u64, nonce: u64)]
pub struct ClaimReward<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        seeds = [crate::TOKENOMICS_SEED, config.key().as_ref()],
        bump = tokenomics.bump
    )]
    pub tokenomics: Account<'info, Tokenomics>,

    #[account(
        seeds = [crate::ROUND_SEED, round_id.to_le_bytes().as_ref()],
        bump = round.bump
    )]
    pub round: Account<'info, Round>,

    #[account(
        mut,
        seeds = [
            crate::TICKET_SEED,
            round_id.to_le_bytes().as_ref(),
            user.key().as_ref(),
            nonce.to_le_bytes().as_ref()
        ],
        bump = ticket.bump,
        has_one = user
    )]
    pub ticket: Account<'info, Ticket>,

    pub user: Signer<'info>,

    #[account(mut, address = config.stake_mint)]
    pub stake_mint: Account<'info, Mint>,

    #[account(mut, address = round.stake_vault)]
    pub stake_vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = user_token_account.mint == config.stake_mint @ WagerError::StakeMintMismatch,
        constraint = user_token_account.owner == user.key()
    )]
    pub user_token_account: Account<'info, TokenAccount>,

    #[account(mut, address = tokenomics.reward_fee_pool)]
    pub reward_fee_pool: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

#[derive(Accounts)]
#[instruction(round_id: u64)]
pub struct SweepUnclaimed<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::ROUND_SEED, round_id.to_le_bytes().as_ref()],
        bump = round.bump
    )]
    pub round: Account<'info, Round>,

    #[account(mut, address = round.stake_vault)]
    pub stake_vault: Account<'info, TokenAccount>,

    #[account(mut, address = config.treasury)]
    pub treasury: Account<'info, TokenAccount>,

    pub admin: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

#[derive(Accounts)]
#[instruction(round_id: u64, nonce: u64)]
pub struct RecoverFunds<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::ROUND_SEED, round_id.to_le_bytes().as_ref()],
        bump = round.bump
    )]
    pub round: Account<'info, Round>,

    #[account(
        mut,
        seeds = [
            crate::TICKET_SEED,
            round_id.to_le_bytes().as_ref(),
            user.key().as_ref(),
            nonce.to_le_bytes().as_ref()
        ],
        bump = ticket.bump,
        has_one = user
    )]
    pub ticket: Account<'info, Ticket>,

    /// CHECK: ticket owner, receiver of the refund. Bound by ticket seeds + has_one.
    pub user: UncheckedAccount<'info>,

    #[account(
        mut,
        constraint = user_token_account.mint == config.stake_mint @ WagerError::StakeMintMismatch,
        constraint = user_token_account.owner == user.key()
    )]
    pub user_token_account: Account<'info, TokenAccount>,

    #[account(mut, address = round.stake_vault)]
    pub stake_vault: Account<'info, TokenAccount>,

    pub cranker: Signer<'info>,

    pub token_program: Program<'info, Token>,
}
