use anchor_lang::prelude::*;

use anchor_spl::token::spl_token::instruction::AuthorityType;
use anchor_spl::token::{self, SetAuthority, Transfer};

use crate::constants::*;
use crate::errors::WagerError;
use crate::events::{
    ConfigInitialized, ConfigUpdated, PauseChanged, RoundCreated, TokenomicsUpdated,
    TreasuryWithdrawn,
};
use crate::state::{Round, Tokenomics};
use crate::{
    CreateRound, InitializeConfig, InitializeRoundRegistry, InitializeTokenomics, UpdateConfig,
    UpdateTokenomics, WithdrawTreasury,
};

pub fn initialize_config(
    ctx: Context<InitializeConfig>,
    stake_amount: u64,
    commit_window_slots: u64,
    reveal_window_slots: u64,
) -> Result<()> {
    require!(stake_amount > 0, WagerError::InvalidStakeAmount);
    require!(commit_window_slots > 0, WagerError::InvalidWindow);
    require!(
        reveal_window_slots >= MIN_REVEAL_WINDOW_SLOTS,
        WagerError::RevealWindowTooShort
    );

    let cfg = &mut ctx.accounts.config;

    cfg.admin = ctx.accounts.admin.key();
    cfg.bump = ctx.bumps.config;

    cfg.treasury = ctx.accounts.treasury.key();
    cfg.treasury_bump = ctx.bumps.treasury;

    cfg.stake_amount = stake_amount;
    cfg.commit_window_slots = commit_window_slots;
    cfg.reveal_window_slots = reveal_window_slots;
    cfg.claim_grace_slots = DEFAULT_CLAIM_GRACE_SLOTS;

    // no oracle until the admin sets one
    cfg.oracle_pubkey = Pubkey::default();
    cfg.oracle_set = Pubkey::default();
    cfg.use_oracle_set = false;

    cfg.paused = false;
    cfg.version = INITIAL_VERSION;
    cfg.stake_mint = ctx.accounts.stake_mint.key();

    // rewards are minted by the config PDA
    token::set_authority(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            SetAuthority {
                account_or_mint: ctx.accounts.stake_mint.to_account_info(),
                current_authority: ctx.accounts.admin.to_account_info(),
            },
        ),
        AuthorityType::MintTokens,
        Some(cfg.key()),
    )?;

    emit!(ConfigInitialized {
        admin: cfg.admin,
        stake_mint: cfg.stake_mint,
        stake_amount,
        commit_window_slots,
        reveal_window_slots,
    });

    Ok(())
}

pub fn set_pause(ctx: Context<UpdateConfig>, paused: bool) -> Result<()> {
    let cfg = &mut ctx.accounts.config;
    cfg.assert_admin(&ctx.accounts.admin.key())?;
    cfg.paused = paused;

    msg!("pause set to {}", paused);
    emit!(PauseChanged { paused });
    Ok(())
}

pub fn set_claim_grace_slots(ctx: Context<UpdateConfig>, claim_grace_slots: u64) -> Result<()> {
    let cfg = &mut ctx.accounts.config;
    cfg.assert_admin(&ctx.accounts.admin.key())?;
    cfg.claim_grace_slots = claim_grace_slots;

    emit!(ConfigUpdated {
        stake_amount: cfg.stake_amount,
        claim_grace_slots,
    });
    Ok(())
}

/// Applies to rounds created afterwards; running rounds keep their snapshot.
pub fn update_stake_amount(ctx: Context<UpdateConfig>, new_stake_amount: u64) -> Result<()> {
    require!(new_stake_amount > 0, WagerError::InvalidStakeAmount);

    let cfg = &mut ctx.accounts.config;
    cfg.assert_admin(&ctx.accounts.admin.key())?;
    cfg.stake_amount = new_stake_amount;

    emit!(ConfigUpdated {
        stake_amount: new_stake_amount,
        claim_grace_slots: cfg.claim_grace_slots,
    });
    Ok(())
}

pub fn initialize_tokenomics(
    ctx: Context<InitializeTokenomics>,
    reward_fee_bps: u16,
) -> Result<()> {
    Tokenomics::validate_fee_bps(reward_fee_bps)?;
    ctx.accounts.config.assert_admin(&ctx.accounts.admin.key())?;

    let tok = &mut ctx.accounts.tokenomics;
    tok.admin = ctx.accounts.admin.key();
    tok.bump = ctx.bumps.tokenomics;
    tok.reward_fee_bps = reward_fee_bps;
    tok.reward_fee_pool = ctx.accounts.reward_fee_pool.key();
    tok.reward_fee_pool_bump = ctx.bumps.reward_fee_pool;
    tok.version = INITIAL_VERSION;

    Ok(())
}

pub fn update_tokenomics(ctx: Context<UpdateTokenomics>, reward_fee_bps: u16) -> Result<()> {
    Tokenomics::validate_fee_bps(reward_fee_bps)?;
    ctx.accounts.config.assert_admin(&ctx.accounts.admin.key())?;
    ctx.accounts.tokenomics.reward_fee_bps = reward_fee_bps;

    emit!(TokenomicsUpdated { reward_fee_bps });
    Ok(())
}

/// Moves tokens out of the treasury. `amount == 0` drains it.
pub fn withdraw_treasury(ctx: Context<WithdrawTreasury>, amount: u64) -> Result<()> {
    let cfg = &ctx.accounts.config;
    cfg.assert_admin(&ctx.accounts.admin.key())?;

    let transfer_amount = if amount == 0 {
        ctx.accounts.treasury.amount
    } else {
        amount
    };
    if transfer_amount == 0 {
        return Ok(());
    }

    let signer: &[&[&[u8]]] = &[&[CONFIG_SEED, &[cfg.bump]]];
    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.treasury.to_account_info(),
                to: ctx.accounts.destination.to_account_info(),
                authority: ctx.accounts.config.to_account_info(),
            },
            signer,
        ),
        transfer_amount,
    )?;

    emit!(TreasuryWithdrawn {
        amount: transfer_amount,
        destination: ctx.accounts.destination.key(),
    });
    Ok(())
}

pub fn initialize_round_registry(
    ctx: Context<InitializeRoundRegistry>,
    start_round_id: u64,
) -> Result<()> {
    let cfg = &ctx.accounts.config;
    cfg.assert_admin(&ctx.accounts.admin.key())?;

    let rr = &mut ctx.accounts.round_registry;
    rr.admin = cfg.admin;
    rr.bump = ctx.bumps.round_registry;
    rr.next_round_id = start_round_id;
    rr.version = INITIAL_VERSION;

    Ok(())
}

/// The round PDA is seeded by `round_registry.next_round_id`; allocating here
/// keeps id issue and account creation in the same instruction.
pub fn create_round(
    ctx: Context<CreateRound>,
    pulse_index_target: u64,
    commit_deadline_slot: Option<u64>,
    reveal_deadline_slot: Option<u64>,
) -> Result<()> {
    let cfg = &ctx.accounts.config;
    cfg.assert_live()?;
    cfg.assert_admin(&ctx.accounts.admin.key())?;

    let current_slot = Clock::get()?.slot;
    let (commit_deadline, reveal_deadline) =
        cfg.schedule(current_slot, commit_deadline_slot, reveal_deadline_slot)?;

    let round_id = ctx.accounts.round_registry.allocate()?;

    let round = &mut ctx.accounts.round;
    round.set_inner(Round::open(
        round_id,
        ctx.bumps.round,
        pulse_index_target,
        cfg.stake_amount,
        commit_deadline,
        reveal_deadline,
        current_slot,
        ctx.accounts.stake_vault.key(),
        ctx.bumps.stake_vault,
    ));

    emit!(RoundCreated {
        round_id,
        pulse_index_target,
        stake_amount: cfg.stake_amount,
        commit_deadline_slot: commit_deadline,
        reveal_deadline_slot: reveal_deadline,
    });

    Ok(())
}
