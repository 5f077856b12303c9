use anchor_lang::prelude::*;
use anchor_spl::token::{self, Transfer};

use crate::{
    errors::WagerError,
    events::{EscrowDeposited, EscrowWithdrawn},
    EscrowTransfer, InitUserEscrow,
};

/// Creates the UserEscrow PDA and its PDA token account.
pub fn init_user_escrow(ctx: Context<InitUserEscrow>) -> Result<()> {
    let escrow = &mut ctx.accounts.user_escrow;
    let slot = Clock::get()?.slot;

    escrow.user = ctx.accounts.user.key();
    escrow.bump = ctx.bumps.user_escrow;
    escrow.created_slot = slot;
    escrow.updated_slot = slot;
    escrow.total_deposited = 0;
    escrow.total_debited = 0;
    escrow.total_withdrawn = 0;

    Ok(())
}

pub fn deposit_escrow(ctx: Context<EscrowTransfer>, amount: u64) -> Result<()> {
    require!(amount > 0, WagerError::InvalidStakeAmount);
    ctx.accounts.config.assert_live()?;

    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.user_token_account.to_account_info(),
                to: ctx.accounts.user_escrow_vault.to_account_info(),
                authority: ctx.accounts.user.to_account_info(),
            },
        ),
        amount,
    )?;

    let escrow = &mut ctx.accounts.user_escrow;
    escrow.record_deposit(amount, Clock::get()?.slot)?;

    emit!(EscrowDeposited {
        user: escrow.user,
        amount,
        total_deposited: escrow.total_deposited,
    });
    Ok(())
}

/// Owner-only; stays available while paused.
pub fn withdraw_escrow(ctx: Context<EscrowTransfer>, amount: u64) -> Result<()> {
    require!(amount > 0, WagerError::InvalidStakeAmount);
    require!(
        ctx.accounts.user_escrow_vault.amount >= amount,
        WagerError::InsufficientEscrow
    );

    let user_pk = ctx.accounts.user.key();
    let escrow_bump = ctx.accounts.user_escrow.bump;
    let signer_seeds: &[&[&[u8]]] = &[&[crate::USER_ESCROW_SEED, user_pk.as_ref(), &[escrow_bump]]];

    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.user_escrow_vault.to_account_info(),
                to: ctx.accounts.user_token_account.to_account_info(),
                authority: ctx.accounts.user_escrow.to_account_info(),
            },
            signer_seeds,
        ),
        amount,
    )?;

    ctx.accounts
        .user_escrow
        .record_withdrawal(amount, Clock::get()?.slot)?;

    emit!(EscrowWithdrawn {
        user: user_pk,
        amount,
    });
    Ok(())
}
