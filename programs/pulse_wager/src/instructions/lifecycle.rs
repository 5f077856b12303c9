use anchor_lang::prelude::*;
use anchor_spl::token::{self, Transfer};

use crate::constants::ROUND_SEED;
use crate::errors::WagerError;
use crate::events::{RoundFinalized, RoundSwept, StakeRefunded, TicketsSettled};
use crate::settlement::{settle_ticket, SettlementTally, TicketOutcome};
use crate::utils::{load_ticket, store_ticket};
use crate::{FinalizeRound, RecoverFunds, SettleRound, SweepUnclaimed};

/// Permissionless: anyone may close the reveal phase once its deadline passed.
pub fn finalize_round(ctx: Context<FinalizeRound>, round_id: u64) -> Result<()> {
    let current_slot = Clock::get()?.slot;
    let round = &mut ctx.accounts.round;
    round.finalize(current_slot)?;

    emit!(RoundFinalized {
        round_id,
        committed_count: round.committed_count,
        revealed_count: round.revealed_count,
        win_count: round.win_count,
        slot: current_slot,
    });
    Ok(())
}

/// Incremental settlement over the tickets passed as remaining accounts.
///
/// Tickets already settled by an earlier call are skipped, so a batch can be
/// re-submitted after a partial failure. Forfeited stakes move to the treasury
/// in one transfer; winners' stakes stay in the vault for `claim_reward`.
pub fn settle_round<'info>(
    ctx: Context<'_, '_, 'info, 'info, SettleRound<'info>>,
    round_id: u64,
) -> Result<()> {
    let current_slot = Clock::get()?.slot;
    let round = &mut ctx.accounts.round;
    round.assert_settlement_open()?;
    require!(!ctx.remaining_accounts.is_empty(), WagerError::EmptyBatch);

    let mut tally = SettlementTally::default();
    for ticket_ai in ctx.remaining_accounts.iter() {
        let mut ticket = load_ticket(ctx.program_id, ticket_ai, round_id)?;
        let outcome = settle_ticket(round, &mut ticket, &mut tally, current_slot)?;
        if outcome != TicketOutcome::Skipped {
            store_ticket(ticket_ai, &ticket)?;
        }
    }

    if tally.forfeit_amount > 0 {
        let round_le = round_id.to_le_bytes();
        let signer_seeds: &[&[&[u8]]] = &[&[ROUND_SEED, &round_le, &[round.bump]]];

        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.stake_vault.to_account_info(),
                    to: ctx.accounts.treasury.to_account_info(),
                    authority: round.to_account_info(),
                },
                signer_seeds,
            ),
            tally.forfeit_amount,
        )?;
    }

    let token_settled = round.close_settlement_if_complete(current_slot);

    emit!(TicketsSettled {
        round_id,
        processed: tally.processed,
        skipped: tally.skipped,
        forfeited: tally.forfeited,
        forfeit_amount: tally.forfeit_amount,
        settled_count: round.settled_count,
        token_settled,
    });
    Ok(())
}

/// Moves whatever is left in the round vault to the treasury once the claim
/// grace period is over. A second sweep fails with `AlreadySwept`.
pub fn sweep_unclaimed(ctx: Context<SweepUnclaimed>, round_id: u64) -> Result<()> {
    let cfg = &ctx.accounts.config;
    cfg.assert_admin(&ctx.accounts.admin.key())?;

    let current_slot = Clock::get()?.slot;
    let round = &mut ctx.accounts.round;
    round.mark_swept(cfg.claim_grace_slots, current_slot)?;

    let amount = ctx.accounts.stake_vault.amount;
    if amount > 0 {
        let round_le = round_id.to_le_bytes();
        let signer_seeds: &[&[&[u8]]] = &[&[ROUND_SEED, &round_le, &[round.bump]]];

        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.stake_vault.to_account_info(),
                    to: ctx.accounts.treasury.to_account_info(),
                    authority: round.to_account_info(),
                },
                signer_seeds,
            ),
            amount,
        )?;
    }

    emit!(RoundSwept {
        round_id,
        amount,
        slot: current_slot,
    });
    Ok(())
}

/// Returns a ticket's stake when the round never received a pulse.
/// Permissionless; the refund always goes to the ticket owner.
pub fn recover_funds(ctx: Context<RecoverFunds>, round_id: u64, nonce: u64) -> Result<()> {
    let current_slot = Clock::get()?.slot;
    let round = &mut ctx.accounts.round;
    round.assert_refundable(current_slot)?;

    let ticket = &mut ctx.accounts.ticket;
    ticket.mark_refunded(current_slot)?;

    let amount = round.stake_amount;
    let round_le = round_id.to_le_bytes();
    let signer_seeds: &[&[&[u8]]] = &[&[ROUND_SEED, &round_le, &[round.bump]]];

    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.stake_vault.to_account_info(),
                to: ctx.accounts.user_token_account.to_account_info(),
                authority: round.to_account_info(),
            },
            signer_seeds,
        ),
        amount,
    )?;

    round.record_refund()?;

    emit!(StakeRefunded {
        round_id,
        user: ticket.user,
        nonce,
        amount,
    });
    Ok(())
}
