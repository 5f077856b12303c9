use anchor_lang::prelude::*;
use anchor_spl::token::{self, Transfer};

use crate::{
    codec::commit_message,
    errors::WagerError,
    events::TicketsCommitted,
    sigverify::{assert_attestation, load_adjacent_attestations},
    state::Ticket,
    utils::{
        check_batch_len, check_single_user, create_ticket_account, ensure_ticket_vacant,
        ticket_address, CommitEntry, CommitSignedEntry,
    },
    CommitBatch, CommitBatchSigned, CommitTicket,
};

#[allow(clippy::too_many_arguments)]
fn open_ticket<'info>(
    program_id: &Pubkey,
    payer: &AccountInfo<'info>,
    ticket_ai: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
    round_id: u64,
    user: Pubkey,
    entry: &CommitEntry,
    current_slot: u64,
) -> Result<()> {
    let (_, bump) = ticket_address(program_id, round_id, &user, entry.nonce);
    let ticket = Ticket::committed(
        round_id,
        user,
        entry.nonce,
        bump,
        entry.commitment,
        current_slot,
    );
    create_ticket_account(program_id, payer, ticket_ai, system_program, &ticket)
}

pub fn commit_ticket(
    ctx: Context<CommitTicket>,
    round_id: u64,
    nonce: u64,
    commitment: [u8; 32],
) -> Result<()> {
    ctx.accounts.config.assert_live()?;

    let current_slot = Clock::get()?.slot;
    let round = &mut ctx.accounts.round;
    round.assert_commit_open(current_slot)?;

    let user_pk = ctx.accounts.user.key();
    ensure_ticket_vacant(ctx.program_id, &ctx.accounts.ticket, round_id, &user_pk, nonce)?;

    let stake = round.stake_for(1)?;
    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.user_token_account.to_account_info(),
                to: ctx.accounts.stake_vault.to_account_info(),
                authority: ctx.accounts.user.to_account_info(),
            },
        ),
        stake,
    )?;

    open_ticket(
        ctx.program_id,
        &ctx.accounts.user.to_account_info(),
        &ctx.accounts.ticket.to_account_info(),
        &ctx.accounts.system_program.to_account_info(),
        round_id,
        user_pk,
        &CommitEntry { nonce, commitment },
        current_slot,
    )?;

    round.record_commits(1)?;

    emit!(TicketsCommitted {
        round_id,
        user: user_pk,
        count: 1,
        stake_total: stake,
        gasless: false,
    });
    Ok(())
}

pub fn commit_batch<'info>(
    ctx: Context<'_, '_, 'info, 'info, CommitBatch<'info>>,
    round_id: u64,
    entries: Vec<CommitEntry>,
) -> Result<()> {
    ctx.accounts.config.assert_live()?;
    check_batch_len(entries.len(), ctx.remaining_accounts.len())?;

    let current_slot = Clock::get()?.slot;
    let round = &mut ctx.accounts.round;
    round.assert_commit_open(current_slot)?;

    let user_pk = ctx.accounts.user.key();
    for (ticket_ai, e) in ctx.remaining_accounts.iter().zip(entries.iter()) {
        ensure_ticket_vacant(ctx.program_id, ticket_ai, round_id, &user_pk, e.nonce)?;
    }

    let n = entries.len() as u64;
    let total = round.stake_for(n)?;
    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.user_token_account.to_account_info(),
                to: ctx.accounts.stake_vault.to_account_info(),
                authority: ctx.accounts.user.to_account_info(),
            },
        ),
        total,
    )?;

    let payer = ctx.accounts.user.to_account_info();
    let system_program = ctx.accounts.system_program.to_account_info();
    for (ticket_ai, e) in ctx.remaining_accounts.iter().zip(entries.iter()) {
        // a nonce repeated inside the batch fails here with TicketAlreadyExists
        open_ticket(
            ctx.program_id,
            &payer,
            ticket_ai,
            &system_program,
            round_id,
            user_pk,
            e,
            current_slot,
        )?;
    }

    round.record_commits(n)?;

    emit!(TicketsCommitted {
        round_id,
        user: user_pk,
        count: entries.len() as u8,
        stake_total: total,
        gasless: false,
    });
    Ok(())
}

/// Gasless commit: the relayer pays fees and rent, the stake comes out of the
/// user's escrow. Tx layout: `[ ed25519_verify x N, commit_batch_signed ]`,
/// one verify instruction per entry, in entry order.
pub fn commit_batch_signed<'info>(
    ctx: Context<'_, '_, 'info, 'info, CommitBatchSigned<'info>>,
    round_id: u64,
    entries: Vec<CommitSignedEntry>,
) -> Result<()> {
    ctx.accounts.config.assert_live()?;
    check_batch_len(entries.len(), ctx.remaining_accounts.len())?;

    let current_slot = Clock::get()?.slot;
    let round = &mut ctx.accounts.round;
    round.assert_commit_open(current_slot)?;

    let user_pk = ctx.accounts.user.key();
    check_single_user(entries.iter().map(|e| &e.user), &user_pk)?;

    // --- ed25519 introspection ---
    let ix_sys = ctx.accounts.instructions.to_account_info();
    let attestations = load_adjacent_attestations(&ix_sys, entries.len())?;
    for (att, e) in attestations.iter().zip(entries.iter()) {
        let expected = commit_message(ctx.program_id, round_id, &e.user, e.nonce, &e.commitment);
        assert_attestation(att, &e.user, &expected)?;
    }

    // validate PDAs + reject replay before moving funds
    for (ticket_ai, e) in ctx.remaining_accounts.iter().zip(entries.iter()) {
        ensure_ticket_vacant(ctx.program_id, ticket_ai, round_id, &user_pk, e.nonce)?;
    }

    // --- escrow -> stake vault ---
    let n = entries.len() as u64;
    let total = round.stake_for(n)?;
    require!(
        ctx.accounts.user_escrow_vault.amount >= total,
        WagerError::InsufficientEscrow
    );

    let escrow_bump = ctx.accounts.user_escrow.bump;
    let escrow_signer: &[&[&[u8]]] =
        &[&[crate::USER_ESCROW_SEED, user_pk.as_ref(), &[escrow_bump]]];
    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.user_escrow_vault.to_account_info(),
                to: ctx.accounts.stake_vault.to_account_info(),
                authority: ctx.accounts.user_escrow.to_account_info(),
            },
            escrow_signer,
        ),
        total,
    )?;
    ctx.accounts.user_escrow.record_debit(total, current_slot)?;

    // --- ticket PDAs (rent paid by relayer) ---
    let payer = ctx.accounts.payer.to_account_info();
    let system_program = ctx.accounts.system_program.to_account_info();
    for (ticket_ai, e) in ctx.remaining_accounts.iter().zip(entries.iter()) {
        let entry = CommitEntry {
            nonce: e.nonce,
            commitment: e.commitment,
        };
        open_ticket(
            ctx.program_id,
            &payer,
            ticket_ai,
            &system_program,
            round_id,
            user_pk,
            &entry,
            current_slot,
        )?;
    }

    round.record_commits(n)?;

    emit!(TicketsCommitted {
        round_id,
        user: user_pk,
        count: entries.len() as u8,
        stake_total: total,
        gasless: true,
    });
    Ok(())
}
