use anchor_lang::prelude::*;

use crate::{
    codec::reveal_message,
    errors::WagerError,
    events::TicketsRevealed,
    sigverify::{assert_attestation, load_adjacent_attestations},
    state::Round,
    utils::{
        check_batch_len, check_single_user, load_ticket, store_ticket, RevealEntry,
        RevealSignedEntry,
    },
    RevealBatch, RevealBatchSigned, RevealTicket,
};

/// Opens every ticket in `remaining_accounts` against the pulse; returns wins.
fn reveal_remaining(
    program_id: &Pubkey,
    round: &mut Round,
    tickets: &[AccountInfo],
    user: &Pubkey,
    entries: &[RevealEntry],
    current_slot: u64,
) -> Result<u8> {
    let mut wins = 0u8;
    for (ticket_ai, e) in tickets.iter().zip(entries.iter()) {
        let mut ticket = load_ticket(program_id, ticket_ai, round.round_id)?;
        require_keys_eq!(ticket.user, *user, WagerError::TicketPdaMismatch);
        require!(ticket.nonce == e.nonce, WagerError::TicketPdaMismatch);

        let won = ticket.reveal(&round.pulse, e.guess, &e.salt, current_slot)?;
        round.record_reveal(won)?;
        if won {
            wins += 1;
        }

        store_ticket(ticket_ai, &ticket)?;
    }
    Ok(wins)
}

pub fn reveal_ticket(
    ctx: Context<RevealTicket>,
    round_id: u64,
    _nonce: u64,
    guess: u8,
    salt: [u8; 32],
) -> Result<()> {
    ctx.accounts.config.assert_live()?;
    require!(guess <= 1, WagerError::InvalidGuess);

    let current_slot = Clock::get()?.slot;
    let round = &mut ctx.accounts.round;
    round.assert_reveal_open(current_slot)?;

    let ticket = &mut ctx.accounts.ticket;
    let won = ticket.reveal(&round.pulse, guess, &salt, current_slot)?;
    round.record_reveal(won)?;

    emit!(TicketsRevealed {
        round_id,
        user: ticket.user,
        count: 1,
        wins: won as u8,
        gasless: false,
    });
    Ok(())
}

pub fn reveal_batch<'info>(
    ctx: Context<'_, '_, 'info, 'info, RevealBatch<'info>>,
    round_id: u64,
    entries: Vec<RevealEntry>,
) -> Result<()> {
    ctx.accounts.config.assert_live()?;
    check_batch_len(entries.len(), ctx.remaining_accounts.len())?;
    for e in entries.iter() {
        require!(e.guess <= 1, WagerError::InvalidGuess);
    }

    let current_slot = Clock::get()?.slot;
    let round = &mut ctx.accounts.round;
    round.assert_reveal_open(current_slot)?;

    let user_pk = ctx.accounts.user.key();
    let wins = reveal_remaining(
        ctx.program_id,
        round,
        ctx.remaining_accounts,
        &user_pk,
        &entries,
        current_slot,
    )?;

    emit!(TicketsRevealed {
        round_id,
        user: user_pk,
        count: entries.len() as u8,
        wins,
        gasless: false,
    });
    Ok(())
}

/// Gasless reveal. Tx layout: `[ ed25519_verify x N, reveal_batch_signed ]`.
pub fn reveal_batch_signed<'info>(
    ctx: Context<'_, '_, 'info, 'info, RevealBatchSigned<'info>>,
    round_id: u64,
    entries: Vec<RevealSignedEntry>,
) -> Result<()> {
    ctx.accounts.config.assert_live()?;
    check_batch_len(entries.len(), ctx.remaining_accounts.len())?;
    for e in entries.iter() {
        require!(e.guess <= 1, WagerError::InvalidGuess);
    }

    let current_slot = Clock::get()?.slot;
    let round = &mut ctx.accounts.round;
    round.assert_reveal_open(current_slot)?;

    let user_pk = entries[0].user;
    check_single_user(entries.iter().map(|e| &e.user), &user_pk)?;

    let ix_sys = ctx.accounts.instructions.to_account_info();
    let attestations = load_adjacent_attestations(&ix_sys, entries.len())?;
    for (att, e) in attestations.iter().zip(entries.iter()) {
        let expected = reveal_message(ctx.program_id, round_id, &e.user, e.nonce, e.guess, &e.salt);
        assert_attestation(att, &e.user, &expected)?;
    }

    let plain: Vec<RevealEntry> = entries
        .iter()
        .map(|e| RevealEntry {
            nonce: e.nonce,
            guess: e.guess,
            salt: e.salt,
        })
        .collect();
    let wins = reveal_remaining(
        ctx.program_id,
        round,
        ctx.remaining_accounts,
        &user_pk,
        &plain,
        current_slot,
    )?;

    emit!(TicketsRevealed {
        round_id,
        user: user_pk,
        count: entries.len() as u8,
        wins,
        gasless: true,
    });
    Ok(())
}
