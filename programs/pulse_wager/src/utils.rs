use anchor_lang::prelude::*;
use anchor_lang::solana_program::{
    program::{invoke, invoke_signed},
    system_instruction, system_program,
};

use crate::{constants::*, errors::WagerError, state::Ticket};

// ---------------
// Batch payloads
// ---------------
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct CommitEntry {
    pub nonce: u64,
    pub commitment: [u8; 32],
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct RevealEntry {
    pub nonce: u64,
    pub guess: u8,      // 0/1
    pub salt: [u8; 32], // 32 bytes
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct CommitSignedEntry {
    pub user: Pubkey,
    pub nonce: u64,
    pub commitment: [u8; 32],
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct RevealSignedEntry {
    pub user: Pubkey,
    pub nonce: u64,
    pub guess: u8,
    pub salt: [u8; 32],
}

pub fn check_batch_len(entries: usize, accounts: usize) -> Result<()> {
    require!(entries > 0, WagerError::EmptyBatch);
    require!(entries <= MAX_BATCH, WagerError::TooManyEntries);
    require!(accounts == entries, WagerError::TicketPdaMismatch);
    Ok(())
}

/// A signed batch authorizes one user only.
pub fn check_single_user<'a, I>(users: I, user: &Pubkey) -> Result<()>
where
    I: IntoIterator<Item = &'a Pubkey>,
{
    for u in users {
        require_keys_eq!(*u, *user, WagerError::SignedBatchMixedUsers);
    }
    Ok(())
}

// -----------------
// Ticket accounts
// -----------------
pub fn ticket_address(
    program_id: &Pubkey,
    round_id: u64,
    user: &Pubkey,
    nonce: u64,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            TICKET_SEED,
            &round_id.to_le_bytes(),
            user.as_ref(),
            &nonce.to_le_bytes(),
        ],
        program_id,
    )
}

/// Checks the supplied account is the ticket PDA and that no ticket lives there yet.
/// A system-owned account with no data is vacant even if someone pre-funded it.
/// Returns the PDA bump.
pub fn ensure_ticket_vacant(
    program_id: &Pubkey,
    ticket_ai: &AccountInfo,
    round_id: u64,
    user: &Pubkey,
    nonce: u64,
) -> Result<u8> {
    let (expected, bump) = ticket_address(program_id, round_id, user, nonce);
    require_keys_eq!(expected, *ticket_ai.key, WagerError::TicketPdaMismatch);
    require!(
        *ticket_ai.owner == system_program::ID && ticket_ai.data_is_empty(),
        WagerError::TicketAlreadyExists
    );
    Ok(bump)
}

/// Allocates the ticket PDA (rent from `payer`) and writes the committed ticket.
///
/// Mirrors Anchor's `init`: an unfunded address is created in one call, a
/// pre-funded one is topped up to rent exemption, then allocated and assigned.
pub fn create_ticket_account<'info>(
    program_id: &Pubkey,
    payer: &AccountInfo<'info>,
    ticket_ai: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
    ticket: &Ticket,
) -> Result<()> {
    let bump = ensure_ticket_vacant(
        program_id,
        ticket_ai,
        ticket.round_id,
        &ticket.user,
        ticket.nonce,
    )?;
    require!(bump == ticket.bump, WagerError::TicketPdaMismatch);

    let space = 8 + Ticket::INIT_SPACE;
    let rent_exempt = Rent::get()?.minimum_balance(space);

    let round_le = ticket.round_id.to_le_bytes();
    let nonce_le = ticket.nonce.to_le_bytes();
    let ticket_signer: &[&[&[u8]]] = &[&[
        TICKET_SEED,
        &round_le,
        ticket.user.as_ref(),
        &nonce_le,
        &[bump],
    ]];

    let current_lamports = ticket_ai.lamports();
    if current_lamports == 0 {
        let ix = system_instruction::create_account(
            payer.key,
            ticket_ai.key,
            rent_exempt,
            space as u64,
            program_id,
        );
        invoke_signed(
            &ix,
            &[payer.clone(), ticket_ai.clone(), system_program.clone()],
            ticket_signer,
        )?;
    } else {
        let top_up = rent_exempt.saturating_sub(current_lamports);
        if top_up > 0 {
            invoke(
                &system_instruction::transfer(payer.key, ticket_ai.key, top_up),
                &[payer.clone(), ticket_ai.clone(), system_program.clone()],
            )?;
        }
        invoke_signed(
            &system_instruction::allocate(ticket_ai.key, space as u64),
            &[ticket_ai.clone(), system_program.clone()],
            ticket_signer,
        )?;
        invoke_signed(
            &system_instruction::assign(ticket_ai.key, program_id),
            &[ticket_ai.clone(), system_program.clone()],
            ticket_signer,
        )?;
    }

    store_ticket(ticket_ai, ticket)
}

/// Deserializes a ticket passed as a remaining account, checking owner and PDA.
pub fn load_ticket(program_id: &Pubkey, ticket_ai: &AccountInfo, round_id: u64) -> Result<Ticket> {
    require_keys_eq!(*ticket_ai.owner, *program_id, WagerError::TicketNotOwnedByProgram);

    let ticket = {
        let data = ticket_ai
            .try_borrow_data()
            .map_err(|_| error!(WagerError::AccountBorrowFailed))?;
        let mut slice: &[u8] = &data;
        Ticket::try_deserialize(&mut slice)?
    };

    require!(ticket.round_id == round_id, WagerError::TicketPdaMismatch);
    let (expected, _) = ticket_address(program_id, round_id, &ticket.user, ticket.nonce);
    require_keys_eq!(expected, *ticket_ai.key, WagerError::TicketPdaMismatch);

    Ok(ticket)
}

pub fn store_ticket(ticket_ai: &AccountInfo, ticket: &Ticket) -> Result<()> {
    let mut data = ticket_ai
        .try_borrow_mut_data()
        .map_err(|_| error!(WagerError::AccountBorrowFailed))?;
    let mut w = std::io::Cursor::new(&mut data[..]);
    ticket.try_serialize(&mut w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_len_bounds() {
        assert!(check_batch_len(1, 1).is_ok());
        assert!(check_batch_len(MAX_BATCH, MAX_BATCH).is_ok());
        crate::errors::assert_err(check_batch_len(0, 0), WagerError::EmptyBatch);
        crate::errors::assert_err(
            check_batch_len(MAX_BATCH + 1, MAX_BATCH + 1),
            WagerError::TooManyEntries,
        );
        crate::errors::assert_err(check_batch_len(2, 1), WagerError::TicketPdaMismatch);
    }

    #[test]
    fn signed_batch_rejects_second_user() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        assert!(check_single_user([a, a, a].iter(), &a).is_ok());
        crate::errors::assert_err(
            check_single_user([a, b].iter(), &a),
            WagerError::SignedBatchMixedUsers,
        );
    }

    #[test]
    fn ticket_pda_is_keyed_by_round_user_nonce() {
        let program = crate::ID;
        let user = Pubkey::new_unique();
        let (base, _) = ticket_address(&program, 1, &user, 1);
        assert_ne!(base, ticket_address(&program, 2, &user, 1).0);
        assert_ne!(base, ticket_address(&program, 1, &Pubkey::new_unique(), 1).0);
        assert_ne!(base, ticket_address(&program, 1, &user, 2).0);
        assert_eq!(base, ticket_address(&program, 1, &user, 1).0);
    }

    #[test]
    fn occupied_ticket_slot_is_rejected() {
        let program = crate::ID;
        let user = Pubkey::new_unique();
        let (key, bump) = ticket_address(&program, 9, &user, 4);

        let mut lamports = 0u64;
        let mut data: Vec<u8> = vec![];
        let system = system_program::ID;
        let ai = AccountInfo::new(&key, false, true, &mut lamports, &mut data, &system, false, 0);
        assert_eq!(ensure_ticket_vacant(&program, &ai, 9, &user, 4).unwrap(), bump);
        crate::errors::assert_err(
            ensure_ticket_vacant(&program, &ai, 9, &user, 5),
            WagerError::TicketPdaMismatch,
        );

        let mut lamports = 1_000u64;
        let mut data = vec![0u8; 8 + Ticket::INIT_SPACE];
        let ai = AccountInfo::new(&key, false, true, &mut lamports, &mut data, &program, false, 0);
        crate::errors::assert_err(
            ensure_ticket_vacant(&program, &ai, 9, &user, 4),
            WagerError::TicketAlreadyExists,
        );

        // assigned to us but not yet written
        let mut lamports = 1_000u64;
        let mut data: Vec<u8> = vec![];
        let ai = AccountInfo::new(&key, false, true, &mut lamports, &mut data, &program, false, 0);
        crate::errors::assert_err(
            ensure_ticket_vacant(&program, &ai, 9, &user, 4),
            WagerError::TicketAlreadyExists,
        );

        let mut lamports = 1_000u64;
        let mut data = vec![0u8; 16];
        let ai = AccountInfo::new(&key, false, true, &mut lamports, &mut data, &system, false, 0);
        crate::errors::assert_err(
            ensure_ticket_vacant(&program, &ai, 9, &user, 4),
            WagerError::TicketAlreadyExists,
        );
    }

    #[test]
    fn prefunded_ticket_address_stays_vacant() {
        let program = crate::ID;
        let user = Pubkey::new_unique();
        let (key, bump) = ticket_address(&program, 9, &user, 4);

        // a stray lamport transfer must not burn the nonce
        let mut lamports = 1u64;
        let mut data: Vec<u8> = vec![];
        let system = system_program::ID;
        let ai = AccountInfo::new(&key, false, true, &mut lamports, &mut data, &system, false, 0);
        assert_eq!(ensure_ticket_vacant(&program, &ai, 9, &user, 4).unwrap(), bump);
    }

    #[test]
    fn stored_ticket_loads_back_with_owner_and_pda_checks() {
        let program = crate::ID;
        let user = Pubkey::new_unique();
        let (key, bump) = ticket_address(&program, 9, &user, 4);
        let ticket = Ticket::committed(9, user, 4, bump, [6u8; 32], 77);

        let mut lamports = 1_000u64;
        let mut data = vec![0u8; 8 + Ticket::INIT_SPACE];
        let ai = AccountInfo::new(&key, false, true, &mut lamports, &mut data, &program, false, 0);
        store_ticket(&ai, &ticket).unwrap();

        let loaded = load_ticket(&program, &ai, 9).unwrap();
        assert_eq!(loaded.commitment, [6u8; 32]);
        assert_eq!(loaded.bit_index, ticket.bit_index);
        crate::errors::assert_err(
            load_ticket(&program, &ai, 10).map(|_| ()),
            WagerError::TicketPdaMismatch,
        );

        let mut lamports = 1_000u64;
        let mut foreign = vec![0u8; 8 + Ticket::INIT_SPACE];
        let stranger = Pubkey::new_unique();
        let ai = AccountInfo::new(
            &key,
            false,
            true,
            &mut lamports,
            &mut foreign,
            &stranger,
            false,
            0,
        );
        store_ticket(&ai, &ticket).unwrap();
        crate::errors::assert_err(
            load_ticket(&program, &ai, 9).map(|_| ()),
            WagerError::TicketNotOwnedByProgram,
        );
    }
}
