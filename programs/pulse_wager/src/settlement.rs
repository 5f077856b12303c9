//! Settlement Engine arithmetic.
//!
//! Settlement runs in caller-sized batches over many transactions. Each ticket
//! is processed at most once (its `token_settled` flag), so re-submitting a
//! batch only touches the tickets that are still pending.

use anchor_lang::prelude::*;

use crate::constants::MAX_FEE_BPS;
use crate::errors::WagerError;
use crate::state::{Round, Ticket};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TicketOutcome {
    /// Already processed by an earlier batch.
    Skipped,
    /// Unrevealed or losing: stake goes to the treasury.
    Forfeited,
    /// Revealed winner: stake stays in the vault until claim.
    Earmarked,
}

/// Totals for one `settle_round` call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SettlementTally {
    pub processed: u64,
    pub skipped: u64,
    pub forfeited: u64,
    pub earmarked: u64,
    /// Token amount to move vault -> treasury.
    pub forfeit_amount: u64,
}

pub fn settle_ticket(
    round: &mut Round,
    ticket: &mut Ticket,
    tally: &mut SettlementTally,
    current_slot: u64,
) -> Result<TicketOutcome> {
    require!(ticket.round_id == round.round_id, WagerError::TicketPdaMismatch);

    if ticket.token_settled {
        tally.skipped = tally.skipped.checked_add(1).ok_or(WagerError::MathOverflow)?;
        return Ok(TicketOutcome::Skipped);
    }

    let outcome = if ticket.is_winner() {
        TicketOutcome::Earmarked
    } else {
        TicketOutcome::Forfeited
    };

    ticket.token_settled = true;
    ticket.settled_slot = current_slot;

    match outcome {
        TicketOutcome::Forfeited => {
            ticket.forfeited = true;
            tally.forfeited = tally.forfeited.checked_add(1).ok_or(WagerError::MathOverflow)?;
            tally.forfeit_amount = tally
                .forfeit_amount
                .checked_add(round.stake_amount)
                .ok_or(WagerError::MathOverflow)?;
        }
        _ => {
            tally.earmarked = tally.earmarked.checked_add(1).ok_or(WagerError::MathOverflow)?;
        }
    }
    tally.processed = tally.processed.checked_add(1).ok_or(WagerError::MathOverflow)?;

    round.record_settled(outcome == TicketOutcome::Forfeited)?;
    Ok(outcome)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClaimPayout {
    /// Stake returned from the round vault.
    pub refund: u64,
    /// Newly minted to the winner.
    pub reward: u64,
    /// Newly minted to the reward fee pool.
    pub fee: u64,
}

/// A winner gets the stake back plus a reward equal to the stake, less the fee.
pub fn claim_payout(stake: u64, reward_fee_bps: u16) -> Result<ClaimPayout> {
    require!(reward_fee_bps <= MAX_FEE_BPS, WagerError::InvalidFeeBps);

    let fee = stake
        .checked_mul(reward_fee_bps as u64)
        .ok_or(WagerError::MathOverflow)?
        / MAX_FEE_BPS as u64;
    let reward = stake.checked_sub(fee).ok_or(WagerError::MathOverflow)?;

    Ok(ClaimPayout {
        refund: stake,
        reward,
        fee,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::commitment;
    use crate::errors::assert_err;

    fn finalized_round(committed: u64) -> Round {
        let mut r = Round::open(3, 255, 0, 25, 100, 300, 10, Pubkey::new_unique(), 254);
        r.record_commits(committed).unwrap();
        r.apply_pulse([0u8; 64], 120).unwrap();
        r.finalize(300).unwrap();
        r
    }

    fn ticket(round_id: u64, nonce: u64, guess: u8, reveal: bool) -> Ticket {
        let user = Pubkey::new_unique();
        let salt = [nonce as u8; 32];
        let mut t = Ticket::committed(
            round_id,
            user,
            nonce,
            250,
            commitment(round_id, &user, nonce, guess, &salt),
            20,
        );
        if reveal {
            // zero pulse: guess 0 wins, guess 1 loses
            t.reveal(&[0u8; 64], guess, &salt, 150).unwrap();
        }
        t
    }

    #[test]
    fn classifies_winners_losers_and_silent_tickets() {
        let mut round = finalized_round(3);
        let mut winner = ticket(3, 1, 0, true);
        let mut loser = ticket(3, 2, 1, true);
        let mut silent = ticket(3, 3, 0, false);
        let mut tally = SettlementTally::default();

        assert_eq!(
            settle_ticket(&mut round, &mut winner, &mut tally, 400).unwrap(),
            TicketOutcome::Earmarked
        );
        assert_eq!(
            settle_ticket(&mut round, &mut loser, &mut tally, 400).unwrap(),
            TicketOutcome::Forfeited
        );
        assert_eq!(
            settle_ticket(&mut round, &mut silent, &mut tally, 400).unwrap(),
            TicketOutcome::Forfeited
        );

        assert_eq!(tally.processed, 3);
        assert_eq!(tally.forfeit_amount, 50);
        assert!(!winner.forfeited && loser.forfeited && silent.forfeited);
        assert_eq!(round.settled_count, 3);
        assert_eq!(round.forfeited_count, 2);
        assert!(round.close_settlement_if_complete(400));
    }

    #[test]
    fn resubmitted_tickets_are_skipped() {
        let mut round = finalized_round(2);
        let mut a = ticket(3, 1, 1, true);
        let mut b = ticket(3, 2, 0, true);

        let mut first = SettlementTally::default();
        settle_ticket(&mut round, &mut a, &mut first, 400).unwrap();
        assert!(!round.close_settlement_if_complete(400));

        let mut second = SettlementTally::default();
        assert_eq!(
            settle_ticket(&mut round, &mut a, &mut second, 401).unwrap(),
            TicketOutcome::Skipped
        );
        settle_ticket(&mut round, &mut b, &mut second, 401).unwrap();

        assert_eq!(
            second,
            SettlementTally {
                processed: 1,
                skipped: 1,
                forfeited: 0,
                earmarked: 1,
                forfeit_amount: 0
            }
        );
        assert_eq!(a.settled_slot, 400);
        assert_eq!(round.settled_count, 2);
        assert!(round.close_settlement_if_complete(401));
    }

    #[test]
    fn foreign_round_ticket_is_rejected() {
        let mut round = finalized_round(1);
        let mut t = ticket(4, 1, 0, true);
        let mut tally = SettlementTally::default();
        assert_err(
            settle_ticket(&mut round, &mut t, &mut tally, 400),
            WagerError::TicketPdaMismatch,
        );
        assert!(!t.token_settled);
        assert_eq!(round.settled_count, 0);
    }

    #[test]
    fn payout_splits_reward_fee() {
        let payout = |refund, reward, fee| ClaimPayout { refund, reward, fee };
        assert_eq!(claim_payout(1_000, 0).unwrap(), payout(1_000, 1_000, 0));
        assert_eq!(claim_payout(1_000, 250).unwrap(), payout(1_000, 975, 25));
        assert_eq!(claim_payout(1, 100).unwrap(), payout(1, 1, 0));
        assert_eq!(claim_payout(7, 10_000).unwrap().reward, 0);
        assert_err(claim_payout(7, 10_001), WagerError::InvalidFeeBps);
    }
}
