use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::Instruction;

use pulse_wager::authority::OracleAuthority;
use pulse_wager::codec::{bit_index, commitment, pulse_bit, pulse_message, set_pulse_bit};
use pulse_wager::settlement::{claim_payout, settle_ticket, SettlementTally, TicketOutcome};
use pulse_wager::sigverify::{collect_adjacent_attestations, ed25519_verify_ix};
use pulse_wager::{
    Config, OracleSet, Round, RoundPhase, Ticket, WagerError, DEFAULT_CLAIM_GRACE_SLOTS,
    INITIAL_VERSION, REFUND_TIMEOUT_SLOTS,
};

const STAKE: u64 = 1_000;
const COMMIT_DEADLINE: u64 = 100;
const REVEAL_DEADLINE: u64 = 300;

fn expect_err<T: std::fmt::Debug>(res: Result<T>, expected: WagerError) {
    match res {
        Err(anchor_lang::error::Error::AnchorError(e)) => {
            assert_eq!(e.error_code_number, u32::from(expected), "got {}", e.error_name)
        }
        other => panic!("expected {expected:?}, got {other:?}"),
    }
}

fn open_round(round_id: u64) -> Round {
    Round::open(
        round_id,
        255,
        4_242,
        STAKE,
        COMMIT_DEADLINE,
        REVEAL_DEADLINE,
        10,
        Pubkey::new_unique(),
        254,
    )
}

fn config(oracle: Pubkey) -> Config {
    Config {
        admin: Pubkey::new_unique(),
        bump: 255,
        stake_amount: STAKE,
        commit_window_slots: 90,
        reveal_window_slots: 200,
        claim_grace_slots: DEFAULT_CLAIM_GRACE_SLOTS,
        oracle_pubkey: oracle,
        oracle_set: Pubkey::default(),
        use_oracle_set: false,
        paused: false,
        version: INITIAL_VERSION,
        stake_mint: Pubkey::new_unique(),
        treasury: Pubkey::new_unique(),
        treasury_bump: 253,
    }
}

struct Player {
    ticket: Ticket,
    guess: u8,
    salt: [u8; 32],
}

fn player(round_id: u64, nonce: u64, guess: u8) -> Player {
    let user = Pubkey::new_unique();
    let salt = [nonce as u8 ^ 0x5a; 32];
    let ticket = Ticket::committed(
        round_id,
        user,
        nonce,
        250,
        commitment(round_id, &user, nonce, guess, &salt),
        20,
    );
    Player { ticket, guess, salt }
}

fn commit(round: &mut Round, nonce: u64, guess: u8) -> Player {
    round.assert_commit_open(20).unwrap();
    round.record_commits(1).unwrap();
    player(round.round_id, nonce, guess)
}

fn reveal(round: &mut Round, p: &mut Player, slot: u64) -> bool {
    round.assert_reveal_open(slot).unwrap();
    let won = p.ticket.reveal(&round.pulse, p.guess, &p.salt, slot).unwrap();
    round.record_reveal(won).unwrap();
    won
}

fn loader(tx: Vec<Instruction>) -> impl FnMut(usize) -> Result<Instruction> {
    move |i| Ok(tx[i].clone())
}

#[test]
fn commit_pulse_reveal_settle_claim() {
    let mut round = open_round(1);
    let mut winner = commit(&mut round, 1, 1);
    // both guess 1; only the winner's bit is set
    let mut loser = player(round.round_id, 2, 1);
    while loser.ticket.bit_index == winner.ticket.bit_index {
        loser = player(round.round_id, 2, 1);
    }
    round.record_commits(1).unwrap();
    let mut silent = commit(&mut round, 3, 0);
    assert_eq!(round.committed_count, 3);
    assert_eq!(round.stake_for(3).unwrap(), 3 * STAKE);

    let mut pulse = [0u8; 64];
    set_pulse_bit(&mut pulse, winner.ticket.bit_index, 1);
    assert_eq!(pulse_bit(&pulse, loser.ticket.bit_index), 0);

    expect_err(round.apply_pulse(pulse, 99), WagerError::PulseNotYetDue);
    round.apply_pulse(pulse, 120).unwrap();
    assert_eq!(round.phase(150), RoundPhase::RevealOpen);

    assert!(reveal(&mut round, &mut winner, 200));
    assert!(!reveal(&mut round, &mut loser, 210));
    assert_eq!((round.revealed_count, round.win_count), (2, 1));

    expect_err(round.finalize(REVEAL_DEADLINE - 1), WagerError::WindowNotYetOpen);
    round.finalize(REVEAL_DEADLINE).unwrap();
    assert_eq!(round.phase(REVEAL_DEADLINE), RoundPhase::Finalized);

    round.assert_settlement_open().unwrap();
    let mut tally = SettlementTally::default();
    let outcomes: Vec<TicketOutcome> = [&mut winner, &mut loser, &mut silent]
        .into_iter()
        .map(|p| settle_ticket(&mut round, &mut p.ticket, &mut tally, 310).unwrap())
        .collect();
    assert_eq!(
        outcomes,
        vec![
            TicketOutcome::Earmarked,
            TicketOutcome::Forfeited,
            TicketOutcome::Forfeited
        ]
    );
    assert_eq!(tally.forfeit_amount, 2 * STAKE);
    assert!(silent.ticket.forfeited && !silent.ticket.revealed);
    assert!(round.close_settlement_if_complete(310));
    assert_eq!(round.phase(310), RoundPhase::Settled);

    round.assert_claim_window().unwrap();
    winner.ticket.assert_claimable().unwrap();
    expect_err(loser.ticket.assert_claimable(), WagerError::NotWinner);
    expect_err(silent.ticket.assert_claimable(), WagerError::TicketNotRevealed);

    let payout = claim_payout(round.stake_amount, 250).unwrap();
    assert_eq!(payout.refund, STAKE);
    assert_eq!(payout.fee, 25);
    assert_eq!(payout.reward, 975);

    winner.ticket.mark_claimed(400);
    expect_err(winner.ticket.assert_claimable(), WagerError::AlreadyClaimed);
}

#[test]
fn one_user_two_tickets_winner_claims_loser_feeds_treasury() {
    let stake = 1;
    let mut round = Round::open(
        9,
        255,
        0,
        stake,
        COMMIT_DEADLINE,
        REVEAL_DEADLINE,
        10,
        Pubkey::new_unique(),
        254,
    );
    let user = Pubkey::new_unique();
    let (salt1, salt2) = ([1u8; 32], [2u8; 32]);
    let mut t1 = Ticket::committed(9, user, 1, 250, commitment(9, &user, 1, 1, &salt1), 20);
    let mut t2 = Ticket::committed(9, user, 2, 249, commitment(9, &user, 2, 0, &salt2), 20);

    let mut user_balance = 10u64;
    let mut vault = 0u64;
    let mut treasury = 0u64;

    round.assert_commit_open(20).unwrap();
    let total = round.stake_for(2).unwrap();
    user_balance -= total;
    vault += total;
    round.record_commits(2).unwrap();

    // every bit set: both derived bits read 1
    let pulse = [0xffu8; 64];
    assert_eq!(pulse_bit(&pulse, t1.bit_index), 1);
    assert_eq!(pulse_bit(&pulse, t2.bit_index), 1);
    round.apply_pulse(pulse, 150).unwrap();

    assert!(t1.reveal(&round.pulse, 1, &salt1, 200).unwrap());
    round.record_reveal(true).unwrap();
    assert!(!t2.reveal(&round.pulse, 0, &salt2, 200).unwrap());
    round.record_reveal(false).unwrap();

    round.finalize(REVEAL_DEADLINE).unwrap();

    let mut tally = SettlementTally::default();
    settle_ticket(&mut round, &mut t1, &mut tally, 305).unwrap();
    settle_ticket(&mut round, &mut t2, &mut tally, 305).unwrap();
    assert!(round.close_settlement_if_complete(305));
    assert_eq!(tally.forfeit_amount, stake);
    vault -= tally.forfeit_amount;
    treasury += tally.forfeit_amount;

    expect_err(t2.assert_claimable(), WagerError::NotWinner);
    t1.assert_claimable().unwrap();
    let payout = claim_payout(round.stake_amount, 0).unwrap();
    vault -= payout.refund;
    user_balance += payout.refund + payout.reward;
    t1.mark_claimed(320);

    // the winning ticket's stake came back with a reward; the losing stake did not
    assert_eq!(user_balance, 10 - stake + payout.reward);
    assert_eq!(payout.reward, stake);
    assert_eq!(treasury, stake);
    assert_eq!(vault, 0);
}

#[test]
fn resubmitted_settlement_batch_is_a_no_op() {
    let mut round = open_round(2);
    let mut a = commit(&mut round, 1, 0);
    let mut b = commit(&mut round, 2, 1);
    round.apply_pulse([0u8; 64], 150).unwrap();
    round.finalize(REVEAL_DEADLINE + 5).unwrap();

    let mut first = SettlementTally::default();
    settle_ticket(&mut round, &mut a.ticket, &mut first, 320).unwrap();
    assert!(!round.close_settlement_if_complete(320));

    // retry of the same batch plus the missing ticket
    let mut second = SettlementTally::default();
    settle_ticket(&mut round, &mut a.ticket, &mut second, 330).unwrap();
    settle_ticket(&mut round, &mut b.ticket, &mut second, 330).unwrap();
    assert_eq!(
        second,
        SettlementTally {
            processed: 1,
            skipped: 1,
            forfeited: 1,
            earmarked: 0,
            forfeit_amount: STAKE,
        }
    );
    assert_eq!(round.settled_count, 2);
    assert!(round.close_settlement_if_complete(330));
    expect_err(round.assert_settlement_open(), WagerError::RoundTokensAlreadySettled);
}

#[test]
fn sweep_waits_for_grace_and_closes_claims() {
    let mut round = open_round(3);
    let mut p = commit(&mut round, 1, 0);
    let mut pulse = [0xffu8; 64];
    set_pulse_bit(&mut pulse, p.ticket.bit_index, 0);
    round.apply_pulse(pulse, 110).unwrap();
    assert!(reveal(&mut round, &mut p, 200));

    let grace = 900;
    expect_err(round.mark_swept(grace, REVEAL_DEADLINE + grace), WagerError::NotFinalized);
    round.finalize(REVEAL_DEADLINE).unwrap();
    let mut tally = SettlementTally::default();
    settle_ticket(&mut round, &mut p.ticket, &mut tally, 301).unwrap();
    round.close_settlement_if_complete(301);

    expect_err(
        round.mark_swept(grace, REVEAL_DEADLINE + grace - 1),
        WagerError::SweepTooEarly,
    );
    round.assert_claim_window().unwrap();

    round.mark_swept(grace, REVEAL_DEADLINE + grace).unwrap();
    assert_eq!(round.phase(REVEAL_DEADLINE + grace), RoundPhase::Swept);
    expect_err(round.assert_claim_window(), WagerError::ClaimAfterSweep);
    expect_err(round.mark_swept(grace, 5_000), WagerError::AlreadySwept);
}

#[test]
fn silent_oracle_makes_round_refundable() {
    let mut round = open_round(4);
    let mut p = commit(&mut round, 1, 1);
    let unlock = REVEAL_DEADLINE + REFUND_TIMEOUT_SLOTS;

    assert_eq!(round.phase(200), RoundPhase::AwaitingPulse);
    expect_err(round.apply_pulse([1u8; 64], REVEAL_DEADLINE - 10), WagerError::PulseTooLate);
    expect_err(round.assert_refundable(unlock), WagerError::RefundTooEarly);
    expect_err(round.finalize(unlock + 1), WagerError::PulseNotSet);

    assert_eq!(round.phase(unlock + 1), RoundPhase::Refundable);
    round.assert_refundable(unlock + 1).unwrap();
    p.ticket.mark_refunded(unlock + 1).unwrap();
    round.record_refund().unwrap();
    expect_err(p.ticket.mark_refunded(unlock + 2), WagerError::AlreadyRefunded);
    assert_eq!(round.refunded_count, 1);
}

#[test]
fn pulsed_round_never_refunds() {
    let mut round = open_round(5);
    commit(&mut round, 1, 1);
    round.apply_pulse([3u8; 64], 100).unwrap();
    assert!(!round.is_refundable(10_000));
    expect_err(round.assert_refundable(10_000), WagerError::PulseAlreadySet);
}

#[test]
fn stake_update_does_not_touch_running_round() {
    let mut cfg = config(Pubkey::new_unique());
    let (commit_deadline, reveal_deadline) = cfg.schedule(10, None, None).unwrap();
    assert_eq!((commit_deadline, reveal_deadline), (100, 300));

    let round = Round::open(
        6,
        255,
        0,
        cfg.stake_amount,
        commit_deadline,
        reveal_deadline,
        10,
        Pubkey::new_unique(),
        254,
    );
    cfg.stake_amount = 5 * STAKE;

    assert_eq!(round.stake_for(2).unwrap(), 2 * STAKE);
    assert_eq!(claim_payout(round.stake_amount, 0).unwrap().refund, STAKE);
}

#[test]
fn rotated_oracle_signs_the_next_pulse() {
    let program = pulse_wager::ID;
    let old_oracle = Pubkey::new_unique();
    let new_oracle = Pubkey::new_unique();
    let mut cfg = config(old_oracle);
    let round = open_round(7);
    let pulse = [9u8; 64];
    let msg = pulse_message(&program, round.round_id, round.pulse_index_target, &pulse);

    let tx = vec![ed25519_verify_ix(&old_oracle, &[1u8; 64], &msg), Instruction {
        program_id: program,
        accounts: vec![],
        data: vec![],
    }];
    let authority = OracleAuthority::resolve(&cfg, None).unwrap();
    let required = authority.required_attestations();
    let atts = collect_adjacent_attestations(1, required, loader(tx.clone())).unwrap();
    authority.verify(&atts, &msg).unwrap();

    cfg.oracle_pubkey = new_oracle;
    let authority = OracleAuthority::resolve(&cfg, None).unwrap();
    expect_err(authority.verify(&atts, &msg), WagerError::SignerMismatch);

    let tx = vec![ed25519_verify_ix(&new_oracle, &[2u8; 64], &msg), tx[1].clone()];
    let atts = collect_adjacent_attestations(1, 1, loader(tx)).unwrap();
    authority.verify(&atts, &msg).unwrap();
}

#[test]
fn threshold_oracles_need_distinct_adjacent_signers() {
    let program = pulse_wager::ID;
    let oracles: Vec<Pubkey> = (0..3).map(|_| Pubkey::new_unique()).collect();
    let set = OracleSet {
        admin: Pubkey::new_unique(),
        bump: 252,
        threshold: 2,
        oracles: oracles.clone(),
        version: INITIAL_VERSION,
    };
    set.validate().unwrap();

    let mut cfg = config(Pubkey::new_unique());
    cfg.use_oracle_set = true;
    expect_err(OracleAuthority::resolve(&cfg, None), WagerError::OracleNotSet);
    let authority = OracleAuthority::resolve(&cfg, Some(&set)).unwrap();
    assert_eq!(authority.required_attestations(), 2);

    let round = open_round(8);
    let msg = pulse_message(&program, round.round_id, round.pulse_index_target, &[4u8; 64]);
    let verify_from = |signers: &[Pubkey]| -> Result<()> {
        let mut tx: Vec<Instruction> = signers
            .iter()
            .map(|s| ed25519_verify_ix(s, &[7u8; 64], &msg))
            .collect();
        let current = tx.len();
        tx.push(Instruction {
            program_id: program,
            accounts: vec![],
            data: vec![],
        });
        let atts = collect_adjacent_attestations(current, 2, loader(tx))?;
        authority.verify(&atts, &msg)
    };

    verify_from(&[oracles[0], oracles[2]]).unwrap();
    expect_err(
        verify_from(&[oracles[1], oracles[1]]),
        WagerError::DuplicateOracleAttestation,
    );
    expect_err(
        verify_from(&[oracles[0], Pubkey::new_unique()]),
        WagerError::SignerMismatch,
    );
    expect_err(verify_from(&[oracles[0]]), WagerError::MissingOrInvalidSignatureAdjacency);
}

#[test]
fn bit_index_is_stable_across_commit_and_reveal() {
    let user = Pubkey::new_unique();
    let t = Ticket::committed(11, user, 3, 250, [0u8; 32], 1);
    assert_eq!(t.bit_index, bit_index(11, &user, 3));
    assert!(t.bit_index < 512);
}
