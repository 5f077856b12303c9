use anchor_lang::prelude::*;

use crate::codec::{bit_index, commitment, pulse_bit};
use crate::constants::*;
use crate::errors::WagerError;

#[account]
#[derive(InitSpace)]
pub struct Config {
    pub admin: Pubkey,
    pub bump: u8,

    pub stake_amount: u64,
    pub commit_window_slots: u64,
    pub reveal_window_slots: u64,

    // grace period for claims before sweeping vault
    pub claim_grace_slots: u64,

    // single oracle allowed to set pulse via ed25519 introspection
    pub oracle_pubkey: Pubkey,

    // threshold mode: OracleSet PDA (default until initialized) + switch
    pub oracle_set: Pubkey,
    pub use_oracle_set: bool,

    pub paused: bool,
    pub version: u16,

    pub stake_mint: Pubkey,

    // Treasury SPL (forfeited + swept stakes)
    pub treasury: Pubkey,
    pub treasury_bump: u8,
}

impl Config {
    pub fn assert_admin(&self, signer: &Pubkey) -> Result<()> {
        require_keys_eq!(self.admin, *signer, WagerError::Unauthorized);
        Ok(())
    }

    pub fn assert_live(&self) -> Result<()> {
        require!(!self.paused, WagerError::Paused);
        Ok(())
    }

    /// Resolves round deadlines, deriving missing ones from the configured windows.
    pub fn schedule(
        &self,
        current_slot: u64,
        commit_deadline_slot: Option<u64>,
        reveal_deadline_slot: Option<u64>,
    ) -> Result<(u64, u64)> {
        let commit = match commit_deadline_slot {
            Some(slot) => slot,
            None => current_slot
                .checked_add(self.commit_window_slots)
                .ok_or(WagerError::MathOverflow)?,
        };
        let reveal = match reveal_deadline_slot {
            Some(slot) => slot,
            None => commit
                .checked_add(self.reveal_window_slots)
                .ok_or(WagerError::MathOverflow)?,
        };

        require!(current_slot < commit, WagerError::InvalidDeadlines);
        require!(commit < reveal, WagerError::InvalidDeadlines);
        require!(
            reveal - commit >= MIN_REVEAL_WINDOW_SLOTS,
            WagerError::RevealWindowTooShort
        );

        Ok((commit, reveal))
    }
}

#[account]
#[derive(InitSpace)]
pub struct RoundRegistry {
    pub admin: Pubkey,
    pub bump: u8,
    pub next_round_id: u64,
    pub version: u16,
}

impl RoundRegistry {
    /// Hands out the next round id. Must run in the same instruction that
    /// creates the Round PDA seeded by the returned id.
    pub fn allocate(&mut self) -> Result<u64> {
        let id = self.next_round_id;
        self.next_round_id = id.checked_add(1).ok_or(WagerError::MathOverflow)?;
        Ok(id)
    }
}

#[account]
#[derive(InitSpace)]
pub struct OracleSet {
    pub admin: Pubkey,
    pub bump: u8,

    /// Minimum number of distinct oracle attestations per pulse.
    pub threshold: u8,

    /// NOTE: fixed max_len to keep account size deterministic.
    #[max_len(16)]
    pub oracles: Vec<Pubkey>,

    pub version: u16,
}

impl OracleSet {
    fn check_threshold(threshold: u8, count: usize) -> Result<()> {
        require!(threshold > 0, WagerError::InvalidThreshold);
        require!((threshold as usize) <= MAX_ORACLES, WagerError::InvalidThreshold);
        require!(
            (threshold as usize) <= count,
            WagerError::ThresholdExceedsOracleCount
        );
        Ok(())
    }

    pub fn validate_initial(threshold: u8, oracles: &[Pubkey]) -> Result<()> {
        require!(oracles.len() <= MAX_ORACLES, WagerError::OracleSetFull);
        for (i, pk) in oracles.iter().enumerate() {
            require!(*pk != Pubkey::default(), WagerError::OracleNotFound);
            require!(!oracles[..i].contains(pk), WagerError::OracleAlreadyExists);
        }
        Self::check_threshold(threshold, oracles.len())
    }

    pub fn add(&mut self, oracle: Pubkey) -> Result<()> {
        require!(oracle != Pubkey::default(), WagerError::OracleNotFound);
        require!(self.oracles.len() < MAX_ORACLES, WagerError::OracleSetFull);
        require!(!self.is_member(&oracle), WagerError::OracleAlreadyExists);
        self.oracles.push(oracle);
        Ok(())
    }

    /// Rejected up front when the removal would leave fewer oracles than the
    /// threshold; lower the threshold first.
    pub fn remove(&mut self, oracle: &Pubkey) -> Result<()> {
        let pos = self
            .oracles
            .iter()
            .position(|x| x == oracle)
            .ok_or(WagerError::OracleNotFound)?;
        require!(
            (self.threshold as usize) < self.oracles.len(),
            WagerError::ThresholdExceedsOracleCount
        );
        self.oracles.remove(pos);
        Ok(())
    }

    pub fn set_threshold(&mut self, threshold: u8) -> Result<()> {
        Self::check_threshold(threshold, self.oracles.len())?;
        self.threshold = threshold;
        Ok(())
    }

    /// `1 <= threshold <= |oracles|`
    pub fn validate(&self) -> Result<()> {
        Self::check_threshold(self.threshold, self.oracles.len())
    }

    pub fn is_member(&self, key: &Pubkey) -> bool {
        self.oracles.contains(key)
    }
}

#[account]
#[derive(InitSpace)]
pub struct UserEscrow {
    pub user: Pubkey,
    pub bump: u8,
    pub created_slot: u64,
    pub updated_slot: u64,
    pub total_deposited: u64,
    pub total_debited: u64,
    pub total_withdrawn: u64,
}

impl UserEscrow {
    pub fn record_deposit(&mut self, amount: u64, slot: u64) -> Result<()> {
        self.total_deposited = self
            .total_deposited
            .checked_add(amount)
            .ok_or(WagerError::MathOverflow)?;
        self.updated_slot = slot;
        Ok(())
    }

    pub fn record_withdrawal(&mut self, amount: u64, slot: u64) -> Result<()> {
        self.total_withdrawn = self
            .total_withdrawn
            .checked_add(amount)
            .ok_or(WagerError::MathOverflow)?;
        self.updated_slot = slot;
        Ok(())
    }

    /// Tokens the escrow should still hold.
    pub fn balance(&self) -> Result<u64> {
        self.total_deposited
            .checked_sub(self.total_debited)
            .and_then(|v| v.checked_sub(self.total_withdrawn))
            .ok_or_else(|| error!(WagerError::MathOverflow))
    }

    pub fn record_debit(&mut self, amount: u64, slot: u64) -> Result<()> {
        self.total_debited = self
            .total_debited
            .checked_add(amount)
            .ok_or(WagerError::MathOverflow)?;
        self.updated_slot = slot;
        Ok(())
    }
}

#[account]
#[derive(InitSpace)]
pub struct Tokenomics {
    pub admin: Pubkey,
    pub bump: u8,

    /// Fee charged on minted rewards (basis points). 100 = 1%.
    pub reward_fee_bps: u16,

    pub reward_fee_pool: Pubkey,
    pub reward_fee_pool_bump: u8,

    pub version: u16,
}

impl Tokenomics {
    pub fn validate_fee_bps(bps: u16) -> Result<()> {
        require!(bps <= MAX_FEE_BPS, WagerError::InvalidFeeBps);
        Ok(())
    }
}

/// Where a round stands at a given slot. Derived, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundPhase {
    CommitOpen,
    AwaitingPulse,
    RevealOpen,
    RevealClosed,
    Refundable,
    Finalized,
    Settled,
    Swept,
}

#[account]
#[derive(InitSpace)]
pub struct Round {
    pub round_id: u64,
    pub bump: u8,

    pub pulse_index_target: u64,
    // snapshot of config.stake_amount at creation
    pub stake_amount: u64,

    pub commit_deadline_slot: u64,
    pub reveal_deadline_slot: u64,
    pub created_slot: u64,

    pub pulse_set: bool,
    pub pulse: [u8; 64], // 512 bits
    pub pulse_set_slot: u64,

    pub committed_count: u64,
    pub revealed_count: u64,
    pub win_count: u64,

    // settlement progress
    pub settled_count: u64,
    pub forfeited_count: u64,
    pub token_settled: bool,
    pub token_settled_slot: u64,

    pub refunded_count: u64,

    pub finalized: bool,
    pub finalized_slot: u64,

    pub swept: bool,
    pub swept_slot: u64,

    // SPL stake vault per round (authority = this Round PDA)
    pub stake_vault: Pubkey,
    pub stake_vault_bump: u8,
}

impl Round {
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        round_id: u64,
        bump: u8,
        pulse_index_target: u64,
        stake_amount: u64,
        commit_deadline_slot: u64,
        reveal_deadline_slot: u64,
        created_slot: u64,
        stake_vault: Pubkey,
        stake_vault_bump: u8,
    ) -> Self {
        Self {
            round_id,
            bump,
            pulse_index_target,
            stake_amount,
            commit_deadline_slot,
            reveal_deadline_slot,
            created_slot,
            pulse_set: false,
            pulse: [0u8; 64],
            pulse_set_slot: 0,
            committed_count: 0,
            revealed_count: 0,
            win_count: 0,
            settled_count: 0,
            forfeited_count: 0,
            token_settled: false,
            token_settled_slot: 0,
            refunded_count: 0,
            finalized: false,
            finalized_slot: 0,
            swept: false,
            swept_slot: 0,
            stake_vault,
            stake_vault_bump,
        }
    }

    pub fn phase(&self, current_slot: u64) -> RoundPhase {
        if self.swept {
            RoundPhase::Swept
        } else if self.token_settled {
            RoundPhase::Settled
        } else if self.finalized {
            RoundPhase::Finalized
        } else if self.pulse_set {
            if current_slot < self.reveal_deadline_slot {
                RoundPhase::RevealOpen
            } else {
                RoundPhase::RevealClosed
            }
        } else if current_slot < self.commit_deadline_slot {
            RoundPhase::CommitOpen
        } else if self.is_refundable(current_slot) {
            RoundPhase::Refundable
        } else {
            RoundPhase::AwaitingPulse
        }
    }

    // -----------------
    // commit
    // -----------------
    pub fn assert_commit_open(&self, current_slot: u64) -> Result<()> {
        require!(!self.finalized, WagerError::RoundFinalized);
        require!(!self.pulse_set, WagerError::CommitAfterPulseSet);
        require!(
            current_slot < self.commit_deadline_slot,
            WagerError::WindowClosed
        );
        Ok(())
    }

    pub fn record_commits(&mut self, n: u64) -> Result<()> {
        self.committed_count = self
            .committed_count
            .checked_add(n)
            .ok_or(WagerError::MathOverflow)?;
        Ok(())
    }

    pub fn stake_for(&self, n: u64) -> Result<u64> {
        self.stake_amount
            .checked_mul(n)
            .ok_or_else(|| error!(WagerError::MathOverflow))
    }

    // -----------------
    // pulse
    // -----------------
    pub fn assert_pulse_due(&self, current_slot: u64) -> Result<()> {
        require!(!self.pulse_set, WagerError::PulseAlreadySet);
        require!(!self.finalized, WagerError::RoundFinalized);
        require!(
            current_slot >= self.commit_deadline_slot,
            WagerError::PulseNotYetDue
        );
        // Too close to the reveal deadline: leave the round pulse-less so it
        // becomes refundable instead of giving users no time to reveal.
        require!(
            current_slot.saturating_add(LATE_PULSE_SAFETY_BUFFER_SLOTS) < self.reveal_deadline_slot,
            WagerError::PulseTooLate
        );
        Ok(())
    }

    /// Callers authenticate the pulse before applying it.
    pub fn apply_pulse(&mut self, pulse: [u8; 64], current_slot: u64) -> Result<()> {
        self.assert_pulse_due(current_slot)?;
        self.pulse = pulse;
        self.pulse_set = true;
        self.pulse_set_slot = current_slot;
        Ok(())
    }

    // -----------------
    // reveal
    // -----------------
    pub fn assert_reveal_open(&self, current_slot: u64) -> Result<()> {
        require!(!self.finalized, WagerError::RoundFinalized);
        require!(self.pulse_set, WagerError::PulseNotSet);
        require!(
            current_slot < self.reveal_deadline_slot,
            WagerError::WindowClosed
        );
        Ok(())
    }

    pub fn record_reveal(&mut self, won: bool) -> Result<()> {
        self.revealed_count = self
            .revealed_count
            .checked_add(1)
            .ok_or(WagerError::MathOverflow)?;
        if won {
            self.win_count = self.win_count.checked_add(1).ok_or(WagerError::MathOverflow)?;
        }
        Ok(())
    }

    // -----------------
    // finalize
    // -----------------
    pub fn finalize(&mut self, current_slot: u64) -> Result<()> {
        require!(!self.finalized, WagerError::AlreadyFinalized);
        require!(self.pulse_set, WagerError::PulseNotSet);
        require!(
            current_slot >= self.reveal_deadline_slot,
            WagerError::WindowNotYetOpen
        );
        self.finalized = true;
        self.finalized_slot = current_slot;
        // a round nobody entered has nothing to settle
        self.close_settlement_if_complete(current_slot);
        Ok(())
    }

    // -----------------
    // settlement
    // -----------------
    pub fn assert_settlement_open(&self) -> Result<()> {
        require!(self.finalized, WagerError::NotFinalized);
        require!(!self.token_settled, WagerError::RoundTokensAlreadySettled);
        // vault already drained to treasury
        require!(!self.swept, WagerError::AlreadySwept);
        Ok(())
    }

    pub fn record_settled(&mut self, forfeited: bool) -> Result<()> {
        self.settled_count = self
            .settled_count
            .checked_add(1)
            .ok_or(WagerError::MathOverflow)?;
        if forfeited {
            self.forfeited_count = self
                .forfeited_count
                .checked_add(1)
                .ok_or(WagerError::MathOverflow)?;
        }
        Ok(())
    }

    /// Flips `token_settled` once every committed ticket went through settlement.
    pub fn close_settlement_if_complete(&mut self, current_slot: u64) -> bool {
        if !self.token_settled && self.settled_count == self.committed_count {
            self.token_settled = true;
            self.token_settled_slot = current_slot;
        }
        self.token_settled
    }

    // -----------------
    // claim / sweep
    // -----------------
    pub fn assert_claim_window(&self) -> Result<()> {
        require!(!self.swept, WagerError::ClaimAfterSweep);
        Ok(())
    }

    pub fn sweep_unlocks_at(&self, claim_grace_slots: u64) -> u64 {
        self.reveal_deadline_slot.saturating_add(claim_grace_slots)
    }

    pub fn mark_swept(&mut self, claim_grace_slots: u64, current_slot: u64) -> Result<()> {
        require!(self.finalized, WagerError::NotFinalized);
        require!(!self.swept, WagerError::AlreadySwept);
        require!(
            current_slot >= self.sweep_unlocks_at(claim_grace_slots),
            WagerError::SweepTooEarly
        );
        self.swept = true;
        self.swept_slot = current_slot;
        Ok(())
    }

    // -----------------
    // refund (pulse never arrived)
    // -----------------
    pub fn is_refundable(&self, current_slot: u64) -> bool {
        !self.pulse_set
            && !self.finalized
            && current_slot > self.reveal_deadline_slot.saturating_add(REFUND_TIMEOUT_SLOTS)
    }

    pub fn assert_refundable(&self, current_slot: u64) -> Result<()> {
        require!(!self.finalized, WagerError::AlreadyFinalized);
        require!(!self.pulse_set, WagerError::PulseAlreadySet);
        require!(self.is_refundable(current_slot), WagerError::RefundTooEarly);
        Ok(())
    }

    pub fn record_refund(&mut self) -> Result<()> {
        self.refunded_count = self
            .refunded_count
            .checked_add(1)
            .ok_or(WagerError::MathOverflow)?;
        Ok(())
    }
}

#[account]
#[derive(InitSpace)]
pub struct Ticket {
    pub round_id: u64,
    pub user: Pubkey,
    pub nonce: u64,
    pub bump: u8,

    pub commitment: [u8; 32],

    // derived on commit and must match on reveal
    pub bit_index: u16,

    pub revealed: bool,
    pub guess: u8,
    pub win: bool,

    // processed by settlement (winners included)
    pub token_settled: bool,
    // stake moved to treasury by settlement
    pub forfeited: bool,

    pub claimed: bool,
    pub refunded: bool,

    pub created_slot: u64,
    pub revealed_slot: u64,
    pub settled_slot: u64,
    pub claimed_slot: u64,
    pub refunded_slot: u64,
}

impl Ticket {
    pub fn committed(
        round_id: u64,
        user: Pubkey,
        nonce: u64,
        bump: u8,
        commitment: [u8; 32],
        created_slot: u64,
    ) -> Self {
        Self {
            round_id,
            user,
            nonce,
            bump,
            commitment,
            bit_index: bit_index(round_id, &user, nonce),
            revealed: false,
            guess: 0,
            win: false,
            token_settled: false,
            forfeited: false,
            claimed: false,
            refunded: false,
            created_slot,
            revealed_slot: 0,
            settled_slot: 0,
            claimed_slot: 0,
            refunded_slot: 0,
        }
    }

    /// Opens the commitment against the round pulse and records the outcome.
    /// Returns whether the ticket won.
    pub fn reveal(
        &mut self,
        pulse: &[u8; 64],
        guess: u8,
        salt: &[u8; 32],
        current_slot: u64,
    ) -> Result<bool> {
        require!(guess <= 1, WagerError::InvalidGuess);
        require!(!self.revealed, WagerError::AlreadyRevealed);

        let computed = commitment(self.round_id, &self.user, self.nonce, guess, salt);
        require!(computed == self.commitment, WagerError::CommitmentMismatch);

        self.revealed = true;
        self.guess = guess;
        self.win = pulse_bit(pulse, self.bit_index) == guess;
        self.revealed_slot = current_slot;

        Ok(self.win)
    }

    pub fn is_winner(&self) -> bool {
        self.revealed && self.win
    }

    pub fn assert_claimable(&self) -> Result<()> {
        require!(self.revealed, WagerError::TicketNotRevealed);
        require!(self.win, WagerError::NotWinner);
        require!(self.token_settled, WagerError::TicketNotSettled);
        require!(!self.claimed, WagerError::AlreadyClaimed);
        Ok(())
    }

    pub fn mark_claimed(&mut self, current_slot: u64) {
        self.claimed = true;
        self.claimed_slot = current_slot;
    }

    pub fn mark_refunded(&mut self, current_slot: u64) -> Result<()> {
        require!(!self.refunded, WagerError::AlreadyRefunded);
        self.refunded = true;
        self.refunded_slot = current_slot;
        Ok(())
    }
}
