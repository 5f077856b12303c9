//! Commitment codec: bit derivation, commitment hashing and the canonical
//! messages signed by users and oracles. Every function here is pure and
//! must stay bit-exact with the off-chain clients.

use anchor_lang::prelude::*;
use solana_sha256_hasher::hashv;

use crate::constants::PULSE_BITS;

pub const BIT_INDEX_TAG: &[u8] = b"bitindex";
pub const COMMIT_TAG: &[u8] = b"commit";

pub const COMMIT_MSG_TAG: &[u8] = b"pulse-wager:commit_v1";
pub const REVEAL_MSG_TAG: &[u8] = b"pulse-wager:reveal_v1";
pub const PULSE_MSG_TAG: &[u8] = b"pulse-wager:pulse_v1";

/// Which pulse bit a ticket is bound to.
///
/// The nonce is part of the preimage, so two tickets of the same user in the
/// same round land on independent bits.
pub fn bit_index(round_id: u64, user: &Pubkey, nonce: u64) -> u16 {
    let h = hashv(&[
        BIT_INDEX_TAG,
        round_id.to_le_bytes().as_ref(),
        user.as_ref(),
        nonce.to_le_bytes().as_ref(),
    ])
    .to_bytes();

    u16::from_le_bytes([h[0], h[1]]) % PULSE_BITS
}

pub fn commitment(
    round_id: u64,
    user: &Pubkey,
    nonce: u64,
    guess: u8,
    salt: &[u8; 32],
) -> [u8; 32] {
    hashv(&[
        COMMIT_TAG,
        round_id.to_le_bytes().as_ref(),
        user.as_ref(),
        nonce.to_le_bytes().as_ref(),
        &[guess],
        salt.as_ref(),
    ])
    .to_bytes()
}

/// Bits are numbered LSB-first inside each byte: bit 0 is `pulse[0] & 1`.
pub fn pulse_bit(pulse: &[u8; 64], idx: u16) -> u8 {
    let idx = idx as usize;
    (pulse[idx / 8] >> (idx % 8)) & 1
}

pub fn set_pulse_bit(pulse: &mut [u8; 64], idx: u16, value: u8) {
    let idx = idx as usize;
    let mask = 1u8 << (idx % 8);
    if value & 1 == 1 {
        pulse[idx / 8] |= mask;
    } else {
        pulse[idx / 8] &= !mask;
    }
}

// -------------------------
// Canonical signed messages
// -------------------------

pub fn commit_message(
    program_id: &Pubkey,
    round_id: u64,
    user: &Pubkey,
    nonce: u64,
    commitment: &[u8; 32],
) -> Vec<u8> {
    let mut v = Vec::with_capacity(COMMIT_MSG_TAG.len() + 32 + 8 + 32 + 8 + 32);
    v.extend_from_slice(COMMIT_MSG_TAG);
    v.extend_from_slice(program_id.as_ref());
    v.extend_from_slice(&round_id.to_le_bytes());
    v.extend_from_slice(user.as_ref());
    v.extend_from_slice(&nonce.to_le_bytes());
    v.extend_from_slice(commitment);
    v
}

pub fn reveal_message(
    program_id: &Pubkey,
    round_id: u64,
    user: &Pubkey,
    nonce: u64,
    guess: u8,
    salt: &[u8; 32],
) -> Vec<u8> {
    let mut v = Vec::with_capacity(REVEAL_MSG_TAG.len() + 32 + 8 + 32 + 8 + 1 + 32);
    v.extend_from_slice(REVEAL_MSG_TAG);
    v.extend_from_slice(program_id.as_ref());
    v.extend_from_slice(&round_id.to_le_bytes());
    v.extend_from_slice(user.as_ref());
    v.extend_from_slice(&nonce.to_le_bytes());
    v.push(guess);
    v.extend_from_slice(salt);
    v
}

pub fn pulse_message(
    program_id: &Pubkey,
    round_id: u64,
    pulse_index_target: u64,
    pulse: &[u8; 64],
) -> Vec<u8> {
    let mut v = Vec::with_capacity(PULSE_MSG_TAG.len() + 32 + 8 + 8 + 64);
    v.extend_from_slice(PULSE_MSG_TAG);
    v.extend_from_slice(program_id.as_ref());
    v.extend_from_slice(&round_id.to_le_bytes());
    v.extend_from_slice(&pulse_index_target.to_le_bytes());
    v.extend_from_slice(pulse);
    v
}
