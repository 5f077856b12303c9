// Centralized Protocol Constants

// PDA seeds
// =========

pub const CONFIG_SEED: &[u8] = b"config_v1";
pub const ROUND_REGISTRY_SEED: &[u8] = b"round_registry_v1";
pub const ROUND_SEED: &[u8] = b"round_v1";
pub const TICKET_SEED: &[u8] = b"ticket_v1";
pub const STAKE_VAULT_SEED: &[u8] = b"stake_vault_v1";
pub const TREASURY_SEED: &[u8] = b"treasury_v1";

pub const USER_ESCROW_SEED: &[u8] = b"user_escrow_v1";
pub const USER_ESCROW_VAULT_SEED: &[u8] = b"user_escrow_vault_v1";

pub const ORACLE_SET_SEED: &[u8] = b"oracle_set_v1";

pub const TOKENOMICS_SEED: &[u8] = b"tokenomics_v1";
pub const REWARD_FEE_POOL_SEED: &[u8] = b"reward_fee_pool_v1";

// Limits
// ======

/// Max entries per commit/reveal batch (bounded by tx size and compute).
pub const MAX_BATCH: usize = 16;

/// Max allowlisted oracles in an OracleSet.
pub const MAX_ORACLES: usize = 16;

/// Number of addressable bits in a pulse.
pub const PULSE_BITS: u16 = 512;

pub const MAX_FEE_BPS: u16 = 10_000;

// Time & Slots Logic Constants
// ============================

/// Minimum number of slots between Commit Deadline and Reveal Deadline.
/// 60 slots ~ 24 seconds (assuming 400ms/slot).
pub const MIN_REVEAL_WINDOW_SLOTS: u64 = 60;

/// A pulse must land at least this many slots before the reveal deadline,
/// otherwise the round is left pulse-less and falls into refund mode.
pub const LATE_PULSE_SAFETY_BUFFER_SLOTS: u64 = 50;

/// Slots after the reveal deadline before a pulse-less round becomes refundable.
/// 150 slots ~ 1 minute (@ 0.4s/slot).
pub const REFUND_TIMEOUT_SLOTS: u64 = 150;

// Defaults
// ========

/// Default grace period for claims before sweeping (slots).
pub const DEFAULT_CLAIM_GRACE_SLOTS: u64 = 900;

pub const INITIAL_VERSION: u16 = 1;
