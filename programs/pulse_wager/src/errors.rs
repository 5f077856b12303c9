use anchor_lang::prelude::*;

#[error_code]
pub enum WagerError {
    #[msg("Unauthorized")]
    Unauthorized,
    #[msg("Protocol paused")]
    Paused,

    // -----------------
    // Windows / deadlines
    // -----------------
    #[msg("Invalid deadlines")]
    InvalidDeadlines,
    #[msg("Reveal window too short")]
    RevealWindowTooShort,
    #[msg("Window closed")]
    WindowClosed,
    #[msg("Window not yet open")]
    WindowNotYetOpen,

    // -----------------
    // Round lifecycle
    // -----------------
    #[msg("Pulse not set")]
    PulseNotSet,
    #[msg("Round pulse already set")]
    PulseAlreadySet,
    #[msg("Pulse not yet due (commit deadline not reached)")]
    PulseNotYetDue,
    #[msg("Pulse too late (liveness hazard)")]
    PulseTooLate,
    #[msg("Round is finalized")]
    RoundFinalized,
    #[msg("Round already finalized")]
    AlreadyFinalized,
    #[msg("Round not finalized")]
    NotFinalized,
    #[msg("Commit not allowed after pulse is set")]
    CommitAfterPulseSet,

    // -----------------
    // Tickets
    // -----------------
    #[msg("Ticket already exists")]
    TicketAlreadyExists,
    #[msg("Already revealed")]
    AlreadyRevealed,
    #[msg("Commitment mismatch")]
    CommitmentMismatch,
    #[msg("Invalid guess (must be 0/1)")]
    InvalidGuess,
    #[msg("Too many entries")]
    TooManyEntries,
    #[msg("Batch is empty")]
    EmptyBatch,
    #[msg("Ticket PDA mismatch")]
    TicketPdaMismatch,
    #[msg("Ticket not owned by program")]
    TicketNotOwnedByProgram,
    #[msg("Failed to borrow account data")]
    AccountBorrowFailed,

    // -----------------
    // Signed meta-transactions
    // -----------------
    #[msg("Missing, misplaced or malformed ed25519 verify instruction")]
    MissingOrInvalidSignatureAdjacency,
    #[msg("Signed message mismatch")]
    MessageMismatch,
    #[msg("Signer mismatch")]
    SignerMismatch,
    #[msg("Signed batch contains mixed users")]
    SignedBatchMixedUsers,

    // -----------------
    // Value
    // -----------------
    #[msg("Invalid stake amount")]
    InvalidStakeAmount,
    #[msg("Invalid window")]
    InvalidWindow,
    #[msg("Insufficient escrow funds")]
    InsufficientEscrow,
    #[msg("Stake mint does not match config")]
    StakeMintMismatch,
    #[msg("Invalid fee bps (must be 0..=10_000)")]
    InvalidFeeBps,
    #[msg("Math overflow")]
    MathOverflow,

    // -----------------
    // Settlement / claim / sweep / refund
    // -----------------
    #[msg("Round tokens already settled")]
    RoundTokensAlreadySettled,
    #[msg("Ticket not settled yet")]
    TicketNotSettled,
    #[msg("Ticket not revealed")]
    TicketNotRevealed,
    #[msg("Not a winner")]
    NotWinner,
    #[msg("Already claimed")]
    AlreadyClaimed,
    #[msg("Cannot claim after vault sweep")]
    ClaimAfterSweep,
    #[msg("Sweep not allowed yet (grace period not elapsed)")]
    SweepTooEarly,
    #[msg("Vault already swept for this round")]
    AlreadySwept,
    #[msg("Refund too early")]
    RefundTooEarly,
    #[msg("Stake already refunded")]
    AlreadyRefunded,

    // -----------------
    // Oracle authority
    // -----------------
    #[msg("Oracle pubkey not set")]
    OracleNotSet,
    #[msg("OracleSet is full")]
    OracleSetFull,
    #[msg("Oracle already exists in allowlist")]
    OracleAlreadyExists,
    #[msg("Oracle not found in allowlist")]
    OracleNotFound,
    #[msg("Invalid threshold")]
    InvalidThreshold,
    #[msg("Threshold exceeds current oracle count")]
    ThresholdExceedsOracleCount,
    #[msg("Same oracle attested twice")]
    DuplicateOracleAttestation,
}

#[cfg(test)]
pub(crate) fn assert_err<T: std::fmt::Debug>(res: Result<T>, expected: WagerError) {
    match res {
        Err(anchor_lang::error::Error::AnchorError(e)) => assert_eq!(
            e.error_code_number,
            u32::from(expected),
            "expected {expected:?}, got {}",
            e.error_name
        ),
        other => panic!("expected {expected:?}, got {other:?}"),
    }
}
