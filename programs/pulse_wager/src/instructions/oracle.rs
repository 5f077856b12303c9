use anchor_lang::prelude::*;

use crate::{
    authority::OracleAuthority,
    codec::pulse_message,
    events::{OracleRotated, PulseSet},
    sigverify::load_adjacent_attestations,
    SetPulseSigned, UpdateConfig,
};

#[cfg(feature = "mock-pulse")]
use crate::SetPulseMock;

/// Rotation is immediate: the previous key can no longer publish pulses.
pub fn set_oracle_pubkey(ctx: Context<UpdateConfig>, oracle_pubkey: Pubkey) -> Result<()> {
    let cfg = &mut ctx.accounts.config;
    cfg.assert_admin(&ctx.accounts.admin.key())?;

    let old_oracle = cfg.oracle_pubkey;
    cfg.oracle_pubkey = oracle_pubkey;

    emit!(OracleRotated {
        old_oracle,
        new_oracle: oracle_pubkey,
    });
    Ok(())
}

// Tx layout must be: [ ed25519_verify x N, set_pulse_signed ]
// N = 1 for a single oracle, N = threshold for an oracle set.
pub fn set_pulse_signed(
    ctx: Context<SetPulseSigned>,
    round_id: u64,
    pulse: [u8; 64],
) -> Result<()> {
    let cfg = &ctx.accounts.config;
    cfg.assert_live()?;

    let current_slot = Clock::get()?.slot;
    let round = &mut ctx.accounts.round;
    round.assert_pulse_due(current_slot)?;

    let authority = OracleAuthority::resolve(cfg, ctx.accounts.oracle_set.as_deref())?;

    let ix_sys = ctx.accounts.instructions.to_account_info();
    let attestations = load_adjacent_attestations(&ix_sys, authority.required_attestations())?;

    let expected = pulse_message(ctx.program_id, round_id, round.pulse_index_target, &pulse);
    authority.verify(&attestations, &expected)?;

    round.apply_pulse(pulse, current_slot)?;

    emit!(PulseSet {
        round_id,
        pulse_index_target: round.pulse_index_target,
        attestations: attestations.len() as u8,
        slot: current_slot,
    });
    Ok(())
}

/// Unauthenticated pulse for local clusters.
#[cfg(feature = "mock-pulse")]
pub fn set_pulse_mock(ctx: Context<SetPulseMock>, round_id: u64, pulse: [u8; 64]) -> Result<()> {
    ctx.accounts.config.assert_admin(&ctx.accounts.admin.key())?;

    let current_slot = Clock::get()?.slot;
    let round = &mut ctx.accounts.round;
    round.apply_pulse(pulse, current_slot)?;

    msg!("mock pulse set for round {}", round_id);
    emit!(PulseSet {
        round_id,
        pulse_index_target: round.pulse_index_target,
        attestations: 0,
        slot: current_slot,
    });
    Ok(())
}
