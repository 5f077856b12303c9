use anchor_lang::prelude::*;

use crate::{
    constants::INITIAL_VERSION,
    events::OracleSetChanged,
    state::{Config, OracleSet},
    InitializeOracleSet, ManageOracleSet,
};

fn changed(oracle_set: &Account<OracleSet>, cfg: &Config) -> OracleSetChanged {
    OracleSetChanged {
        oracle_set: oracle_set.key(),
        threshold: oracle_set.threshold,
        oracle_count: oracle_set.oracles.len() as u8,
        use_oracle_set: cfg.use_oracle_set,
    }
}

pub fn initialize_oracle_set(
    ctx: Context<InitializeOracleSet>,
    threshold: u8,
    initial_oracles: Vec<Pubkey>,
) -> Result<()> {
    let cfg = &mut ctx.accounts.config;
    cfg.assert_admin(&ctx.accounts.admin.key())?;

    OracleSet::validate_initial(threshold, &initial_oracles)?;

    let os = &mut ctx.accounts.oracle_set;
    os.admin = cfg.admin;
    os.bump = ctx.bumps.oracle_set;
    os.threshold = threshold;
    os.oracles = initial_oracles;
    os.version = INITIAL_VERSION;

    // registered, but single-oracle mode stays active until set_oracle_mode
    cfg.oracle_set = os.key();

    emit!(changed(os, cfg));
    Ok(())
}

pub fn add_oracle(ctx: Context<ManageOracleSet>, oracle: Pubkey) -> Result<()> {
    let cfg = &ctx.accounts.config;
    cfg.assert_admin(&ctx.accounts.admin.key())?;

    let os = &mut ctx.accounts.oracle_set;
    os.add(oracle)?;

    emit!(changed(os, cfg));
    Ok(())
}

/// Lower the threshold first if the removal would leave fewer oracles than it.
pub fn remove_oracle(ctx: Context<ManageOracleSet>, oracle: Pubkey) -> Result<()> {
    let cfg = &ctx.accounts.config;
    cfg.assert_admin(&ctx.accounts.admin.key())?;

    let os = &mut ctx.accounts.oracle_set;
    os.remove(&oracle)?;

    emit!(changed(os, cfg));
    Ok(())
}

pub fn set_oracle_threshold(ctx: Context<ManageOracleSet>, threshold: u8) -> Result<()> {
    let cfg = &ctx.accounts.config;
    cfg.assert_admin(&ctx.accounts.admin.key())?;

    let os = &mut ctx.accounts.oracle_set;
    os.set_threshold(threshold)?;

    emit!(changed(os, cfg));
    Ok(())
}

/// Switches pulse authentication between the single oracle key and the oracle set.
pub fn set_oracle_mode(ctx: Context<ManageOracleSet>, use_oracle_set: bool) -> Result<()> {
    let cfg = &mut ctx.accounts.config;
    cfg.assert_admin(&ctx.accounts.admin.key())?;

    let os = &ctx.accounts.oracle_set;
    if use_oracle_set {
        os.validate()?;
    }

    cfg.oracle_set = os.key();
    cfg.use_oracle_set = use_oracle_set;

    msg!("oracle set mode: {}", use_oracle_set);
    emit!(changed(os, cfg));
    Ok(())
}
