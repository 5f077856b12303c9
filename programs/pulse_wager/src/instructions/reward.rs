use anchor_lang::prelude::*;
use anchor_spl::token::{self, MintTo, Transfer};

use crate::constants::{CONFIG_SEED, ROUND_SEED};
use crate::events::RewardClaimed;
use crate::settlement::claim_payout;
use crate::ClaimReward;

pub fn claim_reward(ctx: Context<ClaimReward>, round_id: u64, nonce: u64) -> Result<()> {
    let round = &ctx.accounts.round;
    round.assert_claim_window()?;
    ctx.accounts.ticket.assert_claimable()?;

    let payout = claim_payout(round.stake_amount, ctx.accounts.tokenomics.reward_fee_bps)?;

    // 1) stake back from the round vault
    let round_le = round_id.to_le_bytes();
    let round_seeds: &[&[&[u8]]] = &[&[ROUND_SEED, &round_le, &[round.bump]]];

    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.stake_vault.to_account_info(),
                to: ctx.accounts.user_token_account.to_account_info(),
                authority: round.to_account_info(),
            },
            round_seeds,
        ),
        payout.refund,
    )?;

    // 2) reward minted by the config PDA, fee to the reward fee pool
    let cfg_seeds: &[&[&[u8]]] = &[&[CONFIG_SEED, &[ctx.accounts.config.bump]]];

    if payout.reward > 0 {
        token::mint_to(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                MintTo {
                    mint: ctx.accounts.stake_mint.to_account_info(),
                    to: ctx.accounts.user_token_account.to_account_info(),
                    authority: ctx.accounts.config.to_account_info(),
                },
                cfg_seeds,
            ),
            payout.reward,
        )?;
    }

    if payout.fee > 0 {
        token::mint_to(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                MintTo {
                    mint: ctx.accounts.stake_mint.to_account_info(),
                    to: ctx.accounts.reward_fee_pool.to_account_info(),
                    authority: ctx.accounts.config.to_account_info(),
                },
                cfg_seeds,
            ),
            payout.fee,
        )?;
    }

    let ticket = &mut ctx.accounts.ticket;
    ticket.mark_claimed(Clock::get()?.slot);

    emit!(RewardClaimed {
        round_id,
        user: ticket.user,
        nonce,
        refund: payout.refund,
        reward: payout.reward,
        fee: payout.fee,
    });
    Ok(())
}
