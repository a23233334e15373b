use anchor_lang::prelude::*;

use crate::events::{LedgerPaused, LedgerUnpaused};
use crate::state::TokenLedger;

/// Accounts for owner-only updates that touch nothing but the ledger itself.
#[derive(Accounts)]
pub struct LedgerAdmin<'info> {
    pub owner: Signer<'info>,

    #[account(mut)]
    pub ledger: Account<'info, TokenLedger>,
}

pub fn pause_handler(ctx: Context<LedgerAdmin>) -> Result<()> {
    let ledger = &mut ctx.accounts.ledger;
    ledger.require_owner(&ctx.accounts.owner.key())?;
    ledger.set_paused(true)?;

    emit!(LedgerPaused {
        ledger: ledger.key(),
        paused_by: ctx.accounts.owner.key(),
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}

pub fn unpause_handler(ctx: Context<LedgerAdmin>) -> Result<()> {
    let ledger = &mut ctx.accounts.ledger;
    ledger.require_owner(&ctx.accounts.owner.key())?;
    ledger.set_paused(false)?;

    emit!(LedgerUnpaused {
        ledger: ledger.key(),
        unpaused_by: ctx.accounts.owner.key(),
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}
