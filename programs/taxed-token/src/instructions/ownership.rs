use anchor_lang::prelude::*;

use crate::constants::LEDGER_BALANCE_SEED;
use crate::events::OwnershipTransferred;
use crate::state::{BalanceAccount, TokenLedger};

#[derive(Accounts)]
pub struct TransferOwnership<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(mut)]
    pub ledger: Account<'info, TokenLedger>,

    /// CHECK: Any address may become owner.
    pub new_owner: UncheckedAccount<'info>,

    // Tax routing credits the owner's balance, so it must exist up front.
    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + BalanceAccount::INIT_SPACE,
        seeds = [LEDGER_BALANCE_SEED, ledger.key().as_ref(), new_owner.key().as_ref()],
        bump
    )]
    pub new_owner_balance: Account<'info, BalanceAccount>,

    pub system_program: Program<'info, System>,
}

pub fn transfer_ownership_handler(mut ctx: Context<TransferOwnership>) -> Result<()> {
    let accounts = &mut ctx.accounts;
    let old_owner = accounts.owner.key();
    let new_owner = accounts.new_owner.key();
    let ledger_key = accounts.ledger.key();

    accounts.ledger.require_owner(&old_owner)?;
    accounts.ledger.transfer_ownership(new_owner)?;
    accounts
        .new_owner_balance
        .bind(ledger_key, new_owner, ctx.bumps.new_owner_balance)?;

    emit!(OwnershipTransferred {
        ledger: ledger_key,
        old_owner,
        new_owner,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}
