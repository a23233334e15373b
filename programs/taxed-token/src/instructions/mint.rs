use anchor_lang::prelude::*;

use crate::constants::LEDGER_BALANCE_SEED;
use crate::events::TokensMinted;
use crate::ledger::execute_mint;
use crate::settlement::Settlement;
use crate::state::{BalanceAccount, TokenLedger};
use crate::utils::store_settled;

#[derive(Accounts)]
pub struct MintTokens<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(mut)]
    pub ledger: Account<'info, TokenLedger>,

    /// CHECK: Only used as the balance PDA seed.
    pub recipient: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + BalanceAccount::INIT_SPACE,
        seeds = [LEDGER_BALANCE_SEED, ledger.key().as_ref(), recipient.key().as_ref()],
        bump
    )]
    pub recipient_balance: Account<'info, BalanceAccount>,

    pub system_program: Program<'info, System>,
}

pub fn mint_handler(mut ctx: Context<MintTokens>, amount: u64) -> Result<()> {
    let accounts = &mut ctx.accounts;
    let ledger_key = accounts.ledger.key();
    let recipient = accounts.recipient.key();
    let balance_key = accounts.recipient_balance.key();

    let mut settlement = Settlement::default();
    settlement.track(balance_key, accounts.recipient_balance.amount);
    let new_total_supply = execute_mint(
        &mut accounts.ledger,
        &accounts.owner.key(),
        &balance_key,
        amount,
        &mut settlement,
    )?;

    accounts
        .recipient_balance
        .bind(ledger_key, recipient, ctx.bumps.recipient_balance)?;
    store_settled(&mut accounts.recipient_balance, &settlement)?;

    emit!(TokensMinted {
        ledger: ledger_key,
        recipient,
        amount,
        new_total_supply,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}
