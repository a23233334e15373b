use anchor_lang::prelude::*;

use crate::constants::LEDGER_BALANCE_SEED;
use crate::events::LedgerInitialized;
use crate::state::{BalanceAccount, TokenLedger};

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct InitializeArgs {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub initial_supply: u64,
}

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(init, payer = owner, space = 8 + TokenLedger::INIT_SPACE)]
    pub ledger: Account<'info, TokenLedger>,

    #[account(
        init,
        payer = owner,
        space = 8 + BalanceAccount::INIT_SPACE,
        seeds = [LEDGER_BALANCE_SEED, ledger.key().as_ref(), owner.key().as_ref()],
        bump
    )]
    pub owner_balance: Account<'info, BalanceAccount>,

    pub system_program: Program<'info, System>,
}

pub fn initialize_handler(ctx: Context<Initialize>, args: InitializeArgs) -> Result<()> {
    let owner = ctx.accounts.owner.key();
    let ledger_key = ctx.accounts.ledger.key();

    let ledger = TokenLedger::new(
        owner,
        args.name,
        args.symbol,
        args.decimals,
        args.initial_supply,
    )?;
    ctx.accounts.ledger.set_inner(ledger);

    let owner_balance = &mut ctx.accounts.owner_balance;
    owner_balance.bind(ledger_key, owner, ctx.bumps.owner_balance)?;
    owner_balance.amount = args.initial_supply;

    let ledger = &ctx.accounts.ledger;
    emit!(LedgerInitialized {
        ledger: ledger_key,
        owner,
        name: ledger.name.clone(),
        symbol: ledger.symbol.clone(),
        decimals: ledger.decimals,
        initial_supply: ledger.total_supply,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}
