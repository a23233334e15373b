use anchor_lang::prelude::*;

use crate::constants::{LEDGER_BALANCE_SEED, WALLET_POLICY_SEED};
use crate::events::TokensSeized;
use crate::ledger::execute_seize;
use crate::settlement::Settlement;
use crate::state::{BalanceAccount, TokenLedger, WalletPolicy};
use crate::utils::store_settled;

#[derive(Accounts)]
pub struct Seize<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(mut)]
    pub ledger: Account<'info, TokenLedger>,

    /// CHECK: Only used as PDA seed.
    pub wallet: UncheckedAccount<'info>,

    #[account(
        seeds = [WALLET_POLICY_SEED, ledger.key().as_ref(), wallet.key().as_ref()],
        bump = wallet_policy.bump
    )]
    pub wallet_policy: Account<'info, WalletPolicy>,

    // Blacklisted wallets that were never funded seize as zero.
    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + BalanceAccount::INIT_SPACE,
        seeds = [LEDGER_BALANCE_SEED, ledger.key().as_ref(), wallet.key().as_ref()],
        bump
    )]
    pub wallet_balance: Account<'info, BalanceAccount>,

    #[account(
        mut,
        seeds = [LEDGER_BALANCE_SEED, ledger.key().as_ref(), ledger.owner.as_ref()],
        bump = treasury_balance.bump
    )]
    pub treasury_balance: Account<'info, BalanceAccount>,

    pub system_program: Program<'info, System>,
}

pub fn seize_handler(mut ctx: Context<Seize>) -> Result<()> {
    let wallet_bump = ctx.bumps.wallet_balance;
    let accounts = &mut ctx.accounts;
    let ledger_key = accounts.ledger.key();
    let wallet = accounts.wallet.key();
    let from = accounts.wallet_balance.key();
    let treasury = accounts.treasury_balance.key();

    let mut settlement = Settlement::default();
    settlement.track(from, accounts.wallet_balance.amount);
    settlement.track(treasury, accounts.treasury_balance.amount);

    let amount = execute_seize(
        &mut accounts.ledger,
        &accounts.owner.key(),
        accounts.wallet_policy.flags(),
        &from,
        &treasury,
        &mut settlement,
    )?;

    accounts
        .wallet_balance
        .bind(ledger_key, wallet, wallet_bump)?;
    store_settled(&mut accounts.wallet_balance, &settlement)?;
    store_settled(&mut accounts.treasury_balance, &settlement)?;

    emit!(TokensSeized {
        ledger: ledger_key,
        wallet,
        amount,
        seized_by: accounts.owner.key(),
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}
