use anchor_lang::prelude::*;

use crate::constants::{LEDGER_BALANCE_SEED, WALLET_POLICY_SEED};
use crate::events::TokensTransferred;
use crate::ledger::{execute_transfer, TransferKeys, TransferRequest};
use crate::settlement::Settlement;
use crate::state::{BalanceAccount, TokenLedger};
use crate::utils::{load_policy_flags, store_settled};

#[derive(Accounts)]
pub struct TransferTokens<'info> {
    #[account(mut)]
    pub sender: Signer<'info>,

    pub ledger: Account<'info, TokenLedger>,

    /// CHECK: Only used as PDA seed for the recipient balance and policy.
    pub recipient: UncheckedAccount<'info>,

    // A sender that never held tokens reads as a zero balance.
    #[account(
        init_if_needed,
        payer = sender,
        space = 8 + BalanceAccount::INIT_SPACE,
        seeds = [LEDGER_BALANCE_SEED, ledger.key().as_ref(), sender.key().as_ref()],
        bump
    )]
    pub sender_balance: Account<'info, BalanceAccount>,

    #[account(
        init_if_needed,
        payer = sender,
        space = 8 + BalanceAccount::INIT_SPACE,
        seeds = [LEDGER_BALANCE_SEED, ledger.key().as_ref(), recipient.key().as_ref()],
        bump
    )]
    pub recipient_balance: Account<'info, BalanceAccount>,

    #[account(
        mut,
        seeds = [LEDGER_BALANCE_SEED, ledger.key().as_ref(), ledger.owner.as_ref()],
        bump = treasury_balance.bump
    )]
    pub treasury_balance: Account<'info, BalanceAccount>,

    /// CHECK: Sender policy PDA (may be empty).
    #[account(
        seeds = [WALLET_POLICY_SEED, ledger.key().as_ref(), sender.key().as_ref()],
        bump
    )]
    pub sender_policy: UncheckedAccount<'info>,

    /// CHECK: Recipient policy PDA (may be empty).
    #[account(
        seeds = [WALLET_POLICY_SEED, ledger.key().as_ref(), recipient.key().as_ref()],
        bump
    )]
    pub recipient_policy: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn transfer_handler(mut ctx: Context<TransferTokens>, amount: u64) -> Result<()> {
    let sender_bump = ctx.bumps.sender_balance;
    let recipient_bump = ctx.bumps.recipient_balance;
    let accounts = &mut ctx.accounts;
    let ledger_key = accounts.ledger.key();

    let request = TransferRequest {
        sender: accounts.sender.key(),
        recipient: accounts.recipient.key(),
        amount,
        sender_flags: load_policy_flags(&accounts.sender_policy, &ledger_key)?,
        recipient_flags: load_policy_flags(&accounts.recipient_policy, &ledger_key)?,
    };
    let keys = TransferKeys {
        from: accounts.sender_balance.key(),
        to: accounts.recipient_balance.key(),
        treasury: accounts.treasury_balance.key(),
    };

    // Handles may alias; the settlement keeps one balance per address.
    let mut settlement = Settlement::default();
    settlement.track(keys.from, accounts.sender_balance.amount);
    settlement.track(keys.to, accounts.recipient_balance.amount);
    settlement.track(keys.treasury, accounts.treasury_balance.amount);

    let quote = execute_transfer(&accounts.ledger, &request, &keys, &mut settlement)?;

    accounts
        .sender_balance
        .bind(ledger_key, request.sender, sender_bump)?;
    accounts
        .recipient_balance
        .bind(ledger_key, request.recipient, recipient_bump)?;
    store_settled(&mut accounts.sender_balance, &settlement)?;
    store_settled(&mut accounts.recipient_balance, &settlement)?;
    store_settled(&mut accounts.treasury_balance, &settlement)?;

    emit!(TokensTransferred {
        ledger: ledger_key,
        from: request.sender,
        to: request.recipient,
        kind: quote.kind,
        amount: quote.amount,
        tax: quote.tax,
        net_amount: quote.net_amount,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}
