use anchor_lang::prelude::*;

use crate::constants::WALLET_POLICY_SEED;
use crate::events::{BlacklistAdded, BlacklistRemoved, LpPairUpdated, TaxExemptionUpdated};
use crate::state::{TokenLedger, WalletPolicy};

#[derive(Accounts)]
#[instruction(wallet: Pubkey)]
pub struct UpdateWalletPolicy<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(mut)]
    pub ledger: Account<'info, TokenLedger>,

    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + WalletPolicy::INIT_SPACE,
        seeds = [WALLET_POLICY_SEED, ledger.key().as_ref(), wallet.as_ref()],
        bump
    )]
    pub wallet_policy: Account<'info, WalletPolicy>,

    pub system_program: Program<'info, System>,
}

impl<'info> UpdateWalletPolicy<'info> {
    /// Owner check plus identity binding, shared by every list update.
    fn prepare(&mut self, wallet: Pubkey, bump: u8) -> Result<i64> {
        self.ledger.require_owner(&self.owner.key())?;
        self.wallet_policy.bind(self.ledger.key(), wallet, bump)?;
        self.ledger.record_audit()?;

        let now = Clock::get()?.unix_timestamp;
        self.wallet_policy.updated_at = now;
        self.wallet_policy.updated_by = self.owner.key();
        Ok(now)
    }
}

pub fn add_to_blacklist_handler(
    ctx: Context<UpdateWalletPolicy>,
    wallet: Pubkey,
    reason: String,
) -> Result<()> {
    let timestamp = ctx.accounts.prepare(wallet, ctx.bumps.wallet_policy)?;
    ctx.accounts.wallet_policy.blacklist(reason.clone())?;

    emit!(BlacklistAdded {
        ledger: ctx.accounts.ledger.key(),
        wallet,
        reason,
        timestamp,
    });
    Ok(())
}

pub fn remove_from_blacklist_handler(
    ctx: Context<UpdateWalletPolicy>,
    wallet: Pubkey,
) -> Result<()> {
    let timestamp = ctx.accounts.prepare(wallet, ctx.bumps.wallet_policy)?;
    ctx.accounts.wallet_policy.unblacklist()?;

    emit!(BlacklistRemoved {
        ledger: ctx.accounts.ledger.key(),
        wallet,
        timestamp,
    });
    Ok(())
}

pub fn set_taxed_lp_pair_handler(
    ctx: Context<UpdateWalletPolicy>,
    wallet: Pubkey,
    enabled: bool,
) -> Result<()> {
    let timestamp = ctx.accounts.prepare(wallet, ctx.bumps.wallet_policy)?;
    ctx.accounts.wallet_policy.set_taxed_lp_pair(enabled);

    emit!(LpPairUpdated {
        ledger: ctx.accounts.ledger.key(),
        wallet,
        is_taxed_lp_pair: enabled,
        timestamp,
    });
    Ok(())
}

pub fn set_tax_exempt_handler(
    ctx: Context<UpdateWalletPolicy>,
    wallet: Pubkey,
    enabled: bool,
) -> Result<()> {
    let timestamp = ctx.accounts.prepare(wallet, ctx.bumps.wallet_policy)?;
    ctx.accounts.wallet_policy.set_tax_exempt(enabled);

    emit!(TaxExemptionUpdated {
        ledger: ctx.accounts.ledger.key(),
        wallet,
        is_tax_exempt: enabled,
        timestamp,
    });
    Ok(())
}
