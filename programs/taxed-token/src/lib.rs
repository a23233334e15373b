use anchor_lang::prelude::*;

pub mod constants;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod ledger;
pub mod settlement;
pub mod state;
pub mod tax;
mod utils;

use instructions::*;

declare_id!("TaxTok1111111111111111111111111111111111111");

#[program]
pub mod taxed_token {
    use super::*;

    pub fn initialize(
        ctx: Context<Initialize>,
        args: initialize::InitializeArgs,
    ) -> Result<()> {
        initialize::initialize_handler(ctx, args)
    }

    pub fn mint(ctx: Context<MintTokens>, amount: u64) -> Result<()> {
        mint::mint_handler(ctx, amount)
    }

    pub fn transfer(ctx: Context<TransferTokens>, amount: u64) -> Result<()> {
        transfer::transfer_handler(ctx, amount)
    }

    pub fn pause(ctx: Context<LedgerAdmin>) -> Result<()> {
        pause::pause_handler(ctx)
    }

    pub fn unpause(ctx: Context<LedgerAdmin>) -> Result<()> {
        pause::unpause_handler(ctx)
    }

    pub fn set_taxes(ctx: Context<LedgerAdmin>, args: taxes::SetTaxesArgs) -> Result<()> {
        taxes::set_taxes_handler(ctx, args)
    }

    pub fn add_to_blacklist(
        ctx: Context<UpdateWalletPolicy>,
        wallet: Pubkey,
        reason: String,
    ) -> Result<()> {
        policy::add_to_blacklist_handler(ctx, wallet, reason)
    }

    pub fn remove_from_blacklist(
        ctx: Context<UpdateWalletPolicy>,
        wallet: Pubkey,
    ) -> Result<()> {
        policy::remove_from_blacklist_handler(ctx, wallet)
    }

    pub fn add_taxed_lp_pair(ctx: Context<UpdateWalletPolicy>, wallet: Pubkey) -> Result<()> {
        policy::set_taxed_lp_pair_handler(ctx, wallet, true)
    }

    pub fn remove_taxed_lp_pair(
        ctx: Context<UpdateWalletPolicy>,
        wallet: Pubkey,
    ) -> Result<()> {
        policy::set_taxed_lp_pair_handler(ctx, wallet, false)
    }

    pub fn add_exempt_from_taxes(
        ctx: Context<UpdateWalletPolicy>,
        wallet: Pubkey,
    ) -> Result<()> {
        policy::set_tax_exempt_handler(ctx, wallet, true)
    }

    pub fn remove_exempt_from_taxes(
        ctx: Context<UpdateWalletPolicy>,
        wallet: Pubkey,
    ) -> Result<()> {
        policy::set_tax_exempt_handler(ctx, wallet, false)
    }

    pub fn seize(ctx: Context<Seize>) -> Result<()> {
        seize::seize_handler(ctx)
    }

    pub fn transfer_ownership(ctx: Context<TransferOwnership>) -> Result<()> {
        ownership::transfer_ownership_handler(ctx)
    }
}

#[cfg(test)]
mod test_utils {
    use anchor_lang::error::Error;

    pub fn error_code(err: &Error) -> u32 {
        match err {
            Error::AnchorError(anchor_error) => anchor_error.error_code_number,
            Error::ProgramError(_) => u32::MAX,
        }
    }
}
