use anchor_lang::prelude::*;

use crate::events::TaxesUpdated;
use crate::instructions::pause::LedgerAdmin;
use crate::tax::TaxRates;

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct SetTaxesArgs {
    pub buy: u8,
    pub sell: u8,
    pub transfer: u8,
}

pub fn set_taxes_handler(ctx: Context<LedgerAdmin>, args: SetTaxesArgs) -> Result<()> {
    let ledger = &mut ctx.accounts.ledger;
    ledger.require_owner(&ctx.accounts.owner.key())?;
    ledger.set_taxes(TaxRates::new(args.buy, args.sell, args.transfer))?;

    emit!(TaxesUpdated {
        ledger: ledger.key(),
        buy: args.buy,
        sell: args.sell,
        transfer: args.transfer,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}
