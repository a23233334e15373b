use anchor_lang::prelude::*;

use crate::errors::TokenError;
use crate::settlement::Settlement;
use crate::state::{BalanceAccount, PolicyFlags, WalletPolicy};

/// Reads a wallet policy PDA that may not exist yet. An empty account means
/// the wallet belongs to no list.
pub fn load_policy_flags(account: &AccountInfo, ledger: &Pubkey) -> Result<PolicyFlags> {
    if account.data_is_empty() {
        return Ok(PolicyFlags::default());
    }
    require!(account.owner == &crate::ID, TokenError::Unauthorized);

    let data = account.try_borrow_data()?;
    let mut slice: &[u8] = &data;
    let policy = WalletPolicy::try_deserialize(&mut slice)?;
    require!(policy.ledger == *ledger, TokenError::Unauthorized);
    Ok(policy.flags())
}

pub fn store_settled(
    balance: &mut Account<'_, BalanceAccount>,
    settlement: &Settlement,
) -> Result<()> {
    balance.amount = settlement.settled(&balance.key())?;
    Ok(())
}
