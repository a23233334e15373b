use anchor_lang::prelude::*;

use crate::errors::TokenError;

/// Working set of balances for one instruction, keyed by account address.
///
/// Several handles may name the same account (owner as sender, owner as
/// recipient, self-transfer). Each distinct key is tracked once, so every
/// handle reads back the same settled value.
#[derive(Debug, Clone, Default)]
pub struct Settlement {
    balances: Vec<(Pubkey, u64)>,
}

impl Settlement {
    /// Tracks `key` at `amount`. Later calls for a tracked key are ignored.
    pub fn track(&mut self, key: Pubkey, amount: u64) {
        if self.balance_of(&key).is_none() {
            self.balances.push((key, amount));
        }
    }

    pub fn balance_of(&self, key: &Pubkey) -> Option<u64> {
        self.balances
            .iter()
            .find(|(tracked, _)| tracked == key)
            .map(|(_, amount)| *amount)
    }

    /// Settled balance for a tracked key.
    pub fn settled(&self, key: &Pubkey) -> Result<u64> {
        self.balance_of(key)
            .ok_or_else(|| error!(TokenError::InvalidState))
    }

    pub fn debit(&mut self, key: &Pubkey, amount: u64) -> Result<()> {
        let slot = self.slot(key)?;
        *slot = slot
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientBalance)?;
        Ok(())
    }

    pub fn credit(&mut self, key: &Pubkey, amount: u64) -> Result<()> {
        let slot = self.slot(key)?;
        *slot = slot.checked_add(amount).ok_or(TokenError::Overflow)?;
        Ok(())
    }

    pub fn total(&self) -> Option<u64> {
        self.balances
            .iter()
            .try_fold(0u64, |sum, (_, amount)| sum.checked_add(*amount))
    }

    fn slot(&mut self, key: &Pubkey) -> Result<&mut u64> {
        self.balances
            .iter_mut()
            .find(|(tracked, _)| tracked == key)
            .map(|(_, amount)| amount)
            .ok_or_else(|| error!(TokenError::InvalidState))
    }
}
