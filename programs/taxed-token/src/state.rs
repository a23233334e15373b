use anchor_lang::prelude::*;

use crate::constants::{MAX_NAME_LEN, MAX_REASON_LEN, MAX_SYMBOL_LEN};
use crate::errors::TokenError;
use crate::tax::TaxRates;

#[account]
#[derive(Debug, Default)]
pub struct TokenLedger {
    pub owner: Pubkey,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: u64,
    pub is_paused: bool,
    pub taxes: TaxRates,
    pub audit_counter: u64,
}

impl TokenLedger {
    pub const INIT_SPACE: usize = 256;

    /// Builds a fresh ledger whose whole initial supply belongs to `owner`.
    pub fn new(
        owner: Pubkey,
        name: String,
        symbol: String,
        decimals: u8,
        initial_supply: u64,
    ) -> Result<Self> {
        require!(name.len() <= MAX_NAME_LEN, TokenError::NameTooLong);
        require!(symbol.len() <= MAX_SYMBOL_LEN, TokenError::SymbolTooLong);

        Ok(Self {
            owner,
            name,
            symbol,
            decimals,
            total_supply: initial_supply,
            is_paused: false,
            taxes: TaxRates::default(),
            audit_counter: 0,
        })
    }

    pub fn is_owner(&self, caller: &Pubkey) -> bool {
        self.owner == *caller
    }

    /// The single authorization gate for every privileged instruction.
    pub fn require_owner(&self, caller: &Pubkey) -> Result<()> {
        require!(self.is_owner(caller), TokenError::Unauthorized);
        Ok(())
    }

    pub fn set_paused(&mut self, paused: bool) -> Result<()> {
        require!(self.is_paused != paused, TokenError::InvalidState);
        self.is_paused = paused;
        self.record_audit()
    }

    pub fn set_taxes(&mut self, taxes: TaxRates) -> Result<()> {
        taxes.validate()?;
        self.taxes = taxes;
        self.record_audit()
    }

    /// Returns the new total supply.
    pub fn record_mint(&mut self, amount: u64) -> Result<u64> {
        self.total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.record_audit()?;
        Ok(self.total_supply)
    }

    pub fn transfer_ownership(&mut self, new_owner: Pubkey) -> Result<()> {
        require!(new_owner != self.owner, TokenError::InvalidState);
        self.owner = new_owner;
        self.record_audit()
    }

    pub fn record_audit(&mut self) -> Result<()> {
        self.audit_counter = self
            .audit_counter
            .checked_add(1)
            .ok_or(TokenError::Overflow)?;
        Ok(())
    }
}

#[account]
#[derive(Debug, Default)]
pub struct BalanceAccount {
    pub ledger: Pubkey,
    pub holder: Pubkey,
    pub amount: u64,
    pub bump: u8,
}

impl BalanceAccount {
    pub const INIT_SPACE: usize = 128;

    /// Stamps identity on a freshly created balance account. Existing accounts
    /// must already belong to `ledger` and `holder`.
    pub fn bind(&mut self, ledger: Pubkey, holder: Pubkey, bump: u8) -> Result<()> {
        if self.ledger == Pubkey::default() {
            self.ledger = ledger;
            self.holder = holder;
            self.amount = 0;
            self.bump = bump;
            return Ok(());
        }
        require!(
            self.ledger == ledger && self.holder == holder,
            TokenError::Unauthorized
        );
        Ok(())
    }
}

/// Set memberships a wallet can hold on one ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolicyFlags {
    pub blacklisted: bool,
    pub lp_pair: bool,
    pub tax_exempt: bool,
}

#[account]
#[derive(Debug, Default)]
pub struct WalletPolicy {
    pub ledger: Pubkey,
    pub wallet: Pubkey,
    pub is_blacklisted: bool,
    pub blacklist_reason: String,
    pub is_taxed_lp_pair: bool,
    pub is_tax_exempt: bool,
    pub updated_at: i64,
    pub updated_by: Pubkey,
    pub bump: u8,
}

impl WalletPolicy {
    pub const INIT_SPACE: usize = 320;

    pub fn bind(&mut self, ledger: Pubkey, wallet: Pubkey, bump: u8) -> Result<()> {
        if self.ledger == Pubkey::default() {
            self.ledger = ledger;
            self.wallet = wallet;
            self.bump = bump;
            return Ok(());
        }
        require!(
            self.ledger == ledger && self.wallet == wallet,
            TokenError::Unauthorized
        );
        Ok(())
    }

    pub fn flags(&self) -> PolicyFlags {
        PolicyFlags {
            blacklisted: self.is_blacklisted,
            lp_pair: self.is_taxed_lp_pair,
            tax_exempt: self.is_tax_exempt,
        }
    }

    pub fn blacklist(&mut self, reason: String) -> Result<()> {
        require!(reason.len() <= MAX_REASON_LEN, TokenError::ReasonTooLong);
        require!(!self.is_blacklisted, TokenError::InvalidState);
        self.is_blacklisted = true;
        self.blacklist_reason = reason;
        Ok(())
    }

    pub fn unblacklist(&mut self) -> Result<()> {
        require!(self.is_blacklisted, TokenError::InvalidState);
        self.is_blacklisted = false;
        self.blacklist_reason.clear();
        Ok(())
    }

    pub fn set_taxed_lp_pair(&mut self, enabled: bool) {
        self.is_taxed_lp_pair = enabled;
    }

    pub fn set_tax_exempt(&mut self, enabled: bool) {
        self.is_tax_exempt = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::error_code;

    fn ledger(owner: Pubkey) -> TokenLedger {
        TokenLedger::new(owner, "Taxable".to_string(), "TAX".to_string(), 9, 1_000).unwrap()
    }

    #[test]
    fn new_ledger_starts_active_and_untaxed() {
        let owner = Pubkey::new_unique();
        let ledger = ledger(owner);
        assert_eq!(ledger.owner, owner);
        assert_eq!(ledger.total_supply, 1_000);
        assert!(!ledger.is_paused);
        assert_eq!(ledger.taxes, TaxRates::default());
    }

    #[test]
    fn rejects_oversized_metadata() {
        let owner = Pubkey::new_unique();
        let err = TokenLedger::new(owner, "n".repeat(33), "TAX".to_string(), 9, 0).unwrap_err();
        assert_eq!(error_code(&err), u32::from(TokenError::NameTooLong));
        let err = TokenLedger::new(owner, "Taxable".to_string(), "s".repeat(11), 9, 0).unwrap_err();
        assert_eq!(error_code(&err), u32::from(TokenError::SymbolTooLong));
    }

    #[test]
    fn only_owner_passes_the_gate() {
        let owner = Pubkey::new_unique();
        let ledger = ledger(owner);
        assert!(ledger.require_owner(&owner).is_ok());
        let err = ledger.require_owner(&Pubkey::new_unique()).unwrap_err();
        assert_eq!(error_code(&err), u32::from(TokenError::Unauthorized));
    }

    #[test]
    fn redundant_pause_transitions_are_rejected() {
        let mut ledger = ledger(Pubkey::new_unique());
        ledger.set_paused(true).unwrap();
        let err = ledger.set_paused(true).unwrap_err();
        assert_eq!(error_code(&err), u32::from(TokenError::InvalidState));
        ledger.set_paused(false).unwrap();
        let err = ledger.set_paused(false).unwrap_err();
        assert_eq!(error_code(&err), u32::from(TokenError::InvalidState));
        assert_eq!(ledger.audit_counter, 2);
    }

    #[test]
    fn mint_overflow_leaves_supply_untouched() {
        let mut ledger = ledger(Pubkey::new_unique());
        ledger.total_supply = u64::MAX - 1;
        let err = ledger.record_mint(2).unwrap_err();
        assert_eq!(error_code(&err), u32::from(TokenError::Overflow));
        assert_eq!(ledger.total_supply, u64::MAX - 1);
    }

    #[test]
    fn ownership_cannot_be_handed_to_self() {
        let owner = Pubkey::new_unique();
        let mut ledger = ledger(owner);
        let err = ledger.transfer_ownership(owner).unwrap_err();
        assert_eq!(error_code(&err), u32::from(TokenError::InvalidState));

        let next = Pubkey::new_unique();
        ledger.transfer_ownership(next).unwrap();
        assert!(ledger.is_owner(&next));
        assert!(!ledger.is_owner(&owner));
    }

    #[test]
    fn blacklist_toggles_must_change_state() {
        let mut policy = WalletPolicy::default();
        policy.blacklist("phishing".to_string()).unwrap();
        assert!(policy.flags().blacklisted);
        let err = policy.blacklist("again".to_string()).unwrap_err();
        assert_eq!(error_code(&err), u32::from(TokenError::InvalidState));

        policy.unblacklist().unwrap();
        assert!(policy.blacklist_reason.is_empty());
        let err = policy.unblacklist().unwrap_err();
        assert_eq!(error_code(&err), u32::from(TokenError::InvalidState));
    }

    #[test]
    fn binding_rejects_foreign_accounts() {
        let ledger_key = Pubkey::new_unique();
        let holder = Pubkey::new_unique();
        let mut balance = BalanceAccount::default();
        balance.bind(ledger_key, holder, 254).unwrap();
        assert_eq!(balance.holder, holder);
        balance.bind(ledger_key, holder, 254).unwrap();

        let err = balance
            .bind(Pubkey::new_unique(), holder, 254)
            .unwrap_err();
        assert_eq!(error_code(&err), u32::from(TokenError::Unauthorized));
    }
}
