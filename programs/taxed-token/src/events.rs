use anchor_lang::prelude::*;

use crate::tax::TransferKind;

#[event]
pub struct LedgerInitialized {
    pub ledger: Pubkey,
    pub owner: Pubkey,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub initial_supply: u64,
    pub timestamp: i64,
}

#[event]
pub struct TokensMinted {
    pub ledger: Pubkey,
    pub recipient: Pubkey,
    pub amount: u64,
    pub new_total_supply: u64,
    pub timestamp: i64,
}

#[event]
pub struct TokensTransferred {
    pub ledger: Pubkey,
    pub from: Pubkey,
    pub to: Pubkey,
    pub kind: TransferKind,
    pub amount: u64,
    pub tax: u64,
    pub net_amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct LedgerPaused {
    pub ledger: Pubkey,
    pub paused_by: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct LedgerUnpaused {
    pub ledger: Pubkey,
    pub unpaused_by: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct BlacklistAdded {
    pub ledger: Pubkey,
    pub wallet: Pubkey,
    pub reason: String,
    pub timestamp: i64,
}

#[event]
pub struct BlacklistRemoved {
    pub ledger: Pubkey,
    pub wallet: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct TaxesUpdated {
    pub ledger: Pubkey,
    pub buy: u8,
    pub sell: u8,
    pub transfer: u8,
    pub timestamp: i64,
}

#[event]
pub struct LpPairUpdated {
    pub ledger: Pubkey,
    pub wallet: Pubkey,
    pub is_taxed_lp_pair: bool,
    pub timestamp: i64,
}

#[event]
pub struct TaxExemptionUpdated {
    pub ledger: Pubkey,
    pub wallet: Pubkey,
    pub is_tax_exempt: bool,
    pub timestamp: i64,
}

#[event]
pub struct TokensSeized {
    pub ledger: Pubkey,
    pub wallet: Pubkey,
    pub amount: u64,
    pub seized_by: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct OwnershipTransferred {
    pub ledger: Pubkey,
    pub old_owner: Pubkey,
    pub new_owner: Pubkey,
    pub timestamp: i64,
}
