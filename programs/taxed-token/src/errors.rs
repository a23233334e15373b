use anchor_lang::prelude::*;

#[error_code]
pub enum TokenError {
    #[msg("Caller is not the ledger owner")]
    Unauthorized,

    #[msg("Transfers are paused")]
    Paused,

    #[msg("Sender or recipient is blacklisted")]
    Blacklisted,

    #[msg("Insufficient token balance")]
    InsufficientBalance,

    #[msg("Arithmetic overflow")]
    Overflow,

    #[msg("Operation is not valid in the current ledger state")]
    InvalidState,

    #[msg("Name exceeds maximum length of 32 characters")]
    NameTooLong,

    #[msg("Symbol exceeds maximum length of 10 characters")]
    SymbolTooLong,

    #[msg("Reason exceeds maximum length of 128 characters")]
    ReasonTooLong,
}
