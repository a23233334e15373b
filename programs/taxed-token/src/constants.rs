pub const LEDGER_BALANCE_SEED: &[u8] = b"balance";
pub const WALLET_POLICY_SEED: &[u8] = b"policy";

pub const MAX_NAME_LEN: usize = 32;
pub const MAX_SYMBOL_LEN: usize = 10;
pub const MAX_REASON_LEN: usize = 128;

/// Tax rates are whole percentage points.
pub const MAX_TAX_RATE: u8 = 100;
pub const TAX_RATE_DENOMINATOR: u64 = 100;
