//! Transfer classification and fee computation.

use anchor_lang::prelude::*;

use crate::constants::{MAX_TAX_RATE, TAX_RATE_DENOMINATOR};
use crate::errors::TokenError;
use crate::state::PolicyFlags;

/// Whole-percent rates for each transfer direction.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TaxRates {
    pub buy: u8,
    pub sell: u8,
    pub transfer: u8,
}

impl TaxRates {
    pub fn new(buy: u8, sell: u8, transfer: u8) -> Self {
        Self {
            buy,
            sell,
            transfer,
        }
    }

    pub fn validate(&self) -> Result<()> {
        require!(
            self.buy <= MAX_TAX_RATE && self.sell <= MAX_TAX_RATE && self.transfer <= MAX_TAX_RATE,
            TokenError::InvalidState
        );
        Ok(())
    }

    pub fn rate_for(&self, kind: TransferKind) -> u8 {
        match kind {
            TransferKind::Exempt => 0,
            TransferKind::Buy => self.buy,
            TransferKind::Sell => self.sell,
            TransferKind::Plain => self.transfer,
        }
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferKind {
    Exempt,
    Buy,
    Sell,
    Plain,
}

impl TransferKind {
    /// Exemption on either side wins, then a sending LP pair (buy), then a
    /// receiving LP pair (sell).
    pub fn classify(sender: PolicyFlags, recipient: PolicyFlags) -> Self {
        if sender.tax_exempt || recipient.tax_exempt {
            TransferKind::Exempt
        } else if sender.lp_pair {
            TransferKind::Buy
        } else if recipient.lp_pair {
            TransferKind::Sell
        } else {
            TransferKind::Plain
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferKind::Exempt => "exempt",
            TransferKind::Buy => "buy",
            TransferKind::Sell => "sell",
            TransferKind::Plain => "transfer",
        }
    }
}

/// `(amount / 100) * rate`. The division runs first, so any remainder below
/// 100 base units is never taxed.
pub fn compute_tax(amount: u64, rate: u8) -> Result<u64> {
    require!(rate <= MAX_TAX_RATE, TokenError::InvalidState);
    let tax = (amount / TAX_RATE_DENOMINATOR)
        .checked_mul(u64::from(rate))
        .ok_or(TokenError::Overflow)?;
    Ok(tax)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxQuote {
    pub kind: TransferKind,
    pub rate: u8,
    pub amount: u64,
    pub tax: u64,
    pub net_amount: u64,
}

pub fn quote(
    taxes: &TaxRates,
    sender: PolicyFlags,
    recipient: PolicyFlags,
    amount: u64,
) -> Result<TaxQuote> {
    let kind = TransferKind::classify(sender, recipient);
    let rate = taxes.rate_for(kind);
    let tax = compute_tax(amount, rate)?;
    let net_amount = amount.checked_sub(tax).ok_or(TokenError::Overflow)?;
    Ok(TaxQuote {
        kind,
        rate,
        amount,
        tax,
        net_amount,
    })
}
