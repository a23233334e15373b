//! Ledger operations over plain values. Instruction handlers load accounts
//! into a [`Settlement`], run one of these, and write the settled balances
//! back only when it returns `Ok`.

use anchor_lang::prelude::*;

use crate::errors::TokenError;
use crate::settlement::Settlement;
use crate::state::{PolicyFlags, TokenLedger};
use crate::tax::{self, TaxQuote};

#[derive(Debug, Clone, Copy)]
pub struct TransferRequest {
    pub sender: Pubkey,
    pub recipient: Pubkey,
    pub amount: u64,
    pub sender_flags: PolicyFlags,
    pub recipient_flags: PolicyFlags,
}

/// Settlement keys of the balances a transfer touches.
#[derive(Debug, Clone, Copy)]
pub struct TransferKeys {
    pub from: Pubkey,
    pub to: Pubkey,
    pub treasury: Pubkey,
}

/// Checks run in order: balance, pause gate, blacklist. Nothing in
/// `settlement` changes unless every step succeeds.
pub fn execute_transfer(
    ledger: &TokenLedger,
    request: &TransferRequest,
    keys: &TransferKeys,
    settlement: &mut Settlement,
) -> Result<TaxQuote> {
    require!(
        settlement.settled(&keys.from)? >= request.amount,
        TokenError::InsufficientBalance
    );
    require!(
        !ledger.is_paused || ledger.is_owner(&request.sender),
        TokenError::Paused
    );
    require!(
        !request.sender_flags.blacklisted && !request.recipient_flags.blacklisted,
        TokenError::Blacklisted
    );

    let quote = tax::quote(
        &ledger.taxes,
        request.sender_flags,
        request.recipient_flags,
        request.amount,
    )?;

    let mut working = settlement.clone();
    working.debit(&keys.from, quote.amount)?;
    working.credit(&keys.to, quote.net_amount)?;
    working.credit(&keys.treasury, quote.tax)?;
    *settlement = working;

    Ok(quote)
}

/// Credits `to` and grows the supply. Returns the new total supply.
pub fn execute_mint(
    ledger: &mut TokenLedger,
    caller: &Pubkey,
    to: &Pubkey,
    amount: u64,
    settlement: &mut Settlement,
) -> Result<u64> {
    ledger.require_owner(caller)?;
    ledger
        .total_supply
        .checked_add(amount)
        .ok_or(TokenError::Overflow)?;

    let mut working = settlement.clone();
    working.credit(to, amount)?;
    let new_supply = ledger.record_mint(amount)?;
    *settlement = working;

    Ok(new_supply)
}

/// Moves the whole balance of a blacklisted wallet into the owner's balance.
/// Pause and tax do not apply. Returns the amount moved.
pub fn execute_seize(
    ledger: &mut TokenLedger,
    caller: &Pubkey,
    target_flags: PolicyFlags,
    from: &Pubkey,
    treasury: &Pubkey,
    settlement: &mut Settlement,
) -> Result<u64> {
    ledger.require_owner(caller)?;
    require!(target_flags.blacklisted, TokenError::InvalidState);

    let amount = settlement.settled(from)?;
    let mut working = settlement.clone();
    working.debit(from, amount)?;
    working.credit(treasury, amount)?;
    ledger.record_audit()?;
    *settlement = working;

    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::{TaxRates, TransferKind};
    use crate::test_utils::error_code;

    struct Fixture {
        ledger: TokenLedger,
        owner: Pubkey,
        alice: Pubkey,
        bob: Pubkey,
        settlement: Settlement,
    }

    fn fixture() -> Fixture {
        let owner = Pubkey::new_unique();
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();
        let mut ledger =
            TokenLedger::new(owner, "Taxable".to_string(), "TAX".to_string(), 9, 10_000)
                .unwrap();
        ledger.set_taxes(TaxRates::new(5, 10, 15)).unwrap();

        let mut settlement = Settlement::default();
        settlement.track(owner, 8_000);
        settlement.track(alice, 2_000);
        settlement.track(bob, 0);
        Fixture {
            ledger,
            owner,
            alice,
            bob,
            settlement,
        }
    }

    fn request(sender: Pubkey, recipient: Pubkey, amount: u64) -> TransferRequest {
        TransferRequest {
            sender,
            recipient,
            amount,
            sender_flags: PolicyFlags::default(),
            recipient_flags: PolicyFlags::default(),
        }
    }

    #[test]
    fn plain_transfer_routes_tax_to_owner() {
        let mut f = fixture();
        let keys = TransferKeys {
            from: f.alice,
            to: f.bob,
            treasury: f.owner,
        };
        let quote = execute_transfer(
            &f.ledger,
            &request(f.alice, f.bob, 1_000),
            &keys,
            &mut f.settlement,
        )
        .unwrap();

        assert_eq!(quote.kind, TransferKind::Plain);
        assert_eq!(f.settlement.balance_of(&f.alice), Some(1_000));
        assert_eq!(f.settlement.balance_of(&f.bob), Some(850));
        assert_eq!(f.settlement.balance_of(&f.owner), Some(8_150));
        assert_eq!(f.settlement.total(), Some(10_000));
    }

    #[test]
    fn owner_sending_pays_tax_to_itself() {
        let mut f = fixture();
        let keys = TransferKeys {
            from: f.owner,
            to: f.bob,
            treasury: f.owner,
        };
        execute_transfer(
            &f.ledger,
            &request(f.owner, f.bob, 1_000),
            &keys,
            &mut f.settlement,
        )
        .unwrap();

        assert_eq!(f.settlement.balance_of(&f.owner), Some(7_150));
        assert_eq!(f.settlement.balance_of(&f.bob), Some(850));
        assert_eq!(f.settlement.total(), Some(10_000));
    }

    #[test]
    fn balance_check_comes_before_pause_and_blacklist() {
        let mut f = fixture();
        f.ledger.set_paused(true).unwrap();
        let mut req = request(f.alice, f.bob, 2_001);
        req.sender_flags.blacklisted = true;
        let keys = TransferKeys {
            from: f.alice,
            to: f.bob,
            treasury: f.owner,
        };

        let err = execute_transfer(&f.ledger, &req, &keys, &mut f.settlement).unwrap_err();
        assert_eq!(error_code(&err), u32::from(TokenError::InsufficientBalance));

        req.amount = 10;
        let err = execute_transfer(&f.ledger, &req, &keys, &mut f.settlement).unwrap_err();
        assert_eq!(error_code(&err), u32::from(TokenError::Paused));
    }

    #[test]
    fn failed_credit_leaves_settlement_untouched() {
        let mut f = fixture();
        f.settlement.track(Pubkey::default(), u64::MAX);
        let keys = TransferKeys {
            from: f.alice,
            to: Pubkey::default(),
            treasury: f.owner,
        };
        let err = execute_transfer(
            &f.ledger,
            &request(f.alice, Pubkey::default(), 100),
            &keys,
            &mut f.settlement,
        )
        .unwrap_err();

        assert_eq!(error_code(&err), u32::from(TokenError::Overflow));
        assert_eq!(f.settlement.balance_of(&f.alice), Some(2_000));
        assert_eq!(f.settlement.balance_of(&f.owner), Some(8_000));
    }

    #[test]
    fn mint_requires_owner() {
        let mut f = fixture();
        let err = execute_mint(&mut f.ledger, &f.alice, &f.alice, 500, &mut f.settlement)
            .unwrap_err();
        assert_eq!(error_code(&err), u32::from(TokenError::Unauthorized));
        assert_eq!(f.ledger.total_supply, 10_000);
        assert_eq!(f.settlement.balance_of(&f.alice), Some(2_000));

        let supply =
            execute_mint(&mut f.ledger, &f.owner, &f.alice, 500, &mut f.settlement).unwrap();
        assert_eq!(supply, 10_500);
        assert_eq!(f.settlement.balance_of(&f.alice), Some(2_500));
    }

    #[test]
    fn mint_overflowing_a_balance_keeps_supply() {
        let mut f = fixture();
        let rich = Pubkey::new_unique();
        f.settlement.track(rich, u64::MAX - 3);
        let err = execute_mint(&mut f.ledger, &f.owner, &rich, 6, &mut f.settlement)
            .unwrap_err();
        assert_eq!(error_code(&err), u32::from(TokenError::Overflow));
        assert_eq!(f.ledger.total_supply, 10_000);
        assert_eq!(f.settlement.balance_of(&rich), Some(u64::MAX - 3));
    }

    #[test]
    fn seize_needs_a_blacklisted_target() {
        let mut f = fixture();
        let err = execute_seize(
            &mut f.ledger,
            &f.owner,
            PolicyFlags::default(),
            &f.alice,
            &f.owner,
            &mut f.settlement,
        )
        .unwrap_err();
        assert_eq!(error_code(&err), u32::from(TokenError::InvalidState));

        let flags = PolicyFlags {
            blacklisted: true,
            ..PolicyFlags::default()
        };
        let err = execute_seize(
            &mut f.ledger,
            &f.alice,
            flags,
            &f.alice,
            &f.owner,
            &mut f.settlement,
        )
        .unwrap_err();
        assert_eq!(error_code(&err), u32::from(TokenError::Unauthorized));

        let moved = execute_seize(
            &mut f.ledger,
            &f.owner,
            flags,
            &f.alice,
            &f.owner,
            &mut f.settlement,
        )
        .unwrap();
        assert_eq!(moved, 2_000);
        assert_eq!(f.settlement.balance_of(&f.alice), Some(0));
        assert_eq!(f.settlement.balance_of(&f.owner), Some(10_000));
        assert_eq!(f.ledger.total_supply, 10_000);
    }

    #[test]
    fn fresh_sender_reads_as_zero_balance() {
        let mut f = fixture();
        let carol = Pubkey::new_unique();
        f.settlement.track(carol, 0);
        let keys = TransferKeys {
            from: carol,
            to: f.bob,
            treasury: f.owner,
        };

        let err = execute_transfer(
            &f.ledger,
            &request(carol, f.bob, 1),
            &keys,
            &mut f.settlement,
        )
        .unwrap_err();
        assert_eq!(error_code(&err), u32::from(TokenError::InsufficientBalance));

        let quote = execute_transfer(
            &f.ledger,
            &request(carol, f.bob, 0),
            &keys,
            &mut f.settlement,
        )
        .unwrap();
        assert_eq!(quote.tax, 0);
        assert_eq!(f.settlement.balance_of(&carol), Some(0));
        assert_eq!(f.settlement.balance_of(&f.bob), Some(0));
        assert_eq!(f.settlement.total(), Some(10_000));
    }

    #[test]
    fn seizing_an_unfunded_wallet_moves_nothing() {
        let mut f = fixture();
        let flags = PolicyFlags {
            blacklisted: true,
            ..PolicyFlags::default()
        };
        let moved = execute_seize(
            &mut f.ledger,
            &f.owner,
            flags,
            &f.bob,
            &f.owner,
            &mut f.settlement,
        )
        .unwrap();
        assert_eq!(moved, 0);
        assert_eq!(f.settlement.balance_of(&f.bob), Some(0));
        assert_eq!(f.settlement.balance_of(&f.owner), Some(8_000));
    }
}
