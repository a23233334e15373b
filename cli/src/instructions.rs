use anyhow::Result;
use borsh::BorshSerialize;
use sha2::{Digest, Sha256};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_program;
use taxed_token::constants::{LEDGER_BALANCE_SEED, WALLET_POLICY_SEED};

pub fn find_balance_pda(ledger: &Pubkey, holder: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[LEDGER_BALANCE_SEED, ledger.as_ref(), holder.as_ref()],
        &taxed_token::ID,
    )
}

pub fn find_policy_pda(ledger: &Pubkey, wallet: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[WALLET_POLICY_SEED, ledger.as_ref(), wallet.as_ref()],
        &taxed_token::ID,
    )
}

fn anchor_discriminator(name: &str) -> [u8; 8] {
    let mut hasher = Sha256::new();
    hasher.update(format!("global:{}", name));
    let hash = hasher.finalize();
    let mut output = [0u8; 8];
    output.copy_from_slice(&hash[..8]);
    output
}

fn build_instruction(name: &str, data: Vec<u8>, accounts: Vec<AccountMeta>) -> Instruction {
    let mut payload = Vec::with_capacity(8 + data.len());
    payload.extend_from_slice(&anchor_discriminator(name));
    payload.extend_from_slice(&data);
    Instruction {
        program_id: taxed_token::ID,
        accounts,
        data: payload,
    }
}

#[derive(BorshSerialize)]
struct InitializeArgs {
    name: String,
    symbol: String,
    decimals: u8,
    initial_supply: u64,
}

#[derive(BorshSerialize)]
struct AmountArgs {
    amount: u64,
}

#[derive(BorshSerialize)]
struct SetTaxesArgs {
    buy: u8,
    sell: u8,
    transfer: u8,
}

#[derive(BorshSerialize)]
struct AddToBlacklistArgs {
    wallet: Pubkey,
    reason: String,
}

#[derive(BorshSerialize)]
struct WalletArgs {
    wallet: Pubkey,
}

pub struct InitializeParams {
    pub owner: Pubkey,
    pub ledger: Pubkey,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub initial_supply: u64,
}

pub fn build_initialize_instruction(params: InitializeParams) -> Result<Instruction> {
    let owner_balance = find_balance_pda(&params.ledger, &params.owner).0;
    let accounts = vec![
        AccountMeta::new(params.owner, true),
        AccountMeta::new(params.ledger, true),
        AccountMeta::new(owner_balance, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    let data = InitializeArgs {
        name: params.name,
        symbol: params.symbol,
        decimals: params.decimals,
        initial_supply: params.initial_supply,
    }
    .try_to_vec()?;
    Ok(build_instruction("initialize", data, accounts))
}

pub struct MintParams {
    pub owner: Pubkey,
    pub ledger: Pubkey,
    pub recipient: Pubkey,
    pub amount: u64,
}

pub fn build_mint_instruction(params: MintParams) -> Result<Instruction> {
    let recipient_balance = find_balance_pda(&params.ledger, &params.recipient).0;
    let accounts = vec![
        AccountMeta::new(params.owner, true),
        AccountMeta::new(params.ledger, false),
        AccountMeta::new_readonly(params.recipient, false),
        AccountMeta::new(recipient_balance, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    let data = AmountArgs {
        amount: params.amount,
    }
    .try_to_vec()?;
    Ok(build_instruction("mint", data, accounts))
}

pub struct TransferParams {
    pub sender: Pubkey,
    pub ledger: Pubkey,
    /// Current ledger owner; the tax lands in its balance account.
    pub ledger_owner: Pubkey,
    pub recipient: Pubkey,
    pub amount: u64,
}

pub fn build_transfer_instruction(params: TransferParams) -> Result<Instruction> {
    let ledger = params.ledger;
    let accounts = vec![
        AccountMeta::new(params.sender, true),
        AccountMeta::new_readonly(ledger, false),
        AccountMeta::new_readonly(params.recipient, false),
        AccountMeta::new(find_balance_pda(&ledger, &params.sender).0, false),
        AccountMeta::new(find_balance_pda(&ledger, &params.recipient).0, false),
        AccountMeta::new(find_balance_pda(&ledger, &params.ledger_owner).0, false),
        AccountMeta::new_readonly(find_policy_pda(&ledger, &params.sender).0, false),
        AccountMeta::new_readonly(find_policy_pda(&ledger, &params.recipient).0, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    let data = AmountArgs {
        amount: params.amount,
    }
    .try_to_vec()?;
    Ok(build_instruction("transfer", data, accounts))
}

fn admin_accounts(owner: Pubkey, ledger: Pubkey) -> Vec<AccountMeta> {
    vec![
        AccountMeta::new_readonly(owner, true),
        AccountMeta::new(ledger, false),
    ]
}

pub fn build_pause_instruction(owner: Pubkey, ledger: Pubkey) -> Instruction {
    build_instruction("pause", Vec::new(), admin_accounts(owner, ledger))
}

pub fn build_unpause_instruction(owner: Pubkey, ledger: Pubkey) -> Instruction {
    build_instruction("unpause", Vec::new(), admin_accounts(owner, ledger))
}

pub struct SetTaxesParams {
    pub owner: Pubkey,
    pub ledger: Pubkey,
    pub buy: u8,
    pub sell: u8,
    pub transfer: u8,
}

pub fn build_set_taxes_instruction(params: SetTaxesParams) -> Result<Instruction> {
    let data = SetTaxesArgs {
        buy: params.buy,
        sell: params.sell,
        transfer: params.transfer,
    }
    .try_to_vec()?;
    Ok(build_instruction(
        "set_taxes",
        data,
        admin_accounts(params.owner, params.ledger),
    ))
}

/// Wallet policy updates that share the `UpdateWalletPolicy` account list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyUpdate {
    RemoveFromBlacklist,
    AddTaxedLpPair,
    RemoveTaxedLpPair,
    AddExemptFromTaxes,
    RemoveExemptFromTaxes,
}

impl PolicyUpdate {
    fn instruction_name(self) -> &'static str {
        match self {
            Self::RemoveFromBlacklist => "remove_from_blacklist",
            Self::AddTaxedLpPair => "add_taxed_lp_pair",
            Self::RemoveTaxedLpPair => "remove_taxed_lp_pair",
            Self::AddExemptFromTaxes => "add_exempt_from_taxes",
            Self::RemoveExemptFromTaxes => "remove_exempt_from_taxes",
        }
    }
}

fn policy_accounts(owner: Pubkey, ledger: Pubkey, wallet: Pubkey) -> Vec<AccountMeta> {
    vec![
        AccountMeta::new(owner, true),
        AccountMeta::new(ledger, false),
        AccountMeta::new(find_policy_pda(&ledger, &wallet).0, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ]
}

pub struct AddToBlacklistParams {
    pub owner: Pubkey,
    pub ledger: Pubkey,
    pub wallet: Pubkey,
    pub reason: String,
}

pub fn build_add_to_blacklist_instruction(params: AddToBlacklistParams) -> Result<Instruction> {
    let accounts = policy_accounts(params.owner, params.ledger, params.wallet);
    let data = AddToBlacklistArgs {
        wallet: params.wallet,
        reason: params.reason,
    }
    .try_to_vec()?;
    Ok(build_instruction("add_to_blacklist", data, accounts))
}

pub fn build_policy_instruction(
    update: PolicyUpdate,
    owner: Pubkey,
    ledger: Pubkey,
    wallet: Pubkey,
) -> Result<Instruction> {
    let data = WalletArgs { wallet }.try_to_vec()?;
    Ok(build_instruction(
        update.instruction_name(),
        data,
        policy_accounts(owner, ledger, wallet),
    ))
}

pub struct SeizeParams {
    pub owner: Pubkey,
    pub ledger: Pubkey,
    pub wallet: Pubkey,
}

pub fn build_seize_instruction(params: SeizeParams) -> Instruction {
    let ledger = params.ledger;
    let accounts = vec![
        AccountMeta::new(params.owner, true),
        AccountMeta::new(ledger, false),
        AccountMeta::new_readonly(params.wallet, false),
        AccountMeta::new_readonly(find_policy_pda(&ledger, &params.wallet).0, false),
        AccountMeta::new(find_balance_pda(&ledger, &params.wallet).0, false),
        AccountMeta::new(find_balance_pda(&ledger, &params.owner).0, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    build_instruction("seize", Vec::new(), accounts)
}

pub struct TransferOwnershipParams {
    pub owner: Pubkey,
    pub ledger: Pubkey,
    pub new_owner: Pubkey,
}

pub fn build_transfer_ownership_instruction(params: TransferOwnershipParams) -> Instruction {
    let accounts = vec![
        AccountMeta::new(params.owner, true),
        AccountMeta::new(params.ledger, false),
        AccountMeta::new_readonly(params.new_owner, false),
        AccountMeta::new(find_balance_pda(&params.ledger, &params.new_owner).0, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    build_instruction("transfer_ownership", Vec::new(), accounts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::{Discriminator, InstructionData};

    #[test]
    fn discriminators_match_program() {
        assert_eq!(
            anchor_discriminator("transfer"),
            taxed_token::instruction::Transfer::DISCRIMINATOR
        );
        assert_eq!(
            anchor_discriminator("add_exempt_from_taxes"),
            taxed_token::instruction::AddExemptFromTaxes::DISCRIMINATOR
        );
        assert_eq!(
            anchor_discriminator(PolicyUpdate::RemoveTaxedLpPair.instruction_name()),
            taxed_token::instruction::RemoveTaxedLpPair::DISCRIMINATOR
        );
    }

    #[test]
    fn set_taxes_data_matches_program_encoding() {
        let owner = Pubkey::new_unique();
        let ledger = Pubkey::new_unique();
        let ix = build_set_taxes_instruction(SetTaxesParams {
            owner,
            ledger,
            buy: 5,
            sell: 10,
            transfer: 15,
        })
        .unwrap();

        let expected = taxed_token::instruction::SetTaxes {
            args: taxed_token::instructions::taxes::SetTaxesArgs {
                buy: 5,
                sell: 10,
                transfer: 15,
            },
        }
        .data();
        assert_eq!(ix.data, expected);
        assert_eq!(ix.accounts.len(), 2);
        assert!(ix.accounts[0].is_signer);
    }

    #[test]
    fn blacklist_data_matches_program_encoding() {
        let owner = Pubkey::new_unique();
        let ledger = Pubkey::new_unique();
        let wallet = Pubkey::new_unique();
        let ix = build_add_to_blacklist_instruction(AddToBlacklistParams {
            owner,
            ledger,
            wallet,
            reason: "phishing".to_string(),
        })
        .unwrap();

        let expected = taxed_token::instruction::AddToBlacklist {
            wallet,
            reason: "phishing".to_string(),
        }
        .data();
        assert_eq!(ix.data, expected);
        assert_eq!(ix.accounts[2].pubkey, find_policy_pda(&ledger, &wallet).0);
    }

    #[test]
    fn transfer_routes_tax_to_owner_balance() {
        let sender = Pubkey::new_unique();
        let ledger = Pubkey::new_unique();
        let ledger_owner = Pubkey::new_unique();
        let recipient = Pubkey::new_unique();
        let ix = build_transfer_instruction(TransferParams {
            sender,
            ledger,
            ledger_owner,
            recipient,
            amount: 1_000,
        })
        .unwrap();

        assert_eq!(ix.accounts.len(), 9);
        assert_eq!(ix.accounts[5].pubkey, find_balance_pda(&ledger, &ledger_owner).0);
        assert_eq!(
            ix.data,
            taxed_token::instruction::Transfer { amount: 1_000 }.data()
        );
    }

    #[test]
    fn seize_can_create_an_unfunded_wallet_balance() {
        let owner = Pubkey::new_unique();
        let ledger = Pubkey::new_unique();
        let wallet = Pubkey::new_unique();
        let ix = build_seize_instruction(SeizeParams {
            owner,
            ledger,
            wallet,
        });

        assert_eq!(ix.accounts.len(), 7);
        assert!(ix.accounts[0].is_signer && ix.accounts[0].is_writable);
        assert_eq!(ix.accounts[4].pubkey, find_balance_pda(&ledger, &wallet).0);
        assert!(ix.accounts[4].is_writable);
        assert_eq!(ix.accounts[6].pubkey, system_program::id());
        assert_eq!(ix.data, taxed_token::instruction::Seize {}.data());
    }
}
