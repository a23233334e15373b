use anyhow::Result;
use serde::Serialize;

#[derive(Serialize)]
pub struct InitOutput {
    pub ledger: String,
    pub owner: String,
    pub initial_supply: u64,
    pub signature: String,
    pub explorer: Option<String>,
}

#[derive(Serialize)]
pub struct SimpleOutput {
    pub signature: String,
    pub explorer: Option<String>,
}

#[derive(Serialize)]
pub struct MintOutput {
    pub signature: String,
    pub explorer: Option<String>,
    pub new_supply: u64,
}

#[derive(Serialize)]
pub struct TransferOutput {
    pub signature: String,
    pub explorer: Option<String>,
    #[serde(flatten)]
    pub quote: QuoteOutput,
}

#[derive(Serialize)]
pub struct QuoteOutput {
    pub kind: String,
    pub rate: u8,
    pub amount: u64,
    pub tax: u64,
    pub net_amount: u64,
}

#[derive(Serialize)]
pub struct BlacklistStatusOutput {
    pub wallet: String,
    pub is_blacklisted: bool,
    pub reason: Option<String>,
}

#[derive(Serialize)]
pub struct TaxesOutput {
    pub buy: u8,
    pub sell: u8,
    pub transfer: u8,
}

#[derive(Serialize)]
pub struct StatusOutput {
    pub ledger: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub owner: String,
    pub is_paused: bool,
    pub total_supply: u64,
    pub taxes: TaxesOutput,
    pub audit_counter: u64,
    pub blacklisted: Vec<String>,
    pub lp_pairs: Vec<String>,
    pub exempt: Vec<String>,
}

#[derive(Serialize)]
pub struct SupplyOutput {
    pub ledger: String,
    pub supply: u64,
}

#[derive(Serialize)]
pub struct BalanceOutput {
    pub holder: String,
    pub amount: u64,
}

#[derive(Serialize, Clone)]
pub struct HolderInfo {
    pub holder: String,
    pub balance_account: String,
    pub amount: u64,
}

#[derive(Serialize)]
pub struct HoldersOutput {
    pub holders: Vec<HolderInfo>,
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
