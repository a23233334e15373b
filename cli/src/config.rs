use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use taxed_token::constants::MAX_TAX_RATE;
use taxed_token::tax::TaxRates;

/// Token definition file passed to `init --config` and `quote --config`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenFileConfig {
    pub token: TokenConfig,
    pub taxes: Option<TaxConfig>,
    #[serde(default)]
    pub lp_pairs: Vec<String>,
    #[serde(default)]
    pub exempt: Vec<String>,
    pub network: Option<NetworkConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenConfig {
    pub name: String,
    pub symbol: String,
    pub decimals: Option<u8>,
    pub initial_supply: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct TaxConfig {
    #[serde(default)]
    pub buy: u8,
    #[serde(default)]
    pub sell: u8,
    #[serde(default)]
    pub transfer: u8,
}

impl TaxConfig {
    pub fn to_rates(self) -> Result<TaxRates> {
        for (label, rate) in [
            ("buy", self.buy),
            ("sell", self.sell),
            ("transfer", self.transfer),
        ] {
            if rate > MAX_TAX_RATE {
                return Err(anyhow!(
                    "{} tax {} exceeds {}%",
                    label,
                    rate,
                    MAX_TAX_RATE
                ));
            }
        }
        Ok(TaxRates::new(self.buy, self.sell, self.transfer))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    pub cluster: Option<String>,
    pub keypair_path: Option<String>,
    pub commitment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolanaCliConfig {
    pub json_rpc_url: String,
    pub keypair_path: String,
    pub commitment: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ClusterInfo {
    pub url: String,
    pub label: Option<String>,
}

pub fn load_token_config(path: &str) -> Result<TokenFileConfig> {
    let contents = fs::read_to_string(expand_tilde(path))
        .with_context(|| format!("Failed to read config: {}", path))?;
    parse_token_config(&contents)
}

pub fn parse_token_config(contents: &str) -> Result<TokenFileConfig> {
    toml::from_str(contents).context("Failed to parse config")
}

pub fn load_solana_cli_config() -> Result<SolanaCliConfig> {
    let path = default_solana_config_path();
    let contents = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read Solana config: {}", path.display()))?;
    serde_yaml::from_str(&contents).context("Failed to parse Solana config")
}

fn default_solana_config_path() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".config");
    path.push("solana");
    path.push("cli");
    path.push("config.yml");
    path
}

pub fn resolve_cluster(input: &str) -> Result<ClusterInfo> {
    let lowered = input.to_lowercase();
    let (url, label) = match lowered.as_str() {
        "devnet" => (
            "https://api.devnet.solana.com".to_string(),
            Some("devnet".to_string()),
        ),
        "testnet" => (
            "https://api.testnet.solana.com".to_string(),
            Some("testnet".to_string()),
        ),
        "mainnet" | "mainnet-beta" => (
            "https://api.mainnet-beta.solana.com".to_string(),
            Some("mainnet-beta".to_string()),
        ),
        "localnet" | "localhost" => ("http://127.0.0.1:8899".to_string(), None),
        _ => {
            if input.starts_with("http://") || input.starts_with("https://") {
                let label = ["devnet", "testnet", "mainnet"]
                    .into_iter()
                    .find(|name| lowered.contains(name))
                    .map(|name| {
                        if name == "mainnet" {
                            "mainnet-beta".to_string()
                        } else {
                            name.to_string()
                        }
                    });
                (input.to_string(), label)
            } else {
                return Err(anyhow!("Unknown cluster: {}", input));
            }
        }
    };
    Ok(ClusterInfo { url, label })
}

pub fn parse_commitment(value: Option<&str>) -> CommitmentConfig {
    match value.unwrap_or("confirmed") {
        "processed" => CommitmentConfig::processed(),
        "finalized" => CommitmentConfig::finalized(),
        _ => CommitmentConfig::confirmed(),
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn parse_pubkey(value: &str) -> Result<Pubkey> {
    Pubkey::from_str(value).map_err(|_| anyhow!("Invalid pubkey: {}", value))
}

pub fn parse_pubkeys(values: &[String]) -> Result<Vec<Pubkey>> {
    values.iter().map(|value| parse_pubkey(value)).collect()
}

/// Parses a human amount such as `1_000.25` into base units.
pub fn parse_amount(value: &str, decimals: u8) -> Result<u64> {
    let sanitized = value.replace('_', "");
    if let Some((whole, fractional)) = sanitized.split_once('.') {
        let whole_value: u64 = if whole.is_empty() { 0 } else { whole.parse()? };
        if fractional.len() > decimals as usize {
            return Err(anyhow!("Too many decimal places"));
        }
        let fraction = format!("{:0<width$}", fractional, width = decimals as usize);
        let fractional_value: u64 = if fraction.is_empty() {
            0
        } else {
            fraction.parse()?
        };
        let scale = 10u64
            .checked_pow(decimals as u32)
            .ok_or_else(|| anyhow!("Decimal overflow"))?;
        whole_value
            .checked_mul(scale)
            .and_then(|value| value.checked_add(fractional_value))
            .ok_or_else(|| anyhow!("Amount overflow"))
    } else {
        let whole: u64 = sanitized
            .parse()
            .with_context(|| format!("Invalid amount: {}", value))?;
        let scale = 10u64
            .checked_pow(decimals as u32)
            .ok_or_else(|| anyhow!("Decimal overflow"))?;
        whole
            .checked_mul(scale)
            .ok_or_else(|| anyhow!("Amount overflow"))
    }
}

/// Initial supply for a new ledger. A ledger must start with tokens.
pub fn parse_initial_supply(value: Option<&str>, decimals: u8) -> Result<u64> {
    let value = value.ok_or_else(|| {
        anyhow!("Initial supply is required (--initial-supply or token.initial_supply)")
    })?;
    let supply = parse_amount(value, decimals)?;
    if supply == 0 {
        return Err(anyhow!("Initial supply must be greater than zero"));
    }
    Ok(supply)
}

pub fn format_amount(amount: u64, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }
    let scale = 10u64.pow(decimals as u32);
    let whole = amount / scale;
    let frac = amount % scale;
    format!("{}.{:0width$}", whole, frac, width = decimals as usize)
}

pub fn explorer_url(signature: &str, cluster: &ClusterInfo) -> Option<String> {
    cluster.label.as_ref().map(|label| {
        format!(
            "https://explorer.solana.com/tx/{}?cluster={}",
            signature, label
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_amounts_with_decimals() {
        assert_eq!(parse_amount("1", 6).unwrap(), 1_000_000);
        assert_eq!(parse_amount("1.5", 6).unwrap(), 1_500_000);
        assert_eq!(parse_amount("0.000001", 6).unwrap(), 1);
        assert_eq!(parse_amount("1_000.25", 2).unwrap(), 100_025);
        assert_eq!(parse_amount("42", 0).unwrap(), 42);
    }

    #[test]
    fn rejects_bad_amounts() {
        assert!(parse_amount("0.0000001", 6).is_err());
        assert!(parse_amount("abc", 6).is_err());
        assert!(parse_amount("18446744073709551615", 1).is_err());
    }

    #[test]
    fn initial_supply_must_be_present_and_positive() {
        assert_eq!(parse_initial_supply(Some("1_000"), 2).unwrap(), 100_000);
        assert!(parse_initial_supply(None, 9).is_err());
        assert!(parse_initial_supply(Some("0"), 9).is_err());
        assert!(parse_initial_supply(Some("0.000"), 3).is_err());
    }

    #[test]
    fn formats_amounts() {
        assert_eq!(format_amount(1_500_000, 6), "1.500000");
        assert_eq!(format_amount(100, 2), "1.00");
        assert_eq!(format_amount(10, 0), "10");
    }

    #[test]
    fn parses_token_config() {
        let config = parse_token_config(
            r#"
lp_pairs = ["11111111111111111111111111111111"]

[token]
name = "Taxable"
symbol = "TAX"
decimals = 9
initial_supply = "1_000_000"

[taxes]
buy = 5
sell = 10
transfer = 15

[network]
cluster = "localnet"
"#,
        )
        .unwrap();

        assert_eq!(config.token.symbol, "TAX");
        assert_eq!(config.token.decimals, Some(9));
        assert_eq!(config.lp_pairs.len(), 1);
        assert!(config.exempt.is_empty());
        let rates = config.taxes.unwrap().to_rates().unwrap();
        assert_eq!(rates, TaxRates::new(5, 10, 15));
        let cluster = config.network.unwrap().cluster.unwrap();
        assert_eq!(resolve_cluster(&cluster).unwrap().url, "http://127.0.0.1:8899");
    }

    #[test]
    fn rejects_rates_above_one_hundred() {
        let taxes = TaxConfig {
            buy: 0,
            sell: 101,
            transfer: 0,
        };
        assert!(taxes.to_rates().is_err());
    }

    #[test]
    fn resolves_named_and_custom_clusters() {
        let devnet = resolve_cluster("devnet").unwrap();
        assert_eq!(devnet.label.as_deref(), Some("devnet"));
        let custom = resolve_cluster("https://rpc.mainnet.example.com").unwrap();
        assert_eq!(custom.label.as_deref(), Some("mainnet-beta"));
        assert!(resolve_cluster("moonnet").is_err());
        assert!(explorer_url("sig", &resolve_cluster("localnet").unwrap()).is_none());
    }
}
