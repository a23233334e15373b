mod config;
mod instructions;
mod output;

use anchor_lang::{AccountDeserialize, Discriminator};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use solana_client::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{read_keypair_file, Keypair, Signer};
use solana_sdk::transaction::Transaction;
use taxed_token::state::{BalanceAccount, PolicyFlags, TokenLedger, WalletPolicy};
use taxed_token::tax::{self, TaxQuote};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{
    expand_tilde, explorer_url, format_amount, load_solana_cli_config, load_token_config,
    parse_amount, parse_commitment, parse_initial_supply, parse_pubkey, parse_pubkeys,
    resolve_cluster, ClusterInfo, NetworkConfig, SolanaCliConfig, TaxConfig, TokenFileConfig,
};
use crate::instructions::{
    build_add_to_blacklist_instruction, build_initialize_instruction, build_mint_instruction,
    build_pause_instruction, build_policy_instruction, build_seize_instruction,
    build_set_taxes_instruction, build_transfer_instruction,
    build_transfer_ownership_instruction, build_unpause_instruction, find_balance_pda,
    find_policy_pda, AddToBlacklistParams, InitializeParams, MintParams, PolicyUpdate,
    SeizeParams, SetTaxesParams, TransferOwnershipParams, TransferParams,
};
use crate::output::{
    print_json, BalanceOutput, BlacklistStatusOutput, HolderInfo, HoldersOutput, InitOutput,
    MintOutput, QuoteOutput, SimpleOutput, StatusOutput, SupplyOutput, TaxesOutput,
    TransferOutput,
};

/// Policy instructions are batched so each transaction stays under the size limit.
const POLICY_BATCH_SIZE: usize = 4;

#[derive(Parser)]
#[command(name = "taxed-token", version, about = "Taxed token ledger CLI")]
struct Cli {
    #[arg(long)]
    cluster: Option<String>,

    #[arg(long)]
    keypair: Option<String>,

    #[arg(long, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Log filter, e.g. `debug` or `taxed_token_cli=trace`. Falls back to RUST_LOG.
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a ledger and credit the initial supply to the signer
    Init(InitArgs),
    Mint(AmountArgs),
    Transfer(AmountArgs),
    Pause(LedgerArgs),
    Unpause(LedgerArgs),
    Blacklist(BlacklistArgs),
    Taxes(TaxesArgs),
    LpPairs(WalletListArgs),
    Exempt(WalletListArgs),
    /// Move a blacklisted wallet's balance to the owner
    Seize(AddressArgs),
    TransferOwnership(AddressArgs),
    Status(LedgerArgs),
    Supply(LedgerArgs),
    Balance(AddressArgs),
    Holders(HoldersArgs),
    /// Preview the tax on a transfer without touching the network
    Quote(QuoteArgs),
}

#[derive(Parser)]
struct InitArgs {
    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    symbol: Option<String>,

    #[arg(long, default_value_t = 9)]
    decimals: u8,

    #[arg(long)]
    initial_supply: Option<String>,
}

#[derive(Parser)]
struct AmountArgs {
    recipient: String,
    amount: String,

    #[arg(long)]
    ledger: Option<String>,
}

#[derive(Parser)]
struct LedgerArgs {
    #[arg(long)]
    ledger: Option<String>,
}

#[derive(Parser)]
struct AddressArgs {
    address: String,

    #[arg(long)]
    ledger: Option<String>,
}

#[derive(Parser)]
struct BlacklistArgs {
    #[command(subcommand)]
    command: BlacklistCmd,
}

#[derive(Subcommand)]
enum BlacklistCmd {
    Add(BlacklistAddArgs),
    Remove(AddressArgs),
    Check(AddressArgs),
}

#[derive(Parser)]
struct BlacklistAddArgs {
    address: String,

    #[arg(long, default_value = "")]
    reason: String,

    #[arg(long)]
    ledger: Option<String>,
}

#[derive(Parser)]
struct TaxesArgs {
    #[command(subcommand)]
    command: TaxesCmd,
}

#[derive(Subcommand)]
enum TaxesCmd {
    Set(SetTaxesCmdArgs),
    Show(LedgerArgs),
}

#[derive(Parser)]
struct SetTaxesCmdArgs {
    #[arg(long)]
    buy: u8,

    #[arg(long)]
    sell: u8,

    #[arg(long)]
    transfer: u8,

    #[arg(long)]
    ledger: Option<String>,
}

#[derive(Parser)]
struct WalletListArgs {
    #[command(subcommand)]
    command: WalletListCmd,
}

#[derive(Subcommand)]
enum WalletListCmd {
    Add(AddressArgs),
    Remove(AddressArgs),
}

#[derive(Parser)]
struct HoldersArgs {
    #[arg(long)]
    min_balance: Option<String>,

    #[arg(long)]
    ledger: Option<String>,
}

#[derive(Parser)]
struct QuoteArgs {
    amount: String,

    /// Token config supplying rates, decimals and the LP/exempt lists
    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    buy: Option<u8>,

    #[arg(long)]
    sell: Option<u8>,

    #[arg(long)]
    transfer: Option<u8>,

    #[arg(long)]
    decimals: Option<u8>,

    #[arg(long)]
    from: Option<String>,

    #[arg(long)]
    to: Option<String>,

    #[arg(long)]
    sender_lp: bool,

    #[arg(long)]
    recipient_lp: bool,

    #[arg(long)]
    sender_exempt: bool,

    #[arg(long)]
    recipient_exempt: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());
    run(cli)
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => tracing_subscriber::EnvFilter::new(level),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into()),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let solana_config = load_solana_cli_config()
        .map_err(|err| debug!("Solana CLI config unavailable: {:#}", err))
        .ok();

    let context = || build_context(&cli, solana_config.as_ref(), None);

    match &cli.command {
        Commands::Init(args) => {
            let config_file = args
                .config
                .as_ref()
                .map(|path| load_token_config(path))
                .transpose()?;
            let network_override = config_file.as_ref().and_then(|cfg| cfg.network.as_ref());
            let ctx = build_context(&cli, solana_config.as_ref(), network_override)?;
            handle_init(&ctx, args, config_file.as_ref())
        }
        Commands::Mint(args) => handle_mint(&context()?, args),
        Commands::Transfer(args) => handle_transfer(&context()?, args),
        Commands::Pause(args) => handle_pause(&context()?, args, true),
        Commands::Unpause(args) => handle_pause(&context()?, args, false),
        Commands::Blacklist(args) => handle_blacklist(&context()?, &args.command),
        Commands::Taxes(args) => handle_taxes(&context()?, &args.command),
        Commands::LpPairs(args) => handle_lp_pairs(&context()?, &args.command),
        Commands::Exempt(args) => handle_exempt(&context()?, &args.command),
        Commands::Seize(args) => handle_seize(&context()?, args),
        Commands::TransferOwnership(args) => handle_transfer_ownership(&context()?, args),
        Commands::Status(args) => handle_status(&context()?, args),
        Commands::Supply(args) => handle_supply(&context()?, args),
        Commands::Balance(args) => handle_balance(&context()?, args),
        Commands::Holders(args) => handle_holders(&context()?, args),
        Commands::Quote(args) => handle_quote(cli.output, args),
    }
}

#[derive(Clone, Copy)]
struct AppContext<'a> {
    client: &'a RpcClient,
    payer: &'a Keypair,
    output: OutputFormat,
    cluster: &'a ClusterInfo,
    commitment: CommitmentConfig,
}

struct OwnedContext {
    client: RpcClient,
    payer: Keypair,
    output: OutputFormat,
    cluster: ClusterInfo,
    commitment: CommitmentConfig,
}

impl OwnedContext {
    fn as_ref(&self) -> AppContext<'_> {
        AppContext {
            client: &self.client,
            payer: &self.payer,
            output: self.output,
            cluster: &self.cluster,
            commitment: self.commitment,
        }
    }
}

fn build_context(
    cli: &Cli,
    solana_config: Option<&SolanaCliConfig>,
    network_override: Option<&NetworkConfig>,
) -> Result<OwnedContext> {
    let cluster_value = cli
        .cluster
        .clone()
        .or_else(|| network_override.and_then(|cfg| cfg.cluster.clone()))
        .or_else(|| solana_config.map(|cfg| cfg.json_rpc_url.clone()))
        .unwrap_or_else(|| "devnet".to_string());
    let cluster = resolve_cluster(&cluster_value)?;

    let keypair_value = cli
        .keypair
        .clone()
        .or_else(|| network_override.and_then(|cfg| cfg.keypair_path.clone()))
        .or_else(|| solana_config.map(|cfg| cfg.keypair_path.clone()))
        .ok_or_else(|| anyhow!("Missing keypair path. Use --keypair or Solana CLI config."))?;

    let commitment_value = network_override
        .and_then(|cfg| cfg.commitment.clone())
        .or_else(|| solana_config.and_then(|cfg| cfg.commitment.clone()));
    let commitment = parse_commitment(commitment_value.as_deref());

    let keypair_path = expand_tilde(&keypair_value);
    let payer = read_keypair_file(&keypair_path)
        .map_err(|err| anyhow!("Failed to read keypair: {}", err))?;

    debug!(url = %cluster.url, payer = %payer.pubkey(), "using cluster");
    let client = RpcClient::new_with_commitment(cluster.url.clone(), commitment);

    Ok(OwnedContext {
        client,
        payer,
        output: cli.output,
        cluster,
        commitment,
    })
}

fn handle_init(
    ctx: &OwnedContext,
    args: &InitArgs,
    config: Option<&TokenFileConfig>,
) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let (name, symbol, decimals, supply) = match config {
        Some(config) => (
            config.token.name.clone(),
            config.token.symbol.clone(),
            config.token.decimals.unwrap_or(args.decimals),
            config.token.initial_supply.clone(),
        ),
        None => (
            args.name
                .clone()
                .ok_or_else(|| anyhow!("--name is required without --config"))?,
            args.symbol
                .clone()
                .ok_or_else(|| anyhow!("--symbol is required without --config"))?,
            args.decimals,
            args.initial_supply.clone(),
        ),
    };
    let initial_supply = parse_initial_supply(supply.as_deref(), decimals)?;

    let ledger_keypair = Keypair::new();
    let ledger = ledger_keypair.pubkey();
    let owner = ctx_ref.payer.pubkey();
    let initialize_ix = build_initialize_instruction(InitializeParams {
        owner,
        ledger,
        name,
        symbol,
        decimals,
        initial_supply,
    })?;
    let signature = send_transaction(ctx_ref, vec![initialize_ix], vec![&ledger_keypair])?;

    if let Some(config) = config {
        let follow_ups = config_instructions(owner, ledger, config)?;
        for batch in follow_ups.chunks(POLICY_BATCH_SIZE) {
            send_transaction(ctx_ref, batch.to_vec(), vec![])?;
        }
    }

    let explorer = explorer_url(&signature, ctx_ref.cluster);
    if ctx_ref.output == OutputFormat::Json {
        print_json(&InitOutput {
            ledger: ledger.to_string(),
            owner: owner.to_string(),
            initial_supply,
            signature,
            explorer,
        })
    } else {
        println!("Ledger initialized");
        println!("Ledger:   {}", ledger);
        println!("Owner:    {}", owner);
        println!("Supply:   {}", format_amount(initial_supply, decimals));
        println!("Tx:       {}", signature);
        if let Some(url) = explorer {
            println!("Explorer: {}", url);
        }
        Ok(())
    }
}

/// Instructions that apply the `taxes`, `lp_pairs` and `exempt` sections of a config.
fn config_instructions(
    owner: Pubkey,
    ledger: Pubkey,
    config: &TokenFileConfig,
) -> Result<Vec<Instruction>> {
    let mut instructions = Vec::new();
    if let Some(taxes) = config.taxes {
        let rates = taxes.to_rates()?;
        if rates != Default::default() {
            instructions.push(build_set_taxes_instruction(SetTaxesParams {
                owner,
                ledger,
                buy: rates.buy,
                sell: rates.sell,
                transfer: rates.transfer,
            })?);
        }
    }
    for wallet in parse_pubkeys(&config.lp_pairs)? {
        instructions.push(build_policy_instruction(
            PolicyUpdate::AddTaxedLpPair,
            owner,
            ledger,
            wallet,
        )?);
    }
    for wallet in parse_pubkeys(&config.exempt)? {
        instructions.push(build_policy_instruction(
            PolicyUpdate::AddExemptFromTaxes,
            owner,
            ledger,
            wallet,
        )?);
    }
    Ok(instructions)
}

fn handle_mint(ctx: &OwnedContext, args: &AmountArgs) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let ledger = resolve_ledger(&args.ledger)?;
    let state = fetch_ledger(ctx_ref, &ledger)?;
    let amount = parse_amount(&args.amount, state.decimals)?;
    let recipient = parse_pubkey(&args.recipient)?;
    let mint_ix = build_mint_instruction(MintParams {
        owner: ctx_ref.payer.pubkey(),
        ledger,
        recipient,
        amount,
    })?;
    let signature = send_transaction(ctx_ref, vec![mint_ix], vec![])?;
    let new_supply = fetch_ledger(ctx_ref, &ledger)?.total_supply;
    let explorer = explorer_url(&signature, ctx_ref.cluster);
    if ctx_ref.output == OutputFormat::Json {
        print_json(&MintOutput {
            signature,
            explorer,
            new_supply,
        })
    } else {
        println!(
            "Minted {} {} to {}",
            format_amount(amount, state.decimals),
            state.symbol,
            recipient
        );
        println!("New supply: {}", format_amount(new_supply, state.decimals));
        println!("Tx: {}", signature);
        if let Some(url) = explorer {
            println!("Explorer: {}", url);
        }
        Ok(())
    }
}

fn handle_transfer(ctx: &OwnedContext, args: &AmountArgs) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let ledger = resolve_ledger(&args.ledger)?;
    let state = fetch_ledger(ctx_ref, &ledger)?;
    let amount = parse_amount(&args.amount, state.decimals)?;
    let sender = ctx_ref.payer.pubkey();
    let recipient = parse_pubkey(&args.recipient)?;

    let sender_flags = fetch_policy_flags(ctx_ref, &ledger, &sender)?;
    let recipient_flags = fetch_policy_flags(ctx_ref, &ledger, &recipient)?;
    let quote = tax::quote(&state.taxes, sender_flags, recipient_flags, amount)
        .map_err(|err| anyhow!("Failed to quote transfer: {}", err))?;
    debug!(kind = quote.kind.as_str(), tax = quote.tax, "transfer quote");

    let transfer_ix = build_transfer_instruction(TransferParams {
        sender,
        ledger,
        ledger_owner: state.owner,
        recipient,
        amount,
    })?;
    let signature = send_transaction(ctx_ref, vec![transfer_ix], vec![])?;
    let explorer = explorer_url(&signature, ctx_ref.cluster);
    if ctx_ref.output == OutputFormat::Json {
        print_json(&TransferOutput {
            signature,
            explorer,
            quote: quote_output(&quote),
        })
    } else {
        println!(
            "Transferred {} {} to {}",
            format_amount(amount, state.decimals),
            state.symbol,
            recipient
        );
        print_quote(&quote, state.decimals);
        println!("Tx: {}", signature);
        if let Some(url) = explorer {
            println!("Explorer: {}", url);
        }
        Ok(())
    }
}

fn handle_pause(ctx: &OwnedContext, args: &LedgerArgs, pause: bool) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let ledger = resolve_ledger(&args.ledger)?;
    let owner = ctx_ref.payer.pubkey();
    let ix = if pause {
        build_pause_instruction(owner, ledger)
    } else {
        build_unpause_instruction(owner, ledger)
    };
    let signature = send_transaction(ctx_ref, vec![ix], vec![])?;
    let message = if pause {
        format!("Paused: {}", ledger)
    } else {
        format!("Unpaused: {}", ledger)
    };
    print_submitted(ctx_ref, signature, &message)
}

fn handle_blacklist(ctx: &OwnedContext, cmd: &BlacklistCmd) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    match cmd {
        BlacklistCmd::Add(args) => {
            let ledger = resolve_ledger(&args.ledger)?;
            let wallet = parse_pubkey(&args.address)?;
            let add_ix = build_add_to_blacklist_instruction(AddToBlacklistParams {
                owner: ctx_ref.payer.pubkey(),
                ledger,
                wallet,
                reason: args.reason.clone(),
            })?;
            let signature = send_transaction(ctx_ref, vec![add_ix], vec![])?;
            print_submitted(ctx_ref, signature, &format!("Blacklisted: {}", wallet))
        }
        BlacklistCmd::Remove(args) => {
            let wallet = parse_pubkey(&args.address)?;
            let signature = send_policy_update(
                ctx_ref,
                PolicyUpdate::RemoveFromBlacklist,
                &args.ledger,
                wallet,
            )?;
            print_submitted(
                ctx_ref,
                signature,
                &format!("Removed from blacklist: {}", wallet),
            )
        }
        BlacklistCmd::Check(args) => {
            let ledger = resolve_ledger(&args.ledger)?;
            let wallet = parse_pubkey(&args.address)?;
            let policy = fetch_policy(ctx_ref, &ledger, &wallet)?;
            let reason = policy
                .as_ref()
                .filter(|policy| policy.is_blacklisted)
                .map(|policy| policy.blacklist_reason.clone());
            if ctx_ref.output == OutputFormat::Json {
                print_json(&BlacklistStatusOutput {
                    wallet: wallet.to_string(),
                    is_blacklisted: reason.is_some(),
                    reason,
                })
            } else {
                match reason {
                    Some(reason) => {
                        println!("Blacklisted: {}", wallet);
                        if !reason.is_empty() {
                            println!("Reason: {}", reason);
                        }
                    }
                    None => println!("Not blacklisted: {}", wallet),
                }
                Ok(())
            }
        }
    }
}

fn handle_taxes(ctx: &OwnedContext, cmd: &TaxesCmd) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    match cmd {
        TaxesCmd::Set(args) => {
            let ledger = resolve_ledger(&args.ledger)?;
            let rates = TaxConfig {
                buy: args.buy,
                sell: args.sell,
                transfer: args.transfer,
            }
            .to_rates()?;
            let ix = build_set_taxes_instruction(SetTaxesParams {
                owner: ctx_ref.payer.pubkey(),
                ledger,
                buy: rates.buy,
                sell: rates.sell,
                transfer: rates.transfer,
            })?;
            let signature = send_transaction(ctx_ref, vec![ix], vec![])?;
            print_submitted(
                ctx_ref,
                signature,
                &format!(
                    "Taxes set: buy {}% sell {}% transfer {}%",
                    rates.buy, rates.sell, rates.transfer
                ),
            )
        }
        TaxesCmd::Show(args) => {
            let ledger = resolve_ledger(&args.ledger)?;
            let taxes = fetch_ledger(ctx_ref, &ledger)?.taxes;
            if ctx_ref.output == OutputFormat::Json {
                print_json(&TaxesOutput {
                    buy: taxes.buy,
                    sell: taxes.sell,
                    transfer: taxes.transfer,
                })
            } else {
                println!("Buy:      {}%", taxes.buy);
                println!("Sell:     {}%", taxes.sell);
                println!("Transfer: {}%", taxes.transfer);
                Ok(())
            }
        }
    }
}

fn handle_lp_pairs(ctx: &OwnedContext, cmd: &WalletListCmd) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let (update, args, label) = match cmd {
        WalletListCmd::Add(args) => (PolicyUpdate::AddTaxedLpPair, args, "Taxed LP pair added"),
        WalletListCmd::Remove(args) => (
            PolicyUpdate::RemoveTaxedLpPair,
            args,
            "Taxed LP pair removed",
        ),
    };
    let wallet = parse_pubkey(&args.address)?;
    let signature = send_policy_update(ctx_ref, update, &args.ledger, wallet)?;
    print_submitted(ctx_ref, signature, &format!("{}: {}", label, wallet))
}

fn handle_exempt(ctx: &OwnedContext, cmd: &WalletListCmd) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let (update, args, label) = match cmd {
        WalletListCmd::Add(args) => (
            PolicyUpdate::AddExemptFromTaxes,
            args,
            "Tax exemption added",
        ),
        WalletListCmd::Remove(args) => (
            PolicyUpdate::RemoveExemptFromTaxes,
            args,
            "Tax exemption removed",
        ),
    };
    let wallet = parse_pubkey(&args.address)?;
    let signature = send_policy_update(ctx_ref, update, &args.ledger, wallet)?;
    print_submitted(ctx_ref, signature, &format!("{}: {}", label, wallet))
}

fn handle_seize(ctx: &OwnedContext, args: &AddressArgs) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let ledger = resolve_ledger(&args.ledger)?;
    let wallet = parse_pubkey(&args.address)?;
    let state = fetch_ledger(ctx_ref, &ledger)?;
    let balance = fetch_balance(ctx_ref, &ledger, &wallet)?;
    let seize_ix = build_seize_instruction(SeizeParams {
        owner: ctx_ref.payer.pubkey(),
        ledger,
        wallet,
    });
    let signature = send_transaction(ctx_ref, vec![seize_ix], vec![])?;
    print_submitted(
        ctx_ref,
        signature,
        &format!(
            "Seized {} {} from {}",
            format_amount(balance, state.decimals),
            state.symbol,
            wallet
        ),
    )
}

fn handle_transfer_ownership(ctx: &OwnedContext, args: &AddressArgs) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let ledger = resolve_ledger(&args.ledger)?;
    let new_owner = parse_pubkey(&args.address)?;
    let ix = build_transfer_ownership_instruction(TransferOwnershipParams {
        owner: ctx_ref.payer.pubkey(),
        ledger,
        new_owner,
    });
    let signature = send_transaction(ctx_ref, vec![ix], vec![])?;
    print_submitted(ctx_ref, signature, &format!("Owner is now {}", new_owner))
}

fn handle_status(ctx: &OwnedContext, args: &LedgerArgs) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let ledger = resolve_ledger(&args.ledger)?;
    let state = fetch_ledger(ctx_ref, &ledger)?;
    let policies = list_ledger_accounts::<WalletPolicy>(ctx_ref, &ledger)?;
    let collect = |select: fn(&WalletPolicy) -> bool| -> Vec<String> {
        policies
            .iter()
            .filter(|(_, policy)| select(policy))
            .map(|(_, policy)| policy.wallet.to_string())
            .collect()
    };
    let blacklisted = collect(|policy| policy.is_blacklisted);
    let lp_pairs = collect(|policy| policy.is_taxed_lp_pair);
    let exempt = collect(|policy| policy.is_tax_exempt);

    if ctx_ref.output == OutputFormat::Json {
        print_json(&StatusOutput {
            ledger: ledger.to_string(),
            name: state.name,
            symbol: state.symbol,
            decimals: state.decimals,
            owner: state.owner.to_string(),
            is_paused: state.is_paused,
            total_supply: state.total_supply,
            taxes: TaxesOutput {
                buy: state.taxes.buy,
                sell: state.taxes.sell,
                transfer: state.taxes.transfer,
            },
            audit_counter: state.audit_counter,
            blacklisted,
            lp_pairs,
            exempt,
        })
    } else {
        println!("Ledger status");
        println!("Ledger: {}", ledger);
        println!("Token: {} ({})", state.name, state.symbol);
        println!("Decimals: {}", state.decimals);
        println!("Owner: {}", state.owner);
        println!(
            "Status: {}",
            if state.is_paused { "Paused" } else { "Active" }
        );
        println!(
            "Supply: {}",
            format_amount(state.total_supply, state.decimals)
        );
        println!(
            "Taxes: buy {}% sell {}% transfer {}%",
            state.taxes.buy, state.taxes.sell, state.taxes.transfer
        );
        println!("Admin actions: {}", state.audit_counter);
        print_wallet_list("Blacklisted", &blacklisted);
        print_wallet_list("Taxed LP pairs", &lp_pairs);
        print_wallet_list("Tax exempt", &exempt);
        Ok(())
    }
}

fn handle_supply(ctx: &OwnedContext, args: &LedgerArgs) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let ledger = resolve_ledger(&args.ledger)?;
    let state = fetch_ledger(ctx_ref, &ledger)?;
    if ctx_ref.output == OutputFormat::Json {
        print_json(&SupplyOutput {
            ledger: ledger.to_string(),
            supply: state.total_supply,
        })
    } else {
        println!(
            "Supply: {}",
            format_amount(state.total_supply, state.decimals)
        );
        Ok(())
    }
}

fn handle_balance(ctx: &OwnedContext, args: &AddressArgs) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let ledger = resolve_ledger(&args.ledger)?;
    let holder = parse_pubkey(&args.address)?;
    let state = fetch_ledger(ctx_ref, &ledger)?;
    let amount = fetch_balance(ctx_ref, &ledger, &holder)?;
    if ctx_ref.output == OutputFormat::Json {
        print_json(&BalanceOutput {
            holder: holder.to_string(),
            amount,
        })
    } else {
        println!(
            "{} {}",
            format_amount(amount, state.decimals),
            state.symbol
        );
        Ok(())
    }
}

fn handle_holders(ctx: &OwnedContext, args: &HoldersArgs) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let ledger = resolve_ledger(&args.ledger)?;
    let state = fetch_ledger(ctx_ref, &ledger)?;
    let min_balance = match args.min_balance.as_deref() {
        Some(value) => parse_amount(value, state.decimals)?,
        None => 1,
    };

    let mut holders: Vec<HolderInfo> = list_ledger_accounts::<BalanceAccount>(ctx_ref, &ledger)?
        .into_iter()
        .filter(|(_, balance)| balance.amount >= min_balance)
        .map(|(address, balance)| HolderInfo {
            holder: balance.holder.to_string(),
            balance_account: address.to_string(),
            amount: balance.amount,
        })
        .collect();
    holders.sort_by(|a, b| b.amount.cmp(&a.amount));

    if ctx_ref.output == OutputFormat::Json {
        print_json(&HoldersOutput { holders })
    } else {
        if holders.is_empty() {
            println!("No holders found");
        } else {
            for holder in holders {
                println!(
                    "{} {}",
                    holder.holder,
                    format_amount(holder.amount, state.decimals)
                );
            }
        }
        Ok(())
    }
}

fn handle_quote(output: OutputFormat, args: &QuoteArgs) -> Result<()> {
    let config = args
        .config
        .as_ref()
        .map(|path| load_token_config(path))
        .transpose()?;
    let (quote, decimals) = offline_quote(args, config.as_ref())?;
    if output == OutputFormat::Json {
        print_json(&quote_output(&quote))
    } else {
        print_quote(&quote, decimals);
        Ok(())
    }
}

/// Runs the program's own tax classification against locally supplied rates and lists.
fn offline_quote(args: &QuoteArgs, config: Option<&TokenFileConfig>) -> Result<(TaxQuote, u8)> {
    let base = config.and_then(|cfg| cfg.taxes).unwrap_or_default();
    let rates = TaxConfig {
        buy: args.buy.unwrap_or(base.buy),
        sell: args.sell.unwrap_or(base.sell),
        transfer: args.transfer.unwrap_or(base.transfer),
    }
    .to_rates()?;
    let decimals = args
        .decimals
        .or_else(|| config.and_then(|cfg| cfg.token.decimals))
        .unwrap_or(0);
    let amount = parse_amount(&args.amount, decimals)?;

    let (lp_pairs, exempt) = match config {
        Some(cfg) => (parse_pubkeys(&cfg.lp_pairs)?, parse_pubkeys(&cfg.exempt)?),
        None => (Vec::new(), Vec::new()),
    };
    let listed_flags = |address: Option<&String>| -> Result<PolicyFlags> {
        let Some(address) = address else {
            return Ok(PolicyFlags::default());
        };
        let key = parse_pubkey(address)?;
        Ok(PolicyFlags {
            blacklisted: false,
            lp_pair: lp_pairs.contains(&key),
            tax_exempt: exempt.contains(&key),
        })
    };

    let mut sender = listed_flags(args.from.as_ref())?;
    sender.lp_pair |= args.sender_lp;
    sender.tax_exempt |= args.sender_exempt;
    let mut recipient = listed_flags(args.to.as_ref())?;
    recipient.lp_pair |= args.recipient_lp;
    recipient.tax_exempt |= args.recipient_exempt;

    let quote = tax::quote(&rates, sender, recipient, amount)
        .map_err(|err| anyhow!("Failed to quote transfer: {}", err))?;
    Ok((quote, decimals))
}

fn quote_output(quote: &TaxQuote) -> QuoteOutput {
    QuoteOutput {
        kind: quote.kind.as_str().to_string(),
        rate: quote.rate,
        amount: quote.amount,
        tax: quote.tax,
        net_amount: quote.net_amount,
    }
}

fn print_quote(quote: &TaxQuote, decimals: u8) {
    println!("Kind:     {}", quote.kind.as_str());
    println!("Rate:     {}%", quote.rate);
    println!("Amount:   {}", format_amount(quote.amount, decimals));
    println!("Tax:      {}", format_amount(quote.tax, decimals));
    println!("Received: {}", format_amount(quote.net_amount, decimals));
}

fn print_wallet_list(label: &str, wallets: &[String]) {
    println!("{}: {}", label, wallets.len());
    for wallet in wallets {
        println!("  {}", wallet);
    }
}

fn print_submitted(ctx: AppContext<'_>, signature: String, message: &str) -> Result<()> {
    let explorer = explorer_url(&signature, ctx.cluster);
    if ctx.output == OutputFormat::Json {
        print_json(&SimpleOutput {
            signature,
            explorer,
        })
    } else {
        println!("{}", message);
        println!("Tx: {}", signature);
        if let Some(url) = explorer {
            println!("Explorer: {}", url);
        }
        Ok(())
    }
}

fn resolve_ledger(ledger: &Option<String>) -> Result<Pubkey> {
    let value = ledger.as_deref().ok_or_else(|| anyhow!("Missing --ledger"))?;
    parse_pubkey(value)
}

fn send_policy_update(
    ctx: AppContext<'_>,
    update: PolicyUpdate,
    ledger: &Option<String>,
    wallet: Pubkey,
) -> Result<String> {
    let ledger = resolve_ledger(ledger)?;
    let ix = build_policy_instruction(update, ctx.payer.pubkey(), ledger, wallet)?;
    send_transaction(ctx, vec![ix], vec![])
}

fn send_transaction(
    ctx: AppContext<'_>,
    instructions: Vec<Instruction>,
    extra_signers: Vec<&Keypair>,
) -> Result<String> {
    let blockhash = ctx
        .client
        .get_latest_blockhash()
        .context("Failed to fetch latest blockhash")?;
    let mut transaction = Transaction::new_with_payer(&instructions, Some(&ctx.payer.pubkey()));
    let mut signers: Vec<&dyn Signer> = vec![ctx.payer];
    for signer in extra_signers {
        if signer.pubkey() != ctx.payer.pubkey() {
            signers.push(signer);
        }
    }
    transaction.sign(&signers, blockhash);
    let signature = ctx
        .client
        .send_and_confirm_transaction(&transaction)
        .context("Transaction failed")?;
    info!(%signature, instructions = instructions.len(), "transaction confirmed");
    Ok(signature.to_string())
}

fn fetch_ledger(ctx: AppContext<'_>, ledger: &Pubkey) -> Result<TokenLedger> {
    debug!(%ledger, "fetching ledger");
    let account = ctx
        .client
        .get_account(ledger)
        .with_context(|| format!("Ledger not found: {}", ledger))?;
    if account.owner != taxed_token::ID {
        return Err(anyhow!("{} is not owned by the taxed token program", ledger));
    }
    let mut data = account.data.as_slice();
    TokenLedger::try_deserialize(&mut data).context("Failed to decode ledger")
}

fn fetch_optional<T: AccountDeserialize>(ctx: AppContext<'_>, address: &Pubkey) -> Result<Option<T>> {
    debug!(%address, "fetching account");
    let response = ctx
        .client
        .get_account_with_commitment(address, ctx.commitment)
        .with_context(|| format!("Failed to fetch account: {}", address))?;
    let Some(account) = response.value else {
        return Ok(None);
    };
    let mut data = account.data.as_slice();
    let decoded = T::try_deserialize(&mut data)
        .with_context(|| format!("Failed to decode account: {}", address))?;
    Ok(Some(decoded))
}

fn fetch_balance(ctx: AppContext<'_>, ledger: &Pubkey, holder: &Pubkey) -> Result<u64> {
    let balance_pda = find_balance_pda(ledger, holder).0;
    Ok(fetch_optional::<BalanceAccount>(ctx, &balance_pda)?
        .map(|balance| balance.amount)
        .unwrap_or(0))
}

fn fetch_policy(ctx: AppContext<'_>, ledger: &Pubkey, wallet: &Pubkey) -> Result<Option<WalletPolicy>> {
    fetch_optional(ctx, &find_policy_pda(ledger, wallet).0)
}

fn fetch_policy_flags(ctx: AppContext<'_>, ledger: &Pubkey, wallet: &Pubkey) -> Result<PolicyFlags> {
    Ok(fetch_policy(ctx, ledger, wallet)?
        .map(|policy| policy.flags())
        .unwrap_or_default())
}

/// Program accounts of type `T` whose `ledger` field (right after the
/// discriminator) matches.
fn list_ledger_accounts<T: AccountDeserialize + Discriminator>(
    ctx: AppContext<'_>,
    ledger: &Pubkey,
) -> Result<Vec<(Pubkey, T)>> {
    let mut config = RpcProgramAccountsConfig::default();
    config.filters = Some(vec![
        RpcFilterType::Memcmp(Memcmp::new_base58_encoded(0, &T::DISCRIMINATOR)),
        RpcFilterType::Memcmp(Memcmp::new_base58_encoded(8, ledger.as_ref())),
    ]);
    config.account_config = RpcAccountInfoConfig {
        encoding: None,
        commitment: Some(ctx.commitment),
        data_slice: None,
        min_context_slot: None,
    };

    let accounts = ctx
        .client
        .get_program_accounts_with_config(&taxed_token::ID, config)
        .context("Failed to list program accounts")?;
    debug!(count = accounts.len(), "listed program accounts");

    let mut result = Vec::new();
    for (address, account) in accounts {
        let mut data = account.data.as_slice();
        if let Ok(decoded) = T::try_deserialize(&mut data) {
            result.push((address, decoded));
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_token_config;
    use taxed_token::tax::TransferKind;

    const LP: &str = "So11111111111111111111111111111111111111112";
    const EXEMPT: &str = "SysvarRent111111111111111111111111111111111";
    const WALLET: &str = "SysvarC1ock11111111111111111111111111111111";

    fn quote_args(amount: &str) -> QuoteArgs {
        QuoteArgs {
            amount: amount.to_string(),
            config: None,
            buy: None,
            sell: None,
            transfer: None,
            decimals: None,
            from: None,
            to: None,
            sender_lp: false,
            recipient_lp: false,
            sender_exempt: false,
            recipient_exempt: false,
        }
    }

    fn sample_config() -> TokenFileConfig {
        parse_token_config(&format!(
            r#"
lp_pairs = ["{LP}"]
exempt = ["{EXEMPT}"]

[token]
name = "Taxable"
symbol = "TAX"
decimals = 2

[taxes]
buy = 5
sell = 10
transfer = 15
"#
        ))
        .unwrap()
    }

    #[test]
    fn quote_classifies_from_config_lists() {
        let config = sample_config();

        let mut args = quote_args("10");
        args.from = Some(LP.to_string());
        args.to = Some(WALLET.to_string());
        let (quote, decimals) = offline_quote(&args, Some(&config)).unwrap();
        assert_eq!(decimals, 2);
        assert_eq!(quote.kind, TransferKind::Buy);
        assert_eq!(quote.amount, 1_000);
        assert_eq!(quote.tax, 50);

        let mut args = quote_args("10");
        args.from = Some(EXEMPT.to_string());
        args.to = Some(LP.to_string());
        let (quote, _) = offline_quote(&args, Some(&config)).unwrap();
        assert_eq!(quote.kind, TransferKind::Exempt);
        assert_eq!(quote.tax, 0);
    }

    #[test]
    fn quote_flags_and_rate_overrides() {
        let mut args = quote_args("199");
        args.transfer = Some(10);
        let (quote, _) = offline_quote(&args, None).unwrap();
        assert_eq!(quote.kind, TransferKind::Plain);
        assert_eq!(quote.tax, 10);
        assert_eq!(quote.net_amount, 189);

        let mut args = quote_args("1000");
        args.sell = Some(10);
        args.recipient_lp = true;
        let (quote, _) = offline_quote(&args, None).unwrap();
        assert_eq!(quote.kind, TransferKind::Sell);
        assert_eq!(quote.net_amount, 900);

        let mut args = quote_args("1000");
        args.buy = Some(101);
        assert!(offline_quote(&args, None).is_err());
    }

    #[test]
    fn config_instructions_cover_taxes_and_lists() {
        let config = sample_config();
        let owner = Pubkey::new_unique();
        let ledger = Pubkey::new_unique();
        let instructions = config_instructions(owner, ledger, &config).unwrap();
        assert_eq!(instructions.len(), 3);
        assert!(instructions
            .iter()
            .all(|ix| ix.program_id == taxed_token::ID));
    }

    #[test]
    fn cli_parses_nested_commands() {
        let cli = Cli::try_parse_from([
            "taxed-token",
            "--output",
            "json",
            "lp-pairs",
            "add",
            LP,
            "--ledger",
            WALLET,
        ])
        .unwrap();
        assert!(cli.output == OutputFormat::Json);
        match cli.command {
            Commands::LpPairs(WalletListArgs {
                command: WalletListCmd::Add(args),
            }) => {
                assert_eq!(args.address, LP);
                assert_eq!(args.ledger.as_deref(), Some(WALLET));
            }
            _ => panic!("unexpected command"),
        }
    }
}
