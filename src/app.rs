// src/app.rs
use anyhow::{Context, Result};
use solana_sdk::{
    commitment_config::CommitmentConfig,
    signature::{read_keypair_file, Keypair, Signer},
};
use std::io::{self, BufRead, Write};
use tracing::info;

use crate::config::Config;
use crate::exchanges::common::token_utils::to_ui_amount;
use crate::exchanges::compute_budget::ComputeBudget;
use crate::exchanges::raydium_v4::RaydiumPool;
use crate::exchanges::transaction_builder::{resolve_token_accounts, TransactionBuilder};
use crate::exchanges::types::{PoolTarget, QuoteParams, SwapQuote, PROTOCOL};
use crate::infrastructure::blockchain::{
    ConfirmationPolicy, LedgerClient, PoolDiscoveryService, SolanaRpcClient, TransactionExecutor, VaultReader,
};
use crate::math::{calculate_min_amount_out, calculate_quote, human_reserves, parse_slippage, validate_slippage};
use crate::report::{generate_report, print_report};

pub const PRIVATE_KEY_ENV: &str = "SOLANA_PRIVATE_KEY";
pub const DEFAULT_SLIPPAGE_PCT: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct AppCfg {
    pub rpc_url: String,
    pub commitment: CommitmentConfig,
    pub params: QuoteParams,
    pub execute: bool,
    pub keypair_path: Option<String>,
    /// Prompted for when absent
    pub slippage_pct: Option<f64>,
    pub assume_yes: bool,
    pub json: bool,
    pub confirmation: ConfirmationPolicy,
    pub compute_budget: ComputeBudget,
}

impl AppCfg {
    pub fn from_config(cfg: &Config, params: QuoteParams, execute: bool) -> Result<Self> {
        Ok(Self {
            rpc_url: cfg.rpc.url.clone(),
            commitment: cfg.commitment()?,
            params,
            execute,
            keypair_path: None,
            slippage_pct: cfg.trade.slippage_pct,
            assume_yes: false,
            json: false,
            confirmation: cfg.confirmation_policy(),
            compute_budget: cfg.compute_budget(),
        })
    }
}

pub fn keypair_from_base58(secret: &str) -> Result<Keypair> {
    let bytes = bs58::decode(secret.trim())
        .into_vec()
        .context("private key is not valid base58")?;
    Keypair::from_bytes(&bytes).map_err(|e| anyhow::anyhow!("invalid private key: {}", e))
}

/// Keypair file when given, otherwise a base58 secret from the environment
pub fn load_wallet(keypair_path: Option<&str>) -> Result<Keypair> {
    match keypair_path {
        Some(path) => read_keypair_file(path).map_err(|e| anyhow::anyhow!("Failed to load keypair {}: {}", path, e)),
        None => {
            let secret = std::env::var(PRIVATE_KEY_ENV)
                .with_context(|| format!("{} is not set and no --keypair was given", PRIVATE_KEY_ENV))?;
            keypair_from_base58(&secret)
        }
    }
}

/// "y"/"yes" confirms, anything else declines
pub fn read_confirmation<R: BufRead>(input: &mut R) -> Result<bool> {
    let mut line = String::new();
    input.read_line(&mut line).context("read confirmation")?;
    let answer = line.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// Empty input takes the default tolerance
pub fn read_slippage<R: BufRead>(input: &mut R) -> Result<f64> {
    let mut line = String::new();
    input.read_line(&mut line).context("read slippage")?;
    if line.trim().is_empty() {
        return Ok(DEFAULT_SLIPPAGE_PCT);
    }
    Ok(parse_slippage(&line)?)
}

fn prompt(message: &str) -> Result<()> {
    print!("{}", message);
    io::stdout().flush().context("flush stdout")
}

fn print_quote(pool: &RaydiumPool, quote: &SwapQuote) {
    let (base, quote_reserve) = human_reserves(pool);
    println!("\n=== QUOTE ===");
    println!("Protocol: {}", PROTOCOL);
    println!("Pool: {}", pool.address);
    println!("Reserves: {:.6} base / {:.6} quote", base, quote_reserve);
    println!("Side: {}", quote.side);
    println!("Amount In: {:.9} {}", quote.amount_in, quote.side.input_label());
    println!("Expected Out: {:.9} {}", quote.amount_out, quote.side.output_label());
    println!("=============");
}

async fn resolve_pool(ledger: &dyn LedgerClient, target: &PoolTarget) -> Result<RaydiumPool> {
    let pool = match target {
        PoolTarget::Pool(address) => VaultReader::new(ledger).load_pool(address).await?,
        PoolTarget::Token(mint) => PoolDiscoveryService::new(ledger).discover_pool(mint).await?,
    };
    Ok(pool)
}

pub async fn run(app_cfg: AppCfg) -> Result<()> {
    info!("Starting swap client against {}", app_cfg.rpc_url);
    let ledger = SolanaRpcClient::new(app_cfg.rpc_url.clone(), app_cfg.commitment);

    let pool = resolve_pool(&ledger, &app_cfg.params.target)
        .await
        .context("resolve pool")?;
    let quote = calculate_quote(&pool, app_cfg.params.side, app_cfg.params.amount)?;
    print_quote(&pool, &quote);

    if !app_cfg.execute {
        println!("\nQuote only. Re-run with --execute to perform the swap.");
        return Ok(());
    }

    let wallet = load_wallet(app_cfg.keypair_path.as_deref())?;
    info!("Loaded wallet: {}", wallet.pubkey());

    let stdin = io::stdin();
    if !app_cfg.assume_yes {
        prompt("\nProceed with this swap? (y/n): ")?;
        if !read_confirmation(&mut stdin.lock())? {
            println!("Swap cancelled.");
            return Ok(());
        }
    }

    let slippage_pct = match app_cfg.slippage_pct {
        Some(slippage) => validate_slippage(slippage)?,
        None => {
            prompt(&format!("Slippage tolerance in % [{}]: ", DEFAULT_SLIPPAGE_PCT))?;
            read_slippage(&mut stdin.lock())?
        }
    };
    let min_amount_out = calculate_min_amount_out(quote.amount_out, slippage_pct, quote.output_decimals);

    println!("\n=== SWAP PARAMETERS ===");
    println!("Slippage: {}%", slippage_pct);
    println!("Expected Out: {:.9} {}", quote.amount_out, quote.side.output_label());
    println!(
        "Minimum Out: {:.9} {}",
        to_ui_amount(min_amount_out, quote.output_decimals),
        quote.side.output_label()
    );

    let presence = resolve_token_accounts(&ledger, &wallet.pubkey(), &quote)
        .await
        .context("check token accounts")?;
    let instructions = TransactionBuilder.build_swap_instructions(&pool, &quote, &wallet.pubkey(), presence, min_amount_out)?;

    let executor = TransactionExecutor::new(&ledger, app_cfg.confirmation, app_cfg.compute_budget);
    let outcome = executor
        .execute(&instructions, &wallet)
        .await
        .context("submit swap transaction")?;
    if !outcome.confirmed {
        println!("Transaction {} was sent but not confirmed yet.", outcome.signature);
    }

    let report = generate_report(&ledger, &wallet.pubkey(), &outcome, &quote).await;
    if app_cfg.json {
        println!("{}", report.to_json()?);
    } else {
        print_report(&report);
    }

    Ok(())
}
