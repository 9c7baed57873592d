use anyhow::{Context, Result};
use clap::Parser;
use solana_sdk::pubkey::Pubkey;
use tracing_subscriber::EnvFilter;

use rayswap::app::{self, AppCfg};
use rayswap::config::Config;
use rayswap::exchanges::types::{QuoteParams, Side};

#[derive(Parser, Debug)]
#[command(version, about = "Raydium AMM V4 swap client: on-chain quotes and swap execution")]
struct Args {
    /// Pool address (takes precedence over --token)
    #[arg(long)]
    pool: Option<String>,

    /// Token mint; the deepest SOL-paired pool is discovered on-chain
    #[arg(long)]
    token: Option<String>,

    /// Amount to swap (SOL for buy, tokens for sell)
    #[arg(long)]
    amount: f64,

    /// buy or sell
    #[arg(long)]
    side: Side,

    /// Execute the swap instead of only quoting
    #[arg(long)]
    execute: bool,

    /// RPC endpoint URL (overrides config)
    #[arg(long)]
    rpc_url: Option<String>,

    /// Path to config file (optional)
    #[arg(long)]
    config: Option<String>,

    /// Path to keypair file; falls back to SOLANA_PRIVATE_KEY (base58)
    #[arg(long)]
    keypair: Option<String>,

    /// Slippage tolerance in percent; prompted for when absent
    #[arg(long)]
    slippage: Option<f64>,

    /// Skip the confirmation prompt
    #[arg(long)]
    yes: bool,

    /// Priority fee in microlamports per compute unit
    #[arg(long)]
    priority_fee: Option<u64>,

    /// Print the transaction report as JSON
    #[arg(long)]
    json: bool,
}

fn parse_pubkey(label: &str, value: Option<&String>) -> Result<Option<Pubkey>> {
    value
        .map(|s| s.trim().parse::<Pubkey>().with_context(|| format!("invalid {} address: {}", label, s)))
        .transpose()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    // Priority: CLI args > config file > defaults
    let cfg = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let pool = parse_pubkey("pool", args.pool.as_ref())?;
    let token = parse_pubkey("token", args.token.as_ref())?;
    let params = QuoteParams::new(pool, token, args.side, args.amount)?;

    let mut app_cfg = AppCfg::from_config(&cfg, params, args.execute)?;
    if let Some(rpc_url) = args.rpc_url {
        app_cfg.rpc_url = rpc_url;
    }
    if let Some(slippage) = args.slippage {
        app_cfg.slippage_pct = Some(slippage);
    }
    if let Some(priority_fee) = args.priority_fee {
        app_cfg.compute_budget.unit_price_microlamports = Some(priority_fee);
    }
    app_cfg.keypair_path = args.keypair;
    app_cfg.assume_yes = args.yes;
    app_cfg.json = args.json;

    app::run(app_cfg).await
}
