use anyhow::{Context, Result};
use clap::Parser;
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};

use rayswap::exchanges::raydium_v4::parser::{decode_pool, POOL_LAYOUTS};
use rayswap::infrastructure::blockchain::rpc_client::DEFAULT_RPC_URL;
use rayswap::{LedgerClient, SolanaRpcClient};

/// Dump a Raydium V4 pool account and every layout's reading of it
#[derive(Parser, Debug)]
struct Args {
    /// Pool address
    pool: String,

    #[arg(long, default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = SolanaRpcClient::new(args.rpc_url, CommitmentConfig::confirmed());

    let address: Pubkey = args.pool.trim().parse().context("invalid pool address")?;
    println!("🔍 Analyzing Raydium V4 pool: {}", address);

    let data = client
        .get_account_data(&address)
        .await?
        .ok_or_else(|| anyhow::anyhow!("account {} not found", address))?;
    println!("📊 Account data size: {} bytes", data.len());

    println!("\n🔍 Raw data:");
    for (i, chunk) in data.chunks(32).enumerate() {
        println!("  {:3}: {}", i * 32, hex::encode(chunk));
    }

    for layout in POOL_LAYOUTS.iter() {
        println!("\n📐 {:?} layout", layout.version);
        match layout.extract(&data) {
            Ok(account) => {
                println!("  nonce:          {}", account.nonce);
                println!("  base vault:     {}", account.base_vault);
                println!("  quote vault:    {}", account.quote_vault);
                println!("  base mint:      {}", account.base_mint);
                println!("  quote mint:     {}", account.quote_mint);
                println!("  open orders:    {}", account.open_orders);
                println!("  target orders:  {}", account.target_orders);
                println!("  market:         {}", account.market);
                println!("  market program: {}", account.market_program);
                let issues = account.implausibilities();
                if issues.is_empty() {
                    println!("  ✅ plausible");
                } else {
                    println!("  ❌ {}", issues.join(", "));
                }
            }
            Err(e) => println!("  ❌ {}", e),
        }
    }

    match decode_pool(&data) {
        Ok(account) => println!("\n🎯 Decodes with {:?} layout", account.layout),
        Err(e) => println!("\n❌ {}", e),
    }

    Ok(())
}
