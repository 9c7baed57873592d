//! Pool discovery by asset mint using direct program-account scans

use solana_sdk::pubkey::Pubkey;
use tracing::{debug, info, warn};

use super::rpc_client::LedgerClient;
use super::vault_reader::VaultReader;
use crate::exchanges::common::token_utils::{is_native_mint, to_ui_amount};
use crate::exchanges::raydium_v4::{decode_pool, PoolAccount, RaydiumPool};
use crate::exchanges::types::{NATIVE_DECIMALS, POOL_ACCOUNT_LEN, RAYDIUM_AMM_V4};
use crate::shared::errors::SwapError;

pub struct PoolDiscoveryService<'a> {
    ledger: &'a dyn LedgerClient,
}

impl<'a> PoolDiscoveryService<'a> {
    pub fn new(ledger: &'a dyn LedgerClient) -> Self {
        Self { ledger }
    }

    /// Most liquid native-paired pool holding `mint`, ranked by native-side reserve
    pub async fn discover_pool(&self, mint: &Pubkey) -> Result<RaydiumPool, SwapError> {
        info!("🔍 Searching for Raydium V4 pools with token {}", mint);

        let accounts = self
            .ledger
            .get_program_accounts_sized(&RAYDIUM_AMM_V4, POOL_ACCOUNT_LEN as u64)
            .await?;
        info!("✅ Found {} pool accounts, filtering...", accounts.len());

        let reader = VaultReader::new(self.ledger);
        let mut best: Option<(RaydiumPool, PoolAccount)> = None;

        for (address, data) in accounts {
            let account = match decode_pool(&data) {
                Ok(account) => account,
                Err(e) => {
                    debug!("Skipping {}: {}", address, e);
                    continue;
                }
            };

            let pairs_with_native = is_native_mint(&account.base_mint) || is_native_mint(&account.quote_mint);
            let holds_mint = account.base_mint == *mint || account.quote_mint == *mint;
            if !pairs_with_native || !holds_mint {
                continue;
            }

            let mut pool = match VaultReader::resolve_pool(address, &account) {
                Ok(pool) => pool,
                Err(e) => {
                    warn!("⚠️ Skipping pool {}: {}", address, e);
                    continue;
                }
            };
            if let Err(e) = reader.fetch_decimals(&mut pool).await {
                warn!("⚠️ Skipping pool {}: failed to read decimals: {}", address, e);
                continue;
            }
            if let Err(e) = reader.fetch_vault_balances(&mut pool).await {
                warn!("⚠️ Skipping pool {}: failed to read vault balances: {}", address, e);
                continue;
            }

            let liquidity = pool.native_reserve().unwrap_or(0);
            info!(
                "   Candidate {}: {:.4} SOL liquidity",
                address,
                to_ui_amount(liquidity, NATIVE_DECIMALS)
            );

            let better = best
                .as_ref()
                .map_or(true, |(current, _)| liquidity > current.native_reserve().unwrap_or(0));
            if better {
                best = Some((pool, account));
            }
        }

        let (mut pool, account) = best.ok_or_else(|| {
            SwapError::PoolNotFoundError(format!("no Raydium V4 pool pairs {} with SOL", mint))
        })?;

        // market accounts only for the winner
        reader.fetch_market_accounts(&account, &mut pool).await;

        info!("🎯 Selected pool {}", pool.address);
        Ok(pool)
    }
}
