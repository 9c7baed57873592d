//! Live pool state: decoded pool account, market accounts, decimals and vault reserves

use solana_sdk::pubkey::Pubkey;
use tracing::{info, warn};

use super::rpc_client::LedgerClient;
use crate::exchanges::common::pda::{amm_authority, check_stored_nonce};
use crate::exchanges::common::token_utils::{is_native_mint, mint_decimals, to_ui_amount};
use crate::exchanges::raydium_v4::{decode_pool, market_accounts_or_fallback, PoolAccount, RaydiumPool};
use crate::exchanges::types::NATIVE_DECIMALS;
use crate::shared::errors::SwapError;

/// Reads everything a quote needs from the ledger
pub struct VaultReader<'a> {
    ledger: &'a dyn LedgerClient,
}

impl<'a> VaultReader<'a> {
    pub fn new(ledger: &'a dyn LedgerClient) -> Self {
        Self { ledger }
    }

    /// Mint decimals; the native mint is answered without a fetch
    pub async fn get_token_decimals(&self, mint: &Pubkey) -> Result<u8, SwapError> {
        if is_native_mint(mint) {
            return Ok(NATIVE_DECIMALS);
        }

        let data = self
            .ledger
            .get_account_data(mint)
            .await?
            .ok_or_else(|| SwapError::NetworkError(format!("mint account {} not found", mint)))?;
        mint_decimals(&data)
    }

    /// Overwrite the pool reserves with the current vault balances
    pub async fn fetch_vault_balances(&self, pool: &mut RaydiumPool) -> Result<(), SwapError> {
        pool.base_reserve = self.ledger.get_token_account_balance(&pool.base_vault).await?;
        pool.quote_reserve = self.ledger.get_token_account_balance(&pool.quote_vault).await?;
        Ok(())
    }

    pub async fn fetch_decimals(&self, pool: &mut RaydiumPool) -> Result<(), SwapError> {
        pool.base_decimals = self.get_token_decimals(&pool.base_mint).await?;
        pool.quote_decimals = self.get_token_decimals(&pool.quote_mint).await?;
        Ok(())
    }

    /// Market enrichment. Never fails: network errors degrade to the fallback accounts.
    pub async fn fetch_market_accounts(&self, account: &PoolAccount, pool: &mut RaydiumPool) {
        let market_data = if account.market == Pubkey::default() {
            None
        } else {
            match self.ledger.get_account_data(&account.market).await {
                Ok(data) => data,
                Err(e) => {
                    warn!("⚠️ Failed to fetch market {}: {}", account.market, e);
                    None
                }
            }
        };
        pool.market_accounts = market_accounts_or_fallback(account, market_data.as_deref());
    }

    /// Pool without decimals or reserves: decoded account plus derived authority
    pub fn resolve_pool(address: Pubkey, account: &PoolAccount) -> Result<RaydiumPool, SwapError> {
        let authority = amm_authority()?;
        check_stored_nonce("AMM authority", &authority, account.nonce as u64);
        Ok(RaydiumPool::from_account(address, account, authority.address))
    }

    /// Fetch, decode and fully resolve a pool
    pub async fn load_pool(&self, address: &Pubkey) -> Result<RaydiumPool, SwapError> {
        let data = self
            .ledger
            .get_account_data(address)
            .await?
            .ok_or_else(|| SwapError::PoolNotFoundError(format!("pool account {} does not exist", address)))?;

        let account = decode_pool(&data)?;
        let mut pool = Self::resolve_pool(*address, &account)?;
        self.fetch_market_accounts(&account, &mut pool).await;
        self.fetch_decimals(&mut pool).await?;
        self.fetch_vault_balances(&mut pool).await?;

        info!(
            "📊 Pool {} ({:?} layout): base {} = {:.6}, quote {} = {:.6}",
            pool.address,
            pool.layout,
            pool.base_mint,
            to_ui_amount(pool.base_reserve, pool.base_decimals),
            pool.quote_mint,
            to_ui_amount(pool.quote_reserve, pool.quote_decimals)
        );

        Ok(pool)
    }
}
