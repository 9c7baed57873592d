//! Raydium V4 pool and order-book market account decoding
//!
//! Pool accounts have been read with more than one offset table over the
//! protocol's lifetime. Instead of guessing, every known table is listed in
//! [`POOL_LAYOUTS`] and tried in order; the first extraction that passes the
//! plausibility checks wins. Reserves are never read from the blob, they come
//! from the vault balances.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, info, warn};

use crate::exchanges::types::{KNOWN_ORDER_BOOK_PROGRAMS, MARKET_ACCOUNT_LEN, POOL_ACCOUNT_LEN};
use crate::shared::errors::SwapError;

use super::types::MarketAccounts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutVersion {
    /// Offsets the client has always used (open orders at 464, market at 656)
    Documented,
    /// Published `AmmInfo` struct offsets
    V4,
}

/// Byte offsets of every field the client reads from a pool account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolLayout {
    pub version: LayoutVersion,
    pub nonce: usize,
    pub base_vault: usize,
    pub quote_vault: usize,
    pub base_mint: usize,
    pub quote_mint: usize,
    pub open_orders: usize,
    pub target_orders: usize,
    pub market: usize,
    pub market_program: usize,
}

pub const DOCUMENTED_LAYOUT: PoolLayout = PoolLayout {
    version: LayoutVersion::Documented,
    nonce: 8,
    base_vault: 336,
    quote_vault: 368,
    base_mint: 400,
    quote_mint: 432,
    open_orders: 464,
    target_orders: 592,
    market: 656,
    market_program: 688,
};

pub const V4_LAYOUT: PoolLayout = PoolLayout {
    version: LayoutVersion::V4,
    nonce: 8,
    base_vault: 336,
    quote_vault: 368,
    base_mint: 400,
    quote_mint: 432,
    open_orders: 496,
    target_orders: 592,
    market: 528,
    market_program: 560,
};

pub const POOL_LAYOUTS: [PoolLayout; 2] = [DOCUMENTED_LAYOUT, V4_LAYOUT];

/// Identifiers extracted from a pool account by one layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolAccount {
    pub layout: LayoutVersion,
    pub nonce: u8,
    pub base_vault: Pubkey,
    pub quote_vault: Pubkey,
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
    pub open_orders: Pubkey,
    pub target_orders: Pubkey,
    pub market: Pubkey,
    pub market_program: Pubkey,
}

fn read_pubkey(data: &[u8], offset: usize) -> Result<Pubkey, SwapError> {
    data.get(offset..offset + 32)
        .and_then(|bytes| <[u8; 32]>::try_from(bytes).ok())
        .map(Pubkey::new_from_array)
        .ok_or_else(|| SwapError::DecodeError(format!("pubkey at offset {} out of bounds", offset)))
}

fn read_u64(data: &[u8], offset: usize) -> Result<u64, SwapError> {
    data.get(offset..offset + 8)
        .and_then(|bytes| <[u8; 8]>::try_from(bytes).ok())
        .map(u64::from_le_bytes)
        .ok_or_else(|| SwapError::DecodeError(format!("u64 at offset {} out of bounds", offset)))
}

impl PoolLayout {
    /// Verbatim extraction, no plausibility checks
    pub fn extract(&self, data: &[u8]) -> Result<PoolAccount, SwapError> {
        if data.len() < POOL_ACCOUNT_LEN {
            return Err(SwapError::DecodeError(format!(
                "invalid pool data size: {} (need at least {})",
                data.len(),
                POOL_ACCOUNT_LEN
            )));
        }

        Ok(PoolAccount {
            layout: self.version,
            nonce: data[self.nonce],
            base_vault: read_pubkey(data, self.base_vault)?,
            quote_vault: read_pubkey(data, self.quote_vault)?,
            base_mint: read_pubkey(data, self.base_mint)?,
            quote_mint: read_pubkey(data, self.quote_mint)?,
            open_orders: read_pubkey(data, self.open_orders)?,
            target_orders: read_pubkey(data, self.target_orders)?,
            market: read_pubkey(data, self.market)?,
            market_program: read_pubkey(data, self.market_program)?,
        })
    }
}

impl PoolAccount {
    /// Reasons this extraction does not look like a real pool; empty when plausible
    pub fn implausibilities(&self) -> Vec<String> {
        let zero = Pubkey::default();
        let mut issues = Vec::new();

        for (name, key) in [
            ("base vault", self.base_vault),
            ("quote vault", self.quote_vault),
            ("base mint", self.base_mint),
            ("quote mint", self.quote_mint),
            ("open orders", self.open_orders),
            ("target orders", self.target_orders),
        ] {
            if key == zero {
                issues.push(format!("{} is zero", name));
            }
        }
        if self.base_vault == self.quote_vault {
            issues.push("base and quote vault are identical".to_string());
        }
        if self.base_mint == self.quote_mint {
            issues.push("base and quote mint are identical".to_string());
        }
        if self.market_program != zero && !KNOWN_ORDER_BOOK_PROGRAMS.contains(&self.market_program) {
            issues.push(format!("market program {} is not a known order book", self.market_program));
        }

        issues
    }

    pub fn is_plausible(&self) -> bool {
        self.implausibilities().is_empty()
    }
}

/// Decode a pool account with the first plausible layout
pub fn decode_pool(data: &[u8]) -> Result<PoolAccount, SwapError> {
    if data.len() < POOL_ACCOUNT_LEN {
        return Err(SwapError::DecodeError(format!(
            "invalid pool data size: {}",
            data.len()
        )));
    }

    let mut rejections = Vec::new();
    for layout in POOL_LAYOUTS.iter() {
        let account = layout.extract(data)?;
        let issues = account.implausibilities();
        if issues.is_empty() {
            debug!("Decoded pool account with {:?} layout", layout.version);
            return Ok(account);
        }
        debug!("{:?} layout rejected: {}", layout.version, issues.join(", "));
        rejections.push(format!("{:?}: {}", layout.version, issues.join(", ")));
    }

    Err(SwapError::DecodeError(format!(
        "no pool layout matched ({})",
        rejections.join("; ")
    )))
}

/// Order-book market offsets (5-byte "serum" header padding included)
pub mod market_offsets {
    pub const VAULT_SIGNER_NONCE: usize = 45;
    pub const BASE_VAULT: usize = 117;
    pub const QUOTE_VAULT: usize = 165;
    pub const EVENT_QUEUE: usize = 253;
    pub const BIDS: usize = 285;
    pub const ASKS: usize = 317;
}

pub fn decode_market(data: &[u8]) -> Result<MarketAccounts, SwapError> {
    if data.len() < MARKET_ACCOUNT_LEN {
        return Err(SwapError::DecodeError(format!(
            "invalid market data size: {} (need at least {})",
            data.len(),
            MARKET_ACCOUNT_LEN
        )));
    }

    Ok(MarketAccounts {
        bids: read_pubkey(data, market_offsets::BIDS)?,
        asks: read_pubkey(data, market_offsets::ASKS)?,
        event_queue: read_pubkey(data, market_offsets::EVENT_QUEUE)?,
        base_vault: read_pubkey(data, market_offsets::BASE_VAULT)?,
        quote_vault: read_pubkey(data, market_offsets::QUOTE_VAULT)?,
        vault_signer_nonce: read_u64(data, market_offsets::VAULT_SIGNER_NONCE)?,
    })
}

/// Market accounts for a pool, substituting the pool's own vaults when the
/// market is zero, missing, or too short to decode.
pub fn market_accounts_or_fallback(pool: &PoolAccount, market_data: Option<&[u8]>) -> MarketAccounts {
    let fallback = MarketAccounts::fallback(pool.base_vault, pool.quote_vault);

    if pool.market == Pubkey::default() {
        info!("Pool has no external market, using pool vaults as market vaults");
        return fallback;
    }

    match market_data.map(decode_market) {
        Some(Ok(accounts)) => accounts,
        Some(Err(e)) => {
            warn!("⚠️ Market {} not decodable ({}), using fallback accounts", pool.market, e);
            fallback
        }
        None => {
            warn!("⚠️ Market {} data unavailable, using fallback accounts", pool.market);
            fallback
        }
    }
}
