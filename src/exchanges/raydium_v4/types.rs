use serde::{Deserialize, Serialize};
use solana_sdk::{pubkey::Pubkey, system_program};

use crate::exchanges::common::token_utils::is_native_mint;
use crate::exchanges::types::SwapDirection;

use super::parser::{LayoutVersion, PoolAccount};

/// Order-book accounts the swap instruction passes through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketAccounts {
    pub bids: Pubkey,
    pub asks: Pubkey,
    pub event_queue: Pubkey,
    pub base_vault: Pubkey,
    pub quote_vault: Pubkey,
    pub vault_signer_nonce: u64,
}

impl MarketAccounts {
    /// Stand-in for pools without a usable market: the pool's own vaults,
    /// system program placeholders for everything else.
    pub fn fallback(pool_base_vault: Pubkey, pool_quote_vault: Pubkey) -> Self {
        Self {
            bids: system_program::id(),
            asks: system_program::id(),
            event_queue: system_program::id(),
            base_vault: pool_base_vault,
            quote_vault: pool_quote_vault,
            vault_signer_nonce: 0,
        }
    }
}

/// Fully resolved Raydium V4 pool, rebuilt on every invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaydiumPool {
    pub address: Pubkey,
    pub layout: LayoutVersion,
    /// Authority nonce stored in the pool account
    pub nonce: u8,
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
    pub base_vault: Pubkey,
    pub quote_vault: Pubkey,
    pub authority: Pubkey,
    pub open_orders: Pubkey,
    pub target_orders: Pubkey,
    pub market_program: Pubkey,
    pub market: Pubkey,
    pub market_accounts: MarketAccounts,
    pub base_decimals: u8,
    pub quote_decimals: u8,
    /// Raw vault balances, only ever set from a live balance fetch
    pub base_reserve: u64,
    pub quote_reserve: u64,
}

impl RaydiumPool {
    pub fn from_account(address: Pubkey, account: &PoolAccount, authority: Pubkey) -> Self {
        Self {
            address,
            layout: account.layout,
            nonce: account.nonce,
            base_mint: account.base_mint,
            quote_mint: account.quote_mint,
            base_vault: account.base_vault,
            quote_vault: account.quote_vault,
            authority,
            open_orders: account.open_orders,
            target_orders: account.target_orders,
            market_program: account.market_program,
            market: account.market,
            market_accounts: MarketAccounts::fallback(account.base_vault, account.quote_vault),
            base_decimals: 0,
            quote_decimals: 0,
            base_reserve: 0,
            quote_reserve: 0,
        }
    }

    pub fn is_base_native(&self) -> bool {
        is_native_mint(&self.base_mint)
    }

    pub fn is_quote_native(&self) -> bool {
        is_native_mint(&self.quote_mint)
    }

    pub fn contains_mint(&self, mint: &Pubkey) -> bool {
        self.base_mint == *mint || self.quote_mint == *mint
    }

    /// Native-side reserve, used as the liquidity measure when ranking pools
    pub fn native_reserve(&self) -> Option<u64> {
        if self.is_base_native() {
            Some(self.base_reserve)
        } else if self.is_quote_native() {
            Some(self.quote_reserve)
        } else {
            None
        }
    }

    pub fn has_market(&self) -> bool {
        self.market != Pubkey::default()
    }

    /// (reserve_in, reserve_out) for a direction
    pub fn reserves_for(&self, direction: SwapDirection) -> (u64, u64) {
        match direction {
            SwapDirection::BaseToQuote => (self.base_reserve, self.quote_reserve),
            SwapDirection::QuoteToBase => (self.quote_reserve, self.base_reserve),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchanges::common::token_utils::WSOL_MINT;

    fn pool_account() -> PoolAccount {
        PoolAccount {
            layout: LayoutVersion::Documented,
            nonce: 254,
            base_vault: Pubkey::new_unique(),
            quote_vault: Pubkey::new_unique(),
            base_mint: WSOL_MINT,
            quote_mint: Pubkey::new_unique(),
            open_orders: Pubkey::new_unique(),
            target_orders: Pubkey::new_unique(),
            market: Pubkey::default(),
            market_program: Pubkey::default(),
        }
    }

    #[test]
    fn test_from_account_starts_with_fallback_market() {
        let account = pool_account();
        let pool = RaydiumPool::from_account(Pubkey::new_unique(), &account, Pubkey::new_unique());
        assert_eq!(pool.market_accounts.base_vault, account.base_vault);
        assert_eq!(pool.market_accounts.bids, system_program::id());
        assert_eq!(pool.base_reserve, 0);
        assert!(!pool.has_market());
    }

    #[test]
    fn test_native_reserve_and_direction() {
        let mut pool = RaydiumPool::from_account(Pubkey::new_unique(), &pool_account(), Pubkey::new_unique());
        pool.base_reserve = 10;
        pool.quote_reserve = 20;
        assert_eq!(pool.native_reserve(), Some(10));
        assert_eq!(pool.reserves_for(SwapDirection::BaseToQuote), (10, 20));
        assert_eq!(pool.reserves_for(SwapDirection::QuoteToBase), (20, 10));
    }
}
