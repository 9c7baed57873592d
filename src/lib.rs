//! rayswap - Raydium AMM V4 swap client
//! Pool decoding, on-chain quotes and swap execution straight from the ledger

pub mod app;
pub mod config;
pub mod exchanges;
pub mod infrastructure;
pub mod math;
pub mod report;
pub mod shared;

pub use exchanges::raydium_v4::RaydiumPool;
pub use exchanges::types::{QuoteParams, Side, SwapQuote};
pub use infrastructure::blockchain::{LedgerClient, SolanaRpcClient};
pub use shared::errors::SwapError;
