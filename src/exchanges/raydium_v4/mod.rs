pub mod instruction;
pub mod parser;
pub mod types;

pub use instruction::{build_swap_instruction, resolve_market_vault_signer, SwapInstructionPayload};
pub use parser::{decode_market, decode_pool, market_accounts_or_fallback, LayoutVersion, PoolAccount, PoolLayout};
pub use types::{MarketAccounts, RaydiumPool};
