//! Direct blockchain access for pool state and swap execution

#[cfg(test)]
pub mod mock_ledger;
pub mod pool_discovery;
pub mod rpc_client;
pub mod transaction_executor;
pub mod vault_reader;

pub use pool_discovery::PoolDiscoveryService;
pub use rpc_client::{LedgerClient, SolanaRpcClient, TokenBalanceSnapshot, TransactionMeta};
pub use transaction_executor::{ConfirmationPolicy, SubmissionOutcome, TransactionExecutor};
pub use vault_reader::VaultReader;
