//! Ledger access: the `LedgerClient` seam and its Solana RPC implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use solana_account_decoder::UiAccountEncoding;
use solana_client::{
    client_error::ClientError,
    nonblocking::rpc_client::RpcClient,
    rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig, RpcSendTransactionConfig, RpcTransactionConfig},
    rpc_filter::RpcFilterType,
};
use solana_sdk::{
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::{Transaction, TransactionError},
};
use solana_transaction_status::{TransactionConfirmationStatus, UiTransactionEncoding, UiTransactionTokenBalance};

use crate::shared::errors::SwapError;

pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// One wallet-visible token balance from transaction metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalanceSnapshot {
    pub account_index: u8,
    pub mint: String,
    pub owner: Option<String>,
    /// Raw amount in base units
    pub amount: u64,
    pub decimals: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionMeta {
    /// On-chain execution error, if any
    pub err: Option<String>,
    /// Network fee in lamports, paid by the first account
    pub fee: u64,
    /// Lamports per account index
    pub pre_balances: Vec<u64>,
    pub post_balances: Vec<u64>,
    pub pre_token_balances: Vec<TokenBalanceSnapshot>,
    pub post_token_balances: Vec<TokenBalanceSnapshot>,
}

/// Everything the swap flow needs from the ledger
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Raw account bytes; `None` when the account does not exist
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, SwapError>;

    /// Raw balance of an SPL token account
    async fn get_token_account_balance(&self, address: &Pubkey) -> Result<u64, SwapError>;

    /// All accounts owned by `program_id` whose data is exactly `data_len` bytes
    async fn get_program_accounts_sized(
        &self,
        program_id: &Pubkey,
        data_len: u64,
    ) -> Result<Vec<(Pubkey, Vec<u8>)>, SwapError>;

    async fn get_latest_blockhash(&self) -> Result<Hash, SwapError>;

    async fn send_transaction(&self, transaction: &Transaction, skip_preflight: bool) -> Result<Signature, SwapError>;

    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<TransactionConfirmationStatus>, SwapError>;

    async fn get_transaction_meta(&self, signature: &Signature) -> Result<TransactionMeta, SwapError>;
}

/// Map a send failure onto the error taxonomy. Signature verification
/// failures get their own variant since they trigger the preflight retry.
pub fn classify_send_error(transaction_error: Option<TransactionError>, message: &str) -> SwapError {
    let signature_failure = matches!(transaction_error, Some(TransactionError::SignatureFailure))
        || message.to_lowercase().contains("signature verification failure");
    if signature_failure {
        SwapError::PreflightSignatureFailure(message.to_string())
    } else {
        SwapError::NetworkError(format!("failed to send transaction: {}", message))
    }
}

fn network_error(context: &str, err: ClientError) -> SwapError {
    SwapError::NetworkError(format!("{}: {}", context, err))
}

fn snapshot_balances(balances: Option<Vec<UiTransactionTokenBalance>>) -> Vec<TokenBalanceSnapshot> {
    balances
        .unwrap_or_default()
        .into_iter()
        .filter_map(|balance| {
            let amount = balance.ui_token_amount.amount.parse::<u64>().ok()?;
            Some(TokenBalanceSnapshot {
                account_index: balance.account_index,
                mint: balance.mint,
                owner: Option::<String>::from(balance.owner),
                amount,
                decimals: balance.ui_token_amount.decimals,
            })
        })
        .collect()
}

/// Solana RPC client wrapper
pub struct SolanaRpcClient {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl SolanaRpcClient {
    pub fn new(rpc_url: String, commitment: CommitmentConfig) -> Self {
        Self {
            client: RpcClient::new_with_commitment(rpc_url, commitment),
            commitment,
        }
    }
}

#[async_trait]
impl LedgerClient for SolanaRpcClient {
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, SwapError> {
        let response = self
            .client
            .get_account_with_commitment(address, self.commitment)
            .await
            .map_err(|e| network_error(&format!("failed to get account {}", address), e))?;
        Ok(response.value.map(|account| account.data))
    }

    async fn get_token_account_balance(&self, address: &Pubkey) -> Result<u64, SwapError> {
        let balance = self
            .client
            .get_token_account_balance(address)
            .await
            .map_err(|e| network_error(&format!("failed to get token balance for {}", address), e))?;
        balance
            .amount
            .parse::<u64>()
            .map_err(|e| SwapError::DecodeError(format!("invalid token amount '{}': {}", balance.amount, e)))
    }

    async fn get_program_accounts_sized(
        &self,
        program_id: &Pubkey,
        data_len: u64,
    ) -> Result<Vec<(Pubkey, Vec<u8>)>, SwapError> {
        let config = RpcProgramAccountsConfig {
            filters: Some(vec![RpcFilterType::DataSize(data_len)]),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(self.commitment),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };
        let accounts = self
            .client
            .get_program_accounts_with_config(program_id, config)
            .await
            .map_err(|e| network_error("failed to get program accounts", e))?;
        Ok(accounts
            .into_iter()
            .map(|(pubkey, account)| (pubkey, account.data))
            .collect())
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, SwapError> {
        self.client
            .get_latest_blockhash()
            .await
            .map_err(|e| network_error("failed to get latest blockhash", e))
    }

    async fn send_transaction(&self, transaction: &Transaction, skip_preflight: bool) -> Result<Signature, SwapError> {
        let config = RpcSendTransactionConfig {
            skip_preflight,
            preflight_commitment: Some(self.commitment.commitment),
            ..RpcSendTransactionConfig::default()
        };
        self.client
            .send_transaction_with_config(transaction, config)
            .await
            .map_err(|e| classify_send_error(e.get_transaction_error(), &e.to_string()))
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<TransactionConfirmationStatus>, SwapError> {
        let response = self
            .client
            .get_signature_statuses(&[*signature])
            .await
            .map_err(|e| network_error("failed to get signature status", e))?;
        Ok(response
            .value
            .into_iter()
            .next()
            .flatten()
            .and_then(|status| status.confirmation_status))
    }

    async fn get_transaction_meta(&self, signature: &Signature) -> Result<TransactionMeta, SwapError> {
        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::Base64),
            commitment: Some(CommitmentConfig::confirmed()),
            max_supported_transaction_version: Some(0),
        };
        let transaction = self
            .client
            .get_transaction_with_config(signature, config)
            .await
            .map_err(|e| network_error(&format!("failed to get transaction {}", signature), e))?;
        let meta = transaction
            .transaction
            .meta
            .ok_or_else(|| SwapError::DecodeError(format!("transaction {} has no metadata", signature)))?;

        Ok(TransactionMeta {
            err: meta.err.map(|e| e.to_string()),
            fee: meta.fee,
            pre_balances: meta.pre_balances,
            post_balances: meta.post_balances,
            pre_token_balances: snapshot_balances(meta.pre_token_balances.into()),
            post_token_balances: snapshot_balances(meta.post_token_balances.into()),
        })
    }
}
