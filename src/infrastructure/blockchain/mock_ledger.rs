//! In-memory `LedgerClient` for tests

use async_trait::async_trait;
use solana_sdk::{hash::Hash, pubkey::Pubkey, signature::Signature, transaction::Transaction};
use solana_transaction_status::TransactionConfirmationStatus;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use super::rpc_client::{LedgerClient, TransactionMeta};
use crate::shared::errors::SwapError;

pub struct MockLedger {
    pub accounts: Mutex<HashMap<Pubkey, Vec<u8>>>,
    pub token_balances: Mutex<HashMap<Pubkey, u64>>,
    pub failing_accounts: Mutex<Vec<Pubkey>>,
    pub program_accounts: Mutex<Vec<(Pubkey, Vec<u8>)>>,
    pub blockhash: Hash,
    /// Queued send results; an empty queue succeeds with a fresh signature
    pub send_results: Mutex<VecDeque<Result<Signature, SwapError>>>,
    /// Every submitted transaction with its skip_preflight flag
    pub sent: Mutex<Vec<(Transaction, bool)>>,
    /// Queued poll results; an empty queue reports "not yet seen"
    pub statuses: Mutex<VecDeque<Result<Option<TransactionConfirmationStatus>, SwapError>>>,
    pub status_polls: Mutex<usize>,
    pub transaction_meta: Mutex<Option<TransactionMeta>>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            token_balances: Mutex::new(HashMap::new()),
            failing_accounts: Mutex::new(Vec::new()),
            program_accounts: Mutex::new(Vec::new()),
            blockhash: Hash::new_unique(),
            send_results: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            statuses: Mutex::new(VecDeque::new()),
            status_polls: Mutex::new(0),
            transaction_meta: Mutex::new(None),
        }
    }

    pub fn with_account(self, address: Pubkey, data: Vec<u8>) -> Self {
        self.accounts.lock().unwrap().insert(address, data);
        self
    }

    pub fn with_token_balance(self, address: Pubkey, amount: u64) -> Self {
        self.token_balances.lock().unwrap().insert(address, amount);
        self
    }

    /// Account fetches for `address` fail with a network error
    pub fn with_failing_account(self, address: Pubkey) -> Self {
        self.failing_accounts.lock().unwrap().push(address);
        self
    }

    pub fn with_program_account(self, address: Pubkey, data: Vec<u8>) -> Self {
        self.program_accounts.lock().unwrap().push((address, data));
        self
    }

    pub fn with_send_result(self, result: Result<Signature, SwapError>) -> Self {
        self.send_results.lock().unwrap().push_back(result);
        self
    }

    pub fn with_status(self, status: Result<Option<TransactionConfirmationStatus>, SwapError>) -> Self {
        self.statuses.lock().unwrap().push_back(status);
        self
    }

    pub fn with_transaction_meta(self, meta: TransactionMeta) -> Self {
        *self.transaction_meta.lock().unwrap() = Some(meta);
        self
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn poll_count(&self) -> usize {
        *self.status_polls.lock().unwrap()
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, SwapError> {
        if self.failing_accounts.lock().unwrap().contains(address) {
            return Err(SwapError::NetworkError(format!("mock failure for {}", address)));
        }
        Ok(self.accounts.lock().unwrap().get(address).cloned())
    }

    async fn get_token_account_balance(&self, address: &Pubkey) -> Result<u64, SwapError> {
        self.token_balances
            .lock()
            .unwrap()
            .get(address)
            .copied()
            .ok_or_else(|| SwapError::NetworkError(format!("no token account {}", address)))
    }

    async fn get_program_accounts_sized(
        &self,
        _program_id: &Pubkey,
        data_len: u64,
    ) -> Result<Vec<(Pubkey, Vec<u8>)>, SwapError> {
        Ok(self
            .program_accounts
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, data)| data.len() as u64 == data_len)
            .cloned()
            .collect())
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, SwapError> {
        Ok(self.blockhash)
    }

    async fn send_transaction(&self, transaction: &Transaction, skip_preflight: bool) -> Result<Signature, SwapError> {
        self.sent.lock().unwrap().push((transaction.clone(), skip_preflight));
        self.send_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Signature::new_unique()))
    }

    async fn get_signature_status(
        &self,
        _signature: &Signature,
    ) -> Result<Option<TransactionConfirmationStatus>, SwapError> {
        *self.status_polls.lock().unwrap() += 1;
        self.statuses.lock().unwrap().pop_front().unwrap_or(Ok(None))
    }

    async fn get_transaction_meta(&self, signature: &Signature) -> Result<TransactionMeta, SwapError> {
        self.transaction_meta
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| SwapError::NetworkError(format!("transaction {} not found", signature)))
    }
}
