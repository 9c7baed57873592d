//! Transaction assembly, submission and confirmation polling

use solana_sdk::{
    instruction::Instruction,
    message::Message,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};
use solana_transaction_status::TransactionConfirmationStatus;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::rpc_client::LedgerClient;
use crate::exchanges::compute_budget::ComputeBudget;
use crate::shared::errors::SwapError;

/// Bounded status polling after submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            max_attempts: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub signature: Signature,
    /// False when the polling bound ran out before confirmation
    pub confirmed: bool,
    /// The accepted submission went out with preflight disabled
    pub preflight_skipped: bool,
}

pub struct TransactionExecutor<'a> {
    ledger: &'a dyn LedgerClient,
    policy: ConfirmationPolicy,
    compute_budget: ComputeBudget,
}

impl<'a> TransactionExecutor<'a> {
    pub fn new(ledger: &'a dyn LedgerClient, policy: ConfirmationPolicy, compute_budget: ComputeBudget) -> Self {
        Self {
            ledger,
            policy,
            compute_budget,
        }
    }

    /// Anchor to a fresh blockhash and sign with the payer
    pub async fn assemble(&self, instructions: &[Instruction], payer: &Keypair) -> Result<Transaction, SwapError> {
        let recent_blockhash = self.ledger.get_latest_blockhash().await?;

        let mut all_instructions = self.compute_budget.instructions();
        all_instructions.extend_from_slice(instructions);

        let message = Message::new(&all_instructions, Some(&payer.pubkey()));
        let mut transaction = Transaction::new_unsigned(message);
        transaction
            .try_sign(&[payer], recent_blockhash)
            .map_err(|e| SwapError::InstructionError(format!("failed to sign transaction: {}", e)))?;

        info!(
            "📝 Assembled transaction: {} instructions, {} bytes",
            all_instructions.len(),
            transaction.message_data().len()
        );
        Ok(transaction)
    }

    /// Send with preflight; a signature verification failure gets exactly one
    /// retry with preflight disabled. Returns the signature and whether
    /// preflight was skipped.
    pub async fn submit(&self, transaction: &Transaction) -> Result<(Signature, bool), SwapError> {
        match self.ledger.send_transaction(transaction, false).await {
            Ok(signature) => Ok((signature, false)),
            Err(e) if e.is_signature_failure() => {
                warn!("⚠️ Preflight signature verification failed, retrying without preflight: {}", e);
                let signature = self.ledger.send_transaction(transaction, true).await?;
                Ok((signature, true))
            }
            Err(e) => Err(e),
        }
    }

    /// Poll until confirmed or finalized. Poll errors count as "not yet".
    pub async fn wait_for_confirmation(&self, signature: &Signature) -> bool {
        for attempt in 1..=self.policy.max_attempts {
            tokio::time::sleep(self.policy.interval).await;

            match self.ledger.get_signature_status(signature).await {
                Ok(Some(TransactionConfirmationStatus::Confirmed))
                | Ok(Some(TransactionConfirmationStatus::Finalized)) => {
                    info!("✅ Transaction confirmed after {} checks", attempt);
                    return true;
                }
                Ok(status) => debug!("Attempt {}: status {:?}", attempt, status),
                Err(e) => debug!("Attempt {}: status check failed: {}", attempt, e),
            }
        }

        warn!(
            "⏰ Transaction {} not confirmed after {} checks",
            signature, self.policy.max_attempts
        );
        false
    }

    pub async fn execute(&self, instructions: &[Instruction], payer: &Keypair) -> Result<SubmissionOutcome, SwapError> {
        let transaction = self.assemble(instructions, payer).await?;
        let (signature, preflight_skipped) = self.submit(&transaction).await?;
        info!("🚀 Transaction sent: {}", signature);

        let confirmed = self.wait_for_confirmation(&signature).await;
        Ok(SubmissionOutcome {
            signature,
            confirmed,
            preflight_skipped,
        })
    }
}
