use solana_sdk::{instruction::Instruction, pubkey::Pubkey, system_instruction};
use spl_associated_token_account::{get_associated_token_address, instruction::create_associated_token_account};
use tracing::info;

use crate::exchanges::common::token_utils::is_native_mint;
use crate::exchanges::raydium_v4::{build_swap_instruction, resolve_market_vault_signer, RaydiumPool};
use crate::exchanges::types::{Side, SwapQuote};
use crate::infrastructure::blockchain::rpc_client::LedgerClient;
use crate::shared::errors::SwapError;

/// Whether the owner's associated token accounts already exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenAccountPresence {
    pub source_exists: bool,
    pub destination_exists: bool,
}

/// The owner's associated token accounts for a quote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserTokenAccounts {
    pub source: Pubkey,
    pub destination: Pubkey,
}

impl UserTokenAccounts {
    pub fn for_quote(owner: &Pubkey, quote: &SwapQuote) -> Self {
        Self {
            source: get_associated_token_address(owner, &quote.source_mint),
            destination: get_associated_token_address(owner, &quote.destination_mint),
        }
    }
}

/// Look up which of the owner's token accounts exist
pub async fn resolve_token_accounts(
    ledger: &dyn LedgerClient,
    owner: &Pubkey,
    quote: &SwapQuote,
) -> Result<TokenAccountPresence, SwapError> {
    let accounts = UserTokenAccounts::for_quote(owner, quote);
    Ok(TokenAccountPresence {
        source_exists: ledger.get_account_data(&accounts.source).await?.is_some(),
        destination_exists: ledger.get_account_data(&accounts.destination).await?.is_some(),
    })
}

pub struct TransactionBuilder;

impl TransactionBuilder {
    /// Ordered instruction set for one swap:
    /// create source ATA, wrap SOL, create destination ATA, swap, unwrap SOL.
    /// Steps that do not apply are left out.
    pub fn build_swap_instructions(
        &self,
        pool: &RaydiumPool,
        quote: &SwapQuote,
        owner: &Pubkey,
        presence: TokenAccountPresence,
        min_amount_out: u64,
    ) -> Result<Vec<Instruction>, SwapError> {
        let accounts = UserTokenAccounts::for_quote(owner, quote);
        let mut instructions = Vec::new();

        if !presence.source_exists {
            instructions.push(create_associated_token_account(
                owner,
                owner,
                &quote.source_mint,
                &spl_token::id(),
            ));
            info!("✅ Added create source token account {}", accounts.source);
        }

        if quote.side == Side::Buy && is_native_mint(&quote.source_mint) {
            instructions.push(system_instruction::transfer(owner, &accounts.source, quote.amount_in_raw));
            instructions.push(spl_token::instruction::sync_native(&spl_token::id(), &accounts.source)?);
            info!("✅ Added wrap of {} lamports", quote.amount_in_raw);
        }

        if !presence.destination_exists {
            instructions.push(create_associated_token_account(
                owner,
                owner,
                &quote.destination_mint,
                &spl_token::id(),
            ));
            info!("✅ Added create destination token account {}", accounts.destination);
        }

        let vault_signer = resolve_market_vault_signer(pool)?;
        instructions.push(build_swap_instruction(
            pool,
            vault_signer,
            accounts.source,
            accounts.destination,
            *owner,
            quote.amount_in_raw,
            min_amount_out,
        )?);
        info!(
            "✅ Added swap instruction: {} in, min {} out",
            quote.amount_in_raw, min_amount_out
        );

        if quote.side == Side::Sell && is_native_mint(&quote.destination_mint) {
            instructions.push(spl_token::instruction::close_account(
                &spl_token::id(),
                &accounts.destination,
                owner,
                owner,
                &[],
            )?);
            info!("✅ Added unwrap of SOL account {}", accounts.destination);
        }

        info!("🎯 Built {} instructions", instructions.len());
        Ok(instructions)
    }
}
