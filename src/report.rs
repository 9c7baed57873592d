// src/report.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::exchanges::common::token_utils::{is_native_mint, to_ui_amount};
use crate::exchanges::types::NATIVE_DECIMALS;
use crate::exchanges::types::{Side, SwapQuote};
use crate::infrastructure::blockchain::rpc_client::{LedgerClient, TokenBalanceSnapshot, TransactionMeta};
use crate::infrastructure::blockchain::transaction_executor::SubmissionOutcome;
use crate::math::execution_price;

pub const EXPLORER_TX_URL: &str = "https://solscan.io/tx/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    Success,
    /// Landed with an on-chain error
    Failed,
    /// Polling bound ran out
    Unconfirmed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Success => "Success",
            TransactionStatus::Failed => "Failed",
            TransactionStatus::Unconfirmed => "Unconfirmed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionReport {
    pub signature: String,
    pub status: TransactionStatus,
    pub side: Side,
    pub amount_in: f64,
    pub amount_out: f64,
    /// SOL per token
    pub expected_price: f64,
    pub actual_price: f64,
    pub slippage_pct: f64,
    pub explorer_url: String,
    pub input_token: String,
    pub output_token: String,
    pub timestamp: DateTime<Utc>,
}

impl TransactionReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Net human balance change per mint across the wallet's token accounts.
/// An account present on only one side counts as zero on the other.
pub fn balance_changes(meta: &TransactionMeta, wallet: &Pubkey) -> BTreeMap<String, f64> {
    let wallet = wallet.to_string();
    let owned = |balance: &&TokenBalanceSnapshot| balance.owner.as_deref() == Some(wallet.as_str());

    // mint -> (pre, post, decimals)
    let mut totals: BTreeMap<String, (u128, u128, u8)> = BTreeMap::new();
    for balance in meta.pre_token_balances.iter().filter(owned) {
        let entry = totals.entry(balance.mint.clone()).or_insert((0, 0, balance.decimals));
        entry.0 += balance.amount as u128;
    }
    for balance in meta.post_token_balances.iter().filter(owned) {
        let entry = totals.entry(balance.mint.clone()).or_insert((0, 0, balance.decimals));
        entry.1 += balance.amount as u128;
    }

    totals
        .into_iter()
        .map(|(mint, (pre, post, decimals))| {
            let change = if post >= pre {
                to_ui_amount((post - pre) as u64, decimals)
            } else {
                -to_ui_amount((pre - post) as u64, decimals)
            };
            (mint, change)
        })
        .collect()
}

fn signed_ui_amount(change: i128, decimals: u8) -> f64 {
    let magnitude = to_ui_amount(change.unsigned_abs().min(u64::MAX as u128) as u64, decimals);
    if change < 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Native SOL change of the fee payer (the wallet) with the fee added back.
/// Lamports parked in wallet token accounts opened by this transaction count
/// as still held, so account rent does not show up as traded SOL.
pub fn native_balance_change(meta: &TransactionMeta, wallet: &Pubkey) -> Option<f64> {
    let pre = *meta.pre_balances.first()? as i128;
    let post = *meta.post_balances.first()? as i128;

    let wallet = wallet.to_string();
    let opened: i128 = meta
        .post_token_balances
        .iter()
        .filter(|balance| balance.owner.as_deref() == Some(wallet.as_str()))
        .filter_map(|balance| {
            let index = balance.account_index as usize;
            let before = *meta.pre_balances.get(index)?;
            let after = *meta.post_balances.get(index)?;
            (before == 0).then_some(after as i128)
        })
        .sum();

    Some(signed_ui_amount(post - pre + meta.fee as i128 + opened, NATIVE_DECIMALS))
}

/// Actual (in, out) amounts recovered from balance changes, `None` per side when not recoverable.
/// The SOL side falls back to the wallet's lamport change when its WSOL account shows no delta.
pub fn reconcile_amounts(meta: &TransactionMeta, wallet: &Pubkey, quote: &SwapQuote) -> (Option<f64>, Option<f64>) {
    let changes = balance_changes(meta, wallet);
    let native_change = native_balance_change(meta, wallet);

    let amount_in = changes
        .get(&quote.source_mint.to_string())
        .copied()
        .filter(|change| *change < 0.0)
        .or_else(|| native_change.filter(|change| is_native_mint(&quote.source_mint) && *change < 0.0))
        .map(|change| -change);
    let amount_out = changes
        .get(&quote.destination_mint.to_string())
        .copied()
        .filter(|change| *change > 0.0)
        .or_else(|| native_change.filter(|change| is_native_mint(&quote.destination_mint) && *change > 0.0));
    (amount_in, amount_out)
}

fn price_or(side: Side, amount_in: f64, amount_out: f64, fallback: f64) -> f64 {
    let price = execution_price(side, amount_in, amount_out);
    if price.is_finite() && price > 0.0 {
        price
    } else {
        fallback
    }
}

/// Build the post-trade report. Never fails: anything that cannot be
/// recovered from the ledger falls back to the quoted amounts.
pub async fn generate_report(
    ledger: &dyn LedgerClient,
    wallet: &Pubkey,
    outcome: &SubmissionOutcome,
    quote: &SwapQuote,
) -> TransactionReport {
    let expected_in = quote.amount_in;
    let expected_out = quote.amount_out;

    let (status, actual_in, actual_out) = match ledger.get_transaction_meta(&outcome.signature).await {
        Ok(meta) if meta.err.is_some() => {
            warn!("⚠️ Transaction failed on-chain: {}", meta.err.as_deref().unwrap_or_default());
            (TransactionStatus::Failed, expected_in, expected_out)
        }
        Ok(meta) => {
            let (amount_in, amount_out) = reconcile_amounts(&meta, wallet, quote);
            if amount_in.is_none() || amount_out.is_none() {
                info!("Balance changes incomplete, using quoted amounts where missing");
            }
            // meta is fetched at confirmed commitment, so the tx has landed
            (
                TransactionStatus::Success,
                amount_in.unwrap_or(expected_in),
                amount_out.unwrap_or(expected_out),
            )
        }
        Err(e) => {
            warn!("⚠️ Could not fetch transaction details, using quoted amounts: {}", e);
            let status = if outcome.confirmed {
                TransactionStatus::Success
            } else {
                TransactionStatus::Unconfirmed
            };
            (status, expected_in, expected_out)
        }
    };

    let expected_price = execution_price(quote.side, expected_in, expected_out);
    let actual_price = price_or(quote.side, actual_in, actual_out, expected_price);
    let slippage_pct = if expected_price.is_finite() && expected_price > 0.0 {
        ((actual_price - expected_price) / expected_price).abs() * 100.0
    } else {
        0.0
    };

    TransactionReport {
        signature: outcome.signature.to_string(),
        status,
        side: quote.side,
        amount_in: actual_in,
        amount_out: actual_out,
        expected_price,
        actual_price,
        slippage_pct,
        explorer_url: format!("{}{}", EXPLORER_TX_URL, outcome.signature),
        input_token: quote.side.input_label().to_string(),
        output_token: quote.side.output_label().to_string(),
        timestamp: Utc::now(),
    }
}

pub fn print_report(report: &TransactionReport) {
    println!("\n=== TRANSACTION REPORT ===");
    println!("Status: {}", report.status.as_str());
    println!("Transaction: {}", report.signature);
    println!("Explorer: {}", report.explorer_url);
    println!("\nSwap Details:");
    println!("  Amount In: {:.9} {}", report.amount_in, report.input_token);
    println!("  Amount Out: {:.9} {}", report.amount_out, report.output_token);
    println!("\nPrice Analysis:");
    println!("  Expected Price: {:.9} SOL per token", report.expected_price);
    println!("  Actual Price: {:.9} SOL per token", report.actual_price);
    println!("  Slippage: {:.4}%", report.slippage_pct);
    println!("==========================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchanges::common::token_utils::WSOL_MINT;
    use crate::exchanges::types::SwapDirection;
    use crate::infrastructure::blockchain::mock_ledger::MockLedger;
    use solana_sdk::signature::Signature;

    fn sell_quote(token: Pubkey) -> SwapQuote {
        SwapQuote {
            pool_address: Pubkey::new_unique(),
            side: Side::Sell,
            direction: SwapDirection::QuoteToBase,
            source_mint: token,
            destination_mint: WSOL_MINT,
            input_decimals: 6,
            output_decimals: 9,
            amount_in: 100.0,
            amount_in_raw: 100_000_000,
            amount_out_raw: 2_000_000_000,
            amount_out: 2.0,
        }
    }

    fn snapshot(index: u8, mint: &Pubkey, owner: &Pubkey, amount: u64, decimals: u8) -> TokenBalanceSnapshot {
        TokenBalanceSnapshot {
            account_index: index,
            mint: mint.to_string(),
            owner: Some(owner.to_string()),
            amount,
            decimals,
        }
    }

    fn outcome(confirmed: bool) -> SubmissionOutcome {
        SubmissionOutcome {
            signature: Signature::new_unique(),
            confirmed,
            preflight_skipped: false,
        }
    }

    #[test]
    fn test_balance_changes_union_of_entries() {
        let wallet = Pubkey::new_unique();
        let token = Pubkey::new_unique();
        let other_owner = Pubkey::new_unique();
        let meta = TransactionMeta {
            pre_token_balances: vec![
                snapshot(1, &token, &wallet, 150_000_000, 6),
                snapshot(3, &token, &other_owner, 5, 6),
            ],
            // the WSOL account only exists after the swap
            post_token_balances: vec![
                snapshot(1, &token, &wallet, 50_000_000, 6),
                snapshot(2, &WSOL_MINT, &wallet, 1_900_000_000, 9),
            ],
            ..TransactionMeta::default()
        };

        let changes = balance_changes(&meta, &wallet);
        assert_eq!(changes.get(&token.to_string()), Some(&-100.0));
        assert_eq!(changes.get(&WSOL_MINT.to_string()), Some(&1.9));

        let (amount_in, amount_out) = reconcile_amounts(&meta, &wallet, &sell_quote(token));
        assert_eq!(amount_in, Some(100.0));
        assert_eq!(amount_out, Some(1.9));
    }

    #[tokio::test]
    async fn test_report_uses_actual_amounts() {
        let wallet = Pubkey::new_unique();
        let token = Pubkey::new_unique();
        let meta = TransactionMeta {
            pre_token_balances: vec![snapshot(1, &token, &wallet, 100_000_000, 6)],
            post_token_balances: vec![
                snapshot(1, &token, &wallet, 0, 6),
                snapshot(2, &WSOL_MINT, &wallet, 1_900_000_000, 9),
            ],
            ..TransactionMeta::default()
        };
        let ledger = MockLedger::new().with_transaction_meta(meta);
        let outcome = outcome(true);

        let report = generate_report(&ledger, &wallet, &outcome, &sell_quote(token)).await;
        assert_eq!(report.status, TransactionStatus::Success);
        assert_eq!(report.amount_in, 100.0);
        assert_eq!(report.amount_out, 1.9);
        assert_eq!(report.expected_price, 0.02);
        assert!((report.actual_price - 0.019).abs() < 1e-12);
        assert!((report.slippage_pct - 5.0).abs() < 1e-9);
        assert_eq!(report.explorer_url, format!("https://solscan.io/tx/{}", outcome.signature));
        assert_eq!(report.input_token, "TOKEN");
        assert_eq!(report.output_token, "SOL");
    }

    #[test]
    fn test_sol_side_recovered_from_lamports_on_sell() {
        let wallet = Pubkey::new_unique();
        let token = Pubkey::new_unique();
        // WSOL account opened and closed inside the tx, absent from both snapshots
        let meta = TransactionMeta {
            fee: 5_000,
            pre_balances: vec![3_000_000_000, 2_039_280, 0],
            post_balances: vec![4_899_995_000, 2_039_280, 0],
            pre_token_balances: vec![snapshot(1, &token, &wallet, 100_000_000, 6)],
            post_token_balances: vec![snapshot(1, &token, &wallet, 0, 6)],
            ..TransactionMeta::default()
        };

        let (amount_in, amount_out) = reconcile_amounts(&meta, &wallet, &sell_quote(token));
        assert_eq!(amount_in, Some(100.0));
        assert_eq!(amount_out, Some(1.9));
    }

    #[test]
    fn test_sol_side_recovered_from_lamports_on_buy() {
        let wallet = Pubkey::new_unique();
        let token = Pubkey::new_unique();
        let rent = 2_039_280;
        let quote = SwapQuote {
            side: Side::Buy,
            direction: SwapDirection::BaseToQuote,
            source_mint: WSOL_MINT,
            destination_mint: token,
            input_decimals: 9,
            output_decimals: 6,
            amount_in: 1.0,
            amount_in_raw: 1_000_000_000,
            amount_out_raw: 50_000_000,
            amount_out: 50.0,
            ..sell_quote(token)
        };
        // both token accounts opened here; the WSOL one is left holding only rent
        let meta = TransactionMeta {
            fee: 5_000,
            pre_balances: vec![5_000_000_000, 0, 0],
            post_balances: vec![5_000_000_000 - 1_000_000_000 - 2 * rent - 5_000, rent, rent],
            pre_token_balances: vec![],
            post_token_balances: vec![
                snapshot(1, &WSOL_MINT, &wallet, 0, 9),
                snapshot(2, &token, &wallet, 49_000_000, 6),
            ],
            ..TransactionMeta::default()
        };

        assert_eq!(native_balance_change(&meta, &wallet), Some(-1.0));
        let (amount_in, amount_out) = reconcile_amounts(&meta, &wallet, &quote);
        assert_eq!(amount_in, Some(1.0));
        assert_eq!(amount_out, Some(49.0));
    }

    #[tokio::test]
    async fn test_landed_transaction_is_success_after_polling_ran_out() {
        let wallet = Pubkey::new_unique();
        let token = Pubkey::new_unique();
        let ledger = MockLedger::new().with_transaction_meta(TransactionMeta {
            pre_token_balances: vec![snapshot(1, &token, &wallet, 100_000_000, 6)],
            post_token_balances: vec![snapshot(1, &token, &wallet, 0, 6)],
            ..TransactionMeta::default()
        });

        let report = generate_report(&ledger, &wallet, &outcome(false), &sell_quote(token)).await;
        assert_eq!(report.status, TransactionStatus::Success);
        assert_eq!(report.amount_in, 100.0);
        assert_eq!(report.amount_out, 2.0);
    }

    #[tokio::test]
    async fn test_report_falls_back_to_quote() {
        let wallet = Pubkey::new_unique();
        let quote = sell_quote(Pubkey::new_unique());

        let missing = MockLedger::new();
        let report = generate_report(&missing, &wallet, &outcome(false), &quote).await;
        assert_eq!(report.status, TransactionStatus::Unconfirmed);
        assert_eq!(report.amount_in, 100.0);
        assert_eq!(report.amount_out, 2.0);
        assert_eq!(report.slippage_pct, 0.0);

        let failed = MockLedger::new().with_transaction_meta(TransactionMeta {
            err: Some("InstructionError(3, Custom(30))".to_string()),
            ..TransactionMeta::default()
        });
        let report = generate_report(&failed, &wallet, &outcome(true), &quote).await;
        assert_eq!(report.status, TransactionStatus::Failed);
        assert_eq!(report.amount_out, 2.0);
    }

    #[tokio::test]
    async fn test_report_serializes_to_json() {
        let ledger = MockLedger::new();
        let report = generate_report(&ledger, &Pubkey::new_unique(), &outcome(true), &sell_quote(Pubkey::new_unique())).await;
        let json = report.to_json().unwrap();
        assert!(json.contains("\"side\": \"sell\""));
        assert!(json.contains("\"status\": \"Success\""));
    }
}
