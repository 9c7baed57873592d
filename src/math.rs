// src/math.rs
use crate::exchanges::common::token_utils::{to_raw_amount, to_ui_amount};
use crate::exchanges::raydium_v4::RaydiumPool;
use crate::exchanges::types::{Side, SwapDirection, SwapQuote, NATIVE_DECIMALS, TRADE_FEE_RATE};
use crate::shared::errors::SwapError;

/// Constant product output: floor(reserve_out * amount_in / (reserve_in + amount_in)).
/// u128 holds the product of any two u64 values, and the quotient never exceeds reserve_out.
pub fn calculate_swap_amount(reserve_out: u64, reserve_in: u64, amount_in: u64) -> u64 {
    let numerator = reserve_out as u128 * amount_in as u128;
    let denominator = reserve_in as u128 + amount_in as u128;
    if denominator == 0 {
        return 0;
    }
    (numerator / denominator) as u64
}

/// Fee-adjusted raw output. Approximates the program's integer fee, display only.
pub fn apply_trade_fee(amount_out_raw: u64) -> f64 {
    let fee = amount_out_raw as f64 * TRADE_FEE_RATE;
    amount_out_raw as f64 - fee
}

/// Route a side through the pool: buy is native in, sell is native out
pub fn swap_route(pool: &RaydiumPool, side: Side) -> Result<(SwapDirection, u8, u8), SwapError> {
    let base_native = pool.is_base_native();
    if !base_native && !pool.is_quote_native() {
        return Err(SwapError::ValidationError(format!(
            "pool {} has no native SOL side",
            pool.address
        )));
    }

    Ok(match (side, base_native) {
        (Side::Buy, true) => (SwapDirection::BaseToQuote, NATIVE_DECIMALS, pool.quote_decimals),
        (Side::Buy, false) => (SwapDirection::QuoteToBase, NATIVE_DECIMALS, pool.base_decimals),
        (Side::Sell, true) => (SwapDirection::QuoteToBase, pool.quote_decimals, NATIVE_DECIMALS),
        (Side::Sell, false) => (SwapDirection::BaseToQuote, pool.base_decimals, NATIVE_DECIMALS),
    })
}

pub fn calculate_quote(pool: &RaydiumPool, side: Side, amount: f64) -> Result<SwapQuote, SwapError> {
    validate_amount(amount)?;
    let (direction, input_decimals, output_decimals) = swap_route(pool, side)?;
    let (reserve_in, reserve_out) = pool.reserves_for(direction);
    let (source_mint, destination_mint) = match direction {
        SwapDirection::BaseToQuote => (pool.base_mint, pool.quote_mint),
        SwapDirection::QuoteToBase => (pool.quote_mint, pool.base_mint),
    };

    let amount_in_raw = to_raw_amount(amount, input_decimals);
    if amount_in_raw == 0 {
        return Err(SwapError::ValidationError(format!(
            "amount {} is below the smallest unit at {} decimals",
            amount, input_decimals
        )));
    }
    let amount_out_raw = calculate_swap_amount(reserve_out, reserve_in, amount_in_raw);
    let amount_out = apply_trade_fee(amount_out_raw) / 10f64.powi(output_decimals as i32);

    Ok(SwapQuote {
        pool_address: pool.address,
        side,
        direction,
        source_mint,
        destination_mint,
        input_decimals,
        output_decimals,
        amount_in: amount,
        amount_in_raw,
        amount_out_raw,
        amount_out,
    })
}

/// Minimum output in raw units for a slippage tolerance given in percent
pub fn calculate_min_amount_out(expected_out: f64, slippage_pct: f64, output_decimals: u8) -> u64 {
    let min_amount = expected_out * (1.0 - slippage_pct / 100.0);
    to_raw_amount(min_amount, output_decimals)
}

pub fn validate_slippage(slippage_pct: f64) -> Result<f64, SwapError> {
    if !slippage_pct.is_finite() || !(0.0..=100.0).contains(&slippage_pct) {
        return Err(SwapError::ValidationError(
            "slippage must be between 0 and 100".to_string(),
        ));
    }
    Ok(slippage_pct)
}

/// Accepts "0.5", "1", " 2.5 % "
pub fn parse_slippage(input: &str) -> Result<f64, SwapError> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| SwapError::ValidationError(format!("invalid slippage value: '{}'", input)))?;
    validate_slippage(value)
}

pub fn validate_amount(amount: f64) -> Result<f64, SwapError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(SwapError::ValidationError(format!(
            "amount must be a positive number, got {}",
            amount
        )));
    }
    Ok(amount)
}

/// Native per token, whichever way the trade went
pub fn execution_price(side: Side, amount_in: f64, amount_out: f64) -> f64 {
    match side {
        Side::Buy => amount_in / amount_out,
        Side::Sell => amount_out / amount_in,
    }
}

/// Spot reserves in human units, for display
pub fn human_reserves(pool: &RaydiumPool) -> (f64, f64) {
    (
        to_ui_amount(pool.base_reserve, pool.base_decimals),
        to_ui_amount(pool.quote_reserve, pool.quote_decimals),
    )
}
