use solana_sdk::pubkey::Pubkey;

use crate::shared::errors::SwapError;

/// Wrapped SOL mint
pub const WSOL_MINT: Pubkey = spl_token::native_mint::ID;

/// Decimals byte inside an SPL mint account
pub const MINT_DECIMALS_OFFSET: usize = 44;
pub const MINT_ACCOUNT_LEN: usize = 82;

pub fn is_native_mint(mint: &Pubkey) -> bool {
    *mint == WSOL_MINT
}

/// Read decimals from raw mint account bytes (Token-2022 mints are longer, same offset)
pub fn mint_decimals(data: &[u8]) -> Result<u8, SwapError> {
    if data.len() < MINT_ACCOUNT_LEN {
        return Err(SwapError::DecodeError(format!(
            "invalid mint data size: {}",
            data.len()
        )));
    }
    Ok(data[MINT_DECIMALS_OFFSET])
}

/// Human amount to raw units, truncating toward zero
pub fn to_raw_amount(amount: f64, decimals: u8) -> u64 {
    (amount * 10f64.powi(decimals as i32)) as u64
}

pub fn to_ui_amount(raw: u64, decimals: u8) -> f64 {
    raw as f64 / 10f64.powi(decimals as i32)
}
