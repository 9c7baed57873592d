use serde::{Deserialize, Serialize};
use solana_sdk::{pubkey, pubkey::Pubkey};
use std::fmt;
use std::str::FromStr;

use crate::shared::errors::SwapError;

pub const PROTOCOL: &str = "Raydium V4 AMM (Pure On-Chain)";

/// Raydium AMM V4 program
pub const RAYDIUM_AMM_V4: Pubkey = pubkey!("675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8");

/// OpenBook order-book program (vault signer is derived only for this one)
pub const OPENBOOK_PROGRAM: Pubkey = pubkey!("srmqPvymJeFKQ4zGQed1GFppgkRHL9kaELCbyksJtPX");

/// Serum DEX v3, the order book older pools were created against
pub const SERUM_V3_PROGRAM: Pubkey = pubkey!("9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin");

pub const KNOWN_ORDER_BOOK_PROGRAMS: [Pubkey; 2] = [OPENBOOK_PROGRAM, SERUM_V3_PROGRAM];

/// Raydium authority PDA seed
pub const AUTHORITY_AMM_SEED: &[u8] = b"amm authority";

pub const SWAP_INSTRUCTION_OPCODE: u8 = 9;
pub const TRADE_FEE_RATE: f64 = 0.0025;
pub const NATIVE_DECIMALS: u8 = 9;
pub const POOL_ACCOUNT_LEN: usize = 752;
pub const MARKET_ACCOUNT_LEN: usize = 388;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Native in, asset out
    Buy,
    /// Asset in, native out
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }

    pub fn input_label(&self) -> &'static str {
        match self {
            Side::Buy => "SOL",
            Side::Sell => "TOKEN",
        }
    }

    pub fn output_label(&self) -> &'static str {
        match self {
            Side::Buy => "TOKEN",
            Side::Sell => "SOL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            other => Err(SwapError::ValidationError(format!(
                "side must be 'buy' or 'sell', got '{}'",
                other
            ))),
        }
    }
}

/// Where the pool comes from: an explicit address, or discovery by asset mint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolTarget {
    Pool(Pubkey),
    Token(Pubkey),
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuoteParams {
    pub target: PoolTarget,
    pub side: Side,
    pub amount: f64,
}

impl QuoteParams {
    /// Pool address takes precedence when both are supplied
    pub fn new(pool: Option<Pubkey>, token: Option<Pubkey>, side: Side, amount: f64) -> Result<Self, SwapError> {
        let target = match (pool, token) {
            (Some(pool), _) => PoolTarget::Pool(pool),
            (None, Some(token)) => PoolTarget::Token(token),
            (None, None) => {
                return Err(SwapError::ValidationError(
                    "either a pool or a token address must be specified".to_string(),
                ))
            }
        };
        Ok(Self { target, side, amount })
    }
}

/// Which way the swap moves through the pool reserves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapDirection {
    BaseToQuote,
    QuoteToBase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapQuote {
    pub pool_address: Pubkey,
    pub side: Side,
    pub direction: SwapDirection,
    pub source_mint: Pubkey,
    pub destination_mint: Pubkey,
    pub input_decimals: u8,
    pub output_decimals: u8,
    pub amount_in: f64,
    pub amount_in_raw: u64,
    /// Constant-product output before the fee
    pub amount_out_raw: u64,
    /// Human output after the 0.25% fee approximation
    pub amount_out: f64,
}
