//! Program-derived address search
//!
//! The runtime's `create_program_address` rejects any candidate that lands on
//! the ed25519 curve, so a derivation is a bounded search over a one-byte
//! nonce appended to the seeds. Nothing here touches the network.

use solana_sdk::pubkey::Pubkey;
use tracing::warn;

use crate::exchanges::types::{AUTHORITY_AMM_SEED, RAYDIUM_AMM_V4};
use crate::shared::errors::SwapError;

/// Order in which candidate nonces are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceSearch {
    /// 0, 1, .. 255 - first valid wins (order-book vault signers)
    Ascending,
    /// 255, 254, .. 0 - the runtime's canonical bump
    Canonical,
}

/// How the nonce is appended to the seed list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceSeed {
    Byte,
    /// u64 little-endian, as the order-book program stores vault signer nonces
    U64Le,
}

impl NonceSeed {
    fn encode(self, nonce: u8) -> Vec<u8> {
        match self {
            NonceSeed::Byte => vec![nonce],
            NonceSeed::U64Le => u64::from(nonce).to_le_bytes().to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedAddress {
    pub address: Pubkey,
    pub nonce: u8,
}

/// Smallest nonce in 0..=255 whose `seeds ++ [nonce]` yields an off-curve address
pub fn derive_address(program_id: &Pubkey, seeds: &[&[u8]]) -> Result<DerivedAddress, SwapError> {
    derive_address_with(program_id, seeds, NonceSearch::Ascending, NonceSeed::Byte)
}

pub fn derive_address_with(
    program_id: &Pubkey,
    seeds: &[&[u8]],
    search: NonceSearch,
    encoding: NonceSeed,
) -> Result<DerivedAddress, SwapError> {
    let candidates: Box<dyn Iterator<Item = u8>> = match search {
        NonceSearch::Ascending => Box::new(0..=u8::MAX),
        NonceSearch::Canonical => Box::new((0..=u8::MAX).rev()),
    };

    for nonce in candidates {
        let nonce_bytes = encoding.encode(nonce);
        let mut full_seeds: Vec<&[u8]> = seeds.to_vec();
        full_seeds.push(&nonce_bytes);

        // Err means the candidate is on the curve (or the seeds are invalid)
        if let Ok(address) = Pubkey::create_program_address(&full_seeds, program_id) {
            return Ok(DerivedAddress { address, nonce });
        }
    }

    Err(SwapError::DerivationError(format!(
        "no valid nonce in 0..=255 for program {}",
        program_id
    )))
}

/// Pool authority: canonical bump over the fixed "amm authority" seed
pub fn amm_authority() -> Result<DerivedAddress, SwapError> {
    derive_address_with(
        &RAYDIUM_AMM_V4,
        &[AUTHORITY_AMM_SEED],
        NonceSearch::Canonical,
        NonceSeed::Byte,
    )
}

/// Order-book vault signer: market address seed, u64 nonce searched upward
pub fn market_vault_signer(market: &Pubkey, market_program: &Pubkey) -> Result<DerivedAddress, SwapError> {
    derive_address_with(
        market_program,
        &[market.as_ref()],
        NonceSearch::Ascending,
        NonceSeed::U64Le,
    )
}

/// Warn when a derived nonce disagrees with the one stored on chain. Never fails.
pub fn check_stored_nonce(label: &str, derived: &DerivedAddress, stored: u64) -> bool {
    if u64::from(derived.nonce) != stored {
        warn!(
            "⚠️ {} nonce mismatch. Stored: {}, derived: {} ({})",
            label, stored, derived.nonce, derived.address
        );
        return false;
    }
    true
}
