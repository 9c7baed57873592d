use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};
use tracing::debug;

use crate::exchanges::common::pda::{check_stored_nonce, market_vault_signer};
use crate::exchanges::types::{OPENBOOK_PROGRAM, RAYDIUM_AMM_V4, SWAP_INSTRUCTION_OPCODE};
use crate::shared::errors::SwapError;

use super::types::RaydiumPool;

/// Swap instruction data: opcode, amount in, minimum amount out. Borsh lays
/// these out as exactly 17 little-endian bytes.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapInstructionPayload {
    pub instruction: u8,
    pub amount_in: u64,
    pub min_amount_out: u64,
}

impl SwapInstructionPayload {
    pub const LEN: usize = 17;

    pub fn new(amount_in: u64, min_amount_out: u64) -> Self {
        Self {
            instruction: SWAP_INSTRUCTION_OPCODE,
            amount_in,
            min_amount_out,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, SwapError> {
        self.try_to_vec()
            .map_err(|e| SwapError::InstructionError(format!("failed to encode swap payload: {}", e)))
    }

    pub fn decode(data: &[u8]) -> Result<Self, SwapError> {
        if data.len() != Self::LEN {
            return Err(SwapError::DecodeError(format!(
                "swap payload must be {} bytes, got {}",
                Self::LEN,
                data.len()
            )));
        }
        let payload = Self::try_from_slice(data)
            .map_err(|e| SwapError::DecodeError(format!("invalid swap payload: {}", e)))?;
        if payload.instruction != SWAP_INSTRUCTION_OPCODE {
            return Err(SwapError::DecodeError(format!(
                "unexpected swap opcode {}",
                payload.instruction
            )));
        }
        Ok(payload)
    }
}

/// Vault signer for the pool's market; system program when the market is not
/// an OpenBook market.
pub fn resolve_market_vault_signer(pool: &RaydiumPool) -> Result<Pubkey, SwapError> {
    if !pool.has_market() || pool.market_program != OPENBOOK_PROGRAM {
        return Ok(system_program::id());
    }

    let derived = market_vault_signer(&pool.market, &pool.market_program)?;
    check_stored_nonce("Market vault signer", &derived, pool.market_accounts.vault_signer_nonce);
    Ok(derived.address)
}

/// Raydium V4 swap instruction with the full 18-account list. Order and
/// writable/signer flags are fixed by the program.
pub fn build_swap_instruction(
    pool: &RaydiumPool,
    market_vault_signer: Pubkey,
    user_source: Pubkey,
    user_destination: Pubkey,
    user_owner: Pubkey,
    amount_in: u64,
    min_amount_out: u64,
) -> Result<Instruction, SwapError> {
    let payload = SwapInstructionPayload::new(amount_in, min_amount_out);
    let data = payload.encode()?;

    let accounts = vec![
        AccountMeta::new_readonly(spl_token::id(), false),
        AccountMeta::new(pool.address, false),
        AccountMeta::new_readonly(pool.authority, false),
        AccountMeta::new(pool.open_orders, false),
        AccountMeta::new(pool.target_orders, false),
        AccountMeta::new(pool.base_vault, false),
        AccountMeta::new(pool.quote_vault, false),
        AccountMeta::new_readonly(pool.market_program, false),
        AccountMeta::new(pool.market, false),
        AccountMeta::new(pool.market_accounts.bids, false),
        AccountMeta::new(pool.market_accounts.asks, false),
        AccountMeta::new(pool.market_accounts.event_queue, false),
        AccountMeta::new(pool.market_accounts.base_vault, false),
        AccountMeta::new(pool.market_accounts.quote_vault, false),
        AccountMeta::new_readonly(market_vault_signer, false),
        AccountMeta::new(user_source, false),
        AccountMeta::new(user_destination, false),
        AccountMeta::new_readonly(user_owner, true),
    ];

    for (i, meta) in accounts.iter().enumerate() {
        debug!(
            "{:2}. {} ({}){}",
            i,
            meta.pubkey,
            if meta.is_writable { "W" } else { "R" },
            if meta.is_signer { " [SIGNER]" } else { "" }
        );
    }
    debug!(
        "Swap data: amount_in={} min_amount_out={} hex={}",
        amount_in,
        min_amount_out,
        hex::encode(&data)
    );

    Ok(Instruction {
        program_id: RAYDIUM_AMM_V4,
        accounts,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchanges::raydium_v4::parser::tests::sample_account;

    fn sample_pool() -> RaydiumPool {
        RaydiumPool::from_account(Pubkey::new_unique(), &sample_account(), Pubkey::new_unique())
    }

    #[test]
    fn test_payload_layout() {
        let payload = SwapInstructionPayload::new(0x0102030405060708, 42);
        let data = payload.encode().unwrap();
        assert_eq!(data.len(), SwapInstructionPayload::LEN);
        assert_eq!(data[0], 9);
        assert_eq!(&data[1..9], &[8, 7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(&data[9..17], &42u64.to_le_bytes());
    }

    #[test]
    fn test_payload_roundtrip() {
        let payload = SwapInstructionPayload::new(1_000_000, 797);
        assert_eq!(SwapInstructionPayload::decode(&payload.encode().unwrap()).unwrap(), payload);
    }

    #[test]
    fn test_payload_rejects_bad_input() {
        let mut data = SwapInstructionPayload::new(1, 1).encode().unwrap();
        data[0] = 11;
        assert!(SwapInstructionPayload::decode(&data).is_err());
        assert!(SwapInstructionPayload::decode(&data[..16]).is_err());
        let mut long = SwapInstructionPayload::new(1, 1).encode().unwrap();
        long.push(0);
        assert!(SwapInstructionPayload::decode(&long).is_err());
    }

    #[test]
    fn test_swap_instruction_account_order_and_flags() {
        let pool = sample_pool();
        let signer = Pubkey::new_unique();
        let source = Pubkey::new_unique();
        let destination = Pubkey::new_unique();
        let owner = Pubkey::new_unique();

        let ix = build_swap_instruction(&pool, signer, source, destination, owner, 5, 4).unwrap();
        assert_eq!(ix.program_id, RAYDIUM_AMM_V4);
        assert_eq!(ix.data, SwapInstructionPayload::new(5, 4).encode().unwrap());

        let expected = [
            (spl_token::id(), false, false),
            (pool.address, true, false),
            (pool.authority, false, false),
            (pool.open_orders, true, false),
            (pool.target_orders, true, false),
            (pool.base_vault, true, false),
            (pool.quote_vault, true, false),
            (pool.market_program, false, false),
            (pool.market, true, false),
            (pool.market_accounts.bids, true, false),
            (pool.market_accounts.asks, true, false),
            (pool.market_accounts.event_queue, true, false),
            (pool.market_accounts.base_vault, true, false),
            (pool.market_accounts.quote_vault, true, false),
            (signer, false, false),
            (source, true, false),
            (destination, true, false),
            (owner, false, true),
        ];
        assert_eq!(ix.accounts.len(), 18);
        for (meta, (key, writable, is_signer)) in ix.accounts.iter().zip(expected.iter()) {
            assert_eq!(meta.pubkey, *key);
            assert_eq!(meta.is_writable, *writable);
            assert_eq!(meta.is_signer, *is_signer);
        }
    }

    #[test]
    fn test_vault_signer_resolution() {
        let mut pool = sample_pool();
        let signer = resolve_market_vault_signer(&pool).unwrap();
        let expected = market_vault_signer(&pool.market, &OPENBOOK_PROGRAM).unwrap();
        assert_eq!(signer, expected.address);

        pool.market_program = crate::exchanges::types::SERUM_V3_PROGRAM;
        assert_eq!(resolve_market_vault_signer(&pool).unwrap(), system_program::id());

        pool.market_program = OPENBOOK_PROGRAM;
        pool.market = Pubkey::default();
        assert_eq!(resolve_market_vault_signer(&pool).unwrap(), system_program::id());
    }
}
