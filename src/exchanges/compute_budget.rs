use serde::{Deserialize, Serialize};
use solana_sdk::{compute_budget::ComputeBudgetInstruction, instruction::Instruction};

pub const DEFAULT_COMPUTE_UNIT_LIMIT: u32 = 200_000;

/// Priority fee settings prepended to a swap transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeBudget {
    pub unit_limit: u32,
    /// Micro-lamports per compute unit; `None` sends no budget instructions at all
    pub unit_price_microlamports: Option<u64>,
}

impl Default for ComputeBudget {
    fn default() -> Self {
        Self {
            unit_limit: DEFAULT_COMPUTE_UNIT_LIMIT,
            unit_price_microlamports: None,
        }
    }
}

impl ComputeBudget {
    pub fn new(unit_limit: u32, unit_price_microlamports: Option<u64>) -> Self {
        Self {
            unit_limit,
            unit_price_microlamports,
        }
    }

    /// Limit then price, or nothing when no priority fee is set
    pub fn instructions(&self) -> Vec<Instruction> {
        match self.unit_price_microlamports {
            Some(price) => vec![
                ComputeBudgetInstruction::set_compute_unit_limit(self.unit_limit),
                ComputeBudgetInstruction::set_compute_unit_price(price),
            ],
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_priority_fee_means_no_instructions() {
        assert!(ComputeBudget::default().instructions().is_empty());
    }

    #[test]
    fn test_priority_fee_instructions() {
        let ixs = ComputeBudget::new(300_000, Some(5_000)).instructions();
        assert_eq!(ixs.len(), 2);
        assert_eq!(ixs[0], ComputeBudgetInstruction::set_compute_unit_limit(300_000));
        assert_eq!(ixs[1], ComputeBudgetInstruction::set_compute_unit_price(5_000));
    }
}
