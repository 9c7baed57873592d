//! Infrastructure layer - ledger access

pub mod blockchain;
