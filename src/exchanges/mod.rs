pub mod common;
pub mod compute_budget;
pub mod raydium_v4;
pub mod transaction_builder;
pub mod types;
