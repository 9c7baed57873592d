pub mod pda;
pub mod token_utils;

pub use pda::{derive_address, derive_address_with, DerivedAddress, NonceSearch, NonceSeed};
pub use token_utils::{is_native_mint, mint_decimals, WSOL_MINT};
