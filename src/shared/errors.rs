//! Error handling for the swap client

use thiserror::Error;

/// Errors raised by the decoding, pricing, compiling and submission layers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SwapError {
    /// Malformed or too-short account bytes
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// No valid program-derived address within the nonce bound
    #[error("Derivation error: {0}")]
    DerivationError(String),

    /// Any ledger collaborator failure
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Preflight rejected the transaction with a signature verification failure
    #[error("Preflight signature verification failure: {0}")]
    PreflightSignatureFailure(String),

    /// Bad user input (slippage, amount, side) or an unusable pool
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Discovery found no candidate pool
    #[error("Pool not found: {0}")]
    PoolNotFoundError(String),

    /// Instruction building or transaction signing failed
    #[error("Instruction error: {0}")]
    InstructionError(String),
}

impl SwapError {
    /// Network-class errors that trigger the single preflight-disabled retry
    pub fn is_signature_failure(&self) -> bool {
        matches!(self, SwapError::PreflightSignatureFailure(_))
    }
}

impl From<solana_sdk::program_error::ProgramError> for SwapError {
    fn from(err: solana_sdk::program_error::ProgramError) -> Self {
        SwapError::InstructionError(err.to_string())
    }
}
