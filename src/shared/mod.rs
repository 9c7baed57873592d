//! Shared components

pub mod errors;

pub use errors::SwapError;
