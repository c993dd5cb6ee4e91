// DANS : src/decoders/meteora/damm_v2/error.rs

use thiserror::Error;

/// Toutes les erreurs que peuvent remonter le décodeur et le moteur de quote DAMM v2.
/// Aucune n'est convertie en valeur par défaut : c'est à l'appelant de décider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DammV2Error {
    #[error("Truncated buffer: needed {needed} bytes, {available} available")]
    TruncatedBuffer { needed: usize, available: usize },

    #[error("DAMM v2 pool layout mismatch: expected at least {expected} bytes, got {actual}")]
    Layout { expected: usize, actual: usize },

    #[error("Division by zero (liquidity or sqrt price is zero)")]
    DivisionByZero,

    #[error("Invalid sqrt price: {0}")]
    InvalidPrice(&'static str),

    #[error("Math overflow")]
    MathOverflow,

    #[error("Unknown fee scheduler mode tag: {0}")]
    UnknownFeeSchedulerMode(u8),

    #[error("Unknown collect fee mode tag: {0}")]
    UnknownCollectFeeMode(u8),
}

pub type Result<T> = std::result::Result<T, DammV2Error>;
