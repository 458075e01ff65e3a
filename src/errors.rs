//! Error types for the wagering engine.
//!
//! The first four variants are wager rejections reported before any ledger
//! mutation occurs. `GenerationExhausted` is handled internally by settlement
//! (honest-draw fallback) and never reaches a caller of the public facade.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Stake was zero or otherwise not a usable amount.
    #[error("invalid stake amount: {0}")]
    InvalidAmount(u64),

    /// Stake exceeds the configured table limit.
    #[error("stake {stake} exceeds the table limit of {max}")]
    ExceedsStakeLimit { stake: u64, max: u64 },

    /// Balance cannot cover the requested amount.
    #[error("insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: u64, requested: u64 },

    /// Another wager lifecycle is in flight for this identity.
    #[error("a wager is already in progress for {0}")]
    AlreadyInSession(String),

    /// A steered generator could not realize the desired result within its
    /// retry budget.
    #[error("outcome generation exhausted its retry budget")]
    GenerationExhausted,

    /// The keyed store failed to read or write.
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// Configuration failed to load or validate.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<rocksdb::Error> for EngineError {
    fn from(e: rocksdb::Error) -> Self {
        EngineError::Persistence(e.to_string())
    }
}

impl From<bincode::Error> for EngineError {
    fn from(e: bincode::Error) -> Self {
        EngineError::Persistence(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_reason() {
        let err = EngineError::ExceedsStakeLimit { stake: 501, max: 500 };
        assert!(err.to_string().contains("501"));
        assert!(err.to_string().contains("500"));

        let err = EngineError::InsufficientFunds { balance: 10, requested: 25 };
        assert!(err.to_string().contains("balance 10"));
        assert!(err.to_string().contains("requested 25"));
    }

    #[test]
    fn test_storage_error_conversion() {
        let inner = bincode::Error::from(bincode::ErrorKind::SizeLimit);
        let err: EngineError = inner.into();
        assert!(matches!(err, EngineError::Persistence(_)));
    }
}
