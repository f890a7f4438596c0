use thiserror::Error;

/// Rejections produced by pure ledger validation.
///
/// All variants except [`LedgerError::InvalidClock`] are caller input errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("invalid denomination {key:?}: {reason}")]
    InvalidDenomination { key: String, reason: &'static str },

    #[error("negative quantity for denomination(s): {}", denominations.join(", "))]
    NegativeQuantity { denominations: Vec<String> },

    #[error("fill/credit amount must be non-zero")]
    ZeroAmount,

    #[error("amount {0} has more decimal places than the ledger stores")]
    TooPrecise(String),

    #[error("amount exceeds the ledger money range")]
    Overflow,

    #[error("invalid gaming day clock: {0}")]
    InvalidClock(String),
}
