use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid {field} '{value}'")]
    InvalidValue { field: &'static str, value: String },

    #[error("Amount must be a non-negative number, got {0}")]
    NegativeAmount(Decimal),

    #[error("Amount cannot exceed {max}")]
    AmountTooLarge { max: Decimal },

    #[error("Amount {0} has more precision than can be stored")]
    ImpreciseAmount(Decimal),

    #[error("No transaction ids left to assign")]
    IdsExhausted,

    #[error("{field} too long (max {max} characters)")]
    TooLong { field: &'static str, max: usize },

    #[error("{0}")]
    Validation(String),

    #[error("Budget for category '{0}' not found")]
    BudgetNotFound(String),

    #[error("No profile is registered")]
    ProfileNotFound,

    #[error("Budget cannot be negative")]
    NegativeBudget,

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("Terminal error: {0}")]
    Terminal(String),
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
