//! Error types for dice expressions.

/// Errors that can occur while parsing or rolling a dice expression.
#[derive(Debug, thiserror::Error)]
pub enum DiceError {
    /// A roll expression could not be parsed.
    #[error("invalid dice expression: {0}")]
    Parse(String),

    /// The requested roll mode does not fit the expression (for example
    /// advantage on anything other than a single 1d20 term).
    #[error("{0}")]
    InvalidMode(String),
}

/// Convenience result type for dice operations.
pub type DiceResult<T> = Result<T, DiceError>;
