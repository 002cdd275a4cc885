use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Company not found: {0}")]
    NotFound(String),

    #[error("Metrics provider unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Division by zero while computing {0}")]
    DivisionByZero(String),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Invalid period format: {0}")]
    PeriodParse(String),
}

pub type Result<T> = std::result::Result<T, Error>;
