use thiserror::Error;

/// Configuration a component refuses to be built with.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("total must be a finite number greater than zero, got {0}")]
    InvalidTotal(f64),

    #[error("current must be a finite number, got {0}")]
    InvalidCurrent(f64),

    #[error("unknown style '{name}', expected one of: {expected}")]
    UnknownStyle { name: String, expected: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
