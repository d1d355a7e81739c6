use thiserror::Error;

/// Failure of a simulation run. A run either yields a complete result or one
/// of these; there is no partial output.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Malformed input, detected before any trial runs.
    #[error("validation error: {0}")]
    Validation(String),

    /// Non-finite or otherwise unusable numbers reached aggregation.
    #[error("computation error: {0}")]
    Computation(String),

    /// The caller cancelled the run before it finished.
    #[error("simulation cancelled")]
    Cancelled,
}

impl SimError {
    pub fn validation(msg: impl Into<String>) -> Self {
        SimError::Validation(msg.into())
    }

    pub fn computation(msg: impl Into<String>) -> Self {
        SimError::Computation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
