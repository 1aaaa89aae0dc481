use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Bad layer sizes, bounds or config values.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Input vector length differs from the input layer size.
    #[error("Expected {expected} inputs, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Neuron index {index} is out of range for a layer of {len} neurons")]
    IndexOutOfRange { index: usize, len: usize },

    /// Malformed persisted network.
    #[error("Failed to deserialize network: {0}")]
    Deserialization(String),

    #[error("Failed to serialize network: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
