use thiserror::Error;

/// Top-level error type for Herald.
#[derive(Debug, Error)]
pub enum HeraldError {
    /// The transport rejected a send or the Bot API returned an error.
    #[error("transport error: {0}")]
    Transport(String),

    /// A button-grid line is missing the label/url separator, or one side
    /// is empty after trimming. Carries the offending line.
    #[error("malformed button line: {0}")]
    ButtonParse(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
