/// Result alias that carries the custom [`WaveformError`] type.
pub type Result<T> = std::result::Result<T, WaveformError>;

/// Common error type for the core crate.
///
/// The envelope pipeline itself never fails; errors only surface from
/// constructors, file loading and serialisation.
#[derive(Debug, thiserror::Error)]
pub enum WaveformError {
    /// Free-form message, used by collaborators such as the decoder in the
    /// application crate.
    #[error("{0}")]
    Message(String),
    /// Input rejected at construction time.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Configuration or frame cache (de)serialisation failure.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl WaveformError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for WaveformError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for WaveformError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
