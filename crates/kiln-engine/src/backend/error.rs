use std::fmt;

/// Failure reported by a backend for a single operation.
///
/// A failed batch does not abort the flush; subsequent batches are still issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The backend refused the pipeline state or draw.
    Rejected { reason: String },
    /// The batch needs a device feature that is not available.
    Unsupported { feature: &'static str },
    /// The device reported an error.
    Device { message: String },
}

impl BackendError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected { reason: reason.into() }
    }

    pub fn device(message: impl Into<String>) -> Self {
        Self::Device { message: message.into() }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected { reason } => write!(f, "backend rejected batch: {reason}"),
            Self::Unsupported { feature } => write!(f, "backend feature unavailable: {feature}"),
            Self::Device { message } => write!(f, "device error: {message}"),
        }
    }
}

impl std::error::Error for BackendError {}
