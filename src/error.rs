use std::io;
use thiserror::Error;

/// Custom error type for hwscope
#[derive(Error, Debug)]
pub enum HwError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Raised during discovery only; the source is left out of the session.
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// One bad read. The source stays in rotation and republishes its last sample.
    #[error("Sample failed: {0}")]
    TransientSample(String),

    /// The source's resource handle is gone for good.
    #[error("Fatal resource error: {0}")]
    FatalResource(String),

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for hwscope
pub type Result<T> = std::result::Result<T, HwError>;

impl HwError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        HwError::Config(msg.into())
    }

    /// Create a source unavailable error
    pub fn source_unavailable<S: Into<String>>(msg: S) -> Self {
        HwError::SourceUnavailable(msg.into())
    }

    /// Create a transient sample error
    pub fn transient<S: Into<String>>(msg: S) -> Self {
        HwError::TransientSample(msg.into())
    }

    /// Create a fatal resource error
    pub fn fatal_resource<S: Into<String>>(msg: S) -> Self {
        HwError::FatalResource(msg.into())
    }

    pub fn scheduler<S: Into<String>>(msg: S) -> Self {
        HwError::Scheduler(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        HwError::Other(msg.into())
    }

    /// Whether the failing source must be torn down.
    ///
    /// Everything except `FatalResource` is survivable at the source boundary.
    pub fn is_fatal(&self) -> bool {
        matches!(self, HwError::FatalResource(_))
    }
}
