//! Error types for page fetching

use thiserror::Error;

/// Result type alias for fetch operations
pub type Result<T> = std::result::Result<T, FetchError>;

/// Errors that can occur while fetching a page
#[derive(Error, Debug)]
pub enum FetchError {
    /// The page could not be retrieved at all (network, browser launch, navigation)
    #[error("Page unavailable: {url}: {reason}")]
    Unavailable { url: String, reason: String },

    /// The renderer produced an empty document
    #[error("Empty document returned for {0}")]
    EmptyDocument(String),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The requested renderer is not compiled into this build
    #[error("Renderer not available: {0}")]
    RendererUnavailable(String),
}

impl FetchError {
    /// Create a new unavailable error
    pub fn unavailable(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable { url: url.into(), reason: reason.into() }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
