//! Error types for Sakura

use thiserror::Error;

/// The main error type for Sakura operations.
///
/// A decorative layer degrades rather than fails: most invalid input is
/// clamped or ignored at the call site. These variants cover the few
/// programmer-facing misuses that are worth surfacing.
#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Lifecycle error: {0}")]
    LifecycleError(String),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),
}

/// Result type alias for Sakura operations
pub type Result<T> = std::result::Result<T, OverlayError>;

impl From<toml::de::Error> for OverlayError {
    fn from(err: toml::de::Error) -> Self {
        OverlayError::TomlParseError(err.to_string())
    }
}
