use thiserror::Error;

/// Errors produced by the plugin, discriminated by the layer that raised them.
///
/// Each variant corresponds to one failure domain so callers can react by
/// kind instead of string-matching messages:
///
/// - [`PluginError::ConfigValidation`] - bad or missing options, raised
///   synchronously at construction time
/// - [`PluginError::InvalidCredentials`] - the identity endpoint rejected the
///   client or returned an incomplete token response
/// - [`PluginError::CatalogRequest`] - any HTTP or network failure against the
///   Spotify Web API, unwrapped and unretried
/// - [`PluginError::NodeRequest`] - an HTTP or network failure while querying
///   the audio search backend
/// - [`PluginError::NoAvailableNode`] - resolution was attempted while no
///   backend node was connected
/// - [`PluginError::NoManager`] - resolution was attempted before the plugin
///   was installed into an orchestrator
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("invalid plugin options: {0}")]
    ConfigValidation(String),

    #[error("invalid Spotify client: {0}")]
    InvalidCredentials(String),

    #[error("Spotify catalog request failed: {0}")]
    CatalogRequest(#[from] reqwest::Error),

    #[error("audio node request failed: {0}")]
    NodeRequest(reqwest::Error),

    #[error("no available nodes")]
    NoAvailableNode,

    #[error("no manager found")]
    NoManager,
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PluginError>;
