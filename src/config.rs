//! Plugin configuration.
//!
//! All options are plain values handed in by the embedding application; the
//! crate performs no environment or file based configuration loading of its
//! own. Validation happens synchronously at plugin construction time so a
//! misconfigured plugin never reaches the orchestrator.

use std::time::Duration;

use crate::error::{PluginError, Result};

/// Default Spotify Web API base URL.
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";

/// Default Spotify identity endpoint for the client-credentials grant.
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Default page cap for album pagination (each page holds up to 50 tracks).
pub const DEFAULT_ALBUM_LIMIT: u32 = 50;

/// Default page cap for playlist pagination (each page holds up to 100
/// tracks). Only effective with [`PluginOptions::strict_playlist_limit`].
pub const DEFAULT_PLAYLIST_LIMIT: u32 = 100;

/// Default per-request timeout for all outbound HTTP calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Policy for a track that *errors* (as opposed to matching nothing) while
/// the interceptor eagerly resolves an aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackFailureMode {
    /// Drop the failing track, keep the rest of the aggregate.
    #[default]
    Skip,
    /// Fail the whole search with a load-failed outcome.
    Abort,
}

/// Options accepted by [`SpotifyPlugin::new`](crate::plugin::SpotifyPlugin::new).
///
/// `client_id` and `client_secret` are required; everything else has a
/// sensible default. Endpoint URLs are overridable the same way every other
/// knob is, which also makes the plugin testable against local fixtures.
#[derive(Debug, Clone)]
pub struct PluginOptions {
    /// Spotify application ID.
    pub client_id: String,
    /// Spotify application secret.
    pub client_secret: String,
    /// Maximum number of playlist pages to fetch. `0` disables the cap.
    /// Only honored when `strict_playlist_limit` is set; see below.
    pub playlist_limit: u32,
    /// Maximum number of album pages to fetch. `0` disables the cap, which
    /// lets a large album drive unbounded request fan-out.
    pub album_limit: u32,
    /// The upstream implementation bounds playlist pagination by the *album*
    /// limit. That behavior is kept as the default for compatibility; set
    /// this flag to bound playlists by `playlist_limit` instead.
    pub strict_playlist_limit: bool,
    /// What to do when a single track errors during eager resolution.
    pub track_failure_mode: TrackFailureMode,
    /// Timeout applied to every outbound HTTP request.
    pub request_timeout: Duration,
    /// Spotify Web API base URL.
    pub api_url: String,
    /// Spotify identity endpoint URL.
    pub token_url: String,
}

impl Default for PluginOptions {
    fn default() -> Self {
        PluginOptions {
            client_id: String::new(),
            client_secret: String::new(),
            playlist_limit: DEFAULT_PLAYLIST_LIMIT,
            album_limit: DEFAULT_ALBUM_LIMIT,
            strict_playlist_limit: false,
            track_failure_mode: TrackFailureMode::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            api_url: DEFAULT_API_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
        }
    }
}

impl PluginOptions {
    /// Creates options with the given credentials and defaults for the rest.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        PluginOptions {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            ..PluginOptions::default()
        }
    }

    /// Validates the options, returning a distinct message per offending
    /// field.
    pub fn validate(&self) -> Result<()> {
        if self.client_id.is_empty() {
            return Err(PluginError::ConfigValidation(
                "missing Spotify client ID".to_string(),
            ));
        }
        if self.client_secret.is_empty() {
            return Err(PluginError::ConfigValidation(
                "missing Spotify client secret".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(PluginError::ConfigValidation(
                "request_timeout must be non-zero".to_string(),
            ));
        }
        if self.api_url.is_empty() {
            return Err(PluginError::ConfigValidation(
                "api_url must not be empty".to_string(),
            ));
        }
        if self.token_url.is_empty() {
            return Err(PluginError::ConfigValidation(
                "token_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let options = PluginOptions::new("id", "secret");
        assert_eq!(options.album_limit, 50);
        assert_eq!(options.playlist_limit, 100);
        assert!(!options.strict_playlist_limit);
        assert_eq!(options.track_failure_mode, TrackFailureMode::Skip);
        assert_eq!(options.api_url, DEFAULT_API_URL);
        assert_eq!(options.token_url, DEFAULT_TOKEN_URL);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn missing_client_id_is_rejected() {
        let options = PluginOptions::new("", "secret");
        let err = options.validate().unwrap_err();
        assert!(err.to_string().contains("missing Spotify client ID"));
    }

    #[test]
    fn missing_client_secret_is_rejected() {
        let options = PluginOptions::new("id", "");
        let err = options.validate().unwrap_err();
        assert!(err.to_string().contains("missing Spotify client secret"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut options = PluginOptions::new("id", "secret");
        options.request_timeout = Duration::ZERO;
        let err = options.validate().unwrap_err();
        assert!(err.to_string().contains("request_timeout"));
    }
}
