//! Spotify resolution plugin for Lavalink-style audio orchestrators.
//!
//! This library lets a music-playback orchestrator resolve Spotify track,
//! album and playlist URLs into playable audio entries by re-mapping them
//! onto its audio-search backend via YouTube search. It is not a general
//! Spotify API client and not a playback engine; it only identifies Spotify
//! entities and maps them to playable handles.
//!
//! # Modules
//!
//! - `auth` - client-credentials token lifecycle with background renewal
//! - `catalog` - authenticated, paginated Spotify Web API access
//! - `config` - plugin options and construction-time validation
//! - `error` - discriminated error taxonomy
//! - `matcher` - ISRC-first matching against the audio search backend
//! - `plugin` - the host-facing search interceptor
//! - `resolver` - Spotify reference parsing and outcome assembly
//! - `types` - data structures and wire shapes
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use spotilink::{PluginOptions, SpotifyPlugin};
//!
//! # async fn demo(manager: Arc<dyn spotilink::Orchestrator>) -> spotilink::Result<()> {
//! let plugin = SpotifyPlugin::new(PluginOptions::new("client-id", "client-secret"))?;
//! plugin.install(manager).await;
//!
//! let outcome = plugin
//!     .search("https://open.spotify.com/track/11dFghVXANMlKmJXsNCbNl")
//!     .await;
//! # let _ = outcome;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod matcher;
pub mod plugin;
pub mod resolver;
pub mod types;

pub use config::{PluginOptions, TrackFailureMode};
pub use error::{PluginError, Result};
pub use plugin::{Orchestrator, SpotifyPlugin};
pub use types::{
    LoadType, NodeOptions, PlayableTrack, PlaylistInfo, SearchOutcome, SearchQuery, TrackInfo,
    UnresolvedTrack,
};
