//! Authenticated access to the Spotify Web API, including paginated catalog
//! traversal for albums and playlists.

use std::sync::Arc;

use futures::future::try_join_all;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    auth::CredentialManager,
    config::PluginOptions,
    error::Result,
    types::{AlbumItem, Page, PlaylistItem, SpotifyAlbum, SpotifyPlaylist, SpotifyTrack, UnresolvedTrack},
};

/// Tracks fetched for one catalog entity, together with the aggregate name
/// and thumbnail where the entity has one. Albums never carry a thumbnail;
/// playlists take theirs from the first playlist image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogTracks {
    pub tracks: Vec<UnresolvedTrack>,
    pub name: Option<String>,
    pub thumbnail: Option<String>,
}

/// Client for the Spotify catalog endpoints.
///
/// Every request goes through [`CredentialManager::ensure_valid_token`]
/// first, so no call is ever issued without a usable bearer token. HTTP and
/// network failures are wrapped as
/// [`PluginError::CatalogRequest`](crate::error::PluginError::CatalogRequest)
/// and never retried; the per-request timeout comes from the shared `reqwest`
/// client.
pub struct CatalogClient {
    http: Client,
    base_url: String,
    credentials: Arc<CredentialManager>,
    album_limit: u32,
    playlist_limit: u32,
    strict_playlist_limit: bool,
}

impl CatalogClient {
    pub fn new(options: &PluginOptions, http: Client, credentials: Arc<CredentialManager>) -> Self {
        CatalogClient {
            http,
            base_url: options.api_url.trim_end_matches('/').to_string(),
            credentials,
            album_limit: options.album_limit,
            playlist_limit: options.playlist_limit,
            strict_playlist_limit: options.strict_playlist_limit,
        }
    }

    /// Performs an authenticated GET and parses the JSON body as `T`.
    ///
    /// `endpoint` is either a path relative to the API base URL or an
    /// absolute URL, as pagination cursors are returned absolute by the API.
    pub async fn request<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let token = self.credentials.ensure_valid_token().await?;
        let url = if endpoint.starts_with("http") {
            endpoint.to_string()
        } else if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        };

        debug!(%url, "catalog request");
        let response = self
            .http
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, token)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<T>().await?)
    }

    /// Fetches a single track.
    pub async fn get_track(&self, id: &str) -> Result<CatalogTracks> {
        let track = self.fetch_track(id).await?;
        Ok(CatalogTracks {
            tracks: vec![track],
            name: None,
            thumbnail: None,
        })
    }

    async fn fetch_track(&self, id: &str) -> Result<UnresolvedTrack> {
        let track = self.request::<SpotifyTrack>(&format!("/tracks/{id}")).await?;
        Ok(UnresolvedTrack::from_spotify(&track))
    }

    /// Fetches all tracks of an album.
    ///
    /// The album listing only carries simplified track entries, so every item
    /// with a non-null id is expanded through a full track fetch. Expansions
    /// within one page run concurrently and are assembled in item order;
    /// pages themselves are fetched strictly sequentially because each `next`
    /// cursor comes from the previous page. Pagination stops after
    /// `album_limit` pages (`0` = unlimited).
    pub async fn get_album_tracks(&self, id: &str) -> Result<CatalogTracks> {
        let album = self.request::<SpotifyAlbum>(&format!("/albums/{id}")).await?;
        let mut tracks = self.expand_album_items(&album.tracks.items).await?;

        let mut next = album.tracks.next;
        let mut page = 1u32;
        while let Some(url) = next {
            if self.album_limit != 0 && page >= self.album_limit {
                break;
            }
            let chunk = self.request::<Page<AlbumItem>>(&url).await?;
            tracks.extend(self.expand_album_items(&chunk.items).await?);
            next = chunk.next;
            page += 1;
        }

        Ok(CatalogTracks {
            tracks,
            name: Some(album.name),
            thumbnail: None,
        })
    }

    async fn expand_album_items(&self, items: &[AlbumItem]) -> Result<Vec<UnresolvedTrack>> {
        let fetches = items
            .iter()
            .filter_map(|item| item.id.as_deref())
            .map(|id| self.fetch_track(id));
        // unordered completion, order-preserving assembly
        try_join_all(fetches).await
    }

    /// Fetches all tracks of a playlist.
    ///
    /// Playlist pages inline full track objects, so there is no per-track
    /// fan-out; null entries (deleted or local tracks) are dropped. The page
    /// cap defaults to `album_limit` for compatibility with the upstream
    /// implementation and switches to `playlist_limit` under
    /// `strict_playlist_limit`.
    pub async fn get_playlist_tracks(&self, id: &str) -> Result<CatalogTracks> {
        let playlist = self
            .request::<SpotifyPlaylist>(&format!("/playlists/{id}"))
            .await?;
        let mut tracks = collect_playlist_tracks(&playlist.tracks.items);

        let limit = self.playlist_page_limit();
        let mut next = playlist.tracks.next;
        let mut page = 1u32;
        while let Some(url) = next {
            if limit != 0 && page >= limit {
                break;
            }
            let chunk = self.request::<Page<PlaylistItem>>(&url).await?;
            tracks.extend(collect_playlist_tracks(&chunk.items));
            next = chunk.next;
            page += 1;
        }

        Ok(CatalogTracks {
            thumbnail: playlist.images.first().map(|image| image.url.clone()),
            name: Some(playlist.name),
            tracks,
        })
    }

    fn playlist_page_limit(&self) -> u32 {
        if self.strict_playlist_limit {
            self.playlist_limit
        } else {
            self.album_limit
        }
    }
}

fn collect_playlist_tracks(items: &[PlaylistItem]) -> Vec<UnresolvedTrack> {
    items
        .iter()
        .filter_map(|item| item.track.as_ref())
        .map(UnresolvedTrack::from_spotify)
        .collect()
}
