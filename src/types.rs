use serde::{Deserialize, Serialize};

/// Artwork used when a Spotify track carries no album image.
pub const DEFAULT_TRACK_ARTWORK: &str =
    "https://m.media-amazon.com/images/I/61T60YWIp3L._SS500_.jpg";

/// Artwork used when neither Spotify nor the audio backend report one.
pub const FALLBACK_ARTWORK: &str =
    "https://upload.wikimedia.org/wikipedia/commons/3/3c/No-album-art.png";

// --- Spotify Web API shapes -------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTrack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub album: Option<AlbumRef>,
    #[serde(default)]
    pub external_ids: Option<ExternalIds>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyArtist {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalIds {
    #[serde(default)]
    pub isrc: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Image {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlbumRef {
    #[serde(default)]
    pub images: Vec<Image>,
}

/// One page of a paginated track listing. `next` carries the absolute URL of
/// the following page, or `None` on the last page.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyAlbum {
    pub name: String,
    pub tracks: Page<AlbumItem>,
}

/// Simplified track entry inside an album listing. Only the id matters; the
/// full track detail is fetched separately.
#[derive(Debug, Clone, Deserialize)]
pub struct AlbumItem {
    pub id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyPlaylist {
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
    pub tracks: Page<PlaylistItem>,
}

/// Playlist entry. The playlist API inlines full track objects; deleted or
/// local tracks come back as `null` and are filtered out.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItem {
    pub track: Option<SpotifyTrack>,
}

// --- Internal representation ------------------------------------------------

/// A Spotify track that has not yet been matched against the audio backend.
///
/// Immutable after creation; resolution produces a separate [`PlayableTrack`]
/// instead of mutating this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedTrack {
    pub identifier: String,
    pub title: String,
    pub author: String,
    pub uri: String,
    pub length: u64,
    pub thumbnail: String,
    pub isrc: Option<String>,
}

impl UnresolvedTrack {
    /// Maps a Spotify track object onto the internal representation, filling
    /// the author and thumbnail with defaults when the catalog omits them.
    pub fn from_spotify(track: &SpotifyTrack) -> Self {
        UnresolvedTrack {
            identifier: track.id.clone(),
            title: track.name.clone(),
            author: track
                .artists
                .first()
                .map(|artist| artist.name.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            uri: track.external_urls.spotify.clone().unwrap_or_default(),
            length: track.duration_ms,
            thumbnail: track
                .album
                .as_ref()
                .and_then(|album| album.images.first())
                .map(|image| image.url.clone())
                .unwrap_or_else(|| DEFAULT_TRACK_ARTWORK.to_string()),
            isrc: track.external_ids.as_ref().and_then(|ids| ids.isrc.clone()),
        }
    }
}

// --- Audio backend shapes ---------------------------------------------------

/// A playable handle as returned by the audio search backend: the opaque
/// encoded track blob plus its metadata. Treated as immutable once the
/// matcher returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayableTrack {
    pub track: String,
    pub info: TrackInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInfo {
    pub identifier: String,
    pub is_seekable: bool,
    pub author: String,
    pub length: u64,
    pub is_stream: bool,
    #[serde(default)]
    pub position: u64,
    pub title: String,
    pub uri: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadType {
    #[serde(rename = "TRACK_LOADED")]
    TrackLoaded,
    #[serde(rename = "PLAYLIST_LOADED")]
    PlaylistLoaded,
    #[serde(rename = "SEARCH_RESULT")]
    SearchResult,
    #[serde(rename = "NO_MATCHES")]
    NoMatches,
    #[serde(rename = "LOAD_FAILED")]
    LoadFailed,
}

/// Response of the backend `/loadtracks` endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadTracksResponse {
    pub load_type: LoadType,
    #[serde(default = "Vec::new")]
    pub tracks: Vec<PlayableTrack>,
    #[serde(default)]
    pub exception: Option<BackendException>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendException {
    pub message: Option<String>,
    pub severity: Option<String>,
}

// --- Host-facing contract ---------------------------------------------------

/// Connection details of one backend node as reported by the host
/// orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeOptions {
    pub host: String,
    pub port: u16,
    pub secure: bool,
    pub password: Option<String>,
    pub connected: bool,
}

/// The result contract returned to the host orchestrator for every search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub load_type: LoadType,
    pub tracks: Vec<PlayableTrack>,
    pub playlist: Option<PlaylistInfo>,
    pub exception: Option<SearchException>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaylistInfo {
    pub name: String,
    pub duration: u64,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchException {
    pub message: Option<String>,
    pub severity: String,
}

/// A search request as the host orchestrator hands it in: either a plain
/// string or a structured query carrying an optional source hint.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub query: String,
    pub source: Option<String>,
}

impl From<&str> for SearchQuery {
    fn from(query: &str) -> Self {
        SearchQuery {
            query: query.to_string(),
            source: None,
        }
    }
}

impl From<String> for SearchQuery {
    fn from(query: String) -> Self {
        SearchQuery {
            query,
            source: None,
        }
    }
}
