//! Spotify reference detection and conversion into search outcomes.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    catalog::{CatalogClient, CatalogTracks},
    error::Result,
    types::{LoadType, PlayableTrack, PlaylistInfo, SearchException, SearchOutcome},
};

/// Matches `https://open.spotify.com/...` URLs and `spotify:` URIs pointing
/// at a track, playlist or album, capturing the entity type and id. The
/// optional middle segment absorbs anything between the prefix and the
/// entity type, so locale prefixes such as `/intl-de/` still match.
static SPOTIFY_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:https://open\.spotify\.com/|spotify:)(?:.+)?(track|playlist|album)[/:]([A-Za-z0-9]+)")
        .expect("spotify reference pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpotifyKind {
    Track,
    Album,
    Playlist,
}

/// A parsed Spotify reference: which catalog entity the query points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyReference {
    pub kind: SpotifyKind,
    pub id: String,
}

/// Parses a query string into a Spotify reference. `None` means the query is
/// not a Spotify reference and the caller must fall through to the host's
/// native search.
pub fn parse_reference(query: &str) -> Option<SpotifyReference> {
    let captures = SPOTIFY_REFERENCE.captures(query)?;
    let kind = match captures.get(1)?.as_str() {
        "track" => SpotifyKind::Track,
        "album" => SpotifyKind::Album,
        "playlist" => SpotifyKind::Playlist,
        _ => return None,
    };
    Some(SpotifyReference {
        kind,
        id: captures.get(2)?.as_str().to_string(),
    })
}

/// Load type reported to the host for a given entity kind. Albums load as
/// playlists; only a plain track reference produces a track-loaded outcome.
pub fn load_type_for(kind: SpotifyKind) -> LoadType {
    match kind {
        SpotifyKind::Track => LoadType::TrackLoaded,
        SpotifyKind::Album | SpotifyKind::Playlist => LoadType::PlaylistLoaded,
    }
}

/// Dispatches a parsed reference to the matching catalog operation.
pub struct EntityResolver {
    catalog: CatalogClient,
}

impl EntityResolver {
    pub fn new(catalog: CatalogClient) -> Self {
        EntityResolver { catalog }
    }

    pub async fn fetch(&self, reference: &SpotifyReference) -> Result<CatalogTracks> {
        match reference.kind {
            SpotifyKind::Track => self.catalog.get_track(&reference.id).await,
            SpotifyKind::Album => self.catalog.get_album_tracks(&reference.id).await,
            SpotifyKind::Playlist => self.catalog.get_playlist_tracks(&reference.id).await,
        }
    }
}

/// Builds the outcome returned to the host orchestrator.
///
/// This is the single canonical result builder: an aggregate name yields a
/// playlist block whose duration is the sum of the track lengths, an error
/// yields an exception block. A load-failed outcome is expected to arrive
/// here with an empty track list.
pub fn build_outcome(
    load_type: LoadType,
    tracks: Vec<PlayableTrack>,
    error: Option<String>,
    name: Option<String>,
    thumbnail: Option<String>,
) -> SearchOutcome {
    let playlist = name.map(|name| PlaylistInfo {
        name,
        duration: tracks.iter().map(|track| track.info.length).sum(),
        thumbnail,
    });

    SearchOutcome {
        load_type,
        playlist,
        exception: error.map(|message| SearchException {
            message: Some(message),
            severity: "COMMON".to_string(),
        }),
        tracks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TrackInfo;

    fn playable(length: u64) -> PlayableTrack {
        PlayableTrack {
            track: "encoded".to_string(),
            info: TrackInfo {
                identifier: "yt".to_string(),
                is_seekable: true,
                author: "someone".to_string(),
                length,
                is_stream: false,
                position: 0,
                title: "something".to_string(),
                uri: "https://youtu.be/yt".to_string(),
                thumbnail: None,
            },
        }
    }

    #[test]
    fn parses_open_spotify_track_url() {
        let reference =
            parse_reference("https://open.spotify.com/track/11dFghVXANMlKmJXsNCbNl").unwrap();
        assert_eq!(reference.kind, SpotifyKind::Track);
        assert_eq!(reference.id, "11dFghVXANMlKmJXsNCbNl");
    }

    #[test]
    fn parses_spotify_uri_album() {
        let reference = parse_reference("spotify:album:xyz789").unwrap();
        assert_eq!(reference.kind, SpotifyKind::Album);
        assert_eq!(reference.id, "xyz789");
    }

    #[test]
    fn parses_url_with_locale_prefix_and_query_string() {
        let reference =
            parse_reference("https://open.spotify.com/intl-de/playlist/37i9dQZF1DXcBWIGoYBM5M?si=abc-def")
                .unwrap();
        assert_eq!(reference.kind, SpotifyKind::Playlist);
        // the id capture stops at the query string
        assert_eq!(reference.id, "37i9dQZF1DXcBWIGoYBM5M");
    }

    #[test]
    fn rejects_non_spotify_queries() {
        assert_eq!(parse_reference("lofi beats"), None);
        assert_eq!(parse_reference("https://youtu.be/dQw4w9WgXcQ"), None);
        assert_eq!(parse_reference("https://open.spotify.com/artist/abc123"), None);
    }

    #[test]
    fn track_loads_as_track_everything_else_as_playlist() {
        assert_eq!(load_type_for(SpotifyKind::Track), LoadType::TrackLoaded);
        assert_eq!(load_type_for(SpotifyKind::Album), LoadType::PlaylistLoaded);
        assert_eq!(load_type_for(SpotifyKind::Playlist), LoadType::PlaylistLoaded);
    }

    #[test]
    fn outcome_with_name_sums_track_durations() {
        let outcome = build_outcome(
            LoadType::PlaylistLoaded,
            vec![playable(120_000), playable(80_000)],
            None,
            Some("My Mix".to_string()),
            Some("https://images.example/cover.png".to_string()),
        );

        let playlist = outcome.playlist.unwrap();
        assert_eq!(playlist.name, "My Mix");
        assert_eq!(playlist.duration, 200_000);
        assert_eq!(
            playlist.thumbnail.as_deref(),
            Some("https://images.example/cover.png")
        );
        assert!(outcome.exception.is_none());
    }

    #[test]
    fn failed_outcome_carries_error_and_no_tracks() {
        let outcome = build_outcome(
            LoadType::LoadFailed,
            Vec::new(),
            Some("boom".to_string()),
            None,
            None,
        );

        assert_eq!(outcome.load_type, LoadType::LoadFailed);
        assert!(outcome.tracks.is_empty());
        assert!(outcome.playlist.is_none());
        let exception = outcome.exception.unwrap();
        assert_eq!(exception.message.as_deref(), Some("boom"));
        assert_eq!(exception.severity, "COMMON");
    }
}
