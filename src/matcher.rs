//! Matching of unresolved Spotify tracks against the audio search backend.

use reqwest::Client;
use tracing::debug;

use crate::{
    error::{PluginError, Result},
    types::{FALLBACK_ARTWORK, LoadTracksResponse, NodeOptions, PlayableTrack, UnresolvedTrack},
};

/// Password assumed when the node reports none.
const DEFAULT_NODE_PASSWORD: &str = "youshallnotpass";

/// Queries a backend node's `/loadtracks` endpoint to find a playable handle
/// for an unresolved Spotify track.
///
/// The search is two-staged: an ISRC-anchored term first where an ISRC is
/// known, then one plain-text retry. The first result always wins; no
/// ranking happens beyond what the backend search already returns.
pub struct AudioMatcher {
    http: Client,
}

impl AudioMatcher {
    pub fn new(http: Client) -> Self {
        AudioMatcher { http }
    }

    /// Search identifier for the first attempt. The quoted ISRC anchors the
    /// search on the recording code when one is known.
    fn search_identifier(track: &UnresolvedTrack) -> String {
        match &track.isrc {
            Some(isrc) => format!("ytsearch:\"{isrc}\""),
            None => format!("ytsearch:{} - {} audio", track.title, track.author),
        }
    }

    /// Plain-text identifier for the retry after an empty first attempt.
    fn fallback_identifier(track: &UnresolvedTrack) -> String {
        format!("ytsearch:{} {} audio", track.title, track.author)
    }

    /// Resolves one track against the given node.
    ///
    /// Returns `Ok(None)` when both attempts come back empty. A hit on the
    /// first attempt gets the Spotify metadata merged in; a hit on the
    /// fallback attempt is returned as the backend reported it, without the
    /// merge. That asymmetry matches the upstream behavior.
    pub async fn resolve(
        &self,
        track: &UnresolvedTrack,
        node: &NodeOptions,
    ) -> Result<Option<PlayableTrack>> {
        let first = self
            .load_tracks(node, &Self::search_identifier(track))
            .await?;

        let Some(mut matched) = first.tracks.into_iter().next() else {
            let retry = self
                .load_tracks(node, &Self::fallback_identifier(track))
                .await?;
            return Ok(retry.tracks.into_iter().next());
        };

        merge_metadata(&mut matched, track);
        Ok(Some(matched))
    }

    async fn load_tracks(&self, node: &NodeOptions, identifier: &str) -> Result<LoadTracksResponse> {
        let scheme = if node.secure { "https" } else { "http" };
        let url = format!(
            "{scheme}://{host}:{port}/loadtracks?identifier={identifier}",
            host = node.host,
            port = node.port,
            identifier = urlencoding::encode(identifier),
        );

        debug!(%identifier, "querying audio backend");
        let response = self
            .http
            .get(&url)
            .header(
                reqwest::header::AUTHORIZATION,
                node.password.as_deref().unwrap_or(DEFAULT_NODE_PASSWORD),
            )
            .send()
            .await
            .map_err(PluginError::NodeRequest)?
            .error_for_status()
            .map_err(PluginError::NodeRequest)?;

        response.json().await.map_err(PluginError::NodeRequest)
    }
}

/// Overlays Spotify-sourced metadata onto a backend result: title, author
/// and URI prefer the Spotify value when non-empty; the thumbnail falls back
/// from Spotify to the backend to a placeholder; the length prefers the
/// backend's measurement, keeping Spotify's only when the backend reports
/// zero.
fn merge_metadata(matched: &mut PlayableTrack, source: &UnresolvedTrack) {
    let info = &mut matched.info;
    if !source.title.is_empty() {
        info.title = source.title.clone();
    }
    if !source.author.is_empty() {
        info.author = source.author.clone();
    }
    if !source.uri.is_empty() {
        info.uri = source.uri.clone();
    }
    info.thumbnail = if !source.thumbnail.is_empty() {
        Some(source.thumbnail.clone())
    } else {
        info.thumbnail
            .take()
            .filter(|thumbnail| !thumbnail.is_empty())
            .or_else(|| Some(FALLBACK_ARTWORK.to_string()))
    };
    if info.length == 0 {
        info.length = source.length;
    }
}
