//! The plugin surface installed into a host orchestrator.
//!
//! Instead of replacing a live function reference on the host, the plugin
//! exposes a capability the embedding layer composes in front of its native
//! search: [`SpotifyPlugin::search`] routes Spotify references through the
//! resolution pipeline and delegates everything else unchanged, and
//! [`SpotifyPlugin::resolve_if_applicable`] is the bare capability for hosts
//! that wire the fallthrough themselves.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Client;
use tokio::{sync::RwLock, task::JoinHandle};
use tracing::warn;

use crate::{
    auth::CredentialManager,
    catalog::CatalogClient,
    config::{PluginOptions, TrackFailureMode},
    error::{PluginError, Result},
    matcher::AudioMatcher,
    resolver::{self, EntityResolver, SpotifyReference, build_outcome},
    types::{LoadType, NodeOptions, SearchOutcome, SearchQuery},
};

/// Handle to the host orchestrator: the node pool the matcher queries and
/// the native search the plugin falls through to. The host implements this
/// once and passes it to [`SpotifyPlugin::install`].
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Current backend nodes, connected or not.
    fn nodes(&self) -> Vec<NodeOptions>;

    /// The host's native search, used verbatim for non-Spotify queries.
    async fn search(&self, query: &SearchQuery) -> SearchOutcome;
}

/// Resolves Spotify URLs into playable audio entries by re-mapping them onto
/// the host's audio search backend.
///
/// # Lifecycle
///
/// 1. [`SpotifyPlugin::new`] validates the options synchronously and fails
///    construction on bad input.
/// 2. [`SpotifyPlugin::install`] captures the orchestrator handle and starts
///    the background token renewal.
/// 3. [`SpotifyPlugin::search`] serves queries.
/// 4. [`SpotifyPlugin::shutdown`] cancels the pending renewal; dropping the
///    plugin does the same.
pub struct SpotifyPlugin {
    options: PluginOptions,
    credentials: Arc<CredentialManager>,
    resolver: EntityResolver,
    matcher: AudioMatcher,
    manager: RwLock<Option<Arc<dyn Orchestrator>>>,
    renewal: Mutex<Option<JoinHandle<()>>>,
}

impl SpotifyPlugin {
    /// Creates a plugin from validated options.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::ConfigValidation`] when a required option is
    /// missing or invalid; the message names the offending field.
    pub fn new(options: PluginOptions) -> Result<Self> {
        options.validate()?;

        let http = Client::builder()
            .timeout(options.request_timeout)
            .build()
            .map_err(|e| {
                PluginError::ConfigValidation(format!("failed to build HTTP client: {e}"))
            })?;

        let credentials = Arc::new(CredentialManager::new(&options, http.clone()));
        let catalog = CatalogClient::new(&options, http.clone(), Arc::clone(&credentials));

        Ok(SpotifyPlugin {
            resolver: EntityResolver::new(catalog),
            matcher: AudioMatcher::new(http),
            credentials,
            manager: RwLock::new(None),
            renewal: Mutex::new(None),
            options,
        })
    }

    /// Installs the plugin into the host orchestrator and starts the
    /// background token renewal. Installing again replaces the handle and
    /// restarts the renewal task.
    pub async fn install(&self, manager: Arc<dyn Orchestrator>) {
        {
            let mut slot = self.manager.write().await;
            *slot = Some(manager);
        }
        let handle = Arc::clone(&self.credentials).spawn_auto_renew();
        if let Ok(mut slot) = self.renewal.lock() {
            if let Some(previous) = slot.replace(handle) {
                previous.abort();
            }
        }
    }

    /// Cancels the pending token renewal. Safe to call more than once.
    pub fn shutdown(&self) {
        if let Ok(mut slot) = self.renewal.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }

    /// Serves one search call from the host.
    ///
    /// Spotify references are resolved through the catalog and the audio
    /// backend; every other query is delegated unchanged to the native
    /// search, preserving its arguments and return shape.
    pub async fn search(&self, query: impl Into<SearchQuery>) -> SearchOutcome {
        let query = query.into();
        if let Some(outcome) = self.resolve_if_applicable(&query.query).await {
            return outcome;
        }

        let manager = self.manager.read().await.clone();
        match manager {
            Some(manager) => manager.search(&query).await,
            None => build_outcome(
                LoadType::LoadFailed,
                Vec::new(),
                Some(PluginError::NoManager.to_string()),
                None,
                None,
            ),
        }
    }

    /// The core capability: `None` when the query is not a Spotify
    /// reference (the caller falls through to its native search), otherwise
    /// the fully assembled outcome. Errors never escape this boundary; they
    /// become load-failed outcomes carrying the error message.
    pub async fn resolve_if_applicable(&self, query: &str) -> Option<SearchOutcome> {
        let reference = resolver::parse_reference(query)?;
        Some(self.load_reference(&reference).await)
    }

    async fn load_reference(&self, reference: &SpotifyReference) -> SearchOutcome {
        match self.try_load(reference).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "failed to load Spotify reference");
                build_outcome(
                    LoadType::LoadFailed,
                    Vec::new(),
                    Some(err.to_string()),
                    None,
                    None,
                )
            }
        }
    }

    async fn try_load(&self, reference: &SpotifyReference) -> Result<SearchOutcome> {
        let node = self.connected_node().await?;
        let fetched = self.resolver.fetch(reference).await?;

        // eager, parallel, order-preserving resolution
        let results = futures::future::join_all(
            fetched
                .tracks
                .iter()
                .map(|track| self.matcher.resolve(track, &node)),
        )
        .await;

        let mut resolved = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(Some(track)) => resolved.push(track),
                Ok(None) => {}
                Err(err) => match self.options.track_failure_mode {
                    TrackFailureMode::Skip => {
                        warn!(error = %err, "skipping track that failed to resolve");
                    }
                    TrackFailureMode::Abort => return Err(err),
                },
            }
        }

        Ok(build_outcome(
            resolver::load_type_for(reference.kind),
            resolved,
            None,
            fetched.name,
            fetched.thumbnail,
        ))
    }

    async fn connected_node(&self) -> Result<NodeOptions> {
        let manager = self.manager.read().await.clone().ok_or(PluginError::NoManager)?;
        manager
            .nodes()
            .into_iter()
            .find(|node| node.connected)
            .ok_or(PluginError::NoAvailableNode)
    }
}

impl Drop for SpotifyPlugin {
    fn drop(&mut self) {
        self.shutdown();
    }
}
