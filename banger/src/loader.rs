use banger_api::endpoints::spotify::{CurrentlyPlaying, Page, SearchResponse, SearchType, Track};
use banger_api::ApiError;
use banger_auth::{Backend, QueryCache, QueryKey};
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub const CURRENTLY_PLAYING_STALE: Duration = Duration::from_secs(20);
pub const TOP_TRACKS_STALE: Duration = Duration::from_secs(60 * 60);
pub const SEARCH_STALE: Duration = Duration::from_secs(5 * 60);

/// Where a query result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cache,
    Network,
}

/// Spotify queries with a cache-first strategy
#[derive(Clone)]
pub struct SpotifyLoader {
    backend: Arc<dyn Backend>,
    cache: Arc<QueryCache>,
}

impl SpotifyLoader {
    pub fn new(backend: Arc<dyn Backend>, cache: Arc<QueryCache>) -> Self {
        Self { backend, cache }
    }

    pub async fn currently_playing(
        &self,
        force_refresh: bool,
    ) -> Result<(CurrentlyPlaying, Source), ApiError> {
        let key = QueryKey::new(["spotify", "currently-playing"]);
        load_cached(&self.cache, key, CURRENTLY_PLAYING_STALE, force_refresh, || {
            self.backend.currently_playing()
        })
        .await
    }

    pub async fn top_tracks(
        &self,
        time_range: &str,
        limit: u32,
        force_refresh: bool,
    ) -> Result<(Page<Track>, Source), ApiError> {
        let key = QueryKey::new([
            "spotify".to_string(),
            "top-tracks".to_string(),
            time_range.to_string(),
            limit.to_string(),
        ]);
        load_cached(&self.cache, key, TOP_TRACKS_STALE, force_refresh, || {
            self.backend.top_tracks(time_range, limit)
        })
        .await
    }

    pub async fn search(
        &self,
        query: &str,
        kind: SearchType,
        force_refresh: bool,
    ) -> Result<(SearchResponse, Source), ApiError> {
        let key = QueryKey::new(["search", query, kind.as_str()]);
        load_cached(&self.cache, key, SEARCH_STALE, force_refresh, || {
            self.backend.search(query, kind)
        })
        .await
    }
}

/// Serve `key` from the cache while it is younger than `max_age`, otherwise
/// run `fetch` and cache what it returns. Cache failures only cost a refetch.
pub(crate) async fn load_cached<T, F, Fut>(
    cache: &QueryCache,
    key: QueryKey,
    max_age: Duration,
    force_refresh: bool,
    fetch: F,
) -> Result<(T, Source), ApiError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    // Step 1: Try cache first (fast path)
    if !force_refresh {
        match cache.get::<T>(&key, max_age).await {
            Ok(Some(cached)) => {
                tracing::debug!(key = ?key.segments(), "Loaded query from cache");
                return Ok((cached, Source::Cache));
            }
            Ok(None) => tracing::debug!(key = ?key.segments(), "No fresh cached query"),
            Err(e) => tracing::warn!(error = %e, "Failed to read query cache"),
        }
    }

    // Step 2: Load from the backend
    let value = fetch().await?;
    tracing::info!(key = ?key.segments(), "Loaded query from API");

    if let Err(e) = cache.set(&key, &value).await {
        tracing::warn!(error = %e, "Failed to cache query result");
    }

    Ok((value, Source::Network))
}
