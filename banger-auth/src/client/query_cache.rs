use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

#[derive(Debug)]
pub enum CacheError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
    NoCacheDir,
}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::Io(e) => write!(f, "IO error: {}", e),
            CacheError::Serialization(e) => write!(f, "Serialization error: {}", e),
            CacheError::NoCacheDir => f.write_str("Could not find cache directory"),
        }
    }
}

impl std::error::Error for CacheError {}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::Io(err)
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err)
    }
}

/// Identifies a cached query, e.g. `["spotify", "currently-playing"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &[&str]) -> bool {
        prefix.len() <= self.0.len() && self.0.iter().zip(prefix).all(|(a, b)| a == b)
    }

    fn file_name(&self) -> String {
        let stem = self
            .0
            .iter()
            .map(|segment| {
                segment
                    .chars()
                    .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join(".");
        format!("{}.json", stem)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedQuery {
    key: QueryKey,
    cached_at: i64, // Unix timestamp
    value: Value,
}

/// File-backed store for query results, one JSON file per key.
#[derive(Debug, Clone)]
pub struct QueryCache {
    cache_dir: PathBuf,
}

impl QueryCache {
    /// Open the cache under the user's cache directory.
    pub async fn open_default() -> Result<Self, CacheError> {
        let cache_dir = dirs::cache_dir()
            .ok_or(CacheError::NoCacheDir)?
            .join("banger")
            .join("queries");
        Self::new(cache_dir).await
    }

    pub async fn new(cache_dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let cache_dir = cache_dir.into();
        fs::create_dir_all(&cache_dir).await?;

        Ok(Self { cache_dir })
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Cached value for `key` if it is younger than `max_age`.
    pub async fn get<T>(&self, key: &QueryKey, max_age: Duration) -> Result<Option<T>, CacheError>
    where
        T: DeserializeOwned,
    {
        let path = self.cache_dir.join(key.file_name());
        if !fs::try_exists(&path).await? {
            return Ok(None);
        }

        let data = fs::read_to_string(&path).await?;
        let cached: CachedQuery = serde_json::from_str(&data)?;

        // Distinct keys can sanitize to the same file name
        if &cached.key != key {
            return Ok(None);
        }

        let age = chrono::Utc::now().timestamp() - cached.cached_at;
        if age < 0 || age as u64 >= max_age.as_secs() {
            tracing::debug!(key = ?key.segments(), age, "Cached query is stale");
            return Ok(None);
        }

        Ok(Some(serde_json::from_value(cached.value)?))
    }

    pub async fn set<T>(&self, key: &QueryKey, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let cached = CachedQuery {
            key: key.clone(),
            cached_at: chrono::Utc::now().timestamp(),
            value: serde_json::to_value(value)?,
        };

        let path = self.cache_dir.join(key.file_name());
        let json = serde_json::to_string_pretty(&cached)?;
        fs::write(&path, json).await?;
        Ok(())
    }

    /// Remove every entry whose key starts with `prefix`. Returns how many were removed.
    pub async fn invalidate(&self, prefix: &[&str]) -> Result<usize, CacheError> {
        let mut removed = 0;
        let mut entries = fs::read_dir(&self.cache_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let matches = match fs::read_to_string(&path).await {
                Ok(data) => serde_json::from_str::<CachedQuery>(&data)
                    .map(|cached| cached.key.starts_with(prefix))
                    // Unreadable entries can't be attributed to a key, drop them too
                    .unwrap_or(true),
                Err(_) => true,
            };

            if matches {
                fs::remove_file(&path).await?;
                removed += 1;
            }
        }

        tracing::debug!(?prefix, removed, "Invalidated cached queries");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn test_key_prefix_matching() {
        let key = QueryKey::new(["spotify", "top-tracks", "medium_term", "20"]);

        assert!(key.starts_with(&["spotify"]));
        assert!(key.starts_with(&["spotify", "top-tracks"]));
        assert!(key.starts_with(&[]));
        assert!(!key.starts_with(&["search"]));
        assert!(!key.starts_with(&["spotify", "top-tracks", "medium_term", "20", "x"]));
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let cache = QueryCache::new(dir.path()).await.unwrap();
        let key = QueryKey::new(["search", "aphex twin", "track"]);

        cache.set(&key, &vec!["windowlicker"]).await.unwrap();
        let hit: Option<Vec<String>> = cache.get(&key, HOUR).await.unwrap();

        assert_eq!(hit, Some(vec!["windowlicker".to_string()]));
    }

    #[tokio::test]
    async fn test_zero_max_age_is_always_stale() {
        let dir = tempfile::tempdir().unwrap();
        let cache = QueryCache::new(dir.path()).await.unwrap();
        let key = QueryKey::new(["spotify", "currently-playing"]);

        cache.set(&key, &1).await.unwrap();
        let hit: Option<i32> = cache.get(&key, Duration::ZERO).await.unwrap();

        assert_eq!(hit, None);
    }

    #[tokio::test]
    async fn test_colliding_file_names_do_not_leak() {
        let dir = tempfile::tempdir().unwrap();
        let cache = QueryCache::new(dir.path()).await.unwrap();
        let stored = QueryKey::new(["search", "a b"]);
        let other = QueryKey::new(["search", "a_b"]);

        cache.set(&stored, &"first").await.unwrap();
        let hit: Option<String> = cache.get(&other, HOUR).await.unwrap();

        assert_eq!(hit, None);
    }

    #[tokio::test]
    async fn test_invalidate_by_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let cache = QueryCache::new(dir.path()).await.unwrap();
        let playing = QueryKey::new(["spotify", "currently-playing"]);
        let top = QueryKey::new(["spotify", "top-tracks", "short_term", "10"]);
        let search = QueryKey::new(["search", "burial", "track"]);

        for key in [&playing, &top, &search] {
            cache.set(key, &true).await.unwrap();
        }

        let removed = cache.invalidate(&["spotify"]).await.unwrap();

        assert_eq!(removed, 2);
        assert_eq!(cache.get::<bool>(&playing, HOUR).await.unwrap(), None);
        assert_eq!(cache.get::<bool>(&top, HOUR).await.unwrap(), None);
        assert_eq!(cache.get::<bool>(&search, HOUR).await.unwrap(), Some(true));
    }
}
