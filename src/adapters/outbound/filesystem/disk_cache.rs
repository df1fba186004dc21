use crate::ports::outbound::FetchedJson;
use crate::shared::ScanError;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default cache directory, relative to the working directory
pub const DEFAULT_CACHE_DIR: &str = "download-cache";

/// DiskCache stores raw JSON responses under a digest of a logical key.
///
/// Keys come from [`DiskCache::detail_key`] and [`DiskCache::output_key`],
/// which live in separate namespaces so a key never names two kinds of
/// payload. Console output URLs are signed and change on every request, so
/// their key is built from the parameters that produced the URL instead.
///
/// Entries are written once, after a fetch and its decode both succeeded, and
/// are never evicted here.
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
    enabled: bool,
}

impl DiskCache {
    pub fn new(dir: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            dir: dir.into(),
            enabled,
        }
    }

    /// Cache key for a build's detail document
    pub fn detail_key(detail_url: &str) -> String {
        format!("detail:{}", detail_url)
    }

    /// Cache key for the console output of a build step
    pub fn output_key(detail_url: &str, step_name: &str) -> String {
        format!("output:{}\u{0}{}", detail_url, step_name)
    }

    /// Hex SHA-256 of the cache key
    pub fn digest(cache_key: &str) -> String {
        hex::encode(Sha256::digest(cache_key.as_bytes()))
    }

    pub fn path_for(&self, cache_key: &str) -> PathBuf {
        self.dir.join(Self::digest(cache_key))
    }

    /// Returns the decoded cached value, or fetches, decodes and caches it.
    ///
    /// `fetch` is only awaited on a miss. When caching is disabled every call
    /// goes to the network and nothing is written.
    ///
    /// # Errors
    /// Fails if the fetch fails or `decode` rejects the fetched payload; in
    /// both cases nothing is written. Unreadable cache files, and cached
    /// payloads `decode` rejects, are treated as misses.
    pub async fn fetch_or_compute<T, Fut, D>(
        &self,
        cache_key: &str,
        fetch: Fut,
        decode: D,
    ) -> Result<T, ScanError>
    where
        Fut: Future<Output = Result<FetchedJson, ScanError>>,
        D: Fn(&Value) -> Result<T, ScanError>,
    {
        let path = self.path_for(cache_key);

        if self.enabled {
            match self.read_cached(&path) {
                Ok(Some(value)) => match decode(&value) {
                    Ok(result) => {
                        debug!("Cache hit for {} ({})", cache_key, path.display());
                        return Ok(result);
                    }
                    Err(e) => warn!(
                        "Cached entry {} for {} does not decode: {}; treating as cache miss",
                        path.display(),
                        cache_key,
                        e
                    ),
                },
                Ok(None) => {}
                Err(e) => warn!("{}; treating as cache miss", e),
            }
        }

        let fetched = fetch.await?;
        let result = decode(&fetched.value)?;

        if self.enabled {
            if let Err(e) = self.write(&path, &fetched.body) {
                warn!("Failed to write cache file {}: {}", path.display(), e);
            }
        }

        Ok(result)
    }

    fn read_cached(&self, path: &Path) -> Result<Option<Value>, ScanError> {
        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(cache_read_error(path, e)),
        };

        if !metadata.is_file() {
            return Err(cache_read_error(path, "not a regular file"));
        }

        let content = fs::read_to_string(path).map_err(|e| cache_read_error(path, e))?;
        let value = serde_json::from_str(&content).map_err(|e| cache_read_error(path, e))?;
        Ok(Some(value))
    }

    fn write(&self, path: &Path, body: &str) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(path, body)
    }
}

fn cache_read_error(path: &Path, details: impl std::fmt::Display) -> ScanError {
    ScanError::CacheRead {
        path: path.to_path_buf(),
        details: details.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::HttpReply;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Counts how many times the network path actually runs
    struct CountingFetch {
        calls: AtomicUsize,
        body: &'static str,
    }

    impl CountingFetch {
        fn new(body: &'static str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                body,
            }
        }

        async fn fetch(&self) -> Result<FetchedJson, ScanError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            HttpReply::new(200, self.body).into_json("fetch failed")
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn first_message(value: &Value) -> Result<String, ScanError> {
        Ok(value[0]["message"].as_str().unwrap_or_default().to_string())
    }

    #[tokio::test]
    async fn test_second_fetch_is_served_from_disk() {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::new(dir.path().join("cache"), true);
        let remote = CountingFetch::new(r#"[{"message": "log text"}]"#);

        let first = cache
            .fetch_or_compute("build/1Run tests", remote.fetch(), first_message)
            .await
            .unwrap();
        let second = cache
            .fetch_or_compute("build/1Run tests", remote.fetch(), first_message)
            .await
            .unwrap();

        assert_eq!(first, "log text");
        assert_eq!(second, "log text");
        assert_eq!(remote.calls(), 1);
    }

    #[tokio::test]
    async fn test_disabled_cache_always_fetches() {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::new(dir.path(), false);
        let remote = CountingFetch::new(r#"[{"message": "x"}]"#);

        cache
            .fetch_or_compute("key", remote.fetch(), first_message)
            .await
            .unwrap();
        cache
            .fetch_or_compute("key", remote.fetch(), first_message)
            .await
            .unwrap();

        assert_eq!(remote.calls(), 2);
        assert!(!cache.path_for("key").exists());
    }

    #[tokio::test]
    async fn test_raw_body_written_under_key_digest() {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::new(dir.path().join("nested"), true);
        let body = r#"[{"message": "raw"}]"#;
        let remote = CountingFetch::new(body);

        cache
            .fetch_or_compute("some-key", remote.fetch(), first_message)
            .await
            .unwrap();

        let path = dir.path().join("nested").join(DiskCache::digest("some-key"));
        assert_eq!(fs::read_to_string(path).unwrap(), body);
    }

    #[tokio::test]
    async fn test_failed_fetch_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::new(dir.path(), true);

        let result = cache
            .fetch_or_compute(
                "key",
                async { HttpReply::new(500, "{}").into_json("Console output fetch failed") },
                first_message,
            )
            .await;

        assert!(matches!(result, Err(ScanError::FetchFailure { .. })));
        assert!(!cache.path_for("key").exists());
    }

    #[tokio::test]
    async fn test_failed_decode_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::new(dir.path(), true);
        let remote = CountingFetch::new(r#"{"unexpected": true}"#);

        let result: Result<(), ScanError> = cache
            .fetch_or_compute("key", remote.fetch(), |_| {
                Err(ScanError::MalformedResponse {
                    context: "test".to_string(),
                    details: "not an array".to_string(),
                })
            })
            .await;

        assert!(result.is_err());
        assert!(!cache.path_for("key").exists());
    }

    #[tokio::test]
    async fn test_corrupt_cache_file_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::new(dir.path(), true);
        fs::write(cache.path_for("key"), "{ truncated").unwrap();
        let remote = CountingFetch::new(r#"[{"message": "fresh"}]"#);

        let value = cache
            .fetch_or_compute("key", remote.fetch(), first_message)
            .await
            .unwrap();

        assert_eq!(value, "fresh");
        assert_eq!(remote.calls(), 1);
        assert_eq!(
            fs::read_to_string(cache.path_for("key")).unwrap(),
            r#"[{"message": "fresh"}]"#
        );
    }

    #[tokio::test]
    async fn test_undecodable_cached_entry_is_refetched_and_replaced() {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::new(dir.path(), true);
        // Valid JSON, but not the shape this caller expects
        fs::write(cache.path_for("key"), r#"{"steps": []}"#).unwrap();
        let remote = CountingFetch::new(r#"[{"message": "fresh"}]"#);
        let as_array = |value: &Value| {
            value
                .as_array()
                .map(|a| a.len())
                .ok_or_else(|| ScanError::MalformedResponse {
                    context: "test".to_string(),
                    details: "not an array".to_string(),
                })
        };

        let first = cache
            .fetch_or_compute("key", remote.fetch(), as_array)
            .await
            .unwrap();
        let second = cache
            .fetch_or_compute("key", remote.fetch(), as_array)
            .await
            .unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 1);
        assert_eq!(remote.calls(), 1);
    }

    #[test]
    fn test_detail_and_output_keys_never_collide() {
        let api = "https://circleci.example/api/v1.1/project/github/acme/widgets";
        let detail_12 = DiskCache::detail_key(&format!("{}/12", api));
        let build_1 = format!("{}/1", api);

        assert_ne!(DiskCache::output_key(&build_1, "2"), detail_12);
        assert_ne!(
            DiskCache::output_key(&build_1, ""),
            DiskCache::detail_key(&build_1)
        );
        assert_ne!(
            DiskCache::output_key(&build_1, "2"),
            DiskCache::output_key(&format!("{}/12", api), "")
        );
    }

    #[test]
    fn test_digest_is_stable_and_key_specific() {
        assert_eq!(DiskCache::digest("a"), DiskCache::digest("a"));
        assert_ne!(DiskCache::digest("a"), DiskCache::digest("b"));
        assert_eq!(DiskCache::digest("a").len(), 64);
    }
}
