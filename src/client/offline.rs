use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use super::lock;

pub const OFFLINE_PATH: &str = "/offline.html";

/// Page shown when a navigation fails at the network layer.
pub const OFFLINE_PAGE: &str = r#"<!DOCTYPE html>
<html lang="ja">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Offline</title>
</head>
<body>
<main>
<h1>オフラインです</h1>
<p>ネットワークに接続されていません。接続を確認してから再読み込みしてください。</p>
</main>
</body>
</html>
"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPage {
    pub content_type: String,
    pub body: String,
}

impl CachedPage {
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            content_type: "text/html; charset=utf-8".to_string(),
            body: body.into(),
        }
    }
}

/// Named page caches that outlive any single fallback version.
#[derive(Default)]
pub struct CacheStorage {
    caches: Mutex<HashMap<String, HashMap<String, CachedPage>>>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, cache: &str, path: &str, page: CachedPage) {
        lock(&self.caches)
            .entry(cache.to_string())
            .or_default()
            .insert(path.to_string(), page);
    }

    pub fn get(&self, cache: &str, path: &str) -> Option<CachedPage> {
        lock(&self.caches).get(cache).and_then(|pages| pages.get(path)).cloned()
    }

    pub fn delete(&self, cache: &str) -> bool {
        lock(&self.caches).remove(cache).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = lock(&self.caches).keys().cloned().collect();
        names.sort();
        names
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Navigation<T> {
    Network(T),
    Fallback(CachedPage),
    /// Network failed and nothing was installed.
    Unavailable,
}

/// Versioned offline fallback: install stores the page under this version's
/// cache, activate purges caches of earlier versions, and navigations that
/// fail at the network layer are answered from the cache.
pub struct OfflineFallback {
    cache_name: String,
}

impl OfflineFallback {
    pub const CACHE_PREFIX: &'static str = "genba-offline-";

    pub fn new(version: &str) -> Self {
        Self {
            cache_name: format!("{}{}", Self::CACHE_PREFIX, version),
        }
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    pub fn install(&self, storage: &CacheStorage, page: CachedPage) {
        storage.put(&self.cache_name, OFFLINE_PATH, page);
    }

    /// Returns the names of the purged caches.
    pub fn activate(&self, storage: &CacheStorage) -> Vec<String> {
        let stale: Vec<String> = storage
            .names()
            .into_iter()
            .filter(|name| name.starts_with(Self::CACHE_PREFIX) && *name != self.cache_name)
            .collect();
        for name in &stale {
            storage.delete(name);
        }
        if !stale.is_empty() {
            tracing::debug!("Purged offline caches: {:?}", stale);
        }
        stale
    }

    pub async fn navigate<T, E, F>(&self, storage: &CacheStorage, fetch: F) -> Navigation<T>
    where
        F: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        match fetch.await {
            Ok(response) => Navigation::Network(response),
            Err(e) => {
                tracing::debug!("Navigation failed, serving offline page: {}", e);
                match storage.get(&self.cache_name, OFFLINE_PATH) {
                    Some(page) => Navigation::Fallback(page),
                    None => Navigation::Unavailable,
                }
            }
        }
    }
}
