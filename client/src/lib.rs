//! Query-time client: fetch only the shards a query needs, decode them and
//! AND the per-shard results together.

use reqwest::{StatusCode, Url};
use shardfts_core::persist::{decode_shard, decode_store, MetaFile};
use shardfts_core::shard::route;
use shardfts_core::{search_shards, DocMeta, Shard, Store};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::task::JoinHandle;

const META_FILE: &str = "meta.json";
const STORE_FILE: &str = "store.bin";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid index base {base:?}: {reason}")]
    Base { base: String, reason: String },

    #[error("request for {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}")]
    Status { url: String, status: StatusCode },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{name} not found")]
    Missing { name: String },

    /// The bytes arrived but do not decode. Retrying the fetch is the caller's call.
    #[error("failed to decode {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: shardfts_core::Error,
    },

    #[error("invalid meta.json: {0}")]
    Meta(#[from] serde_json::Error),

    #[error("fetch task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl FetchError {
    pub fn is_decode(&self) -> bool { matches!(self, Self::Decode { .. }) }
}

/// Where index files are published: an HTTP base URL or a local directory.
#[derive(Debug, Clone)]
pub enum ShardSource {
    Http { client: reqwest::Client, base: Url },
    Dir(PathBuf),
}

impl ShardSource {
    pub fn http(base: &str) -> Result<Self, FetchError> {
        let mut url = Url::parse(base).map_err(|e| FetchError::Base { base: base.into(), reason: e.to_string() })?;
        if url.cannot_be_a_base() {
            return Err(FetchError::Base { base: base.into(), reason: "not a hierarchical URL".into() });
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self::Http { client: reqwest::Client::new(), base: url })
    }

    pub fn dir<P: AsRef<Path>>(path: P) -> Self { Self::Dir(path.as_ref().to_path_buf()) }

    /// Pick HTTP for `http://` and `https://` bases, a directory otherwise.
    pub fn parse(base: &str) -> Result<Self, FetchError> {
        if base.starts_with("http://") || base.starts_with("https://") {
            Self::http(base)
        } else {
            Ok(Self::dir(base))
        }
    }

    /// Fetch one published file. `Ok(None)` means it does not exist.
    pub async fn fetch(&self, name: &str) -> Result<Option<Vec<u8>>, FetchError> {
        match self {
            Self::Http { client, base } => {
                let url = base
                    .join(name)
                    .map_err(|e| FetchError::Base { base: base.to_string(), reason: e.to_string() })?;
                let resp = client
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(|source| FetchError::Http { url: url.to_string(), source })?;
                if resp.status() == StatusCode::NOT_FOUND {
                    return Ok(None);
                }
                if !resp.status().is_success() {
                    return Err(FetchError::Status { url: url.to_string(), status: resp.status() });
                }
                let bytes = resp
                    .bytes()
                    .await
                    .map_err(|source| FetchError::Http { url: url.to_string(), source })?;
                Ok(Some(bytes.to_vec()))
            }
            Self::Dir(root) => {
                let path = root.join(name);
                match tokio::fs::read(&path).await {
                    Ok(bytes) => Ok(Some(bytes)),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                    Err(source) => Err(FetchError::Io { path, source }),
                }
            }
        }
    }

    async fn fetch_required(&self, name: &str) -> Result<Vec<u8>, FetchError> {
        self.fetch(name).await?.ok_or_else(|| FetchError::Missing { name: name.to_string() })
    }
}

// Aborts outstanding fetches when a search is dropped or fails part way.
struct AbortOnDrop<T>(Vec<JoinHandle<T>>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

/// A sharded index opened through its `meta.json`.
#[derive(Debug, Clone)]
pub struct Client {
    source: ShardSource,
    meta: MetaFile,
}

impl Client {
    pub async fn open(source: ShardSource) -> Result<Self, FetchError> {
        let bytes = source.fetch_required(META_FILE).await?;
        let meta: MetaFile = serde_json::from_slice(&bytes)?;
        tracing::debug!(num_shards = meta.num_shards, shard_width = meta.shard_width, "opened index");
        Ok(Self { source, meta })
    }

    pub fn meta(&self) -> &MetaFile { &self.meta }

    fn shard_file(&self, key: &str) -> String { format!("{key}.{}", self.meta.extension) }

    /// Fetch `keys` concurrently. Keys with no published shard are left out of the map.
    pub async fn fetch_shards<I>(&self, keys: I) -> Result<BTreeMap<String, Shard>, FetchError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut tasks = AbortOnDrop(Vec::new());
        for key in keys {
            let source = self.source.clone();
            let name = self.shard_file(&key);
            tasks.0.push(tokio::spawn(async move {
                let bytes = source.fetch(&name).await;
                (key, name, bytes)
            }));
        }

        let mut fetched = Vec::with_capacity(tasks.0.len());
        for handle in tasks.0.iter_mut() {
            let (key, name, bytes) = handle.await?;
            if let Some(bytes) = bytes? {
                tracing::debug!(shard = %name, bytes = bytes.len(), "fetched shard");
                fetched.push((key, name, bytes));
            }
        }

        // nothing is decoded until every fetch has completed
        let mut shards = BTreeMap::new();
        for (key, name, bytes) in fetched {
            let shard = decode_shard(&bytes).map_err(|source| FetchError::Decode { name, source })?;
            shards.insert(key, shard);
        }
        Ok(shards)
    }

    /// Boolean AND search across however many shards the query touches.
    pub async fn search(&self, query: &str) -> Result<Vec<DocMeta>, FetchError> {
        let start = Instant::now();
        let width = self.meta.shard_width;
        let routes = route(query, width);
        if routes.is_empty() {
            return Ok(Vec::new());
        }
        let shards = self.fetch_shards(routes.into_keys()).await?;
        let hits = search_shards(&shards, query, width).unwrap_or_default();
        tracing::info!(query, shards = shards.len(), hits = hits.len(), elapsed_ms = start.elapsed().as_millis() as u64, "search");
        Ok(hits)
    }
}

/// Fetch and decode the unsharded `store.bin` from `source`.
pub async fn load_store(source: &ShardSource) -> Result<Store, FetchError> {
    let bytes = source.fetch_required(STORE_FILE).await?;
    decode_store(&bytes).map_err(|source| FetchError::Decode { name: STORE_FILE.into(), source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_base_gets_trailing_slash() {
        match ShardSource::http("http://localhost:8080/index").unwrap() {
            ShardSource::Http { base, .. } => {
                assert_eq!(base.as_str(), "http://localhost:8080/index/");
                assert_eq!(base.join("ab.shard").unwrap().as_str(), "http://localhost:8080/index/ab.shard");
            }
            ShardSource::Dir(_) => panic!("expected http source"),
        }
    }

    #[test]
    fn parse_picks_source_kind() {
        assert!(matches!(ShardSource::parse("https://example.com").unwrap(), ShardSource::Http { .. }));
        assert!(matches!(ShardSource::parse("./public/index").unwrap(), ShardSource::Dir(_)));
        assert!(ShardSource::parse("http://").is_err());
    }
}
