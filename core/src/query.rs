use crate::error::Result;
use crate::index::{intersection, DocId, DocMeta};
use crate::persist::{decode, IndexFile};
use crate::shard::{route, Shard};
use std::collections::BTreeMap;
use std::time::Instant;

/// Holds one decoded store or shard and answers queries against it.
///
/// Loading replaces whatever was loaded before. The engine is an ordinary value;
/// hosts that want several resident shards keep several engines or use
/// [`search_shards`].
#[derive(Debug, Default)]
pub struct QueryEngine {
    loaded: Option<IndexFile>,
}

impl QueryEngine {
    pub fn new() -> Self { Self::default() }

    pub fn load(&mut self, file: impl Into<IndexFile>) {
        self.loaded = Some(file.into());
    }

    /// Decode `bytes` and load the result. On failure the previously loaded
    /// structure, if any, stays in place.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let file = decode(bytes)?;
        self.loaded = Some(file);
        Ok(())
    }

    pub fn is_loaded(&self) -> bool { self.loaded.is_some() }

    pub fn unload(&mut self) -> Option<IndexFile> { self.loaded.take() }

    /// Matching document ids in ascending order; `None` when nothing matches.
    pub fn search(&self, query: &str) -> Option<Vec<DocId>> {
        match self.loaded.as_ref()? {
            IndexFile::Store(store) => store.search(query),
            IndexFile::Shard(shard) => shard.search(query),
        }
    }

    /// Run `query` and return result metadata in id order.
    pub fn query(&self, query: &str) -> Vec<DocMeta> {
        let start = Instant::now();
        let hits = match &self.loaded {
            Some(IndexFile::Store(store)) => store.hits(query),
            Some(IndexFile::Shard(shard)) => shard.hits(query),
            None => {
                tracing::warn!("query issued before an index was loaded");
                return Vec::new();
            }
        };
        tracing::debug!(query, hits = hits.len(), elapsed_us = start.elapsed().as_micros() as u64, "query");
        hits
    }
}

/// AND a query across several shards.
///
/// Each shard answers for the terms routed to it, and the per-shard id lists are
/// intersected. A shard missing from `shards` means its terms are absent, which
/// fails the whole query. `None` means no match.
pub fn search_shards(shards: &BTreeMap<String, Shard>, query: &str, width: usize) -> Option<Vec<DocMeta>> {
    let routes = route(query, width);
    if routes.is_empty() {
        return None;
    }

    let mut ids: Option<Vec<DocId>> = None;
    for (key, terms) in &routes {
        let local = shards.get(key)?.search_terms(terms)?;
        ids = Some(match ids {
            None => local,
            Some(running) => intersection(&running, &local),
        });
    }

    let hits = ids?
        .into_iter()
        .filter_map(|id| routes.keys().find_map(|key| shards.get(key)?.document(id).cloned()))
        .collect();
    Some(hits)
}
