use crate::analyzer::analyze;
use crate::index::{DocId, DocMeta, Index};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;

pub const DEFAULT_SHARD_WIDTH: usize = 2;
pub const MAX_SHARD_WIDTH: usize = 40;
pub const SHARD_EXTENSION: &str = "shard";

/// Route a normalized term to its shard: the first `width` hex digits of its SHA-1.
///
/// `width` is clamped to `1..=40`. Callers must pass analyzer output, never a raw
/// query word, or build-time and query-time keys will disagree.
pub fn shard_key(term: &str, width: usize) -> String {
    let width = width.clamp(1, MAX_SHARD_WIDTH);
    let mut hasher = Sha1::new();
    hasher.update(term.as_bytes());
    let mut key = format!("{:x}", hasher.finalize());
    key.truncate(width);
    key
}

/// True if `key` could have been produced by [`shard_key`].
pub fn is_valid_key(key: &str) -> bool {
    (1..=MAX_SHARD_WIDTH).contains(&key.len())
        && key.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Group a query's terms by the shard that owns them, keeping query order within each group.
pub fn route(query: &str, width: usize) -> BTreeMap<String, Vec<String>> {
    let mut routes: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for term in analyze(query) {
        routes.entry(shard_key(&term, width)).or_default().push(term);
    }
    routes
}

/// A self-contained slice of the full index: the terms routed to one key plus the
/// metadata of every document those terms reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shard {
    pub documents: BTreeMap<DocId, DocMeta>,
    pub words: Index,
}

impl Shard {
    pub fn new() -> Self { Self::default() }

    pub fn search(&self, query: &str) -> Option<Vec<DocId>> { self.words.search(query) }

    pub fn search_terms<S: AsRef<str>>(&self, terms: &[S]) -> Option<Vec<DocId>> {
        self.words.search_terms(terms)
    }

    pub fn document(&self, id: DocId) -> Option<&DocMeta> { self.documents.get(&id) }

    pub fn hits(&self, query: &str) -> Vec<DocMeta> {
        self.search(query)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|id| self.document(id).cloned())
            .collect()
    }
}
