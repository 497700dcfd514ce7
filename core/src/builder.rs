use crate::index::{DocId, DocMeta, Document, Index, Store};
use crate::shard::{shard_key, Shard};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

/// Build the full index over `documents` and split it into shards keyed by
/// [`shard_key`]. Only keys that own at least one term are present.
pub fn build(documents: &[Document], shard_width: usize) -> BTreeMap<String, Shard> {
    let documents = ordered(documents);
    let index = build_index(&documents);

    let start = Instant::now();
    let metas: HashMap<DocId, DocMeta> = documents.iter().map(|d| (d.id, DocMeta::from(d))).collect();
    let mut shards: BTreeMap<String, Shard> = BTreeMap::new();
    for (term, postings) in index.iter() {
        let shard = shards.entry(shard_key(term, shard_width)).or_default();
        for id in postings {
            if shard.documents.contains_key(id) {
                continue;
            }
            if let Some(meta) = metas.get(id) {
                shard.documents.insert(*id, meta.clone());
            }
        }
        shard.words.insert(term.to_string(), postings.to_vec());
    }
    tracing::info!(
        num_shards = shards.len(),
        shard_width,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "partitioned index"
    );
    shards
}

/// Build the unsharded variant: the full index plus metadata for every document.
pub fn build_store(documents: &[Document]) -> Store {
    let documents = ordered(documents);
    let index = build_index(&documents);
    let results = documents.iter().map(DocMeta::from).collect();
    Store { index, results }
}

/// Documents in ascending id order with one document per id. When an id repeats,
/// the first document given for it is kept.
fn ordered(documents: &[Document]) -> Cow<'_, [Document]> {
    if documents.windows(2).all(|w| w[0].id < w[1].id) {
        return Cow::Borrowed(documents);
    }
    // postings are appended in arrival order, so feed ids in ascending order
    let mut sorted: Vec<&Document> = documents.iter().collect();
    sorted.sort_by_key(|d| d.id);
    sorted.dedup_by_key(|d| d.id);
    Cow::Owned(sorted.into_iter().cloned().collect())
}

fn build_index(documents: &[Document]) -> Index {
    let start = Instant::now();
    let mut index = Index::new();
    index.add(documents);
    tracing::info!(
        num_docs = documents.len(),
        num_terms = index.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "indexed documents"
    );
    index
}
