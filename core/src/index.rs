use crate::analyzer::analyze;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type DocId = u32;

/// A document as handed to the builder. `text` is analyzed once and then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: DocId,
    pub title: String,
    pub url: String,
    pub text: String,
}

/// Metadata that survives indexing and is returned to callers as a search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocMeta {
    pub id: DocId,
    pub title: String,
    pub url: String,
}

impl From<&Document> for DocMeta {
    fn from(doc: &Document) -> Self {
        Self { id: doc.id, title: doc.title.clone(), url: doc.url.clone() }
    }
}

/// Inverted index from term to postings. Postings are strictly ascending doc ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Index {
    words: BTreeMap<String, Vec<DocId>>,
}

impl Index {
    pub fn new() -> Self { Self::default() }

    /// Analyze and append each document. Documents must arrive in ascending id order,
    /// across calls as well as within one, for postings to stay sorted.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if a document's id is lower than one already posted
    /// for the same term.
    pub fn add(&mut self, documents: &[Document]) {
        for doc in documents {
            for term in analyze(&doc.text) {
                let ids = self.words.entry(term).or_default();
                // repeats within one document are adjacent at the tail
                if ids.last() == Some(&doc.id) {
                    continue;
                }
                debug_assert!(
                    ids.last().map_or(true, |&last| last < doc.id),
                    "document {} added after a higher id",
                    doc.id
                );
                ids.push(doc.id);
            }
        }
    }

    /// Boolean AND over the analyzed query. `None` means no match: the query had
    /// no terms left after analysis, or one of its terms is not in the index.
    pub fn search(&self, query: &str) -> Option<Vec<DocId>> {
        self.search_terms(&analyze(query))
    }

    /// Same as [`Index::search`] for terms that are already normalized.
    pub fn search_terms<S: AsRef<str>>(&self, terms: &[S]) -> Option<Vec<DocId>> {
        let mut result: Option<Vec<DocId>> = None;
        for term in terms {
            let ids = self.postings(term.as_ref())?;
            result = Some(match result {
                None => ids.to_vec(),
                Some(running) => intersection(&running, ids),
            });
        }
        result
    }

    pub fn postings(&self, term: &str) -> Option<&[DocId]> {
        self.words.get(term).map(Vec::as_slice)
    }

    pub fn contains(&self, term: &str) -> bool { self.words.contains_key(term) }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[DocId])> {
        self.words.iter().map(|(t, ids)| (t.as_str(), ids.as_slice()))
    }

    pub fn len(&self) -> usize { self.words.len() }

    pub fn is_empty(&self) -> bool { self.words.is_empty() }

    pub(crate) fn insert(&mut self, term: String, postings: Vec<DocId>) {
        self.words.insert(term, postings);
    }
}

/// Intersection of two ascending, duplicate-free id lists.
pub fn intersection(a: &[DocId], b: &[DocId]) -> Vec<DocId> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// Unsharded index plus result metadata for every document, ordered by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub index: Index,
    pub results: Vec<DocMeta>,
}

impl Store {
    pub fn search(&self, query: &str) -> Option<Vec<DocId>> { self.index.search(query) }

    pub fn result(&self, id: DocId) -> Option<&DocMeta> {
        self.results.binary_search_by_key(&id, |r| r.id).ok().map(|i| &self.results[i])
    }

    /// Run `query` and resolve matching ids to their metadata.
    pub fn hits(&self, query: &str) -> Vec<DocMeta> {
        self.search(query)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|id| self.result(id).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: DocId, text: &str) -> Document {
        Document { id, title: format!("Doc {id}"), url: format!("/doc/{id}"), text: text.into() }
    }

    #[test]
    fn empty_index_matches_nothing() {
        let idx = Index::new();
        assert_eq!(idx.search("foo"), None);
        assert_eq!(idx.search("donut"), None);
    }

    #[test]
    fn add_and_search() {
        let mut idx = Index::new();
        idx.add(&[doc(1, "A donut on a glass plate. Only the donuts.")]);
        assert_eq!(idx.search("a"), None);
        assert_eq!(idx.search("donut"), Some(vec![1]));
        assert_eq!(idx.search("DoNuts"), Some(vec![1]));
        assert_eq!(idx.search("glass"), Some(vec![1]));

        idx.add(&[doc(2, "donut is a donut")]);
        assert_eq!(idx.search("a"), None);
        assert_eq!(idx.search("donut"), Some(vec![1, 2]));
        assert_eq!(idx.search("DoNuts"), Some(vec![1, 2]));
        assert_eq!(idx.search("glass"), Some(vec![1]));
    }

    #[test]
    fn repeated_terms_are_posted_once() {
        let mut idx = Index::new();
        idx.add(&[doc(7, "donut donut donut")]);
        assert_eq!(idx.postings("donut"), Some(&[7][..]));
    }

    #[test]
    fn missing_term_fails_whole_query() {
        let mut idx = Index::new();
        idx.add(&[doc(1, "glass plate"), doc(2, "glass bowl")]);
        assert_eq!(idx.search("glass plate"), Some(vec![1]));
        assert_eq!(idx.search("glass spoon"), None);
        assert_eq!(idx.search("spoon glass"), None);
    }

    #[test]
    fn disjoint_terms_give_empty_match() {
        let mut idx = Index::new();
        idx.add(&[doc(1, "plate"), doc(2, "bowl")]);
        assert_eq!(idx.search("plate bowl"), Some(vec![]));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "added after a higher id")]
    fn add_rejects_descending_ids_across_calls() {
        let mut idx = Index::new();
        idx.add(&[doc(2, "donut")]);
        idx.add(&[doc(1, "donut")]);
    }

    #[test]
    fn intersection_basic() {
        assert_eq!(intersection(&[1, 3, 5, 7], &[2, 3, 4, 7, 9]), vec![3, 7]);
        assert!(intersection(&[], &[1, 2]).is_empty());
    }

    #[test]
    fn store_resolves_hits() {
        let docs = [doc(0, "red apple"), doc(1, "green apple"), doc(2, "red car")];
        let mut index = Index::new();
        index.add(&docs);
        let store = Store { index, results: docs.iter().map(DocMeta::from).collect() };
        let hits = store.hits("red apples");
        assert_eq!(hits, vec![DocMeta { id: 0, title: "Doc 0".into(), url: "/doc/0".into() }]);
        assert!(store.hits("the").is_empty());
    }
}
