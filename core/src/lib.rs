//! Static, shardable full-text search.
//!
//! Documents are analyzed into terms and collected into an inverted index. The
//! index is then split into shards by a hash prefix of each term, so a client
//! only needs the shards that own its query terms.

pub mod analyzer;
pub mod builder;
pub mod error;
pub mod index;
pub mod manifest;
pub mod persist;
pub mod query;
pub mod shard;

pub use builder::{build, build_store};
pub use error::{Error, Result};
pub use index::{intersection, DocId, DocMeta, Document, Index, Store};
pub use persist::IndexFile;
pub use query::{search_shards, QueryEngine};
pub use shard::{shard_key, Shard};
