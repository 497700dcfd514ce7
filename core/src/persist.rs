use crate::error::{Error, Result};
use crate::index::Store;
use crate::shard::{Shard, SHARD_EXTENSION};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, create_dir_all};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const MAGIC: &[u8; 4] = b"SFTS";
pub const FORMAT_VERSION: u32 = 1;

/// Anything that can be published as a single index file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexFile {
    Store(Store),
    Shard(Shard),
}

impl From<Store> for IndexFile {
    fn from(store: Store) -> Self { Self::Store(store) }
}

impl From<Shard> for IndexFile {
    fn from(shard: Shard) -> Self { Self::Shard(shard) }
}

// Borrowing mirror of `IndexFile`; serializes to the same bytes.
#[derive(Serialize)]
enum IndexFileRef<'a> {
    Store(&'a Store),
    Shard(&'a Shard),
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    file: IndexFileRef<'a>,
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    file: IndexFile,
}

/// Build metadata written next to the shards. Clients read it to learn the shard width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_terms: u32,
    pub num_shards: u32,
    pub shard_width: usize,
    pub extension: String,
    pub created_at: String,
    pub version: u32,
}

pub fn encode(file: &IndexFile) -> Result<Vec<u8>> {
    match file {
        IndexFile::Store(store) => encode_ref(IndexFileRef::Store(store)),
        IndexFile::Shard(shard) => encode_ref(IndexFileRef::Shard(shard)),
    }
}

pub fn encode_shard(shard: &Shard) -> Result<Vec<u8>> { encode_ref(IndexFileRef::Shard(shard)) }

pub fn encode_store(store: &Store) -> Result<Vec<u8>> { encode_ref(IndexFileRef::Store(store)) }

fn encode_ref(file: IndexFileRef<'_>) -> Result<Vec<u8>> {
    let mut bytes = MAGIC.to_vec();
    let body = bincode::serialize(&EnvelopeRef { version: FORMAT_VERSION, file }).map_err(Error::Encode)?;
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

pub fn decode(bytes: &[u8]) -> Result<IndexFile> {
    let body = bytes
        .strip_prefix(MAGIC.as_slice())
        .ok_or_else(|| Error::decode("missing file signature"))?;
    let envelope: Envelope = bincode::deserialize(body).map_err(Error::decode)?;
    if envelope.version != FORMAT_VERSION {
        return Err(Error::decode(format!(
            "unsupported format version {} (expected {FORMAT_VERSION})",
            envelope.version
        )));
    }
    Ok(envelope.file)
}

pub fn decode_shard(bytes: &[u8]) -> Result<Shard> {
    match decode(bytes)? {
        IndexFile::Shard(shard) => Ok(shard),
        IndexFile::Store(_) => Err(Error::decode("expected a shard, found a store")),
    }
}

pub fn decode_store(bytes: &[u8]) -> Result<Store> {
    match decode(bytes)? {
        IndexFile::Store(store) => Ok(store),
        IndexFile::Shard(_) => Err(Error::decode("expected a store, found a shard")),
    }
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn shard(&self, key: &str) -> PathBuf { self.root.join(shard_file_name(key)) }
    pub fn store(&self) -> PathBuf { self.root.join("store.bin") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

/// File name a shard is published under, relative to the index base.
pub fn shard_file_name(key: &str) -> String { format!("{key}.{SHARD_EXTENSION}") }

/// Replace any previous build in `paths.root` with `shards` and a fresh `meta.json`.
pub fn write_shards(paths: &IndexPaths, shards: &BTreeMap<String, Shard>, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root).map_err(|e| Error::io(&paths.root, e))?;
    remove_previous_build(paths)?;
    for (key, shard) in shards {
        let path = paths.shard(key);
        let bytes = encode_shard(shard)?;
        fs::write(&path, bytes).map_err(|e| Error::io(&path, e))?;
        tracing::debug!(key = key.as_str(), terms = shard.words.len(), "wrote shard");
    }
    save_meta(paths, meta)
}

fn remove_previous_build(paths: &IndexPaths) -> Result<()> {
    let entries = fs::read_dir(&paths.root).map_err(|e| Error::io(&paths.root, e))?;
    for entry in entries {
        let path = entry.map_err(|e| Error::io(&paths.root, e))?.path();
        let stale = path.extension().and_then(|s| s.to_str()) == Some(SHARD_EXTENSION) || path == paths.meta();
        if stale && path.is_file() {
            fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
        }
    }
    Ok(())
}

pub fn write_store(paths: &IndexPaths, store: &Store) -> Result<()> {
    create_dir_all(&paths.root).map_err(|e| Error::io(&paths.root, e))?;
    let path = paths.store();
    let bytes = encode_store(store)?;
    fs::write(&path, bytes).map_err(|e| Error::io(&path, e))
}

/// Load the shard for `key`. A shard that was never written loads as `None`.
pub fn load_shard(paths: &IndexPaths, key: &str) -> Result<Option<Shard>> {
    let path = paths.shard(key);
    match fs::read(&path) {
        Ok(bytes) => decode_shard(&bytes).map(Some),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(&path, e)),
    }
}

pub fn load_store(paths: &IndexPaths) -> Result<Store> {
    let path = paths.store();
    let bytes = fs::read(&path).map_err(|e| Error::io(&path, e))?;
    decode_store(&bytes)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    let path = paths.meta();
    let json = serde_json::to_string_pretty(meta)?;
    fs::write(&path, json).map_err(|e| Error::io(&path, e))
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let path = paths.meta();
    let buf = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
    Ok(serde_json::from_str(&buf)?)
}
