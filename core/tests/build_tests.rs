use shardfts_core::persist::{
    decode, decode_shard, encode, encode_shard, load_meta, load_shard, load_store, write_shards,
    write_store, IndexFile, IndexPaths, MetaFile,
};
use shardfts_core::shard::SHARD_EXTENSION;
use shardfts_core::{build, build_store, search_shards, shard_key, DocId, Document};
use std::fs;
use tempfile::tempdir;

fn corpus() -> Vec<Document> {
    [
        ("Donuts", "A donut on a glass plate. Only the donuts."),
        ("Repeat", "donut is a donut"),
        ("Kitchen", "Glass bowls, steel pans and a wooden spoon."),
        ("Airlines", "Airline passengers fishing for snacks."),
    ]
    .iter()
    .enumerate()
    .map(|(i, (title, text))| Document {
        id: i as DocId,
        title: title.to_string(),
        url: format!("https://example.com/{i}"),
        text: text.to_string(),
    })
    .collect()
}

fn meta(num_shards: usize) -> MetaFile {
    MetaFile {
        num_docs: 4,
        num_terms: 0,
        num_shards: num_shards as u32,
        shard_width: 2,
        extension: SHARD_EXTENSION.to_string(),
        created_at: "2024-01-01T00:00:00Z".into(),
        version: 1,
    }
}

#[test]
fn builds_are_byte_identical() {
    let a = build(&corpus(), 2);
    let b = build(&corpus(), 2);
    assert_eq!(a.keys().collect::<Vec<_>>(), b.keys().collect::<Vec<_>>());
    for (key, shard) in &a {
        assert_eq!(encode_shard(shard).unwrap(), encode_shard(&b[key]).unwrap());
    }
}

#[test]
fn shard_and_store_round_trip() {
    let shards = build(&corpus(), 2);
    for shard in shards.values() {
        assert_eq!(&decode_shard(&encode_shard(shard).unwrap()).unwrap(), shard);
    }
    let store = IndexFile::Store(build_store(&corpus()));
    assert_eq!(decode(&encode(&store).unwrap()).unwrap(), store);
}

#[test]
fn truncated_bytes_are_decode_errors() {
    let shards = build(&corpus(), 2);
    let bytes = encode_shard(&shards[&shard_key("donut", 2)]).unwrap();
    for cut in [0, 3, 5, bytes.len() / 2, bytes.len() - 1] {
        let err = decode(&bytes[..cut]).unwrap_err();
        assert!(err.is_decode(), "cut at {cut}: {err}");
    }
    let store_bytes = encode(&IndexFile::Store(build_store(&corpus()))).unwrap();
    assert!(decode_shard(&store_bytes).unwrap_err().is_decode());
}

#[test]
fn donut_query_needs_one_shard_on_disk() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let shards = build(&corpus(), 2);
    write_shards(&paths, &shards, &meta(shards.len())).unwrap();

    let key = shard_key("donut", 2);
    let shard = load_shard(&paths, &key).unwrap().unwrap();
    assert_eq!(shard.search("DoNuts"), Some(vec![0, 1]));
    assert_eq!(shard.document(0).unwrap().title, "Donuts");
    assert_eq!(load_meta(&paths).unwrap().num_shards as usize, shards.len());
}

#[test]
fn unknown_shard_loads_as_none() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let shards = build(&corpus(), 2);
    write_shards(&paths, &shards, &meta(shards.len())).unwrap();
    let missing = (0..=255u32).map(|n| format!("{n:02x}")).find(|k| !shards.contains_key(k)).unwrap();
    assert!(load_shard(&paths, &missing).unwrap().is_none());
}

#[test]
fn rebuild_removes_stale_shards() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    fs::write(dir.path().join(format!("zz.{SHARD_EXTENSION}")), b"stale").unwrap();
    fs::write(dir.path().join("keep.txt"), b"unrelated").unwrap();

    let shards = build(&corpus(), 1);
    write_shards(&paths, &shards, &meta(shards.len())).unwrap();
    let written = fs::read_dir(dir.path())
        .unwrap()
        .filter(|e| e.as_ref().unwrap().path().extension().and_then(|s| s.to_str()) == Some(SHARD_EXTENSION))
        .count();
    assert_eq!(written, shards.len());
    assert!(dir.path().join("keep.txt").exists());
}

#[test]
fn store_on_disk_round_trip() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let store = build_store(&corpus());
    write_store(&paths, &store).unwrap();
    assert_eq!(load_store(&paths).unwrap(), store);
}

#[test]
fn composed_search_matches_full_index() {
    let docs = corpus();
    let shards = build(&docs, 2);
    let store = build_store(&docs);
    for query in ["donut", "glass donut", "glass", "airlines fishing", "spoon glass", "the", "unicorn"] {
        let sharded = search_shards(&shards, query, 2).map(|hits| hits.into_iter().map(|h| h.id).collect::<Vec<_>>());
        assert_eq!(sharded, store.search(query), "{query}");
    }
}
