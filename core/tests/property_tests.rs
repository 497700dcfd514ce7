use proptest::collection::btree_set;
use proptest::prelude::*;
use shardfts_core::analyzer::analyze;
use shardfts_core::shard::{is_valid_key, shard_key};
use shardfts_core::{intersection, DocId, Document, Index};

fn sorted_ids() -> impl Strategy<Value = Vec<DocId>> {
    btree_set(0u32..500, 0..60).prop_map(|s| s.into_iter().collect())
}

fn is_strictly_ascending(ids: &[DocId]) -> bool {
    ids.windows(2).all(|w| w[0] < w[1])
}

// Plain words mixed with inflections whose stems are stopwords or restem.
fn word() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[a-zA-Z0-9]{1,12}",
        1 => prop::sample::select(vec![
            "ands", "haves", "beings", "thats", "agreed", "generously", "doings", "İstanbul", "Only", "fishing",
        ])
        .prop_map(String::from),
    ]
}

fn text() -> impl Strategy<Value = String> {
    proptest::collection::vec((word(), "[ ,.!?-]{1,3}"), 0..16)
        .prop_map(|parts| parts.into_iter().map(|(w, sep)| w + &sep).collect())
}

proptest! {
    #[test]
    fn analyzed_output_is_a_fixed_point(text in text()) {
        let once = analyze(&text);
        let twice = analyze(&once.join(" "));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn intersection_is_commutative_and_sorted(a in sorted_ids(), b in sorted_ids()) {
        let ab = intersection(&a, &b);
        prop_assert_eq!(&ab, &intersection(&b, &a));
        prop_assert!(is_strictly_ascending(&ab));
        for id in &ab {
            prop_assert!(a.binary_search(id).is_ok());
            prop_assert!(b.binary_search(id).is_ok());
        }
    }

    #[test]
    fn postings_stay_sorted_and_unique(texts in proptest::collection::vec("[a-e ]{0,30}", 1..20)) {
        let docs: Vec<Document> = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| Document { id: i as DocId, title: String::new(), url: String::new(), text })
            .collect();
        let mut index = Index::new();
        index.add(&docs);
        for (_, ids) in index.iter() {
            prop_assert!(is_strictly_ascending(ids));
        }
    }

    #[test]
    fn shard_key_is_pure_and_well_formed(term in "\\PC{1,20}", width in 1usize..8) {
        let key = shard_key(&term, width);
        prop_assert_eq!(&key, &shard_key(&term, width));
        prop_assert_eq!(key.len(), width);
        prop_assert!(is_valid_key(&key));
    }
}
