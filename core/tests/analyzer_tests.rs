use shardfts_core::analyzer::{analyze, tokenize};

#[test]
fn it_normalizes_and_stems() {
    let words = analyze("Running Runners RUN! The fishing boats fished.");
    assert!(words.contains(&"run".to_string()));
    assert!(words.contains(&"fish".to_string()));
    assert!(words.contains(&"boat".to_string()));
}

#[test]
fn it_filters_stopwords() {
    let words = analyze("The quick brown fox and the lazy dog");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    assert_eq!(words.len(), 5);
}

#[test]
fn it_keeps_token_order() {
    assert_eq!(analyze("glass Donuts plate"), vec!["glass", "donut", "plate"]);
}

#[test]
fn tokenizer_never_emits_empty_tokens() {
    for text in ["", ",,,", "a,,b", "  x  ", "\u{2014}word\u{2014}"] {
        assert!(tokenize(text).iter().all(|t| !t.is_empty()), "{text:?}");
    }
}
