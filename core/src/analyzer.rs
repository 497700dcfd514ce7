use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"[\p{L}\p{N}]+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &["a", "and", "be", "have", "i", "in", "of", "that", "the", "to"];
        words.iter().copied().collect()
    };
    // Snowball's English stopword list. These pass through the stemmer untouched,
    // so "only" stays "only" instead of becoming "onli".
    static ref UNSTEMMED: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","did","do","does","doing","don","down","during",
            "each","few","for","from","further",
            "had","has","have","having","he","her","here","hers","herself","him","himself","his","how",
            "i","if","in","into","is","it","its","itself","just",
            "me","more","most","my","myself",
            "no","nor","not","now","of","off","on","once","only","or","other","our","ours","ourselves","out","over","own",
            "s","same","she","should","so","some","such",
            "t","than","that","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
            "under","until","up","very",
            "was","we","were","what","when","where","which","while","who","whom","why","will","with",
            "you","your","yours","yourself","yourselves",
        ];
        words.iter().copied().collect()
    };
}

// Porter2 is not idempotent on its own output ("agreed" -> "agre" -> "agr").
const MAX_STEM_PASSES: usize = 8;

/// Split text on every character that is neither a Unicode letter nor a Unicode number.
pub fn tokenize(text: &str) -> Vec<String> {
    WORD.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

/// Unicode lowercase. A few capitals lowercase to a letter plus a combining mark
/// ("İ" -> "i\u{307}"), so lowercased tokens are split again on non-word characters.
pub fn lowercase_filter(tokens: Vec<String>) -> Vec<String> {
    tokens.into_iter().flat_map(|t| tokenize(&t.to_lowercase())).collect()
}

pub fn stopword_filter(tokens: Vec<String>) -> Vec<String> {
    tokens.into_iter().filter(|t| !is_stopword(t)).collect()
}

pub fn stemmer_filter(tokens: Vec<String>) -> Vec<String> {
    tokens.into_iter().map(|t| stem(&t)).collect()
}

fn is_stemmed(token: &str) -> bool { token.len() <= 2 || UNSTEMMED.contains(token) }

fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// English Porter2 stem. Tokens of at most two bytes and Snowball stopwords are returned as-is.
///
/// The stemmer is reapplied until its output no longer changes, so a stem is
/// always its own stem.
pub fn stem(token: &str) -> String {
    let mut current = token.to_string();
    for _ in 0..MAX_STEM_PASSES {
        if is_stemmed(&current) {
            break;
        }
        let next = STEMMER.stem(&current);
        if next == current.as_str() {
            break;
        }
        current = next.into_owned();
    }
    current
}

/// Turn raw text into index terms: tokenize, lowercase, drop stopwords, stem.
///
/// The same pipeline runs over document bodies at build time and over query
/// strings at search time; shard routing depends on both sides agreeing.
pub fn analyze(text: &str) -> Vec<String> {
    let tokens = tokenize(text);
    let tokens = lowercase_filter(tokens);
    let tokens = stopword_filter(tokens);
    // a stem can land on a stopword ("ands" -> "and")
    stopword_filter(stemmer_filter(tokens))
}
