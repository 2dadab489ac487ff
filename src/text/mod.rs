//! Text preprocessing applied before inference.
//!
//! - `normalizer.rs`: the full cleaning pipeline
//! - `stopwords.rs`: fixed English stopword list
//! - `lemmatizer.rs`: dictionary-based noun lemmatizer

pub mod lemmatizer;
pub mod normalizer;
pub mod stopwords;

pub use lemmatizer::Lemmatizer;
pub use normalizer::TextNormalizer;

/// Keep at most `max` characters (not bytes).
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
