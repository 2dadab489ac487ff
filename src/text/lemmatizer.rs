use std::collections::HashMap;
use std::{fs, path::Path};

use tracing::{info, warn};

use crate::error::SiftError;

/// Irregular plurals and words that look plural but are already lemmas.
const IRREGULAR: &[(&str, &str)] = &[
    ("children", "child"),
    ("women", "woman"),
    ("people", "person"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("data", "datum"),
    ("criteria", "criterion"),
    ("phenomena", "phenomenon"),
    ("analyses", "analysis"),
    ("crises", "crisis"),
    ("theses", "thesis"),
    ("bases", "basis"),
    ("indices", "index"),
    ("matrices", "matrix"),
    ("appendices", "appendix"),
    ("lives", "life"),
    ("wives", "wife"),
    ("knives", "knife"),
    ("leaves", "leaf"),
    ("halves", "half"),
    ("shelves", "shelf"),
    ("wolves", "wolf"),
    ("thieves", "thief"),
    ("news", "news"),
    ("series", "series"),
    ("species", "species"),
    ("physics", "physics"),
    ("mathematics", "mathematics"),
    ("economics", "economics"),
    ("politics", "politics"),
    ("ethics", "ethics"),
    ("analytics", "analytics"),
    ("logistics", "logistics"),
    ("statistics", "statistics"),
    ("electronics", "electronics"),
    ("always", "always"),
    ("perhaps", "perhaps"),
    ("whereas", "whereas"),
    ("sometimes", "sometimes"),
    ("bias", "bias"),
    ("alias", "alias"),
    ("atlas", "atlas"),
    ("canvas", "canvas"),
    ("gas", "gas"),
    ("plus", "plus"),
    ("omen", "omen"),
    ("specimen", "specimen"),
    ("abdomen", "abdomen"),
];

/// Suffix substitutions, longest first.
const SUFFIX_RULES: &[(&str, &str)] = &[
    ("sses", "ss"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("ies", "y"),
    ("xes", "x"),
    ("men", "man"),
    ("s", ""),
];

const PROTECTED_ENDINGS: &[&str] = &["ss", "us", "is"];
const MIN_LEMMA_LEN: usize = 3;
const MAX_STEPS: usize = 8;

/// Dictionary-backed noun lemmatizer.
///
/// Every lemma it returns is a fixpoint: `lemmatize(lemmatize(w)) == lemmatize(w)`.
#[derive(Debug, Clone)]
pub struct Lemmatizer {
    dictionary: HashMap<String, String>,
}

impl Default for Lemmatizer {
    fn default() -> Self {
        let dictionary = IRREGULAR
            .iter()
            .map(|(w, l)| (w.to_string(), l.to_string()))
            .collect();
        Self { dictionary }
    }
}

impl Lemmatizer {
    /// Built-in dictionary extended with a JSON object of `word -> lemma` pairs.
    pub fn with_dictionary_file(path: &Path) -> Result<Self, SiftError> {
        let contents = fs::read_to_string(path)?;
        let extra: HashMap<String, String> = serde_json::from_str(&contents)?;
        let mut lemmatizer = Self::default();
        let added = lemmatizer.extend(extra);
        info!(path = %path.display(), added, "lemma dictionary loaded");
        Ok(lemmatizer)
    }

    /// Merge entries, skipping any whose lemma would reduce further.
    pub fn extend(&mut self, entries: impl IntoIterator<Item = (String, String)>) -> usize {
        let mut added = 0;
        for (word, lemma) in entries {
            let word = word.to_lowercase();
            let lemma = lemma.to_lowercase();
            if !is_alpha(&word) || !is_alpha(&lemma) {
                warn!(%word, %lemma, "lemma entry is not alphabetic; skipped");
                continue;
            }
            if !self.is_fixpoint(&word, &lemma) {
                warn!(%word, %lemma, "lemma entry is not a base form; skipped");
                continue;
            }
            self.dictionary.insert(word, lemma);
            added += 1;
        }
        added
    }

    pub fn lemmatize(&self, token: &str) -> String {
        let mut current = token.to_string();
        for _ in 0..MAX_STEPS {
            if let Some(lemma) = self.dictionary.get(&current) {
                return lemma.clone();
            }
            match reduce_suffix(&current) {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    fn is_fixpoint(&self, word: &str, lemma: &str) -> bool {
        if word == lemma {
            return true;
        }
        // The word must not already be a lemma other entries resolve to.
        if self.dictionary.values().any(|existing| existing == word) {
            return false;
        }
        match self.dictionary.get(lemma) {
            Some(existing) => existing == lemma,
            None => reduce_suffix(lemma).is_none(),
        }
    }
}

fn reduce_suffix(word: &str) -> Option<String> {
    if PROTECTED_ENDINGS.iter().any(|end| word.ends_with(end)) {
        return None;
    }
    SUFFIX_RULES.iter().find_map(|(suffix, replacement)| {
        let lemma = format!("{}{replacement}", word.strip_suffix(suffix)?);
        (lemma.len() >= MIN_LEMMA_LEN).then_some(lemma)
    })
}

fn is_alpha(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_lowercase())
}
