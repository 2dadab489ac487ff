use super::lemmatizer::Lemmatizer;
use super::stopwords::is_stopword;

/// Lowercase, strip non-Latin letters, drop stopwords, lemmatize.
#[derive(Debug, Clone, Default)]
pub struct TextNormalizer {
    lemmatizer: Lemmatizer,
}

impl TextNormalizer {
    pub fn new(lemmatizer: Lemmatizer) -> Self {
        Self { lemmatizer }
    }

    /// Never fails; degenerate input yields an empty string.
    pub fn normalize(&self, raw: &str) -> String {
        let cleaned: String = raw
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
            .collect();

        cleaned
            .split_whitespace()
            .filter(|token| !is_stopword(token))
            .map(|token| self.lemmatizer.lemmatize(token))
            // a lemma may itself be a stopword ("wills" -> "will")
            .filter(|lemma| !is_stopword(lemma))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_case_punctuation_digits_and_stopwords() {
        let n = TextNormalizer::default();
        assert_eq!(
            n.normalize("Congratulations!!! You WON a free iPhone 15, click NOW"),
            "congratulation free iphone click"
        );
    }

    #[test]
    fn lemmatizes_plurals() {
        let n = TextNormalizer::default();
        assert_eq!(
            n.normalize("Responsibilities include managing the accounts of children"),
            "responsibility include managing account child"
        );
    }

    #[test]
    fn degenerate_input_is_empty() {
        let n = TextNormalizer::default();
        assert_eq!(n.normalize(""), "");
        assert_eq!(n.normalize("   \t\n"), "");
        assert_eq!(n.normalize("1234 !!! $$$"), "");
        assert_eq!(n.normalize("the and of"), "");
    }

    #[test]
    fn non_latin_letters_are_removed() {
        let n = TextNormalizer::default();
        assert_eq!(n.normalize("café naïve Straße"), "caf nave strae");
    }

    #[test]
    fn lemma_that_is_a_stopword_is_dropped() {
        let n = TextNormalizer::default();
        assert_eq!(n.normalize("wills estates"), "estate");
    }

    #[test]
    fn normalize_is_idempotent() {
        let n = TextNormalizer::default();
        let samples = [
            "Congratulations you won a free iPhone click now",
            "Senior Rust engineer: 5+ years of experience with distributed systems & databases",
            "WORK FROM HOME!!! Earn $$$ daily, no experience needed. Wills, estates, glasses, gases",
            "Classes, boxes, churches, women, mice and salesmen",
            "",
            "ünïcödé ÀÉÎ  mixed\twhitespace\nlines",
        ];
        for s in samples {
            let once = n.normalize(s);
            assert_eq!(n.normalize(&once), once, "input: {s:?}");
        }
    }
}
