//! Stemming algorithms for reducing words to their root forms.

/// Trait for stemming algorithms.
pub trait Stemmer: Send + Sync + std::fmt::Debug {
    /// Stem a word to its root form.
    fn stem(&self, word: &str) -> String;

    /// Get the name of this stemmer.
    fn name(&self) -> &'static str;
}

/// Stemmer that returns words unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityStemmer;

impl IdentityStemmer {
    /// Create a new identity stemmer.
    pub fn new() -> Self {
        IdentityStemmer
    }
}

impl Stemmer for IdentityStemmer {
    fn stem(&self, word: &str) -> String {
        word.to_string()
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}

/// Suffixes stripped by [`SuffixStemmer`], longest first.
const ENGLISH_SUFFIXES: &[&str] = &[
    "ations", "ation", "ness", "ment", "able", "ible", "tion", "sion", "ings", "ing", "ies",
    "ied", "est", "ful", "ers", "ed", "er", "ly", "es", "s",
];

/// English suffix-stripping stemmer.
///
/// Removes the longest known suffix when at least three characters remain.
/// Suffixes are matched ASCII case-insensitively and the word's own casing is
/// kept, so stemming composes with case-sensitive matching.
#[derive(Debug, Clone)]
pub struct SuffixStemmer {
    suffixes: Vec<&'static str>,
}

impl Default for SuffixStemmer {
    fn default() -> Self {
        Self::new()
    }
}

impl SuffixStemmer {
    /// Create a stemmer with the built-in English suffix list.
    pub fn new() -> Self {
        let mut suffixes = ENGLISH_SUFFIXES.to_vec();
        suffixes.sort_by_key(|suffix| std::cmp::Reverse(suffix.len()));
        SuffixStemmer { suffixes }
    }
}

impl Stemmer for SuffixStemmer {
    fn stem(&self, word: &str) -> String {
        for suffix in &self.suffixes {
            if word.len() < suffix.len() + 3 {
                continue;
            }
            let cut = word.len() - suffix.len();
            if word.is_char_boundary(cut) && word[cut..].eq_ignore_ascii_case(suffix) {
                return word[..cut].to_string();
            }
        }
        word.to_string()
    }

    fn name(&self) -> &'static str {
        "suffix"
    }
}

/// Stemmer for a language tag. Only English has a real stemmer; every other
/// language stems to the identity.
pub fn stemmer_for(language: &str) -> Box<dyn Stemmer> {
    match language.to_ascii_lowercase().as_str() {
        "en" | "english" => Box::new(SuffixStemmer::new()),
        _ => Box::new(IdentityStemmer::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_stemmer() {
        let stemmer = SuffixStemmer::new();

        assert_eq!(stemmer.stem("running"), "runn");
        assert_eq!(stemmer.stem("flies"), "fli");
        assert_eq!(stemmer.stem("agreement"), "agree");
        assert_eq!(stemmer.stem("happiness"), "happi");
        assert_eq!(stemmer.stem("cats"), "cat");
        assert_eq!(stemmer.stem("is"), "is");
    }

    #[test]
    fn test_suffix_stemmer_keeps_case() {
        let stemmer = SuffixStemmer::new();
        assert_eq!(stemmer.stem("RUNNING"), "RUNN");
        assert_eq!(stemmer.stem("Dogs"), "Dog");
    }

    #[test]
    fn test_suffix_stemmer_non_ascii_boundary() {
        let stemmer = SuffixStemmer::new();
        assert_eq!(stemmer.stem("naïves"), "naïv");
        assert_eq!(stemmer.stem("éé"), "éé");
    }

    #[test]
    fn test_stemmer_for_language() {
        assert_eq!(stemmer_for("en").name(), "suffix");
        assert_eq!(stemmer_for("EN").name(), "suffix");
        assert_eq!(stemmer_for("de").name(), "identity");
        assert_eq!(stemmer_for("de").stem("Häuser"), "Häuser");
    }
}
