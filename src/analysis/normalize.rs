//! Token normalization: case folding, diacritics stripping and stemming.
//!
//! A [`Normalizer`] is built from resolved full-text options. The index
//! builds one from its build-time options; the scan evaluator builds a
//! document-side and a query-side one from the query's options.
//!
//! # Examples
//!
//! ```
//! use glaive::analysis::normalize::{CaseFold, Normalizer};
//!
//! let normalizer = Normalizer::new(CaseFold::Lower, true, None);
//! assert_eq!(normalizer.normalize("Résumé"), "resume");
//! ```

use ahash::AHashMap;
use lazy_static::lazy_static;

use crate::analysis::stemmer::Stemmer;
use crate::analysis::token::Token;
use crate::analysis::tokenizer::{Tokenizer, UnicodeWordTokenizer};
use crate::error::Result;

/// Pairs of accented characters and their unaccented replacement.
const DIACRITICS_TABLE: &[(char, &str)] = &[
    ('À', "A"), ('Á', "A"), ('Â', "A"), ('Ã', "A"), ('Ä', "A"), ('Å', "A"), ('Æ', "AE"),
    ('Ç', "C"), ('È', "E"), ('É', "E"), ('Ê', "E"), ('Ë', "E"), ('Ì', "I"), ('Í', "I"),
    ('Î', "I"), ('Ï', "I"), ('Ð', "D"), ('Ñ', "N"), ('Ò', "O"), ('Ó', "O"), ('Ô', "O"),
    ('Õ', "O"), ('Ö', "O"), ('Ø', "O"), ('Ù', "U"), ('Ú', "U"), ('Û', "U"), ('Ü', "U"),
    ('Ý', "Y"), ('Þ', "TH"), ('ß', "ss"), ('à', "a"), ('á', "a"), ('â', "a"), ('ã', "a"),
    ('ä', "a"), ('å', "a"), ('æ', "ae"), ('ç', "c"), ('è', "e"), ('é', "e"), ('ê', "e"),
    ('ë', "e"), ('ì', "i"), ('í', "i"), ('î', "i"), ('ï', "i"), ('ð', "d"), ('ñ', "n"),
    ('ò', "o"), ('ó', "o"), ('ô', "o"), ('õ', "o"), ('ö', "o"), ('ø', "o"), ('ù', "u"),
    ('ú', "u"), ('û', "u"), ('ü', "u"), ('ý', "y"), ('þ', "th"), ('ÿ', "y"), ('Ā', "A"),
    ('ā', "a"), ('Ă', "A"), ('ă', "a"), ('Ą', "A"), ('ą', "a"), ('Ć', "C"), ('ć', "c"),
    ('Č', "C"), ('č', "c"), ('Ď', "D"), ('ď', "d"), ('Đ', "D"), ('đ', "d"), ('Ē', "E"),
    ('ē', "e"), ('Ę', "E"), ('ę', "e"), ('Ě', "E"), ('ě', "e"), ('Ğ', "G"), ('ğ', "g"),
    ('Ī', "I"), ('ī', "i"), ('İ', "I"), ('ı', "i"), ('Ł', "L"), ('ł', "l"), ('Ń', "N"),
    ('ń', "n"), ('Ň', "N"), ('ň', "n"), ('Ō', "O"), ('ō', "o"), ('Ő', "O"), ('ő', "o"),
    ('Œ', "OE"), ('œ', "oe"), ('Ř', "R"), ('ř', "r"), ('Ś', "S"), ('ś', "s"), ('Ş', "S"),
    ('ş', "s"), ('Š', "S"), ('š', "s"), ('Ţ', "T"), ('ţ', "t"), ('Ť', "T"), ('ť', "t"),
    ('Ū', "U"), ('ū', "u"), ('Ů', "U"), ('ů', "u"), ('Ű', "U"), ('ű', "u"), ('Ÿ', "Y"),
    ('Ź', "Z"), ('ź', "z"), ('Ż', "Z"), ('ż', "z"), ('Ž', "Z"), ('ž', "z"),
];

lazy_static! {
    static ref DIACRITICS: AHashMap<char, &'static str> = DIACRITICS_TABLE.iter().copied().collect();
}

/// Remove diacritics from `text`. Combining marks are dropped, precomposed
/// Latin letters are mapped to their base letters.
pub fn fold_diacritics(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text.chars() {
        if ('\u{0300}'..='\u{036f}').contains(&c) {
            continue;
        }
        match DIACRITICS.get(&c) {
            Some(replacement) => folded.push_str(replacement),
            None => folded.push(c),
        }
    }
    folded
}

/// How a normalizer treats letter case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseFold {
    /// Keep the token as written.
    Keep,
    /// Lowercase the token.
    Lower,
    /// Uppercase the token.
    Upper,
}

impl CaseFold {
    fn apply(self, text: &str) -> String {
        match self {
            CaseFold::Keep => text.to_string(),
            CaseFold::Lower => text.to_lowercase(),
            CaseFold::Upper => text.to_uppercase(),
        }
    }
}

/// Per-token normalization pipeline.
#[derive(Debug)]
pub struct Normalizer {
    case: CaseFold,
    strip_diacritics: bool,
    stemmer: Option<Box<dyn Stemmer>>,
}

impl Normalizer {
    /// Create a normalizer. `stemmer` is `None` when stemming is off.
    pub fn new(case: CaseFold, strip_diacritics: bool, stemmer: Option<Box<dyn Stemmer>>) -> Self {
        Normalizer {
            case,
            strip_diacritics,
            stemmer,
        }
    }

    /// The case folding applied by this normalizer.
    pub fn case(&self) -> CaseFold {
        self.case
    }

    /// Normalize a single word: case, then diacritics, then stemming.
    pub fn normalize(&self, word: &str) -> String {
        let word = self.fold(word);
        match &self.stemmer {
            Some(stemmer) => stemmer.stem(&word),
            None => word,
        }
    }

    /// Normalize a wildcard pattern. Patterns are case and diacritics folded
    /// but never stemmed.
    pub fn normalize_pattern(&self, pattern: &str) -> String {
        self.fold(pattern)
    }

    /// Tokenize `text` on word boundaries and normalize every token.
    pub fn tokens(&self, text: &str) -> Result<Vec<Token>> {
        Ok(UnicodeWordTokenizer::new()
            .tokenize(text)?
            .map(|token| {
                let text = self.normalize(&token.text);
                token.with_text(text)
            })
            .collect())
    }

    fn fold(&self, text: &str) -> String {
        let cased = self.case.apply(text);
        if self.strip_diacritics {
            fold_diacritics(&cased)
        } else {
            cased
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::stemmer::SuffixStemmer;

    #[test]
    fn test_fold_diacritics() {
        assert_eq!(fold_diacritics("café"), "cafe");
        assert_eq!(fold_diacritics("Ærø"), "AEro");
        assert_eq!(fold_diacritics("Stra\u{00df}e"), "Strasse");
        assert_eq!(fold_diacritics("e\u{0301}te\u{0301}"), "ete");
        assert_eq!(fold_diacritics("plain"), "plain");
    }

    #[test]
    fn test_case_folds() {
        let keep = Normalizer::new(CaseFold::Keep, false, None);
        let lower = Normalizer::new(CaseFold::Lower, false, None);
        let upper = Normalizer::new(CaseFold::Upper, false, None);
        assert_eq!(keep.normalize("MiXed"), "MiXed");
        assert_eq!(lower.normalize("MiXed"), "mixed");
        assert_eq!(upper.normalize("MiXed"), "MIXED");
        assert_eq!(upper.case(), CaseFold::Upper);
    }

    #[test]
    fn test_stemming_after_folding() {
        let normalizer = Normalizer::new(CaseFold::Lower, true, Some(Box::new(SuffixStemmer::new())));
        assert_eq!(normalizer.normalize("Cafés"), "caf");
        assert_eq!(normalizer.normalize("Running"), "runn");
        assert_eq!(normalizer.normalize_pattern("Cafés.*"), "cafes.*");
    }

    #[test]
    fn test_tokens() {
        let normalizer = Normalizer::new(CaseFold::Lower, false, None);
        let tokens = normalizer.tokens("The Quick, brown fox").unwrap();
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["the", "quick", "brown", "fox"]);
        assert_eq!(tokens[3].position, 3);
    }
}
