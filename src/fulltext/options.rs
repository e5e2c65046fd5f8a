//! Full-text match options and their negotiation against index options.
//!
//! [`FtIndexOptions`] describe how a [`FullTextIndex`](crate::index::FullTextIndex)
//! normalized its tokens. [`FtOptions`] describe what a query asks for; every
//! toggle is optional and unspecified toggles are inherited from the
//! enclosing array during compilation. [`compatible`] decides whether the
//! index can answer a query without changing its result.
//!
//! # Examples
//!
//! ```
//! use glaive::fulltext::options::{FtCase, FtIndexOptions, FtOptions, compatible};
//!
//! let index = FtIndexOptions { case_sensitive: true, ..FtIndexOptions::default() };
//! assert!(compatible(&FtOptions::new().with_case(FtCase::Sensitive), &index));
//! assert!(!compatible(&FtOptions::new(), &index));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::normalize::{CaseFold, Normalizer};
use crate::analysis::stemmer::stemmer_for;

/// Language assumed when none is given.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Case matching mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FtCase {
    /// Case is ignored on both sides.
    #[default]
    Insensitive,
    /// Tokens must match exactly.
    Sensitive,
    /// Query tokens are lowercased and matched exactly.
    Lower,
    /// Query tokens are uppercased and matched exactly.
    Upper,
}

impl fmt::Display for FtCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FtCase::Insensitive => write!(f, "case insensitive"),
            FtCase::Sensitive => write!(f, "case sensitive"),
            FtCase::Lower => write!(f, "lowercase"),
            FtCase::Upper => write!(f, "uppercase"),
        }
    }
}

/// Bounds on the number of tokens between consecutive string matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Distance {
    pub min: u32,
    pub max: u32,
}

/// Options a full-text index was built with. Immutable once the index exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FtIndexOptions {
    pub case_sensitive: bool,
    pub diacritics_sensitive: bool,
    pub stemming: bool,
    /// Whether wildcard queries may be answered by the index.
    pub wildcards: bool,
    pub language: String,
}

impl Default for FtIndexOptions {
    fn default() -> Self {
        FtIndexOptions {
            case_sensitive: false,
            diacritics_sensitive: false,
            stemming: false,
            wildcards: true,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl FtIndexOptions {
    /// Normalizer applied to every indexed token.
    pub fn normalizer(&self) -> Normalizer {
        let case = if self.case_sensitive {
            CaseFold::Keep
        } else {
            CaseFold::Lower
        };
        let stemmer = self.stemming.then(|| stemmer_for(&self.language));
        Normalizer::new(case, !self.diacritics_sensitive, stemmer)
    }
}

/// Match options requested by a query. `None` means "not specified".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FtOptions {
    pub case: Option<FtCase>,
    pub diacritics_sensitive: Option<bool>,
    pub stemming: Option<bool>,
    pub wildcards: Option<bool>,
    pub language: Option<String>,
    /// String matches must appear in query order.
    pub ordered: Option<bool>,
    pub distance: Option<Distance>,
    /// Maximum number of tokens spanned by a match.
    pub window: Option<u32>,
}

impl FtOptions {
    /// Options with nothing specified.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_case(mut self, case: FtCase) -> Self {
        self.case = Some(case);
        self
    }

    pub fn with_diacritics_sensitive(mut self, sensitive: bool) -> Self {
        self.diacritics_sensitive = Some(sensitive);
        self
    }

    pub fn with_stemming(mut self, stemming: bool) -> Self {
        self.stemming = Some(stemming);
        self
    }

    pub fn with_wildcards(mut self, wildcards: bool) -> Self {
        self.wildcards = Some(wildcards);
        self
    }

    pub fn with_language<S: Into<String>>(mut self, language: S) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_ordered(mut self, ordered: bool) -> Self {
        self.ordered = Some(ordered);
        self
    }

    pub fn with_distance(mut self, min: u32, max: u32) -> Self {
        self.distance = Some(Distance { min, max });
        self
    }

    pub fn with_window(mut self, window: u32) -> Self {
        self.window = Some(window);
        self
    }

    /// Fill every unspecified match toggle from `parent`. Positional
    /// constraints (order, distance, window) belong to the expression they
    /// are attached to and are not inherited.
    pub fn inherit(&mut self, parent: &FtOptions) {
        self.case = self.case.or(parent.case);
        self.diacritics_sensitive = self.diacritics_sensitive.or(parent.diacritics_sensitive);
        self.stemming = self.stemming.or(parent.stemming);
        self.wildcards = self.wildcards.or(parent.wildcards);
        if self.language.is_none() {
            self.language.clone_from(&parent.language);
        }
    }

    /// Whether any positional constraint is set.
    pub fn has_constraints(&self) -> bool {
        self.ordered == Some(true) || self.distance.is_some() || self.window.is_some()
    }

    pub fn case_mode(&self) -> FtCase {
        self.case.unwrap_or_default()
    }

    pub fn is_diacritics_sensitive(&self) -> bool {
        self.diacritics_sensitive.unwrap_or(false)
    }

    pub fn uses_stemming(&self) -> bool {
        self.stemming.unwrap_or(false)
    }

    pub fn uses_wildcards(&self) -> bool {
        self.wildcards.unwrap_or(false)
    }

    pub fn is_ordered(&self) -> bool {
        self.ordered.unwrap_or(false)
    }

    pub fn language_tag(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }

    /// Normalizer applied to document tokens while scanning.
    pub fn document_normalizer(&self) -> Normalizer {
        let case = match self.case_mode() {
            FtCase::Insensitive => CaseFold::Lower,
            FtCase::Sensitive | FtCase::Lower | FtCase::Upper => CaseFold::Keep,
        };
        self.normalizer(case)
    }

    /// Normalizer applied to query tokens.
    pub fn query_normalizer(&self) -> Normalizer {
        let case = match self.case_mode() {
            FtCase::Insensitive | FtCase::Lower => CaseFold::Lower,
            FtCase::Sensitive => CaseFold::Keep,
            FtCase::Upper => CaseFold::Upper,
        };
        self.normalizer(case)
    }

    fn normalizer(&self, case: CaseFold) -> Normalizer {
        let stemmer = self.uses_stemming().then(|| stemmer_for(self.language_tag()));
        Normalizer::new(case, !self.is_diacritics_sensitive(), stemmer)
    }

    /// Check these options against an index. See [`compatible`].
    pub fn compatible_with(&self, index: &FtIndexOptions) -> bool {
        compatible(self, index)
    }
}

impl fmt::Display for FtOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(case) = self.case {
            parts.push(case.to_string());
        }
        if let Some(sensitive) = self.diacritics_sensitive {
            parts.push(format!("diacritics {}", if sensitive { "sensitive" } else { "insensitive" }));
        }
        if let Some(stemming) = self.stemming {
            parts.push(if stemming { "stemming" } else { "no stemming" }.to_string());
        }
        if let Some(wildcards) = self.wildcards {
            parts.push(if wildcards { "wildcards" } else { "no wildcards" }.to_string());
        }
        if let Some(language) = &self.language {
            parts.push(format!("language \"{language}\""));
        }
        if self.is_ordered() {
            parts.push("ordered".to_string());
        }
        if let Some(Distance { min, max }) = self.distance {
            parts.push(format!("distance from {min} to {max} words"));
        }
        if let Some(window) = self.window {
            parts.push(format!("window {window} words"));
        }
        write!(f, "{}", parts.join(" "))
    }
}

/// Whether an index built with `index` returns exactly what a scan with
/// `query` returns.
///
/// Every match toggle the query resolves to must be enforced by the index in
/// the same way. The language only matters when the query names one or
/// stems. Positional constraints are checked per candidate at iteration time
/// and never make a query incompatible.
pub fn compatible(query: &FtOptions, index: &FtIndexOptions) -> bool {
    let case = match query.case_mode() {
        FtCase::Insensitive => !index.case_sensitive,
        FtCase::Sensitive | FtCase::Lower | FtCase::Upper => index.case_sensitive,
    };
    let language = if query.language.is_some() || query.uses_stemming() {
        query.language_tag().eq_ignore_ascii_case(&index.language)
    } else {
        true
    };

    case
        && query.is_diacritics_sensitive() == index.diacritics_sensitive
        && query.uses_stemming() == index.stemming
        && (!query.uses_wildcards() || index.wildcards)
        && language
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_match_default_index() {
        assert!(compatible(&FtOptions::new(), &FtIndexOptions::default()));
        assert!(compatible(
            &FtOptions::new().with_wildcards(true).with_window(3).with_ordered(true),
            &FtIndexOptions::default()
        ));
    }

    #[test]
    fn test_case_negotiation() {
        let insensitive = FtIndexOptions::default();
        let sensitive = FtIndexOptions {
            case_sensitive: true,
            ..FtIndexOptions::default()
        };

        for case in [FtCase::Sensitive, FtCase::Lower, FtCase::Upper] {
            let query = FtOptions::new().with_case(case);
            assert!(!compatible(&query, &insensitive), "{case}");
            assert!(compatible(&query, &sensitive), "{case}");
        }
        assert!(!compatible(&FtOptions::new(), &sensitive));
    }

    #[test]
    fn test_toggles_must_agree() {
        let index = FtIndexOptions::default();
        assert!(!compatible(&FtOptions::new().with_stemming(true), &index));
        assert!(!compatible(&FtOptions::new().with_diacritics_sensitive(true), &index));

        let no_wildcards = FtIndexOptions {
            wildcards: false,
            ..FtIndexOptions::default()
        };
        assert!(!compatible(&FtOptions::new().with_wildcards(true), &no_wildcards));
        assert!(compatible(&FtOptions::new().with_wildcards(false), &no_wildcards));
    }

    #[test]
    fn test_language() {
        let index = FtIndexOptions::default();
        assert!(compatible(&FtOptions::new().with_language("EN"), &index));
        assert!(!compatible(&FtOptions::new().with_language("de"), &index));

        let german = FtIndexOptions {
            stemming: true,
            language: "de".to_string(),
            ..FtIndexOptions::default()
        };
        assert!(!compatible(&FtOptions::new().with_stemming(true), &german));
        assert!(compatible(&FtOptions::new().with_stemming(true).with_language("de"), &german));
    }

    #[test]
    fn test_inherit() {
        let parent = FtOptions::new()
            .with_case(FtCase::Sensitive)
            .with_language("de")
            .with_window(4);
        let mut child = FtOptions::new().with_stemming(true);
        child.inherit(&parent);

        assert_eq!(child.case, Some(FtCase::Sensitive));
        assert_eq!(child.language.as_deref(), Some("de"));
        assert_eq!(child.stemming, Some(true));
        assert_eq!(child.window, None);
        assert!(!child.has_constraints());
    }

    #[test]
    fn test_normalizers() {
        let upper = FtOptions::new().with_case(FtCase::Upper);
        assert_eq!(upper.query_normalizer().normalize("Fox"), "FOX");
        assert_eq!(upper.document_normalizer().normalize("Fox"), "Fox");

        let insensitive = FtOptions::new();
        assert_eq!(insensitive.query_normalizer().normalize("Fóx"), "fox");
        assert_eq!(insensitive.document_normalizer().normalize("FOX"), "fox");
    }

    #[test]
    fn test_display() {
        let options = FtOptions::new().with_case(FtCase::Sensitive).with_distance(0, 2);
        assert_eq!(options.to_string(), "case sensitive distance from 0 to 2 words");
        assert_eq!(FtOptions::new().to_string(), "");
    }

    #[test]
    fn test_deserialize_index_options() {
        let options: FtIndexOptions = serde_json::from_str(r#"{"stemming": true}"#).unwrap();
        assert!(options.stemming);
        assert!(options.wildcards);
        assert_eq!(options.language, "en");
    }
}
