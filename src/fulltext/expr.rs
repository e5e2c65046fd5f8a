//! Full-text expressions.
//!
//! An [`FtExpr`] is a tree of word selections combined by `ftand`, `ftor`
//! and `ftnot`. It goes through three steps:
//!
//! 1. [`FtExpr::compile`] resolves inherited options, normalizes the query
//!    terms and simplifies the tree.
//! 2. [`FtExpr::index_options`] tells whether a full-text index built with
//!    given options can answer the expression.
//! 3. Evaluation either scans text ([`FtExpr::contains`]) or streams hits
//!    from the index ([`FtExpr::index_equivalent`]).
//!
//! # Examples
//!
//! ```
//! use glaive::fulltext::expr::{FtExpr, WordsMode};
//! use glaive::fulltext::options::FtOptions;
//!
//! let expr = FtExpr::and(vec![
//!     FtExpr::words("quick", WordsMode::Any),
//!     FtExpr::words("fox", WordsMode::Any),
//! ])
//! .compile(&FtOptions::new())
//! .unwrap();
//!
//! assert!(expr.contains("The Quick brown fox").unwrap());
//! assert!(!expr.contains("The quick brown dog").unwrap());
//! ```

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::{Tokenizer, UnicodeWordTokenizer, WhitespaceTokenizer};
use crate::analysis::wildcard::Wildcard;
use crate::error::Result;
use crate::fulltext::iter::{FtAndIter, FtIterator, FtOrIter, FtWordsIter};
use crate::fulltext::matches::{self, FtMatch};
use crate::fulltext::options::{FtIndexOptions, FtOptions};
use crate::fulltext::position::PositionFilter;
use crate::index::{FtPosting, FullTextIndex};

/// How the terms of a words selection combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordsMode {
    /// Any term.
    #[default]
    Any,
    /// Every term, anywhere.
    All,
    /// Every term, consecutively and in order.
    Phrase,
}

impl fmt::Display for WordsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordsMode::Any => write!(f, "any"),
            WordsMode::All => write!(f, "all"),
            WordsMode::Phrase => write!(f, "phrase"),
        }
    }
}

/// A normalized query term.
#[derive(Debug, Clone)]
pub enum QueryTerm {
    /// Exact normalized token.
    Token(String),
    /// Wildcard pattern, folded but not stemmed.
    Pattern(Wildcard),
}

impl QueryTerm {
    /// Whether a normalized document token matches this term.
    pub fn matches(&self, token: &str) -> bool {
        match self {
            QueryTerm::Token(term) => term == token,
            QueryTerm::Pattern(wildcard) => wildcard.matches(token),
        }
    }

    /// Occurrences of this term in `index`.
    pub(crate) fn postings<'a>(
        &self,
        index: &'a FullTextIndex,
    ) -> Cow<'a, [FtPosting]> {
        match self {
            QueryTerm::Token(term) => Cow::Borrowed(index.postings(term)),
            QueryTerm::Pattern(wildcard) => Cow::Owned(index.wildcard_postings(wildcard)),
        }
    }
}

/// A words selection: search text, mode, options and position filter.
#[derive(Debug, Clone)]
pub struct FtWords {
    pub text: String,
    pub mode: WordsMode,
    pub options: FtOptions,
    pub position: PositionFilter,
    /// Query position of the first term, assigned during compilation.
    base: u32,
    /// Normalized terms, resolved during compilation.
    terms: Vec<QueryTerm>,
}

impl FtWords {
    pub fn new<S: Into<String>>(text: S, mode: WordsMode) -> Self {
        FtWords {
            text: text.into(),
            mode,
            options: FtOptions::default(),
            position: PositionFilter::Any,
            base: 0,
            terms: Vec::new(),
        }
    }

    pub fn terms(&self) -> &[QueryTerm] {
        &self.terms
    }

    pub(crate) fn base(&self) -> u32 {
        self.base
    }

    fn resolve_terms(&self) -> Result<Vec<QueryTerm>> {
        let normalizer = self.options.query_normalizer();
        if !self.options.uses_wildcards() {
            return Ok(normalizer
                .tokens(&self.text)?
                .into_iter()
                .map(|token| QueryTerm::Token(token.text))
                .collect());
        }

        let mut terms = Vec::new();
        for raw in WhitespaceTokenizer::new().tokenize(&self.text)? {
            if Wildcard::has_wildcards(&raw.text) {
                let pattern = normalizer.normalize_pattern(&raw.text);
                terms.push(QueryTerm::Pattern(Wildcard::new(&pattern)?));
            } else {
                terms.extend(
                    normalizer
                        .tokens(&raw.text)?
                        .into_iter()
                        .map(|token| QueryTerm::Token(token.text)),
                );
            }
        }
        Ok(terms)
    }

    fn scan(&self, text: &str, token_count: u32) -> Result<Vec<FtMatch>> {
        if self.terms.is_empty() {
            return Ok(Vec::new());
        }
        let tokens = self.options.document_normalizer().tokens(text)?;
        let occurrences: Vec<Vec<u32>> = self
            .terms
            .iter()
            .map(|term| {
                tokens
                    .iter()
                    .filter(|token| term.matches(&token.text))
                    .map(|token| token.position)
                    .collect()
            })
            .collect();

        let mut found = matches::words_matches(&occurrences, self.mode, self.base);
        matches::filter(&mut found, &self.options, self.position, token_count);
        Ok(found)
    }
}

/// Operands of `ftand` / `ftor` plus the options and position filter that
/// apply to the combined matches.
#[derive(Debug, Clone, Default)]
pub struct FtArray {
    pub exprs: Vec<FtExpr>,
    pub options: FtOptions,
    pub position: PositionFilter,
}

impl FtArray {
    pub fn new(exprs: Vec<FtExpr>) -> Self {
        FtArray {
            exprs,
            ..FtArray::default()
        }
    }

    /// Whether the array adds nothing beyond combining its operands.
    fn is_unconstrained(&self) -> bool {
        !self.options.has_constraints() && self.position.is_any()
    }

    fn compile(self, parent: &FtOptions, counter: &mut u32, conjunctive: bool) -> Result<FtExpr> {
        let mut options = self.options;
        options.inherit(parent);

        let mut exprs = Vec::with_capacity(self.exprs.len());
        for expr in self.exprs {
            match expr.compile_with(&options, counter)? {
                FtExpr::And(inner) if conjunctive && inner.is_unconstrained() => {
                    exprs.extend(inner.exprs)
                }
                FtExpr::Or(inner) if !conjunctive && inner.is_unconstrained() => {
                    exprs.extend(inner.exprs)
                }
                // Empty search text matches nothing and cannot widen a disjunction.
                FtExpr::Words(words) if !conjunctive && words.terms.is_empty() => {}
                compiled => exprs.push(compiled),
            }
        }

        let unconstrained = !options.has_constraints() && self.position.is_any();
        let exprs = match <[FtExpr; 1]>::try_from(exprs) {
            Ok([only]) if unconstrained => return Ok(only),
            Ok([only]) => vec![only],
            Err(exprs) => exprs,
        };

        let array = FtArray {
            exprs,
            options,
            position: self.position,
        };
        Ok(if conjunctive {
            FtExpr::And(array)
        } else {
            FtExpr::Or(array)
        })
    }
}

/// Full-text selection tree.
#[derive(Debug, Clone)]
pub enum FtExpr {
    Words(FtWords),
    And(FtArray),
    Or(FtArray),
    Not(Box<FtExpr>),
}

impl FtExpr {
    /// Words selection with default options.
    pub fn words<S: Into<String>>(text: S, mode: WordsMode) -> Self {
        FtExpr::Words(FtWords::new(text, mode))
    }

    /// Conjunction of `exprs`.
    pub fn and(exprs: Vec<FtExpr>) -> Self {
        FtExpr::And(FtArray::new(exprs))
    }

    /// Disjunction of `exprs`.
    pub fn or(exprs: Vec<FtExpr>) -> Self {
        FtExpr::Or(FtArray::new(exprs))
    }

    /// Negation of `expr`.
    pub fn not(expr: FtExpr) -> Self {
        FtExpr::Not(Box::new(expr))
    }

    /// Attach options to this node.
    pub fn with_options(self, options: FtOptions) -> Self {
        match self {
            FtExpr::Words(mut words) => {
                words.options = options;
                FtExpr::Words(words)
            }
            FtExpr::And(mut array) => {
                array.options = options;
                FtExpr::And(array)
            }
            FtExpr::Or(mut array) => {
                array.options = options;
                FtExpr::Or(array)
            }
            FtExpr::Not(inner) => FtExpr::Not(Box::new(inner.with_options(options))),
        }
    }

    /// Attach a position filter to this node. Ignored by negations.
    pub fn with_position(mut self, position: PositionFilter) -> Self {
        match &mut self {
            FtExpr::Words(words) => words.position = position,
            FtExpr::And(array) | FtExpr::Or(array) => array.position = position,
            FtExpr::Not(_) => {}
        }
        self
    }

    /// Resolve options inherited from `parent`, normalize query terms and
    /// simplify the tree. Must run before evaluation.
    pub fn compile(self, parent: &FtOptions) -> Result<FtExpr> {
        let mut counter = 0;
        self.compile_with(parent, &mut counter)
    }

    fn compile_with(self, parent: &FtOptions, counter: &mut u32) -> Result<FtExpr> {
        match self {
            FtExpr::Words(mut words) => {
                words.options.inherit(parent);
                words.terms = words.resolve_terms()?;
                words.base = *counter;
                *counter += words.terms.len() as u32;
                Ok(FtExpr::Words(words))
            }
            FtExpr::And(array) => array.compile(parent, counter, true),
            FtExpr::Or(array) => array.compile(parent, counter, false),
            FtExpr::Not(inner) => Ok(FtExpr::Not(Box::new(inner.compile_with(parent, counter)?))),
        }
    }

    /// Whether an index built with `index` can answer this expression.
    /// Arrays need every operand to be compatible; negations never are.
    pub fn index_options(&self, index: &FtIndexOptions) -> bool {
        match self {
            FtExpr::Words(words) => words.options.compatible_with(index),
            FtExpr::And(array) | FtExpr::Or(array) => {
                array.exprs.iter().all(|expr| expr.index_options(index))
            }
            FtExpr::Not(_) => false,
        }
    }

    /// Index-backed evaluation. Returns `None` when part of the expression
    /// cannot be answered from an index.
    pub fn index_equivalent<'a>(&self, index: &'a FullTextIndex) -> Option<Box<dyn FtIterator + 'a>> {
        match self {
            FtExpr::Words(words) => Some(Box::new(FtWordsIter::new(words, index))),
            FtExpr::And(array) => {
                let children = array
                    .exprs
                    .iter()
                    .map(|expr| expr.index_equivalent(index))
                    .collect::<Option<Vec<_>>>()?;
                Some(Box::new(FtAndIter::new(
                    children,
                    array.options.clone(),
                    array.position,
                    index,
                )))
            }
            FtExpr::Or(array) => {
                let children = array
                    .exprs
                    .iter()
                    .map(|expr| expr.index_equivalent(index))
                    .collect::<Option<Vec<_>>>()?;
                Some(Box::new(FtOrIter::new(
                    children,
                    array.options.clone(),
                    array.position,
                    index,
                )))
            }
            FtExpr::Not(_) => None,
        }
    }

    /// Whether `text` satisfies this expression.
    pub fn contains(&self, text: &str) -> Result<bool> {
        Ok(!self.scan_matches(text)?.is_empty())
    }

    /// Surviving matches of this expression in `text`.
    pub fn scan_matches(&self, text: &str) -> Result<Vec<FtMatch>> {
        let token_count = UnicodeWordTokenizer::new().tokenize(text)?.count() as u32;
        self.scan(text, token_count)
    }

    fn scan(&self, text: &str, token_count: u32) -> Result<Vec<FtMatch>> {
        match self {
            FtExpr::Words(words) => words.scan(text, token_count),
            FtExpr::And(array) => {
                let mut combined = vec![FtMatch::empty()];
                for expr in &array.exprs {
                    let found = expr.scan(text, token_count)?;
                    combined = matches::and(&combined, &found);
                    if combined.is_empty() {
                        return Ok(combined);
                    }
                }
                if array.exprs.is_empty() {
                    combined.clear();
                }
                matches::filter(&mut combined, &array.options, array.position, token_count);
                Ok(combined)
            }
            FtExpr::Or(array) => {
                let mut combined = Vec::new();
                for expr in &array.exprs {
                    combined.extend(expr.scan(text, token_count)?);
                }
                matches::filter(&mut combined, &array.options, array.position, token_count);
                Ok(combined)
            }
            FtExpr::Not(inner) => Ok(if inner.scan(text, token_count)?.is_empty() {
                vec![FtMatch::empty()]
            } else {
                Vec::new()
            }),
        }
    }
}

impl fmt::Display for FtExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn suffix(
            f: &mut fmt::Formatter<'_>,
            options: &FtOptions,
            position: PositionFilter,
        ) -> fmt::Result {
            let options = options.to_string();
            if !options.is_empty() {
                write!(f, " {options}")?;
            }
            if !position.is_any() {
                write!(f, " {position}")?;
            }
            Ok(())
        }

        fn array(f: &mut fmt::Formatter<'_>, array: &FtArray, op: &str) -> fmt::Result {
            write!(f, "(")?;
            for (i, expr) in array.exprs.iter().enumerate() {
                if i > 0 {
                    write!(f, " {op} ")?;
                }
                write!(f, "{expr}")?;
            }
            write!(f, ")")?;
            suffix(f, &array.options, array.position)
        }

        match self {
            FtExpr::Words(words) => {
                write!(f, "{:?} {}", words.text, words.mode)?;
                suffix(f, &words.options, words.position)
            }
            FtExpr::And(a) => array(f, a, "ftand"),
            FtExpr::Or(a) => array(f, a, "ftor"),
            FtExpr::Not(inner) => write!(f, "ftnot {inner}"),
        }
    }
}
