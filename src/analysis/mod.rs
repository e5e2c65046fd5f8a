//! Text analysis for the full-text index and full-text matching.
//!
//! The pipeline is: tokenize ([`tokenizer`]), then normalize each token
//! according to the resolved match options ([`normalize`]): case folding,
//! diacritics stripping and stemming ([`stemmer`]). Wildcard query tokens are
//! compiled by [`wildcard`] instead of being stemmed.
//!
//! The index and the scan evaluator run the exact same pipeline, which is
//! what makes an index-backed plan and a scan plan return identical results
//! whenever the query options are compatible with the index options.

pub mod normalize;
pub mod stemmer;
pub mod token;
pub mod tokenizer;
pub mod wildcard;

pub use self::normalize::{CaseFold, Normalizer, fold_diacritics};
pub use self::stemmer::{IdentityStemmer, Stemmer, SuffixStemmer, stemmer_for};
pub use self::token::Token;
pub use self::tokenizer::{Tokenizer, UnicodeWordTokenizer, WhitespaceTokenizer};
pub use self::wildcard::Wildcard;
