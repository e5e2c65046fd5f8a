//! Full-text matching: options, position filters, match sets, the
//! full-text expression tree and its index-backed iterators.
//!
//! A full-text expression can always be evaluated by scanning text; it can be
//! evaluated through a [`FullTextIndex`](crate::index::FullTextIndex) only
//! when [`FtExpr::index_options`] accepts the index's build options. Both
//! paths run the same normalization and the same match filtering, so they
//! return the same node ids.

pub mod expr;
pub mod iter;
pub mod matches;
pub mod options;
pub mod position;

pub use self::expr::{FtArray, FtExpr, FtWords, WordsMode};
pub use self::iter::{FtHits, FtIterator};
pub use self::matches::{FtMatch, StringMatch};
pub use self::options::{Distance, FtCase, FtIndexOptions, FtOptions, compatible};
pub use self::position::PositionFilter;
