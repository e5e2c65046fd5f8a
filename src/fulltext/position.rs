//! Position filters restricting where a match may occur in a text node.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Restriction on the token positions a match may cover.
///
/// A filter is a pure function of a match's token span, the position of the
/// match's anchor (its first string match) and the number of tokens of the
/// text node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionFilter {
    /// No restriction.
    #[default]
    Any,
    /// The match must cover the first token.
    Start,
    /// The match must cover the last token.
    End,
    /// Every string match must lie within `before` tokens before and
    /// `after` tokens after the anchor.
    Window { before: u32, after: u32 },
}

impl PositionFilter {
    /// Whether the filter restricts anything.
    pub fn is_any(&self) -> bool {
        matches!(self, PositionFilter::Any)
    }

    /// Check a match given the `(start, end)` token span of each of its
    /// string matches, anchor first.
    pub fn accepts<I>(&self, spans: I, token_count: u32) -> bool
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut spans = spans.into_iter();
        match *self {
            PositionFilter::Any => true,
            PositionFilter::Start => spans.any(|(start, _)| start == 0),
            PositionFilter::End => {
                token_count > 0 && spans.any(|(_, end)| end + 1 == token_count)
            }
            PositionFilter::Window { before, after } => match spans.next() {
                Some((anchor_start, anchor_end)) => {
                    let low = anchor_start.saturating_sub(before);
                    let high = anchor_end.saturating_add(after);
                    spans.all(|(start, end)| start >= low && end <= high)
                }
                None => false,
            },
        }
    }
}

impl fmt::Display for PositionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionFilter::Any => Ok(()),
            PositionFilter::Start => write!(f, "at start"),
            PositionFilter::End => write!(f, "at end"),
            PositionFilter::Window { before, after } => {
                write!(f, "within {before} before {after} after")
            }
        }
    }
}
