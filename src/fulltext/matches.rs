//! Match sets.
//!
//! A text node satisfies a full-text expression when its match set is not
//! empty. A match is a list of string matches, one per query term that
//! contributed to it. Scan evaluation and index evaluation build match sets
//! with the functions below, from token positions obtained either by
//! tokenizing the text or by reading index postings.

use crate::fulltext::expr::WordsMode;
use crate::fulltext::options::FtOptions;
use crate::fulltext::position::PositionFilter;

/// A query term found in a text node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StringMatch {
    /// Position of the term in the query, counted over the whole expression.
    pub query_pos: u32,
    /// First token position covered.
    pub start: u32,
    /// Last token position covered.
    pub end: u32,
}

impl StringMatch {
    pub fn new(query_pos: u32, start: u32, end: u32) -> Self {
        StringMatch {
            query_pos,
            start,
            end,
        }
    }
}

/// One way a text node satisfies an expression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FtMatch {
    pub strings: Vec<StringMatch>,
}

impl FtMatch {
    /// A match made of one string match.
    pub fn single(string: StringMatch) -> Self {
        FtMatch {
            strings: vec![string],
        }
    }

    /// A match that covers no token. Produced by negation.
    pub fn empty() -> Self {
        FtMatch::default()
    }

    /// Concatenation of two matches.
    pub fn concat(&self, other: &FtMatch) -> FtMatch {
        let mut strings = Vec::with_capacity(self.strings.len() + other.strings.len());
        strings.extend_from_slice(&self.strings);
        strings.extend_from_slice(&other.strings);
        FtMatch { strings }
    }

    /// Whether the string matches occur in query order.
    pub fn is_ordered(&self) -> bool {
        let mut strings = self.strings.clone();
        strings.sort_by_key(|s| (s.query_pos, s.start));
        strings.windows(2).all(|pair| pair[0].start <= pair[1].start)
    }

    /// Whether every gap between consecutive string matches, in text order,
    /// lies within `[min, max]` tokens.
    pub fn within_distance(&self, min: u32, max: u32) -> bool {
        let mut strings = self.strings.clone();
        strings.sort_by_key(|s| (s.start, s.end));
        strings.windows(2).all(|pair| {
            let gap = i64::from(pair[1].start) - i64::from(pair[0].end) - 1;
            let gap = gap.max(0) as u64;
            u64::from(min) <= gap && gap <= u64::from(max)
        })
    }

    /// Whether all string matches fit into `size` consecutive tokens.
    pub fn within_window(&self, size: u32) -> bool {
        let start = self.strings.iter().map(|s| s.start).min();
        let end = self.strings.iter().map(|s| s.end).max();
        match (start, end) {
            (Some(start), Some(end)) => u64::from(end - start) < u64::from(size),
            _ => true,
        }
    }

    fn spans(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.strings.iter().map(|s| (s.start, s.end))
    }
}

/// Matches of a words selection.
///
/// `occurrences[i]` holds the ascending token positions of query term `i`
/// inside one text node; `base` is the query position of the first term.
pub fn words_matches(occurrences: &[Vec<u32>], mode: WordsMode, base: u32) -> Vec<FtMatch> {
    if occurrences.is_empty() {
        return Vec::new();
    }
    match mode {
        WordsMode::Any => {
            let mut matches: Vec<FtMatch> = occurrences
                .iter()
                .enumerate()
                .flat_map(|(term, positions)| {
                    positions.iter().map(move |&pos| {
                        FtMatch::single(StringMatch::new(base + term as u32, pos, pos))
                    })
                })
                .collect();
            matches.sort_by_key(|m| m.strings.first().map(|s| (s.start, s.query_pos)));
            matches
        }
        WordsMode::All => {
            let mut matches = vec![FtMatch::empty()];
            for (term, positions) in occurrences.iter().enumerate() {
                let strings: Vec<FtMatch> = positions
                    .iter()
                    .map(|&pos| FtMatch::single(StringMatch::new(base + term as u32, pos, pos)))
                    .collect();
                matches = and(&matches, &strings);
                if matches.is_empty() {
                    break;
                }
            }
            matches
        }
        WordsMode::Phrase => {
            let last = occurrences.len() as u32 - 1;
            occurrences[0]
                .iter()
                .filter(|&&start| {
                    occurrences
                        .iter()
                        .enumerate()
                        .skip(1)
                        .all(|(k, positions)| positions.binary_search(&(start + k as u32)).is_ok())
                })
                .map(|&start| FtMatch::single(StringMatch::new(base, start, start + last)))
                .collect()
        }
    }
}

/// Pairwise concatenation of two match sets.
pub fn and(left: &[FtMatch], right: &[FtMatch]) -> Vec<FtMatch> {
    left.iter()
        .flat_map(|l| right.iter().map(move |r| l.concat(r)))
        .collect()
}

/// Drop every match violating the positional constraints of `options` or
/// the position filter.
pub fn filter(
    matches: &mut Vec<FtMatch>,
    options: &FtOptions,
    position: PositionFilter,
    token_count: u32,
) {
    if !options.has_constraints() && position.is_any() {
        return;
    }
    matches.retain(|m| {
        (!options.is_ordered() || m.is_ordered())
            && options
                .distance
                .is_none_or(|d| m.within_distance(d.min, d.max))
            && options.window.is_none_or(|size| m.within_window(size))
            && position.accepts(m.spans(), token_count)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(m: &FtMatch) -> Vec<(u32, u32)> {
        m.strings.iter().map(|s| (s.query_pos, s.start)).collect()
    }

    #[test]
    fn test_any() {
        let matches = words_matches(&[vec![3], vec![0, 5]], WordsMode::Any, 0);
        let starts: Vec<_> = matches.iter().map(|m| m.strings[0].start).collect();
        assert_eq!(starts, vec![0, 3, 5]);
        assert!(words_matches(&[vec![], vec![]], WordsMode::Any, 0).is_empty());
    }

    #[test]
    fn test_all_is_cartesian() {
        let matches = words_matches(&[vec![1, 4], vec![2]], WordsMode::All, 10);
        assert_eq!(matches.len(), 2);
        assert_eq!(positions(&matches[0]), vec![(10, 1), (11, 2)]);
        assert_eq!(positions(&matches[1]), vec![(10, 4), (11, 2)]);
        assert!(words_matches(&[vec![1], vec![]], WordsMode::All, 0).is_empty());
    }

    #[test]
    fn test_phrase() {
        let matches = words_matches(&[vec![0, 4], vec![1, 7], vec![2]], WordsMode::Phrase, 0);
        assert_eq!(matches, vec![FtMatch::single(StringMatch::new(0, 0, 2))]);
        assert!(words_matches(&[vec![4], vec![3]], WordsMode::Phrase, 0).is_empty());
    }

    #[test]
    fn test_ordered_filter() {
        let mut matches = vec![
            FtMatch::single(StringMatch::new(0, 1, 1)).concat(&FtMatch::single(StringMatch::new(1, 3, 3))),
            FtMatch::single(StringMatch::new(0, 5, 5)).concat(&FtMatch::single(StringMatch::new(1, 3, 3))),
        ];
        filter(
            &mut matches,
            &FtOptions::new().with_ordered(true),
            PositionFilter::Any,
            6,
        );
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].strings[0].start, 1);
    }

    #[test]
    fn test_distance_and_window() {
        let m = FtMatch::single(StringMatch::new(0, 2, 2)).concat(&FtMatch::single(StringMatch::new(1, 5, 5)));
        assert!(m.within_distance(2, 2));
        assert!(!m.within_distance(0, 1));
        assert!(m.within_window(4));
        assert!(!m.within_window(3));
        assert!(FtMatch::empty().within_window(1));
    }

    #[test]
    fn test_position_filter_applies() {
        let mut matches = words_matches(&[vec![0, 3]], WordsMode::Any, 0);
        filter(&mut matches, &FtOptions::new(), PositionFilter::End, 4);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].strings[0].start, 3);
    }
}
