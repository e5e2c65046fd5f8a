//! Full-text wildcard patterns.
//!
//! Supports the XQuery Full Text wildcard syntax:
//! - `.` matches exactly one character
//! - `.?` matches zero or one character
//! - `.*` matches zero or more characters
//! - `.+` matches one or more characters
//! - `.{n,m}` matches between `n` and `m` characters
//! - `\` escapes the following character
//!
//! # Examples
//!
//! ```
//! use glaive::analysis::wildcard::Wildcard;
//!
//! let wildcard = Wildcard::new("comp.*").unwrap();
//! assert!(wildcard.matches("computer"));
//! assert!(wildcard.matches("comp"));
//! assert!(!wildcard.matches("compact disc"));
//! ```

use std::fmt;

use regex::Regex;

use crate::error::{GlaiveError, Result};

/// A compiled wildcard pattern, anchored at both ends.
#[derive(Clone)]
pub struct Wildcard {
    pattern: String,
    regex: Regex,
}

impl fmt::Debug for Wildcard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wildcard")
            .field("pattern", &self.pattern)
            .finish()
    }
}

impl Wildcard {
    /// Compile `pattern`.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&Self::compile_pattern(pattern)?).map_err(|e| {
            GlaiveError::query(format!("invalid wildcard pattern '{pattern}': {e}"))
        })?;
        Ok(Wildcard {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// The source pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Check if a term matches the whole pattern.
    pub fn matches(&self, term: &str) -> bool {
        self.regex.is_match(term)
    }

    /// Whether `pattern` contains any unescaped wildcard.
    pub fn has_wildcards(pattern: &str) -> bool {
        let mut escaped = false;
        for c in pattern.chars() {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '.' => return true,
                _ => {}
            }
        }
        false
    }

    /// Translate the wildcard syntax into an anchored regular expression.
    fn compile_pattern(pattern: &str) -> Result<String> {
        let mut regex = String::from("(?s)^");
        let mut chars = pattern.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some(escaped) => regex.push_str(&regex::escape(&escaped.to_string())),
                    None => {
                        return Err(GlaiveError::query(format!(
                            "wildcard pattern '{pattern}' ends with an escape character"
                        )));
                    }
                },
                '.' => {
                    regex.push('.');
                    match chars.peek() {
                        Some(&q @ ('?' | '*' | '+')) => {
                            regex.push(q);
                            chars.next();
                        }
                        Some('{') => {
                            chars.next();
                            let mut range = String::new();
                            loop {
                                match chars.next() {
                                    Some('}') => break,
                                    Some(d) if d.is_ascii_digit() || d == ',' => range.push(d),
                                    _ => {
                                        return Err(GlaiveError::query(format!(
                                            "malformed repetition in wildcard pattern '{pattern}'"
                                        )));
                                    }
                                }
                            }
                            let valid = match range.split_once(',') {
                                Some((min, max)) => {
                                    !min.is_empty()
                                        && !max.is_empty()
                                        && min.parse::<u32>().ok() <= max.parse::<u32>().ok()
                                }
                                None => false,
                            };
                            if !valid {
                                return Err(GlaiveError::query(format!(
                                    "malformed repetition in wildcard pattern '{pattern}'"
                                )));
                            }
                            regex.push('{');
                            regex.push_str(&range);
                            regex.push('}');
                        }
                        _ => {}
                    }
                }
                c => regex.push_str(&regex::escape(&c.to_string())),
            }
        }

        regex.push('$');
        Ok(regex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_char() {
        let wildcard = Wildcard::new("c.t").unwrap();
        assert!(wildcard.matches("cat"));
        assert!(wildcard.matches("cut"));
        assert!(!wildcard.matches("ct"));
        assert!(!wildcard.matches("coat"));
    }

    #[test]
    fn test_repetitions() {
        assert!(Wildcard::new("colo.?r").unwrap().matches("color"));
        assert!(Wildcard::new("colo.?r").unwrap().matches("colour"));
        assert!(Wildcard::new(".+ing").unwrap().matches("running"));
        assert!(!Wildcard::new(".+ing").unwrap().matches("ing"));
        let range = Wildcard::new("a.{1,2}b").unwrap();
        assert!(range.matches("axb"));
        assert!(range.matches("axxb"));
        assert!(!range.matches("axxxb"));
    }

    #[test]
    fn test_escapes_and_literals() {
        let wildcard = Wildcard::new("3\\.14").unwrap();
        assert!(wildcard.matches("3.14"));
        assert!(!wildcard.matches("3x14"));
        assert!(Wildcard::new("a+b").unwrap().matches("a+b"));
        assert!(!Wildcard::has_wildcards("3\\.14"));
        assert!(Wildcard::has_wildcards("3.14"));
    }

    #[test]
    fn test_malformed_patterns() {
        assert!(Wildcard::new("abc\\").is_err());
        assert!(Wildcard::new("a.{2").is_err());
        assert!(Wildcard::new("a.{3,1}").is_err());
        assert!(Wildcard::new("a.{x,1}").is_err());
    }
}
