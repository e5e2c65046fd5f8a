//! Integer formatting pictures for `format-integer`.
//!
//! Parsed pictures are shared through a [`FormatCache`]. The cache creates
//! a missing entry under its lock, so concurrent first uses of the same
//! picture never parse it twice.
//!
//! # Examples
//!
//! ```
//! use glaive::query::format::FormatCache;
//!
//! let cache = FormatCache::new();
//! assert_eq!(cache.get("#,##0").unwrap().format(1234567), "1,234,567");
//! assert_eq!(cache.get("w").unwrap().format(42), "forty-two");
//! assert_eq!(cache.len(), 2);
//! ```

use std::collections::hash_map::Entry;
use std::sync::Arc;

use ahash::AHashMap;
use log::trace;
use parking_lot::Mutex;

use crate::error::{GlaiveError, Result};

/// Case of spelled-out numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordCase {
    Lower,
    Upper,
    Title,
}

/// Digit grouping of a decimal picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grouping {
    None,
    /// A separator every `every` digits.
    Regular { every: usize, separator: char },
    /// Separators at fixed digit counts from the right.
    Explicit(Vec<(usize, char)>),
}

/// A parsed `format-integer` picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntFormat {
    Decimal {
        min_digits: usize,
        grouping: Grouping,
        ordinal: bool,
    },
    Alpha {
        upper: bool,
    },
    Roman {
        upper: bool,
    },
    Words {
        case: WordCase,
        ordinal: bool,
    },
}

impl IntFormat {
    /// Parse a picture string such as `1`, `001`, `#,##0`, `a`, `I`, `w`,
    /// optionally followed by `;o` (ordinal) or `;c` (cardinal).
    pub fn parse(picture: &str) -> Result<Self> {
        let (primary, modifier) = picture.split_once(';').unwrap_or((picture, ""));
        let ordinal = match modifier {
            "" | "c" => false,
            "o" => true,
            other => {
                return Err(GlaiveError::query(format!(
                    "invalid format modifier '{other}' in picture '{picture}'"
                )));
            }
        };

        match primary {
            "a" | "A" => Ok(IntFormat::Alpha {
                upper: primary == "A",
            }),
            "i" | "I" => Ok(IntFormat::Roman {
                upper: primary == "I",
            }),
            "w" => Ok(IntFormat::Words {
                case: WordCase::Lower,
                ordinal,
            }),
            "W" => Ok(IntFormat::Words {
                case: WordCase::Upper,
                ordinal,
            }),
            "Ww" => Ok(IntFormat::Words {
                case: WordCase::Title,
                ordinal,
            }),
            _ => Self::parse_decimal(primary, ordinal)
                .ok_or_else(|| GlaiveError::query(format!("invalid picture '{picture}'"))),
        }
    }

    fn parse_decimal(picture: &str, ordinal: bool) -> Option<Self> {
        let chars: Vec<char> = picture.chars().collect();
        if chars.is_empty() {
            return None;
        }

        let mut min_digits = 0;
        let mut separators = Vec::new();
        let mut previous_separator = true;
        let mut seen_mandatory = false;
        for (i, &c) in chars.iter().enumerate() {
            match c {
                '#' if seen_mandatory => return None,
                '#' => {
                    previous_separator = false;
                }
                '0'..='9' => {
                    seen_mandatory = true;
                    min_digits += 1;
                    previous_separator = false;
                }
                c if c.is_alphanumeric() => return None,
                c => {
                    if previous_separator || i + 1 == chars.len() {
                        return None;
                    }
                    separators.push((i, c));
                    previous_separator = true;
                }
            }
        }
        if min_digits == 0 {
            return None;
        }

        // Distance of every separator from the right end, in digits.
        let positions: Vec<(usize, char)> = separators
            .iter()
            .map(|&(i, c)| {
                let right = chars[i + 1..].iter().filter(|&&d| d == '#' || d.is_ascii_digit()).count();
                (right, c)
            })
            .rev()
            .collect();

        let grouping = match positions.as_slice() {
            [] => Grouping::None,
            [(first, separator), ..] => {
                let regular = positions
                    .iter()
                    .enumerate()
                    .all(|(k, &(pos, c))| c == *separator && pos == first * (k + 1));
                if regular {
                    Grouping::Regular {
                        every: *first,
                        separator: *separator,
                    }
                } else {
                    Grouping::Explicit(positions.clone())
                }
            }
        };

        Some(IntFormat::Decimal {
            min_digits,
            grouping,
            ordinal,
        })
    }

    /// Format `n` with this picture.
    pub fn format(&self, n: i64) -> String {
        match self {
            IntFormat::Decimal {
                min_digits,
                grouping,
                ordinal,
            } => {
                let mut out = decimal(n, *min_digits, grouping);
                if *ordinal {
                    out.push_str(ordinal_suffix(n.unsigned_abs()));
                }
                out
            }
            IntFormat::Alpha { upper } if n > 0 => alpha(n as u64, *upper),
            IntFormat::Roman { upper } if (1..5000).contains(&n) => roman(n as u64, *upper),
            IntFormat::Alpha { .. } | IntFormat::Roman { .. } => n.to_string(),
            IntFormat::Words { case, ordinal } => {
                let mut out = words(n);
                if *ordinal {
                    out = ordinal_words(&out);
                }
                match case {
                    WordCase::Lower => out,
                    WordCase::Upper => out.to_uppercase(),
                    WordCase::Title => title_case(&out),
                }
            }
        }
    }
}

fn decimal(n: i64, min_digits: usize, grouping: &Grouping) -> String {
    let digits = format!("{:0>width$}", n.unsigned_abs(), width = min_digits);
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        let right = len - i;
        if i > 0 {
            match grouping {
                Grouping::None => {}
                Grouping::Regular { every, separator } => {
                    if right % every == 0 {
                        out.push(*separator);
                    }
                }
                Grouping::Explicit(positions) => {
                    if let Some(&(_, separator)) = positions.iter().find(|(pos, _)| *pos == right) {
                        out.push(separator);
                    }
                }
            }
        }
        out.push(c);
    }
    out
}

fn ordinal_suffix(n: u64) -> &'static str {
    match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

fn alpha(mut n: u64, upper: bool) -> String {
    let base = if upper { b'A' } else { b'a' };
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push((base + (n % 26) as u8) as char);
        n /= 26;
    }
    letters.iter().rev().collect()
}

fn roman(mut n: u64, upper: bool) -> String {
    const NUMERALS: &[(u64, &str)] = &[
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut out = String::new();
    for &(value, numeral) in NUMERALS {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    if upper { out.to_uppercase() } else { out }
}

const ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];
const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];
const SCALES: [&str; 7] = [
    "", "thousand", "million", "billion", "trillion", "quadrillion", "quintillion",
];

fn words(n: i64) -> String {
    let mut value = n.unsigned_abs();
    if value == 0 {
        return ONES[0].to_string();
    }

    let mut groups = Vec::new();
    let mut scale = 0;
    while value > 0 {
        let group = value % 1000;
        if group > 0 {
            let mut text = below_thousand(group);
            if scale > 0 {
                text.push(' ');
                text.push_str(SCALES[scale]);
            }
            groups.push(text);
        }
        value /= 1000;
        scale += 1;
    }
    groups.reverse();

    let text = groups.join(" ");
    if n < 0 { format!("minus {text}") } else { text }
}

fn below_thousand(n: u64) -> String {
    let hundreds = n / 100;
    let rest = n % 100;
    let mut parts = Vec::new();
    if hundreds > 0 {
        parts.push(format!("{} hundred", ONES[hundreds as usize]));
    }
    if rest > 0 {
        let tail = if rest < 20 {
            ONES[rest as usize].to_string()
        } else if rest % 10 == 0 {
            TENS[(rest / 10) as usize].to_string()
        } else {
            format!("{}-{}", TENS[(rest / 10) as usize], ONES[(rest % 10) as usize])
        };
        parts.push(tail);
    }
    parts.join(" and ")
}

fn ordinal_words(cardinal: &str) -> String {
    let split = cardinal.rfind([' ', '-']).map_or(0, |i| i + 1);
    let (head, last) = cardinal.split_at(split);
    let last = match last {
        "one" => "first".to_string(),
        "two" => "second".to_string(),
        "three" => "third".to_string(),
        "five" => "fifth".to_string(),
        "eight" => "eighth".to_string(),
        "nine" => "ninth".to_string(),
        "twelve" => "twelfth".to_string(),
        word if word.ends_with('y') => format!("{}ieth", &word[..word.len() - 1]),
        word => format!("{word}th"),
    };
    format!("{head}{last}")
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut capitalize = true;
    for c in text.chars() {
        if capitalize {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        capitalize = c == ' ' || c == '-';
    }
    out
}

/// Shared cache of parsed pictures.
#[derive(Debug, Default)]
pub struct FormatCache {
    formats: Mutex<AHashMap<String, Arc<IntFormat>>>,
}

impl FormatCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The parsed form of `picture`, parsing and caching it on first use.
    /// Invalid pictures are reported and never cached.
    pub fn get(&self, picture: &str) -> Result<Arc<IntFormat>> {
        let mut formats = self.formats.lock();
        match formats.entry(picture.to_string()) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let format = Arc::new(IntFormat::parse(picture)?);
                trace!("cached picture '{picture}'");
                Ok(Arc::clone(entry.insert(format)))
            }
        }
    }

    /// Number of cached pictures.
    pub fn len(&self) -> usize {
        self.formats.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
