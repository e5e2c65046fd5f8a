//! Items, sequences and the effective boolean value.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::data::Data;
use crate::error::{GlaiveError, Result};
use crate::index::NodeId;

/// A single item of a sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Item {
    Node(NodeId),
    Str(String),
    Int(i64),
    Double(f64),
    Bool(bool),
}

impl Item {
    pub fn str<S: Into<String>>(value: S) -> Self {
        Item::Str(value.into())
    }

    pub fn is_node(&self) -> bool {
        matches!(self, Item::Node(_))
    }

    /// Atomized value of this item.
    pub fn atomize(&self, data: &Data) -> Atom {
        match self {
            Item::Node(id) => Atom::Untyped(data.string_value(*id)),
            Item::Str(value) => Atom::Str(value.clone()),
            Item::Int(value) => Atom::Int(*value),
            Item::Double(value) => Atom::Double(*value),
            Item::Bool(value) => Atom::Bool(*value),
        }
    }

    /// String value of this item.
    pub fn string_value(&self, data: &Data) -> String {
        self.atomize(data).to_string()
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Node(id) => write!(f, "node({id})"),
            Item::Str(value) => write!(f, "\"{}\"", value.replace('"', "\"\"")),
            Item::Int(value) => write!(f, "{value}"),
            Item::Double(value) => write!(f, "{}", format_double(*value)),
            Item::Bool(value) => write!(f, "{value}()"),
        }
    }
}

/// An atomic value. Node contents atomize to [`Atom::Untyped`].
#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    Untyped(String),
    Str(String),
    Int(i64),
    Double(f64),
    Bool(bool),
}

impl Atom {
    fn as_double(&self) -> Option<f64> {
        match self {
            Atom::Int(value) => Some(*value as f64),
            Atom::Double(value) => Some(*value),
            Atom::Untyped(value) => Some(parse_double(value)),
            Atom::Str(_) | Atom::Bool(_) => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Atom::Untyped(_) => "xs:untypedAtomic",
            Atom::Str(_) => "xs:string",
            Atom::Int(_) => "xs:integer",
            Atom::Double(_) => "xs:double",
            Atom::Bool(_) => "xs:boolean",
        }
    }

    /// Order two atoms under value comparison rules. Untyped values compare
    /// as strings. `None` means the values are unordered (NaN).
    pub fn compare_value(&self, other: &Atom) -> Result<Option<Ordering>> {
        use Atom::*;
        match (self, other) {
            (Untyped(a) | Str(a), Untyped(b) | Str(b)) => Ok(Some(a.cmp(b))),
            (Bool(a), Bool(b)) => Ok(Some(a.cmp(b))),
            (Int(a), Int(b)) => Ok(Some(a.cmp(b))),
            (Int(_) | Double(_), Int(_) | Double(_)) => match (self.as_double(), other.as_double()) {
                (Some(a), Some(b)) => Ok(a.partial_cmp(&b)),
                _ => Err(type_error(self, other)),
            },
            _ => Err(type_error(self, other)),
        }
    }

    /// Order two atoms under general comparison rules: an untyped operand is
    /// converted to the type of the other operand first.
    pub fn compare_general(&self, other: &Atom) -> Result<Option<Ordering>> {
        use Atom::*;
        match (self, other) {
            (Untyped(a), Int(_) | Double(_)) => Atom::Double(parse_double(a)).compare_value(other),
            (Int(_) | Double(_), Untyped(b)) => self.compare_value(&Atom::Double(parse_double(b))),
            (Untyped(a), Bool(_)) => Atom::Bool(parse_bool(a, self)?).compare_value(other),
            (Bool(_), Untyped(b)) => self.compare_value(&Atom::Bool(parse_bool(b, other)?)),
            _ => self.compare_value(other),
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Untyped(value) | Atom::Str(value) => write!(f, "{value}"),
            Atom::Int(value) => write!(f, "{value}"),
            Atom::Double(value) => write!(f, "{}", format_double(*value)),
            Atom::Bool(value) => write!(f, "{value}"),
        }
    }
}

fn type_error(a: &Atom, b: &Atom) -> GlaiveError {
    GlaiveError::query(format!(
        "cannot compare {} with {}",
        a.type_name(),
        b.type_name()
    ))
}

fn parse_double(value: &str) -> f64 {
    match value.trim() {
        "INF" => f64::INFINITY,
        "-INF" => f64::NEG_INFINITY,
        trimmed => trimmed.parse().unwrap_or(f64::NAN),
    }
}

fn parse_bool(value: &str, atom: &Atom) -> Result<bool> {
    match value.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(GlaiveError::query(format!(
            "cannot convert {} \"{value}\" to xs:boolean",
            atom.type_name()
        ))),
    }
}

fn format_double(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "INF" } else { "-INF" }.to_string()
    } else {
        value.to_string()
    }
}

/// An ordered sequence of items.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Value {
    items: Vec<Item>,
}

impl Value {
    /// The empty sequence.
    pub fn empty() -> Self {
        Value::default()
    }

    pub fn single(item: Item) -> Self {
        Value { items: vec![item] }
    }

    pub fn bool(value: bool) -> Self {
        Value::single(Item::Bool(value))
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The only item, if the sequence has exactly one.
    pub fn as_single(&self) -> Option<&Item> {
        match self.items.as_slice() {
            [item] => Some(item),
            _ => None,
        }
    }

    /// Effective boolean value.
    pub fn ebv(&self) -> Result<bool> {
        match self.items.as_slice() {
            [] => Ok(false),
            [Item::Node(_), ..] => Ok(true),
            [Item::Bool(value)] => Ok(*value),
            [Item::Str(value)] => Ok(!value.is_empty()),
            [Item::Int(value)] => Ok(*value != 0),
            [Item::Double(value)] => Ok(*value != 0.0 && !value.is_nan()),
            [_, ..] => Err(GlaiveError::query(
                "effective boolean value is not defined for a sequence of several atomic items",
            )),
        }
    }

    /// Node ids of the sequence; fails on atomic items.
    pub fn node_ids(&self) -> Result<Vec<NodeId>> {
        self.items
            .iter()
            .map(|item| match item {
                Item::Node(id) => Ok(*id),
                other => Err(GlaiveError::query(format!("expected a node, found {other}"))),
            })
            .collect()
    }

    /// Nodes of `ids`, sorted in document order without duplicates.
    pub fn nodes(mut ids: Vec<NodeId>) -> Self {
        ids.sort_unstable();
        ids.dedup();
        Value {
            items: ids.into_iter().map(Item::Node).collect(),
        }
    }
}

impl From<Item> for Value {
    fn from(item: Item) -> Self {
        Value::single(item)
    }
}

impl From<Vec<Item>> for Value {
    fn from(items: Vec<Item>) -> Self {
        Value { items }
    }
}

impl FromIterator<Item> for Value {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        Value {
            items: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.items.as_slice() {
            [item] => write!(f, "{item}"),
            items => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ebv() {
        assert!(!Value::empty().ebv().unwrap());
        assert!(Value::single(Item::Node(0)).ebv().unwrap());
        assert!(Value::from(vec![Item::Node(1), Item::Int(0)]).ebv().unwrap());
        assert!(!Value::single(Item::str("")).ebv().unwrap());
        assert!(Value::single(Item::Int(3)).ebv().unwrap());
        assert!(!Value::single(Item::Double(f64::NAN)).ebv().unwrap());
        assert!(Value::from(vec![Item::Int(1), Item::Int(2)]).ebv().is_err());
    }

    #[test]
    fn test_value_comparison() {
        let a = Atom::Untyped("abc".to_string());
        let b = Atom::Str("abd".to_string());
        assert_eq!(a.compare_value(&b).unwrap(), Some(Ordering::Less));
        assert_eq!(Atom::Int(2).compare_value(&Atom::Double(2.0)).unwrap(), Some(Ordering::Equal));
        assert!(Atom::Int(1).compare_value(&Atom::Str("1".into())).is_err());
        assert_eq!(Atom::Double(f64::NAN).compare_value(&Atom::Int(1)).unwrap(), None);
    }

    #[test]
    fn test_general_comparison_casts_untyped() {
        let untyped = Atom::Untyped("10".to_string());
        assert_eq!(untyped.compare_general(&Atom::Int(9)).unwrap(), Some(Ordering::Greater));
        assert_eq!(untyped.compare_value(&Atom::Str("9".into())).unwrap(), Some(Ordering::Less));
        assert_eq!(
            Atom::Untyped("x".into()).compare_general(&Atom::Int(1)).unwrap(),
            None
        );
        assert!(Atom::Untyped("maybe".into()).compare_general(&Atom::Bool(true)).is_err());
    }

    #[test]
    fn test_nodes_are_sorted_and_unique() {
        let value = Value::nodes(vec![5, 1, 5, 3]);
        assert_eq!(value.node_ids().unwrap(), vec![1, 3, 5]);
        assert!(Value::single(Item::Int(1)).node_ids().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Item::str("say \"hi\"").to_string(), "\"say \"\"hi\"\"\"");
        assert_eq!(Item::Bool(true).to_string(), "true()");
        assert_eq!(Value::from(vec![Item::Int(1), Item::Double(2.5)]).to_string(), "(1, 2.5)");
        assert_eq!(Value::empty().to_string(), "()");
    }
}
