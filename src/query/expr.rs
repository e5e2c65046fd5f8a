//! Expression tree.
//!
//! [`Expr`] is a tagged variant over every expression kind. Children are
//! owned by their parent, so the optimizer can replace any subtree in place.
//! Index-backed nodes ([`Expr::ValueAccess`], [`Expr::FtAccess`],
//! [`Expr::Union`]) are only produced by the optimizer.
//!
//! # Examples
//!
//! ```
//! use glaive::query::expr::{CmpOp, Expr};
//!
//! let expr = Expr::filter(Expr::text(), Expr::general(CmpOp::Eq, Expr::context(), Expr::str("a")));
//! assert_eq!(expr.to_string(), "//text()[. = \"a\"]");
//! ```

use std::fmt;

use ahash::AHashMap;

use crate::data::{Data, NodeKind};
use crate::error::{GlaiveError, Result};
use crate::fulltext::expr::FtExpr;
use crate::fulltext::iter::FtHits;
use crate::index::iterator::{IndexIterator, ListIterator, UnionIterator, collect_ids};
use crate::index::value::ValueKind;
use crate::index::NodeId;
use crate::query::format::FormatCache;
use crate::query::value::{Atom, Item, Value};

/// Node test of a descendant step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeTest {
    Text,
    /// Elements, optionally restricted to a name.
    Element(Option<String>),
    /// Attributes, optionally restricted to a name.
    Attribute(Option<String>),
}

impl NodeTest {
    /// Whether the node `id` passes this test.
    pub fn matches(&self, data: &Data, id: NodeId) -> bool {
        let Some(node) = data.node(id) else {
            return false;
        };
        match self {
            NodeTest::Text => node.kind == NodeKind::Text,
            NodeTest::Element(name) => {
                node.kind == NodeKind::Element && name_matches(name, node.name.as_deref())
            }
            NodeTest::Attribute(name) => {
                node.kind == NodeKind::Attribute && name_matches(name, node.name.as_deref())
            }
        }
    }
}

fn name_matches(test: &Option<String>, name: Option<&str>) -> bool {
    test.as_deref().is_none_or(|test| Some(test) == name)
}

impl fmt::Display for NodeTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeTest::Text => write!(f, "text()"),
            NodeTest::Element(None) => write!(f, "*"),
            NodeTest::Element(Some(name)) => write!(f, "{name}"),
            NodeTest::Attribute(None) => write!(f, "@*"),
            NodeTest::Attribute(Some(name)) => write!(f, "@{name}"),
        }
    }
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    /// The operator whose result is the negation of this one.
    pub fn invert(self) -> CmpOp {
        match self {
            CmpOp::Eq => CmpOp::Ne,
            CmpOp::Ne => CmpOp::Eq,
            CmpOp::Lt => CmpOp::Ge,
            CmpOp::Le => CmpOp::Gt,
            CmpOp::Gt => CmpOp::Le,
            CmpOp::Ge => CmpOp::Lt,
        }
    }

    pub fn is_equality(self) -> bool {
        matches!(self, CmpOp::Eq | CmpOp::Ne)
    }

    fn holds(self, ordering: Option<std::cmp::Ordering>) -> bool {
        use std::cmp::Ordering::*;
        match (self, ordering) {
            (CmpOp::Ne, None) => true,
            (_, None) => false,
            (CmpOp::Eq, Some(o)) => o == Equal,
            (CmpOp::Ne, Some(o)) => o != Equal,
            (CmpOp::Lt, Some(o)) => o == Less,
            (CmpOp::Le, Some(o)) => o != Greater,
            (CmpOp::Gt, Some(o)) => o == Greater,
            (CmpOp::Ge, Some(o)) => o != Less,
        }
    }

    fn value_symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "eq",
            CmpOp::Ne => "ne",
            CmpOp::Lt => "lt",
            CmpOp::Le => "le",
            CmpOp::Gt => "gt",
            CmpOp::Ge => "ge",
        }
    }

    fn general_symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

/// Value comparisons compare single items; general comparisons are
/// existential over both operand sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpKind {
    Value,
    General,
}

/// Built-in functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Not,
    Empty,
    Exists,
    Boolean,
    True,
    False,
    Count,
    String,
    FormatInteger,
    ElementWithId,
}

impl Function {
    pub fn name(self) -> &'static str {
        match self {
            Function::Not => "not",
            Function::Empty => "empty",
            Function::Exists => "exists",
            Function::Boolean => "boolean",
            Function::True => "true",
            Function::False => "false",
            Function::Count => "count",
            Function::String => "string",
            Function::FormatInteger => "format-integer",
            Function::ElementWithId => "element-with-id",
        }
    }

    /// Look a function up by name.
    pub fn from_name(name: &str) -> Option<Function> {
        [
            Function::Not,
            Function::Empty,
            Function::Exists,
            Function::Boolean,
            Function::True,
            Function::False,
            Function::Count,
            Function::String,
            Function::FormatInteger,
            Function::ElementWithId,
        ]
        .into_iter()
        .find(|function| function.name() == name)
    }

    /// Minimum and maximum number of arguments.
    fn arity(self) -> (usize, usize) {
        match self {
            Function::True | Function::False => (0, 0),
            Function::String => (0, 1),
            Function::FormatInteger => (2, 2),
            _ => (1, 1),
        }
    }

    /// Whether the result is always a single `xs:boolean`.
    fn returns_boolean(self) -> bool {
        matches!(
            self,
            Function::Not
                | Function::Empty
                | Function::Exists
                | Function::Boolean
                | Function::True
                | Function::False
        )
    }

    /// Whether the result depends on nothing but the arguments.
    pub fn is_pure(self, args: usize) -> bool {
        !matches!(self, Function::ElementWithId) && !(self == Function::String && args == 0)
    }
}

/// Evaluation context.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub data: &'a Data,
    pub vars: &'a AHashMap<String, Value>,
    pub formats: &'a FormatCache,
    pub item: Option<&'a Item>,
    /// 1-based position of the context item.
    pub position: usize,
}

impl<'a> Context<'a> {
    pub fn new(data: &'a Data, vars: &'a AHashMap<String, Value>, formats: &'a FormatCache) -> Self {
        Context {
            data,
            vars,
            formats,
            item: None,
            position: 0,
        }
    }

    fn focus<'b>(&self, item: &'b Item, position: usize) -> Context<'b>
    where
        'a: 'b,
    {
        Context {
            item: Some(item),
            position,
            ..*self
        }
    }
}

/// Expression tree node.
#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Item),
    Var(String),
    Seq(Vec<Expr>),
    /// The context item `.`.
    Context,
    /// `//test` from the document node.
    Step(NodeTest),
    Filter {
        input: Box<Expr>,
        predicate: Box<Expr>,
    },
    Compare {
        kind: CmpKind,
        op: CmpOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Call(Function, Vec<Expr>),
    /// `input contains text ft`.
    Contains {
        input: Box<Expr>,
        ft: FtExpr,
    },
    /// Nodes whose value equals `value`, read from a value index.
    ValueAccess {
        kind: ValueKind,
        value: String,
        /// Attribute name restriction.
        name: Option<String>,
    },
    /// Text nodes matching a full-text expression, read from the full-text index.
    FtAccess(FtExpr),
    /// Union of node sequences in document order.
    Union(Vec<Expr>),
}

impl Expr {
    pub fn str<S: Into<String>>(value: S) -> Self {
        Expr::Literal(Item::Str(value.into()))
    }

    pub fn int(value: i64) -> Self {
        Expr::Literal(Item::Int(value))
    }

    pub fn bool(value: bool) -> Self {
        Expr::Literal(Item::Bool(value))
    }

    pub fn var<S: Into<String>>(name: S) -> Self {
        Expr::Var(name.into())
    }

    pub fn seq(exprs: Vec<Expr>) -> Self {
        Expr::Seq(exprs)
    }

    /// The empty sequence.
    pub fn empty_seq() -> Self {
        Expr::Seq(Vec::new())
    }

    pub fn context() -> Self {
        Expr::Context
    }

    /// `//text()`
    pub fn text() -> Self {
        Expr::Step(NodeTest::Text)
    }

    /// `//name` or `//*`
    pub fn elements(name: Option<&str>) -> Self {
        Expr::Step(NodeTest::Element(name.map(str::to_string)))
    }

    /// `//@name` or `//@*`
    pub fn attributes(name: Option<&str>) -> Self {
        Expr::Step(NodeTest::Attribute(name.map(str::to_string)))
    }

    pub fn filter(input: Expr, predicate: Expr) -> Self {
        Expr::Filter {
            input: Box::new(input),
            predicate: Box::new(predicate),
        }
    }

    pub fn general(op: CmpOp, left: Expr, right: Expr) -> Self {
        Expr::Compare {
            kind: CmpKind::General,
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn value_cmp(op: CmpOp, left: Expr, right: Expr) -> Self {
        Expr::Compare {
            kind: CmpKind::Value,
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(exprs: Vec<Expr>) -> Self {
        Expr::And(exprs)
    }

    pub fn or(exprs: Vec<Expr>) -> Self {
        Expr::Or(exprs)
    }

    pub fn contains(input: Expr, ft: FtExpr) -> Self {
        Expr::Contains {
            input: Box::new(input),
            ft,
        }
    }

    /// Function call with an arity check.
    pub fn call(function: Function, args: Vec<Expr>) -> Result<Self> {
        let (min, max) = function.arity();
        if args.len() < min || args.len() > max {
            return Err(GlaiveError::query(format!(
                "{}() expects {} argument(s), {} given",
                function.name(),
                if min == max { min.to_string() } else { format!("{min} to {max}") },
                args.len()
            )));
        }
        Ok(Expr::Call(function, args))
    }

    pub fn not(arg: Expr) -> Self {
        Expr::Call(Function::Not, vec![arg])
    }

    pub fn empty(arg: Expr) -> Self {
        Expr::Call(Function::Empty, vec![arg])
    }

    pub fn exists(arg: Expr) -> Self {
        Expr::Call(Function::Exists, vec![arg])
    }

    pub fn boolean(arg: Expr) -> Self {
        Expr::Call(Function::Boolean, vec![arg])
    }

    pub fn count(arg: Expr) -> Self {
        Expr::Call(Function::Count, vec![arg])
    }

    /// Literal item, if this is one.
    pub fn as_literal(&self) -> Option<&Item> {
        match self {
            Expr::Literal(item) => Some(item),
            _ => None,
        }
    }

    /// Whether the expression always yields exactly one item.
    pub fn is_single(&self) -> bool {
        match self {
            Expr::Literal(_) | Expr::Context | Expr::And(_) | Expr::Or(_) => true,
            Expr::Contains { .. } => true,
            Expr::Compare { kind, left, right, .. } => {
                *kind == CmpKind::General || (left.is_single() && right.is_single())
            }
            Expr::Call(function, _) => !matches!(function, Function::ElementWithId),
            Expr::Seq(exprs) => exprs.len() == 1 && exprs[0].is_single(),
            _ => false,
        }
    }

    /// Whether the expression always yields a single `xs:boolean`.
    pub fn is_boolean(&self) -> bool {
        match self {
            Expr::Literal(Item::Bool(_)) | Expr::And(_) | Expr::Or(_) => true,
            Expr::Contains { .. } => true,
            Expr::Compare { .. } => self.is_single(),
            Expr::Call(function, _) => function.returns_boolean(),
            _ => false,
        }
    }

    /// Whether the expression can never atomize to NaN. Ordering
    /// comparisons are only inverted for such operands.
    pub fn never_nan(&self) -> bool {
        match self {
            Expr::Literal(Item::Str(_) | Item::Int(_) | Item::Bool(_)) => true,
            Expr::Call(Function::Count | Function::String | Function::FormatInteger, _) => true,
            _ => self.is_boolean(),
        }
    }

    /// Mutable references to all direct children.
    pub fn children_mut(&mut self) -> Vec<&mut Expr> {
        match self {
            Expr::Seq(exprs)
            | Expr::And(exprs)
            | Expr::Or(exprs)
            | Expr::Call(_, exprs)
            | Expr::Union(exprs) => exprs.iter_mut().collect(),
            Expr::Filter { input, predicate } => vec![input.as_mut(), predicate.as_mut()],
            Expr::Compare { left, right, .. } => vec![left.as_mut(), right.as_mut()],
            Expr::Contains { input, .. } => vec![input.as_mut()],
            Expr::Literal(_)
            | Expr::Var(_)
            | Expr::Context
            | Expr::Step(_)
            | Expr::ValueAccess { .. }
            | Expr::FtAccess(_) => Vec::new(),
        }
    }

    /// Evaluate the expression.
    pub fn eval(&self, ctx: &Context<'_>) -> Result<Value> {
        match self {
            Expr::Literal(item) => Ok(Value::single(item.clone())),
            Expr::Var(name) => ctx
                .vars
                .get(name)
                .cloned()
                .ok_or_else(|| GlaiveError::query(format!("variable ${name} is not bound"))),
            Expr::Seq(exprs) => {
                let mut items = Vec::new();
                for expr in exprs {
                    items.extend(expr.eval(ctx)?.into_items());
                }
                Ok(Value::from(items))
            }
            Expr::Context => ctx
                .item
                .cloned()
                .map(Value::single)
                .ok_or_else(|| GlaiveError::query("context item is undefined")),
            Expr::Step(test) => Ok(Value::nodes(
                (1..ctx.data.len() as NodeId)
                    .filter(|&id| test.matches(ctx.data, id))
                    .collect(),
            )),
            Expr::Filter { input, predicate } => {
                let input = input.eval(ctx)?;
                let mut kept = Vec::new();
                for (i, item) in input.items().iter().enumerate() {
                    let focus = ctx.focus(item, i + 1);
                    let result = predicate.eval(&focus)?;
                    let keep = match result.as_single() {
                        Some(Item::Int(n)) => *n >= 1 && *n as usize == i + 1,
                        Some(Item::Double(n)) => *n == (i + 1) as f64,
                        _ => result.ebv()?,
                    };
                    if keep {
                        kept.push(item.clone());
                    }
                }
                Ok(Value::from(kept))
            }
            Expr::Compare {
                kind,
                op,
                left,
                right,
            } => compare(*kind, *op, &left.eval(ctx)?, &right.eval(ctx)?, ctx.data),
            Expr::And(exprs) => {
                for expr in exprs {
                    if !expr.eval(ctx)?.ebv()? {
                        return Ok(Value::bool(false));
                    }
                }
                Ok(Value::bool(true))
            }
            Expr::Or(exprs) => {
                for expr in exprs {
                    if expr.eval(ctx)?.ebv()? {
                        return Ok(Value::bool(true));
                    }
                }
                Ok(Value::bool(false))
            }
            Expr::Call(function, args) => call(*function, args, ctx),
            Expr::Contains { input, ft } => {
                for item in input.eval(ctx)?.items() {
                    if ft.contains(&item.string_value(ctx.data))? {
                        return Ok(Value::bool(true));
                    }
                }
                Ok(Value::bool(false))
            }
            Expr::ValueAccess { .. } | Expr::FtAccess(_) | Expr::Union(_) => {
                let ids = match self.index_iter(ctx.data) {
                    Some(mut iter) => collect_ids(iter.as_mut()),
                    None => self.scan_ids(ctx)?,
                };
                Ok(Value::nodes(ids))
            }
        }
    }

    /// Ids of an index-backed node when the index is unavailable.
    fn scan_ids(&self, ctx: &Context<'_>) -> Result<Vec<NodeId>> {
        let data = ctx.data;
        match self {
            Expr::ValueAccess { kind, value, name } => {
                let test = match kind {
                    ValueKind::Text => NodeTest::Text,
                    ValueKind::Attribute => NodeTest::Attribute(name.clone()),
                };
                Ok((1..data.len() as NodeId)
                    .filter(|&id| test.matches(data, id) && data.string_value(id) == *value)
                    .collect())
            }
            Expr::FtAccess(ft) => {
                let mut ids = Vec::new();
                for id in 1..data.len() as NodeId {
                    if NodeTest::Text.matches(data, id) && ft.contains(&data.string_value(id))? {
                        ids.push(id);
                    }
                }
                Ok(ids)
            }
            Expr::Union(exprs) => {
                let mut ids = Vec::new();
                for expr in exprs {
                    ids.extend(expr.eval(ctx)?.node_ids()?);
                }
                Ok(ids)
            }
            _ => self.eval(ctx)?.node_ids(),
        }
    }

    /// Stream the ids of an index-backed node straight from the index.
    /// Returns `None` for any other node, or when the index is missing or
    /// cannot answer the node.
    pub fn index_iter<'a>(&self, data: &'a Data) -> Option<Box<dyn IndexIterator + 'a>> {
        match self {
            Expr::ValueAccess { kind, value, name } => {
                let index = data.value_index(*kind)?;
                match name {
                    None => Some(index.ids(value.as_bytes())),
                    Some(name) => {
                        let ids = collect_ids(index.ids(value.as_bytes()).as_mut())
                            .into_iter()
                            .filter(|&id| data.name(id) == Some(name.as_str()))
                            .collect();
                        Some(Box::new(ListIterator::owned(ids)))
                    }
                }
            }
            Expr::FtAccess(ft) => {
                let index = data.fulltext_index()?;
                if !ft.index_options(index.options()) {
                    return None;
                }
                let hits = ft.index_equivalent(index)?;
                Some(Box::new(FtHits::new(hits)))
            }
            Expr::Union(exprs) => {
                let iters = exprs
                    .iter()
                    .map(|expr| expr.index_iter(data))
                    .collect::<Option<Vec<_>>>()?;
                Some(Box::new(UnionIterator::new(iters)))
            }
            _ => None,
        }
    }
}

fn atomize(value: &Value, data: &Data) -> Vec<Atom> {
    value.items().iter().map(|item| item.atomize(data)).collect()
}

fn compare(kind: CmpKind, op: CmpOp, left: &Value, right: &Value, data: &Data) -> Result<Value> {
    let left = atomize(left, data);
    let right = atomize(right, data);
    match kind {
        CmpKind::Value => match (left.as_slice(), right.as_slice()) {
            ([], _) | (_, []) => Ok(Value::empty()),
            ([a], [b]) => Ok(Value::bool(op.holds(a.compare_value(b)?))),
            _ => Err(GlaiveError::query(format!(
                "value comparison '{}' expects single items",
                op.value_symbol()
            ))),
        },
        CmpKind::General => {
            for a in &left {
                for b in &right {
                    if op.holds(a.compare_general(b)?) {
                        return Ok(Value::bool(true));
                    }
                }
            }
            Ok(Value::bool(false))
        }
    }
}

fn single_arg(args: &[Expr], ctx: &Context<'_>) -> Result<Value> {
    match args.first() {
        Some(arg) => arg.eval(ctx),
        None => Err(GlaiveError::query("missing argument")),
    }
}

fn call(function: Function, args: &[Expr], ctx: &Context<'_>) -> Result<Value> {
    match function {
        Function::Not => Ok(Value::bool(!single_arg(args, ctx)?.ebv()?)),
        Function::Empty => Ok(Value::bool(single_arg(args, ctx)?.is_empty())),
        Function::Exists => Ok(Value::bool(!single_arg(args, ctx)?.is_empty())),
        Function::Boolean => Ok(Value::bool(single_arg(args, ctx)?.ebv()?)),
        Function::True => Ok(Value::bool(true)),
        Function::False => Ok(Value::bool(false)),
        Function::Count => Ok(Value::single(Item::Int(single_arg(args, ctx)?.len() as i64))),
        Function::String => {
            let value = match args.first() {
                Some(arg) => arg.eval(ctx)?,
                None => Value::from(
                    ctx.item
                        .cloned()
                        .ok_or_else(|| GlaiveError::query("context item is undefined"))?,
                ),
            };
            match value.items() {
                [] => Ok(Value::single(Item::str(""))),
                [item] => Ok(Value::single(Item::Str(item.string_value(ctx.data)))),
                _ => Err(GlaiveError::query("string() expects at most one item")),
            }
        }
        Function::FormatInteger => {
            let [number, picture] = args else {
                return Err(GlaiveError::query("format-integer() expects 2 arguments"));
            };
            let number = number.eval(ctx)?;
            let picture = picture.eval(ctx)?;
            let Some(picture) = picture.as_single() else {
                return Err(GlaiveError::query("format-integer() expects a single picture"));
            };
            let picture = picture.string_value(ctx.data);
            let n = match number.items() {
                [] => return Ok(Value::single(Item::str(""))),
                [item] => integer(&item.atomize(ctx.data))?,
                _ => return Err(GlaiveError::query("format-integer() expects a single integer")),
            };
            let format = ctx.formats.get(&picture)?;
            Ok(Value::single(Item::Str(format.format(n))))
        }
        Function::ElementWithId => {
            let data = ctx.data;
            let mut ids = Vec::new();
            for item in single_arg(args, ctx)?.items() {
                for token in item.string_value(data).split_whitespace() {
                    let attributes = match data.attribute_index() {
                        Some(index) => collect_ids(index.ids(token.as_bytes()).as_mut()),
                        None => (1..data.len() as NodeId)
                            .filter(|&id| {
                                data.kind(id) == Some(NodeKind::Attribute)
                                    && data.string_value(id) == token
                            })
                            .collect(),
                    };
                    ids.extend(
                        attributes
                            .into_iter()
                            .filter(|&id| matches!(data.name(id), Some("id" | "xml:id")))
                            .filter_map(|id| data.parent(id)),
                    );
                }
            }
            Ok(Value::nodes(ids))
        }
    }
}

fn integer(atom: &Atom) -> Result<i64> {
    match atom {
        Atom::Int(n) => Ok(*n),
        Atom::Double(n) if n.fract() == 0.0 && n.is_finite() => Ok(*n as i64),
        Atom::Untyped(text) => text
            .trim()
            .parse()
            .map_err(|_| GlaiveError::query(format!("cannot convert \"{text}\" to xs:integer"))),
        other => Err(GlaiveError::query(format!("expected xs:integer, found {other}"))),
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, exprs: &[Expr], separator: &str) -> fmt::Result {
    for (i, expr) in exprs.iter().enumerate() {
        if i > 0 {
            write!(f, "{separator}")?;
        }
        write!(f, "{expr}")?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(item) => write!(f, "{item}"),
            Expr::Var(name) => write!(f, "${name}"),
            Expr::Seq(exprs) => {
                write!(f, "(")?;
                write_list(f, exprs, ", ")?;
                write!(f, ")")
            }
            Expr::Context => write!(f, "."),
            Expr::Step(test) => write!(f, "//{test}"),
            Expr::Filter { input, predicate } => match input.as_ref() {
                Expr::Compare { .. } | Expr::Contains { .. } => write!(f, "({input})[{predicate}]"),
                _ => write!(f, "{input}[{predicate}]"),
            },
            Expr::Compare {
                kind,
                op,
                left,
                right,
            } => {
                let symbol = match kind {
                    CmpKind::Value => op.value_symbol(),
                    CmpKind::General => op.general_symbol(),
                };
                write!(f, "{left} {symbol} {right}")
            }
            Expr::And(exprs) => {
                write!(f, "(")?;
                write_list(f, exprs, " and ")?;
                write!(f, ")")
            }
            Expr::Or(exprs) => {
                write!(f, "(")?;
                write_list(f, exprs, " or ")?;
                write!(f, ")")
            }
            Expr::Call(function, args) => {
                write!(f, "{}(", function.name())?;
                write_list(f, args, ", ")?;
                write!(f, ")")
            }
            Expr::Contains { input, ft } => write!(f, "{input} contains text {ft}"),
            Expr::ValueAccess { kind, value, name } => {
                write!(f, "{kind}-index({})", Item::str(value.as_str()))?;
                match name {
                    Some(name) => write!(f, "[name() = \"{name}\"]"),
                    None => Ok(()),
                }
            }
            Expr::FtAccess(ft) => write!(f, "fulltext-index({ft})"),
            Expr::Union(exprs) => {
                write!(f, "union(")?;
                write_list(f, exprs, ", ")?;
                write!(f, ")")
            }
        }
    }
}
