//! Rewrite pass over compiled expression trees.
//!
//! The tree is walked depth first, children before parents. Every node is
//! first offered to the simplification rules in priority order; the first
//! rule that fires replaces the node and no other simplification is tried on
//! it in the same pass. The (possibly replaced) node is then offered to the
//! index substitution rules, which only fire if the database carries an
//! index able to answer the node exactly.
//!
//! Passes repeat until no rule fires, bounded by
//! [`OptimizerConfig::passes`].

use ahash::AHashMap;
use log::{debug, trace, warn};

use crate::config::OptimizerConfig;
use crate::data::Data;
use crate::error::Result;
use crate::fulltext::expr::FtExpr;
use crate::fulltext::options::FtOptions;
use crate::index::value::ValueKind;
use crate::query::expr::{CmpKind, CmpOp, Context, Expr, Function, NodeTest};
use crate::query::format::FormatCache;
use crate::query::value::{Item, Value};

/// What rules may look at besides the node itself.
#[derive(Debug, Clone, Copy)]
pub struct RewriteContext<'a> {
    pub data: &'a Data,
    pub formats: &'a FormatCache,
}

/// A single rewrite rule.
pub trait RewriteRule: Send + Sync {
    fn name(&self) -> &str;

    /// Replacement for `expr`, or `None` if the rule does not apply.
    fn apply(&self, expr: &Expr, ctx: &RewriteContext<'_>) -> Option<Expr>;
}

/// Argument of a single-argument call to `function`.
fn unary(expr: &Expr, function: Function) -> Option<&Expr> {
    match expr {
        Expr::Call(f, args) if *f == function => match args.as_slice() {
            [arg] => Some(arg),
            _ => None,
        },
        _ => None,
    }
}

/// `not(empty(A))` -> `exists(A)`
pub struct NotEmptyRule;

impl RewriteRule for NotEmptyRule {
    fn name(&self) -> &str {
        "not_empty"
    }

    fn apply(&self, expr: &Expr, _ctx: &RewriteContext<'_>) -> Option<Expr> {
        let arg = unary(unary(expr, Function::Not)?, Function::Empty)?;
        Some(Expr::exists(arg.clone()))
    }
}

/// `not(exists(A))` -> `empty(A)`
pub struct NotExistsRule;

impl RewriteRule for NotExistsRule {
    fn name(&self) -> &str {
        "not_exists"
    }

    fn apply(&self, expr: &Expr, _ctx: &RewriteContext<'_>) -> Option<Expr> {
        let arg = unary(unary(expr, Function::Not)?, Function::Exists)?;
        Some(Expr::empty(arg.clone()))
    }
}

/// `not(A op B)` -> `A inv(op) B` for single operands.
///
/// Ordering comparators are only inverted when neither operand can be NaN,
/// since `not(NaN < 1)` holds but `NaN >= 1` does not.
pub struct InvertComparisonRule;

impl RewriteRule for InvertComparisonRule {
    fn name(&self) -> &str {
        "invert_comparison"
    }

    fn apply(&self, expr: &Expr, _ctx: &RewriteContext<'_>) -> Option<Expr> {
        let Expr::Compare {
            kind,
            op,
            left,
            right,
        } = unary(expr, Function::Not)?
        else {
            return None;
        };
        if !left.is_single() || !right.is_single() {
            return None;
        }
        if !op.is_equality() && !(left.never_nan() && right.never_nan()) {
            return None;
        }
        Some(Expr::Compare {
            kind: *kind,
            op: op.invert(),
            left: left.clone(),
            right: right.clone(),
        })
    }
}

/// `not(not(A))` -> `boolean(A)`
pub struct DoubleNegationRule;

impl RewriteRule for DoubleNegationRule {
    fn name(&self) -> &str {
        "double_negation"
    }

    fn apply(&self, expr: &Expr, _ctx: &RewriteContext<'_>) -> Option<Expr> {
        let arg = unary(unary(expr, Function::Not)?, Function::Not)?;
        Some(Expr::boolean(arg.clone()))
    }
}

/// `boolean(A)` -> `A` when `A` already yields a single boolean.
pub struct RedundantBooleanRule;

impl RewriteRule for RedundantBooleanRule {
    fn name(&self) -> &str {
        "redundant_boolean"
    }

    fn apply(&self, expr: &Expr, _ctx: &RewriteContext<'_>) -> Option<Expr> {
        let arg = unary(expr, Function::Boolean)?;
        arg.is_boolean().then(|| arg.clone())
    }
}

/// `not(boolean(A))` -> `not(A)`
pub struct NotBooleanRule;

impl RewriteRule for NotBooleanRule {
    fn name(&self) -> &str {
        "not_boolean"
    }

    fn apply(&self, expr: &Expr, _ctx: &RewriteContext<'_>) -> Option<Expr> {
        let arg = unary(unary(expr, Function::Not)?, Function::Boolean)?;
        Some(Expr::not(arg.clone()))
    }
}

fn is_constant(expr: &Expr) -> bool {
    match expr {
        Expr::Literal(_) => true,
        Expr::Seq(exprs) => exprs.iter().all(is_constant),
        _ => false,
    }
}

fn constant(value: Value) -> Expr {
    match value.as_single() {
        Some(item) => Expr::Literal(item.clone()),
        None => Expr::Seq(value.into_items().into_iter().map(Expr::Literal).collect()),
    }
}

/// Evaluates function calls and comparisons whose operands are all literals.
/// Expressions that fail to evaluate are left alone so that the error is
/// raised at evaluation time.
pub struct ConstantFoldingRule;

impl RewriteRule for ConstantFoldingRule {
    fn name(&self) -> &str {
        "constant_folding"
    }

    fn apply(&self, expr: &Expr, ctx: &RewriteContext<'_>) -> Option<Expr> {
        let foldable = match expr {
            Expr::Call(function, args) => function.is_pure(args.len()) && args.iter().all(is_constant),
            Expr::Compare { left, right, .. } => is_constant(left) && is_constant(right),
            _ => false,
        };
        if !foldable {
            return None;
        }
        let vars = AHashMap::new();
        let eval_ctx = Context::new(ctx.data, &vars, ctx.formats);
        match expr.eval(&eval_ctx) {
            Ok(value) => Some(constant(value)),
            Err(e) => {
                trace!("not folding {expr}: {e}");
                None
            }
        }
    }
}

fn literal_ebv(expr: &Expr) -> Option<bool> {
    let item = expr.as_literal()?;
    Value::single(item.clone()).ebv().ok()
}

/// Drops literal operands of `and`/`or` and short-circuits on a deciding one.
pub struct LiteralLogicRule;

impl RewriteRule for LiteralLogicRule {
    fn name(&self) -> &str {
        "literal_logic"
    }

    fn apply(&self, expr: &Expr, _ctx: &RewriteContext<'_>) -> Option<Expr> {
        let (exprs, conjunctive) = match expr {
            Expr::And(exprs) => (exprs, true),
            Expr::Or(exprs) => (exprs, false),
            _ => return None,
        };
        // A literal equal to `!conjunctive` decides the result; one equal to
        // `conjunctive` is neutral.
        if exprs.iter().any(|e| literal_ebv(e) == Some(!conjunctive)) {
            return Some(Expr::bool(!conjunctive));
        }
        let rest: Vec<Expr> = exprs
            .iter()
            .filter(|e| literal_ebv(e).is_none())
            .cloned()
            .collect();
        if rest.len() == exprs.len() && rest.len() > 1 {
            return None;
        }
        let mut rest = rest;
        Some(match rest.len() {
            0 => Expr::bool(conjunctive),
            1 => match rest.pop() {
                Some(only) if only.is_boolean() => only,
                Some(only) => Expr::boolean(only),
                None => Expr::bool(conjunctive),
            },
            _ if conjunctive => Expr::And(rest),
            _ => Expr::Or(rest),
        })
    }
}

/// String literals `. = v` is compared against, when the predicate has that
/// shape: `. = 'v'`, `'v' = .`, `. = ('a', 'b')` or an `or` of those.
fn equality_values(predicate: &Expr) -> Option<Vec<String>> {
    match predicate {
        Expr::Compare {
            kind,
            op: CmpOp::Eq,
            left,
            right,
        } => {
            let other = match (left.as_ref(), right.as_ref()) {
                (Expr::Context, other) | (other, Expr::Context) => other,
                _ => return None,
            };
            let strings = |expr: &Expr| match expr {
                Expr::Literal(Item::Str(value)) => Some(value.clone()),
                _ => None,
            };
            match (kind, other) {
                (_, Expr::Literal(Item::Str(value))) => Some(vec![value.clone()]),
                (CmpKind::General, Expr::Seq(exprs)) => exprs.iter().map(strings).collect(),
                _ => None,
            }
        }
        Expr::Or(exprs) => {
            let mut values = Vec::new();
            for expr in exprs {
                values.extend(equality_values(expr)?);
            }
            Some(values)
        }
        _ => None,
    }
}

/// `//text()[. = 'v']` and `//@name[. = 'v']` -> value index access.
pub struct ValueIndexRule;

impl RewriteRule for ValueIndexRule {
    fn name(&self) -> &str {
        "value_index"
    }

    fn apply(&self, expr: &Expr, ctx: &RewriteContext<'_>) -> Option<Expr> {
        let Expr::Filter { input, predicate } = expr else {
            return None;
        };
        let (kind, name) = match input.as_ref() {
            Expr::Step(NodeTest::Text) => (ValueKind::Text, None),
            Expr::Step(NodeTest::Attribute(name)) => (ValueKind::Attribute, name.clone()),
            _ => return None,
        };
        let mut values = equality_values(predicate)?;
        if ctx.data.value_index(kind).is_none() {
            debug!("no {kind} index, scanning for {expr}");
            return None;
        }
        values.dedup();
        let mut accesses: Vec<Expr> = values
            .into_iter()
            .map(|value| Expr::ValueAccess {
                kind,
                value,
                name: name.clone(),
            })
            .collect();
        Some(match accesses.len() {
            1 => accesses.pop()?,
            _ => Expr::Union(accesses),
        })
    }
}

/// `//text()[. contains text F]` -> full-text index access, if the index can
/// answer `F` exactly.
pub struct FullTextIndexRule;

impl RewriteRule for FullTextIndexRule {
    fn name(&self) -> &str {
        "fulltext_index"
    }

    fn apply(&self, expr: &Expr, ctx: &RewriteContext<'_>) -> Option<Expr> {
        let Expr::Filter { input, predicate } = expr else {
            return None;
        };
        if !matches!(input.as_ref(), Expr::Step(NodeTest::Text)) {
            return None;
        }
        let Expr::Contains { input, ft } = predicate.as_ref() else {
            return None;
        };
        if !matches!(input.as_ref(), Expr::Context) {
            return None;
        }
        let Some(index) = ctx.data.fulltext_index() else {
            debug!("no full-text index, scanning for {expr}");
            return None;
        };
        if !ft.index_options(index.options()) {
            warn!("full-text index ({:?}) cannot answer {ft}, scanning", index.options());
            return None;
        }
        Some(Expr::FtAccess(ft.clone()))
    }
}

/// The rewrite driver.
pub struct Optimizer<'a> {
    config: &'a OptimizerConfig,
    ctx: RewriteContext<'a>,
    simplifications: Vec<Box<dyn RewriteRule>>,
    substitutions: Vec<Box<dyn RewriteRule>>,
}

impl<'a> Optimizer<'a> {
    pub fn new(config: &'a OptimizerConfig, data: &'a Data, formats: &'a FormatCache) -> Self {
        let substitutions: Vec<Box<dyn RewriteRule>> = if config.index_rewrites {
            vec![Box::new(ValueIndexRule), Box::new(FullTextIndexRule)]
        } else {
            Vec::new()
        };
        Optimizer {
            config,
            ctx: RewriteContext { data, formats },
            simplifications: vec![
                Box::new(NotEmptyRule),
                Box::new(NotExistsRule),
                Box::new(InvertComparisonRule),
                Box::new(DoubleNegationRule),
                Box::new(RedundantBooleanRule),
                Box::new(NotBooleanRule),
                Box::new(ConstantFoldingRule),
                Box::new(LiteralLogicRule),
            ],
            substitutions,
        }
    }

    /// Compile the full-text expressions of `expr`, then rewrite it.
    pub fn optimize(&self, mut expr: Expr) -> Result<Expr> {
        compile_fulltext(&mut expr)?;
        for pass in 0..self.config.passes() {
            let fired = self.pass(&mut expr);
            debug!("optimizer pass {pass}: {fired} rewrite(s)");
            if fired == 0 {
                break;
            }
        }
        Ok(expr)
    }

    /// One post-order pass. Returns the number of rewrites that fired.
    fn pass(&self, expr: &mut Expr) -> usize {
        let mut fired = 0;
        for child in expr.children_mut() {
            fired += self.pass(child);
        }
        if let Some((name, rewritten)) = first_match(&self.simplifications, expr, &self.ctx) {
            debug!("{name}: {expr} -> {rewritten}");
            *expr = rewritten;
            fired += 1;
        }
        if let Some((name, rewritten)) = first_match(&self.substitutions, expr, &self.ctx) {
            debug!("{name}: {expr} -> {rewritten}");
            *expr = rewritten;
            fired += 1;
        }
        fired
    }
}

fn first_match<'r>(
    rules: &'r [Box<dyn RewriteRule>],
    expr: &Expr,
    ctx: &RewriteContext<'_>,
) -> Option<(&'r str, Expr)> {
    rules
        .iter()
        .find_map(|rule| rule.apply(expr, ctx).map(|rewritten| (rule.name(), rewritten)))
}

fn compile_fulltext(expr: &mut Expr) -> Result<()> {
    match expr {
        Expr::Contains { ft, .. } | Expr::FtAccess(ft) => {
            let source = std::mem::replace(ft, FtExpr::or(Vec::new()));
            *ft = source.compile(&FtOptions::new())?;
        }
        _ => {}
    }
    for child in expr.children_mut() {
        compile_fulltext(child)?;
    }
    Ok(())
}
