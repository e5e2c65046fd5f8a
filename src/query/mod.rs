//! Query expressions, their evaluation and the rewrite pass.

pub mod expr;
pub mod format;
pub mod optimizer;
pub mod processor;
pub mod value;

pub use self::expr::{CmpKind, CmpOp, Context, Expr, Function, NodeTest};
pub use self::format::{FormatCache, IntFormat};
pub use self::optimizer::{Optimizer, RewriteContext, RewriteRule};
pub use self::processor::QueryProcessor;
pub use self::value::{Atom, Item, Value};
