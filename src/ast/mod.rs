//! Syntax tree for Lore programs.
//!
//! Two node families, both plain tagged sums: [`Expr`] and [`Stmt`]. The
//! parser owns construction; the code generator consumes the tree by pattern
//! matching. Every node exclusively owns its children, and operator tokens
//! are value-copied into the nodes that use them.

mod expression;
mod statement;

pub use expression::*;
pub use statement::*;
