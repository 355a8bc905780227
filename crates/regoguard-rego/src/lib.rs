//! Rego module parsing and printing (no IO).
//!
//! Input: policy source text.
//! Output: a [`Module`] AST, printable back to canonical source through `Display`.
//!
//! Only the Rego v0 surface that admission templates use without imports is supported:
//! rules, comprehensions, refs, calls, `some`, `not`, `with` and `else`.

#![forbid(unsafe_code)]

pub mod ast;
pub mod walk;

mod error;
mod lexer;
mod parser;
mod printer;

pub use ast::{
    BinaryOp, Expr, ExprKind, Head, Import, Module, Package, Pos, Ref, Rule, Term, With,
    ROOT_DOCUMENT,
};
pub use error::SyntaxError;
pub use parser::{MAX_NESTING, parse_module};
pub use printer::{is_identifier, is_keyword};
pub use walk::{walk_module, Node, Visit};
