//! Canonical source printing.
//!
//! Output is stable: printing a module, parsing it back and printing again yields the same
//! text. Comments and original layout are not preserved.

use crate::ast::{BinaryOp, Expr, ExprKind, Import, Module, Package, Ref, Rule, Term, With};
use std::fmt::{self, Display, Formatter, Write};

const KEYWORDS: &[&str] = &[
    "package", "import", "as", "default", "else", "not", "some", "with", "null", "true", "false",
];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// ASCII identifier: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl Display for Module {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.package)?;
        if !self.imports.is_empty() {
            writeln!(f)?;
            for import in &self.imports {
                writeln!(f, "{import}")?;
            }
        }
        for rule in &self.rules {
            writeln!(f)?;
            writeln!(f, "{rule}")?;
        }
        Ok(())
    }
}

impl Display for Package {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("package")?;
        let mut segments = self.path.terms.iter().skip(1);
        let Some(first) = segments.next() else {
            return Ok(());
        };
        f.write_char(' ')?;
        match first {
            Term::String(s) if is_identifier(s) && !is_keyword(s) => f.write_str(s)?,
            other => write_step(f, other)?,
        }
        for segment in segments {
            write_step(f, segment)?;
        }
        Ok(())
    }
}

impl Display for Import {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "import {}", self.path)?;
        if let Some(alias) = &self.alias {
            write!(f, " as {alias}")?;
        }
        Ok(())
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.default {
            f.write_str("default ")?;
        }
        f.write_str(&self.head.name)?;
        if let Some(args) = &self.head.args {
            f.write_char('(')?;
            write_list(f, args)?;
            f.write_char(')')?;
        }
        if let Some(key) = &self.head.key {
            write!(f, "[{key}]")?;
        }
        write_rule_tail(f, self)
    }
}

/// Value, body and `else` chain shared by rules and their `else` branches.
fn write_rule_tail(f: &mut Formatter<'_>, rule: &Rule) -> fmt::Result {
    if let Some(value) = &rule.head.value {
        let op = if rule.head.assign { ":=" } else { "=" };
        write!(f, " {op} {value}")?;
    }
    if let Some(body) = &rule.body {
        f.write_str(" {\n")?;
        for expr in body {
            writeln!(f, "\t{expr}")?;
        }
        f.write_char('}')?;
    }
    if let Some(else_rule) = &rule.else_rule {
        f.write_str(" else")?;
        write_rule_tail(f, else_rule)?;
    }
    Ok(())
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("not ")?;
        }
        match &self.kind {
            ExprKind::Term(term) => write!(f, "{term}")?,
            ExprKind::Some(vars) => write!(f, "some {}", vars.join(", "))?,
        }
        for With { target, value } in &self.with {
            write!(f, " with {target} as {value}")?;
        }
        Ok(())
    }
}

impl Display for Ref {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut terms = self.terms.iter();
        if let Some(head) = terms.next() {
            write!(f, "{head}")?;
        }
        for step in terms {
            write_step(f, step)?;
        }
        Ok(())
    }
}

fn write_step(f: &mut Formatter<'_>, step: &Term) -> fmt::Result {
    match step {
        Term::String(s) if is_identifier(s) && !is_keyword(s) => write!(f, ".{s}"),
        other => write!(f, "[{other}]"),
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Term::Null => f.write_str("null"),
            Term::Bool(b) => write!(f, "{b}"),
            Term::Number(n) => f.write_str(n),
            Term::String(s) => {
                let quoted = serde_json::to_string(s).map_err(|_| fmt::Error)?;
                f.write_str(&quoted)
            }
            Term::Var(v) => f.write_str(v),
            Term::Ref(r) => write!(f, "{r}"),
            Term::Array(items) => {
                f.write_char('[')?;
                write_list(f, items)?;
                f.write_char(']')
            }
            Term::Set(items) if items.is_empty() => f.write_str("set()"),
            Term::Set(items) => {
                f.write_char('{')?;
                write_list(f, items)?;
                f.write_char('}')
            }
            Term::Object(entries) => {
                f.write_char('{')?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_element(f, k)?;
                    f.write_str(": ")?;
                    write_element(f, v)?;
                }
                f.write_char('}')
            }
            Term::ArrayCompr { term, body } => {
                f.write_char('[')?;
                write_element(f, term)?;
                write_compr_body(f, body)?;
                f.write_char(']')
            }
            Term::SetCompr { term, body } => {
                f.write_char('{')?;
                write_element(f, term)?;
                write_compr_body(f, body)?;
                f.write_char('}')
            }
            Term::ObjectCompr { key, value, body } => {
                f.write_char('{')?;
                write_element(f, key)?;
                f.write_str(": ")?;
                write_element(f, value)?;
                write_compr_body(f, body)?;
                f.write_char('}')
            }
            Term::Call { operator, args } => {
                write!(f, "{operator}(")?;
                write_list(f, args)?;
                f.write_char(')')
            }
            Term::Binary { op, lhs, rhs } => {
                write_operand(f, lhs, |p| p < op.precedence())?;
                write!(f, " {} ", op.symbol())?;
                write_operand(f, rhs, |p| p <= op.precedence())
            }
        }
    }
}

fn write_operand(
    f: &mut Formatter<'_>,
    term: &Term,
    needs_parens: impl Fn(u8) -> bool,
) -> fmt::Result {
    match term {
        Term::Binary { op, .. } if needs_parens(op.precedence()) => write!(f, "({term})"),
        other => write!(f, "{other}"),
    }
}

fn write_list(f: &mut Formatter<'_>, items: &[Term]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_element(f, item)?;
    }
    Ok(())
}

/// Collection members are parenthesized when a bare `|` would read as a comprehension.
fn write_element(f: &mut Formatter<'_>, term: &Term) -> fmt::Result {
    if has_bare_union(term) {
        write!(f, "({term})")
    } else {
        write!(f, "{term}")
    }
}

fn has_bare_union(term: &Term) -> bool {
    match term {
        Term::Binary { op, lhs, rhs } => {
            *op == BinaryOp::Union || has_bare_union(lhs) || has_bare_union(rhs)
        }
        _ => false,
    }
}

fn write_compr_body(f: &mut Formatter<'_>, body: &[Expr]) -> fmt::Result {
    f.write_str(" | ")?;
    for (i, expr) in body.iter().enumerate() {
        if i > 0 {
            f.write_str("; ")?;
        }
        write!(f, "{expr}")?;
    }
    Ok(())
}
