//! Depth-first AST traversal in document order.
//!
//! The visitor sees each node before its children and decides whether to descend. The
//! variable at the head of a ref belongs to the ref and is not reported as a separate term.

use crate::ast::{Expr, ExprKind, Import, Module, Package, Ref, Rule, Term};

#[derive(Clone, Copy, Debug)]
pub enum Node<'a> {
    Package(&'a Package),
    Import(&'a Import),
    Rule(&'a Rule),
    Expr(&'a Expr),
    Ref(&'a Ref),
    Term(&'a Term),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visit {
    Continue,
    SkipChildren,
}

pub fn walk_module<'a, F>(module: &'a Module, visit: &mut F)
where
    F: FnMut(Node<'a>) -> Visit,
{
    if visit(Node::Package(&module.package)) == Visit::Continue {
        walk_ref(&module.package.path, visit);
    }
    for import in &module.imports {
        if visit(Node::Import(import)) == Visit::Continue {
            walk_ref(&import.path, visit);
        }
    }
    for rule in &module.rules {
        walk_rule(rule, visit);
    }
}

pub fn walk_rule<'a, F>(rule: &'a Rule, visit: &mut F)
where
    F: FnMut(Node<'a>) -> Visit,
{
    if visit(Node::Rule(rule)) == Visit::SkipChildren {
        return;
    }
    let head = &rule.head;
    for arg in head.args.iter().flatten() {
        walk_term(arg, visit);
    }
    if let Some(key) = &head.key {
        walk_term(key, visit);
    }
    if let Some(value) = &head.value {
        walk_term(value, visit);
    }
    for expr in rule.body.iter().flatten() {
        walk_expr(expr, visit);
    }
    if let Some(else_rule) = &rule.else_rule {
        walk_rule(else_rule, visit);
    }
}

pub fn walk_expr<'a, F>(expr: &'a Expr, visit: &mut F)
where
    F: FnMut(Node<'a>) -> Visit,
{
    if visit(Node::Expr(expr)) == Visit::SkipChildren {
        return;
    }
    if let ExprKind::Term(term) = &expr.kind {
        walk_term(term, visit);
    }
    for with in &expr.with {
        walk_term(&with.target, visit);
        walk_term(&with.value, visit);
    }
}

pub fn walk_ref<'a, F>(r: &'a Ref, visit: &mut F)
where
    F: FnMut(Node<'a>) -> Visit,
{
    if r.is_empty() || visit(Node::Ref(r)) == Visit::SkipChildren {
        return;
    }
    let mut terms = r.terms.iter();
    if let Some(head) = terms.next()
        && !matches!(head, Term::Var(_))
    {
        walk_term(head, visit);
    }
    for step in terms {
        walk_term(step, visit);
    }
}

pub fn walk_term<'a, F>(term: &'a Term, visit: &mut F)
where
    F: FnMut(Node<'a>) -> Visit,
{
    // Refs are reported once, as `Node::Ref`.
    if let Term::Ref(r) = term {
        walk_ref(r, visit);
        return;
    }
    if visit(Node::Term(term)) == Visit::SkipChildren {
        return;
    }
    match term {
        Term::Null
        | Term::Bool(_)
        | Term::Number(_)
        | Term::String(_)
        | Term::Var(_)
        | Term::Ref(_) => {}
        Term::Array(items) | Term::Set(items) => {
            for item in items {
                walk_term(item, visit);
            }
        }
        Term::Object(entries) => {
            for (k, v) in entries {
                walk_term(k, visit);
                walk_term(v, visit);
            }
        }
        Term::ArrayCompr { term, body } | Term::SetCompr { term, body } => {
            walk_term(term, visit);
            for expr in body {
                walk_expr(expr, visit);
            }
        }
        Term::ObjectCompr { key, value, body } => {
            walk_term(key, visit);
            walk_term(value, visit);
            for expr in body {
                walk_expr(expr, visit);
            }
        }
        Term::Call { operator, args } => {
            walk_ref(operator, visit);
            for arg in args {
                walk_term(arg, visit);
            }
        }
        Term::Binary { lhs, rhs, .. } => {
            walk_term(lhs, visit);
            walk_term(rhs, visit);
        }
    }
}
