//! Rego abstract syntax tree.
//!
//! The tree is deliberately close to the surface syntax so it can be printed back without
//! loss of meaning. Source positions are kept only where diagnostics need them (rules and
//! refs) and never participate in equality.

/// The root document every cross-module lookup goes through.
pub const ROOT_DOCUMENT: &str = "data";

/// 1-based source position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos {
    pub line: u32,
    pub col: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Module {
    pub package: Package,
    pub imports: Vec<Import>,
    pub rules: Vec<Rule>,
}

/// `package foo.bar` is stored as the ref `data.foo.bar`.
#[derive(Clone, Debug, PartialEq)]
pub struct Package {
    pub path: Ref,
}

impl Package {
    /// Path segments after the root document, e.g. `["foo", "bar"]`.
    pub fn segments(&self) -> Vec<&str> {
        self.path
            .terms
            .iter()
            .skip(1)
            .filter_map(|t| match t {
                Term::String(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[derive(Clone, Debug)]
pub struct Import {
    pub path: Ref,
    pub alias: Option<String>,
    pub pos: Pos,
}

impl PartialEq for Import {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.alias == other.alias
    }
}

#[derive(Clone, Debug)]
pub struct Rule {
    pub default: bool,
    pub head: Head,
    pub body: Option<Vec<Expr>>,
    pub else_rule: Option<Box<Rule>>,
    pub pos: Pos,
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.default == other.default
            && self.head == other.head
            && self.body == other.body
            && self.else_rule == other.else_rule
    }
}

/// Rule head. Which fields are set decides the rule kind:
/// `args` for functions, `key` for partial sets/objects, `value` for complete rules.
#[derive(Clone, Debug, PartialEq)]
pub struct Head {
    pub name: String,
    pub args: Option<Vec<Term>>,
    pub key: Option<Term>,
    pub value: Option<Term>,
    /// `:=` instead of `=` before the value.
    pub assign: bool,
}

impl Head {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: None,
            key: None,
            value: None,
            assign: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Expr {
    pub negated: bool,
    pub kind: ExprKind,
    pub with: Vec<With>,
    pub pos: Pos,
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.negated == other.negated && self.kind == other.kind && self.with == other.with
    }
}

impl Expr {
    pub fn term(term: Term) -> Self {
        Self {
            negated: false,
            kind: ExprKind::Term(term),
            with: Vec::new(),
            pos: Pos::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Term(Term),
    /// `some x, y`
    Some(Vec<String>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct With {
    pub target: Term,
    pub value: Term,
}

/// An access path such as `data.inventory[ns].name`.
///
/// The first term is the head (usually a variable); every following term is one step.
/// `.name` steps are stored as string terms.
#[derive(Clone, Debug)]
pub struct Ref {
    pub terms: Vec<Term>,
    pub pos: Option<Pos>,
}

impl PartialEq for Ref {
    fn eq(&self, other: &Self) -> bool {
        self.terms == other.terms
    }
}

impl Ref {
    pub fn new(terms: Vec<Term>) -> Self {
        Self { terms, pos: None }
    }

    pub fn var(name: impl Into<String>) -> Self {
        Self::new(vec![Term::Var(name.into())])
    }

    pub fn head(&self) -> Option<&Term> {
        self.terms.first()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// True when the head is the variable `name`.
    pub fn has_var_head(&self, name: &str) -> bool {
        matches!(self.head(), Some(Term::Var(v)) if v == name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Unify,
    Assign,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    Union,
    Intersect,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Unify => "=",
            BinaryOp::Assign => ":=",
            BinaryOp::Eq => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Lte => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Gte => ">=",
            BinaryOp::Union => "|",
            BinaryOp::Intersect => "&",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
        }
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Unify | BinaryOp::Assign => 1,
            BinaryOp::Eq
            | BinaryOp::Neq
            | BinaryOp::Lt
            | BinaryOp::Lte
            | BinaryOp::Gt
            | BinaryOp::Gte => 2,
            BinaryOp::Union => 3,
            BinaryOp::Intersect => 4,
            BinaryOp::Add | BinaryOp::Sub => 5,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 6,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Term {
    Null,
    Bool(bool),
    /// Numbers keep their source spelling.
    Number(String),
    String(String),
    Var(String),
    Ref(Ref),
    Array(Vec<Term>),
    Object(Vec<(Term, Term)>),
    Set(Vec<Term>),
    ArrayCompr {
        term: Box<Term>,
        body: Vec<Expr>,
    },
    SetCompr {
        term: Box<Term>,
        body: Vec<Expr>,
    },
    ObjectCompr {
        key: Box<Term>,
        value: Box<Term>,
        body: Vec<Expr>,
    },
    Call {
        operator: Ref,
        args: Vec<Term>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Term>,
        rhs: Box<Term>,
    },
}

impl Term {
    pub fn string(s: impl Into<String>) -> Self {
        Term::String(s.into())
    }

    pub fn var(name: impl Into<String>) -> Self {
        Term::Var(name.into())
    }

    /// A term is ground when it contains no variables and computes nothing.
    pub fn is_ground(&self) -> bool {
        match self {
            Term::Null | Term::Bool(_) | Term::Number(_) | Term::String(_) => true,
            Term::Array(items) | Term::Set(items) => items.iter().all(Term::is_ground),
            Term::Object(entries) => entries.iter().all(|(k, v)| k.is_ground() && v.is_ground()),
            Term::Var(_)
            | Term::Ref(_)
            | Term::ArrayCompr { .. }
            | Term::SetCompr { .. }
            | Term::ObjectCompr { .. }
            | Term::Call { .. }
            | Term::Binary { .. } => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Term::String(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ref_equality_ignores_position() {
        let mut a = Ref::new(vec![Term::var("data"), Term::string("inventory")]);
        let b = a.clone();
        a.pos = Some(Pos { line: 3, col: 7 });
        assert_eq!(a, b);
    }

    #[test]
    fn groundness_follows_nested_values() {
        assert!(Term::Array(vec![Term::Number("1".into()), Term::string("a")]).is_ground());
        assert!(!Term::Array(vec![Term::var("x")]).is_ground());
        assert!(
            !Term::Object(vec![(Term::string("k"), Term::var("v"))]).is_ground(),
            "object values count"
        );
        assert!(!Term::Ref(Ref::var("input")).is_ground());
    }

    #[test]
    fn package_segments_skip_root() {
        let pkg = Package {
            path: Ref::new(vec![
                Term::var(ROOT_DOCUMENT),
                Term::string("foo"),
                Term::string("bar"),
            ]),
        };
        assert_eq!(pkg.segments(), vec!["foo", "bar"]);
    }
}
