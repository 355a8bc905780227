use crate::ast::{
    BinaryOp, Expr, ExprKind, Head, Import, Module, Package, Pos, ROOT_DOCUMENT, Ref, Rule, Term,
    With,
};
use crate::error::SyntaxError;
use crate::lexer::{Tok, Token, tokenize};
use crate::printer::is_keyword;

/// Lowest precedence allowed inside nested terms: assignment and unification only appear at
/// the top of an expression.
const NESTED: u8 = 2;

/// Deepest allowed nesting of terms, `else` branches and chained calls.
pub const MAX_NESTING: usize = 128;

/// Operator chains build left-deep trees without recursing, so the height of the tree they
/// produce is capped separately. Comprehension bodies count two levels per nesting.
const MAX_CHAIN_HEIGHT: usize = 4 * MAX_NESTING;

/// Parse one Rego module. `file` names the source in diagnostics.
pub fn parse_module(file: &str, source: &str) -> Result<Module, SyntaxError> {
    let tokens = tokenize(file, source)?;
    Parser {
        file,
        tokens,
        idx: 0,
        depth: 0,
    }
    .module()
}

struct Parser<'a> {
    file: &'a str,
    tokens: Vec<Token>,
    idx: usize,
    depth: usize,
}

impl Parser<'_> {
    fn module(mut self) -> Result<Module, SyntaxError> {
        self.skip_separators();
        if !self.at_keyword("package") {
            return Err(self.error_here("package expected"));
        }
        self.advance();
        let package = Package {
            path: self.package_path()?,
        };
        self.end_of_statement()?;

        let mut imports = Vec::new();
        let mut rules = Vec::new();
        loop {
            self.skip_separators();
            if self.peek() == &Tok::Eof {
                break;
            }
            if self.at_keyword("import") {
                imports.push(self.import()?);
            } else if self.at_keyword("package") {
                return Err(self.error_here("unexpected package declaration"));
            } else {
                rules.push(self.rule()?);
            }
            self.end_of_statement()?;
        }

        Ok(Module {
            package,
            imports,
            rules,
        })
    }

    fn package_path(&mut self) -> Result<Ref, SyntaxError> {
        let pos = self.pos();
        // A first segment that is not a plain name is written in brackets: `package ["with"].x`.
        let first = if self.peek() == &Tok::LBrack {
            self.advance();
            self.bracketed_segment()?
        } else {
            self.ident("package name")?
        };
        let mut terms = vec![Term::var(ROOT_DOCUMENT), Term::String(first)];
        loop {
            match self.peek() {
                Tok::Dot => {
                    self.advance();
                    terms.push(Term::String(self.ident("package path segment")?));
                }
                Tok::LBrack => {
                    self.advance();
                    terms.push(Term::String(self.bracketed_segment()?));
                }
                _ => break,
            }
        }
        Ok(Ref {
            terms,
            pos: Some(pos),
        })
    }

    fn bracketed_segment(&mut self) -> Result<String, SyntaxError> {
        let Tok::Str(s) = self.peek().clone() else {
            return Err(self.error_here("package path segments must be strings"));
        };
        self.advance();
        self.expect(Tok::RBrack)?;
        Ok(s)
    }

    fn import(&mut self) -> Result<Import, SyntaxError> {
        let pos = self.pos();
        self.advance();
        let head = self.ident("import path")?;
        let term = self.postfix(Term::Var(head), pos)?;
        let path = match term {
            Term::Ref(r) => r,
            Term::Var(v) => Ref {
                terms: vec![Term::Var(v)],
                pos: Some(pos),
            },
            _ => return Err(SyntaxError::new(self.file, pos, "invalid import path")),
        };
        let alias = if self.at_keyword("as") {
            self.advance();
            Some(self.ident("import alias")?)
        } else {
            None
        };
        Ok(Import { path, alias, pos })
    }

    fn rule(&mut self) -> Result<Rule, SyntaxError> {
        let pos = self.pos();
        if self.at_keyword("default") {
            self.advance();
            let name = self.rule_name()?;
            let assign = match self.peek() {
                Tok::Unify => false,
                Tok::Assign => true,
                _ => return Err(self.error_here("default rule value expected")),
            };
            self.advance();
            let value = self.binary(NESTED, false)?;
            return Ok(Rule {
                default: true,
                head: Head {
                    value: Some(value),
                    assign,
                    ..Head::named(name)
                },
                body: None,
                else_rule: None,
                pos,
            });
        }

        let name = self.rule_name()?;
        let mut head = Head::named(name);
        match self.peek() {
            Tok::LParen => {
                self.advance();
                head.args = Some(self.sequence(Tok::RParen)?);
            }
            Tok::LBrack => {
                self.advance();
                self.skip_newlines();
                head.key = Some(self.binary(NESTED, false)?);
                self.skip_newlines();
                self.expect(Tok::RBrack)?;
            }
            _ => {}
        }
        if let Some(assign) = self.value_operator() {
            self.advance();
            head.assign = assign;
            head.value = Some(self.binary(NESTED, false)?);
        }

        let body = if self.peek() == &Tok::LBrace {
            Some(self.body()?)
        } else {
            None
        };
        if body.is_none() && head.value.is_none() && head.key.is_none() {
            return Err(SyntaxError::new(
                self.file,
                pos,
                format!("rule `{}` has neither a body nor a value", head.name),
            ));
        }

        let else_rule = if body.is_some() {
            self.else_chain(&head)?
        } else {
            None
        };

        Ok(Rule {
            default: false,
            head,
            body,
            else_rule,
            pos,
        })
    }

    fn else_chain(&mut self, head: &Head) -> Result<Option<Box<Rule>>, SyntaxError> {
        let checkpoint = self.idx;
        self.skip_newlines();
        if !self.at_keyword("else") {
            self.idx = checkpoint;
            return Ok(None);
        }
        if head.key.is_some() {
            return Err(self.error_here("else keyword cannot be used on partial rules"));
        }
        let pos = self.pos();
        self.advance();
        self.enter()?;

        let mut else_head = Head {
            args: head.args.clone(),
            ..Head::named(head.name.clone())
        };
        if let Some(assign) = self.value_operator() {
            self.advance();
            else_head.assign = assign;
            else_head.value = Some(self.binary(NESTED, false)?);
        }
        let body = if self.peek() == &Tok::LBrace {
            Some(self.body()?)
        } else {
            None
        };
        if body.is_none() && else_head.value.is_none() {
            return Err(SyntaxError::new(self.file, pos, "else has neither a body nor a value"));
        }
        let else_rule = if body.is_some() {
            self.else_chain(&else_head)?
        } else {
            None
        };
        self.depth -= 1;
        Ok(Some(Box::new(Rule {
            default: false,
            head: else_head,
            body,
            else_rule,
            pos,
        })))
    }

    fn value_operator(&self) -> Option<bool> {
        match self.peek() {
            Tok::Unify => Some(false),
            Tok::Assign => Some(true),
            _ => None,
        }
    }

    fn rule_name(&mut self) -> Result<String, SyntaxError> {
        let name = self.ident("rule name")?;
        if is_keyword(&name) {
            return Err(self.error_before(format!("unexpected keyword `{name}`")));
        }
        Ok(name)
    }

    fn body(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        self.expect(Tok::LBrace)?;
        self.exprs_until(Tok::RBrace)
    }

    /// Expressions separated by newlines or `;`, up to and including `close`.
    fn exprs_until(&mut self, close: Tok) -> Result<Vec<Expr>, SyntaxError> {
        let mut exprs = Vec::new();
        loop {
            self.skip_separators();
            if self.peek() == &close {
                self.advance();
                break;
            }
            exprs.push(self.expr()?);
            match self.peek() {
                Tok::Newline | Tok::Semi => {}
                t if t == &close => {}
                other => {
                    return Err(self.error_here(format!(
                        "unexpected {} after expression",
                        other.describe()
                    )));
                }
            }
        }
        if exprs.is_empty() {
            return Err(self.error_before("found empty body"));
        }
        Ok(exprs)
    }

    fn expr(&mut self) -> Result<Expr, SyntaxError> {
        let start = self.pos();
        if self.at_keyword("some") {
            self.advance();
            let mut vars = vec![self.ident("variable after `some`")?];
            while self.peek() == &Tok::Comma {
                self.advance();
                self.skip_newlines();
                vars.push(self.ident("variable after `some`")?);
            }
            return Ok(Expr {
                negated: false,
                kind: ExprKind::Some(vars),
                with: Vec::new(),
                pos: start,
            });
        }

        let negated = if self.at_keyword("not") {
            self.advance();
            true
        } else {
            false
        };
        let term = self.binary(1, false)?;

        let mut with = Vec::new();
        while self.at_keyword("with") {
            self.advance();
            let pos = self.pos();
            let head = self.ident("with target")?;
            let target = self.postfix(Term::Var(head), pos)?;
            if !self.at_keyword("as") {
                return Err(self.error_here("`as` expected after with target"));
            }
            self.advance();
            let value = self.binary(NESTED, false)?;
            with.push(With { target, value });
        }

        Ok(Expr {
            negated,
            kind: ExprKind::Term(term),
            with,
            pos: start,
        })
    }

    /// Precedence climbing. With `no_union` set, `|` ends the term so comprehensions can be
    /// recognised.
    fn binary(&mut self, min_prec: u8, no_union: bool) -> Result<Term, SyntaxError> {
        let mut lhs = self.operand()?;
        let mut height = None;
        loop {
            let Some(op) = binary_op(self.peek()) else {
                break;
            };
            if op.precedence() < min_prec || (no_union && op == BinaryOp::Union) {
                break;
            }
            self.advance();
            self.skip_newlines();
            let rhs = self.binary(op.precedence() + 1, no_union)?;
            let h = height
                .unwrap_or_else(|| term_height(&lhs))
                .max(term_height(&rhs))
                + 1;
            if h > MAX_CHAIN_HEIGHT {
                return Err(self.error_here(format!(
                    "expression nesting too deep (limit {MAX_CHAIN_HEIGHT})"
                )));
            }
            height = Some(h);
            lhs = Term::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn operand(&mut self) -> Result<Term, SyntaxError> {
        self.enter()?;
        let term = self.primary()?;
        self.depth -= 1;
        Ok(term)
    }

    fn primary(&mut self) -> Result<Term, SyntaxError> {
        let pos = self.pos();
        let term = match self.peek().clone() {
            Tok::Ident(word) => {
                self.advance();
                match word.as_str() {
                    "null" => Term::Null,
                    "true" => Term::Bool(true),
                    "false" => Term::Bool(false),
                    w if is_keyword(w) => {
                        return Err(SyntaxError::new(
                            self.file,
                            pos,
                            format!("unexpected keyword `{w}`"),
                        ));
                    }
                    _ => Term::Var(word),
                }
            }
            Tok::Str(s) => {
                self.advance();
                Term::String(s)
            }
            Tok::Num(n) => {
                self.advance();
                Term::Number(n)
            }
            Tok::Minus => {
                self.advance();
                let Tok::Num(n) = self.peek().clone() else {
                    return Err(self.error_here("number expected after `-`"));
                };
                self.advance();
                Term::Number(format!("-{n}"))
            }
            Tok::LParen => {
                self.advance();
                self.skip_newlines();
                let inner = self.binary(NESTED, false)?;
                self.skip_newlines();
                self.expect(Tok::RParen)?;
                inner
            }
            Tok::LBrack => {
                self.advance();
                self.array()?
            }
            Tok::LBrace => {
                self.advance();
                self.brace()?
            }
            other => {
                return Err(SyntaxError::new(
                    self.file,
                    pos,
                    format!("unexpected {}", other.describe()),
                ));
            }
        };
        self.postfix(term, pos)
    }

    /// `.field`, `[term]` and `(args)` suffixes.
    fn postfix(&mut self, mut term: Term, pos: Pos) -> Result<Term, SyntaxError> {
        // Each call may wrap the previous one, as in `f(x).g(y)`.
        let mut calls = 0;
        loop {
            match self.peek() {
                Tok::Dot => {
                    self.advance();
                    let field = self.ident("field name after `.`")?;
                    term = extend_ref(term, Term::String(field), pos);
                }
                Tok::LBrack => {
                    self.advance();
                    self.skip_newlines();
                    let index = self.binary(NESTED, false)?;
                    self.skip_newlines();
                    self.expect(Tok::RBrack)?;
                    term = extend_ref(term, index, pos);
                }
                Tok::LParen => {
                    let operator = match term {
                        Term::Var(v) => Ref {
                            terms: vec![Term::Var(v)],
                            pos: Some(pos),
                        },
                        Term::Ref(r) if r.terms[1..].iter().all(|t| t.as_str().is_some()) => r,
                        _ => return Err(self.error_here("invalid function call")),
                    };
                    self.enter()?;
                    calls += 1;
                    self.advance();
                    let args = self.sequence(Tok::RParen)?;
                    term = Term::Call { operator, args };
                }
                _ => break,
            }
        }
        self.depth -= calls;
        Ok(term)
    }

    fn array(&mut self) -> Result<Term, SyntaxError> {
        self.skip_newlines();
        if self.peek() == &Tok::RBrack {
            self.advance();
            return Ok(Term::Array(Vec::new()));
        }
        let first = self.binary(NESTED, true)?;
        self.skip_newlines();
        if self.peek() == &Tok::Pipe {
            self.advance();
            let body = self.exprs_until(Tok::RBrack)?;
            return Ok(Term::ArrayCompr {
                term: Box::new(first),
                body,
            });
        }
        let items = self.rest_of_sequence(first, Tok::RBrack)?;
        Ok(Term::Array(items))
    }

    fn brace(&mut self) -> Result<Term, SyntaxError> {
        self.skip_newlines();
        if self.peek() == &Tok::RBrace {
            self.advance();
            return Ok(Term::Object(Vec::new()));
        }
        let first = self.binary(NESTED, true)?;
        self.skip_newlines();
        match self.peek() {
            Tok::Colon => {
                self.advance();
                self.skip_newlines();
                let value = self.binary(NESTED, true)?;
                self.skip_newlines();
                if self.peek() == &Tok::Pipe {
                    self.advance();
                    let body = self.exprs_until(Tok::RBrace)?;
                    return Ok(Term::ObjectCompr {
                        key: Box::new(first),
                        value: Box::new(value),
                        body,
                    });
                }
                let mut entries = vec![(first, value)];
                while self.peek() == &Tok::Comma {
                    self.advance();
                    self.skip_newlines();
                    if self.peek() == &Tok::RBrace {
                        break;
                    }
                    let key = self.binary(NESTED, false)?;
                    self.skip_newlines();
                    self.expect(Tok::Colon)?;
                    self.skip_newlines();
                    let value = self.binary(NESTED, false)?;
                    self.skip_newlines();
                    entries.push((key, value));
                }
                self.expect(Tok::RBrace)?;
                Ok(Term::Object(entries))
            }
            Tok::Pipe => {
                self.advance();
                let body = self.exprs_until(Tok::RBrace)?;
                Ok(Term::SetCompr {
                    term: Box::new(first),
                    body,
                })
            }
            _ => {
                let items = self.rest_of_sequence(first, Tok::RBrace)?;
                Ok(Term::Set(items))
            }
        }
    }

    /// Comma separated terms after `(`, up to and including `close`.
    fn sequence(&mut self, close: Tok) -> Result<Vec<Term>, SyntaxError> {
        self.skip_newlines();
        if self.peek() == &close {
            self.advance();
            return Ok(Vec::new());
        }
        let first = self.binary(NESTED, false)?;
        self.skip_newlines();
        self.rest_of_sequence(first, close)
    }

    fn rest_of_sequence(&mut self, first: Term, close: Tok) -> Result<Vec<Term>, SyntaxError> {
        let mut items = vec![first];
        while self.peek() == &Tok::Comma {
            self.advance();
            self.skip_newlines();
            if self.peek() == &close {
                break;
            }
            items.push(self.binary(NESTED, false)?);
            self.skip_newlines();
        }
        self.expect(close)?;
        Ok(items)
    }

    fn enter(&mut self) -> Result<(), SyntaxError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(self.error_here(format!("nesting too deep (limit {MAX_NESTING})")));
        }
        Ok(())
    }

    fn end_of_statement(&mut self) -> Result<(), SyntaxError> {
        match self.peek() {
            Tok::Newline | Tok::Semi | Tok::Eof => Ok(()),
            other => Err(self.error_here(format!("unexpected {}", other.describe()))),
        }
    }

    fn ident(&mut self, what: &str) -> Result<String, SyntaxError> {
        match self.peek().clone() {
            Tok::Ident(s) => {
                self.advance();
                Ok(s)
            }
            other => Err(self.error_here(format!("{what} expected, found {}", other.describe()))),
        }
    }

    fn expect(&mut self, tok: Tok) -> Result<(), SyntaxError> {
        if self.peek() == &tok {
            self.advance();
            Ok(())
        } else {
            Err(self.error_here(format!(
                "expected {}, found {}",
                tok.describe(),
                self.peek().describe()
            )))
        }
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Tok::Ident(s) if s == keyword)
    }

    fn skip_newlines(&mut self) {
        while self.peek() == &Tok::Newline {
            self.advance();
        }
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek(), Tok::Newline | Tok::Semi) {
            self.advance();
        }
    }

    fn peek(&self) -> &Tok {
        // The lexer always terminates the stream with `Eof`.
        &self.tokens[self.idx.min(self.tokens.len() - 1)].tok
    }

    fn pos(&self) -> Pos {
        self.tokens[self.idx.min(self.tokens.len() - 1)].pos
    }

    fn advance(&mut self) {
        if self.idx < self.tokens.len() - 1 {
            self.idx += 1;
        }
    }

    fn error_here(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(self.file, self.pos(), message)
    }

    fn error_before(&self, message: impl Into<String>) -> SyntaxError {
        let idx = self.idx.saturating_sub(1);
        SyntaxError::new(self.file, self.tokens[idx].pos, message)
    }
}

fn binary_op(tok: &Tok) -> Option<BinaryOp> {
    let op = match tok {
        Tok::Unify => BinaryOp::Unify,
        Tok::Assign => BinaryOp::Assign,
        Tok::Eq => BinaryOp::Eq,
        Tok::Neq => BinaryOp::Neq,
        Tok::Lt => BinaryOp::Lt,
        Tok::Lte => BinaryOp::Lte,
        Tok::Gt => BinaryOp::Gt,
        Tok::Gte => BinaryOp::Gte,
        Tok::Pipe => BinaryOp::Union,
        Tok::Amp => BinaryOp::Intersect,
        Tok::Plus => BinaryOp::Add,
        Tok::Minus => BinaryOp::Sub,
        Tok::Star => BinaryOp::Mul,
        Tok::Slash => BinaryOp::Div,
        Tok::Percent => BinaryOp::Rem,
        _ => return None,
    };
    Some(op)
}

/// Height of a term tree, measured without recursion.
fn term_height(term: &Term) -> usize {
    let mut deepest = 0;
    let mut stack = vec![(term, 1)];
    let mut children = Vec::new();
    while let Some((t, depth)) = stack.pop() {
        deepest = deepest.max(depth);
        push_children(t, &mut children);
        stack.extend(children.drain(..).map(|c| (c, depth + 1)));
    }
    deepest
}

fn push_children<'a>(term: &'a Term, out: &mut Vec<&'a Term>) {
    match term {
        Term::Null | Term::Bool(_) | Term::Number(_) | Term::String(_) | Term::Var(_) => {}
        Term::Ref(r) => out.extend(&r.terms),
        Term::Array(items) | Term::Set(items) => out.extend(items),
        Term::Object(entries) => {
            for (k, v) in entries {
                out.push(k);
                out.push(v);
            }
        }
        Term::ArrayCompr { term, body } | Term::SetCompr { term, body } => {
            out.push(term);
            push_expr_terms(body, out);
        }
        Term::ObjectCompr { key, value, body } => {
            out.push(key);
            out.push(value);
            push_expr_terms(body, out);
        }
        Term::Call { operator, args } => {
            out.extend(&operator.terms);
            out.extend(args);
        }
        Term::Binary { lhs, rhs, .. } => {
            out.push(lhs);
            out.push(rhs);
        }
    }
}

fn push_expr_terms<'a>(body: &'a [Expr], out: &mut Vec<&'a Term>) {
    for expr in body {
        if let ExprKind::Term(t) = &expr.kind {
            out.push(t);
        }
        for with in &expr.with {
            out.push(&with.target);
            out.push(&with.value);
        }
    }
}

fn extend_ref(term: Term, step: Term, pos: Pos) -> Term {
    match term {
        Term::Ref(mut r) => {
            r.terms.push(step);
            Term::Ref(r)
        }
        head => Term::Ref(Ref {
            terms: vec![head, step],
            pos: Some(pos),
        }),
    }
}
