use crate::ast::Pos;
use crate::error::SyntaxError;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Tok {
    Ident(String),
    Str(String),
    Num(String),
    LBrace,
    RBrace,
    LBrack,
    RBrack,
    LParen,
    RParen,
    Dot,
    Comma,
    Semi,
    Colon,
    Pipe,
    Amp,
    Assign,
    Unify,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Newline,
    Eof,
}

impl Tok {
    pub(crate) fn describe(&self) -> String {
        match self {
            Tok::Ident(s) => format!("identifier `{s}`"),
            Tok::Str(_) => "string".to_string(),
            Tok::Num(n) => format!("number `{n}`"),
            Tok::Newline => "end of line".to_string(),
            Tok::Eof => "end of file".to_string(),
            other => format!("`{}`", other.symbol()),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Tok::LBrace => "{",
            Tok::RBrace => "}",
            Tok::LBrack => "[",
            Tok::RBrack => "]",
            Tok::LParen => "(",
            Tok::RParen => ")",
            Tok::Dot => ".",
            Tok::Comma => ",",
            Tok::Semi => ";",
            Tok::Colon => ":",
            Tok::Pipe => "|",
            Tok::Amp => "&",
            Tok::Assign => ":=",
            Tok::Unify => "=",
            Tok::Eq => "==",
            Tok::Neq => "!=",
            Tok::Lt => "<",
            Tok::Lte => "<=",
            Tok::Gt => ">",
            Tok::Gte => ">=",
            Tok::Plus => "+",
            Tok::Minus => "-",
            Tok::Star => "*",
            Tok::Slash => "/",
            Tok::Percent => "%",
            _ => "",
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Token {
    pub tok: Tok,
    pub pos: Pos,
}

pub(crate) fn tokenize(file: &str, source: &str) -> Result<Vec<Token>, SyntaxError> {
    Lexer {
        file,
        chars: source.chars().collect(),
        idx: 0,
        line: 1,
        col: 1,
    }
    .run()
}

struct Lexer<'a> {
    file: &'a str,
    chars: Vec<char>,
    idx: usize,
    line: u32,
    col: u32,
}

impl Lexer<'_> {
    fn run(mut self) -> Result<Vec<Token>, SyntaxError> {
        let mut out = Vec::new();
        loop {
            let Some(c) = self.peek() else {
                out.push(Token {
                    tok: Tok::Eof,
                    pos: self.pos(),
                });
                return Ok(out);
            };

            if c == '\n' {
                let pos = self.pos();
                self.bump();
                out.push(Token {
                    tok: Tok::Newline,
                    pos,
                });
                continue;
            }
            if c.is_whitespace() {
                self.bump();
                continue;
            }
            if c == '#' {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.bump();
                }
                continue;
            }

            let pos = self.pos();
            let tok = self.token(c)?;
            out.push(Token { tok, pos });
        }
    }

    fn token(&mut self, c: char) -> Result<Tok, SyntaxError> {
        if c.is_ascii_alphabetic() || c == '_' {
            return Ok(self.ident());
        }
        if c.is_ascii_digit() {
            return self.number();
        }
        match c {
            '"' => return self.string(),
            '`' => return self.raw_string(),
            _ => {}
        }

        let pos = self.pos();
        self.bump();
        let tok = match c {
            '{' => Tok::LBrace,
            '}' => Tok::RBrace,
            '[' => Tok::LBrack,
            ']' => Tok::RBrack,
            '(' => Tok::LParen,
            ')' => Tok::RParen,
            '.' => Tok::Dot,
            ',' => Tok::Comma,
            ';' => Tok::Semi,
            '|' => Tok::Pipe,
            '&' => Tok::Amp,
            '+' => Tok::Plus,
            '-' => Tok::Minus,
            '*' => Tok::Star,
            '/' => Tok::Slash,
            '%' => Tok::Percent,
            ':' if self.eat('=') => Tok::Assign,
            ':' => Tok::Colon,
            '=' if self.eat('=') => Tok::Eq,
            '=' => Tok::Unify,
            '!' if self.eat('=') => Tok::Neq,
            '<' if self.eat('=') => Tok::Lte,
            '<' => Tok::Lt,
            '>' if self.eat('=') => Tok::Gte,
            '>' => Tok::Gt,
            other => {
                return Err(SyntaxError::new(
                    self.file,
                    pos,
                    format!("illegal token `{other}`"),
                ));
            }
        };
        Ok(tok)
    }

    fn ident(&mut self) -> Tok {
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                s.push(c);
                self.bump();
            } else {
                break;
            }
        }
        Tok::Ident(s)
    }

    fn number(&mut self) -> Result<Tok, SyntaxError> {
        let start = self.pos();
        let mut s = self.digits();
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            s.push('.');
            s.push_str(&self.digits());
        }
        if let Some(e @ ('e' | 'E')) = self.peek() {
            self.bump();
            s.push(e);
            if let Some(sign @ ('+' | '-')) = self.peek() {
                self.bump();
                s.push(sign);
            }
            let exp = self.digits();
            if exp.is_empty() {
                return Err(SyntaxError::new(self.file, start, "malformed number exponent"));
            }
            s.push_str(&exp);
        }
        Ok(Tok::Num(s))
    }

    fn digits(&mut self) -> String {
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            s.push(c);
            self.bump();
        }
        s
    }

    fn string(&mut self) -> Result<Tok, SyntaxError> {
        let start = self.pos();
        self.bump();
        let mut s = String::new();
        loop {
            let Some(c) = self.peek() else {
                return Err(SyntaxError::new(self.file, start, "non-terminated string"));
            };
            self.bump();
            match c {
                '"' => return Ok(Tok::Str(s)),
                '\n' => return Err(SyntaxError::new(self.file, start, "non-terminated string")),
                '\\' => s.push(self.escape(start)?),
                c => s.push(c),
            }
        }
    }

    fn escape(&mut self, start: Pos) -> Result<char, SyntaxError> {
        let Some(c) = self.peek() else {
            return Err(SyntaxError::new(self.file, start, "non-terminated string"));
        };
        self.bump();
        let decoded = match c {
            '"' => '"',
            '\\' => '\\',
            '/' => '/',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'u' => {
                let code = self.hex4(start)?;
                if (0xD800..0xDC00).contains(&code) {
                    // High surrogate: a `\uXXXX` low surrogate must follow.
                    if self.peek() != Some('\\') || self.peek_at(1) != Some('u') {
                        return Err(SyntaxError::new(self.file, start, "invalid unicode escape"));
                    }
                    self.bump();
                    self.bump();
                    let low = self.hex4(start)?;
                    if !(0xDC00..0xE000).contains(&low) {
                        return Err(SyntaxError::new(self.file, start, "invalid unicode escape"));
                    }
                    let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                    return char::from_u32(combined).ok_or_else(|| {
                        SyntaxError::new(self.file, start, "invalid unicode escape")
                    });
                }
                return char::from_u32(code)
                    .ok_or_else(|| SyntaxError::new(self.file, start, "invalid unicode escape"));
            }
            other => {
                return Err(SyntaxError::new(
                    self.file,
                    start,
                    format!("illegal escape sequence `\\{other}`"),
                ));
            }
        };
        Ok(decoded)
    }

    fn hex4(&mut self, start: Pos) -> Result<u32, SyntaxError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .peek()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| SyntaxError::new(self.file, start, "invalid unicode escape"))?;
            self.bump();
            code = code * 16 + digit;
        }
        Ok(code)
    }

    fn raw_string(&mut self) -> Result<Tok, SyntaxError> {
        let start = self.pos();
        self.bump();
        let mut s = String::new();
        loop {
            let Some(c) = self.peek() else {
                return Err(SyntaxError::new(self.file, start, "non-terminated raw string"));
            };
            self.bump();
            if c == '`' {
                return Ok(Tok::Str(s));
            }
            s.push(c);
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.idx).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.idx + offset).copied()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.idx += 1;
            if c == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
    }

    fn pos(&self) -> Pos {
        Pos {
            line: self.line,
            col: self.col,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Tok> {
        tokenize("test.rego", src)
            .expect("tokenize")
            .into_iter()
            .map(|t| t.tok)
            .collect()
    }

    #[test]
    fn operators_prefer_longest_match() {
        assert_eq!(
            kinds("a := b == c != d <= e"),
            vec![
                Tok::Ident("a".into()),
                Tok::Assign,
                Tok::Ident("b".into()),
                Tok::Eq,
                Tok::Ident("c".into()),
                Tok::Neq,
                Tok::Ident("d".into()),
                Tok::Lte,
                Tok::Ident("e".into()),
                Tok::Eof,
            ]
        );
    }

    #[test]
    fn comments_are_dropped_but_newlines_kept() {
        assert_eq!(
            kinds("x # trailing\ny"),
            vec![
                Tok::Ident("x".into()),
                Tok::Newline,
                Tok::Ident("y".into()),
                Tok::Eof,
            ]
        );
    }

    #[test]
    fn number_does_not_swallow_ref_dot() {
        assert_eq!(
            kinds("x[0].y 1.5e3"),
            vec![
                Tok::Ident("x".into()),
                Tok::LBrack,
                Tok::Num("0".into()),
                Tok::RBrack,
                Tok::Dot,
                Tok::Ident("y".into()),
                Tok::Num("1.5e3".into()),
                Tok::Eof,
            ]
        );
    }

    #[test]
    fn strings_decode_escapes() {
        assert_eq!(
            kinds(r#""a\"b\né""#),
            vec![Tok::Str("a\"b\né".into()), Tok::Eof]
        );
        assert_eq!(kinds("`raw\\n`"), vec![Tok::Str("raw\\n".into()), Tok::Eof]);
    }

    #[test]
    fn unterminated_string_reports_start() {
        let err = tokenize("t.rego", "x := \"abc").unwrap_err();
        assert_eq!(err.pos, Pos { line: 1, col: 6 });
        assert!(err.message.contains("non-terminated"));
    }

    #[test]
    fn illegal_character_is_rejected() {
        let err = tokenize("t.rego", "x := $").unwrap_err();
        assert!(err.message.contains("illegal token"));
    }
}
