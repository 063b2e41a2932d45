//! Lexical and type-syntax checks for emitted Go.

use regex::Regex;
use std::sync::OnceLock;

const KEYWORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[\p{L}_][\p{L}\p{Nd}_]*$").expect("identifier regex must compile")
    })
}

/// Lexically an identifier (keywords included).
pub fn is_identifier(text: &str) -> bool {
    identifier_re().is_match(text)
}

pub fn is_keyword(text: &str) -> bool {
    KEYWORDS.contains(&text)
}

/// An identifier that may name something in Go source.
pub fn check_identifier(text: &str) -> Result<(), String> {
    if !is_identifier(text) {
        return Err(format!("{text:?} is not a valid identifier"));
    }
    if is_keyword(text) {
        return Err(format!("{text:?} is a Go keyword"));
    }
    Ok(())
}

/// An import path that can be written inside a Go string literal.
pub fn check_import_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("empty import path".to_string());
    }
    if let Some(c) = path
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || "\"\\`!'();:<>?[]^{|}".contains(*c))
    {
        return Err(format!("import path {path:?} contains illegal character {c:?}"));
    }
    Ok(())
}

/// Check that `text` parses as a Go type expression.
///
/// Struct and interface literal bodies are only checked for balanced braces.
pub fn check_type_text(text: &str) -> Result<(), String> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() {
        return Err("empty type".to_string());
    }
    let mut parser = TypeParser { tokens, pos: 0 };
    parser.parse_type()?;
    match parser.peek() {
        None => Ok(()),
        Some(tok) => Err(format!("unexpected {tok} after type in {text:?}")),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Int(String),
    Punct(&'static str),
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Ident(s) | Token::Int(s) => write!(f, "{s:?}"),
            Token::Punct(p) => write!(f, "{p:?}"),
        }
    }
}

const PUNCTS: &[&str] = &["...", "<-", "*", "[", "]", "(", ")", "{", "}", ",", ".", ";"];

fn tokenize(text: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut rest = text;
    'outer: while let Some(c) = rest.chars().next() {
        if c.is_whitespace() {
            rest = &rest[c.len_utf8()..];
            continue;
        }
        if c.is_alphabetic() || c == '_' {
            let end = rest
                .char_indices()
                .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
                .map_or(rest.len(), |(i, _)| i);
            tokens.push(Token::Ident(rest[..end].to_string()));
            rest = &rest[end..];
            continue;
        }
        if c.is_ascii_digit() {
            let end = rest
                .char_indices()
                .find(|(_, c)| !c.is_ascii_alphanumeric())
                .map_or(rest.len(), |(i, _)| i);
            tokens.push(Token::Int(rest[..end].to_string()));
            rest = &rest[end..];
            continue;
        }
        for punct in PUNCTS {
            if let Some(stripped) = rest.strip_prefix(punct) {
                tokens.push(Token::Punct(punct));
                rest = stripped;
                continue 'outer;
            }
        }
        return Err(format!("unexpected character {c:?} in type {text:?}"));
    }
    Ok(tokens)
}

struct TypeParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl TypeParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_is(&self, punct: &str) -> bool {
        matches!(self.peek(), Some(Token::Punct(p)) if *p == punct)
    }

    fn bump(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    fn expect(&mut self, punct: &str) -> Result<(), String> {
        match self.bump() {
            Some(Token::Punct(p)) if p == punct => Ok(()),
            Some(tok) => Err(format!("expected {punct:?}, found {tok}")),
            None => Err(format!("expected {punct:?}, found end of type")),
        }
    }

    fn expect_name(&mut self) -> Result<(), String> {
        match self.bump() {
            Some(Token::Ident(name)) if !is_keyword(&name) => Ok(()),
            Some(tok) => Err(format!("expected a name, found {tok}")),
            None => Err("expected a name, found end of type".to_string()),
        }
    }

    fn parse_type(&mut self) -> Result<(), String> {
        let Some(tok) = self.bump() else {
            return Err("expected a type, found end of type".to_string());
        };
        match tok {
            Token::Punct("*") => self.parse_type(),
            Token::Punct("(") => {
                self.parse_type()?;
                self.expect(")")
            }
            Token::Punct("[") => {
                if !self.peek_is("]") {
                    match self.bump() {
                        Some(Token::Int(_)) | Some(Token::Punct("...")) => {}
                        Some(Token::Ident(name)) if !is_keyword(&name) => {}
                        Some(tok) => return Err(format!("bad array length {tok}")),
                        None => return Err("unterminated array type".to_string()),
                    }
                }
                self.expect("]")?;
                self.parse_type()
            }
            Token::Punct("<-") => {
                match self.bump() {
                    Some(Token::Ident(kw)) if kw == "chan" => {}
                    _ => return Err("expected chan after <-".to_string()),
                }
                self.parse_type()
            }
            Token::Ident(kw) if kw == "map" => {
                self.expect("[")?;
                self.parse_type()?;
                self.expect("]")?;
                self.parse_type()
            }
            Token::Ident(kw) if kw == "chan" => {
                if self.peek_is("<-") {
                    self.bump();
                }
                self.parse_type()
            }
            Token::Ident(kw) if kw == "func" => self.parse_signature(),
            Token::Ident(kw) if kw == "interface" || kw == "struct" => self.skip_braced(),
            Token::Ident(name) if !is_keyword(&name) => {
                if self.peek_is(".") {
                    self.bump();
                    self.expect_name()?;
                }
                if self.peek_is("[") {
                    self.bump();
                    self.parse_type()?;
                    while self.peek_is(",") {
                        self.bump();
                        self.parse_type()?;
                    }
                    self.expect("]")?;
                }
                Ok(())
            }
            tok => Err(format!("expected a type, found {tok}")),
        }
    }

    fn skip_braced(&mut self) -> Result<(), String> {
        self.expect("{")?;
        let mut depth = 1usize;
        while depth > 0 {
            match self.bump() {
                Some(Token::Punct("{")) => depth += 1,
                Some(Token::Punct("}")) => depth -= 1,
                Some(_) => {}
                None => return Err("unbalanced braces in type".to_string()),
            }
        }
        Ok(())
    }

    fn parse_signature(&mut self) -> Result<(), String> {
        self.parse_params()?;
        if self.peek_is("(") {
            return self.parse_params();
        }
        match self.peek() {
            None => Ok(()),
            Some(Token::Punct(p)) if [",", ")", "]", "}", ";"].contains(p) => Ok(()),
            Some(_) => self.parse_type(),
        }
    }

    fn parse_params(&mut self) -> Result<(), String> {
        self.expect("(")?;
        while !self.peek_is(")") {
            self.parse_param()?;
            if self.peek_is(",") {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(")")
    }

    fn parse_param(&mut self) -> Result<(), String> {
        if self.peek_is("...") {
            self.bump();
            return self.parse_type();
        }
        self.parse_type()?;
        if self.peek_is(",") || self.peek_is(")") {
            return Ok(());
        }
        // The first type was really the parameter name.
        if self.peek_is("...") {
            self.bump();
        }
        self.parse_type()
    }
}
