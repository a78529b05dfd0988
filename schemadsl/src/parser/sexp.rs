//! Generic nested-list parser.
//!
//! Both text dialects are encoded as parenthesized nested lists of atoms,
//! so one recursive-descent parser feeds both format ingestors. The output
//! is a tagged tree (atom | list); projection code locates subtrees by tag
//! and is therefore tolerant of unknown, reordered, or missing fields.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected end of input at byte {0}")]
    UnexpectedEof(usize),
    #[error("unbalanced ')' at byte {0}")]
    UnbalancedParen(usize),
    #[error("unterminated string starting at byte {0}")]
    UnterminatedString(usize),
    #[error("unexpected token {found:?} at byte {offset}")]
    UnexpectedToken { offset: usize, found: String },
}

impl ParseError {
    /// Byte offset into the source where the failure was detected.
    pub fn offset(&self) -> usize {
        match self {
            ParseError::UnexpectedEof(offset)
            | ParseError::UnbalancedParen(offset)
            | ParseError::UnterminatedString(offset) => *offset,
            ParseError::UnexpectedToken { offset, .. } => *offset,
        }
    }
}

/// A node in the parsed tree: a bare atom or a list of child nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SExp {
    Atom(String),
    List(Vec<SExp>),
}

impl SExp {
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            SExp::Atom(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[SExp]> {
        match self {
            SExp::List(items) => Some(items),
            _ => None,
        }
    }

    /// The leading atom of a list, used as its tag.
    pub fn tag(&self) -> Option<&str> {
        self.as_list().and_then(|items| items.first()).and_then(SExp::as_atom)
    }

    /// Find the first child list tagged `key`. A two-element `(key value)`
    /// pair resolves to the value node; longer lists resolve to the whole
    /// child so the caller can index into it.
    pub fn get(&self, key: &str) -> Option<&SExp> {
        if let SExp::List(items) = self {
            for item in items {
                if item.tag() == Some(key) {
                    let sublist = item.as_list().unwrap_or(&[]);
                    if sublist.len() == 2 {
                        return Some(&sublist[1]);
                    }
                    return Some(item);
                }
            }
        }
        None
    }

    /// All child lists tagged `key`, in document order.
    pub fn get_all(&self, key: &str) -> Vec<&SExp> {
        let mut results = Vec::new();
        if let SExp::List(items) = self {
            for item in items {
                if item.tag() == Some(key) {
                    results.push(item);
                }
            }
        }
        results
    }

    /// Resolve `(key value)` or `(key value …)` to the value atom.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            SExp::Atom(s) => Some(s),
            SExp::List(items) => items.get(1).and_then(SExp::as_atom),
        }
    }
}

impl fmt::Display for SExp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SExp::Atom(s) => {
                if s.is_empty() || s.contains(|c: char| c.is_whitespace() || c == '(' || c == ')') {
                    write!(f, "\"{}\"", s.replace('"', "\\\""))
                } else {
                    write!(f, "{}", s)
                }
            }
            SExp::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Recursive-descent parser tracking byte offsets for error reporting.
pub struct SExpParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> SExpParser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Parse one form and require nothing but whitespace after it.
    pub fn parse_complete(input: &str) -> Result<SExp, ParseError> {
        let mut parser = SExpParser::new(input);
        let root = parser.parse()?;
        parser.skip_whitespace();
        if let Some(ch) = parser.peek() {
            return Err(ParseError::UnexpectedToken {
                offset: parser.pos,
                found: ch.to_string(),
            });
        }
        Ok(root)
    }

    /// Parse the next form.
    pub fn parse(&mut self) -> Result<SExp, ParseError> {
        self.skip_whitespace();
        if self.peek().is_none() {
            return Err(ParseError::UnexpectedEof(self.pos));
        }
        self.parse_sexp()
    }

    fn parse_sexp(&mut self) -> Result<SExp, ParseError> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(ParseError::UnexpectedEof(self.pos)),
            Some('(') => self.parse_list(),
            Some(')') => Err(ParseError::UnbalancedParen(self.pos)),
            Some('"') => self.parse_string(),
            Some(_) => self.parse_symbol(),
        }
    }

    fn parse_list(&mut self) -> Result<SExp, ParseError> {
        self.bump(); // '('
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(ParseError::UnexpectedEof(self.pos)),
                Some(')') => {
                    self.bump();
                    return Ok(SExp::List(items));
                }
                Some(_) => items.push(self.parse_sexp()?),
            }
        }
    }

    fn parse_string(&mut self) -> Result<SExp, ParseError> {
        let start = self.pos;
        self.bump(); // '"'
        let mut s = String::new();
        loop {
            match self.peek() {
                None => return Err(ParseError::UnterminatedString(start)),
                Some('"') => {
                    self.bump();
                    return Ok(SExp::Atom(s));
                }
                Some('\\') => {
                    self.bump();
                    match self.peek() {
                        None => return Err(ParseError::UnterminatedString(start)),
                        Some(esc) => {
                            s.push(match esc {
                                'n' => '\n',
                                't' => '\t',
                                'r' => '\r',
                                other => other,
                            });
                            self.bump();
                        }
                    }
                }
                Some(ch) => {
                    s.push(ch);
                    self.bump();
                }
            }
        }
    }

    fn parse_symbol(&mut self) -> Result<SExp, ParseError> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || ch == '(' || ch == ')' {
                break;
            }
            self.bump();
        }
        Ok(SExp::Atom(self.input[start..self.pos].to_string()))
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.bump();
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(ch) = self.peek() {
            self.pos += ch.len_utf8();
        }
    }
}
