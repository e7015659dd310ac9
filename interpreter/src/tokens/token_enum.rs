use std::fmt::{Debug, Display, Error, Formatter};

use super::Keyword;
use crate::datatype::Number;

/// Extra meaning attached to a number token by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberMode {
    Normal,
    /// Written with a size suffix (`10mb`).
    Bytes,
    /// A month name (`june`), carrying its number 1..=12.
    Month,
    /// A weekday name (`friday`), carrying its number 1..=7 (Monday = 1).
    Weekday,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Symbol(char),
    /// A doubled symbol (`++`, `--`, `**`).
    MultiSymbol(char),
    Number(Number, NumberMode),
    /// Lowercased identifier.
    Word(String),
    /// `word.word`, used for time members (`creation.year`).
    TwoWords(String, String),
    Keyword(Keyword),
    Quotation(String),
    /// A quotation containing `*`.
    Pattern(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize) -> Self {
        Self { kind, line }
    }

    pub fn is_symbol(&self, ch: char) -> bool {
        matches!(self.kind, TokenKind::Symbol(c) if c == ch)
    }

    pub fn is_multi_symbol(&self, ch: char) -> bool {
        matches!(self.kind, TokenKind::MultiSymbol(c) if c == ch)
    }

    pub fn symbol(&self) -> Option<char> {
        match self.kind {
            TokenKind::Symbol(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_keyword(&self, kw: Keyword) -> bool {
        matches!(self.kind, TokenKind::Keyword(k) if k == kw)
    }

    pub fn keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Keyword(k) => Some(k),
            _ => None,
        }
    }

    pub fn is_filter_keyword(&self) -> bool {
        self.keyword().map(|k| k.is_filter()).unwrap_or(false)
    }

    pub fn is_word(&self) -> bool {
        matches!(self.kind, TokenKind::Word(_))
    }

    pub fn word(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Word(w) => Some(w),
            _ => None,
        }
    }

    pub fn is_word_named(&self, name: &str) -> bool {
        self.word() == Some(name)
    }

    pub fn number(&self) -> Option<(Number, NumberMode)> {
        match self.kind {
            TokenKind::Number(n, mode) => Some((n, mode)),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self.kind, TokenKind::Number(..))
    }

    pub fn is_plain_number(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Number(_, NumberMode::Normal) | TokenKind::Number(_, NumberMode::Bytes)
        )
    }

    pub fn is_month(&self) -> bool {
        matches!(self.kind, TokenKind::Number(_, NumberMode::Month))
    }

    pub fn is_weekday(&self) -> bool {
        matches!(self.kind, TokenKind::Number(_, NumberMode::Weekday))
    }

    pub fn is_quotation(&self) -> bool {
        matches!(self.kind, TokenKind::Quotation(_))
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self.kind, TokenKind::Pattern(_))
    }

    pub fn two_words(&self) -> Option<(&str, &str)> {
        match &self.kind {
            TokenKind::TwoWords(a, b) => Some((a, b)),
            _ => None,
        }
    }

    pub fn is_open_bracket(&self) -> bool {
        matches!(self.kind, TokenKind::Symbol('(') | TokenKind::Symbol('[') | TokenKind::Symbol('{'))
    }

    pub fn is_close_bracket(&self) -> bool {
        matches!(self.kind, TokenKind::Symbol(')') | TokenKind::Symbol(']') | TokenKind::Symbol('}'))
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        match self {
            Self::Symbol(c) => write!(f, "{}", c),
            Self::MultiSymbol(c) => write!(f, "{}{}", c, c),
            Self::Number(n, NumberMode::Month) => {
                write!(f, "{}", crate::datatype::month_name(n.to_i64()))
            }
            Self::Number(n, NumberMode::Weekday) => {
                write!(f, "{}", crate::datatype::weekday_name(n.to_i64()))
            }
            Self::Number(n, _) => write!(f, "{}", n),
            Self::Word(w) => write!(f, "{}", w),
            Self::TwoWords(a, b) => write!(f, "{}.{}", a, b),
            Self::Keyword(k) => write!(f, "{}", k),
            Self::Quotation(s) | Self::Pattern(s) => write!(f, "'{}'", s),
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(f, "{}", self.kind)
    }
}
