use std::fmt::{Display, Error, Formatter};

use super::{Keyword, Token, TokenKind};
use crate::lang::SyntaxError;

pub const HAS_COMMA: u32 = 1;
pub const HAS_FILTER_KEYWORD: u32 = 1 << 1;
pub const IS_POSSIBLE_FUNCTION: u32 = 1 << 2;
pub const IS_POSSIBLE_LIST_ELEM: u32 = 1 << 3;
pub const IS_LIST_ELEM_MEMBER: u32 = 1 << 4;
pub const IS_POSSIBLE_TERNARY: u32 = 1 << 5;
pub const IS_POSSIBLE_BINARY: u32 = 1 << 6;
pub const HAS_BOOL_OPERATOR: u32 = 1 << 7;
pub const HAS_COMPARISON: u32 = 1 << 8;
pub const HAS_ARITHMETIC: u32 = 1 << 9;

/// Read-only window over the shared token list.
///
/// Properties used by the parsers (top-level comma, function-call shape, ...)
/// are computed once when the view is built.
#[derive(Clone, Copy)]
pub struct Tokens<'a> {
    list: &'a [Token],
    start: usize,
    length: usize,
    info: u32,
}

impl<'a> Tokens<'a> {
    pub fn new(list: &'a [Token], start: usize, length: usize) -> Self {
        let mut view = Self {
            list,
            start,
            length,
            info: 0,
        };
        view.strip_brackets();
        view.set_info();
        view
    }

    pub fn whole(list: &'a [Token]) -> Self {
        Self::new(list, 0, list.len())
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.start + self.length
    }

    pub fn as_slice(&self) -> &'a [Token] {
        &self.list[self.start..self.end()]
    }

    pub fn iter(&self) -> std::slice::Iter<'a, Token> {
        self.as_slice().iter()
    }

    pub fn at(&self, index: usize) -> &'a Token {
        &self.list[self.start + index]
    }

    pub fn first(&self) -> &'a Token {
        self.at(0)
    }

    pub fn second(&self) -> &'a Token {
        self.at(1)
    }

    pub fn last(&self) -> &'a Token {
        self.at(self.length - 1)
    }

    pub fn penultimate(&self) -> &'a Token {
        self.at(self.length - 2)
    }

    /// Line of the first token, or of the closest preceding one for an empty view.
    pub fn line(&self) -> usize {
        if self.length > 0 {
            self.first().line
        } else if self.start > 0 {
            self.list[(self.start - 1).min(self.list.len() - 1)].line
        } else {
            self.list.first().map(|t| t.line).unwrap_or(0)
        }
    }

    pub fn check(&self, flag: u32) -> bool {
        self.info & flag != 0
    }

    /// Sub-view by relative position.
    pub fn sub(&self, start: usize, length: usize) -> Self {
        Self::new(self.list, self.start + start, length)
    }

    pub fn skip(&self, count: usize) -> Self {
        self.sub(count, self.length - count)
    }

    pub fn take(&self, count: usize) -> Self {
        self.sub(0, count)
    }

    pub fn trim_left(&self) -> Self {
        self.skip(1)
    }

    pub fn trim_right(&self) -> Self {
        self.take(self.length - 1)
    }

    /// Relative index of the bracket closing the one at `index`.
    pub fn closing_index(&self, index: usize) -> Option<usize> {
        let mut depth = 0_usize;
        for i in index..self.length {
            let t = self.at(i);
            if t.is_open_bracket() {
                depth += 1;
            } else if t.is_close_bracket() {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
        }
        None
    }

    /// Relative indices of all tokens outside of any bracket.
    pub fn top_level(&self) -> Vec<usize> {
        let mut depth = 0_usize;
        let mut indices = Vec::new();
        for (i, t) in self.iter().enumerate() {
            if t.is_open_bracket() {
                depth += 1;
            } else if t.is_close_bracket() {
                depth = depth.saturating_sub(1);
            } else if depth == 0 {
                indices.push(i);
            }
        }
        indices
    }

    pub fn find_symbol(&self, ch: char) -> Option<usize> {
        self.top_level().into_iter().find(|i| self.at(*i).is_symbol(ch))
    }

    pub fn find_keyword(&self, kw: Keyword) -> Option<usize> {
        self.top_level().into_iter().find(|i| self.at(*i).is_keyword(kw))
    }

    pub fn has_symbol(&self, ch: char) -> bool {
        self.find_symbol(ch).is_some()
    }

    pub fn has_keyword(&self, kw: Keyword) -> bool {
        self.find_keyword(kw).is_some()
    }

    /// Split around the first top-level `ch`.
    pub fn divide_by_symbol(&self, ch: char) -> Result<(Self, Self), SyntaxError> {
        match self.find_symbol(ch) {
            Some(i) => Ok((self.take(i), self.skip(i + 1))),
            None => Err(SyntaxError::new(
                format!("symbol {} was expected but not found", ch),
                self.line(),
            )),
        }
    }

    /// Split around the first top-level keyword `kw`.
    pub fn divide_by_keyword(&self, kw: Keyword) -> Result<(Self, Self), SyntaxError> {
        match self.find_keyword(kw) {
            Some(i) => Ok((self.take(i), self.skip(i + 1))),
            None => Err(SyntaxError::new(
                format!("keyword '{}' was expected but not found", kw),
                self.line(),
            )),
        }
    }

    /// Split at every top-level `ch`; no element may be empty.
    pub fn split_by_symbol(&self, ch: char) -> Result<Vec<Self>, SyntaxError> {
        let positions: Vec<usize> = self
            .top_level()
            .into_iter()
            .filter(|i| self.at(*i).is_symbol(ch))
            .collect();
        let mut parts = Vec::with_capacity(positions.len() + 1);
        let mut begin = 0;
        for pos in positions {
            if pos == 0 {
                return Err(SyntaxError::cannot_start_with(ch, self.line()));
            }
            if pos == begin {
                return Err(SyntaxError::adjacent_symbols(ch, self.at(pos).line));
            }
            parts.push(self.sub(begin, pos - begin));
            begin = pos + 1;
        }
        if begin == self.length && self.length > 0 {
            return Err(SyntaxError::cannot_end_with(ch, self.last().line));
        }
        parts.push(self.skip(begin));
        Ok(parts)
    }

    /// `condition ? left : right`, with nested ternaries in the branches.
    pub fn divide_for_ternary(&self) -> Result<(Self, Self, Self), SyntaxError> {
        let top = self.top_level();
        let question = top
            .iter()
            .copied()
            .find(|i| self.at(*i).is_symbol('?'))
            .ok_or_else(|| SyntaxError::new("symbol ? is missing", self.line()))?;
        let mut pending = 0_usize;
        let mut colon = None;
        for i in top.iter().copied().filter(|i| *i > question) {
            let t = self.at(i);
            if t.is_symbol('?') {
                pending += 1;
            } else if t.is_symbol(':') {
                if pending == 0 {
                    colon = Some(i);
                    break;
                }
                pending -= 1;
            }
        }
        let colon = match colon {
            Some(c) => c,
            None => {
                if top.iter().any(|i| *i < question && self.at(*i).is_symbol(':')) {
                    return Err(SyntaxError::new(
                        "symbols ? and : are placed in a wrong order",
                        self.line(),
                    ));
                }
                return Err(SyntaxError::new("symbol : is missing", self.line()));
            }
        };
        if question == 0 {
            return Err(SyntaxError::new("ternary condition is empty", self.line()));
        }
        if colon == question + 1 {
            return Err(SyntaxError::new(
                "left value of ternary expression is empty",
                self.at(question).line,
            ));
        }
        if colon == self.length - 1 {
            return Err(SyntaxError::new(
                "right value of ternary expression is empty",
                self.at(colon).line,
            ));
        }
        Ok((
            self.take(question),
            self.sub(question + 1, colon - question - 1),
            self.skip(colon + 1),
        ))
    }

    /// `condition ? value`
    pub fn divide_for_binary(&self) -> Result<(Self, Self), SyntaxError> {
        let (condition, value) = self.divide_by_symbol('?')?;
        if condition.is_empty() {
            return Err(SyntaxError::new("condition before ? is empty", self.line()));
        }
        if value.is_empty() {
            return Err(SyntaxError::new("value after ? is empty", self.line()));
        }
        Ok((condition, value))
    }

    fn strip_brackets(&mut self) {
        while self.length > 2
            && self.list[self.start].is_symbol('(')
            && self.closing_index(0) == Some(self.length - 1)
        {
            self.start += 1;
            self.length -= 2;
        }
    }

    fn set_info(&mut self) {
        self.info = 0;
        if self.length == 0 {
            return;
        }
        let top = self.top_level();
        let mut question = None;
        for &i in &top {
            let t = self.at(i);
            match &t.kind {
                TokenKind::Symbol(',') => self.info |= HAS_COMMA,
                TokenKind::Symbol('?') if question.is_none() => question = Some(i),
                TokenKind::Symbol('<' | '>' | '=' | '!') => self.info |= HAS_COMPARISON,
                TokenKind::Symbol('+' | '-' | '*' | '/' | '%') => self.info |= HAS_ARITHMETIC,
                TokenKind::Keyword(k) if k.is_filter() => self.info |= HAS_FILTER_KEYWORD,
                TokenKind::Keyword(k) if k.is_bool_operator() => self.info |= HAS_BOOL_OPERATOR,
                _ => {}
            }
        }
        if let Some(q) = question {
            if top.iter().any(|i| *i > q && self.at(*i).is_symbol(':')) {
                self.info |= IS_POSSIBLE_TERNARY;
            } else {
                self.info |= IS_POSSIBLE_BINARY;
            }
        }
        if self.length >= 3 && self.first().is_word() {
            if self.second().is_symbol('(') && self.closing_index(1) == Some(self.length - 1) {
                self.info |= IS_POSSIBLE_FUNCTION;
            }
            if self.second().is_symbol('[') {
                let close = self.closing_index(1);
                if close == Some(self.length - 1) {
                    self.info |= IS_POSSIBLE_LIST_ELEM;
                } else if close == Some(self.length - 2)
                    && matches!(self.last().two_words(), Some(("", _)))
                {
                    self.info |= IS_LIST_ELEM_MEMBER;
                }
            }
        }
    }
}

impl Display for Tokens<'_> {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        let mut first = true;
        for t in self.iter() {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{}", t)?;
            first = false;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Tokens<'_> {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(f, "Tokens[{}..{}]({})", self.start, self.end(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::Tokenizer;
    use std::io::Cursor;

    fn tokens(code: &str) -> Vec<Token> {
        Tokenizer::new(Cursor::new(code)).read_all().unwrap()
    }

    #[test]
    fn strips_redundant_brackets() {
        let list = tokens("((1 + 2))");
        let view = Tokens::whole(&list);
        assert_eq!(view.len(), 3);
        let list = tokens("(1) + (2)");
        assert_eq!(Tokens::whole(&list).len(), 7);
    }

    #[test]
    fn info_flags() {
        let list = tokens("lower('A')");
        assert!(Tokens::whole(&list).check(IS_POSSIBLE_FUNCTION));
        let list = tokens("times[2].year");
        assert!(Tokens::whole(&list).check(IS_LIST_ELEM_MEMBER));
        let list = tokens("a ? b : c");
        let view = Tokens::whole(&list);
        assert!(view.check(IS_POSSIBLE_TERNARY));
        assert!(!view.check(IS_POSSIBLE_BINARY));
        let list = tokens("f(1, 2)");
        assert!(!Tokens::whole(&list).check(HAS_COMMA));
    }

    #[test]
    fn split_and_divide() {
        let list = tokens("1, (2, 3), 4");
        let parts = Tokens::whole(&list).split_by_symbol(',').unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1].len(), 3);

        let list = tokens("1, , 2");
        assert!(Tokens::whole(&list).split_by_symbol(',').is_err());
        let list = tokens("1, 2,");
        assert!(Tokens::whole(&list).split_by_symbol(',').is_err());
    }

    #[test]
    fn nested_ternary() {
        let list = tokens("a ? b ? 1 : 2 : 3");
        let (c, l, r) = Tokens::whole(&list).divide_for_ternary().unwrap();
        assert_eq!((c.len(), l.len(), r.len()), (1, 5, 1));
        let list = tokens("a : b ? c");
        assert!(Tokens::whole(&list).divide_for_ternary().is_err());
    }
}
