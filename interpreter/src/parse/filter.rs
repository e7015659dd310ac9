use crate::lang::SyntaxError;
use crate::tokens::{Keyword, Tokens, HAS_FILTER_KEYWORD};

/// One `keyword body` part of a filter chain.
#[derive(Debug, Clone, Copy)]
pub(super) struct Segment<'a> {
    pub keyword: Keyword,
    pub body: Tokens<'a>,
    pub line: usize,
}

impl Segment<'_> {
    pub fn empty_body(&self) -> SyntaxError {
        match self.keyword {
            Keyword::Where => SyntaxError::keyword_not_followed_by_bool("where", self.line),
            Keyword::Order => SyntaxError::new("keyword 'order' is not followed by anything", self.line),
            other => SyntaxError::keyword_not_followed_by_number(other.as_str(), self.line),
        }
    }
}

/// `base where a limit 3 order by b` split into the base and its filters.
///
/// `None` when there is no filter keyword outside of brackets.
pub(super) fn split_filters(tks: Tokens) -> Result<Option<(Tokens, Vec<Segment>)>, SyntaxError> {
    if !tks.check(HAS_FILTER_KEYWORD) {
        return Ok(None);
    }
    let positions: Vec<usize> = tks
        .top_level()
        .into_iter()
        .filter(|i| tks.at(*i).is_filter_keyword())
        .collect();
    let first = match positions.first() {
        Some(p) => *p,
        None => return Ok(None),
    };
    let first_token = tks.at(first);
    if first == 0 {
        let name = first_token.keyword().map(|k| k.as_str()).unwrap_or("where");
        return Err(SyntaxError::left_side_empty(name, first_token.line));
    }
    let mut segments = Vec::with_capacity(positions.len());
    for (n, &pos) in positions.iter().enumerate() {
        let end = positions.get(n + 1).copied().unwrap_or(tks.len());
        let token = tks.at(pos);
        let keyword = match token.keyword() {
            Some(k) => k,
            None => continue,
        };
        let segment = Segment {
            keyword,
            body: tks.sub(pos + 1, end - pos - 1),
            line: token.line,
        };
        if segment.body.is_empty() && keyword != Keyword::Order {
            return Err(segment.empty_body());
        }
        segments.push(segment);
    }
    Ok(Some((tks.take(first), segments)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::tests::lex;

    #[test]
    fn chain_is_split_at_top_level_keywords() {
        let tokens = lex("files where (size > 2) limit 3 order by name");
        let (base, segments) = split_filters(Tokens::whole(&tokens)).unwrap().unwrap();
        assert_eq!(base.len(), 1);
        let keywords: Vec<Keyword> = segments.iter().map(|s| s.keyword).collect();
        assert_eq!(keywords, vec![Keyword::Where, Keyword::Limit, Keyword::Order]);
        assert_eq!(segments[0].body.len(), 3);
        assert_eq!(segments[2].body.len(), 2);
    }

    #[test]
    fn empty_parts() {
        let tokens = lex("where x");
        assert!(split_filters(Tokens::whole(&tokens)).is_err());
        let tokens = lex("files limit");
        let err = split_filters(Tokens::whole(&tokens)).unwrap_err();
        assert_eq!(err, SyntaxError::keyword_not_followed_by_number("limit", 1));
        let tokens = lex("files order");
        assert!(split_filters(Tokens::whole(&tokens)).unwrap().is_some());
        let tokens = lex("count(files where x)");
        assert!(split_filters(Tokens::whole(&tokens)).unwrap().is_none());
    }
}
