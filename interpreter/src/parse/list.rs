use super::filter::{split_filters, Segment};
use super::order::order_keys;
use super::variable::variable;
use super::{folded, function, parse, parse_conditional, parse_definition, try_cast};
use super::{ParseResult, Parseable};
use crate::context::Context;
use crate::datatype::{List, NumList, Number, Period, Time, TimeList};
use crate::generator::definition::DefinitionToList;
use crate::generator::{
    Constant, Element, GenPtr, ListFilter, ListOrder, ListWhere, Listed, ListedLists, Map,
    NumberFilter,
};
use crate::lang::SyntaxError;
use crate::tokens::{Keyword, Tokens, HAS_COMMA};

fn single<T>(value: T) -> Vec<T> {
    vec![value]
}

fn to_strings<T: ToString>(list: Vec<T>) -> List {
    list.iter().map(|e| e.to_string()).collect()
}

fn bool_to_list(b: bool) -> List {
    single(crate::datatype::bool_to_string(b))
}

fn number_to_list(n: Number) -> List {
    single(n.to_string())
}

fn time_to_list(t: Time) -> List {
    single(t.to_string())
}

fn period_to_list(p: Period) -> List {
    single(p.to_string())
}

fn bool_to_numlist(b: bool) -> NumList {
    single(Number::Int(b as i64))
}

impl Parseable for List {
    fn parse_cast(tks: Tokens, ctx: &mut Context) -> ParseResult<List> {
        if let Some(g) = try_cast::<bool, List>(tks, ctx, "list", bool_to_list)? {
            return Ok(Some(g));
        }
        if let Some(g) = try_cast::<Number, List>(tks, ctx, "list", number_to_list)? {
            return Ok(Some(g));
        }
        if let Some(g) = try_cast::<Time, List>(tks, ctx, "list", time_to_list)? {
            return Ok(Some(g));
        }
        if let Some(g) = try_cast::<Period, List>(tks, ctx, "list", period_to_list)? {
            return Ok(Some(g));
        }
        if let Some(g) = try_cast::<NumList, List>(tks, ctx, "list", to_strings::<Number>)? {
            return Ok(Some(g));
        }
        if let Some(g) = try_cast::<TimeList, List>(tks, ctx, "list", to_strings::<Time>)? {
            return Ok(Some(g));
        }
        if let Some(g) = try_cast::<String, List>(tks, ctx, "list", single::<String>)? {
            return Ok(Some(g));
        }
        match parse_definition(tks, ctx)? {
            Some(def) => Ok(Some(Box::new(DefinitionToList::new(def)))),
            None => Ok(None),
        }
    }

    fn parse_native(tks: Tokens, ctx: &mut Context) -> ParseResult<List> {
        native::<String>(tks, ctx, function::list_function)
    }

    fn global(name: &str, _ctx: &mut Context) -> Option<GenPtr<List>> {
        let chars: List = match name {
            "alphabet" => ('a'..='z').map(|c| c.to_string()).collect(),
            "ascii" => (' '..='~').map(|c| c.to_string()).collect(),
            _ => return None,
        };
        Some(Box::new(Constant::new(chars)))
    }
}

impl Parseable for NumList {
    fn parse_cast(tks: Tokens, ctx: &mut Context) -> ParseResult<NumList> {
        if let Some(g) = try_cast::<bool, NumList>(tks, ctx, "numlist", bool_to_numlist)? {
            return Ok(Some(g));
        }
        try_cast::<Number, NumList>(tks, ctx, "numlist", single::<Number>)
    }

    fn parse_native(tks: Tokens, ctx: &mut Context) -> ParseResult<NumList> {
        native::<Number>(tks, ctx, function::numlist_function)
    }
}

impl Parseable for TimeList {
    fn parse_cast(tks: Tokens, ctx: &mut Context) -> ParseResult<TimeList> {
        try_cast::<Time, TimeList>(tks, ctx, "timelist", single::<Time>)
    }

    fn parse_native(tks: Tokens, ctx: &mut Context) -> ParseResult<TimeList> {
        native::<Time>(tks, ctx, function::timelist_function)
    }
}

fn native<T>(
    tks: Tokens,
    ctx: &mut Context,
    function: fn(Tokens, &mut Context) -> ParseResult<Vec<T>>,
) -> ParseResult<Vec<T>>
where
    T: Element + Parseable,
    Vec<T>: Parseable,
{
    if tks.len() == 1 {
        return variable::<Vec<T>>(tks.first(), ctx);
    }
    if let Some(g) = filtered::<T>(tks, ctx)? {
        return Ok(Some(g));
    }
    if let Some(g) = function(tks, ctx)? {
        return Ok(Some(g));
    }
    if tks.check(HAS_COMMA) {
        if let Some(g) = listed::<T>(tks, ctx)? {
            return Ok(Some(g));
        }
    }
    parse_conditional::<Vec<T>>(tks, ctx)
}

/// Top-level comma parts, with `3 june 2020, 12:00` kept as one element.
pub(super) fn elements(tks: Tokens) -> Result<Vec<Tokens>, SyntaxError> {
    let parts = tks.split_by_symbol(',')?;
    let mut result: Vec<Tokens> = Vec::with_capacity(parts.len());
    for part in parts {
        if let Some(previous) = result.last().copied() {
            if is_date(previous) && is_clock(part) {
                let begin = previous.start() - tks.start();
                result.pop();
                result.push(tks.sub(begin, part.end() - previous.start()));
                continue;
            }
        }
        result.push(part);
    }
    Ok(result)
}

fn is_date(tks: Tokens) -> bool {
    tks.len() == 3 && tks.first().is_plain_number() && tks.second().is_month() && tks.last().is_plain_number()
}

fn is_clock(tks: Tokens) -> bool {
    (tks.len() == 3 || tks.len() == 5) && tks.second().is_symbol(':')
}

enum Part<T> {
    One(GenPtr<T>),
    Many(GenPtr<Vec<T>>),
}

/// `a, b, (c, d)`: elements and nested collections flattened into one.
fn listed<T>(tks: Tokens, ctx: &mut Context) -> ParseResult<Vec<T>>
where
    T: Element + Parseable,
    Vec<T>: Parseable,
{
    let mut parts = Vec::new();
    for element in elements(tks)? {
        if let Some(g) = parse::<T>(element, ctx)? {
            parts.push(Part::One(g));
        } else if let Some(g) = parse::<Vec<T>>(element, ctx)? {
            parts.push(Part::Many(g));
        } else {
            return Ok(None);
        }
    }
    if parts.iter().all(|p| matches!(p, Part::One(_))) {
        let singles = parts
            .into_iter()
            .filter_map(|p| match p {
                Part::One(g) => Some(g),
                Part::Many(_) => None,
            })
            .collect();
        return Ok(Some(folded(Box::new(Listed::new(singles)), ctx, tks.line())?));
    }
    let lists: Vec<GenPtr<Vec<T>>> = parts
        .into_iter()
        .map(|p| match p {
            Part::One(g) => Box::new(Map::new("element", g, single::<T>)) as GenPtr<Vec<T>>,
            Part::Many(g) => g,
        })
        .collect();
    Ok(Some(folded(Box::new(ListedLists::new(lists)), ctx, tks.line())?))
}

fn number_filter(keyword: Keyword) -> Option<NumberFilter> {
    match keyword {
        Keyword::Limit => Some(NumberFilter::Limit),
        Keyword::Skip => Some(NumberFilter::Skip),
        Keyword::Every => Some(NumberFilter::Every),
        Keyword::Final => Some(NumberFilter::Final),
        _ => None,
    }
}

/// Argument of `limit`, `skip`, `every` and `final`.
pub(super) fn filter_number(segment: &Segment, ctx: &mut Context) -> Result<GenPtr<Number>, SyntaxError> {
    match parse::<Number>(segment.body, ctx)? {
        Some(n) => Ok(n),
        None => Err(SyntaxError::keyword_not_followed_by_number(
            segment.keyword.as_str(),
            segment.line,
        )),
    }
}

/// Condition of `where`; the element frame must be entered.
pub(super) fn filter_condition(segment: &Segment, ctx: &mut Context) -> Result<GenPtr<bool>, SyntaxError> {
    match parse::<bool>(segment.body, ctx)? {
        Some(c) => Ok(c),
        None => Err(SyntaxError::keyword_not_followed_by_bool("where", segment.line)),
    }
}

/// `list where ... limit ... order by ...`
fn filtered<T>(tks: Tokens, ctx: &mut Context) -> ParseResult<Vec<T>>
where
    T: Element + Parseable,
    Vec<T>: Parseable,
{
    let (base, segments) = match split_filters(tks)? {
        Some(found) => found,
        None => return Ok(None),
    };
    let mut list = match parse::<Vec<T>>(base, ctx)? {
        Some(l) => l,
        None => return Ok(None),
    };
    for segment in segments {
        list = match segment.keyword {
            Keyword::Where => ctx.within(T::FRAME, |ctx, frame| {
                let condition = filter_condition(&segment, ctx)?;
                Ok::<GenPtr<Vec<T>>, SyntaxError>(Box::new(ListWhere::new(list, frame, condition)))
            })?,
            Keyword::Order => ctx.within(T::FRAME, |ctx, frame| {
                let keys = order_keys(segment.body, segment.line, ctx, frame)?;
                Ok::<GenPtr<Vec<T>>, SyntaxError>(Box::new(ListOrder::new(list, frame, keys)))
            })?,
            keyword => {
                let filter = match number_filter(keyword) {
                    Some(f) => f,
                    None => return Ok(None),
                };
                let n = filter_number(&segment, ctx)?;
                folded(Box::new(ListFilter::new(list, filter, n)), ctx, segment.line)?
            }
        };
    }
    Ok(Some(list))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::{Primitive, ValueType};
    use crate::parse::tests::{eval, parsed};

    fn ints(values: &[i64]) -> NumList {
        values.iter().map(|v| Number::Int(*v)).collect()
    }

    #[test]
    fn literals_and_nesting() {
        let mut ctx = Context::new("/");
        let mut g = parsed::<NumList>("1, 2, (3, 4), 5", &mut ctx).unwrap().unwrap();
        assert!(g.is_constant());
        assert_eq!(g.value(&mut ctx).unwrap(), ints(&[1, 2, 3, 4, 5]));
        assert_eq!(eval::<List>("'a', 1", &mut ctx), vec!["a", "1"]);
        assert_eq!(eval::<NumList>("7", &mut ctx), ints(&[7]));
        assert_eq!(
            eval::<TimeList>("3 june 2020, 12:00, 4 june 2020", &mut ctx),
            vec![Time::date_short_clock(3, 6, 2020, 12, 0), Time::date(4, 6, 2020)]
        );
        assert_eq!(eval::<List>("alphabet", &mut ctx).len(), 26);
        assert!(parsed::<NumList>("1, 'a'", &mut ctx).unwrap().is_none());
    }

    #[test]
    fn filters_over_values() {
        let mut ctx = Context::new("/");
        assert_eq!(
            eval::<NumList>("(5, 1, 4, 2, 3) where this > 1 order limit 3", &mut ctx),
            ints(&[2, 3, 4])
        );
        assert_eq!(
            eval::<NumList>("(1, 2, 3, 4, 5) every 2 final 2", &mut ctx),
            ints(&[3, 5])
        );
        assert_eq!(
            eval::<List>("('bb', 'a', 'ccc') order by length(this) desc", &mut ctx),
            vec!["ccc", "bb", "a"]
        );
        assert_eq!(
            eval::<NumList>("(10, 20, 30) where index != 1", &mut ctx),
            ints(&[10, 30])
        );
    }

    #[test]
    fn filter_errors() {
        let mut ctx = Context::new("/");
        let err = parsed::<NumList>("(1, 2) limit 'x'", &mut ctx).unwrap_err();
        assert_eq!(err, SyntaxError::keyword_not_followed_by_number("limit", 1));
        let err = parsed::<NumList>("(1, 2) where 'x'", &mut ctx).unwrap_err();
        assert_eq!(err, SyntaxError::keyword_not_followed_by_bool("where", 1));
    }

    #[test]
    fn variables_and_conversions() {
        let mut ctx = Context::new("/");
        ctx.declare_variable("nums", ValueType::NumList);
        ctx.variables.assign("nums", ints(&[3, 1]).into_value()).unwrap();
        assert_eq!(eval::<List>("nums", &mut ctx), vec!["3", "1"]);
        assert_eq!(eval::<NumList>("nums, 9", &mut ctx), ints(&[3, 1, 9]));
        assert_eq!(eval::<NumList>("nums order", &mut ctx), ints(&[1, 3]));
    }
}
