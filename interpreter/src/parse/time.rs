use super::period::additive_terms;
use super::variable::{variable, variable_named};
use super::{folded, function, parse, parse_collection_element, parse_conditional};
use super::{ParseResult, Parseable};
use crate::context::{Attribute, Context, FrameId};
use crate::datatype::{days_in_month, Period, Time};
use crate::generator::time::{time_date, time_minus_period, time_plus_period};
use crate::generator::{AttributeValue, Constant, GenPtr, Map, Map2, Now, Today};
use crate::lang::SyntaxError;
use crate::tokens::{
    Token, Tokens, HAS_ARITHMETIC, HAS_BOOL_OPERATOR, HAS_COMPARISON, HAS_FILTER_KEYWORD,
    IS_LIST_ELEM_MEMBER, IS_POSSIBLE_BINARY, IS_POSSIBLE_TERNARY,
};

impl Parseable for Time {
    fn parse_native(tks: Tokens, ctx: &mut Context) -> ParseResult<Time> {
        if tks.len() == 1 {
            return one_token(tks.first(), ctx);
        }
        if tks.first().is_symbol('-') || tks.check(HAS_FILTER_KEYWORD) {
            return Ok(None);
        }
        if let Some(t) = literal(tks)? {
            return Ok(Some(Box::new(Constant::new(t))));
        }
        if let Some(g) = function::time_function(tks, ctx)? {
            return Ok(Some(g));
        }
        let mixed = HAS_COMPARISON | HAS_BOOL_OPERATOR | IS_POSSIBLE_TERNARY | IS_POSSIBLE_BINARY;
        if tks.check(HAS_ARITHMETIC) && !tks.check(mixed) {
            if let Some(g) = shifted(tks, ctx)? {
                return Ok(Some(g));
            }
        }
        if let Some(g) = parse_collection_element::<Time>(tks, ctx)? {
            return Ok(Some(g));
        }
        if tks.check(IS_LIST_ELEM_MEMBER) && matches!(tks.last().two_words(), Some((_, "date"))) {
            if let Some(element) = parse_collection_element::<Time>(tks.trim_right(), ctx)? {
                return Ok(Some(Box::new(Map::new("date", element, time_date))));
            }
        }
        parse_conditional::<Time>(tks, ctx)
    }

    fn global(name: &str, _ctx: &mut Context) -> Option<GenPtr<Time>> {
        Some(match name {
            "now" => Box::new(Now),
            "today" => Box::new(Today::new(0)),
            "yesterday" => Box::new(Today::new(-1)),
            "tomorrow" => Box::new(Today::new(1)),
            "never" => Box::new(Constant::new(Time::never())),
            _ => return None,
        })
    }

    fn attribute(frame: FrameId, attribute: Attribute) -> Option<GenPtr<Time>> {
        Some(Box::new(AttributeValue::new(frame, attribute)))
    }
}

fn one_token(token: &Token, ctx: &mut Context) -> ParseResult<Time> {
    match token.two_words() {
        Some((name, "date")) if !name.is_empty() => {
            match variable_named::<Time>(name, token.line, ctx)? {
                Some(t) => Ok(Some(Box::new(Map::new("date", t, time_date)))),
                None => Ok(None),
            }
        }
        Some(_) => Ok(None),
        None => variable::<Time>(token, ctx),
    }
}

fn integer(token: &Token) -> Option<i64> {
    match token.number() {
        Some((n, _)) if token.is_plain_number() && n.is_int() => Some(n.to_i64()),
        _ => None,
    }
}

fn month(token: &Token) -> Result<Option<i64>, SyntaxError> {
    if token.is_month() {
        return Ok(token.number().map(|(n, _)| n.to_i64()));
    }
    if let Some(word) = token.word() {
        return Err(SyntaxError::new(
            format!("'{}' is not a valid month name", word),
            token.line,
        ));
    }
    Ok(None)
}

fn check_day(day: i64, month: i64, year: i64, line: usize) -> Result<(), SyntaxError> {
    if day < 1 || day > days_in_month(month, year) {
        return Err(SyntaxError::out_of_range("day", day, line));
    }
    Ok(())
}

/// `h : m` or `h : m : s`, starting at `from`.
fn clock(tks: Tokens, from: usize) -> Result<Option<(i64, i64, Option<i64>)>, SyntaxError> {
    let rest = tks.len() - from;
    if rest != 3 && rest != 5 {
        return Ok(None);
    }
    let mut parts = Vec::with_capacity(3);
    for (k, i) in (from..tks.len()).enumerate() {
        let t = tks.at(i);
        if k % 2 == 1 {
            if !t.is_symbol(':') {
                return Ok(None);
            }
        } else {
            match integer(t) {
                Some(v) => parts.push((v, t.line)),
                None => return Ok(None),
            }
        }
    }
    let (hour, line) = parts[0];
    if !(0..24).contains(&hour) {
        return Err(SyntaxError::out_of_range("hour", hour, line));
    }
    let (minute, line) = parts[1];
    if !(0..60).contains(&minute) {
        return Err(SyntaxError::out_of_range("minute", minute, line));
    }
    let second = match parts.get(2) {
        Some((second, line)) => {
            if !(0..60).contains(second) {
                return Err(SyntaxError::out_of_range("second", *second, *line));
            }
            Some(*second)
        }
        None => None,
    };
    Ok(Some((hour, minute, second)))
}

/// `june 2021`, `3 june 2021`, `3 june 2021, 12:30`, `12:30:15`.
fn literal(tks: Tokens) -> Result<Option<Time>, SyntaxError> {
    let len = tks.len();
    if len == 2 {
        let year = match integer(tks.second()) {
            Some(y) => y,
            None => return Ok(None),
        };
        return Ok(month(tks.first())?.map(|m| Time::year_month(m, year)));
    }
    if let Some((h, m, s)) = clock(tks, 0)? {
        return Ok(Some(match s {
            Some(s) => Time::clock(h, m, s),
            None => Time::short_clock(h, m),
        }));
    }
    if len < 3 {
        return Ok(None);
    }
    let (day, year) = match (integer(tks.first()), integer(tks.at(2))) {
        (Some(d), Some(y)) => (d, y),
        _ => return Ok(None),
    };
    let month = match month(tks.second())? {
        Some(m) => m,
        None => return Ok(None),
    };
    check_day(day, month, year, tks.first().line)?;
    if len == 3 {
        return Ok(Some(Time::date(day, month, year)));
    }
    if !tks.at(3).is_symbol(',') {
        return Ok(None);
    }
    Ok(clock(tks, 4)?.map(|(h, m, s)| match s {
        Some(s) => Time::date_clock(day, month, year, h, m, s),
        None => Time::date_short_clock(day, month, year, h, m),
    }))
}

/// `t + 2 days - 1 hour`: one time followed by periods.
fn shifted(tks: Tokens, ctx: &mut Context) -> ParseResult<Time> {
    // `t1 - t2` is a period
    if parse::<Period>(tks, ctx)?.is_some() {
        return Ok(None);
    }
    let terms = additive_terms(tks)?;
    if terms.len() < 2 {
        return Ok(None);
    }
    let mut terms = terms.into_iter();
    let mut time = match terms.next() {
        Some((false, first)) => match parse::<Time>(first, ctx)? {
            Some(t) => t,
            None => return Ok(None),
        },
        _ => return Ok(None),
    };
    for (subtract, term) in terms {
        let period = match parse::<Period>(term, ctx)? {
            Some(p) => p,
            None => return Ok(None),
        };
        let func: fn(Time, Period) -> Time = if subtract {
            time_minus_period
        } else {
            time_plus_period
        };
        time = Box::new(Map2::new("shift", time, period, func));
    }
    Ok(Some(folded(time, ctx, tks.line())?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FrameKind;
    use crate::datatype::{Number, Primitive, TimeList, ValueType};
    use crate::parse::tests::{eval, parsed};

    #[test]
    fn literals() {
        let mut ctx = Context::new("/");
        assert_eq!(eval::<Time>("3 june 2020", &mut ctx), Time::date(3, 6, 2020));
        assert_eq!(eval::<Time>("june 2020", &mut ctx), Time::year_month(6, 2020));
        assert_eq!(eval::<Time>("12:30", &mut ctx), Time::short_clock(12, 30));
        assert_eq!(eval::<Time>("12:30:15", &mut ctx), Time::clock(12, 30, 15));
        assert_eq!(
            eval::<Time>("3 june 2020, 12:30", &mut ctx),
            Time::date_short_clock(3, 6, 2020, 12, 30)
        );
        assert_eq!(
            eval::<Time>("29 february 2020, 23:59:59", &mut ctx),
            Time::date_clock(29, 2, 2020, 23, 59, 59)
        );
        assert!(eval::<Time>("never", &mut ctx).is_never());
    }

    #[test]
    fn literal_ranges() {
        let mut ctx = Context::new("/");
        let err = parsed::<Time>("29 february 2021", &mut ctx).unwrap_err();
        assert_eq!(err, SyntaxError::out_of_range("day", 29, 1));
        let err = parsed::<Time>("3 june 2020, 24:00", &mut ctx).unwrap_err();
        assert_eq!(err, SyntaxError::out_of_range("hour", 24, 1));
        assert!(parsed::<Time>("12:60", &mut ctx).is_err());
        let err = parsed::<Time>("3 jume 2020", &mut ctx).unwrap_err();
        assert!(err.msg.contains("jume"));
    }

    #[test]
    fn shifting_by_periods() {
        let mut ctx = Context::new("/");
        let mut g = parsed::<Time>("3 june 2020 + 2 days", &mut ctx).unwrap().unwrap();
        assert!(g.is_constant());
        assert_eq!(g.value(&mut ctx).unwrap(), Time::date(5, 6, 2020));
        assert_eq!(
            eval::<Time>("1 march 2020 - 1 day + 1 week", &mut ctx),
            Time::date(7, 3, 2020)
        );
        assert!(parsed::<Time>("3 june 2020 - 1 june 2020", &mut ctx).unwrap().is_none());
        let g = parsed::<Time>("today + 1 day", &mut ctx).unwrap().unwrap();
        assert!(!g.is_constant());
    }

    #[test]
    fn members_and_elements() {
        let mut ctx = Context::new("/");
        ctx.declare_variable("t", ValueType::Time);
        ctx.variables
            .assign("t", Time::date_clock(3, 6, 2020, 10, 0, 0).into_value())
            .unwrap();
        ctx.declare_variable("dates", ValueType::TimeList);
        let dates: TimeList = vec![Time::date(1, 1, 2020), Time::date_short_clock(2, 1, 2020, 8, 15)];
        ctx.variables.assign("dates", dates.into_value()).unwrap();
        assert_eq!(eval::<Time>("t.date", &mut ctx), Time::date(3, 6, 2020));
        assert_eq!(eval::<Time>("dates[1]", &mut ctx), Time::date_short_clock(2, 1, 2020, 8, 15));
        assert_eq!(eval::<Time>("dates[1].date", &mut ctx), Time::date(2, 1, 2020));
        assert_eq!(eval::<Number>("dates[1].hour", &mut ctx), Number::Int(8));
    }

    #[test]
    fn this_of_a_time_loop() {
        let mut ctx = Context::new("/");
        ctx.within(FrameKind::Value(ValueType::Time), |ctx, frame| {
            ctx.set_this(frame, Time::date(1, 1, 2021).into_value(), 0);
            assert_eq!(eval::<Time>("this + 1 year", ctx), Time::date(1, 1, 2022));
            Ok::<(), SyntaxError>(())
        })
        .unwrap();
    }
}
