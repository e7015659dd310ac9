use super::variable::variable;
use super::{folded, parse, parse_conditional, ParseResult, Parseable};
use crate::context::{Attribute, Context, FrameId};
use crate::datatype::{Number, Period, PeriodUnit, Time};
use crate::generator::time::{
    period_minus, period_negated, period_plus, time_difference, time_minus_period,
    time_plus_period,
};
use crate::generator::{AttributeValue, Constant, GenPtr, Map, Map2, PeriodUnitValue};
use crate::lang::SyntaxError;
use crate::tokens::{
    Tokens, HAS_ARITHMETIC, HAS_BOOL_OPERATOR, HAS_COMMA, HAS_COMPARISON, HAS_FILTER_KEYWORD,
    IS_POSSIBLE_BINARY, IS_POSSIBLE_FUNCTION, IS_POSSIBLE_TERNARY,
};

impl Parseable for Period {
    fn parse_native(tks: Tokens, ctx: &mut Context) -> ParseResult<Period> {
        if tks.len() == 1 {
            return variable::<Period>(tks.first(), ctx);
        }
        if tks.check(HAS_FILTER_KEYWORD | IS_POSSIBLE_FUNCTION) {
            return Ok(None);
        }
        // a comma only appears inside a clock time operand
        if tks.check(HAS_COMMA) && !tks.check(HAS_ARITHMETIC) {
            return Ok(None);
        }
        let mixed = HAS_COMPARISON | HAS_BOOL_OPERATOR | IS_POSSIBLE_TERNARY | IS_POSSIBLE_BINARY;
        if !tks.check(mixed) {
            if tks.check(HAS_ARITHMETIC) {
                let terms = additive_terms(tks)?;
                if terms.len() > 1 {
                    return sum(terms, ctx, tks.line());
                }
            }
            if tks.first().is_symbol('-') {
                return match parse::<Period>(tks.trim_left(), ctx)? {
                    Some(p) => Ok(Some(folded(
                        Box::new(Map::new("negate", p, period_negated)),
                        ctx,
                        tks.line(),
                    )?)),
                    None => Ok(None),
                };
            }
            if let Some(g) = unit_value(tks, ctx)? {
                return Ok(Some(g));
            }
        }
        parse_conditional::<Period>(tks, ctx)
    }

    fn attribute(frame: FrameId, attribute: Attribute) -> Option<GenPtr<Period>> {
        Some(Box::new(AttributeValue::new(frame, attribute)))
    }
}

/// Operands around top-level `+` and `-`, each with a flag telling if it is subtracted.
///
/// A `-` with no operand before it belongs to the next operand (`a - -2 days`).
pub(super) fn additive_terms(tks: Tokens) -> Result<Vec<(bool, Tokens)>, SyntaxError> {
    let mut terms = Vec::new();
    let mut begin = 0;
    let mut subtract = false;
    for i in tks.top_level() {
        let t = tks.at(i);
        let minus = t.is_symbol('-');
        if !minus && !t.is_symbol('+') {
            continue;
        }
        if i == begin {
            if minus {
                continue;
            }
            return Err(if i == 0 {
                SyntaxError::cannot_start_with('+', t.line)
            } else {
                SyntaxError::adjacent_symbols('+', t.line)
            });
        }
        terms.push((subtract, tks.sub(begin, i - begin)));
        subtract = minus;
        begin = i + 1;
    }
    if begin == tks.len() {
        let symbol = tks.last().symbol().unwrap_or('+');
        return Err(SyntaxError::cannot_end_with(symbol, tks.last().line));
    }
    terms.push((subtract, tks.skip(begin)));
    Ok(terms)
}

fn accumulate(
    acc: Option<GenPtr<Period>>,
    subtract: bool,
    p: GenPtr<Period>,
) -> GenPtr<Period> {
    match (acc, subtract) {
        (None, false) => p,
        (None, true) => Box::new(Map::new("negate", p, period_negated)),
        (Some(a), false) => Box::new(Map2::new("plus", a, p, period_plus)),
        (Some(a), true) => Box::new(Map2::new("minus", a, p, period_minus)),
    }
}

/// `2 days + 3 hours`, `t1 - t2`, `t1 + 1 day - t2 + 5 minutes`.
///
/// A time operand waits for the next time to be subtracted from it; periods added in
/// between shift the pending time.
fn sum(terms: Vec<(bool, Tokens)>, ctx: &mut Context, line: usize) -> ParseResult<Period> {
    let mut acc: Option<GenPtr<Period>> = None;
    let mut pending: Option<(bool, GenPtr<Time>)> = None;
    for (subtract, term) in terms {
        if let Some((sign, time)) = pending.take() {
            if subtract {
                if let Some(other) = parse::<Time>(term, ctx)? {
                    let diff: GenPtr<Period> =
                        Box::new(Map2::new("difference", time, other, time_difference));
                    acc = Some(accumulate(acc, sign, diff));
                    continue;
                }
            }
            let shift = match parse::<Period>(term, ctx)? {
                Some(p) => p,
                None => return Ok(None),
            };
            let func: fn(Time, Period) -> Time = if subtract {
                time_minus_period
            } else {
                time_plus_period
            };
            pending = Some((sign, Box::new(Map2::new("shift", time, shift, func))));
            continue;
        }
        if let Some(p) = parse::<Period>(term, ctx)? {
            acc = Some(accumulate(acc, subtract, p));
            continue;
        }
        match parse::<Time>(term, ctx)? {
            Some(t) => pending = Some((subtract, t)),
            None => return Ok(None),
        }
    }
    if pending.is_some() {
        return Ok(None);
    }
    match acc {
        Some(p) => Ok(Some(folded(p, ctx, line)?)),
        None => Ok(None),
    }
}

/// `3 days`, `1 hour`, `(a + b) minutes`.
fn unit_value(tks: Tokens, ctx: &mut Context) -> ParseResult<Period> {
    let last = tks.last();
    let word = match last.word() {
        Some(w) => w,
        None => return Ok(None),
    };
    let (unit, plural) = match PeriodUnit::from_word(word) {
        Some(found) => found,
        None => return Ok(None),
    };
    let amount = tks.trim_right();
    if amount.len() == 1 {
        if let Some((n, _)) = amount.first().number().filter(|_| amount.first().is_plain_number()) {
            if !plural && n != Number::Int(1) {
                return Err(SyntaxError::missing_letter_s(word, last.line));
            }
            let value = Period::new(n.to_i64(), unit);
            return Ok(Some(Box::new(Constant::new(value))));
        }
    }
    let amount = match parse::<Number>(amount, ctx)? {
        Some(a) => a,
        None => return Ok(None),
    };
    if !plural {
        return Err(SyntaxError::missing_letter_s(word, last.line));
    }
    folded(Box::new(PeriodUnitValue::new(amount, unit)), ctx, tks.line()).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::{Primitive, ValueType};
    use crate::parse::tests::{eval, parsed};

    fn days(n: i64) -> Period {
        Period::new(n, PeriodUnit::Days)
    }

    #[test]
    fn units() {
        let mut ctx = Context::new("/");
        assert_eq!(eval::<Period>("3 days", &mut ctx), days(3));
        assert_eq!(eval::<Period>("1 day", &mut ctx), days(1));
        assert_eq!(eval::<Period>("2 weeks", &mut ctx), Period::new(2, PeriodUnit::Weeks));
        let err = parsed::<Period>("2 day", &mut ctx).unwrap_err();
        assert_eq!(err, SyntaxError::missing_letter_s("day", 1));
        ctx.declare_variable("n", ValueType::Number);
        ctx.variables.assign("n", Number::Int(4).into_value()).unwrap();
        let mut g = parsed::<Period>("n hours", &mut ctx).unwrap().unwrap();
        assert!(!g.is_constant());
        assert_eq!(g.value(&mut ctx).unwrap(), Period::new(4, PeriodUnit::Hours));
        assert_eq!(eval::<Period>("(1 + 1) minutes", &mut ctx), Period::new(2, PeriodUnit::Minutes));
    }

    #[test]
    fn sums_and_negation() {
        let mut ctx = Context::new("/");
        let mut g = parsed::<Period>("3 days + 2 hours", &mut ctx).unwrap().unwrap();
        assert!(g.is_constant());
        assert_eq!(
            g.value(&mut ctx).unwrap(),
            days(3) + Period::new(2, PeriodUnit::Hours)
        );
        assert_eq!(eval::<Period>("-2 days", &mut ctx), -days(2));
        assert_eq!(eval::<Period>("1 week - 2 days", &mut ctx), days(5));
        assert!(parsed::<Period>("3 days +", &mut ctx).is_err());
    }

    #[test]
    fn time_differences() {
        let mut ctx = Context::new("/");
        assert_eq!(
            eval::<Period>("5 june 2020 - 3 june 2020", &mut ctx),
            Time::date(5, 6, 2020).difference(&Time::date(3, 6, 2020))
        );
        assert_eq!(
            eval::<Period>("3 june 2020 + 1 day - 3 june 2020", &mut ctx),
            Time::date(4, 6, 2020).difference(&Time::date(3, 6, 2020))
        );
        // a time without a matching subtraction is not a period
        assert!(parsed::<Period>("3 june 2020 + 1 day", &mut ctx).unwrap().is_none());
    }
}
