use super::variable::{is_time_word, variable};
use super::{constant_value, folded, function, parse, parse_conditional, parse_definition};
use super::{ParseResult, Parseable};
use crate::context::{Attribute, Context, FrameId};
use crate::datatype::{List, NumList, Number, Period, Time, TimeList};
use crate::generator::definition::DefinitionToList;
use crate::generator::{
    And, AttributeValue, Between, Comparable, CompareOp, Comparison, Constant, Element, GenPtr,
    InConstList, InList, Like, LikeConst, Not, Or, Regexp, RegexpConst, Success, Xor,
};
use crate::lang::SyntaxError;
use crate::tokens::{
    Keyword, NumberMode, Token, Tokens, HAS_BOOL_OPERATOR, HAS_COMPARISON, HAS_FILTER_KEYWORD,
    IS_POSSIBLE_BINARY, IS_POSSIBLE_TERNARY,
};

impl Parseable for bool {
    fn parse_native(tks: Tokens, ctx: &mut Context) -> ParseResult<bool> {
        if tks.len() == 1 {
            return one_token(tks.first(), ctx);
        }
        if tks.check(HAS_FILTER_KEYWORD) {
            return Ok(None);
        }
        if let Some(g) = function::bool_function(tks, ctx)? {
            return Ok(Some(g));
        }
        // `?` binds loosest: `a = b ? c : d` is a conditional
        if !tks.check(IS_POSSIBLE_TERNARY | IS_POSSIBLE_BINARY) {
            if tks.check(HAS_BOOL_OPERATOR) {
                if let Some(g) = expression(tks, ctx)? {
                    return Ok(Some(g));
                }
            }
            if let Some(g) = negatable(tks, ctx)? {
                return Ok(Some(g));
            }
            if tks.check(HAS_COMPARISON) {
                if let Some(g) = comparison(tks, ctx)? {
                    return Ok(Some(g));
                }
            }
        }
        parse_conditional::<bool>(tks, ctx)
    }

    fn global(name: &str, _ctx: &mut Context) -> Option<GenPtr<bool>> {
        match name {
            "success" => Some(Box::new(Success)),
            _ => None,
        }
    }

    fn attribute(frame: FrameId, attribute: Attribute) -> Option<GenPtr<bool>> {
        Some(Box::new(AttributeValue::new(frame, attribute)))
    }
}

fn one_token(token: &Token, ctx: &mut Context) -> ParseResult<bool> {
    match token.keyword() {
        Some(Keyword::True) => Ok(Some(Box::new(Constant::new(true)))),
        Some(Keyword::False) => Ok(Some(Box::new(Constant::new(false)))),
        _ => variable::<bool>(token, ctx),
    }
}

fn negated(g: GenPtr<bool>, ctx: &mut Context, line: usize) -> Result<GenPtr<bool>, SyntaxError> {
    folded(Box::new(Not::new(g)), ctx, line)
}

#[derive(Clone, Copy)]
enum BoolOp {
    And,
    Or,
    Xor,
}

fn is_negatable(token: &Token) -> bool {
    token.keyword().map(|k| k.is_negatable()).unwrap_or(false)
}

/// `a and b or not c`: operators share one precedence and apply left to right.
fn expression(tks: Tokens, ctx: &mut Context) -> ParseResult<bool> {
    let line = tks.line();
    let top = tks.top_level();
    let mut operators: Vec<(usize, BoolOp)> = Vec::new();
    let mut between = false;
    for &i in &top {
        match tks.at(i).keyword() {
            Some(Keyword::Between) => between = true,
            // the `and` of `x between 1 and 5`
            Some(Keyword::And) if between => between = false,
            Some(Keyword::And) => operators.push((i, BoolOp::And)),
            Some(Keyword::Or) => operators.push((i, BoolOp::Or)),
            Some(Keyword::Xor) => operators.push((i, BoolOp::Xor)),
            _ => {}
        }
    }
    if operators.is_empty() && !tks.first().is_keyword(Keyword::Not) {
        return Ok(None);
    }
    let mut begin = 0;
    let mut result: Option<GenPtr<bool>> = None;
    let mut pending: Option<BoolOp> = None;
    let ends = operators
        .iter()
        .map(|(i, op)| (*i, Some(*op)))
        .chain(std::iter::once((tks.len(), None)));
    for (end, next) in ends {
        if end == begin {
            return Err(SyntaxError::invalid_boolean_expression(line));
        }
        let operand = operand(tks.sub(begin, end - begin), ctx)?;
        result = Some(match (result, pending) {
            (Some(left), Some(op)) => {
                let node: GenPtr<bool> = match op {
                    BoolOp::And => Box::new(And::new(left, operand)),
                    BoolOp::Or => Box::new(Or::new(left, operand)),
                    BoolOp::Xor => Box::new(Xor::new(left, operand)),
                };
                folded(node, ctx, line)?
            }
            _ => operand,
        });
        pending = next;
        begin = end + 1;
    }
    Ok(result)
}

/// One operand of a boolean expression, with its leading `not`s.
fn operand(tks: Tokens, ctx: &mut Context) -> Result<GenPtr<bool>, SyntaxError> {
    let line = tks.line();
    let mut nots = 0;
    while nots < tks.len()
        && tks.at(nots).is_keyword(Keyword::Not)
        && !(nots + 1 < tks.len() && is_negatable(tks.at(nots + 1)))
    {
        nots += 1;
    }
    let rest = tks.skip(nots);
    if rest.is_empty() {
        return Err(SyntaxError::invalid_boolean_expression(line));
    }
    let g = parse::<bool>(rest, ctx)?.ok_or_else(|| SyntaxError::invalid_boolean_expression(line))?;
    if nots % 2 == 1 {
        negated(g, ctx, line)
    } else {
        Ok(g)
    }
}

/// `in`, `like`, `between` and `regexp`, each optionally preceded by `not`.
fn negatable(tks: Tokens, ctx: &mut Context) -> ParseResult<bool> {
    let position = tks.top_level().into_iter().find(|&i| is_negatable(tks.at(i)));
    let i = match position {
        Some(i) => i,
        None => return Ok(None),
    };
    let keyword = match tks.at(i).keyword() {
        Some(k) => k,
        None => return Ok(None),
    };
    let line = tks.at(i).line;
    let mut left = tks.take(i);
    let right = tks.skip(i + 1);
    let mut negate = false;
    if !left.is_empty() && left.last().is_keyword(Keyword::Not) {
        negate = true;
        left = left.trim_right();
    }
    if left.is_empty() {
        return Err(SyntaxError::left_side_empty(keyword.as_str(), line));
    }
    if right.is_empty() {
        return Err(SyntaxError::right_side_empty(keyword.as_str(), line));
    }
    let g = match keyword {
        Keyword::In => parse_in(left, right, ctx)?,
        Keyword::Like => parse_like(left, right, ctx)?,
        Keyword::Regexp => parse_regexp(left, right, ctx)?,
        Keyword::Between => parse_between(left, right, ctx)?,
        _ => None,
    };
    match g {
        Some(g) if negate => Ok(Some(negated(g, ctx, line)?)),
        other => Ok(other),
    }
}

fn parse_in(left: Tokens, right: Tokens, ctx: &mut Context) -> ParseResult<bool> {
    if left.len() == 1 && is_time_word(left.first(), ctx) {
        let elements = right.split_by_symbol(',').unwrap_or_default();
        let member = elements.iter().filter(|e| e.len() == 1).find_map(|e| {
            let t = e.first();
            if t.is_month() {
                Some("month")
            } else if t.is_weekday() {
                Some("weekday")
            } else {
                None
            }
        });
        if let Some(member) = member {
            return Err(SyntaxError::new(
                format!(
                    "instead of \"{0} in {1}\", you should write \"{0}.{2} in {1}\"",
                    left.first(),
                    right,
                    member
                ),
                left.line(),
            ));
        }
    }
    if let Some(g) = in_collection::<Number>(left, right, ctx)? {
        return Ok(Some(g));
    }
    if let Some(g) = in_collection::<Time>(left, right, ctx)? {
        return Ok(Some(g));
    }
    in_collection::<String>(left, right, ctx)
}

fn in_collection<T>(left: Tokens, right: Tokens, ctx: &mut Context) -> ParseResult<bool>
where
    T: Parseable + Element,
    Vec<T>: Parseable,
{
    let value = match parse::<T>(left, ctx)? {
        Some(v) => v,
        None => return Ok(None),
    };
    if right.len() == 1 {
        // `x in 5` is an equality test
        if let Some(single) = parse::<T>(right, ctx)? {
            return Ok(Some(folded(
                Box::new(Comparison::new(value, single, CompareOp::Equals)),
                ctx,
                left.line(),
            )?));
        }
    }
    let mut list = match parse::<Vec<T>>(right, ctx)? {
        Some(l) => l,
        None => return Ok(None),
    };
    if list.is_constant() {
        let values = constant_value(&mut list, ctx, right.line())?;
        return Ok(Some(folded(
            Box::new(InConstList::new(value, values)),
            ctx,
            left.line(),
        )?));
    }
    Ok(Some(Box::new(InList::new(value, list))))
}

fn parse_like(left: Tokens, right: Tokens, ctx: &mut Context) -> ParseResult<bool> {
    let value = match parse::<String>(left, ctx)? {
        Some(v) => v,
        None => return Ok(None),
    };
    let mut pattern = match parse::<String>(right, ctx)? {
        Some(p) => p,
        None => return Ok(None),
    };
    if pattern.is_constant() {
        let pattern = constant_value(&mut pattern, ctx, right.line())?;
        if pattern.is_empty() {
            return Ok(Some(Box::new(Constant::new(false))));
        }
        return Ok(Some(folded(
            Box::new(LikeConst::new(value, &pattern)),
            ctx,
            left.line(),
        )?));
    }
    Ok(Some(Box::new(Like::new(value, pattern))))
}

fn parse_regexp(left: Tokens, right: Tokens, ctx: &mut Context) -> ParseResult<bool> {
    let value = match parse::<String>(left, ctx)? {
        Some(v) => v,
        None => return Ok(None),
    };
    let mut pattern = match parse::<String>(right, ctx)? {
        Some(p) => p,
        None => return Ok(None),
    };
    if pattern.is_constant() {
        let pattern = constant_value(&mut pattern, ctx, right.line())?;
        if pattern.is_empty() {
            return Ok(Some(Box::new(Constant::new(false))));
        }
        let node = RegexpConst::new(value, &pattern).map_err(|e| {
            SyntaxError::new(
                format!("'{}' is not a valid regular expression: {}", pattern, e),
                right.line(),
            )
        })?;
        return Ok(Some(folded(Box::new(node), ctx, left.line())?));
    }
    Ok(Some(Box::new(Regexp::new(value, pattern))))
}

fn parse_between(left: Tokens, right: Tokens, ctx: &mut Context) -> ParseResult<bool> {
    let line = right.line();
    let (low, high) = match right.find_keyword(Keyword::And) {
        Some(i) => (right.take(i), right.skip(i + 1)),
        None => {
            return Err(SyntaxError::new(
                "keyword 'between' should be followed by a range: 'x between a and b'",
                line,
            ))
        }
    };
    if low.is_empty() {
        return Err(SyntaxError::left_side_empty("and", line));
    }
    if high.is_empty() {
        return Err(SyntaxError::right_side_empty("and", line));
    }
    if let Some(g) = between_of::<Number>(left, low, high, ctx)? {
        return Ok(Some(g));
    }
    if let Some(g) = between_of::<Time>(left, low, high, ctx)? {
        return Ok(Some(g));
    }
    if let Some(g) = between_of::<Period>(left, low, high, ctx)? {
        return Ok(Some(g));
    }
    between_of::<String>(left, low, high, ctx)
}

fn between_of<T: Parseable + Comparable>(
    value: Tokens,
    low: Tokens,
    high: Tokens,
    ctx: &mut Context,
) -> ParseResult<bool> {
    let v = match parse::<T>(value, ctx)? {
        Some(v) => v,
        None => return Ok(None),
    };
    let l = match parse::<T>(low, ctx)? {
        Some(l) => l,
        None => return Ok(None),
    };
    let h = match parse::<T>(high, ctx)? {
        Some(h) => h,
        None => return Ok(None),
    };
    Ok(Some(folded(Box::new(Between::new(v, l, h)), ctx, value.line())?))
}

/// `a < b`, `a != b`, ... split at the first top-level comparison symbol.
fn comparison(tks: Tokens, ctx: &mut Context) -> ParseResult<bool> {
    let position = tks
        .top_level()
        .into_iter()
        .find(|&i| matches!(tks.at(i).symbol(), Some('<' | '>' | '=' | '!')));
    let i = match position {
        Some(i) => i,
        None => return Ok(None),
    };
    let line = tks.at(i).line;
    let with_equals = i + 1 < tks.len() && tks.at(i + 1).is_symbol('=');
    let op = match (tks.at(i).symbol(), with_equals) {
        (Some('<'), false) => CompareOp::Smaller,
        (Some('<'), true) => CompareOp::SmallerEquals,
        (Some('>'), false) => CompareOp::Bigger,
        (Some('>'), true) => CompareOp::BiggerEquals,
        (Some('!'), true) => CompareOp::NotEquals,
        (Some('!'), false) => {
            return Err(SyntaxError::new(
                "expected = after exclamation mark. For a simple negation, use keyword \"not\" instead",
                line,
            ))
        }
        _ => CompareOp::Equals,
    };
    let skip = if with_equals && op != CompareOp::Equals { 2 } else { 1 };
    let left = tks.take(i);
    let right = tks.skip(i + skip);
    match (left.is_empty(), right.is_empty()) {
        (true, true) => {
            return Err(SyntaxError::new(
                format!("both sides of the {} comparison are empty", op),
                line,
            ))
        }
        (true, false) => {
            return Err(SyntaxError::new(
                format!("the left side of the {} comparison is empty", op),
                line,
            ))
        }
        (false, true) => {
            return Err(SyntaxError::new(
                format!("the right side of the {} comparison is empty", op),
                line,
            ))
        }
        _ => {}
    }
    if left.len() == 1 && right.len() == 1 {
        if let Some(e) = time_hint(left.first(), right.first(), true, op, ctx) {
            return Err(e);
        }
        if let Some(e) = time_hint(right.first(), left.first(), false, op, ctx) {
            return Err(e);
        }
    }
    if let Some(g) = compare_as::<bool>(left, right, op, ctx)? {
        return Ok(Some(g));
    }
    if let Some(g) = compare_as::<Number>(left, right, op, ctx)? {
        return Ok(Some(g));
    }
    if let Some(g) = compare_as::<Period>(left, right, op, ctx)? {
        return Ok(Some(g));
    }
    if let Some(g) = compare_as::<Time>(left, right, op, ctx)? {
        return Ok(Some(g));
    }
    if let Some(g) = compare_as::<String>(left, right, op, ctx)? {
        return Ok(Some(g));
    }
    if let Some(g) = compare_definitions(left, right, op, ctx)? {
        return Ok(Some(g));
    }
    if let Some(g) = compare_as::<TimeList>(left, right, op, ctx)? {
        return Ok(Some(g));
    }
    if let Some(g) = compare_as::<NumList>(left, right, op, ctx)? {
        return Ok(Some(g));
    }
    compare_as::<List>(left, right, op, ctx)
}

fn compare_as<T: Parseable + Comparable>(
    left: Tokens,
    right: Tokens,
    op: CompareOp,
    ctx: &mut Context,
) -> ParseResult<bool> {
    let l = match parse::<T>(left, ctx)? {
        Some(l) => l,
        None => return Ok(None),
    };
    let r = match parse::<T>(right, ctx)? {
        Some(r) => r,
        None => return Ok(None),
    };
    Ok(Some(folded(Box::new(Comparison::new(l, r, op)), ctx, left.line())?))
}

/// At least one side is a definition: both sides are compared as lists.
fn compare_definitions(
    left: Tokens,
    right: Tokens,
    op: CompareOp,
    ctx: &mut Context,
) -> ParseResult<bool> {
    let l = parse_definition(left, ctx)?;
    let r = parse_definition(right, ctx)?;
    if l.is_none() && r.is_none() {
        return Ok(None);
    }
    let l: GenPtr<List> = match l {
        Some(d) => Box::new(DefinitionToList::new(d)),
        None => match parse::<List>(left, ctx)? {
            Some(l) => l,
            None => return Ok(None),
        },
    };
    let r: GenPtr<List> = match r {
        Some(d) => Box::new(DefinitionToList::new(d)),
        None => match parse::<List>(right, ctx)? {
            Some(r) => r,
            None => return Ok(None),
        },
    };
    Ok(Some(Box::new(Comparison::new(l, r, op))))
}

/// `creation = 2020` and friends: point at the time member the script meant.
fn time_hint(
    variable: &Token,
    other: &Token,
    variable_first: bool,
    op: CompareOp,
    ctx: &Context,
) -> Option<SyntaxError> {
    if !is_time_word(variable, ctx) {
        return None;
    }
    let member = match other.number() {
        Some((_, NumberMode::Weekday)) => "weekday",
        Some((_, NumberMode::Month)) => "month",
        Some((n, NumberMode::Normal)) if n.is_int() && (1950..=2100).contains(&n.to_i64()) => {
            "year"
        }
        Some(_) => {
            return Some(SyntaxError::new(
                format!(
                    "the time variable '{}' cannot be compared to a number",
                    variable
                ),
                variable.line,
            ))
        }
        None => return None,
    };
    let (written, suggested) = if variable_first {
        (
            format!("{} {} {}", variable, op, other),
            format!("{}.{} {} {}", variable, member, op, other),
        )
    } else {
        (
            format!("{} {} {}", other, op, variable),
            format!("{} {} {}.{}", other, op, variable, member),
        )
    };
    Some(SyntaxError::new(
        format!("instead of \"{}\", you should write \"{}\"", written, suggested),
        variable.line,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::{Number, Value, ValueType};
    use crate::parse::tests::{eval, parsed};

    #[test]
    fn literals_and_logic() {
        let mut ctx = Context::new("/");
        assert!(eval::<bool>("true and not false", &mut ctx));
        assert!(!eval::<bool>("true and false or false", &mut ctx));
        // left to right: (true or false) and false
        assert!(!eval::<bool>("true or false and false", &mut ctx));
        assert!(eval::<bool>("true xor false", &mut ctx));
        assert!(eval::<bool>("not not true", &mut ctx));
        let g = parsed::<bool>("true and (1 < 2)", &mut ctx).unwrap().unwrap();
        assert!(g.is_constant());
    }

    #[test]
    fn malformed_logic() {
        let mut ctx = Context::new("/");
        assert!(parsed::<bool>("true and", &mut ctx).is_err());
        assert!(parsed::<bool>("and true", &mut ctx).is_err());
        assert!(parsed::<bool>("true and or false", &mut ctx).is_err());
        assert!(parsed::<bool>("true and 'text'", &mut ctx).is_err());
    }

    #[test]
    fn comparisons() {
        let mut ctx = Context::new("/");
        assert!(eval::<bool>("1 + 1 = 2", &mut ctx));
        assert!(eval::<bool>("2 >= 2", &mut ctx));
        assert!(eval::<bool>("'a' != 'b'", &mut ctx));
        assert!(eval::<bool>("'abc' < 'abd'", &mut ctx));
        assert!(eval::<bool>("3 days > 2 days", &mut ctx));
        assert!(eval::<bool>("(1, 2) < (1, 3)", &mut ctx));
        assert!(eval::<bool>("1 = 1 and 2 = 2", &mut ctx));
    }

    #[test]
    fn comparison_errors() {
        let mut ctx = Context::new("/");
        let err = parsed::<bool>("1 ! 2", &mut ctx).unwrap_err();
        assert!(err.msg.contains("exclamation"));
        let err = parsed::<bool>("= 2", &mut ctx).unwrap_err();
        assert!(err.msg.contains("left side"));
        let err = parsed::<bool>("now = 2020", &mut ctx).unwrap_err();
        assert!(err.msg.contains("now.year = 2020"));
        let err = parsed::<bool>("june = now", &mut ctx).unwrap_err();
        assert!(err.msg.contains("= now.month"));
        let err = parsed::<bool>("now < 7", &mut ctx).unwrap_err();
        assert!(err.msg.contains("cannot be compared to a number"));
    }

    #[test]
    fn membership() {
        let mut ctx = Context::new("/");
        assert!(eval::<bool>("2 in (1, 2, 3)", &mut ctx));
        assert!(eval::<bool>("4 not in (1, 2, 3)", &mut ctx));
        assert!(eval::<bool>("'b' in ('a', 'b')", &mut ctx));
        assert!(eval::<bool>("'5' in (5, 6)", &mut ctx));
        assert!(eval::<bool>("3 in 3", &mut ctx));
        let g = parsed::<bool>("2 in (1, 2)", &mut ctx).unwrap().unwrap();
        assert!(g.is_constant());

        ctx.declare_variable("x", ValueType::Number);
        let mut g = parsed::<bool>("x in (1, 2, 3)", &mut ctx).unwrap().unwrap();
        assert!(!g.is_constant());
        ctx.variables.assign("x", Value::Number(Number::Int(2))).unwrap();
        assert!(g.value(&mut ctx).unwrap());
        ctx.variables.assign("x", Value::Number(Number::Int(4))).unwrap();
        assert!(!g.value(&mut ctx).unwrap());
        let err = parsed::<bool>("in (1, 2)", &mut ctx).unwrap_err();
        assert!(err.msg.contains("left side"));
        let err = parsed::<bool>("now in (june, july)", &mut ctx).unwrap_err();
        assert!(err.msg.contains("now.month in"));
    }

    #[test]
    fn signed_zeros_are_members() {
        let mut ctx = Context::new("/");
        assert!(eval::<bool>("0 = -0.0", &mut ctx));
        assert!(eval::<bool>("0 in (-0.0, 5)", &mut ctx));
        assert!(eval::<bool>("-0.0 in (0, 5)", &mut ctx));
        assert!(eval::<bool>("2.0 in (1, 2)", &mut ctx));
        ctx.declare_variable("z", ValueType::Number);
        ctx.variables.assign("z", Value::Number(Number::Int(0))).unwrap();
        assert!(eval::<bool>("z in (-0.0, 5)", &mut ctx));
    }

    #[test]
    fn patterns_and_ranges() {
        let mut ctx = Context::new("/");
        assert!(eval::<bool>("'report.txt' like '%.txt'", &mut ctx));
        assert!(eval::<bool>("'report.txt' not like '%.pdf'", &mut ctx));
        assert!(!eval::<bool>("'' like ''", &mut ctx));
        assert!(eval::<bool>("'abc123' regexp '[a-z]+[0-9]+'", &mut ctx));
        assert!(parsed::<bool>("'a' regexp '(('", &mut ctx).is_err());
        assert!(eval::<bool>("5 between 1 and 10", &mut ctx));
        assert!(eval::<bool>("5 between 10 and 1", &mut ctx));
        assert!(eval::<bool>("5 not between 6 and 7 and true", &mut ctx));
        assert!(eval::<bool>("'m' between 'a' and 'z'", &mut ctx));
        assert!(parsed::<bool>("5 between 1", &mut ctx).is_err());
    }
}
