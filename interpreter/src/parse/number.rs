use super::variable::{variable, variable_named};
use super::{constant_value, folded, function, parse, parse_collection_element, parse_conditional};
use super::{try_cast, ParseResult, Parseable};
use crate::context::{Attribute, Context, FrameId};
use crate::datatype::{Number, Time};
use crate::generator::{
    ArithmeticOp, AttributeValue, Constant, GenPtr, IndexRef, Map, TimeField, TimeMember,
};
use crate::lang::SyntaxError;
use crate::tokens::{
    Token, Tokens, HAS_ARITHMETIC, HAS_BOOL_OPERATOR, HAS_COMMA, HAS_COMPARISON,
    HAS_FILTER_KEYWORD, IS_LIST_ELEM_MEMBER, IS_POSSIBLE_BINARY, IS_POSSIBLE_TERNARY,
};

impl Parseable for Number {
    fn parse_cast(tks: Tokens, ctx: &mut Context) -> ParseResult<Number> {
        try_cast::<bool, Number>(tks, ctx, "number", |b| Number::Int(b as i64))
    }

    fn parse_native(tks: Tokens, ctx: &mut Context) -> ParseResult<Number> {
        if tks.len() == 1 {
            return one_token(tks.first(), ctx);
        }
        if tks.check(HAS_FILTER_KEYWORD) {
            return Ok(None);
        }
        if let Some(g) = function::number_function(tks, ctx)? {
            return Ok(Some(g));
        }
        let mixed = HAS_COMMA
            | HAS_COMPARISON
            | HAS_BOOL_OPERATOR
            | IS_POSSIBLE_TERNARY
            | IS_POSSIBLE_BINARY;
        if tks.check(HAS_ARITHMETIC) && !tks.check(mixed) {
            if let Some(g) = expression(tks, ctx)? {
                return Ok(Some(g));
            }
        }
        if let Some(g) = parse_collection_element::<Number>(tks, ctx)? {
            return Ok(Some(g));
        }
        if tks.check(IS_LIST_ELEM_MEMBER) {
            if let Some(g) = element_member(tks, ctx)? {
                return Ok(Some(g));
            }
        }
        parse_conditional::<Number>(tks, ctx)
    }

    fn global(name: &str, _ctx: &mut Context) -> Option<GenPtr<Number>> {
        match name {
            "nan" => Some(Box::new(Constant::new(Number::NaN))),
            _ => None,
        }
    }

    fn attribute(frame: FrameId, attribute: Attribute) -> Option<GenPtr<Number>> {
        Some(Box::new(AttributeValue::new(frame, attribute)))
    }

    fn index(frame: FrameId) -> Option<GenPtr<Number>> {
        Some(Box::new(IndexRef::new(frame)))
    }
}

fn one_token(token: &Token, ctx: &mut Context) -> ParseResult<Number> {
    if let Some((n, _)) = token.number() {
        return Ok(Some(Box::new(Constant::new(n))));
    }
    if let Some((name, member)) = token.two_words() {
        if name.is_empty() {
            return Ok(None);
        }
        return time_member(name, member, token.line, ctx);
    }
    variable::<Number>(token, ctx)
}

/// `creation.year`, `t.hour`, ...; `.date` is a time, not a number.
fn time_member(name: &str, member: &str, line: usize, ctx: &mut Context) -> ParseResult<Number> {
    if member == "date" {
        return Ok(None);
    }
    let field = TimeField::from_word(member).ok_or_else(|| SyntaxError::time_member(member, line))?;
    let time = variable_named::<Time>(name, line, ctx)?.ok_or_else(|| {
        SyntaxError::new(format!("'{}' is not a time variable", name), line)
    })?;
    Ok(Some(Box::new(TimeMember::new(time, field))))
}

/// `dates[i].year`
fn element_member(tks: Tokens, ctx: &mut Context) -> ParseResult<Number> {
    let member = match tks.last().two_words() {
        Some((_, member)) => member,
        None => return Ok(None),
    };
    if member == "date" {
        return Ok(None);
    }
    let field = TimeField::from_word(member)
        .ok_or_else(|| SyntaxError::time_member(member, tks.last().line))?;
    match parse_collection_element::<Time>(tks.trim_right(), ctx)? {
        Some(element) => Ok(Some(Box::new(TimeMember::new(element, field)))),
        None => Ok(None),
    }
}

fn negate(n: Number) -> Number {
    -n
}

/// Operand of an arithmetic expression, `None` when it is not a number.
fn operand(
    tks: Tokens,
    negative: bool,
    ctx: &mut Context,
) -> Result<Option<GenPtr<Number>>, SyntaxError> {
    let g = match parse::<Number>(tks, ctx)? {
        Some(g) => g,
        None => return Ok(None),
    };
    if negative {
        Ok(Some(folded(Box::new(Map::new("negate", g, negate)), ctx, tks.line())?))
    } else {
        Ok(Some(g))
    }
}

/// Apply one operator; a divisor known to be zero is rejected here.
fn merge(
    left: GenPtr<Number>,
    op: ArithmeticOp,
    mut right: GenPtr<Number>,
    ctx: &mut Context,
    line: usize,
) -> Result<GenPtr<Number>, SyntaxError> {
    if matches!(op, ArithmeticOp::Divide | ArithmeticOp::Modulo) && right.is_constant() {
        let divisor = constant_value(&mut right, ctx, line)?;
        if divisor.is_zero() {
            return Err(if op == ArithmeticOp::Divide {
                SyntaxError::division_by_zero(line)
            } else {
                SyntaxError::modulo_by_zero(line)
            });
        }
        right = Box::new(Constant::new(divisor));
    }
    folded(op.node(left, right), ctx, line)
}

/// `a + b * -c`: operands are split at top-level operators, `* / %` bind first.
fn expression(tks: Tokens, ctx: &mut Context) -> ParseResult<Number> {
    let len = tks.len();
    let mut operands: Vec<GenPtr<Number>> = Vec::new();
    let mut operators: Vec<(ArithmeticOp, usize)> = Vec::new();
    let mut begin = 0;
    let mut negative = false;
    let mut i = 0;
    while i < len {
        let t = tks.at(i);
        if t.is_open_bracket() {
            i = tks.closing_index(i).map(|c| c + 1).unwrap_or(len);
            continue;
        }
        let (symbol, op) = match t.symbol().and_then(|c| ArithmeticOp::from_symbol(c).map(|op| (c, op))) {
            Some(found) => found,
            None => {
                i += 1;
                continue;
            }
        };
        if i == begin {
            if op == ArithmeticOp::Subtract && !negative {
                negative = true;
                begin = i + 1;
                i += 1;
                continue;
            }
            return Err(if i == 0 {
                SyntaxError::cannot_start_with(symbol, t.line)
            } else {
                SyntaxError::adjacent_symbols(symbol, t.line)
            });
        }
        match operand(tks.sub(begin, i - begin), negative, ctx)? {
            Some(g) => operands.push(g),
            None => return Ok(None),
        }
        operators.push((op, t.line));
        negative = false;
        begin = i + 1;
        i += 1;
    }
    if begin == len {
        let symbol = tks.last().symbol().unwrap_or('-');
        return Err(SyntaxError::cannot_end_with(symbol, tks.last().line));
    }
    match operand(tks.skip(begin), negative, ctx)? {
        Some(g) => operands.push(g),
        None => return Ok(None),
    }

    // `* / %` first
    let mut operands = operands.into_iter();
    let mut terms: Vec<GenPtr<Number>> = operands.next().into_iter().collect();
    let mut additive: Vec<(ArithmeticOp, usize)> = Vec::new();
    for ((op, line), right) in operators.into_iter().zip(operands) {
        if op.precedence() > 1 {
            let left = match terms.pop() {
                Some(l) => l,
                None => return Err(SyntaxError::invalid_numeric_expression(line)),
            };
            terms.push(merge(left, op, right, ctx, line)?);
        } else {
            additive.push((op, line));
            terms.push(right);
        }
    }
    let mut terms = terms.into_iter();
    let mut result = match terms.next() {
        Some(first) => first,
        None => return Err(SyntaxError::invalid_numeric_expression(tks.line())),
    };
    for ((op, line), right) in additive.into_iter().zip(terms) {
        result = merge(result, op, right, ctx, line)?;
    }
    Ok(Some(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FrameKind;
    use crate::datatype::{Primitive, ValueType};
    use crate::parse::tests::{eval, parsed};

    #[test]
    fn precedence_and_folding() {
        let mut ctx = Context::new("/");
        let mut g = parsed::<Number>("1 + 2 * 3", &mut ctx).unwrap().unwrap();
        assert!(g.is_constant());
        assert_eq!(g.value(&mut ctx).unwrap(), Number::Int(7));
        assert_eq!(eval::<Number>("(1 + 2) * 3", &mut ctx), Number::Int(9));
        assert_eq!(eval::<Number>("10 - 2 - 3", &mut ctx), Number::Int(5));
        assert_eq!(eval::<Number>("-5 + 2", &mut ctx), Number::Int(-3));
        assert_eq!(eval::<Number>("2 * -3", &mut ctx), Number::Int(-6));
        assert_eq!(eval::<Number>("7 % 3 + 8 / 2", &mut ctx), Number::Int(5));
        assert_eq!(eval::<Number>("true + true", &mut ctx), Number::Int(2));
    }

    #[test]
    fn static_zero_divisor() {
        let mut ctx = Context::new("/");
        let err = parsed::<Number>("1 / 0", &mut ctx).unwrap_err();
        assert_eq!(err, SyntaxError::division_by_zero(1));
        let err = parsed::<Number>("5 % 0", &mut ctx).unwrap_err();
        assert_eq!(err, SyntaxError::modulo_by_zero(1));
        ctx.declare_variable("x", ValueType::Number);
        let err = parsed::<Number>("x % 0", &mut ctx).unwrap_err();
        assert_eq!(err, SyntaxError::modulo_by_zero(1));
        let err = parsed::<Number>("x % (2 - 2)", &mut ctx).unwrap_err();
        assert_eq!(err, SyntaxError::modulo_by_zero(1));
        // a divisor unknown until runtime yields NaN instead
        let mut g = parsed::<Number>("1 / x", &mut ctx).unwrap().unwrap();
        assert!(g.value(&mut ctx).unwrap().is_nan());
    }

    #[test]
    fn malformed() {
        let mut ctx = Context::new("/");
        assert!(parsed::<Number>("1 +", &mut ctx).is_err());
        assert!(parsed::<Number>("* 2", &mut ctx).is_err());
        assert!(parsed::<Number>("1 + * 2", &mut ctx).is_err());
        assert!(parsed::<Number>("1 + 'a'", &mut ctx).unwrap().is_none());
    }

    #[test]
    fn members_and_elements() {
        let mut ctx = Context::new("/");
        ctx.declare_variable("t", ValueType::Time);
        ctx.declare_variable("nums", ValueType::NumList);
        ctx.variables
            .assign("nums", vec![Number::Int(4), Number::Int(5)].into_value())
            .unwrap();
        assert_eq!(eval::<Number>("t.year", &mut ctx), Number::Int(0));
        assert_eq!(eval::<Number>("nums[1] * 2", &mut ctx), Number::Int(10));
        assert!(parsed::<Number>("t.colour", &mut ctx).is_err());
        assert!(parsed::<Number>("u.year", &mut ctx).is_err());
        assert!(eval::<Number>("nan", &mut ctx).is_nan());
    }

    #[test]
    fn index_of_a_loop() {
        let mut ctx = Context::new("/");
        ctx.within(FrameKind::Index, |ctx, frame| {
            ctx.set_index(frame, 3);
            assert_eq!(eval::<Number>("index + 1", ctx), Number::Int(4));
            Ok::<(), SyntaxError>(())
        })
        .unwrap();
        assert!(parsed::<Number>("index", &mut ctx).is_err());
    }
}
