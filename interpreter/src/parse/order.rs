use super::{parse, Parseable};
use crate::context::{Context, FrameId};
use crate::datatype::{Number, Period, Time, ValueType};
use crate::generator::{GenPtr, OrderKey, OrderKeys, ThisRef};
use crate::lang::SyntaxError;
use crate::tokens::{Keyword, Tokens};

fn key_of<T: Parseable>(
    tks: Tokens,
    ctx: &mut Context,
    wrap: fn(GenPtr<T>) -> OrderKey,
) -> Result<Option<OrderKey>, SyntaxError> {
    Ok(parse::<T>(tks, ctx)?.map(wrap))
}

/// One unit of `order by`, typed by the first parser that accepts it.
fn unit_key(tks: Tokens, ctx: &mut Context) -> Result<OrderKey, SyntaxError> {
    if let Some(key) = key_of::<bool>(tks, ctx, OrderKey::Bool)? {
        return Ok(key);
    }
    if let Some(key) = key_of::<Number>(tks, ctx, OrderKey::Number)? {
        return Ok(key);
    }
    if let Some(key) = key_of::<Period>(tks, ctx, OrderKey::Period)? {
        return Ok(key);
    }
    if let Some(key) = key_of::<Time>(tks, ctx, OrderKey::Time)? {
        return Ok(key);
    }
    if let Some(key) = key_of::<String>(tks, ctx, OrderKey::String)? {
        return Ok(key);
    }
    Err(SyntaxError::new(
        format!("order unit '{}' cannot be resolved to any value", tks),
        tks.line(),
    ))
}

/// Key reading the element itself.
fn this_key(ctx: &Context, frame: FrameId) -> OrderKey {
    match ctx.frame(frame).kind.this_type() {
        Some(ValueType::Number) => OrderKey::Number(Box::new(ThisRef::<Number>::new(frame))),
        Some(ValueType::Time) => OrderKey::Time(Box::new(ThisRef::<Time>::new(frame))),
        _ => OrderKey::String(Box::new(ThisRef::<String>::new(frame))),
    }
}

fn direction(tks: Tokens) -> (Tokens, bool) {
    match tks.last().keyword() {
        Some(Keyword::Asc) => (tks.trim_right(), false),
        Some(Keyword::Desc) => (tks.trim_right(), true),
        _ => (tks, false),
    }
}

/// Keys of an `order` segment: nothing, `asc`, `desc` or `by unit [asc|desc], ...`.
///
/// Must be called with `frame` entered, so units can read the element.
pub(super) fn order_keys(
    body: Tokens,
    line: usize,
    ctx: &mut Context,
    frame: FrameId,
) -> Result<OrderKeys, SyntaxError> {
    let mut keys = OrderKeys::new();
    if body.is_empty() {
        keys.push(this_key(ctx, frame), false);
        return Ok(keys);
    }
    if body.len() == 1 && matches!(body.first().keyword(), Some(Keyword::Asc | Keyword::Desc)) {
        keys.push(this_key(ctx, frame), body.first().is_keyword(Keyword::Desc));
        return Ok(keys);
    }
    if !body.first().is_keyword(Keyword::By) {
        return Err(SyntaxError::new(
            "keyword 'order' should be followed by 'by'",
            line,
        ));
    }
    let units = body.trim_left();
    if units.is_empty() {
        return Err(SyntaxError::new("keyword 'by' is not followed by anything", line));
    }
    for unit in units.split_by_symbol(',')? {
        let (unit, descending) = direction(unit);
        if unit.is_empty() {
            return Err(SyntaxError::new("order unit is empty", line));
        }
        keys.push(unit_key(unit, ctx)?, descending);
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FrameKind;
    use crate::parse::tests::lex;

    fn keys(code: &str, kind: FrameKind) -> Result<OrderKeys, SyntaxError> {
        let tokens = lex(code);
        let mut ctx = Context::new("/");
        ctx.within(kind, |ctx, frame| {
            order_keys(Tokens::whole(&tokens), 1, ctx, frame)
        })
    }

    #[test]
    fn units_and_directions() {
        assert_eq!(keys("by name, size desc", FrameKind::File).unwrap().len(), 2);
        assert_eq!(keys("by this asc", FrameKind::Value(ValueType::Number)).unwrap().len(), 1);
        assert_eq!(keys("desc", FrameKind::File).unwrap().len(), 1);
    }

    #[test]
    fn malformed_units() {
        assert!(keys("name", FrameKind::File).is_err());
        assert!(keys("by", FrameKind::File).is_err());
        assert!(keys("by name,", FrameKind::File).is_err());
        assert!(keys("by desc", FrameKind::File).is_err());
    }
}
