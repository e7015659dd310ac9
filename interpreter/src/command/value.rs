use crate::context::Context;
use crate::datatype::{List, NumList, Number, Period, Primitive, Time, TimeList, Value, ValueType};
use crate::generator::GenPtr;
use crate::lang::{RuntimeMsg, SyntaxError};
use crate::parse::{parse, Parseable};
use crate::tokens::Tokens;

/// A parsed expression whose type is only known at parse time.
#[derive(Debug)]
pub enum Expression {
    Bool(GenPtr<bool>),
    Number(GenPtr<Number>),
    String(GenPtr<String>),
    Time(GenPtr<Time>),
    Period(GenPtr<Period>),
    List(GenPtr<List>),
    NumList(GenPtr<NumList>),
    TimeList(GenPtr<TimeList>),
}

fn wrap<T: Parseable>(
    tks: Tokens,
    ctx: &mut Context,
    f: fn(GenPtr<T>) -> Expression,
) -> Result<Option<Expression>, SyntaxError> {
    Ok(parse::<T>(tks, ctx)?.map(f))
}

impl Expression {
    /// First type that accepts `tks`: bool, number, time, period, string, then collections.
    pub fn parse(tks: Tokens, ctx: &mut Context) -> Result<Option<Self>, SyntaxError> {
        const ORDER: [ValueType; 8] = [
            ValueType::Bool,
            ValueType::Number,
            ValueType::Time,
            ValueType::Period,
            ValueType::String,
            ValueType::NumList,
            ValueType::TimeList,
            ValueType::List,
        ];
        for t in ORDER {
            if let Some(e) = Self::parse_as(t, tks, ctx)? {
                return Ok(Some(e));
            }
        }
        Ok(None)
    }

    /// `tks` as a value of type `t`; definitions are read as lists.
    pub fn parse_as(t: ValueType, tks: Tokens, ctx: &mut Context) -> Result<Option<Self>, SyntaxError> {
        match t {
            ValueType::Bool => wrap(tks, ctx, Self::Bool),
            ValueType::Number => wrap(tks, ctx, Self::Number),
            ValueType::String => wrap(tks, ctx, Self::String),
            ValueType::Time => wrap(tks, ctx, Self::Time),
            ValueType::Period => wrap(tks, ctx, Self::Period),
            ValueType::NumList => wrap(tks, ctx, Self::NumList),
            ValueType::TimeList => wrap(tks, ctx, Self::TimeList),
            ValueType::List | ValueType::Definition => wrap(tks, ctx, Self::List),
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Bool(_) => ValueType::Bool,
            Self::Number(_) => ValueType::Number,
            Self::String(_) => ValueType::String,
            Self::Time(_) => ValueType::Time,
            Self::Period(_) => ValueType::Period,
            Self::List(_) => ValueType::List,
            Self::NumList(_) => ValueType::NumList,
            Self::TimeList(_) => ValueType::TimeList,
        }
    }

    pub fn value(&mut self, ctx: &mut Context) -> Result<Value, RuntimeMsg> {
        Ok(match self {
            Self::Bool(g) => g.value(ctx)?.into_value(),
            Self::Number(g) => g.value(ctx)?.into_value(),
            Self::String(g) => g.value(ctx)?.into_value(),
            Self::Time(g) => g.value(ctx)?.into_value(),
            Self::Period(g) => g.value(ctx)?.into_value(),
            Self::List(g) => g.value(ctx)?.into_value(),
            Self::NumList(g) => g.value(ctx)?.into_value(),
            Self::TimeList(g) => g.value(ctx)?.into_value(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::tests::lex;

    fn type_of(code: &str) -> Option<ValueType> {
        let tokens = lex(code);
        let mut ctx = Context::new("/");
        Expression::parse(Tokens::whole(&tokens), &mut ctx)
            .unwrap()
            .map(|e| e.value_type())
    }

    #[test]
    fn narrowest_type_wins() {
        assert_eq!(type_of("1 < 2"), Some(ValueType::Bool));
        assert_eq!(type_of("2 + 3"), Some(ValueType::Number));
        assert_eq!(type_of("3 june 2020"), Some(ValueType::Time));
        assert_eq!(type_of("2 days"), Some(ValueType::Period));
        assert_eq!(type_of("'a' + 1"), Some(ValueType::String));
        assert_eq!(type_of("1, 2"), Some(ValueType::NumList));
        assert_eq!(type_of("'a', 2"), Some(ValueType::List));
        assert_eq!(type_of("nothing"), None);
    }

    #[test]
    fn evaluates_to_a_value() {
        let tokens = lex("'x' + 2");
        let mut ctx = Context::new("/");
        let mut e = Expression::parse(Tokens::whole(&tokens), &mut ctx)
            .unwrap()
            .unwrap();
        assert_eq!(e.value(&mut ctx).unwrap(), Value::String("x2".into()));
    }
}
