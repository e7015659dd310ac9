use std::fmt::Debug;

use super::{folded, parse, parse_definition, ParseResult, Parseable};
use crate::context::Context;
use crate::datatype::{List, NumList, Number, Time, TimeList};
use crate::generator::function::{self as f, DefinitionContains, DefinitionFunction, DefinitionQuery};
use crate::generator::function::{Exists, RandomElement, RandomNumber, SizeOf, TimeOf};
use crate::generator::{GenPtr, ListFilter, ListedLists, Map, Map2, Map3, NumberFilter};
use crate::lang::SyntaxError;
use crate::tokens::{Tokens, IS_POSSIBLE_FUNCTION};

const BOOL: &[&str] = &[
    "contains",
    "startswith",
    "endswith",
    "exists",
    "exist",
    "any",
    "isnumber",
    "islower",
    "isupper",
    "isdigit",
    "isletter",
    "isnan",
    "isnever",
];

const NUMBER: &[&str] = &[
    "length", "count", "sum", "average", "min", "max", "median", "absolute", "ceil", "floor",
    "round", "sign", "sqrt", "power", "number", "random", "size", "first", "last",
];

const STRING: &[&str] = &[
    "lower",
    "upper",
    "trim",
    "capitalize",
    "reverse",
    "parent",
    "left",
    "right",
    "repeat",
    "substring",
    "replace",
    "concatenate",
    "join",
    "first",
    "last",
    "random",
    "monthname",
    "weekdayname",
    "string",
];

const TIME: &[&str] = &["date", "time", "christmas", "newyear", "first", "last", "random"];

const LIST: &[&str] = &["split", "characters", "words", "first", "last"];

const NUMLIST: &[&str] = &["numbers", "first", "last"];

const TIMELIST: &[&str] = &["first", "last"];

fn is_known(name: &str) -> bool {
    [BOOL, NUMBER, STRING, TIME, LIST, NUMLIST]
        .iter()
        .any(|table| table.contains(&name))
}

fn ordinal(i: usize) -> String {
    match i {
        0 => "first".into(),
        1 => "second".into(),
        2 => "third".into(),
        n => format!("{}th", n + 1),
    }
}

/// `name(arg, arg, ...)` split into its arguments.
struct Call<'a> {
    name: &'a str,
    args: Vec<Tokens<'a>>,
    line: usize,
}

impl<'a> Call<'a> {
    /// `None` when the tokens are not a call or the name belongs to another type.
    fn new(tks: Tokens<'a>, table: &[&str]) -> Result<Option<Self>, SyntaxError> {
        if !tks.check(IS_POSSIBLE_FUNCTION) {
            return Ok(None);
        }
        let name = match tks.first().word() {
            Some(name) => name,
            None => return Ok(None),
        };
        if !table.contains(&name) {
            if is_known(name) {
                return Ok(None);
            }
            return Err(SyntaxError::function_not_found(name, tks.line()));
        }
        let inner = tks.sub(2, tks.len() - 3);
        let args = if inner.is_empty() {
            Vec::new()
        } else {
            inner.split_by_symbol(',')?
        };
        Ok(Some(Self {
            name,
            args,
            line: tks.line(),
        }))
    }

    fn count(&self) -> usize {
        self.args.len()
    }

    fn expect(&self, count: usize, expected: &str) -> Result<(), SyntaxError> {
        if self.args.len() == count {
            Ok(())
        } else {
            Err(self.wrong(expected))
        }
    }

    fn wrong(&self, expected: &str) -> SyntaxError {
        SyntaxError::wrong_arguments(self.name, expected, self.line)
    }

    fn arg<T: Parseable>(&self, i: usize, ctx: &mut Context) -> Result<GenPtr<T>, SyntaxError> {
        match parse::<T>(self.args[i], ctx)? {
            Some(g) => Ok(g),
            None => Err(SyntaxError::new(
                format!(
                    "{} argument of the function '{}' cannot be resolved to a {}",
                    ordinal(i),
                    self.name,
                    T::TYPE
                ),
                self.args[i].line(),
            )),
        }
    }

    fn try_arg<T: Parseable>(&self, i: usize, ctx: &mut Context) -> ParseResult<T> {
        parse::<T>(self.args[i], ctx)
    }

    /// `first`/`last` never accept a single value.
    fn reject_scalar(&self, i: usize, ctx: &mut Context) -> Result<(), SyntaxError> {
        if parse::<String>(self.args[i], ctx)?.is_some() {
            return Err(SyntaxError::new(
                format!(
                    "the function '{}' can only take a collection as an argument",
                    self.name
                ),
                self.line,
            ));
        }
        Ok(())
    }

    fn done<R: Clone + Debug + 'static>(&self, g: GenPtr<R>, ctx: &mut Context) -> ParseResult<R> {
        Ok(Some(folded(g, ctx, self.line)?))
    }
}

fn unary<A, R>(call: &Call, ctx: &mut Context, name: &'static str, func: fn(A) -> R) -> ParseResult<R>
where
    A: Parseable,
    R: Clone + Debug + 'static,
{
    call.expect(1, &format!("one {} argument", A::TYPE))?;
    let a = call.arg::<A>(0, ctx)?;
    call.done(Box::new(Map::new(name, a, func)), ctx)
}

fn binary<A, B, R>(
    call: &Call,
    ctx: &mut Context,
    name: &'static str,
    func: fn(A, B) -> R,
) -> ParseResult<R>
where
    A: Parseable,
    B: Parseable,
    R: Clone + Debug + 'static,
{
    call.expect(2, &format!("a {} and a {} argument", A::TYPE, B::TYPE))?;
    let a = call.arg::<A>(0, ctx)?;
    let b = call.arg::<B>(1, ctx)?;
    call.done(Box::new(Map2::new(name, a, b, func)), ctx)
}

fn ternary<A, B, C, R>(
    call: &Call,
    ctx: &mut Context,
    name: &'static str,
    func: fn(A, B, C) -> R,
) -> ParseResult<R>
where
    A: Parseable,
    B: Parseable,
    C: Parseable,
    R: Clone + Debug + 'static,
{
    call.expect(3, "three arguments")?;
    let a = call.arg::<A>(0, ctx)?;
    let b = call.arg::<B>(1, ctx)?;
    let c = call.arg::<C>(2, ctx)?;
    call.done(Box::new(Map3::new(name, a, b, c, func)), ctx)
}

/// Every argument as one numeric list: `sum(1, 2, nums)`.
fn numbers_of(call: &Call, ctx: &mut Context) -> Result<GenPtr<NumList>, SyntaxError> {
    if call.count() == 0 {
        return Err(call.wrong("at least one argument"));
    }
    if call.count() == 1 {
        return call.arg::<NumList>(0, ctx);
    }
    let mut lists = Vec::with_capacity(call.count());
    for i in 0..call.count() {
        lists.push(call.arg::<NumList>(i, ctx)?);
    }
    folded(Box::new(ListedLists::new(lists)), ctx, call.line)
}

/// `first(list, n)` and `last(list, n)` for every collection type.
fn sublist<T>(call: &Call, ctx: &mut Context) -> ParseResult<Vec<T>>
where
    T: Clone + Debug + 'static,
    Vec<T>: Parseable,
{
    if call.count() != 2 {
        return Ok(None);
    }
    let list = match call.try_arg::<Vec<T>>(0, ctx)? {
        Some(l) => l,
        None => return Ok(None),
    };
    let n = call.arg::<Number>(1, ctx)?;
    let filter = if call.name == "first" {
        NumberFilter::Limit
    } else {
        NumberFilter::Final
    };
    call.done(Box::new(ListFilter::new(list, filter, n)), ctx)
}

pub(super) fn bool_function(tks: Tokens, ctx: &mut Context) -> ParseResult<bool> {
    let call = match Call::new(tks, BOOL)? {
        Some(c) => c,
        None => return Ok(None),
    };
    match call.name {
        "contains" => {
            call.expect(2, "a collection and a value")?;
            if let Some(text) = call.try_arg::<String>(0, ctx)? {
                let part = call.arg::<String>(1, ctx)?;
                return call.done(Box::new(Map2::new("contains", text, part, f::contains)), ctx);
            }
            if let Some(def) = parse_definition(call.args[0], ctx)? {
                let value = call.arg::<String>(1, ctx)?;
                return Ok(Some(Box::new(DefinitionContains::new(def, value))));
            }
            if let Some(list) = call.try_arg::<NumList>(0, ctx)? {
                let value = call.arg::<Number>(1, ctx)?;
                return call.done(
                    Box::new(Map2::new("contains", list, value, f::contains_element)),
                    ctx,
                );
            }
            if let Some(list) = call.try_arg::<TimeList>(0, ctx)? {
                let value = call.arg::<Time>(1, ctx)?;
                return call.done(
                    Box::new(Map2::new("contains", list, value, f::contains_element)),
                    ctx,
                );
            }
            let list = call.arg::<List>(0, ctx)?;
            let value = call.arg::<String>(1, ctx)?;
            call.done(
                Box::new(Map2::new("contains", list, value, f::contains_element)),
                ctx,
            )
        }
        "startswith" => binary(&call, ctx, "startswith", f::starts_with),
        "endswith" => binary(&call, ctx, "endswith", f::ends_with),
        "exists" | "exist" => {
            call.expect(1, "one argument")?;
            let paths = call.arg::<List>(0, ctx)?;
            Ok(Some(Box::new(Exists::new(paths, ctx.current_location()))))
        }
        "any" => {
            call.expect(1, "one collection argument")?;
            if let Some(def) = parse_definition(call.args[0], ctx)? {
                return Ok(Some(Box::new(DefinitionFunction::new(
                    def,
                    DefinitionQuery::Any,
                ))));
            }
            let list = call.arg::<List>(0, ctx)?;
            call.done(Box::new(Map::new("any", list, f::any)), ctx)
        }
        "isnumber" => unary(&call, ctx, "isnumber", f::is_number),
        "islower" => unary(&call, ctx, "islower", f::is_lower),
        "isupper" => unary(&call, ctx, "isupper", f::is_upper),
        "isdigit" => unary(&call, ctx, "isdigit", f::is_digit),
        "isletter" => unary(&call, ctx, "isletter", f::is_letter),
        "isnan" => unary(&call, ctx, "isnan", f::is_nan),
        "isnever" => unary(&call, ctx, "isnever", f::is_never),
        _ => Ok(None),
    }
}

pub(super) fn number_function(tks: Tokens, ctx: &mut Context) -> ParseResult<Number> {
    let call = match Call::new(tks, NUMBER)? {
        Some(c) => c,
        None => return Ok(None),
    };
    match call.name {
        "length" => unary(&call, ctx, "length", f::length),
        "count" => {
            call.expect(1, "one collection argument")?;
            if let Some(def) = parse_definition(call.args[0], ctx)? {
                return Ok(Some(Box::new(DefinitionFunction::new(
                    def,
                    DefinitionQuery::Count,
                ))));
            }
            let list = call.arg::<List>(0, ctx)?;
            call.done(Box::new(Map::new("count", list, f::count)), ctx)
        }
        "sum" | "average" | "min" | "max" | "median" => {
            let list = numbers_of(&call, ctx)?;
            let (name, func): (&'static str, fn(NumList) -> Number) = match call.name {
                "sum" => ("sum", f::sum),
                "average" => ("average", f::average),
                "min" => ("min", f::min),
                "max" => ("max", f::max),
                _ => ("median", f::median),
            };
            call.done(Box::new(Map::new(name, list, func)), ctx)
        }
        "absolute" => unary(&call, ctx, "absolute", f::absolute),
        "ceil" => unary(&call, ctx, "ceil", f::ceil),
        "floor" => unary(&call, ctx, "floor", f::floor),
        "round" => unary(&call, ctx, "round", f::round),
        "sign" => unary(&call, ctx, "sign", f::sign),
        "sqrt" => unary(&call, ctx, "sqrt", f::sqrt),
        "power" => binary(&call, ctx, "power", f::power),
        "number" => unary(&call, ctx, "number", f::parse_number),
        "random" => match call.count() {
            0 => Ok(Some(Box::new(RandomNumber::new(None)))),
            1 => {
                if let Some(limit) = call.try_arg::<Number>(0, ctx)? {
                    return Ok(Some(Box::new(RandomNumber::new(Some(limit)))));
                }
                match call.try_arg::<NumList>(0, ctx)? {
                    Some(list) => Ok(Some(Box::new(RandomElement::new(list)))),
                    None => Ok(None),
                }
            }
            _ => Ok(None),
        },
        "size" => {
            call.expect(1, "one argument")?;
            let paths = call.arg::<List>(0, ctx)?;
            Ok(Some(Box::new(SizeOf::new(paths, ctx.current_location()))))
        }
        "first" | "last" => {
            if call.count() != 1 {
                return Ok(None);
            }
            call.reject_scalar(0, ctx)?;
            let list = match call.try_arg::<NumList>(0, ctx)? {
                Some(l) => l,
                None => return Ok(None),
            };
            let func: fn(NumList) -> Number = if call.name == "first" {
                f::first_element
            } else {
                f::last_element
            };
            call.done(Box::new(Map::new("first", list, func)), ctx)
        }
        _ => Ok(None),
    }
}

pub(super) fn string_function(tks: Tokens, ctx: &mut Context) -> ParseResult<String> {
    let call = match Call::new(tks, STRING)? {
        Some(c) => c,
        None => return Ok(None),
    };
    match call.name {
        "lower" => unary(&call, ctx, "lower", f::lower),
        "upper" => unary(&call, ctx, "upper", f::upper),
        "trim" => unary(&call, ctx, "trim", f::trim),
        "capitalize" => unary(&call, ctx, "capitalize", f::capitalize),
        "reverse" => unary(&call, ctx, "reverse", f::reverse),
        "parent" => unary(&call, ctx, "parent", f::parent),
        "left" => binary(&call, ctx, "left", f::left),
        "right" => binary(&call, ctx, "right", f::right),
        "repeat" => binary(&call, ctx, "repeat", f::repeat),
        "substring" => match call.count() {
            2 => binary(&call, ctx, "substring", f::substring),
            3 => ternary(&call, ctx, "substring", f::substring_counted),
            _ => Err(call.wrong("two or three arguments")),
        },
        "replace" => ternary(&call, ctx, "replace", f::replace),
        "concatenate" => {
            if call.count() == 0 {
                return Err(call.wrong("at least one argument"));
            }
            let mut lists = Vec::with_capacity(call.count());
            for i in 0..call.count() {
                lists.push(call.arg::<List>(i, ctx)?);
            }
            let joined: GenPtr<List> = Box::new(ListedLists::new(lists));
            call.done(Box::new(Map::new("concatenate", joined, f::concatenate)), ctx)
        }
        "join" => binary(&call, ctx, "join", f::join),
        "first" | "last" => {
            if call.count() != 1 {
                return Ok(None);
            }
            call.reject_scalar(0, ctx)?;
            if let Some(def) = parse_definition(call.args[0], ctx)? {
                let query = if call.name == "first" {
                    DefinitionQuery::First
                } else {
                    DefinitionQuery::Last
                };
                return Ok(Some(Box::new(DefinitionFunction::new(def, query))));
            }
            let list = match call.try_arg::<List>(0, ctx)? {
                Some(l) => l,
                None => return Ok(None),
            };
            let func: fn(List) -> String = if call.name == "first" {
                f::first_element
            } else {
                f::last_element
            };
            call.done(Box::new(Map::new("first", list, func)), ctx)
        }
        "random" => {
            if call.count() != 1 {
                return Ok(None);
            }
            if let Some(text) = call.try_arg::<String>(0, ctx)? {
                let chars: GenPtr<List> = Box::new(Map::new("characters", text, f::characters));
                return Ok(Some(Box::new(RandomElement::new(chars))));
            }
            match call.try_arg::<List>(0, ctx)? {
                Some(list) => Ok(Some(Box::new(RandomElement::new(list)))),
                None => Ok(None),
            }
        }
        "monthname" | "weekdayname" => {
            call.expect(1, "one number or time argument")?;
            let month = call.name == "monthname";
            if let Some(n) = call.try_arg::<Number>(0, ctx)? {
                let func: fn(Number) -> String = if month {
                    f::month_name_of
                } else {
                    f::weekday_name_of
                };
                return call.done(Box::new(Map::new("monthname", n, func)), ctx);
            }
            let t = call.arg::<Time>(0, ctx)?;
            let func: fn(Time) -> String = if month {
                f::month_name_of_time
            } else {
                f::weekday_name_of_time
            };
            call.done(Box::new(Map::new("monthname", t, func)), ctx)
        }
        "string" => {
            call.expect(1, "one argument")?;
            Ok(Some(call.arg::<String>(0, ctx)?))
        }
        _ => Ok(None),
    }
}

pub(super) fn time_function(tks: Tokens, ctx: &mut Context) -> ParseResult<Time> {
    let call = match Call::new(tks, TIME)? {
        Some(c) => c,
        None => return Ok(None),
    };
    match call.name {
        "date" | "time" => {
            if call.name == "date" {
                call.expect(3, "three numeric arguments")?;
            } else if !TimeOf::accepts(call.count()) {
                return Err(call.wrong("two, three, five or six numeric arguments"));
            }
            let mut args = Vec::with_capacity(call.count());
            for i in 0..call.count() {
                args.push(call.arg::<Number>(i, ctx)?);
            }
            call.done(Box::new(TimeOf::new(args)), ctx)
        }
        "christmas" => unary(&call, ctx, "christmas", f::christmas),
        "newyear" => unary(&call, ctx, "newyear", f::new_year),
        "first" | "last" => {
            if call.count() != 1 {
                return Ok(None);
            }
            call.reject_scalar(0, ctx)?;
            let list = match call.try_arg::<TimeList>(0, ctx)? {
                Some(l) => l,
                None => return Ok(None),
            };
            let func: fn(TimeList) -> Time = if call.name == "first" {
                f::first_element
            } else {
                f::last_element
            };
            call.done(Box::new(Map::new("first", list, func)), ctx)
        }
        "random" => {
            if call.count() != 1 {
                return Ok(None);
            }
            match call.try_arg::<TimeList>(0, ctx)? {
                Some(list) => Ok(Some(Box::new(RandomElement::new(list)))),
                None => Ok(None),
            }
        }
        _ => Ok(None),
    }
}

pub(super) fn list_function(tks: Tokens, ctx: &mut Context) -> ParseResult<List> {
    let call = match Call::new(tks, LIST)? {
        Some(c) => c,
        None => return Ok(None),
    };
    match call.name {
        "split" => binary(&call, ctx, "split", f::split),
        "characters" => unary(&call, ctx, "characters", f::characters),
        "words" => unary(&call, ctx, "words", f::words),
        "first" | "last" => sublist::<String>(&call, ctx),
        _ => Ok(None),
    }
}

pub(super) fn numlist_function(tks: Tokens, ctx: &mut Context) -> ParseResult<NumList> {
    let call = match Call::new(tks, NUMLIST)? {
        Some(c) => c,
        None => return Ok(None),
    };
    match call.name {
        "numbers" => unary(&call, ctx, "numbers", f::numbers),
        "first" | "last" => sublist::<Number>(&call, ctx),
        _ => Ok(None),
    }
}

pub(super) fn timelist_function(tks: Tokens, ctx: &mut Context) -> ParseResult<TimeList> {
    let call = match Call::new(tks, TIMELIST)? {
        Some(c) => c,
        None => return Ok(None),
    };
    sublist::<Time>(&call, ctx)
}

#[cfg(test)]
mod tests {
    use crate::context::Context;
    use crate::datatype::{NumList, Number, Time};
    use crate::parse::tests::{eval, parsed};

    #[test]
    fn calls_by_type() {
        let mut ctx = Context::new("/");
        assert_eq!(eval::<String>("upper('abc')", &mut ctx), "ABC");
        assert_eq!(eval::<Number>("length('abcd')", &mut ctx), Number::Int(4));
        assert_eq!(eval::<Number>("sum(1, 2, (3, 4))", &mut ctx), Number::Int(10));
        assert_eq!(eval::<bool>("contains('haystack', 'st')", &mut ctx), true);
        assert_eq!(eval::<bool>("contains((1, 2, 3), 2)", &mut ctx), true);
        assert_eq!(eval::<String>("substring('abcdef', 1, 2)", &mut ctx), "bc");
        assert_eq!(eval::<NumList>("numbers('a1b22')", &mut ctx), vec![Number::Int(1), Number::Int(22)]);
        assert_eq!(eval::<Time>("date(24, 12, 2020)", &mut ctx), Time::date(24, 12, 2020));
        assert_eq!(eval::<String>("monthname(june)", &mut ctx), "June");
    }

    #[test]
    fn constant_calls_fold() {
        let mut ctx = Context::new("/");
        let g = parsed::<String>("lower('A') + upper('b')", &mut ctx).unwrap().unwrap();
        assert!(g.is_constant());
        let g = parsed::<Number>("random(10)", &mut ctx).unwrap().unwrap();
        assert!(!g.is_constant());
    }

    #[test]
    fn first_and_last() {
        let mut ctx = Context::new("/");
        assert_eq!(eval::<Number>("first((4, 5, 6))", &mut ctx), Number::Int(4));
        assert_eq!(eval::<String>("last(('a', 'b'))", &mut ctx), "b");
        assert_eq!(
            eval::<Vec<String>>("first(('a', 'b', 'c'), 2)", &mut ctx),
            vec!["a", "b"]
        );
        let err = parsed::<Number>("first(7)", &mut ctx).unwrap_err();
        assert!(err.msg.contains("only take a collection"));
    }

    #[test]
    fn argument_errors() {
        let mut ctx = Context::new("/");
        let err = parsed::<String>("nosuchthing(1)", &mut ctx).unwrap_err();
        assert!(err.msg.contains("does not exist"));
        let err = parsed::<String>("lower('a', 'b')", &mut ctx).unwrap_err();
        assert!(err.msg.contains("expects"));
        let err = parsed::<Time>("time(1)", &mut ctx).unwrap_err();
        assert!(err.msg.contains("expects"));
    }
}
