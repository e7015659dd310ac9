//! Type-directed parsers.
//!
//! Every value type has its own entry point. A parser returns `Ok(None)` when
//! the tokens are not an expression of its type, so callers can try the next
//! candidate, and a [SyntaxError] once it has recognised a shape that turns out
//! to be malformed. [parse] is the generic dispatcher: it first tries every type
//! that widens into the target, in a fixed order, then the native parser.

mod boolean;
mod definition;
mod filter;
mod function;
mod list;
mod number;
mod order;
mod period;
mod string;
mod time;
mod variable;

use std::fmt::Debug;

pub use definition::parse_definition;
pub use variable::is_reserved;

use crate::context::{Attribute, Context, FrameId};
use crate::datatype::{Number, Primitive};
use crate::generator::{fold, Binary, Constant, GenPtr, ListElement, Ternary};
use crate::lang::SyntaxError;
use crate::tokens::{Token, Tokens, IS_POSSIBLE_BINARY, IS_POSSIBLE_LIST_ELEM, IS_POSSIBLE_TERNARY};

/// `Ok(None)`: not an expression of this type.
pub type ParseResult<T> = Result<Option<GenPtr<T>>, SyntaxError>;

pub trait Parseable: Primitive {
    /// Try the types that widen into this one. The first success wins.
    fn parse_cast(_tks: Tokens, _ctx: &mut Context) -> ParseResult<Self> {
        Ok(None)
    }

    fn parse_native(tks: Tokens, ctx: &mut Context) -> ParseResult<Self>;

    /// Built-in variable of this type (`now`, `nan`, `home`, ...).
    fn global(_name: &str, _ctx: &mut Context) -> Option<GenPtr<Self>> {
        None
    }

    /// File attribute node, for the types attributes can have.
    fn attribute(_frame: FrameId, _attribute: Attribute) -> Option<GenPtr<Self>> {
        None
    }

    /// `index` of an iteration frame; only numbers have one.
    fn index(_frame: FrameId) -> Option<GenPtr<Self>> {
        None
    }
}

/// Parse `tks` as a `T`, casting from upstream types first.
pub fn parse<T: Parseable>(tks: Tokens, ctx: &mut Context) -> ParseResult<T> {
    if tks.is_empty() {
        return Ok(None);
    }
    if let Some(g) = T::parse_cast(tks, ctx)? {
        return Ok(Some(g));
    }
    T::parse_native(tks, ctx)
}

/// Like [parse], but not finding a `T` is an error.
pub fn parse_required<T: Parseable>(
    tks: Tokens,
    ctx: &mut Context,
    what: &str,
) -> Result<GenPtr<T>, SyntaxError> {
    match parse::<T>(tks, ctx)? {
        Some(g) => Ok(g),
        None => Err(SyntaxError::new(
            format!("'{}' is not a valid {}", tks, what),
            tks.line(),
        )),
    }
}

/// Evaluate a constant tree now; a failure becomes a syntax error on `line`.
pub(crate) fn folded<T: Clone + Debug + 'static>(
    generator: GenPtr<T>,
    ctx: &mut Context,
    line: usize,
) -> Result<GenPtr<T>, SyntaxError> {
    fold(generator, ctx).map_err(|e| SyntaxError::new(e.0, line))
}

/// Value of a constant tree, computed at parse time.
pub(crate) fn constant_value<T>(
    generator: &mut GenPtr<T>,
    ctx: &mut Context,
    line: usize,
) -> Result<T, SyntaxError> {
    generator
        .value(ctx)
        .map_err(|e| SyntaxError::new(e.0, line))
}

/// Cast adapter, folded when its source is constant.
pub(crate) fn cast<A, R>(
    ctx: &mut Context,
    line: usize,
    name: &'static str,
    source: GenPtr<A>,
    f: fn(A) -> R,
) -> Result<GenPtr<R>, SyntaxError>
where
    A: Debug + 'static,
    R: Clone + Debug + 'static,
{
    folded(Box::new(crate::generator::Map::new(name, source, f)), ctx, line)
}

/// Try `U` and widen it into `T`.
pub(crate) fn try_cast<U, T>(
    tks: Tokens,
    ctx: &mut Context,
    name: &'static str,
    f: fn(U) -> T,
) -> ParseResult<T>
where
    U: Parseable,
    T: Clone + Debug + 'static,
{
    match parse::<U>(tks, ctx)? {
        Some(g) => Ok(Some(cast(ctx, tks.line(), name, g, f)?)),
        None => Ok(None),
    }
}

/// `condition ? left : right`. A constant condition keeps only the taken branch.
pub(crate) fn parse_ternary<T: Parseable>(tks: Tokens, ctx: &mut Context) -> ParseResult<T> {
    if !tks.check(IS_POSSIBLE_TERNARY) {
        return Ok(None);
    }
    let (condition, left, right) = tks.divide_for_ternary()?;
    let mut condition = match parse::<bool>(condition, ctx)? {
        Some(c) => c,
        None => return Ok(None),
    };
    let left = match parse::<T>(left, ctx)? {
        Some(l) => l,
        None => return Ok(None),
    };
    let right = match parse::<T>(right, ctx)? {
        Some(r) => r,
        None => return Ok(None),
    };
    let line = tks.line();
    if condition.is_constant() {
        let taken = if constant_value(&mut condition, ctx, line)? {
            left
        } else {
            right
        };
        return Ok(Some(folded(taken, ctx, line)?));
    }
    Ok(Some(Box::new(Ternary::new(condition, left, right))))
}

/// `condition ? value`, the empty value of the type otherwise.
pub(crate) fn parse_binary<T: Parseable>(tks: Tokens, ctx: &mut Context) -> ParseResult<T> {
    if !tks.check(IS_POSSIBLE_BINARY) {
        return Ok(None);
    }
    let (condition, value) = tks.divide_for_binary()?;
    let mut condition = match parse::<bool>(condition, ctx)? {
        Some(c) => c,
        None => return Ok(None),
    };
    let value = match parse::<T>(value, ctx)? {
        Some(v) => v,
        None => return Ok(None),
    };
    let line = tks.line();
    if condition.is_constant() {
        if constant_value(&mut condition, ctx, line)? {
            return Ok(Some(folded(value, ctx, line)?));
        }
        return Ok(Some(Box::new(Constant::new(T::default()))));
    }
    Ok(Some(Box::new(Binary::new(condition, value))))
}

/// Shorthand forms shared by every value type.
pub(crate) fn parse_conditional<T: Parseable>(tks: Tokens, ctx: &mut Context) -> ParseResult<T> {
    if let Some(g) = parse_binary::<T>(tks, ctx)? {
        return Ok(Some(g));
    }
    parse_ternary::<T>(tks, ctx)
}

/// Index inside `name[...]`; anything but a number is an error.
pub(crate) fn parse_list_index(tks: Tokens, ctx: &mut Context) -> Result<GenPtr<Number>, SyntaxError> {
    // word [ ... ]
    let inner = tks.sub(2, tks.len() - 3);
    if inner.is_empty() {
        return Err(SyntaxError::new(
            format!("index of '{}' is empty", tks.first()),
            tks.first().line,
        ));
    }
    match parse::<Number>(inner, ctx)? {
        Some(n) => Ok(n),
        None => Err(SyntaxError::new(
            format!("index of '{}' cannot be resolved to a number", tks.first()),
            inner.line(),
        )),
    }
}

/// `name[index]` where `name` is a collection of `T`.
pub(crate) fn parse_collection_element<T>(tks: Tokens, ctx: &mut Context) -> ParseResult<T>
where
    T: Parseable,
    Vec<T>: Parseable,
{
    if !tks.check(IS_POSSIBLE_LIST_ELEM) {
        return Ok(None);
    }
    let list = match variable::variable::<Vec<T>>(tks.first(), ctx)? {
        Some(l) => l,
        None => return Ok(None),
    };
    let index = parse_list_index(tks, ctx)?;
    Ok(Some(Box::new(ListElement::new(list, index))))
}

/// A single token that is obviously a variable reference but resolves to nothing.
pub(crate) fn undefined_word(token: &Token) -> Option<SyntaxError> {
    token
        .word()
        .map(|name| SyntaxError::undefined_variable(name, token.line))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::tokens::{check_brackets, Tokenizer};

    pub fn lex(code: &str) -> Vec<Token> {
        let tokens = Tokenizer::new(Cursor::new(code)).read_all().unwrap();
        check_brackets(&tokens).unwrap();
        tokens
    }

    /// Parse `code` as a `T` and evaluate it once.
    pub fn eval<T: Parseable>(code: &str, ctx: &mut Context) -> T {
        let tokens = lex(code);
        let mut g = parse::<T>(Tokens::whole(&tokens), ctx)
            .unwrap()
            .unwrap_or_else(|| panic!("`{}` did not parse", code));
        g.value(ctx).unwrap()
    }

    pub fn parsed<T: Parseable>(code: &str, ctx: &mut Context) -> ParseResult<T> {
        let tokens = lex(code);
        parse::<T>(Tokens::whole(&tokens), ctx)
    }

    #[test]
    fn conditional_folds_constant_condition() {
        let mut ctx = Context::new("/");
        let g = parsed::<Number>("1 < 2 ? 10 : nothing", &mut ctx);
        // the untaken branch must still be well typed
        assert!(matches!(g, Ok(None) | Err(_)));
        let mut g = parsed::<Number>("1 < 2 ? 10 : 20", &mut ctx).unwrap().unwrap();
        assert!(g.is_constant());
        assert_eq!(g.value(&mut ctx).unwrap(), Number::Int(10));
        let mut g = parsed::<String>("false ? 'x'", &mut ctx).unwrap().unwrap();
        assert_eq!(g.value(&mut ctx).unwrap(), "");
    }

    #[test]
    fn cast_chain_formats_bools() {
        let mut ctx = Context::new("/");
        assert_eq!(eval::<String>("true", &mut ctx), "1");
        assert_eq!(eval::<Number>("false", &mut ctx), Number::Int(0));
        assert_eq!(eval::<Vec<String>>("true, 'a'", &mut ctx), vec!["1", "a"]);
    }
}
