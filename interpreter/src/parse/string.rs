use std::path::PathBuf;

use super::variable::variable;
use super::{folded, function, parse, parse_collection_element, parse_conditional, parse_list_index};
use super::{try_cast, ParseResult, Parseable};
use crate::context::{Attribute, Context, FrameId};
use crate::datatype::{bool_to_string, Number, Period, Time};
use crate::generator::{AttributeValue, CharAtIndex, Concat, Constant, GenPtr, Location};
use crate::lang::SyntaxError;
use crate::tokens::{
    Token, TokenKind, Tokens, HAS_ARITHMETIC, HAS_BOOL_OPERATOR, HAS_COMMA, HAS_COMPARISON,
    HAS_FILTER_KEYWORD, IS_POSSIBLE_BINARY, IS_POSSIBLE_LIST_ELEM, IS_POSSIBLE_TERNARY,
};

fn number_to_string(n: Number) -> String {
    n.to_string()
}

fn time_to_string(t: Time) -> String {
    t.to_string()
}

fn period_to_string(p: Period) -> String {
    p.to_string()
}

impl Parseable for String {
    fn parse_cast(tks: Tokens, ctx: &mut Context) -> ParseResult<String> {
        if let Some(g) = try_cast::<bool, String>(tks, ctx, "string", bool_to_string)? {
            return Ok(Some(g));
        }
        if let Some(g) = try_cast::<Number, String>(tks, ctx, "string", number_to_string)? {
            return Ok(Some(g));
        }
        if let Some(g) = try_cast::<Time, String>(tks, ctx, "string", time_to_string)? {
            return Ok(Some(g));
        }
        try_cast::<Period, String>(tks, ctx, "string", period_to_string)
    }

    fn parse_native(tks: Tokens, ctx: &mut Context) -> ParseResult<String> {
        if tks.len() == 1 {
            return one_token(tks.first(), ctx);
        }
        if tks.check(HAS_FILTER_KEYWORD | HAS_COMMA) {
            return Ok(None);
        }
        if let Some(g) = function::string_function(tks, ctx)? {
            return Ok(Some(g));
        }
        let mixed = HAS_COMPARISON | HAS_BOOL_OPERATOR | IS_POSSIBLE_TERNARY | IS_POSSIBLE_BINARY;
        if tks.check(HAS_ARITHMETIC) && !tks.check(mixed) {
            if let Some(g) = concatenation(tks, ctx)? {
                return Ok(Some(g));
            }
        }
        if let Some(g) = parse_collection_element::<String>(tks, ctx)? {
            return Ok(Some(g));
        }
        if let Some(g) = char_at(tks, ctx)? {
            return Ok(Some(g));
        }
        parse_conditional::<String>(tks, ctx)
    }

    fn global(name: &str, ctx: &mut Context) -> Option<GenPtr<String>> {
        let dir = match name {
            "location" => return Some(Box::new(Location::new(ctx.current_location()))),
            "desktop" => dirs::desktop_dir(),
            "downloads" => dirs::download_dir(),
            "home" => dirs::home_dir(),
            _ => return None,
        };
        Some(Box::new(Constant::new(dir_to_string(dir))))
    }

    fn attribute(frame: FrameId, attribute: Attribute) -> Option<GenPtr<String>> {
        Some(Box::new(AttributeValue::new(frame, attribute)))
    }
}

fn dir_to_string(dir: Option<PathBuf>) -> String {
    dir.map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn one_token(token: &Token, ctx: &mut Context) -> ParseResult<String> {
    match &token.kind {
        TokenKind::Quotation(s) => Ok(Some(Box::new(Constant::new(s.clone())))),
        // wildcard patterns are definitions
        TokenKind::Pattern(_) => Ok(None),
        _ => variable::<String>(token, ctx),
    }
}

/// `'a' + b + 3`: every part is read as a string.
fn concatenation(tks: Tokens, ctx: &mut Context) -> ParseResult<String> {
    let parts = tks.split_by_symbol('+')?;
    if parts.len() < 2 {
        return Ok(None);
    }
    let mut generators = Vec::with_capacity(parts.len());
    for part in parts {
        match parse::<String>(part, ctx)? {
            Some(g) => generators.push(g),
            None => return Ok(None),
        }
    }
    Ok(Some(folded(Box::new(Concat::new(generators)), ctx, tks.line())?))
}

/// `text[index]`, one character of a string variable.
fn char_at(tks: Tokens, ctx: &mut Context) -> ParseResult<String> {
    if !tks.check(IS_POSSIBLE_LIST_ELEM) {
        return Ok(None);
    }
    let text = match variable::<String>(tks.first(), ctx)? {
        Some(t) => t,
        None => return Ok(None),
    };
    let index = parse_list_index(tks, ctx)?;
    Ok(Some(Box::new(CharAtIndex::new(text, index))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FrameKind;
    use crate::datatype::{Primitive, ValueType};
    use crate::parse::tests::{eval, parsed};

    #[test]
    fn literals_and_casts() {
        let mut ctx = Context::new("/");
        assert_eq!(eval::<String>("'abc'", &mut ctx), "abc");
        assert_eq!(eval::<String>("2 * 3", &mut ctx), "6");
        assert_eq!(eval::<String>("3 june 2021", &mut ctx), "3 June 2021");
        assert_eq!(eval::<String>("2 days", &mut ctx), "2 days");
        assert!(parsed::<String>("'*.txt'", &mut ctx).unwrap().is_none());
    }

    #[test]
    fn concatenation_of_mixed_parts() {
        let mut ctx = Context::new("/");
        let mut g = parsed::<String>("'a' + 1 + true", &mut ctx).unwrap().unwrap();
        assert!(g.is_constant());
        assert_eq!(g.value(&mut ctx).unwrap(), "a11");
        assert_eq!(eval::<String>("'x' + (1 + 2)", &mut ctx), "x3");
        assert!(parsed::<String>("'a' + ", &mut ctx).is_err());
    }

    #[test]
    fn characters_and_elements() {
        let mut ctx = Context::new("/");
        ctx.declare_variable("s", ValueType::String);
        ctx.variables
            .assign("s", "hello".to_string().into_value())
            .unwrap();
        ctx.declare_variable("names", ValueType::List);
        ctx.variables
            .assign("names", vec!["a".to_string(), "b".to_string()].into_value())
            .unwrap();
        assert_eq!(eval::<String>("s[1]", &mut ctx), "e");
        assert_eq!(eval::<String>("s[9]", &mut ctx), "");
        assert_eq!(eval::<String>("names[1]", &mut ctx), "b");
        assert_eq!(eval::<String>("names[5]", &mut ctx), "");
    }

    #[test]
    fn location_follows_the_frame() {
        let mut ctx = Context::new("/tmp/work");
        assert_eq!(eval::<String>("location", &mut ctx), "/tmp/work");
        ctx.within(FrameKind::File, |ctx, frame| {
            ctx.set_file(frame, "a.txt".into(), 0);
            assert_eq!(eval::<String>("this + '!'", ctx), "a.txt!");
            Ok::<(), SyntaxError>(())
        })
        .unwrap();
    }
}
