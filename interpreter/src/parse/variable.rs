use super::{ParseResult, Parseable};
use crate::context::{Attribute, Context};
use crate::generator::{ThisRef, VariableRef};
use crate::lang::SyntaxError;
use crate::tokens::Token;

/// Words of the definition built-ins (`files`, `recursivefiles`, ...).
pub(crate) const DEFINITIONS: [&str; 6] = [
    "files",
    "directories",
    "all",
    "recursivefiles",
    "recursivedirectories",
    "recursiveall",
];

const GLOBALS: [&str; 13] = [
    "success",
    "now",
    "today",
    "yesterday",
    "tomorrow",
    "never",
    "nan",
    "desktop",
    "downloads",
    "home",
    "location",
    "alphabet",
    "ascii",
];

/// Names a script cannot assign to.
pub fn is_reserved(name: &str) -> bool {
    name == "this"
        || name == "index"
        || Attribute::from_word(name).is_some()
        || GLOBALS.contains(&name)
        || DEFINITIONS.contains(&name)
}

/// A word token as a variable of type `T`.
pub(crate) fn variable<T: Parseable>(token: &Token, ctx: &mut Context) -> ParseResult<T> {
    match token.word() {
        Some(name) => variable_named::<T>(name, token.line, ctx),
        None => Ok(None),
    }
}

/// Resolution order: `this`, `index`, file attributes, built-ins, then user variables.
pub(crate) fn variable_named<T: Parseable>(
    name: &str,
    line: usize,
    ctx: &mut Context,
) -> ParseResult<T> {
    if name == "this" {
        let frame = ctx
            .innermost_this()
            .ok_or_else(|| SyntaxError::attribute_outside_context(name, line))?;
        if ctx.frame(frame).kind.this_type() == Some(T::TYPE) {
            return Ok(Some(Box::new(ThisRef::<T>::new(frame))));
        }
        return Ok(None);
    }
    if name == "index" {
        let frame = ctx
            .innermost_index()
            .ok_or_else(|| SyntaxError::attribute_outside_context(name, line))?;
        return Ok(T::index(frame));
    }
    if let Some(attribute) = Attribute::from_word(name) {
        if attribute.value_type() != T::TYPE {
            return Ok(None);
        }
        let frame = ctx
            .innermost_file()
            .ok_or_else(|| SyntaxError::attribute_outside_context(name, line))?;
        ctx.add_attribute(frame, attribute.mask());
        return Ok(T::attribute(frame, attribute));
    }
    if let Some(g) = T::global(name, ctx) {
        return Ok(Some(g));
    }
    if ctx.variable_type(name) == Some(T::TYPE) {
        return Ok(Some(Box::new(VariableRef::<T>::new(name))));
    }
    Ok(None)
}

/// True for words that read a time: time attributes, time built-ins and time variables.
pub(crate) fn is_time_word(token: &Token, ctx: &Context) -> bool {
    let name = match token.word() {
        Some(name) => name,
        None => return false,
    };
    match Attribute::from_word(name) {
        Some(attribute) => attribute.value_type() == crate::datatype::ValueType::Time,
        None => {
            matches!(name, "now" | "today" | "yesterday" | "tomorrow")
                || ctx.variable_type(name) == Some(crate::datatype::ValueType::Time)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FrameKind;
    use crate::datatype::{Number, Primitive, ValueType};
    use crate::parse::tests::{eval, parsed};

    #[test]
    fn reserved_words() {
        assert!(is_reserved("this"));
        assert!(is_reserved("creation"));
        assert!(is_reserved("recursivefiles"));
        assert!(is_reserved("home"));
        assert!(!is_reserved("counter"));
    }

    #[test]
    fn attributes_need_a_file_frame() {
        let mut ctx = Context::new("/");
        let err = parsed::<String>("extension", &mut ctx).unwrap_err();
        assert!(err.msg.contains("extension"));
        ctx.within(FrameKind::File, |ctx, frame| {
            ctx.set_file(frame, "notes.txt".into(), 0);
            assert_eq!(eval::<String>("extension", ctx), "txt");
            Ok::<(), SyntaxError>(())
        })
        .unwrap();
    }

    #[test]
    fn this_has_the_frame_type() {
        let mut ctx = Context::new("/");
        ctx.within(FrameKind::Value(ValueType::Number), |ctx, frame| {
            ctx.set_this(frame, Number::Int(4).into_value(), 2);
            assert_eq!(eval::<Number>("this * 2", ctx), Number::Int(8));
            assert_eq!(eval::<Number>("index", ctx), Number::Int(2));
            Ok::<(), SyntaxError>(())
        })
        .unwrap();
    }

    #[test]
    fn user_variables_read_default_until_assigned() {
        let mut ctx = Context::new("/");
        ctx.declare_variable("counter", ValueType::Number);
        assert_eq!(eval::<Number>("counter", &mut ctx), Number::Int(0));
        assert!(parsed::<crate::datatype::Time>("counter", &mut ctx)
            .unwrap()
            .is_none());
    }

}
