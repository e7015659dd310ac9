use super::filter::split_filters;
use super::list::{elements, filter_condition, filter_number};
use super::order::order_keys;
use super::variable::DEFINITIONS;
use super::{constant_value, parse};
use crate::context::{Context, FrameKind};
use crate::datatype::List;
use crate::generator::definition::{
    ConditionalDefinition, CountFilter, EntryKind, FinalFilter, Join, ListDefinition, OrderBy,
    PatternDefinition, WhereFilter,
};
use crate::generator::{Constant, DefPtr, NumberFilter};
use crate::lang::SyntaxError;
use crate::tokens::{
    Keyword, Token, TokenKind, Tokens, HAS_COMMA, IS_POSSIBLE_BINARY, IS_POSSIBLE_TERNARY,
};

pub type DefResult = Result<Option<DefPtr>, SyntaxError>;

/// Parse `tks` as a lazily enumerated collection of paths.
///
/// Only expressions that involve the file system are definitions: patterns, the
/// built-in `files`-style words, and filters, joins or conditionals over them.
/// Plain lists of strings are left to the list parser.
pub fn parse_definition(tks: Tokens, ctx: &mut Context) -> DefResult {
    if tks.is_empty() {
        return Ok(None);
    }
    if tks.len() == 1 {
        return Ok(one_token(tks.first(), ctx));
    }
    if let Some(def) = filtered(tks, ctx)? {
        return Ok(Some(def));
    }
    if tks.check(HAS_COMMA) {
        if let Some(def) = joined(tks, ctx)? {
            return Ok(Some(def));
        }
    }
    conditional(tks, ctx)
}

fn one_token(token: &Token, ctx: &mut Context) -> Option<DefPtr> {
    let location = ctx.current_location();
    if let TokenKind::Pattern(pattern) = &token.kind {
        return Some(Box::new(PatternDefinition::new(pattern, location, EntryKind::All)));
    }
    let name = token.word()?;
    if !DEFINITIONS.contains(&name) {
        return None;
    }
    let (recursive, kind) = match name {
        "files" => (false, EntryKind::Files),
        "directories" => (false, EntryKind::Directories),
        "all" => (false, EntryKind::All),
        "recursivefiles" => (true, EntryKind::Files),
        "recursivedirectories" => (true, EntryKind::Directories),
        _ => (true, EntryKind::All),
    };
    tracing::trace!("definition `{}` bound to frame {:?}", name, location);
    Some(Box::new(if recursive {
        PatternDefinition::descendants(location, kind)
    } else {
        PatternDefinition::children(location, kind)
    }))
}

/// `definition where ... limit ... order by ...`
fn filtered(tks: Tokens, ctx: &mut Context) -> DefResult {
    let (base, segments) = match split_filters(tks)? {
        Some(found) => found,
        None => return Ok(None),
    };
    let mut def = match parse_definition(base, ctx)? {
        Some(d) => d,
        None => return Ok(None),
    };
    for segment in segments {
        def = match segment.keyword {
            Keyword::Where => ctx.within(FrameKind::File, |ctx, frame| {
                let condition = filter_condition(&segment, ctx)?;
                Ok::<DefPtr, SyntaxError>(Box::new(WhereFilter::new(def, frame, condition)))
            })?,
            Keyword::Order => ctx.within(FrameKind::File, |ctx, frame| {
                let keys = order_keys(segment.body, segment.line, ctx, frame)?;
                Ok::<DefPtr, SyntaxError>(Box::new(OrderBy::new(def, frame, keys)))
            })?,
            Keyword::Final => Box::new(FinalFilter::new(def, filter_number(&segment, ctx)?)),
            Keyword::Limit => Box::new(CountFilter::new(
                def,
                NumberFilter::Limit,
                filter_number(&segment, ctx)?,
            )),
            Keyword::Skip => Box::new(CountFilter::new(
                def,
                NumberFilter::Skip,
                filter_number(&segment, ctx)?,
            )),
            Keyword::Every => Box::new(CountFilter::new(
                def,
                NumberFilter::Every,
                filter_number(&segment, ctx)?,
            )),
            _ => return Ok(None),
        };
    }
    Ok(Some(def))
}

/// `'*.txt', directories, 'notes'`: a join is a definition only when one part is.
fn joined(tks: Tokens, ctx: &mut Context) -> DefResult {
    let parts = elements(tks)?;
    let mut definitions = Vec::with_capacity(parts.len());
    for part in parts.iter() {
        definitions.push(parse_definition(*part, ctx)?);
    }
    if definitions.iter().all(|d| d.is_none()) {
        return Ok(None);
    }
    let mut result: Option<DefPtr> = None;
    for (part, def) in parts.into_iter().zip(definitions) {
        let def = match def {
            Some(d) => d,
            None => match parse::<List>(part, ctx)? {
                Some(list) => Box::new(ListDefinition::new(list)) as DefPtr,
                None => return Ok(None),
            },
        };
        result = Some(match result {
            Some(left) => Box::new(Join::new(left, def)),
            None => def,
        });
    }
    Ok(result)
}

fn empty() -> DefPtr {
    Box::new(ListDefinition::new(Box::new(Constant::new(List::new()))))
}

/// `condition ? files : directories`, `condition ? '*.txt'`.
fn conditional(tks: Tokens, ctx: &mut Context) -> DefResult {
    let line = tks.line();
    if tks.check(IS_POSSIBLE_TERNARY) {
        let (condition, left, right) = tks.divide_for_ternary()?;
        let mut condition = match parse::<bool>(condition, ctx)? {
            Some(c) => c,
            None => return Ok(None),
        };
        let left = match branch(left, ctx)? {
            Some(l) => l,
            None => return Ok(None),
        };
        let right = match branch(right, ctx)? {
            Some(r) => r,
            None => return Ok(None),
        };
        if condition.is_constant() {
            return Ok(Some(if constant_value(&mut condition, ctx, line)? {
                left
            } else {
                right
            }));
        }
        return Ok(Some(Box::new(ConditionalDefinition::ternary(condition, left, right))));
    }
    if tks.check(IS_POSSIBLE_BINARY) {
        let (condition, value) = tks.divide_for_binary()?;
        let mut condition = match parse::<bool>(condition, ctx)? {
            Some(c) => c,
            None => return Ok(None),
        };
        let value = match parse_definition(value, ctx)? {
            Some(v) => v,
            None => return Ok(None),
        };
        if condition.is_constant() {
            return Ok(Some(if constant_value(&mut condition, ctx, line)? {
                value
            } else {
                empty()
            }));
        }
        return Ok(Some(Box::new(ConditionalDefinition::binary(condition, value))));
    }
    Ok(None)
}

/// A ternary branch may be a plain list when the other one is a definition.
fn branch(tks: Tokens, ctx: &mut Context) -> DefResult {
    if let Some(def) = parse_definition(tks, ctx)? {
        return Ok(Some(def));
    }
    Ok(parse::<List>(tks, ctx)?.map(|list| Box::new(ListDefinition::new(list)) as DefPtr))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::generator::definition::tests::drain;
    use crate::parse::tests::lex;

    fn paths(code: &str, ctx: &mut Context) -> Vec<String> {
        let tokens = lex(code);
        let mut def = parse_definition(Tokens::whole(&tokens), ctx)
            .unwrap()
            .unwrap_or_else(|| panic!("`{}` is not a definition", code));
        drain(&mut def, ctx)
    }

    fn sandbox() -> (tempfile::TempDir, Context) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "aaaa").unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("c.log"), "cc").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("d.txt"), "").unwrap();
        let ctx = Context::new(&dir.path().to_string_lossy());
        (dir, ctx)
    }

    #[test]
    fn built_in_words_and_patterns() {
        let (_dir, mut ctx) = sandbox();
        assert_eq!(paths("files", &mut ctx), vec!["a.txt", "b.txt", "c.log"]);
        assert_eq!(paths("directories", &mut ctx), vec!["sub"]);
        assert_eq!(paths("'*.txt'", &mut ctx), vec!["a.txt", "b.txt"]);
        assert_eq!(
            paths("recursivefiles", &mut ctx),
            vec!["a.txt", "b.txt", "c.log", "sub/d.txt"]
        );
    }

    #[test]
    fn filters_and_joins() {
        let (_dir, mut ctx) = sandbox();
        assert_eq!(
            paths("files where extension = 'txt' order by size desc", &mut ctx),
            vec!["a.txt", "b.txt"]
        );
        assert_eq!(paths("files skip 1 limit 1", &mut ctx), vec!["b.txt"]);
        assert_eq!(paths("files final 1", &mut ctx), vec!["c.log"]);
        assert_eq!(paths("directories, 'x.bin'", &mut ctx), vec!["sub", "x.bin"]);
        let tokens = lex("'a', 'b'");
        assert!(parse_definition(Tokens::whole(&tokens), &mut ctx).unwrap().is_none());
    }

    #[test]
    fn conditionals() {
        let (_dir, mut ctx) = sandbox();
        assert_eq!(paths("1 > 2 ? files : directories", &mut ctx), vec!["sub"]);
        assert!(paths("false ? files", &mut ctx).is_empty());
        assert_eq!(paths("true ? directories : ('x', 'y')", &mut ctx), vec!["sub"]);
    }
}
