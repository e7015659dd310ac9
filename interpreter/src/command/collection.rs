use crate::context::{Context, FrameId, FrameKind};
use crate::datatype::{List, NumList, Number, Time, TimeList, ValueType};
use crate::generator::{DefPtr, Element, GenPtr};
use crate::lang::{RuntimeError, SyntaxError};
use crate::parse::{parse, parse_definition};
use crate::tokens::Tokens;

/// Values a loop or a file command walks through.
#[derive(Debug)]
pub enum Collection {
    Single(GenPtr<String>),
    Definition(DefPtr),
    Strings(GenPtr<List>),
    Numbers(GenPtr<NumList>),
    Times(GenPtr<TimeList>),
}

impl Collection {
    /// Arguments of file commands: a path, a definition or a list of paths.
    pub fn parse_paths(tks: Tokens, ctx: &mut Context) -> Result<Option<Self>, SyntaxError> {
        if let Some(g) = parse::<String>(tks, ctx)? {
            return Ok(Some(Self::Single(g)));
        }
        if let Some(d) = parse_definition(tks, ctx)? {
            return Ok(Some(Self::Definition(d)));
        }
        Ok(parse::<List>(tks, ctx)?.map(Self::Strings))
    }

    /// Header of an iteration loop. Definitions are tried before lists so
    /// patterns are walked lazily.
    pub fn parse_any(tks: Tokens, ctx: &mut Context) -> Result<Option<Self>, SyntaxError> {
        if let Some(g) = parse::<String>(tks, ctx)? {
            return Ok(Some(Self::Single(g)));
        }
        if let Some(d) = parse_definition(tks, ctx)? {
            return Ok(Some(Self::Definition(d)));
        }
        if let Some(g) = parse::<NumList>(tks, ctx)? {
            return Ok(Some(Self::Numbers(g)));
        }
        if let Some(g) = parse::<TimeList>(tks, ctx)? {
            return Ok(Some(Self::Times(g)));
        }
        Ok(parse::<List>(tks, ctx)?.map(Self::Strings))
    }

    /// Kind of frame that holds the current element.
    pub fn frame_kind(&self) -> FrameKind {
        match self {
            Self::Numbers(_) => FrameKind::Value(ValueType::Number),
            Self::Times(_) => FrameKind::Value(ValueType::Time),
            _ => FrameKind::File,
        }
    }

    /// Load every element into `frame` and call `f`; `f` returns false to stop.
    pub fn for_each<F>(
        &mut self,
        ctx: &mut Context,
        frame: FrameId,
        line: usize,
        mut f: F,
    ) -> Result<(), RuntimeError>
    where
        F: FnMut(&mut Context) -> Result<bool, RuntimeError>,
    {
        match self {
            Self::Single(g) => {
                let value = g.value(ctx).map_err(|e| e.at(line))?;
                String::load(ctx, frame, &value, 0);
                f(ctx)?;
                Ok(())
            }
            Self::Definition(def) => {
                def.reset();
                let mut index = 0;
                while ctx.is_running() && def.has_next(ctx).map_err(|e| e.at(line))? {
                    let value = def.value().map_err(|e| e.at(line))?;
                    String::load(ctx, frame, &value, index);
                    index += 1;
                    if !f(ctx)? {
                        break;
                    }
                }
                def.reset();
                Ok(())
            }
            Self::Strings(g) => {
                let list = g.value(ctx).map_err(|e| e.at(line))?;
                each(&list, ctx, frame, f)
            }
            Self::Numbers(g) => {
                let list: Vec<Number> = g.value(ctx).map_err(|e| e.at(line))?;
                each(&list, ctx, frame, f)
            }
            Self::Times(g) => {
                let list: Vec<Time> = g.value(ctx).map_err(|e| e.at(line))?;
                each(&list, ctx, frame, f)
            }
        }
    }
}

fn each<T, F>(list: &[T], ctx: &mut Context, frame: FrameId, mut f: F) -> Result<(), RuntimeError>
where
    T: Element,
    F: FnMut(&mut Context) -> Result<bool, RuntimeError>,
{
    for (index, value) in list.iter().enumerate() {
        if !ctx.is_running() {
            break;
        }
        T::load(ctx, frame, value, index as i64);
        if !f(ctx)? {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::tests::lex;

    fn collected(code: &str) -> (FrameKind, Vec<String>) {
        let tokens = lex(code);
        let mut ctx = Context::new("/");
        let mut collection = Collection::parse_any(Tokens::whole(&tokens), &mut ctx)
            .unwrap()
            .unwrap();
        let kind = collection.frame_kind();
        let frame = ctx.open_frame(kind);
        let mut seen = Vec::new();
        collection
            .for_each(&mut ctx, frame, 1, |ctx| {
                seen.push(format!("{:?}", ctx.frame(frame).this));
                Ok(seen.len() < 3)
            })
            .unwrap();
        (kind, seen)
    }

    #[test]
    fn elements_are_typed_by_the_header() {
        let (kind, seen) = collected("1, 2");
        assert_eq!(kind, FrameKind::Value(ValueType::Number));
        assert_eq!(seen.len(), 2);
        let (kind, seen) = collected("'a', 'b', 'c', 'd'");
        assert_eq!(kind, FrameKind::File);
        // the callback asked to stop after the third element
        assert_eq!(seen.len(), 3);
    }
}
