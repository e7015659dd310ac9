use super::{
    continue_loop, curly_block, header_and_body, Block, Collection, ComPtr, Command,
    CommandFactory, Vocabulary,
};
use crate::context::{Context, FrameId, FrameKind};
use crate::datatype::Number;
use crate::generator::GenPtr;
use crate::lang::{RuntimeError, SyntaxError};
use crate::parse::parse;
use crate::tokens::{Keyword, Tokens};

fn parse_condition(tks: Tokens, keyword: &str, ctx: &mut Context) -> Result<GenPtr<bool>, SyntaxError> {
    if tks.is_empty() {
        return Err(SyntaxError::keyword_not_followed_by_bool(keyword, tks.line()));
    }
    parse::<bool>(tks, ctx)?
        .ok_or_else(|| SyntaxError::keyword_not_followed_by_bool(keyword, tks.line()))
}

/// Body of a loop: parsed with `kind` entered and marked as a loop.
fn loop_body(
    body: Tokens,
    kind: FrameKind,
    ctx: &mut Context,
    vocabulary: &Vocabulary,
) -> Result<(FrameId, Block), SyntaxError> {
    ctx.within(kind, |ctx, frame| {
        let block = ctx.within_loop(|ctx| vocabulary.build_block(body, ctx))?;
        Ok((frame, block))
    })
}

/// `if a { } else if b { } else { }` and `if a command`.
pub struct IfFactory;

impl IfFactory {
    fn short_form(
        tks: Tokens,
        ctx: &mut Context,
        vocabulary: &Vocabulary,
    ) -> Result<Option<ComPtr>, SyntaxError> {
        let open = curly_block(tks).map(|(open, _)| open).unwrap_or(tks.len());
        let split = tks.top_level().into_iter().find(|i| {
            *i > 0 && *i < open && matches!(tks.at(*i).keyword(), Some(k) if k.starts_command())
        });
        let split = match split {
            Some(i) => i,
            None => return Ok(None),
        };
        let condition = parse_condition(tks.sub(1, split - 1), "if", ctx)?;
        let command = vocabulary.build_command(tks.skip(split), ctx)?;
        Ok(Some(Box::new(If {
            branches: vec![(condition, Block::new(vec![command]))],
            otherwise: None,
            line: tks.line(),
        })))
    }
}

impl CommandFactory for IfFactory {
    fn is_command(&self, tks: Tokens) -> bool {
        tks.first().is_keyword(Keyword::If)
    }

    fn build_command(
        &self,
        tks: Tokens,
        ctx: &mut Context,
        vocabulary: &Vocabulary,
    ) -> Result<ComPtr, SyntaxError> {
        if let Some(command) = Self::short_form(tks, ctx, vocabulary)? {
            return Ok(command);
        }
        let line = tks.line();
        let mut branches = Vec::new();
        let mut otherwise = None;
        let mut rest = tks;
        loop {
            let (open, close) = curly_block(rest).ok_or_else(|| {
                SyntaxError::new("keyword 'if' is not followed by a block", rest.line())
            })?;
            let condition = parse_condition(rest.sub(1, open - 1), "if", ctx)?;
            let body = vocabulary.build_block(rest.sub(open + 1, close - open - 1), ctx)?;
            branches.push((condition, body));
            let after = rest.skip(close + 1);
            if after.is_empty() {
                break;
            }
            if !after.first().is_keyword(Keyword::Else) {
                return Err(SyntaxError::new(
                    "unexpected tokens after a block",
                    after.line(),
                ));
            }
            let after = after.trim_left();
            if after.is_empty() {
                return Err(SyntaxError::new(
                    "keyword 'else' is not followed by anything",
                    rest.at(close).line,
                ));
            }
            if after.first().is_keyword(Keyword::If) {
                rest = after;
                continue;
            }
            match header_and_body(after)? {
                Some((header, body)) if header.is_empty() => {
                    otherwise = Some(vocabulary.build_block(body, ctx)?);
                }
                _ => {
                    return Err(SyntaxError::new(
                        "keyword 'else' should be followed by a block or by 'if'",
                        after.line(),
                    ))
                }
            }
            break;
        }
        Ok(Box::new(If {
            branches,
            otherwise,
            line,
        }))
    }
}

#[derive(Debug)]
struct If {
    branches: Vec<(GenPtr<bool>, Block)>,
    otherwise: Option<Block>,
    line: usize,
}

impl Command for If {
    fn run(&mut self, ctx: &mut Context) -> Result<(), RuntimeError> {
        for (condition, body) in self.branches.iter_mut() {
            if condition.value(ctx).map_err(|e| e.at(self.line))? {
                return body.run(ctx);
            }
        }
        match &mut self.otherwise {
            Some(body) => body.run(ctx),
            None => Ok(()),
        }
    }
}

/// `while condition { }`; `index` counts the passes.
pub struct WhileFactory;

impl CommandFactory for WhileFactory {
    fn is_command(&self, tks: Tokens) -> bool {
        tks.first().is_keyword(Keyword::While)
    }

    fn build_command(
        &self,
        tks: Tokens,
        ctx: &mut Context,
        vocabulary: &Vocabulary,
    ) -> Result<ComPtr, SyntaxError> {
        let (header, body) = header_and_body(tks)?.ok_or_else(|| {
            SyntaxError::new("keyword 'while' is not followed by a block", tks.line())
        })?;
        let (frame, (condition, body)) = ctx.within(FrameKind::Index, |ctx, frame| {
            let condition = parse_condition(header.trim_left(), "while", ctx)?;
            let body = ctx.within_loop(|ctx| vocabulary.build_block(body, ctx))?;
            Ok::<_, SyntaxError>((frame, (condition, body)))
        })?;
        Ok(Box::new(While {
            condition,
            body,
            frame,
            line: tks.line(),
        }))
    }
}

#[derive(Debug)]
struct While {
    condition: GenPtr<bool>,
    body: Block,
    frame: FrameId,
    line: usize,
}

impl Command for While {
    fn run(&mut self, ctx: &mut Context) -> Result<(), RuntimeError> {
        let mut index = 0;
        while ctx.is_running() {
            ctx.set_index(self.frame, index);
            if !self.condition.value(ctx).map_err(|e| e.at(self.line))? {
                break;
            }
            self.body.run(ctx)?;
            index += 1;
            if !continue_loop(ctx) {
                break;
            }
        }
        Ok(())
    }
}

/// `number times { }`
pub struct TimesFactory;

impl CommandFactory for TimesFactory {
    fn is_command(&self, tks: Tokens) -> bool {
        matches!(curly_block(tks), Some((open, _)) if open > 0 && tks.at(open - 1).is_keyword(Keyword::Times))
    }

    fn build_command(
        &self,
        tks: Tokens,
        ctx: &mut Context,
        vocabulary: &Vocabulary,
    ) -> Result<ComPtr, SyntaxError> {
        let line = tks.line();
        let (header, body) = header_and_body(tks)?.ok_or_else(|| {
            SyntaxError::new("keyword 'times' is not followed by a block", line)
        })?;
        let count = header.trim_right();
        if count.is_empty() {
            return Err(SyntaxError::new("keyword 'times' is not preceded by a number", line));
        }
        let count = parse::<Number>(count, ctx)?.ok_or_else(|| {
            SyntaxError::new(
                format!("'{}' before keyword 'times' is not a number", count),
                line,
            )
        })?;
        let (frame, body) = loop_body(body, FrameKind::Index, ctx, vocabulary)?;
        Ok(Box::new(Times {
            count,
            body,
            frame,
            line,
        }))
    }
}

#[derive(Debug)]
struct Times {
    count: GenPtr<Number>,
    body: Block,
    frame: FrameId,
    line: usize,
}

impl Command for Times {
    fn run(&mut self, ctx: &mut Context) -> Result<(), RuntimeError> {
        let count = self.count.value(ctx).map_err(|e| e.at(self.line))?.to_i64();
        for index in 0..count {
            if !ctx.is_running() {
                break;
            }
            ctx.set_index(self.frame, index);
            self.body.run(ctx)?;
            if !continue_loop(ctx) {
                break;
            }
        }
        Ok(())
    }
}

/// `path inside { }`, `inside path { }` and `inside { }` on the current file.
///
/// The body runs with the directory as its location, so `files` and
/// relative paths resolve under it. Elements that are not directories are skipped.
pub struct InsideFactory;

impl InsideFactory {
    fn header(tks: Tokens) -> Option<Tokens> {
        curly_block(tks).map(|(open, _)| tks.take(open))
    }
}

impl CommandFactory for InsideFactory {
    fn is_command(&self, tks: Tokens) -> bool {
        match Self::header(tks) {
            Some(header) => header.has_keyword(Keyword::Inside),
            None => tks.first().is_keyword(Keyword::Inside),
        }
    }

    fn build_command(
        &self,
        tks: Tokens,
        ctx: &mut Context,
        vocabulary: &Vocabulary,
    ) -> Result<ComPtr, SyntaxError> {
        let line = tks.line();
        let (header, body) = header_and_body(tks)?.ok_or_else(|| {
            SyntaxError::new("keyword 'inside' is not followed by a block", line)
        })?;
        let subject = if header.len() == 1 {
            None
        } else if header.first().is_keyword(Keyword::Inside) {
            Some(header.trim_left())
        } else if header.last().is_keyword(Keyword::Inside) {
            Some(header.trim_right())
        } else {
            return Err(SyntaxError::new(
                "keyword 'inside' should stand at the beginning or at the end of the header",
                line,
            ));
        };
        let subject = match subject {
            Some(tks) => {
                let collection = Collection::parse_paths(tks, ctx)?.ok_or_else(|| {
                    SyntaxError::new(format!("'{}' cannot be resolved to a path", tks), line)
                })?;
                let (file, (location, body)) = ctx.within(FrameKind::File, |ctx, file| {
                    let inner = loop_body(body, FrameKind::Location, ctx, vocabulary)?;
                    Ok::<_, SyntaxError>((file, inner))
                })?;
                return Ok(Box::new(Inside {
                    subject: Subject::Each(collection, file),
                    location,
                    body,
                    line,
                }));
            }
            None => ctx.innermost_file().ok_or_else(|| {
                SyntaxError::new("the subject of the command 'inside' is undefined here", line)
            })?,
        };
        let (location, body) = loop_body(body, FrameKind::Location, ctx, vocabulary)?;
        Ok(Box::new(Inside {
            subject: Subject::Current(subject),
            location,
            body,
            line,
        }))
    }
}

#[derive(Debug)]
enum Subject {
    Current(FrameId),
    Each(Collection, FrameId),
}

#[derive(Debug)]
struct Inside {
    subject: Subject,
    location: FrameId,
    body: Block,
    line: usize,
}

/// Run `body` inside the directory of `file`; false ends the enclosing walk.
fn enter(
    ctx: &mut Context,
    file: FrameId,
    location: FrameId,
    body: &mut Block,
) -> Result<bool, RuntimeError> {
    let path = ctx.frame(file).path.clone();
    if !ctx.filesystem.is_directory(&path) {
        tracing::debug!("'{}' is not a directory, skipped", path);
        return Ok(true);
    }
    ctx.set_location(location, path);
    body.run(ctx)?;
    Ok(continue_loop(ctx))
}

impl Command for Inside {
    fn run(&mut self, ctx: &mut Context) -> Result<(), RuntimeError> {
        let Self {
            subject,
            location,
            body,
            line,
        } = self;
        match subject {
            Subject::Current(file) => enter(ctx, *file, *location, body).map(|_| ()),
            Subject::Each(collection, file) => {
                let file = *file;
                collection.for_each(ctx, file, *line, |ctx| enter(ctx, file, *location, body))
            }
        }
    }
}

/// `expression { }`: a loop over a string, a definition or a list. An empty
/// header is a plain nested block.
pub struct IterateFactory;

impl CommandFactory for IterateFactory {
    fn is_command(&self, tks: Tokens) -> bool {
        curly_block(tks).is_some()
    }

    fn build_command(
        &self,
        tks: Tokens,
        ctx: &mut Context,
        vocabulary: &Vocabulary,
    ) -> Result<ComPtr, SyntaxError> {
        let line = tks.line();
        let (header, body) = header_and_body(tks)?.ok_or_else(|| SyntaxError::invalid_expression(line))?;
        if header.is_empty() {
            return Ok(Box::new(vocabulary.build_block(body, ctx)?));
        }
        let collection = Collection::parse_any(header, ctx)?.ok_or_else(|| {
            SyntaxError::new(format!("'{}' cannot be iterated", header), line)
        })?;
        let (frame, body) = loop_body(body, collection.frame_kind(), ctx, vocabulary)?;
        Ok(Box::new(Iterate {
            collection,
            body,
            frame,
            line,
        }))
    }
}

#[derive(Debug)]
struct Iterate {
    collection: Collection,
    body: Block,
    frame: FrameId,
    line: usize,
}

impl Command for Iterate {
    fn run(&mut self, ctx: &mut Context) -> Result<(), RuntimeError> {
        let Self {
            collection,
            body,
            frame,
            line,
        } = self;
        collection.for_each(ctx, *frame, *line, |ctx| {
            body.run(ctx)?;
            Ok(continue_loop(ctx))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use crate::command::tests::{context, output, run_in, syntax_error};

    #[test]
    fn conditionals() {
        assert_eq!(output("if 1 < 2 { print 'yes' } else { print 'no' }"), "yes\n");
        assert_eq!(
            output("x = 5; if x < 3 { print 'a' } else if x < 6 { print 'b' } else { print 'c' }"),
            "b\n"
        );
        assert_eq!(output("if false { print 'a' } print 'b'"), "b\n");
        assert_eq!(output("if 2 > 1 print 'short'"), "short\n");
        assert!(syntax_error("if 'x' { }").msg.contains("boolean condition"));
        assert!(syntax_error("if true { } else").msg.contains("else"));
    }

    #[test]
    fn loops() {
        assert_eq!(output("3 times { print index }"), "0\n1\n2\n");
        assert_eq!(output("n = 0; while n < 3 { n++ } print n"), "3\n");
        assert_eq!(
            output("4 times { if index = 1 { continue } if index = 3 { break } print index }"),
            "0\n2\n"
        );
        assert_eq!(output("{ print 'nested' }"), "nested\n");
        assert_eq!(
            output("numbers('1 2 3') { print this + index }"),
            "1\n3\n5\n"
        );
    }

    #[test]
    fn inside_changes_the_location() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("a.txt"), "").unwrap();
        fs::write(dir.path().join("b.txt"), "").unwrap();
        let (mut ctx, out) = context(&dir.path().to_string_lossy());
        let printed = run_in(
            "all inside { files { print name } } inside 'sub' { print location = path }",
            &mut ctx,
            &out,
        );
        assert_eq!(printed, "a\n1\n");
        let (mut ctx, out) = context(&dir.path().to_string_lossy());
        let printed = run_in("directories { inside { print files } }", &mut ctx, &out);
        assert_eq!(printed, "a.txt\n");
    }

    #[test]
    fn misplaced_blocks() {
        assert!(syntax_error("'a' { } else { }").msg.contains("unexpected tokens"));
        assert!(syntax_error("inside { }").msg.contains("undefined here"));
        assert!(syntax_error("'a' times { }").msg.contains("not a number"));
    }
}
