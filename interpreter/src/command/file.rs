//! Commands that change the file system.
//!
//! A failing file command does not stop the script: the failure is logged
//! and the `success` variable turns false until the next file command.

use std::fmt::{Display, Error, Formatter};

use super::{Collection, ComPtr, Command, CommandFactory, Vocabulary};
use crate::context::{Context, FrameId, FrameKind};
use crate::datatype::Value;
use crate::generator::GenPtr;
use crate::lang::{RuntimeError, RuntimeMsg, SyntaxError};
use crate::parse::parse;
use crate::processing::paths;
use crate::tokens::{Keyword, Tokens};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    Create,
    CreateFile,
    CreateDirectory,
    Delete,
    Copy,
    Move,
    Rename,
}

impl FileAction {
    pub fn from_keyword(keyword: Keyword) -> Option<Self> {
        Some(match keyword {
            Keyword::Create => Self::Create,
            Keyword::CreateFile => Self::CreateFile,
            Keyword::CreateDirectory => Self::CreateDirectory,
            Keyword::Delete => Self::Delete,
            Keyword::Copy => Self::Copy,
            Keyword::Move => Self::Move,
            Keyword::Rename => Self::Rename,
            _ => return None,
        })
    }

    fn keyword(&self) -> Keyword {
        match self {
            Self::Create => Keyword::Create,
            Self::CreateFile => Keyword::CreateFile,
            Self::CreateDirectory => Keyword::CreateDirectory,
            Self::Delete => Keyword::Delete,
            Self::Copy => Keyword::Copy,
            Self::Move => Keyword::Move,
            Self::Rename => Keyword::Rename,
        }
    }

    /// `copy`, `move` and `rename` need `to`.
    fn has_target(&self) -> bool {
        matches!(self, Self::Copy | Self::Move | Self::Rename)
    }
}

impl Display for FileAction {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(f, "{}", self.keyword())
    }
}

/// What happens when the destination is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Fail.
    Normal,
    /// Delete the existing element first.
    Force,
    /// Pick the first free name: `a(2).txt`, `a(3).txt`, ...
    Stack,
}

/// `[force|stack] action [subject] [to destination [as name]]`
pub struct FileCommandFactory;

impl FileCommandFactory {
    fn split_mode(tks: Tokens) -> (Mode, Tokens) {
        match tks.first().keyword() {
            Some(Keyword::Force) => (Mode::Force, tks.trim_left()),
            Some(Keyword::Stack) => (Mode::Stack, tks.trim_left()),
            _ => (Mode::Normal, tks),
        }
    }
}

impl CommandFactory for FileCommandFactory {
    fn is_command(&self, tks: Tokens) -> bool {
        match tks.first().keyword() {
            Some(Keyword::Force | Keyword::Stack) => true,
            Some(k) => FileAction::from_keyword(k).is_some(),
            None => false,
        }
    }

    fn build_command(
        &self,
        tks: Tokens,
        ctx: &mut Context,
        _vocabulary: &Vocabulary,
    ) -> Result<ComPtr, SyntaxError> {
        let line = tks.line();
        let (mode, rest) = Self::split_mode(tks);
        if rest.is_empty() {
            return Err(SyntaxError::new(
                format!("keyword '{}' is not followed by a command", tks.first()),
                line,
            ));
        }
        let action = rest
            .first()
            .keyword()
            .and_then(FileAction::from_keyword)
            .ok_or_else(|| {
                SyntaxError::new(
                    format!("keyword '{}' should be followed by a file command", tks.first()),
                    line,
                )
            })?;
        if mode != Mode::Normal && action == FileAction::Delete {
            return Err(SyntaxError::new(
                format!("command 'delete' cannot be preceded by '{}'", tks.first()),
                line,
            ));
        }
        let args = rest.trim_left();
        let (subject, destination) = match args.find_keyword(Keyword::To) {
            Some(_) if !action.has_target() => {
                return Err(SyntaxError::new(
                    format!("command '{}' cannot have a destination", action),
                    line,
                ))
            }
            Some(i) => (args.take(i), Some(args.skip(i + 1))),
            None if action.has_target() => {
                return Err(SyntaxError::new(
                    format!("command '{}' requires keyword 'to'", action),
                    line,
                ))
            }
            None => (args, None),
        };

        if subject.is_empty() {
            let frame = ctx.innermost_file().ok_or_else(|| {
                SyntaxError::new(
                    format!("the subject of the command '{}' is undefined here", action),
                    line,
                )
            })?;
            let target = Target::parse(action, destination, ctx, line)?;
            return Ok(Box::new(FileCommand {
                subject: Subject::Current(frame),
                operation: Operation {
                    action,
                    mode,
                    target,
                    line,
                },
            }));
        }

        let collection = Collection::parse_paths(subject, ctx)?.ok_or_else(|| {
            SyntaxError::new(format!("'{}' cannot be resolved to a path", subject), line)
        })?;
        // the destination can refer to the element being processed
        let (frame, target) = ctx.within(FrameKind::File, |ctx, frame| {
            let target = Target::parse(action, destination, ctx, line)?;
            Ok::<_, SyntaxError>((frame, target))
        })?;
        Ok(Box::new(FileCommand {
            subject: Subject::Each(collection, frame),
            operation: Operation {
                action,
                mode,
                target,
                line,
            },
        }))
    }
}

fn string(tks: Tokens, ctx: &mut Context, what: &str, line: usize) -> Result<GenPtr<String>, SyntaxError> {
    if tks.is_empty() {
        return Err(SyntaxError::new(format!("{} is empty", what), line));
    }
    parse::<String>(tks, ctx)?
        .ok_or_else(|| SyntaxError::new(format!("{} '{}' is not a string", what, tks), line))
}

#[derive(Debug)]
enum Target {
    None,
    /// `to directory [as name]`
    Directory(GenPtr<String>, Option<GenPtr<String>>),
    /// `rename to name`
    Name(GenPtr<String>),
}

impl Target {
    fn parse(
        action: FileAction,
        destination: Option<Tokens>,
        ctx: &mut Context,
        line: usize,
    ) -> Result<Self, SyntaxError> {
        let destination = match destination {
            Some(d) => d,
            None => return Ok(Self::None),
        };
        if action == FileAction::Rename {
            if destination.has_keyword(Keyword::As) {
                return Err(SyntaxError::new(
                    "command 'rename' cannot contain keyword 'as'",
                    line,
                ));
            }
            return Ok(Self::Name(string(destination, ctx, "new name", line)?));
        }
        match destination.find_keyword(Keyword::As) {
            Some(i) => Ok(Self::Directory(
                string(destination.take(i), ctx, "destination", line)?,
                Some(string(destination.skip(i + 1), ctx, "new name", line)?),
            )),
            None => Ok(Self::Directory(string(destination, ctx, "destination", line)?, None)),
        }
    }
}

#[derive(Debug)]
enum Subject {
    /// The file of the enclosing loop.
    Current(FrameId),
    Each(Collection, FrameId),
}

#[derive(Debug)]
struct FileCommand {
    subject: Subject,
    operation: Operation,
}

/// The action with everything it needs besides its subject.
#[derive(Debug)]
struct Operation {
    action: FileAction,
    mode: Mode,
    target: Target,
    line: usize,
}

/// A file command that could not be carried out.
struct Failure(String);

type Outcome = Result<Result<(), Failure>, RuntimeMsg>;

fn fail<S: Into<String>>(reason: S) -> Outcome {
    Ok(Err(Failure(reason.into())))
}

/// A name given to `rename` or `as` keeps the old extension unless it has one.
fn with_extension(name: String, old: &str, is_file: bool) -> String {
    let extension = paths::extension(old);
    if is_file && !extension.is_empty() && !paths::has_extension(&name) {
        format!("{}.{}", name, extension)
    } else {
        name
    }
}

fn valid_name(name: &str) -> bool {
    !paths::is_invalid(name)
        && !paths::is_absolute(name)
        && !name.contains(|c| c == '/' || c == '\\')
        && name != "."
        && name != ".."
}

impl Operation {
    /// Free the destination according to the mode; the path to write to.
    fn claim(&self, ctx: &mut Context, source: &str, target: String) -> Result<String, Failure> {
        if !ctx.filesystem.exists(&target) {
            return Ok(target);
        }
        match self.mode {
            Mode::Normal => Err(Failure(format!("'{}' already exists", target))),
            Mode::Force => {
                if paths::is_ancestor(&target, source) {
                    return Err(Failure(format!("'{}' contains the source", target)));
                }
                ctx.filesystem
                    .delete(&target)
                    .map_err(|e| Failure(e.0))?;
                Ok(target)
            }
            Mode::Stack => {
                let keep_extension = !ctx.filesystem.is_directory(source);
                let fs = &mut ctx.filesystem;
                Ok(paths::stacked(&target, keep_extension, |p| fs.exists(p)))
            }
        }
    }

    fn create(&self, ctx: &mut Context, path: &str) -> Outcome {
        if paths::is_invalid(path) {
            return fail("the path is not valid");
        }
        let as_file = match self.action {
            FileAction::CreateFile => true,
            FileAction::CreateDirectory => false,
            _ => paths::has_extension(path),
        };
        let target = if ctx.filesystem.exists(path) {
            match self.mode {
                Mode::Normal => return fail("it already exists"),
                Mode::Force => {
                    if let Err(e) = ctx.filesystem.delete(path) {
                        return fail(e.0);
                    }
                    path.to_string()
                }
                Mode::Stack => {
                    let fs = &mut ctx.filesystem;
                    paths::stacked(path, as_file, |p| fs.exists(p))
                }
            }
        } else {
            path.to_string()
        };
        let created = if as_file {
            ctx.filesystem.create_file(&target)
        } else {
            ctx.filesystem.create_directory(&target)
        };
        Ok(created.map_err(|e| Failure(e.0)))
    }

    fn delete(&self, ctx: &mut Context, path: &str) -> Outcome {
        if !ctx.filesystem.exists(path) {
            return fail("it does not exist");
        }
        Ok(ctx.filesystem.delete(path).map_err(|e| Failure(e.0)))
    }

    /// `copy` and `move`; returns the new path of a moved element.
    fn transfer(
        &mut self,
        ctx: &mut Context,
        frame: FrameId,
        path: &str,
    ) -> Result<Result<Option<String>, Failure>, RuntimeMsg> {
        let (directory, name) = match &mut self.target {
            Target::Directory(directory, name) => {
                let directory = directory.value(ctx)?;
                let name = match name {
                    Some(g) => Some(g.value(ctx)?),
                    None => None,
                };
                (directory, name)
            }
            _ => return Ok(Err(Failure("destination is missing".into()))),
        };
        if !ctx.filesystem.exists(path) {
            return Ok(Err(Failure("it does not exist".into())));
        }
        let location = ctx.location(ctx.frame(frame).location).to_string();
        let directory = paths::join(&location, &ctx.filesystem.expand(&directory)?);
        let is_file = !ctx.filesystem.is_directory(path);
        let name = match name {
            Some(n) if !valid_name(&n) => {
                return Ok(Err(Failure(format!("'{}' is not a valid name", n))))
            }
            Some(n) => with_extension(n, path, is_file),
            None => paths::fullname(path),
        };
        let target = paths::join(&directory, &name);
        if target == path || paths::is_ancestor(path, &target) {
            return Ok(Err(Failure(format!("'{}' cannot be placed in itself", path))));
        }
        let target = match self.claim(ctx, path, target) {
            Ok(t) => t,
            Err(f) => return Ok(Err(f)),
        };
        if !ctx.filesystem.exists(&directory) {
            if let Err(e) = ctx.filesystem.create_directory(&directory) {
                return Ok(Err(Failure(e.0)));
            }
        }
        let done = if self.action == FileAction::Move {
            ctx.filesystem.move_to(path, &target).map(|_| Some(target))
        } else {
            ctx.filesystem.copy(path, &target).map(|_| None)
        };
        Ok(done.map_err(|e| Failure(e.0)))
    }

    fn rename(
        &mut self,
        ctx: &mut Context,
        path: &str,
    ) -> Result<Result<Option<String>, Failure>, RuntimeMsg> {
        let name = match &mut self.target {
            Target::Name(g) => g.value(ctx)?,
            _ => return Ok(Err(Failure("new name is missing".into()))),
        };
        if !valid_name(&name) {
            return Ok(Err(Failure(format!("'{}' is not a valid name", name))));
        }
        if !ctx.filesystem.exists(path) {
            return Ok(Err(Failure("it does not exist".into())));
        }
        let is_file = !ctx.filesystem.is_directory(path);
        let name = with_extension(name, path, is_file);
        let target = paths::join(&paths::parent(path), &name);
        if target == path {
            return Ok(Ok(None));
        }
        let target = match self.claim(ctx, path, target) {
            Ok(t) => t,
            Err(f) => return Ok(Err(f)),
        };
        Ok(ctx
            .filesystem
            .rename(path, &target)
            .map(|_| Some(target))
            .map_err(|e| Failure(e.0)))
    }

    /// Apply the action to the element loaded in `frame`.
    fn execute(&mut self, ctx: &mut Context, frame: FrameId) -> Result<(), RuntimeError> {
        let path = ctx.frame(frame).path.clone();
        let outcome = match self.action {
            FileAction::Create | FileAction::CreateFile | FileAction::CreateDirectory => {
                self.create(ctx, &path).map(|r| r.map(|_| None))
            }
            FileAction::Delete => self.delete(ctx, &path).map(|r| r.map(|_| None)),
            FileAction::Copy | FileAction::Move => self.transfer(ctx, frame, &path),
            FileAction::Rename => self.rename(ctx, &path),
        }
        .map_err(|e| e.at(self.line))?;
        match outcome {
            Ok(moved) => {
                tracing::info!("{} '{}'", self.action, path);
                ctx.success = true;
                match moved {
                    Some(new_path) => {
                        let index = ctx.frame(frame).index.to_i64();
                        let this = match &ctx.frame(frame).this {
                            Value::String(this)
                                if self.action == FileAction::Rename && !paths::is_absolute(this) =>
                            {
                                paths::left_join(&paths::parent(this), &paths::fullname(&new_path))
                            }
                            _ => new_path,
                        };
                        ctx.set_file(frame, this, index);
                    }
                    None => ctx.forget_data(frame),
                }
            }
            Err(Failure(reason)) => {
                tracing::warn!("line {}: failed to {} '{}': {}", self.line, self.action, path, reason);
                ctx.success = false;
            }
        }
        Ok(())
    }
}

impl Command for FileCommand {
    fn run(&mut self, ctx: &mut Context) -> Result<(), RuntimeError> {
        let Self { subject, operation } = self;
        match subject {
            Subject::Current(frame) => operation.execute(ctx, *frame),
            Subject::Each(collection, frame) => {
                let frame = *frame;
                collection.for_each(ctx, frame, operation.line, |ctx| {
                    operation.execute(ctx, frame)?;
                    Ok(true)
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use crate::command::tests::{context, run_in, syntax_error};

    fn run(dir: &Path, code: &str) -> String {
        let (mut ctx, out) = context(&dir.to_string_lossy());
        run_in(code, &mut ctx, &out)
    }

    #[test]
    fn create_by_extension_or_keyword() {
        let dir = tempfile::tempdir().unwrap();
        run(
            dir.path(),
            "create 'a.txt'; create 'folder'; createfile 'plain'; createdirectory 'd.x'",
        );
        assert!(dir.path().join("a.txt").is_file());
        assert!(dir.path().join("folder").is_dir());
        assert!(dir.path().join("plain").is_file());
        assert!(dir.path().join("d.x").is_dir());
        assert_eq!(run(dir.path(), "create 'a.txt'; print success"), "0\n");
        assert_eq!(run(dir.path(), "stack create 'a.txt'; print success"), "1\n");
        assert!(dir.path().join("a(2).txt").is_file());
    }

    #[test]
    fn copy_move_and_rename() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("b.log"), "b").unwrap();
        run(dir.path(), "'*.txt' { copy to 'backup' }");
        assert_eq!(fs::read_to_string(dir.path().join("backup").join("a.txt")).unwrap(), "a");

        run(dir.path(), "rename 'b.log' to 'c'");
        assert!(dir.path().join("c.log").is_file());
        assert!(!dir.path().join("b.log").exists());

        run(dir.path(), "move 'a.txt' to 'moved' as 'z'");
        assert!(dir.path().join("moved").join("z.txt").is_file());
        assert!(!dir.path().join("a.txt").exists());
    }

    #[test]
    fn modes_resolve_taken_destinations() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("backup")).unwrap();
        fs::write(dir.path().join("backup").join("x.txt"), "old").unwrap();
        fs::write(dir.path().join("x.txt"), "new").unwrap();
        assert_eq!(run(dir.path(), "copy 'x.txt' to 'backup'; print success"), "0\n");
        run(dir.path(), "stack copy 'x.txt' to 'backup'");
        assert_eq!(fs::read_to_string(dir.path().join("backup").join("x(2).txt")).unwrap(), "new");
        run(dir.path(), "force copy 'x.txt' to 'backup'");
        assert_eq!(fs::read_to_string(dir.path().join("backup").join("x.txt")).unwrap(), "new");
    }

    #[test]
    fn iteration_follows_renamed_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();
        fs::create_dir(dir.path().join("keep")).unwrap();
        assert_eq!(run(dir.path(), "files { rename to 'q'; print name }"), "q\n");
        assert!(dir.path().join("q.txt").is_file());
        run(dir.path(), "delete files");
        assert!(!dir.path().join("q.txt").exists());
        assert!(dir.path().join("keep").is_dir());
    }

    #[test]
    fn malformed_file_commands() {
        assert!(syntax_error("copy 'a'").msg.contains("requires keyword 'to'"));
        assert!(syntax_error("delete 'a' to 'b'").msg.contains("cannot have a destination"));
        assert!(syntax_error("delete").msg.contains("undefined here"));
        assert!(syntax_error("force delete 'a'").msg.contains("cannot be preceded"));
        assert!(syntax_error("rename 'a' to 'b' as 'c'").msg.contains("'as'"));
        assert!(syntax_error("stack").msg.contains("not followed by a command"));
    }
}
