//! Statements and the parser that turns a token stream into them.
//!
//! A script is split into statements at top-level `;` and after every
//! top-level `{ }` block. Each statement is offered to the factories of a
//! [Vocabulary] in order; the first one that recognises it builds the command.

mod assign;
mod collection;
mod file;
mod misc;
mod structure;
mod value;

use std::fmt::Debug;

pub use assign::AssignFactory;
pub use collection::Collection;
pub use file::{FileAction, FileCommandFactory, Mode};
pub use misc::{ControlFactory, PrintFactory, SleepFactory};
pub use structure::{IfFactory, InsideFactory, IterateFactory, TimesFactory, WhileFactory};
pub use value::Expression;

use crate::context::{Context, RunState};
use crate::lang::{RuntimeError, SyntaxError};
use crate::tokens::{Keyword, Tokens};

pub trait Command: Debug {
    fn run(&mut self, ctx: &mut Context) -> Result<(), RuntimeError>;
}

pub type ComPtr = Box<dyn Command>;

pub trait CommandFactory {
    fn is_command(&self, tks: Tokens) -> bool;

    fn build_command(
        &self,
        tks: Tokens,
        ctx: &mut Context,
        vocabulary: &Vocabulary,
    ) -> Result<ComPtr, SyntaxError>;
}

/// Sequence of commands; stops early on `break`, `continue` and `exit`.
#[derive(Debug, Default)]
pub struct Block {
    commands: Vec<ComPtr>,
}

impl Block {
    pub fn new(commands: Vec<ComPtr>) -> Self {
        Self { commands }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Command for Block {
    fn run(&mut self, ctx: &mut Context) -> Result<(), RuntimeError> {
        for command in self.commands.iter_mut() {
            if !ctx.is_running() || ctx.state != RunState::Running {
                break;
            }
            command.run(ctx)?;
        }
        Ok(())
    }
}

/// Consume the control request left by a loop body; false ends the loop.
pub(crate) fn continue_loop(ctx: &mut Context) -> bool {
    match ctx.state {
        RunState::Break => {
            ctx.state = RunState::Running;
            false
        }
        RunState::Continue => {
            ctx.state = RunState::Running;
            ctx.is_running()
        }
        RunState::Exit(_) => false,
        RunState::Running => ctx.is_running(),
    }
}

/// Ordered set of statement parsers.
pub struct Vocabulary {
    factories: Vec<Box<dyn CommandFactory>>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self {
            factories: Vec::new(),
        }
    }

    pub fn add<T: CommandFactory + 'static>(&mut self, factory: T) -> &mut Self {
        self.factories.push(Box::new(factory));
        self
    }

    /// Every statement of the language.
    pub fn standard() -> Self {
        let mut vocabulary = Self::new();
        vocabulary
            .add(ControlFactory)
            .add(IfFactory)
            .add(WhileFactory)
            .add(InsideFactory)
            .add(TimesFactory)
            .add(PrintFactory)
            .add(SleepFactory)
            .add(FileCommandFactory)
            .add(AssignFactory)
            // any other `expression { ... }`
            .add(IterateFactory);
        vocabulary
    }

    /// Parse a sequence of statements.
    pub fn build_block(&self, tks: Tokens, ctx: &mut Context) -> Result<Block, SyntaxError> {
        let mut commands = Vec::new();
        for statement in split_statements(tks)? {
            commands.push(self.build_command(statement, ctx)?);
        }
        Ok(Block::new(commands))
    }

    /// Parse exactly one statement.
    pub fn build_command(&self, tks: Tokens, ctx: &mut Context) -> Result<ComPtr, SyntaxError> {
        for factory in &self.factories {
            if factory.is_command(tks) {
                let command = factory.build_command(tks, ctx, self)?;
                tracing::debug!("line {}: built {:?}", tks.line(), command);
                return Ok(command);
            }
        }
        if let Some(i) = tks
            .top_level()
            .into_iter()
            .find(|i| matches!(tks.at(*i).keyword(), Some(k) if k.is_expression_forbidden()))
        {
            let token = tks.at(i);
            return Err(SyntaxError::new(
                format!("keyword '{}' is not expected here", token),
                token.line,
            ));
        }
        Err(SyntaxError::new(
            format!("command '{}' cannot be resolved", tks),
            tks.line(),
        ))
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::standard()
    }
}

/// Statements of a block: separated by `;`, or ended by a top-level `}`
/// that is not followed by `else`.
pub fn split_statements(tks: Tokens) -> Result<Vec<Tokens>, SyntaxError> {
    let mut statements = Vec::new();
    let mut depth = 0_usize;
    let mut start = 0;
    for i in 0..tks.len() {
        let token = tks.at(i);
        if token.is_open_bracket() {
            depth += 1;
        } else if token.is_close_bracket() {
            depth = depth.saturating_sub(1);
            let followed_by_else = i + 1 < tks.len() && tks.at(i + 1).is_keyword(Keyword::Else);
            if depth == 0 && token.is_symbol('}') && !followed_by_else {
                statements.push(tks.sub(start, i + 1 - start));
                start = i + 1;
            }
        } else if depth == 0 && token.is_symbol(';') {
            if i > start {
                statements.push(tks.sub(start, i - start));
            }
            start = i + 1;
        }
    }
    if start < tks.len() {
        statements.push(tks.skip(start));
    }
    Ok(statements)
}

/// Position of the first top-level `{` and of its closing bracket.
pub(crate) fn curly_block(tks: Tokens) -> Option<(usize, usize)> {
    let mut depth = 0_usize;
    for i in 0..tks.len() {
        let token = tks.at(i);
        if depth == 0 && token.is_symbol('{') {
            return tks.closing_index(i).map(|close| (i, close));
        }
        if token.is_open_bracket() {
            depth += 1;
        } else if token.is_close_bracket() {
            depth = depth.saturating_sub(1);
        }
    }
    None
}

/// `header { body }` with nothing after the block.
pub(crate) fn header_and_body(tks: Tokens) -> Result<Option<(Tokens, Tokens)>, SyntaxError> {
    let (open, close) = match curly_block(tks) {
        Some(found) => found,
        None => return Ok(None),
    };
    if close != tks.len() - 1 {
        return Err(SyntaxError::new(
            "unexpected tokens after a block",
            tks.at(close).line,
        ));
    }
    Ok(Some((tks.take(open), tks.sub(open + 1, close - open - 1))))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::parse::tests::lex;
    use std::io::Write;
    use std::sync::atomic::AtomicBool;
    use std::sync::{Arc, Mutex};

    use crate::processing::general::FilesystemExecutor;

    /// Output sink that can be read back after the context took ownership of it.
    #[derive(Clone, Default)]
    pub struct Captured(pub Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        pub fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    pub fn context(location: &str) -> (Context, Captured) {
        let out = Captured::default();
        let running = Arc::new(AtomicBool::new(true));
        let ctx = Context::with_collaborators(
            location,
            Box::new(FilesystemExecutor::new(running.clone())),
            Box::new(out.clone()),
            running,
        );
        (ctx, out)
    }

    /// Parse and run `code`, returning what it printed.
    pub fn run_in(code: &str, ctx: &mut Context, out: &Captured) -> String {
        let tokens = lex(code);
        let mut block = Vocabulary::standard()
            .build_block(Tokens::whole(&tokens), ctx)
            .unwrap();
        block.run(ctx).unwrap();
        out.text()
    }

    pub fn output(code: &str) -> String {
        let (mut ctx, out) = context("/");
        run_in(code, &mut ctx, &out)
    }

    pub fn syntax_error(code: &str) -> SyntaxError {
        let tokens = lex(code);
        let (mut ctx, _) = context("/");
        Vocabulary::standard()
            .build_block(Tokens::whole(&tokens), &mut ctx)
            .unwrap_err()
    }

    #[test]
    fn statements_are_split_at_semicolons_and_blocks() {
        let tokens = lex("a = 1; if a > 0 { print a } else { print 0 } print 'x';;");
        let statements = split_statements(Tokens::whole(&tokens)).unwrap();
        let lengths: Vec<usize> = statements.iter().map(|s| s.len()).collect();
        assert_eq!(lengths, vec![3, 13, 2]);
    }

    #[test]
    fn block_stops_on_control_request() {
        assert_eq!(output("print 1; exit; print 2"), "1\n");
    }

    #[test]
    fn unknown_statements() {
        let err = syntax_error("1 + 2");
        assert!(err.msg.contains("cannot be resolved"), "{}", err.msg);
        let err = syntax_error("x = 1 to 2");
        assert_eq!(err.line, 1);
    }
}
