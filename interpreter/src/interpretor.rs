use std::io::{Cursor, Read, Write};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use super::command::{Command, Vocabulary};
use super::context::{Context, RunState};
use super::lang::RuntimeMsg;
use super::processing::general::FilesystemExecutor;
use super::tokens::{check_brackets, Token, Tokenizer, Tokens};
use super::InterpreterError;

/// Settings of an [Interpreter].
#[derive(Debug, Clone)]
pub struct InterpreterConfig {
    /// Directory that relative paths and `files`-style words resolve under.
    pub location: String,
    /// Parse scripts without running them.
    pub dry_run: bool,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        let location = std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .to_string_lossy()
            .into_owned();
        Self {
            location,
            dry_run: false,
        }
    }
}

/// The script interpreter.
///
/// A whole script is parsed before its first command runs, so a syntax error
/// anywhere means nothing is executed. Variables survive between runs of the
/// same interpreter.
pub struct Interpreter {
    vocabulary: Vocabulary,
    context: Context,
    config: InterpreterConfig,
}

impl Interpreter {
    /// Interpreter printing to stdout, using the standard vocabulary.
    pub fn new(config: InterpreterConfig) -> Self {
        let context = Context::new(&config.location);
        Self::with_vocab(config, Vocabulary::standard(), context)
    }

    /// Interpreter printing to `out`.
    pub fn with_output(config: InterpreterConfig, out: Box<dyn Write>) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let context = Context::with_collaborators(
            &config.location,
            Box::new(FilesystemExecutor::new(running.clone())),
            out,
            running,
        );
        Self::with_vocab(config, Vocabulary::standard(), context)
    }

    /// Create a custom interpreter instance.
    pub fn with_vocab(config: InterpreterConfig, vocabulary: Vocabulary, context: Context) -> Self {
        Self {
            vocabulary,
            context,
            config,
        }
    }

    pub fn context(&mut self) -> &mut Context {
        &mut self.context
    }

    /// Flag shared with every running enumeration; clear it to stop the script.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.context.running_flag()
    }

    pub fn run_str(&mut self, code: &str) -> Result<i32, InterpreterError> {
        self.run(Cursor::new(code))
    }

    /// Parse and execute a script; the exit code requested by `exit`/`error`, 0 otherwise.
    pub fn run<R: Read>(&mut self, source: R) -> Result<i32, InterpreterError> {
        let tokens = tokenize(source)?;
        let mut block = self
            .vocabulary
            .build_block(Tokens::whole(&tokens), &mut self.context)?;
        tracing::debug!(
            "parsed {} tokens into {} commands",
            tokens.len(),
            block.len()
        );
        if self.config.dry_run {
            return Ok(0);
        }
        self.context.state = RunState::Running;
        let result = block.run(&mut self.context);
        let flushed = self.context.out.flush();
        result?;
        flushed.map_err(|e| RuntimeMsg::from(e).at(tokens.last().map(|t| t.line).unwrap_or(1)))?;
        Ok(match self.context.state {
            RunState::Exit(code) => code,
            _ => 0,
        })
    }
}

/// Split a script into tokens and check that its brackets pair up.
pub fn tokenize<R: Read>(source: R) -> Result<Vec<Token>, InterpreterError> {
    let tokens = Tokenizer::new(source).read_all()?;
    check_brackets(&tokens)?;
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::tests::Captured;

    fn interpreter(dry_run: bool) -> (Interpreter, Captured) {
        let out = Captured::default();
        let config = InterpreterConfig {
            location: "/".into(),
            dry_run,
        };
        (Interpreter::with_output(config, Box::new(out.clone())), out)
    }

    #[test]
    fn exit_codes() {
        let (mut interpreter, out) = interpreter(false);
        assert_eq!(interpreter.run_str("print 'a'").unwrap(), 0);
        assert_eq!(interpreter.run_str("error 4; print 'b'").unwrap(), 4);
        assert_eq!(interpreter.run_str("exit").unwrap(), 0);
        assert_eq!(out.text(), "a\n");
    }

    #[test]
    fn nothing_runs_after_a_syntax_error() {
        let (mut interpreter, out) = interpreter(false);
        let err = interpreter.run_str("print 1;\nprint 1 +").unwrap_err();
        assert!(matches!(err, InterpreterError::Syntax(_)));
        assert_eq!(err.line(), 2);
        assert_eq!(out.text(), "");
    }

    #[test]
    fn dry_run_only_parses() {
        let (mut interpreter, out) = interpreter(true);
        assert_eq!(interpreter.run_str("print 'a'").unwrap(), 0);
        assert_eq!(out.text(), "");
        assert!(interpreter.run_str("print (").is_err());
    }
}
