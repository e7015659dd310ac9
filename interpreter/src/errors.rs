use crate::lang::{LanguageError, RuntimeError, SyntaxError};
use crate::tokens::{ParseError, TokenError};

#[derive(Debug, thiserror::Error)]
pub enum InterpreterError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl InterpreterError {
    pub fn line(&self) -> usize {
        match self {
            Self::Syntax(e) => e.line,
            Self::Runtime(e) => e.line,
            Self::Parse(e) => e.line,
        }
    }
}

impl LanguageError for InterpreterError {
    fn set_line(&mut self, line: usize) {
        match self {
            Self::Syntax(e) => e.set_line(line),
            Self::Runtime(e) => e.set_line(line),
            Self::Parse(e) => e.set_line(line),
        }
    }
}
