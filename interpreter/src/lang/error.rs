use std::fmt::{Debug, Display};

use crate::tokens::Token;

/// Parse-time failure: always fatal to the whole script.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Syntax error (line {line}): {msg}")]
pub struct SyntaxError {
    pub line: usize,
    pub msg: String,
}

impl SyntaxError {
    pub fn new<S: Into<String>>(msg: S, line: usize) -> Self {
        Self {
            line,
            msg: msg.into(),
        }
    }

    pub fn at<S: Into<String>>(msg: S, token: &Token) -> Self {
        Self::new(msg, token.line)
    }

    pub fn invalid_expression(line: usize) -> Self {
        Self::new("syntax of an expression is not valid", line)
    }

    pub fn invalid_numeric_expression(line: usize) -> Self {
        Self::new("syntax of a numeric expression is not valid", line)
    }

    pub fn invalid_boolean_expression(line: usize) -> Self {
        Self::new("syntax of a boolean expression is not valid", line)
    }

    pub fn division_by_zero(line: usize) -> Self {
        Self::new("inevitable division by zero", line)
    }

    pub fn modulo_by_zero(line: usize) -> Self {
        Self::new("inevitable modulo by zero", line)
    }

    pub fn cannot_start_with(ch: char, line: usize) -> Self {
        Self::new(format!("expression cannot start with {}", ch), line)
    }

    pub fn cannot_end_with(ch: char, line: usize) -> Self {
        Self::new(format!("expression cannot end with {}", ch), line)
    }

    pub fn adjacent_symbols(ch: char, line: usize) -> Self {
        Self::new(format!("adjacent {} symbols", ch), line)
    }

    pub fn bracket_not_closed(ch: char, line: usize) -> Self {
        Self::new(format!("bracket {} is not closed", ch), line)
    }

    pub fn bracket_not_opened(ch: char, line: usize) -> Self {
        Self::new(format!("bracket {} is not opened", ch), line)
    }

    pub fn bracket_before_curly(line: usize) -> Self {
        Self::new(
            "bracket should be closed before the curly bracket",
            line,
        )
    }

    pub fn undefined_variable(name: &str, line: usize) -> Self {
        Self::new(format!("variable '{}' does not exist or is unreachable here", name), line)
    }

    pub fn attribute_outside_context(name: &str, line: usize) -> Self {
        Self::new(
            format!("value of variable '{}' is undefined here: it needs an iteration context", name),
            line,
        )
    }

    pub fn function_not_found(name: &str, line: usize) -> Self {
        Self::new(format!("function '{}' does not exist", name), line)
    }

    pub fn wrong_arguments(name: &str, expected: &str, line: usize) -> Self {
        Self::new(
            format!("function '{}' expects {}", name, expected),
            line,
        )
    }

    pub fn keyword_not_followed_by_number(keyword: &str, line: usize) -> Self {
        Self::new(format!("keyword '{}' is not followed by a number", keyword), line)
    }

    pub fn keyword_not_followed_by_bool(keyword: &str, line: usize) -> Self {
        Self::new(
            format!("keyword '{}' is not followed by a boolean condition", keyword),
            line,
        )
    }

    pub fn missing_letter_s(word: &str, line: usize) -> Self {
        Self::new(
            format!("missing letter 's' at the end of the word '{}'", word),
            line,
        )
    }

    pub fn time_member(member: &str, line: usize) -> Self {
        Self::new(format!("'{}' is not a time variable member", member), line)
    }

    pub fn left_side_empty(keyword: &str, line: usize) -> Self {
        Self::new(format!("left side of operator '{}' is empty", keyword), line)
    }

    pub fn right_side_empty(keyword: &str, line: usize) -> Self {
        Self::new(format!("right side of operator '{}' is empty", keyword), line)
    }

    pub fn out_of_range(what: &str, value: i64, line: usize) -> Self {
        Self::new(format!("{} value {} is out of range", what, value), line)
    }
}

impl LanguageError for SyntaxError {
    fn set_line(&mut self, line: usize) {
        self.line = line
    }
}

/// Evaluation-time failure, stamped with the line of the command that raised it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error)]
#[error("Runtime error (line {line}): {msg}")]
pub struct RuntimeError {
    pub line: usize,
    pub msg: String,
}

impl RuntimeError {
    pub fn decompose(self) -> (usize, RuntimeMsg) {
        (self.line, RuntimeMsg(self.msg))
    }
}

impl LanguageError for RuntimeError {
    fn set_line(&mut self, line: usize) {
        self.line = line
    }
}

pub trait LanguageError: Display + Debug {
    fn set_line(&mut self, line: usize);
}

// RuntimeError builder component: generators do not know their line
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuntimeMsg(pub String);

impl RuntimeMsg {
    pub fn at(self, line: usize) -> RuntimeError {
        RuntimeError { line, msg: self.0 }
    }
}

impl Display for RuntimeMsg {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<std::io::Error> for RuntimeMsg {
    fn from(e: std::io::Error) -> Self {
        RuntimeMsg(format!("file system error: {}", e))
    }
}
