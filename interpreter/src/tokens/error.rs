use std::fmt::{Debug, Display};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("ParseError (line {line}, column {column}): {item}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub item: String,
}

impl TokenError for ParseError {
    fn set_line(&mut self, line: usize) {
        self.line = line
    }

    fn set_column(&mut self, column: usize) {
        self.column = column
    }
}

pub trait TokenError: Display + Debug {
    fn set_line(&mut self, line: usize);

    fn set_column(&mut self, column: usize);

    fn set_location(&mut self, line: usize, column: usize) {
        self.set_line(line);
        self.set_column(column);
    }
}
