use std::fmt::{Display, Error, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    // file commands
    Copy,
    Create,
    CreateFile,
    CreateDirectory,
    Delete,
    Move,
    Rename,
    // other commands
    Print,
    Sleep,
    // filters
    Where,
    Limit,
    Skip,
    Every,
    Final,
    Order,
    // boolean operators
    And,
    Or,
    Xor,
    Not,
    // negatable operators
    In,
    Like,
    Between,
    Regexp,
    // structures
    If,
    Else,
    While,
    Times,
    Inside,
    Break,
    Continue,
    Exit,
    Error,
    // auxiliary
    By,
    Asc,
    Desc,
    To,
    As,
    Force,
    Stack,
    True,
    False,
}

impl Keyword {
    pub fn from_word(word: &str) -> Option<Self> {
        Some(match word {
            "copy" => Self::Copy,
            "create" => Self::Create,
            "createfile" => Self::CreateFile,
            "createdirectory" => Self::CreateDirectory,
            "delete" => Self::Delete,
            "move" => Self::Move,
            "rename" => Self::Rename,
            "print" => Self::Print,
            "sleep" => Self::Sleep,
            "where" => Self::Where,
            "limit" => Self::Limit,
            "skip" => Self::Skip,
            "every" => Self::Every,
            "final" => Self::Final,
            "order" => Self::Order,
            "and" => Self::And,
            "or" => Self::Or,
            "xor" => Self::Xor,
            "not" => Self::Not,
            "in" => Self::In,
            "like" => Self::Like,
            "between" => Self::Between,
            "regexp" => Self::Regexp,
            "if" => Self::If,
            "else" => Self::Else,
            "while" => Self::While,
            "times" => Self::Times,
            "inside" => Self::Inside,
            "break" => Self::Break,
            "continue" => Self::Continue,
            "exit" => Self::Exit,
            "error" => Self::Error,
            "by" => Self::By,
            "asc" => Self::Asc,
            "desc" => Self::Desc,
            "to" => Self::To,
            "as" => Self::As,
            "force" => Self::Force,
            "stack" => Self::Stack,
            "true" => Self::True,
            "false" => Self::False,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::Create => "create",
            Self::CreateFile => "createFile",
            Self::CreateDirectory => "createDirectory",
            Self::Delete => "delete",
            Self::Move => "move",
            Self::Rename => "rename",
            Self::Print => "print",
            Self::Sleep => "sleep",
            Self::Where => "where",
            Self::Limit => "limit",
            Self::Skip => "skip",
            Self::Every => "every",
            Self::Final => "final",
            Self::Order => "order",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Not => "not",
            Self::In => "in",
            Self::Like => "like",
            Self::Between => "between",
            Self::Regexp => "regexp",
            Self::If => "if",
            Self::Else => "else",
            Self::While => "while",
            Self::Times => "times",
            Self::Inside => "inside",
            Self::Break => "break",
            Self::Continue => "continue",
            Self::Exit => "exit",
            Self::Error => "error",
            Self::By => "by",
            Self::Asc => "asc",
            Self::Desc => "desc",
            Self::To => "to",
            Self::As => "as",
            Self::Force => "force",
            Self::Stack => "stack",
            Self::True => "true",
            Self::False => "false",
        }
    }

    pub fn is_command(&self) -> bool {
        matches!(
            self,
            Self::Copy
                | Self::Create
                | Self::CreateFile
                | Self::CreateDirectory
                | Self::Delete
                | Self::Move
                | Self::Rename
                | Self::Print
                | Self::Sleep
        )
    }

    pub fn is_filter(&self) -> bool {
        matches!(
            self,
            Self::Where | Self::Limit | Self::Skip | Self::Every | Self::Final | Self::Order
        )
    }

    pub fn is_bool_operator(&self) -> bool {
        matches!(self, Self::And | Self::Or | Self::Xor | Self::Not)
    }

    /// Operators that accept a `not` in front of them (`x not in y`).
    pub fn is_negatable(&self) -> bool {
        matches!(self, Self::In | Self::Like | Self::Between | Self::Regexp)
    }

    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::If
                | Self::Else
                | Self::While
                | Self::Times
                | Self::Inside
                | Self::Break
                | Self::Continue
                | Self::Exit
                | Self::Error
        )
    }

    /// Keywords that can open a simple command (`print`, `force copy`, `break`).
    pub fn starts_command(&self) -> bool {
        self.is_command()
            || matches!(
                self,
                Self::Break | Self::Continue | Self::Exit | Self::Error | Self::Force | Self::Stack
            )
    }

    /// Keywords that can never appear inside a value expression.
    pub fn is_expression_forbidden(&self) -> bool {
        self.is_command()
            || self.is_structural()
            || matches!(self, Self::To | Self::As | Self::Force | Self::Stack)
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(f, "{}", self.as_str())
    }
}

pub fn month_from_word(word: &str) -> Option<i64> {
    Some(match word {
        "january" => 1,
        "february" => 2,
        "march" => 3,
        "april" => 4,
        "may" => 5,
        "june" => 6,
        "july" => 7,
        "august" => 8,
        "september" => 9,
        "october" => 10,
        "november" => 11,
        "december" => 12,
        _ => return None,
    })
}

pub fn weekday_from_word(word: &str) -> Option<i64> {
    Some(match word {
        "monday" => 1,
        "tuesday" => 2,
        "wednesday" => 3,
        "thursday" => 4,
        "friday" => 5,
        "saturday" => 6,
        "sunday" => 7,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_classes() {
        assert_eq!(Keyword::from_word("where"), Some(Keyword::Where));
        assert!(Keyword::Where.is_filter());
        assert!(Keyword::Like.is_negatable());
        assert!(Keyword::Print.is_expression_forbidden());
        assert!(!Keyword::Not.is_expression_forbidden());
        assert_eq!(Keyword::from_word("files"), None);
    }
}
