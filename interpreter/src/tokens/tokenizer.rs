use super::{Keyword, NumberMode, ParseError, Token, TokenKind};
use super::keyword::{month_from_word, weekday_from_word};
use crate::datatype::Number;

const SYMBOLS: &str = ",!=(){}[]:;-+*%<>?";
const DOUBLED_SYMBOLS: &str = "+-*";

pub struct Tokenizer<R>
where
    R: std::io::Read,
{
    reader: R,
    fsm: ReaderStateMachine,
    line: usize,
    column: usize,
    token_line: usize,
}

impl<R> Tokenizer<R>
where
    R: std::io::Read,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            fsm: ReaderStateMachine::Start {},
            line: 1,
            column: 0,
            token_line: 1,
        }
    }

    /// Read the whole source and split it into tokens.
    pub fn read_all(&mut self) -> Result<Vec<Token>, ParseError> {
        let mut source = String::new();
        self.reader
            .read_to_string(&mut source)
            .map_err(|e| self.error(format!("IO read error: {}", e)))?;
        let mut tokens = Vec::new();
        let mut buffer = String::new();
        for input in source.chars().chain(std::iter::once('\0')) {
            let previous = self.fsm;
            let next = previous.next_state(input);
            if previous.flushes_before(&next) {
                self.flush(previous, &mut buffer, &mut tokens)?;
            }
            if previous.starts_token(&next) {
                self.token_line = self.line;
            }
            self.do_tracking(input);
            match next {
                ReaderStateMachine::Word { out }
                | ReaderStateMachine::Number { out }
                | ReaderStateMachine::InsideLiteral { out, .. } => buffer.push(out),
                ReaderStateMachine::Symbol { out } => {
                    let doubled = matches!(previous, ReaderStateMachine::Symbol { out: p } if p == out)
                        && DOUBLED_SYMBOLS.contains(out);
                    if doubled {
                        tokens.pop();
                        tokens.push(Token::new(TokenKind::MultiSymbol(out), self.token_line));
                        // a third symbol must not merge again
                        self.fsm = ReaderStateMachine::EndToken {};
                        continue;
                    }
                    tokens.push(Token::new(TokenKind::Symbol(out), self.token_line));
                }
                ReaderStateMachine::EndLiteral { quote } => {
                    let text = std::mem::take(&mut buffer);
                    let kind = if quote == '\'' && text.contains('*') {
                        TokenKind::Pattern(text)
                    } else {
                        TokenKind::Quotation(text)
                    };
                    tokens.push(Token::new(kind, self.token_line));
                }
                ReaderStateMachine::Invalid { out } => {
                    return Err(match (previous, out) {
                        (ReaderStateMachine::StartLiteral { quote }, '\0')
                        | (ReaderStateMachine::InsideLiteral { quote, .. }, '\0') => {
                            self.error(format!("literal opened with {} is never closed", quote))
                        }
                        (ReaderStateMachine::BlockComment {}, '\0')
                        | (ReaderStateMachine::BlockCommentStar {}, '\0') => {
                            self.error("block comment is never closed".into())
                        }
                        (_, '"') => self.error(
                            "quotation marks are not allowed; use apostrophes ' or backticks ` for string literals".into(),
                        ),
                        (_, c) => self.error(format!("unexpected character {:?}", c)),
                    });
                }
                _ => {}
            }
            self.fsm = next;
        }
        Ok(tokens)
    }

    fn flush(
        &self,
        state: ReaderStateMachine,
        buffer: &mut String,
        tokens: &mut Vec<Token>,
    ) -> Result<(), ParseError> {
        let text = std::mem::take(buffer);
        let kind = match state {
            ReaderStateMachine::Word { .. } => self.classify_word(&text)?,
            ReaderStateMachine::Number { .. } => {
                let (n, mode) = parse_number_literal(&text)
                    .ok_or_else(|| self.error(format!("'{}' is not a valid number", text)))?;
                TokenKind::Number(n, mode)
            }
            ReaderStateMachine::Slash {} => TokenKind::Symbol('/'),
            _ => return Ok(()),
        };
        tokens.push(Token::new(kind, self.token_line));
        Ok(())
    }

    fn classify_word(&self, text: &str) -> Result<TokenKind, ParseError> {
        let lower = text.to_lowercase();
        if let Some((left, right)) = lower.split_once('.') {
            // an empty left side is a member of a list element (`times[1].year`)
            if right.is_empty() || right.contains('.') {
                return Err(self.error(format!("dot in '{}' is not placed correctly", text)));
            }
            if !is_word(right) {
                return Err(self.error(format!("'{}' is not a valid member name", right)));
            }
            return Ok(TokenKind::TwoWords(left.to_string(), right.to_string()));
        }
        Ok(if let Some(month) = month_from_word(&lower) {
            TokenKind::Number(Number::Int(month), NumberMode::Month)
        } else if let Some(day) = weekday_from_word(&lower) {
            TokenKind::Number(Number::Int(day), NumberMode::Weekday)
        } else if let Some(kw) = Keyword::from_word(&lower) {
            TokenKind::Keyword(kw)
        } else {
            TokenKind::Word(lower)
        })
    }

    /// track line and column locations
    fn do_tracking(&mut self, input: char) {
        if input == '\n' {
            self.line += 1;
            self.column = 0;
        } else if input != '\0' {
            self.column += 1;
        }
    }

    /// error factory (for ergonomics/DRY)
    fn error(&self, item: String) -> ParseError {
        ParseError {
            line: self.line,
            column: self.column,
            item,
        }
    }

    pub fn current_line(&self) -> usize {
        self.line
    }

    pub fn current_column(&self) -> usize {
        self.column
    }
}

fn is_word(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => chars.all(|c| c.is_alphanumeric() || c == '_'),
        _ => false,
    }
}

/// Decimal literal with optional size or multiplier suffix, or `2k23` year shorthand.
pub(crate) fn parse_number_literal(text: &str) -> Option<(Number, NumberMode)> {
    let lower = text.to_lowercase();
    let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if let Some((left, right)) = lower.split_once('k') {
        if digits(left) && digits(right) && right.len() <= 3 {
            let value = left.parse::<i64>().ok()?.checked_mul(1000)? + right.parse::<i64>().ok()?;
            return Some((Number::Int(value), NumberMode::Normal));
        }
    }
    const SUFFIXES: [(&str, i64, NumberMode); 7] = [
        ("kb", 1 << 10, NumberMode::Bytes),
        ("mb", 1 << 20, NumberMode::Bytes),
        ("gb", 1 << 30, NumberMode::Bytes),
        ("tb", 1 << 40, NumberMode::Bytes),
        ("pb", 1 << 50, NumberMode::Bytes),
        ("k", 1000, NumberMode::Normal),
        ("m", 1_000_000, NumberMode::Normal),
    ];
    for (suffix, multiplier, mode) in SUFFIXES {
        if let Some(base) = lower.strip_suffix(suffix) {
            let n = parse_decimal(base)?;
            return Some((n * Number::Int(multiplier), mode));
        }
    }
    parse_decimal(&lower).map(|n| (n, NumberMode::Normal))
}

fn parse_decimal(text: &str) -> Option<Number> {
    let (int_part, fraction) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text, None),
    };
    if int_part.is_empty() || !int_part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    match fraction {
        None => int_part
            .parse::<i64>()
            .ok()
            .map(Number::Int)
            .or_else(|| text.parse::<f64>().ok().map(Number::from_double)),
        Some(f) if !f.is_empty() && f.chars().all(|c| c.is_ascii_digit()) => {
            text.parse::<f64>().ok().map(Number::Double)
        }
        Some(_) => None,
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ReaderStateMachine {
    Start {},
    Word { out: char },
    Number { out: char },
    StartLiteral { quote: char },
    InsideLiteral { quote: char, out: char },
    EndLiteral { quote: char },
    Symbol { out: char },
    Slash {},
    LineComment {},
    BlockComment {},
    BlockCommentStar {},
    EndToken {},
    EndOfFile {},
    Invalid { out: char },
}

impl ReaderStateMachine {
    fn next_state(self, input: char) -> Self {
        match self {
            Self::Word { .. } if input.is_alphanumeric() || input == '_' || input == '.' => {
                Self::Word { out: input }
            }
            Self::Number { .. } if input.is_alphanumeric() || input == '.' => {
                Self::Number { out: input }
            }
            Self::StartLiteral { quote } | Self::InsideLiteral { quote, .. } => match input {
                '\0' => Self::Invalid { out: input },
                c if c == quote => Self::EndLiteral { quote },
                c => Self::InsideLiteral { quote, out: c },
            },
            Self::Slash {} if input == '/' => Self::LineComment {},
            Self::Slash {} if input == '*' => Self::BlockComment {},
            Self::LineComment {} => match input {
                '\n' => Self::EndToken {},
                '\0' => Self::EndOfFile {},
                _ => Self::LineComment {},
            },
            Self::BlockComment {} => match input {
                '*' => Self::BlockCommentStar {},
                '\0' => Self::Invalid { out: input },
                _ => Self::BlockComment {},
            },
            Self::BlockCommentStar {} => match input {
                '/' => Self::EndToken {},
                '*' => Self::BlockCommentStar {},
                '\0' => Self::Invalid { out: input },
                _ => Self::BlockComment {},
            },
            _ => Self::start(input),
        }
    }

    fn start(input: char) -> Self {
        match input {
            '\0' => Self::EndOfFile {},
            '\'' | '`' => Self::StartLiteral { quote: input },
            '/' => Self::Slash {},
            c if c.is_whitespace() => Self::EndToken {},
            c if c.is_ascii_digit() => Self::Number { out: c },
            c if c.is_alphabetic() || c == '_' || c == '.' => Self::Word { out: c },
            c if SYMBOLS.contains(c) => Self::Symbol { out: c },
            c => Self::Invalid { out: c },
        }
    }

    /// Whether the buffered word/number (or pending slash) is complete once `next` is entered.
    fn flushes_before(&self, next: &Self) -> bool {
        match self {
            Self::Word { .. } => !matches!(next, Self::Word { .. }),
            Self::Number { .. } => !matches!(next, Self::Number { .. }),
            Self::Slash {} => !matches!(next, Self::LineComment {} | Self::BlockComment {}),
            _ => false,
        }
    }

    fn starts_token(&self, next: &Self) -> bool {
        match next {
            Self::Word { .. } => !matches!(self, Self::Word { .. }),
            Self::Number { .. } => !matches!(self, Self::Number { .. }),
            Self::StartLiteral { .. } | Self::Symbol { .. } | Self::Slash {} => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn lex(code: &str) -> Result<Vec<TokenKind>, ParseError> {
        Tokenizer::new(Cursor::new(code))
            .read_all()
            .map(|tokens| tokens.into_iter().map(|t| t.kind).collect())
    }

    #[test]
    fn numbers_and_suffixes() {
        assert_eq!(
            lex("2kb 3k 2k23 1.5").unwrap(),
            vec![
                TokenKind::Number(Number::Int(2048), NumberMode::Bytes),
                TokenKind::Number(Number::Int(3000), NumberMode::Normal),
                TokenKind::Number(Number::Int(2023), NumberMode::Normal),
                TokenKind::Number(Number::Double(1.5), NumberMode::Normal),
            ]
        );
        assert!(lex("12abc").is_err());
    }

    #[test]
    fn literals_and_patterns() {
        assert_eq!(
            lex("'*.txt' `a*b` 'plain'").unwrap(),
            vec![
                TokenKind::Pattern("*.txt".into()),
                TokenKind::Quotation("a*b".into()),
                TokenKind::Quotation("plain".into()),
            ]
        );
        assert!(lex("\"nope\"").is_err());
        assert!(lex("'open").is_err());
    }

    #[test]
    fn words_keywords_and_members() {
        assert_eq!(
            lex("Files WHERE creation.Year June").unwrap(),
            vec![
                TokenKind::Word("files".into()),
                TokenKind::Keyword(Keyword::Where),
                TokenKind::TwoWords("creation".into(), "year".into()),
                TokenKind::Number(Number::Int(6), NumberMode::Month),
            ]
        );
        assert_eq!(
            lex("t[1].date").unwrap()[4],
            TokenKind::TwoWords(String::new(), "date".into())
        );
        assert!(lex("files.").is_err());
    }

    #[test]
    fn symbols_comments_and_lines() {
        let tokens = Tokenizer::new(Cursor::new("a++ // note\n/* block\n */ b/2"))
            .read_all()
            .unwrap();
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Word("a".into()),
                TokenKind::MultiSymbol('+'),
                TokenKind::Word("b".into()),
                TokenKind::Symbol('/'),
                TokenKind::Number(Number::Int(2), NumberMode::Normal),
            ]
        );
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[2].line, 3);
    }
}
