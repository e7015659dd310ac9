use super::{Token, TokenKind};
use crate::lang::SyntaxError;

fn closing(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

fn opening(close: char) -> char {
    match close {
        ')' => '(',
        ']' => '[',
        _ => '{',
    }
}

/// Check that every bracket is closed in the right order and that no curly
/// bracket opens while a round or square one is still open.
pub fn check_brackets(tokens: &[Token]) -> Result<(), SyntaxError> {
    let mut open: Vec<(char, usize)> = Vec::new();
    for token in tokens {
        let ch = match token.kind {
            TokenKind::Symbol(c @ ('(' | '[' | '{' | ')' | ']' | '}')) => c,
            _ => continue,
        };
        match ch {
            '(' | '[' => open.push((ch, token.line)),
            '{' => {
                if let Some((_, line)) = open.iter().rev().find(|(c, _)| *c != '{') {
                    return Err(SyntaxError::bracket_before_curly(*line));
                }
                open.push((ch, token.line));
            }
            close => match open.pop() {
                None => return Err(SyntaxError::bracket_not_opened(close, token.line)),
                Some((o, _)) if o == opening(close) => {}
                Some((o, line)) => return Err(SyntaxError::bracket_not_closed(o, line)),
            },
        }
    }
    match open.pop() {
        Some((o, line)) => Err(SyntaxError::new(
            format!("bracket {} is not closed (expected {})", o, closing(o)),
            line,
        )),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::Tokenizer;
    use std::io::Cursor;

    fn check(code: &str) -> Result<(), SyntaxError> {
        let tokens = Tokenizer::new(Cursor::new(code)).read_all().unwrap();
        check_brackets(&tokens)
    }

    #[test]
    fn balanced() {
        assert!(check("a = (1, [2]) { b = (3) }").is_ok());
    }

    #[test]
    fn unclosed_reports_opening_line() {
        let err = check("x = 1\n(a, b").unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn interleaved_curly() {
        let err = check("{\n ( }").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(check("( { } )").is_err());
        assert!(check(")").is_err());
    }
}
