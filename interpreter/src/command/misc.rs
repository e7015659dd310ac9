use std::io::Write;

use super::{ComPtr, Command, CommandFactory, Vocabulary};
use crate::context::{Context, RunState};
use crate::datatype::{List, Number, Period};
use crate::generator::{DefPtr, GenPtr};
use crate::lang::{RuntimeError, RuntimeMsg, SyntaxError};
use crate::parse::{parse, parse_definition, parse_required};
use crate::tokens::{Keyword, Token, TokenKind, Tokens};

/// `break`, `continue`, `exit` and `error [code]`.
pub struct ControlFactory;

impl CommandFactory for ControlFactory {
    fn is_command(&self, tks: Tokens) -> bool {
        matches!(
            tks.first().keyword(),
            Some(Keyword::Break | Keyword::Continue | Keyword::Exit | Keyword::Error)
        )
    }

    fn build_command(
        &self,
        tks: Tokens,
        ctx: &mut Context,
        _vocabulary: &Vocabulary,
    ) -> Result<ComPtr, SyntaxError> {
        let keyword = tks.first();
        let line = keyword.line;
        let state = match keyword.keyword() {
            Some(Keyword::Break) => RunState::Break,
            Some(Keyword::Continue) => RunState::Continue,
            Some(Keyword::Exit) => RunState::Exit(0),
            _ if tks.len() == 1 => RunState::Exit(1),
            _ => {
                let code = parse_required::<Number>(tks.trim_left(), ctx, "exit code")?;
                return Ok(Box::new(ErrorCode { code, line }));
            }
        };
        if tks.len() > 1 {
            return Err(SyntaxError::new(
                format!("keyword '{}' cannot be followed by anything", keyword),
                line,
            ));
        }
        if matches!(state, RunState::Break | RunState::Continue) && !ctx.in_loop() {
            return Err(SyntaxError::new(
                format!("keyword '{}' is placed outside of a loop", keyword),
                line,
            ));
        }
        Ok(Box::new(Control { state }))
    }
}

#[derive(Debug)]
struct Control {
    state: RunState,
}

impl Command for Control {
    fn run(&mut self, ctx: &mut Context) -> Result<(), RuntimeError> {
        ctx.state = self.state;
        Ok(())
    }
}

#[derive(Debug)]
struct ErrorCode {
    code: GenPtr<Number>,
    line: usize,
}

impl Command for ErrorCode {
    fn run(&mut self, ctx: &mut Context) -> Result<(), RuntimeError> {
        let code = self.code.value(ctx).map_err(|e| e.at(self.line))?;
        tracing::debug!("line {}: error {}", self.line, code);
        ctx.state = RunState::Exit(code.to_i64() as i32);
        Ok(())
    }
}

/// `print`, `print value`.
pub struct PrintFactory;

impl CommandFactory for PrintFactory {
    fn is_command(&self, tks: Tokens) -> bool {
        tks.first().is_keyword(Keyword::Print)
    }

    fn build_command(
        &self,
        tks: Tokens,
        ctx: &mut Context,
        _vocabulary: &Vocabulary,
    ) -> Result<ComPtr, SyntaxError> {
        let line = tks.line();
        if tks.len() == 1 {
            if ctx.innermost_this().is_none() {
                return Err(SyntaxError::new(
                    "the subject of the command 'print' is undefined here",
                    line,
                ));
            }
            let this = [Token::new(TokenKind::Word("this".into()), line)];
            let value = parse_required::<String>(Tokens::whole(&this), ctx, "string")?;
            return Ok(Box::new(Print {
                value: Printed::Text(value),
                line,
            }));
        }
        let tks = tks.trim_left();
        let value = if let Some(g) = parse::<String>(tks, ctx)? {
            Printed::Text(g)
        } else if let Some(def) = parse_definition(tks, ctx)? {
            Printed::Definition(def)
        } else if let Some(g) = parse::<List>(tks, ctx)? {
            Printed::Lines(g)
        } else {
            return Err(SyntaxError::new(
                format!("'{}' cannot be printed", tks),
                line,
            ));
        };
        Ok(Box::new(Print { value, line }))
    }
}

#[derive(Debug)]
enum Printed {
    Text(GenPtr<String>),
    Definition(DefPtr),
    Lines(GenPtr<List>),
}

#[derive(Debug)]
struct Print {
    value: Printed,
    line: usize,
}

impl Print {
    fn print(&mut self, ctx: &mut Context) -> Result<(), RuntimeMsg> {
        match &mut self.value {
            Printed::Text(g) => {
                let text = g.value(ctx)?;
                writeln!(ctx.out, "{}", text)?;
            }
            Printed::Definition(def) => {
                def.reset();
                while def.has_next(ctx)? {
                    let text = def.value()?;
                    writeln!(ctx.out, "{}", text)?;
                }
                def.reset();
            }
            Printed::Lines(g) => {
                for text in g.value(ctx)? {
                    writeln!(ctx.out, "{}", text)?;
                }
            }
        }
        Ok(())
    }
}

impl Command for Print {
    fn run(&mut self, ctx: &mut Context) -> Result<(), RuntimeError> {
        self.print(ctx).map_err(|e| e.at(self.line))
    }
}

/// `sleep 2 seconds`, `sleep 500` (milliseconds).
pub struct SleepFactory;

impl CommandFactory for SleepFactory {
    fn is_command(&self, tks: Tokens) -> bool {
        tks.first().is_keyword(Keyword::Sleep)
    }

    fn build_command(
        &self,
        tks: Tokens,
        ctx: &mut Context,
        _vocabulary: &Vocabulary,
    ) -> Result<ComPtr, SyntaxError> {
        let line = tks.line();
        let value = tks.trim_left();
        if value.is_empty() {
            return Err(SyntaxError::new(
                "keyword 'sleep' is not followed by a period or a number",
                line,
            ));
        }
        let duration = if let Some(g) = parse::<Period>(value, ctx)? {
            Pause::Period(g)
        } else if let Some(g) = parse::<Number>(value, ctx)? {
            Pause::Millis(g)
        } else {
            return Err(SyntaxError::new(
                format!("'{}' is neither a period nor a number of milliseconds", value),
                line,
            ));
        };
        Ok(Box::new(Sleep { duration, line }))
    }
}

#[derive(Debug)]
enum Pause {
    Period(GenPtr<Period>),
    Millis(GenPtr<Number>),
}

#[derive(Debug)]
struct Sleep {
    duration: Pause,
    line: usize,
}

// longest uninterrupted sleep, in milliseconds
const SLEEP_CHUNK: u64 = 50;

impl Command for Sleep {
    fn run(&mut self, ctx: &mut Context) -> Result<(), RuntimeError> {
        let millis = match &mut self.duration {
            Pause::Period(g) => g.value(ctx).map_err(|e| e.at(self.line))?.to_seconds() * 1000,
            Pause::Millis(g) => g.value(ctx).map_err(|e| e.at(self.line))?.to_i64(),
        };
        let mut left = millis.max(0) as u64;
        while left > 0 && ctx.is_running() {
            let chunk = left.min(SLEEP_CHUNK);
            std::thread::sleep(std::time::Duration::from_millis(chunk));
            left -= chunk;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use crate::command::tests::{output, syntax_error};

    #[test]
    fn print_values() {
        assert_eq!(output("print 'a' + 'b'"), "ab\n");
        assert_eq!(output("print 2 + 3"), "5\n");
        assert_eq!(output("print 1 < 2"), "1\n");
        assert_eq!(output("print 'x', 'y'"), "x\ny\n");
        assert_eq!(output("'a', 'b' { print }"), "a\nb\n");
        assert_eq!(output("1, 2 { print this * 10 }"), "10\n20\n");
    }

    #[test]
    fn print_needs_a_subject() {
        let err = syntax_error("print");
        assert!(err.msg.contains("undefined here"), "{}", err.msg);
    }

    #[test]
    fn control_keywords() {
        assert_eq!(output("3 times { print index; break }"), "0\n");
        assert_eq!(output("print 1; error 3; print 2"), "1\n");
        assert!(syntax_error("break").msg.contains("outside of a loop"));
        assert!(syntax_error("3 times { continue 1 }").msg.contains("cannot be followed"));
    }

    #[test]
    fn sleep_waits() {
        let start = Instant::now();
        assert_eq!(output("sleep 30; print 'done'"), "done\n");
        assert!(start.elapsed().as_millis() >= 30);
        assert!(syntax_error("sleep 'long'").msg.contains("neither"));
    }
}
