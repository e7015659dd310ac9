use super::{ComPtr, Command, CommandFactory, Expression, Vocabulary};
use crate::context::Context;
use crate::datatype::{Number, Value, ValueType};
use crate::generator::ArithmeticOp;
use crate::lang::{RuntimeError, RuntimeMsg, SyntaxError};
use crate::parse::is_reserved;
use crate::tokens::{TokenKind, Tokens};

const AUGMENTED: [char; 5] = ['+', '-', '*', '/', '%'];

/// `name = value`, `name += value` and friends, `name++`, `name--`.
pub struct AssignFactory;

impl AssignFactory {
    /// Operator of an augmented assignment, `None` for a plain one.
    fn operator(tks: Tokens) -> Option<Option<char>> {
        if tks.len() >= 3 && tks.second().is_symbol('=') {
            return Some(None);
        }
        if tks.len() >= 4 && tks.at(2).is_symbol('=') {
            return tks
                .second()
                .symbol()
                .filter(|c| AUGMENTED.contains(c))
                .map(Some);
        }
        None
    }
}

impl CommandFactory for AssignFactory {
    fn is_command(&self, tks: Tokens) -> bool {
        if tks.len() < 2 || !tks.first().is_word() {
            return false;
        }
        if tks.len() == 2 {
            return matches!(tks.second().kind, TokenKind::MultiSymbol('+' | '-'));
        }
        Self::operator(tks).is_some()
    }

    fn build_command(
        &self,
        tks: Tokens,
        ctx: &mut Context,
        _vocabulary: &Vocabulary,
    ) -> Result<ComPtr, SyntaxError> {
        let line = tks.line();
        let name = tks.first().word().unwrap_or_default().to_string();
        if is_reserved(&name) {
            return Err(SyntaxError::new(
                format!("variable '{}' is immutable", name),
                line,
            ));
        }
        if tks.len() == 2 {
            let delta = if tks.second().is_multi_symbol('+') { 1 } else { -1 };
            return match ctx.variable_type(&name) {
                Some(ValueType::Number) => Ok(Box::new(Increment { name, delta, line })),
                Some(t) => Err(SyntaxError::new(
                    format!("operator {} cannot be applied to a {} variable", tks.second(), t),
                    line,
                )),
                None => Err(SyntaxError::undefined_variable(&name, line)),
            };
        }
        match Self::operator(tks) {
            Some(Some(op)) => augmented(name, op, tks.skip(3), ctx, line),
            _ => plain(name, tks.skip(2), ctx, line),
        }
    }
}

fn plain(name: String, value: Tokens, ctx: &mut Context, line: usize) -> Result<ComPtr, SyntaxError> {
    let value = match ctx.variable_type(&name) {
        Some(t) => Expression::parse_as(t, value, ctx)?.ok_or_else(|| {
            SyntaxError::new(
                format!("'{}' cannot be assigned to the {} variable '{}'", value, t, name),
                line,
            )
        })?,
        None => {
            let e = Expression::parse(value, ctx)?.ok_or_else(|| {
                SyntaxError::new(
                    format!("value of '{}' cannot be resolved", value),
                    line,
                )
            })?;
            // declared only now, so the right side cannot read the new variable
            ctx.declare_variable(&name, e.value_type());
            e
        }
    };
    Ok(Box::new(Assign { name, value, line }))
}

/// Type of the right side accepted by `op=` on a variable of type `t`.
fn operand_type(t: ValueType, op: char) -> Option<ValueType> {
    match (t, op) {
        (ValueType::Number, _) => Some(ValueType::Number),
        (ValueType::Period, '+' | '-') => Some(ValueType::Period),
        (ValueType::Period, '*') => Some(ValueType::Number),
        (ValueType::Time, '+' | '-') => Some(ValueType::Period),
        (ValueType::String, '+') => Some(ValueType::String),
        (ValueType::List | ValueType::NumList | ValueType::TimeList, '+') => Some(t),
        _ => None,
    }
}

fn augmented(
    name: String,
    op: char,
    value: Tokens,
    ctx: &mut Context,
    line: usize,
) -> Result<ComPtr, SyntaxError> {
    let t = ctx
        .variable_type(&name)
        .ok_or_else(|| SyntaxError::undefined_variable(&name, line))?;
    let operand = operand_type(t, op).ok_or_else(|| {
        SyntaxError::new(
            format!("operator {}= cannot be applied to the {} variable '{}'", op, t, name),
            line,
        )
    })?;
    let value = Expression::parse_as(operand, value, ctx)?.ok_or_else(|| {
        SyntaxError::new(
            format!("right side of operator {}= is not a {}", op, operand),
            line,
        )
    })?;
    Ok(Box::new(Augment {
        name,
        t,
        op,
        value,
        line,
    }))
}

fn combine(current: Value, op: char, operand: Value) -> Result<Value, RuntimeMsg> {
    Ok(match (current, op, operand) {
        (Value::Number(a), op, Value::Number(b)) => match ArithmeticOp::from_symbol(op) {
            Some(op) => Value::Number(op.apply(a, b)),
            None => return Err(RuntimeMsg(format!("unknown operator {}", op))),
        },
        (Value::Period(a), '+', Value::Period(b)) => Value::Period(a + b),
        (Value::Period(a), '-', Value::Period(b)) => Value::Period(a - b),
        (Value::Period(a), '*', Value::Number(n)) => Value::Period(a.scaled(n.to_i64())),
        (Value::Time(mut t), '+', Value::Period(p)) => {
            t.add_period(&p);
            Value::Time(t)
        }
        (Value::Time(mut t), '-', Value::Period(p)) => {
            t.add_period(&-p);
            Value::Time(t)
        }
        (Value::String(a), '+', Value::String(b)) => Value::String(a + &b),
        (Value::List(mut a), '+', Value::List(b)) => {
            a.extend(b);
            Value::List(a)
        }
        (Value::NumList(mut a), '+', Value::NumList(b)) => {
            a.extend(b);
            Value::NumList(a)
        }
        (Value::TimeList(mut a), '+', Value::TimeList(b)) => {
            a.extend(b);
            Value::TimeList(a)
        }
        (current, op, operand) => {
            return Err(RuntimeMsg(format!(
                "operator {}= cannot combine {} with {}",
                op,
                current.value_type(),
                operand.value_type()
            )))
        }
    })
}

#[derive(Debug)]
struct Assign {
    name: String,
    value: Expression,
    line: usize,
}

impl Command for Assign {
    fn run(&mut self, ctx: &mut Context) -> Result<(), RuntimeError> {
        let value = self.value.value(ctx).map_err(|e| e.at(self.line))?;
        ctx.variables
            .assign(&self.name, value)
            .map_err(|e| e.at(self.line))
    }
}

#[derive(Debug)]
struct Augment {
    name: String,
    t: ValueType,
    op: char,
    value: Expression,
    line: usize,
}

impl Command for Augment {
    fn run(&mut self, ctx: &mut Context) -> Result<(), RuntimeError> {
        let operand = self.value.value(ctx).map_err(|e| e.at(self.line))?;
        let current = ctx
            .variables
            .get_opt(&self.name)
            .cloned()
            .unwrap_or_else(|| Value::default_of(self.t));
        let value = combine(current, self.op, operand).map_err(|e| e.at(self.line))?;
        ctx.variables
            .assign(&self.name, value)
            .map_err(|e| e.at(self.line))
    }
}

#[derive(Debug)]
struct Increment {
    name: String,
    delta: i64,
    line: usize,
}

impl Command for Increment {
    fn run(&mut self, ctx: &mut Context) -> Result<(), RuntimeError> {
        let current = match ctx.variables.get_opt(&self.name) {
            Some(Value::Number(n)) => *n,
            _ => Number::default(),
        };
        ctx.variables
            .assign(&self.name, Value::Number(current + Number::Int(self.delta)))
            .map_err(|e| e.at(self.line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::tests::{output, syntax_error};

    #[test]
    fn plain_and_augmented() {
        assert_eq!(output("x = 2; x += 3; x *= 2; x -= 1; print x"), "9\n");
        assert_eq!(output("s = 'a'; s += 'b'; print s"), "ab\n");
        assert_eq!(output("n = 1; n++; n++; n--; print n"), "2\n");
        assert_eq!(output("l = 'a', 'b'; l += 'c'; print l"), "a\nb\nc\n");
        assert_eq!(output("p = 2 days; p *= 3; print p = 6 days"), "1\n");
    }

    #[test]
    fn variables_keep_their_type() {
        assert_eq!(output("x = 1; x = 5; print x"), "5\n");
        assert!(syntax_error("x = 1; x = 'a'").msg.contains("number variable 'x'"));
        assert!(syntax_error("this = 1").msg.contains("immutable"));
        assert!(syntax_error("y += 1").msg.contains("does not exist"));
        assert!(syntax_error("s = 'a'; s -= 'b'").msg.contains("cannot be applied"));
        assert!(syntax_error("s = 'a'; s++").msg.contains("cannot be applied"));
        assert!(syntax_error("z = z + 1").msg.contains("cannot be resolved"));
    }

    #[test]
    fn operands_follow_the_variable_type() {
        assert_eq!(operand_type(ValueType::Time, '+'), Some(ValueType::Period));
        assert_eq!(operand_type(ValueType::Period, '*'), Some(ValueType::Number));
        assert_eq!(operand_type(ValueType::String, '*'), None);
        assert_eq!(
            combine(Value::Number(Number::Int(7)), '%', Value::Number(Number::Int(4))),
            Ok(Value::Number(Number::Int(3)))
        );
    }
}
