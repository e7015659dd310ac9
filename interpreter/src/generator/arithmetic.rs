use std::fmt::{Display, Error, Formatter};

use super::{GenPtr, Generator, Map2};
use crate::datatype::Number;

/// Operators of numeric expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl ArithmeticOp {
    pub fn from_symbol(ch: char) -> Option<Self> {
        Some(match ch {
            '+' => Self::Add,
            '-' => Self::Subtract,
            '*' => Self::Multiply,
            '/' => Self::Divide,
            '%' => Self::Modulo,
            _ => return None,
        })
    }

    /// `* / %` bind tighter than `+ -`.
    pub fn precedence(&self) -> u8 {
        match self {
            Self::Add | Self::Subtract => 1,
            _ => 2,
        }
    }

    pub fn apply(&self, left: Number, right: Number) -> Number {
        match self {
            Self::Add => left + right,
            Self::Subtract => left - right,
            Self::Multiply => left * right,
            Self::Divide => left / right,
            Self::Modulo => left % right,
        }
    }

    fn function(&self) -> fn(Number, Number) -> Number {
        match self {
            Self::Add => std::ops::Add::add,
            Self::Subtract => std::ops::Sub::sub,
            Self::Multiply => std::ops::Mul::mul,
            Self::Divide => std::ops::Div::div,
            Self::Modulo => std::ops::Rem::rem,
        }
    }

    /// Runtime node applying this operator.
    pub fn node(&self, left: GenPtr<Number>, right: GenPtr<Number>) -> GenPtr<Number> {
        Box::new(Map2::new(self.name(), left, right, self.function()))
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
            Self::Modulo => "modulo",
        }
    }
}

impl Display for ArithmeticOp {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        let ch = match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '*',
            Self::Divide => '/',
            Self::Modulo => '%',
        };
        write!(f, "{}", ch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::generator::Constant;

    #[test]
    fn node_matches_apply() {
        let mut ctx = Context::new("/");
        let mut node = ArithmeticOp::Modulo.node(
            Box::new(Constant::new(Number::Int(17))),
            Box::new(Constant::new(Number::Int(5))),
        );
        assert!(node.is_constant());
        assert_eq!(node.value(&mut ctx).unwrap(), Number::Int(2));
        assert_eq!(
            ArithmeticOp::Divide.apply(Number::Int(7), Number::Int(2)),
            Number::Double(3.5)
        );
        assert!(ArithmeticOp::Divide.apply(Number::Int(7), Number::Int(0)).is_nan());
    }
}
