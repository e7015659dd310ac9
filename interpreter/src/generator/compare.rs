use std::cmp::Ordering;
use std::fmt::{Debug, Display, Error, Formatter};

use super::{GenPtr, Generator};
use crate::context::Context;
use crate::datatype::{Number, Period, Time};
use crate::lang::RuntimeMsg;

/// Values usable on both sides of `= != < <= > >=`.
pub trait Comparable {
    /// `None` when the two values cannot be ordered (NaN, times without a common precision).
    fn compare(&self, other: &Self) -> Option<Ordering>;

    fn equals(&self, other: &Self) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }
}

impl Comparable for bool {
    fn compare(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Comparable for Number {
    fn compare(&self, other: &Self) -> Option<Ordering> {
        self.partial_cmp(other)
    }
}

impl Comparable for String {
    fn compare(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Comparable for Period {
    fn compare(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Comparable for Time {
    fn compare(&self, other: &Self) -> Option<Ordering> {
        Time::compare(self, other)
    }

    fn equals(&self, other: &Self) -> bool {
        (self.is_never() && other.is_never()) || self == other
    }
}

/// Collections compare element by element; a shorter prefix sorts first.
impl<T: Comparable> Comparable for Vec<T> {
    fn compare(&self, other: &Self) -> Option<Ordering> {
        for (a, b) in self.iter().zip(other.iter()) {
            match a.compare(b)? {
                Ordering::Equal => continue,
                ord => return Some(ord),
            }
        }
        Some(self.len().cmp(&other.len()))
    }

    fn equals(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a.equals(b))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Equals,
    NotEquals,
    Smaller,
    SmallerEquals,
    Bigger,
    BiggerEquals,
}

impl CompareOp {
    pub fn test<T: Comparable>(&self, left: &T, right: &T) -> bool {
        match self {
            Self::Equals => left.equals(right),
            Self::NotEquals => !left.equals(right),
            Self::Smaller => left.compare(right) == Some(Ordering::Less),
            Self::SmallerEquals => matches!(
                left.compare(right),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Self::Bigger => left.compare(right) == Some(Ordering::Greater),
            Self::BiggerEquals => matches!(
                left.compare(right),
                Some(Ordering::Greater | Ordering::Equal)
            ),
        }
    }

    /// Same test with the operands swapped.
    pub fn mirrored(&self) -> Self {
        match self {
            Self::Smaller => Self::Bigger,
            Self::SmallerEquals => Self::BiggerEquals,
            Self::Bigger => Self::Smaller,
            Self::BiggerEquals => Self::SmallerEquals,
            other => *other,
        }
    }
}

impl Display for CompareOp {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        let s = match self {
            Self::Equals => "=",
            Self::NotEquals => "!=",
            Self::Smaller => "<",
            Self::SmallerEquals => "<=",
            Self::Bigger => ">",
            Self::BiggerEquals => ">=",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug)]
pub struct Comparison<T> {
    left: GenPtr<T>,
    right: GenPtr<T>,
    op: CompareOp,
}

impl<T> Comparison<T> {
    pub fn new(left: GenPtr<T>, right: GenPtr<T>, op: CompareOp) -> Self {
        Self { left, right, op }
    }
}

impl<T: Comparable + Debug> Generator<bool> for Comparison<T> {
    fn value(&mut self, ctx: &mut Context) -> Result<bool, RuntimeMsg> {
        let left = self.left.value(ctx)?;
        let right = self.right.value(ctx)?;
        Ok(self.op.test(&left, &right))
    }

    fn is_constant(&self) -> bool {
        self.left.is_constant() && self.right.is_constant()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::TimeKind;

    #[test]
    fn nan_is_never_ordered() {
        assert!(!CompareOp::Equals.test(&Number::NaN, &Number::NaN));
        assert!(CompareOp::NotEquals.test(&Number::NaN, &Number::Int(1)));
        assert!(!CompareOp::Smaller.test(&Number::NaN, &Number::Int(1)));
        assert!(!CompareOp::BiggerEquals.test(&Number::NaN, &Number::Int(1)));
    }

    #[test]
    fn collections_are_lexicographic() {
        let a = vec![Number::Int(1), Number::Int(2)];
        let b = vec![Number::Int(1), Number::Int(3)];
        let c = vec![Number::Int(1)];
        assert!(CompareOp::Smaller.test(&a, &b));
        assert!(CompareOp::Bigger.test(&a, &c));
        assert!(CompareOp::Equals.test(&a, &a.clone()));
        assert!(!CompareOp::Equals.test(&a, &c));
    }

    #[test]
    fn times_compare_at_common_precision() {
        let day = Time::date(5, 3, 2021);
        let moment = Time::date_clock(5, 3, 2021, 10, 0, 0);
        assert!(CompareOp::Equals.test(&day, &moment));
        assert!(CompareOp::Equals.test(&Time::never(), &Time::never()));
        assert_eq!(Time::never().kind, TimeKind::Never);
        assert!(!CompareOp::Smaller.test(&Time::never(), &day));
    }
}
