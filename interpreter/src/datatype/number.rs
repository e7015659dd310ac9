use std::cmp::Ordering;
use std::fmt::{Display, Error, Formatter};
use std::ops::{Add, Div, Mul, Neg, Rem, Sub};

/// Integer-or-double number with an explicit not-a-number state.
///
/// Every operation producing an integral double collapses back to `Int`,
/// so `2.5 * 2` is stored (and printed) as `5`.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i64),
    Double(f64),
    NaN,
}

impl Number {
    pub fn from_double(d: f64) -> Self {
        if !d.is_finite() {
            Self::NaN
        } else if d.fract() == 0.0 && d >= i64::MIN as f64 && d <= i64::MAX as f64 {
            Self::Int(d as i64)
        } else {
            Self::Double(d)
        }
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, Self::NaN)
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Self::Int(i) => *i == 0,
            Self::Double(d) => *d == 0.0,
            Self::NaN => false,
        }
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Self::Int(_))
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Self::Int(i) => *i as f64,
            Self::Double(d) => *d,
            Self::NaN => f64::NAN,
        }
    }

    /// Truncating conversion; NaN becomes zero.
    pub fn to_i64(&self) -> i64 {
        match self {
            Self::Int(i) => *i,
            Self::Double(d) => d.trunc() as i64,
            Self::NaN => 0,
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if let Ok(i) = text.parse::<i64>() {
            return Some(Self::Int(i));
        }
        if text
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == '-' || c == '+')
        {
            if let Ok(d) = text.parse::<f64>() {
                return Some(Self::from_double(d));
            }
        }
        None
    }

    /// Total order used for sorting: NaN goes first, then numeric order.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::NaN, Self::NaN) => Ordering::Equal,
            (Self::NaN, _) => Ordering::Less,
            (_, Self::NaN) => Ordering::Greater,
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (a, b) => a.to_f64().total_cmp(&b.to_f64()),
        }
    }

    pub fn abs(self) -> Self {
        match self {
            Self::Int(i) => i.checked_abs().map(Self::Int).unwrap_or(Self::Double(-(i as f64))),
            Self::Double(d) => Self::Double(d.abs()),
            Self::NaN => Self::NaN,
        }
    }

    pub fn sign(self) -> Self {
        match self {
            Self::Int(i) => Self::Int(i.signum()),
            Self::Double(d) if d > 0.0 => Self::Int(1),
            Self::Double(d) if d < 0.0 => Self::Int(-1),
            Self::Double(_) => Self::Int(0),
            Self::NaN => Self::NaN,
        }
    }

    pub fn map_double<F: Fn(f64) -> f64>(self, f: F) -> Self {
        match self {
            Self::NaN => Self::NaN,
            n => Self::from_double(f(n.to_f64())),
        }
    }

    fn combine<I, D>(self, other: Self, int_op: I, double_op: D) -> Self
    where
        I: Fn(i64, i64) -> Option<i64>,
        D: Fn(f64, f64) -> f64,
    {
        match (self, other) {
            (Self::NaN, _) | (_, Self::NaN) => Self::NaN,
            (Self::Int(a), Self::Int(b)) => match int_op(a, b) {
                Some(v) => Self::Int(v),
                None => Self::from_double(double_op(a as f64, b as f64)),
            },
            (a, b) => Self::from_double(double_op(a.to_f64(), b.to_f64())),
        }
    }
}

impl Default for Number {
    fn default() -> Self {
        Self::Int(0)
    }
}

impl From<i64> for Number {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<usize> for Number {
    fn from(i: usize) -> Self {
        Self::Int(i as i64)
    }
}

impl From<f64> for Number {
    fn from(d: f64) -> Self {
        Self::from_double(d)
    }
}

impl Add for Number {
    type Output = Number;

    fn add(self, other: Self) -> Self {
        self.combine(other, i64::checked_add, |a, b| a + b)
    }
}

impl Sub for Number {
    type Output = Number;

    fn sub(self, other: Self) -> Self {
        self.combine(other, i64::checked_sub, |a, b| a - b)
    }
}

impl Mul for Number {
    type Output = Number;

    fn mul(self, other: Self) -> Self {
        self.combine(other, i64::checked_mul, |a, b| a * b)
    }
}

impl Div for Number {
    type Output = Number;

    fn div(self, other: Self) -> Self {
        if other.is_zero() {
            return Self::NaN;
        }
        self.combine(
            other,
            |a, b| {
                if a.checked_rem(b)? == 0 {
                    a.checked_div(b)
                } else {
                    None
                }
            },
            |a, b| a / b,
        )
    }
}

impl Rem for Number {
    type Output = Number;

    fn rem(self, other: Self) -> Self {
        if other.is_zero() {
            return Self::NaN;
        }
        self.combine(other, i64::checked_rem, |a, b| a % b)
    }
}

impl Neg for Number {
    type Output = Number;

    fn neg(self) -> Self {
        match self {
            Self::Int(i) => i.checked_neg().map(Self::Int).unwrap_or(Self::Double(-(i as f64))),
            Self::Double(d) => Self::Double(-d),
            Self::NaN => Self::NaN,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NaN, _) | (_, Self::NaN) => false,
            (Self::Int(a), Self::Int(b)) => a == b,
            (a, b) => a.to_f64() == b.to_f64(),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::NaN, _) | (_, Self::NaN) => None,
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (a, b) => a.to_f64().partial_cmp(&b.to_f64()),
        }
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        match self {
            Self::Int(i) => write!(f, "{}", i),
            Self::Double(d) => write!(f, "{}", d),
            Self::NaN => write!(f, "NaN"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_doubles_collapse() {
        assert!(matches!(Number::Double(2.5) * Number::Int(2), Number::Int(5)));
        assert!(matches!(Number::from_double(3.0), Number::Int(3)));
    }

    #[test]
    fn division_semantics() {
        assert!(matches!(Number::Int(6) / Number::Int(3), Number::Int(2)));
        assert_eq!((Number::Int(7) / Number::Int(2)).to_string(), "3.5");
        assert!((Number::Int(7) / Number::Int(0)).is_nan());
        assert!((Number::Int(7) % Number::Double(0.0)).is_nan());
        assert!(matches!(Number::Int(7) % Number::Int(4), Number::Int(3)));
    }

    #[test]
    fn nan_is_never_equal() {
        assert_ne!(Number::NaN, Number::NaN);
        assert!(Number::NaN.partial_cmp(&Number::Int(1)).is_none());
        assert_eq!(Number::NaN.total_cmp(&Number::Int(1)), Ordering::Less);
        assert_eq!(Number::Int(2), Number::Double(2.0));
    }

    #[test]
    fn overflow_falls_back_to_double() {
        let n = Number::Int(i64::MAX) + Number::Int(1);
        assert!(matches!(n, Number::Double(_)));
    }

    #[test]
    fn parse_text() {
        assert_eq!(Number::parse(" 12 "), Some(Number::Int(12)));
        assert_eq!(Number::parse("-1.5"), Some(Number::Double(-1.5)));
        assert_eq!(Number::parse("abc"), None);
        assert_eq!(Number::parse("inf"), None);
    }
}
