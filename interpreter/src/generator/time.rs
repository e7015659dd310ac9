use super::{GenPtr, Generator};
use crate::context::Context;
use crate::datatype::{Number, Period, PeriodUnit, Time};
use crate::lang::RuntimeMsg;

/// Numeric part of a time reachable with `time.member`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeField {
    Year,
    Month,
    Weekday,
    Day,
    Hour,
    Minute,
    Second,
}

impl TimeField {
    pub fn from_word(word: &str) -> Option<Self> {
        Some(match word {
            "year" | "years" => Self::Year,
            "month" | "months" => Self::Month,
            "weekday" => Self::Weekday,
            "day" | "days" => Self::Day,
            "hour" | "hours" => Self::Hour,
            "minute" | "minutes" => Self::Minute,
            "second" | "seconds" => Self::Second,
            _ => return None,
        })
    }

    fn of(&self, t: &Time) -> i64 {
        match self {
            Self::Year => t.year,
            Self::Month => t.month,
            Self::Weekday => t.weekday(),
            Self::Day => t.day,
            Self::Hour => t.hour,
            Self::Minute => t.minute,
            Self::Second => t.second,
        }
    }
}

/// `creation.year`, `t[0].hour`, ... Zero for `never`.
#[derive(Debug)]
pub struct TimeMember {
    time: GenPtr<Time>,
    field: TimeField,
}

impl TimeMember {
    pub fn new(time: GenPtr<Time>, field: TimeField) -> Self {
        Self { time, field }
    }
}

impl Generator<Number> for TimeMember {
    fn value(&mut self, ctx: &mut Context) -> Result<Number, RuntimeMsg> {
        let t = self.time.value(ctx)?;
        if t.is_never() {
            return Ok(Number::Int(0));
        }
        Ok(Number::Int(self.field.of(&t)))
    }

    fn is_constant(&self) -> bool {
        self.time.is_constant()
    }
}

/// `n days`, `2.5 hours` (fraction truncated).
#[derive(Debug)]
pub struct PeriodUnitValue {
    amount: GenPtr<Number>,
    unit: PeriodUnit,
}

impl PeriodUnitValue {
    pub fn new(amount: GenPtr<Number>, unit: PeriodUnit) -> Self {
        Self { amount, unit }
    }
}

impl Generator<Period> for PeriodUnitValue {
    fn value(&mut self, ctx: &mut Context) -> Result<Period, RuntimeMsg> {
        let n = self.amount.value(ctx)?;
        Ok(Period::new(n.to_i64(), self.unit))
    }

    fn is_constant(&self) -> bool {
        self.amount.is_constant()
    }
}

pub fn time_plus_period(mut t: Time, p: Period) -> Time {
    t.add_period(&p);
    t
}

pub fn time_minus_period(mut t: Time, p: Period) -> Time {
    t.add_period(&-p);
    t
}

pub fn time_difference(a: Time, b: Time) -> Period {
    a.difference(&b)
}

pub fn period_plus(a: Period, b: Period) -> Period {
    a + b
}

pub fn period_minus(a: Period, b: Period) -> Period {
    a - b
}

pub fn period_negated(p: Period) -> Period {
    -p
}

pub fn time_date(t: Time) -> Time {
    t.to_date()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Constant;

    #[test]
    fn members() {
        let mut ctx = Context::new("/");
        let t = Time::date_clock(15, 8, 2022, 13, 5, 9);
        let member = |f| TimeMember::new(Box::new(Constant::new(t)), f);
        assert_eq!(member(TimeField::Year).value(&mut ctx).unwrap(), Number::Int(2022));
        assert_eq!(member(TimeField::Weekday).value(&mut ctx).unwrap(), Number::Int(1));
        assert_eq!(member(TimeField::Second).value(&mut ctx).unwrap(), Number::Int(9));
        assert_eq!(TimeField::from_word("hours"), Some(TimeField::Hour));
        assert_eq!(TimeField::from_word("weekdays"), None);
    }

    #[test]
    fn shifting() {
        let t = Time::date(31, 1, 2021);
        let shifted = time_plus_period(t, Period::new(1, PeriodUnit::Months));
        assert_eq!(shifted.to_string(), "28 February 2021");
        let back = time_minus_period(shifted, Period::new(28, PeriodUnit::Days));
        assert_eq!(back.to_string(), "31 January 2021");
    }
}
