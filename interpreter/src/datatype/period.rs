use std::cmp::Ordering;
use std::fmt::{Display, Error, Formatter};
use std::ops::{Add, Neg, Sub};

pub const SECONDS_PER_MINUTE: i64 = 60;
pub const SECONDS_PER_HOUR: i64 = 3600;
pub const SECONDS_PER_DAY: i64 = 86400;
pub const SECONDS_PER_WEEK: i64 = 7 * SECONDS_PER_DAY;
pub const SECONDS_PER_MONTH: i64 = 30 * SECONDS_PER_DAY;
pub const SECONDS_PER_YEAR: i64 = 365 * SECONDS_PER_DAY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodUnit {
    Years,
    Months,
    Weeks,
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl PeriodUnit {
    /// Resolve `day`/`days` style words. Returns the unit and whether the word was plural.
    pub fn from_word(word: &str) -> Option<(Self, bool)> {
        let lower = word.to_lowercase();
        let unit = match lower.trim_end_matches('s') {
            "year" => Self::Years,
            "month" => Self::Months,
            "week" => Self::Weeks,
            "day" => Self::Days,
            "hour" => Self::Hours,
            "minute" => Self::Minutes,
            "second" => Self::Seconds,
            _ => return None,
        };
        Some((unit, lower.ends_with('s')))
    }

    fn names(&self) -> (&'static str, &'static str) {
        match self {
            Self::Years => ("year", "years"),
            Self::Months => ("month", "months"),
            Self::Weeks => ("week", "weeks"),
            Self::Days => ("day", "days"),
            Self::Hours => ("hour", "hours"),
            Self::Minutes => ("minute", "minutes"),
            Self::Seconds => ("second", "seconds"),
        }
    }
}

/// Signed duration kept per unit; units are never carried into each other,
/// so `25 hours` stays `25 hours` rather than becoming `1 day 1 hour`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Period {
    pub years: i64,
    pub months: i64,
    pub weeks: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Period {
    pub fn new(value: i64, unit: PeriodUnit) -> Self {
        let mut p = Self::default();
        *p.unit_mut(unit) = value;
        p
    }

    pub fn unit(&self, unit: PeriodUnit) -> i64 {
        match unit {
            PeriodUnit::Years => self.years,
            PeriodUnit::Months => self.months,
            PeriodUnit::Weeks => self.weeks,
            PeriodUnit::Days => self.days,
            PeriodUnit::Hours => self.hours,
            PeriodUnit::Minutes => self.minutes,
            PeriodUnit::Seconds => self.seconds,
        }
    }

    fn unit_mut(&mut self, unit: PeriodUnit) -> &mut i64 {
        match unit {
            PeriodUnit::Years => &mut self.years,
            PeriodUnit::Months => &mut self.months,
            PeriodUnit::Weeks => &mut self.weeks,
            PeriodUnit::Days => &mut self.days,
            PeriodUnit::Hours => &mut self.hours,
            PeriodUnit::Minutes => &mut self.minutes,
            PeriodUnit::Seconds => &mut self.seconds,
        }
    }

    pub fn is_empty(&self) -> bool {
        UNITS.iter().all(|u| self.unit(*u) == 0)
    }

    /// Approximate length in seconds (year = 365 days, month = 30 days).
    pub fn to_seconds(&self) -> i64 {
        self.years
            .saturating_mul(SECONDS_PER_YEAR)
            .saturating_add(self.months.saturating_mul(SECONDS_PER_MONTH))
            .saturating_add(self.weeks.saturating_mul(SECONDS_PER_WEEK))
            .saturating_add(self.days.saturating_mul(SECONDS_PER_DAY))
            .saturating_add(self.hours.saturating_mul(SECONDS_PER_HOUR))
            .saturating_add(self.minutes.saturating_mul(SECONDS_PER_MINUTE))
            .saturating_add(self.seconds)
    }

    /// Exact clock difference split into days, hours, minutes and seconds.
    pub fn from_seconds(total: i64) -> Self {
        let sign = if total < 0 { -1 } else { 1 };
        let mut rest = total.abs();
        let days = rest / SECONDS_PER_DAY;
        rest %= SECONDS_PER_DAY;
        let hours = rest / SECONDS_PER_HOUR;
        rest %= SECONDS_PER_HOUR;
        let minutes = rest / SECONDS_PER_MINUTE;
        let seconds = rest % SECONDS_PER_MINUTE;
        Self {
            days: sign * days,
            hours: sign * hours,
            minutes: sign * minutes,
            seconds: sign * seconds,
            ..Default::default()
        }
    }

    pub fn scaled(&self, factor: i64) -> Self {
        let mut p = *self;
        for unit in UNITS {
            *p.unit_mut(unit) = self.unit(unit).saturating_mul(factor);
        }
        p
    }
}

pub const UNITS: [PeriodUnit; 7] = [
    PeriodUnit::Years,
    PeriodUnit::Months,
    PeriodUnit::Weeks,
    PeriodUnit::Days,
    PeriodUnit::Hours,
    PeriodUnit::Minutes,
    PeriodUnit::Seconds,
];

impl Add for Period {
    type Output = Period;

    fn add(self, other: Self) -> Self {
        let mut p = self;
        for unit in UNITS {
            *p.unit_mut(unit) = self.unit(unit).saturating_add(other.unit(unit));
        }
        p
    }
}

impl Sub for Period {
    type Output = Period;

    fn sub(self, other: Self) -> Self {
        self + (-other)
    }
}

impl Neg for Period {
    type Output = Period;

    fn neg(self) -> Self {
        self.scaled(-1)
    }
}

impl PartialEq for Period {
    fn eq(&self, other: &Self) -> bool {
        self.to_seconds() == other.to_seconds()
    }
}

impl Eq for Period {}

impl PartialOrd for Period {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Period {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_seconds().cmp(&other.to_seconds())
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        let mut first = true;
        for unit in UNITS {
            let v = self.unit(unit);
            if v == 0 {
                continue;
            }
            if !first {
                write!(f, " ")?;
            }
            let (single, plural) = unit.names();
            write!(f, "{} {}", v, if v == 1 || v == -1 { single } else { plural })?;
            first = false;
        }
        if first {
            write!(f, "no period")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_units() {
        let p = Period::new(3, PeriodUnit::Days) + Period::new(1, PeriodUnit::Hours);
        assert_eq!(p.to_string(), "3 days 1 hour");
        assert_eq!(Period::default().to_string(), "no period");
        assert_eq!((-Period::new(2, PeriodUnit::Weeks)).to_string(), "-2 weeks");
    }

    #[test]
    fn comparison_uses_length() {
        assert_eq!(Period::new(1, PeriodUnit::Weeks), Period::new(7, PeriodUnit::Days));
        assert!(Period::new(25, PeriodUnit::Hours) > Period::new(1, PeriodUnit::Days));
    }

    #[test]
    fn unit_words() {
        assert_eq!(PeriodUnit::from_word("Days"), Some((PeriodUnit::Days, true)));
        assert_eq!(PeriodUnit::from_word("minute"), Some((PeriodUnit::Minutes, false)));
        assert_eq!(PeriodUnit::from_word("fortnight"), None);
    }

    #[test]
    fn split_seconds() {
        let p = Period::from_seconds(-(SECONDS_PER_DAY + 61));
        assert_eq!((p.days, p.hours, p.minutes, p.seconds), (-1, 0, -1, -1));
    }
}
