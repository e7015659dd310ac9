use std::cmp::Ordering;
use std::fmt::{Display, Error, Formatter};
use std::time::SystemTime;

use chrono::{Datelike, Local, NaiveDate, Timelike};

use super::period::{Period, PeriodUnit, SECONDS_PER_DAY};

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Precision of a time value. Variants are ordered from date-only to clock-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum TimeKind {
    #[default]
    Never,
    YearMonth,
    Date,
    DateShortClock,
    DateClock,
    ShortClock,
    Clock,
}

impl TimeKind {
    pub fn has_date(&self) -> bool {
        matches!(
            self,
            Self::YearMonth | Self::Date | Self::DateShortClock | Self::DateClock
        )
    }

    pub fn has_clock(&self) -> bool {
        matches!(
            self,
            Self::DateShortClock | Self::DateClock | Self::ShortClock | Self::Clock
        )
    }

    fn has_seconds(&self) -> bool {
        matches!(self, Self::DateClock | Self::Clock)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Time {
    pub kind: TimeKind,
    pub year: i64,
    pub month: i64,
    pub day: i64,
    pub hour: i64,
    pub minute: i64,
    pub second: i64,
}

pub fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_month(month: i64, year: i64) -> i64 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

pub fn month_name(month: i64) -> &'static str {
    MONTH_NAMES
        .get((month - 1).clamp(0, 11) as usize)
        .copied()
        .unwrap_or("")
}

pub fn weekday_name(weekday: i64) -> &'static str {
    WEEKDAY_NAMES
        .get((weekday - 1).clamp(0, 6) as usize)
        .copied()
        .unwrap_or("")
}

impl Time {
    pub fn never() -> Self {
        Self::default()
    }

    pub fn year_month(month: i64, year: i64) -> Self {
        Self {
            kind: TimeKind::YearMonth,
            year,
            month,
            day: 1,
            ..Default::default()
        }
    }

    pub fn date(day: i64, month: i64, year: i64) -> Self {
        Self {
            kind: TimeKind::Date,
            year,
            month,
            day,
            ..Default::default()
        }
    }

    pub fn date_short_clock(day: i64, month: i64, year: i64, hour: i64, minute: i64) -> Self {
        Self {
            kind: TimeKind::DateShortClock,
            year,
            month,
            day,
            hour,
            minute,
            second: 0,
        }
    }

    pub fn date_clock(
        day: i64,
        month: i64,
        year: i64,
        hour: i64,
        minute: i64,
        second: i64,
    ) -> Self {
        Self {
            kind: TimeKind::DateClock,
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    pub fn short_clock(hour: i64, minute: i64) -> Self {
        Self {
            kind: TimeKind::ShortClock,
            hour,
            minute,
            ..Default::default()
        }
    }

    pub fn clock(hour: i64, minute: i64, second: i64) -> Self {
        Self {
            kind: TimeKind::Clock,
            hour,
            minute,
            second,
            ..Default::default()
        }
    }

    pub fn now() -> Self {
        let now = Local::now();
        Self::date_clock(
            now.day() as i64,
            now.month() as i64,
            now.year() as i64,
            now.hour() as i64,
            now.minute() as i64,
            now.second() as i64,
        )
    }

    pub fn today() -> Self {
        Self::now().to_date()
    }

    pub fn from_system(time: SystemTime) -> Self {
        let local: chrono::DateTime<Local> = time.into();
        Self::date_clock(
            local.day() as i64,
            local.month() as i64,
            local.year() as i64,
            local.hour() as i64,
            local.minute() as i64,
            local.second() as i64,
        )
    }

    pub fn is_never(&self) -> bool {
        self.kind == TimeKind::Never
    }

    pub fn to_date(&self) -> Self {
        match self.kind {
            TimeKind::Never | TimeKind::ShortClock | TimeKind::Clock => Self::never(),
            TimeKind::YearMonth => *self,
            _ => Self::date(self.day, self.month, self.year),
        }
    }

    /// Day of week, Monday = 1 ... Sunday = 7. Zero when the time has no full date.
    pub fn weekday(&self) -> i64 {
        match self.kind {
            TimeKind::Date | TimeKind::DateShortClock | TimeKind::DateClock => {
                self.naive_date()
                    .map(|d| d.weekday().number_from_monday() as i64)
                    .unwrap_or(0)
            }
            _ => 0,
        }
    }

    fn naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(
            i32::try_from(self.year).ok()?,
            u32::try_from(self.month).ok()?,
            u32::try_from(self.day.max(1)).ok()?,
        )
    }

    fn seconds_of_day(&self) -> i64 {
        self.hour * 3600 + self.minute * 60 + self.second
    }

    /// Seconds elapsed since the common era, for differences between two dated times.
    fn absolute_seconds(&self) -> Option<i64> {
        let date = self.naive_date()?;
        Some(date.num_days_from_ce() as i64 * SECONDS_PER_DAY + self.seconds_of_day())
    }

    pub fn add_period(&mut self, period: &Period) {
        self.add_seconds(period.seconds);
        self.add_minutes(period.minutes);
        self.add_hours(period.hours);
        self.add_days(period.days);
        self.add_weeks(period.weeks);
        self.add_months(period.months);
        self.add_years(period.years);
    }

    pub fn add_unit(&mut self, value: i64, unit: PeriodUnit) {
        self.add_period(&Period::new(value, unit))
    }

    fn add_years(&mut self, y: i64) {
        if !self.kind.has_date() || y == 0 {
            return;
        }
        self.year = match self.year.checked_add(y) {
            Some(year) => year,
            None => {
                *self = Self::never();
                return;
            }
        };
        if self.kind != TimeKind::YearMonth && self.month == 2 && self.day == 29 && !is_leap_year(self.year) {
            self.day = 28;
        }
        self.settle();
    }

    fn add_months(&mut self, m: i64) {
        if !self.kind.has_date() || m == 0 {
            return;
        }
        let total = match self
            .year
            .checked_mul(12)
            .and_then(|months| months.checked_add(self.month - 1))
            .and_then(|months| months.checked_add(m))
        {
            Some(total) => total,
            None => {
                *self = Self::never();
                return;
            }
        };
        self.year = total.div_euclid(12);
        self.month = total.rem_euclid(12) + 1;
        if self.kind != TimeKind::YearMonth {
            let max = days_in_month(self.month, self.year);
            if self.day > max {
                self.day = max;
            }
        }
        self.settle();
    }

    /// Dates outside the calendar collapse to `never`.
    fn settle(&mut self) {
        if self.naive_date().is_none() {
            *self = Self::never();
        }
    }

    fn add_weeks(&mut self, w: i64) {
        match w.checked_mul(7) {
            Some(d) => self.add_days(d),
            None if self.kind.has_date() => *self = Self::never(),
            None => {}
        }
    }

    fn add_days(&mut self, d: i64) {
        if !self.kind.has_date() || d == 0 {
            return;
        }
        if self.kind == TimeKind::YearMonth {
            self.day = if d < 0 { 1 } else { days_in_month(self.month, self.year) };
            self.kind = TimeKind::Date;
        }
        match self.naive_date().and_then(|date| {
            if d > 0 {
                date.checked_add_days(chrono::Days::new(d as u64))
            } else {
                date.checked_sub_days(chrono::Days::new(d.unsigned_abs()))
            }
        }) {
            Some(date) => {
                self.year = date.year() as i64;
                self.month = date.month() as i64;
                self.day = date.day() as i64;
            }
            None => *self = Self::never(),
        }
    }

    fn init_clock(&mut self, with_seconds: bool) {
        self.kind = match self.kind {
            TimeKind::YearMonth => {
                self.day = 1;
                if with_seconds {
                    TimeKind::DateClock
                } else {
                    TimeKind::DateShortClock
                }
            }
            TimeKind::Date if with_seconds => TimeKind::DateClock,
            TimeKind::Date => TimeKind::DateShortClock,
            TimeKind::DateShortClock if with_seconds => TimeKind::DateClock,
            TimeKind::ShortClock if with_seconds => TimeKind::Clock,
            other => other,
        }
    }

    fn add_hours(&mut self, h: i64) {
        if self.is_never() || h == 0 {
            return;
        }
        self.init_clock(false);
        // whole days split off first so the sum stays small
        let total = self.hour + h.rem_euclid(24);
        self.hour = total % 24;
        let days = h.div_euclid(24) + total / 24;
        if self.kind.has_date() {
            self.add_days(days);
        }
    }

    fn add_minutes(&mut self, m: i64) {
        if self.is_never() || m == 0 {
            return;
        }
        self.init_clock(false);
        let total = self.minute + m.rem_euclid(60);
        self.minute = total % 60;
        self.add_hours(m.div_euclid(60) + total / 60);
    }

    fn add_seconds(&mut self, s: i64) {
        if self.is_never() || s == 0 {
            return;
        }
        self.init_clock(true);
        let total = self.second + s.rem_euclid(60);
        self.second = total % 60;
        self.add_minutes(s.div_euclid(60) + total / 60);
    }

    /// Compare at the precision both values share. `None` when the values
    /// have nothing in common (a clock against a date, or `never`).
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        if self.is_never() || other.is_never() {
            return None;
        }
        if self.kind.has_date() && other.kind.has_date() {
            let ord = self
                .year
                .cmp(&other.year)
                .then(self.month.cmp(&other.month));
            if ord != Ordering::Equal
                || self.kind == TimeKind::YearMonth
                || other.kind == TimeKind::YearMonth
            {
                return Some(ord);
            }
            let ord = self.day.cmp(&other.day);
            if ord != Ordering::Equal || !self.kind.has_clock() || !other.kind.has_clock() {
                return Some(ord);
            }
        } else if !(self.kind.has_clock() && other.kind.has_clock()) {
            return None;
        }
        let ord = self
            .hour
            .cmp(&other.hour)
            .then(self.minute.cmp(&other.minute));
        if ord != Ordering::Equal || !self.kind.has_seconds() || !other.kind.has_seconds() {
            return Some(ord);
        }
        Some(self.second.cmp(&other.second))
    }

    /// Total order for sorting: `never` first, then by the full stored value.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self.is_never(), other.is_never()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => self.compare(other).unwrap_or_else(|| self.kind.cmp(&other.kind)),
        }
    }

    pub fn difference(&self, other: &Self) -> Period {
        if self.kind.has_date() && other.kind.has_date() {
            match (self.absolute_seconds(), other.absolute_seconds()) {
                (Some(a), Some(b)) => Period::from_seconds(a - b),
                _ => Period::default(),
            }
        } else if self.kind.has_clock() && other.kind.has_clock() {
            Period::from_seconds(self.seconds_of_day() - other.seconds_of_day())
        } else {
            Period::default()
        }
    }
}

impl PartialEq for Time {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Time {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other)
    }
}

impl Display for Time {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        match self.kind {
            TimeKind::Never => write!(f, "never"),
            TimeKind::ShortClock => write!(f, "{:02}:{:02}", self.hour, self.minute),
            TimeKind::Clock => write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second),
            TimeKind::YearMonth => write!(f, "{} {}", month_name(self.month), self.year),
            TimeKind::Date => write!(f, "{} {} {}", self.day, month_name(self.month), self.year),
            TimeKind::DateShortClock => write!(
                f,
                "{} {} {}, {:02}:{:02}",
                self.day,
                month_name(self.month),
                self.year,
                self.hour,
                self.minute
            ),
            TimeKind::DateClock => write!(
                f,
                "{} {} {}, {:02}:{:02}:{:02}",
                self.day,
                month_name(self.month),
                self.year,
                self.hour,
                self.minute,
                self.second
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_precisions() {
        assert_eq!(Time::date(5, 6, 2020).to_string(), "5 June 2020");
        assert_eq!(Time::year_month(12, 1999).to_string(), "December 1999");
        assert_eq!(
            Time::date_short_clock(1, 1, 2000, 9, 5).to_string(),
            "1 January 2000, 09:05"
        );
        assert_eq!(Time::clock(23, 59, 1).to_string(), "23:59:01");
        assert_eq!(Time::never().to_string(), "never");
    }

    #[test]
    fn common_precision_comparison() {
        assert_eq!(Time::year_month(6, 2020), Time::date(17, 6, 2020));
        assert_eq!(Time::date(1, 6, 2020), Time::date_clock(1, 6, 2020, 0, 0, 1));
        assert!(Time::date(1, 6, 2020) < Time::date(2, 6, 2020));
        assert!(Time::never() != Time::never());
        assert!(Time::short_clock(10, 0).partial_cmp(&Time::date(1, 1, 2000)).is_none());
    }

    #[test]
    fn period_arithmetic_carries() {
        let mut t = Time::date(31, 1, 2021);
        t.add_unit(1, PeriodUnit::Months);
        assert_eq!((t.day, t.month), (28, 2));

        let mut t = Time::date(31, 12, 2021);
        t.add_unit(1, PeriodUnit::Days);
        assert_eq!((t.day, t.month, t.year), (1, 1, 2022));

        let mut t = Time::date(1, 3, 2020);
        t.add_unit(-1, PeriodUnit::Hours);
        assert_eq!(t.kind, TimeKind::DateShortClock);
        assert_eq!((t.day, t.month, t.hour), (29, 2, 23));
    }

    #[test]
    fn huge_periods_end_in_never() {
        for unit in [PeriodUnit::Years, PeriodUnit::Months, PeriodUnit::Weeks] {
            let mut t = Time::date(1, 1, 2024);
            t.add_unit(i64::MAX, unit);
            assert!(t.is_never(), "{:?}", unit);
            let mut t = Time::date(1, 1, 2024);
            t.add_unit(i64::MIN, unit);
            assert!(t.is_never(), "{:?}", unit);
        }
        let mut t = Time::date_clock(1, 1, 2024, 23, 59, 59);
        t.add_unit(i64::MAX, PeriodUnit::Seconds);
        assert!(t.is_never());

        let mut t = Time::clock(23, 0, 0);
        t.add_unit(i64::MAX, PeriodUnit::Hours);
        assert_eq!(t.hour, (23 + i64::MAX % 24) % 24);
    }

    #[test]
    fn weekday_and_difference() {
        assert_eq!(Time::date(1, 1, 2024).weekday(), 1);
        assert_eq!(Time::date(7, 1, 2024).weekday(), 7);
        let d = Time::date(3, 1, 2024).difference(&Time::date(1, 1, 2024));
        assert_eq!(d.days, 2);
    }
}
