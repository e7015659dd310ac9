//! Built-in functions.
//!
//! Pure functions are plain `fn`s wrapped by [super::Map] and friends at parse
//! time. Functions that read the file system, draw random numbers or drain a
//! definition are nodes of their own.

use rand::seq::SliceRandom;
use rand::Rng;

use super::{DefPtr, GenPtr, Generator};
use crate::context::{AttributeMask, Context, FrameId};
use crate::datatype::{days_in_month, month_name, weekday_name, List, NumList, Number, Time};
use crate::lang::RuntimeMsg;
use crate::processing::paths;

// bool

pub fn contains(text: String, part: String) -> bool {
    text.contains(&part)
}

pub fn contains_element<T: PartialEq>(list: Vec<T>, value: T) -> bool {
    list.contains(&value)
}

pub fn starts_with(text: String, part: String) -> bool {
    text.starts_with(&part)
}

pub fn ends_with(text: String, part: String) -> bool {
    text.ends_with(&part)
}

pub fn is_number(text: String) -> bool {
    Number::parse(&text).is_some()
}

pub fn is_nan(n: Number) -> bool {
    n.is_nan()
}

pub fn is_never(t: Time) -> bool {
    t.is_never()
}

pub fn is_lower(text: String) -> bool {
    text.chars().any(|c| c.is_alphabetic()) && !text.chars().any(|c| c.is_uppercase())
}

pub fn is_upper(text: String) -> bool {
    text.chars().any(|c| c.is_alphabetic()) && !text.chars().any(|c| c.is_lowercase())
}

pub fn is_digit(text: String) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

pub fn is_letter(text: String) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_alphabetic())
}

pub fn any<T>(list: Vec<T>) -> bool {
    !list.is_empty()
}

// number

pub fn length(text: String) -> Number {
    Number::from(text.chars().count())
}

pub fn count<T>(list: Vec<T>) -> Number {
    Number::from(list.len())
}

pub fn parse_number(text: String) -> Number {
    Number::parse(&text).unwrap_or(Number::NaN)
}

pub fn absolute(n: Number) -> Number {
    n.abs()
}

pub fn ceil(n: Number) -> Number {
    n.map_double(f64::ceil)
}

pub fn floor(n: Number) -> Number {
    n.map_double(f64::floor)
}

pub fn round(n: Number) -> Number {
    n.map_double(f64::round)
}

pub fn sign(n: Number) -> Number {
    n.sign()
}

pub fn sqrt(n: Number) -> Number {
    match n {
        Number::Int(i) if i < 0 => Number::NaN,
        Number::Double(d) if d < 0.0 => Number::NaN,
        n => n.map_double(f64::sqrt),
    }
}

pub fn power(base: Number, exponent: Number) -> Number {
    match (base, exponent) {
        (Number::NaN, _) | (_, Number::NaN) => Number::NaN,
        (Number::Int(0), e) if e.to_f64() < 0.0 => Number::NaN,
        (Number::Int(b), Number::Int(e)) if (0..=u32::MAX as i64).contains(&e) => b
            .checked_pow(e as u32)
            .map(Number::Int)
            .unwrap_or_else(|| Number::from_double((b as f64).powf(e as f64))),
        (b, e) => Number::from_double(b.to_f64().powf(e.to_f64())),
    }
}

pub fn sum(list: NumList) -> Number {
    let mut total = Number::Int(0);
    for n in list {
        if n.is_nan() {
            return Number::NaN;
        }
        total = total + n;
    }
    total
}

pub fn average(list: NumList) -> Number {
    if list.is_empty() {
        return Number::NaN;
    }
    let count = Number::from(list.len());
    sum(list) / count
}

fn extreme(list: NumList, wanted: std::cmp::Ordering) -> Number {
    let mut result: Option<Number> = None;
    for n in list {
        if n.is_nan() {
            return Number::NaN;
        }
        result = match result {
            Some(r) if n.total_cmp(&r) != wanted => Some(r),
            _ => Some(n),
        };
    }
    result.unwrap_or(Number::NaN)
}

pub fn min(list: NumList) -> Number {
    extreme(list, std::cmp::Ordering::Less)
}

pub fn max(list: NumList) -> Number {
    extreme(list, std::cmp::Ordering::Greater)
}

pub fn median(mut list: NumList) -> Number {
    if list.is_empty() || list.iter().any(|n| n.is_nan()) {
        return Number::NaN;
    }
    list.sort_by(|a, b| a.total_cmp(b));
    let half = list.len() / 2;
    if list.len() % 2 == 0 {
        (list[half - 1] + list[half]) / Number::Int(2)
    } else {
        list[half]
    }
}

// string

pub fn lower(text: String) -> String {
    text.to_lowercase()
}

pub fn upper(text: String) -> String {
    text.to_uppercase()
}

pub fn trim(text: String) -> String {
    text.trim().to_string()
}

/// First letter of every word upper case, the rest lower case.
pub fn capitalize(text: String) -> String {
    let mut result = String::with_capacity(text.len());
    let mut previous_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_letter {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            previous_letter = true;
        } else {
            result.push(c);
            previous_letter = false;
        }
    }
    result
}

pub fn reverse(text: String) -> String {
    text.chars().rev().collect()
}

fn count_arg(n: Number) -> Option<usize> {
    match n {
        Number::NaN => None,
        n if n.to_i64() <= 0 => None,
        n => Some(n.to_i64() as usize),
    }
}

pub fn left(text: String, n: Number) -> String {
    match count_arg(n) {
        Some(n) => text.chars().take(n).collect(),
        None => String::new(),
    }
}

pub fn right(text: String, n: Number) -> String {
    match count_arg(n) {
        Some(n) => {
            let length = text.chars().count();
            text.chars().skip(length.saturating_sub(n)).collect()
        }
        None => String::new(),
    }
}

/// `substring(text, index)`; a negative index counts from the end.
pub fn substring(text: String, index: Number) -> String {
    if index.is_nan() {
        return String::new();
    }
    let index = index.to_i64();
    let chars: Vec<char> = text.chars().collect();
    let length = chars.len() as i64;
    let start = if index < 0 {
        (length + index).max(0)
    } else if index >= length {
        return String::new();
    } else {
        index
    };
    chars[start as usize..].iter().collect()
}

/// `substring(text, index, count)`
pub fn substring_counted(text: String, index: Number, count: Number) -> String {
    if index.is_nan() || count.is_nan() || count.to_i64() <= 0 {
        return String::new();
    }
    let (index, count) = (index.to_i64(), count.to_i64());
    let chars: Vec<char> = text.chars().collect();
    let length = chars.len() as i64;
    let (start, end) = if index < 0 {
        let start = length + index;
        (start.max(0), start.saturating_add(count).min(length))
    } else if index >= length {
        return String::new();
    } else {
        (index, index.saturating_add(count).min(length))
    };
    if end <= start {
        return String::new();
    }
    chars[start as usize..end as usize].iter().collect()
}

pub fn replace(text: String, from: String, to: String) -> String {
    if from.is_empty() {
        text
    } else {
        text.replace(&from, &to)
    }
}

/// Longest string `repeat` builds.
const MAX_REPEATED: usize = 1 << 30;

pub fn repeat(text: String, n: Number) -> String {
    match count_arg(n) {
        Some(n) => match text.len().checked_mul(n) {
            Some(total) if total <= MAX_REPEATED => text.repeat(n),
            _ => {
                tracing::warn!("repeat({:?}, {}) would exceed {} bytes", text, n, MAX_REPEATED);
                String::new()
            }
        },
        None => String::new(),
    }
}

pub fn concatenate(list: List) -> String {
    list.concat()
}

pub fn join(list: List, separator: String) -> String {
    list.join(&separator)
}

pub fn first_char(text: String) -> String {
    text.chars().next().map(String::from).unwrap_or_default()
}

pub fn last_char(text: String) -> String {
    text.chars().last().map(String::from).unwrap_or_default()
}

pub fn first_element<T: Default>(list: Vec<T>) -> T {
    list.into_iter().next().unwrap_or_default()
}

pub fn last_element<T: Default>(list: Vec<T>) -> T {
    list.into_iter().last().unwrap_or_default()
}

pub fn month_name_of(n: Number) -> String {
    match n.to_i64() {
        m @ 1..=12 if !n.is_nan() => month_name(m).to_string(),
        _ => String::new(),
    }
}

pub fn weekday_name_of(n: Number) -> String {
    match n.to_i64() {
        d @ 1..=7 if !n.is_nan() => weekday_name(d).to_string(),
        _ => String::new(),
    }
}

pub fn month_name_of_time(t: Time) -> String {
    if t.kind.has_date() {
        month_name(t.month).to_string()
    } else {
        String::new()
    }
}

pub fn weekday_name_of_time(t: Time) -> String {
    match t.weekday() {
        0 => String::new(),
        d => weekday_name(d).to_string(),
    }
}

pub fn parent(path: String) -> String {
    paths::parent(&path)
}

// time

fn time_arg(n: Number) -> Option<i64> {
    if n.is_nan() {
        None
    } else {
        Some(n.to_i64())
    }
}

pub fn christmas(year: Number) -> Time {
    time_arg(year)
        .map(|y| Time::date(25, 12, y))
        .unwrap_or_default()
}

pub fn new_year(year: Number) -> Time {
    time_arg(year)
        .map(|y| Time::date_clock(1, 1, y, 0, 0, 0))
        .unwrap_or_default()
}

/// `time(month, year)`, `time(day, month, year)`, `time(d, m, y, hour, minute)`
/// and `time(d, m, y, hour, minute, second)`; `never` for invalid components.
#[derive(Debug)]
pub struct TimeOf {
    args: Vec<GenPtr<Number>>,
}

impl TimeOf {
    pub fn new(args: Vec<GenPtr<Number>>) -> Self {
        Self { args }
    }

    pub fn accepts(count: usize) -> bool {
        matches!(count, 2 | 3 | 5 | 6)
    }

    fn build(v: &[i64]) -> Option<Time> {
        let valid_clock = |h: i64, m: i64| (0..24).contains(&h) && (0..60).contains(&m);
        let valid_date = |d: i64, m: i64, y: i64| {
            (1..=12).contains(&m) && d >= 1 && d <= days_in_month(m, y)
        };
        match *v {
            [m, y] if (1..=12).contains(&m) => Some(Time::year_month(m, y)),
            [d, m, y] if valid_date(d, m, y) => Some(Time::date(d, m, y)),
            [d, m, y, h, min] if valid_date(d, m, y) && valid_clock(h, min) => {
                Some(Time::date_short_clock(d, m, y, h, min))
            }
            [d, m, y, h, min, s]
                if valid_date(d, m, y) && valid_clock(h, min) && (0..60).contains(&s) =>
            {
                Some(Time::date_clock(d, m, y, h, min, s))
            }
            _ => None,
        }
    }
}

impl Generator<Time> for TimeOf {
    fn value(&mut self, ctx: &mut Context) -> Result<Time, RuntimeMsg> {
        let mut values = Vec::with_capacity(self.args.len());
        for arg in self.args.iter_mut() {
            match time_arg(arg.value(ctx)?) {
                Some(v) => values.push(v),
                None => return Ok(Time::never()),
            }
        }
        Ok(Self::build(&values).unwrap_or_default())
    }

    fn is_constant(&self) -> bool {
        self.args.iter().all(|a| a.is_constant())
    }
}

// lists

pub fn split(text: String, separator: String) -> List {
    if text.is_empty() {
        return Vec::new();
    }
    if separator.is_empty() {
        return vec![text];
    }
    text.split(separator.as_str()).map(String::from).collect()
}

pub fn characters(text: String) -> List {
    text.chars().map(String::from).collect()
}

pub fn words(text: String) -> List {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect()
}

/// Every run of digits in `text`.
pub fn numbers(text: String) -> NumList {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|w| !w.is_empty())
        .filter_map(Number::parse)
        .collect()
}

// nodes with side effects

/// `random()`: a double in [0, 1). `random(n)`: an integer in [0, n).
#[derive(Debug)]
pub struct RandomNumber {
    limit: Option<GenPtr<Number>>,
}

impl RandomNumber {
    pub fn new(limit: Option<GenPtr<Number>>) -> Self {
        Self { limit }
    }
}

impl Generator<Number> for RandomNumber {
    fn value(&mut self, ctx: &mut Context) -> Result<Number, RuntimeMsg> {
        let mut rng = rand::thread_rng();
        let limit = match self.limit.as_mut() {
            None => return Ok(Number::from_double(rng.gen::<f64>())),
            Some(limit) => limit.value(ctx)?,
        };
        Ok(match limit {
            Number::NaN => Number::NaN,
            Number::Int(i) if i <= 0 => Number::NaN,
            Number::Int(i) => Number::Int(rng.gen_range(0..i)),
            Number::Double(d) => Number::from_double(d * rng.gen::<f64>()),
        })
    }
}

/// `random(list)` or `random(text)` (one character).
#[derive(Debug)]
pub struct RandomElement<T> {
    list: GenPtr<Vec<T>>,
}

impl<T> RandomElement<T> {
    pub fn new(list: GenPtr<Vec<T>>) -> Self {
        Self { list }
    }
}

impl<T: Clone + Default + std::fmt::Debug> Generator<T> for RandomElement<T> {
    fn value(&mut self, ctx: &mut Context) -> Result<T, RuntimeMsg> {
        let list = self.list.value(ctx)?;
        Ok(list
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_default())
    }
}

/// `exists(path)` and `exist(list)`: paths are resolved against a location frame.
#[derive(Debug)]
pub struct Exists {
    paths: GenPtr<List>,
    location: FrameId,
}

impl Exists {
    pub fn new(paths: GenPtr<List>, location: FrameId) -> Self {
        Self { paths, location }
    }
}

impl Generator<bool> for Exists {
    fn value(&mut self, ctx: &mut Context) -> Result<bool, RuntimeMsg> {
        let paths = self.paths.value(ctx)?;
        for path in paths {
            let path = paths::trim(&path);
            if path.is_empty() || paths::is_invalid(&path) {
                return Ok(false);
            }
            let full = paths::join(ctx.location(self.location), &path);
            if !ctx.filesystem.exists(&full) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// `size(path)` or `size(list)`: total size in bytes, -1 when nothing exists.
#[derive(Debug)]
pub struct SizeOf {
    paths: GenPtr<List>,
    location: FrameId,
}

impl SizeOf {
    pub fn new(paths: GenPtr<List>, location: FrameId) -> Self {
        Self { paths, location }
    }
}

impl Generator<Number> for SizeOf {
    fn value(&mut self, ctx: &mut Context) -> Result<Number, RuntimeMsg> {
        let paths = self.paths.value(ctx)?;
        let mut total = Number::Int(0);
        let mut found = false;
        for path in paths {
            if !ctx.is_running() {
                return Ok(Number::NaN);
            }
            let path = paths::trim(&path);
            if path.is_empty() || paths::is_invalid(&path) {
                continue;
            }
            let full = paths::join(ctx.location(self.location), &path);
            let data = ctx
                .filesystem
                .file_data(&full, AttributeMask::EXISTENCE | AttributeMask::SIZE);
            if data.exists {
                found = true;
                total = total + data.size;
            }
        }
        Ok(if found { total } else { Number::Int(-1) })
    }
}

/// Definition queries: `count`, `any`, `first`, `last`, `contains`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionQuery {
    Count,
    Any,
    First,
    Last,
}

/// Drains (or peeks into) a definition and resets it afterwards.
#[derive(Debug)]
pub struct DefinitionFunction {
    definition: DefPtr,
    query: DefinitionQuery,
}

impl DefinitionFunction {
    pub fn new(definition: DefPtr, query: DefinitionQuery) -> Self {
        Self { definition, query }
    }

    fn run(&mut self, ctx: &mut Context) -> Result<(Number, Option<String>), RuntimeMsg> {
        self.definition.reset();
        let mut count = 0_i64;
        let mut last = None;
        while self.definition.has_next(ctx)? {
            if !ctx.is_running() {
                self.definition.reset();
                return Ok((Number::NaN, None));
            }
            count += 1;
            match self.query {
                DefinitionQuery::Any | DefinitionQuery::First => {
                    last = self.definition.current().map(String::from);
                    break;
                }
                DefinitionQuery::Last => last = self.definition.current().map(String::from),
                DefinitionQuery::Count => {}
            }
        }
        self.definition.reset();
        Ok((Number::Int(count), last))
    }
}

impl Generator<Number> for DefinitionFunction {
    fn value(&mut self, ctx: &mut Context) -> Result<Number, RuntimeMsg> {
        Ok(self.run(ctx)?.0)
    }
}

impl Generator<bool> for DefinitionFunction {
    fn value(&mut self, ctx: &mut Context) -> Result<bool, RuntimeMsg> {
        let (count, _) = self.run(ctx)?;
        Ok(!count.is_nan() && !count.is_zero())
    }
}

impl Generator<String> for DefinitionFunction {
    fn value(&mut self, ctx: &mut Context) -> Result<String, RuntimeMsg> {
        Ok(self.run(ctx)?.1.unwrap_or_default())
    }
}

/// `contains(definition, value)`
#[derive(Debug)]
pub struct DefinitionContains {
    definition: DefPtr,
    value: GenPtr<String>,
}

impl DefinitionContains {
    pub fn new(definition: DefPtr, value: GenPtr<String>) -> Self {
        Self { definition, value }
    }
}

impl Generator<bool> for DefinitionContains {
    fn value(&mut self, ctx: &mut Context) -> Result<bool, RuntimeMsg> {
        let wanted = self.value.value(ctx)?;
        self.definition.reset();
        let mut found = false;
        while self.definition.has_next(ctx)? {
            if self.definition.current() == Some(wanted.as_str()) {
                found = true;
                break;
            }
        }
        self.definition.reset();
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Constant;

    #[test]
    fn string_functions() {
        assert_eq!(capitalize("hello wORLD 2x".into()), "Hello World 2X");
        assert_eq!(substring("abcdef".into(), Number::Int(2)), "cdef");
        assert_eq!(substring("abcdef".into(), Number::Int(-2)), "ef");
        assert_eq!(substring("abc".into(), Number::Int(5)), "");
        assert_eq!(substring_counted("abcdef".into(), Number::Int(1), Number::Int(3)), "bcd");
        assert_eq!(substring_counted("abcdef".into(), Number::Int(-3), Number::Int(2)), "de");
        assert_eq!(left("żółw".into(), Number::Int(2)), "żó");
        assert_eq!(right("żółw".into(), Number::Int(9)), "żółw");
        assert_eq!(repeat("ab".into(), Number::Int(-1)), "");
        assert_eq!(repeat("ab".into(), Number::Int(3)), "ababab");
        assert_eq!(words("one, two;three".into()), vec!["one", "two", "three"]);
        assert_eq!(numbers("a12b3".into()), vec![Number::Int(12), Number::Int(3)]);
    }

    #[test]
    fn extreme_counts_stay_in_range() {
        let max = Number::Int(i64::MAX);
        assert_eq!(substring_counted("abcdef".into(), Number::Int(1), max), "bcdef");
        assert_eq!(substring_counted("abcdef".into(), Number::Int(-2), max), "ef");
        assert_eq!(substring("abcdef".into(), Number::Int(i64::MIN)), "abcdef");
        assert_eq!(repeat("ab".into(), max), "");
        assert_eq!(repeat("".into(), max), "");
        assert_eq!(repeat("ab".into(), Number::Int(1 << 40)), "");
    }

    #[test]
    fn aggregates() {
        let list: NumList = vec![Number::Int(4), Number::Int(1), Number::Int(3), Number::Int(2)];
        assert_eq!(sum(list.clone()), Number::Int(10));
        assert_eq!(average(list.clone()).to_string(), "2.5");
        assert_eq!(min(list.clone()), Number::Int(1));
        assert_eq!(max(list.clone()), Number::Int(4));
        assert_eq!(median(list).to_string(), "2.5");
        assert!(average(Vec::new()).is_nan());
        assert!(max(vec![Number::Int(1), Number::NaN]).is_nan());
        assert_eq!(power(Number::Int(2), Number::Int(10)), Number::Int(1024));
        assert!(sqrt(Number::Int(-4)).is_nan());
    }

    #[test]
    fn time_constructor() {
        let mut ctx = Context::new("/");
        let args = |v: &[i64]| -> Vec<GenPtr<Number>> {
            v.iter()
                .map(|n| Box::new(Constant::new(Number::Int(*n))) as GenPtr<Number>)
                .collect()
        };
        let mut valid = TimeOf::new(args(&[29, 2, 2024]));
        assert!(valid.is_constant());
        assert_eq!(valid.value(&mut ctx).unwrap().to_string(), "29 February 2024");
        let mut invalid = TimeOf::new(args(&[29, 2, 2023]));
        assert!(invalid.value(&mut ctx).unwrap().is_never());
        assert_eq!(christmas(Number::Int(2020)).day, 25);
    }
}
