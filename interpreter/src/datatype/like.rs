//! Matching for the `like` operator.
//!
//! `%` matches any run of characters, `_` exactly one character, `#` one
//! decimal digit and `[...]` one character from a set (`[a-z]` ranges,
//! `[^...]` exclusion).

const MULTIPLE_CHARS: char = '%';
const ONE_CHAR: char = '_';
const ONE_DIGIT: char = '#';
const SET_START: char = '[';
const SET_END: char = ']';
const SET_EXCLUSION: char = '^';
const SET_RANGE: char = '-';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharSet {
    chars: Vec<char>,
    ranges: Vec<(char, char)>,
    excluded: bool,
}

impl CharSet {
    fn contains(&self, c: char) -> bool {
        let found = self.chars.contains(&c) || self.ranges.iter().any(|(a, b)| *a <= c && c <= *b);
        found != self.excluded
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikeUnit {
    Literal(char),
    AnyOne,
    Digit,
    Set(CharSet),
    AnyMany,
}

impl LikeUnit {
    fn matches(&self, c: char) -> bool {
        match self {
            Self::Literal(l) => *l == c,
            Self::AnyOne => true,
            Self::Digit => c.is_ascii_digit(),
            Self::Set(set) => set.contains(c),
            Self::AnyMany => true,
        }
    }
}

/// Precompiled `like` pattern. Common shapes get a direct string test
/// instead of the general matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikeMatcher {
    Constant(bool),
    Equals(String),
    StartsWith(String),
    EndsWith(String),
    Contains(String),
    Length(usize),
    Pattern(Vec<LikeUnit>),
}

impl LikeMatcher {
    pub fn compile(pattern: &str) -> Self {
        let units = parse_units(pattern);
        if units.is_empty() {
            return Self::Equals(String::new());
        }
        if units.iter().all(|u| *u == LikeUnit::AnyMany) {
            return Self::Constant(true);
        }
        if units.iter().all(|u| *u == LikeUnit::AnyOne) {
            return Self::Length(units.len());
        }
        let literal = |slice: &[LikeUnit]| -> Option<String> {
            slice
                .iter()
                .map(|u| match u {
                    LikeUnit::Literal(c) => Some(*c),
                    _ => None,
                })
                .collect()
        };
        let len = units.len();
        let starts_many = units[0] == LikeUnit::AnyMany;
        let ends_many = units[len - 1] == LikeUnit::AnyMany;
        match (starts_many, ends_many) {
            (false, false) => {
                if let Some(s) = literal(&units) {
                    return Self::Equals(s);
                }
            }
            (false, true) => {
                if let Some(s) = literal(&units[..len - 1]) {
                    return Self::StartsWith(s);
                }
            }
            (true, false) => {
                if let Some(s) = literal(&units[1..]) {
                    return Self::EndsWith(s);
                }
            }
            (true, true) if len > 2 => {
                if let Some(s) = literal(&units[1..len - 1]) {
                    return Self::Contains(s);
                }
            }
            _ => {}
        }
        Self::Pattern(units)
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Constant(b) => *b,
            Self::Equals(s) => value == s,
            Self::StartsWith(s) => value.starts_with(s.as_str()),
            Self::EndsWith(s) => value.ends_with(s.as_str()),
            Self::Contains(s) => value.contains(s.as_str()),
            Self::Length(n) => value.chars().count() == *n,
            Self::Pattern(units) => matches_units(units, &value.chars().collect::<Vec<char>>()),
        }
    }
}

fn parse_units(pattern: &str) -> Vec<LikeUnit> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut units = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            MULTIPLE_CHARS => {
                // consecutive % are redundant
                if units.last() != Some(&LikeUnit::AnyMany) {
                    units.push(LikeUnit::AnyMany);
                }
            }
            ONE_CHAR => units.push(LikeUnit::AnyOne),
            ONE_DIGIT => units.push(LikeUnit::Digit),
            SET_START => {
                if let Some(end) = chars[i + 1..].iter().position(|x| *x == SET_END) {
                    let body = &chars[i + 1..i + 1 + end];
                    units.push(LikeUnit::Set(parse_set(body)));
                    i += end + 2;
                    continue;
                } else {
                    units.push(LikeUnit::Literal(c));
                }
            }
            _ => units.push(LikeUnit::Literal(c)),
        }
        i += 1;
    }
    units
}

fn parse_set(body: &[char]) -> CharSet {
    let (excluded, body) = match body.first() {
        Some(&SET_EXCLUSION) if body.len() > 1 => (true, &body[1..]),
        _ => (false, body),
    };
    let mut set = CharSet {
        chars: Vec::new(),
        ranges: Vec::new(),
        excluded,
    };
    let mut i = 0;
    while i < body.len() {
        if i + 2 < body.len() && body[i + 1] == SET_RANGE {
            let (a, b) = (body[i], body[i + 2]);
            set.ranges.push(if a <= b { (a, b) } else { (b, a) });
            i += 3;
        } else {
            set.chars.push(body[i]);
            i += 1;
        }
    }
    set
}

fn matches_units(units: &[LikeUnit], value: &[char]) -> bool {
    // dp[j]: units[..i] match value[..j]
    let mut dp = vec![false; value.len() + 1];
    dp[0] = true;
    for unit in units {
        let mut next = vec![false; value.len() + 1];
        if *unit == LikeUnit::AnyMany {
            let mut reachable = false;
            for j in 0..=value.len() {
                reachable |= dp[j];
                next[j] = reachable;
            }
        } else {
            for j in 1..=value.len() {
                next[j] = dp[j - 1] && unit.matches(value[j - 1]);
            }
        }
        dp = next;
    }
    dp[value.len()]
}
