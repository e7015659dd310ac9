use std::cmp::Ordering;

use regex::Regex;

use super::{Comparable, Element, GenPtr, Generator};
use crate::context::Context;
use crate::datatype::LikeMatcher;
use crate::lang::RuntimeMsg;

/// `value in (a, b, c)` against a collection known at parse time.
#[derive(Debug)]
pub struct InConstList<T> {
    value: GenPtr<T>,
    prepared: Vec<T>,
}

impl<T: Element> InConstList<T> {
    pub fn new(value: GenPtr<T>, list: Vec<T>) -> Self {
        Self {
            value,
            prepared: T::prepare(list),
        }
    }
}

impl<T: Element> Generator<bool> for InConstList<T> {
    fn value(&mut self, ctx: &mut Context) -> Result<bool, RuntimeMsg> {
        if self.prepared.is_empty() {
            return Ok(false);
        }
        let v = self.value.value(ctx)?;
        Ok(T::is_member(&self.prepared, &v))
    }

    fn is_constant(&self) -> bool {
        self.value.is_constant()
    }
}

/// `value in collection` where the collection is computed at runtime.
///
/// The prepared copy is rebuilt only when the collection value changes.
#[derive(Debug)]
pub struct InList<T> {
    value: GenPtr<T>,
    list: GenPtr<Vec<T>>,
    raw: Option<Vec<T>>,
    prepared: Vec<T>,
}

impl<T: Element> InList<T> {
    pub fn new(value: GenPtr<T>, list: GenPtr<Vec<T>>) -> Self {
        Self {
            value,
            list,
            raw: None,
            prepared: Vec::new(),
        }
    }
}

impl<T: Element> Generator<bool> for InList<T> {
    fn value(&mut self, ctx: &mut Context) -> Result<bool, RuntimeMsg> {
        let v = self.value.value(ctx)?;
        let list = self.list.value(ctx)?;
        let unchanged = match &self.raw {
            Some(raw) => {
                raw.len() == list.len()
                    && raw
                        .iter()
                        .zip(list.iter())
                        .all(|(a, b)| a.sort_cmp(b) == Ordering::Equal)
            }
            None => false,
        };
        if !unchanged {
            self.prepared = T::prepare(list.clone());
            self.raw = Some(list);
        }
        Ok(T::is_member(&self.prepared, &v))
    }

    fn is_constant(&self) -> bool {
        self.value.is_constant() && self.list.is_constant()
    }
}

#[derive(Debug)]
pub struct LikeConst {
    value: GenPtr<String>,
    matcher: LikeMatcher,
}

impl LikeConst {
    pub fn new(value: GenPtr<String>, pattern: &str) -> Self {
        Self {
            value,
            matcher: LikeMatcher::compile(pattern),
        }
    }
}

impl Generator<bool> for LikeConst {
    fn value(&mut self, ctx: &mut Context) -> Result<bool, RuntimeMsg> {
        let v = self.value.value(ctx)?;
        Ok(self.matcher.matches(&v))
    }

    fn is_constant(&self) -> bool {
        self.value.is_constant()
    }
}

/// `value like pattern` with a pattern computed at runtime; recompiled when it changes.
#[derive(Debug)]
pub struct Like {
    value: GenPtr<String>,
    pattern: GenPtr<String>,
    compiled: Option<(String, LikeMatcher)>,
}

impl Like {
    pub fn new(value: GenPtr<String>, pattern: GenPtr<String>) -> Self {
        Self {
            value,
            pattern,
            compiled: None,
        }
    }
}

impl Generator<bool> for Like {
    fn value(&mut self, ctx: &mut Context) -> Result<bool, RuntimeMsg> {
        let v = self.value.value(ctx)?;
        let pattern = self.pattern.value(ctx)?;
        let stale = !matches!(&self.compiled, Some((p, _)) if *p == pattern);
        if stale {
            let matcher = LikeMatcher::compile(&pattern);
            self.compiled = Some((pattern, matcher));
        }
        Ok(self
            .compiled
            .as_ref()
            .map(|(_, m)| m.matches(&v))
            .unwrap_or(false))
    }
}

#[derive(Debug)]
pub struct RegexpConst {
    value: GenPtr<String>,
    regex: Regex,
}

impl RegexpConst {
    /// Fails when the pattern is not a valid regular expression.
    pub fn new(value: GenPtr<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            value,
            regex: Regex::new(pattern)?,
        })
    }
}

impl Generator<bool> for RegexpConst {
    fn value(&mut self, ctx: &mut Context) -> Result<bool, RuntimeMsg> {
        let v = self.value.value(ctx)?;
        Ok(self.regex.is_match(&v))
    }

    fn is_constant(&self) -> bool {
        self.value.is_constant()
    }
}

/// Runtime pattern; an invalid expression matches nothing.
#[derive(Debug)]
pub struct Regexp {
    value: GenPtr<String>,
    pattern: GenPtr<String>,
    compiled: Option<(String, Option<Regex>)>,
}

impl Regexp {
    pub fn new(value: GenPtr<String>, pattern: GenPtr<String>) -> Self {
        Self {
            value,
            pattern,
            compiled: None,
        }
    }
}

impl Generator<bool> for Regexp {
    fn value(&mut self, ctx: &mut Context) -> Result<bool, RuntimeMsg> {
        let v = self.value.value(ctx)?;
        let pattern = self.pattern.value(ctx)?;
        let stale = !matches!(&self.compiled, Some((p, _)) if *p == pattern);
        if stale {
            let regex = match Regex::new(&pattern) {
                Ok(r) => Some(r),
                Err(e) => {
                    tracing::warn!("invalid regular expression `{}`: {}", pattern, e);
                    None
                }
            };
            self.compiled = Some((pattern, regex));
        }
        Ok(match &self.compiled {
            Some((_, Some(regex))) => regex.is_match(&v),
            _ => false,
        })
    }
}

/// `value between a and b`; the bounds may be given in either order.
#[derive(Debug)]
pub struct Between<T> {
    value: GenPtr<T>,
    low: GenPtr<T>,
    high: GenPtr<T>,
}

impl<T> Between<T> {
    pub fn new(value: GenPtr<T>, low: GenPtr<T>, high: GenPtr<T>) -> Self {
        Self { value, low, high }
    }
}

impl<T: Comparable + std::fmt::Debug> Generator<bool> for Between<T> {
    fn value(&mut self, ctx: &mut Context) -> Result<bool, RuntimeMsg> {
        let v = self.value.value(ctx)?;
        let a = self.low.value(ctx)?;
        let b = self.high.value(ctx)?;
        let (low, high) = match a.compare(&b) {
            Some(Ordering::Greater) => (b, a),
            Some(_) => (a, b),
            None => return Ok(false),
        };
        Ok(matches!(
            v.compare(&low),
            Some(Ordering::Greater | Ordering::Equal)
        ) && matches!(v.compare(&high), Some(Ordering::Less | Ordering::Equal)))
    }

    fn is_constant(&self) -> bool {
        self.value.is_constant() && self.low.is_constant() && self.high.is_constant()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::{Number, Time};
    use crate::generator::Constant;

    fn num(i: i64) -> GenPtr<Number> {
        Box::new(Constant::new(Number::Int(i)))
    }

    fn scan<T: Element>(list: &[T], v: &T) -> bool {
        list.iter().any(|e| e.equals(v))
    }

    #[test]
    fn constant_list_agrees_with_scan() {
        let mut ctx = Context::new("/");
        let lists: Vec<Vec<Number>> = vec![
            vec![],
            vec![Number::Int(3), Number::Int(1), Number::Int(3)],
            vec![Number::Double(2.5), Number::NaN, Number::Int(-4)],
        ];
        for list in lists {
            for candidate in [-4, 0, 1, 2, 3] {
                let mut node = InConstList::new(num(candidate), list.clone());
                assert_eq!(
                    node.value(&mut ctx).unwrap(),
                    scan(&list, &Number::Int(candidate)),
                    "{} in {:?}",
                    candidate,
                    list
                );
            }
        }
    }

    #[test]
    fn mixed_numbers_agree_with_scan() {
        let mut ctx = Context::new("/");
        let big = 1_i64 << 53;
        let list = vec![
            Number::Double(-0.0),
            Number::Int(5),
            Number::Double(2.5),
            Number::Int(big + 1),
            Number::Double(big as f64),
            Number::Int(-3),
        ];
        let values = [
            Number::Int(0),
            Number::Double(0.0),
            Number::Double(-0.0),
            Number::Double(5.0),
            Number::Int(big),
            Number::Int(big + 1),
            Number::Int(big + 2),
            Number::Double(-3.0),
            Number::Int(2),
        ];
        for v in values {
            let expected = scan(&list, &v);
            let mut constant = InConstList::new(Box::new(Constant::new(v)), list.clone());
            let mut runtime = InList::new(
                Box::new(Constant::new(v)),
                Box::new(Constant::new(list.clone())),
            );
            assert_eq!(constant.value(&mut ctx).unwrap(), expected, "{:?}", v);
            assert_eq!(runtime.value(&mut ctx).unwrap(), expected, "{:?}", v);
        }
        assert!(scan(&list, &Number::Int(0)));
    }

    /// Hands out a different list on every call.
    #[derive(Debug)]
    struct Changing(Vec<Vec<Number>>);

    impl Generator<Vec<Number>> for Changing {
        fn value(&mut self, _ctx: &mut Context) -> Result<Vec<Number>, RuntimeMsg> {
            Ok(self.0.remove(0))
        }
    }

    #[test]
    fn runtime_list_follows_changes() {
        let mut ctx = Context::new("/");
        let lists = vec![
            vec![Number::Int(1), Number::Int(2)],
            vec![Number::Int(1), Number::Int(2)],
            vec![Number::Int(3), Number::Int(4)],
            vec![Number::Int(4), Number::Int(2)],
        ];
        let mut node = InList::new(num(2), Box::new(Changing(lists)));
        let seen: Vec<bool> = (0..4).map(|_| node.value(&mut ctx).unwrap()).collect();
        assert_eq!(seen, vec![true, true, false, true]);
    }

    #[test]
    fn runtime_list_with_times() {
        let mut ctx = Context::new("/");
        let days = vec![Time::date(1, 1, 2020), Time::date(2, 1, 2020)];
        let mut node = InList::new(
            Box::new(Constant::new(Time::date_clock(2, 1, 2020, 12, 0, 0))),
            Box::new(Constant::new(days)),
        );
        assert!(node.value(&mut ctx).unwrap());
    }

    #[test]
    fn between_accepts_reversed_bounds() {
        let mut ctx = Context::new("/");
        assert!(Between::new(num(5), num(10), num(1)).value(&mut ctx).unwrap());
        assert!(Between::new(num(1), num(1), num(3)).value(&mut ctx).unwrap());
        assert!(!Between::new(num(0), num(1), num(3)).value(&mut ctx).unwrap());
    }

    #[test]
    fn runtime_regexp_tolerates_invalid_pattern() {
        let mut ctx = Context::new("/");
        let mut node = Regexp::new(
            Box::new(Constant::new("abc".to_string())),
            Box::new(Constant::new("(".to_string())),
        );
        assert!(!node.value(&mut ctx).unwrap());
        assert!(RegexpConst::new(Box::new(Constant::new(String::new())), "(").is_err());
    }
}
