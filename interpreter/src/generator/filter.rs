use std::fmt::{Display, Error, Formatter};

use super::{Element, GenPtr, Generator};
use crate::context::{Context, FrameId};
use crate::datatype::Number;
use crate::lang::RuntimeMsg;

/// Filters that only count elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFilter {
    Limit,
    Skip,
    Every,
    Final,
}

impl NumberFilter {
    /// Apply to a materialized collection; `n` is truncated to an integer.
    pub fn apply<T>(&self, mut list: Vec<T>, n: Number) -> Vec<T> {
        let n = if n.is_nan() { 0 } else { n.to_i64() };
        match self {
            Self::Limit => {
                if n <= 0 {
                    list.clear();
                } else if (n as usize) < list.len() {
                    list.truncate(n as usize);
                }
                list
            }
            Self::Skip => {
                if n <= 0 {
                    list
                } else if n as usize >= list.len() {
                    Vec::new()
                } else {
                    list.split_off(n as usize)
                }
            }
            Self::Every => {
                if n <= 1 {
                    list
                } else {
                    list.into_iter().step_by(n as usize).collect()
                }
            }
            Self::Final => {
                if n <= 0 {
                    Vec::new()
                } else if n as usize >= list.len() {
                    list
                } else {
                    let start = list.len() - n as usize;
                    list.split_off(start)
                }
            }
        }
    }
}

impl Display for NumberFilter {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        let s = match self {
            Self::Limit => "limit",
            Self::Skip => "skip",
            Self::Every => "every",
            Self::Final => "final",
        };
        write!(f, "{}", s)
    }
}

/// `list limit n`, `list skip n`, ... over a collection value.
#[derive(Debug)]
pub struct ListFilter<T> {
    list: GenPtr<Vec<T>>,
    number: GenPtr<Number>,
    filter: NumberFilter,
}

impl<T> ListFilter<T> {
    pub fn new(list: GenPtr<Vec<T>>, filter: NumberFilter, number: GenPtr<Number>) -> Self {
        Self {
            list,
            number,
            filter,
        }
    }
}

impl<T: std::fmt::Debug> Generator<Vec<T>> for ListFilter<T> {
    fn value(&mut self, ctx: &mut Context) -> Result<Vec<T>, RuntimeMsg> {
        let list = self.list.value(ctx)?;
        let n = self.number.value(ctx)?;
        Ok(self.filter.apply(list, n))
    }

    fn is_constant(&self) -> bool {
        self.list.is_constant() && self.number.is_constant()
    }
}

/// `list where condition`; every element is loaded into `frame` before the test.
#[derive(Debug)]
pub struct ListWhere<T> {
    list: GenPtr<Vec<T>>,
    frame: FrameId,
    condition: GenPtr<bool>,
}

impl<T> ListWhere<T> {
    pub fn new(list: GenPtr<Vec<T>>, frame: FrameId, condition: GenPtr<bool>) -> Self {
        Self {
            list,
            frame,
            condition,
        }
    }
}

impl<T: Element> Generator<Vec<T>> for ListWhere<T> {
    fn value(&mut self, ctx: &mut Context) -> Result<Vec<T>, RuntimeMsg> {
        let list = self.list.value(ctx)?;
        let mut result = Vec::new();
        for (i, element) in list.into_iter().enumerate() {
            if !ctx.is_running() {
                break;
            }
            T::load(ctx, self.frame, &element, i as i64);
            if self.condition.value(ctx)? {
                result.push(element);
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nums(n: i64) -> Vec<i64> {
        (0..n).collect()
    }

    #[test]
    fn counting_filters() {
        let n = Number::Int;
        assert_eq!(NumberFilter::Limit.apply(nums(5), n(2)), vec![0, 1]);
        assert_eq!(NumberFilter::Limit.apply(nums(5), n(-1)), Vec::<i64>::new());
        assert_eq!(NumberFilter::Skip.apply(nums(5), n(3)), vec![3, 4]);
        assert_eq!(NumberFilter::Skip.apply(nums(5), n(0)), nums(5));
        assert_eq!(NumberFilter::Every.apply(nums(7), n(3)), vec![0, 3, 6]);
        assert_eq!(NumberFilter::Every.apply(nums(3), n(0)), nums(3));
        assert_eq!(NumberFilter::Final.apply(nums(5), n(2)), vec![3, 4]);
        assert_eq!(NumberFilter::Final.apply(nums(2), n(9)), nums(2));
        assert_eq!(NumberFilter::Limit.apply(nums(5), Number::Double(2.7)), vec![0, 1]);
    }
}
