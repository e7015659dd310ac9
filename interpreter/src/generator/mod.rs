//! Evaluation tree built by the parsers.
//!
//! Every expression becomes a tree of [Generator] nodes. A node owns its
//! children and computes its value on demand; a node that depends on nothing
//! but other constants reports [Generator::is_constant] so the parsers can
//! fold it. Collections of paths that are enumerated lazily implement
//! [Definition] instead.

mod arithmetic;
mod attribute;
mod compare;
pub mod definition;
mod filter;
pub mod function;
mod generic;
mod globals;
mod logic;
mod membership;
mod order;
mod string;
pub mod time;

use std::cmp::Ordering;
use std::fmt::Debug;

pub use arithmetic::ArithmeticOp;
pub use attribute::AttributeValue;
pub use compare::{Comparable, CompareOp, Comparison};
pub use filter::{ListFilter, ListWhere, NumberFilter};
pub use generic::{
    Binary, Constant, IndexRef, ListElement, Listed, ListedLists, Map, Map2, Map3, Ternary,
    ThisRef, VariableRef,
};
pub use globals::{Location, Now, Success, Today};
pub use logic::{And, Not, Or, Xor};
pub use membership::{Between, InConstList, InList, Like, LikeConst, Regexp, RegexpConst};
pub use order::{ListOrder, OrderKey, OrderKeys, OrderValue};
pub use string::{CharAtIndex, Concat};
pub use time::{PeriodUnitValue, TimeField, TimeMember};

use crate::context::{Context, FrameId, FrameKind};
use crate::datatype::{Number, Primitive, Time, ValueType};
use crate::lang::RuntimeMsg;

pub trait Generator<T>: Debug {
    fn value(&mut self, ctx: &mut Context) -> Result<T, RuntimeMsg>;

    /// True when the value can be computed once, at parse time.
    fn is_constant(&self) -> bool {
        false
    }
}

pub type GenPtr<T> = Box<dyn Generator<T>>;

/// Lazily enumerated collection of paths.
///
/// Iteration follows `reset()`, then `has_next()` until it returns false.
/// Once exhausted a definition stays exhausted until it is reset again.
pub trait Definition: Debug {
    fn has_next(&mut self, ctx: &mut Context) -> Result<bool, RuntimeMsg>;

    /// Element at the current position, `None` before the first successful `has_next()`.
    fn current(&self) -> Option<&str>;

    fn reset(&mut self);

    fn value(&self) -> Result<String, RuntimeMsg> {
        self.current()
            .map(|s| s.to_string())
            .ok_or_else(|| RuntimeMsg("definition value requested before iteration".into()))
    }
}

pub type DefPtr = Box<dyn Definition>;

/// Value types that can be members of a list.
pub trait Element: Primitive + Comparable {
    /// Frame opened while iterating or filtering a collection of this type.
    const FRAME: FrameKind;

    /// Total order used to sort collections.
    fn sort_cmp(&self, other: &Self) -> Ordering;

    /// Prepare a collection for repeated membership tests.
    fn prepare(mut list: Vec<Self>) -> Vec<Self> {
        list.sort_by(|a, b| a.sort_cmp(b));
        list.dedup_by(|a, b| a.sort_cmp(b) == Ordering::Equal);
        list
    }

    /// Membership test against a collection built by [Element::prepare].
    fn is_member(prepared: &[Self], value: &Self) -> bool {
        prepared
            .binary_search_by(|item| item.sort_cmp(value))
            .is_ok()
    }

    /// Make `value` the `this` of `frame`.
    fn load(ctx: &mut Context, frame: FrameId, value: &Self, index: i64);
}

impl Element for String {
    const FRAME: FrameKind = FrameKind::File;

    fn sort_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn load(ctx: &mut Context, frame: FrameId, value: &Self, index: i64) {
        ctx.set_file(frame, value.clone(), index);
    }
}

impl Element for Number {
    const FRAME: FrameKind = FrameKind::Value(ValueType::Number);

    fn sort_cmp(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }

    // sorted by value as a double, so `-0.0` meets `0` and an integer meets
    // the doubles it rounds to; `==` then decides inside that run
    fn prepare(list: Vec<Self>) -> Vec<Self> {
        let mut list: Vec<Number> = list.into_iter().filter(|n| !n.is_nan()).collect();
        list.sort_by(member_cmp);
        list.dedup_by(|a, b| a == b);
        list
    }

    fn is_member(prepared: &[Self], value: &Self) -> bool {
        if value.is_nan() {
            return false;
        }
        let start = prepared.partition_point(|n| member_cmp(n, value) == Ordering::Less);
        prepared[start..]
            .iter()
            .take_while(|n| member_cmp(n, value) == Ordering::Equal)
            .any(|n| n == value)
    }

    fn load(ctx: &mut Context, frame: FrameId, value: &Self, index: i64) {
        ctx.set_this(frame, (*value).into_value(), index);
    }
}

/// Order of a prepared membership list; NaN never gets there.
fn member_cmp(a: &Number, b: &Number) -> Ordering {
    a.to_f64()
        .partial_cmp(&b.to_f64())
        .unwrap_or(Ordering::Equal)
}

impl Element for Time {
    const FRAME: FrameKind = FrameKind::Value(ValueType::Time);

    fn sort_cmp(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }

    // times of different precision can be equal without being identical,
    // so membership is a plain scan
    fn prepare(list: Vec<Self>) -> Vec<Self> {
        list
    }

    fn is_member(prepared: &[Self], value: &Self) -> bool {
        prepared.iter().any(|t| t.equals(value))
    }

    fn load(ctx: &mut Context, frame: FrameId, value: &Self, index: i64) {
        ctx.set_this(frame, (*value).into_value(), index);
    }
}

/// Replace a constant subtree by a single node holding its value.
pub fn fold<T: Clone + Debug + 'static>(
    mut generator: GenPtr<T>,
    ctx: &mut Context,
) -> Result<GenPtr<T>, RuntimeMsg> {
    if generator.is_constant() {
        Ok(Box::new(Constant::new(generator.value(ctx)?)))
    } else {
        Ok(generator)
    }
}
