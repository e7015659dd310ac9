//! Value types of the language.

mod like;
mod number;
mod period;
mod time;
mod wildcard;

use std::fmt::{Debug, Display, Error, Formatter};

pub use like::LikeMatcher;
pub use number::Number;
pub use period::{Period, PeriodUnit, SECONDS_PER_DAY, UNITS};
pub use time::{days_in_month, is_leap_year, month_name, weekday_name, Time, TimeKind};
pub use wildcard::{WildcardComparer, ASTERISK};

pub type List = Vec<String>;
pub type NumList = Vec<Number>;
pub type TimeList = Vec<Time>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Bool,
    Number,
    String,
    Time,
    Period,
    List,
    NumList,
    TimeList,
    Definition,
}

impl Display for ValueType {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        let name = match self {
            Self::Bool => "bool",
            Self::Number => "number",
            Self::String => "string",
            Self::Time => "time",
            Self::Period => "period",
            Self::List => "list",
            Self::NumList => "numeric list",
            Self::TimeList => "time list",
            Self::Definition => "definition",
        };
        write!(f, "{}", name)
    }
}

/// Runtime value held by a variable slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Number(Number),
    String(String),
    Time(Time),
    Period(Period),
    List(List),
    NumList(NumList),
    TimeList(TimeList),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Bool(_) => ValueType::Bool,
            Self::Number(_) => ValueType::Number,
            Self::String(_) => ValueType::String,
            Self::Time(_) => ValueType::Time,
            Self::Period(_) => ValueType::Period,
            Self::List(_) => ValueType::List,
            Self::NumList(_) => ValueType::NumList,
            Self::TimeList(_) => ValueType::TimeList,
        }
    }

    pub fn default_of(t: ValueType) -> Self {
        match t {
            ValueType::Bool => Self::Bool(false),
            ValueType::Number => Self::Number(Number::default()),
            ValueType::String => Self::String(String::new()),
            ValueType::Time => Self::Time(Time::never()),
            ValueType::Period => Self::Period(Period::default()),
            ValueType::NumList => Self::NumList(Vec::new()),
            ValueType::TimeList => Self::TimeList(Vec::new()),
            ValueType::List | ValueType::Definition => Self::List(Vec::new()),
        }
    }
}

/// Rust type backing one of the value types.
pub trait Primitive: Sized + Clone + Debug + Default + 'static {
    const TYPE: ValueType;

    fn from_value(value: &Value) -> Option<Self>;

    fn into_value(self) -> Value;
}

macro_rules! primitive {
    ($t:ty, $variant:ident) => {
        impl Primitive for $t {
            const TYPE: ValueType = ValueType::$variant;

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }

            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }
    };
}

primitive!(bool, Bool);
primitive!(Number, Number);
primitive!(String, String);
primitive!(Time, Time);
primitive!(Period, Period);
primitive!(List, List);
primitive!(NumList, NumList);
primitive!(TimeList, TimeList);

pub fn bool_to_string(b: bool) -> String {
    if b { "1" } else { "0" }.to_string()
}

pub fn list_to_string<T: Display>(list: &[T]) -> String {
    list.iter()
        .map(|e| e.to_string())
        .collect::<Vec<String>>()
        .join(", ")
}
