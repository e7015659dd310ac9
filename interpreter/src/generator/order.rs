use std::cmp::Ordering;

use super::{Element, GenPtr, Generator};
use crate::context::{Context, FrameId};
use crate::datatype::{Number, Period, Time};
use crate::lang::RuntimeMsg;

/// One evaluated sort key.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderValue {
    Bool(bool),
    Number(Number),
    Time(Time),
    Period(Period),
    String(String),
}

impl OrderValue {
    fn order(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Time(a), Self::Time(b)) => a.total_cmp(b),
            (Self::Period(a), Self::Period(b)) => a.cmp(b),
            (Self::String(a), Self::String(b)) => a.cmp(b),
            // keys of one column always share a type
            _ => Ordering::Equal,
        }
    }
}

/// Expression behind one `order by` unit.
#[derive(Debug)]
pub enum OrderKey {
    Bool(GenPtr<bool>),
    Number(GenPtr<Number>),
    Time(GenPtr<Time>),
    Period(GenPtr<Period>),
    String(GenPtr<String>),
}

impl OrderKey {
    fn evaluate(&mut self, ctx: &mut Context) -> Result<OrderValue, RuntimeMsg> {
        Ok(match self {
            Self::Bool(g) => OrderValue::Bool(g.value(ctx)?),
            Self::Number(g) => OrderValue::Number(g.value(ctx)?),
            Self::Time(g) => OrderValue::Time(g.value(ctx)?),
            Self::Period(g) => OrderValue::Period(g.value(ctx)?),
            Self::String(g) => OrderValue::String(g.value(ctx)?),
        })
    }
}

/// Sort units of an `order by` clause, first unit decides.
#[derive(Debug, Default)]
pub struct OrderKeys {
    units: Vec<(OrderKey, bool)>,
}

impl OrderKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: OrderKey, descending: bool) {
        self.units.push((key, descending));
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Values of every unit for the element currently loaded into the context.
    pub fn evaluate(&mut self, ctx: &mut Context) -> Result<Vec<OrderValue>, RuntimeMsg> {
        let mut row = Vec::with_capacity(self.units.len());
        for (key, _) in self.units.iter_mut() {
            row.push(key.evaluate(ctx)?);
        }
        Ok(row)
    }

    fn compare(&self, a: &[OrderValue], b: &[OrderValue]) -> Ordering {
        for (i, (_, descending)) in self.units.iter().enumerate() {
            let ord = a[i].order(&b[i]);
            if ord != Ordering::Equal {
                return if *descending { ord.reverse() } else { ord };
            }
        }
        Ordering::Equal
    }

    /// Positions of `rows` in sorted order. Rows with equal keys keep their
    /// original relative order.
    pub fn permutation(&self, rows: &[Vec<OrderValue>]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..rows.len()).collect();
        indices.sort_by(|a, b| self.compare(&rows[*a], &rows[*b]));
        indices
    }
}

/// `list order by ...` over a collection value.
#[derive(Debug)]
pub struct ListOrder<T> {
    list: GenPtr<Vec<T>>,
    frame: FrameId,
    keys: OrderKeys,
}

impl<T> ListOrder<T> {
    pub fn new(list: GenPtr<Vec<T>>, frame: FrameId, keys: OrderKeys) -> Self {
        Self { list, frame, keys }
    }
}

impl<T: Element> Generator<Vec<T>> for ListOrder<T> {
    fn value(&mut self, ctx: &mut Context) -> Result<Vec<T>, RuntimeMsg> {
        let list = self.list.value(ctx)?;
        let mut rows = Vec::with_capacity(list.len());
        for (i, element) in list.iter().enumerate() {
            if !ctx.is_running() {
                return Ok(Vec::new());
            }
            T::load(ctx, self.frame, element, i as i64);
            rows.push(self.keys.evaluate(ctx)?);
        }
        let order = self.keys.permutation(&rows);
        let mut slots: Vec<Option<T>> = list.into_iter().map(Some).collect();
        Ok(order.into_iter().filter_map(|i| slots[i].take()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FrameKind;
    use crate::generator::{Constant, ThisRef};

    fn rows(values: &[(i64, &str)]) -> Vec<Vec<OrderValue>> {
        values
            .iter()
            .map(|(n, s)| vec![OrderValue::Number(Number::Int(*n)), OrderValue::String(s.to_string())])
            .collect()
    }

    #[test]
    fn multi_key_stable() {
        let mut keys = OrderKeys::new();
        keys.push(OrderKey::Number(Box::new(Constant::new(Number::Int(0)))), false);
        keys.push(OrderKey::String(Box::new(Constant::new(String::new()))), true);
        let data = rows(&[(2, "a"), (1, "a"), (2, "b"), (1, "a"), (1, "c")]);
        assert_eq!(keys.permutation(&data), vec![4, 1, 3, 2, 0]);
    }

    #[test]
    fn sorting_twice_changes_nothing() {
        let mut keys = OrderKeys::new();
        keys.push(OrderKey::Number(Box::new(Constant::new(Number::Int(0)))), true);
        let data = rows(&[(3, "x"), (1, "y"), (3, "z"), (2, "w"), (1, "v")]);
        let sorted: Vec<_> = keys
            .permutation(&data)
            .into_iter()
            .map(|i| data[i].clone())
            .collect();
        // equal keys keep their input order
        assert_eq!(sorted, rows(&[(3, "x"), (3, "z"), (2, "w"), (1, "y"), (1, "v")]));
        assert_eq!(keys.permutation(&sorted), vec![0, 1, 2, 3, 4]);

        let mut reversed = data.clone();
        reversed.reverse();
        let resorted: Vec<_> = keys
            .permutation(&reversed)
            .into_iter()
            .map(|i| reversed[i].clone())
            .collect();
        assert_eq!(resorted, rows(&[(3, "z"), (3, "x"), (2, "w"), (1, "v"), (1, "y")]));
    }

    #[test]
    fn sorts_list_by_this() {
        let mut ctx = Context::new("/");
        let frame = ctx.open_frame(FrameKind::Value(crate::datatype::ValueType::Number));
        let mut keys = OrderKeys::new();
        keys.push(OrderKey::Number(Box::new(ThisRef::<Number>::new(frame))), true);
        let list: Vec<Number> = vec![Number::Int(3), Number::Int(10), Number::Int(1)];
        let mut order = ListOrder::new(Box::new(Constant::new(list)), frame, keys);
        let sorted = order.value(&mut ctx).unwrap();
        assert_eq!(sorted, vec![Number::Int(10), Number::Int(3), Number::Int(1)]);
    }
}
