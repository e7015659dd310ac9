use std::fmt::{Debug, Formatter};

use super::{GenPtr, Generator};
use crate::context::{Context, FrameId};
use crate::datatype::{Number, Primitive};
use crate::lang::RuntimeMsg;

#[derive(Debug, Clone)]
pub struct Constant<T> {
    value: T,
}

impl<T> Constant<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T: Clone + Debug> Generator<T> for Constant<T> {
    fn value(&mut self, _ctx: &mut Context) -> Result<T, RuntimeMsg> {
        Ok(self.value.clone())
    }

    fn is_constant(&self) -> bool {
        true
    }
}

/// Global variable slot; reads the default value until the first assignment runs.
#[derive(Debug)]
pub struct VariableRef<T> {
    name: String,
    _type: std::marker::PhantomData<T>,
}

impl<T> VariableRef<T> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            _type: std::marker::PhantomData,
        }
    }
}

impl<T: Primitive> Generator<T> for VariableRef<T> {
    fn value(&mut self, ctx: &mut Context) -> Result<T, RuntimeMsg> {
        Ok(ctx
            .variables
            .get_opt(&self.name)
            .and_then(T::from_value)
            .unwrap_or_default())
    }
}

/// `this` of an iteration frame.
#[derive(Debug)]
pub struct ThisRef<T> {
    frame: FrameId,
    _type: std::marker::PhantomData<T>,
}

impl<T> ThisRef<T> {
    pub fn new(frame: FrameId) -> Self {
        Self {
            frame,
            _type: std::marker::PhantomData,
        }
    }
}

impl<T: Primitive> Generator<T> for ThisRef<T> {
    fn value(&mut self, ctx: &mut Context) -> Result<T, RuntimeMsg> {
        Ok(T::from_value(&ctx.frame(self.frame).this).unwrap_or_default())
    }
}

#[derive(Debug)]
pub struct IndexRef {
    frame: FrameId,
}

impl IndexRef {
    pub fn new(frame: FrameId) -> Self {
        Self { frame }
    }
}

impl Generator<Number> for IndexRef {
    fn value(&mut self, ctx: &mut Context) -> Result<Number, RuntimeMsg> {
        Ok(ctx.frame(self.frame).index)
    }
}

/// `condition ? left : right`; only the taken branch is evaluated.
#[derive(Debug)]
pub struct Ternary<T> {
    condition: GenPtr<bool>,
    left: GenPtr<T>,
    right: GenPtr<T>,
}

impl<T> Ternary<T> {
    pub fn new(condition: GenPtr<bool>, left: GenPtr<T>, right: GenPtr<T>) -> Self {
        Self {
            condition,
            left,
            right,
        }
    }
}

impl<T: Debug> Generator<T> for Ternary<T> {
    fn value(&mut self, ctx: &mut Context) -> Result<T, RuntimeMsg> {
        if self.condition.value(ctx)? {
            self.left.value(ctx)
        } else {
            self.right.value(ctx)
        }
    }

    fn is_constant(&self) -> bool {
        self.condition.is_constant() && self.left.is_constant() && self.right.is_constant()
    }
}

/// `condition ? value`, falling back to the empty value of the type.
#[derive(Debug)]
pub struct Binary<T> {
    condition: GenPtr<bool>,
    value: GenPtr<T>,
}

impl<T> Binary<T> {
    pub fn new(condition: GenPtr<bool>, value: GenPtr<T>) -> Self {
        Self { condition, value }
    }
}

impl<T: Debug + Default> Generator<T> for Binary<T> {
    fn value(&mut self, ctx: &mut Context) -> Result<T, RuntimeMsg> {
        if self.condition.value(ctx)? {
            self.value.value(ctx)
        } else {
            Ok(T::default())
        }
    }

    fn is_constant(&self) -> bool {
        self.condition.is_constant() && self.value.is_constant()
    }
}

/// `list[index]`, zero-based. Out of range gives the empty value.
#[derive(Debug)]
pub struct ListElement<T> {
    list: GenPtr<Vec<T>>,
    index: GenPtr<Number>,
}

impl<T> ListElement<T> {
    pub fn new(list: GenPtr<Vec<T>>, index: GenPtr<Number>) -> Self {
        Self { list, index }
    }
}

impl<T: Debug + Default> Generator<T> for ListElement<T> {
    fn value(&mut self, ctx: &mut Context) -> Result<T, RuntimeMsg> {
        let mut list = self.list.value(ctx)?;
        let index = self.index.value(ctx)?;
        if index.is_nan() {
            return Ok(T::default());
        }
        let i = index.to_i64();
        if i < 0 || i as usize >= list.len() {
            Ok(T::default())
        } else {
            Ok(list.swap_remove(i as usize))
        }
    }

    fn is_constant(&self) -> bool {
        self.list.is_constant() && self.index.is_constant()
    }
}

/// `a, b, c` built from single values.
#[derive(Debug)]
pub struct Listed<T> {
    elements: Vec<GenPtr<T>>,
}

impl<T> Listed<T> {
    pub fn new(elements: Vec<GenPtr<T>>) -> Self {
        Self { elements }
    }
}

impl<T: Debug> Generator<Vec<T>> for Listed<T> {
    fn value(&mut self, ctx: &mut Context) -> Result<Vec<T>, RuntimeMsg> {
        let mut result = Vec::with_capacity(self.elements.len());
        for e in self.elements.iter_mut() {
            result.push(e.value(ctx)?);
        }
        Ok(result)
    }

    fn is_constant(&self) -> bool {
        self.elements.iter().all(|e| e.is_constant())
    }
}

/// `a, b, c` where at least one part is a collection itself.
#[derive(Debug)]
pub struct ListedLists<T> {
    lists: Vec<GenPtr<Vec<T>>>,
}

impl<T> ListedLists<T> {
    pub fn new(lists: Vec<GenPtr<Vec<T>>>) -> Self {
        Self { lists }
    }
}

impl<T: Debug> Generator<Vec<T>> for ListedLists<T> {
    fn value(&mut self, ctx: &mut Context) -> Result<Vec<T>, RuntimeMsg> {
        let mut result = Vec::new();
        for l in self.lists.iter_mut() {
            result.extend(l.value(ctx)?);
        }
        Ok(result)
    }

    fn is_constant(&self) -> bool {
        self.lists.iter().all(|l| l.is_constant())
    }
}

/// Pure one-argument function: casts, negation, most built-in functions.
pub struct Map<A, R> {
    arg: GenPtr<A>,
    f: fn(A) -> R,
    name: &'static str,
}

impl<A, R> Map<A, R> {
    pub fn new(name: &'static str, arg: GenPtr<A>, f: fn(A) -> R) -> Self {
        Self { arg, f, name }
    }
}

impl<A: Debug, R> Debug for Map<A, R> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}({:?})", self.name, self.arg)
    }
}

impl<A: Debug, R> Generator<R> for Map<A, R> {
    fn value(&mut self, ctx: &mut Context) -> Result<R, RuntimeMsg> {
        Ok((self.f)(self.arg.value(ctx)?))
    }

    fn is_constant(&self) -> bool {
        self.arg.is_constant()
    }
}

/// Pure two-argument function; operands are evaluated left to right.
pub struct Map2<A, B, R> {
    a: GenPtr<A>,
    b: GenPtr<B>,
    f: fn(A, B) -> R,
    name: &'static str,
}

impl<A, B, R> Map2<A, B, R> {
    pub fn new(name: &'static str, a: GenPtr<A>, b: GenPtr<B>, f: fn(A, B) -> R) -> Self {
        Self { a, b, f, name }
    }
}

impl<A: Debug, B: Debug, R> Debug for Map2<A, B, R> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}({:?}, {:?})", self.name, self.a, self.b)
    }
}

impl<A: Debug, B: Debug, R> Generator<R> for Map2<A, B, R> {
    fn value(&mut self, ctx: &mut Context) -> Result<R, RuntimeMsg> {
        let a = self.a.value(ctx)?;
        let b = self.b.value(ctx)?;
        Ok((self.f)(a, b))
    }

    fn is_constant(&self) -> bool {
        self.a.is_constant() && self.b.is_constant()
    }
}

pub struct Map3<A, B, C, R> {
    a: GenPtr<A>,
    b: GenPtr<B>,
    c: GenPtr<C>,
    f: fn(A, B, C) -> R,
    name: &'static str,
}

impl<A, B, C, R> Map3<A, B, C, R> {
    pub fn new(
        name: &'static str,
        a: GenPtr<A>,
        b: GenPtr<B>,
        c: GenPtr<C>,
        f: fn(A, B, C) -> R,
    ) -> Self {
        Self { a, b, c, f, name }
    }
}

impl<A: Debug, B: Debug, C: Debug, R> Debug for Map3<A, B, C, R> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}({:?}, {:?}, {:?})", self.name, self.a, self.b, self.c)
    }
}

impl<A: Debug, B: Debug, C: Debug, R> Generator<R> for Map3<A, B, C, R> {
    fn value(&mut self, ctx: &mut Context) -> Result<R, RuntimeMsg> {
        let a = self.a.value(ctx)?;
        let b = self.b.value(ctx)?;
        let c = self.c.value(ctx)?;
        Ok((self.f)(a, b, c))
    }

    fn is_constant(&self) -> bool {
        self.a.is_constant() && self.b.is_constant() && self.c.is_constant()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::Value;

    #[derive(Debug)]
    struct Counting(usize);

    impl Generator<Number> for Counting {
        fn value(&mut self, _ctx: &mut Context) -> Result<Number, RuntimeMsg> {
            self.0 += 1;
            Ok(Number::Int(self.0 as i64))
        }
    }

    #[test]
    fn ternary_evaluates_taken_branch_only() {
        let mut ctx = Context::new("/");
        let mut t = Ternary::new(
            Box::new(Constant::new(true)),
            Box::new(Constant::new(Number::Int(1))),
            Box::new(Map::new("fail", Box::new(Counting(0)), |_| -> Number {
                panic!("right branch evaluated")
            })),
        );
        assert_eq!(t.value(&mut ctx).unwrap(), Number::Int(1));
        assert!(!t.is_constant());
    }

    #[test]
    fn list_element_out_of_range() {
        let mut ctx = Context::new("/");
        let list = || -> GenPtr<Vec<String>> {
            Box::new(Constant::new(vec!["a".to_string(), "b".to_string()]))
        };
        let mut first = ListElement::new(list(), Box::new(Constant::new(Number::Int(0))));
        let mut outside = ListElement::new(list(), Box::new(Constant::new(Number::Int(2))));
        let mut negative = ListElement::new(list(), Box::new(Constant::new(Number::Int(-1))));
        assert_eq!(first.value(&mut ctx).unwrap(), "a");
        assert_eq!(outside.value(&mut ctx).unwrap(), "");
        assert_eq!(negative.value(&mut ctx).unwrap(), "");
    }

    #[test]
    fn unassigned_variable_reads_default() {
        let mut ctx = Context::new("/");
        let mut var: VariableRef<Number> = VariableRef::new("x");
        assert_eq!(var.value(&mut ctx).unwrap(), Number::Int(0));
        ctx.variables.assign("x", Value::Number(Number::Int(4))).unwrap();
        assert_eq!(var.value(&mut ctx).unwrap(), Number::Int(4));
    }
}
