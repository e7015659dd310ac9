use super::{GenPtr, Generator};
use crate::context::Context;
use crate::lang::RuntimeMsg;

macro_rules! binary_logic {
    ($name:ident, |$l:ident, $r:ident, $ctx:ident| $body:expr) => {
        #[derive(Debug)]
        pub struct $name {
            left: GenPtr<bool>,
            right: GenPtr<bool>,
        }

        impl $name {
            pub fn new(left: GenPtr<bool>, right: GenPtr<bool>) -> Self {
                Self { left, right }
            }
        }

        impl Generator<bool> for $name {
            fn value(&mut self, $ctx: &mut Context) -> Result<bool, RuntimeMsg> {
                let $l = &mut self.left;
                let $r = &mut self.right;
                $body
            }

            fn is_constant(&self) -> bool {
                self.left.is_constant() && self.right.is_constant()
            }
        }
    };
}

binary_logic!(And, |l, r, ctx| Ok(l.value(ctx)? && r.value(ctx)?));
binary_logic!(Or, |l, r, ctx| Ok(l.value(ctx)? || r.value(ctx)?));
binary_logic!(Xor, |l, r, ctx| Ok(l.value(ctx)? ^ r.value(ctx)?));

#[derive(Debug)]
pub struct Not {
    inner: GenPtr<bool>,
}

impl Not {
    pub fn new(inner: GenPtr<bool>) -> Self {
        Self { inner }
    }
}

impl Generator<bool> for Not {
    fn value(&mut self, ctx: &mut Context) -> Result<bool, RuntimeMsg> {
        Ok(!self.inner.value(ctx)?)
    }

    fn is_constant(&self) -> bool {
        self.inner.is_constant()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Constant;

    fn c(b: bool) -> GenPtr<bool> {
        Box::new(Constant::new(b))
    }

    #[test]
    fn operators() {
        let mut ctx = Context::new("/");
        assert!(!And::new(c(true), c(false)).value(&mut ctx).unwrap());
        assert!(Or::new(c(false), c(true)).value(&mut ctx).unwrap());
        assert!(!Xor::new(c(true), c(true)).value(&mut ctx).unwrap());
        assert!(Not::new(c(false)).value(&mut ctx).unwrap());
        assert!(And::new(c(true), c(true)).is_constant());
    }
}
