use crate::context::{Context, FrameId};
use crate::generator::{DefPtr, Definition, OrderKeys};
use crate::lang::RuntimeMsg;

/// `definition order by ...`: the base is drained once per pass, keys are
/// evaluated once per element, then elements are handed out in key order.
#[derive(Debug)]
pub struct OrderBy {
    base: DefPtr,
    frame: FrameId,
    keys: OrderKeys,
    sorted: Option<std::vec::IntoIter<String>>,
    current: Option<String>,
}

impl OrderBy {
    pub fn new(base: DefPtr, frame: FrameId, keys: OrderKeys) -> Self {
        Self {
            base,
            frame,
            keys,
            sorted: None,
            current: None,
        }
    }

    fn load(&mut self, ctx: &mut Context) -> Result<Vec<String>, RuntimeMsg> {
        let mut values = Vec::new();
        let mut rows = Vec::new();
        self.base.reset();
        while self.base.has_next(ctx)? {
            if !ctx.is_running() {
                self.base.reset();
                return Ok(Vec::new());
            }
            let value = self.base.current().unwrap_or_default().to_string();
            ctx.set_file(self.frame, value.clone(), values.len() as i64);
            rows.push(self.keys.evaluate(ctx)?);
            values.push(value);
        }
        self.base.reset();
        let order = self.keys.permutation(&rows);
        tracing::trace!("ordered {} elements by {} keys", values.len(), self.keys.len());
        let mut slots: Vec<Option<String>> = values.into_iter().map(Some).collect();
        Ok(order.into_iter().filter_map(|i| slots[i].take()).collect())
    }
}

impl Definition for OrderBy {
    fn has_next(&mut self, ctx: &mut Context) -> Result<bool, RuntimeMsg> {
        if self.sorted.is_none() {
            self.sorted = Some(self.load(ctx)?.into_iter());
        }
        self.current = self.sorted.as_mut().and_then(|s| s.next());
        Ok(self.current.is_some())
    }

    fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    fn reset(&mut self) {
        self.sorted = None;
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Attribute, FrameKind};
    use crate::generator::definition::tests::{drain, listed};
    use crate::generator::{AttributeValue, OrderKey};

    #[test]
    fn by_extension_then_name() {
        let mut ctx = Context::new("/data");
        let frame = ctx.open_frame(FrameKind::File);
        let mut keys = OrderKeys::new();
        keys.push(OrderKey::String(Box::new(AttributeValue::new(frame, Attribute::Extension))), false);
        keys.push(OrderKey::String(Box::new(AttributeValue::new(frame, Attribute::Name))), true);
        let base = listed(&["b.txt", "a.png", "c.txt", "a.txt"]);
        let mut def: DefPtr = Box::new(OrderBy::new(base, frame, keys));
        assert_eq!(drain(&mut def, &mut ctx), vec!["a.png", "c.txt", "b.txt", "a.txt"]);
        assert!(!def.has_next(&mut ctx).unwrap());
        def.reset();
        assert_eq!(drain(&mut def, &mut ctx).len(), 4);
    }

    #[test]
    fn equal_keys_keep_order() {
        let mut ctx = Context::new("/");
        let frame = ctx.open_frame(FrameKind::File);
        let mut keys = OrderKeys::new();
        keys.push(OrderKey::Number(Box::new(AttributeValue::new(frame, Attribute::Depth))), false);
        let base = listed(&["x/y", "b", "a/c", "a"]);
        let mut def: DefPtr = Box::new(OrderBy::new(base, frame, keys));
        assert_eq!(drain(&mut def, &mut ctx), vec!["b", "a", "x/y", "a/c"]);
    }
}
