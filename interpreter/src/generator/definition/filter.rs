use std::collections::VecDeque;

use crate::context::{Context, FrameId};
use crate::datatype::Number;
use crate::generator::{DefPtr, Definition, GenPtr, NumberFilter};
use crate::lang::RuntimeMsg;

/// `definition where condition`. Skipped elements are pulled transparently,
/// so one visible step can read many elements of the base.
#[derive(Debug)]
pub struct WhereFilter {
    base: DefPtr,
    frame: FrameId,
    condition: GenPtr<bool>,
    position: i64,
    finished: bool,
}

impl WhereFilter {
    pub fn new(base: DefPtr, frame: FrameId, condition: GenPtr<bool>) -> Self {
        Self {
            base,
            frame,
            condition,
            position: 0,
            finished: false,
        }
    }
}

impl Definition for WhereFilter {
    fn has_next(&mut self, ctx: &mut Context) -> Result<bool, RuntimeMsg> {
        if self.finished {
            return Ok(false);
        }
        while self.base.has_next(ctx)? {
            if !ctx.is_running() {
                break;
            }
            let value = self.base.current().unwrap_or_default().to_string();
            ctx.set_file(self.frame, value, self.position);
            self.position += 1;
            if self.condition.value(ctx)? {
                return Ok(true);
            }
        }
        self.finished = true;
        Ok(false)
    }

    fn current(&self) -> Option<&str> {
        if self.finished {
            None
        } else {
            self.base.current()
        }
    }

    fn reset(&mut self) {
        self.base.reset();
        self.position = 0;
        self.finished = false;
    }
}

/// `limit`, `skip` and `every`: counting only, no context needed.
#[derive(Debug)]
pub struct CountFilter {
    base: DefPtr,
    filter: NumberFilter,
    number: GenPtr<Number>,
    // evaluated at the start of every pass
    n: Option<i64>,
    position: i64,
    finished: bool,
}

impl CountFilter {
    pub fn new(base: DefPtr, filter: NumberFilter, number: GenPtr<Number>) -> Self {
        Self {
            base,
            filter,
            number,
            n: None,
            position: 0,
            finished: false,
        }
    }

    fn stop(&mut self) -> Result<bool, RuntimeMsg> {
        self.finished = true;
        self.base.reset();
        Ok(false)
    }
}

impl Definition for CountFilter {
    fn has_next(&mut self, ctx: &mut Context) -> Result<bool, RuntimeMsg> {
        if self.finished {
            return Ok(false);
        }
        let n = match self.n {
            Some(n) => n,
            None => {
                let number = self.number.value(ctx)?;
                let n = if number.is_nan() { 0 } else { number.to_i64() };
                self.n = Some(n);
                n
            }
        };
        match self.filter {
            NumberFilter::Limit => {
                if self.position >= n {
                    return self.stop();
                }
            }
            NumberFilter::Skip => {
                while self.position < n {
                    if !self.base.has_next(ctx)? {
                        return self.stop();
                    }
                    self.position += 1;
                }
            }
            NumberFilter::Every => {
                if self.position > 0 {
                    for _ in 1..n.max(1) {
                        if !self.base.has_next(ctx)? {
                            return self.stop();
                        }
                    }
                }
            }
            NumberFilter::Final => {
                return Err(RuntimeMsg("final is handled by a buffered filter".into()))
            }
        }
        if !self.base.has_next(ctx)? {
            return self.stop();
        }
        self.position += 1;
        Ok(true)
    }

    fn current(&self) -> Option<&str> {
        if self.finished {
            None
        } else {
            self.base.current()
        }
    }

    fn reset(&mut self) {
        self.base.reset();
        self.n = None;
        self.position = 0;
        self.finished = false;
    }
}

/// `final n`: drains the base keeping only the last `n` elements.
#[derive(Debug)]
pub struct FinalFilter {
    base: DefPtr,
    number: GenPtr<Number>,
    buffer: Option<VecDeque<String>>,
    current: Option<String>,
}

impl FinalFilter {
    pub fn new(base: DefPtr, number: GenPtr<Number>) -> Self {
        Self {
            base,
            number,
            buffer: None,
            current: None,
        }
    }

    fn fill(&mut self, ctx: &mut Context) -> Result<VecDeque<String>, RuntimeMsg> {
        let number = self.number.value(ctx)?;
        let n = if number.is_nan() { 0 } else { number.to_i64() };
        let mut buffer = VecDeque::new();
        if n <= 0 {
            return Ok(buffer);
        }
        let n = n as usize;
        self.base.reset();
        while self.base.has_next(ctx)? {
            if !ctx.is_running() {
                self.base.reset();
                return Ok(VecDeque::new());
            }
            if buffer.len() == n {
                buffer.pop_front();
            }
            buffer.push_back(self.base.current().unwrap_or_default().to_string());
        }
        self.base.reset();
        Ok(buffer)
    }
}

impl Definition for FinalFilter {
    fn has_next(&mut self, ctx: &mut Context) -> Result<bool, RuntimeMsg> {
        if self.buffer.is_none() {
            self.buffer = Some(self.fill(ctx)?);
        }
        self.current = self.buffer.as_mut().and_then(|b| b.pop_front());
        Ok(self.current.is_some())
    }

    fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    fn reset(&mut self) {
        self.buffer = None;
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FrameKind;
    use crate::generator::definition::tests::{drain, listed};
    use crate::generator::{Comparison, CompareOp, Constant, IndexRef};

    fn number(n: i64) -> GenPtr<Number> {
        Box::new(Constant::new(Number::Int(n)))
    }

    fn counted(filter: NumberFilter, n: i64) -> Vec<String> {
        let mut ctx = Context::new("/");
        let base = listed(&["a", "b", "c", "d", "e"]);
        let mut def: DefPtr = Box::new(CountFilter::new(base, filter, number(n)));
        let first = drain(&mut def, &mut ctx);
        assert!(!def.has_next(&mut ctx).unwrap());
        def.reset();
        assert_eq!(drain(&mut def, &mut ctx), first);
        first
    }

    #[test]
    fn counting() {
        assert_eq!(counted(NumberFilter::Limit, 2), vec!["a", "b"]);
        assert!(counted(NumberFilter::Limit, 0).is_empty());
        assert_eq!(counted(NumberFilter::Skip, 3), vec!["d", "e"]);
        assert_eq!(counted(NumberFilter::Skip, 9), Vec::<String>::new());
        assert_eq!(counted(NumberFilter::Every, 2), vec!["a", "c", "e"]);
        assert_eq!(counted(NumberFilter::Every, 0).len(), 5);
    }

    #[test]
    fn last_elements() {
        let mut ctx = Context::new("/");
        let mut def: DefPtr = Box::new(FinalFilter::new(listed(&["a", "b", "c"]), number(2)));
        assert_eq!(drain(&mut def, &mut ctx), vec!["b", "c"]);
        assert!(!def.has_next(&mut ctx).unwrap());
        def.reset();
        assert_eq!(drain(&mut def, &mut ctx), vec!["b", "c"]);
    }

    #[test]
    fn where_reads_the_frame() {
        let mut ctx = Context::new("/");
        let frame = ctx.open_frame(FrameKind::File);
        let odd = Comparison::new(Box::new(IndexRef::new(frame)), number(1), CompareOp::BiggerEquals);
        let base = listed(&["a", "b", "c"]);
        let mut def: DefPtr = Box::new(WhereFilter::new(base, frame, Box::new(odd)));
        assert_eq!(drain(&mut def, &mut ctx), vec!["b", "c"]);
        assert_eq!(def.current(), None);
    }
}
