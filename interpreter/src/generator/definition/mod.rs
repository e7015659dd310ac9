//! Lazily enumerated collections of paths.

mod filter;
mod order;
mod pattern;

pub use filter::{CountFilter, FinalFilter, WhereFilter};
pub use order::OrderBy;
pub use pattern::{EntryKind, PatternDefinition};

use super::{DefPtr, Definition, GenPtr, Generator};
use crate::context::Context;
use crate::datatype::List;
use crate::lang::RuntimeMsg;

/// A list value enumerated as a definition; the list is evaluated once per pass.
#[derive(Debug)]
pub struct ListDefinition {
    list: GenPtr<List>,
    values: Option<std::vec::IntoIter<String>>,
    current: Option<String>,
}

impl ListDefinition {
    pub fn new(list: GenPtr<List>) -> Self {
        Self {
            list,
            values: None,
            current: None,
        }
    }
}

impl Definition for ListDefinition {
    fn has_next(&mut self, ctx: &mut Context) -> Result<bool, RuntimeMsg> {
        if self.values.is_none() {
            self.values = Some(self.list.value(ctx)?.into_iter());
        }
        self.current = self.values.as_mut().and_then(|v| v.next());
        Ok(self.current.is_some())
    }

    fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    fn reset(&mut self) {
        // an exhausted iterator stays put until the next reset
        self.values = None;
        self.current = None;
    }
}

/// `a, b`: everything from `left`, then everything from `right`.
#[derive(Debug)]
pub struct Join {
    left: DefPtr,
    right: DefPtr,
    on_left: bool,
    finished: bool,
}

impl Join {
    pub fn new(left: DefPtr, right: DefPtr) -> Self {
        Self {
            left,
            right,
            on_left: true,
            finished: false,
        }
    }
}

impl Definition for Join {
    fn has_next(&mut self, ctx: &mut Context) -> Result<bool, RuntimeMsg> {
        if self.finished {
            return Ok(false);
        }
        if self.on_left {
            if self.left.has_next(ctx)? {
                return Ok(true);
            }
            self.on_left = false;
        }
        if self.right.has_next(ctx)? {
            return Ok(true);
        }
        self.finished = true;
        Ok(false)
    }

    fn current(&self) -> Option<&str> {
        if self.finished {
            None
        } else if self.on_left {
            self.left.current()
        } else {
            self.right.current()
        }
    }

    fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
        self.on_left = true;
        self.finished = false;
    }
}

/// `condition ? a : b` and `condition ? a` over definitions.
///
/// The condition is read once per pass, on the first step after a reset.
#[derive(Debug)]
pub struct ConditionalDefinition {
    condition: GenPtr<bool>,
    left: DefPtr,
    right: Option<DefPtr>,
    chosen: Option<bool>,
}

impl ConditionalDefinition {
    pub fn ternary(condition: GenPtr<bool>, left: DefPtr, right: DefPtr) -> Self {
        Self {
            condition,
            left,
            right: Some(right),
            chosen: None,
        }
    }

    pub fn binary(condition: GenPtr<bool>, left: DefPtr) -> Self {
        Self {
            condition,
            left,
            right: None,
            chosen: None,
        }
    }
}

impl Definition for ConditionalDefinition {
    fn has_next(&mut self, ctx: &mut Context) -> Result<bool, RuntimeMsg> {
        if self.chosen.is_none() {
            self.chosen = Some(self.condition.value(ctx)?);
        }
        match (self.chosen, self.right.as_mut()) {
            (Some(true), _) => self.left.has_next(ctx),
            (_, Some(right)) => right.has_next(ctx),
            _ => Ok(false),
        }
    }

    fn current(&self) -> Option<&str> {
        match (self.chosen, self.right.as_ref()) {
            (Some(true), _) => self.left.current(),
            (Some(false), Some(right)) => right.current(),
            _ => None,
        }
    }

    fn reset(&mut self) {
        self.chosen = None;
        self.left.reset();
        if let Some(right) = self.right.as_mut() {
            right.reset();
        }
    }
}

/// Materializes a definition; every evaluation walks it from the start.
#[derive(Debug)]
pub struct DefinitionToList {
    definition: DefPtr,
}

impl DefinitionToList {
    pub fn new(definition: DefPtr) -> Self {
        Self { definition }
    }
}

impl Generator<List> for DefinitionToList {
    fn value(&mut self, ctx: &mut Context) -> Result<List, RuntimeMsg> {
        self.definition.reset();
        let mut result = Vec::new();
        while self.definition.has_next(ctx)? {
            if !ctx.is_running() {
                break;
            }
            if let Some(v) = self.definition.current() {
                result.push(v.to_string());
            }
        }
        self.definition.reset();
        tracing::trace!("definition materialized into {} elements", result.len());
        Ok(result)
    }
}
