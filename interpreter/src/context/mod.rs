//! Process object threaded through parsing and execution.

mod attribute;
mod frames;

use std::collections::HashMap;
use std::fmt::{Debug, Display, Error, Formatter};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub use attribute::{Attribute, AttributeMask};
pub use frames::{Frame, FrameId, FrameKind};

use crate::datatype::{Number, Value, ValueType};
use crate::processing::general::{FileData, FilesystemExecutor, FilesystemQuerier, VariableStorage, VariableStorer};
use crate::processing::paths;

/// Control flow requested by the last executed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Break,
    Continue,
    Exit(i32),
}

pub struct Context {
    pub filesystem: Box<dyn FilesystemQuerier>,
    pub variables: Box<dyn VariableStorer>,
    pub out: Box<dyn Write>,
    pub state: RunState,
    /// Outcome of the last file command (`success`).
    pub success: bool,
    frames: Vec<Frame>,
    // parse-time only
    stack: Vec<FrameId>,
    types: HashMap<String, ValueType>,
    loops: usize,
    running: Arc<AtomicBool>,
}

const ROOT: FrameId = FrameId(0);

impl Context {
    pub fn new(location: &str) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        Self::with_collaborators(
            location,
            Box::new(FilesystemExecutor::new(running.clone())),
            Box::new(std::io::stdout()),
            running,
        )
    }

    pub fn with_collaborators(
        location: &str,
        filesystem: Box<dyn FilesystemQuerier>,
        out: Box<dyn Write>,
        running: Arc<AtomicBool>,
    ) -> Self {
        let mut root = Frame::new(FrameKind::Location, ROOT);
        root.path = paths::trim(location);
        Self {
            filesystem,
            variables: Box::new(VariableStorage::default()),
            out,
            state: RunState::Running,
            success: true,
            frames: vec![root],
            stack: vec![ROOT],
            types: HashMap::new(),
            loops: 0,
            running,
        }
    }

    // parse-time scope

    pub fn variable_type(&self, name: &str) -> Option<ValueType> {
        self.types.get(name).copied()
    }

    /// Register `name` with type `t`; returns the earlier type if it already existed.
    pub fn declare_variable(&mut self, name: &str, t: ValueType) -> Option<ValueType> {
        match self.types.get(name) {
            Some(existing) => Some(*existing),
            None => {
                tracing::debug!("declared variable `{}` of type {}", name, t);
                self.types.insert(name.to_string(), t);
                None
            }
        }
    }

    /// Open a frame for the duration of `f`. The frame is closed even when `f` fails.
    pub fn within<T, E, F>(&mut self, kind: FrameKind, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self, FrameId) -> Result<T, E>,
    {
        let id = self.open_frame(kind);
        self.stack.push(id);
        let result = f(self, id);
        self.stack.pop();
        result
    }

    /// Re-enter an already allocated frame (definition filters reuse the base frame).
    pub fn within_frame<T, E, F>(&mut self, id: FrameId, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
    {
        self.stack.push(id);
        let result = f(self);
        self.stack.pop();
        result
    }

    /// Allocate a frame without entering it.
    pub fn open_frame(&mut self, kind: FrameKind) -> FrameId {
        let id = FrameId(self.frames.len());
        self.frames.push(Frame::new(kind, self.current_location()));
        id
    }

    pub fn within_loop<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
    {
        self.loops += 1;
        let result = f(self);
        self.loops -= 1;
        result
    }

    pub fn in_loop(&self) -> bool {
        self.loops > 0
    }

    fn innermost<P: Fn(&FrameKind) -> bool>(&self, predicate: P) -> Option<FrameId> {
        self.stack
            .iter()
            .rev()
            .copied()
            .find(|id| predicate(&self.frames[id.0].kind))
    }

    pub fn innermost_this(&self) -> Option<FrameId> {
        self.innermost(|k| k.has_this())
    }

    pub fn innermost_file(&self) -> Option<FrameId> {
        self.innermost(|k| *k == FrameKind::File)
    }

    pub fn innermost_index(&self) -> Option<FrameId> {
        self.innermost(|k| k.has_index())
    }

    pub fn current_location(&self) -> FrameId {
        self.innermost(|k| *k == FrameKind::Location).unwrap_or(ROOT)
    }

    pub fn add_attribute(&mut self, id: FrameId, mask: AttributeMask) {
        self.frames[id.0].attributes.add(mask);
    }

    // runtime

    pub fn frame(&self, id: FrameId) -> &Frame {
        &self.frames[id.0]
    }

    pub fn frame_mut(&mut self, id: FrameId) -> &mut Frame {
        &mut self.frames[id.0]
    }

    pub fn location(&self, id: FrameId) -> &str {
        &self.frames[id.0].path
    }

    pub fn root_location(&self) -> &str {
        self.location(ROOT)
    }

    pub fn set_location(&mut self, id: FrameId, path: String) {
        self.frames[id.0].path = path;
    }

    /// Point a file frame at a new element; metadata is reloaded lazily.
    ///
    /// `depth` counts the directories between the location and a relative element.
    pub fn set_file(&mut self, id: FrameId, this: String, index: i64) {
        let location = self.frames[id.0].location;
        let path = paths::join(&self.frames[location.0].path, &this);
        let depth = if paths::is_absolute(&this) {
            0
        } else {
            paths::depth(&paths::trim(&this))
        };
        let frame = &mut self.frames[id.0];
        frame.path = path;
        frame.this = Value::String(this);
        frame.index = Number::Int(index);
        frame.depth = Number::Int(depth);
        frame.data = None;
    }

    pub fn set_this(&mut self, id: FrameId, this: Value, index: i64) {
        let frame = &mut self.frames[id.0];
        frame.this = this;
        frame.index = Number::Int(index);
    }

    pub fn set_index(&mut self, id: FrameId, index: i64) {
        self.frames[id.0].index = Number::Int(index);
    }

    pub fn file_data(&mut self, id: FrameId) -> &FileData {
        let frame = &self.frames[id.0];
        if frame.data.is_none() {
            let data = self.filesystem.file_data(&frame.path, frame.attributes);
            self.frames[id.0].data = Some(data);
        }
        self.frames[id.0].data.get_or_insert_with(FileData::default)
    }

    /// Drop cached metadata after the element changed on disk.
    pub fn forget_data(&mut self, id: FrameId) {
        self.frames[id.0].data = None;
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed) && !matches!(self.state, RunState::Exit(_))
    }

    /// Shared flag; clearing it makes every enumeration stop at its next step.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }
}

impl Default for Context {
    fn default() -> Self {
        let location = std::env::current_dir()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "/".to_string());
        Self::new(&location)
    }
}

impl Debug for Context {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        f.debug_struct("Context")
            .field("filesystem", &self.filesystem)
            .field("variables", &self.variables)
            .field("state", &self.state)
            .field("frames", &self.frames.len())
            .finish()
    }
}

impl Display for Context {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(f, "Context{{...}}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_pop_on_failure() {
        let mut ctx = Context::new("/tmp");
        let result: Result<(), String> = ctx.within(FrameKind::File, |ctx, id| {
            assert_eq!(ctx.innermost_this(), Some(id));
            Err("body failed".into())
        });
        assert!(result.is_err());
        assert_eq!(ctx.innermost_this(), None);
    }

    #[test]
    fn file_frame_paths() {
        let mut ctx = Context::new("/tmp/root");
        let id = ctx.open_frame(FrameKind::File);
        ctx.set_file(id, "a/b.txt".into(), 3);
        assert_eq!(ctx.frame(id).path, "/tmp/root/a/b.txt");
        assert_eq!(ctx.frame(id).index, Number::Int(3));
    }

    #[test]
    fn variables_keep_first_type() {
        let mut ctx = Context::new("/");
        assert_eq!(ctx.declare_variable("x", ValueType::Number), None);
        assert_eq!(
            ctx.declare_variable("x", ValueType::String),
            Some(ValueType::Number)
        );
    }
}
