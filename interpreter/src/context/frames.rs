use super::AttributeMask;
use crate::datatype::{Number, Value, ValueType};
use crate::processing::general::FileData;

/// Handle of a context frame. Generators keep these instead of references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Current directory (`inside`).
    Location,
    /// Iteration over paths: `this` is a string and file attributes are readable.
    File,
    /// Iteration over numbers or times: `this` has the element type.
    Value(ValueType),
    /// `N times` loops, only `index` is defined.
    Index,
}

impl FrameKind {
    pub fn has_this(&self) -> bool {
        matches!(self, Self::File | Self::Value(_))
    }

    pub fn has_index(&self) -> bool {
        !matches!(self, Self::Location)
    }

    pub fn this_type(&self) -> Option<ValueType> {
        match self {
            Self::File => Some(ValueType::String),
            Self::Value(t) => Some(*t),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct Frame {
    pub kind: FrameKind,
    /// Location frame that was innermost when this frame was opened.
    pub location: FrameId,
    pub this: Value,
    /// Absolute path of `this` (file frames) or the directory (location frames).
    pub path: String,
    pub index: Number,
    pub depth: Number,
    pub attributes: AttributeMask,
    pub(crate) data: Option<FileData>,
}

impl Frame {
    pub(crate) fn new(kind: FrameKind, location: FrameId) -> Self {
        let this = match kind {
            FrameKind::Value(t) => Value::default_of(t),
            _ => Value::String(String::new()),
        };
        Self {
            kind,
            location,
            this,
            path: String::new(),
            index: Number::Int(0),
            depth: Number::Int(0),
            attributes: AttributeMask::NONE,
            data: None,
        }
    }
}
