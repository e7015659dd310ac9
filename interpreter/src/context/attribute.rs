use std::ops::BitOr;

use crate::datatype::ValueType;

/// File metadata an expression needs, collected while parsing so one read serves all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttributeMask(u32);

impl AttributeMask {
    pub const NONE: Self = Self(0);
    pub const EXISTENCE: Self = Self(1);
    pub const SIZE: Self = Self(1 << 1);
    pub const TIMES: Self = Self(1 << 2);
    pub const EMPTY: Self = Self(1 << 3);
    pub const ALL: Self = Self(0b1111);

    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn add(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl BitOr for AttributeMask {
    type Output = Self;

    fn bitor(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// Variables that exist only inside a file context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Name,
    FullName,
    Extension,
    Path,
    Parent,
    Drive,
    Depth,
    Exists,
    IsFile,
    IsDirectory,
    Hidden,
    Readonly,
    Empty,
    Archive,
    Compressed,
    Encrypted,
    Size,
    Access,
    Change,
    Creation,
    Modification,
    Lifetime,
}

impl Attribute {
    pub fn from_word(word: &str) -> Option<Self> {
        Some(match word {
            "name" => Self::Name,
            "fullname" => Self::FullName,
            "extension" => Self::Extension,
            "path" => Self::Path,
            "parent" => Self::Parent,
            "drive" => Self::Drive,
            "depth" => Self::Depth,
            "exists" => Self::Exists,
            "isfile" => Self::IsFile,
            "isdirectory" => Self::IsDirectory,
            "hidden" => Self::Hidden,
            "readonly" => Self::Readonly,
            "empty" => Self::Empty,
            "archive" => Self::Archive,
            "compressed" => Self::Compressed,
            "encrypted" => Self::Encrypted,
            "size" => Self::Size,
            "access" => Self::Access,
            "change" => Self::Change,
            "creation" => Self::Creation,
            "modification" => Self::Modification,
            "lifetime" => Self::Lifetime,
            _ => return None,
        })
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Name | Self::FullName | Self::Extension | Self::Path | Self::Parent | Self::Drive => {
                ValueType::String
            }
            Self::Depth | Self::Size => ValueType::Number,
            Self::Exists
            | Self::IsFile
            | Self::IsDirectory
            | Self::Hidden
            | Self::Readonly
            | Self::Empty
            | Self::Archive
            | Self::Compressed
            | Self::Encrypted => ValueType::Bool,
            Self::Access | Self::Change | Self::Creation | Self::Modification => ValueType::Time,
            Self::Lifetime => ValueType::Period,
        }
    }

    /// Metadata that must be read to produce this attribute.
    pub fn mask(&self) -> AttributeMask {
        match self {
            Self::Name
            | Self::FullName
            | Self::Extension
            | Self::Path
            | Self::Parent
            | Self::Drive
            | Self::Depth
            | Self::Archive
            | Self::Compressed
            | Self::Encrypted => AttributeMask::NONE,
            Self::Exists | Self::IsFile | Self::IsDirectory | Self::Hidden | Self::Readonly => {
                AttributeMask::EXISTENCE
            }
            Self::Empty => AttributeMask::EXISTENCE | AttributeMask::EMPTY,
            Self::Size => AttributeMask::EXISTENCE | AttributeMask::SIZE,
            Self::Access | Self::Change | Self::Creation | Self::Modification | Self::Lifetime => {
                AttributeMask::EXISTENCE | AttributeMask::TIMES
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_accumulate() {
        let mut mask = AttributeMask::NONE;
        mask.add(Attribute::Size.mask());
        mask.add(Attribute::Creation.mask());
        assert!(mask.contains(AttributeMask::SIZE));
        assert!(mask.contains(AttributeMask::TIMES));
        assert!(!mask.contains(AttributeMask::EMPTY));
        assert!(Attribute::Name.mask().is_empty());
    }
}
