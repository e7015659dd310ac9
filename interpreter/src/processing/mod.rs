mod filesystem;
pub mod paths;
mod variables;

pub mod general {
    pub use super::filesystem::{
        DirEntry, FileData, FilesystemExecutor, FilesystemQuerier, SortedReadDir,
    };
    pub use super::variables::{VariableStorage, VariableStorer};
}
