mod error;

pub(crate) use error::LanguageError;
pub use error::{RuntimeError, RuntimeMsg, SyntaxError};
