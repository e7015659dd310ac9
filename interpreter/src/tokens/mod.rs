mod brackets;
mod error;
mod keyword;
mod token_enum;
mod tokenizer;
mod view;

pub use brackets::check_brackets;
pub use error::{ParseError, TokenError};
pub use keyword::Keyword;
pub use token_enum::{NumberMode, Token, TokenKind};
pub use tokenizer::Tokenizer;
pub use view::*;
