//! All necessary components to parse and run a Perun script.
//!
//! Perun is a small language for scripting the filesystem. A script is a list
//! of commands separated by semicolons; values are typed (bool, number, string,
//! time, period and lists of these) and whole directories are enumerated
//! lazily through definitions such as `files` or `'*.txt'`.
//!
//! The whole script is tokenized and parsed before anything runs, so a syntax
//! error anywhere aborts it without side effects.
//!
//! ```
//! use perun_interpreter::*;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let config = InterpreterConfig {
//!     location: dir.path().to_string_lossy().into_owned(),
//!     dry_run: false,
//! };
//! let mut interpreter = Interpreter::new(config);
//! let code = interpreter
//!     .run_str("create 'notes.txt'; files { print }")
//!     .unwrap();
//! assert_eq!(code, 0);
//! assert!(dir.path().join("notes.txt").exists());
//! ```
//!
//! # Commands
//!
//! ## File commands
//! `create`, `createfile`, `createdirectory`, `delete`, `copy`, `move` and
//! `rename`, optionally preceded by `force` (replace what is in the way) or
//! `stack` (pick a free name such as `a(2).txt`). Without a subject they act
//! on `this`. A failure does not stop the script; it sets `success` to false.
//!
//! ```text
//! copy '*.txt' to 'backup';
//! stack move this to 'old' as 'report';
//! ```
//!
//! ## Structures
//! `if`/`else`, `while`, `n times { }`, `collection { }` to iterate and
//! `inside` to run a block in another directory. Within an iteration `this`
//! holds the current element and `index` counts from 0.
//!
//! ## Others
//! `print`, `sleep`, `break`, `continue`, `exit` and `error [code]`, plus
//! assignments: `x = value`, `x += value`, `x++`.
//!
//! # Expressions
//!
//! ## Definitions
//! `files`, `directories`, `recursivefiles`, `recursivedirectories` and quoted
//! patterns like `'src/*.rs'` are enumerated on demand. They can be filtered
//! with `where`, `order by`, `limit`, `skip`, `every` and `final`.
//!
//! ## Attributes
//! Inside a file frame, words like `size`, `modification`, `extension` or
//! `isdirectory` read the current file. They are computed only when the script
//! actually uses them.

mod errors;
mod interpretor;

pub mod command;
pub mod context;
pub mod datatype;
pub mod generator;
pub mod lang;
pub mod parse;
pub mod processing;
pub mod tokens;

pub use context::Context;
pub use errors::InterpreterError;
pub use interpretor::{tokenize, Interpreter, InterpreterConfig};
