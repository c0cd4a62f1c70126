//! Koy Language Library
//!
//! Lexer, parser and tree-walking interpreter for Koy, a small dynamically
//! typed scripting language.

pub mod ast;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod util;

pub use ast::Span;
pub use error::{CompileError, Result};
