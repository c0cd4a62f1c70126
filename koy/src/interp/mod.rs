//! Tree-walking interpreter
//!
//! Evaluates parsed Koy expressions and programs against three namespaces:
//! chained variable frames, a flat function table and a flat object table.

mod env;
mod error;
mod eval;
mod value;

pub use env::{child_env, Bindings, EnvRef, Environment, Mutability};
pub use error::{ErrorCategory, ErrorKind, InterpResult, RuntimeError};
pub use eval::Interpreter;
pub use value::{FunctionValue, Value};
