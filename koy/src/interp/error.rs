//! Runtime errors for the interpreter

use crate::util::format_suggestion_hint;
use std::fmt;

/// Runtime error during interpretation
#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Kinds of runtime errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Identifier bound in neither the variable chain nor the object table
    UndefinedVariable,
    /// Call of a name missing from the function table
    UndefinedFunction,
    /// Method-call receiver missing from the object table
    UndefinedObject,
    /// Member missing from an object
    UndefinedProperty,
    /// Name already declared in the same frame or table
    AlreadyDeclared,
    /// Labeled call without a label for some formal parameter
    MissingLabel,
    /// Type mismatch
    TypeError,
    /// Reassignment of a `val` binding
    Immutable,
    /// Argument count mismatch
    ArityMismatch,
    /// Division by zero
    DivisionByZero,
    /// Output sink failed
    IoError,
}

/// Coarse error classes reported to users
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Name,
    Type,
    Immutability,
    Arithmetic,
    Io,
}

impl ErrorKind {
    pub fn category(self) -> ErrorCategory {
        match self {
            ErrorKind::UndefinedVariable
            | ErrorKind::UndefinedFunction
            | ErrorKind::UndefinedObject
            | ErrorKind::UndefinedProperty
            | ErrorKind::AlreadyDeclared
            | ErrorKind::MissingLabel => ErrorCategory::Name,
            ErrorKind::TypeError | ErrorKind::ArityMismatch => ErrorCategory::Type,
            ErrorKind::Immutable => ErrorCategory::Immutability,
            ErrorKind::DivisionByZero => ErrorCategory::Arithmetic,
            ErrorKind::IoError => ErrorCategory::Io,
        }
    }
}

impl RuntimeError {
    pub fn undefined_variable(name: &str) -> Self {
        RuntimeError {
            kind: ErrorKind::UndefinedVariable,
            message: format!("undefined variable: {name}"),
        }
    }

    pub fn undefined_function(name: &str) -> Self {
        RuntimeError {
            kind: ErrorKind::UndefinedFunction,
            message: format!("undefined function: {name}"),
        }
    }

    pub fn undefined_object(name: &str) -> Self {
        RuntimeError {
            kind: ErrorKind::UndefinedObject,
            message: format!("undefined object: {name}"),
        }
    }

    pub fn undefined_property(member: &str) -> Self {
        RuntimeError {
            kind: ErrorKind::UndefinedProperty,
            message: format!("object has no member: {member}"),
        }
    }

    pub fn already_declared(name: &str) -> Self {
        RuntimeError {
            kind: ErrorKind::AlreadyDeclared,
            message: format!("{name} is already declared"),
        }
    }

    pub fn missing_label(func: &str, label: &str) -> Self {
        RuntimeError {
            kind: ErrorKind::MissingLabel,
            message: format!("missing label `{label}` in call to {func}"),
        }
    }

    pub fn type_error(expected: &str, got: &str) -> Self {
        RuntimeError {
            kind: ErrorKind::TypeError,
            message: format!("type error: expected {expected}, got {got}"),
        }
    }

    /// Binary operator applied to an unsupported pair of operands
    pub fn incompatible_operands(op: &str, left: &str, right: &str) -> Self {
        RuntimeError {
            kind: ErrorKind::TypeError,
            message: format!("type error: cannot apply `{op}` to {left} and {right}"),
        }
    }

    pub fn immutable(name: &str) -> Self {
        RuntimeError {
            kind: ErrorKind::Immutable,
            message: format!("cannot reassign val {name}"),
        }
    }

    pub fn arity_mismatch(name: &str, expected: usize, got: usize) -> Self {
        RuntimeError {
            kind: ErrorKind::ArityMismatch,
            message: format!("function {name} expects {expected} argument(s), got {got}"),
        }
    }

    pub fn division_by_zero() -> Self {
        RuntimeError {
            kind: ErrorKind::DivisionByZero,
            message: "division by zero".to_string(),
        }
    }

    pub fn io_error(msg: &str) -> Self {
        RuntimeError {
            kind: ErrorKind::IoError,
            message: format!("IO error: {msg}"),
        }
    }

    /// Append a "did you mean" hint when a close name exists
    pub fn with_suggestion(mut self, suggestion: Option<&str>) -> Self {
        self.message.push_str(&format_suggestion_hint(suggestion));
        self
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Runtime error: {}", self.message)
    }
}

impl std::error::Error for RuntimeError {}

/// Result type for interpreter operations
pub type InterpResult<T> = Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_variable() {
        let err = RuntimeError::undefined_variable("foo");
        assert_eq!(err.kind, ErrorKind::UndefinedVariable);
        assert!(err.message.contains("foo"));
    }

    #[test]
    fn test_undefined_function() {
        let err = RuntimeError::undefined_function("bar");
        assert_eq!(err.kind, ErrorKind::UndefinedFunction);
        assert!(err.message.contains("bar"));
    }

    #[test]
    fn test_type_error() {
        let err = RuntimeError::type_error("int", "bool");
        assert_eq!(err.kind, ErrorKind::TypeError);
        assert_eq!(err.message, "type error: expected int, got bool");
    }

    #[test]
    fn test_arity_mismatch_message_exact() {
        let err = RuntimeError::arity_mismatch("add", 2, 1);
        assert_eq!(err.message, "function add expects 2 argument(s), got 1");
    }

    #[test]
    fn test_display_prefix() {
        let err = RuntimeError::immutable("n");
        insta::assert_snapshot!(err.to_string(), @"Runtime error: cannot reassign val n");
    }

    #[test]
    fn test_with_suggestion() {
        let err = RuntimeError::undefined_variable("conut").with_suggestion(Some("count"));
        assert!(err.message.starts_with("undefined variable: conut"));
        assert!(err.message.contains("did you mean `count`?"));

        let plain = RuntimeError::undefined_variable("zzz").with_suggestion(None);
        assert_eq!(plain.message, "undefined variable: zzz");
    }

    #[test]
    fn test_categories() {
        assert_eq!(RuntimeError::already_declared("n").category(), ErrorCategory::Name);
        assert_eq!(RuntimeError::missing_label("f", "x").category(), ErrorCategory::Name);
        assert_eq!(RuntimeError::undefined_property("age").category(), ErrorCategory::Name);
        assert_eq!(
            RuntimeError::incompatible_operands("==", "array", "set").category(),
            ErrorCategory::Type
        );
        assert_eq!(RuntimeError::immutable("n").category(), ErrorCategory::Immutability);
        assert_eq!(RuntimeError::division_by_zero().category(), ErrorCategory::Arithmetic);
    }

    #[test]
    fn test_runtime_error_error_source_none() {
        let err = RuntimeError::division_by_zero();
        let std_err: &dyn std::error::Error = &err;
        assert!(std_err.source().is_none());
    }
}
