//! Runtime values for the interpreter

use super::error::{InterpResult, RuntimeError};
use crate::ast::Expr;
use std::fmt;
use std::rc::Rc;

/// Runtime value
#[derive(Debug, Clone)]
pub enum Value {
    /// 64-bit integer
    Int(i64),
    Bool(bool),
    Str(String),
    Array(Vec<Value>),
    /// Elements are unique; kept in first-insertion order
    Set(Vec<Value>),
    /// Properties in insertion order, names unique
    Object(Vec<(String, Value)>),
    Function(Rc<FunctionValue>),
    Nil,
}

/// Function value: parameters and body only.
///
/// Nothing is captured; free names resolve against the caller's frames.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionValue {
    pub params: Vec<String>,
    pub body: Vec<Expr>,
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// Build a set, dropping elements equal to an earlier one
    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        let mut unique: Vec<Value> = Vec::new();
        for item in items {
            if !unique.contains(&item) {
                unique.push(item);
            }
        }
        Value::Set(unique)
    }

    /// Build an object; a repeated name keeps its first position and takes the later value
    pub fn object(properties: impl IntoIterator<Item = (String, Value)>) -> Self {
        let mut fields: Vec<(String, Value)> = Vec::new();
        for (name, value) in properties {
            match fields.iter_mut().find(|(existing, _)| *existing == name) {
                Some(slot) => slot.1 = value,
                None => fields.push((name, value)),
            }
        }
        Value::Object(fields)
    }

    pub fn function(params: Vec<String>, body: Vec<Expr>) -> Self {
        Value::Function(Rc::new(FunctionValue { params, body }))
    }

    /// Get type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Set(_) => "set",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
            Value::Nil => "nil",
        }
    }

    pub fn as_int(&self) -> InterpResult<i64> {
        match self {
            Value::Int(n) => Ok(*n),
            other => Err(RuntimeError::type_error("int", other.type_name())),
        }
    }

    pub fn as_bool(&self) -> InterpResult<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(RuntimeError::type_error("bool", other.type_name())),
        }
    }

    pub fn as_str(&self) -> InterpResult<&str> {
        match self {
            Value::Str(s) => Ok(s),
            other => Err(RuntimeError::type_error("string", other.type_name())),
        }
    }

    pub fn as_array(&self) -> InterpResult<&[Value]> {
        match self {
            Value::Array(items) => Ok(items),
            other => Err(RuntimeError::type_error("array", other.type_name())),
        }
    }

    pub fn as_set(&self) -> InterpResult<&[Value]> {
        match self {
            Value::Set(items) => Ok(items),
            other => Err(RuntimeError::type_error("set", other.type_name())),
        }
    }

    pub fn as_object(&self) -> InterpResult<&[(String, Value)]> {
        match self {
            Value::Object(fields) => Ok(fields),
            other => Err(RuntimeError::type_error("object", other.type_name())),
        }
    }

    pub fn as_function(&self) -> InterpResult<&Rc<FunctionValue>> {
        match self {
            Value::Function(f) => Ok(f),
            other => Err(RuntimeError::type_error("function", other.type_name())),
        }
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Value::Set(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Look up an object member
    pub fn property(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object(fields) => fields.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// `==` as the language sees it: Nil compares with anything, other
    /// operands must share a comparable kind
    pub fn equals(&self, other: &Value) -> InterpResult<bool> {
        match (self, other) {
            (Value::Nil, _) | (_, Value::Nil) => Ok(self.is_nil() && other.is_nil()),
            (Value::Int(_), Value::Int(_))
            | (Value::Bool(_), Value::Bool(_))
            | (Value::Str(_), Value::Str(_))
            | (Value::Array(_), Value::Array(_))
            | (Value::Set(_), Value::Set(_))
            | (Value::Object(_), Value::Object(_)) => Ok(self == other),
            _ => Err(RuntimeError::incompatible_operands(
                "==",
                self.type_name(),
                other.type_name(),
            )),
        }
    }

    /// `collection->index`: `None` unless an array is indexed in range
    pub fn index(&self, index: &Value) -> Option<Value> {
        let items = self.as_array().ok()?;
        let i = usize::try_from(index.as_int().ok()?).ok()?;
        items.get(i).cloned()
    }

    /// `collection<-element`: a new array or set with `element` added
    pub fn pushed(&self, element: Value) -> InterpResult<Value> {
        match self {
            Value::Array(items) => {
                let mut items = items.clone();
                items.push(element);
                Ok(Value::Array(items))
            }
            Value::Set(items) => {
                let mut items = items.clone();
                if !items.contains(&element) {
                    items.push(element);
                }
                Ok(Value::Set(items))
            }
            other => Err(RuntimeError::type_error("array or set", other.type_name())),
        }
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    write!(f, "[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "]")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Array(items) | Value::Set(items) => write_seq(f, items),
            Value::Object(fields) => {
                write!(f, "{{")?;
                for (i, (k, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}={v}")?;
                }
                write!(f, "}}")
            }
            Value::Function(func) => write!(f, "Function[params=[{}]]", func.params.join(", ")),
            Value::Nil => Ok(()),
        }
    }
}

/// Structural equality; sets and objects ignore order, and values of
/// different kinds are simply unequal
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => a.len() == b.len() && a.iter().all(|x| b.contains(x)),
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(k, v)| other.property(k) == Some(v))
            }
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            _ => false,
        }
    }
}
