//! Binding tables and variable frames

use super::error::{InterpResult, RuntimeError};
use super::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared reference to an environment frame
pub type EnvRef = Rc<RefCell<Environment>>;

/// Which declaration form introduced a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    /// `val`: write-once
    Val,
    /// `mutable val`: rebindable
    MutableVal,
}

/// Val / mutable-val map pair. A name lives in at most one of the two.
///
/// Used directly for the flat function and object tables, and as the
/// storage of each variable frame.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    vals: HashMap<String, Value>,
    mutable_vals: HashMap<String, Value>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a new name; fails if either map already holds it
    pub fn declare(&mut self, name: &str, value: Value, mutability: Mutability) -> InterpResult<()> {
        if self.contains(name) {
            return Err(RuntimeError::already_declared(name));
        }
        let map = match mutability {
            Mutability::Val => &mut self.vals,
            Mutability::MutableVal => &mut self.mutable_vals,
        };
        map.insert(name.to_string(), value);
        Ok(())
    }

    pub fn set_val(&mut self, name: &str, value: Value) -> InterpResult<()> {
        self.declare(name, value, Mutability::Val)
    }

    pub fn set_mutable_val(&mut self, name: &str, value: Value) -> InterpResult<()> {
        self.declare(name, value, Mutability::MutableVal)
    }

    /// Rebind an existing mutable name in place.
    ///
    /// Returns `Ok(false)` when the name is not here at all.
    pub fn reassign(&mut self, name: &str, value: Value) -> InterpResult<bool> {
        if let Some(slot) = self.mutable_vals.get_mut(name) {
            *slot = value;
            Ok(true)
        } else if self.vals.contains_key(name) {
            Err(RuntimeError::immutable(name))
        } else {
            Ok(false)
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vals.get(name).or_else(|| self.mutable_vals.get(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vals.contains_key(name) || self.mutable_vals.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vals.keys().chain(self.mutable_vals.keys()).map(String::as_str)
    }
}

/// One variable frame plus the link to the frame that was active when it was pushed
#[derive(Debug, Clone, Default)]
pub struct Environment {
    bindings: Bindings,
    parent: Option<EnvRef>,
}

impl Environment {
    /// Create a new root frame
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new frame with a parent
    pub fn with_parent(parent: EnvRef) -> Self {
        Environment {
            bindings: Bindings::new(),
            parent: Some(parent),
        }
    }

    /// Wrap in Rc<RefCell<>>
    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    /// Declare in this frame only
    pub fn declare(&mut self, name: &str, value: Value, mutability: Mutability) -> InterpResult<()> {
        self.bindings.declare(name, value, mutability)
    }

    pub fn set_mutable_val(&mut self, name: &str, value: Value) -> InterpResult<()> {
        self.bindings.set_mutable_val(name, value)
    }

    /// Rebind in the innermost frame holding `name`
    pub fn assign(&mut self, name: &str, value: Value) -> InterpResult<()> {
        if self.bindings.contains(name) {
            self.bindings.reassign(name, value).map(|_| ())
        } else if let Some(parent) = &self.parent {
            parent.borrow_mut().assign(name, value)
        } else {
            Err(RuntimeError::undefined_variable(name))
        }
    }

    /// Look up a name, innermost frame first
    pub fn find(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.get(name) {
            Some(value.clone())
        } else if let Some(parent) = &self.parent {
            parent.borrow().find(name)
        } else {
            None
        }
    }

    /// Every name reachable from this frame, innermost first, without duplicates
    pub fn visible_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bindings.names().map(str::to_string).collect();
        names.sort();
        if let Some(parent) = &self.parent {
            for name in parent.borrow().visible_names() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }
}

/// Create a child frame from a parent reference
pub fn child_env(parent: &EnvRef) -> EnvRef {
    Environment::with_parent(Rc::clone(parent)).into_ref()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::ErrorKind;

    #[test]
    fn test_declare_and_find() {
        let mut env = Environment::new();
        env.declare("x", Value::Int(42), Mutability::Val).unwrap();
        assert_eq!(env.find("x"), Some(Value::Int(42)));
        assert_eq!(env.find("y"), None);
    }

    #[test]
    fn test_redeclare_fails_across_maps() {
        let mut env = Environment::new();
        env.declare("n", Value::Int(0), Mutability::Val).unwrap();
        let err = env.declare("n", Value::Int(1), Mutability::Val).unwrap_err();
        assert_eq!(err.kind, ErrorKind::AlreadyDeclared);
        let err = env.set_mutable_val("n", Value::Int(1)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::AlreadyDeclared);

        let mut env = Environment::new();
        env.set_mutable_val("m", Value::Int(0)).unwrap();
        assert!(env.declare("m", Value::Int(1), Mutability::Val).is_err());
        assert!(env.set_mutable_val("m", Value::Int(1)).is_err());
    }

    #[test]
    fn test_assign_mutable() {
        let mut env = Environment::new();
        env.set_mutable_val("n", Value::Int(0)).unwrap();
        env.assign("n", Value::Int(1)).unwrap();
        assert_eq!(env.find("n"), Some(Value::Int(1)));
    }

    #[test]
    fn test_assign_val_fails() {
        let mut env = Environment::new();
        env.declare("n", Value::Int(0), Mutability::Val).unwrap();
        let err = env.assign("n", Value::Int(1)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Immutable);
        assert_eq!(env.find("n"), Some(Value::Int(0)));
    }

    #[test]
    fn test_assign_undeclared_fails() {
        let mut env = Environment::new();
        let err = env.assign("ghost", Value::Int(1)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UndefinedVariable);
    }

    #[test]
    fn test_child_sees_parent() {
        let parent = Environment::new().into_ref();
        parent.borrow_mut().declare("x", Value::Int(1), Mutability::Val).unwrap();

        let child = child_env(&parent);
        child.borrow_mut().declare("y", Value::Int(2), Mutability::Val).unwrap();

        assert_eq!(child.borrow().find("x"), Some(Value::Int(1)));
        assert_eq!(child.borrow().find("y"), Some(Value::Int(2)));
        assert_eq!(parent.borrow().find("y"), None);
    }

    #[test]
    fn test_shadowing_in_child() {
        let parent = Environment::new().into_ref();
        parent.borrow_mut().declare("x", Value::Int(1), Mutability::Val).unwrap();

        let child = child_env(&parent);
        child.borrow_mut().set_mutable_val("x", Value::Int(2)).unwrap();

        assert_eq!(child.borrow().find("x"), Some(Value::Int(2)));
        child.borrow_mut().assign("x", Value::Int(3)).unwrap();
        assert_eq!(child.borrow().find("x"), Some(Value::Int(3)));
        assert_eq!(parent.borrow().find("x"), Some(Value::Int(1)));
    }

    #[test]
    fn test_assign_through_chain_updates_owner() {
        let parent = Environment::new().into_ref();
        parent.borrow_mut().set_mutable_val("count", Value::Int(0)).unwrap();

        let child = child_env(&parent);
        child.borrow_mut().assign("count", Value::Int(5)).unwrap();

        assert_eq!(parent.borrow().find("count"), Some(Value::Int(5)));
        assert_eq!(child.borrow().visible_names(), ["count"]);
    }

    #[test]
    fn test_visible_names() {
        let parent = Environment::new().into_ref();
        parent.borrow_mut().declare("b", Value::Int(1), Mutability::Val).unwrap();
        parent.borrow_mut().declare("a", Value::Int(1), Mutability::Val).unwrap();
        let child = child_env(&parent);
        child.borrow_mut().declare("c", Value::Int(1), Mutability::Val).unwrap();
        child.borrow_mut().declare("a", Value::Int(2), Mutability::Val).unwrap();
        assert_eq!(child.borrow().visible_names(), ["a", "c", "b"]);
    }

    #[test]
    fn test_flat_table_reassign() {
        let mut table = Bindings::new();
        table.set_val("f", Value::Int(1)).unwrap();
        table.set_mutable_val("g", Value::Int(1)).unwrap();
        assert!(table.reassign("g", Value::Int(2)).unwrap());
        assert_eq!(table.get("g"), Some(&Value::Int(2)));
        assert_eq!(table.reassign("f", Value::Int(2)).unwrap_err().kind, ErrorKind::Immutable);
        assert!(!table.reassign("missing", Value::Int(2)).unwrap());
    }
}
