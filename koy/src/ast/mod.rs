//! Abstract Syntax Tree definitions

mod expr;
mod span;

pub use expr::*;
pub use span::*;

use serde::{Deserialize, Serialize};

/// A program is an ordered sequence of top-level definitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub items: Vec<TopLevel>,
}

/// Top-level definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TopLevel {
    /// fn name(params) { body }
    FnDef(FnDef),
    /// val name = expr;
    Val { name: String, value: Expr },
    /// mutable val name = expr;
    MutableVal { name: String, value: Expr },
}

/// Function definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FnDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Expr>,
}

impl TopLevel {
    /// Name introduced by this definition
    pub fn name(&self) -> &str {
        match self {
            TopLevel::FnDef(def) => &def.name,
            TopLevel::Val { name, .. } | TopLevel::MutableVal { name, .. } => name,
        }
    }
}
