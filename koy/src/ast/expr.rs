//! Expression AST nodes

use serde::{Deserialize, Serialize};

/// Expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Integer literal
    IntLit(i64),
    /// Boolean literal
    BoolLit(bool),
    /// String literal
    StringLit(String),
    /// Array literal: [a, b, c]
    ArrayLit(Vec<Expr>),
    /// Set literal: %{a, b, c}
    SetLit(Vec<Expr>),
    /// Object literal: { name: expr, ... } (property order preserved)
    ObjectLit(Vec<(String, Expr)>),
    /// Function literal: |x, y| { ... }
    FunctionLit(FunctionLit),
    /// nil
    Nil,

    /// Variable reference
    Var(String),

    /// Binary operation
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Prefix increment/decrement of a named binding: ++x, --x
    Unary { op: UnOp, name: String },

    /// Reassignment: name = value;
    Assign { name: String, value: Box<Expr> },

    /// Immutable declaration: val name = value;
    Val { name: String, value: Box<Expr> },

    /// Mutable declaration: mutable val name = value;
    MutableVal { name: String, value: Box<Expr> },

    /// Conditional, else branch optional
    If {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Option<Box<Expr>>,
    },

    /// Block: { line1 line2 ... }
    Block(Vec<Expr>),

    /// while (cond) body
    While { cond: Box<Expr>, body: Box<Expr> },

    /// Positional function call: f(a, b)
    Call { func: String, args: Vec<Expr> },

    /// Labeled function call: f[x=a, y=b]
    LabeledCall { func: String, args: Vec<LabeledArg> },

    /// Member access or invocation: receiver.member / receiver.member(args)
    MethodCall {
        receiver: Box<Expr>,
        member: String,
        args: Vec<Expr>,
    },

    /// Index access: collection->index
    Index {
        collection: Box<Expr>,
        index: Box<Expr>,
    },

    /// Non-destructive append/insert: target <- element
    Push {
        target: Box<Expr>,
        element: Box<Expr>,
    },

    /// println(arg);
    Println(Box<Expr>),
}

/// Parameter list and body of a function literal or definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionLit {
    pub params: Vec<String>,
    pub body: Vec<Expr>,
}

/// One `label=expr` argument of a labeled call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledArg {
    pub label: String,
    pub value: Expr,
}

impl Expr {
    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(name.into())
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn assign(name: impl Into<String>, value: Expr) -> Self {
        Expr::Assign {
            name: name.into(),
            value: Box::new(value),
        }
    }

    pub fn call(func: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            func: func.into(),
            args,
        }
    }

    /// Human-readable node kind, used in trace output
    pub fn kind(&self) -> &'static str {
        match self {
            Expr::IntLit(_) => "int",
            Expr::BoolLit(_) => "bool",
            Expr::StringLit(_) => "string",
            Expr::ArrayLit(_) => "array",
            Expr::SetLit(_) => "set",
            Expr::ObjectLit(_) => "object",
            Expr::FunctionLit(_) => "function",
            Expr::Nil => "nil",
            Expr::Var(_) => "identifier",
            Expr::Binary { .. } => "binary",
            Expr::Unary { .. } => "unary",
            Expr::Assign { .. } => "assignment",
            Expr::Val { .. } => "val",
            Expr::MutableVal { .. } => "mutable val",
            Expr::If { .. } => "if",
            Expr::Block(_) => "block",
            Expr::While { .. } => "while",
            Expr::Call { .. } => "call",
            Expr::LabeledCall { .. } => "labeled call",
            Expr::MethodCall { .. } => "method call",
            Expr::Index { .. } => "index",
            Expr::Push { .. } => "push",
            Expr::Println(_) => "println",
        }
    }
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,

    // Logical (never short-circuit)
    And,
    Or,
}

impl std::fmt::Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinOp::Add => write!(f, "+"),
            BinOp::Sub => write!(f, "-"),
            BinOp::Mul => write!(f, "*"),
            BinOp::Div => write!(f, "/"),
            BinOp::Mod => write!(f, "%"),
            BinOp::Eq => write!(f, "=="),
            BinOp::Ne => write!(f, "!="),
            BinOp::Lt => write!(f, "<"),
            BinOp::Gt => write!(f, ">"),
            BinOp::Le => write!(f, "<="),
            BinOp::Ge => write!(f, ">="),
            BinOp::And => write!(f, "and"),
            BinOp::Or => write!(f, "or"),
        }
    }
}

/// Prefix operator applied to an identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnOp {
    /// ++x
    Increment,
    /// --x
    Decrement,
}

impl std::fmt::Display for UnOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnOp::Increment => write!(f, "++"),
            UnOp::Decrement => write!(f, "--"),
        }
    }
}
