//! Expression evaluator

use super::env::{child_env, Bindings, EnvRef, Environment, Mutability};
use super::error::{ErrorKind, InterpResult, RuntimeError};
use super::value::{FunctionValue, Value};
use crate::ast::{BinOp, Expr, LabeledArg, Program, TopLevel, UnOp};
use crate::util::{find_similar_name, SUGGESTION_THRESHOLD};
use std::io::{self, Write};
use std::rc::Rc;

/// Stack growth parameters for deep recursion
const STACK_RED_ZONE: usize = 128 * 1024; // 128KB remaining triggers growth
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024; // Grow by 4MB each time

/// The interpreter
///
/// Owns the three namespaces: the chain of variable frames, the flat
/// function table and the flat object table.
pub struct Interpreter {
    /// Active variable frame
    env: EnvRef,
    /// Function values bound by `fn` or by declaring a name with a function value
    functions: Bindings,
    /// Object values bound by declaring a name with an object value
    objects: Bindings,
    /// Sink for `println`
    out: Box<dyn Write>,
    /// Number of call frames currently pushed
    depth: usize,
}

impl Interpreter {
    /// Create a new interpreter printing to standard output
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }

    /// Create a new interpreter printing to `out`
    pub fn with_output(out: impl Write + 'static) -> Self {
        Interpreter {
            env: Environment::new().into_ref(),
            functions: Bindings::new(),
            objects: Bindings::new(),
            out: Box::new(out),
            depth: 0,
        }
    }

    /// Install every top-level definition, then call `main` with no arguments
    pub fn call_main(&mut self, program: &Program) -> InterpResult<Value> {
        self.load(program)?;
        self.call_function("main", Vec::new())
    }

    /// Install top-level definitions in source order
    pub fn load(&mut self, program: &Program) -> InterpResult<()> {
        for item in &program.items {
            self.install(item)?;
        }
        Ok(())
    }

    fn install(&mut self, item: &TopLevel) -> InterpResult<()> {
        tracing::debug!(name = item.name(), "install top-level");
        match item {
            TopLevel::FnDef(def) => self
                .functions
                .set_val(&def.name, Value::function(def.params.clone(), def.body.clone())),
            TopLevel::Val { name, value } => {
                let value = self.interpret(value)?;
                self.declare(name, value, Mutability::Val)
            }
            TopLevel::MutableVal { name, value } => {
                let value = self.interpret(value)?;
                self.declare(name, value, Mutability::MutableVal)
            }
        }
    }

    /// Call a function from the function table with already evaluated arguments
    pub fn call_function(&mut self, name: &str, args: Vec<Value>) -> InterpResult<Value> {
        let func = self.lookup_function(name)?;
        self.invoke(name, &func, args)
    }

    /// Evaluate statements in order against the active frame; the value of the last one
    pub fn interpret_statements(&mut self, lines: &[Expr]) -> InterpResult<Value> {
        self.eval_block(lines)
    }

    /// Evaluate an expression with automatic stack growth for deep recursion
    pub fn interpret(&mut self, expr: &Expr) -> InterpResult<Value> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.eval_inner(expr))
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Variable visible from the active frame
    pub fn get_value(&self, name: &str) -> Option<Value> {
        self.env.borrow().find(name)
    }

    pub fn get_function(&self, name: &str) -> Option<Value> {
        self.functions.get(name).cloned()
    }

    pub fn get_object(&self, name: &str) -> Option<Value> {
        self.objects.get(name).cloned()
    }

    /// Names visible from the active frame, innermost first
    pub fn variable_names(&self) -> Vec<String> {
        self.env.borrow().visible_names()
    }

    pub fn function_names(&self) -> Vec<String> {
        sorted_names(&self.functions)
    }

    pub fn object_names(&self) -> Vec<String> {
        sorted_names(&self.objects)
    }

    // ------------------------------------------------------------------
    // Evaluation
    // ------------------------------------------------------------------

    fn eval_inner(&mut self, expr: &Expr) -> InterpResult<Value> {
        tracing::trace!(kind = expr.kind(), "eval");
        match expr {
            Expr::IntLit(n) => Ok(Value::Int(*n)),
            Expr::BoolLit(b) => Ok(Value::Bool(*b)),
            Expr::StringLit(s) => Ok(Value::string(s.as_str())),
            Expr::Nil => Ok(Value::Nil),
            Expr::ArrayLit(items) => Ok(Value::Array(self.eval_all(items)?)),
            Expr::SetLit(items) => Ok(Value::set(self.eval_all(items)?)),
            Expr::ObjectLit(properties) => {
                let mut fields = Vec::with_capacity(properties.len());
                for (name, value) in properties {
                    fields.push((name.clone(), self.interpret(value)?));
                }
                Ok(Value::object(fields))
            }
            Expr::FunctionLit(lit) => Ok(Value::function(lit.params.clone(), lit.body.clone())),

            Expr::Var(name) => self.lookup(name),

            Expr::Binary { op, left, right } => {
                // Both operands always, left first
                let left = self.interpret(left)?;
                let right = self.interpret(right)?;
                eval_binary(*op, &left, &right)
            }

            Expr::Unary { op, name } => {
                let current = self.lookup(name)?.as_int()?;
                let next = match op {
                    UnOp::Increment => current.wrapping_add(1),
                    UnOp::Decrement => current.wrapping_sub(1),
                };
                self.assign(name, Value::Int(next))?;
                Ok(Value::Int(next))
            }

            Expr::Assign { name, value } => {
                let value = self.interpret(value)?;
                self.assign(name, value.clone())?;
                Ok(value)
            }
            Expr::Val { name, value } => {
                let value = self.interpret(value)?;
                self.declare(name, value.clone(), Mutability::Val)?;
                Ok(value)
            }
            Expr::MutableVal { name, value } => {
                let value = self.interpret(value)?;
                self.declare(name, value.clone(), Mutability::MutableVal)?;
                Ok(value)
            }

            Expr::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.interpret(cond)?.as_bool()? {
                    self.interpret(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.interpret(else_branch)
                } else {
                    Ok(Value::Bool(true))
                }
            }

            Expr::While { cond, body } => {
                while self.interpret(cond)?.as_bool()? {
                    self.interpret(body)?;
                }
                Ok(Value::Bool(true))
            }

            Expr::Block(lines) => self.eval_block(lines),

            Expr::Call { func, args } => {
                let function = self.lookup_function(func)?;
                let args = self.eval_all(args)?;
                self.invoke(func, &function, args)
            }

            Expr::LabeledCall { func, args } => self.eval_labeled_call(func, args),

            Expr::MethodCall {
                receiver,
                member,
                args,
            } => self.eval_method_call(receiver, member, args),

            Expr::Index { collection, index } => {
                let collection = self.interpret(collection)?;
                let index = self.interpret(index)?;
                Ok(collection.index(&index).unwrap_or(Value::Nil))
            }

            Expr::Push { target, element } => {
                let target = self.interpret(target)?;
                let element = self.interpret(element)?;
                target.pushed(element)
            }

            Expr::Println(arg) => {
                let value = self.interpret(arg)?;
                writeln!(self.out, "{value}").map_err(|e| RuntimeError::io_error(&e.to_string()))?;
                Ok(value)
            }
        }
    }

    fn eval_all(&mut self, exprs: &[Expr]) -> InterpResult<Vec<Value>> {
        exprs.iter().map(|e| self.interpret(e)).collect()
    }

    /// Blocks share the enclosing frame; an empty block is `0`
    fn eval_block(&mut self, lines: &[Expr]) -> InterpResult<Value> {
        let mut last = Value::Int(0);
        for line in lines {
            last = self.interpret(line)?;
        }
        Ok(last)
    }

    /// Labeled actuals are matched to formals by name, then evaluated in formal order
    fn eval_labeled_call(&mut self, name: &str, args: &[LabeledArg]) -> InterpResult<Value> {
        let function = self.lookup_function(name)?;
        let mut actuals = Vec::with_capacity(function.params.len());
        for param in &function.params {
            let arg = args
                .iter()
                .rev()
                .find(|arg| &arg.label == param)
                .ok_or_else(|| RuntimeError::missing_label(name, param))?;
            actuals.push(&arg.value);
        }
        let mut values = Vec::with_capacity(actuals.len());
        for actual in actuals {
            values.push(self.interpret(actual)?);
        }
        self.invoke(name, &function, values)
    }

    /// `receiver.member(args)` calls a function member; any other member is read
    /// and the arguments are ignored
    fn eval_method_call(&mut self, receiver: &Expr, member: &str, args: &[Expr]) -> InterpResult<Value> {
        let object = match receiver {
            Expr::Var(name) => self.lookup_object(name)?,
            other => self.interpret(other)?,
        };
        let fields = object.as_object()?;
        let Some(value) = object.property(member).cloned() else {
            let suggestion = find_similar_name(
                member,
                fields.iter().map(|(k, _)| k.as_str()),
                SUGGESTION_THRESHOLD,
            );
            return Err(RuntimeError::undefined_property(member).with_suggestion(suggestion));
        };
        match value {
            Value::Function(function) => {
                let args = self.eval_all(args)?;
                self.invoke(member, &function, args)
            }
            other => Ok(other),
        }
    }

    /// Check arity, then run the body in a fresh frame chained to the caller's
    fn invoke(&mut self, name: &str, function: &FunctionValue, args: Vec<Value>) -> InterpResult<Value> {
        if function.params.len() != args.len() {
            return Err(RuntimeError::arity_mismatch(name, function.params.len(), args.len()));
        }
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.call_frame(name, function, args)
        })
    }

    fn call_frame(&mut self, name: &str, function: &FunctionValue, args: Vec<Value>) -> InterpResult<Value> {
        let frame = child_env(&self.env);
        for (param, arg) in function.params.iter().zip(args) {
            frame.borrow_mut().set_mutable_val(param, arg)?;
        }

        self.depth += 1;
        tracing::debug!(function = name, depth = self.depth, "push frame");
        let caller = std::mem::replace(&mut self.env, frame);
        let result = self.eval_block(&function.body);
        self.env = caller;
        tracing::debug!(function = name, depth = self.depth, ok = result.is_ok(), "pop frame");
        self.depth -= 1;

        result
    }

    // ------------------------------------------------------------------
    // Namespaces
    // ------------------------------------------------------------------

    /// Functions go to the function table, objects to the object table,
    /// everything else to the active frame
    fn declare(&mut self, name: &str, value: Value, mutability: Mutability) -> InterpResult<()> {
        match value {
            Value::Function(_) => self.functions.declare(name, value, mutability),
            Value::Object(_) => self.objects.declare(name, value, mutability),
            _ => self.env.borrow_mut().declare(name, value, mutability),
        }
    }

    fn assign(&mut self, name: &str, value: Value) -> InterpResult<()> {
        match value {
            Value::Function(_) => {
                if self.functions.reassign(name, value)? {
                    Ok(())
                } else {
                    Err(self.undefined_function(name))
                }
            }
            Value::Object(_) => {
                if self.objects.reassign(name, value)? {
                    Ok(())
                } else {
                    Err(self.undefined_object(name))
                }
            }
            _ => {
                let result = self.env.borrow_mut().assign(name, value);
                result.map_err(|err| match err.kind {
                    ErrorKind::UndefinedVariable => self.undefined_variable(name),
                    _ => err,
                })
            }
        }
    }

    /// Identifier: variable chain first, then the object table
    fn lookup(&self, name: &str) -> InterpResult<Value> {
        if let Some(value) = self.env.borrow().find(name) {
            return Ok(value);
        }
        self.objects
            .get(name)
            .cloned()
            .ok_or_else(|| self.undefined_variable(name))
    }

    /// Method-call receiver: object table first, then the variable chain
    fn lookup_object(&self, name: &str) -> InterpResult<Value> {
        if let Some(object) = self.objects.get(name) {
            return Ok(object.clone());
        }
        self.env
            .borrow()
            .find(name)
            .ok_or_else(|| self.undefined_object(name))
    }

    fn lookup_function(&self, name: &str) -> InterpResult<Rc<FunctionValue>> {
        match self.functions.get(name) {
            Some(value) => value.as_function().cloned(),
            None => Err(self.undefined_function(name)),
        }
    }

    fn undefined_variable(&self, name: &str) -> RuntimeError {
        let mut candidates = self.variable_names();
        candidates.extend(self.object_names());
        let suggestion = find_similar_name(
            name,
            candidates.iter().map(String::as_str),
            SUGGESTION_THRESHOLD,
        );
        RuntimeError::undefined_variable(name).with_suggestion(suggestion)
    }

    fn undefined_function(&self, name: &str) -> RuntimeError {
        let candidates = self.function_names();
        let suggestion = find_similar_name(
            name,
            candidates.iter().map(String::as_str),
            SUGGESTION_THRESHOLD,
        );
        RuntimeError::undefined_function(name).with_suggestion(suggestion)
    }

    fn undefined_object(&self, name: &str) -> RuntimeError {
        let candidates = self.object_names();
        let suggestion = find_similar_name(
            name,
            candidates.iter().map(String::as_str),
            SUGGESTION_THRESHOLD,
        );
        RuntimeError::undefined_object(name).with_suggestion(suggestion)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn sorted_names(bindings: &Bindings) -> Vec<String> {
    let mut names: Vec<String> = bindings.names().map(str::to_string).collect();
    names.sort();
    names
}

/// Apply a binary operator to evaluated operands
fn eval_binary(op: BinOp, left: &Value, right: &Value) -> InterpResult<Value> {
    let mismatch = || RuntimeError::incompatible_operands(&op.to_string(), left.type_name(), right.type_name());

    match op {
        BinOp::Add => match (left, right) {
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_add(*b))),
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
            _ => Err(mismatch()),
        },

        BinOp::Eq | BinOp::Ne => {
            let equal = left.equals(right).map_err(|_| mismatch())?;
            Ok(Value::Bool(if op == BinOp::Eq { equal } else { !equal }))
        }

        BinOp::And | BinOp::Or => match (left, right) {
            (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(if op == BinOp::And { *a && *b } else { *a || *b })),
            _ => Err(mismatch()),
        },

        _ => {
            let (Value::Int(a), Value::Int(b)) = (left, right) else {
                return Err(mismatch());
            };
            let (a, b) = (*a, *b);
            match op {
                BinOp::Sub => Ok(Value::Int(a.wrapping_sub(b))),
                BinOp::Mul => Ok(Value::Int(a.wrapping_mul(b))),
                BinOp::Div if b == 0 => Err(RuntimeError::division_by_zero()),
                BinOp::Div => Ok(Value::Int(a.wrapping_div(b))),
                BinOp::Mod if b == 0 => Err(RuntimeError::division_by_zero()),
                BinOp::Mod => Ok(Value::Int(a.wrapping_rem(b))),
                BinOp::Lt => Ok(Value::Bool(a < b)),
                BinOp::Gt => Ok(Value::Bool(a > b)),
                BinOp::Le => Ok(Value::Bool(a <= b)),
                BinOp::Ge => Ok(Value::Bool(a >= b)),
                BinOp::Add | BinOp::Eq | BinOp::Ne | BinOp::And | BinOp::Or => Err(mismatch()),
            }
        }
    }
}
