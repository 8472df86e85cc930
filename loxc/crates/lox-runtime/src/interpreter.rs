//! The tree-walking evaluator (§4.5).

use std::rc::Rc;

use lox_par::{BinaryOp, ClassDecl, Expr, ExprKind, FunctionDecl, LiteralValue, LogicalOp, Program, Stmt, UnaryOp};
use lox_sem::Distances;
use lox_util::FxHashMap;

use crate::callable::{Callable, LoxClass, LoxFunction, NativeFunction};
use crate::environment::{EnvRef, Environment};
use crate::error::{EvalResult, ExecResult, RuntimeError, Signal};
use crate::value::Value;

pub struct Interpreter {
    globals: EnvRef,
    environment: EnvRef,
    distances: Distances,
}

impl Interpreter {
    /// A fresh interpreter with only the global scope and the embedded
    /// host callables (§6) — no program has been resolved into it yet.
    pub fn new() -> Self {
        let globals = Environment::new_global();
        register_natives(&globals);
        Self { globals: Rc::clone(&globals), environment: globals, distances: Distances::default() }
    }

    /// Runs one resolved program (a whole file, or one REPL submission)
    /// to completion, aborting on the first runtime error (§5
    /// "Cancellation & error unwind"). The global environment persists
    /// across calls, so a REPL can `interpret` one line at a time while
    /// later lines still see earlier ones' globals. `print` receives each
    /// `print` statement's rendered line.
    pub fn interpret(
        &mut self,
        program: &Program,
        distances: Distances,
        mut print: impl FnMut(&str),
    ) -> Result<(), RuntimeError> {
        self.distances = distances;
        for stmt in program {
            let signal = self.execute(stmt, &mut print)?;
            debug_assert!(matches!(signal, Signal::Normal), "return outside a function reached top level");
        }
        Ok(())
    }

    /// Like [`interpret`](Self::interpret), but when `echo` is set and the
    /// program's final statement is a bare expression statement, that
    /// expression is evaluated once and its value returned instead of
    /// being silently discarded (SPEC §2 "echo_expr_results" — a REPL
    /// convenience, not a language feature: the statement is still parsed
    /// as an ordinary `ExprStmt`, and every earlier statement runs exactly
    /// as `interpret` would run it).
    pub fn interpret_echoing_last_expr(
        &mut self,
        program: &Program,
        distances: Distances,
        echo: bool,
        mut print: impl FnMut(&str),
    ) -> Result<Option<Value>, RuntimeError> {
        self.distances = distances;
        let last = program.len().wrapping_sub(1);
        let mut echoed = None;
        for (index, stmt) in program.iter().enumerate() {
            if echo && index == last {
                if let Stmt::Expr(expr) = stmt {
                    echoed = Some(self.evaluate(expr)?);
                    continue;
                }
            }
            let signal = self.execute(stmt, &mut print)?;
            debug_assert!(matches!(signal, Signal::Normal), "return outside a function reached top level");
        }
        Ok(echoed)
    }

    fn execute(&mut self, stmt: &Stmt, print: &mut impl FnMut(&str)) -> ExecResult {
        match stmt {
            Stmt::Expr(expr) => {
                self.evaluate(expr)?;
                Ok(Signal::Normal)
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                print(&value.to_string());
                Ok(Signal::Normal)
            }
            Stmt::VarDecl { name, initializer, .. } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                self.environment.borrow_mut().define(name.clone(), value);
                Ok(Signal::Normal)
            }
            Stmt::Block(stmts) => {
                let enclosed = Environment::new_enclosed(&self.environment);
                self.execute_block_in_place(stmts, enclosed, print)
            }
            Stmt::If { condition, then_branch, else_branch } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch, print)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch, print)
                } else {
                    Ok(Signal::Normal)
                }
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    match self.execute(body, print)? {
                        Signal::Normal => {}
                        signal @ Signal::Return(_) => return Ok(signal),
                    }
                }
                Ok(Signal::Normal)
            }
            Stmt::Function(decl) => {
                let function = self.make_function(decl, false);
                self.environment.borrow_mut().define(decl.name.clone(), Value::Function(function));
                Ok(Signal::Normal)
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                Ok(Signal::Return(value))
            }
            Stmt::Class(class_decl) => self.execute_class(class_decl),
        }
    }

    fn make_function(&self, decl: &FunctionDecl, is_initializer: bool) -> Rc<LoxFunction> {
        Rc::new(LoxFunction::new(Rc::new(decl.clone()), Rc::clone(&self.environment), is_initializer))
    }

    /// `ClassDecl` (§4.5 "Class declaration"): the name slot is reserved
    /// before the body is built so methods may refer to their own class,
    /// and the `super` wrapper scope (if any) exists only while building
    /// the method table.
    fn execute_class(&mut self, class_decl: &ClassDecl) -> ExecResult {
        let superclass = match &class_decl.superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Class(class) => Some(class),
                _ => return Err(RuntimeError::new(class_decl.line, "Superclass must be a class")),
            },
            None => None,
        };

        self.environment.borrow_mut().define(class_decl.name.clone(), Value::Nil);

        let methods_env = match &superclass {
            Some(superclass) => {
                let wrapper = Environment::new_enclosed(&self.environment);
                wrapper.borrow_mut().define("super", Value::Class(Rc::clone(superclass)));
                wrapper
            }
            None => Rc::clone(&self.environment),
        };

        let previous_env = std::mem::replace(&mut self.environment, methods_env);
        let mut methods = FxHashMap::default();
        for method in &class_decl.methods {
            let is_initializer = method.name == "init";
            methods.insert(method.name.clone(), self.make_function(method, is_initializer));
        }
        self.environment = previous_env;

        let class = Rc::new(LoxClass::new(class_decl.name.clone(), superclass, methods));
        self.environment.borrow_mut().define(class_decl.name.clone(), Value::Class(class));

        Ok(Signal::Normal)
    }

    /// Runs `stmts` in `env`, restoring the caller's environment on every
    /// exit path — including an in-flight `return` (§4.5 "Block").
    pub fn execute_block(&mut self, stmts: &[Stmt], env: EnvRef) -> ExecResult {
        self.execute_block_in_place(stmts, env, &mut |_| {})
    }

    fn execute_block_in_place(&mut self, stmts: &[Stmt], env: EnvRef, print: &mut impl FnMut(&str)) -> ExecResult {
        let previous = std::mem::replace(&mut self.environment, env);
        let result = (|| {
            for stmt in stmts {
                match self.execute(stmt, print)? {
                    Signal::Normal => {}
                    signal @ Signal::Return(_) => return Ok(signal),
                }
            }
            Ok(Signal::Normal)
        })();
        self.environment = previous;
        result
    }

    fn evaluate(&mut self, expr: &Expr) -> EvalResult {
        match &expr.kind {
            ExprKind::Literal(value) => Ok(literal_value(value)),
            ExprKind::Grouping(inner) => self.evaluate(inner),
            ExprKind::Unary(op, operand) => self.evaluate_unary(*op, operand, expr.line),
            ExprKind::Binary(left, op, right) => self.evaluate_binary(left, *op, right, expr.line),
            ExprKind::Logical(left, op, right) => self.evaluate_logical(left, *op, right),
            ExprKind::Variable(name) => self.lookup_variable(name, expr.id, expr.line),
            ExprKind::Assignment(name, value_expr) => {
                let value = self.evaluate(value_expr)?;
                self.assign_variable(name, expr.id, value.clone(), expr.line)?;
                Ok(value)
            }
            ExprKind::Call(callee, args, paren_line) => self.evaluate_call(callee, args, *paren_line),
            ExprKind::Get(object, name) => {
                let object = self.evaluate(object)?;
                match object {
                    Value::Instance(instance) => instance.get(name, expr.line),
                    _ => Err(RuntimeError::new(expr.line, "Only instances have properties")),
                }
            }
            ExprKind::Set(object, name, value_expr) => {
                let object = self.evaluate(object)?;
                let instance = match object {
                    Value::Instance(instance) => instance,
                    _ => return Err(RuntimeError::new(expr.line, "Only instances have fields")),
                };
                let value = self.evaluate(value_expr)?;
                instance.set(name, value.clone());
                Ok(value)
            }
            ExprKind::This => self.lookup_variable("this", expr.id, expr.line),
            ExprKind::Super(method_name) => self.evaluate_super(method_name, expr.id, expr.line),
        }
    }

    fn evaluate_unary(&mut self, op: UnaryOp, operand: &Expr, line: u32) -> EvalResult {
        let value = self.evaluate(operand)?;
        match op {
            UnaryOp::Neg => match value {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(RuntimeError::new(line, "Operand must be a number")),
            },
            UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
        }
    }

    /// `+` is overloaded on the *left* operand's type (§4.5): numeric
    /// addition when the left operand is a number, otherwise both sides
    /// are stringified and concatenated.
    fn evaluate_binary(&mut self, left: &Expr, op: BinaryOp, right: &Expr, line: u32) -> EvalResult {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        if op == BinaryOp::Add {
            return match left {
                Value::Number(l) => match right {
                    Value::Number(r) => Ok(Value::Number(l + r)),
                    _ => Err(RuntimeError::new(line, "Operands must be numbers")),
                },
                _ => Ok(Value::string(format!("{left}{right}"))),
            };
        }

        if op == BinaryOp::Equal {
            return Ok(Value::Bool(left == right));
        }
        if op == BinaryOp::NotEqual {
            return Ok(Value::Bool(left != right));
        }

        let (Value::Number(l), Value::Number(r)) = (&left, &right) else {
            return Err(RuntimeError::new(line, "Operands must be numbers"));
        };
        let (l, r) = (*l, *r);

        Ok(match op {
            BinaryOp::Sub => Value::Number(l - r),
            BinaryOp::Mul => Value::Number(l * r),
            BinaryOp::Div => Value::Number(l / r),
            BinaryOp::Less => Value::Bool(l < r),
            BinaryOp::LessEqual => Value::Bool(l <= r),
            BinaryOp::Greater => Value::Bool(l > r),
            BinaryOp::GreaterEqual => Value::Bool(l >= r),
            BinaryOp::Add | BinaryOp::Equal | BinaryOp::NotEqual => unreachable!("handled above"),
        })
    }

    /// Short-circuit (§4.5 "Short-circuit logic"): returns the
    /// unconverted operand, not a coerced boolean.
    fn evaluate_logical(&mut self, left: &Expr, op: LogicalOp, right: &Expr) -> EvalResult {
        let left_value = self.evaluate(left)?;
        match op {
            LogicalOp::Or => {
                if left_value.is_truthy() {
                    return Ok(left_value);
                }
            }
            LogicalOp::And => {
                if !left_value.is_truthy() {
                    return Ok(left_value);
                }
            }
        }
        self.evaluate(right)
    }

    fn evaluate_call(&mut self, callee: &Expr, args: &[Expr], line: u32) -> EvalResult {
        let callee_value = self.evaluate(callee)?;
        let mut arg_values = Vec::with_capacity(args.len());
        for arg in args {
            arg_values.push(self.evaluate(arg)?);
        }

        let arity = match &callee_value {
            Value::Function(f) => f.arity(),
            Value::NativeFunction(f) => f.arity(),
            Value::Class(c) => c.arity(),
            _ => return Err(RuntimeError::new(line, "Can only call functions and classes")),
        };

        if arg_values.len() != arity {
            return Err(RuntimeError::new(
                line,
                format!("Expected {arity} arguments but got {}", arg_values.len()),
            ));
        }

        match callee_value {
            Value::Function(f) => f.call(self, arg_values, line),
            Value::NativeFunction(f) => Ok(f.call(&arg_values)),
            Value::Class(c) => c.instantiate(self, arg_values, line),
            _ => unreachable!("checked above"),
        }
    }

    /// `super.method` (§4.5 "Super"): the superclass sits at
    /// `distances[expr]`, and the receiver `this` one scope closer in,
    /// because the `this` wrapper nests inside the `super` wrapper.
    fn evaluate_super(&mut self, method_name: &str, id: lox_util::NodeId, line: u32) -> EvalResult {
        let distance = *self.distances.get(&id).expect("resolver always resolves 'super'");
        let superclass = match Environment::get_at(&self.environment, distance, "super", line)? {
            Value::Class(class) => class,
            _ => unreachable!("'super' always binds to a class"),
        };
        let this = match Environment::get_at(&self.environment, distance - 1, "this", line)? {
            Value::Instance(instance) => instance,
            _ => unreachable!("'this' always binds to an instance"),
        };
        let method = superclass
            .find_method(method_name)
            .ok_or_else(|| RuntimeError::new(line, format!("Undefined property '{method_name}'")))?;
        Ok(Value::Function(method.bind(this)))
    }

    fn lookup_variable(&self, name: &str, id: lox_util::NodeId, line: u32) -> EvalResult {
        match self.distances.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, name, line),
            None => Environment::get_global(&self.globals, name, line),
        }
    }

    fn assign_variable(&mut self, name: &str, id: lox_util::NodeId, value: Value, line: u32) -> Result<(), RuntimeError> {
        match self.distances.get(&id) {
            Some(&distance) => Environment::assign_at(&self.environment, distance, name, value, line),
            None => Environment::assign_global(&self.globals, name, value, line),
        }
    }
}

fn literal_value(value: &LiteralValue) -> Value {
    match value {
        LiteralValue::Nil => Value::Nil,
        LiteralValue::Bool(b) => Value::Bool(*b),
        LiteralValue::Number(n) => Value::Number(*n),
        LiteralValue::String(s) => Value::string(s.clone()),
    }
}

/// Registers the embedded host callables (§6): `clock()` returns
/// wall-clock seconds since the epoch, truncated to an integer like the
/// original implementation.
fn register_natives(globals: &EnvRef) {
    let clock = NativeFunction::new("clock", 0, |_args| {
        let seconds = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Value::Number(seconds as f64)
    });
    globals.borrow_mut().define("clock", Value::NativeFunction(Rc::new(clock)));
}
