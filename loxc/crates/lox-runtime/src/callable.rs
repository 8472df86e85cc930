//! Callable protocol and the three things that implement it (§3, §4.5):
//! user functions (closures), classes (constructors), and host builtins.

use std::cell::RefCell;
use std::rc::Rc;

use lox_par::FunctionDecl;
use lox_util::FxHashMap;

use crate::environment::{EnvRef, Environment};
use crate::error::{EvalResult, RuntimeError, Signal};
use crate::interpreter::Interpreter;
use crate::value::Value;

pub trait Callable {
    fn arity(&self) -> usize;
    fn call(&self, interpreter: &mut Interpreter, args: Vec<Value>, line: u32) -> EvalResult;
    fn describe(&self) -> String;
}

/// A user-defined function or method, closing over the environment that
/// was live at its declaration (§4.5 "Function declaration").
pub struct LoxFunction {
    declaration: Rc<FunctionDecl>,
    closure: EnvRef,
    is_initializer: bool,
}

impl LoxFunction {
    pub fn new(declaration: Rc<FunctionDecl>, closure: EnvRef, is_initializer: bool) -> Self {
        Self { declaration, closure, is_initializer }
    }

    /// Produces a new callable sharing this function's code but with a
    /// one-deep wrapper environment binding `this` → `instance` (§9
    /// "Method binding without cyclic state"). The original is untouched.
    pub fn bind(&self, instance: Rc<LoxInstance>) -> Rc<LoxFunction> {
        let env = Environment::new_enclosed(&self.closure);
        env.borrow_mut().define("this", Value::Instance(instance));
        Rc::new(LoxFunction {
            declaration: Rc::clone(&self.declaration),
            closure: env,
            is_initializer: self.is_initializer,
        })
    }
}

impl Callable for LoxFunction {
    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn call(&self, interpreter: &mut Interpreter, args: Vec<Value>, _line: u32) -> EvalResult {
        let call_env = Environment::new_enclosed(&self.closure);
        for (param, arg) in self.declaration.params.iter().zip(args) {
            call_env.borrow_mut().define(param.clone(), arg);
        }

        let signal = interpreter.execute_block(&self.declaration.body, call_env)?;

        if self.is_initializer {
            // §4.5 step 5: an initializer always yields `this`, discarding
            // whatever value a bare `return;` would otherwise produce.
            return Environment::get_at(&self.closure, 0, "this", self.declaration.line);
        }

        match signal {
            Signal::Return(value) => Ok(value),
            Signal::Normal => Ok(Value::Nil),
        }
    }

    fn describe(&self) -> String {
        format!("<fn {}>", self.declaration.name)
    }
}

/// A class value, acting as a constructor (§4.5 "Class declaration").
pub struct LoxClass {
    pub name: String,
    superclass: Option<Rc<LoxClass>>,
    methods: FxHashMap<String, Rc<LoxFunction>>,
}

impl LoxClass {
    pub fn new(name: String, superclass: Option<Rc<LoxClass>>, methods: FxHashMap<String, Rc<LoxFunction>>) -> Self {
        Self { name, superclass, methods }
    }

    /// Looks up `name` in this class's method table, then the
    /// superclass chain (§4.5 "Property access").
    pub fn find_method(&self, name: &str) -> Option<Rc<LoxFunction>> {
        if let Some(method) = self.methods.get(name) {
            return Some(Rc::clone(method));
        }
        self.superclass.as_ref().and_then(|superclass| superclass.find_method(name))
    }

    pub fn arity(&self) -> usize {
        self.find_method("init").map(|init| init.arity()).unwrap_or(0)
    }

    /// Constructs a new instance and, if an `init` method exists, runs it
    /// immediately bound to the fresh instance (§4.5 "Class declaration",
    /// evaluated through `Call`, not declaration).
    pub fn instantiate(self: &Rc<Self>, interpreter: &mut Interpreter, args: Vec<Value>, line: u32) -> EvalResult {
        let instance = Rc::new(LoxInstance { class: Rc::clone(self), fields: RefCell::new(FxHashMap::default()) });
        if let Some(initializer) = self.find_method("init") {
            let bound = initializer.bind(Rc::clone(&instance));
            bound.call(interpreter, args, line)?;
        }
        Ok(Value::Instance(instance))
    }
}

/// An instance of a [`LoxClass`].
pub struct LoxInstance {
    class: Rc<LoxClass>,
    fields: RefCell<FxHashMap<String, Value>>,
}

impl LoxInstance {
    /// `Get` (§4.5 "Property access"): fields shadow methods; methods are
    /// returned bound to this instance.
    pub fn get(self: &Rc<Self>, name: &str, line: u32) -> EvalResult {
        if let Some(value) = self.fields.borrow().get(name) {
            return Ok(value.clone());
        }
        if let Some(method) = self.class.find_method(name) {
            return Ok(Value::Function(method.bind(Rc::clone(self))));
        }
        Err(RuntimeError::new(line, format!("Undefined property '{name}'")))
    }

    /// `Set` (§4.5 "Property write"): unconditional, shadows any method
    /// of the same name for this instance only.
    pub fn set(&self, name: &str, value: Value) {
        self.fields.borrow_mut().insert(name.to_string(), value);
    }

    pub fn describe(&self) -> String {
        format!("<{} instance>", self.class.name)
    }
}

/// A host builtin registered before evaluation starts (e.g. `clock`).
pub struct NativeFunction {
    name: &'static str,
    arity: usize,
    func: Box<dyn Fn(&[Value]) -> Value>,
}

impl NativeFunction {
    pub fn new(name: &'static str, arity: usize, func: impl Fn(&[Value]) -> Value + 'static) -> Self {
        Self { name, arity, func: Box::new(func) }
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn call(&self, args: &[Value]) -> Value {
        (self.func)(args)
    }

    pub fn describe(&self) -> String {
        format!("<native fn {}>", self.name)
    }
}
