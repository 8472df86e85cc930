//! Chained environments (§4.4). Scopes form a tree under closures: a
//! child may be the parent of many concurrently alive closures, so the
//! binding map needs shared ownership with interior mutability rather
//! than unique ownership (§5). `Rc<RefCell<..>>` is the natural shape for
//! a single-threaded tree-walker with no GC.

use std::cell::RefCell;
use std::rc::Rc;

use lox_util::FxHashMap;

use crate::error::RuntimeError;
use crate::value::Value;

pub type EnvRef = Rc<RefCell<Environment>>;

pub struct Environment {
    values: FxHashMap<String, Value>,
    parent: Option<EnvRef>,
}

impl Environment {
    pub fn new_global() -> EnvRef {
        Rc::new(RefCell::new(Environment { values: FxHashMap::default(), parent: None }))
    }

    pub fn new_enclosed(parent: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment { values: FxHashMap::default(), parent: Some(Rc::clone(parent)) }))
    }

    /// Sets `name` in the innermost scope, shadowing any outer binding
    /// (§4.4). Also used for redeclaration at global scope.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Follows parent links `distance` times.
    fn ancestor(env: &EnvRef, distance: usize) -> EnvRef {
        let mut current = Rc::clone(env);
        for _ in 0..distance {
            let parent = current
                .borrow()
                .parent
                .clone()
                .expect("resolver distance exceeds live environment chain");
            current = parent;
        }
        current
    }

    pub fn get_at(env: &EnvRef, distance: usize, name: &str, line: u32) -> Result<Value, RuntimeError> {
        let target = Self::ancestor(env, distance);
        let found = target.borrow().values.get(name).cloned();
        found.ok_or_else(|| RuntimeError::new(line, format!("Undefined variable '{name}'")))
    }

    pub fn assign_at(
        env: &EnvRef,
        distance: usize,
        name: &str,
        value: Value,
        line: u32,
    ) -> Result<(), RuntimeError> {
        let target = Self::ancestor(env, distance);
        let mut target = target.borrow_mut();
        if target.values.contains_key(name) {
            target.values.insert(name.to_string(), value);
            Ok(())
        } else {
            Err(RuntimeError::new(line, format!("Undefined variable '{name}'")))
        }
    }

    /// Global path used when the resolver recorded no distance for a
    /// reference (§4.4): walk to the root.
    pub fn get_global(env: &EnvRef, name: &str, line: u32) -> Result<Value, RuntimeError> {
        let mut current = Rc::clone(env);
        loop {
            if let Some(value) = current.borrow().values.get(name).cloned() {
                return Ok(value);
            }
            let parent = current.borrow().parent.clone();
            match parent {
                Some(parent) => current = parent,
                None => return Err(RuntimeError::new(line, format!("Undefined variable '{name}'"))),
            }
        }
    }

    pub fn assign_global(env: &EnvRef, name: &str, value: Value, line: u32) -> Result<(), RuntimeError> {
        let mut current = Rc::clone(env);
        loop {
            if current.borrow().values.contains_key(name) {
                current.borrow_mut().values.insert(name.to_string(), value);
                return Ok(());
            }
            let parent = current.borrow().parent.clone();
            match parent {
                Some(parent) => current = parent,
                None => return Err(RuntimeError::new(line, format!("Undefined variable '{name}'"))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_at_zero_reads_innermost() {
        let global = Environment::new_global();
        global.borrow_mut().define("x", Value::Number(1.0));
        let child = Environment::new_enclosed(&global);
        child.borrow_mut().define("x", Value::Number(2.0));
        assert_eq!(Environment::get_at(&child, 0, "x", 1).unwrap(), Value::Number(2.0));
        assert_eq!(Environment::get_at(&child, 1, "x", 1).unwrap(), Value::Number(1.0));
    }

    #[test]
    fn closures_share_mutations_through_the_same_scope() {
        let global = Environment::new_global();
        global.borrow_mut().define("x", Value::Number(1.0));
        let closure_a = Rc::clone(&global);
        let closure_b = Rc::clone(&global);
        Environment::assign_global(&closure_a, "x", Value::Number(2.0), 1).unwrap();
        assert_eq!(Environment::get_global(&closure_b, "x", 1).unwrap(), Value::Number(2.0));
    }

    #[test]
    fn assign_at_missing_binding_is_runtime_error() {
        let global = Environment::new_global();
        assert!(Environment::assign_at(&global, 0, "missing", Value::Nil, 1).is_err());
    }
}
