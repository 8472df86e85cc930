//! Runtime errors (§7): carry the line of the token nearest the failing
//! operation. A runtime error aborts the current top-level evaluation —
//! the whole file, or one REPL line — but never unwinds past it.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("[line {line}] Error {message}")]
pub struct RuntimeError {
    pub message: String,
    pub line: u32,
}

impl RuntimeError {
    pub fn new(line: u32, message: impl Into<String>) -> Self {
        Self { line, message: message.into() }
    }
}

/// Statement execution either completes normally or signals a `return`
/// that must unwind to the nearest enclosing function call (§9 "Return
/// via panic → explicit control"). Block/if/while propagate `Return`
/// without swallowing it; only `Interpreter::call` catches it.
pub enum Signal {
    Normal,
    Return(crate::value::Value),
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Normal => write!(f, "Normal"),
            Signal::Return(_) => write!(f, "Return"),
        }
    }
}

pub type ExecResult = Result<Signal, RuntimeError>;
pub type EvalResult = Result<crate::value::Value, RuntimeError>;
