//! lox-runtime - runtime values, environments, and the evaluator (§3, §4.4, §4.5).

mod callable;
mod environment;
mod error;
mod interpreter;
mod value;

pub use callable::{Callable, LoxClass, LoxFunction, LoxInstance, NativeFunction};
pub use environment::{EnvRef, Environment};
pub use error::{EvalResult, ExecResult, RuntimeError, Signal};
pub use interpreter::Interpreter;
pub use value::Value;
