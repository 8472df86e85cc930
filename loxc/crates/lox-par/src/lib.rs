//! lox-par - recursive-descent parser and AST for Lox (§3, §4.2).

mod ast;
mod parser;
mod printer;

pub use ast::{
    BinaryOp, ClassDecl, Expr, ExprKind, FunctionDecl, LiteralValue, LogicalOp, Program, Stmt, UnaryOp,
};
pub use parser::Parser;
pub use printer::{print_expr, print_program};
