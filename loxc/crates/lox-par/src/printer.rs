//! Lisp-style AST pretty-printer, used by the parser round-trip property
//! test and by `loxt --print-ast` for debugging.

use std::fmt::Write as _;

use crate::ast::{BinaryOp, ClassDecl, Expr, ExprKind, FunctionDecl, LiteralValue, LogicalOp, Stmt, UnaryOp};

pub fn print_program(program: &[Stmt]) -> String {
    let mut out = String::new();
    for stmt in program {
        print_stmt(stmt, &mut out);
        out.push('\n');
    }
    out
}

pub fn print_expr(expr: &Expr) -> String {
    let mut out = String::new();
    write_expr(expr, &mut out);
    out
}

fn print_stmt(stmt: &Stmt, out: &mut String) {
    match stmt {
        Stmt::Expr(expr) => {
            let _ = write!(out, "(; ");
            write_expr(expr, out);
            out.push(')');
        }
        Stmt::Print(expr) => {
            let _ = write!(out, "(print ");
            write_expr(expr, out);
            out.push(')');
        }
        Stmt::VarDecl { name, initializer, .. } => {
            let _ = write!(out, "(var {name}");
            if let Some(init) = initializer {
                out.push(' ');
                write_expr(init, out);
            }
            out.push(')');
        }
        Stmt::Block(stmts) => {
            out.push_str("(block");
            for stmt in stmts {
                out.push(' ');
                print_stmt(stmt, out);
            }
            out.push(')');
        }
        Stmt::If { condition, then_branch, else_branch } => {
            out.push_str("(if ");
            write_expr(condition, out);
            out.push(' ');
            print_stmt(then_branch, out);
            if let Some(else_branch) = else_branch {
                out.push(' ');
                print_stmt(else_branch, out);
            }
            out.push(')');
        }
        Stmt::While { condition, body } => {
            out.push_str("(while ");
            write_expr(condition, out);
            out.push(' ');
            print_stmt(body, out);
            out.push(')');
        }
        Stmt::Function(decl) => write_function(decl, out),
        Stmt::Return { value, .. } => {
            out.push_str("(return");
            if let Some(value) = value {
                out.push(' ');
                write_expr(value, out);
            }
            out.push(')');
        }
        Stmt::Class(ClassDecl { name, superclass, methods, .. }) => {
            let _ = write!(out, "(class {name}");
            if let Some(superclass) = superclass {
                out.push(' ');
                write_expr(superclass, out);
            }
            for method in methods {
                out.push(' ');
                write_function(method, out);
            }
            out.push(')');
        }
    }
}

fn write_function(decl: &FunctionDecl, out: &mut String) {
    let _ = write!(out, "(fun {} ({})", decl.name, decl.params.join(" "));
    for stmt in &decl.body {
        out.push(' ');
        print_stmt(stmt, out);
    }
    out.push(')');
}

fn write_expr(expr: &Expr, out: &mut String) {
    match &expr.kind {
        ExprKind::Literal(value) => write_literal(value, out),
        ExprKind::Grouping(inner) => {
            out.push_str("(group ");
            write_expr(inner, out);
            out.push(')');
        }
        ExprKind::Unary(op, operand) => {
            let _ = write!(out, "({} ", unary_symbol(*op));
            write_expr(operand, out);
            out.push(')');
        }
        ExprKind::Binary(left, op, right) => {
            let _ = write!(out, "({} ", binary_symbol(*op));
            write_expr(left, out);
            out.push(' ');
            write_expr(right, out);
            out.push(')');
        }
        ExprKind::Logical(left, op, right) => {
            let symbol = match op {
                LogicalOp::And => "and",
                LogicalOp::Or => "or",
            };
            let _ = write!(out, "({symbol} ");
            write_expr(left, out);
            out.push(' ');
            write_expr(right, out);
            out.push(')');
        }
        ExprKind::Variable(name) => out.push_str(name),
        ExprKind::Assignment(name, value) => {
            let _ = write!(out, "(= {name} ");
            write_expr(value, out);
            out.push(')');
        }
        ExprKind::Call(callee, args, _) => {
            out.push_str("(call ");
            write_expr(callee, out);
            for arg in args {
                out.push(' ');
                write_expr(arg, out);
            }
            out.push(')');
        }
        ExprKind::Get(object, name) => {
            out.push_str("(get ");
            write_expr(object, out);
            let _ = write!(out, " {name})");
        }
        ExprKind::Set(object, name, value) => {
            out.push_str("(set ");
            write_expr(object, out);
            let _ = write!(out, " {name} ");
            write_expr(value, out);
            out.push(')');
        }
        ExprKind::This => out.push_str("this"),
        ExprKind::Super(method) => {
            let _ = write!(out, "(super {method})");
        }
    }
}

fn write_literal(value: &LiteralValue, out: &mut String) {
    match value {
        LiteralValue::Nil => out.push_str("nil"),
        LiteralValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        LiteralValue::Number(n) => {
            let _ = write!(out, "{n}");
        }
        LiteralValue::String(s) => {
            let _ = write!(out, "{s:?}");
        }
    }
}

fn unary_symbol(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Neg => "-",
        UnaryOp::Not => "!",
    }
}

fn binary_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Equal => "==",
        BinaryOp::NotEqual => "!=",
        BinaryOp::Less => "<",
        BinaryOp::LessEqual => "<=",
        BinaryOp::Greater => ">",
        BinaryOp::GreaterEqual => ">=",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lox_util::Handler;

    #[test]
    fn prints_arithmetic_with_precedence() {
        let mut handler = Handler::new();
        let tokens = lox_lex::Lexer::scan_tokens("(1 + 2) * 3 - 4 / 2;", &mut handler);
        let program = crate::Parser::new(tokens, &mut handler).parse();
        assert!(!handler.has_errors());
        let Stmt::Expr(expr) = &program[0] else { panic!("expected expr stmt") };
        assert_eq!(print_expr(expr), "(- (* (group (+ 1 2)) 3) (/ 4 2))");
    }
}
