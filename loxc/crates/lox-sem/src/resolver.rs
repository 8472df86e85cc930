//! Static resolver (§4.3): walks the AST once, before evaluation, and
//! computes a map from expression identity to scope distance. Also
//! enforces the static rules that do not depend on runtime values (`this`
//! outside a class, `return` outside a function, self-initializer reads).

use lox_par::{ClassDecl, Expr, ExprKind, FunctionDecl, Program, Stmt};
use lox_util::{FxHashMap, Handler, NodeId};

use crate::scope::ScopeStack;

#[derive(Clone, Copy, PartialEq, Eq)]
enum FunctionKind {
    None,
    Function,
    Initializer,
    Method,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ClassKind {
    None,
    Class,
    Subclass,
}

pub struct Resolver<'a> {
    scopes: ScopeStack,
    distances: FxHashMap<NodeId, usize>,
    handler: &'a mut Handler,
    function_kind: FunctionKind,
    class_kind: ClassKind,
}

/// The result of a successful resolve pass: every `Variable`, `Assignment`,
/// `This`, and `Super` node's [`NodeId`] maps to its scope distance.
/// Absence means the reference is global (§3, §4.4).
pub type Distances = FxHashMap<NodeId, usize>;

impl<'a> Resolver<'a> {
    pub fn new(handler: &'a mut Handler) -> Self {
        Self {
            scopes: ScopeStack::new(),
            distances: FxHashMap::default(),
            handler,
            function_kind: FunctionKind::None,
            class_kind: ClassKind::None,
        }
    }

    pub fn resolve(mut self, program: &Program) -> Distances {
        self.resolve_stmts(program);
        self.distances
    }

    fn resolve_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.resolve_stmt(stmt);
        }
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(expr) | Stmt::Print(expr) => self.resolve_expr(expr),
            Stmt::VarDecl { name, initializer, line } => {
                self.declare(name, *line);
                if let Some(init) = initializer {
                    self.resolve_expr(init);
                }
                self.define(name);
            }
            Stmt::Block(stmts) => {
                self.scopes.push();
                self.resolve_stmts(stmts);
                self.scopes.pop();
            }
            Stmt::If { condition, then_branch, else_branch } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch);
                }
            }
            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }
            Stmt::Function(decl) => {
                self.declare(&decl.name, decl.line);
                self.define(&decl.name);
                self.resolve_function(decl, FunctionKind::Function);
            }
            Stmt::Return { value, line } => {
                if self.function_kind == FunctionKind::None {
                    self.handler.error(*line, "Can't return from top-level code");
                }
                if let Some(value) = value {
                    if self.function_kind == FunctionKind::Initializer {
                        self.handler.error(*line, "Can't return a value from an initializer");
                    }
                    self.resolve_expr(value);
                }
            }
            Stmt::Class(class_decl) => self.resolve_class(class_decl),
        }
    }

    fn resolve_class(&mut self, class_decl: &ClassDecl) {
        let enclosing_class = self.class_kind;
        self.class_kind = ClassKind::Class;

        self.declare(&class_decl.name, class_decl.line);
        self.define(&class_decl.name);

        if let Some(superclass) = &class_decl.superclass {
            if let ExprKind::Variable(name) = &superclass.kind {
                if name == &class_decl.name {
                    self.handler.error(class_decl.line, "A class can't inherit from itself");
                }
            }
            self.class_kind = ClassKind::Subclass;
            self.resolve_expr(superclass);
            self.scopes.push();
            self.scopes.declare("super");
            self.scopes.define("super");
        }

        self.scopes.push();
        self.scopes.declare("this");
        self.scopes.define("this");

        for method in &class_decl.methods {
            let kind =
                if method.name == "init" { FunctionKind::Initializer } else { FunctionKind::Method };
            self.resolve_function(method, kind);
        }

        self.scopes.pop();

        if class_decl.superclass.is_some() {
            self.scopes.pop();
        }

        self.class_kind = enclosing_class;
    }

    fn resolve_function(&mut self, decl: &FunctionDecl, kind: FunctionKind) {
        let enclosing_function = self.function_kind;
        self.function_kind = kind;

        self.scopes.push();
        for param in &decl.params {
            self.declare(param, decl.line);
            self.define(param);
        }
        self.resolve_stmts(&decl.body);
        self.scopes.pop();

        self.function_kind = enclosing_function;
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Literal(_) => {}
            ExprKind::Grouping(inner) => self.resolve_expr(inner),
            ExprKind::Unary(_, operand) => self.resolve_expr(operand),
            ExprKind::Binary(left, _, right) | ExprKind::Logical(left, _, right) => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            ExprKind::Variable(name) => {
                if self.scopes.innermost_status(name) == Some(false) {
                    self.handler.error(expr.line, "Can't read local variable in its own initializer");
                }
                self.resolve_local(expr.id, name);
            }
            ExprKind::Assignment(name, value) => {
                self.resolve_expr(value);
                self.resolve_local(expr.id, name);
            }
            ExprKind::Call(callee, args, _) => {
                self.resolve_expr(callee);
                for arg in args {
                    self.resolve_expr(arg);
                }
            }
            ExprKind::Get(object, _) => self.resolve_expr(object),
            ExprKind::Set(object, _, value) => {
                self.resolve_expr(value);
                self.resolve_expr(object);
            }
            ExprKind::This => {
                if self.class_kind == ClassKind::None {
                    self.handler.error(expr.line, "Can't use 'this' outside of a class");
                }
                self.resolve_local(expr.id, "this");
            }
            ExprKind::Super(_) => {
                match self.class_kind {
                    ClassKind::None => self.handler.error(expr.line, "Can't use 'super' outside of a class"),
                    ClassKind::Class => {
                        self.handler.error(expr.line, "Can't use 'super' in a class with no superclass")
                    }
                    ClassKind::Subclass => {}
                }
                self.resolve_local(expr.id, "super");
            }
        }
    }

    fn declare(&mut self, name: &str, line: u32) {
        if self.scopes.is_empty() {
            return;
        }
        if self.scopes.declare(name) {
            self.handler.error(line, format!("Already a variable with this name in this scope: {name}"));
        }
    }

    fn define(&mut self, name: &str) {
        if self.scopes.is_empty() {
            return;
        }
        self.scopes.define(name);
    }

    fn resolve_local(&mut self, id: NodeId, name: &str) {
        if let Some(distance) = self.scopes.resolve_distance(name) {
            self.distances.insert(id, distance);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lox_lex::Lexer;

    fn resolve(source: &str) -> (Distances, Handler) {
        let mut handler = Handler::new();
        let tokens = Lexer::scan_tokens(source, &mut handler);
        let program = lox_par::Parser::new(tokens, &mut handler).parse();
        let distances = Resolver::new(&mut handler).resolve(&program);
        (distances, handler)
    }

    #[test]
    fn self_initializer_read_is_an_error() {
        let (_, handler) = resolve("fun bad() { var a = a; }");
        assert!(handler.has_errors());
    }

    #[test]
    fn this_outside_class_is_an_error() {
        let (_, handler) = resolve("print this;");
        assert!(handler.has_errors());
    }

    #[test]
    fn super_without_superclass_is_an_error() {
        let (_, handler) = resolve("class A { m() { super.m(); } }");
        assert!(handler.has_errors());
    }

    #[test]
    fn return_outside_function_is_an_error() {
        let (_, handler) = resolve("return 1;");
        assert!(handler.has_errors());
    }

    #[test]
    fn nested_block_local_resolves_with_distance() {
        let (distances, handler) = resolve("{ var a = 1; { print a; } }");
        assert!(!handler.has_errors());
        assert!(distances.values().any(|&d| d == 1));
    }

    #[test]
    fn global_redeclaration_is_allowed() {
        let (_, handler) = resolve("var a = 1; var a = 2;");
        assert!(!handler.has_errors());
    }
}
