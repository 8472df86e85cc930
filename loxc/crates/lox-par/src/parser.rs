//! Recursive-descent parser with panic-mode error recovery (§4.2).

use lox_lex::{Literal, Token, TokenKind};
use lox_util::{Handler, NodeIdGenerator};

use crate::ast::{
    BinaryOp, ClassDecl, Expr, ExprKind, FunctionDecl, LiteralValue, LogicalOp, Program, Stmt, UnaryOp,
};

const MAX_ARGS: usize = 255;

pub struct Parser<'a> {
    tokens: Vec<Token>,
    position: usize,
    handler: &'a mut Handler,
    ids: NodeIdGenerator,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, handler: &'a mut Handler) -> Self {
        Self { tokens, position: 0, handler, ids: NodeIdGenerator::new() }
    }

    /// `program → declaration* EOF` (§4.2). Always returns, even after
    /// errors — the pipeline decides whether to continue past a nonempty
    /// diagnostic list, not the parser.
    pub fn parse(&mut self) -> Program {
        let mut stmts = Vec::new();
        while !self.is_at_end() {
            match self.declaration() {
                Some(stmt) => stmts.push(stmt),
                None => self.synchronize(),
            }
        }
        stmts
    }

    // ---- declarations -----------------------------------------------

    fn declaration(&mut self) -> Option<Stmt> {
        if self.check_match(TokenKind::Class) {
            return self.class_declaration();
        }
        if self.check_match(TokenKind::Fun) {
            return self.function("function").map(Stmt::Function);
        }
        if self.check_match(TokenKind::Var) {
            return self.var_declaration();
        }
        self.statement()
    }

    fn class_declaration(&mut self) -> Option<Stmt> {
        let line = self.previous().line;
        let name = self.consume_identifier("Expect class name")?;

        let superclass = if self.check_match(TokenKind::Less) {
            self.consume_identifier("Expect superclass name")?;
            let super_line = self.previous().line;
            Some(Expr::new(self.ids.next_id(), super_line, ExprKind::Variable(self.previous().lexeme.clone())))
        } else {
            None
        };

        self.consume(TokenKind::LeftBrace, "Expect '{' before class body")?;

        let mut methods = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            match self.function("method") {
                Some(method) => methods.push(method),
                None => {
                    self.synchronize();
                }
            }
        }

        self.consume(TokenKind::RightBrace, "Expect '}' after class body")?;
        Some(Stmt::Class(ClassDecl { name, superclass, methods, line }))
    }

    /// `function → IDENT "(" parameters? ")" block` (§4.2). `kind` is
    /// only used to word diagnostics ("function"/"method").
    fn function(&mut self, kind: &str) -> Option<FunctionDecl> {
        let name = self.consume_identifier(&format!("Expect {kind} name"))?;
        let line = self.previous().line;

        self.consume(TokenKind::LeftParen, &format!("Expect '(' after {kind} name"))?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if params.len() >= MAX_ARGS {
                    self.error_at_current("Can't have more than 255 parameters");
                }
                params.push(self.consume_identifier("Expect parameter name")?);
                if !self.check_match(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expect ')' after parameters")?;

        self.consume(TokenKind::LeftBrace, &format!("Expect '{{' before {kind} body"))?;
        let body = self.block()?;
        Some(FunctionDecl { name, params, body, line })
    }

    fn var_declaration(&mut self) -> Option<Stmt> {
        let line = self.previous().line;
        let name = self.consume_identifier("Expect variable name")?;
        let initializer = if self.check_match(TokenKind::Equal) { Some(self.expression()?) } else { None };
        self.consume(TokenKind::Semicolon, "Expect ';' after variable declaration")?;
        Some(Stmt::VarDecl { name, initializer, line })
    }

    // ---- statements ---------------------------------------------------

    fn statement(&mut self) -> Option<Stmt> {
        if self.check_match(TokenKind::Print) {
            return self.print_statement();
        }
        if self.check_match(TokenKind::LeftBrace) {
            return self.block().map(Stmt::Block);
        }
        if self.check_match(TokenKind::If) {
            return self.if_statement();
        }
        if self.check_match(TokenKind::While) {
            return self.while_statement();
        }
        if self.check_match(TokenKind::For) {
            return self.for_statement();
        }
        if self.check_match(TokenKind::Return) {
            return self.return_statement();
        }
        self.expression_statement()
    }

    fn print_statement(&mut self) -> Option<Stmt> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after value")?;
        Some(Stmt::Print(expr))
    }

    fn expression_statement(&mut self) -> Option<Stmt> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after expression")?;
        Some(Stmt::Expr(expr))
    }

    fn block(&mut self) -> Option<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            match self.declaration() {
                Some(stmt) => stmts.push(stmt),
                None => self.synchronize(),
            }
        }
        self.consume(TokenKind::RightBrace, "Expect '}' after block")?;
        Some(stmts)
    }

    fn if_statement(&mut self) -> Option<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'if'")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after if condition")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch =
            if self.check_match(TokenKind::Else) { Some(Box::new(self.statement()?)) } else { None };

        Some(Stmt::If { condition, then_branch, else_branch })
    }

    fn while_statement(&mut self) -> Option<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'while'")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after condition")?;
        let body = Box::new(self.statement()?);
        Some(Stmt::While { condition, body })
    }

    /// Desugars `for (init; cond; inc) body` into
    /// `{ init; while (cond) { body; inc; } }` at parse time (§4.2) — the
    /// only syntactic rewrite this parser performs.
    fn for_statement(&mut self) -> Option<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'for'")?;

        let initializer = if self.check_match(TokenKind::Semicolon) {
            None
        } else if self.check_match(TokenKind::Var) {
            self.var_declaration()
        } else {
            self.expression_statement()
        };

        let condition = if self.check(TokenKind::Semicolon) {
            Expr::new(self.ids.next_id(), self.previous().line, ExprKind::Literal(LiteralValue::Bool(true)))
        } else {
            self.expression()?
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after loop condition")?;

        let increment =
            if self.check(TokenKind::RightParen) { None } else { Some(self.expression()?) };
        self.consume(TokenKind::RightParen, "Expect ')' after for clauses")?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expr(increment)]);
        }
        body = Stmt::While { condition, body: Box::new(body) };
        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![initializer, body]);
        }

        Some(body)
    }

    fn return_statement(&mut self) -> Option<Stmt> {
        let line = self.previous().line;
        let value = if self.check(TokenKind::Semicolon) { None } else { Some(self.expression()?) };
        self.consume(TokenKind::Semicolon, "Expect ';' after return value")?;
        Some(Stmt::Return { value, line })
    }

    // ---- expressions ----------------------------------------------------

    fn expression(&mut self) -> Option<Expr> {
        self.assignment()
    }

    /// `assignment → (call ".")? IDENT "=" assignment | logic_or` (§4.2).
    /// Parses the left-hand side as an ordinary expression first, then
    /// validates it as an assignment target only if `=` follows — this
    /// way the grammar needs no lookahead. An invalid target is reported
    /// without consuming the `=`, so the caller's statement-level sync
    /// still sees it.
    fn assignment(&mut self) -> Option<Expr> {
        let expr = self.or_expr()?;

        if self.check(TokenKind::Equal) {
            let equals_line = self.peek().line;

            if !matches!(expr.kind, ExprKind::Variable(_) | ExprKind::Get(_, _)) {
                self.handler.error(equals_line, "Invalid assignment target");
                return Some(expr);
            }

            self.advance();
            let value = self.assignment()?;

            return match expr.kind {
                ExprKind::Variable(name) => {
                    Some(Expr::new(self.ids.next_id(), equals_line, ExprKind::Assignment(name, Box::new(value))))
                }
                ExprKind::Get(object, name) => {
                    Some(Expr::new(self.ids.next_id(), equals_line, ExprKind::Set(object, name, Box::new(value))))
                }
                _ => unreachable!("checked above"),
            };
        }

        Some(expr)
    }

    fn or_expr(&mut self) -> Option<Expr> {
        let mut expr = self.and_expr()?;
        while self.check(TokenKind::Or) {
            let line = self.peek().line;
            self.advance();
            let right = self.and_expr()?;
            expr = Expr::new(self.ids.next_id(), line, ExprKind::Logical(Box::new(expr), LogicalOp::Or, Box::new(right)));
        }
        Some(expr)
    }

    fn and_expr(&mut self) -> Option<Expr> {
        let mut expr = self.equality()?;
        while self.check(TokenKind::And) {
            let line = self.peek().line;
            self.advance();
            let right = self.equality()?;
            expr = Expr::new(self.ids.next_id(), line, ExprKind::Logical(Box::new(expr), LogicalOp::And, Box::new(right)));
        }
        Some(expr)
    }

    fn equality(&mut self) -> Option<Expr> {
        let mut expr = self.comparison()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::BangEqual => BinaryOp::NotEqual,
                TokenKind::EqualEqual => BinaryOp::Equal,
                _ => break,
            };
            let line = self.peek().line;
            self.advance();
            let right = self.comparison()?;
            expr = Expr::new(self.ids.next_id(), line, ExprKind::Binary(Box::new(expr), op, Box::new(right)));
        }
        Some(expr)
    }

    fn comparison(&mut self) -> Option<Expr> {
        let mut expr = self.term()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Greater => BinaryOp::Greater,
                TokenKind::GreaterEqual => BinaryOp::GreaterEqual,
                TokenKind::Less => BinaryOp::Less,
                TokenKind::LessEqual => BinaryOp::LessEqual,
                _ => break,
            };
            let line = self.peek().line;
            self.advance();
            let right = self.term()?;
            expr = Expr::new(self.ids.next_id(), line, ExprKind::Binary(Box::new(expr), op, Box::new(right)));
        }
        Some(expr)
    }

    fn term(&mut self) -> Option<Expr> {
        let mut expr = self.factor()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Minus => BinaryOp::Sub,
                TokenKind::Plus => BinaryOp::Add,
                _ => break,
            };
            let line = self.peek().line;
            self.advance();
            let right = self.factor()?;
            expr = Expr::new(self.ids.next_id(), line, ExprKind::Binary(Box::new(expr), op, Box::new(right)));
        }
        Some(expr)
    }

    fn factor(&mut self) -> Option<Expr> {
        let mut expr = self.unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Star => BinaryOp::Mul,
                _ => break,
            };
            let line = self.peek().line;
            self.advance();
            let right = self.unary()?;
            expr = Expr::new(self.ids.next_id(), line, ExprKind::Binary(Box::new(expr), op, Box::new(right)));
        }
        Some(expr)
    }

    fn unary(&mut self) -> Option<Expr> {
        let op = match self.peek().kind {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Neg),
            _ => None,
        };
        if let Some(op) = op {
            let line = self.peek().line;
            self.advance();
            let operand = self.unary()?;
            return Some(Expr::new(self.ids.next_id(), line, ExprKind::Unary(op, Box::new(operand))));
        }
        self.call()
    }

    /// `call → primary ("(" arguments? ")" | "." IDENT)*` (§4.2).
    fn call(&mut self) -> Option<Expr> {
        let mut expr = self.primary()?;
        loop {
            if self.check_match(TokenKind::LeftParen) {
                expr = self.finish_call(expr)?;
            } else if self.check_match(TokenKind::Dot) {
                let name = self.consume_identifier("Expect property name after '.'")?;
                let line = self.previous().line;
                expr = Expr::new(self.ids.next_id(), line, ExprKind::Get(Box::new(expr), name));
            } else {
                break;
            }
        }
        Some(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> Option<Expr> {
        let mut args = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if args.len() >= MAX_ARGS {
                    self.error_at_current("Can't have more than 255 arguments");
                }
                args.push(self.expression()?);
                if !self.check_match(TokenKind::Comma) {
                    break;
                }
            }
        }
        let paren = self.consume(TokenKind::RightParen, "Expect ')' after arguments")?;
        let line = paren.line;
        Some(Expr::new(self.ids.next_id(), line, ExprKind::Call(Box::new(callee), args, line)))
    }

    fn primary(&mut self) -> Option<Expr> {
        let token = self.peek().clone();
        let line = token.line;

        let kind = match token.kind {
            TokenKind::False => {
                self.advance();
                ExprKind::Literal(LiteralValue::Bool(false))
            }
            TokenKind::True => {
                self.advance();
                ExprKind::Literal(LiteralValue::Bool(true))
            }
            TokenKind::Nil => {
                self.advance();
                ExprKind::Literal(LiteralValue::Nil)
            }
            TokenKind::Number => {
                self.advance();
                match token.literal {
                    Some(Literal::Number(value)) => ExprKind::Literal(LiteralValue::Number(value)),
                    _ => unreachable!("Number token without a numeric literal"),
                }
            }
            TokenKind::String => {
                self.advance();
                match token.literal {
                    Some(Literal::String(value)) => ExprKind::Literal(LiteralValue::String(value)),
                    _ => unreachable!("String token without a string literal"),
                }
            }
            TokenKind::This => {
                self.advance();
                ExprKind::This
            }
            TokenKind::Super => {
                self.advance();
                self.consume(TokenKind::Dot, "Expect '.' after 'super'")?;
                let method = self.consume_identifier("Expect superclass method name")?;
                ExprKind::Super(method)
            }
            TokenKind::Identifier => {
                self.advance();
                ExprKind::Variable(token.lexeme.clone())
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.expression()?;
                self.consume(TokenKind::RightParen, "Expect ')' after expression")?;
                ExprKind::Grouping(Box::new(inner))
            }
            _ => {
                self.error_at_current("Expect expression");
                return None;
            }
        };

        Some(Expr::new(self.ids.next_id(), line, kind))
    }

    // ---- token-stream plumbing -----------------------------------------

    fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.position - 1]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn check_match(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Option<&Token> {
        if self.check(kind) {
            return Some(self.advance());
        }
        self.error_at_current(message);
        None
    }

    fn consume_identifier(&mut self, message: &str) -> Option<String> {
        if self.check(TokenKind::Identifier) {
            self.advance();
            return Some(self.previous().lexeme.clone());
        }
        self.error_at_current(message);
        None
    }

    /// Reports `message` at the line of the token that failed to match —
    /// the previous token when at EOF, per the teacher's convention of
    /// attributing syntax errors to the last successfully consumed token.
    fn error_at_current(&mut self, message: &str) {
        let line = if self.is_at_end() { self.previous().line } else { self.peek().line };
        self.handler.error(line, message);
    }

    /// Panic-mode recovery (§4.2): discard tokens until a statement
    /// boundary — a consumed `;` or a token that starts a new statement.
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }
            match self.peek().kind {
                TokenKind::Class
                | TokenKind::Fun
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}
