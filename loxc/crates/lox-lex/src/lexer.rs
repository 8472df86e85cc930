//! The Lox lexer (§4.1): a deterministic single-pass tokenizer.

use lox_util::Handler;

use crate::cursor::Cursor;
use crate::token::{keyword_kind, Literal, Token, TokenKind};

pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    token_start: usize,
    token_start_line: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { cursor: Cursor::new(source), token_start: 0, token_start_line: 1 }
    }

    /// Scans the whole source into a token stream, terminated by `Eof`.
    ///
    /// Never fails hard (§4.1): lexical errors are reported on `handler`
    /// and lexing continues from the next character.
    pub fn scan_tokens(source: &str, handler: &mut Handler) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token(handler);
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                return tokens;
            }
        }
    }

    fn next_token(&mut self, handler: &mut Handler) -> Token {
        self.skip_whitespace_and_comments();

        self.token_start = self.cursor.position();
        self.token_start_line = self.cursor.line();

        if self.cursor.is_at_end() {
            return self.make(TokenKind::Eof);
        }

        let c = self.cursor.advance();
        match c {
            '(' => self.make(TokenKind::LeftParen),
            ')' => self.make(TokenKind::RightParen),
            '{' => self.make(TokenKind::LeftBrace),
            '}' => self.make(TokenKind::RightBrace),
            ',' => self.make(TokenKind::Comma),
            '.' => self.make(TokenKind::Dot),
            '-' => self.make(TokenKind::Minus),
            '+' => self.make(TokenKind::Plus),
            ';' => self.make(TokenKind::Semicolon),
            '*' => self.make(TokenKind::Star),
            '/' => self.make(TokenKind::Slash),
            '!' => {
                let kind = if self.cursor.advance_if('=') { TokenKind::BangEqual } else { TokenKind::Bang };
                self.make(kind)
            }
            '=' => {
                let kind = if self.cursor.advance_if('=') { TokenKind::EqualEqual } else { TokenKind::Equal };
                self.make(kind)
            }
            '<' => {
                let kind = if self.cursor.advance_if('=') { TokenKind::LessEqual } else { TokenKind::Less };
                self.make(kind)
            }
            '>' => {
                let kind = if self.cursor.advance_if('=') { TokenKind::GreaterEqual } else { TokenKind::Greater };
                self.make(kind)
            }
            '"' => self.lex_string(handler),
            c if c.is_ascii_digit() => self.lex_number(),
            c if c.is_ascii_alphabetic() => self.lex_identifier(),
            _ => {
                handler.error(self.token_start_line, "Unexpected character");
                self.next_token(handler)
            }
        }
    }

    fn make(&self, kind: TokenKind) -> Token {
        let lexeme = self.cursor.slice_from(self.token_start);
        Token::new(kind, lexeme, self.token_start_line)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.cursor.current_char() {
                ' ' | '\t' | '\r' | '\n' => {
                    self.cursor.advance();
                }
                '/' if self.cursor.peek_char(1) == '/' => {
                    while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
                        self.cursor.advance();
                    }
                }
                _ => return,
            }
        }
    }

    /// `"` ... `"`, with multi-line contents (§4.1). An unterminated string
    /// reports an error at the opening line and produces no token — the
    /// caller must re-dispatch rather than treat this as one lexeme.
    fn lex_string(&mut self, handler: &mut Handler) -> Token {
        let opening_line = self.token_start_line;
        while self.cursor.current_char() != '"' && !self.cursor.is_at_end() {
            self.cursor.advance();
        }

        if self.cursor.is_at_end() {
            handler.error(opening_line, "Unterminated string");
            return self.next_token(handler);
        }

        // Closing quote.
        self.cursor.advance();

        let lexeme = self.cursor.slice_from(self.token_start).to_string();
        let value = lexeme[1..lexeme.len() - 1].to_string();
        Token::with_literal(TokenKind::String, lexeme, opening_line, Literal::String(value))
    }

    /// `[0-9]+(\.[0-9]+)?` (§4.1). A trailing `.` not followed by a digit is
    /// not part of the literal (e.g. `1.` lexes as `Number(1)` then `Dot`).
    fn lex_number(&mut self) -> Token {
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }

        if self.cursor.current_char() == '.' && self.cursor.peek_char(1).is_ascii_digit() {
            self.cursor.advance();
            while self.cursor.current_char().is_ascii_digit() {
                self.cursor.advance();
            }
        }

        let lexeme = self.cursor.slice_from(self.token_start).to_string();
        let value: f64 = lexeme.parse().expect("number lexeme matched [0-9]+(\\.[0-9]+)?");
        Token::with_literal(TokenKind::Number, lexeme, self.token_start_line, Literal::Number(value))
    }

    /// `[A-Za-z][A-Za-z0-9]*` (§4.1), or the matching keyword kind.
    fn lex_identifier(&mut self) -> Token {
        while self.cursor.current_char().is_ascii_alphanumeric() {
            self.cursor.advance();
        }

        let lexeme = self.cursor.slice_from(self.token_start);
        let kind = keyword_kind(lexeme).unwrap_or(TokenKind::Identifier);
        self.make(kind)
    }
}
