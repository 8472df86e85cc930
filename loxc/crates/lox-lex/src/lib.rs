//! lox-lex - tokenizes Lox source text (§3, §4.1).

mod cursor;
mod lexer;
mod token;

pub use cursor::Cursor;
pub use lexer::Lexer;
pub use token::{keyword_kind, Literal, Token, TokenKind};
