//! Diagnostic collection shared by every pipeline stage.
//!
//! `spec.md` §1 calls this the `Reporter`: "an external collaborator;
//! implementation is unconstrained". We pin down a concrete shape here
//! since every crate in the workspace needs to agree on one: a `Handler`
//! that stages append [`Diagnostic`]s to, rendered as
//! `[line N] Error <message>` (§6).

use std::fmt;

use crate::span::Span;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "Error"),
            Level::Warning => write!(f, "Warning"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub span: Span,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[line {}] {} {}", self.span.line, self.level, self.message)
    }
}

/// Builds a [`Diagnostic`] with a small fluent API.
pub struct DiagnosticBuilder {
    level: Level,
    message: String,
    span: Span,
}

impl DiagnosticBuilder {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self { level, message: message.into(), span: Span::DUMMY }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Level::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Level::Warning, message)
    }

    pub fn span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn build(self) -> Diagnostic {
        Diagnostic { level: self.level, message: self.message, span: self.span }
    }

    pub fn emit(self, handler: &mut Handler) {
        handler.push(self.build());
    }
}

/// Collects diagnostics for one pipeline run (one file, or one REPL line).
///
/// Each stage (lexer, parser, resolver, evaluator) is handed a `&mut
/// Handler` and appends to it; none of them decide whether to abort the
/// pipeline themselves (`lox-driver` does, per §2/§7).
#[derive(Default)]
pub struct Handler {
    diagnostics: Vec<Diagnostic>,
}

impl Handler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Convenience for the common case: report `message` at `line`.
    pub fn error(&mut self, line: u32, message: impl Into<String>) {
        self.push(Diagnostic { level: Level::Error, message: message.into(), span: Span::new(line) });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.level == Level::Error)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Render every collected diagnostic to `writer`, one per line.
    pub fn render(&self, mut writer: impl std::io::Write) -> std::io::Result<()> {
        for diagnostic in &self.diagnostics {
            writeln!(writer, "{diagnostic}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_as_line_error_message() {
        let diag = DiagnosticBuilder::error("Undefined variable x").span(Span::new(3)).build();
        assert_eq!(diag.to_string(), "[line 3] Error Undefined variable x");
    }

    #[test]
    fn handler_has_errors_ignores_warnings() {
        let mut handler = Handler::new();
        DiagnosticBuilder::warning("unused").span(Span::new(1)).emit(&mut handler);
        assert!(!handler.has_errors());
        handler.error(2, "boom");
        assert!(handler.has_errors());
        assert_eq!(handler.diagnostics().len(), 2);
    }
}
