/// A 1-based source line number.
///
/// The lexer is the sole producer of line numbers; every other stage just
/// carries one along for diagnostics. Lox programs are small enough that a
/// line number is all the positional information any diagnostic needs (no
/// column, no byte span).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub line: u32,
}

impl Span {
    pub const fn new(line: u32) -> Self {
        Self { line }
    }

    /// Placeholder span for synthetic nodes that never surface a diagnostic.
    pub const DUMMY: Span = Span { line: 0 };
}

impl From<u32> for Span {
    fn from(line: u32) -> Self {
        Span::new(line)
    }
}
