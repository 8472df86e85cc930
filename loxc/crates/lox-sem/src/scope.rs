//! The resolver's scope stack (§4.3): a list of string-sets, each marking
//! a name as declared (not yet initialized) or defined (usable). Unlike
//! the arena-indexed rib trees used elsewhere in this pipeline family,
//! resolver scopes live and die with stack discipline — a `Vec` of maps
//! mirrors that directly.

use lox_util::FxHashMap;

pub struct ScopeStack {
    scopes: Vec<FxHashMap<String, bool>>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    pub fn push(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub fn pop(&mut self) {
        self.scopes.pop();
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Marks `name` as declared-but-not-defined in the innermost scope.
    /// Returns `true` if `name` already existed in this scope (a
    /// redeclaration error in every scope but the global one).
    pub fn declare(&mut self, name: &str) -> bool {
        match self.scopes.last_mut() {
            Some(scope) => {
                let existed = scope.contains_key(name);
                scope.insert(name.to_string(), false);
                existed
            }
            None => false,
        }
    }

    /// Marks `name` as usable in the innermost scope.
    pub fn define(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), true);
        }
    }

    /// `Some(false)` if `name` is declared but not yet defined in the
    /// innermost scope (reading it there is the self-initializer error).
    pub fn innermost_status(&self, name: &str) -> Option<bool> {
        self.scopes.last().and_then(|scope| scope.get(name).copied())
    }

    /// Walks the stack from innermost outward; `Some(d)` if `name` is
    /// bound `d` scopes up from the innermost.
    pub fn resolve_distance(&self, name: &str) -> Option<usize> {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(name) {
                return Some(depth);
            }
        }
        None
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_then_define_marks_usable() {
        let mut scopes = ScopeStack::new();
        scopes.push();
        assert_eq!(scopes.innermost_status("a"), None);
        scopes.declare("a");
        assert_eq!(scopes.innermost_status("a"), Some(false));
        scopes.define("a");
        assert_eq!(scopes.innermost_status("a"), Some(true));
    }

    #[test]
    fn resolve_distance_counts_from_innermost() {
        let mut scopes = ScopeStack::new();
        scopes.push();
        scopes.declare("outer");
        scopes.define("outer");
        scopes.push();
        scopes.declare("inner");
        scopes.define("inner");
        assert_eq!(scopes.resolve_distance("inner"), Some(0));
        assert_eq!(scopes.resolve_distance("outer"), Some(1));
        assert_eq!(scopes.resolve_distance("missing"), None);
    }

    #[test]
    fn declare_reports_existing_in_same_scope_only() {
        let mut scopes = ScopeStack::new();
        scopes.push();
        assert!(!scopes.declare("a"));
        assert!(scopes.declare("a"));
        scopes.push();
        assert!(!scopes.declare("a"));
    }
}
