//! lox-util - shared foundation types for the Lox interpreter pipeline.
//!
//! Every other `lox-*` crate depends on this one for: stable node identity
//! (`NodeId`, built on the typed-index machinery in `index_vec`), source
//! positions (`Span`), and diagnostic collection (`Handler`). Nothing in
//! here knows about tokens, ASTs, or runtime values — those are layered on
//! top in `lox-lex`, `lox-par`, `lox-sem`, and `lox-runtime`.

mod diagnostic;
mod index_vec;
mod node_id;
mod span;

pub use diagnostic::{Diagnostic, DiagnosticBuilder, Handler, Level};
pub use index_vec::Idx;
pub use node_id::{NodeId, NodeIdGenerator};
pub use span::Span;

pub use rustc_hash::FxHashMap;
pub use rustc_hash::FxHashSet;
