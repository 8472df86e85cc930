//! lox-sem - the static resolver (§4.3).

mod resolver;
mod scope;

pub use resolver::{Distances, Resolver};
