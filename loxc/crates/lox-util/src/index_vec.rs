//! Typed integer indices.
//!
//! Every AST node, once parsed, needs a stable identity that survives from
//! the resolver's depth table through to the evaluator. Rather than keying
//! on source spans (ambiguous once the parser desugars `for` loops) or on
//! pointer identity (awkward once nodes move through `Box`es), we hand out
//! a small integer id at construction time and key side tables (e.g. the
//! resolver's `FxHashMap<NodeId, usize>`) on that id. `Idx` and
//! [`define_idx!`] are what make a newtype usable as that kind of key.

/// Trait for types that wrap a plain integer index.
pub trait Idx: Copy + Eq + PartialEq {
    fn from_usize(idx: usize) -> Self;
    fn index(self) -> usize;
}

/// Defines a newtype index backed by `u32` and implements [`Idx`] for it.
#[macro_export]
macro_rules! define_idx {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $crate::Idx for $name {
            fn from_usize(idx: usize) -> Self {
                assert!(idx <= u32::MAX as usize, "index space exhausted for {}", stringify!($name));
                $name(idx as u32)
            }

            fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    define_idx!(TestId);

    #[test]
    fn from_usize_and_index_roundtrip() {
        let a = TestId::from_usize(3);
        assert_eq!(a.index(), 3);
    }

    #[test]
    fn equal_indices_compare_equal() {
        assert_eq!(TestId::from_usize(5), TestId::from_usize(5));
        assert_ne!(TestId::from_usize(5), TestId::from_usize(6));
    }
}
