//! Index newtypes, one per "kind" of thing the engine counts: letters,
//! cosets, rewrite rules, Aho–Corasick nodes, orbit points. Mirrors
//! `cfgrammar`'s `RIdx`/`TIdx`/`PIdx` family (`idxnewtype.rs`): a thin
//! wrapper around an unsigned integer so that, say, a coset id and a rule
//! id can never be passed to the wrong parameter by accident.
//!
//! Generated with a plain `macro_rules!` rather than the `macro-attr`/
//! `newtype_derive` combination used elsewhere in this family of crates;
//! those crates have no maintained modern equivalent and `macro_rules!`
//! expresses the same newtype-with-conversions directly (noted in
//! DESIGN.md).

use std::fmt;

macro_rules! index_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(u32);

        impl $name {
            pub const fn new(v: u32) -> Self {
                $name(v)
            }

            pub const fn as_u32(self) -> u32 {
                self.0
            }
        }

        impl From<u32> for $name {
            fn from(v: u32) -> Self {
                $name(v)
            }
        }

        impl From<usize> for $name {
            fn from(v: usize) -> Self {
                $name(v as u32)
            }
        }

        impl From<$name> for usize {
            fn from(v: $name) -> usize {
                v.0 as usize
            }
        }

        impl From<$name> for u32 {
            fn from(v: $name) -> u32 {
                v.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

index_type!(
    /// A single letter of the alphabet, `[0, n)`.
    Letter
);
index_type!(
    /// A coset identifier (§3 "Coset"). Coset `0` is always the
    /// identity class.
    Coset
);
index_type!(
    /// The monotone identifier of a rewrite rule. Active/inactive state
    /// is tracked separately by `Rewriter` so the identifier itself stays
    /// a plain index.
    RuleId
);
index_type!(
    /// A node of the Aho–Corasick trie.
    NodeIdx
);
index_type!(
    /// A point discovered by an `OrbitEngine`.
    PointIdx
);

impl Coset {
    /// The identity coset, never recycled.
    pub const IDENTITY: Coset = Coset::new(0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_usize() {
        let c = Coset::from(42usize);
        assert_eq!(usize::from(c), 42);
        assert_eq!(c, Coset::new(42));
    }

    #[test]
    fn identity_is_zero() {
        assert_eq!(usize::from(Coset::IDENTITY), 0);
    }
}
