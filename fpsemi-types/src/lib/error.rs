//! Error kinds raised at the API boundary (§7). Internal routines
//! propagate these to the nearest boundary with `?`; nothing here is
//! recovered silently.

use thiserror::Error;

use crate::idx::{Coset, Letter};

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum Error {
    #[error("alphabet already set, contains a duplicate letter, or exceeds 256 letters")]
    InvalidAlphabet,

    #[error("letter {letter} does not belong to the declared alphabet of size {alphabet_size}")]
    InvalidWord { letter: Letter, alphabet_size: usize },

    #[error("relation is invalid: {reason}")]
    InvalidRelation { reason: String },

    #[error("structural mutation attempted after enumeration began")]
    Frozen,

    #[error("prefill table is not rectangular, has an out-of-range entry, or conflicts with an already-added relation")]
    InvalidPrefill,

    #[error("operation requires every edge of the digraph to be defined, but {coset} has an undefined edge")]
    NotFullyDefined { coset: Coset },

    #[error("{what} is not yet implemented for this structure")]
    NotYetImplemented { what: &'static str },

    #[error("a finite witness was requested for a structure that is provably infinite")]
    InfiniteQuotient,

    #[error("index {index} out of range (bound {bound})")]
    OutOfRange { index: usize, bound: usize },

    #[error("a word with this signature already names a terminal trie node")]
    AlreadyTerminal,
}

pub type Result<T> = std::result::Result<T, Error>;
