//! Process-wide constants, localized as associated items rather than Rust
//! `static`s (§9 "Global mutable state": "put the constants as
//! associated constants of a helper module").

/// Sentinel used by dense tables that still need a raw-integer "not
/// defined" marker at the storage layer (e.g. the byte-string encoding of
/// §6 data format 1). Prefer `Option<T>` at the API layer; this exists only
/// where a fixed-width row needs an in-band marker.
pub const UNDEFINED: usize = usize::MAX;

/// Used by `EnumeratedSemigroup::size()` and friends to report "no finite
/// bound is known yet".
pub const POSITIVE_INFINITY: usize = usize::MAX - 1;

/// An upper bound a caller has imposed (e.g. `max_rules`, `max_overlap`)
/// that should be treated as "no limit" when left at this value.
pub const LIMIT_MAX: usize = usize::MAX - 2;

/// Three-valued logic for queries that may not be decidable within the
/// time budget given (§7: "every observable query either returns a
/// value, returns a three-valued result ... or raises an error").
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ThreeValued {
    Yes,
    No,
    Unknown,
}

impl ThreeValued {
    pub fn is_yes(self) -> bool {
        matches!(self, ThreeValued::Yes)
    }

    pub fn is_no(self) -> bool {
        matches!(self, ThreeValued::No)
    }

    pub fn is_unknown(self) -> bool {
        matches!(self, ThreeValued::Unknown)
    }
}

impl From<bool> for ThreeValued {
    fn from(b: bool) -> Self {
        if b {
            ThreeValued::Yes
        } else {
            ThreeValued::No
        }
    }
}
