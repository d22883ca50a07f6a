//! The computational core of the fpsemi engine: Knuth-Bendix completion,
//! Todd-Coxeter coset enumeration, congruence-by-pairs closure, the orbit
//! engine, and Konieczny D-class decomposition (§4.8-§4.13). Plays the
//! role `lrpar` plays for `grmtools`: the layer that actually runs the
//! algorithm, built on the table/graph/automaton layers beneath it.

pub mod capability;
pub mod congruence;
pub mod dclass;
pub mod knuth_bendix;
pub mod orbit;
pub mod semigroup;
pub mod todd_coxeter;

pub use capability::Capability;
pub use congruence::CongruenceByPairs;
pub use dclass::{BooleanMatrix, DClass, DClassEngine};
pub use knuth_bendix::{KnuthBendixCore, KnuthBendixSettings, OverlapPolicy};
pub use orbit::OrbitEngine;
pub use semigroup::{EnumeratedSemigroup, Transformation, TransformationSemigroup};
pub use todd_coxeter::{
    CongruenceSide, Lookahead, StandardOrder, Strategy, ToddCoxeterCore, ToddCoxeterQuotient,
    ToddCoxeterSettings,
};

// `orbit::Side` (left/right multiplier composition order, §4.8) and
// `congruence::Side` (left/right/two-sided congruence closure, §4.11) name
// two distinct enums; re-exporting both under one bare `Side` would erase
// that distinction, so callers reach them through their owning modules
// (`orbit::Side`, `congruence::Side`) instead.
