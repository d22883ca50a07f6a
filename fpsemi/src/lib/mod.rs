//! `fpsemi`: a computation engine for finitely presented semigroups and
//! monoids.
//!
//! This crate is a thin facade over the workspace's layered crates —
//! `fpsemi-types` (words, alphabets, errors), `fpsemi-graph` (union-find,
//! coset tables, SCC digraphs), `fpsemi-automata` (Aho-Corasick string
//! rewriting), `fpsemi-runner` (cooperative cancellation and the parallel
//! race harness) and `fpsemi-kernel` (Knuth-Bendix, Todd-Coxeter,
//! congruence-by-pairs, orbit enumeration, D-class decomposition) — the
//! way `lrpar` sits atop `cfgrammar` and `lrtable` for `grmtools`: pull in
//! this one crate and the rest come with it.
//!
//! Most programs only need [`kernel`] and [`types`]; the lower layers are
//! exposed for callers building their own algorithms on the same
//! primitives.

pub use fpsemi_automata as automata;
pub use fpsemi_graph as graph;
pub use fpsemi_kernel as kernel;
pub use fpsemi_runner as runner;
pub use fpsemi_types as types;

pub use fpsemi_kernel::{
    BooleanMatrix, Capability, CongruenceByPairs, CongruenceSide, DClass, DClassEngine,
    EnumeratedSemigroup, KnuthBendixCore, KnuthBendixSettings, Lookahead, OrbitEngine,
    OverlapPolicy, StandardOrder, Strategy, ToddCoxeterCore, ToddCoxeterQuotient,
    ToddCoxeterSettings, Transformation, TransformationSemigroup,
};
pub use fpsemi_runner::{Race, Runner, RunnerAlgorithm, RunnerControl, RunnerHandle};
pub use fpsemi_types::{Alphabet, Coset, Error, Letter, NodeIdx, PointIdx, Result, RuleId, Word};
