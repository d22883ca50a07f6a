//! Graph-layer primitives for the fpsemi engine: disjoint sets, coset
//! pools, and labeled digraphs with Gabow SCC. Mirrors the role `lrtable`
//! plays for `grmtools`: the reusable table/graph-construction layer sat
//! between the raw data types (`cfgrammar` / here `fpsemi-types`) and the
//! parsing engine (`lrpar` / here `fpsemi-kernel`).

pub mod coset_manager;
pub mod digraph;
pub mod union_find;

pub use coset_manager::CosetManager;
pub use digraph::{LabeledDigraph, SpanningForest};
pub use union_find::UnionFind;
