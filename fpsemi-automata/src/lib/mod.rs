//! Aho–Corasick-indexed string rewriting, the C4/C5 layer of the fpsemi
//! engine (§4.4, §4.5). Mirrors the table/automaton-construction role
//! `lrtable` plays for `grmtools`, specialized to Knuth–Bendix completion
//! rather than LR table construction.

pub mod aho_corasick;
pub mod rewriter;

pub use aho_corasick::AhoCorasick;
pub use rewriter::Rewriter;
