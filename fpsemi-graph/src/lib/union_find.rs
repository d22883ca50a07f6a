//! C1: disjoint-set forest (§4.1).
//!
//! Mirrors the fixpoint-loop, flat-`Vec`-backed style of
//! `cfgrammar::yacc::follows::YaccFollows`: grow a `Vec`, mutate in place,
//! no recursion-heavy cleverness.

/// A disjoint-set forest over `[0, n)`, growable by appending singletons.
///
/// All operations on indices outside `[0, len())` are a programmer error
/// and panic in debug builds via the normal `Vec` bounds check (§4.1
/// "Out-of-range access is a programmer bug and may be unchecked in
/// release" — we rely on `Vec::get_unchecked` only where a hot loop has
/// already validated the index, see `find`).
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    pub fn new() -> Self {
        UnionFind { parent: Vec::new() }
    }

    pub fn with_capacity(n: usize) -> Self {
        let mut uf = UnionFind {
            parent: Vec::with_capacity(n),
        };
        for i in 0..n {
            uf.parent.push(i);
        }
        uf
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Appends a new element whose parent is itself; returns its index.
    pub fn new_singleton(&mut self) -> usize {
        let idx = self.parent.len();
        self.parent.push(idx);
        idx
    }

    /// Canonical representative of `x`, using path-halving compression.
    /// Deterministic under concurrent *reads only* if preceded by
    /// `flatten` (§4.1).
    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            let grandparent = self.parent[self.parent[x]];
            self.parent[x] = grandparent;
            x = grandparent;
        }
        x
    }

    /// Merges the classes of `x` and `y`, the numerically smaller
    /// representative surviving (a contract other components rely on,
    /// §4.1). Returns the surviving representative.
    pub fn unite(&mut self, x: usize, y: usize) -> usize {
        let rx = self.find(x);
        let ry = self.find(y);
        if rx == ry {
            return rx;
        }
        let (survivor, absorbed) = if rx < ry { (rx, ry) } else { (ry, rx) };
        self.parent[absorbed] = survivor;
        survivor
    }

    /// After `flatten`, `parent[x] == find(x)` for every `x`.
    pub fn flatten(&mut self) {
        for x in 0..self.parent.len() {
            let root = self.find(x);
            self.parent[x] = root;
        }
    }

    /// After `flatten`, returns the partition as a sequence of sequences
    /// of indices, each inner sequence sorted.
    pub fn blocks(&mut self) -> Vec<Vec<usize>> {
        self.flatten();
        let mut by_root: std::collections::BTreeMap<usize, Vec<usize>> =
            std::collections::BTreeMap::new();
        for x in 0..self.parent.len() {
            by_root.entry(self.parent[x]).or_default().push(x);
        }
        by_root.into_values().collect()
    }

    /// Streams one element per class (the representative), ascending.
    pub fn next_representative(&mut self) -> impl Iterator<Item = usize> + '_ {
        self.flatten();
        let parent = &self.parent;
        (0..parent.len()).filter(move |&x| parent[x] == x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unite_keeps_smaller_representative() {
        let mut uf = UnionFind::with_capacity(5);
        uf.unite(3, 1);
        assert_eq!(uf.find(3), 1);
        uf.unite(1, 4);
        assert_eq!(uf.find(4), 1);
    }

    #[test]
    fn find_is_idempotent() {
        let mut uf = UnionFind::with_capacity(4);
        uf.unite(0, 1);
        uf.unite(2, 3);
        uf.unite(1, 2);
        let r = uf.find(3);
        assert_eq!(uf.find(r), r);
    }

    #[test]
    fn flatten_makes_parent_equal_find() {
        let mut uf = UnionFind::with_capacity(6);
        uf.unite(5, 0);
        uf.unite(4, 5);
        uf.unite(2, 3);
        uf.flatten();
        for x in 0..6 {
            let root = uf.find(x);
            assert_eq!(uf.parent[x], root);
        }
    }

    #[test]
    fn blocks_are_sorted_and_partition() {
        let mut uf = UnionFind::with_capacity(6);
        uf.unite(0, 2);
        uf.unite(2, 4);
        uf.unite(1, 3);
        let blocks = uf.blocks();
        let mut all: Vec<usize> = blocks.iter().flatten().copied().collect();
        all.sort_unstable();
        assert_eq!(all, vec![0, 1, 2, 3, 4, 5]);
        for block in &blocks {
            assert!(block.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn next_representative_streams_ascending() {
        let mut uf = UnionFind::with_capacity(5);
        uf.unite(4, 1);
        uf.unite(3, 1);
        let reps: Vec<usize> = uf.next_representative().collect();
        assert_eq!(reps, vec![0, 1, 2]);
    }
}
