//! C3: out-regular labeled digraph with Gabow SCC and spanning forests
//! (§4.3).

use fpsemi_types::error::{Error, Result};
use vob::Vob;

/// A spanning forest over one labeling of a digraph's SCCs: for every
/// vertex, its parent within its own SCC (`None` at the SCC root) and the
/// letter of the edge used to reach it.
#[derive(Clone, Debug, Default)]
pub struct SpanningForest {
    pub root_of: Vec<usize>,
    pub parent: Vec<Option<usize>>,
    pub parent_letter: Vec<Option<usize>>,
}

/// Vertices `[0, n)`, each with exactly `k` outgoing edges labelled by
/// letters `[0, k)`. Dense row-major storage; `None` means "undefined".
#[derive(Clone, Debug)]
pub struct LabeledDigraph {
    n: usize,
    k: usize,
    edges: Vec<Option<usize>>,
    scc: Option<(Vec<usize>, Vec<Vec<usize>>)>,
    forward_forest: Option<Vec<SpanningForest>>,
    reverse_forest: Option<Vec<SpanningForest>>,
}

impl LabeledDigraph {
    pub fn new(n: usize, k: usize) -> Self {
        LabeledDigraph {
            n,
            k,
            edges: vec![None; n * k],
            scc: None,
            forward_forest: None,
            reverse_forest: None,
        }
    }

    pub fn nr_vertices(&self) -> usize {
        self.n
    }

    pub fn out_degree(&self) -> usize {
        self.k
    }

    fn invalidate(&mut self) {
        self.scc = None;
        self.forward_forest = None;
        self.reverse_forest = None;
    }

    /// Grows the vertex set by `k` new vertices, preserving existing data.
    pub fn add_vertices(&mut self, extra: usize) {
        if extra == 0 {
            return;
        }
        let mut new_edges = vec![None; (self.n + extra) * self.k];
        for v in 0..self.n {
            new_edges[v * self.k..v * self.k + self.k]
                .copy_from_slice(&self.edges[v * self.k..v * self.k + self.k]);
        }
        self.edges = new_edges;
        self.n += extra;
        self.invalidate();
    }

    /// Grows out-degree by `extra` labels, preserving existing data; new
    /// cells initialize to `None`.
    pub fn add_out_labels(&mut self, extra: usize) {
        if extra == 0 {
            return;
        }
        let new_k = self.k + extra;
        let mut new_edges = vec![None; self.n * new_k];
        for v in 0..self.n {
            new_edges[v * new_k..v * new_k + self.k]
                .copy_from_slice(&self.edges[v * self.k..v * self.k + self.k]);
        }
        self.edges = new_edges;
        self.k = new_k;
        self.invalidate();
    }

    pub fn set_edge(&mut self, u: usize, a: usize, v: usize) {
        self.edges[u * self.k + a] = Some(v);
        self.invalidate();
    }

    pub fn neighbor(&self, u: usize, a: usize) -> Option<usize> {
        self.edges[u * self.k + a]
    }

    /// Iterative Gabow SCC. Returns `(scc_id_of_vertex, sccs)`.
    pub fn scc(&mut self) -> Result<&(Vec<usize>, Vec<Vec<usize>>)> {
        if self.scc.is_none() {
            self.scc = Some(self.compute_scc()?);
        }
        Ok(self.scc.as_ref().unwrap())
    }

    fn compute_scc(&self) -> Result<(Vec<usize>, Vec<Vec<usize>>)> {
        let n = self.n;
        let k = self.k;
        const UNSET: usize = usize::MAX;
        let mut preorder = vec![UNSET; n];
        let mut comp = vec![UNSET; n];
        let mut counter = 0usize;
        let mut comp_counter = 0usize;
        // S1: the current DFS path; S2: tentative SCC roots (preorder-decreasing).
        let mut s1: Vec<usize> = Vec::new();
        let mut s2: Vec<usize> = Vec::new();

        struct Frame {
            v: usize,
            next_label: usize,
        }
        let mut frames: Vec<Frame> = Vec::new();

        for start in 0..n {
            if preorder[start] != UNSET {
                continue;
            }
            preorder[start] = counter;
            counter += 1;
            s1.push(start);
            s2.push(start);
            frames.push(Frame {
                v: start,
                next_label: 0,
            });

            while let Some(frame) = frames.last_mut() {
                if frame.next_label < k {
                    let a = frame.next_label;
                    frame.next_label += 1;
                    let v = frame.v;
                    let w = self.edges[v * k + a].ok_or(Error::NotFullyDefined {
                        coset: fpsemi_types::Coset::from(v),
                    })?;
                    if preorder[w] == UNSET {
                        preorder[w] = counter;
                        counter += 1;
                        s1.push(w);
                        s2.push(w);
                        frames.push(Frame {
                            v: w,
                            next_label: 0,
                        });
                    } else if comp[w] == UNSET {
                        while preorder[*s2.last().unwrap()] > preorder[w] {
                            s2.pop();
                        }
                    }
                } else {
                    let v = frame.v;
                    frames.pop();
                    if *s2.last().unwrap() == v {
                        s2.pop();
                        loop {
                            let w = s1.pop().unwrap();
                            comp[w] = comp_counter;
                            if w == v {
                                break;
                            }
                        }
                        comp_counter += 1;
                    }
                }
            }
        }

        let mut sccs = vec![Vec::new(); comp_counter];
        for (v, &c) in comp.iter().enumerate() {
            sccs[c].push(v);
        }
        Ok((comp, sccs))
    }

    /// BFS from the smallest member of each SCC, following only
    /// intra-SCC edges, recording parent-in-SCC and the incoming letter.
    pub fn spanning_forest(&mut self) -> Result<&[SpanningForest]> {
        if self.forward_forest.is_none() {
            let forest = self.build_forest(false)?;
            self.forward_forest = Some(forest);
        }
        Ok(self.forward_forest.as_ref().unwrap())
    }

    /// As `spanning_forest`, but over the reverse intra-SCC edges (used to
    /// compute multipliers carrying the SCC root *to* a vertex).
    pub fn reverse_spanning_forest(&mut self) -> Result<&[SpanningForest]> {
        if self.reverse_forest.is_none() {
            let forest = self.build_forest(true)?;
            self.reverse_forest = Some(forest);
        }
        Ok(self.reverse_forest.as_ref().unwrap())
    }

    fn build_forest(&mut self, reverse: bool) -> Result<Vec<SpanningForest>> {
        let (scc_id, sccs) = self.scc()?.clone();
        let n = self.n;
        let k = self.k;

        // Reverse adjacency, built once, restricted to intra-SCC edges
        // when `reverse` is requested.
        let mut reverse_adj: Vec<Vec<(usize, usize)>> = Vec::new();
        if reverse {
            reverse_adj = vec![Vec::new(); n];
            for v in 0..n {
                for a in 0..k {
                    if let Some(w) = self.edges[v * k + a] {
                        if scc_id[v] == scc_id[w] {
                            reverse_adj[w].push((v, a));
                        }
                    }
                }
            }
        }

        let mut forests = Vec::with_capacity(sccs.len());
        for members in &sccs {
            let root = *members.iter().min().unwrap();
            let mut parent = vec![None; n];
            let mut parent_letter = vec![None; n];
            let mut root_of = vec![root; n];
            let mut visited = Vob::from_elem(n, false);
            visited.set(root, true);
            let mut queue = std::collections::VecDeque::new();
            queue.push_back(root);
            while let Some(u) = queue.pop_front() {
                let neighbors: Vec<(usize, usize)> = if reverse {
                    reverse_adj[u].clone()
                } else {
                    (0..k)
                        .filter_map(|a| {
                            self.edges[u * k + a].and_then(|w| {
                                if scc_id[w] == scc_id[u] {
                                    Some((w, a))
                                } else {
                                    None
                                }
                            })
                        })
                        .collect()
                };
                for (w, a) in neighbors {
                    if !visited[w] {
                        visited.set(w, true);
                        parent[w] = Some(u);
                        parent_letter[w] = Some(a);
                        root_of[w] = root;
                        queue.push_back(w);
                    }
                }
            }
            for &v in members {
                root_of[v] = root;
            }
            forests.push(SpanningForest {
                root_of,
                parent,
                parent_letter,
            });
        }
        Ok(forests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle(n: usize) -> LabeledDigraph {
        let mut g = LabeledDigraph::new(n, 1);
        for v in 0..n {
            g.set_edge(v, 0, (v + 1) % n);
        }
        g
    }

    #[test]
    fn cycle_is_one_scc() {
        let mut g = cycle(4);
        let (ids, sccs) = g.scc().unwrap().clone();
        assert_eq!(sccs.len(), 1);
        assert!(ids.iter().all(|&i| i == ids[0]));
    }

    #[test]
    fn dag_has_singleton_sccs() {
        let mut g = LabeledDigraph::new(3, 1);
        g.set_edge(0, 0, 1);
        g.set_edge(1, 0, 2);
        g.set_edge(2, 0, 2); // self loop so every vertex stays fully defined
        let (_, sccs) = g.scc().unwrap().clone();
        // {0}, {1}, {2,2-self-loop} -> vertex 2 forms its own SCC via self-loop.
        assert_eq!(sccs.len(), 3);
    }

    #[test]
    fn undefined_edge_errors() {
        let mut g = LabeledDigraph::new(2, 1);
        g.set_edge(0, 0, 1);
        assert!(matches!(g.scc(), Err(Error::NotFullyDefined { .. })));
    }

    #[test]
    fn spanning_forest_reaches_every_member() {
        let mut g = cycle(5);
        let forest = g.spanning_forest().unwrap().to_vec();
        assert_eq!(forest.len(), 1);
        let root = forest[0].root_of[0];
        for v in 0..5 {
            assert_eq!(forest[0].root_of[v], root);
        }
        // every non-root vertex in a directed cycle has a defined parent
        assert_eq!(forest[0].parent.iter().filter(|p| p.is_none()).count(), 1);
    }
}
