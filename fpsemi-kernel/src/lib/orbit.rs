//! C8: BFS closure of a seed under a generator set, with the Schreier
//! graph exposed via `fpsemi_graph::LabeledDigraph` (§4.8).

use fnv::FnvHashMap;

use fpsemi_graph::LabeledDigraph;
use fpsemi_runner::{RunnerAlgorithm, RunnerControl};
use fpsemi_types::error::{Error, Result};
use fpsemi_types::idx::Letter;
use fpsemi_types::Word;

use crate::capability::Capability;

/// Which side multiplier composition is read in (§4.8: "On the left
/// side, multiplication is in the reverse order").
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Side {
    Left,
    Right,
}

/// BFS closure of a set of seed points under a set of generator elements.
/// `E::Point` is the point type being acted on; `E` the generators'
/// element type (often `E::Point == E`, e.g. a transformation semigroup
/// acting on itself by right multiplication).
pub struct OrbitEngine<E: Capability> {
    generators: Vec<E>,
    points: Vec<E::Point>,
    index: FnvHashMap<E::Point, usize>,
    /// `discovery[i]` records `(parent point index, generator label)` for
    /// every point except a seed, a natural byproduct of the BFS that
    /// doubles as a factorization tree (§4.13 `factorization`)
    /// without needing a full SCC computation.
    discovery: Vec<Option<(usize, usize)>>,
    graph: LabeledDigraph,
    /// Index into `points` of the next point to process against every
    /// current generator.
    frontier: usize,
    /// Existing points that still owe an edge for a generator added after
    /// they were already processed (§4.8 "re-process all points with
    /// the new generators only").
    regen_queue: std::collections::VecDeque<(usize, usize)>,
    side: Side,
}

impl<E: Capability> OrbitEngine<E> {
    pub fn new(side: Side) -> Self {
        OrbitEngine {
            generators: Vec::new(),
            points: Vec::new(),
            index: FnvHashMap::default(),
            discovery: Vec::new(),
            graph: LabeledDigraph::new(0, 0),
            frontier: 0,
            regen_queue: std::collections::VecDeque::new(),
            side,
        }
    }

    pub fn add_seed(&mut self, p: E::Point) {
        if self.index.contains_key(&p) {
            return;
        }
        let idx = self.points.len();
        self.index.insert(p.clone(), idx);
        self.points.push(p);
        self.discovery.push(None);
        self.graph.add_vertices(1);
    }

    pub fn add_generator(&mut self, g: E) {
        let label = self.generators.len();
        self.generators.push(g);
        self.graph.add_out_labels(1);
        for i in 0..self.frontier {
            self.regen_queue.push_back((i, label));
        }
    }

    pub fn nr_generators(&self) -> usize {
        self.generators.len()
    }

    pub fn size(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> impl Iterator<Item = &E::Point> {
        self.points.iter()
    }

    pub fn point_at(&self, i: usize) -> &E::Point {
        &self.points[i]
    }

    pub fn position(&self, p: &E::Point) -> Option<usize> {
        self.index.get(p).copied()
    }

    pub fn digraph(&self) -> &LabeledDigraph {
        &self.graph
    }

    /// The word (generator-label sequence) the BFS tree realized to reach
    /// point `i` from whichever seed discovered it.
    pub fn factorization(&self, i: usize) -> Word {
        let mut letters = Vec::new();
        let mut cur = i;
        while let Some((parent, label)) = self.discovery[cur] {
            letters.push(Letter::from(label as u32));
            cur = parent;
        }
        letters.reverse();
        Word::new(letters)
    }

    /// Walks the discovery chain back to the seed that generated `i`.
    pub fn seed_of(&self, i: usize) -> usize {
        let mut cur = i;
        while let Some((parent, _)) = self.discovery[cur] {
            cur = parent;
        }
        cur
    }

    fn process_edge(&mut self, i: usize, label: usize) {
        let q = self.generators[label].action(&self.points[i]);
        let j = match self.index.get(&q) {
            Some(&j) => j,
            None => {
                let j = self.points.len();
                self.index.insert(q.clone(), j);
                self.points.push(q);
                self.discovery.push(Some((i, label)));
                self.graph.add_vertices(1);
                j
            }
        };
        self.graph.set_edge(i, label, j);
    }

    /// Convenience for callers that don't need cooperative stopping (e.g.
    /// tests): runs to exhaustion on the calling thread.
    pub fn run_to_completion(&mut self) {
        let ctl = RunnerControl::new();
        RunnerAlgorithm::run_body(self, &ctl);
    }

    pub fn root_of_scc(&mut self, i: usize) -> Result<usize> {
        let (scc_id, sccs) = self.graph.scc()?;
        let comp = scc_id[i];
        Ok(*sccs[comp].iter().min().unwrap())
    }

    /// Product of generators realizing the action carrying `orbit[root]`
    /// to `orbit[i]`, walking the forward spanning forest (§4.8).
    pub fn multiplier_from_scc_root(&mut self, i: usize) -> Result<E> {
        self.check_multiplier_preconditions(i)?;
        let comp = self.graph.scc()?.0[i];
        let forest = self.graph.spanning_forest()?[comp].clone();
        let mut letters = Vec::new();
        let mut cur = i;
        while let Some(p) = forest.parent[cur] {
            letters.push(forest.parent_letter[cur].unwrap());
            cur = p;
        }
        letters.reverse();
        Ok(self.compose(&letters))
    }

    /// Product of generators realizing the action carrying `orbit[i]` to
    /// `orbit[root]`, walking the reverse spanning forest.
    pub fn multiplier_to_scc_root(&mut self, i: usize) -> Result<E> {
        self.check_multiplier_preconditions(i)?;
        let comp = self.graph.scc()?.0[i];
        let forest = self.graph.reverse_spanning_forest()?[comp].clone();
        let mut letters = Vec::new();
        let mut cur = i;
        while let Some(p) = forest.parent[cur] {
            letters.push(forest.parent_letter[cur].unwrap());
            cur = p;
        }
        Ok(self.compose(&letters))
    }

    fn check_multiplier_preconditions(&self, i: usize) -> Result<()> {
        if self.generators.is_empty() {
            return Err(Error::OutOfRange { index: 0, bound: 0 });
        }
        if i >= self.points.len() {
            return Err(Error::OutOfRange {
                index: i,
                bound: self.points.len(),
            });
        }
        Ok(())
    }

    fn compose(&self, letters: &[usize]) -> E {
        let ordered: Vec<usize> = match self.side {
            Side::Right => letters.to_vec(),
            Side::Left => letters.iter().rev().copied().collect(),
        };
        let mut acc: Option<E> = None;
        for a in ordered {
            acc = Some(match acc {
                Some(x) => x.product(&self.generators[a]),
                None => self.generators[a].clone(),
            });
        }
        acc.unwrap_or_else(|| E::identity(self.generators[0].degree()))
    }
}

impl<E: Capability + Send> RunnerAlgorithm for OrbitEngine<E> {
    fn run_body(&mut self, ctl: &RunnerControl) {
        loop {
            if ctl.stopped() {
                return;
            }
            if let Some((i, label)) = self.regen_queue.pop_front() {
                self.process_edge(i, label);
                continue;
            }
            if self.frontier >= self.points.len() {
                ctl.set_finished(true);
                return;
            }
            let i = self.frontier;
            for label in 0..self.generators.len() {
                self.process_edge(i, label);
                if ctl.stopped() {
                    return;
                }
            }
            self.frontier += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Eq, PartialEq, Hash)]
    struct SetPerm(Vec<usize>);

    impl Capability for SetPerm {
        type Point = Vec<usize>;

        fn identity(degree: usize) -> Self {
            SetPerm((0..degree).collect())
        }
        fn product(&self, other: &Self) -> Self {
            SetPerm(self.0.iter().map(|&i| other.0[i]).collect())
        }
        fn degree(&self) -> usize {
            self.0.len()
        }
        fn complexity(&self, _other: &Self) -> usize {
            0
        }
        fn swap(&mut self, other: &mut Self) {
            std::mem::swap(&mut self.0, &mut other.0);
        }
        fn inverse(&self) -> Option<Self> {
            let mut inv = vec![0; self.0.len()];
            for (i, &v) in self.0.iter().enumerate() {
                inv[v] = i;
            }
            Some(SetPerm(inv))
        }
        fn action(&self, point: &Vec<usize>) -> Vec<usize> {
            let mut out: Vec<usize> = point.iter().map(|&p| self.0[p]).collect();
            out.sort_unstable();
            out
        }
    }

    #[derive(Clone, Eq, PartialEq, Hash)]
    struct TuplePerm(Vec<usize>);

    impl Capability for TuplePerm {
        type Point = Vec<usize>;

        fn identity(degree: usize) -> Self {
            TuplePerm((0..degree).collect())
        }
        fn product(&self, other: &Self) -> Self {
            TuplePerm(self.0.iter().map(|&i| other.0[i]).collect())
        }
        fn degree(&self) -> usize {
            self.0.len()
        }
        fn complexity(&self, _other: &Self) -> usize {
            0
        }
        fn swap(&mut self, other: &mut Self) {
            std::mem::swap(&mut self.0, &mut other.0);
        }
        fn inverse(&self) -> Option<Self> {
            None
        }
        fn action(&self, point: &Vec<usize>) -> Vec<usize> {
            point.iter().map(|&p| self.0[p]).collect()
        }
    }

    fn generators_10() -> (Vec<usize>, Vec<usize>) {
        // swap 0<->1, and a cyclic shift of [0..10).
        let swap01 = vec![1, 0, 2, 3, 4, 5, 6, 7, 8, 9];
        let shift = vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 0];
        (swap01, shift)
    }

    #[test]
    fn scenario_s1_orbit_of_5_subsets_is_252() {
        let (swap01, shift) = generators_10();
        let mut orbit: OrbitEngine<SetPerm> = OrbitEngine::new(Side::Right);
        orbit.add_seed(vec![0, 1, 2, 3, 4]);
        orbit.add_generator(SetPerm(swap01));
        orbit.add_generator(SetPerm(shift));
        orbit.run_to_completion();
        assert_eq!(orbit.size(), 252);
    }

    #[test]
    fn scenario_s2_orbit_of_ordered_tuple_is_30240() {
        let (swap01, shift) = generators_10();
        let mut orbit: OrbitEngine<TuplePerm> = OrbitEngine::new(Side::Right);
        orbit.add_seed(vec![0, 1, 2, 3, 4]);
        orbit.add_generator(TuplePerm(swap01));
        orbit.add_generator(TuplePerm(shift));
        orbit.run_to_completion();
        assert_eq!(orbit.size(), 30240);
    }

    #[test]
    fn position_inverts_point_at() {
        let (swap01, shift) = generators_10();
        let mut orbit: OrbitEngine<SetPerm> = OrbitEngine::new(Side::Right);
        orbit.add_seed(vec![0, 1, 2, 3, 4]);
        orbit.add_generator(SetPerm(swap01));
        orbit.add_generator(SetPerm(shift));
        orbit.run_to_completion();
        for i in 0..orbit.size() {
            assert_eq!(orbit.position(orbit.point_at(i)), Some(i));
        }
    }

    #[test]
    fn empty_generator_set_returns_just_the_seeds() {
        let mut orbit: OrbitEngine<SetPerm> = OrbitEngine::new(Side::Right);
        orbit.add_seed(vec![0, 1]);
        orbit.add_seed(vec![2, 3]);
        orbit.run_to_completion();
        assert_eq!(orbit.size(), 2);
    }

    #[test]
    fn adding_a_generator_after_running_only_reprocesses_the_new_column() {
        let (swap01, shift) = generators_10();
        let mut orbit: OrbitEngine<SetPerm> = OrbitEngine::new(Side::Right);
        orbit.add_seed(vec![0, 1, 2, 3, 4]);
        orbit.add_generator(SetPerm(swap01));
        orbit.run_to_completion();
        let partial_size = orbit.size();
        orbit.add_generator(SetPerm(shift));
        orbit.run_to_completion();
        assert_eq!(orbit.size(), 252);
        assert!(partial_size <= 252);
    }
}
