//! C12: the `EnumeratedSemigroup` collaborator interface (§4.13), and
//! one concrete instantiation — a finite transformation semigroup — so
//! that C9's `prefill`, C11, and C13 are exercisable without requiring a
//! caller-supplied type.

use fpsemi_graph::LabeledDigraph;
use fpsemi_types::idx::Letter;
use fpsemi_types::{ThreeValued, Word};

use crate::capability::Capability;
use crate::orbit::{OrbitEngine, Side};

/// The abstract source of elements the core consumes (§4.13). The
/// core never mutates an implementer except through `batch_size` and
/// `run_for`-style partial enumeration.
pub trait EnumeratedSemigroup {
    type Element: Clone;

    fn nr_generators(&self) -> usize;
    fn generator(&self, i: usize) -> &Self::Element;
    fn degree(&self) -> usize;

    /// Runs enumeration to completion and returns the element count.
    fn size(&mut self) -> usize;

    fn element_at(&mut self, i: usize) -> &Self::Element;
    fn word_to_element(&self, w: &Word) -> Self::Element;
    fn factorization(&mut self, i: usize) -> Word;

    /// The index of `e` among enumerated elements, adjoining it (and
    /// enumerating further if needed) when absent. Needed by
    /// `CongruenceByPairs` (§4.11 "ensure x and y have indices in S;
    /// if not, adjoin them"), not explicitly named in §4.13's list but
    /// implied by it.
    fn adjoin(&mut self, e: Self::Element) -> usize;

    fn fast_product(&mut self, i: usize, j: usize) -> usize;
    fn left_cayley_graph(&mut self) -> &LabeledDigraph;
    fn right_cayley_graph(&mut self) -> &LabeledDigraph;
    fn is_finite(&mut self) -> ThreeValued;
    fn current_size(&self) -> usize;
    fn batch_size(&mut self, k: usize);
}

/// A transformation of `[0, n)`: `self.0[i]` is the image of `i`.
/// Composition reads left to right: `a.product(b)` applies `a` then `b`,
/// matching the right-multiplication convention `CongruenceByPairs` and
/// `OrbitEngine` use throughout this crate.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Transformation(Vec<usize>);

impl Transformation {
    pub fn new(images: Vec<usize>) -> Self {
        Transformation(images)
    }

    pub fn image(&self, i: usize) -> usize {
        self.0[i]
    }

    pub fn images(&self) -> &[usize] {
        &self.0
    }
}

impl Capability for Transformation {
    type Point = Transformation;

    fn identity(degree: usize) -> Self {
        Transformation((0..degree).collect())
    }

    fn product(&self, other: &Self) -> Self {
        Transformation(self.0.iter().map(|&i| other.0[i]).collect())
    }

    fn degree(&self) -> usize {
        self.0.len()
    }

    fn complexity(&self, _other: &Self) -> usize {
        self.0.iter().enumerate().filter(|&(i, &v)| i != v).count()
    }

    fn swap(&mut self, other: &mut Self) {
        std::mem::swap(&mut self.0, &mut other.0);
    }

    fn inverse(&self) -> Option<Self> {
        let n = self.0.len();
        let mut seen = vec![false; n];
        for &v in &self.0 {
            if seen[v] {
                return None;
            }
            seen[v] = true;
        }
        let mut inv = vec![0; n];
        for (i, &v) in self.0.iter().enumerate() {
            inv[v] = i;
        }
        Some(Transformation(inv))
    }

    fn action(&self, point: &Transformation) -> Transformation {
        point.product(self)
    }
}

/// A finite transformation semigroup generated by a set of
/// `Transformation`s, enumerated by right-multiplication BFS (a
/// minimal Froidure–Pin-style enumerator).
pub struct TransformationSemigroup {
    generators: Vec<Transformation>,
    orbit: OrbitEngine<Transformation>,
    left_graph: Option<LabeledDigraph>,
}

impl TransformationSemigroup {
    pub fn new(generators: Vec<Transformation>) -> Self {
        assert!(!generators.is_empty(), "a semigroup needs at least one generator");
        let mut orbit = OrbitEngine::new(Side::Right);
        for g in &generators {
            orbit.add_seed(g.clone());
        }
        for g in &generators {
            orbit.add_generator(g.clone());
        }
        TransformationSemigroup {
            generators,
            orbit,
            left_graph: None,
        }
    }

    fn ensure_enumerated(&mut self) {
        self.orbit.run_to_completion();
    }

    fn ensure_left_graph(&mut self) {
        self.ensure_enumerated();
        if self.left_graph.is_some() {
            return;
        }
        let n = self.orbit.size();
        let k = self.generators.len();
        let mut g = LabeledDigraph::new(n, k);
        for i in 0..n {
            for a in 0..k {
                let p = self.generators[a].product(self.orbit.point_at(i));
                let j = self
                    .orbit
                    .position(&p)
                    .expect("left products of a closed generating set stay within the semigroup");
                g.set_edge(i, a, j);
            }
        }
        self.left_graph = Some(g);
    }
}

impl EnumeratedSemigroup for TransformationSemigroup {
    type Element = Transformation;

    fn nr_generators(&self) -> usize {
        self.generators.len()
    }

    fn generator(&self, i: usize) -> &Transformation {
        &self.generators[i]
    }

    fn degree(&self) -> usize {
        self.generators[0].degree()
    }

    fn size(&mut self) -> usize {
        self.ensure_enumerated();
        self.orbit.size()
    }

    fn element_at(&mut self, i: usize) -> &Transformation {
        self.ensure_enumerated();
        self.orbit.point_at(i)
    }

    fn word_to_element(&self, w: &Word) -> Transformation {
        let mut acc: Option<Transformation> = None;
        for l in w.iter() {
            let g = &self.generators[usize::from(l)];
            acc = Some(match acc {
                Some(x) => x.product(g),
                None => g.clone(),
            });
        }
        acc.unwrap_or_else(|| Transformation::identity(self.degree()))
    }

    fn factorization(&mut self, i: usize) -> Word {
        self.ensure_enumerated();
        // Every seed is one of the generators, added in generator order
        // (§ctor), so the seed a point's discovery chain bottoms out at
        // is exactly that generator's own label.
        let seed = self.orbit.seed_of(i);
        let mut w = Word::new(vec![Letter::from(seed as u32)]);
        w.append(&self.orbit.factorization(i));
        w
    }

    fn adjoin(&mut self, e: Transformation) -> usize {
        self.ensure_enumerated();
        if let Some(i) = self.orbit.position(&e) {
            return i;
        }
        // Closed generating sets never actually hit this path in the
        // transformation-semigroup adapter, since every reachable element
        // is already a product of the generators; kept for interface
        // completeness (§4.11 "adjoin").
        self.orbit.add_seed(e.clone());
        self.ensure_enumerated();
        self.orbit.position(&e).expect("just adjoined")
    }

    fn fast_product(&mut self, i: usize, j: usize) -> usize {
        self.ensure_enumerated();
        let word = self.factorization(j);
        let mut cur = i;
        for l in word.iter() {
            cur = self
                .orbit
                .digraph()
                .neighbor(cur, usize::from(l))
                .expect("right Cayley graph is fully defined once enumeration is complete");
        }
        cur
    }

    fn left_cayley_graph(&mut self) -> &LabeledDigraph {
        self.ensure_left_graph();
        self.left_graph.as_ref().unwrap()
    }

    fn right_cayley_graph(&mut self) -> &LabeledDigraph {
        self.ensure_enumerated();
        self.orbit.digraph()
    }

    fn is_finite(&mut self) -> ThreeValued {
        // Every transformation semigroup on a finite degree is finite.
        ThreeValued::Yes
    }

    fn current_size(&self) -> usize {
        self.orbit.size()
    }

    fn batch_size(&mut self, _k: usize) {
        // The transformation-semigroup adapter always fully enumerates
        // (cheap for the degrees this workspace is exercised with); a
        // partial-enumeration adapter would thread `_k` through as the
        // orbit's per-`run_for` point budget.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_transformation_monoid_on_3_points_has_27_elements() {
        let mut s = TransformationSemigroup::new(vec![
            Transformation::new(vec![1, 0, 2]),
            Transformation::new(vec![1, 2, 0]),
            Transformation::new(vec![0, 0, 2]),
        ]);
        assert_eq!(s.size(), 27);
    }

    #[test]
    fn factorization_round_trips_through_word_to_element() {
        let mut s = TransformationSemigroup::new(vec![
            Transformation::new(vec![1, 0, 2]),
            Transformation::new(vec![1, 2, 0]),
        ]);
        s.size();
        for i in 0..s.current_size() {
            let w = s.factorization(i);
            assert_eq!(&s.word_to_element(&w), s.element_at(i));
        }
    }

    #[test]
    fn fast_product_matches_direct_multiplication() {
        let mut s = TransformationSemigroup::new(vec![
            Transformation::new(vec![1, 0, 2]),
            Transformation::new(vec![1, 2, 0]),
        ]);
        s.size();
        for i in 0..s.current_size() {
            for j in 0..s.current_size() {
                let direct = s.element_at(i).product(s.element_at(j));
                let idx = s.fast_product(i, j);
                assert_eq!(s.element_at(idx), &direct);
            }
        }
    }
}
