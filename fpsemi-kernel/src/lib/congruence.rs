//! C11: brute-force congruence-by-pairs closure over a finite enumerated
//! semigroup (§4.11).

use std::collections::VecDeque;

use fnv::FnvHashSet;

use fpsemi_graph::UnionFind;
use fpsemi_types::Word;

use crate::semigroup::EnumeratedSemigroup;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Side {
    Left,
    Right,
    TwoSided,
}

/// Closes a set of generating pairs `(x, y)` under left/right/two-sided
/// compatibility with multiplication, over a finite `EnumeratedSemigroup`.
pub struct CongruenceByPairs<'s, S: EnumeratedSemigroup> {
    semigroup: &'s mut S,
    side: Side,
    classes: UnionFind,
    seen: FnvHashSet<(usize, usize)>,
    queue: VecDeque<(usize, usize)>,
}

fn canon(a: usize, b: usize) -> (usize, usize) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl<'s, S: EnumeratedSemigroup> CongruenceByPairs<'s, S> {
    pub fn new(semigroup: &'s mut S, side: Side) -> Self {
        let n = semigroup.size();
        CongruenceByPairs {
            semigroup,
            side,
            classes: UnionFind::with_capacity(n),
            seen: FnvHashSet::default(),
            queue: VecDeque::new(),
        }
    }

    /// Adjoins `(x, y)` as a generating pair of the congruence.
    pub fn add_pair(&mut self, x: S::Element, y: S::Element) {
        let ix = self.semigroup.adjoin(x);
        let iy = self.semigroup.adjoin(y);
        self.grow_to(ix.max(iy) + 1);
        if self.classes.find(ix) != self.classes.find(iy) {
            self.push(ix, iy);
        }
    }

    fn grow_to(&mut self, n: usize) {
        while self.classes.len() < n {
            self.classes.new_singleton();
        }
    }

    fn push(&mut self, p: usize, q: usize) {
        if self.seen.insert(canon(p, q)) {
            self.queue.push_back((p, q));
        }
    }

    /// Runs the BFS closure (§4.11) to completion.
    pub fn run(&mut self) {
        while let Some((p, q)) = self.queue.pop_front() {
            self.classes.unite(p, q);
            for g in 0..self.semigroup.nr_generators() {
                if matches!(self.side, Side::Right | Side::TwoSided) {
                    let pg = self.semigroup.fast_product(p, g);
                    let qg = self.semigroup.fast_product(q, g);
                    self.grow_to(pg.max(qg) + 1);
                    if self.classes.find(pg) != self.classes.find(qg) {
                        self.push(pg, qg);
                    }
                }
                if matches!(self.side, Side::Left | Side::TwoSided) {
                    let gp = self.semigroup.fast_product(g, p);
                    let gq = self.semigroup.fast_product(g, q);
                    self.grow_to(gp.max(gq) + 1);
                    if self.classes.find(gp) != self.classes.find(gq) {
                        self.push(gp, gq);
                    }
                }
            }
        }
    }

    pub fn contains(&mut self, u: &Word, v: &Word) -> bool {
        self.run();
        let iu = self.semigroup.adjoin(self.semigroup.word_to_element(u));
        let iv = self.semigroup.adjoin(self.semigroup.word_to_element(v));
        self.grow_to(iu.max(iv) + 1);
        self.classes.find(iu) == self.classes.find(iv)
    }

    /// `|S| - (merged pairs) + (disjoint non-trivial classes)` (§4.11),
    /// computed directly from the union-find partition.
    pub fn nr_classes(&mut self) -> usize {
        self.run();
        self.classes.blocks().len()
    }

    /// Every block of size >= 2, each element factorized back to a word.
    pub fn non_trivial_classes(&mut self) -> Vec<Vec<Word>> {
        self.run();
        let blocks = self.classes.blocks();
        blocks
            .into_iter()
            .filter(|b| b.len() >= 2)
            .map(|b| {
                b.into_iter()
                    .map(|i| self.semigroup.factorization(i))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semigroup::{Transformation, TransformationSemigroup};

    fn transformations_on_5_points() -> (Transformation, Transformation) {
        (
            Transformation::new(vec![1, 3, 4, 2, 3]),
            Transformation::new(vec![3, 2, 1, 3, 3]),
        )
    }

    fn pair_words() -> (Word, Word) {
        // Scenario S5's pair, given as letter sequences over the 2-letter
        // generator alphabet {0, 1}.
        (
            Word::from_u32s(&[0, 1, 0, 0, 0, 1, 1, 0, 0]),
            Word::from_u32s(&[1, 0, 0, 0, 1]),
        )
    }

    #[test]
    fn scenario_s5_two_sided_closure_has_21_classes() {
        let (a, b) = transformations_on_5_points();
        let mut s = TransformationSemigroup::new(vec![a, b]);
        let (u, v) = pair_words();
        let x = s.word_to_element(&u);
        let y = s.word_to_element(&v);
        let mut cong = CongruenceByPairs::new(&mut s, Side::TwoSided);
        cong.add_pair(x, y);
        assert_eq!(cong.nr_classes(), 21);
    }

    #[test]
    fn scenario_s5_right_closure_has_72_classes() {
        let (a, b) = transformations_on_5_points();
        let mut s = TransformationSemigroup::new(vec![a, b]);
        let (u, v) = pair_words();
        let x = s.word_to_element(&u);
        let y = s.word_to_element(&v);
        let mut cong = CongruenceByPairs::new(&mut s, Side::Right);
        cong.add_pair(x, y);
        assert_eq!(cong.nr_classes(), 72);
    }

    #[test]
    fn scenario_s5_left_closure_has_69_classes() {
        let (a, b) = transformations_on_5_points();
        let mut s = TransformationSemigroup::new(vec![a, b]);
        let (u, v) = pair_words();
        let x = s.word_to_element(&u);
        let y = s.word_to_element(&v);
        let mut cong = CongruenceByPairs::new(&mut s, Side::Left);
        cong.add_pair(x, y);
        assert_eq!(cong.nr_classes(), 69);
    }
}
