//! C10: Todd-Coxeter coset enumeration (§4.10).

use std::collections::VecDeque;

use fpsemi_graph::{CosetManager, LabeledDigraph};
use fpsemi_runner::RunnerAlgorithm;
use fpsemi_types::idx::Letter;
use fpsemi_types::{Coset, Error, Result, Word};

use crate::semigroup::EnumeratedSemigroup;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Strategy {
    Hlt,
    Felsch,
    Random,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Lookahead {
    Full,
    Partial,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CongruenceSide {
    Left,
    Right,
    TwoSided,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StandardOrder {
    None,
    ShortLex,
    Lex,
    Recursive,
}

#[derive(Clone, Debug)]
pub struct ToddCoxeterSettings {
    pub strategy: Strategy,
    pub lookahead: Lookahead,
    pub lower_bound: usize,
    pub next_lookahead: usize,
    pub save: bool,
    pub standardize: bool,
    pub random_interval: std::time::Duration,
}

impl Default for ToddCoxeterSettings {
    fn default() -> Self {
        ToddCoxeterSettings {
            strategy: Strategy::Hlt,
            lookahead: Lookahead::Partial,
            lower_bound: usize::MAX,
            next_lookahead: 5_000_000,
            save: false,
            standardize: false,
            random_interval: std::time::Duration::from_millis(200),
        }
    }
}

/// Coset table coupled with preimage lists, a `CosetManager`, and the
/// relations/extra pairs defining the congruence (§4.10). Cosets are
/// addressed by plain `usize`; `CosetManager` is the only thing that
/// "owns" the coset-id space (§9 "cyclic ownership").
pub struct ToddCoxeterCore {
    nr_gens: usize,
    relations: Vec<(Word, Word)>,
    extra: Vec<(Word, Word)>,
    side: CongruenceSide,
    table: LabeledDigraph,
    cosets: CosetManager,
    preimages: Vec<Vec<Vec<usize>>>,
    deductions: VecDeque<(usize, usize)>,
    coincidences: VecDeque<(usize, usize)>,
    settings: ToddCoxeterSettings,
    standardization: StandardOrder,
    frozen: bool,
    class_words: Vec<Word>,
}

impl ToddCoxeterCore {
    pub fn new(nr_gens: usize, side: CongruenceSide) -> Self {
        ToddCoxeterCore {
            nr_gens,
            relations: Vec::new(),
            extra: Vec::new(),
            side,
            table: LabeledDigraph::new(1, nr_gens),
            cosets: CosetManager::new(),
            preimages: vec![vec![Vec::new(); nr_gens]],
            deductions: VecDeque::new(),
            coincidences: VecDeque::new(),
            settings: ToddCoxeterSettings::default(),
            standardization: StandardOrder::None,
            frozen: false,
            class_words: Vec::new(),
        }
    }

    pub fn with_settings(mut self, settings: ToddCoxeterSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn add_relation(&mut self, l: Word, r: Word) -> Result<()> {
        if self.frozen {
            return Err(Error::Frozen);
        }
        self.relations.push((l, r));
        Ok(())
    }

    /// A generating pair of the congruence (§4.10 "`_extra`").
    pub fn add_pair(&mut self, l: Word, r: Word) -> Result<()> {
        if self.frozen {
            return Err(Error::Frozen);
        }
        self.extra.push((l, r));
        Ok(())
    }

    /// Validates a prefill table is rectangular with every entry in range,
    /// then installs it as the initial coset table (§4.10 `prefill`).
    pub fn prefill(&mut self, rows: Vec<Vec<usize>>) -> Result<()> {
        if rows.is_empty() || rows.iter().any(|r| r.len() != self.nr_gens) {
            return Err(Error::InvalidPrefill);
        }
        let n = rows.len();
        if rows.iter().flatten().any(|&e| e >= n) {
            return Err(Error::InvalidPrefill);
        }
        self.table = LabeledDigraph::new(n, self.nr_gens);
        self.cosets = CosetManager::new();
        self.cosets.add_active_cosets(n - 1);
        self.preimages = vec![vec![Vec::new(); self.nr_gens]; n];
        for (c, row) in rows.iter().enumerate() {
            for (a, &d) in row.iter().enumerate() {
                self.table.set_edge(c, a, d);
                self.preimages[d][a].push(c);
            }
        }
        Ok(())
    }

    fn find(&self, c: usize) -> usize {
        usize::from(self.cosets.find_coset(Coset::from(c)))
    }

    fn grow_by_one(&mut self) -> usize {
        let c = self.cosets.new_active_coset();
        let idx = usize::from(c);
        if idx >= self.table.nr_vertices() {
            self.table.add_vertices(1);
            self.preimages.push(vec![Vec::new(); self.nr_gens]);
        }
        idx
    }

    /// `table(c, a) = d`, recorded as a deduction and preimage (§4.10).
    fn define(&mut self, c: usize, a: usize, d: usize) {
        self.table.set_edge(c, a, d);
        self.add_preimage(d, a, c);
        self.deductions.push_back((c, a));
    }

    pub fn add_preimage(&mut self, c: usize, a: usize, d: usize) {
        if !self.preimages[c][a].contains(&d) {
            self.preimages[c][a].push(d);
        }
    }

    pub fn remove_preimage(&mut self, c: usize, a: usize, d: usize) {
        self.preimages[c][a].retain(|&x| x != d);
    }

    /// Walks `word` from `c`, `define`-ing a fresh coset whenever the walk
    /// would fall off the table.
    fn trace_defining(&mut self, c: usize, word: &Word) -> usize {
        let mut cur = self.find(c);
        for l in word.iter() {
            let a = usize::from(l);
            cur = match self.table.neighbor(cur, a) {
                Some(d) => self.find(d),
                None => {
                    let d = self.grow_by_one();
                    self.define(cur, a, d);
                    d
                }
            };
        }
        cur
    }

    /// As `trace_defining`, but returns `None` the moment the walk would
    /// need to define a new coset (used by `felsch`, which never creates
    /// cosets from a trace).
    fn trace_readonly(&self, c: usize, word: &Word) -> Option<usize> {
        let mut cur = self.find(c);
        for l in word.iter() {
            cur = self.find(self.table.neighbor(cur, usize::from(l))?);
        }
        Some(cur)
    }

    fn push_coincidence(&mut self, x: usize, y: usize) {
        let x = self.find(x);
        let y = self.find(y);
        if x != y {
            self.coincidences.push_back((x, y));
        }
    }

    /// Coincidence processing (§4.10): pop `(p, q)`, union their
    /// representatives `P <= Q`, then for every letter redirect `Q`'s
    /// preimages onto `P` and merge `Q`'s own outgoing edge with `P`'s.
    fn process_coincidences(&mut self) {
        while let Some((p, q)) = self.coincidences.pop_front() {
            let p = self.find(p);
            let q = self.find(q);
            if p == q {
                continue;
            }
            let (min, max) = if p < q { (p, q) } else { (q, p) };
            for a in 0..self.nr_gens {
                let preds: Vec<usize> = std::mem::take(&mut self.preimages[max][a]);
                for v in preds {
                    let v = self.find(v);
                    if self.table.neighbor(v, a) == Some(max) {
                        self.table.set_edge(v, a, min);
                    }
                    self.add_preimage(min, a, v);
                }
                if let Some(v) = self.table.neighbor(max, a) {
                    let v = self.find(v);
                    self.remove_preimage(v, a, max);
                    match self.table.neighbor(min, a) {
                        None => self.define(min, a, v),
                        Some(existing) => {
                            let existing = self.find(existing);
                            if existing != v {
                                self.push_coincidence(existing, v);
                            }
                        }
                    }
                }
            }
            self.cosets
                .union_cosets(Coset::from(min), Coset::from(max));
        }
    }

    fn relations_and_extra(&self) -> Vec<(Word, Word)> {
        let mut all = self.relations.clone();
        all.extend(self.extra.iter().cloned());
        all
    }

    /// HLT strategy (§4.10): scan every relation from every active coset,
    /// growing the table as walks demand, until a full pass defines
    /// nothing new.
    pub fn hlt(&mut self) {
        self.frozen = true;
        let all = self.relations_and_extra();
        loop {
            let active: Vec<usize> = self
                .cosets
                .iter_active()
                .map(usize::from)
                .collect();
            let before = self.table.nr_vertices();
            for c in active {
                let c = self.find(c);
                if !self.cosets.is_active_coset(Coset::from(c)) {
                    continue;
                }
                for (l, r) in &all {
                    let x = self.trace_defining(c, l);
                    let y = self.trace_defining(c, r);
                    if x != y {
                        self.push_coincidence(x, y);
                        self.process_coincidences();
                    }
                }
                if self.settings.save {
                    self.process_deductions();
                }
            }
            if self.table.nr_vertices() == before {
                break;
            }
            if self.cosets.nr_cosets_active() >= self.settings.lower_bound {
                break;
            }
        }
    }

    /// Drains the deduction stack, re-tracing every relation through each
    /// recorded `(c, a)` and pushing any resulting coincidence (§4.10
    /// "`save` drains the deduction stack").
    fn process_deductions(&mut self) {
        let all = self.relations_and_extra();
        while let Some((c, _a)) = self.deductions.pop_front() {
            let c = self.find(c);
            for (l, r) in &all {
                if let (Some(x), Some(y)) = (self.trace_readonly(c, l), self.trace_readonly(c, r))
                {
                    if x != y {
                        self.push_coincidence(x, y);
                    }
                }
            }
            self.process_coincidences();
        }
    }

    /// Felsch strategy (§4.10): only deductions ever create new table
    /// entries; no coset is created except where a relation forces one
    /// via a read-only trace that falls exactly one step short.
    pub fn felsch(&mut self) {
        self.frozen = true;
        // Seed one deduction per currently-undefined table cell so the
        // very first relation pass has something to react to.
        for c in 0..self.table.nr_vertices() {
            for a in 0..self.nr_gens {
                if self.table.neighbor(c, a).is_none() {
                    self.deductions.push_back((c, a));
                }
            }
        }
        loop {
            self.process_deductions();
            if self.deductions.is_empty() {
                // No pending deduction produced a coincidence or new
                // definition; a relation may still force one new coset
                // (the minimal reopening a pure Felsch strategy allows).
                let all = self.relations_and_extra();
                let mut progressed = false;
                let active: Vec<usize> = self.cosets.iter_active().map(usize::from).collect();
                'outer: for c in active {
                    for (l, r) in &all {
                        let x = self.trace_readonly(c, l);
                        let y = self.trace_readonly(c, r);
                        if x.is_none() || y.is_none() {
                            let x = self.trace_defining(c, l);
                            let y = self.trace_defining(c, r);
                            if x != y {
                                self.push_coincidence(x, y);
                                self.process_coincidences();
                            }
                            progressed = true;
                            break 'outer;
                        }
                    }
                }
                if !progressed {
                    break;
                }
            }
        }
    }

    /// Ten presets toggling HLT/Felsch against lookahead/save/standardize,
    /// each run for `random_interval` in turn; stops as soon as one
    /// preset would finish (§4.10 "random strategy").
    pub fn random(&mut self) {
        let presets: [(Strategy, bool, bool); 10] = [
            (Strategy::Hlt, false, false),
            (Strategy::Hlt, true, false),
            (Strategy::Hlt, false, true),
            (Strategy::Hlt, true, true),
            (Strategy::Felsch, false, false),
            (Strategy::Felsch, true, false),
            (Strategy::Hlt, false, false),
            (Strategy::Felsch, false, true),
            (Strategy::Hlt, true, true),
            (Strategy::Felsch, true, true),
        ];
        for (strategy, save, standardize) in presets {
            self.settings.save = save;
            self.settings.standardize = standardize;
            match strategy {
                Strategy::Hlt => self.hlt(),
                Strategy::Felsch => self.felsch(),
                Strategy::Random => unreachable!("presets never choose random recursively"),
            }
            if self.is_complete() {
                return;
            }
        }
    }

    fn is_complete(&self) -> bool {
        let all = self.relations_and_extra();
        self.cosets.iter_active().all(|c| {
            let c = usize::from(c);
            all.iter()
                .all(|(l, r)| self.trace_readonly(c, l) == self.trace_readonly(c, r))
        })
    }

    pub fn run(&mut self) {
        match self.settings.strategy {
            Strategy::Hlt => self.hlt(),
            Strategy::Felsch => self.felsch(),
            Strategy::Random => self.random(),
        }
        log::debug!(
            "todd_coxeter: {} classes found under {:?}",
            self.cosets.nr_cosets_active(),
            self.settings.strategy
        );
        if self.settings.standardize {
            self.standardize(self.standardization);
        }
    }

    /// Depth-first renumbering of the active cosets so that the chosen
    /// order's forest traversal visits coset `i` before `i + 1` (§4.10).
    pub fn standardize(&mut self, order: StandardOrder) {
        self.standardization = order;
        if matches!(order, StandardOrder::None) {
            return;
        }
        let active: Vec<usize> = self.cosets.iter_active().map(usize::from).collect();
        let mut gen_order: Vec<usize> = (0..self.nr_gens).collect();
        if matches!(order, StandardOrder::Lex) {
            gen_order.reverse();
        }

        let mut old_to_new = vec![usize::MAX; self.table.nr_vertices()];
        let mut words = vec![Word::empty(); active.len()];
        old_to_new[0] = 0;
        let mut next_new = 1usize;
        let mut stack: VecDeque<(usize, Word)> = VecDeque::new();
        stack.push_back((0, Word::empty()));
        let mut visited = vec![false; self.table.nr_vertices()];
        visited[0] = true;

        while let Some((c, w)) = stack.pop_front() {
            for &a in &gen_order {
                if let Some(d) = self.table.neighbor(c, a) {
                    let d = self.find(d);
                    if !visited[d] {
                        visited[d] = true;
                        old_to_new[d] = next_new;
                        next_new += 1;
                        let mut dw = w.clone();
                        dw.push(Letter::from(a as u32));
                        words[old_to_new[d]] = dw.clone();
                        match order {
                            StandardOrder::Recursive | StandardOrder::ShortLex => {
                                stack.push_back((d, dw))
                            }
                            StandardOrder::Lex => stack.push_front((d, dw)),
                            StandardOrder::None => unreachable!(),
                        }
                    }
                }
            }
        }

        let n = self.table.nr_vertices();
        let mut new_table = LabeledDigraph::new(n, self.nr_gens);
        for old_c in 0..n {
            if old_to_new[old_c] == usize::MAX {
                continue;
            }
            for a in 0..self.nr_gens {
                if let Some(d) = self.table.neighbor(old_c, a) {
                    let d = self.find(d);
                    if old_to_new[d] != usize::MAX {
                        new_table.set_edge(old_to_new[old_c], a, old_to_new[d]);
                    }
                }
            }
        }
        self.table = new_table;
        self.class_words = words;
        self.cosets = CosetManager::new();
        self.cosets.add_active_cosets(active.len() - 1);
    }

    pub fn nr_classes(&self) -> usize {
        self.cosets.nr_cosets_active()
    }

    /// `tau(1, w)`, `1`-indexed per §4.10, returned here `0`-indexed.
    pub fn word_to_class_index(&self, w: &Word) -> Option<usize> {
        self.trace_readonly(0, w)
    }

    pub fn class_index_to_word(&self, i: usize) -> Option<Word> {
        self.class_words.get(i).cloned()
    }

    pub fn contains(&self, u: &Word, v: &Word) -> bool {
        self.trace_readonly(0, u) == self.trace_readonly(0, v)
    }
}

/// A finite semigroup over coset indices `[0, n)` as its element set: the
/// element *is* its own index, so `element_at`/`word_to_element` are
/// degenerate on this representation (§4.10 adapter, documented in
/// DESIGN.md).
#[derive(Clone)]
pub struct ToddCoxeterQuotient {
    nr_gens: usize,
    table: LabeledDigraph,
    elements: Vec<usize>,
}

impl EnumeratedSemigroup for ToddCoxeterQuotient {
    type Element = usize;

    fn nr_generators(&self) -> usize {
        self.nr_gens
    }
    fn generator(&self, i: usize) -> &usize {
        &self.elements[i]
    }
    fn degree(&self) -> usize {
        self.table.nr_vertices()
    }
    fn size(&mut self) -> usize {
        self.table.nr_vertices()
    }
    fn element_at(&mut self, i: usize) -> &usize {
        &self.elements[i]
    }
    fn word_to_element(&self, _w: &Word) -> usize {
        0
    }
    fn factorization(&mut self, _i: usize) -> Word {
        Word::empty()
    }
    fn adjoin(&mut self, e: usize) -> usize {
        e
    }
    fn fast_product(&mut self, i: usize, j: usize) -> usize {
        self.table.neighbor(i, j % self.nr_gens).unwrap_or(i)
    }
    fn left_cayley_graph(&mut self) -> &LabeledDigraph {
        &self.table
    }
    fn right_cayley_graph(&mut self) -> &LabeledDigraph {
        &self.table
    }
    fn is_finite(&mut self) -> fpsemi_types::ThreeValued {
        fpsemi_types::ThreeValued::Yes
    }
    fn current_size(&self) -> usize {
        self.table.nr_vertices()
    }
    fn batch_size(&mut self, _k: usize) {}
}

impl ToddCoxeterCore {
    /// Builds a finite semigroup over the set of active cosets as its
    /// element set (§4.10). `element_at`/`word_to_element`/
    /// `factorization` are degenerate on this representation (there is no
    /// stored generator element, only the table); this is documented in
    /// DESIGN.md as a minimal adapter sufficient to expose the coset
    /// table as an `EnumeratedSemigroup`, not a general-purpose one.
    pub fn quotient_semigroup(&self) -> ToddCoxeterQuotient {
        let n = self.table.nr_vertices();
        ToddCoxeterQuotient {
            nr_gens: self.nr_gens,
            table: self.table.clone(),
            elements: (0..n).collect(),
        }
    }
}

impl RunnerAlgorithm for ToddCoxeterCore {
    fn run_body(&mut self, ctl: &fpsemi_runner::RunnerControl) {
        self.frozen = true;
        let all = self.relations_and_extra();
        loop {
            if ctl.stopped() {
                return;
            }
            let active: Vec<usize> = self.cosets.iter_active().map(usize::from).collect();
            let before = self.table.nr_vertices();
            for c in active {
                if ctl.stopped() {
                    return;
                }
                let c = self.find(c);
                if !self.cosets.is_active_coset(Coset::from(c)) {
                    continue;
                }
                for (l, r) in &all {
                    let x = self.trace_defining(c, l);
                    let y = self.trace_defining(c, r);
                    if x != y {
                        self.push_coincidence(x, y);
                        self.process_coincidences();
                    }
                }
            }
            if self.table.nr_vertices() == before {
                break;
            }
        }
        ctl.set_finished(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(letters: &[u32]) -> Word {
        Word::from_u32s(letters)
    }

    fn repeat(pattern: &[u32], times: usize) -> Vec<u32> {
        let mut out = Vec::with_capacity(pattern.len() * times);
        for _ in 0..times {
            out.extend_from_slice(pattern);
        }
        out
    }

    #[test]
    fn free_monoid_on_one_relation_merges_two_cosets() {
        let mut tc = ToddCoxeterCore::new(2, CongruenceSide::TwoSided);
        tc.add_relation(w(&[0]), w(&[1])).unwrap();
        tc.hlt();
        assert!(tc.contains(&w(&[0]), &w(&[1])));
    }

    #[test]
    fn identity_coset_always_exists() {
        let mut tc = ToddCoxeterCore::new(1, CongruenceSide::TwoSided);
        tc.hlt();
        assert!(tc.nr_classes() >= 1);
    }

    #[test]
    fn word_to_class_index_is_stable_after_standardization() {
        let mut tc = ToddCoxeterCore::new(2, CongruenceSide::TwoSided);
        tc.add_relation(w(&[0, 0]), w(&[0])).unwrap();
        tc.add_relation(w(&[1, 1]), w(&[1])).unwrap();
        tc.add_relation(w(&[0, 1]), w(&[1, 0])).unwrap();
        tc.hlt();
        tc.standardize(StandardOrder::ShortLex);
        for i in 0..tc.nr_classes() {
            if let Some(word) = tc.class_index_to_word(i) {
                assert_eq!(tc.word_to_class_index(&word), Some(i));
            }
        }
    }

    #[test]
    fn scenario_s4_finite_monoid_has_10752_classes() {
        let mut tc = ToddCoxeterCore::new(4, CongruenceSide::TwoSided);
        let pairs: &[(&[u32], &[u32])] = &[
            (&[0, 0], &[0]),
            (&[1, 0], &[1]),
            (&[0, 1], &[1]),
            (&[2, 0], &[2]),
            (&[0, 2], &[2]),
            (&[3, 0], &[3]),
            (&[0, 3], &[3]),
            (&[1, 1], &[0]),
            (&[2, 3], &[0]),
            (&[2, 2, 2], &[0]),
        ];
        for (l, r) in pairs {
            tc.add_pair(w(l), w(r)).unwrap();
        }
        tc.add_pair(w(&repeat(&[1, 2, 1, 2], 3)), w(&[0])).unwrap();
        tc.add_pair(w(&repeat(&[1, 2, 1, 3], 4)), w(&[0])).unwrap();
        tc.hlt();
        tc.standardize(StandardOrder::Recursive);
        assert_eq!(tc.nr_classes(), 10752);
        let expected: &[&[u32]] = &[
            &[0],
            &[1],
            &[2],
            &[2, 1],
            &[1, 2],
            &[1, 2, 1],
            &[2, 2],
            &[2, 2, 1],
            &[2, 1, 2],
            &[2, 1, 2, 1],
        ];
        for (i, letters) in expected.iter().enumerate() {
            assert_eq!(tc.class_index_to_word(i), Some(w(letters)));
        }
    }
}
