//! C2: pool of active/inactive coset identifiers (§4.2).
//!
//! Coset `0` is the identity and is seeded active at construction; it is
//! never freed.

use fpsemi_types::Coset;

#[derive(Clone, Debug)]
pub struct CosetManager {
    /// `forward[c]` / `backward[c]` form the doubly-linked active list;
    /// `None` past either end.
    forward: Vec<Option<Coset>>,
    backward: Vec<Option<Coset>>,
    is_active: Vec<bool>,
    /// Union-find-style forwarding: `identified_with[c] == c` while `c` is
    /// its own representative; otherwise points toward the surviving
    /// coset it was merged into.
    identified_with: Vec<Coset>,
    /// Free cosets available for `new_active_coset`, LIFO. Simplifies the
    /// intrusive free-list variant (§4.2) to a plain `Vec`; functionally
    /// equivalent recycling, documented in DESIGN.md.
    free: Vec<Coset>,
    first_active: Option<Coset>,
    last_active: Option<Coset>,
    nr_active: usize,
    nr_killed: usize,
}

impl Default for CosetManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CosetManager {
    pub fn new() -> Self {
        let mut mgr = CosetManager {
            forward: Vec::new(),
            backward: Vec::new(),
            is_active: Vec::new(),
            identified_with: Vec::new(),
            free: Vec::new(),
            first_active: None,
            last_active: None,
            nr_active: 0,
            nr_killed: 0,
        };
        mgr.add_active_cosets(1);
        mgr
    }

    pub fn capacity(&self) -> usize {
        self.forward.len()
    }

    /// Grows capacity by `k` new active cosets, appended to the tail of
    /// the active list.
    pub fn add_active_cosets(&mut self, k: usize) {
        for _ in 0..k {
            let c = Coset::from(self.forward.len());
            self.forward.push(None);
            self.backward.push(None);
            self.is_active.push(true);
            self.identified_with.push(c);
            self.link_tail(c);
            self.nr_active += 1;
        }
    }

    /// Grows capacity by `k` new free cosets.
    pub fn add_free_cosets(&mut self, k: usize) {
        for _ in 0..k {
            let c = Coset::from(self.forward.len());
            self.forward.push(None);
            self.backward.push(None);
            self.is_active.push(false);
            self.identified_with.push(c);
            self.free.push(c);
        }
    }

    fn link_tail(&mut self, c: Coset) {
        self.backward[usize::from(c)] = self.last_active;
        self.forward[usize::from(c)] = None;
        if let Some(last) = self.last_active {
            self.forward[usize::from(last)] = Some(c);
        } else {
            self.first_active = Some(c);
        }
        self.last_active = Some(c);
    }

    fn unlink(&mut self, c: Coset) {
        let prev = self.backward[usize::from(c)];
        let next = self.forward[usize::from(c)];
        match prev {
            Some(p) => self.forward[usize::from(p)] = next,
            None => self.first_active = next,
        }
        match next {
            Some(n) => self.backward[usize::from(n)] = prev,
            None => self.last_active = prev,
        }
        self.forward[usize::from(c)] = None;
        self.backward[usize::from(c)] = None;
    }

    /// Pops the free-list (allocating more capacity if empty), splices the
    /// new coset into the active list just after the current tail.
    pub fn new_active_coset(&mut self) -> Coset {
        let c = match self.free.pop() {
            Some(c) => c,
            None => {
                self.add_free_cosets(1);
                self.free.pop().expect("just grew the free list")
            }
        };
        self.is_active[usize::from(c)] = true;
        self.identified_with[usize::from(c)] = c;
        self.link_tail(c);
        self.nr_active += 1;
        c
    }

    /// Merges `max` into `min` (`min < max` required). `max` is unlinked
    /// from the active list, pushed onto the free list, and forwarded to
    /// `min`.
    pub fn union_cosets(&mut self, min: Coset, max: Coset) {
        debug_assert!(min < max, "union_cosets requires min < max");
        self.unlink(max);
        self.is_active[usize::from(max)] = false;
        self.free.push(max);
        self.identified_with[usize::from(max)] = min;
        self.nr_active -= 1;
        self.nr_killed += 1;
    }

    /// Walks `identified_with` to the surviving coset.
    pub fn find_coset(&self, mut c: Coset) -> Coset {
        loop {
            let next = self.identified_with[usize::from(c)];
            if next == c {
                return c;
            }
            c = next;
        }
    }

    pub fn next_active_coset(&self, c: Coset) -> Option<Coset> {
        self.forward[usize::from(c)]
    }

    pub fn first_active_coset(&self) -> Option<Coset> {
        self.first_active
    }

    pub fn is_active_coset(&self, c: Coset) -> bool {
        self.is_active
            .get(usize::from(c))
            .copied()
            .unwrap_or(false)
    }

    pub fn nr_cosets_active(&self) -> usize {
        self.nr_active
    }

    pub fn nr_cosets_defined(&self) -> usize {
        self.capacity()
    }

    pub fn nr_cosets_killed(&self) -> usize {
        self.nr_killed
    }

    /// Iterates the active cosets in list order, starting from the
    /// identity.
    pub fn iter_active(&self) -> impl Iterator<Item = Coset> + '_ {
        let mut cur = self.first_active;
        std::iter::from_fn(move || {
            let c = cur?;
            cur = self.forward[usize::from(c)];
            Some(c)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_coset_starts_active() {
        let mgr = CosetManager::new();
        assert!(mgr.is_active_coset(Coset::IDENTITY));
        assert_eq!(mgr.nr_cosets_active(), 1);
    }

    #[test]
    fn new_active_coset_extends_the_list() {
        let mut mgr = CosetManager::new();
        let c1 = mgr.new_active_coset();
        let c2 = mgr.new_active_coset();
        assert_eq!(
            mgr.iter_active().collect::<Vec<_>>(),
            vec![Coset::IDENTITY, c1, c2]
        );
    }

    #[test]
    fn union_cosets_recycles_and_forwards() {
        let mut mgr = CosetManager::new();
        let c1 = mgr.new_active_coset();
        let c2 = mgr.new_active_coset();
        mgr.union_cosets(c1, c2);
        assert!(!mgr.is_active_coset(c2));
        assert_eq!(mgr.find_coset(c2), c1);
        assert_eq!(mgr.nr_cosets_active(), 2);
        assert_eq!(mgr.nr_cosets_killed(), 1);

        let c3 = mgr.new_active_coset();
        assert_eq!(c3, c2, "the freed coset id should be recycled");
    }

    #[test]
    fn active_plus_free_equals_capacity() {
        let mut mgr = CosetManager::new();
        for _ in 0..5 {
            mgr.new_active_coset();
        }
        let c1 = Coset::from(2usize);
        let c2 = Coset::from(4usize);
        mgr.union_cosets(c1, c2);
        let nr_free = mgr.capacity() - mgr.nr_cosets_active();
        assert_eq!(nr_free, 1);
    }
}
