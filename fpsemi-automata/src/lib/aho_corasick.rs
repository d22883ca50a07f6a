//! C4: a trie of patterns with suffix links, incremental add/remove, and a
//! Graphviz dump (§4.4, §6 data format 2).

use fnv::FnvHashMap;
use fpsemi_types::error::{Error, Result};
use fpsemi_types::idx::{Letter, NodeIdx};
use fpsemi_types::Word;

#[derive(Clone, Debug)]
struct Node {
    children: FnvHashMap<Letter, NodeIdx>,
    suffix_link: NodeIdx,
    height: usize,
    parent: Option<NodeIdx>,
    letter_from_parent: Option<Letter>,
    terminal: bool,
}

impl Node {
    fn root() -> Self {
        Node {
            children: FnvHashMap::default(),
            suffix_link: NodeIdx::new(0),
            height: 0,
            parent: None,
            letter_from_parent: None,
            terminal: false,
        }
    }
}

/// Stable-index trie with lazily-recomputed suffix links.
#[derive(Clone, Debug)]
pub struct AhoCorasick {
    nodes: Vec<Node>,
    free: Vec<NodeIdx>,
    suffix_links_valid: bool,
}

impl Default for AhoCorasick {
    fn default() -> Self {
        Self::new()
    }
}

impl AhoCorasick {
    pub const ROOT: NodeIdx = NodeIdx::new(0);

    pub fn new() -> Self {
        AhoCorasick {
            nodes: vec![Node::root()],
            free: Vec::new(),
            suffix_links_valid: true,
        }
    }

    pub fn nr_nodes(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    fn alloc(&mut self, parent: NodeIdx, letter: Letter) -> NodeIdx {
        let height = self.nodes[usize::from(parent)].height + 1;
        let node = Node {
            children: FnvHashMap::default(),
            suffix_link: Self::ROOT,
            height,
            parent: Some(parent),
            letter_from_parent: Some(letter),
            terminal: false,
        };
        if let Some(idx) = self.free.pop() {
            self.nodes[usize::from(idx)] = node;
            idx
        } else {
            let idx = NodeIdx::from(self.nodes.len());
            self.nodes.push(node);
            idx
        }
    }

    fn free_node(&mut self, idx: NodeIdx) {
        self.free.push(idx);
    }

    pub fn is_terminal(&self, idx: NodeIdx) -> bool {
        self.nodes[usize::from(idx)].terminal
    }

    pub fn height(&self, idx: NodeIdx) -> usize {
        self.nodes[usize::from(idx)].height
    }

    pub fn parent(&self, idx: NodeIdx) -> Option<NodeIdx> {
        self.nodes[usize::from(idx)].parent
    }

    /// Walks down from the root, creating nodes as needed; the final node
    /// becomes terminal. Errors if the word already names a terminal node.
    pub fn add_word(&mut self, word: &Word) -> Result<NodeIdx> {
        let mut cur = Self::ROOT;
        for l in word.iter() {
            cur = match self.nodes[usize::from(cur)].children.get(&l) {
                Some(&child) => child,
                None => {
                    let child = self.alloc(cur, l);
                    self.nodes[usize::from(cur)].children.insert(l, child);
                    child
                }
            };
        }
        if self.nodes[usize::from(cur)].terminal {
            return Err(Error::AlreadyTerminal);
        }
        self.nodes[usize::from(cur)].terminal = true;
        self.suffix_links_valid = false;
        Ok(cur)
    }

    /// Finds the node whose signature is `word`, following only child
    /// edges (no fail transitions).
    pub fn find(&self, word: &Word) -> Option<NodeIdx> {
        let mut cur = Self::ROOT;
        for l in word.iter() {
            cur = *self.nodes[usize::from(cur)].children.get(&l)?;
        }
        Some(cur)
    }

    /// Removes `word`. If the terminal node has children, only its
    /// terminal flag is cleared. Otherwise nodes are freed walking back
    /// toward the root, stopping at the first node that is itself
    /// terminal or still has other children. Returns the index that used
    /// to be terminal for `word` (the index itself may since have been
    /// recycled by a later `add_word`).
    pub fn remove_word(&mut self, word: &Word) -> Option<NodeIdx> {
        let terminal_idx = self.find(word)?;
        if !self.nodes[usize::from(terminal_idx)].terminal {
            return None;
        }
        self.nodes[usize::from(terminal_idx)].terminal = false;
        self.suffix_links_valid = false;

        if !self.nodes[usize::from(terminal_idx)].children.is_empty() {
            return Some(terminal_idx);
        }

        let mut cur = terminal_idx;
        loop {
            let node = self.nodes[usize::from(cur)].clone();
            if node.terminal || !node.children.is_empty() {
                break;
            }
            let (parent, letter) = match (node.parent, node.letter_from_parent) {
                (Some(p), Some(l)) => (p, l),
                _ => break, // root
            };
            self.nodes[usize::from(parent)].children.remove(&letter);
            self.free_node(cur);
            cur = parent;
        }
        Some(terminal_idx)
    }

    /// The combined *goto + fail* transition. Requires `ensure_suffix_links`
    /// to have been called since the last mutation.
    pub fn traverse(&self, current: NodeIdx, letter: Letter) -> NodeIdx {
        debug_assert!(
            self.suffix_links_valid,
            "traverse() called with a stale suffix-link cache; call ensure_suffix_links() first"
        );
        let mut cur = current;
        loop {
            if let Some(&child) = self.nodes[usize::from(cur)].children.get(&letter) {
                return child;
            }
            if cur == Self::ROOT {
                return Self::ROOT;
            }
            cur = self.suffix_link(cur);
        }
    }

    /// The no-fail goto, used when the caller already knows `word` is a
    /// path in the trie (e.g. re-deriving a signature).
    pub fn traverse_no_fail(&self, current: NodeIdx, letter: Letter) -> Option<NodeIdx> {
        self.nodes[usize::from(current)].children.get(&letter).copied()
    }

    /// Returns the cached suffix link for `idx`. Requires
    /// `ensure_suffix_links` to have been called since the last mutation.
    pub fn suffix_link(&self, idx: NodeIdx) -> NodeIdx {
        debug_assert!(self.suffix_links_valid);
        self.nodes[usize::from(idx)].suffix_link
    }

    /// Forces a full suffix-link recomputation if the cache is stale.
    pub fn recompute_suffix_links(&mut self) {
        if self.suffix_links_valid {
            return;
        }
        self.nodes[usize::from(Self::ROOT)].suffix_link = Self::ROOT;
        let mut queue: std::collections::VecDeque<NodeIdx> = std::collections::VecDeque::new();
        queue.push_back(Self::ROOT);
        while let Some(u) = queue.pop_front() {
            let children: Vec<(Letter, NodeIdx)> = self.nodes[usize::from(u)]
                .children
                .iter()
                .map(|(&l, &c)| (l, c))
                .collect();
            for (letter, child) in children {
                let link = if u == Self::ROOT {
                    Self::ROOT
                } else {
                    self.goto_with_fail(self.nodes[usize::from(u)].suffix_link, letter)
                };
                self.nodes[usize::from(child)].suffix_link = link;
                queue.push_back(child);
            }
        }
        self.suffix_links_valid = true;
    }

    fn goto_with_fail(&self, mut cur: NodeIdx, letter: Letter) -> NodeIdx {
        loop {
            if let Some(&child) = self.nodes[usize::from(cur)].children.get(&letter) {
                return child;
            }
            if cur == Self::ROOT {
                return Self::ROOT;
            }
            cur = self.nodes[usize::from(cur)].suffix_link;
        }
    }

    /// Must be called before any `traverse`/`suffix_link` use following a
    /// mutation, so that the lazily-invalidated cache gets rebuilt. Kept
    /// as an explicit step (rather than hidden `RefCell` interior
    /// mutability) so the rewriter controls exactly when the O(nodes)
    /// recomputation happens.
    pub fn ensure_suffix_links(&mut self) {
        self.recompute_suffix_links();
    }

    /// The word labelling the unique root-to-`idx` path.
    pub fn signature(&self, idx: NodeIdx) -> Word {
        let mut letters = Vec::with_capacity(self.height(idx));
        let mut cur = idx;
        while let (Some(p), Some(l)) = (
            self.nodes[usize::from(cur)].parent,
            self.nodes[usize::from(cur)].letter_from_parent,
        ) {
            letters.push(l);
            cur = p;
        }
        letters.reverse();
        Word::new(letters)
    }

    /// Graphviz `digraph` text: solid child edges labelled by letter,
    /// dashed suffix-link edges, nodes labelled by signature + terminal
    /// flag (§6 data format 2).
    pub fn to_graphviz(&mut self) -> String {
        self.ensure_suffix_links();
        let mut out = String::from("digraph AhoCorasick {\n");
        for i in 0..self.nodes.len() {
            if self.free.contains(&NodeIdx::from(i)) {
                continue;
            }
            let idx = NodeIdx::from(i);
            let sig = self.signature(idx);
            let label = if sig.is_empty() {
                "ε".to_string()
            } else {
                format!("{:?}", sig)
            };
            out.push_str(&format!(
                "  n{} [label=\"{}{}\"];\n",
                i,
                label,
                if self.is_terminal(idx) { " *" } else { "" }
            ));
        }
        for i in 0..self.nodes.len() {
            if self.free.contains(&NodeIdx::from(i)) {
                continue;
            }
            let idx = NodeIdx::from(i);
            for (letter, &child) in &self.nodes[i].children {
                out.push_str(&format!(
                    "  n{} -> n{} [label=\"{}\"];\n",
                    i,
                    usize::from(child),
                    letter.as_u32()
                ));
            }
            let link = self.nodes[i].suffix_link;
            if idx != Self::ROOT {
                out.push_str(&format!(
                    "  n{} -> n{} [style=dashed];\n",
                    i,
                    usize::from(link)
                ));
            }
        }
        out.push_str("}\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(letters: &[u32]) -> Word {
        Word::from_u32s(letters)
    }

    #[test]
    fn scenario_s6_add_every_binary_word_of_length_4() {
        let mut ac = AhoCorasick::new();
        for i in 0u32..16 {
            let bits = [
                (i >> 3) & 1,
                (i >> 2) & 1,
                (i >> 1) & 1,
                i & 1,
            ];
            ac.add_word(&w(&bits)).unwrap();
        }
        assert_eq!(ac.nr_nodes(), 31);

        ac.remove_word(&w(&[0, 1, 1, 1]));
        assert_eq!(ac.nr_nodes(), 30);

        ac.ensure_suffix_links();
        let path_0111 = {
            let mut cur = AhoCorasick::ROOT;
            for l in w(&[0, 1, 1, 1]).iter() {
                cur = ac.traverse(cur, l);
            }
            cur
        };
        let path_111 = {
            let mut cur = AhoCorasick::ROOT;
            for l in w(&[1, 1, 1]).iter() {
                cur = ac.traverse(cur, l);
            }
            cur
        };
        assert_eq!(path_0111, path_111);
    }

    #[test]
    fn signature_round_trips_a_prefix() {
        let mut ac = AhoCorasick::new();
        ac.add_word(&w(&[0, 1, 0])).unwrap();
        ac.ensure_suffix_links();
        let mut cur = AhoCorasick::ROOT;
        for l in w(&[0, 1]).iter() {
            cur = ac.traverse_no_fail(cur, l).unwrap();
        }
        assert_eq!(ac.signature(cur), w(&[0, 1]));
    }

    #[test]
    fn add_twice_is_already_terminal() {
        let mut ac = AhoCorasick::new();
        ac.add_word(&w(&[0, 1])).unwrap();
        assert!(matches!(ac.add_word(&w(&[0, 1])), Err(Error::AlreadyTerminal)));
    }

    #[test]
    fn remove_keeps_shared_prefix_alive() {
        let mut ac = AhoCorasick::new();
        ac.add_word(&w(&[0, 1])).unwrap();
        ac.add_word(&w(&[0, 1, 2])).unwrap();
        let before = ac.nr_nodes();
        ac.remove_word(&w(&[0, 1, 2]));
        assert_eq!(ac.nr_nodes(), before - 1);
        assert!(ac.find(&w(&[0, 1])).is_some());
    }
}
