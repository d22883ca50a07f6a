//! Words and relations (§3 "Word", "Relation").

use std::cmp::Ordering;
use std::fmt;

use crate::idx::Letter;

/// A finite ordered sequence of letters. The empty word is permitted here;
/// individual subsystems (e.g. Todd–Coxeter relations) reject it where
/// their own semantics require a nonempty word.
#[derive(Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Word(Vec<Letter>);

impl Word {
    pub fn new(letters: Vec<Letter>) -> Self {
        Word(letters)
    }

    pub fn empty() -> Self {
        Word(Vec::new())
    }

    pub fn from_u32s(letters: &[u32]) -> Self {
        Word(letters.iter().map(|&l| Letter::from(l)).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[Letter] {
        &self.0
    }

    pub fn as_mut_vec(&mut self) -> &mut Vec<Letter> {
        &mut self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = Letter> + '_ {
        self.0.iter().copied()
    }

    pub fn push(&mut self, l: Letter) {
        self.0.push(l)
    }

    pub fn truncate(&mut self, len: usize) {
        self.0.truncate(len)
    }

    pub fn append(&mut self, other: &Word) {
        self.0.extend_from_slice(&other.0)
    }

    /// `self` then `other`, as a fresh word.
    pub fn concat(&self, other: &Word) -> Word {
        let mut v = self.0.clone();
        v.extend_from_slice(&other.0);
        Word(v)
    }

    /// Shortlex comparison: shorter words are smaller; equal-length words
    /// compare letter-by-letter.
    pub fn shortlex_cmp(&self, other: &Word) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }

    /// Pure lexicographic comparison (ignores length).
    pub fn lex_cmp(&self, other: &Word) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.0.iter().map(|l| l.as_u32()))
            .finish()
    }
}

impl From<Vec<Letter>> for Word {
    fn from(v: Vec<Letter>) -> Self {
        Word(v)
    }
}

impl std::ops::Index<usize> for Word {
    type Output = Letter;
    fn index(&self, i: usize) -> &Letter {
        &self.0[i]
    }
}

/// An ordered pair of words asserted equal in the presented semigroup
/// (§3 "Relation").
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Relation {
    pub lhs: Word,
    pub rhs: Word,
}

impl Relation {
    pub fn new(lhs: Word, rhs: Word) -> Self {
        Relation { lhs, rhs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortlex_orders_by_length_first() {
        let short = Word::from_u32s(&[1, 1, 1]);
        let long = Word::from_u32s(&[0, 0]);
        // "00" has length 2 < 3, so it is shortlex-smaller even though '0' < '1'.
        assert_eq!(long.shortlex_cmp(&short), Ordering::Less);
    }

    #[test]
    fn shortlex_breaks_ties_lexicographically() {
        let a = Word::from_u32s(&[0, 1]);
        let b = Word::from_u32s(&[1, 0]);
        assert_eq!(a.shortlex_cmp(&b), Ordering::Less);
    }
}
