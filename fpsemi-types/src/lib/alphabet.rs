//! The letter ↔ char bijection used only at the presentation boundary
//! (§6 data format 1): words may be presented as letter indices or as
//! byte strings over a user-supplied alphabet string.

use fnv::FnvHashMap;

use crate::error::{Error, Result};
use crate::idx::Letter;
use crate::word::Word;

const MAX_LETTERS: usize = 256;

/// Debug builds assign `a`, `b`, `c`, ... when the caller supplies only a
/// size; release builds assign `\x01`, `\x02`, ... so that every letter
/// still has a well-defined string form, per §6.
fn default_letter(i: usize) -> char {
    if cfg!(debug_assertions) {
        (b'a' + (i % 26) as u8) as char
    } else {
        char::from_u32((i + 1) as u32).unwrap_or('\u{FFFD}')
    }
}

#[derive(Clone, Debug)]
pub struct Alphabet {
    letters: Vec<char>,
    index: FnvHashMap<char, Letter>,
}

impl Alphabet {
    /// Build an alphabet from an explicit string of `n` distinct characters.
    pub fn from_str(s: &str) -> Result<Self> {
        let letters: Vec<char> = s.chars().collect();
        Self::from_chars(letters)
    }

    /// Build an alphabet of size `n` using the default letter-naming scheme.
    pub fn of_size(n: usize) -> Result<Self> {
        let letters: Vec<char> = (0..n).map(default_letter).collect();
        Self::from_chars(letters)
    }

    fn from_chars(letters: Vec<char>) -> Result<Self> {
        if letters.is_empty() || letters.len() > MAX_LETTERS {
            return Err(Error::InvalidAlphabet);
        }
        let mut index = FnvHashMap::default();
        for (i, &c) in letters.iter().enumerate() {
            if index.insert(c, Letter::from(i)).is_some() {
                return Err(Error::InvalidAlphabet);
            }
        }
        Ok(Alphabet { letters, index })
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    pub fn char_of(&self, l: Letter) -> Option<char> {
        self.letters.get(usize::from(l)).copied()
    }

    pub fn letter_of(&self, c: char) -> Option<Letter> {
        self.index.get(&c).copied()
    }

    pub fn validate(&self, w: &Word) -> Result<()> {
        for l in w.iter() {
            if usize::from(l) >= self.len() {
                return Err(Error::InvalidWord {
                    letter: l,
                    alphabet_size: self.len(),
                });
            }
        }
        Ok(())
    }

    pub fn word_from_str(&self, s: &str) -> Result<Word> {
        let mut letters = Vec::with_capacity(s.chars().count());
        for c in s.chars() {
            letters.push(
                self.letter_of(c)
                    .ok_or(Error::InvalidWord {
                        letter: Letter::from(0u32),
                        alphabet_size: self.len(),
                    })?,
            );
        }
        Ok(Word::new(letters))
    }

    pub fn word_to_string(&self, w: &Word) -> Option<String> {
        w.iter().map(|l| self.char_of(l)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_letters() {
        assert!(Alphabet::from_str("aab").is_err());
    }

    #[test]
    fn round_trips_words() {
        let a = Alphabet::from_str("ab").unwrap();
        let w = a.word_from_str("aba").unwrap();
        assert_eq!(a.word_to_string(&w).unwrap(), "aba");
    }

    #[test]
    fn of_size_is_well_defined() {
        let a = Alphabet::of_size(5).unwrap();
        assert_eq!(a.len(), 5);
        assert!(a.char_of(Letter::from(0u32)).is_some());
    }
}
