//! Fixed-width occupancy bitmap with rank queries.

use std::fmt;

use crate::config::INDEX_LIMIT;

const WORD_BITS: usize = u64::BITS as usize;
const WORDS: usize = INDEX_LIMIT.div_ceil(WORD_BITS);

/// One bit per table slot. Bit `i` is set when slot `i` is occupied.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bitmap {
    words: [u64; WORDS],
}

impl Bitmap {
    /// Creates a bitmap with every bit clear.
    #[must_use]
    pub const fn new() -> Self {
        Self { words: [0; WORDS] }
    }

    /// Sets bit `i`.
    #[inline]
    pub fn set(&mut self, i: usize) {
        debug_assert!(i < INDEX_LIMIT);
        self.words[i / WORD_BITS] |= 1 << (i % WORD_BITS);
    }

    /// Clears bit `i`.
    #[inline]
    pub fn unset(&mut self, i: usize) {
        debug_assert!(i < INDEX_LIMIT);
        self.words[i / WORD_BITS] &= !(1 << (i % WORD_BITS));
    }

    /// Returns `true` if bit `i` is set.
    #[inline]
    #[must_use]
    pub const fn is_set(&self, i: usize) -> bool {
        self.words[i / WORD_BITS] & (1 << (i % WORD_BITS)) != 0
    }

    /// Returns the number of set bits strictly below `i` (rank).
    ///
    /// For a sparse table this is the dense array offset of slot `i`.
    #[inline]
    #[must_use]
    pub fn count(&self, i: usize) -> usize {
        debug_assert!(i < INDEX_LIMIT);
        let word = i / WORD_BITS;
        let mask = (1_u64 << (i % WORD_BITS)) - 1;
        let below: u32 = self.words[..word].iter().map(|w| w.count_ones()).sum();
        (below + (self.words[word] & mask).count_ones()) as usize
    }

    /// Returns the number of set bits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns `true` if no bit is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Iterates over the positions of set bits in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(w, &word)| {
            let mut rest = word;
            std::iter::from_fn(move || {
                if rest == 0 {
                    return None;
                }
                let bit = rest.trailing_zeros() as usize;
                rest &= rest - 1;
                Some(w * WORD_BITS + bit)
            })
        })
    }
}

impl Default for Bitmap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Bitmap(")?;
        for word in self.words.iter().rev() {
            write!(f, "{word:064b}")?;
        }
        f.write_str(")")
    }
}
