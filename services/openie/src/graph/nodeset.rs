//! Fixed-capacity bitset over token indices

use std::fmt;

const WORD_BITS: usize = 64;

/// A set of token indices for one sentence.
///
/// Capacity is the sentence length; two sets are only comparable when they
/// were created for the same sentence. Hashing and equality look at the bits
/// alone, so a `NodeSet` can key a visited-state map directly.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct NodeSet {
    words: Vec<u64>,
    capacity: usize,
}

impl NodeSet {
    pub fn empty(capacity: usize) -> Self {
        Self {
            words: vec![0; capacity.div_ceil(WORD_BITS)],
            capacity,
        }
    }

    pub fn full(capacity: usize) -> Self {
        let mut set = Self::empty(capacity);
        for index in 0..capacity {
            set.insert(index);
        }
        set
    }

    pub fn from_indices(capacity: usize, indices: impl IntoIterator<Item = usize>) -> Self {
        let mut set = Self::empty(capacity);
        for index in indices {
            set.insert(index);
        }
        set
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn contains(&self, index: usize) -> bool {
        index < self.capacity && self.words[index / WORD_BITS] & (1 << (index % WORD_BITS)) != 0
    }

    /// Returns true if the index was newly inserted
    pub fn insert(&mut self, index: usize) -> bool {
        debug_assert!(index < self.capacity, "index {} outside capacity {}", index, self.capacity);
        if index >= self.capacity {
            return false;
        }
        let mask = 1 << (index % WORD_BITS);
        let word = &mut self.words[index / WORD_BITS];
        let fresh = *word & mask == 0;
        *word |= mask;
        fresh
    }

    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.capacity {
            return false;
        }
        let mask = 1 << (index % WORD_BITS);
        let word = &mut self.words[index / WORD_BITS];
        let present = *word & mask != 0;
        *word &= !mask;
        present
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// Ascending iteration over members
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.capacity).filter(move |i| self.contains(*i))
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }

    pub fn difference(&self, other: &NodeSet) -> NodeSet {
        let words = self
            .words
            .iter()
            .zip(other.words.iter().chain(std::iter::repeat(&0)))
            .map(|(a, b)| a & !b)
            .collect();
        NodeSet {
            words,
            capacity: self.capacity,
        }
    }

    pub fn intersection(&self, other: &NodeSet) -> NodeSet {
        let words = self
            .words
            .iter()
            .zip(other.words.iter().chain(std::iter::repeat(&0)))
            .map(|(a, b)| a & b)
            .collect();
        NodeSet {
            words,
            capacity: self.capacity,
        }
    }

    pub fn union_with(&mut self, other: &NodeSet) {
        for (a, b) in self.words.iter_mut().zip(other.words.iter()) {
            *a |= b;
        }
    }

    pub fn is_subset(&self, other: &NodeSet) -> bool {
        self.words
            .iter()
            .zip(other.words.iter().chain(std::iter::repeat(&0)))
            .all(|(a, b)| a & !b == 0)
    }

    pub fn is_disjoint(&self, other: &NodeSet) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .all(|(a, b)| a & b == 0)
    }
}

impl fmt::Debug for NodeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
