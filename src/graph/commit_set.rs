//! Dense commit identifiers and a fixed-size bitset over them.
//!
//! Every commit in a [`CommitGraph`](super::CommitGraph) gets a `CommitIdx`
//! in `0..graph.len()`. Ancestry sets are stored as bitsets sized to the
//! graph, so membership is a shift and a mask and unions are word-wise ORs.
//!
//! # Invariants
//! - A `CommitSet` is sized at construction and never grows.
//! - Indices must come from the graph the set was sized for.

use std::fmt;

/// Dense index of a commit within one graph snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommitIdx(pub u32);

impl CommitIdx {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CommitIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Bitset over the commits of one graph
#[derive(Clone, PartialEq, Eq)]
pub struct CommitSet {
    words: Vec<u64>,
    len: usize,
}

impl CommitSet {
    /// Creates an empty set able to hold `capacity` commits.
    pub fn new(capacity: usize) -> Self {
        CommitSet {
            words: vec![0; capacity.div_ceil(64)],
            len: 0,
        }
    }

    /// Inserts a commit, returning true if it was newly set.
    #[inline]
    pub fn insert(&mut self, idx: CommitIdx) -> bool {
        let (word, mask) = Self::locate(idx);
        if self.words[word] & mask != 0 {
            false
        } else {
            self.words[word] |= mask;
            self.len += 1;
            true
        }
    }

    #[inline]
    pub fn contains(&self, idx: CommitIdx) -> bool {
        let (word, mask) = Self::locate(idx);
        self.words.get(word).is_some_and(|w| w & mask != 0)
    }

    /// Adds every member of `other`.
    pub fn union_with(&mut self, other: &CommitSet) {
        for (mine, theirs) in self.words.iter_mut().zip(&other.words) {
            *mine |= *theirs;
        }
        self.len = self.words.iter().map(|w| w.count_ones() as usize).sum();
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Members in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = CommitIdx> + '_ {
        self.words.iter().enumerate().flat_map(|(w, &bits)| {
            (0..64u32)
                .filter(move |bit| bits & (1u64 << bit) != 0)
                .map(move |bit| CommitIdx((w as u32) * 64 + bit))
        })
    }

    #[inline]
    fn locate(idx: CommitIdx) -> (usize, u64) {
        let i = idx.index();
        (i / 64, 1u64 << (i % 64))
    }
}

impl fmt::Debug for CommitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
