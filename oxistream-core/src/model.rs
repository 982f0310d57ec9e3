//! Adaptive frequency model shared by the Huffman and arithmetic coders.
//!
//! A [`FrequencyTable`] keeps one count per symbol plus a Fenwick tree over
//! the counts, so cumulative-frequency lookups and updates are O(log n).
//! Encoder and decoder drive identical tables through identical update
//! sequences; the tables never travel on the wire, so every operation here
//! must be deterministic.
//!
//! When an update would push the total past `max_total`, every count is
//! halved first (active symbols never drop below 1). Symbols with a count of
//! zero are *inactive*: they have an empty cumulative range and can only be
//! brought in with [`FrequencyTable::activate`].

use crate::error::{Result, StreamError};

/// Adaptive symbol frequency table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: Vec<u32>,
    /// Fenwick tree, 1-based.
    tree: Vec<u32>,
    total: u32,
    max_total: u32,
    increment: u32,
    rescales: u64,
}

impl FrequencyTable {
    /// Create a table with every one of `symbols` symbols at count 1.
    pub fn new(symbols: usize, increment: u32, max_total: u32) -> Result<Self> {
        Self::with_counts(vec![1; symbols], increment, max_total)
    }

    /// Create a table from explicit initial counts (zeros are inactive).
    pub fn with_counts(counts: Vec<u32>, increment: u32, max_total: u32) -> Result<Self> {
        if counts.is_empty() {
            return Err(StreamError::invalid_config("frequency table needs symbols"));
        }
        if increment == 0 {
            return Err(StreamError::invalid_config("increment must be positive"));
        }
        let total: u64 = counts.iter().map(|&c| u64::from(c)).sum();
        let active = counts.iter().filter(|&&c| c > 0).count() as u64;
        if total == 0 {
            return Err(StreamError::invalid_config("no active symbols"));
        }
        // After halving, every active symbol keeps at least 1 and there must
        // still be room for one more increment.
        if u64::from(max_total) < (counts.len() as u64).max(active) + u64::from(increment)
            || total > u64::from(max_total)
        {
            return Err(StreamError::invalid_config(format!(
                "max_total {max_total} too small for {} symbols with increment {increment}",
                counts.len()
            )));
        }

        let mut table = Self {
            tree: vec![0; counts.len() + 1],
            counts,
            total: total as u32,
            max_total,
            increment,
            rescales: 0,
        };
        table.rebuild_tree();
        Ok(table)
    }

    /// Number of symbols in the alphabet.
    pub fn symbols(&self) -> usize {
        self.counts.len()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Upper bound on [`Self::total`].
    pub fn max_total(&self) -> u32 {
        self.max_total
    }

    /// Count of `symbol`.
    pub fn count(&self, symbol: usize) -> u32 {
        self.counts[symbol]
    }

    /// All counts, indexed by symbol.
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Whether `symbol` has a non-zero count.
    pub fn is_active(&self, symbol: usize) -> bool {
        self.counts[symbol] > 0
    }

    /// How many times the table has been rescaled.
    pub fn rescales(&self) -> u64 {
        self.rescales
    }

    /// Sum of the counts of symbols `0..symbol`.
    pub fn cumulative(&self, symbol: usize) -> u32 {
        let mut sum = 0;
        let mut i = symbol;
        while i > 0 {
            sum += self.tree[i];
            i &= i - 1;
        }
        sum
    }

    /// Cumulative range `[low, high)` of `symbol`.
    pub fn range(&self, symbol: usize) -> (u32, u32) {
        let low = self.cumulative(symbol);
        (low, low + self.counts[symbol])
    }

    /// Find the symbol whose cumulative range contains `target`.
    ///
    /// `target` must be below [`Self::total`].
    pub fn find(&self, target: u32) -> (usize, u32, u32) {
        debug_assert!(target < self.total);

        // Descend the Fenwick tree for the largest prefix with sum <= target.
        let mut pos = 0;
        let mut remaining = target;
        let mut step = (self.counts.len()).next_power_of_two();
        while step > 0 {
            let next = pos + step;
            if next <= self.counts.len() && self.tree[next] <= remaining {
                pos = next;
                remaining -= self.tree[next];
            }
            step >>= 1;
        }

        let low = target - remaining;
        (pos, low, low + self.counts[pos])
    }

    /// Record one occurrence of `symbol`.
    ///
    /// Returns `true` when the update triggered a rescale.
    pub fn update(&mut self, symbol: usize) -> bool {
        let rescaled = self.make_room(self.increment);
        self.add(symbol, self.increment);
        rescaled
    }

    /// Give an inactive symbol a count of 1.
    ///
    /// Returns `true` when a rescale was needed first.
    pub fn activate(&mut self, symbol: usize) -> bool {
        debug_assert!(!self.is_active(symbol));
        let rescaled = self.make_room(1);
        self.add(symbol, 1);
        rescaled
    }

    /// Halve counts until `extra` more fits under `max_total`.
    fn make_room(&mut self, extra: u32) -> bool {
        let mut rescaled = false;
        while self.total + extra > self.max_total {
            self.halve();
            rescaled = true;
        }
        rescaled
    }

    /// Halve every count, keeping active symbols at 1 or more.
    pub fn halve(&mut self) {
        for count in &mut self.counts {
            if *count > 0 {
                *count = (*count / 2).max(1);
            }
        }
        self.total = self.counts.iter().sum();
        self.rescales += 1;
        self.rebuild_tree();

        tracing::debug!(
            total = self.total,
            rescales = self.rescales,
            "frequency table rescaled"
        );
    }

    fn add(&mut self, symbol: usize, delta: u32) {
        self.counts[symbol] += delta;
        self.total += delta;
        let mut i = symbol + 1;
        while i < self.tree.len() {
            self.tree[i] += delta;
            i += i & i.wrapping_neg();
        }
    }

    fn rebuild_tree(&mut self) {
        // Linear-time Fenwick construction.
        self.tree.fill(0);
        for i in 1..self.tree.len() {
            self.tree[i] += self.counts[i - 1];
            let parent = i + (i & i.wrapping_neg());
            if parent < self.tree.len() {
                self.tree[parent] += self.tree[i];
            }
        }
    }

    /// Verify internal consistency: total matches, bound holds and the tree
    /// agrees with a linear prefix sum.
    pub fn check_invariants(&self) -> bool {
        let sum: u64 = self.counts.iter().map(|&c| u64::from(c)).sum();
        if sum != u64::from(self.total) || self.total > self.max_total {
            return false;
        }
        let mut prefix = 0;
        for (symbol, &count) in self.counts.iter().enumerate() {
            if self.cumulative(symbol) != prefix {
                return false;
            }
            prefix += count;
        }
        true
    }

    /// Order-sensitive 64-bit digest of the counts (FNV-1a).
    ///
    /// Two tables that went through the same update sequence have equal
    /// fingerprints.
    pub fn fingerprint(&self) -> u64 {
        let mut hash = 0xCBF2_9CE4_8422_2325u64;
        for &count in &self.counts {
            for byte in count.to_le_bytes() {
                hash ^= u64::from(byte);
                hash = hash.wrapping_mul(0x0000_0100_0000_01B3);
            }
        }
        hash
    }
}
