//! Hash-chain match finder.
//!
//! Every position is indexed by a hash of its next three bytes. The table
//! holds the most recent position per hash and the chain links each
//! position to the previous one with the same hash. Positions are absolute
//! stream offsets, so the history buffer can be compacted without touching
//! the index.

use crate::config::{LzConfig, MAX_MATCH, MIN_MATCH};

const HASH_BITS: u32 = 15;
const HASH_SIZE: usize = 1 << HASH_BITS;
const HASH_MASK: usize = HASH_SIZE - 1;

/// Sliding-window match finder over the bytes pushed into it.
#[derive(Debug)]
pub struct MatchFinder {
    /// History and lookahead; `data[0]` is at absolute offset `base`.
    data: Vec<u8>,
    base: u64,
    /// Most recent position + 1 per hash (0 = empty).
    head: Vec<u64>,
    /// Previous position + 1 with the same hash, indexed by position.
    chain: Vec<u64>,
    /// Positions below this are indexed.
    inserted: u64,
    window_size: usize,
    max_chain: usize,
}

impl MatchFinder {
    /// Create a match finder for `config`.
    pub fn new(config: &LzConfig) -> Self {
        let window_size = config.window_size();
        Self {
            data: Vec::with_capacity(window_size * 2),
            base: 0,
            head: vec![0; HASH_SIZE],
            chain: vec![0; window_size],
            inserted: 0,
            window_size,
            max_chain: config.max_chain,
        }
    }

    /// Append input.
    pub fn push(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Absolute offset one past the last pushed byte.
    pub fn end(&self) -> u64 {
        self.base + self.data.len() as u64
    }

    /// The byte at absolute offset `pos`.
    #[inline]
    pub fn byte(&self, pos: u64) -> u8 {
        self.data[(pos - self.base) as usize]
    }

    #[inline(always)]
    fn hash(b0: u8, b1: u8, b2: u8) -> usize {
        let h = ((b0 as usize).wrapping_mul(506832829))
            ^ ((b1 as usize).wrapping_mul(2654435761) << 8)
            ^ ((b2 as usize).wrapping_mul(374761393) << 16);
        (h ^ (h >> 15)) & HASH_MASK
    }

    fn hash_at(&self, pos: u64) -> usize {
        let i = (pos - self.base) as usize;
        Self::hash(self.data[i], self.data[i + 1], self.data[i + 2])
    }

    /// Index every position below `pos` that has three bytes after it.
    ///
    /// Positions already compacted away are skipped: they lie outside the
    /// window of every position still to be coded.
    pub fn insert_until(&mut self, pos: u64) {
        self.inserted = self.inserted.max(self.base);
        let limit = pos.min(self.end().saturating_sub(MIN_MATCH as u64 - 1));
        while self.inserted < limit {
            let p = self.inserted;
            let h = self.hash_at(p);
            self.chain[p as usize & (self.window_size - 1)] = self.head[h];
            self.head[h] = p + 1;
            self.inserted += 1;
        }
        self.inserted = self.inserted.max(pos);
    }

    /// Longest match for the bytes at `pos`, at most `max_len` long.
    ///
    /// Returns `(length, distance)`. Positions before `pos` must already
    /// be indexed.
    pub fn find(&self, pos: u64, max_len: usize) -> Option<(usize, usize)> {
        let max_len = max_len
            .min(MAX_MATCH)
            .min(self.end().saturating_sub(pos) as usize);
        if self.max_chain == 0 || max_len < MIN_MATCH {
            return None;
        }

        let here = (pos - self.base) as usize;
        let mut candidate = self.head[self.hash_at(pos)];
        let mut best_len = MIN_MATCH - 1;
        let mut best_dist = 0;
        let mut examined = 0;

        while candidate != 0 && examined < self.max_chain {
            let p = candidate - 1;
            if p >= pos {
                break;
            }
            let dist = (pos - p) as usize;
            if dist > self.window_size {
                break;
            }

            let there = (p - self.base) as usize;
            // Cheap rejection on the byte that would extend the best match.
            if self.data[there + best_len] == self.data[here + best_len] {
                let mut len = 0;
                while len < max_len && self.data[there + len] == self.data[here + len] {
                    len += 1;
                }
                if len > best_len {
                    best_len = len;
                    best_dist = dist;
                    if len == max_len {
                        break;
                    }
                }
            }

            let next = self.chain[p as usize & (self.window_size - 1)];
            if next >= candidate {
                break;
            }
            candidate = next;
            examined += 1;
        }

        (best_len >= MIN_MATCH).then_some((best_len, best_dist))
    }

    /// Drop history that can no longer be referenced from `pos` onwards.
    pub fn compact(&mut self, pos: u64) {
        let keep_from = pos.saturating_sub(self.window_size as u64);
        if keep_from >= self.base + self.window_size as u64 {
            let drop = (keep_from - self.base) as usize;
            self.data.drain(..drop);
            self.base = keep_from;
        }
    }

    /// Bytes currently held.
    pub fn buffered(&self) -> usize {
        self.data.len()
    }
}
