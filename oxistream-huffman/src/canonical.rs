//! Huffman code lengths and canonical code assignment.
//!
//! Lengths come from the classic two-smallest merge over the symbol counts.
//! Ties are broken by node id, so the result depends on the counts alone.
//! Codes are then assigned canonically (RFC 1951 order): shorter codes
//! first, and within a length in increasing symbol order.

use oxistream_core::{BitSink, BitSource, Result, StreamError};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Longest code the decoder will follow.
pub const MAX_CODE_LENGTH: usize = 31;

/// Compute Huffman code lengths for `counts`. Zero counts get length 0.
pub fn build_lengths(counts: &[u32]) -> Vec<u8> {
    let mut lengths = vec![0u8; counts.len()];

    let active: Vec<usize> = (0..counts.len()).filter(|&s| counts[s] > 0).collect();
    match active.len() {
        0 => return lengths,
        1 => {
            lengths[active[0]] = 1;
            return lengths;
        }
        _ => {}
    }

    // Nodes 0..n are leaves, internal nodes are appended after them.
    let n = counts.len();
    let mut parent = vec![usize::MAX; n + active.len()];
    let mut heap: BinaryHeap<Reverse<(u64, usize)>> = active
        .iter()
        .map(|&s| Reverse((u64::from(counts[s]), s)))
        .collect();

    let mut next_id = n;
    while heap.len() > 1 {
        let (Some(Reverse((wa, a))), Some(Reverse((wb, b)))) = (heap.pop(), heap.pop()) else {
            break;
        };
        parent[a] = next_id;
        parent[b] = next_id;
        heap.push(Reverse((wa + wb, next_id)));
        next_id += 1;
    }

    for &symbol in &active {
        let mut depth = 0u8;
        let mut node = symbol;
        while parent[node] != usize::MAX {
            node = parent[node];
            depth += 1;
        }
        lengths[symbol] = depth;
    }
    lengths
}

/// A canonical prefix code for one alphabet.
#[derive(Debug, Clone)]
pub struct CanonicalCode {
    lengths: Vec<u8>,
    codes: Vec<u32>,
    /// Number of codes of each length.
    bl_count: [u32; MAX_CODE_LENGTH + 1],
    /// First code of each length.
    base_codes: [u32; MAX_CODE_LENGTH + 1],
    /// Index into `symbols` of the first symbol of each length.
    symbol_offsets: [u32; MAX_CODE_LENGTH + 1],
    /// Active symbols sorted by (length, symbol).
    symbols: Vec<u16>,
    max_length: u8,
}

impl CanonicalCode {
    /// Build the canonical code for the given lengths.
    pub fn from_lengths(lengths: Vec<u8>) -> Result<Self> {
        let mut bl_count = [0u32; MAX_CODE_LENGTH + 1];
        let mut max_length = 0u8;
        for &len in &lengths {
            if len as usize > MAX_CODE_LENGTH {
                return Err(StreamError::invalid_config(format!(
                    "code length {len} exceeds {MAX_CODE_LENGTH}"
                )));
            }
            if len > 0 {
                bl_count[len as usize] += 1;
                max_length = max_length.max(len);
            }
        }

        let mut next_code = [0u32; MAX_CODE_LENGTH + 1];
        let mut code = 0u32;
        for bits in 1..=max_length as usize {
            code = (code + bl_count[bits - 1]) << 1;
            next_code[bits] = code;
        }
        let base_codes = next_code;

        let mut symbol_offsets = [0u32; MAX_CODE_LENGTH + 1];
        let mut offset = 0u32;
        for bits in 1..=max_length as usize {
            symbol_offsets[bits] = offset;
            offset += bl_count[bits];
        }

        let mut symbols = vec![0u16; offset as usize];
        let mut fill = symbol_offsets;
        let mut codes = vec![0u32; lengths.len()];
        for (symbol, &len) in lengths.iter().enumerate() {
            if len == 0 {
                continue;
            }
            codes[symbol] = next_code[len as usize];
            next_code[len as usize] += 1;
            symbols[fill[len as usize] as usize] = symbol as u16;
            fill[len as usize] += 1;
        }

        Ok(Self {
            lengths,
            codes,
            bl_count,
            base_codes,
            symbol_offsets,
            symbols,
            max_length,
        })
    }

    /// Build the Huffman code for `counts`.
    pub fn from_counts(counts: &[u32]) -> Result<Self> {
        Self::from_lengths(build_lengths(counts))
    }

    /// Code length of `symbol` (0 if it has no code).
    pub fn length(&self, symbol: usize) -> u8 {
        self.lengths[symbol]
    }

    /// All code lengths.
    pub fn lengths(&self) -> &[u8] {
        &self.lengths
    }

    /// Code of `symbol`.
    pub fn code(&self, symbol: usize) -> u32 {
        self.codes[symbol]
    }

    /// Longest code length in use.
    pub fn max_length(&self) -> u8 {
        self.max_length
    }

    /// Write the code of `symbol`.
    #[inline]
    pub fn encode<B: BitSink + ?Sized>(&self, sink: &mut B, symbol: usize) -> Result<()> {
        let len = self.lengths[symbol];
        debug_assert!(len > 0, "symbol {symbol} has no code");
        sink.put_bits(self.codes[symbol], len)
    }

    /// Read one code, bit by bit.
    ///
    /// `Ok(None)` means the source was already exhausted before the first
    /// bit; running out inside a code is [`StreamError::Truncated`].
    pub fn decode<B: BitSource + ?Sized>(&self, source: &mut B) -> Result<Option<usize>> {
        let mut code = 0u32;
        for len in 1..=self.max_length as usize {
            let bit = match source.get_bit()? {
                Some(bit) => bit,
                None if len == 1 => return Ok(None),
                None => return Err(StreamError::truncated("end of data inside a Huffman code")),
            };
            code = (code << 1) | u32::from(bit);

            let count = self.bl_count[len];
            if count > 0 {
                let index = code.wrapping_sub(self.base_codes[len]);
                if code >= self.base_codes[len] && index < count {
                    let pos = self.symbol_offsets[len] + index;
                    return Ok(Some(self.symbols[pos as usize] as usize));
                }
            }
        }
        Err(StreamError::corrupt(0, "bit sequence matches no Huffman code"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn kraft_sum(lengths: &[u8]) -> f64 {
        lengths
            .iter()
            .filter(|&&l| l > 0)
            .map(|&l| 2.0f64.powi(-(l as i32)))
            .sum()
    }

    #[test]
    fn test_lengths_are_complete_prefix_code() {
        let counts = [5, 9, 12, 13, 16, 45];
        let lengths = build_lengths(&counts);
        assert_eq!(lengths, vec![4, 4, 3, 3, 3, 1]);
        assert!((kraft_sum(&lengths) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_counts_get_no_code() {
        let lengths = build_lengths(&[0, 3, 0, 1, 1]);
        assert_eq!(lengths[0], 0);
        assert_eq!(lengths[2], 0);
        assert_eq!(lengths[1], 1);
        assert_eq!(build_lengths(&[0, 7, 0]), vec![0, 1, 0]);
    }

    #[test]
    fn test_canonical_assignment() {
        // RFC 1951 section 3.2.2 example.
        let code = CanonicalCode::from_lengths(vec![3, 3, 3, 3, 3, 2, 4, 4]).unwrap();
        let expected = [0b010, 0b011, 0b100, 0b101, 0b110, 0b00, 0b1110, 0b1111];
        for (symbol, &value) in expected.iter().enumerate() {
            assert_eq!(code.code(symbol), value, "symbol {symbol}");
        }
        assert_eq!(code.max_length(), 4);
    }

    #[test]
    fn test_encode_decode_symbols() {
        let counts: Vec<u32> = (0..257u32).map(|i| 1 + (i * 37) % 101).collect();
        let code = CanonicalCode::from_counts(&counts).unwrap();

        let message: Vec<usize> = (0..2000).map(|i| (i * 7919) % 257).collect();
        let mut bits = Vec::new();
        for &symbol in &message {
            code.encode(&mut bits, symbol).unwrap();
        }

        let mut source: VecDeque<bool> = bits.into_iter().collect();
        for &symbol in &message {
            assert_eq!(code.decode(&mut source).unwrap(), Some(symbol));
        }
        assert_eq!(code.decode(&mut source).unwrap(), None);
    }

    #[test]
    fn test_truncated_code() {
        let code = CanonicalCode::from_lengths(vec![1, 2, 2]).unwrap();
        // Symbol 1 is "10"; only the first bit is present.
        let mut source: VecDeque<bool> = VecDeque::from(vec![true]);
        assert!(matches!(
            code.decode(&mut source),
            Err(StreamError::Truncated { .. })
        ));
    }
}
