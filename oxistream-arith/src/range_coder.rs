//! Bit-oriented arithmetic coder.
//!
//! The coder tracks an inclusive interval `[low, high]` of 32-bit values.
//! Coding a symbol narrows the interval to the symbol's share of the
//! cumulative frequency range, then renormalizes:
//!
//! - both ends in the lower half: emit 0, double
//! - both ends in the upper half: emit 1, subtract half, double
//! - interval straddles the middle inside the middle quarters: record a
//!   pending bit, subtract a quarter, double
//!
//! Pending bits are emitted, inverted, after the next decided bit. With
//! `total <= 2^16` the interval always spans more than `2^30` values after
//! renormalization, so every symbol with a non-zero count keeps a non-empty
//! sub-interval.

use oxistream_core::{BitSink, BitSource, Result, StreamError};

/// Bits of coder precision.
pub const PRECISION: u32 = 32;

const FULL: u64 = 1 << PRECISION;
const HALF: u64 = FULL / 2;
const QUARTER: u64 = FULL / 4;
const THREE_QUARTERS: u64 = HALF + QUARTER;

/// Largest cumulative total the coder accepts.
pub const MAX_TOTAL: u32 = 1 << 16;

/// Zero bits the decoder may invent past end-of-data before giving up.
pub const MAX_PADDING_BITS: u32 = 32;

/// Arithmetic encoder state.
#[derive(Debug, Clone)]
pub struct RangeEncoder {
    low: u64,
    high: u64,
    pending: u64,
}

impl RangeEncoder {
    /// Create an encoder over the full interval.
    pub fn new() -> Self {
        Self {
            low: 0,
            high: FULL - 1,
            pending: 0,
        }
    }

    /// Pending (undecided) bits.
    pub fn pending(&self) -> u64 {
        self.pending
    }

    fn emit<B: BitSink + ?Sized>(&mut self, sink: &mut B, bit: bool) -> Result<()> {
        sink.put_bit(bit)?;
        while self.pending > 0 {
            sink.put_bit(!bit)?;
            self.pending -= 1;
        }
        Ok(())
    }

    /// Code the symbol occupying `[cum_low, cum_high)` of `total`.
    pub fn encode<B: BitSink + ?Sized>(
        &mut self,
        sink: &mut B,
        cum_low: u32,
        cum_high: u32,
        total: u32,
    ) -> Result<()> {
        debug_assert!(cum_low < cum_high && cum_high <= total && total <= MAX_TOTAL);

        let range = self.high - self.low + 1;
        self.high = self.low + range * u64::from(cum_high) / u64::from(total) - 1;
        self.low += range * u64::from(cum_low) / u64::from(total);

        loop {
            if self.high < HALF {
                self.emit(sink, false)?;
            } else if self.low >= HALF {
                self.emit(sink, true)?;
                self.low -= HALF;
                self.high -= HALF;
            } else if self.low >= QUARTER && self.high < THREE_QUARTERS {
                self.pending += 1;
                self.low -= QUARTER;
                self.high -= QUARTER;
            } else {
                break;
            }
            self.low <<= 1;
            self.high = (self.high << 1) | 1;
        }
        Ok(())
    }

    /// Emit enough bits to single out the final interval.
    ///
    /// The decoder reads zeros past the end, so two bits (plus pending bits)
    /// select a value inside `[low, high]`.
    pub fn finish<B: BitSink + ?Sized>(&mut self, sink: &mut B) -> Result<()> {
        self.pending += 1;
        let bit = self.low >= QUARTER;
        self.emit(sink, bit)
    }
}

impl Default for RangeEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Arithmetic decoder state.
#[derive(Debug, Clone)]
pub struct RangeDecoder {
    low: u64,
    high: u64,
    value: u64,
    started: bool,
    padding: u32,
}

impl RangeDecoder {
    /// Create a decoder. The first 32 bits are read on first use.
    pub fn new() -> Self {
        Self {
            low: 0,
            high: FULL - 1,
            value: 0,
            started: false,
            padding: 0,
        }
    }

    /// Zero bits supplied past end-of-data so far.
    pub fn padding_bits(&self) -> u32 {
        self.padding
    }

    fn next_bit<B: BitSource + ?Sized>(&mut self, source: &mut B) -> Result<u64> {
        match source.get_bit()? {
            Some(bit) => Ok(u64::from(bit)),
            None => {
                self.padding += 1;
                if self.padding > MAX_PADDING_BITS {
                    return Err(StreamError::truncated(
                        "end of data before arithmetic end-of-stream symbol",
                    ));
                }
                Ok(0)
            }
        }
    }

    fn start<B: BitSource + ?Sized>(&mut self, source: &mut B) -> Result<()> {
        if !self.started {
            for _ in 0..PRECISION {
                self.value = (self.value << 1) | self.next_bit(source)?;
            }
            self.started = true;
        }
        Ok(())
    }

    /// The cumulative frequency the next symbol covers, in `0..total`.
    pub fn target<B: BitSource + ?Sized>(&mut self, source: &mut B, total: u32) -> Result<u32> {
        self.start(source)?;

        let range = self.high - self.low + 1;
        let scaled = ((self.value - self.low + 1) * u64::from(total) - 1) / range;
        if scaled >= u64::from(total) {
            return Err(StreamError::corrupt(0, "arithmetic decoder left its interval"));
        }
        Ok(scaled as u32)
    }

    /// Consume the symbol occupying `[cum_low, cum_high)` of `total`.
    ///
    /// Must follow [`Self::target`] with the symbol that contains it.
    pub fn consume<B: BitSource + ?Sized>(
        &mut self,
        source: &mut B,
        cum_low: u32,
        cum_high: u32,
        total: u32,
    ) -> Result<()> {
        let range = self.high - self.low + 1;
        self.high = self.low + range * u64::from(cum_high) / u64::from(total) - 1;
        self.low += range * u64::from(cum_low) / u64::from(total);

        loop {
            if self.high < HALF {
                // Nothing to subtract.
            } else if self.low >= HALF {
                self.low -= HALF;
                self.high -= HALF;
                self.value -= HALF;
            } else if self.low >= QUARTER && self.high < THREE_QUARTERS {
                self.low -= QUARTER;
                self.high -= QUARTER;
                self.value -= QUARTER;
            } else {
                break;
            }
            self.low <<= 1;
            self.high = (self.high << 1) | 1;
            self.value = (self.value << 1) | self.next_bit(source)?;
        }
        Ok(())
    }
}

impl Default for RangeDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Static three-symbol model: cumulative ranges out of 10.
    const RANGES: [(u32, u32); 3] = [(0, 6), (6, 9), (9, 10)];

    fn symbol_for(target: u32) -> usize {
        RANGES.iter().position(|&(lo, hi)| target >= lo && target < hi).unwrap()
    }

    #[test]
    fn test_static_model_roundtrip() {
        let message: Vec<usize> = (0..500).map(|i| [0, 0, 1, 0, 2, 1, 0][i % 7]).collect();

        let mut encoder = RangeEncoder::new();
        let mut bits = Vec::new();
        for &s in &message {
            let (lo, hi) = RANGES[s];
            encoder.encode(&mut bits, lo, hi, 10).unwrap();
        }
        encoder.finish(&mut bits).unwrap();

        let mut decoder = RangeDecoder::new();
        let mut source: VecDeque<bool> = bits.into_iter().collect();
        for &expected in &message {
            let target = decoder.target(&mut source, 10).unwrap();
            let s = symbol_for(target);
            assert_eq!(s, expected);
            let (lo, hi) = RANGES[s];
            decoder.consume(&mut source, lo, hi, 10).unwrap();
        }
        assert!(decoder.padding_bits() <= MAX_PADDING_BITS);
    }

    #[test]
    fn test_pending_bits_resolve() {
        // The middle symbol straddles the midpoint, which defers bits.
        let ranges = [(0u32, 1u32), (1, 3), (3, 4)];
        let message: Vec<usize> = (0..64)
            .map(|i| if i % 5 == 4 { (i / 5) % 2 * 2 } else { 1 })
            .collect();

        let mut encoder = RangeEncoder::new();
        let mut bits = Vec::new();
        let mut saw_pending = false;
        for &s in &message {
            encoder.encode(&mut bits, ranges[s].0, ranges[s].1, 4).unwrap();
            saw_pending |= encoder.pending() > 0;
        }
        encoder.finish(&mut bits).unwrap();
        assert!(saw_pending);

        let mut decoder = RangeDecoder::new();
        let mut source: VecDeque<bool> = bits.into_iter().collect();
        for &expected in &message {
            let target = decoder.target(&mut source, 4).unwrap();
            let s = ranges
                .iter()
                .position(|&(lo, hi)| target >= lo && target < hi)
                .unwrap();
            assert_eq!(s, expected);
            decoder
                .consume(&mut source, ranges[s].0, ranges[s].1, 4)
                .unwrap();
        }
    }

    #[test]
    fn test_highly_probable_symbol_costs_little() {
        let mut encoder = RangeEncoder::new();
        let mut bits = Vec::new();
        for _ in 0..10_000 {
            encoder.encode(&mut bits, 0, 1000, 1001).unwrap();
        }
        encoder.finish(&mut bits).unwrap();
        // -log2(1000/1001) * 10000 is about 14.4 bits.
        assert!(bits.len() < 40, "{} bits", bits.len());
    }

    #[test]
    fn test_padding_limit() {
        let mut decoder = RangeDecoder::new();
        let mut empty: VecDeque<bool> = VecDeque::new();
        // The first 32 bits may all be invented.
        let target = decoder.target(&mut empty, 10).unwrap();
        assert_eq!(target, 0);
        // Consuming a narrow symbol needs more bits than the allowance.
        let mut result = Ok(());
        for _ in 0..40 {
            result = decoder.consume(&mut empty, 0, 1, 10);
            if result.is_err() {
                break;
            }
        }
        assert!(matches!(result, Err(StreamError::Truncated { .. })));
    }
}
