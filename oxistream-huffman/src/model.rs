//! Adaptive symbol model: frequency counts plus the code derived from them.

use crate::canonical::CanonicalCode;
use crate::config::{BYTE_SYMBOLS, EOS, ESC, HuffmanConfig};
use oxistream_core::{BitSink, BitSource, FrequencyTable, Result, StreamError};

/// The shared encoder/decoder model.
///
/// Both directions call [`AdaptiveHuffman::encode_byte`] /
/// [`AdaptiveHuffman::decode_symbol`] in the same order, so the counts,
/// rescales and rebuilds happen at the same points on both sides.
#[derive(Debug, Clone)]
pub struct AdaptiveHuffman {
    config: HuffmanConfig,
    table: FrequencyTable,
    code: CanonicalCode,
    since_rebuild: u32,
    rebuilds: u64,
}

/// A decoded symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    /// A data byte.
    Byte(u8),
    /// End of stream.
    End,
}

impl AdaptiveHuffman {
    /// Create a fresh model.
    pub fn new(config: HuffmanConfig) -> Result<Self> {
        config.validate()?;

        let mut counts = vec![1u32; config.alphabet_size()];
        if config.escape {
            counts[..BYTE_SYMBOLS].fill(0);
        }
        let table = FrequencyTable::with_counts(counts, 1, config.max_total)?;
        let code = CanonicalCode::from_counts(table.counts())?;

        Ok(Self {
            config,
            table,
            code,
            since_rebuild: 0,
            rebuilds: 0,
        })
    }

    /// The frequency table.
    pub fn table(&self) -> &FrequencyTable {
        &self.table
    }

    /// The code currently in use.
    pub fn code(&self) -> &CanonicalCode {
        &self.code
    }

    /// Number of code rebuilds so far.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    fn rebuild(&mut self) -> Result<()> {
        self.code = CanonicalCode::from_counts(self.table.counts())?;
        self.since_rebuild = 0;
        self.rebuilds += 1;
        Ok(())
    }

    /// Count one occurrence of `symbol` and rebuild when due.
    fn update(&mut self, symbol: usize) -> Result<()> {
        let rescaled = self.table.update(symbol);
        self.since_rebuild += 1;
        if rescaled || self.since_rebuild >= self.config.rebuild_interval {
            self.rebuild()?;
        }
        Ok(())
    }

    /// Bring an unseen byte into the alphabet.
    fn activate(&mut self, symbol: usize) -> Result<()> {
        self.table.activate(symbol);
        // A new symbol needs a code before it can be sent again.
        self.rebuild()
    }

    /// Encode `byte` and update the model.
    pub fn encode_byte<B: BitSink + ?Sized>(&mut self, sink: &mut B, byte: u8) -> Result<()> {
        let symbol = usize::from(byte);
        if self.table.is_active(symbol) {
            self.code.encode(sink, symbol)?;
            return self.update(symbol);
        }

        // Only reachable in escape mode: every byte starts active otherwise.
        self.code.encode(sink, ESC)?;
        sink.put_bits(u32::from(byte), 8)?;
        self.update(ESC)?;
        self.activate(symbol)
    }

    /// Encode the end-of-stream marker. The model is not updated.
    pub fn encode_end<B: BitSink + ?Sized>(&self, sink: &mut B) -> Result<()> {
        self.code.encode(sink, EOS)
    }

    /// Decode one symbol and update the model.
    ///
    /// Fails with [`StreamError::Truncated`] if the data ends before the
    /// end-of-stream marker.
    pub fn decode_symbol<B: BitSource + ?Sized>(&mut self, source: &mut B) -> Result<Symbol> {
        let symbol = self.code.decode(source)?.ok_or_else(|| {
            StreamError::truncated("end of data before Huffman end-of-stream marker")
        })?;

        match symbol {
            EOS => Ok(Symbol::End),
            ESC if self.config.escape => {
                let raw = source.get_bits(8)? as usize;
                if self.table.is_active(raw) {
                    return Err(StreamError::corrupt(
                        0,
                        format!("escaped byte {raw:#04x} is already in the alphabet"),
                    ));
                }
                self.update(ESC)?;
                self.activate(raw)?;
                Ok(Symbol::Byte(raw as u8))
            }
            _ => {
                self.update(symbol)?;
                Ok(Symbol::Byte(symbol as u8))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn roundtrip(config: HuffmanConfig, data: &[u8]) -> (AdaptiveHuffman, AdaptiveHuffman) {
        let mut encoder = AdaptiveHuffman::new(config).unwrap();
        let mut bits = Vec::new();
        for &byte in data {
            encoder.encode_byte(&mut bits, byte).unwrap();
        }
        encoder.encode_end(&mut bits).unwrap();

        let mut decoder = AdaptiveHuffman::new(config).unwrap();
        let mut source: VecDeque<bool> = bits.into_iter().collect();
        let mut out = Vec::new();
        loop {
            match decoder.decode_symbol(&mut source).unwrap() {
                Symbol::Byte(b) => out.push(b),
                Symbol::End => break,
            }
        }
        assert_eq!(out, data);
        (encoder, decoder)
    }

    #[test]
    fn test_models_stay_in_lockstep() {
        let data: Vec<u8> = (0..3000u32).map(|i| (i % 17 + (i / 100) % 5) as u8).collect();
        for config in [HuffmanConfig::FAST, HuffmanConfig::DEFAULT, HuffmanConfig::BEST] {
            let (encoder, decoder) = roundtrip(config, &data);
            assert_eq!(encoder.table(), decoder.table());
            assert_eq!(encoder.rebuilds(), decoder.rebuilds());
        }
    }

    #[test]
    fn test_escape_activates_bytes() {
        let config = HuffmanConfig::BEST;
        let (encoder, _) = roundtrip(config, b"abracadabra");
        let table = encoder.table();
        for &b in b"abrcd" {
            assert!(table.is_active(b as usize));
        }
        assert!(!table.is_active(b'z' as usize));
    }

    #[test]
    fn test_skewed_input_gets_short_codes() {
        let data = vec![b'x'; 2000];
        let (encoder, _) = roundtrip(HuffmanConfig::DEFAULT, &data);
        assert_eq!(encoder.code().length(b'x' as usize), 1);
    }

    #[test]
    fn test_rescale_keeps_models_identical() {
        let config = HuffmanConfig::new(600, false, 4).unwrap();
        let data: Vec<u8> = (0..5000u32).map(|i| ((i * i) % 251) as u8).collect();
        let (encoder, decoder) = roundtrip(config, &data);
        assert!(encoder.table().rescales() > 0);
        assert!(encoder.table().total() <= 600);
        assert_eq!(encoder.table().fingerprint(), decoder.table().fingerprint());
    }

    #[test]
    fn test_missing_end_marker_is_truncated() {
        let mut encoder = AdaptiveHuffman::new(HuffmanConfig::DEFAULT).unwrap();
        let mut bits = Vec::new();
        encoder.encode_byte(&mut bits, b'a').unwrap();

        let mut decoder = AdaptiveHuffman::new(HuffmanConfig::DEFAULT).unwrap();
        let mut source: VecDeque<bool> = bits.into_iter().collect();
        assert_eq!(decoder.decode_symbol(&mut source).unwrap(), Symbol::Byte(b'a'));
        assert!(matches!(
            decoder.decode_symbol(&mut source),
            Err(StreamError::Truncated { .. })
        ));
    }
}
