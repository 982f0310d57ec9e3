//! Dynamic transform stacks.
//!
//! A [`Chain`] lists transforms in the order they are applied when
//! encoding. `bwt,arith,crc` means: block-sort the input, arithmetic-code
//! the result, then checksum the compressed bytes. Decoding undoes the
//! list from right to left.

use crate::spec::CodecSpec;
use oxistream_arith::ArithmeticCodec;
use oxistream_base64::Base64Codec;
use oxistream_bwt::BwtCodec;
use oxistream_core::{ByteStream, Crc32Stream, Direction, MemoryStream, Result, StreamError, copy};
use oxistream_huffman::HuffmanCodec;
use oxistream_lz::LzCodec;
use std::fmt;
use std::str::FromStr;

/// A boxed stream stack.
pub type BoxedStream<'a> = Box<dyn ByteStream + 'a>;

/// An ordered list of transforms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    specs: Vec<CodecSpec>,
}

impl Chain {
    /// Create a chain. An empty chain passes bytes through unchanged.
    pub fn new(specs: Vec<CodecSpec>) -> Result<Self> {
        for spec in &specs {
            spec.validate()?;
        }
        Ok(Self { specs })
    }

    /// The transforms, in encode order.
    pub fn specs(&self) -> &[CodecSpec] {
        &self.specs
    }

    /// Whether any stage writes a CRC trailer that decoding verifies.
    pub fn has_trailer(&self) -> bool {
        self.specs.contains(&CodecSpec::Crc)
    }

    /// Build the encoding stack over `target`. Writing to the returned
    /// stream and closing it produces the encoded bytes in `target`.
    pub fn encoder<'a, S: ByteStream + 'a>(&self, target: S) -> Result<BoxedStream<'a>> {
        tracing::debug!(chain = %self, "building encoder");
        let mut stream: BoxedStream<'a> = Box::new(target);
        for spec in self.specs.iter().rev() {
            stream = wrap(*spec, stream, Direction::Encode)?;
        }
        Ok(stream)
    }

    /// Build the decoding stack over `source`. Reading the returned stream
    /// to end-of-data yields the original bytes.
    pub fn decoder<'a, S: ByteStream + 'a>(&self, source: S) -> Result<BoxedStream<'a>> {
        tracing::debug!(chain = %self, "building decoder");
        let mut stream: BoxedStream<'a> = Box::new(source);
        for spec in self.specs.iter().rev() {
            stream = wrap(*spec, stream, Direction::Decode)?;
        }
        Ok(stream)
    }

    /// Encode `data` in memory.
    pub fn encode_all(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut sink = MemoryStream::writer();
        {
            let mut encoder = self.encoder(&mut sink)?;
            encoder.write(data)?;
            encoder.close()?;
        }
        Ok(sink.into_inner())
    }

    /// Decode `data` in memory.
    pub fn decode_all(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = self.decoder(MemoryStream::reader(data.to_vec()))?;
        let mut sink = MemoryStream::writer_with_capacity(data.len() * 2);
        copy(&mut decoder, &mut sink)?;
        decoder.close()?;
        Ok(sink.into_inner())
    }
}

fn wrap<'a>(spec: CodecSpec, inner: BoxedStream<'a>, direction: Direction) -> Result<BoxedStream<'a>> {
    Ok(match spec {
        CodecSpec::Crc => Box::new(Crc32Stream::with_trailer(inner, direction)?),
        CodecSpec::Base64(config) => Box::new(Base64Codec::new(inner, direction, config)?),
        CodecSpec::Huffman(config) => Box::new(HuffmanCodec::new(inner, direction, config)?),
        CodecSpec::Arith(config) => Box::new(ArithmeticCodec::new(inner, direction, config)?),
        CodecSpec::Lz(level) => {
            Box::new(LzCodec::new(inner, direction, CodecSpec::lz_config(level))?)
        }
        CodecSpec::Bwt(config) => Box::new(BwtCodec::new(inner, direction, config)?),
    })
}

impl FromStr for Chain {
    type Err = StreamError;

    fn from_str(text: &str) -> Result<Self> {
        let specs = text
            .split(',')
            .map(str::parse)
            .collect::<Result<Vec<CodecSpec>>>()?;
        Self::new(specs)
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, spec) in self.specs.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{spec}")?;
        }
        Ok(())
    }
}

/// Encode `data` through the chain described by `chain`.
pub fn encode_all(chain: &str, data: &[u8]) -> Result<Vec<u8>> {
    chain.parse::<Chain>()?.encode_all(data)
}

/// Decode `data` through the chain described by `chain`.
pub fn decode_all(chain: &str, data: &[u8]) -> Result<Vec<u8>> {
    chain.parse::<Chain>()?.decode_all(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chain() {
        let chain: Chain = "bwt:64k, arith ,crc".parse().unwrap();
        assert_eq!(chain.specs().len(), 3);
        assert!(chain.has_trailer());
        assert_eq!(chain.to_string(), "bwt:64k,arith,crc");
        assert!("bwt,,crc".parse::<Chain>().is_err());
        assert!("lz:9,zip".parse::<Chain>().is_err());
    }

    #[test]
    fn test_inner_crc_counts_as_trailer() {
        let chain: Chain = "crc,lz:6".parse().unwrap();
        assert!(chain.has_trailer());
        assert!(!"lz:6,huffman".parse::<Chain>().unwrap().has_trailer());

        let data = b"checked before compression ".repeat(20);
        let mut packed = chain.encode_all(&data).unwrap();
        assert_eq!(chain.decode_all(&packed).unwrap(), data);

        // The trailer travels as the last literal tokens of the LZ payload.
        let mut bad_trailer = packed.clone();
        let n = bad_trailer.len();
        bad_trailer[n - 3] ^= 0x01;
        assert!(chain.decode_all(&bad_trailer).is_err());
        packed.truncate(n - 1);
        assert!(chain.decode_all(&packed).is_err());
    }

    #[test]
    fn test_empty_chain_passes_through() {
        let chain = Chain::new(Vec::new()).unwrap();
        assert_eq!(chain.encode_all(b"plain").unwrap(), b"plain");
        assert_eq!(chain.decode_all(b"plain").unwrap(), b"plain");
    }

    #[test]
    fn test_crc_innermost_appends_trailer() {
        let packed = encode_all("lz:1,crc", b"abcabcabcabc").unwrap();
        let body = &packed[..packed.len() - 4];
        let trailer = u32::from_be_bytes(packed[packed.len() - 4..].try_into().unwrap());
        assert_eq!(oxistream_core::Crc32::compute(body), trailer);
    }
}
