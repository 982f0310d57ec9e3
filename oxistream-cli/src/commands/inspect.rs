//! Inspect command implementation.

use crate::utils::{open_input, space_savings};
use oxistream::{ByteStream, Chain, Crc32Stream, Direction, ReaderStream, WriterStream, copy};
use serde::Serialize;
use std::io::Read;
use std::path::Path;

/// What decoding an encoded file yields.
#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub path: String,
    pub chain: String,
    pub encoded_size: u64,
    pub decoded_size: u64,
    pub savings_percent: f64,
    pub decoded_crc32: String,
    pub integrity_checked: bool,
}

/// Decode `reader` through `chain`, discarding the output.
pub fn inspect_reader<R: Read>(
    chain: &Chain,
    reader: R,
    path: &str,
) -> oxistream::Result<InspectReport> {
    let mut counted = CountingRead {
        inner: reader,
        count: 0,
    };
    let (decoded_size, crc) = {
        let mut decoder = chain.decoder(ReaderStream::new(&mut counted))?;
        let mut sink = Crc32Stream::new(WriterStream::new(std::io::sink()), Direction::Encode)?;
        let decoded = copy(&mut decoder, &mut sink)?;
        decoder.close()?;
        (decoded, sink.checksum())
    };
    let encoded_size = counted.count;

    Ok(InspectReport {
        path: path.to_string(),
        chain: chain.to_string(),
        encoded_size,
        decoded_size,
        savings_percent: space_savings(decoded_size, encoded_size),
        decoded_crc32: format!("{crc:08x}"),
        integrity_checked: chain.has_trailer(),
    })
}

struct CountingRead<R> {
    inner: R,
    count: u64,
}

impl<R: Read> Read for CountingRead<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}

pub fn cmd_inspect(
    chain: &Chain,
    file: &Path,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = inspect_reader(chain, open_input(file)?, &file.display().to_string())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Stream Information");
    println!("==================");
    println!("File: {}", report.path);
    println!("Chain: {}", report.chain);
    println!("Encoded size: {} bytes", report.encoded_size);
    println!("Decoded size: {} bytes", report.decoded_size);
    println!("Space savings: {:.1}%", report.savings_percent);
    println!("Decoded CRC-32: {}", report.decoded_crc32);
    println!(
        "Integrity: {}",
        if report.integrity_checked {
            "trailer verified"
        } else {
            "no trailer"
        }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspect_reports_sizes() {
        let chain: Chain = "lz:6,huffman,crc".parse().unwrap();
        let data = b"inspect me, inspect me again ".repeat(40);
        let packed = chain.encode_all(&data).unwrap();

        let report = inspect_reader(&chain, packed.as_slice(), "mem").unwrap();
        assert_eq!(report.decoded_size, data.len() as u64);
        assert_eq!(report.encoded_size, packed.len() as u64);
        assert_eq!(
            report.decoded_crc32,
            format!("{:08x}", oxistream::Crc32::compute(&data))
        );
        assert!(report.integrity_checked);
        assert!(report.savings_percent > 50.0);
    }

    #[test]
    fn test_inspect_reports_inner_trailer() {
        let chain: Chain = "crc,lz:6".parse().unwrap();
        let data = b"trailer under the compressor ".repeat(10);
        let packed = chain.encode_all(&data).unwrap();

        let report = inspect_reader(&chain, packed.as_slice(), "mem").unwrap();
        assert!(report.integrity_checked);
        assert_eq!(report.decoded_size, data.len() as u64);
    }

    #[test]
    fn test_inspect_rejects_damaged_trailer() {
        let chain: Chain = "crc".parse().unwrap();
        let mut packed = chain.encode_all(b"payload").unwrap();
        let last = packed.len() - 1;
        packed[last] ^= 1;

        let err = inspect_reader(&chain, packed.as_slice(), "mem").unwrap_err();
        assert_eq!(err.kind(), oxistream::ErrorKind::IntegrityMismatch);
    }
}
